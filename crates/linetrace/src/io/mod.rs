pub mod svg;

pub use svg::{SvgOptions, mask_to_svg, paths_to_svg};
