use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, GrayImage, ImageEncoder};
use serde::{Deserialize, Serialize};

use crate::{error::Result, types::PathSet};

/// Presentation settings for SVG output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SvgOptions {
    /// Multiplier applied to the document width/height attributes. Path
    /// coordinates stay in image space; the viewBox does the scaling.
    pub scale: f64,
    /// Stroke width in image-space pixels.
    pub stroke_width: f64,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            stroke_width: 1.2,
        }
    }
}

fn document_open(width: u32, height: u32, options: &SvgOptions) -> String {
    let out_w = width as f64 * options.scale;
    let out_h = height as f64 * options.scale;
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<svg xmlns=\"http://www.w3.org/2000/svg\" ",
            "width=\"{:.0}\" height=\"{:.0}\" viewBox=\"0 0 {} {}\">\n",
            "  <rect width=\"{}\" height=\"{}\" fill=\"white\"/>\n",
        ),
        out_w, out_h, width, height, width, height
    )
}

/// Render every path as a stroked `<path>` element.
///
/// Each path becomes a move-to followed by line-to commands; smoothed paths
/// are dense enough that line segments read as curves at display size.
pub fn paths_to_svg(paths: &PathSet, width: u32, height: u32, options: &SvgOptions) -> String {
    let mut svg = document_open(width, height, options);
    for path in paths.iter() {
        let Some(first) = path.points.first() else {
            continue;
        };
        let mut d = format!("M {:.2} {:.2}", first.x, first.y);
        for p in &path.points[1..] {
            d.push_str(&format!(" L {:.2} {:.2}", p.x, p.y));
        }
        svg.push_str(&format!(
            concat!(
                "  <path d=\"{}\" fill=\"none\" stroke=\"black\" ",
                "stroke-width=\"{}\" stroke-linecap=\"round\" ",
                "stroke-linejoin=\"round\"/>\n",
            ),
            d, options.stroke_width
        ));
    }
    svg.push_str("</svg>\n");
    svg
}

/// Render the binary mask as an SVG document embedding a base64 PNG.
///
/// Useful as a faithful raster preview of what the tracer actually saw.
pub fn mask_to_svg(mask: &GrayImage, options: &SvgOptions) -> Result<String> {
    let (width, height) = mask.dimensions();
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(mask.as_raw(), width, height, ExtendedColorType::L8)?;
    let encoded = STANDARD.encode(&png);

    let mut svg = document_open(width, height, options);
    svg.push_str(&format!(
        "  <image width=\"{}\" height=\"{}\" href=\"data:image/png;base64,{}\"/>\n",
        width, height, encoded
    ));
    svg.push_str("</svg>\n");
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Path, PathKind, Point};
    use image::Luma;

    fn sample_paths() -> PathSet {
        PathSet::new(vec![Path::new(
            vec![
                Point::new(1.0, 2.0),
                Point::new(3.5, 2.0),
                Point::new(3.5, 8.25),
            ],
            PathKind::Open,
        )])
    }

    #[test]
    fn path_document_has_expected_shape() {
        let svg = paths_to_svg(&sample_paths(), 100, 50, &SvgOptions::default());
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("viewBox=\"0 0 100 50\""));
        assert!(svg.contains("<rect width=\"100\" height=\"50\" fill=\"white\"/>"));
        assert!(svg.contains("M 1.00 2.00 L 3.50 2.00 L 3.50 8.25"));
        assert!(svg.contains("stroke-width=\"1.2\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn scale_changes_document_size_not_coordinates() {
        let options = SvgOptions {
            scale: 2.0,
            ..Default::default()
        };
        let svg = paths_to_svg(&sample_paths(), 100, 50, &options);
        assert!(svg.contains("width=\"200\" height=\"100\""));
        assert!(svg.contains("viewBox=\"0 0 100 50\""));
        assert!(svg.contains("M 1.00 2.00"));
    }

    #[test]
    fn empty_path_set_is_still_a_valid_document() {
        let svg = paths_to_svg(&PathSet::default(), 10, 10, &SvgOptions::default());
        assert!(svg.contains("<rect"));
        assert!(!svg.contains("<path"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn mask_document_embeds_png_data_uri() {
        let mut mask = GrayImage::new(8, 8);
        mask.put_pixel(4, 4, Luma([255u8]));
        let svg = mask_to_svg(&mask, &SvgOptions::default()).unwrap();
        assert!(svg.contains("href=\"data:image/png;base64,"));
        assert!(svg.contains("<image width=\"8\" height=\"8\""));
    }
}
