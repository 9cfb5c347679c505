use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::region_labelling::{Connectivity, connected_components};

use crate::{error::Result, traits::ImagePreprocessor};

/// Edge-preserving bilateral denoise, applied before thresholding.
#[derive(Debug, Clone)]
pub struct BilateralDenoise {
    pub window_size: u32,
    pub sigma_color: f32,
    pub sigma_spatial: f32,
}

impl Default for BilateralDenoise {
    fn default() -> Self {
        Self {
            window_size: 9,
            sigma_color: 75.0,
            sigma_spatial: 75.0,
        }
    }
}

impl ImagePreprocessor for BilateralDenoise {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        Ok(imageproc::filter::bilateral_filter(
            image,
            self.window_size,
            self.sigma_color,
            self.sigma_spatial,
        ))
    }
}

/// Local-mean adaptive threshold with polarity normalization.
///
/// The threshold at each pixel is the mean of a `(2r+1)×(2r+1)` neighborhood
/// minus `offset`, computed from an integral image so the window size does
/// not affect cost. After thresholding, the mask is inverted once if the
/// on-pixel fraction exceeds one half, so foreground is always the
/// minority-by-convention ink pixels. The decision is made exactly once per
/// run and re-applying the step to its own output is a no-op.
#[derive(Debug, Clone)]
pub struct AdaptiveThreshold {
    pub block_radius: u32,
    pub offset: i64,
}

impl Default for AdaptiveThreshold {
    fn default() -> Self {
        Self {
            block_radius: 10,
            offset: 7,
        }
    }
}

impl ImagePreprocessor for AdaptiveThreshold {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        let (width, height) = image.dimensions();
        let (w, h) = (width as i64, height as i64);
        let r = self.block_radius as i64;

        // Integral image with a zero top row and left column.
        let stride = w + 1;
        let mut integral = vec![0u64; ((w + 1) * (h + 1)) as usize];
        for y in 0..h {
            let mut row_sum = 0u64;
            for x in 0..w {
                row_sum += image.get_pixel(x as u32, y as u32)[0] as u64;
                integral[((y + 1) * stride + x + 1) as usize] =
                    integral[(y * stride + x + 1) as usize] + row_sum;
            }
        }

        let mut out = GrayImage::new(width, height);
        let mut on_count = 0u64;
        for y in 0..h {
            for x in 0..w {
                let x0 = (x - r).max(0);
                let y0 = (y - r).max(0);
                let x1 = (x + r + 1).min(w);
                let y1 = (y + r + 1).min(h);
                let area = ((x1 - x0) * (y1 - y0)) as i64;
                let sum = integral[(y1 * stride + x1) as usize]
                    + integral[(y0 * stride + x0) as usize]
                    - integral[(y0 * stride + x1) as usize]
                    - integral[(y1 * stride + x0) as usize];

                let px = image.get_pixel(x as u32, y as u32)[0] as i64;
                let on = px * area > sum as i64 - self.offset * area;
                if on {
                    on_count += 1;
                    out.put_pixel(x as u32, y as u32, Luma([255u8]));
                }
            }
        }

        // Normalize polarity: ink must be the minority on-pixels.
        let total = (w * h) as u64;
        if total > 0 && on_count * 2 > total {
            for px in out.pixels_mut() {
                px[0] = 255 - px[0];
            }
        }
        Ok(out)
    }
}

/// Morphological closing with a 3×3 structuring element.
///
/// Closing merges strokes separated by sub-kernel gaps. No opening is
/// applied: eroding with any symmetric element wipes out 1-pixel-wide
/// strokes, so speckle removal is left to [`ComponentAreaFilter`].
#[derive(Debug, Clone)]
pub struct MorphologicalCleanup {
    pub radius: u8,
}

impl Default for MorphologicalCleanup {
    fn default() -> Self {
        Self { radius: 1 }
    }
}

impl ImagePreprocessor for MorphologicalCleanup {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        Ok(imageproc::morphology::close(image, Norm::LInf, self.radius))
    }
}

/// Drops 8-connected components smaller than a minimum pixel area.
#[derive(Debug, Clone)]
pub struct ComponentAreaFilter {
    pub min_area: usize,
}

impl Default for ComponentAreaFilter {
    fn default() -> Self {
        Self { min_area: 50 }
    }
}

impl ImagePreprocessor for ComponentAreaFilter {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        let labels = connected_components(image, Connectivity::Eight, Luma([0u8]));

        let max_label = labels.pixels().map(|p| p[0]).max().unwrap_or(0) as usize;
        let mut sizes = vec![0usize; max_label + 1];
        for p in labels.pixels() {
            sizes[p[0] as usize] += 1;
        }

        let (width, height) = image.dimensions();
        let mut out = GrayImage::new(width, height);
        for (x, y, p) in labels.enumerate_pixels() {
            let label = p[0] as usize;
            if label != 0 && sizes[label] >= self.min_area {
                out.put_pixel(x, y, Luma([255u8]));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(width: u32, height: u32) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([255u8]))
    }

    #[test]
    fn adaptive_threshold_extracts_dark_stroke_as_foreground() {
        let mut img = blank(60, 60);
        for x in 10..50 {
            for y in 28..32 {
                img.put_pixel(x, y, Luma([0u8]));
            }
        }

        let bw = AdaptiveThreshold::default().preprocess(&img).unwrap();
        // The stroke must come out as the on-pixels.
        assert!(bw.get_pixel(30, 30)[0] == 255);
        assert!(bw.get_pixel(5, 5)[0] == 0);
        let on = bw.pixels().filter(|p| p[0] > 0).count();
        assert!(on * 2 < (60 * 60), "foreground must be the minority");
    }

    #[test]
    fn adaptive_threshold_is_idempotent_on_polarity() {
        let mut img = blank(40, 40);
        for x in 5..35 {
            img.put_pixel(x, 20, Luma([0u8]));
        }
        let step = AdaptiveThreshold::default();
        let once = step.preprocess(&img).unwrap();
        let twice = step.preprocess(&once).unwrap();
        let on_once = once.pixels().filter(|p| p[0] > 0).count();
        let on_twice = twice.pixels().filter(|p| p[0] > 0).count();
        assert!(on_once * 2 < 40 * 40);
        assert!(on_twice * 2 < 40 * 40);
    }

    #[test]
    fn blank_image_thresholds_to_empty_mask() {
        let img = blank(30, 30);
        let bw = AdaptiveThreshold::default().preprocess(&img).unwrap();
        assert!(bw.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn component_filter_removes_small_speck() {
        let mut mask = GrayImage::new(100, 100);
        // 3x3 speck: area 9, below the default threshold of 50.
        for y in 10..13 {
            for x in 10..13 {
                mask.put_pixel(x, y, Luma([255u8]));
            }
        }
        // 10x10 block: area 100, survives.
        for y in 50..60 {
            for x in 50..60 {
                mask.put_pixel(x, y, Luma([255u8]));
            }
        }

        let out = ComponentAreaFilter::default().preprocess(&mask).unwrap();
        assert_eq!(out.get_pixel(11, 11)[0], 0);
        assert_eq!(out.get_pixel(55, 55)[0], 255);
    }

    #[test]
    fn cleanup_fills_hairline_gap() {
        let mut mask = GrayImage::new(20, 20);
        for x in 2..18 {
            if x != 9 {
                mask.put_pixel(x, 10, Luma([255u8]));
            }
        }
        let out = MorphologicalCleanup::default().preprocess(&mask).unwrap();
        assert_eq!(out.get_pixel(9, 10)[0], 255);
    }

    #[test]
    fn cleanup_keeps_one_pixel_stroke() {
        let mut mask = GrayImage::new(30, 30);
        for x in 5..25 {
            mask.put_pixel(x, 15, Luma([255u8]));
        }
        let out = MorphologicalCleanup::default().preprocess(&mask).unwrap();
        for x in 5..25 {
            assert_eq!(out.get_pixel(x, 15)[0], 255, "stroke erased at x={x}");
        }
    }
}
