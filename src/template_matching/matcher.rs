/// Dense template matching
///
/// Zero-mean normalized cross-correlation evaluated at every offset, with
/// summed-area tables for the per-window statistics and an FFT for the
/// correlation term on large inputs.
use super::correlation::cross_correlate;
use super::types::{MatchCandidate, MatchMethod};
use crate::error::{MatchError, MatchResult};
use image::GrayImage;

/// Sum of squared deviations below which a window (or the template) counts
/// as flat. Any non-flat 8-bit window has at least 0.5.
const FLAT_VARIANCE: f64 = 1e-3;

/// Dense matcher seam used by the region policy
pub trait DenseMatcher {
    /// Best-scoring top-left offset of `template` inside `frame`
    fn best_match(&self, template: &GrayImage, frame: &GrayImage) -> MatchResult<MatchCandidate>;
}

/// Template matcher scanning every offset of the frame
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateMatcher;

impl TemplateMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Score every offset and return the maximum.
    ///
    /// Ties keep the first offset in row-major order. Flat windows (or a flat
    /// template) score 0.
    fn scan(&self, template: &GrayImage, frame: &GrayImage) -> (u32, u32, f64) {
        let (tw, th) = template.dimensions();
        let (fw, fh) = frame.dimensions();
        let n = (tw * th) as f64;

        let template_mean = template.as_raw().iter().map(|&v| v as f64).sum::<f64>() / n;
        let centered: Vec<f64> = template
            .as_raw()
            .iter()
            .map(|&v| v as f64 - template_mean)
            .collect();
        let template_var: f64 = centered.iter().map(|v| v * v).sum();

        if template_var < FLAT_VARIANCE {
            log::debug!("Template {}x{} is flat; correlation undefined", tw, th);
            return (0, 0, 0.0);
        }

        let table = SummedArea::new(frame);
        let cross = cross_correlate(&centered, tw, th, frame.as_raw(), fw, fh);
        let stride = fw as usize;

        let x_max = fw - tw;
        let y_max = fh - th;
        let report_interval = ((y_max + 1) / 10).max(1);

        let mut best = (0u32, 0u32, f64::NEG_INFINITY);

        for y in 0..=y_max {
            for x in 0..=x_max {
                let (sum, sum_sq) = table.window(x, y, tw, th);
                let window_var = sum_sq - sum * sum / n;

                let score = if window_var < FLAT_VARIANCE {
                    0.0
                } else {
                    cross[y as usize * stride + x as usize] / (template_var * window_var).sqrt()
                };

                if score > best.2 {
                    best = (x, y, score);
                }
            }

            if y % report_interval == 0 {
                log::trace!(
                    "  Correlation scanning: {}%",
                    (y as f32 / (y_max + 1) as f32 * 100.0) as u32
                );
            }
        }

        best
    }
}

impl DenseMatcher for TemplateMatcher {
    fn best_match(&self, template: &GrayImage, frame: &GrayImage) -> MatchResult<MatchCandidate> {
        let (tw, th) = template.dimensions();
        if tw == 0 || th == 0 {
            return Err(MatchError::EmptyTemplate {
                width: tw,
                height: th,
            });
        }
        if tw > frame.width() || th > frame.height() {
            return Err(MatchError::TemplateTooLarge {
                template_w: tw,
                template_h: th,
                frame_w: frame.width(),
                frame_h: frame.height(),
            });
        }

        let (x, y, score) = self.scan(template, frame);
        log::debug!("Template peak at ({}, {}) score={:.4}", x, y, score);

        Ok(MatchCandidate::new(
            x as i32,
            y as i32,
            score as f32,
            MatchMethod::Template,
        ))
    }
}

/// Summed-area tables of pixel values and squared pixel values
struct SummedArea {
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
    stride: usize,
}

impl SummedArea {
    fn new(image: &GrayImage) -> Self {
        let (w, h) = (image.width() as usize, image.height() as usize);
        let stride = w + 1;
        let mut sum = vec![0.0; stride * (h + 1)];
        let mut sum_sq = vec![0.0; stride * (h + 1)];
        let data = image.as_raw();

        for y in 0..h {
            let mut row_sum = 0.0;
            let mut row_sq = 0.0;
            for x in 0..w {
                let v = data[y * w + x] as f64;
                row_sum += v;
                row_sq += v * v;
                let idx = (y + 1) * stride + x + 1;
                sum[idx] = sum[idx - stride] + row_sum;
                sum_sq[idx] = sum_sq[idx - stride] + row_sq;
            }
        }

        Self {
            sum,
            sum_sq,
            stride,
        }
    }

    /// (sum, sum of squares) over the window at (x, y) of size w x h
    fn window(&self, x: u32, y: u32, w: u32, h: u32) -> (f64, f64) {
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + w as usize, y0 + h as usize);
        let at = |table: &[f64], xx: usize, yy: usize| table[yy * self.stride + xx];
        let area = |table: &[f64]| {
            at(table, x1, y1) - at(table, x0, y1) - at(table, x1, y0) + at(table, x0, y0)
        };
        (area(&self.sum), area(&self.sum_sq))
    }
}
