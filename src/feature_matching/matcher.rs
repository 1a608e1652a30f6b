//! Sparse feature matcher: keypoints, ratio test, RANSAC homography

use super::homography::{self, MIN_SAMPLE};
use super::keypoints::{FeatureExtractor, ratio_test_matches};
use crate::config::FeatureConfig;
use crate::template_matching::{MatchCandidate, MatchMethod};
use image::GrayImage;

/// Sparse matcher seam used by the region policy.
///
/// `None` means the matcher could not produce a result at all (too few
/// keypoints or matches, no transform), which is distinct from a result with
/// low confidence.
pub trait SparseMatcher {
    fn locate(&self, template: &GrayImage, frame: &GrayImage) -> Option<MatchCandidate>;
}

/// Keypoint/homography matcher for when dense correlation is unreliable
#[derive(Clone, Debug)]
pub struct FeatureMatcher {
    extractor: FeatureExtractor,
}

impl FeatureMatcher {
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            extractor: FeatureExtractor::new(config),
        }
    }
}

impl Default for FeatureMatcher {
    fn default() -> Self {
        Self::new(FeatureConfig::default())
    }
}

impl SparseMatcher for FeatureMatcher {
    fn locate(&self, template: &GrayImage, frame: &GrayImage) -> Option<MatchCandidate> {
        let config = self.extractor.config();
        let min_points = config.min_matches.max(MIN_SAMPLE);

        let patch_features = self.extractor.extract(template);
        let frame_features = self.extractor.extract(frame);
        log::debug!(
            "Feature match: {} patch keypoints, {} frame keypoints",
            patch_features.len(),
            frame_features.len()
        );
        if patch_features.len() < min_points || frame_features.len() < min_points {
            return None;
        }

        let good = ratio_test_matches(
            &patch_features.descriptors,
            &frame_features.descriptors,
            config.ratio,
        );
        if good.len() < min_points {
            log::debug!("Feature match: only {} ratio-test survivors", good.len());
            return None;
        }

        let src: Vec<[f64; 2]> = good
            .iter()
            .map(|m| {
                let kp = patch_features.keypoints[m.query];
                [kp.x as f64, kp.y as f64]
            })
            .collect();
        let dst: Vec<[f64; 2]> = good
            .iter()
            .map(|m| {
                let kp = frame_features.keypoints[m.train];
                [kp.x as f64, kp.y as f64]
            })
            .collect();

        let fit = homography::fit_ransac(&src, &dst, &config.ransac)?;
        let confidence = fit.inliers as f32 / good.len() as f32;

        // Template top-left corner in frame coordinates, truncated
        let [x, y] = homography::project(&fit.h, 0.0, 0.0)?;
        log::debug!(
            "Feature match: {}/{} inliers, corner ({:.2}, {:.2})",
            fit.inliers,
            good.len(),
            x,
            y
        );

        Some(MatchCandidate::new(
            x.trunc() as i32,
            y.trunc() as i32,
            confidence,
            MatchMethod::Feature,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn blocks(width: u32, height: u32, block: u32, seed: u64) -> GrayImage {
        let mut rng = StdRng::seed_from_u64(seed);
        let cols = width.div_ceil(block);
        let rows = height.div_ceil(block);
        let levels: Vec<u8> = (0..cols * rows).map(|_| rng.random_range(0..=255)).collect();
        GrayImage::from_fn(width, height, |x, y| Luma([levels[((y / block) * cols + x / block) as usize]]))
    }

    #[test]
    fn test_flat_patch_has_no_result() {
        let frame = blocks(120, 100, 10, 11);
        let patch = GrayImage::from_pixel(60, 60, Luma([40]));
        assert!(FeatureMatcher::default().locate(&patch, &frame).is_none());
    }

    #[test]
    fn test_flat_frame_has_no_result() {
        let reference = blocks(120, 100, 10, 11);
        let patch = image::imageops::crop_imm(&reference, 30, 20, 60, 60).to_image();
        let frame = GrayImage::from_pixel(120, 100, Luma([200]));
        assert!(FeatureMatcher::default().locate(&patch, &frame).is_none());
    }

    #[test]
    fn test_locates_translated_patch() {
        let reference = blocks(140, 110, 10, 21);
        let patch = image::imageops::crop_imm(&reference, 30, 20, 64, 64).to_image();

        // Same scene shifted by (+12, +7) with a fresh border
        let frame = GrayImage::from_fn(160, 130, |x, y| {
            if x >= 12 && y >= 7 && x - 12 < 140 && y - 7 < 110 {
                *reference.get_pixel(x - 12, y - 7)
            } else {
                Luma([0])
            }
        });

        let candidate = FeatureMatcher::default()
            .locate(&patch, &frame)
            .expect("translated patch should be located");
        assert_eq!(candidate.method, MatchMethod::Feature);
        assert!((candidate.x - 42).abs() <= 1, "x = {}", candidate.x);
        assert!((candidate.y - 27).abs() <= 1, "y = {}", candidate.y);
        assert!(candidate.confidence > 0.5);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let reference = blocks(140, 110, 10, 21);
        let patch = image::imageops::crop_imm(&reference, 30, 20, 64, 64).to_image();
        let matcher = FeatureMatcher::default();
        let a = matcher.locate(&patch, &reference);
        let b = matcher.locate(&patch, &reference);
        assert_eq!(a, b);
    }
}
