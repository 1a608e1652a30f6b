//! FAST keypoints with binary (BRIEF-style) descriptors

use crate::config::FeatureConfig;
use image::GrayImage;
use imageproc::corners::{Corner, corners_fast9};
use imageproc::filter::gaussian_blur_f32;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Descriptor length in bits
pub const DESCRIPTOR_BITS: usize = 256;
const WORDS: usize = DESCRIPTOR_BITS / 64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keypoint {
    pub x: u32,
    pub y: u32,
    pub score: f32,
}

/// 256-bit binary intensity-comparison descriptor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Descriptor([u64; WORDS]);

impl Descriptor {
    pub fn hamming_distance(&self, other: &Descriptor) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }
}

/// Keypoints and their descriptors, index-aligned
#[derive(Clone, Debug, Default)]
pub struct Features {
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Vec<Descriptor>,
}

impl Features {
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

/// Offsets of one intensity comparison, relative to the keypoint
#[derive(Clone, Copy, Debug)]
struct TestPair {
    dx0: i32,
    dy0: i32,
    dx1: i32,
    dy1: i32,
}

/// Detects and describes keypoints with a fixed sampling pattern.
///
/// The pattern is drawn once from a seeded generator, so two extractors built
/// from the same config produce comparable descriptors.
#[derive(Clone, Debug)]
pub struct FeatureExtractor {
    config: FeatureConfig,
    pattern: Vec<TestPair>,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.pattern_seed);
        let r = config.patch_radius as i32;
        let mut pattern = Vec::with_capacity(DESCRIPTOR_BITS);
        while pattern.len() < DESCRIPTOR_BITS {
            let pair = TestPair {
                dx0: rng.random_range(-r..=r),
                dy0: rng.random_range(-r..=r),
                dx1: rng.random_range(-r..=r),
                dy1: rng.random_range(-r..=r),
            };
            if (pair.dx0, pair.dy0) != (pair.dx1, pair.dy1) {
                pattern.push(pair);
            }
        }
        Self { config, pattern }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Distance from the border a keypoint needs for its descriptor window
    fn margin(&self) -> u32 {
        self.config.patch_radius + 1
    }

    /// Strongest FAST-9 corners after 3x3 non-maximum suppression, capped at
    /// `max_features`. Ordering is score descending, then row-major.
    pub fn detect(&self, image: &GrayImage) -> Vec<Keypoint> {
        let (w, h) = image.dimensions();
        let margin = self.margin();
        if w <= 2 * margin || h <= 2 * margin {
            return Vec::new();
        }

        let corners = corners_fast9(image, self.config.fast_threshold);
        let mut scores = vec![0.0f32; (w * h) as usize];
        for c in &corners {
            scores[(c.y * w + c.x) as usize] = c.score.max(f32::MIN_POSITIVE);
        }

        let is_local_max = |c: &Corner| {
            let here = scores[(c.y * w + c.x) as usize];
            for ny in c.y.saturating_sub(1)..=(c.y + 1).min(h - 1) {
                for nx in c.x.saturating_sub(1)..=(c.x + 1).min(w - 1) {
                    if (nx, ny) == (c.x, c.y) {
                        continue;
                    }
                    let other = scores[(ny * w + nx) as usize];
                    // Equal neighbours: the first in row-major order survives
                    if other > here || (other == here && (ny, nx) < (c.y, c.x)) {
                        return false;
                    }
                }
            }
            true
        };

        let mut keypoints: Vec<Keypoint> = corners
            .iter()
            .filter(|c| {
                c.x >= margin && c.y >= margin && c.x < w - margin && c.y < h - margin
            })
            .filter(|c| is_local_max(c))
            .map(|c| Keypoint {
                x: c.x,
                y: c.y,
                score: c.score,
            })
            .collect();

        keypoints.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| (a.y, a.x).cmp(&(b.y, b.x)))
        });
        keypoints.truncate(self.config.max_features);
        keypoints
    }

    /// Describe keypoints on a smoothed copy of `image`
    pub fn describe(&self, image: &GrayImage, keypoints: &[Keypoint]) -> Vec<Descriptor> {
        let smoothed = gaussian_blur_f32(image, self.config.blur_sigma);
        let (w, h) = smoothed.dimensions();
        let sample = |x: i32, y: i32| {
            let cx = x.clamp(0, w as i32 - 1) as u32;
            let cy = y.clamp(0, h as i32 - 1) as u32;
            smoothed.get_pixel(cx, cy)[0]
        };

        keypoints
            .iter()
            .map(|kp| {
                let (kx, ky) = (kp.x as i32, kp.y as i32);
                let mut words = [0u64; WORDS];
                for (bit, pair) in self.pattern.iter().enumerate() {
                    if sample(kx + pair.dx0, ky + pair.dy0) < sample(kx + pair.dx1, ky + pair.dy1) {
                        words[bit / 64] |= 1 << (bit % 64);
                    }
                }
                Descriptor(words)
            })
            .collect()
    }

    pub fn extract(&self, image: &GrayImage) -> Features {
        let keypoints = self.detect(image);
        let descriptors = self.describe(image, &keypoints);
        Features {
            keypoints,
            descriptors,
        }
    }
}

/// A ratio-test survivor: query (patch) index, train (frame) index
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DescriptorMatch {
    pub query: usize,
    pub train: usize,
    pub distance: u32,
}

/// Two-nearest-neighbour matching with Lowe's ratio test.
///
/// Queries with fewer than two candidates are dropped. Among equal distances
/// the lowest train index wins.
pub fn ratio_test_matches(query: &[Descriptor], train: &[Descriptor], ratio: f32) -> Vec<DescriptorMatch> {
    if train.len() < 2 {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for (qi, q) in query.iter().enumerate() {
        let mut best = (usize::MAX, u32::MAX);
        let mut second = u32::MAX;
        for (ti, t) in train.iter().enumerate() {
            let d = q.hamming_distance(t);
            if d < best.1 {
                second = best.1;
                best = (ti, d);
            } else if d < second {
                second = d;
            }
        }
        if (best.1 as f32) < ratio * second as f32 {
            matches.push(DescriptorMatch {
                query: qi,
                train: best.0,
                distance: best.1,
            });
        }
    }
    matches
}
