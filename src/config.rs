//! Configuration for region matching operations

use std::fmt;

/// Which matcher(s) the region policy may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Dense template correlation only
    Template,
    /// Sparse feature/homography matching only
    Feature,
    /// Template first, feature matching as fallback
    #[default]
    Auto,
}

impl MatchMode {
    pub fn uses_template(self) -> bool {
        matches!(self, MatchMode::Template | MatchMode::Auto)
    }

    pub fn uses_feature(self) -> bool {
        matches!(self, MatchMode::Feature | MatchMode::Auto)
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchMode::Template => "template",
            MatchMode::Feature => "feature",
            MatchMode::Auto => "auto",
        };
        f.write_str(name)
    }
}

/// RANSAC settings for the homography fit.
#[derive(Debug, Clone)]
pub struct RansacConfig {
    /// Maximum number of hypotheses drawn
    pub max_iterations: usize,
    /// Reprojection distance (pixels) under which a match counts as inlier
    pub inlier_threshold: f64,
    /// Sampling seed; fixed so repeated runs give identical fits
    pub seed: u64,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            inlier_threshold: 5.0,
            seed: 0x5eed_0f_a11,
        }
    }
}

/// Keypoint detection, description and matching settings.
#[derive(Debug, Clone)]
pub struct FeatureConfig {
    /// Strongest keypoints kept per image
    pub max_features: usize,
    /// FAST intensity threshold
    pub fast_threshold: u8,
    /// Lowe ratio: nearest must be below `ratio` x second nearest
    pub ratio: f32,
    /// Minimum keypoints per image and minimum ratio-test survivors
    pub min_matches: usize,
    /// Half-size of the square the descriptor samples from
    pub patch_radius: u32,
    /// Gaussian smoothing applied before sampling descriptor pairs
    pub blur_sigma: f32,
    /// Seed for the descriptor sampling pattern
    pub pattern_seed: u64,
    pub ransac: RansacConfig,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            max_features: 500,
            fast_threshold: 20,
            ratio: 0.75,
            min_matches: 4,
            patch_radius: 12,
            blur_sigma: 1.2,
            pattern_seed: 0x0b_1e_f0,
            ransac: RansacConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub mode: MatchMode,
    /// Acceptance threshold for either matcher (0.0 to 1.0)
    pub threshold: f32,
    pub feature: FeatureConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::Auto,
            threshold: 0.7,
            feature: FeatureConfig::default(),
        }
    }
}

impl MatchConfig {
    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }
}
