//! Sparse feature correspondence
//!
//! Fallback for when dense correlation is unreliable (viewpoint or lighting
//! change between captures): FAST keypoints with binary descriptors, Lowe's
//! ratio test, and a RANSAC-fitted homography that projects the patch corner
//! into the target frame.

pub mod homography;
pub mod keypoints;
pub mod matcher;

pub use keypoints::{Descriptor, FeatureExtractor, Features, Keypoint};
pub use matcher::{FeatureMatcher, SparseMatcher};
