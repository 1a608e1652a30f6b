//! Template matching module for locating a reference patch in a frame
//!
//! This module provides:
//! - Rectangle/point geometry and the match candidate type
//! - Dense zero-mean normalized cross-correlation over every offset

mod correlation;
pub mod matcher;
pub mod types;

pub use matcher::{DenseMatcher, TemplateMatcher};
pub use types::{MatchCandidate, MatchMethod, Point, Rect};
