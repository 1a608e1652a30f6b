// Video correspondence driver: one target frame, every region
use super::region::{MatchOutcome, Region, RegionMatcher};
use crate::feature_matching::SparseMatcher;
use crate::template_matching::DenseMatcher;
use crate::video::{FrameSource, read_frame};
use image::GrayImage;
use std::path::Path;

/// Match every region of `reference` against frame `target_frame` of `target`.
///
/// Outcomes come back in region order. If the target frame cannot be read,
/// every region is a No-Match tagged "cannot read video" and no matcher runs.
pub fn match_video<T: DenseMatcher, F: SparseMatcher>(
    matcher: &RegionMatcher<T, F>,
    source: &dyn FrameSource,
    target: &Path,
    target_frame: usize,
    regions: &[Region],
    reference: &GrayImage,
) -> Vec<MatchOutcome> {
    let Some(frame) = read_frame(source, target, target_frame) else {
        log::warn!("Cannot read frame {} from {:?}", target_frame, target);
        return regions.iter().map(|_| MatchOutcome::cannot_read_video()).collect();
    };

    log::debug!(
        "Matching {} region(s) against {:?} frame {} ({}x{})",
        regions.len(),
        target,
        target_frame,
        frame.width(),
        frame.height()
    );
    regions
        .iter()
        .map(|region| matcher.match_region(region, reference, &frame))
        .collect()
}
