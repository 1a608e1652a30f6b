//! Batch orchestration: reference setup, per-target matching, persistence
//! and the run summary.

use super::report::Report;
use super::resolve::{absolute, exclude_reference, find_videos, split_existing};
use crate::config::MatchConfig;
use crate::correspondence::{MatchOutcome, RegionMatcher, match_video};
use crate::error::{MatchError, MatchResult};
use crate::settings::{SettingsDocument, load_settings, save_settings, settings_path};
use crate::video::{FrameSource, read_frame};
use std::io::Write;
use std::path::{Path, PathBuf};

/// What to match and where results go
#[derive(Debug, Clone, Default)]
pub struct MatchOptions {
    pub reference: PathBuf,
    /// Files, directories or glob patterns; empty means the reference's directory
    pub targets: Vec<String>,
    /// Reference frame index
    pub frame: usize,
    pub target_frame: usize,
    pub dry_run: bool,
    pub overwrite: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    FullyMatched,
    Partial,
    Failed,
}

impl TargetStatus {
    pub fn classify(outcomes: &[MatchOutcome]) -> Self {
        let matched = outcomes.iter().filter(|o| o.is_matched()).count();
        if matched == 0 {
            TargetStatus::Failed
        } else if matched == outcomes.len() {
            TargetStatus::FullyMatched
        } else {
            TargetStatus::Partial
        }
    }
}

#[derive(Debug, Clone)]
pub struct TargetReport {
    pub video: PathBuf,
    pub outcomes: Vec<MatchOutcome>,
    pub status: TargetStatus,
    /// Settings document written for this target, if any
    pub written: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub targets: Vec<TargetReport>,
    /// Targets left alone because they already had settings
    pub skipped: Vec<PathBuf>,
}

impl BatchSummary {
    fn count(&self, status: TargetStatus) -> usize {
        self.targets.iter().filter(|t| t.status == status).count()
    }

    pub fn fully_matched(&self) -> usize {
        self.count(TargetStatus::FullyMatched)
    }

    pub fn partial(&self) -> usize {
        self.count(TargetStatus::Partial)
    }

    pub fn failed(&self) -> usize {
        self.count(TargetStatus::Failed)
    }

    pub fn written(&self) -> Vec<&Path> {
        self.targets.iter().filter_map(|t| t.written.as_deref()).collect()
    }

    /// The run succeeds when no target ended with zero matches
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Match the reference's regions into every resolved target.
///
/// Input problems abort before any target is touched. A settings write
/// failure aborts the remaining batch.
pub fn run_match<W: Write>(
    options: &MatchOptions,
    config: &MatchConfig,
    source: &dyn FrameSource,
    report: &mut Report<W>,
) -> MatchResult<BatchSummary> {
    let reference = absolute(&options.reference)?;
    if !reference.is_file() {
        return Err(MatchError::ReferenceNotFound { path: reference });
    }

    let reference_settings = settings_path(&reference);
    if !reference_settings.is_file() {
        return Err(MatchError::ReferenceSettingsNotFound {
            path: reference_settings,
        });
    }
    let document = load_settings(&reference_settings)?;
    if document.objects.is_empty() {
        return Err(MatchError::NoRegions);
    }

    let reference_frame =
        read_frame(source, &reference, options.frame).ok_or_else(|| MatchError::ReferenceFrameUnreadable {
            path: reference.clone(),
            frame: options.frame,
        })?;

    let targets = if options.targets.is_empty() {
        let dir = reference.parent().unwrap_or(Path::new("."));
        find_videos(source, &[dir.to_string_lossy().into_owned()])?
    } else {
        find_videos(source, &options.targets)?
    };
    let targets = exclude_reference(targets, &reference)?;
    if targets.is_empty() {
        return Err(MatchError::NoTargets);
    }

    let (targets, skipped) = split_existing(targets, options.overwrite);
    let mut summary = BatchSummary {
        targets: Vec::with_capacity(targets.len()),
        skipped,
    };
    if !summary.skipped.is_empty() {
        report.skipped(summary.skipped.len())?;
    }
    if targets.is_empty() {
        report.nothing_to_process()?;
        return Ok(summary);
    }

    let matcher = RegionMatcher::from_config(config);
    let names: Vec<&str> = document.objects.iter().map(|o| o.name.as_str()).collect();
    report.banner(
        &reference,
        options.frame,
        &names,
        matcher.mode(),
        matcher.threshold(),
        targets.len(),
        options.dry_run,
    )?;

    let regions = document.regions();

    for (index, video) in targets.iter().enumerate() {
        report.target(index + 1, targets.len(), video)?;
        log::info!("Matching {} region(s) in {:?}", regions.len(), video);

        let outcomes = match_video(
            &matcher,
            source,
            video,
            options.target_frame,
            &regions,
            &reference_frame,
        );

        let mut matched = Vec::new();
        for (record, outcome) in document.objects.iter().zip(&outcomes) {
            report.region(&record.name, outcome)?;
            if let Some(region) = outcome.matched_region() {
                matched.push(record.relocated(region));
            }
        }

        let status = TargetStatus::classify(&outcomes);
        let mut written = None;
        if !matched.is_empty() && !options.dry_run {
            let path = settings_path(video);
            save_settings(&path, &SettingsDocument::for_target(&document, matched))?;
            report.wrote(&path)?;
            written = Some(path);
        }
        if status == TargetStatus::Failed {
            log::warn!("No region matched in {:?}", video);
        }
        report.end_target()?;

        summary.targets.push(TargetReport {
            video: video.clone(),
            outcomes,
            status,
            written,
        });
    }

    report.summary(&summary)?;
    Ok(summary)
}
