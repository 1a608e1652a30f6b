//! Region matching decision policy.
//!
//! Dense correlation runs first and short-circuits on acceptance; the sparse
//! feature path is only consulted when correlation falls below threshold.

use crate::config::{MatchConfig, MatchMode};
use crate::feature_matching::{FeatureMatcher, SparseMatcher};
use crate::template_matching::{
    DenseMatcher, MatchCandidate, MatchMethod, Point, Rect, TemplateMatcher,
};
use image::GrayImage;
use std::fmt;

/// Named rectangle with an optional anchor point, in reference-frame pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub rect: Rect,
    pub anchor: Option<Point>,
}

impl Region {
    pub fn new(name: impl Into<String>, rect: Rect, anchor: Option<Point>) -> Self {
        Self {
            name: name.into(),
            rect,
            anchor,
        }
    }

    /// Same region moved so its top-left sits at `(x, y)`. Size is kept and the
    /// anchor keeps its offset from the corner.
    pub fn relocated(&self, x: i32, y: i32) -> Self {
        let rect = self.rect.moved_to(x, y);
        let anchor = self.anchor.map(|p| {
            let (dx, dy) = p.offset_from(self.rect.top_left());
            rect.top_left().translated(dx, dy)
        });
        Self {
            name: self.name.clone(),
            rect,
            anchor,
        }
    }
}

/// Why a region has no match, when there is something to say
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    CannotReadVideo,
    BelowThreshold(MatchMethod),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::CannotReadVideo => write!(f, "cannot read video"),
            Diagnostic::BelowThreshold(method) => write!(f, "{method} (below threshold)"),
        }
    }
}

/// Exactly one per region per target
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Matched {
        region: Region,
        confidence: f32,
        method: MatchMethod,
    },
    NoMatch {
        confidence: f32,
        diagnostic: Option<Diagnostic>,
    },
}

impl MatchOutcome {
    pub fn unmatched() -> Self {
        MatchOutcome::NoMatch {
            confidence: 0.0,
            diagnostic: None,
        }
    }

    pub fn cannot_read_video() -> Self {
        MatchOutcome::NoMatch {
            confidence: 0.0,
            diagnostic: Some(Diagnostic::CannotReadVideo),
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, MatchOutcome::Matched { .. })
    }

    pub fn confidence(&self) -> f32 {
        match self {
            MatchOutcome::Matched { confidence, .. } | MatchOutcome::NoMatch { confidence, .. } => {
                *confidence
            }
        }
    }

    /// Method tag as reported to the operator
    pub fn label(&self) -> Option<String> {
        match self {
            MatchOutcome::Matched { method, .. } => Some(method.to_string()),
            MatchOutcome::NoMatch { diagnostic, .. } => diagnostic.map(|d| d.to_string()),
        }
    }

    pub fn matched_region(&self) -> Option<&Region> {
        match self {
            MatchOutcome::Matched { region, .. } => Some(region),
            MatchOutcome::NoMatch { .. } => None,
        }
    }
}

/// Applies mode and threshold over a dense and a sparse matcher
pub struct RegionMatcher<T = TemplateMatcher, F = FeatureMatcher> {
    template: T,
    feature: F,
    mode: MatchMode,
    threshold: f32,
}

impl RegionMatcher {
    pub fn from_config(config: &MatchConfig) -> Self {
        Self::with_matchers(
            TemplateMatcher::new(),
            FeatureMatcher::new(config.feature.clone()),
            config.mode,
            config.threshold,
        )
    }
}

impl<T: DenseMatcher, F: SparseMatcher> RegionMatcher<T, F> {
    pub fn with_matchers(template: T, feature: F, mode: MatchMode, threshold: f32) -> Self {
        Self {
            template,
            feature,
            mode,
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Locate `region` (cut from `reference`) in `target`
    pub fn match_region(&self, region: &Region, reference: &GrayImage, target: &GrayImage) -> MatchOutcome {
        let Some(patch) = region.rect.extract(reference) else {
            log::debug!("Region '{}' {:?} lies outside the reference frame", region.name, region.rect);
            return MatchOutcome::unmatched();
        };

        let mut template_confidence = None;
        if self.mode.uses_template() {
            match self.template.best_match(&patch, target) {
                Ok(candidate) if candidate.accepted(self.threshold) => {
                    return self.accept(region, candidate);
                }
                Ok(candidate) => {
                    log::debug!(
                        "Region '{}': template conf {:.3} below {:.3}",
                        region.name,
                        candidate.confidence,
                        self.threshold
                    );
                    template_confidence = Some(candidate.confidence);
                }
                Err(e) => log::debug!("Region '{}': template matching failed: {}", region.name, e),
            }
        }

        if self.mode.uses_feature() {
            match self.feature.locate(&patch, target) {
                Some(candidate) if candidate.accepted(self.threshold) => {
                    return self.accept(region, candidate);
                }
                Some(candidate) => log::debug!(
                    "Region '{}': feature conf {:.3} below {:.3}",
                    region.name,
                    candidate.confidence,
                    self.threshold
                ),
                None => log::debug!("Region '{}': no feature result", region.name),
            }
        }

        // Report the template score whenever it was computed, even if the
        // feature path was the last one tried
        match template_confidence {
            Some(confidence) => MatchOutcome::NoMatch {
                confidence,
                diagnostic: Some(Diagnostic::BelowThreshold(MatchMethod::Template)),
            },
            None => MatchOutcome::unmatched(),
        }
    }

    fn accept(&self, region: &Region, candidate: MatchCandidate) -> MatchOutcome {
        MatchOutcome::Matched {
            region: region.relocated(candidate.x, candidate.y),
            confidence: candidate.confidence,
            method: candidate.method,
        }
    }
}
