// Human-facing run report, written to stdout by the binary
use super::orchestrator::BatchSummary;
use crate::config::MatchMode;
use crate::correspondence::MatchOutcome;
use std::io::{self, Write};
use std::path::Path;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub struct Report<W: Write> {
    out: W,
}

impl<W: Write> Report<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn skipped(&mut self, count: usize) -> io::Result<()> {
        writeln!(
            self.out,
            "Skipping {count} video(s) with existing settings (use --overwrite to replace)"
        )
    }

    pub fn nothing_to_process(&mut self) -> io::Result<()> {
        writeln!(self.out, "No videos to process.")
    }

    #[allow(clippy::too_many_arguments)]
    pub fn banner(
        &mut self,
        reference: &Path,
        frame: usize,
        region_names: &[&str],
        mode: MatchMode,
        threshold: f32,
        targets: usize,
        dry_run: bool,
    ) -> io::Result<()> {
        writeln!(self.out, "MotionTracker Region Matching")?;
        writeln!(self.out, "==============================")?;
        writeln!(self.out, "Reference: {} (frame {frame})", file_name(reference))?;
        writeln!(self.out, "Objects:   {}", region_names.join(", "))?;
        writeln!(self.out, "Method:    {mode} (threshold: {threshold})")?;
        writeln!(self.out, "Targets:   {targets} video(s)")?;
        if dry_run {
            writeln!(self.out, "Mode:      DRY RUN (no files written)")?;
        }
        writeln!(self.out)
    }

    pub fn target(&mut self, index: usize, total: usize, video: &Path) -> io::Result<()> {
        writeln!(self.out, "[{index}/{total}] {}", file_name(video))
    }

    pub fn region(&mut self, name: &str, outcome: &MatchOutcome) -> io::Result<()> {
        match outcome {
            MatchOutcome::Matched {
                region,
                confidence,
                method,
            } => writeln!(
                self.out,
                "  {name}: matched at ({}, {}) conf={confidence:.3} [{method}]",
                region.rect.x, region.rect.y
            ),
            MatchOutcome::NoMatch { confidence, .. } => {
                write!(self.out, "  {name}: NO MATCH conf={confidence:.3}")?;
                if let Some(label) = outcome.label() {
                    write!(self.out, " [{label}]")?;
                }
                writeln!(self.out)
            }
        }
    }

    pub fn wrote(&mut self, path: &Path) -> io::Result<()> {
        writeln!(self.out, "  -> wrote {}", file_name(path))
    }

    pub fn end_target(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    pub fn summary(&mut self, summary: &BatchSummary) -> io::Result<()> {
        writeln!(
            self.out,
            "Summary: {} fully matched, {} partial, {} failed (out of {})",
            summary.fully_matched(),
            summary.partial(),
            summary.failed(),
            summary.targets.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correspondence::{Diagnostic, Region};
    use crate::template_matching::{MatchMethod, Rect};

    fn text(report: Report<Vec<u8>>) -> String {
        String::from_utf8(report.into_inner()).unwrap()
    }

    #[test]
    fn test_region_lines() {
        let mut report = Report::new(Vec::new());
        let matched = MatchOutcome::Matched {
            region: Region::new("marker", Rect::new(110, 10, 50, 50), None),
            confidence: 0.92,
            method: MatchMethod::Template,
        };
        let below = MatchOutcome::NoMatch {
            confidence: 0.4,
            diagnostic: Some(Diagnostic::BelowThreshold(MatchMethod::Template)),
        };
        report.region("marker", &matched).unwrap();
        report.region("tip", &below).unwrap();
        report.region("gone", &MatchOutcome::unmatched()).unwrap();

        assert_eq!(
            text(report),
            "  marker: matched at (110, 10) conf=0.920 [template]\n\
             \x20 tip: NO MATCH conf=0.400 [template (below threshold)]\n\
             \x20 gone: NO MATCH conf=0.000\n"
        );
    }

    #[test]
    fn test_banner_dry_run() {
        let mut report = Report::new(Vec::new());
        report
            .banner(Path::new("/v/ref.gif"), 3, &["a", "b"], MatchMode::Auto, 0.7, 2, true)
            .unwrap();
        let out = text(report);
        assert!(out.contains("Reference: ref.gif (frame 3)\n"));
        assert!(out.contains("Objects:   a, b\n"));
        assert!(out.contains("Method:    auto (threshold: 0.7)\n"));
        assert!(out.contains("Targets:   2 video(s)\n"));
        assert!(out.contains("DRY RUN"));
    }
}
