use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use region_match::MatchConfig;
use region_match::batch::MatchOptions;
use region_match::config::MatchMode;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "region-match")]
#[command(about = "Find a reference video's tracking regions in other videos")]
#[command(version = env!("REGION_MATCH_VERSION_DISPLAY"))]
#[command(after_help = concat!("(c) ", env!("REGION_MATCH_BUILD_YEAR"), " Vigor Solutions"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Match reference regions into target videos and write their settings
    Match(MatchArgs),

    /// Print frame count, fps and frame size of a video
    Info {
        video: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Method {
    Template,
    Feature,
    Auto,
}

impl From<Method> for MatchMode {
    fn from(method: Method) -> Self {
        match method {
            Method::Template => MatchMode::Template,
            Method::Feature => MatchMode::Feature,
            Method::Auto => MatchMode::Auto,
        }
    }
}

#[derive(Debug, Clone, ClapArgs)]
pub struct MatchArgs {
    /// Reference video with an existing settings file
    pub reference: PathBuf,

    /// Target videos, directories or glob patterns (default: reference's directory)
    pub targets: Vec<String>,

    /// Reference frame index
    #[arg(long, default_value_t = 0)]
    pub frame: usize,

    /// Frame index to match in each target
    #[arg(long, default_value_t = 0)]
    pub target_frame: usize,

    #[arg(long, value_enum, default_value_t = Method::Auto)]
    pub method: Method,

    /// Minimum confidence to accept a match (0-1)
    #[arg(long, default_value_t = 0.7, value_parser = parse_threshold)]
    pub threshold: f32,

    /// Show results without writing settings files
    #[arg(long)]
    pub dry_run: bool,

    /// Replace settings files that already exist
    #[arg(long)]
    pub overwrite: bool,

    /// Keypoint cap per image for feature matching
    #[arg(long, default_value_t = 500)]
    pub max_features: usize,

    /// RANSAC inlier distance in pixels
    #[arg(long, default_value_t = 5.0)]
    pub ransac_threshold: f64,
}

fn parse_threshold(raw: &str) -> Result<f32, String> {
    let value: f32 = raw.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0..=1"))
    }
}

impl MatchArgs {
    pub fn options(&self) -> MatchOptions {
        MatchOptions {
            reference: self.reference.clone(),
            targets: self.targets.clone(),
            frame: self.frame,
            target_frame: self.target_frame,
            dry_run: self.dry_run,
            overwrite: self.overwrite,
        }
    }

    pub fn config(&self) -> MatchConfig {
        let mut config = MatchConfig::default()
            .with_mode(self.method.into())
            .with_threshold(self.threshold);
        config.feature.max_features = self.max_features;
        config.feature.ransac.inlier_threshold = self.ransac_threshold;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_defaults() {
        let args = Args::try_parse_from(["region-match", "match", "ref.gif"]).unwrap();
        let Command::Match(m) = args.command else {
            panic!("expected match subcommand");
        };
        assert!(m.targets.is_empty());
        assert_eq!(m.method, Method::Auto);
        let config = m.config();
        assert_eq!(config.mode, MatchMode::Auto);
        assert_eq!(config.threshold, 0.7);
        assert_eq!(config.feature.max_features, 500);
        assert!(!args.debug);
    }

    #[test]
    fn test_match_flags() {
        let args = Args::try_parse_from([
            "region-match",
            "match",
            "ref.gif",
            "a.gif",
            "clips/",
            "--frame",
            "3",
            "--target-frame",
            "5",
            "--method",
            "feature",
            "--threshold",
            "0.55",
            "--dry-run",
            "--max-features",
            "200",
            "--ransac-threshold",
            "3.5",
            "--debug",
        ])
        .unwrap();
        assert!(args.debug);
        let Command::Match(m) = args.command else {
            panic!("expected match subcommand");
        };
        let options = m.options();
        assert_eq!(options.targets, vec!["a.gif".to_string(), "clips/".to_string()]);
        assert_eq!((options.frame, options.target_frame), (3, 5));
        assert!(options.dry_run && !options.overwrite);

        let config = m.config();
        assert_eq!(config.mode, MatchMode::Feature);
        assert_eq!(config.threshold, 0.55);
        assert_eq!(config.feature.max_features, 200);
        assert_eq!(config.feature.ransac.inlier_threshold, 3.5);
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        assert!(Args::try_parse_from(["region-match", "match", "r.gif", "--threshold", "1.5"]).is_err());
        assert!(Args::try_parse_from(["region-match", "match", "r.gif", "--threshold", "x"]).is_err());
    }

    #[test]
    fn test_info_subcommand() {
        let args = Args::try_parse_from(["region-match", "info", "clip.gif"]).unwrap();
        assert!(matches!(args.command, Command::Info { video } if video == PathBuf::from("clip.gif")));
    }
}
