use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for region matching operations.
pub type MatchResult<T> = Result<T, MatchError>;

/// The error type for region matching and batch operations.
///
/// Per-region "no match" outcomes are not errors; they are reported through
/// [`crate::correspondence::MatchOutcome`]. These variants cover input
/// problems, degenerate matcher input and persistence failures.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Reference video not found: {path:?}")]
    ReferenceNotFound { path: PathBuf },

    #[error("No settings file for reference video: {path:?}")]
    ReferenceSettingsNotFound { path: PathBuf },

    #[error("Failed to parse settings {path:?}: {source}")]
    SettingsParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("No objects defined in reference settings.")]
    NoRegions,

    #[error("Cannot read frame {frame} from {path:?}")]
    ReferenceFrameUnreadable { path: PathBuf, frame: usize },

    #[error("No target videos found.")]
    NoTargets,

    #[error("Template is empty ({width}x{height})")]
    EmptyTemplate { width: u32, height: u32 },

    #[error("Template {template_w}x{template_h} is larger than frame {frame_w}x{frame_h}")]
    TemplateTooLarge {
        template_w: u32,
        template_h: u32,
        frame_w: u32,
        frame_h: u32,
    },

    #[error("Cannot open video {path:?}: {description}")]
    VideoOpen { path: PathBuf, description: String },

    #[error("Failed to write settings {path:?}: {source}")]
    SettingsWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid target pattern '{pattern}': {description}")]
    InvalidPattern { pattern: String, description: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl MatchError {
    /// True for failures that happen before any target is processed.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MatchError::ReferenceNotFound { .. }
                | MatchError::ReferenceSettingsNotFound { .. }
                | MatchError::SettingsParse { .. }
                | MatchError::NoRegions
                | MatchError::ReferenceFrameUnreadable { .. }
                | MatchError::NoTargets
                | MatchError::InvalidPattern { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_classification() {
        assert!(MatchError::NoRegions.is_input_error());
        assert!(MatchError::NoTargets.is_input_error());
        let write_err = MatchError::SettingsWrite {
            path: PathBuf::from("a.gif.motiontracker.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!write_err.is_input_error());
    }

    #[test]
    fn test_error_messages() {
        let err = MatchError::ReferenceFrameUnreadable {
            path: PathBuf::from("ref.gif"),
            frame: 7,
        };
        assert_eq!(err.to_string(), "Cannot read frame 7 from \"ref.gif\"");
    }
}
