// Settings document persistence next to each video
use super::types::SettingsDocument;
use crate::error::{MatchError, MatchResult};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix appended to the full video file name
pub const SETTINGS_EXTENSION: &str = "motiontracker.json";

/// `<video_path>.motiontracker.json`
pub fn settings_path(video: &Path) -> PathBuf {
    let mut name = OsString::from(video.as_os_str());
    name.push(".");
    name.push(SETTINGS_EXTENSION);
    PathBuf::from(name)
}

pub fn has_settings(video: &Path) -> bool {
    settings_path(video).is_file()
}

pub fn load_settings(path: &Path) -> MatchResult<SettingsDocument> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| MatchError::SettingsParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `document` as pretty JSON, replacing any existing file
pub fn save_settings(path: &Path, document: &SettingsDocument) -> MatchResult<()> {
    let write_err = |source: std::io::Error| MatchError::SettingsWrite {
        path: path.to_path_buf(),
        source,
    };
    let text = serde_json::to_string_pretty(document).map_err(|e| write_err(e.into()))?;
    fs::write(path, text).map_err(write_err)?;
    log::debug!("Saved {} object(s) to {:?}", document.objects.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::RegionRecord;
    use crate::template_matching::{Point, Rect};
    use serde_json::json;

    #[test]
    fn test_settings_path_appends_extension() {
        assert_eq!(
            settings_path(Path::new("/data/run 1/clip.gif")),
            PathBuf::from("/data/run 1/clip.gif.motiontracker.json")
        );
        assert_eq!(settings_path(Path::new("noext")), PathBuf::from("noext.motiontracker.json"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.gif");
        let path = settings_path(&video);
        assert!(!has_settings(&video));

        let mut record = RegionRecord::new("marker", Rect::new(4, 5, 6, 7), Some(Point::new(6, 8)));
        record.extra.insert("track".to_string(), json!({"kind": "csrt"}));
        let document = SettingsDocument {
            version: 1,
            objects: vec![record],
            ruler: Some(json!({"mm": 2.5})),
            section: None,
            roi: None,
        };
        save_settings(&path, &document).unwrap();

        assert!(has_settings(&video));
        assert_eq!(load_settings(&path).unwrap(), document);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"objects\""), "pretty printed with two-space indent");
        assert!(!text.contains("section"));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.motiontracker.json");
        fs::write(&path, "{\"objects\": [").unwrap();

        let err = load_settings(&path).unwrap_err();
        assert!(matches!(err, MatchError::SettingsParse { .. }));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("x.motiontracker.json");
        let document = SettingsDocument {
            version: 1,
            objects: Vec::new(),
            ruler: None,
            section: None,
            roi: None,
        };

        let err = save_settings(&path, &document).unwrap_err();
        assert!(matches!(err, MatchError::SettingsWrite { .. }));
        assert!(!err.is_input_error());
    }
}
