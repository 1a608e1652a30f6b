//! Target video resolution: directories, explicit files and glob patterns

use crate::error::{MatchError, MatchResult};
use crate::settings::has_settings;
use crate::video::FrameSource;
use std::path::{Component, Path, PathBuf};

/// Expand target arguments into video paths, in argument order.
///
/// Directories contribute their supported files sorted by name, existing
/// files are taken as given, anything else is a glob pattern whose file
/// matches are taken sorted. Duplicates are kept.
pub fn find_videos(source: &dyn FrameSource, targets: &[String]) -> MatchResult<Vec<PathBuf>> {
    let mut videos = Vec::new();
    for target in targets {
        let path = Path::new(target);
        if path.is_dir() {
            videos.extend(scan_directory(source, path)?);
        } else if path.is_file() {
            videos.push(absolute(path)?);
        } else {
            let found = expand_pattern(target)?;
            if found.is_empty() {
                log::warn!("No files match '{}'", target);
            }
            videos.extend(found);
        }
    }
    Ok(videos)
}

fn scan_directory(source: &dyn FrameSource, dir: &Path) -> MatchResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        if let Ok(entry) = entry
            && entry.path().is_file()
            && source.supports(&entry.path())
        {
            found.push(absolute(&entry.path())?);
        }
    }
    found.sort();
    log::debug!("{} video(s) in {:?}", found.len(), dir);
    Ok(found)
}

fn expand_pattern(pattern: &str) -> MatchResult<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|e| MatchError::InvalidPattern {
        pattern: pattern.to_string(),
        description: e.to_string(),
    })?;

    let mut found = Vec::new();
    for path in paths.flatten() {
        if path.is_file() {
            found.push(absolute(&path)?);
        }
    }
    found.sort();
    Ok(found)
}

/// Absolute form of `path` with `.` and `..` resolved lexically
pub fn absolute(path: &Path) -> MatchResult<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in std::path::absolute(path)?.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

/// Drop every entry that is the reference video itself
pub fn exclude_reference(videos: Vec<PathBuf>, reference: &Path) -> MatchResult<Vec<PathBuf>> {
    let reference = absolute(reference)?;
    let mut kept = Vec::with_capacity(videos.len());
    for video in videos {
        if absolute(&video)? != reference {
            kept.push(video);
        }
    }
    Ok(kept)
}

/// Split into (to process, skipped because a settings document already exists)
pub fn split_existing(videos: Vec<PathBuf>, overwrite: bool) -> (Vec<PathBuf>, Vec<PathBuf>) {
    if overwrite {
        return (videos, Vec::new());
    }
    videos.into_iter().partition(|video| !has_settings(video))
}
