// In-memory frame source for tests, with open-call instrumentation
use super::image_capture::{DEFAULT_FPS, MemoryCapture};
use super::types::{FrameSource, VideoCapture};
use crate::error::{MatchError, MatchResult};
use image::{DynamicImage, GrayImage};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Default)]
pub struct StaticFrameSource {
    videos: HashMap<PathBuf, Vec<GrayImage>>,
    opened: RefCell<Vec<PathBuf>>,
}

impl StaticFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video(mut self, path: impl Into<PathBuf>, frames: Vec<GrayImage>) -> Self {
        self.videos.insert(path.into(), frames);
        self
    }

    /// Paths passed to `open`, in call order
    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.borrow().clone()
    }
}

impl FrameSource for StaticFrameSource {
    fn open(&self, path: &Path) -> MatchResult<Box<dyn VideoCapture>> {
        self.opened.borrow_mut().push(path.to_path_buf());
        let frames = self
            .videos
            .get(path)
            .ok_or_else(|| MatchError::VideoOpen {
                path: path.to_path_buf(),
                description: "not registered".to_string(),
            })?
            .iter()
            .cloned()
            .map(DynamicImage::ImageLuma8)
            .collect();
        Ok(Box::new(MemoryCapture::new(frames, DEFAULT_FPS)))
    }

    fn extensions(&self) -> &[&str] {
        &["gif", "mp4"]
    }
}
