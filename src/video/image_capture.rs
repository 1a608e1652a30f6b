//! Frame source backed by the `image` crate.
//!
//! Animated GIFs are decoded completely on open and served from memory; any
//! other format `image` can read is exposed as a single-frame video.

use super::types::{FrameSource, VideoCapture};
use crate::error::{MatchError, MatchResult};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Frame rate used when a container carries no timing information
pub const DEFAULT_FPS: f64 = 30.0;

const EXTENSIONS: &[&str] = &["gif", "png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

/// All frames held in memory behind the sequential capture interface
pub struct MemoryCapture {
    frames: Vec<DynamicImage>,
    fps: f64,
    position: usize,
}

impl MemoryCapture {
    pub fn new(frames: Vec<DynamicImage>, fps: f64) -> Self {
        Self {
            frames,
            fps,
            position: 0,
        }
    }
}

impl VideoCapture for MemoryCapture {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_size(&self) -> (u32, u32) {
        self.frames
            .first()
            .map(|f| (f.width(), f.height()))
            .unwrap_or((0, 0))
    }

    fn seek(&mut self, frame_index: usize) {
        self.position = frame_index;
    }

    fn read(&mut self) -> Option<DynamicImage> {
        let frame = self.frames.get(self.position)?.clone();
        self.position += 1;
        Some(frame)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFrameSource;

impl ImageFrameSource {
    pub fn new() -> Self {
        Self
    }

    fn open_gif(path: &Path) -> MatchResult<MemoryCapture> {
        let open_err = |description: String| MatchError::VideoOpen {
            path: path.to_path_buf(),
            description,
        };
        let reader = BufReader::new(File::open(path).map_err(|e| open_err(e.to_string()))?);
        let decoder = GifDecoder::new(reader).map_err(|e| open_err(e.to_string()))?;
        let frames = decoder
            .into_frames()
            .collect_frames()
            .map_err(|e| open_err(e.to_string()))?;

        // Rate from the first frame's delay
        let fps = frames
            .first()
            .map(|f| f.delay().numer_denom_ms())
            .filter(|&(numer, denom)| numer > 0 && denom > 0)
            .map(|(numer, denom)| 1000.0 * denom as f64 / numer as f64)
            .unwrap_or(DEFAULT_FPS);

        let frames: Vec<DynamicImage> = frames
            .into_iter()
            .map(|f| DynamicImage::ImageRgba8(f.into_buffer()))
            .collect();
        log::debug!("Decoded {} GIF frames from {:?} ({:.2} fps)", frames.len(), path, fps);
        Ok(MemoryCapture::new(frames, fps))
    }

    fn open_still(path: &Path) -> MatchResult<MemoryCapture> {
        let image = image::open(path).map_err(|e| MatchError::VideoOpen {
            path: path.to_path_buf(),
            description: e.to_string(),
        })?;
        Ok(MemoryCapture::new(vec![image], DEFAULT_FPS))
    }
}

impl FrameSource for ImageFrameSource {
    fn open(&self, path: &Path) -> MatchResult<Box<dyn VideoCapture>> {
        let is_gif = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gif"));

        let capture = if is_gif {
            Self::open_gif(path)?
        } else {
            Self::open_still(path)?
        };
        Ok(Box::new(capture))
    }

    fn extensions(&self) -> &[&str] {
        EXTENSIONS
    }
}
