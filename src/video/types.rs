// Frame access capability traits
use crate::error::MatchResult;
use image::{DynamicImage, GrayImage};
use std::path::Path;

/// An opened, frame-addressable video.
///
/// Mirrors a capture handle: seek to an index, then read sequentially.
/// Dropping the handle releases it.
pub trait VideoCapture {
    fn frame_count(&self) -> usize;
    fn fps(&self) -> f64;
    /// (width, height) of decoded frames
    fn frame_size(&self) -> (u32, u32);
    /// Position the next `read` at `frame_index`
    fn seek(&mut self, frame_index: usize);
    /// Next frame, or `None` at end of stream
    fn read(&mut self) -> Option<DynamicImage>;
}

/// Opens videos for frame access (decoder backends implement this)
pub trait FrameSource {
    fn open(&self, path: &Path) -> MatchResult<Box<dyn VideoCapture>>;

    /// Lowercase file extensions this source can open, used for directory expansion
    fn extensions(&self) -> &[&str];

    fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions().iter().any(|known| *known == ext)
            })
            .unwrap_or(false)
    }
}

/// Open `path`, fetch one frame as grayscale, release.
///
/// Any failure (open, seek past end, decode) yields `None`.
pub fn read_frame(source: &dyn FrameSource, path: &Path, frame_index: usize) -> Option<GrayImage> {
    let mut capture = match source.open(path) {
        Ok(capture) => capture,
        Err(e) => {
            log::debug!("Cannot open {:?}: {}", path, e);
            return None;
        }
    };
    capture.seek(frame_index);
    let frame = capture.read();
    drop(capture);

    if frame.is_none() {
        log::debug!("No frame {} in {:?}", frame_index, path);
    }
    frame.map(|f| f.to_luma8())
}
