// Frame access module - decoders behind a capture interface
// The matching engine only ever asks for one decoded frame per video, so
// decoders stay swappable and tests can run on synthetic frames.

pub mod image_capture;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use image_capture::{DEFAULT_FPS, ImageFrameSource, MemoryCapture};
pub use types::{FrameSource, VideoCapture, read_frame};
