//! Geometry and candidate types shared by the matchers
use image::GrayImage;
use std::fmt;

/// Axis-aligned rectangle in pixel coordinates (top-left + size)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Pixel position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Which matcher produced a candidate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchMethod {
    /// Dense normalized cross-correlation
    Template,
    /// Sparse keypoints + RANSAC homography
    Feature,
}

/// A single matcher attempt for one region against one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchCandidate {
    /// Top-left X in the target frame
    pub x: i32,
    /// Top-left Y in the target frame
    pub y: i32,
    /// Matcher confidence (0.0-1.0)
    pub confidence: f32,
    pub method: MatchMethod,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Same size, new top-left corner
    pub fn moved_to(&self, x: i32, y: i32) -> Self {
        Self { x, y, ..*self }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Cut this rectangle out of `frame`.
    ///
    /// Overhang on the right/bottom is clipped. Returns `None` when the
    /// top-left corner lies outside the frame or nothing remains.
    pub fn extract(&self, frame: &GrayImage) -> Option<GrayImage> {
        if self.x < 0 || self.y < 0 || self.is_empty() {
            return None;
        }
        let (x, y) = (self.x as u32, self.y as u32);
        if x >= frame.width() || y >= frame.height() {
            return None;
        }
        let width = self.width.min(frame.width() - x);
        let height = self.height.min(frame.height() - y);
        Some(image::imageops::crop_imm(frame, x, y, width, height).to_image())
    }
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset of this point from `origin`
    pub fn offset_from(&self, origin: Point) -> (i32, i32) {
        (self.x - origin.x, self.y - origin.y)
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMethod::Template => f.write_str("template"),
            MatchMethod::Feature => f.write_str("feature"),
        }
    }
}

impl MatchCandidate {
    pub fn new(x: i32, y: i32, confidence: f32, method: MatchMethod) -> Self {
        Self {
            x,
            y,
            confidence: confidence.clamp(0.0, 1.0),
            method,
        }
    }

    pub fn accepted(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_inside() {
        let frame = GrayImage::from_fn(20, 20, |x, y| image::Luma([(x + y) as u8]));
        let patch = Rect::new(5, 6, 4, 3).extract(&frame).unwrap();
        assert_eq!(patch.dimensions(), (4, 3));
        assert_eq!(patch.get_pixel(0, 0)[0], 11);
    }

    #[test]
    fn test_extract_clips_overhang() {
        let frame = GrayImage::new(20, 20);
        let patch = Rect::new(15, 18, 10, 10).extract(&frame).unwrap();
        assert_eq!(patch.dimensions(), (5, 2));
    }

    #[test]
    fn test_extract_outside_is_none() {
        let frame = GrayImage::new(20, 20);
        assert!(Rect::new(25, 0, 5, 5).extract(&frame).is_none());
        assert!(Rect::new(-1, 0, 5, 5).extract(&frame).is_none());
        assert!(Rect::new(0, 0, 0, 5).extract(&frame).is_none());
    }

    #[test]
    fn test_candidate_confidence_clamped() {
        let c = MatchCandidate::new(1, 2, 1.3, MatchMethod::Template);
        assert_eq!(c.confidence, 1.0);
        let c = MatchCandidate::new(1, 2, -0.4, MatchMethod::Feature);
        assert_eq!(c.confidence, 0.0);
        assert!(c.accepted(0.0));
    }

    #[test]
    fn test_point_offset_roundtrip() {
        let corner = Point::new(10, 10);
        let anchor = Point::new(35, 35);
        let (dx, dy) = anchor.offset_from(corner);
        assert_eq!(Point::new(110, 10).translated(dx, dy), Point::new(135, 35));
    }
}
