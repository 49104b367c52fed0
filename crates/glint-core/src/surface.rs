//! Render-surface contract.
//!
//! The engine emits an ordered stream of draw commands (tinted sprites with
//! centered destination rects, plus trail line segments) consumed through
//! the [`Painter`] trait by a platform-specific painter. The core never
//! touches a graphics API; standard alpha compositing over whatever is
//! already on the surface is assumed, nothing more.

use glam::Vec2;
use image::RgbaImage;

use crate::trail::TrailSegment;

/// Axis-aligned destination rectangle in overlay pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub w: f32,
    /// Height.
    pub h: f32,
}

impl Rect {
    /// Builds a rect of the given size centered on `center`.
    #[must_use]
    pub fn centered_at(center: Vec2, w: f32, h: f32) -> Self {
        Self {
            x: center.x - w / 2.0,
            y: center.y - h / 2.0,
            w,
            h,
        }
    }

    /// Center point of the rect.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// One tinted, sized, possibly rotated sprite ready to draw.
#[derive(Debug, Clone)]
pub struct Sprite {
    /// Composited pixels.
    pub image: RgbaImage,
    /// Where to place them.
    pub dest: Rect,
}

/// Everything one effect instance draws this frame.
#[derive(Debug, Clone, Default)]
pub struct RenderFrame {
    /// Sprites in sub-particle order.
    pub sprites: Vec<Sprite>,
}

impl RenderFrame {
    /// Whether nothing is visible this frame.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

/// Consumes the engine's draw commands.
///
/// Commands arrive back-to-front: older effects first, trail segments last.
pub trait Painter {
    /// Marks the start of a frame. Optional for painters without frame state.
    fn begin_frame(&mut self) {}

    /// Draws a sprite at its destination rect.
    fn sprite(&mut self, image: &RgbaImage, dest: Rect);

    /// Draws a trail line segment.
    fn segment(&mut self, segment: &TrailSegment);
}

/// Test painter that records the command stream.
#[derive(Debug, Default)]
pub struct RecordingPainter {
    /// Frames begun so far.
    pub frames: usize,
    /// Destination rect and pixel dimensions per sprite, in draw order.
    pub sprites: Vec<(Rect, u32, u32)>,
    /// Trail segments in draw order.
    pub segments: Vec<TrailSegment>,
}

impl RecordingPainter {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Painter for RecordingPainter {
    fn begin_frame(&mut self) {
        self.frames += 1;
        self.sprites.clear();
        self.segments.clear();
    }

    fn sprite(&mut self, image: &RgbaImage, dest: Rect) {
        self.sprites.push((dest, image.width(), image.height()));
    }

    fn segment(&mut self, segment: &TrailSegment) {
        self.segments.push(*segment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_centered_round_trip() {
        let rect = Rect::centered_at(Vec2::new(100.0, 50.0), 20.0, 10.0);
        assert_eq!(rect.x, 90.0);
        assert_eq!(rect.y, 45.0);
        let center = rect.center();
        assert!((center.x - 100.0).abs() < 1e-6);
        assert!((center.y - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_recording_painter_resets_per_frame() {
        let mut painter = RecordingPainter::new();
        painter.begin_frame();
        painter.sprite(&RgbaImage::new(2, 2), Rect::centered_at(Vec2::ZERO, 2.0, 2.0));
        assert_eq!(painter.sprites.len(), 1);
        painter.begin_frame();
        assert_eq!(painter.frames, 2);
        assert!(painter.sprites.is_empty());
    }
}
