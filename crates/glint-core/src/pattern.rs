//! Grayscale source patterns and per-frame recoloring.
//!
//! Every effect kind draws a grayscale "pattern" (ring, spark triangle,
//! trail strip). Each frame the pattern is tinted by the kind's color curve:
//! `rgb_out = target_rgb * gray / 255` per channel, with the output alpha
//! either derived from the gray level (`alpha * gray / 255`) or copied from
//! the source's own alpha channel when the art is pre-masked.
//!
//! Patterns are loaded once at startup by the host; the procedural builders
//! here let tests and the headless demo run without image files on disk.

use std::collections::HashMap;
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Identifies a grayscale source pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternId {
    /// Soft ring used by the press ripple.
    Circle,
    /// Spark triangle.
    Triangle,
    /// Vertically flipped spark triangle.
    TriangleFlipped,
    /// Horizontal trail strip.
    TrailStrip,
}

impl PatternId {
    /// All pattern ids, in registration order.
    pub const ALL: [Self; 4] = [
        Self::Circle,
        Self::Triangle,
        Self::TriangleFlipped,
        Self::TrailStrip,
    ];
}

/// A grayscale source pattern with an alpha channel.
///
/// The gray level is read from the green channel, which matches how the
/// source art encodes intensity across all its channels.
#[derive(Debug, Clone)]
pub struct Pattern {
    image: RgbaImage,
}

impl Pattern {
    /// Wraps decoded source art.
    #[must_use]
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Source width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Source height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Returns a vertically flipped copy.
    #[must_use]
    pub fn flipped_vertical(&self) -> Self {
        Self {
            image: imageops::flip_vertical(&self.image),
        }
    }

    /// Returns a copy resized with bilinear filtering.
    #[must_use]
    pub fn resized(&self, width: u32, height: u32) -> Self {
        Self {
            image: imageops::resize(&self.image, width.max(1), height.max(1), FilterType::Triangle),
        }
    }

    /// Tints the pattern with `rgb` and `alpha`.
    ///
    /// When `preserve_source_alpha` is set the source's own alpha channel is
    /// kept (pre-masked art); otherwise the output alpha is scaled by the
    /// gray level so dark pattern regions stay transparent.
    #[must_use]
    pub fn recolor(&self, rgb: [u8; 3], alpha: u8, preserve_source_alpha: bool) -> RgbaImage {
        let mut out = RgbaImage::new(self.image.width(), self.image.height());
        for (src, dst) in self.image.pixels().zip(out.pixels_mut()) {
            let gray = u32::from(src.0[1]);
            let a = if preserve_source_alpha {
                src.0[3]
            } else {
                (u32::from(alpha) * gray / 255) as u8
            };
            *dst = Rgba([
                (u32::from(rgb[0]) * gray / 255) as u8,
                (u32::from(rgb[1]) * gray / 255) as u8,
                (u32::from(rgb[2]) * gray / 255) as u8,
                a,
            ]);
        }
        out
    }
}

/// Registry of loaded patterns keyed by [`PatternId`].
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: HashMap<PatternId, Arc<Pattern>>,
}

impl PatternSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a pattern.
    pub fn insert(&mut self, id: PatternId, pattern: Pattern) {
        self.patterns.insert(id, Arc::new(pattern));
    }

    /// Looks up a pattern.
    #[must_use]
    pub fn get(&self, id: PatternId) -> Option<Arc<Pattern>> {
        self.patterns.get(&id).cloned()
    }

    /// Whether every id in `ids` is present.
    #[must_use]
    pub fn contains_all(&self, ids: &[PatternId]) -> bool {
        ids.iter().all(|id| self.patterns.contains_key(id))
    }

    /// Builds the full set from procedural art (no files required).
    #[must_use]
    pub fn procedural(size: u32) -> Self {
        let mut set = Self::new();
        let triangle = procedural_triangle(size);
        set.insert(PatternId::Circle, procedural_ring(size));
        set.insert(PatternId::TriangleFlipped, triangle.flipped_vertical());
        set.insert(PatternId::Triangle, triangle);
        set.insert(PatternId::TrailStrip, procedural_trail_strip(size, size / 16));
        set
    }
}

fn gray_pixel(gray: u8, alpha: u8) -> Rgba<u8> {
    Rgba([gray, gray, gray, alpha])
}

/// Soft annulus centered in a square canvas.
fn procedural_ring(size: u32) -> Pattern {
    let size = size.max(4);
    let mut image = RgbaImage::new(size, size);
    let center = size as f32 / 2.0;
    let radius = center * 0.7;
    let thickness = center * 0.25;
    for (x, y, px) in image.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - center;
        let dy = y as f32 + 0.5 - center;
        let dist = (dx * dx + dy * dy).sqrt();
        let band = 1.0 - ((dist - radius).abs() / thickness).min(1.0);
        let gray = (band * 255.0).round() as u8;
        *px = gray_pixel(gray, 255);
    }
    Pattern::from_image(image)
}

/// Filled upward triangle with its own alpha mask (pre-masked art).
fn procedural_triangle(size: u32) -> Pattern {
    let size = size.max(4);
    let mut image = RgbaImage::new(size, size);
    let s = size as f32;
    for (x, y, px) in image.enumerate_pixels_mut() {
        let fx = (x as f32 + 0.5) / s;
        let fy = (y as f32 + 0.5) / s;
        // Inside the triangle (0.5, 0.1)-(0.1, 0.9)-(0.9, 0.9).
        let inside = fy >= 0.1 && fy <= 0.9 && {
            let half_width = 0.4 * (fy - 0.1) / 0.8;
            (fx - 0.5).abs() <= half_width
        };
        if inside {
            let gray = (255.0 * (1.0 - (fy - 0.1) * 0.4)).round() as u8;
            *px = gray_pixel(gray, gray);
        } else {
            *px = gray_pixel(0, 0);
        }
    }
    Pattern::from_image(image)
}

/// Horizontal gradient strip, brightest at the leading edge.
fn procedural_trail_strip(width: u32, height: u32) -> Pattern {
    let width = width.max(4);
    let height = height.max(2);
    let mut image = RgbaImage::new(width, height);
    for (x, _y, px) in image.enumerate_pixels_mut() {
        let gray = (255.0 * (1.0 - x as f32 / width as f32)).round() as u8;
        *px = gray_pixel(gray, gray);
    }
    Pattern::from_image(image)
}

/// Rotates an image by an arbitrary angle about its center.
///
/// The output canvas is grown to the rotated bounding box; pixels outside
/// the source map to transparent. Sampling is bilinear.
#[must_use]
pub fn rotate_rgba(src: &RgbaImage, degrees: f32) -> RgbaImage {
    let rad = degrees.to_radians();
    let (mut sin, mut cos) = rad.sin_cos();
    // Snap the tiny trig residue at quarter turns so canvas dimensions stay
    // exact (cos 90° computes as ~-4e-8, which would ceil into a dead row).
    if sin.abs() < 1e-6 {
        sin = 0.0;
    }
    if cos.abs() < 1e-6 {
        cos = 0.0;
    }
    let w = src.width() as f32;
    let h = src.height() as f32;
    let out_w = (w * cos.abs() + h * sin.abs()).ceil().max(1.0) as u32;
    let out_h = (w * sin.abs() + h * cos.abs()).ceil().max(1.0) as u32;
    let cx = w / 2.0;
    let cy = h / 2.0;
    let ocx = out_w as f32 / 2.0;
    let ocy = out_h as f32 / 2.0;
    let mut out = RgbaImage::new(out_w, out_h);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - ocx;
        let dy = y as f32 + 0.5 - ocy;
        let sx = cos * dx + sin * dy + cx - 0.5;
        let sy = -sin * dx + cos * dy + cy - 0.5;
        *px = sample_bilinear(src, sx, sy);
    }
    out
}

fn sample_bilinear(src: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let w = i64::from(src.width());
    let h = i64::from(src.height());
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let fetch = |xi: i64, yi: i64| -> [f32; 4] {
        if xi < 0 || yi < 0 || xi >= w || yi >= h {
            [0.0; 4]
        } else {
            let p = src.get_pixel(xi as u32, yi as u32).0;
            [
                f32::from(p[0]),
                f32::from(p[1]),
                f32::from(p[2]),
                f32::from(p[3]),
            ]
        }
    };
    let x0i = x0 as i64;
    let y0i = y0 as i64;
    let p00 = fetch(x0i, y0i);
    let p10 = fetch(x0i + 1, y0i);
    let p01 = fetch(x0i, y0i + 1);
    let p11 = fetch(x0i + 1, y0i + 1);
    let mut px = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] * (1.0 - fx) + p10[c] * fx;
        let bottom = p01[c] * (1.0 - fx) + p11[c] * fx;
        px[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(px)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recolor_scales_channels_by_gray() {
        let mut image = RgbaImage::new(1, 1);
        image.put_pixel(0, 0, Rgba([128, 128, 128, 255]));
        let pattern = Pattern::from_image(image);

        let out = pattern.recolor([255, 0, 100], 255, false);
        let px = out.get_pixel(0, 0).0;
        assert_eq!(px[0], 128);
        assert_eq!(px[1], 0);
        assert_eq!(px[2], 50);
        assert_eq!(px[3], 128);
    }

    #[test]
    fn test_recolor_preserves_source_alpha_when_flagged() {
        let mut image = RgbaImage::new(1, 1);
        image.put_pixel(0, 0, Rgba([255, 255, 255, 40]));
        let pattern = Pattern::from_image(image);

        let masked = pattern.recolor([10, 20, 30], 200, true);
        assert_eq!(masked.get_pixel(0, 0).0[3], 40);

        let derived = pattern.recolor([10, 20, 30], 200, false);
        assert_eq!(derived.get_pixel(0, 0).0[3], 200);
    }

    #[test]
    fn test_flip_vertical_swaps_rows() {
        let mut image = RgbaImage::new(1, 2);
        image.put_pixel(0, 0, Rgba([10, 10, 10, 255]));
        image.put_pixel(0, 1, Rgba([200, 200, 200, 255]));
        let flipped = Pattern::from_image(image).flipped_vertical();
        let top = flipped.recolor([255, 255, 255], 255, true);
        assert_eq!(top.get_pixel(0, 0).0[0], 200);
        assert_eq!(top.get_pixel(0, 1).0[0], 10);
    }

    #[test]
    fn test_rotate_quarter_turn_transposes_dimensions() {
        let mut image = RgbaImage::new(3, 1);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        image.put_pixel(2, 0, Rgba([0, 0, 255, 255]));

        let rotated = rotate_rgba(&image, 90.0);
        assert_eq!((rotated.width(), rotated.height()), (1, 3));
        let greens: Vec<u8> = rotated.pixels().map(|p| p.0[1]).collect();
        assert!(greens.iter().any(|&g| g > 200), "middle pixel preserved");
    }

    #[test]
    fn test_rotate_zero_is_identity_shape() {
        let image = RgbaImage::new(5, 7);
        let rotated = rotate_rgba(&image, 0.0);
        assert_eq!((rotated.width(), rotated.height()), (5, 7));
    }

    #[test]
    fn test_procedural_set_contains_all_patterns() {
        let set = PatternSet::procedural(64);
        assert!(set.contains_all(&PatternId::ALL));
        let ring = set.get(PatternId::Circle).unwrap();
        assert_eq!(ring.width(), 64);
    }

    #[test]
    fn test_procedural_ring_peaks_on_the_band() {
        let set = PatternSet::procedural(64);
        let ring = set.get(PatternId::Circle).unwrap();
        // Center of the canvas is off the annulus band and stays dark.
        let tinted = ring.recolor([255, 255, 255], 255, false);
        assert_eq!(tinted.get_pixel(32, 32).0[3], 0);
    }
}
