//! Pointer trail state.
//!
//! One trail exists per drag gesture: a bounded FIFO of timestamped samples.
//! Segments are derived at render time, never stored: each consecutive pair
//! becomes a line whose width and alpha decay both with its position in the
//! sequence (older = thinner, more transparent) and with sample age. After
//! release the trail stops receiving points and the remainder ages out
//! naturally.

use std::collections::VecDeque;

use glam::Vec2;

use crate::curve::{channel_u8, ColorCurve};

/// Tuning for the trail gesture.
#[derive(Debug, Clone)]
pub struct TrailParams {
    /// Seconds a sample stays visible.
    pub lifetime: f32,
    /// Maximum retained samples (oldest evicted first).
    pub max_points: usize,
    /// Line width at the newest segment, pixels.
    pub base_width: f32,
    /// Color ramp over sequence position (0 = newest, 1 = oldest).
    pub color: ColorCurve,
}

impl Default for TrailParams {
    fn default() -> Self {
        // Stock ribbon: bright blue at the tip fading to black at the tail.
        let color = ColorCurve::from_table(
            &[0.0, 0.21, 0.421, 1.0, 1.1],
            &[0.0, 0.0, 0.0, 0.0, 0.0],
            &[100.0, 100.0, 24.0, 0.0, 0.0],
            &[255.0, 255.0, 72.0, 0.0, 0.0],
        )
        .unwrap_or_else(|_| unreachable!("stock trail ramp is well-formed"));
        Self {
            lifetime: 0.3,
            max_points: 30,
            base_width: 4.0,
            color,
        }
    }
}

/// One sampled trail point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    /// Sample position, pixels.
    pub position: Vec2,
    /// Monotonic sample time, seconds.
    pub timestamp: f64,
    /// Pointer pressure in `[0, 1]`, `1.0` when unavailable.
    pub pressure: f32,
}

/// One derived trail line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSegment {
    /// Older endpoint.
    pub start: Vec2,
    /// Newer endpoint.
    pub end: Vec2,
    /// Line width, pixels.
    pub width: f32,
    /// Segment color.
    pub color: [u8; 3],
    /// Segment alpha.
    pub alpha: u8,
}

/// Bounded sample buffer for the active drag gesture.
#[derive(Debug, Clone)]
pub struct TrailState {
    params: TrailParams,
    points: VecDeque<TrailPoint>,
    recording: bool,
}

impl TrailState {
    /// Creates an empty trail.
    #[must_use]
    pub fn new(params: TrailParams) -> Self {
        let capacity = params.max_points;
        Self {
            params,
            points: VecDeque::with_capacity(capacity),
            recording: false,
        }
    }

    /// Starts a new gesture, discarding any previous samples.
    pub fn begin(&mut self, position: Vec2, timestamp: f64, pressure: f32) {
        self.points.clear();
        self.recording = true;
        self.push(position, timestamp, pressure);
    }

    /// Appends a sample while recording; ignored after release.
    pub fn push(&mut self, position: Vec2, timestamp: f64, pressure: f32) {
        if !self.recording {
            return;
        }
        if self.points.len() == self.params.max_points {
            self.points.pop_front();
        }
        self.points.push_back(TrailPoint {
            position,
            timestamp,
            pressure,
        });
    }

    /// Ends the gesture. Remaining samples keep aging out naturally.
    pub fn release(&mut self) {
        self.recording = false;
    }

    /// Whether a gesture is currently recording.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Drops samples older than the trail lifetime.
    pub fn prune(&mut self, now: f64) {
        let lifetime = f64::from(self.params.lifetime);
        while let Some(front) = self.points.front() {
            if now - front.timestamp > lifetime {
                self.points.pop_front();
            } else {
                break;
            }
        }
    }

    /// Retained sample count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no samples are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates retained samples, oldest first.
    pub fn points(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }

    /// Discards everything.
    pub fn clear(&mut self) {
        self.points.clear();
        self.recording = false;
    }

    /// Derives the renderable segments for the current frame.
    pub fn segments(&self, now: f64) -> Vec<TrailSegment> {
        let n = self.points.len();
        if n < 2 {
            return Vec::new();
        }
        let lifetime = self.params.lifetime.max(f32::EPSILON);
        let mut segments = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            let older = self.points[i];
            let newer = self.points[i + 1];
            // Sequence factor: 0 at the tail, 1 at the newest pair.
            let seq = (i + 1) as f32 / n as f32;
            let age = (now - older.timestamp) as f32;
            let freshness = (1.0 - age / lifetime).clamp(0.0, 1.0);
            let fade = seq * freshness;
            let alpha = channel_u8(255.0 * fade);
            if alpha == 0 {
                continue;
            }
            let pressure = (older.pressure + newer.pressure) * 0.5;
            segments.push(TrailSegment {
                start: older.position,
                end: newer.position,
                width: self.params.base_width * pressure * fade,
                color: self.params.color.eval(1.0 - seq),
                alpha,
            });
        }
        segments
    }
}
