//! Converts pointer input into discrete spawn events.
//!
//! The controller is a two-state machine (`Idle` / `Dragging`) that turns
//! presses into the immediate press set plus tick-gated burst schedules, and
//! pointer travel into distance-triggered spawns along the movement path. It
//! only ever emits [`SpawnEvent`] values; the compositor owns the live set.

use std::sync::Arc;

use glam::Vec2;
use tracing::trace;

use crate::definition::{EffectKind, EffectRegistry, EmissionMode};

/// One marshaled pointer sample, ordered by timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Position in overlay pixels.
    pub position: Vec2,
    /// Whether any watched button is held.
    pub pressed: bool,
    /// Pressure in `[0, 1]`; `1.0` for devices without pressure.
    pub pressure: f32,
    /// Monotonic time, seconds.
    pub timestamp: f64,
}

impl PointerSample {
    /// Sample without pressure information.
    #[must_use]
    pub fn new(position: Vec2, pressed: bool, timestamp: f64) -> Self {
        Self {
            position,
            pressed,
            pressure: 1.0,
            timestamp,
        }
    }
}

/// A spawn or trail command produced by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnEvent {
    /// Spawn one effect instance at a fixed anchor.
    Effect {
        /// Which definition to instantiate.
        kind: EffectKind,
        /// Anchor position, pixels.
        position: Vec2,
    },
    /// Begin a new trail gesture.
    TrailStart {
        /// First sample position.
        position: Vec2,
        /// Sample time, seconds.
        timestamp: f64,
        /// Sample pressure.
        pressure: f32,
    },
    /// Extend the active trail gesture.
    TrailExtend {
        /// Sample position.
        position: Vec2,
        /// Sample time, seconds.
        timestamp: f64,
        /// Sample pressure.
        pressure: f32,
    },
    /// End the active trail gesture (points age out naturally).
    TrailRelease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    Dragging,
}

/// A press burst still releasing spawns on subsequent ticks.
#[derive(Debug, Clone, Copy)]
struct PendingBurst {
    kind: EffectKind,
    anchor: Vec2,
    remaining: u32,
    next_at: f64,
    interval: f32,
}

/// Distance- and press-driven spawn event source.
#[derive(Debug)]
pub struct EmissionController {
    registry: Arc<EffectRegistry>,
    state: GestureState,
    last_position: Vec2,
    accumulated: f32,
    pending: Vec<PendingBurst>,
    distance_kind: Option<(EffectKind, f32)>,
}

impl EmissionController {
    /// Builds a controller over the registered definitions.
    #[must_use]
    pub fn new(registry: Arc<EffectRegistry>) -> Self {
        let distance_kind = registry.distance_kind();
        Self {
            registry,
            state: GestureState::Idle,
            last_position: Vec2::ZERO,
            accumulated: 0.0,
            pending: Vec::new(),
            distance_kind,
        }
    }

    /// Whether a drag gesture is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.state == GestureState::Dragging
    }

    /// Feeds one pointer sample; samples must arrive in timestamp order.
    pub fn on_pointer_event(&mut self, sample: &PointerSample) -> Vec<SpawnEvent> {
        let mut events = Vec::new();
        match (self.state, sample.pressed) {
            (GestureState::Idle, true) => {
                self.state = GestureState::Dragging;
                self.accumulated = 0.0;
                self.last_position = sample.position;
                self.press(sample, &mut events);
            }
            (GestureState::Dragging, true) => {
                self.drag(sample, &mut events);
            }
            (GestureState::Dragging, false) => {
                self.state = GestureState::Idle;
                events.push(SpawnEvent::TrailRelease);
            }
            (GestureState::Idle, false) => {}
        }
        events
    }

    /// Releases due burst spawns. Runs every tick regardless of gesture
    /// state: a press burst keeps emitting after an early release.
    pub fn on_tick(&mut self, now: f64) -> Vec<SpawnEvent> {
        let mut events = Vec::new();
        for burst in &mut self.pending {
            while burst.remaining > 0 && burst.next_at <= now {
                events.push(SpawnEvent::Effect {
                    kind: burst.kind,
                    position: burst.anchor,
                });
                burst.remaining -= 1;
                burst.next_at += f64::from(burst.interval);
            }
        }
        self.pending.retain(|burst| burst.remaining > 0);
        events
    }

    fn press(&mut self, sample: &PointerSample, events: &mut Vec<SpawnEvent>) {
        for kind in EffectKind::ALL {
            let Some(def) = self.registry.get(kind) else {
                continue;
            };
            match def.emission {
                EmissionMode::Single => events.push(SpawnEvent::Effect {
                    kind,
                    position: sample.position,
                }),
                EmissionMode::Burst { count, interval } => {
                    self.pending.push(PendingBurst {
                        kind,
                        anchor: sample.position,
                        remaining: count,
                        next_at: sample.timestamp + f64::from(interval),
                        interval,
                    });
                }
                EmissionMode::DistanceRate { .. } => {}
            }
        }
        events.push(SpawnEvent::TrailStart {
            position: sample.position,
            timestamp: sample.timestamp,
            pressure: sample.pressure,
        });
        trace!(x = sample.position.x, y = sample.position.y, "press set spawned");
    }

    fn drag(&mut self, sample: &PointerSample, events: &mut Vec<SpawnEvent>) {
        let delta = sample.position - self.last_position;
        let distance = delta.length();
        if distance <= 0.0 {
            return;
        }
        if let Some((kind, threshold)) = self.distance_kind {
            self.accumulated += distance;
            // Walk back along the current segment so spawns land exactly
            // every `threshold` pixels of travel, even when one sample
            // covers several thresholds.
            while self.accumulated >= threshold {
                let ratio = ((self.accumulated - threshold) / distance).clamp(0.0, 1.0);
                events.push(SpawnEvent::Effect {
                    kind,
                    position: sample.position - delta * ratio,
                });
                self.accumulated -= threshold;
            }
        }
        events.push(SpawnEvent::TrailExtend {
            position: sample.position,
            timestamp: sample.timestamp,
            pressure: sample.pressure,
        });
        self.last_position = sample.position;
    }
}
