//! Owns the live effect collection and issues draw commands.
//!
//! All mutation happens on the tick thread: spawn events are applied between
//! ticks, `tick` advances the clock and culls expired instances (the sole
//! removal path), and `render` walks the live set in stable insertion order
//! so newer effects layer on top, with the trail drawn last.

use std::sync::Arc;

use glam::Vec2;
use tracing::{debug, warn};

use crate::definition::EffectRegistry;
use crate::emission::SpawnEvent;
use crate::instance::EffectInstance;
use crate::pattern::PatternSet;
use crate::surface::Painter;
use crate::trail::{TrailParams, TrailState};

/// Live-effect owner and draw-command source.
#[derive(Debug)]
pub struct Compositor {
    registry: Arc<EffectRegistry>,
    patterns: Arc<PatternSet>,
    rng: fastrand::Rng,
    instances: Vec<EffectInstance>,
    trail: TrailState,
    now: f64,
}

impl Compositor {
    /// Builds a compositor over validated definitions and loaded patterns.
    ///
    /// The generator is injected so hosts and tests control determinism.
    #[must_use]
    pub fn new(
        registry: Arc<EffectRegistry>,
        patterns: Arc<PatternSet>,
        trail_params: TrailParams,
        rng: fastrand::Rng,
    ) -> Self {
        Self {
            registry,
            patterns,
            rng,
            instances: Vec::new(),
            trail: TrailState::new(trail_params),
            now: 0.0,
        }
    }

    /// Applies one spawn or trail event at the current clock.
    pub fn apply(&mut self, event: SpawnEvent) {
        match event {
            SpawnEvent::Effect { kind, position } => {
                let Some(def) = self.registry.get(kind) else {
                    warn!(?kind, "spawn event for unregistered kind dropped");
                    return;
                };
                if let Some(instance) = EffectInstance::spawn(
                    def,
                    &self.patterns,
                    position,
                    self.now,
                    &mut self.rng,
                ) {
                    self.instances.push(instance);
                }
            }
            SpawnEvent::TrailStart {
                position,
                timestamp,
                pressure,
            } => self.trail.begin(position, timestamp, pressure),
            SpawnEvent::TrailExtend {
                position,
                timestamp,
                pressure,
            } => self.trail.push(position, timestamp, pressure),
            SpawnEvent::TrailRelease => self.trail.release(),
        }
    }

    /// Advances the clock and culls expired state.
    ///
    /// Robust to jitter: time never moves backwards, and repeating a tick
    /// with the same `now` is a no-op.
    pub fn tick(&mut self, now: f64) {
        let now = now.max(self.now);
        self.now = now;
        let before = self.instances.len();
        self.instances.retain(|instance| instance.is_alive(now));
        if self.instances.len() != before {
            debug!(
                culled = before - self.instances.len(),
                live = self.instances.len(),
                "expired instances removed"
            );
        }
        self.trail.prune(now);
    }

    /// Issues this frame's draw commands, back to front.
    pub fn render(&self, painter: &mut dyn Painter) {
        for instance in &self.instances {
            if let Some(frame) = instance.frame(instance.elapsed(self.now)) {
                for sprite in &frame.sprites {
                    painter.sprite(&sprite.image, sprite.dest);
                }
            }
        }
        for segment in self.trail.segments(self.now) {
            painter.segment(&segment);
        }
    }

    /// Drops every live instance and the trail. Teardown aid; natural expiry
    /// remains the only per-instance removal path.
    pub fn clear(&mut self) {
        self.instances.clear();
        self.trail.clear();
    }

    /// Number of live instances.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.instances.len()
    }

    /// Current compositor clock, seconds.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// The trail gesture state.
    #[must_use]
    pub fn trail(&self) -> &TrailState {
        &self.trail
    }

    /// Spawn anchor of each live instance, in insertion order.
    pub fn anchors(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.instances.iter().map(EffectInstance::anchor)
    }
}
