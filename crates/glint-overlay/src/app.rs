//! Overlay wiring and the tick loop.
//!
//! Ties the pieces together: configuration builds the registry and trail
//! tuning, assets fill the pattern set, the adapter feeds marshaled pointer
//! samples into the emission controller, and the compositor renders through
//! whatever painter the host supplies. One `step` is one tick.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use glint_core::{Compositor, EmissionController, Painter};

use crate::assets;
use crate::config::OverlayConfig;
use crate::input::PointerInputAdapter;
use crate::timing::TickClock;

/// The assembled overlay engine.
#[derive(Debug)]
pub struct Overlay {
    compositor: Compositor,
    controller: EmissionController,
    adapter: PointerInputAdapter,
    clock: TickClock,
    last_stats: f64,
}

impl Overlay {
    /// Builds the overlay from configuration with an entropy-seeded
    /// generator.
    pub fn new(config: &OverlayConfig, adapter: PointerInputAdapter) -> Result<Self> {
        Self::with_rng(config, adapter, fastrand::Rng::new())
    }

    /// Builds the overlay with an explicit generator (tests seed this).
    pub fn with_rng(
        config: &OverlayConfig,
        adapter: PointerInputAdapter,
        rng: fastrand::Rng,
    ) -> Result<Self> {
        let registry = Arc::new(
            config
                .build_registry()
                .context("building effect definitions")?,
        );
        let patterns = Arc::new(
            assets::load_patterns(
                config.pattern_dir.as_deref(),
                config.procedural_pattern_size,
            )
            .context("loading patterns")?,
        );
        for def in registry.iter() {
            if !patterns.contains_all(&def.patterns) {
                bail!("definition {:?} references unloaded patterns", def.kind);
            }
        }
        Ok(Self {
            compositor: Compositor::new(
                Arc::clone(&registry),
                patterns,
                config.trail_params(),
                rng,
            ),
            controller: EmissionController::new(registry),
            adapter,
            clock: TickClock::new(config.target_fps),
            last_stats: 0.0,
        })
    }

    /// The live-effect owner (stats, tests).
    #[must_use]
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Runs one tick: wait for the deadline, advance and cull, apply input,
    /// release due bursts, render. Returns the tick time.
    pub fn step(&mut self, painter: &mut dyn Painter) -> f64 {
        let now = self.clock.wait();
        self.compositor.tick(now);
        for sample in self.adapter.drain() {
            for event in self.controller.on_pointer_event(&sample) {
                self.compositor.apply(event);
            }
        }
        for event in self.controller.on_tick(now) {
            self.compositor.apply(event);
        }
        painter.begin_frame();
        self.compositor.render(painter);

        if now - self.last_stats >= 1.0 {
            self.last_stats = now;
            debug!(
                live = self.compositor.live_count(),
                fps = self.clock.average_fps(),
                "tick stats"
            );
        }
        now
    }

    /// Ticks until the duration elapses, or, with no duration, until the
    /// input source is gone and every effect has drained naturally.
    pub fn run(&mut self, painter: &mut dyn Painter, duration: Option<Duration>) {
        info!("overlay loop started");
        loop {
            let now = self.step(painter);
            if let Some(limit) = duration {
                if now >= limit.as_secs_f64() {
                    break;
                }
            }
            if self.adapter.is_disconnected()
                && self.compositor.live_count() == 0
                && self.compositor.trail().is_empty()
            {
                info!("input source gone and effects drained; stopping");
                break;
            }
        }
        info!("overlay loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::pointer_channel;
    use glam::Vec2;
    use glint_core::{PointerSample, RecordingPainter};

    fn fast_config() -> OverlayConfig {
        OverlayConfig {
            target_fps: 240,
            ..OverlayConfig::default()
        }
    }

    #[test]
    fn test_press_through_the_full_pipeline_draws_sprites() {
        let (sender, adapter) = pointer_channel(64);
        let mut overlay =
            Overlay::with_rng(&fast_config(), adapter, fastrand::Rng::with_seed(1)).unwrap();
        let mut painter = RecordingPainter::new();

        sender.send(PointerSample::new(Vec2::new(100.0, 100.0), true, 0.0));
        overlay.step(&mut painter);
        // Press set: ring + press burst.
        assert_eq!(overlay.compositor().live_count(), 2);
        assert!(!painter.sprites.is_empty());

        // Drag far enough to trigger distance spawns and trail segments.
        sender.send(PointerSample::new(Vec2::new(130.0, 100.0), true, 0.01));
        overlay.step(&mut painter);
        assert!(overlay.compositor().live_count() > 2);
        assert!(!painter.segments.is_empty());
    }

    #[test]
    fn test_run_stops_once_input_is_gone_and_drained() {
        let (sender, adapter) = pointer_channel(8);
        let mut overlay =
            Overlay::with_rng(&fast_config(), adapter, fastrand::Rng::with_seed(2)).unwrap();
        drop(sender);
        let mut painter = RecordingPainter::new();
        // Nothing was ever spawned, so this returns after the first ticks.
        overlay.run(&mut painter, None);
        assert_eq!(overlay.compositor().live_count(), 0);
    }

    #[test]
    fn test_run_honors_duration_limit() {
        let (_sender, adapter) = pointer_channel(8);
        let mut overlay =
            Overlay::with_rng(&fast_config(), adapter, fastrand::Rng::with_seed(3)).unwrap();
        let mut painter = RecordingPainter::new();
        overlay.run(&mut painter, Some(Duration::from_millis(30)));
        assert!(painter.frames >= 1);
    }
}
