//! A single live effect.
//!
//! An instance is created at a spawn event and owned by the compositor until
//! expiry. Every randomized parameter (lifetime, speed, base size, initial
//! rotation, envelope mix, pattern choice, sub-particle directions) is drawn
//! once at construction from the injected generator and frozen; frame
//! generation afterwards is a pure function of elapsed time.

use std::sync::Arc;

use glam::Vec2;
use tracing::warn;

use crate::curve::channel_u8;
use crate::definition::{EffectDefinition, EffectKind};
use crate::pattern::{rotate_rgba, Pattern, PatternSet};
use crate::surface::{Rect, RenderFrame, Sprite};

fn uniform(rng: &mut fastrand::Rng, (min, max): (f32, f32)) -> f32 {
    min + rng.f32() * (max - min)
}

/// One radially moving sub-particle with a frozen velocity and visible delay.
#[derive(Debug, Clone, Copy)]
struct SubParticle {
    velocity: Vec2,
    delay: f32,
}

/// A live, independently timed occurrence of an effect.
#[derive(Debug, Clone)]
pub struct EffectInstance {
    def: Arc<EffectDefinition>,
    pattern: Arc<Pattern>,
    anchor: Vec2,
    spawned_at: f64,
    lifetime: f32,
    speed: f32,
    base_size: f32,
    initial_rotation: f32,
    rotation_mix: f32,
    subs: Vec<SubParticle>,
}

impl EffectInstance {
    /// Draws all per-instance parameters and freezes them.
    ///
    /// Returns `None` if the definition references a pattern the set does
    /// not contain (the registry/host should have caught this at startup).
    pub fn spawn(
        def: Arc<EffectDefinition>,
        patterns: &PatternSet,
        anchor: Vec2,
        now: f64,
        rng: &mut fastrand::Rng,
    ) -> Option<Self> {
        if def.patterns.is_empty() {
            warn!(kind = ?def.kind, "definition has no patterns, dropping spawn");
            return None;
        }
        let pattern_id = def.patterns[rng.usize(0..def.patterns.len())];
        let Some(pattern) = patterns.get(pattern_id) else {
            warn!(kind = ?def.kind, pattern = ?pattern_id, "pattern missing, dropping spawn");
            return None;
        };

        let lifetime = uniform(rng, def.lifetime_range);
        let speed = uniform(rng, def.speed_range);
        let base_size = uniform(rng, def.size_range);
        let initial_rotation = uniform(rng, def.initial_rotation_range);
        let rotation_mix = rng.f32();

        let (count, interval) = def
            .sub_emission
            .map_or((1, 0.0), |sub| (sub.count.max(1), sub.interval));
        let subs = (0..count)
            .map(|i| {
                let angle = uniform(rng, (0.0, def.arc_degrees)).to_radians();
                let velocity = Vec2::new(
                    speed * angle.cos() * def.spatial_scale.x,
                    speed * angle.sin() * def.spatial_scale.y,
                );
                SubParticle {
                    velocity,
                    delay: i as f32 * interval,
                }
            })
            .collect();

        Some(Self {
            def,
            pattern,
            anchor,
            spawned_at: now,
            lifetime,
            speed,
            base_size,
            initial_rotation,
            rotation_mix,
            subs,
        })
    }

    /// The kind this instance animates.
    #[must_use]
    pub fn kind(&self) -> EffectKind {
        self.def.kind
    }

    /// Fixed spawn point; never tracks the live pointer.
    #[must_use]
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Spawn time on the process clock, seconds.
    #[must_use]
    pub fn spawned_at(&self) -> f64 {
        self.spawned_at
    }

    /// Frozen lifetime draw, seconds.
    #[must_use]
    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    /// Seconds between the first and last sub-particle appearing.
    fn stagger(&self) -> f32 {
        self.subs.last().map_or(0.0, |sub| sub.delay)
    }

    /// Lifetime including the stagger of the final sub-particle.
    #[must_use]
    pub fn total_lifetime(&self) -> f32 {
        self.lifetime + self.stagger()
    }

    /// Seconds since spawn at `now`.
    #[must_use]
    pub fn elapsed(&self, now: f64) -> f32 {
        (now - self.spawned_at) as f32
    }

    /// Age over total lifetime, clamped into `[0, 1]`.
    #[must_use]
    pub fn elapsed_fraction(&self, now: f64) -> f32 {
        (self.elapsed(now) / self.total_lifetime()).clamp(0.0, 1.0)
    }

    /// Whether a frame can still be produced at `now`. Expiry is terminal.
    #[must_use]
    pub fn is_alive(&self, now: f64) -> bool {
        let elapsed = self.elapsed(now);
        (0.0..=self.total_lifetime()).contains(&elapsed)
    }

    /// Produces the renderable frame at `elapsed` seconds since spawn.
    ///
    /// `None` is the expiry signal: the instance is not yet visible or every
    /// sub-particle has run out its lifetime. Both boundaries are inclusive.
    #[must_use]
    pub fn frame(&self, elapsed: f32) -> Option<RenderFrame> {
        if elapsed < 0.0 || elapsed > self.total_lifetime() {
            return None;
        }
        let assumed_elapsed = if self.speed > 0.0 {
            self.def.shape_radius / self.speed
        } else {
            0.0
        };
        let mut sprites = Vec::with_capacity(self.subs.len());
        for sub in &self.subs {
            let local = elapsed - sub.delay;
            if local < 0.0 {
                continue;
            }
            let t = local / self.lifetime;
            if t > 1.0 {
                continue;
            }
            let rgb = self.def.color.eval(t);
            let alpha = channel_u8(self.def.alpha.eval(t));
            let size_scale = self.def.size_curve.eval(t);
            let target = (self.def.reference_size * self.base_size * size_scale)
                .round()
                .max(1.0);

            // Fit the pattern into the target size, preserving aspect ratio,
            // then tint the scaled pixels.
            let (src_w, src_h) = (self.pattern.width() as f32, self.pattern.height() as f32);
            let fit = target / src_w.max(src_h);
            let w = (src_w * fit).round().max(1.0) as u32;
            let h = (src_h * fit).round().max(1.0) as u32;
            let scaled = self.pattern.resized(w, h);
            let mut image = scaled.recolor(rgb, alpha, self.def.pattern_transparent);

            let rotation = self.initial_rotation
                + self
                    .def
                    .rotation
                    .as_ref()
                    .map_or(0.0, |env| env.eval(t, self.rotation_mix));
            if rotation.abs() > f32::EPSILON {
                image = rotate_rgba(&image, rotation);
            }

            let center = self.anchor
                + sub.velocity * (assumed_elapsed + local) * self.def.reference_size;
            let dest = Rect::centered_at(center, image.width() as f32, image.height() as f32);
            sprites.push(Sprite { image, dest });
        }
        Some(RenderFrame { sprites })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;
    use crate::definition::{BurstOrder, EffectDefinition};

    fn spawn_kind(kind_def: EffectDefinition, anchor: Vec2, seed: u64) -> EffectInstance {
        let patterns = PatternSet::procedural(64);
        let mut rng = fastrand::Rng::with_seed(seed);
        EffectInstance::spawn(Arc::new(kind_def), &patterns, anchor, 0.0, &mut rng).unwrap()
    }

    #[test]
    fn test_frame_is_none_outside_lifetime_and_some_at_boundaries() {
        let instance = spawn_kind(defaults::ring(512.0).unwrap(), Vec2::new(10.0, 10.0), 7);
        let lifetime = instance.lifetime();
        assert!((lifetime - 0.2).abs() < 1e-6);

        assert!(instance.frame(-0.01).is_none());
        assert!(instance.frame(lifetime + 0.001).is_none());
        assert!(instance.frame(0.0).is_some());
        assert!(instance.frame(lifetime).is_some());
    }

    #[test]
    fn test_sub_particles_appear_staggered() {
        // Press burst: count = 4, interval = 10 ms. Sub-particle i must be
        // invisible before i * interval and visible right after.
        let instance = spawn_kind(
            defaults::ring_burst(BurstOrder::Three, 512.0).unwrap(),
            Vec2::new(100.0, 100.0),
            3,
        );
        for i in 0..4usize {
            let delay = i as f32 * 0.010;
            if i > 0 {
                let before = instance.frame(delay - 0.001).unwrap();
                assert_eq!(before.sprites.len(), i, "just before sub {i} appears");
            }
            let after = instance.frame(delay + 0.001).unwrap();
            assert_eq!(after.sprites.len(), i + 1, "just after sub {i} appears");
        }
    }

    #[test]
    fn test_multi_sub_instance_outlives_bare_lifetime() {
        let instance = spawn_kind(
            defaults::ring_burst(BurstOrder::Three, 512.0).unwrap(),
            Vec2::ZERO,
            11,
        );
        let lifetime = instance.lifetime();
        assert!((instance.total_lifetime() - (lifetime + 0.03)).abs() < 1e-6);
        // Between the bare lifetime and the total, only late subs remain.
        let frame = instance.frame(lifetime + 0.02).unwrap();
        assert!(!frame.is_empty());
        assert!(frame.sprites.len() < 4);
        assert!(instance.frame(instance.total_lifetime() + 0.001).is_none());
    }

    #[test]
    fn test_sub_particles_move_radially_outward() {
        let anchor = Vec2::new(200.0, 200.0);
        let instance = spawn_kind(
            defaults::ring_burst(BurstOrder::Three, 512.0).unwrap(),
            anchor,
            5,
        );
        let early = instance.frame(0.05).unwrap();
        let late = instance.frame(0.15).unwrap();
        assert_eq!(early.sprites.len(), late.sprites.len());
        for (a, b) in early.sprites.iter().zip(late.sprites.iter()) {
            let da = a.dest.center().distance(anchor);
            let db = b.dest.center().distance(anchor);
            assert!(db > da, "sub-particle drifted outward: {da} -> {db}");
        }
    }

    #[test]
    fn test_assumed_elapsed_offsets_origin_onto_the_shape_ring() {
        let anchor = Vec2::new(300.0, 300.0);
        let def = defaults::ring_burst(BurstOrder::Three, 512.0).unwrap();
        let shape_radius = def.shape_radius;
        let instance = spawn_kind(def, anchor, 21);
        // At local time zero the particle already sits shape_radius away
        // (in reference units): |v| * (radius / speed) * ref = radius * ref.
        let frame = instance.frame(0.0).unwrap();
        let dist = frame.sprites[0].dest.center().distance(anchor);
        let expected = shape_radius * 512.0;
        assert!(
            (dist - expected).abs() < 1.0,
            "expected ~{expected}, got {dist}"
        );
    }

    #[test]
    fn test_sprite_never_collapses_below_one_pixel() {
        // The burst size curve is exactly zero at t = 0.
        let instance = spawn_kind(
            defaults::ring_burst(BurstOrder::Four, 512.0).unwrap(),
            Vec2::ZERO,
            9,
        );
        let frame = instance.frame(0.0).unwrap();
        assert!(!frame.is_empty());
        for sprite in &frame.sprites {
            assert!(sprite.image.width() >= 1 && sprite.image.height() >= 1);
        }
    }

    #[test]
    fn test_draws_are_frozen_and_seed_deterministic() {
        let def = defaults::ring_burst(BurstOrder::Three, 512.0).unwrap();
        let a = spawn_kind(def.clone(), Vec2::ZERO, 42);
        let b = spawn_kind(def, Vec2::ZERO, 42);
        assert_eq!(a.lifetime(), b.lifetime());
        // Same seed, same draws: identical frames at any sampled time.
        let fa = a.frame(0.1).unwrap();
        let fb = b.frame(0.1).unwrap();
        let rects_a: Vec<Rect> = fa.sprites.iter().map(|s| s.dest).collect();
        let rects_b: Vec<Rect> = fb.sprites.iter().map(|s| s.dest).collect();
        assert_eq!(rects_a, rects_b);
        // And re-evaluating the same instance does not re-draw parameters.
        let fa2 = a.frame(0.1).unwrap();
        let rects_a2: Vec<Rect> = fa2.sprites.iter().map(|s| s.dest).collect();
        assert_eq!(rects_a, rects_a2);
    }

    #[test]
    fn test_mesh_rotation_changes_canvas_over_time() {
        let instance = spawn_kind(defaults::mesh_burst(512.0).unwrap(), Vec2::ZERO, 17);
        let early = instance.frame(0.1).unwrap();
        let late = instance.frame(0.3).unwrap();
        // A rotating square canvas changes its bounding box unless the angle
        // difference is an exact quarter turn; sizes also differ by curve.
        let (w0, h0) = (early.sprites[0].image.width(), early.sprites[0].image.height());
        let (w1, h1) = (late.sprites[0].image.width(), late.sprites[0].image.height());
        assert!(w0 >= 1 && h0 >= 1 && w1 >= 1 && h1 >= 1);
    }

    #[test]
    fn test_spawn_fails_without_patterns_loaded() {
        let def = Arc::new(defaults::ring(512.0).unwrap());
        let empty = PatternSet::new();
        let mut rng = fastrand::Rng::with_seed(1);
        assert!(EffectInstance::spawn(def, &empty, Vec2::ZERO, 0.0, &mut rng).is_none());
    }
}
