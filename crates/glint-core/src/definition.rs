//! Effect kinds, immutable per-kind definitions, and the validated registry.
//!
//! Each kind is a tagged variant. Its parameters live in one immutable
//! [`EffectDefinition`] built once at startup and shared by reference, and
//! every definition is validated before the [`EffectRegistry`] accepts it: a
//! malformed curve or range refuses the kind up front instead of producing
//! undefined values mid-animation.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec2;
use thiserror::Error;
use tracing::warn;

use crate::curve::{ColorCurve, CurveError, HermiteSpline, PiecewiseLinear, SizeCurve};
use crate::pattern::PatternId;

/// Sub-particle count class for burst rings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BurstOrder {
    /// Press burst: larger, slower, longer-lived.
    Three,
    /// Drag burst: smaller, faster, short-lived.
    Four,
}

/// The kinds of transient effects the engine can spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Press ripple ring at the touch point.
    Ring,
    /// Radial burst of spark sub-particles.
    RingBurst(BurstOrder),
    /// Rotating mesh-triangle flash.
    MeshBurst,
    /// Pointer trail (handled by the trail state, not instances).
    Trail,
}

impl EffectKind {
    /// Every kind, in canonical spawn/layering order.
    pub const ALL: [Self; 5] = [
        Self::Ring,
        Self::RingBurst(BurstOrder::Three),
        Self::RingBurst(BurstOrder::Four),
        Self::MeshBurst,
        Self::Trail,
    ];
}

/// How spawn events for a kind are produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmissionMode {
    /// One instance per discrete press event.
    Single,
    /// `count` instances released `interval` seconds apart after a press.
    Burst {
        /// Number of instances in the burst.
        count: u32,
        /// Seconds between releases.
        interval: f32,
    },
    /// One instance per `threshold` pixels of accumulated pointer travel.
    DistanceRate {
        /// Travel distance per spawn, in pixels.
        threshold: f32,
    },
}

/// Sub-particle topology for multi-sub kinds (burst rings).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubEmission {
    /// Number of sub-particles per instance.
    pub count: u32,
    /// Visible delay step: sub-particle `i` appears after `i * interval`.
    pub interval: f32,
}

/// Min/max Hermite envelope for rotation over lifetime.
///
/// An instance draws a mix factor once at spawn; its rotation at time `t`
/// interpolates between the two bounding splines at that fixed mix.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationEnvelope {
    lo: HermiteSpline,
    hi: HermiteSpline,
}

impl RotationEnvelope {
    /// Bundles the bounding splines.
    #[must_use]
    pub const fn new(lo: HermiteSpline, hi: HermiteSpline) -> Self {
        Self { lo, hi }
    }

    /// Rotation in degrees at `t` for a fixed envelope mix in `[0, 1]`.
    #[must_use]
    pub fn eval(&self, t: f32, mix: f32) -> f32 {
        let lo = self.lo.eval(t);
        let hi = self.hi.eval(t);
        lo + (hi - lo) * mix.clamp(0.0, 1.0)
    }
}

/// Immutable parameter set for one effect kind.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectDefinition {
    /// Which kind this definition drives.
    pub kind: EffectKind,
    /// Uniform random lifetime draw range, seconds.
    pub lifetime_range: (f32, f32),
    /// Uniform random linear speed draw range (radially moving kinds).
    pub speed_range: (f32, f32),
    /// Uniform random base-size multiplier draw range.
    pub size_range: (f32, f32),
    /// RGB over normalized lifetime.
    pub color: ColorCurve,
    /// Alpha over normalized lifetime, `0..=255`.
    pub alpha: PiecewiseLinear,
    /// Size multiplier over normalized lifetime.
    pub size_curve: SizeCurve,
    /// Optional rotation envelope over normalized lifetime, degrees.
    pub rotation: Option<RotationEnvelope>,
    /// Uniform random initial rotation draw range, degrees.
    pub initial_rotation_range: (f32, f32),
    /// How spawn events are produced for this kind.
    pub emission: EmissionMode,
    /// Sub-particle topology (multi-sub kinds only).
    pub sub_emission: Option<SubEmission>,
    /// Anisotropic scale applied to sub-particle velocity.
    pub spatial_scale: Vec2,
    /// Initial random direction sector, degrees (`360` = full circle).
    pub arc_degrees: f32,
    /// Emission-shape radius feeding the assumed pre-visible travel time.
    pub shape_radius: f32,
    /// Global pixel scale: sprite sizes and travel are multiples of this.
    pub reference_size: f32,
    /// Candidate source patterns; one is drawn per instance at spawn.
    pub patterns: Vec<PatternId>,
    /// Preserve the source pattern's own alpha channel (pre-masked art).
    pub pattern_transparent: bool,
}

/// Errors detected when validating or registering a definition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    /// A draw range is inverted or non-finite.
    #[error("{name} range invalid: ({min}, {max})")]
    InvalidRange {
        /// Which range failed.
        name: &'static str,
        /// Range minimum.
        min: f32,
        /// Range maximum.
        max: f32,
    },

    /// Lifetime must be strictly positive.
    #[error("lifetime must be positive, got minimum {0}")]
    NonPositiveLifetime(f32),

    /// Direction sector outside `(0, 360]`.
    #[error("arc must be in (0, 360] degrees, got {0}")]
    InvalidArc(f32),

    /// Burst/sub-emission parameters out of range.
    #[error("emission invalid: count {count}, interval {interval}")]
    InvalidEmission {
        /// Spawn or sub-particle count.
        count: u32,
        /// Interval between releases, seconds.
        interval: f32,
    },

    /// Distance emission needs a positive threshold.
    #[error("distance threshold must be positive, got {0}")]
    InvalidThreshold(f32),

    /// A definition must name at least one source pattern.
    #[error("definition has no source patterns")]
    NoPatterns,

    /// A curve failed construction.
    #[error("curve: {0}")]
    Curve(#[from] CurveError),
}

fn check_range(name: &'static str, (min, max): (f32, f32)) -> Result<(), DefinitionError> {
    if !min.is_finite() || !max.is_finite() || min > max || min < 0.0 {
        return Err(DefinitionError::InvalidRange { name, min, max });
    }
    Ok(())
}

impl EffectDefinition {
    /// Validates ranges and emission parameters.
    ///
    /// Curves are already structurally valid by construction; this checks
    /// everything the type system cannot.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        check_range("lifetime", self.lifetime_range)?;
        check_range("speed", self.speed_range)?;
        check_range("size", self.size_range)?;
        check_range("initial_rotation", self.initial_rotation_range)?;
        if self.lifetime_range.0 <= 0.0 {
            return Err(DefinitionError::NonPositiveLifetime(self.lifetime_range.0));
        }
        if !(self.arc_degrees > 0.0 && self.arc_degrees <= 360.0) {
            return Err(DefinitionError::InvalidArc(self.arc_degrees));
        }
        if let EmissionMode::Burst { count, interval } = self.emission {
            if count == 0 || interval <= 0.0 {
                return Err(DefinitionError::InvalidEmission { count, interval });
            }
        }
        if let EmissionMode::DistanceRate { threshold } = self.emission {
            if !(threshold > 0.0) {
                return Err(DefinitionError::InvalidThreshold(threshold));
            }
        }
        if let Some(sub) = self.sub_emission {
            if sub.count == 0 || sub.interval < 0.0 {
                return Err(DefinitionError::InvalidEmission {
                    count: sub.count,
                    interval: sub.interval,
                });
            }
        }
        if self.patterns.is_empty() {
            return Err(DefinitionError::NoPatterns);
        }
        Ok(())
    }
}

/// Validated, immutable definitions keyed by kind.
#[derive(Debug, Clone, Default)]
pub struct EffectRegistry {
    defs: HashMap<EffectKind, Arc<EffectDefinition>>,
}

impl EffectRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and registers a definition, replacing any previous one for
    /// the same kind. Rejected definitions leave the registry unchanged.
    pub fn register(&mut self, def: EffectDefinition) -> Result<(), DefinitionError> {
        if let Err(e) = def.validate() {
            warn!(kind = ?def.kind, error = %e, "refusing to register effect definition");
            return Err(e);
        }
        self.defs.insert(def.kind, Arc::new(def));
        Ok(())
    }

    /// Looks up a definition.
    #[must_use]
    pub fn get(&self, kind: EffectKind) -> Option<Arc<EffectDefinition>> {
        self.defs.get(&kind).cloned()
    }

    /// Iterates registered definitions in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EffectDefinition>> {
        self.defs.values()
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether no kinds are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// The kind driven by distance emission, with its threshold, if any.
    #[must_use]
    pub fn distance_kind(&self) -> Option<(EffectKind, f32)> {
        self.defs.values().find_map(|def| match def.emission {
            EmissionMode::DistanceRate { threshold } => Some((def.kind, threshold)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;

    #[test]
    fn test_registry_registers_and_looks_up() {
        let mut registry = EffectRegistry::new();
        registry.register(defaults::ring(512.0).unwrap()).unwrap();
        assert_eq!(registry.len(), 1);
        let def = registry.get(EffectKind::Ring).unwrap();
        assert_eq!(def.kind, EffectKind::Ring);
        assert!(registry.get(EffectKind::MeshBurst).is_none());
    }

    #[test]
    fn test_register_rejects_inverted_range() {
        let mut def = defaults::ring(512.0).unwrap();
        def.lifetime_range = (0.5, 0.2);
        let mut registry = EffectRegistry::new();
        let err = registry.register(def).unwrap_err();
        assert!(matches!(
            err,
            DefinitionError::InvalidRange {
                name: "lifetime",
                ..
            }
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_rejects_zero_lifetime() {
        let mut def = defaults::ring(512.0).unwrap();
        def.lifetime_range = (0.0, 0.0);
        let err = def.validate().unwrap_err();
        assert!(matches!(err, DefinitionError::NonPositiveLifetime(_)));
    }

    #[test]
    fn test_register_rejects_bad_burst() {
        let mut def = defaults::mesh_burst(512.0).unwrap();
        def.emission = EmissionMode::Burst {
            count: 2,
            interval: 0.0,
        };
        assert!(matches!(
            def.validate(),
            Err(DefinitionError::InvalidEmission { .. })
        ));
    }

    #[test]
    fn test_register_rejects_bad_arc() {
        let mut def = defaults::ring(512.0).unwrap();
        def.arc_degrees = 0.0;
        assert!(matches!(def.validate(), Err(DefinitionError::InvalidArc(_))));
    }

    #[test]
    fn test_register_rejects_empty_patterns() {
        let mut def = defaults::ring(512.0).unwrap();
        def.patterns.clear();
        assert_eq!(def.validate(), Err(DefinitionError::NoPatterns));
    }

    #[test]
    fn test_distance_kind_comes_from_drag_burst() {
        let registry = defaults::registry(512.0).unwrap();
        let (kind, threshold) = registry.distance_kind().unwrap();
        assert_eq!(kind, EffectKind::RingBurst(BurstOrder::Four));
        assert!((threshold - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotation_envelope_mixes_between_bounds() {
        let lo = HermiteSpline::from_table(&[(0.0, 0.0, 0.0), (1.0, 90.0, 0.0)]).unwrap();
        let hi = HermiteSpline::from_table(&[(0.0, 0.0, 0.0), (1.0, 360.0, 0.0)]).unwrap();
        let env = RotationEnvelope::new(lo, hi);
        assert!((env.eval(1.0, 0.0) - 90.0).abs() < 1e-4);
        assert!((env.eval(1.0, 1.0) - 360.0).abs() < 1e-4);
        let mid = env.eval(1.0, 0.5);
        assert!((mid - 225.0).abs() < 1e-4);
    }
}
