//! # Glint Core
//!
//! Curve-driven engine for transient touch feedback: ripples, spark bursts,
//! triangle flashes, and pointer trails composited as an overlay.
//!
//! This crate is the platform-independent core:
//! - Piecewise-interpolation primitives sampled against normalized lifetime
//! - Immutable, validated per-kind effect definitions
//! - Live effect instances with frozen spawn-time randomness
//! - Distance- and press-driven emission state machine
//! - A compositor owning the live set and issuing draw commands
//!
//! ## Architecture
//!
//! Pointer samples flow through the [`emission::EmissionController`], which
//! turns them into spawn events. The [`compositor::Compositor`] owns every
//! live [`instance::EffectInstance`], advances them on each clock tick, and
//! emits (sprite, destination-rect) draw commands plus trail segments to a
//! host-provided [`surface::Painter`]. Everything is single-threaded and
//! pure computation per tick; the host marshals input from its hook thread
//! and owns the actual window and painting backend.
//!
//! ## Determinism
//!
//! Every randomized parameter is drawn once at spawn from an injected
//! `fastrand::Rng` and frozen, so a seeded generator reproduces identical
//! animations; the test suites rely on this.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod compositor;
pub mod curve;
pub mod defaults;
pub mod definition;
pub mod emission;
pub mod instance;
pub mod pattern;
pub mod surface;
pub mod trail;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::compositor::Compositor;
    pub use crate::curve::{
        ColorCurve, CurveError, HermiteKnot, HermiteSpline, PiecewiseHermite, PiecewiseLinear,
        SizeCurve,
    };
    pub use crate::defaults;
    pub use crate::definition::{
        BurstOrder, DefinitionError, EffectDefinition, EffectKind, EffectRegistry, EmissionMode,
        RotationEnvelope, SubEmission,
    };
    pub use crate::emission::{EmissionController, PointerSample, SpawnEvent};
    pub use crate::instance::EffectInstance;
    pub use crate::pattern::{Pattern, PatternId, PatternSet};
    pub use crate::surface::{Painter, Rect, RecordingPainter, RenderFrame, Sprite};
    pub use crate::trail::{TrailParams, TrailPoint, TrailSegment, TrailState};
}

pub use prelude::*;
