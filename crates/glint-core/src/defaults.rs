//! Built-in effect definitions.
//!
//! The numeric tables here are the stock touch-feedback look: a short white
//! press ripple that settles into warm red, pale-blue spark bursts with a
//! strobing alpha, and a rotating triangle flash. Hosts may register their
//! own definitions instead; these are the defaults the overlay ships with.

use glam::Vec2;

use crate::curve::{ColorCurve, HermiteSpline, PiecewiseHermite, PiecewiseLinear, SizeCurve};
use crate::definition::{
    BurstOrder, DefinitionError, EffectDefinition, EffectKind, EffectRegistry, EmissionMode,
    RotationEnvelope, SubEmission,
};
use crate::pattern::PatternId;

/// Default travel distance per drag-burst spawn, in pixels.
pub const DISTANCE_THRESHOLD: f32 = 5.0;

/// Default global pixel scale.
pub const REFERENCE_SIZE: f32 = 512.0;

/// Press ripple ring.
pub fn ring(reference_size: f32) -> Result<EffectDefinition, DefinitionError> {
    Ok(EffectDefinition {
        kind: EffectKind::Ring,
        lifetime_range: (0.2, 0.2),
        speed_range: (0.0, 0.0),
        size_range: (0.12, 0.12),
        color: ColorCurve::from_table(
            &[0.0, 0.121, 1.0],
            &[255.0, 61.0, 61.0],
            &[255.0, 100.0, 100.0],
            &[255.0, 255.0, 255.0],
        )?,
        alpha: PiecewiseLinear::from_table(&[0.0, 0.109, 1.0], &[255.0, 255.0, 0.0])?,
        size_curve: SizeCurve::Hermite(HermiteSpline::from_table(&[
            (0.0, 0.326, 2.4),
            (0.428, 1.432, 1.8),
            (1.0, 1.0, 0.0),
        ])?),
        rotation: None,
        initial_rotation_range: (0.0, 360.0),
        emission: EmissionMode::Single,
        sub_emission: None,
        spatial_scale: Vec2::ONE,
        arc_degrees: 360.0,
        shape_radius: 0.0,
        reference_size,
        patterns: vec![PatternId::Circle],
        pattern_transparent: false,
    })
}

/// Shared spark-burst palette: white flash settling into pale blue.
fn burst_color() -> Result<ColorCurve, DefinitionError> {
    Ok(ColorCurve::from_table(
        &[0.0, 0.182, 0.282, 0.462, 0.662, 0.826, 1.0],
        &[255.0, 255.0, 95.0, 95.0, 90.0, 95.0, 95.0],
        &[255.0, 255.0, 197.0, 197.0, 186.0, 197.0, 197.0],
        &[255.0, 255.0, 255.0, 255.0, 241.0, 255.0, 255.0],
    )?)
}

/// Shared spark-burst strobe alpha. The 1.1 end point is the guard past the
/// unit domain so the final segment has nonzero length.
fn burst_alpha() -> Result<PiecewiseLinear, DefinitionError> {
    Ok(PiecewiseLinear::from_table(
        &[0.0, 0.288, 0.365, 0.471, 0.574, 0.668, 0.756, 0.853, 1.0, 1.1],
        &[255.0, 255.0, 0.0, 255.0, 0.0, 255.0, 0.0, 255.0, 255.0, 255.0],
    )?)
}

/// Shared spark-burst size pop: snap up to full size, then decay.
fn burst_size() -> Result<SizeCurve, DefinitionError> {
    Ok(SizeCurve::Hermite(HermiteSpline::from_table(&[
        (0.0, 0.0, 0.0),
        (0.154_451, 1.0, 0.0),
        (1.0, 0.0, -2.162),
    ])?))
}

/// Radial spark burst. Order three is the press burst, order four the
/// drag burst emitted along pointer travel.
pub fn ring_burst(
    order: BurstOrder,
    reference_size: f32,
) -> Result<EffectDefinition, DefinitionError> {
    let (lifetime_range, speed_range, emission, shape_radius, patterns, pattern_transparent) =
        match order {
            BurstOrder::Three => (
                (0.6, 0.7),
                (0.3, 0.4),
                EmissionMode::Single,
                0.09,
                vec![PatternId::TriangleFlipped],
                true,
            ),
            BurstOrder::Four => (
                (0.2, 0.4),
                (0.2, 0.3),
                EmissionMode::DistanceRate {
                    threshold: DISTANCE_THRESHOLD,
                },
                0.022_5,
                vec![PatternId::TriangleFlipped, PatternId::Triangle],
                false,
            ),
        };
    Ok(EffectDefinition {
        kind: EffectKind::RingBurst(order),
        lifetime_range,
        speed_range,
        size_range: (0.1, 0.2),
        color: burst_color()?,
        alpha: burst_alpha()?,
        size_curve: burst_size()?,
        rotation: None,
        initial_rotation_range: (0.0, 0.0),
        emission,
        sub_emission: Some(SubEmission {
            count: 4,
            interval: 0.010,
        }),
        spatial_scale: Vec2::ONE,
        arc_degrees: 360.0,
        shape_radius,
        reference_size,
        patterns,
        pattern_transparent,
    })
}

/// Rotating mesh-triangle flash released in a short press burst.
pub fn mesh_burst(reference_size: f32) -> Result<EffectDefinition, DefinitionError> {
    Ok(EffectDefinition {
        kind: EffectKind::MeshBurst,
        lifetime_range: (0.6, 0.6),
        speed_range: (0.0, 0.0),
        size_range: (0.1, 0.15),
        color: ColorCurve::from_table(
            &[0.0, 0.25, 1.0],
            &[255.0, 95.0, 95.0],
            &[255.0, 197.0, 197.0],
            &[255.0, 255.0, 255.0],
        )?,
        alpha: PiecewiseLinear::from_table(&[0.0, 0.6, 1.0, 1.1], &[255.0, 220.0, 0.0, 0.0])?,
        size_curve: SizeCurve::Split(PiecewiseHermite::new(
            0.154_451,
            HermiteSpline::from_table(&[(0.0, 0.0, 8.0), (0.154_451, 1.0, 0.0)])?,
            HermiteSpline::from_table(&[(0.154_451, 1.0, 0.0), (1.0, 0.55, -0.4)])?,
        )?),
        rotation: Some(RotationEnvelope::new(
            HermiteSpline::from_table(&[(0.0, 0.0, 150.0), (1.0, 90.0, 15.0)])?,
            HermiteSpline::from_table(&[(0.0, 0.0, 520.0), (1.0, 360.0, 40.0)])?,
        )),
        initial_rotation_range: (0.0, 360.0),
        emission: EmissionMode::Burst {
            count: 2,
            interval: 0.010,
        },
        sub_emission: None,
        spatial_scale: Vec2::ONE,
        arc_degrees: 360.0,
        shape_radius: 0.0,
        reference_size,
        patterns: vec![PatternId::Triangle],
        pattern_transparent: false,
    })
}

/// Builds the stock registry with all built-in kinds.
pub fn registry(reference_size: f32) -> Result<EffectRegistry, DefinitionError> {
    let mut registry = EffectRegistry::new();
    registry.register(ring(reference_size)?)?;
    registry.register(ring_burst(BurstOrder::Three, reference_size)?)?;
    registry.register(ring_burst(BurstOrder::Four, reference_size)?)?;
    registry.register(mesh_burst(reference_size)?)?;
    Ok(registry)
}
