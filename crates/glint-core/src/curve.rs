//! Piecewise-interpolation primitives.
//!
//! All effect parameters (color, alpha, size, rotation) are driven by small
//! analytic curves sampled against the normalized time-in-life parameter
//! `t ∈ [0, 1]`. Two families are provided:
//! - [`PiecewiseLinear`]: clamped linear ramps over sorted control points
//! - [`HermiteSpline`]: cubic Hermite interpolation with explicit tangents,
//!   plus a two-piece [`PiecewiseHermite`] variant split at a breakpoint
//!
//! Evaluators are pure functions of `(curve, t)`. Malformed control-point
//! lists (empty, non-monotonic time axis, non-finite values) are rejected at
//! construction so evaluation never has to guard against division by zero.

use thiserror::Error;

/// Errors produced when constructing a curve from control points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    /// No control points were supplied.
    #[error("curve has no control points")]
    Empty,

    /// Hermite splines need at least two knots to form a segment.
    #[error("hermite spline needs at least 2 knots, got {0}")]
    TooFewKnots(usize),

    /// The time axis must be strictly increasing.
    #[error("time axis not strictly increasing at index {index}: {prev} -> {next}")]
    NonMonotonicTime {
        /// Index of the offending point
        index: usize,
        /// Time of the preceding point
        prev: f32,
        /// Time of the offending point
        next: f32,
    },

    /// Control values and times must be finite.
    #[error("non-finite control value at index {0}")]
    NonFinite(usize),
}

fn check_axis(times: impl Iterator<Item = f32>) -> Result<(), CurveError> {
    let mut prev: Option<f32> = None;
    for (index, t) in times.enumerate() {
        if !t.is_finite() {
            return Err(CurveError::NonFinite(index));
        }
        if let Some(p) = prev {
            if t <= p {
                return Err(CurveError::NonMonotonicTime {
                    index,
                    prev: p,
                    next: t,
                });
            }
        }
        prev = Some(t);
    }
    Ok(())
}

/// A clamped piecewise-linear ramp over `(time, value)` control points.
///
/// Outside the control-point domain the boundary value is returned verbatim
/// (no extrapolation). Curve authors conventionally append a guard point a
/// little past `t = 1.0` so the final segment has nonzero length.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinear {
    points: Vec<(f32, f32)>,
}

impl PiecewiseLinear {
    /// Builds a ramp from `(time, value)` pairs sorted strictly ascending.
    pub fn new(points: Vec<(f32, f32)>) -> Result<Self, CurveError> {
        if points.is_empty() {
            return Err(CurveError::Empty);
        }
        check_axis(points.iter().map(|p| p.0))?;
        if let Some(index) = points.iter().position(|p| !p.1.is_finite()) {
            return Err(CurveError::NonFinite(index));
        }
        Ok(Self { points })
    }

    /// Builds a ramp from parallel time/value tables.
    pub fn from_table(times: &[f32], values: &[f32]) -> Result<Self, CurveError> {
        if times.len() != values.len() {
            return Err(CurveError::Empty);
        }
        Self::new(times.iter().copied().zip(values.iter().copied()).collect())
    }

    /// Samples the ramp at `t`, clamping to the boundary values.
    #[must_use]
    pub fn eval(&self, t: f32) -> f32 {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        // Control-point counts are small (< 10), a linear scan wins.
        for pair in self.points.windows(2) {
            let (t0, v0) = pair[0];
            let (t1, v1) = pair[1];
            if t <= t1 {
                let s = (t - t0) / (t1 - t0);
                return v0 + (v1 - v0) * s;
            }
        }
        last.1
    }

    /// Value at the first control point.
    #[must_use]
    pub fn first_value(&self) -> f32 {
        self.points[0].1
    }

    /// Value at the last control point.
    #[must_use]
    pub fn last_value(&self) -> f32 {
        self.points[self.points.len() - 1].1
    }
}

/// One Hermite knot: a time, a value, and the first derivative at that time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HermiteKnot {
    /// Knot time.
    pub t: f32,
    /// Value at the knot.
    pub value: f32,
    /// First derivative at the knot.
    pub tangent: f32,
}

impl HermiteKnot {
    /// Creates a knot.
    #[must_use]
    pub const fn new(t: f32, value: f32, tangent: f32) -> Self {
        Self { t, value, tangent }
    }
}

/// A cubic Hermite spline over sorted knots.
///
/// Reproduces exact knot values and is C¹ across interior knots since both
/// adjoining segments share the knot's tangent. Input `t` is clamped to the
/// knot domain before evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct HermiteSpline {
    knots: Vec<HermiteKnot>,
}

impl HermiteSpline {
    /// Builds a spline from knots sorted strictly ascending in time.
    pub fn new(knots: Vec<HermiteKnot>) -> Result<Self, CurveError> {
        if knots.len() < 2 {
            return Err(CurveError::TooFewKnots(knots.len()));
        }
        check_axis(knots.iter().map(|k| k.t))?;
        if let Some(index) = knots
            .iter()
            .position(|k| !k.value.is_finite() || !k.tangent.is_finite())
        {
            return Err(CurveError::NonFinite(index));
        }
        Ok(Self { knots })
    }

    /// Builds a spline from `(time, value, tangent)` triples.
    pub fn from_table(knots: &[(f32, f32, f32)]) -> Result<Self, CurveError> {
        Self::new(
            knots
                .iter()
                .map(|&(t, value, tangent)| HermiteKnot::new(t, value, tangent))
                .collect(),
        )
    }

    /// Samples the spline at `t` (clamped to the knot domain).
    #[must_use]
    pub fn eval(&self, t: f32) -> f32 {
        let first = self.knots[0];
        let last = self.knots[self.knots.len() - 1];
        let t = t.clamp(first.t, last.t);
        for pair in self.knots.windows(2) {
            let k0 = pair[0];
            let k1 = pair[1];
            if t <= k1.t {
                let h = k1.t - k0.t;
                let s = (t - k0.t) / h;
                let s2 = s * s;
                let s3 = s2 * s;
                let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
                let h10 = s3 - 2.0 * s2 + s;
                let h01 = -2.0 * s3 + 3.0 * s2;
                let h11 = s3 - s2;
                return h00 * k0.value + h10 * h * k0.tangent + h01 * k1.value + h11 * h * k1.tangent;
            }
        }
        last.value
    }

    /// Value at the first knot.
    #[must_use]
    pub fn first_value(&self) -> f32 {
        self.knots[0].value
    }

    /// Value at the last knot.
    #[must_use]
    pub fn last_value(&self) -> f32 {
        self.knots[self.knots.len() - 1].value
    }
}

/// Two Hermite splines split at a breakpoint.
///
/// Some source curves are authored as two independent polynomial pieces (the
/// burst-ring size pop uses one piece up to its peak and another for the
/// decay); evaluation selects the piece by comparing `t` to the breakpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseHermite {
    breakpoint: f32,
    before: HermiteSpline,
    after: HermiteSpline,
}

impl PiecewiseHermite {
    /// Builds a split spline. The breakpoint must be finite.
    pub fn new(
        breakpoint: f32,
        before: HermiteSpline,
        after: HermiteSpline,
    ) -> Result<Self, CurveError> {
        if !breakpoint.is_finite() {
            return Err(CurveError::NonFinite(0));
        }
        Ok(Self {
            breakpoint,
            before,
            after,
        })
    }

    /// Samples whichever piece `t` falls into.
    #[must_use]
    pub fn eval(&self, t: f32) -> f32 {
        if t <= self.breakpoint {
            self.before.eval(t)
        } else {
            self.after.eval(t)
        }
    }
}

/// Size-over-lifetime curve: a single spline or a split pair.
#[derive(Debug, Clone, PartialEq)]
pub enum SizeCurve {
    /// One Hermite spline across the whole lifetime.
    Hermite(HermiteSpline),
    /// Two pieces split at a breakpoint.
    Split(PiecewiseHermite),
}

impl SizeCurve {
    /// Samples the size multiplier at `t`.
    #[must_use]
    pub fn eval(&self, t: f32) -> f32 {
        match self {
            Self::Hermite(spline) => spline.eval(t),
            Self::Split(split) => split.eval(t),
        }
    }
}

/// Three independent piecewise-linear channels forming an RGB ramp.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorCurve {
    r: PiecewiseLinear,
    g: PiecewiseLinear,
    b: PiecewiseLinear,
}

impl ColorCurve {
    /// Bundles three channel ramps.
    #[must_use]
    pub const fn new(r: PiecewiseLinear, g: PiecewiseLinear, b: PiecewiseLinear) -> Self {
        Self { r, g, b }
    }

    /// Builds all three channels over a shared time axis.
    pub fn from_table(
        times: &[f32],
        r: &[f32],
        g: &[f32],
        b: &[f32],
    ) -> Result<Self, CurveError> {
        Ok(Self::new(
            PiecewiseLinear::from_table(times, r)?,
            PiecewiseLinear::from_table(times, g)?,
            PiecewiseLinear::from_table(times, b)?,
        ))
    }

    /// Samples the ramp at `t` as 8-bit RGB.
    #[must_use]
    pub fn eval(&self, t: f32) -> [u8; 3] {
        [
            channel_u8(self.r.eval(t)),
            channel_u8(self.g.eval(t)),
            channel_u8(self.b.eval(t)),
        ]
    }
}

/// Clamps a sampled channel value into `0..=255`.
#[must_use]
pub fn channel_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
