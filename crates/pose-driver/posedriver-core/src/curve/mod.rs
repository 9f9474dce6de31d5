//! Falloff curves: user-authored remapping from normalized distance to weight.

pub mod easing;
pub mod keyframes;

use serde::{Deserialize, Serialize};

pub use easing::{Easing, Interpolation};
pub use keyframes::{to_bezier, Extrapolation, Keyframe, KeyframeCurve, KeyframeInterpolation};

/// Handle type of a curve point; carried unchanged onto generated keyframes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandleType {
    #[default]
    Auto,
    AutoClamped,
    Vector,
}

/// How the curve continues past its first and last points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Extend {
    #[default]
    Horizontal,
    Extrapolated,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Normalized `(x, y)`, both nominally in `[0, 1]`.
    pub location: [f64; 2],
    #[serde(default)]
    pub handle_type: HandleType,
}

impl CurvePoint {
    pub fn new(x: f64, y: f64, handle_type: HandleType) -> Self {
        Self {
            location: [x, y],
            handle_type,
        }
    }
}

/// Ordered control points sorted by `x`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveMap {
    points: Vec<CurvePoint>,
    #[serde(default)]
    pub extend: Extend,
}

impl Default for CurveMap {
    /// Identity line.
    fn default() -> Self {
        Self::linear()
    }
}

impl CurveMap {
    pub fn new(mut points: Vec<CurvePoint>, extend: Extend) -> Self {
        points.sort_by(|a, b| a.location[0].total_cmp(&b.location[0]));
        Self { points, extend }
    }

    pub fn linear() -> Self {
        Self::new(
            vec![
                CurvePoint::new(0.0, 0.0, HandleType::Vector),
                CurvePoint::new(1.0, 1.0, HandleType::Vector),
            ],
            Extend::Horizontal,
        )
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// `(position, value, handle type)` tuples in order.
    pub fn tuples(&self) -> Vec<(f64, f64, HandleType)> {
        self.points
            .iter()
            .map(|p| (p.location[0], p.location[1], p.handle_type))
            .collect()
    }

    /// Insert a point, keeping x order. Returns its index.
    pub fn insert(&mut self, point: CurvePoint) -> usize {
        let index = self
            .points
            .partition_point(|p| p.location[0] <= point.location[0]);
        self.points.insert(index, point);
        index
    }

    /// Remove a point. The first and last points are never removed.
    pub fn remove(&mut self, index: usize) -> Option<CurvePoint> {
        if self.points.len() <= 2 || index >= self.points.len() {
            return None;
        }
        Some(self.points.remove(index))
    }

    /// Evaluate in normalized space.
    pub fn evaluate(&self, x: f64) -> f64 {
        to_bezier(
            &self.points,
            (0.0, 1.0),
            (0.0, 1.0),
            self.extend == Extend::Extrapolated,
        )
        .evaluate(x)
    }
}

/// Whether the curve is generated from the interpolation/easing pair or edited by hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurveType {
    #[default]
    Preset,
    Custom,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FalloffCurve {
    pub curve_type: CurveType,
    pub interpolation: Interpolation,
    pub easing: Easing,
    pub curve: CurveMap,
}

impl Default for FalloffCurve {
    fn default() -> Self {
        Self::preset(Interpolation::Quad, Easing::EaseInOut)
    }
}

impl FalloffCurve {
    pub fn preset(interpolation: Interpolation, easing: Easing) -> Self {
        Self {
            curve_type: CurveType::Preset,
            interpolation,
            easing,
            curve: easing::preset_curve(interpolation, easing),
        }
    }

    pub fn custom(curve: CurveMap) -> Self {
        Self {
            curve_type: CurveType::Custom,
            interpolation: Interpolation::Linear,
            easing: Easing::EaseInOut,
            curve,
        }
    }

    /// Switch preset parameters and regenerate the points.
    pub fn set_preset(&mut self, interpolation: Interpolation, easing: Easing) {
        self.curve_type = CurveType::Preset;
        self.interpolation = interpolation;
        self.easing = easing;
        self.curve = easing::preset_curve(interpolation, easing);
    }

    /// Sample over the activation domain `[1 - radius, 1]`.
    ///
    /// The range is reversed so the domain start (pose at its target) maps to `target`
    /// and the domain end (pose at rest) maps to 0. Never extrapolates.
    pub fn activation_keyframes(&self, radius: f64, target: f64) -> KeyframeCurve {
        to_bezier(
            self.curve.points(),
            (1.0 - radius, 1.0),
            (target, 0.0),
            false,
        )
    }
}
