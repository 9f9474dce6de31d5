//! Preset falloff shapes generated from an interpolation/easing pair.

use super::{CurveMap, CurvePoint, Extend, HandleType};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Interpolation {
    Linear,
    Sine,
    Quad,
    Cubic,
    Quart,
    Quint,
    Expo,
    Circ,
}

impl Interpolation {
    pub const ALL: [Interpolation; 8] = [
        Interpolation::Linear,
        Interpolation::Sine,
        Interpolation::Quad,
        Interpolation::Cubic,
        Interpolation::Quart,
        Interpolation::Quint,
        Interpolation::Expo,
        Interpolation::Circ,
    ];

    /// The ease-in form of the curve on `[0, 1]`.
    fn ease_in(self, t: f64) -> f64 {
        match self {
            Interpolation::Linear => t,
            Interpolation::Sine => 1.0 - (t * FRAC_PI_2).cos(),
            Interpolation::Quad => t * t,
            Interpolation::Cubic => t.powi(3),
            Interpolation::Quart => t.powi(4),
            Interpolation::Quint => t.powi(5),
            Interpolation::Expo => {
                if t <= 0.0 {
                    0.0
                } else {
                    (2.0f64).powf(10.0 * t - 10.0)
                }
            }
            Interpolation::Circ => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Easing {
    EaseIn,
    EaseOut,
    EaseInOut,
}

/// Evaluate the analytic easing function the preset approximates.
pub fn ease(interpolation: Interpolation, easing: Easing, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    match easing {
        Easing::EaseIn => interpolation.ease_in(t),
        Easing::EaseOut => 1.0 - interpolation.ease_in(1.0 - t),
        Easing::EaseInOut => {
            if t < 0.5 {
                interpolation.ease_in(2.0 * t) * 0.5
            } else {
                1.0 - interpolation.ease_in(2.0 - 2.0 * t) * 0.5
            }
        }
    }
}

const PRESET_SAMPLES: usize = 5;

/// Sample the easing function into auto-clamped control points. Linear presets are two
/// vector points so the segment stays straight.
pub fn preset_curve(interpolation: Interpolation, easing: Easing) -> CurveMap {
    if interpolation == Interpolation::Linear {
        return CurveMap::linear();
    }
    let last = (PRESET_SAMPLES - 1) as f64;
    let points = (0..PRESET_SAMPLES)
        .map(|i| {
            let x = i as f64 / last;
            CurvePoint::new(x, ease(interpolation, easing, x), HandleType::AutoClamped)
        })
        .collect();
    CurveMap::new(points, Extend::Horizontal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn ease_in_out_is_symmetric() {
        for interpolation in Interpolation::ALL {
            let a = ease(interpolation, Easing::EaseInOut, 0.3);
            let b = ease(interpolation, Easing::EaseInOut, 0.7);
            assert!(approx(a + b, 1.0, 1e-12), "{interpolation:?}");
        }
    }

    #[test]
    fn preset_points_follow_easing() {
        let curve = preset_curve(Interpolation::Quad, Easing::EaseIn);
        let points = curve.points();
        assert_eq!(points.len(), PRESET_SAMPLES);
        assert!(approx(points[2].location[1], 0.25, 1e-12));
        assert!(points.iter().all(|p| p.handle_type == HandleType::AutoClamped));
    }
}
