//! Bezier keyframes generated from curve points, and their evaluation.
//!
//! Handles are computed in the curve's normalized space and then mapped with the same
//! affine transform as the points, which keeps segment shapes intact under any range.

use super::{CurvePoint, HandleType};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyframeInterpolation {
    #[default]
    Bezier,
    Linear,
    Constant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Extrapolation {
    #[default]
    Constant,
    Linear,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub co: [f64; 2],
    pub handle_left: [f64; 2],
    pub handle_right: [f64; 2],
    pub handle_left_type: HandleType,
    pub handle_right_type: HandleType,
    pub interpolation: KeyframeInterpolation,
}

impl Keyframe {
    /// Keyframe on a straight segment, with vector handles and linear interpolation.
    pub fn linear(x: f64, y: f64) -> Self {
        Self {
            co: [x, y],
            handle_left: [x, y],
            handle_right: [x, y],
            handle_left_type: HandleType::Vector,
            handle_right_type: HandleType::Vector,
            interpolation: KeyframeInterpolation::Linear,
        }
    }
}

/// Keyframes sorted by `x` plus the extrapolation mode outside them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct KeyframeCurve {
    pub keyframes: Vec<Keyframe>,
    pub extrapolation: Extrapolation,
}

#[inline]
fn cubic_bezier(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

fn slope(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = b[0] - a[0];
    if dx.abs() > f64::EPSILON {
        (b[1] - a[1]) / dx
    } else {
        0.0
    }
}

impl KeyframeCurve {
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// `(position, value, handle type)` tuples in order.
    pub fn tuples(&self) -> Vec<(f64, f64, HandleType)> {
        self.keyframes
            .iter()
            .map(|k| (k.co[0], k.co[1], k.handle_left_type))
            .collect()
    }

    /// Sample the curve. An empty curve evaluates to 0.
    pub fn evaluate(&self, x: f64) -> f64 {
        let (first, last) = match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if x <= first.co[0] {
            return match self.extrapolation {
                Extrapolation::Constant => first.co[1],
                Extrapolation::Linear => {
                    first.co[1] + slope(first.handle_left, first.co) * (x - first.co[0])
                }
            };
        }
        if x >= last.co[0] {
            return match self.extrapolation {
                Extrapolation::Constant => last.co[1],
                Extrapolation::Linear => {
                    last.co[1] + slope(last.co, last.handle_right) * (x - last.co[0])
                }
            };
        }
        let seg = self
            .keyframes
            .partition_point(|k| k.co[0] <= x)
            .saturating_sub(1);
        let a = &self.keyframes[seg];
        let b = &self.keyframes[seg + 1];
        match a.interpolation {
            KeyframeInterpolation::Constant => a.co[1],
            KeyframeInterpolation::Linear => {
                let t = (x - a.co[0]) / (b.co[0] - a.co[0]);
                a.co[1] + (b.co[1] - a.co[1]) * t
            }
            KeyframeInterpolation::Bezier => {
                let x_of =
                    |t| cubic_bezier(a.co[0], a.handle_right[0], b.handle_left[0], b.co[0], t);
                let (mut lo, mut hi) = (0.0, 1.0);
                let mut mid = 0.5;
                for _ in 0..64 {
                    mid = 0.5 * (lo + hi);
                    let value = x_of(mid);
                    if (value - x).abs() < 1e-12 {
                        break;
                    }
                    if value < x {
                        lo = mid;
                    } else {
                        hi = mid;
                    }
                }
                cubic_bezier(a.co[1], a.handle_right[1], b.handle_left[1], b.co[1], mid)
            }
        }
    }
}

/// Handles of point `i` in normalized space.
fn handles(points: &[CurvePoint], i: usize, extrapolate: bool) -> ([f64; 2], [f64; 2]) {
    let p = points[i].location;
    let prev = i.checked_sub(1).map(|j| points[j].location);
    let next = points.get(i + 1).map(|q| q.location);
    let dl = prev.map_or_else(|| next.map_or(1.0 / 3.0, |n| n[0] - p[0]), |q| p[0] - q[0]) / 3.0;
    let dr = next.map_or_else(|| prev.map_or(1.0 / 3.0, |q| p[0] - q[0]), |n| n[0] - p[0]) / 3.0;

    match points[i].handle_type {
        HandleType::Vector => {
            let left = match (prev, next) {
                (Some(q), _) => [p[0] + (q[0] - p[0]) / 3.0, p[1] + (q[1] - p[1]) / 3.0],
                (None, Some(n)) => [p[0] - (n[0] - p[0]) / 3.0, p[1] - (n[1] - p[1]) / 3.0],
                (None, None) => [p[0] - dl, p[1]],
            };
            let right = match (prev, next) {
                (_, Some(n)) => [p[0] + (n[0] - p[0]) / 3.0, p[1] + (n[1] - p[1]) / 3.0],
                (Some(q), None) => [p[0] + (p[0] - q[0]) / 3.0, p[1] + (p[1] - q[1]) / 3.0],
                (None, None) => [p[0] + dr, p[1]],
            };
            (left, right)
        }
        handle_type @ (HandleType::Auto | HandleType::AutoClamped) => {
            let s = match (prev, next) {
                (Some(q), Some(n)) => {
                    let extremum = (p[1] - q[1]) * (n[1] - p[1]) <= 0.0;
                    if handle_type == HandleType::AutoClamped && extremum {
                        0.0
                    } else {
                        slope(q, n)
                    }
                }
                (Some(q), None) if extrapolate => slope(q, p),
                (None, Some(n)) if extrapolate => slope(p, n),
                _ => 0.0,
            };
            let mut left = [p[0] - dl, p[1] - s * dl];
            let mut right = [p[0] + dr, p[1] + s * dr];
            if handle_type == HandleType::AutoClamped {
                if let Some(q) = prev {
                    left[1] = left[1].clamp(q[1].min(p[1]), q[1].max(p[1]));
                }
                if let Some(n) = next {
                    right[1] = right[1].clamp(n[1].min(p[1]), n[1].max(p[1]));
                }
            }
            (left, right)
        }
    }
}

/// Convert curve points into bezier keyframes over `x_range` and `y_range`.
///
/// Point order and handle types are preserved one to one. Ranges may be reversed; a
/// reversed `y_range` flips the curve vertically.
pub fn to_bezier(
    points: &[CurvePoint],
    x_range: (f64, f64),
    y_range: (f64, f64),
    extrapolate: bool,
) -> KeyframeCurve {
    let map = |v: [f64; 2]| {
        [
            x_range.0 + v[0] * (x_range.1 - x_range.0),
            y_range.0 + v[1] * (y_range.1 - y_range.0),
        ]
    };
    let keyframes = (0..points.len())
        .map(|i| {
            let (left, right) = handles(points, i, extrapolate);
            Keyframe {
                co: map(points[i].location),
                handle_left: map(left),
                handle_right: map(right),
                handle_left_type: points[i].handle_type,
                handle_right_type: points[i].handle_type,
                interpolation: KeyframeInterpolation::Bezier,
            }
        })
        .collect();
    KeyframeCurve {
        keyframes,
        extrapolation: if extrapolate {
            Extrapolation::Linear
        } else {
            Extrapolation::Constant
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    fn points() -> Vec<CurvePoint> {
        vec![
            CurvePoint::new(0.0, 0.0, HandleType::Vector),
            CurvePoint::new(0.4, 0.7, HandleType::AutoClamped),
            CurvePoint::new(1.0, 1.0, HandleType::Auto),
        ]
    }

    #[test]
    fn conversion_preserves_order_and_handle_types() {
        let curve = to_bezier(&points(), (2.0, 4.0), (0.0, 10.0), false);
        let tuples = curve.tuples();
        assert_eq!(tuples.len(), 3);
        assert_eq!(tuples[0], (2.0, 0.0, HandleType::Vector));
        assert!(approx(tuples[1].0, 2.8, 1e-12));
        assert!(approx(tuples[1].1, 7.0, 1e-12));
        assert_eq!(tuples[1].2, HandleType::AutoClamped);
        assert_eq!(tuples[2].2, HandleType::Auto);
        assert_eq!(curve.extrapolation, Extrapolation::Constant);
    }

    #[test]
    fn evaluation_passes_through_points_and_clamps() {
        let curve = to_bezier(&points(), (0.0, 1.0), (0.0, 1.0), false);
        assert!(approx(curve.evaluate(0.4), 0.7, 1e-9));
        assert_eq!(curve.evaluate(-1.0), 0.0);
        assert_eq!(curve.evaluate(2.0), 1.0);
    }

    #[test]
    fn linear_extrapolation_follows_end_handles() {
        let line = [
            CurvePoint::new(0.0, 0.0, HandleType::Vector),
            CurvePoint::new(1.0, 1.0, HandleType::Vector),
        ];
        let curve = to_bezier(&line, (0.0, 1.0), (0.0, 1.0), true);
        assert!(approx(curve.evaluate(1.5), 1.5, 1e-12));
        assert!(approx(curve.evaluate(-0.5), -0.5, 1e-12));
    }

    #[test]
    fn linear_keyframes_interpolate_straight() {
        let curve = KeyframeCurve {
            keyframes: vec![Keyframe::linear(0.0, 0.8), Keyframe::linear(0.2, 1.0)],
            extrapolation: Extrapolation::Constant,
        };
        assert!(approx(curve.evaluate(0.1), 0.9, 1e-12));
        assert_eq!(curve.evaluate(0.5), 1.0);
        assert_eq!(curve.evaluate(0.0), 0.8);
    }

    #[test]
    fn empty_curve_is_zero() {
        assert_eq!(KeyframeCurve::default().evaluate(0.3), 0.0);
    }
}
