//! Per-family distance metrics between two pose samples.
//!
//! All metrics are symmetric and return 0 for identical inputs.

use crate::channels::{ChannelSelection, DistanceFamily, RotationChannel};
use crate::math::{rotate_axis, Axis, Quat};
use crate::pose::{PoseSample, BBONE_CHANNEL_COUNT};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Normalized difference of two angles in radians.
pub fn angle(a: &[f64], b: &[f64]) -> f64 {
    (a[0] - b[0]).abs() / PI
}

/// Sign-invariant geodesic distance between two (w, x, y, z) quaternions, in [0, 1].
pub fn quaternion(a: &[f64], b: &[f64]) -> f64 {
    let dot = a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>().clamp(-1.0, 1.0);
    (2.0 * dot * dot - 1.0).clamp(-1.0, 1.0).acos() / PI
}

/// Normalized angle between `axis` rotated by `a` and by `b`, in [0, 1].
///
/// `pi/2 - asin(d)` equals `acos(d)`; the `asin` form is what the compiled
/// expression emits.
pub fn direction(a: &[f64], b: &[f64], axis: Axis) -> f64 {
    let ra = rotate_axis(to_quat(a), axis);
    let rb = rotate_axis(to_quat(b), axis);
    let dot = (ra[0] * rb[0] + ra[1] * rb[1] + ra[2] * rb[2]).clamp(-1.0, 1.0);
    (FRAC_PI_2 - dot.asin()) / PI
}

fn to_quat(v: &[f64]) -> Quat {
    [v[0], v[1], v[2], v[3]]
}

/// Which metric compares a family's sampled tuples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Euclidean,
    Angle,
    Quaternion,
    Direction(Axis),
}

impl Metric {
    pub fn of(family: DistanceFamily, selection: &ChannelSelection) -> Metric {
        match (family, selection.rotation) {
            (DistanceFamily::Rotation, Some(RotationChannel::Quaternion)) => Metric::Quaternion,
            (DistanceFamily::Rotation, Some(RotationChannel::Swing { axis })) => {
                Metric::Direction(axis)
            }
            (DistanceFamily::Rotation, Some(RotationChannel::Twist { .. })) => Metric::Angle,
            _ => Metric::Euclidean,
        }
    }

    pub fn distance(self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            Metric::Euclidean => euclidean(a, b),
            Metric::Angle => angle(a, b),
            Metric::Quaternion => quaternion(a, b),
            Metric::Direction(axis) => direction(a, b, axis),
        }
    }
}

/// Across-group L2 norm of each bendy-bone channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBoneNorms(pub [f64; BBONE_CHANNEL_COUNT]);

impl Default for BBoneNorms {
    /// Unit norms: values pass through unscaled.
    fn default() -> Self {
        Self([1.0; BBONE_CHANNEL_COUNT])
    }
}

impl BBoneNorms {
    pub fn from_poses<'a>(poses: impl IntoIterator<Item = &'a PoseSample>) -> Self {
        let mut sums = [0.0; BBONE_CHANNEL_COUNT];
        for pose in poses {
            for (sum, v) in sums.iter_mut().zip(pose.bbone.0) {
                *sum += v * v;
            }
        }
        Self(sums.map(f64::sqrt))
    }

    /// Divide by the channel norm; zero norms leave the value unscaled.
    #[inline]
    pub fn normalize(&self, index: usize, value: f64) -> f64 {
        let norm = self.0[index];
        if norm > 0.0 {
            value / norm
        } else {
            value
        }
    }
}

/// Sample the tuple a family's metric compares.
pub fn sample(
    pose: &PoseSample,
    family: DistanceFamily,
    selection: &ChannelSelection,
    norms: &BBoneNorms,
) -> Vec<f64> {
    match family {
        DistanceFamily::Location => {
            let loc = pose.location();
            selection.location.axes().map(|a| loc[a.index()]).collect()
        }
        DistanceFamily::Scale => {
            let scale = pose.scale();
            selection.scale.axes().map(|a| scale[a.index()]).collect()
        }
        DistanceFamily::Rotation => match selection.rotation {
            Some(RotationChannel::Euler { order, axes }) => {
                let euler = pose.euler(order.resolve(pose.rotation_order));
                axes.axes().map(|a| euler[a.index()]).collect()
            }
            Some(RotationChannel::Quaternion) | Some(RotationChannel::Swing { .. }) => {
                pose.quaternion().to_vec()
            }
            Some(RotationChannel::Twist { axis }) => vec![pose.twist(axis)],
            None => Vec::new(),
        },
        DistanceFamily::BBone => selection
            .bbone
            .channels()
            .map(|c| norms.normalize(c.index(), pose.bbone.get(c)))
            .collect(),
    }
}

/// Distance between two poses on one family.
pub fn family_distance(
    a: &PoseSample,
    b: &PoseSample,
    family: DistanceFamily,
    selection: &ChannelSelection,
    norms: &BBoneNorms,
) -> f64 {
    Metric::of(family, selection).distance(
        &sample(a, family, selection, norms),
        &sample(b, family, selection, norms),
    )
}
