//! Pose samples: one bone's local transform plus its bendy-bone channels.

use crate::math::{Axis, EulerOrder, PoseTransform, Quat};
use serde::{Deserialize, Serialize};

/// Bendy-bone shape channels, in the order they are stored and compiled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BBoneChannel {
    CurveInX,
    CurveInY,
    CurveInZ,
    CurveOutX,
    CurveOutY,
    CurveOutZ,
    EaseIn,
    EaseOut,
    RollIn,
    RollOut,
    ScaleInX,
    ScaleInY,
    ScaleInZ,
    ScaleOutX,
    ScaleOutY,
    ScaleOutZ,
}

pub const BBONE_CHANNEL_COUNT: usize = 16;

impl BBoneChannel {
    pub const ALL: [BBoneChannel; BBONE_CHANNEL_COUNT] = [
        BBoneChannel::CurveInX,
        BBoneChannel::CurveInY,
        BBoneChannel::CurveInZ,
        BBoneChannel::CurveOutX,
        BBoneChannel::CurveOutY,
        BBoneChannel::CurveOutZ,
        BBoneChannel::EaseIn,
        BBoneChannel::EaseOut,
        BBoneChannel::RollIn,
        BBoneChannel::RollOut,
        BBoneChannel::ScaleInX,
        BBoneChannel::ScaleInY,
        BBoneChannel::ScaleInZ,
        BBoneChannel::ScaleOutX,
        BBoneChannel::ScaleOutY,
        BBoneChannel::ScaleOutZ,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Rest value of the channel: 1.0 for scale channels, 0.0 otherwise.
    pub fn default_value(self) -> f64 {
        if self.is_scale() {
            1.0
        } else {
            0.0
        }
    }

    pub fn is_scale(self) -> bool {
        self.index() >= BBoneChannel::ScaleInX.index()
    }

    /// Property path on the pose bone. Scale channels are vector properties.
    pub fn property_path(self) -> &'static str {
        match self {
            BBoneChannel::CurveInX => "bbone_curveinx",
            BBoneChannel::CurveInY => "bbone_curveiny",
            BBoneChannel::CurveInZ => "bbone_curveinz",
            BBoneChannel::CurveOutX => "bbone_curveoutx",
            BBoneChannel::CurveOutY => "bbone_curveouty",
            BBoneChannel::CurveOutZ => "bbone_curveoutz",
            BBoneChannel::EaseIn => "bbone_easein",
            BBoneChannel::EaseOut => "bbone_easeout",
            BBoneChannel::RollIn => "bbone_rollin",
            BBoneChannel::RollOut => "bbone_rollout",
            BBoneChannel::ScaleInX => "bbone_scalein[0]",
            BBoneChannel::ScaleInY => "bbone_scalein[1]",
            BBoneChannel::ScaleInZ => "bbone_scalein[2]",
            BBoneChannel::ScaleOutX => "bbone_scaleout[0]",
            BBoneChannel::ScaleOutY => "bbone_scaleout[1]",
            BBoneChannel::ScaleOutZ => "bbone_scaleout[2]",
        }
    }

    /// Whether mirroring across X flips the sign of this channel.
    pub fn mirrors_sign(self) -> bool {
        matches!(
            self,
            BBoneChannel::CurveInX
                | BBoneChannel::CurveOutX
                | BBoneChannel::RollIn
                | BBoneChannel::RollOut
        )
    }
}

/// The 16 bendy-bone channel values of a pose.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBoneValues(pub [f64; BBONE_CHANNEL_COUNT]);

impl Default for BBoneValues {
    fn default() -> Self {
        Self(BBoneChannel::ALL.map(BBoneChannel::default_value))
    }
}

impl BBoneValues {
    #[inline]
    pub fn get(&self, channel: BBoneChannel) -> f64 {
        self.0[channel.index()]
    }

    #[inline]
    pub fn set(&mut self, channel: BBoneChannel, value: f64) {
        self.0[channel.index()] = value;
    }
}

/// Immutable snapshot of a bone pose.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct PoseSample {
    #[serde(default)]
    pub transform: PoseTransform,
    /// The bone's configured Euler order, used by `RotationOrder::Auto`.
    #[serde(default)]
    pub rotation_order: EulerOrder,
    #[serde(default)]
    pub bbone: BBoneValues,
}

impl PoseSample {
    pub fn new(transform: PoseTransform) -> Self {
        Self {
            transform,
            ..Default::default()
        }
    }

    pub fn with_rotation_order(mut self, order: EulerOrder) -> Self {
        self.rotation_order = order;
        self
    }

    pub fn with_bbone(mut self, channel: BBoneChannel, value: f64) -> Self {
        self.bbone.set(channel, value);
        self
    }

    pub fn location(&self) -> [f64; 3] {
        self.transform.location()
    }

    pub fn scale(&self) -> [f64; 3] {
        self.transform.scale()
    }

    pub fn quaternion(&self) -> Quat {
        self.transform.quaternion()
    }

    pub fn euler(&self, order: EulerOrder) -> [f64; 3] {
        self.transform.euler(order)
    }

    pub fn swing(&self, axis: Axis) -> [f64; 2] {
        self.transform.swing(axis)
    }

    pub fn twist(&self, axis: Axis) -> f64 {
        self.transform.twist(axis)
    }

    /// Mirror across the X=0 plane, flipping the sideways bendy-bone channels.
    pub fn mirrored(&self) -> Self {
        let mut bbone = self.bbone;
        for channel in BBoneChannel::ALL {
            if channel.mirrors_sign() {
                bbone.set(channel, -bbone.get(channel));
            }
        }
        Self {
            transform: self.transform.mirrored_x(),
            rotation_order: self.rotation_order,
            bbone,
        }
    }
}

/// Live state of a pose bone as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoneState {
    pub pose: PoseSample,
    /// Bendy-bone segment count; bendy channels only matter above one segment.
    pub bbone_segments: u32,
}

impl BoneState {
    pub fn new(pose: PoseSample) -> Self {
        Self {
            pose,
            bbone_segments: 1,
        }
    }
}

/// Host collaborator that reports live bone state by object and bone name.
pub trait PoseSource {
    fn bone_state(&self, object: &str, bone: &str) -> Option<BoneState>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbone_defaults_are_rest_values() {
        let values = BBoneValues::default();
        assert_eq!(values.get(BBoneChannel::EaseIn), 0.0);
        assert_eq!(values.get(BBoneChannel::ScaleOutZ), 1.0);
        assert_eq!(BBoneChannel::ScaleInX.index(), 10);
        assert!(BBoneChannel::ScaleInX.is_scale());
        assert!(!BBoneChannel::RollOut.is_scale());
    }

    #[test]
    fn mirrored_flips_sideways_channels() {
        let pose = PoseSample::default()
            .with_bbone(BBoneChannel::CurveInX, 0.4)
            .with_bbone(BBoneChannel::CurveInZ, 0.2);
        let m = pose.mirrored();
        assert_eq!(m.bbone.get(BBoneChannel::CurveInX), -0.4);
        assert_eq!(m.bbone.get(BBoneChannel::CurveInZ), 0.2);
    }
}
