//! Channel selection: which pose components participate in distance computation.

use crate::math::{Axis, RotationOrder};
use crate::pose::{BBoneChannel, BBONE_CHANNEL_COUNT};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct AxisFlags {
    #[serde(default)]
    pub x: bool,
    #[serde(default)]
    pub y: bool,
    #[serde(default)]
    pub z: bool,
}

impl AxisFlags {
    pub const NONE: AxisFlags = AxisFlags::new(false, false, false);
    pub const ALL: AxisFlags = AxisFlags::new(true, true, true);

    pub const fn new(x: bool, y: bool, z: bool) -> Self {
        Self { x, y, z }
    }

    pub fn get(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn set(&mut self, axis: Axis, enabled: bool) {
        match axis {
            Axis::X => self.x = enabled,
            Axis::Y => self.y = enabled,
            Axis::Z => self.z = enabled,
        }
    }

    pub fn any(&self) -> bool {
        self.x || self.y || self.z
    }

    /// Enabled axes in X, Y, Z order.
    pub fn axes(&self) -> impl Iterator<Item = Axis> + '_ {
        Axis::ALL.into_iter().filter(|a| self.get(*a))
    }
}

/// Rotation representation. Exactly one is active, so the rotation metric is never ambiguous.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "UPPERCASE")]
pub enum RotationChannel {
    Euler {
        #[serde(default)]
        order: RotationOrder,
        axes: AxisFlags,
    },
    Quaternion,
    Swing {
        #[serde(default)]
        axis: Axis,
    },
    Twist {
        #[serde(default)]
        axis: Axis,
    },
}

impl RotationChannel {
    pub fn is_enabled(&self) -> bool {
        match self {
            RotationChannel::Euler { axes, .. } => axes.any(),
            _ => true,
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            RotationChannel::Euler { .. } => "EULER",
            RotationChannel::Quaternion => "QUATERNION",
            RotationChannel::Swing { .. } => "SWING",
            RotationChannel::Twist { .. } => "TWIST",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BBoneFlags(pub [bool; BBONE_CHANNEL_COUNT]);

impl BBoneFlags {
    pub fn get(&self, channel: BBoneChannel) -> bool {
        self.0[channel.index()]
    }

    pub fn set(&mut self, channel: BBoneChannel, enabled: bool) {
        self.0[channel.index()] = enabled;
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|f| *f)
    }

    pub fn channels(&self) -> impl Iterator<Item = BBoneChannel> + '_ {
        BBoneChannel::ALL.into_iter().filter(|c| self.get(*c))
    }
}

/// One independently-computed distance family. Order of declaration is the order of
/// the per-family backing fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistanceFamily {
    Location,
    Rotation,
    Scale,
    BBone,
}

impl DistanceFamily {
    pub fn name(self) -> &'static str {
        match self {
            DistanceFamily::Location => "location",
            DistanceFamily::Rotation => "rotation",
            DistanceFamily::Scale => "scale",
            DistanceFamily::BBone => "bbone",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChannelSelection {
    #[serde(default)]
    pub location: AxisFlags,
    #[serde(default)]
    pub rotation: Option<RotationChannel>,
    #[serde(default)]
    pub scale: AxisFlags,
    #[serde(default)]
    pub bbone: BBoneFlags,
}

impl ChannelSelection {
    pub fn with_location(mut self, axes: AxisFlags) -> Self {
        self.location = axes;
        self
    }

    pub fn with_rotation(mut self, rotation: RotationChannel) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_scale(mut self, axes: AxisFlags) -> Self {
        self.scale = axes;
        self
    }

    pub fn with_bbone(mut self, channel: BBoneChannel) -> Self {
        self.bbone.set(channel, true);
        self
    }

    /// Active families in backing-field order.
    pub fn families(&self) -> Vec<DistanceFamily> {
        let mut out = Vec::with_capacity(4);
        if self.location.any() {
            out.push(DistanceFamily::Location);
        }
        if self.rotation.is_some_and(|r| r.is_enabled()) {
            out.push(DistanceFamily::Rotation);
        }
        if self.scale.any() {
            out.push(DistanceFamily::Scale);
        }
        if self.bbone.any() {
            out.push(DistanceFamily::BBone);
        }
        out
    }

    pub fn is_enabled(&self) -> bool {
        !self.families().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_follow_backing_order() {
        let sel = ChannelSelection::default()
            .with_bbone(BBoneChannel::EaseIn)
            .with_location(AxisFlags::new(true, false, false))
            .with_rotation(RotationChannel::Quaternion);
        assert_eq!(
            sel.families(),
            vec![
                DistanceFamily::Location,
                DistanceFamily::Rotation,
                DistanceFamily::BBone
            ]
        );
    }

    #[test]
    fn euler_without_axes_is_disabled() {
        let sel = ChannelSelection::default().with_rotation(RotationChannel::Euler {
            order: RotationOrder::Auto,
            axes: AxisFlags::NONE,
        });
        assert!(!sel.is_enabled());
    }

    #[test]
    fn rotation_serializes_with_mode_tag() {
        let rot = RotationChannel::Swing { axis: Axis::Z };
        let json = serde_json::to_string(&rot).unwrap();
        assert_eq!(json, r#"{"mode":"SWING","axis":"Z"}"#);
    }
}
