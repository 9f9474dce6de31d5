//! Capturing a reference pose from live bone state.

use crate::channels::{AxisFlags, ChannelSelection, RotationChannel};
use crate::math::{Axis, RotationOrder};
use crate::pose::{BBoneChannel, BoneState};

fn departs(value: f64, rest: f64, tolerance: f64) -> bool {
    (value - rest).abs() > tolerance
}

/// Enable the channels of `current` whose live value left its rest value.
///
/// Channels are only ever switched on, never off, so siblings sharing the selection keep
/// what they rely on. Bendy-bone channels count only when the bone has more than one
/// segment.
pub fn detect_channels(
    state: &BoneState,
    current: &ChannelSelection,
    tolerance: f64,
) -> ChannelSelection {
    let pose = &state.pose;
    let mut selection = *current;
    let location = pose.location();
    let scale = pose.scale();
    for axis in Axis::ALL {
        if departs(location[axis.index()], 0.0, tolerance) {
            selection.location.set(axis, true);
        }
        if departs(scale[axis.index()], 1.0, tolerance) {
            selection.scale.set(axis, true);
        }
    }

    selection.rotation = match current.rotation {
        None | Some(RotationChannel::Euler { .. }) => {
            let (order, mut axes) = match current.rotation {
                Some(RotationChannel::Euler { order, axes }) => (order, axes),
                _ => (RotationOrder::Auto, AxisFlags::NONE),
            };
            let euler = pose.euler(order.resolve(pose.rotation_order));
            for axis in Axis::ALL {
                if departs(euler[axis.index()], 0.0, tolerance) {
                    axes.set(axis, true);
                }
            }
            if axes.any() {
                Some(RotationChannel::Euler { order, axes })
            } else {
                current.rotation
            }
        }
        other => other,
    };

    if state.bbone_segments > 1 {
        for channel in BBoneChannel::ALL {
            if departs(pose.bbone.get(channel), channel.default_value(), tolerance) {
                selection.bbone.set(channel, true);
            }
        }
    }
    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{EulerOrder, PoseTransform};
    use crate::pose::PoseSample;

    fn state(segments: u32) -> BoneState {
        let transform = PoseTransform::compose(
            [0.0, 0.5, 0.0],
            EulerOrder::Xyz.to_quaternion([0.0, 0.0, 0.7]),
            [1.0, 1.0, 1.0005],
        );
        BoneState {
            pose: PoseSample::new(transform).with_bbone(BBoneChannel::EaseIn, 0.4),
            bbone_segments: segments,
        }
    }

    #[test]
    fn detects_moved_channels_only() {
        let sel = detect_channels(&state(1), &ChannelSelection::default(), 0.001);
        assert_eq!(sel.location, AxisFlags::new(false, true, false));
        assert_eq!(sel.scale, AxisFlags::NONE);
        assert_eq!(
            sel.rotation,
            Some(RotationChannel::Euler {
                order: RotationOrder::Auto,
                axes: AxisFlags::new(false, false, true)
            })
        );
        assert!(!sel.bbone.any());
    }

    #[test]
    fn bendy_channels_need_segments() {
        let sel = detect_channels(&state(4), &ChannelSelection::default(), 0.001);
        assert!(sel.bbone.get(BBoneChannel::EaseIn));
        assert!(!sel.bbone.get(BBoneChannel::ScaleInX));
    }

    #[test]
    fn never_disables_existing_channels() {
        let current = ChannelSelection::default()
            .with_location(AxisFlags::new(true, false, false))
            .with_rotation(RotationChannel::Quaternion);
        let sel = detect_channels(&state(1), &current, 0.001);
        assert!(sel.location.x && sel.location.y);
        assert_eq!(sel.rotation, Some(RotationChannel::Quaternion));
    }
}
