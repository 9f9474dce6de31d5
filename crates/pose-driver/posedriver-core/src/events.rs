//! Change notifications emitted by the registry.
//!
//! Events are immutable records appended after a mutation has completed; consumers
//! never mutate state from inside a notification.

use crate::ids::{GroupId, ShapeKeyId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PoseDriverEvent {
    GroupCreated {
        group: GroupId,
        name: String,
    },
    GroupRemoved {
        group: GroupId,
        name: String,
    },
    GroupRenamed {
        group: GroupId,
        previous: String,
        name: String,
    },
    GroupObjectChanged {
        group: GroupId,
        object: Option<String>,
    },
    GroupBoneTargetChanged {
        group: GroupId,
        previous: String,
        bone: String,
    },
    GroupChannelsChanged {
        group: GroupId,
    },
    GroupRestChanged {
        group: GroupId,
    },
    ShapeKeyCreated {
        shape_key: ShapeKeyId,
        group: GroupId,
        name: String,
    },
    ShapeKeyRemoved {
        shape_key: ShapeKeyId,
        name: String,
    },
    ShapeKeyMoved {
        shape_key: ShapeKeyId,
        from: GroupId,
        to: GroupId,
    },
    ShapeKeyPoseChanged {
        shape_key: ShapeKeyId,
    },
    ShapeKeyMuteChanged {
        shape_key: ShapeKeyId,
        mute: bool,
    },
    RadiusChanged {
        shape_key: ShapeKeyId,
        radius: f64,
    },
    TargetChanged {
        shape_key: ShapeKeyId,
        target: f64,
    },
    FalloffChanged {
        shape_key: ShapeKeyId,
    },
    DriverRebuilt {
        shape_key: ShapeKeyId,
        families: usize,
    },
}

impl PoseDriverEvent {
    /// Get the name of this event type
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::GroupCreated { .. } => "group_created",
            Self::GroupRemoved { .. } => "group_removed",
            Self::GroupRenamed { .. } => "group_renamed",
            Self::GroupObjectChanged { .. } => "group_object_changed",
            Self::GroupBoneTargetChanged { .. } => "group_bone_target_changed",
            Self::GroupChannelsChanged { .. } => "group_channels_changed",
            Self::GroupRestChanged { .. } => "group_rest_changed",
            Self::ShapeKeyCreated { .. } => "shape_key_created",
            Self::ShapeKeyRemoved { .. } => "shape_key_removed",
            Self::ShapeKeyMoved { .. } => "shape_key_moved",
            Self::ShapeKeyPoseChanged { .. } => "shape_key_pose_changed",
            Self::ShapeKeyMuteChanged { .. } => "shape_key_mute_changed",
            Self::RadiusChanged { .. } => "radius_changed",
            Self::TargetChanged { .. } => "target_changed",
            Self::FalloffChanged { .. } => "falloff_changed",
            Self::DriverRebuilt { .. } => "driver_rebuilt",
        }
    }

    /// Check if this is a group-level event
    #[inline]
    pub fn is_group_event(&self) -> bool {
        matches!(
            self,
            Self::GroupCreated { .. }
                | Self::GroupRemoved { .. }
                | Self::GroupRenamed { .. }
                | Self::GroupObjectChanged { .. }
                | Self::GroupBoneTargetChanged { .. }
                | Self::GroupChannelsChanged { .. }
                | Self::GroupRestChanged { .. }
        )
    }

    /// The shape key this event concerns, if any
    pub fn shape_key(&self) -> Option<ShapeKeyId> {
        match self {
            Self::ShapeKeyCreated { shape_key, .. }
            | Self::ShapeKeyRemoved { shape_key, .. }
            | Self::ShapeKeyMoved { shape_key, .. }
            | Self::ShapeKeyPoseChanged { shape_key }
            | Self::ShapeKeyMuteChanged { shape_key, .. }
            | Self::RadiusChanged { shape_key, .. }
            | Self::TargetChanged { shape_key, .. }
            | Self::FalloffChanged { shape_key }
            | Self::DriverRebuilt { shape_key, .. } => Some(*shape_key),
            _ => None,
        }
    }
}

/// Bounded queue of events waiting for the host to drain them.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<PoseDriverEvent>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append an event, dropping the oldest when full
    pub fn push(&mut self, event: PoseDriverEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<PoseDriverEvent> {
        self.events.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoseDriverEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_is_bounded() {
        let mut log = EventLog::new(2);
        let group = GroupId::new();
        for _ in 0..3 {
            log.push(PoseDriverEvent::GroupChannelsChanged { group });
        }
        log.push(PoseDriverEvent::GroupRestChanged { group });
        assert_eq!(log.len(), 2);
        let drained = log.drain();
        assert_eq!(drained[1].name(), "group_rest_changed");
        assert!(log.is_empty());
    }

    #[test]
    fn classifies_events() {
        let id = ShapeKeyId::new();
        let event = PoseDriverEvent::RadiusChanged {
            shape_key: id,
            radius: 0.3,
        };
        assert!(!event.is_group_event());
        assert_eq!(event.shape_key(), Some(id));
    }
}
