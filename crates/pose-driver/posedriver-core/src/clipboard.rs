//! Copy/paste of driver settings between shape keys.
//!
//! The [`Clipboard`] holds at most one serializable snapshot for the lifetime of the
//! session; hosts call [`Clipboard::clear`] when the session ends.

use crate::activation::Activation;
use crate::channels::ChannelSelection;
use crate::error::{PoseDriverError, Result};
use crate::group::ObjectRef;
use crate::ids::ShapeKeyId;
use crate::pose::PoseSample;
use crate::symmetry::symmetrical_name;
use crate::system::PoseDriverSystem;
use log::debug;
use serde::{Deserialize, Serialize};

/// Settings of one driven shape key plus the group-level target it was copied from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipboardSnapshot {
    pub object: Option<String>,
    pub bone_target: String,
    pub channels: ChannelSelection,
    pub pose: PoseSample,
    pub activation: Activation,
    pub mute: bool,
}

impl ClipboardSnapshot {
    /// Left/right counterpart: mirrored bone name and pose.
    pub fn mirrored(&self) -> Self {
        Self {
            bone_target: symmetrical_name(&self.bone_target),
            pose: self.pose.mirrored(),
            ..self.clone()
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PasteOptions {
    /// Paste the left/right counterpart of the snapshot
    pub mirror: bool,
    /// Also apply object, bone and channels to the target's group
    pub include_group_settings: bool,
}

#[derive(Debug, Default)]
pub struct Clipboard {
    snapshot: Option<ClipboardSnapshot>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<&ClipboardSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_none()
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
    }

    /// Copy the settings of `id` into the clipboard, replacing any previous snapshot.
    pub fn copy(&mut self, system: &PoseDriverSystem, id: ShapeKeyId) -> Result<()> {
        let shape = system.shape_key(id)?;
        let group = system.group(shape.group())?;
        self.snapshot = Some(ClipboardSnapshot {
            object: group.object().map(str::to_string),
            bone_target: group.bone_target().to_string(),
            channels: *group.channels(),
            pose: *shape.pose(),
            activation: shape.activation().clone(),
            mute: shape.mute(),
        });
        debug!("copied pose driver settings of '{}'", shape.name());
        Ok(())
    }

    /// Apply the snapshot to `id`.
    pub fn paste(
        &self,
        system: &mut PoseDriverSystem,
        id: ShapeKeyId,
        options: PasteOptions,
    ) -> Result<()> {
        let snapshot = self
            .snapshot
            .as_ref()
            .ok_or_else(|| PoseDriverError::InvalidValue {
                reason: "clipboard is empty".to_string(),
            })?;
        let snapshot = if options.mirror {
            snapshot.mirrored()
        } else {
            snapshot.clone()
        };

        let group = system.shape_key(id)?.group();
        if options.include_group_settings {
            system.set_group_object(group, snapshot.object.clone().map(ObjectRef::armature))?;
            system.set_group_bone_target(group, &snapshot.bone_target)?;
            system.set_group_channels(group, snapshot.channels)?;
        }
        let activation = snapshot.activation;
        system.set_radius_auto_update(id, activation.radius_auto_update)?;
        system.set_radius(id, activation.radius())?;
        system.set_target(id, activation.target)?;
        system.set_falloff(id, activation.falloff)?;
        system.set_mute(id, snapshot.mute)?;
        system.set_shape_key_pose(id, snapshot.pose)
    }
}
