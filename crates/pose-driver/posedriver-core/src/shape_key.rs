//! Shape keys bound to a pose group.

use crate::activation::Activation;
use crate::ids::{GroupId, ShapeKeyId};
use crate::pose::PoseSample;
use serde::{Deserialize, Serialize};

/// Host description of a shape key offered for binding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeKeyRef {
    pub name: String,
    /// Current weight of the shape key
    pub value: f64,
    /// The basis key every other key is relative to
    pub is_reference: bool,
}

impl ShapeKeyRef {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            is_reference: false,
        }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: 1.0,
            is_reference: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrivenShapeKey {
    id: ShapeKeyId,
    name: String,
    group: GroupId,
    pose: PoseSample,
    mute: bool,
    activation: Activation,
}

impl DrivenShapeKey {
    pub(crate) fn new(name: String, group: GroupId, activation: Activation) -> Self {
        Self {
            id: ShapeKeyId::new(),
            name,
            group,
            pose: PoseSample::default(),
            mute: false,
            activation,
        }
    }

    #[inline]
    pub fn id(&self) -> ShapeKeyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn group(&self) -> GroupId {
        self.group
    }

    /// Reference pose at which the shape key is fully active.
    pub fn pose(&self) -> &PoseSample {
        &self.pose
    }

    pub fn mute(&self) -> bool {
        self.mute
    }

    pub fn activation(&self) -> &Activation {
        &self.activation
    }

    /// Host data path of the driven weight.
    pub fn weight_path(&self) -> String {
        format!("key_blocks[\"{}\"].value", self.name)
    }

    pub(crate) fn set_group(&mut self, group: GroupId) {
        self.group = group;
    }

    pub(crate) fn set_pose(&mut self, pose: PoseSample) {
        self.pose = pose;
    }

    pub(crate) fn set_mute(&mut self, mute: bool) {
        self.mute = mute;
    }

    pub(crate) fn activation_mut(&mut self) -> &mut Activation {
        &mut self.activation
    }
}
