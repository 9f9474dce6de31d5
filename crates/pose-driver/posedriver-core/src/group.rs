//! Pose groups: shape keys sharing one bone target, channel selection and rest pose.

use crate::channels::ChannelSelection;
use crate::expr::BoneTarget;
use crate::ids::{GroupId, ShapeKeyId};
use crate::pose::PoseSample;
use serde::{Deserialize, Serialize};

/// Kind of scene object a group may reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObjectKind {
    Armature,
    Mesh,
    Empty,
    Other(String),
}

impl ObjectKind {
    pub fn name(&self) -> &str {
        match self {
            ObjectKind::Armature => "ARMATURE",
            ObjectKind::Mesh => "MESH",
            ObjectKind::Empty => "EMPTY",
            ObjectKind::Other(name) => name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub name: String,
    pub kind: ObjectKind,
}

impl ObjectRef {
    pub fn armature(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ObjectKind::Armature,
        }
    }
}

/// Mutated only through [`crate::PoseDriverSystem`] so the distance matrix and drivers
/// stay consistent with membership.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseGroup {
    id: GroupId,
    name: String,
    object: Option<String>,
    bone_target: String,
    channels: ChannelSelection,
    rest: PoseSample,
    members: Vec<ShapeKeyId>,
}

impl PoseGroup {
    pub(crate) fn new(name: String) -> Self {
        Self {
            id: GroupId::new(),
            name,
            object: None,
            bone_target: String::new(),
            channels: ChannelSelection::default(),
            rest: PoseSample::default(),
            members: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the armature object, if set.
    pub fn object(&self) -> Option<&str> {
        self.object.as_deref()
    }

    pub fn bone_target(&self) -> &str {
        &self.bone_target
    }

    pub fn channels(&self) -> &ChannelSelection {
        &self.channels
    }

    pub fn rest(&self) -> &PoseSample {
        &self.rest
    }

    /// Member shape keys in binding order.
    pub fn members(&self) -> &[ShapeKeyId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Any channel participates in distance computation.
    pub fn is_enabled(&self) -> bool {
        self.channels.is_enabled()
    }

    /// An armature and a bone are both set.
    pub fn is_valid(&self) -> bool {
        self.object.is_some() && !self.bone_target.is_empty()
    }

    pub fn target(&self) -> BoneTarget {
        BoneTarget::new(self.object.clone().unwrap_or_default(), self.bone_target.clone())
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_object(&mut self, object: Option<String>) {
        self.object = object;
    }

    pub(crate) fn set_bone_target(&mut self, bone: String) {
        self.bone_target = bone;
    }

    pub(crate) fn set_channels(&mut self, channels: ChannelSelection) {
        self.channels = channels;
    }

    pub(crate) fn set_rest(&mut self, rest: PoseSample) {
        self.rest = rest;
    }

    pub(crate) fn push_member(&mut self, id: ShapeKeyId) {
        if !self.members.contains(&id) {
            self.members.push(id);
        }
    }

    pub(crate) fn remove_member(&mut self, id: ShapeKeyId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != id);
        before != self.members.len()
    }
}

/// Pick `basis` or the first free `basis.NNN` suffix.
pub fn unique_name<'a>(basis: &str, taken: impl Iterator<Item = &'a str> + Clone) -> String {
    let basis = basis.trim();
    let is_taken = |candidate: &str| taken.clone().any(|n| n == candidate);
    if !is_taken(basis) {
        return basis.to_string();
    }
    (1..)
        .map(|index| format!("{basis}.{index:03}"))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| basis.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_name_appends_counter() {
        let taken = ["PoseTarget", "PoseTarget.001"];
        assert_eq!(unique_name("Elbow", taken.iter().copied()), "Elbow");
        assert_eq!(
            unique_name("PoseTarget", taken.iter().copied()),
            "PoseTarget.002"
        );
    }

    #[test]
    fn new_group_is_empty_and_disabled() {
        let group = PoseGroup::new("PoseTarget".into());
        assert!(group.is_empty());
        assert!(!group.is_enabled());
        assert!(!group.is_valid());
    }
}
