//! The registry aggregate: owns groups, bound shape keys and the generated side tables.
//!
//! Every mutation runs to completion before returning. A change to a group's rest pose,
//! channels, target or membership runs the update pipeline in a fixed order:
//! distance matrix, radii, driver regeneration, falloff resampling.

use crate::activation::Activation;
use crate::capture::detect_channels;
use crate::channels::ChannelSelection;
use crate::config::PoseDriverConfig;
use crate::curve::FalloffCurve;
use crate::distance::{distance_matrix, DistanceMatrix};
use crate::driver::{build_driver, DistanceData, DriverEvaluation, ShapeKeyDriver};
use crate::error::{PoseDriverError, Result};
use crate::events::{EventLog, PoseDriverEvent};
use crate::group::{unique_name, ObjectKind, ObjectRef, PoseGroup};
use crate::ids::{GroupId, ShapeKeyId};
use crate::metrics::BBoneNorms;
use crate::pose::{PoseSample, PoseSource};
use crate::shape_key::{DrivenShapeKey, ShapeKeyRef};
use hashbrown::HashMap;
use log::{debug, warn};

pub struct PoseDriverSystem {
    config: PoseDriverConfig,
    groups: Vec<PoseGroup>,
    active_group: usize,
    shape_keys: HashMap<ShapeKeyId, DrivenShapeKey>,
    drivers: HashMap<ShapeKeyId, ShapeKeyDriver>,
    distances: HashMap<ShapeKeyId, DistanceData>,
    events: EventLog,
}

impl Default for PoseDriverSystem {
    fn default() -> Self {
        Self::with_valid_config(PoseDriverConfig::default())
    }
}

impl PoseDriverSystem {
    pub fn new(config: PoseDriverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: PoseDriverConfig) -> Self {
        let events = EventLog::new(config.max_events);
        Self {
            config,
            groups: Vec::new(),
            active_group: 0,
            shape_keys: HashMap::new(),
            drivers: HashMap::new(),
            distances: HashMap::new(),
            events,
        }
    }

    pub fn config(&self) -> &PoseDriverConfig {
        &self.config
    }

    // ---------------------------------------------------------------------------------
    // Lookup

    pub fn groups(&self) -> impl Iterator<Item = &PoseGroup> {
        self.groups.iter()
    }

    pub fn group(&self, id: GroupId) -> Result<&PoseGroup> {
        self.groups
            .iter()
            .find(|g| g.id() == id)
            .ok_or_else(|| PoseDriverError::GroupNotFound {
                name: id.to_string(),
            })
    }

    pub fn group_by_name(&self, name: &str) -> Result<&PoseGroup> {
        self.groups
            .iter()
            .find(|g| g.name() == name)
            .ok_or_else(|| PoseDriverError::GroupNotFound {
                name: name.to_string(),
            })
    }

    pub fn active_group(&self) -> Option<GroupId> {
        self.groups.get(self.active_group).map(PoseGroup::id)
    }

    pub fn set_active_group(&mut self, id: GroupId) -> Result<()> {
        self.active_group = self.group_index(id)?;
        Ok(())
    }

    pub fn shape_key(&self, id: ShapeKeyId) -> Result<&DrivenShapeKey> {
        self.shape_keys
            .get(&id)
            .ok_or_else(|| PoseDriverError::ShapeKeyNotFound {
                name: id.to_string(),
            })
    }

    pub fn shape_key_by_name(&self, name: &str) -> Result<&DrivenShapeKey> {
        self.shape_keys
            .values()
            .find(|s| s.name() == name)
            .ok_or_else(|| PoseDriverError::ShapeKeyNotFound {
                name: name.to_string(),
            })
    }

    /// Members of a group in binding order.
    pub fn members(&self, group: GroupId) -> Result<Vec<&DrivenShapeKey>> {
        let group = self.group(group)?;
        Ok(group
            .members()
            .iter()
            .filter_map(|id| self.shape_keys.get(id))
            .collect())
    }

    pub fn driver(&self, id: ShapeKeyId) -> Option<&ShapeKeyDriver> {
        self.drivers.get(&id)
    }

    pub fn distance_data(&self, id: ShapeKeyId) -> Option<&DistanceData> {
        self.distances.get(&id)
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<PoseDriverEvent> {
        self.events.drain()
    }

    fn group_index(&self, id: GroupId) -> Result<usize> {
        self.groups
            .iter()
            .position(|g| g.id() == id)
            .ok_or_else(|| PoseDriverError::GroupNotFound {
                name: id.to_string(),
            })
    }

    fn group_mut(&mut self, id: GroupId) -> Result<&mut PoseGroup> {
        let index = self.group_index(id)?;
        Ok(&mut self.groups[index])
    }

    fn shape_key_mut(&mut self, id: ShapeKeyId) -> Result<&mut DrivenShapeKey> {
        self.shape_keys
            .get_mut(&id)
            .ok_or_else(|| PoseDriverError::ShapeKeyNotFound {
                name: id.to_string(),
            })
    }

    // ---------------------------------------------------------------------------------
    // Groups

    /// Create a group. Duplicate names are suffixed (`name.001`, ...).
    pub fn create_group(&mut self, name: Option<&str>) -> GroupId {
        let basis = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.config.default_group_name)
            .to_string();
        let name = unique_name(&basis, self.groups.iter().map(PoseGroup::name));
        let group = PoseGroup::new(name.clone());
        let id = group.id();
        self.groups.push(group);
        self.active_group = self.groups.len() - 1;
        debug!("created pose group '{name}'");
        self.events.push(PoseDriverEvent::GroupCreated { group: id, name });
        id
    }

    /// Remove an empty group. Fails without any change while members remain.
    pub fn remove_group(&mut self, id: GroupId) -> Result<()> {
        let index = self.group_index(id)?;
        let group = &self.groups[index];
        if !group.is_empty() {
            warn!(
                "refusing to remove pose group '{}' with {} members",
                group.name(),
                group.len()
            );
            return Err(PoseDriverError::GroupNotEmpty {
                name: group.name().to_string(),
                members: group.len(),
            });
        }
        let group = self.groups.remove(index);
        if self.active_group >= index && self.active_group > 0 {
            self.active_group -= 1;
        }
        self.events.push(PoseDriverEvent::GroupRemoved {
            group: id,
            name: group.name().to_string(),
        });
        Ok(())
    }

    /// Rename a group, suffixing on collision. Returns the name actually assigned.
    pub fn rename_group(&mut self, id: GroupId, name: &str) -> Result<String> {
        let index = self.group_index(id)?;
        let previous = self.groups[index].name().to_string();
        if previous == name {
            return Ok(previous);
        }
        if name.trim().is_empty() {
            return Err(PoseDriverError::InvalidValue {
                reason: "group name must not be empty".to_string(),
            });
        }
        let name = unique_name(
            name,
            self.groups
                .iter()
                .filter(|g| g.id() != id)
                .map(PoseGroup::name),
        );
        self.groups[index].set_name(name.clone());
        self.events.push(PoseDriverEvent::GroupRenamed {
            group: id,
            previous,
            name: name.clone(),
        });
        Ok(name)
    }

    /// Point the group at an armature. Any other object kind is rejected.
    pub fn set_group_object(&mut self, id: GroupId, object: Option<ObjectRef>) -> Result<()> {
        if let Some(obj) = &object {
            if obj.kind != ObjectKind::Armature {
                warn!("object '{}' is not an armature", obj.name);
                return Err(PoseDriverError::TypeMismatch {
                    expected: ObjectKind::Armature.name().to_string(),
                    actual: obj.kind.name().to_string(),
                });
            }
        }
        let name = object.map(|o| o.name);
        self.group_mut(id)?.set_object(name.clone());
        self.events
            .push(PoseDriverEvent::GroupObjectChanged { group: id, object: name });
        self.refresh_group(id, true)
    }

    pub fn set_group_bone_target(&mut self, id: GroupId, bone: &str) -> Result<()> {
        let group = self.group_mut(id)?;
        let previous = group.bone_target().to_string();
        group.set_bone_target(bone.to_string());
        self.events.push(PoseDriverEvent::GroupBoneTargetChanged {
            group: id,
            previous,
            bone: bone.to_string(),
        });
        self.refresh_group(id, true)
    }

    pub fn set_group_channels(&mut self, id: GroupId, channels: ChannelSelection) -> Result<()> {
        self.group_mut(id)?.set_channels(channels);
        self.events
            .push(PoseDriverEvent::GroupChannelsChanged { group: id });
        self.refresh_group(id, true)
    }

    pub fn set_group_rest(&mut self, id: GroupId, rest: PoseSample) -> Result<()> {
        self.group_mut(id)?.set_rest(rest);
        self.events.push(PoseDriverEvent::GroupRestChanged { group: id });
        self.refresh_group(id, true)
    }

    // ---------------------------------------------------------------------------------
    // Shape keys

    /// Bind a shape key to `group`, or to the active group, creating one if none exists.
    ///
    /// The reference key and keys already driven are rejected before any change.
    pub fn add_shape_key(
        &mut self,
        key: &ShapeKeyRef,
        group: Option<GroupId>,
    ) -> Result<ShapeKeyId> {
        if key.is_reference {
            warn!("refusing to drive reference key '{}'", key.name);
            return Err(PoseDriverError::ReferenceKey {
                name: key.name.clone(),
            });
        }
        if self.shape_keys.values().any(|s| s.name() == key.name) {
            return Err(PoseDriverError::AlreadyDriven {
                name: key.name.clone(),
            });
        }
        let group = match group {
            Some(id) => {
                self.group_index(id)?;
                id
            }
            None => match self.active_group() {
                Some(id) => id,
                None => self.create_group(None),
            },
        };

        let target = if key.value > self.config.min_shape_value {
            key.value
        } else {
            self.config.default_target
        };
        let falloff =
            FalloffCurve::preset(self.config.default_interpolation, self.config.default_easing);
        let mut shape = DrivenShapeKey::new(
            key.name.clone(),
            group,
            Activation::new(self.config.default_radius, target, falloff),
        );
        shape.set_pose(*self.group(group)?.rest());
        let id = shape.id();
        self.shape_keys.insert(id, shape);
        self.group_mut(group)?.push_member(id);
        self.events.push(PoseDriverEvent::ShapeKeyCreated {
            shape_key: id,
            group,
            name: key.name.clone(),
        });
        self.refresh_group(group, true)?;
        Ok(id)
    }

    /// Unbind a shape key and drop its side-table entries.
    pub fn remove_shape_key(&mut self, id: ShapeKeyId) -> Result<()> {
        let shape = self
            .shape_keys
            .remove(&id)
            .ok_or_else(|| PoseDriverError::ShapeKeyNotFound {
                name: id.to_string(),
            })?;
        self.drivers.remove(&id);
        self.distances.remove(&id);
        let group = shape.group();
        self.group_mut(group)?.remove_member(id);
        self.events.push(PoseDriverEvent::ShapeKeyRemoved {
            shape_key: id,
            name: shape.name().to_string(),
        });
        self.refresh_group(group, false)
    }

    /// Rebind a shape key to another group; both groups are refreshed.
    pub fn move_shape_key(&mut self, id: ShapeKeyId, group: GroupId) -> Result<()> {
        self.group_index(group)?;
        let previous = self.shape_key(id)?.group();
        if previous == group {
            return Ok(());
        }
        self.group_mut(previous)?.remove_member(id);
        self.group_mut(group)?.push_member(id);
        self.shape_key_mut(id)?.set_group(group);
        self.events.push(PoseDriverEvent::ShapeKeyMoved {
            shape_key: id,
            from: previous,
            to: group,
        });
        self.refresh_group(previous, false)?;
        self.refresh_group(group, true)
    }

    pub fn set_shape_key_pose(&mut self, id: ShapeKeyId, pose: PoseSample) -> Result<()> {
        let shape = self.shape_key_mut(id)?;
        shape.set_pose(pose);
        let group = shape.group();
        self.events
            .push(PoseDriverEvent::ShapeKeyPoseChanged { shape_key: id });
        self.refresh_group(group, false)?;
        // The member's own literals changed even when its radius did not.
        self.rebuild_driver(id)
    }

    /// Capture the reference pose from live bone state.
    ///
    /// With `set_flags`, channels whose live value departs from rest are switched on in
    /// the group's selection.
    pub fn capture_pose(
        &mut self,
        id: ShapeKeyId,
        source: &dyn PoseSource,
        set_flags: bool,
    ) -> Result<()> {
        let group = self.group(self.shape_key(id)?.group())?;
        let object = group.object().ok_or_else(|| PoseDriverError::InvalidValue {
            reason: format!("group '{}' has no armature", group.name()),
        })?;
        let state = source
            .bone_state(object, group.bone_target())
            .ok_or_else(|| PoseDriverError::InvalidValue {
                reason: format!("bone '{}' not found on '{}'", group.bone_target(), object),
            })?;
        let group_id = group.id();
        if set_flags {
            let detected = detect_channels(&state, group.channels(), self.config.capture_tolerance);
            if detected != *group.channels() {
                self.group_mut(group_id)?.set_channels(detected);
                self.events
                    .push(PoseDriverEvent::GroupChannelsChanged { group: group_id });
            }
        }
        self.shape_key_mut(id)?.set_pose(state.pose);
        self.events
            .push(PoseDriverEvent::ShapeKeyPoseChanged { shape_key: id });
        self.refresh_group(group_id, set_flags)?;
        self.rebuild_driver(id)
    }

    /// Set the radius by hand. The solver still overrides it while auto-update is on.
    pub fn set_radius(&mut self, id: ShapeKeyId, radius: f64) -> Result<()> {
        if self.shape_key_mut(id)?.activation_mut().set_radius(radius) {
            let radius = self.shape_key(id)?.activation().radius();
            self.events.push(PoseDriverEvent::RadiusChanged {
                shape_key: id,
                radius,
            });
            self.rebuild_driver(id)?;
        }
        Ok(())
    }

    pub fn set_radius_auto_update(&mut self, id: ShapeKeyId, enabled: bool) -> Result<()> {
        let shape = self.shape_key_mut(id)?;
        shape.activation_mut().radius_auto_update = enabled;
        let group = shape.group();
        if enabled {
            self.refresh_group(group, false)?;
        }
        Ok(())
    }

    pub fn set_target(&mut self, id: ShapeKeyId, target: f64) -> Result<()> {
        if !target.is_finite() {
            return Err(PoseDriverError::InvalidValue {
                reason: format!("target must be finite, got {target}"),
            });
        }
        self.shape_key_mut(id)?.activation_mut().target = target;
        self.events
            .push(PoseDriverEvent::TargetChanged { shape_key: id, target });
        self.rebuild_driver(id)
    }

    pub fn set_falloff(&mut self, id: ShapeKeyId, falloff: FalloffCurve) -> Result<()> {
        self.shape_key_mut(id)?.activation_mut().falloff = falloff;
        self.events
            .push(PoseDriverEvent::FalloffChanged { shape_key: id });
        self.rebuild_driver(id)
    }

    pub fn set_mute(&mut self, id: ShapeKeyId, mute: bool) -> Result<()> {
        self.shape_key_mut(id)?.set_mute(mute);
        if let Some(driver) = self.drivers.get_mut(&id) {
            driver.mute = mute;
        }
        self.events
            .push(PoseDriverEvent::ShapeKeyMuteChanged { shape_key: id, mute });
        Ok(())
    }

    // ---------------------------------------------------------------------------------
    // Pipeline

    /// Transient distance matrix over a group's member poses.
    pub fn distance_matrix(&self, group: GroupId) -> Result<DistanceMatrix> {
        let poses = self.member_poses(group)?;
        Ok(distance_matrix(&poses, self.group(group)?.channels()))
    }

    fn member_poses(&self, group: GroupId) -> Result<Vec<PoseSample>> {
        Ok(self.members(group)?.iter().map(|s| *s.pose()).collect())
    }

    /// Matrix, radii, then drivers of every member whose radius or inlined bendy-bone norms
    /// changed (or all members when `all` is set). Driver regeneration also resamples the
    /// falloff keyframes.
    fn refresh_group(&mut self, group: GroupId, all: bool) -> Result<()> {
        let poses = self.member_poses(group)?;
        let channels = *self.group(group)?.channels();
        let matrix = distance_matrix(&poses, &channels);
        let radii = matrix.radii(self.config.radius_epsilon);
        let members = self.group(group)?.members().to_vec();
        // Bendy-bone norms span the whole group, so any member's pose can move them.
        let norms = channels.bbone.any().then(|| BBoneNorms::from_poses(&poses));

        let mut stale = Vec::new();
        for (id, radius) in members.iter().zip(radii) {
            let norms_moved = match (&norms, self.drivers.get(id)) {
                (Some(norms), Some(driver)) => driver.norms != *norms,
                (_, None) => true,
                (None, Some(_)) => false,
            };
            let shape = self.shape_key_mut(*id)?;
            let changed = shape.activation().radius_auto_update
                && shape.activation_mut().set_radius(radius);
            if changed {
                let radius = shape.activation().radius();
                self.events.push(PoseDriverEvent::RadiusChanged {
                    shape_key: *id,
                    radius,
                });
            }
            if changed || all || norms_moved {
                stale.push(*id);
            }
        }
        debug!(
            "refreshed group {group}: {} members, {} drivers stale",
            members.len(),
            stale.len()
        );
        for id in stale {
            self.rebuild_driver(id)?;
        }
        Ok(())
    }

    fn rebuild_driver(&mut self, id: ShapeKeyId) -> Result<()> {
        let shape = self.shape_key(id)?;
        let group = self.group(shape.group())?;
        let poses = self.member_poses(group.id())?;
        let norms = BBoneNorms::from_poses(&poses);
        let driver = build_driver(shape, group, &norms, self.config.radius_epsilon);
        if !group.is_enabled() {
            debug!("group '{}' has no channels; driver is constant zero", group.name());
        }
        let families = driver.families.len();
        self.distances.insert(id, driver.distance_data());
        self.drivers.insert(id, driver);
        self.events.push(PoseDriverEvent::DriverRebuilt {
            shape_key: id,
            families,
        });
        Ok(())
    }

    /// Evaluate a shape key's drivers against a live pose and publish the normalized
    /// family values into its data slot, as the combined driver reads them.
    pub fn evaluate(&mut self, id: ShapeKeyId, live: &PoseSample) -> Result<DriverEvaluation> {
        let driver = self
            .drivers
            .get(&id)
            .ok_or_else(|| PoseDriverError::ShapeKeyNotFound {
                name: id.to_string(),
            })?;
        let evaluation = driver.evaluate(live)?;
        if let Some(data) = self.distances.get_mut(&id) {
            data.values.clone_from(&evaluation.normalized);
        }
        Ok(evaluation)
    }
}
