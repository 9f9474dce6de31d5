use approx::assert_abs_diff_eq;
use posedriver_core::{
    ChannelSelection, GroupId, ObjectRef, PoseDriverSystem, PoseSample, PoseTransform, ShapeKeyId,
    ShapeKeyRef,
};
use posedriver_test_fixtures::pose_sets;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct PoseSet {
    object: String,
    bone: String,
    channels: ChannelSelection,
    rest: PoseSample,
    poses: Vec<NamedPose>,
}

#[derive(Debug, Deserialize)]
struct NamedPose {
    name: String,
    pose: PoseSample,
}

fn build(name: &str) -> (PoseDriverSystem, GroupId, Vec<ShapeKeyId>, PoseSet) {
    let set: PoseSet = pose_sets::load(name).expect("load pose set");
    let mut system = PoseDriverSystem::default();
    let group = system.create_group(Some(name));
    system
        .set_group_object(group, Some(ObjectRef::armature(set.object.clone())))
        .unwrap();
    system.set_group_bone_target(group, &set.bone).unwrap();
    system.set_group_channels(group, set.channels).unwrap();
    system.set_group_rest(group, set.rest).unwrap();
    let keys = set
        .poses
        .iter()
        .map(|named| {
            let id = system
                .add_shape_key(&ShapeKeyRef::new(named.name.clone(), 0.0), Some(group))
                .unwrap();
            system.set_shape_key_pose(id, named.pose).unwrap();
            id
        })
        .collect();
    (system, group, keys, set)
}

fn radii(system: &PoseDriverSystem, keys: &[ShapeKeyId]) -> Vec<f64> {
    keys.iter()
        .map(|id| system.shape_key(*id).unwrap().activation().radius())
        .collect()
}

#[test]
fn every_pose_set_fully_activates_its_own_keys() {
    for name in pose_sets::keys() {
        let (mut system, group, keys, set) = build(&name);
        assert!(system.group(group).unwrap().is_valid(), "{name} group invalid");
        for (id, named) in keys.iter().zip(&set.poses) {
            let evaluation = system.evaluate(*id, &named.pose).unwrap();
            assert_abs_diff_eq!(evaluation.weight, 1.0, epsilon = 1e-5);
            let at_rest = system.evaluate(*id, &set.rest).unwrap();
            assert_abs_diff_eq!(at_rest.weight, 0.0, epsilon = 1e-6);
        }
    }
}

#[test]
fn elbow_bend_radii_are_quarter_turns() {
    let (system, group, keys, _) = build("elbow-bend");
    for radius in radii(&system, &keys) {
        assert_abs_diff_eq!(radius, 0.25, epsilon = 1e-9);
    }
    let matrix = system.distance_matrix(group).unwrap();
    assert_abs_diff_eq!(matrix.get(0, 2), 0.5, epsilon = 1e-9);
    assert_abs_diff_eq!(matrix.get(2, 0), 0.5, epsilon = 1e-9);
}

#[test]
fn elbow_bend_blends_between_neighbors() {
    let (mut system, _, keys, _) = build("elbow-bend");
    let angle = 67.5_f64.to_radians();
    let halfway = PoseSample::new(PoseTransform::compose(
        [0.0; 3],
        [(angle / 2.0).cos(), (angle / 2.0).sin(), 0.0, 0.0],
        [1.0; 3],
    ));
    let low = system.evaluate(keys[0], &halfway).unwrap();
    let high = system.evaluate(keys[1], &halfway).unwrap();
    let far = system.evaluate(keys[2], &halfway).unwrap();
    assert_abs_diff_eq!(low.raw[0], 0.125, epsilon = 1e-9);
    assert_abs_diff_eq!(low.weight, high.weight, epsilon = 1e-9);
    assert!(low.weight > 0.0 && low.weight < 1.0);
    assert_abs_diff_eq!(far.weight, 0.0, epsilon = 1e-6);
}

#[test]
fn hand_reach_radii_use_nearest_neighbor() {
    let (system, _, keys, _) = build("hand-reach");
    let radii = radii(&system, &keys);
    assert_abs_diff_eq!(radii[0], 0.4, epsilon = 1e-9);
    assert_abs_diff_eq!(radii[1], 0.3, epsilon = 1e-9);
    assert_abs_diff_eq!(radii[2], 0.3, epsilon = 1e-9);
}
