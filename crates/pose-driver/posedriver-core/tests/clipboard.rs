use approx::assert_abs_diff_eq;
use posedriver_core::{
    AxisFlags, ChannelSelection, Clipboard, ClipboardSnapshot, ObjectRef, PasteOptions,
    PoseDriverSystem, PoseSample, PoseTransform, ShapeKeyId, ShapeKeyRef,
};

fn at(location: [f64; 3]) -> PoseSample {
    PoseSample::new(PoseTransform::compose(
        location,
        [1.0, 0.0, 0.0, 0.0],
        [1.0, 1.0, 1.0],
    ))
}

fn left_and_right() -> (PoseDriverSystem, ShapeKeyId, ShapeKeyId) {
    let mut system = PoseDriverSystem::default();
    let left = system.create_group(Some("Left"));
    system
        .set_group_object(left, Some(ObjectRef::armature("Armature")))
        .unwrap();
    system.set_group_bone_target(left, "forearm.L").unwrap();
    system
        .set_group_channels(
            left,
            ChannelSelection::default().with_location(AxisFlags::new(true, true, false)),
        )
        .unwrap();
    let source = system
        .add_shape_key(&ShapeKeyRef::new("flex.L", 0.0), Some(left))
        .unwrap();
    system.set_shape_key_pose(source, at([0.2, 0.1, 0.0])).unwrap();
    system.set_target(source, 0.7).unwrap();

    let right = system.create_group(Some("Right"));
    let dest = system
        .add_shape_key(&ShapeKeyRef::new("flex.R", 0.0), Some(right))
        .unwrap();
    (system, source, dest)
}

#[test]
fn paste_requires_a_snapshot() {
    let (mut system, _, dest) = left_and_right();
    let clipboard = Clipboard::new();
    assert!(clipboard.is_empty());
    assert!(clipboard
        .paste(&mut system, dest, PasteOptions::default())
        .is_err());
}

#[test]
fn paste_copies_activation_and_pose() {
    let (mut system, source, dest) = left_and_right();
    let mut clipboard = Clipboard::new();
    clipboard.copy(&system, source).unwrap();
    clipboard
        .paste(&mut system, dest, PasteOptions::default())
        .unwrap();

    let pasted = system.shape_key(dest).unwrap();
    assert_eq!(pasted.activation().target, 0.7);
    assert_eq!(pasted.pose(), system.shape_key(source).unwrap().pose());
    let group = system.group(pasted.group()).unwrap();
    assert_eq!(group.bone_target(), "");
    assert!(!group.is_enabled());
}

#[test]
fn mirrored_paste_targets_other_side() {
    let (mut system, source, dest) = left_and_right();
    let mut clipboard = Clipboard::new();
    clipboard.copy(&system, source).unwrap();
    clipboard
        .paste(
            &mut system,
            dest,
            PasteOptions {
                mirror: true,
                include_group_settings: true,
            },
        )
        .unwrap();

    let pasted = system.shape_key(dest).unwrap();
    let location = pasted.pose().location();
    assert_abs_diff_eq!(location[0], -0.2, epsilon = 1e-12);
    assert_abs_diff_eq!(location[1], 0.1, epsilon = 1e-12);
    let group = system.group(pasted.group()).unwrap();
    assert_eq!(group.bone_target(), "forearm.R");
    assert_eq!(group.object(), Some("Armature"));
    assert!(group.is_enabled());

    let evaluation = system.evaluate(dest, &at([-0.2, 0.1, 0.0])).unwrap();
    assert_abs_diff_eq!(evaluation.weight, 0.7, epsilon = 1e-6);
}

#[test]
fn snapshot_survives_json() {
    let (system, source, _) = left_and_right();
    let mut clipboard = Clipboard::new();
    clipboard.copy(&system, source).unwrap();
    let snapshot = clipboard.snapshot().unwrap();
    let restored = ClipboardSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
    assert_eq!(restored.bone_target, "forearm.L");
    assert_eq!(restored.channels, snapshot.channels);
    assert_eq!(restored.activation.target, 0.7);
    assert_abs_diff_eq!(restored.pose.location()[0], 0.2, epsilon = 1e-12);
    assert!(ClipboardSnapshot::from_json("{\"object\": 3}").is_err());

    clipboard.clear();
    assert!(clipboard.snapshot().is_none());
}
