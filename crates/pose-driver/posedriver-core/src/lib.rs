//! Pose-distance drivers for corrective shape keys.
//!
//! A group of shape keys shares one bone, one channel selection and one rest pose. Each
//! shape key stores the reference pose at which it is fully active. The registry turns
//! those definitions into host-evaluable driver formulas: per-family distances from the
//! live bone to the reference pose, normalized by the activation radius, averaged and
//! mapped through a falloff curve onto the shape key weight.

pub mod activation;
pub mod capture;
pub mod channels;
pub mod clipboard;
pub mod config;
pub mod curve;
pub mod distance;
pub mod driver;
pub mod error;
pub mod events;
pub mod expr;
pub mod group;
pub mod ids;
pub mod math;
pub mod metrics;
pub mod pose;
pub mod shape_key;
pub mod symmetry;
pub mod system;

pub use activation::Activation;
pub use channels::{AxisFlags, BBoneFlags, ChannelSelection, DistanceFamily, RotationChannel};
pub use clipboard::{Clipboard, ClipboardSnapshot, PasteOptions};
pub use config::PoseDriverConfig;
pub use curve::{
    CurveMap, CurvePoint, CurveType, Easing, Extend, FalloffCurve, HandleType, Interpolation,
    Keyframe, KeyframeCurve,
};
pub use distance::DistanceMatrix;
pub use driver::{DistanceData, DriverEvaluation, FamilyDriver, ShapeKeyDriver};
pub use error::{PoseDriverError, Result};
pub use events::{EventLog, PoseDriverEvent};
pub use expr::{DriverExpression, DriverKind, DriverVariable, TransformType, VariableSource};
pub use group::{ObjectKind, ObjectRef, PoseGroup};
pub use ids::{GroupId, ShapeKeyId};
pub use math::{Axis, EulerOrder, PoseTransform, RotationOrder};
pub use pose::{BBoneChannel, BBoneValues, BoneState, PoseSample, PoseSource};
pub use shape_key::{DrivenShapeKey, ShapeKeyRef};
pub use system::PoseDriverSystem;
