//! Host-evaluable driver expressions and their typed variable bindings.

pub mod compile;
pub mod eval;

use crate::math::{Axis, RotationOrder};
use crate::pose::BBoneChannel;
use serde::{Deserialize, Serialize};

pub use compile::{compile_family, BoneTarget};
pub use eval::{bind, evaluate, sample_variable};

/// Transform channel a variable reads from a bone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransformType {
    LocX,
    LocY,
    LocZ,
    RotW,
    RotX,
    RotY,
    RotZ,
    ScaleX,
    ScaleY,
    ScaleZ,
}

impl TransformType {
    pub fn location(axis: Axis) -> Self {
        [Self::LocX, Self::LocY, Self::LocZ][axis.index()]
    }

    pub fn rotation(axis: Axis) -> Self {
        [Self::RotX, Self::RotY, Self::RotZ][axis.index()]
    }

    pub fn scale(axis: Axis) -> Self {
        [Self::ScaleX, Self::ScaleY, Self::ScaleZ][axis.index()]
    }

    /// Quaternion components in (w, x, y, z) order.
    pub const QUATERNION: [TransformType; 4] = [Self::RotW, Self::RotX, Self::RotY, Self::RotZ];

    pub fn name(self) -> &'static str {
        match self {
            TransformType::LocX => "LOC_X",
            TransformType::LocY => "LOC_Y",
            TransformType::LocZ => "LOC_Z",
            TransformType::RotW => "ROT_W",
            TransformType::RotX => "ROT_X",
            TransformType::RotY => "ROT_Y",
            TransformType::RotZ => "ROT_Z",
            TransformType::ScaleX => "SCALE_X",
            TransformType::ScaleY => "SCALE_Y",
            TransformType::ScaleZ => "SCALE_Z",
        }
    }
}

/// How the host converts the bone rotation before reading a `ROT_*` channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableRotationMode {
    Euler(RotationOrder),
    Quaternion,
    SwingTwist(Axis),
}

impl Default for VariableRotationMode {
    fn default() -> Self {
        VariableRotationMode::Euler(RotationOrder::Auto)
    }
}

impl VariableRotationMode {
    pub fn name(self) -> String {
        match self {
            VariableRotationMode::Euler(order) => match order {
                RotationOrder::Auto => "AUTO".to_string(),
                other => other.resolve(Default::default()).name().to_string(),
            },
            VariableRotationMode::Quaternion => "QUATERNION".to_string(),
            VariableRotationMode::SwingTwist(axis) => format!("SWING_TWIST_{}", axis.name()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransformSpace {
    #[default]
    LocalSpace,
}

/// Kind of datablock a property variable resolves against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IdType {
    Object,
    Key,
}

/// Live data a driver variable reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableSource {
    /// Transform channel sample of a pose bone.
    Transform {
        object: String,
        bone: String,
        transform_type: TransformType,
        rotation_mode: VariableRotationMode,
        space: TransformSpace,
    },
    /// Bendy-bone scalar property of a pose bone.
    BBoneProperty {
        object: String,
        bone: String,
        channel: BBoneChannel,
    },
    /// Element of a shape key's distance array on the shape key datablock.
    DistanceElement { key: String, index: usize },
}

impl VariableSource {
    /// Single-property path as the host resolves it; `None` for transform samples.
    pub fn data_path(&self) -> Option<String> {
        match self {
            VariableSource::Transform { .. } => None,
            VariableSource::BBoneProperty { bone, channel, .. } => Some(format!(
                "pose.bones[\"{}\"].{}",
                bone,
                channel.property_path()
            )),
            VariableSource::DistanceElement { key, index } => {
                Some(format!("[\"{key}\"][{index}]"))
            }
        }
    }

    pub fn id_type(&self) -> IdType {
        match self {
            VariableSource::DistanceElement { .. } => IdType::Key,
            _ => IdType::Object,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriverVariable {
    pub name: String,
    pub source: VariableSource,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum DriverKind {
    #[default]
    Scripted,
    /// Mean of all variable values; the expression string is unused.
    Average,
}

/// A generated formula plus its ordered variable bindings. Rebuilt wholesale, never patched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct DriverExpression {
    pub kind: DriverKind,
    pub expression: String,
    pub variables: Vec<DriverVariable>,
}

impl DriverExpression {
    pub fn constant_zero() -> Self {
        Self {
            kind: DriverKind::Scripted,
            expression: "0.0".to_string(),
            variables: Vec::new(),
        }
    }

    /// Average over every element of a distance array.
    pub fn average(key: &str, count: usize) -> Self {
        Self {
            kind: DriverKind::Average,
            expression: String::new(),
            variables: (0..count)
                .map(|index| DriverVariable {
                    name: format!("distance_{}", index + 1),
                    source: VariableSource::DistanceElement {
                        key: key.to_string(),
                        index,
                    },
                })
                .collect(),
        }
    }

    pub fn variable(&self, name: &str) -> Option<&DriverVariable> {
        self.variables.iter().find(|v| v.name == name)
    }
}
