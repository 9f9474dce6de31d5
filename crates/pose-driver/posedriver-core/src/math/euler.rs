//! Tait-Bryan angles in the six application orders.
//!
//! Angles are always stored as `[x, y, z]` regardless of order. The order names the
//! sequence in which the axis rotations are applied, so `Xyz` composes `Rz * Ry * Rx`.

use super::{quat_mul, Axis, Quat, DEGENERATE_EPSILON};
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum EulerOrder {
    #[default]
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
}

impl EulerOrder {
    pub const ALL: [EulerOrder; 6] = [
        EulerOrder::Xyz,
        EulerOrder::Xzy,
        EulerOrder::Yxz,
        EulerOrder::Yzx,
        EulerOrder::Zxy,
        EulerOrder::Zyx,
    ];

    /// Axes in application order.
    pub fn axes(self) -> [Axis; 3] {
        use Axis::*;
        match self {
            EulerOrder::Xyz => [X, Y, Z],
            EulerOrder::Xzy => [X, Z, Y],
            EulerOrder::Yxz => [Y, X, Z],
            EulerOrder::Yzx => [Y, Z, X],
            EulerOrder::Zxy => [Z, X, Y],
            EulerOrder::Zyx => [Z, Y, X],
        }
    }

    /// +1 for cyclic (even) orders, -1 otherwise.
    fn parity(self) -> f64 {
        match self {
            EulerOrder::Xyz | EulerOrder::Yzx | EulerOrder::Zxy => 1.0,
            _ => -1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EulerOrder::Xyz => "XYZ",
            EulerOrder::Xzy => "XZY",
            EulerOrder::Yxz => "YXZ",
            EulerOrder::Yzx => "YZX",
            EulerOrder::Zxy => "ZXY",
            EulerOrder::Zyx => "ZYX",
        }
    }

    /// Compose `[x, y, z]` angles into a (w, x, y, z) quaternion.
    pub fn to_quaternion(self, angles: [f64; 3]) -> Quat {
        self.axes().iter().fold([1.0, 0.0, 0.0, 0.0], |acc, axis| {
            let half = angles[axis.index()] * 0.5;
            let mut step = [half.cos(), 0.0, 0.0, 0.0];
            step[axis.index() + 1] = half.sin();
            quat_mul(step, acc)
        })
    }

    /// Decompose a pure rotation matrix into `[x, y, z]` angles.
    ///
    /// In gimbal lock the last applied angle is pinned to zero.
    pub fn from_matrix(self, m: &Matrix3<f64>) -> [f64; 3] {
        let [i, j, k] = self.axes().map(Axis::index);
        let s = self.parity();
        let cy = (m[(i, i)] * m[(i, i)] + m[(j, i)] * m[(j, i)]).sqrt();
        let (first, second, third) = if cy > DEGENERATE_EPSILON * 16.0 {
            (
                (s * m[(k, j)]).atan2(m[(k, k)]),
                (-s * m[(k, i)]).atan2(cy),
                (s * m[(j, i)]).atan2(m[(i, i)]),
            )
        } else {
            (
                (-s * m[(j, k)]).atan2(m[(j, j)]),
                (-s * m[(k, i)]).atan2(cy),
                0.0,
            )
        };
        let mut out = [0.0; 3];
        out[i] = first;
        out[j] = second;
        out[k] = third;
        out
    }
}

/// Euler order requested by a channel selection; `Auto` defers to the bone's own order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RotationOrder {
    #[default]
    Auto,
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
}

impl RotationOrder {
    pub fn resolve(self, bone_order: EulerOrder) -> EulerOrder {
        match self {
            RotationOrder::Auto => bone_order,
            RotationOrder::Xyz => EulerOrder::Xyz,
            RotationOrder::Xzy => EulerOrder::Xzy,
            RotationOrder::Yxz => EulerOrder::Yxz,
            RotationOrder::Yzx => EulerOrder::Yzx,
            RotationOrder::Zxy => EulerOrder::Zxy,
            RotationOrder::Zyx => EulerOrder::Zyx,
        }
    }
}

impl From<EulerOrder> for RotationOrder {
    fn from(order: EulerOrder) -> Self {
        match order {
            EulerOrder::Xyz => RotationOrder::Xyz,
            EulerOrder::Xzy => RotationOrder::Xzy,
            EulerOrder::Yxz => RotationOrder::Yxz,
            EulerOrder::Yzx => RotationOrder::Yzx,
            EulerOrder::Zxy => RotationOrder::Zxy,
            EulerOrder::Zyx => RotationOrder::Zyx,
        }
    }
}
