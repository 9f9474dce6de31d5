//! Rotation math shared by pose sampling and the expression compiler.

pub mod euler;
pub mod swing_twist;
pub mod transform;

use serde::{Deserialize, Serialize};

pub use euler::{EulerOrder, RotationOrder};
pub use swing_twist::{swing_from_vector, swing_twist, swing_vector, twist_quaternion};
pub use transform::PoseTransform;

/// Tolerance under which a sine or norm is treated as zero.
pub const DEGENERATE_EPSILON: f64 = 1.0e-8;

/// A principal axis of the bone's local frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Axis {
    X,
    #[default]
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }

    /// The two remaining axes, in ascending order.
    pub fn others(self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::X, Axis::Z],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }

    /// Unit vector along this axis.
    pub fn unit(self) -> [f64; 3] {
        let mut v = [0.0; 3];
        v[self.index()] = 1.0;
        v
    }
}

/// Quaternion stored as (w, x, y, z).
pub type Quat = [f64; 4];

/// Rotates `axis` by the quaternion `q` (w, x, y, z).
///
/// Expanded form of the rotation-matrix column for that axis, so the compiler can
/// emit the same polynomial as a formula.
pub fn rotate_axis(q: Quat, axis: Axis) -> [f64; 3] {
    let [w, x, y, z] = q;
    match axis {
        Axis::X => [
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y + w * z),
            2.0 * (x * z - w * y),
        ],
        Axis::Y => [
            2.0 * (x * y - w * z),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z + w * x),
        ],
        Axis::Z => [
            2.0 * (x * z + w * y),
            2.0 * (y * z - w * x),
            1.0 - 2.0 * (x * x + y * y),
        ],
    }
}

/// Hamilton product of two (w, x, y, z) quaternions.
pub fn quat_mul(a: Quat, b: Quat) -> Quat {
    let [aw, ax, ay, az] = a;
    let [bw, bx, by, bz] = b;
    [
        aw * bw - ax * bx - ay * by - az * bz,
        aw * bx + ax * bw + ay * bz - az * by,
        aw * by - ax * bz + ay * bw + az * bx,
        aw * bz + ax * by - ay * bx + az * bw,
    ]
}

#[inline]
pub fn quat_conjugate(q: Quat) -> Quat {
    [q[0], -q[1], -q[2], -q[3]]
}

#[inline]
pub fn quat_dot(a: Quat, b: Quat) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn rotate_axis_matches_nalgebra() {
        let rot = nalgebra::UnitQuaternion::from_euler_angles(0.3, -0.7, 1.1);
        let c = rot.quaternion();
        let q = [c.w, c.i, c.j, c.k];
        for axis in Axis::ALL {
            let unit = axis.unit();
            let expected = rot * nalgebra::Vector3::new(unit[0], unit[1], unit[2]);
            let got = rotate_axis(q, axis);
            for i in 0..3 {
                assert!(approx(got[i], expected[i], 1e-12), "{axis:?}[{i}]");
            }
        }
    }

    #[test]
    fn quat_mul_matches_nalgebra() {
        let a = nalgebra::UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3);
        let b = nalgebra::UnitQuaternion::from_euler_angles(-0.4, 0.5, 0.9);
        let ab = (a * b).into_inner();
        let qa = [a.w, a.i, a.j, a.k];
        let qb = [b.w, b.i, b.j, b.k];
        let got = quat_mul(qa, qb);
        assert!(approx(got[0], ab.w, 1e-12));
        assert!(approx(got[1], ab.i, 1e-12));
        assert!(approx(got[2], ab.j, 1e-12));
        assert!(approx(got[3], ab.k, 1e-12));
    }
}
