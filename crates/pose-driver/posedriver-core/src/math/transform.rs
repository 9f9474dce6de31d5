//! Local-space bone transform with per-channel accessors.
//!
//! The matrix is always `T * R * S`. Every setter recomposes the full matrix from the
//! two untouched channels plus the new value.

use super::swing_twist::{swing_from_vector, swing_twist, swing_vector, twist_quaternion};
use super::{quat_mul, Axis, EulerOrder, Quat};
use nalgebra::{Matrix3, Matrix4, Quaternion, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f64; 4]; 4]", into = "[[f64; 4]; 4]")]
pub struct PoseTransform {
    matrix: Matrix4<f64>,
}

impl Default for PoseTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[[f64; 4]; 4]> for PoseTransform {
    fn from(rows: [[f64; 4]; 4]) -> Self {
        Self::from_rows(rows)
    }
}

impl From<PoseTransform> for [[f64; 4]; 4] {
    fn from(t: PoseTransform) -> Self {
        t.rows()
    }
}

impl PoseTransform {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Build from row-major nested arrays.
    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        Self {
            matrix: Matrix4::from_fn(|r, c| rows[r][c]),
        }
    }

    /// Compose from location, rotation quaternion (w, x, y, z) and scale.
    pub fn compose(location: [f64; 3], rotation: Quat, scale: [f64; 3]) -> Self {
        let q = UnitQuaternion::new_normalize(Quaternion::new(
            rotation[0],
            rotation[1],
            rotation[2],
            rotation[3],
        ));
        let r = q.to_rotation_matrix().into_inner();
        let mut matrix = Matrix4::identity();
        for c in 0..3 {
            for row in 0..3 {
                matrix[(row, c)] = r[(row, c)] * scale[c];
            }
            matrix[(c, 3)] = location[c];
        }
        Self { matrix }
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    pub fn rows(&self) -> [[f64; 4]; 4] {
        let mut rows = [[0.0; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = self.matrix[(r, c)];
            }
        }
        rows
    }

    pub fn location(&self) -> [f64; 3] {
        [
            self.matrix[(0, 3)],
            self.matrix[(1, 3)],
            self.matrix[(2, 3)],
        ]
    }

    /// Column norms of the upper 3x3, negated together for mirrored (negative
    /// determinant) matrices.
    pub fn scale(&self) -> [f64; 3] {
        let basis = self.basis();
        let sign = if basis.determinant() < 0.0 { -1.0 } else { 1.0 };
        [0, 1, 2].map(|c| basis.column(c).norm() * sign)
    }

    /// Rotation as (w, x, y, z). Not sign-canonical.
    pub fn quaternion(&self) -> Quat {
        let q = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(
            self.rotation_matrix(),
        ));
        let c = q.quaternion();
        [c.w, c.i, c.j, c.k]
    }

    pub fn euler(&self, order: EulerOrder) -> [f64; 3] {
        order.from_matrix(&self.rotation_matrix())
    }

    pub fn swing(&self, axis: Axis) -> [f64; 2] {
        swing_vector(swing_twist(self.quaternion(), axis).0, axis)
    }

    pub fn twist(&self, axis: Axis) -> f64 {
        swing_twist(self.quaternion(), axis).1
    }

    pub fn set_location(&mut self, location: [f64; 3]) {
        *self = Self::compose(location, self.quaternion(), self.scale());
    }

    pub fn set_scale(&mut self, scale: [f64; 3]) {
        *self = Self::compose(self.location(), self.quaternion(), scale);
    }

    pub fn set_quaternion(&mut self, rotation: Quat) {
        *self = Self::compose(self.location(), rotation, self.scale());
    }

    pub fn set_euler(&mut self, order: EulerOrder, angles: [f64; 3]) {
        self.set_quaternion(order.to_quaternion(angles));
    }

    /// Replace the swing, keeping the current twist about `axis`.
    pub fn set_swing(&mut self, axis: Axis, vector: [f64; 2]) {
        let twist = self.twist(axis);
        self.set_quaternion(quat_mul(
            swing_from_vector(vector, axis),
            twist_quaternion(axis, twist),
        ));
    }

    /// Replace the twist about `axis`, keeping the current swing.
    pub fn set_twist(&mut self, axis: Axis, angle: f64) {
        let (swing, _) = swing_twist(self.quaternion(), axis);
        self.set_quaternion(quat_mul(swing, twist_quaternion(axis, angle)));
    }

    /// Reflect across the bone's X=0 plane (`S * M * S`, `S = diag(-1, 1, 1, 1)`).
    pub fn mirrored_x(&self) -> Self {
        let s = Matrix4::from_diagonal(&nalgebra::Vector4::new(-1.0, 1.0, 1.0, 1.0));
        Self {
            matrix: s * self.matrix * s,
        }
    }

    fn basis(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    fn rotation_matrix(&self) -> Matrix3<f64> {
        let mut basis = self.basis();
        let scale = self.scale();
        for c in 0..3 {
            if scale[c].abs() > f64::EPSILON {
                let column: Vector3<f64> = basis.column(c) / scale[c];
                basis.set_column(c, &column);
            }
        }
        basis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_same(a: &PoseTransform, b: &PoseTransform) {
        let diff = (a.matrix() - b.matrix()).abs().max();
        assert!(diff < 1e-9, "matrices differ by {diff}\n{a:?}\n{b:?}");
    }

    fn sample() -> PoseTransform {
        PoseTransform::compose(
            [0.2, -1.5, 0.7],
            EulerOrder::Xyz.to_quaternion([0.3, -0.4, 1.2]),
            [1.1, 0.9, 1.3],
        )
    }

    #[test]
    fn channels_decompose() {
        let t = sample();
        let loc = t.location();
        let scale = t.scale();
        assert!((loc[1] + 1.5).abs() < 1e-12);
        assert!((scale[2] - 1.3).abs() < 1e-12);
        let e = t.euler(EulerOrder::Xyz);
        assert!((e[0] - 0.3).abs() < 1e-9);
        assert!((e[1] + 0.4).abs() < 1e-9);
        assert!((e[2] - 1.2).abs() < 1e-9);
    }

    #[test]
    fn setters_keep_other_channels() {
        let mut t = sample();
        let rot = t.quaternion();
        let scale = t.scale();
        t.set_location([5.0, 6.0, 7.0]);
        assert_eq!(t.location(), [5.0, 6.0, 7.0]);
        let after = t.quaternion();
        let dot: f64 = (0..4).map(|i| rot[i] * after[i]).sum();
        assert!((dot.abs() - 1.0).abs() < 1e-12);
        for c in 0..3 {
            assert!((t.scale()[c] - scale[c]).abs() < 1e-12);
        }
    }

    #[test]
    fn set_twist_keeps_swing() {
        let mut t = sample();
        let swing = t.swing(Axis::Y);
        t.set_twist(Axis::Y, 0.25);
        assert!((t.twist(Axis::Y) - 0.25).abs() < 1e-9);
        let after = t.swing(Axis::Y);
        assert!((after[0] - swing[0]).abs() < 1e-9);
        assert!((after[1] - swing[1]).abs() < 1e-9);
    }

    #[test]
    fn decompose_then_recompose_rebuilds_matrix() {
        let rotations = [
            [1.0, 0.0, 0.0, 0.0],
            EulerOrder::Xyz.to_quaternion([0.3, -0.4, 1.2]),
            EulerOrder::Zyx.to_quaternion([1.0, 0.2, -2.5]),
            // Close to gimbal lock for XYZ.
            EulerOrder::Xyz.to_quaternion([0.4, std::f64::consts::FRAC_PI_2 - 1e-5, -0.7]),
        ];
        let scales = [[1.0, 1.0, 1.0], [0.5, 2.0, 1.0], [-1.1, 0.9, 1.3]];
        for rotation in rotations {
            for scale in scales {
                let t = PoseTransform::compose([0.2, -1.5, 0.7], rotation, scale);
                assert_same(
                    &PoseTransform::compose(t.location(), t.quaternion(), t.scale()),
                    &t,
                );

                let mut q = t;
                q.set_quaternion(t.quaternion());
                assert_same(&q, &t);

                for order in EulerOrder::ALL {
                    let mut e = t;
                    e.set_euler(order, t.euler(order));
                    assert_same(&e, &t);
                }

                for axis in Axis::ALL {
                    let mut s = t;
                    s.set_swing(axis, t.swing(axis));
                    assert_same(&s, &t);

                    let mut w = t;
                    w.set_twist(axis, t.twist(axis));
                    assert_same(&w, &t);
                }
            }
        }
    }

    #[test]
    fn mirror_is_an_involution() {
        let t = sample();
        assert_same(&t.mirrored_x().mirrored_x(), &t);
        assert!((t.mirrored_x().location()[0] + 0.2).abs() < 1e-12);
    }

    #[test]
    fn serde_uses_row_major_arrays() {
        let t = sample();
        let json = serde_json::to_string(&t).unwrap();
        let back: PoseTransform = serde_json::from_str(&json).unwrap();
        assert_same(&t, &back);
        assert!(json.starts_with("[["));
    }
}
