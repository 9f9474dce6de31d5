//! Swing/twist split of a rotation about a designated twist axis.

use super::{quat_conjugate, quat_mul, Axis, Quat, DEGENERATE_EPSILON};

/// Split `q` into `(swing, twist_angle)` such that `q == swing * twist(twist_angle)`.
///
/// `q` is flipped to the `w >= 0` hemisphere first, so the twist angle lies in
/// `[-pi, pi]` and the swing has a non-negative real part and no component along `axis`.
pub fn swing_twist(q: Quat, axis: Axis) -> (Quat, f64) {
    let q = if q[0] < 0.0 { q.map(|c| -c) } else { q };
    let half = q[axis.index() + 1].atan2(q[0]);
    let twist = twist_quaternion(axis, 2.0 * half);
    let swing = quat_mul(q, quat_conjugate(twist));
    (swing, 2.0 * half)
}

/// Unit quaternion rotating by `angle` about `axis`.
pub fn twist_quaternion(axis: Axis, angle: f64) -> Quat {
    let half = angle * 0.5;
    let mut q = [half.cos(), 0.0, 0.0, 0.0];
    q[axis.index() + 1] = half.sin();
    q
}

/// In-plane swing 2-vector: the swing's off-axis imaginary components scaled by
/// `2*atan2(sin,cos)/sin`, i.e. the swing axis times the swing angle.
///
/// Returns `[0, 0]` when the swing is (numerically) the identity.
pub fn swing_vector(swing: Quat, axis: Axis) -> [f64; 2] {
    let [a, b] = axis.others();
    let (u, v) = (swing[a.index() + 1], swing[b.index() + 1]);
    let sin = (u * u + v * v).sqrt();
    if sin < DEGENERATE_EPSILON {
        return [0.0, 0.0];
    }
    let scale = 2.0 * sin.atan2(swing[0]) / sin;
    [u * scale, v * scale]
}

/// Inverse of [`swing_vector`]: builds the swing quaternion from its 2-vector.
pub fn swing_from_vector(vector: [f64; 2], axis: Axis) -> Quat {
    let angle = (vector[0] * vector[0] + vector[1] * vector[1]).sqrt();
    if angle < DEGENERATE_EPSILON {
        return [1.0, 0.0, 0.0, 0.0];
    }
    let half = angle * 0.5;
    let k = half.sin() / angle;
    let [a, b] = axis.others();
    let mut q = [half.cos(), 0.0, 0.0, 0.0];
    q[a.index() + 1] = vector[0] * k;
    q[b.index() + 1] = vector[1] * k;
    q
}
