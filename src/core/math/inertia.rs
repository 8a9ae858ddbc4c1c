use glam::{Mat3, Quat, Vec3};

const JACOBI_MAX_SWEEPS: usize = 32;

/// Inertia tensor expressed in its principal frame.
#[derive(Clone, Copy, Debug)]
pub struct PrincipalInertia {
    /// Rotation taking the principal frame into the input frame.
    pub rotation: Quat,
    /// Principal moments.
    pub moments: Vec3,
}

impl PrincipalInertia {
    pub fn tensor(&self) -> Mat3 {
        Mat3::from_diagonal(self.moments)
    }
}

/// Parallel-axis term for a point mass `mass` at `offset` from the reference point.
pub fn parallel_axis(offset: Vec3, mass: f32) -> Mat3 {
    let diag = Mat3::from_diagonal(Vec3::splat(offset.length_squared()));
    let outer = Mat3::from_cols(offset * offset.x, offset * offset.y, offset * offset.z);
    (diag - outer) * mass
}

/// Rotate a body-frame tensor into the frame described by `rotation`.
pub fn rotate_tensor(tensor: Mat3, rotation: Quat) -> Mat3 {
    let r = Mat3::from_quat(rotation);
    r * tensor * r.transpose()
}

/// Reciprocal of the diagonal; zero moments map to zero.
pub fn inverse_diagonal(tensor: Mat3) -> Mat3 {
    let inv = |v: f32| if v != 0.0 { 1.0 / v } else { 0.0 };
    Mat3::from_diagonal(Vec3::new(
        inv(tensor.x_axis.x),
        inv(tensor.y_axis.y),
        inv(tensor.z_axis.z),
    ))
}

/// Diagonalize a symmetric inertia tensor with cyclic Jacobi rotations.
pub fn diagonalize(tensor: Mat3) -> PrincipalInertia {
    // a[row][col]; the tensor is symmetric so the column-major source order is irrelevant.
    let cols = tensor.to_cols_array_2d();
    let mut a = [[0.0f32; 3]; 3];
    for (c, col) in cols.iter().enumerate() {
        for (r, value) in col.iter().enumerate() {
            a[r][c] = *value;
        }
    }
    let mut v = [[1.0f32, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    let scale = a[0][0].abs() + a[1][1].abs() + a[2][2].abs();
    let eps = (scale * 1e-7).max(f32::MIN_POSITIVE);

    for _ in 0..JACOBI_MAX_SWEEPS {
        let off = a[0][1].abs() + a[0][2].abs() + a[1][2].abs();
        if off <= eps {
            break;
        }
        for &(p, q) in &[(0usize, 1usize), (0, 2), (1, 2)] {
            if a[p][q].abs() <= f32::MIN_POSITIVE {
                continue;
            }
            let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
            let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
            let c = 1.0 / (t * t + 1.0).sqrt();
            let s = t * c;

            for row in a.iter_mut() {
                let (kp, kq) = (row[p], row[q]);
                row[p] = c * kp - s * kq;
                row[q] = s * kp + c * kq;
            }
            for k in 0..3 {
                let (pk, qk) = (a[p][k], a[q][k]);
                a[p][k] = c * pk - s * qk;
                a[q][k] = s * pk + c * qk;
            }
            for row in v.iter_mut() {
                let (kp, kq) = (row[p], row[q]);
                row[p] = c * kp - s * kq;
                row[q] = s * kp + c * kq;
            }
        }
    }

    let mut axes = Mat3::from_cols(
        Vec3::new(v[0][0], v[1][0], v[2][0]),
        Vec3::new(v[0][1], v[1][1], v[2][1]),
        Vec3::new(v[0][2], v[1][2], v[2][2]),
    );
    if axes.determinant() < 0.0 {
        axes.z_axis = -axes.z_axis;
    }

    PrincipalInertia {
        rotation: Quat::from_mat3(&axes).normalize(),
        moments: Vec3::new(a[0][0], a[1][1], a[2][2]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mat_close(a: Mat3, b: Mat3, tol: f32) -> bool {
        a.to_cols_array()
            .iter()
            .zip(b.to_cols_array().iter())
            .all(|(x, y)| (x - y).abs() <= tol)
    }

    #[test]
    fn diagonal_input_stays_put() {
        let p = diagonalize(Mat3::from_diagonal(Vec3::new(1.0, 2.0, 3.0)));
        assert!(mat_close(rotate_tensor(p.tensor(), p.rotation), Mat3::from_diagonal(Vec3::new(1.0, 2.0, 3.0)), 1e-5));
    }

    #[test]
    fn rotated_tensor_recovers_moments() {
        let body = Mat3::from_diagonal(Vec3::new(2.0, 5.0, 9.0));
        let rot = Quat::from_euler(glam::EulerRot::XYZ, 0.4, -0.9, 1.3);
        let world = rotate_tensor(body, rot);

        let p = diagonalize(world);
        let mut moments = p.moments.to_array();
        moments.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((moments[0] - 2.0).abs() < 1e-3);
        assert!((moments[1] - 5.0).abs() < 1e-3);
        assert!((moments[2] - 9.0).abs() < 1e-3);

        // R * D * R^T reproduces the input.
        assert!(mat_close(rotate_tensor(p.tensor(), p.rotation), world, 1e-3));
    }

    #[test]
    fn parallel_axis_matches_point_mass() {
        let term = parallel_axis(Vec3::new(2.0, 0.0, 0.0), 3.0);
        assert!((term.x_axis.x - 0.0).abs() < 1e-6);
        assert!((term.y_axis.y - 12.0).abs() < 1e-6);
        assert!((term.z_axis.z - 12.0).abs() < 1e-6);
    }

    #[test]
    fn zero_moments_invert_to_zero() {
        let inv = inverse_diagonal(Mat3::from_diagonal(Vec3::new(0.0, 2.0, 4.0)));
        assert_eq!(inv.x_axis.x, 0.0);
        assert!((inv.y_axis.y - 0.5).abs() < 1e-6);
    }
}
