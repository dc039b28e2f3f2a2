/// Homogeneous 4x4 transformation matrices and camera pose
use nalgebra::{DMatrix, Matrix4, Unit, Vector3};

use crate::error::{KernelError, KernelResult};
use crate::geometry::VertexBatch;

/// How the rotation block of [`Transform::rotation_with`] is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationMethod {
    /// Matrix exponential of the skew-symmetric generator scaled by the angle
    #[default]
    Exponential,
    /// Closed-form Rodrigues formula
    Rodrigues,
}

/// Camera placement in world space, angles in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vector3<f64>,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl CameraPose {
    pub fn new(position: Vector3<f64>, yaw: f64, pitch: f64, roll: f64) -> Self {
        Self {
            position,
            yaw,
            pitch,
            roll,
        }
    }

    /// Camera matrix `C = Rc @ Tc`
    pub fn matrix(&self) -> Matrix4<f64> {
        Transform::camera_matrix(&self.position, self.yaw, self.pitch, self.roll)
    }

    /// World-to-camera matrix `C⁻¹`
    pub fn view_matrix(&self) -> KernelResult<Matrix4<f64>> {
        Transform::inverse(&self.matrix())
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Vector3::zeros(), 0.0, 0.0, 0.0)
    }
}

/// Builder for 4x4 homogeneous transforms.
///
/// Every function is pure. Matrices compose right to left: applying `b * a`
/// to a point applies `a` first.
pub struct Transform;

impl Transform {
    pub fn identity() -> Matrix4<f64> {
        Matrix4::identity()
    }

    /// Create a scale matrix with `(sx, sy, sz, 1)` on the diagonal.
    /// A zero factor is accepted and yields a singular matrix.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Matrix4<f64> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    /// Create a translation matrix
    pub fn translation(tx: f64, ty: f64, tz: f64) -> Matrix4<f64> {
        Matrix4::new_translation(&Vector3::new(tx, ty, tz))
    }

    /// Skew-symmetric generator `J` of rotations about `axis` (normalized first)
    pub fn generator(axis: &Vector3<f64>) -> KernelResult<Matrix4<f64>> {
        Ok(skew_generator(&unit_axis(axis)?))
    }

    /// Rotation by `angle` radians about `axis`, computed as `exp(J * angle)`
    pub fn rotation(axis: &Vector3<f64>, angle: f64) -> KernelResult<Matrix4<f64>> {
        Self::rotation_with(axis, angle, RotationMethod::default())
    }

    pub fn rotation_with(
        axis: &Vector3<f64>,
        angle: f64,
        method: RotationMethod,
    ) -> KernelResult<Matrix4<f64>> {
        let axis = unit_axis(axis)?;
        let full = match method {
            RotationMethod::Exponential => (skew_generator(&axis) * angle).exp(),
            RotationMethod::Rodrigues => Matrix4::from_axis_angle(&axis, angle),
        };

        // Only the 3x3 block carries the rotation; keep the homogeneous
        // row and column exact.
        let mut rotation = Matrix4::identity();
        rotation
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&full.fixed_view::<3, 3>(0, 0));
        Ok(rotation)
    }

    /// Elementary rotation about the X axis (pitch)
    #[rustfmt::skip]
    pub fn rotation_x(angle: f64) -> Matrix4<f64> {
        let (s, c) = angle.sin_cos();
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c, -s, 0.0,
            0.0, s, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Elementary rotation about the Y axis (yaw)
    #[rustfmt::skip]
    pub fn rotation_y(angle: f64) -> Matrix4<f64> {
        let (s, c) = angle.sin_cos();
        Matrix4::new(
            c, 0.0, s, 0.0,
            0.0, 1.0, 0.0, 0.0,
            -s, 0.0, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Elementary rotation about the Z axis (roll)
    #[rustfmt::skip]
    pub fn rotation_z(angle: f64) -> Matrix4<f64> {
        let (s, c) = angle.sin_cos();
        Matrix4::new(
            c, -s, 0.0, 0.0,
            s, c, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Left-to-right product of `transforms`; the last one is applied to a
    /// point first. An empty list composes to the identity.
    pub fn compose(transforms: &[Matrix4<f64>]) -> Matrix4<f64> {
        transforms
            .iter()
            .fold(Matrix4::identity(), |acc, transform| acc * transform)
    }

    /// Camera matrix `C = (R_roll @ R_pitch @ R_yaw) @ T(position)`.
    ///
    /// Yaw is applied first. Map world points into camera space with the
    /// inverse of this matrix.
    pub fn camera_matrix(position: &Vector3<f64>, yaw: f64, pitch: f64, roll: f64) -> Matrix4<f64> {
        let rc = Self::compose(&[
            Self::rotation_z(roll),
            Self::rotation_x(pitch),
            Self::rotation_y(yaw),
        ]);
        let tc = Self::translation(position.x, position.y, position.z);
        rc * tc
    }

    pub fn inverse(transform: &Matrix4<f64>) -> KernelResult<Matrix4<f64>> {
        transform.try_inverse().ok_or(KernelError::SingularMatrix)
    }

    /// Apply `transform` to every column of `batch`
    pub fn apply(transform: &Matrix4<f64>, batch: &VertexBatch) -> VertexBatch {
        VertexBatch::from_matrix(transform * batch.matrix())
    }

    /// Checked conversion of a dynamically sized matrix into a 4x4 transform
    pub fn from_dynamic(matrix: &DMatrix<f64>) -> KernelResult<Matrix4<f64>> {
        if matrix.shape() != (4, 4) {
            return Err(KernelError::shape("4x4", matrix.nrows(), matrix.ncols()));
        }
        Ok(matrix.fixed_view::<4, 4>(0, 0).into_owned())
    }
}

fn unit_axis(axis: &Vector3<f64>) -> KernelResult<Unit<Vector3<f64>>> {
    // Scale by the largest component first so the norm neither overflows
    // nor underflows for extreme magnitudes.
    let largest = axis.amax();
    if largest == 0.0 {
        return Err(KernelError::Domain("rotation axis has zero length".to_string()));
    }
    Ok(Unit::new_normalize(axis / largest))
}

#[rustfmt::skip]
fn skew_generator(axis: &Unit<Vector3<f64>>) -> Matrix4<f64> {
    let (vx, vy, vz) = (axis.x, axis.y, axis.z);
    Matrix4::new(
        0.0, -vz,  vy, 0.0,
         vz, 0.0, -vx, 0.0,
        -vy,  vx, 0.0, 0.0,
        0.0, 0.0, 0.0, 0.0,
    )
}
