//! Math utilities and types
//!
//! Provides fundamental math types for 3D graphics, backed by `nalgebra`.

use thiserror::Error;

pub use nalgebra::{Matrix4, Quaternion, Unit, UnitQuaternion, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Length threshold under which a vector is treated as zero
pub const DEGENERACY_EPSILON: f32 = 1.0e-6;

/// A look-at basis that cannot be orthonormalized
///
/// Raised instead of silently producing a NaN-filled view matrix when the
/// eye/target/up triple collapses (see [`Mat4Ext::try_look_at`]).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateTransform {
    /// Eye and target coincide, leaving no viewing direction
    #[error("camera eye and target coincide; the viewing direction is undefined")]
    CoincidentEyeTarget,

    /// Up vector is parallel to the viewing direction
    #[error("up vector is parallel to the viewing direction; the camera basis is undefined")]
    ParallelUp,
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }
}

/// Extension trait for Mat4 with the view/projection constructors the
/// camera system builds on
pub trait Mat4Ext {
    /// Create a right-handed perspective projection matrix
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed orthographic projection matrix centered on the
    /// origin, spanning `width` x `height`
    fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    ///
    /// Fails with [`DegenerateTransform`] when `eye == target` or when `up`
    /// is parallel to the viewing direction; both collapse the camera basis
    /// and would otherwise fill the matrix with NaN.
    fn try_look_at(eye: Vec3, target: Vec3, up: Vec3) -> Result<Mat4, DegenerateTransform>;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        nalgebra::Perspective3::new(aspect, fov_y, near, far).to_homogeneous()
    }

    fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Mat4 {
        let half_w = width * 0.5;
        let half_h = height * 0.5;
        nalgebra::Orthographic3::new(-half_w, half_w, -half_h, half_h, near, far).to_homogeneous()
    }

    fn try_look_at(eye: Vec3, target: Vec3, up: Vec3) -> Result<Mat4, DegenerateTransform> {
        let forward = target - eye;
        if forward.norm() < DEGENERACY_EPSILON {
            return Err(DegenerateTransform::CoincidentEyeTarget);
        }
        let forward = forward.normalize();

        let right = forward.cross(&up);
        if right.norm() < DEGENERACY_EPSILON {
            return Err(DegenerateTransform::ParallelUp);
        }
        let right = right.normalize();
        let camera_up = right.cross(&forward);

        // Rotation into the camera basis, then translation of the eye to the
        // origin. The camera looks down its local -Z axis.
        Ok(Mat4::new(
            right.x,
            right.y,
            right.z,
            -right.dot(&eye),
            camera_up.x,
            camera_up.y,
            camera_up.z,
            -camera_up.dot(&eye),
            -forward.x,
            -forward.y,
            -forward.z,
            forward.dot(&eye),
            0.0,
            0.0,
            0.0,
            1.0,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_look_at_moves_eye_to_origin() {
        let eye = Vec3::new(1.0, 2.0, 3.0);
        let view = Mat4::try_look_at(eye, Vec3::zeros(), Vec3::y()).unwrap();

        let eye_h = Vec4::new(eye.x, eye.y, eye.z, 1.0);
        let transformed = view * eye_h;

        assert_relative_eq!(transformed.x, 0.0, epsilon = 1.0e-5);
        assert_relative_eq!(transformed.y, 0.0, epsilon = 1.0e-5);
        assert_relative_eq!(transformed.z, 0.0, epsilon = 1.0e-5);
    }

    #[test]
    fn test_look_at_points_target_down_negative_z() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let target = Vec3::zeros();
        let view = Mat4::try_look_at(eye, target, Vec3::y()).unwrap();

        let target_h = Vec4::new(target.x, target.y, target.z, 1.0);
        let transformed = view * target_h;

        // Target lies straight ahead, 5 units down the camera's -Z axis
        assert_relative_eq!(transformed.x, 0.0, epsilon = 1.0e-5);
        assert_relative_eq!(transformed.y, 0.0, epsilon = 1.0e-5);
        assert_relative_eq!(transformed.z, -5.0, epsilon = 1.0e-5);
    }

    #[test]
    fn test_look_at_rejects_coincident_eye_and_target() {
        let eye = Vec3::new(1.0, 1.0, 1.0);
        let result = Mat4::try_look_at(eye, eye, Vec3::y());
        assert_eq!(result, Err(DegenerateTransform::CoincidentEyeTarget));
    }

    #[test]
    fn test_look_at_rejects_parallel_up() {
        let result = Mat4::try_look_at(Vec3::zeros(), Vec3::new(0.0, 3.0, 0.0), Vec3::y());
        assert_eq!(result, Err(DegenerateTransform::ParallelUp));
    }

    #[test]
    fn test_orthographic_maps_extents_to_unit_cube() {
        let projection = Mat4::orthographic(800.0, 600.0, 0.1, 100.0);

        let right_edge = projection * Vec4::new(400.0, 0.0, -1.0, 1.0);
        assert_relative_eq!(right_edge.x, 1.0, epsilon = 1.0e-5);

        let top_edge = projection * Vec4::new(0.0, 300.0, -1.0, 1.0);
        assert_relative_eq!(top_edge.y, 1.0, epsilon = 1.0e-5);
    }
}
