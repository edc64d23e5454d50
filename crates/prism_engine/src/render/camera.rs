//! First-person camera with a cached look-at view matrix
//!
//! The camera keeps eye, target, and up together with a view matrix that is
//! recomputed on every mutation of those three fields, so it is never stale.
//! The projection matrix is independently assigned.
//!
//! Movement follows the rigid-translation, direction-preserving convention:
//! moving the eye translates the target by the same delta, so the looking
//! direction persists through translation (first-person "walk" semantics).

use crate::config::CameraConfig;
use crate::foundation::math::{
    DegenerateTransform, Mat4, Mat4Ext, Quat, Vec2, Vec3, DEGENERACY_EPSILON,
};

/// Minimum angle (radians) the viewing direction keeps from the up axis
///
/// Mouse-look pitch is clamped against this margin so the direction can
/// never cross the poles and invert the up vector.
const PITCH_MARGIN: f32 = 0.01;

/// Camera with eye/target/up state and derived view matrix
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    view: Mat4,
    projection: Mat4,

    /// Distance covered per second by the movement helpers
    pub linear_speed: f32,
    /// Scale applied to mouse-look deltas (radians per unit delta)
    pub angular_speed: f32,
}

impl Camera {
    /// Create a camera looking from `eye` toward `target`
    ///
    /// The projection defaults to the standard perspective (90 degree field
    /// of view, 16:9, near 0.1, far 100); assign another matrix with
    /// [`set_projection_matrix`](Self::set_projection_matrix).
    ///
    /// Fails when the look-at basis is degenerate: `eye == target`, or `up`
    /// parallel to the viewing direction.
    pub fn new(eye: Vec3, target: Vec3, up: Vec3) -> Result<Self, DegenerateTransform> {
        let view = Mat4::try_look_at(eye, target, up)?;
        Ok(Self {
            position: eye,
            target,
            up,
            view,
            projection: Mat4::perspective(
                crate::foundation::math::utils::deg_to_rad(90.0),
                16.0 / 9.0,
                0.1,
                100.0,
            ),
            linear_speed: 0.0,
            angular_speed: 1.0,
        })
    }

    /// Create a camera for screen-space overlays
    ///
    /// Positioned at the viewport's center, `layer` units toward the viewer,
    /// looking down -Z, with an orthographic projection matching the viewport
    /// pixel dimensions.
    pub fn new_2d(viewport_width: f32, viewport_height: f32, layer: f32) -> Self {
        let position = Vec3::new(viewport_width * 0.5, viewport_height * 0.5, layer);
        let target = position + Vec3::new(0.0, 0.0, -1.0);

        let mut camera = Self::new(position, target, Vec3::y())
            .expect("axis-aligned overlay camera basis is orthonormal");
        camera.projection = Mat4::orthographic(viewport_width, viewport_height, 0.1, 100.0);
        camera
    }

    /// Apply the configured field of view, clip planes, and speeds
    pub fn apply_config(&mut self, config: &CameraConfig, aspect: f32) {
        self.projection = Mat4::perspective(
            crate::foundation::math::utils::deg_to_rad(config.fov_degrees),
            aspect,
            config.near,
            config.far,
        );
        self.linear_speed = config.linear_speed;
        self.angular_speed = config.angular_speed;
    }

    /// Eye position in world space
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Point the camera is looking at
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Up vector
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Unit vector from the eye toward the target
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// View matrix derived from eye/target/up
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// Projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Assign the projection matrix
    pub fn set_projection_matrix(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    /// Combined projection and view transformation
    pub fn camera_matrix(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Move the eye, rigidly carrying the target with it
    ///
    /// The target translates by the same delta, so direction and distance to
    /// target are preserved exactly.
    pub fn set_position(&mut self, position: Vec3) {
        let delta = position - self.position;
        self.position = position;
        self.target += delta;
        self.refresh_view();
    }

    /// Aim at a new target point
    ///
    /// Rejected when the new basis would be degenerate; the camera state is
    /// untouched on failure.
    pub fn set_target(&mut self, target: Vec3) -> Result<(), DegenerateTransform> {
        self.view = Mat4::try_look_at(self.position, target, self.up)?;
        self.target = target;
        Ok(())
    }

    /// Assign a new up vector
    ///
    /// Rejected when the new basis would be degenerate; the camera state is
    /// untouched on failure.
    pub fn set_up(&mut self, up: Vec3) -> Result<(), DegenerateTransform> {
        self.view = Mat4::try_look_at(self.position, self.target, up)?;
        self.up = up;
        Ok(())
    }

    /// Aim along a direction vector
    ///
    /// Places the target one unit from the eye along `direction`.
    pub fn set_direction(&mut self, direction: Vec3) -> Result<(), DegenerateTransform> {
        if direction.norm() < DEGENERACY_EPSILON {
            return Err(DegenerateTransform::CoincidentEyeTarget);
        }
        self.set_target(self.position + direction.normalize())
    }

    /// Apply a mouse-look rotation
    ///
    /// Yaw accumulates from `delta.x` about the world up axis and pitch from
    /// `delta.y` about the camera's current local right axis; both are scaled
    /// by `angular_speed` and applied as one combined rotation of the viewing
    /// direction, which stays unit length. Pitch is clamped so the direction
    /// never crosses the poles.
    pub fn rotate_from_mouse(&mut self, delta: Vec2) {
        let yaw = Quat::from_axis_angle(&Vec3::y_axis(), delta.x * self.angular_speed);
        let direction = yaw * self.direction();

        let up_axis = self.up.normalize();
        let right = direction.cross(&up_axis);
        if right.norm() < DEGENERACY_EPSILON {
            // Already at a pole; yaw alone cannot have caused this, so keep
            // the previous state rather than produce a NaN basis
            return;
        }
        let right = nalgebra::Unit::new_normalize(right);

        // A positive pitch about the right axis tilts the direction toward
        // up, shrinking the angle between them by the same amount
        let current_angle = direction.angle(&up_axis);
        let pitch = (delta.y * self.angular_speed).clamp(
            current_angle - (std::f32::consts::PI - PITCH_MARGIN),
            current_angle - PITCH_MARGIN,
        );
        let direction = Quat::from_axis_angle(&right, pitch) * direction;

        self.target = self.position + direction;
        self.refresh_view();
    }

    /// Move along the viewing direction
    ///
    /// Covers `linear_speed * delta_time` world units; pass a `delta_time`
    /// of 1.0 for a full speed-step regardless of frame timing. The target
    /// moves rigidly with the eye.
    pub fn advance(&mut self, backwards: bool, delta_time: f32) {
        let sign = if backwards { -1.0 } else { 1.0 };
        let step = self.direction() * self.linear_speed * delta_time * sign;
        self.set_position(self.position + step);
    }

    /// Move along the camera's local right axis
    ///
    /// Same stepping rule as [`advance`](Self::advance).
    pub fn strafe(&mut self, left: bool, delta_time: f32) {
        let right = self.direction().cross(&self.up.normalize());
        let sign = if left { -1.0 } else { 1.0 };
        let step = right * self.linear_speed * delta_time * sign;
        self.set_position(self.position + step);
    }

    fn refresh_view(&mut self) {
        // Callers only reach here through mutations that preserve a basis
        // validated at construction time
        let view = Mat4::try_look_at(self.position, self.target, self.up);
        debug_assert!(view.is_ok());
        if let Ok(view) = view {
            self.view = view;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> Camera {
        let mut camera =
            Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::zeros(), Vec3::y()).unwrap();
        camera.linear_speed = 2.0;
        camera
    }

    #[test]
    fn test_construction_rejects_coincident_eye_and_target() {
        let eye = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(
            Camera::new(eye, eye, Vec3::y()).err(),
            Some(DegenerateTransform::CoincidentEyeTarget)
        );
    }

    #[test]
    fn test_construction_rejects_parallel_up() {
        assert_eq!(
            Camera::new(Vec3::zeros(), Vec3::new(0.0, 2.0, 0.0), Vec3::y()).err(),
            Some(DegenerateTransform::ParallelUp)
        );
    }

    #[test]
    fn test_moving_the_eye_carries_the_target() {
        let mut camera = camera();
        let old_target = camera.target();
        let old_direction = camera.direction();
        let delta = Vec3::new(1.0, -2.0, 0.5);

        camera.set_position(camera.position() + delta);

        assert_relative_eq!(camera.target(), old_target + delta, epsilon = 1.0e-5);
        assert_relative_eq!(camera.direction(), old_direction, epsilon = 1.0e-5);
    }

    #[test]
    fn test_set_target_leaves_position_fixed() {
        let mut camera = camera();
        let old_position = camera.position();

        camera.set_target(Vec3::new(3.0, 1.0, 0.0)).unwrap();

        assert_eq!(camera.position(), old_position);
        assert_relative_eq!(
            camera.direction(),
            (Vec3::new(3.0, 1.0, 0.0) - old_position).normalize(),
            epsilon = 1.0e-5
        );
    }

    #[test]
    fn test_degenerate_target_mutation_is_rejected() {
        let mut camera = camera();
        let old_view = camera.view_matrix();

        let result = camera.set_target(camera.position());

        assert_eq!(result, Err(DegenerateTransform::CoincidentEyeTarget));
        assert_eq!(camera.view_matrix(), old_view);
        assert_eq!(camera.target(), Vec3::zeros());
    }

    #[test]
    fn test_direction_setter_places_target_one_unit_away() {
        let mut camera = camera();
        camera.set_direction(Vec3::new(0.0, 0.0, -7.0)).unwrap();

        assert_relative_eq!(
            camera.target(),
            camera.position() + Vec3::new(0.0, 0.0, -1.0),
            epsilon = 1.0e-5
        );
    }

    #[test]
    fn test_advance_steps_along_direction() {
        let mut camera = camera();

        camera.advance(false, 0.5);

        // linear_speed 2.0 * 0.5s along -Z
        assert_relative_eq!(camera.position(), Vec3::new(0.0, 0.0, 4.0), epsilon = 1.0e-5);
        assert_relative_eq!(camera.direction(), Vec3::new(0.0, 0.0, -1.0), epsilon = 1.0e-5);
    }

    #[test]
    fn test_strafe_steps_along_right_axis() {
        let mut camera = camera();

        camera.strafe(false, 1.0);

        // Looking down -Z with +Y up, right is +X
        assert_relative_eq!(camera.position(), Vec3::new(2.0, 0.0, 5.0), epsilon = 1.0e-5);
    }

    #[test]
    fn test_mouse_rotation_preserves_unit_direction() {
        let mut camera = camera();

        camera.rotate_from_mouse(Vec2::new(0.3, -0.2));

        assert_relative_eq!(camera.direction().norm(), 1.0, epsilon = 1.0e-5);
        assert_relative_eq!(
            (camera.target() - camera.position()).norm(),
            1.0,
            epsilon = 1.0e-5
        );
    }

    #[test]
    fn test_mouse_pitch_cannot_cross_the_poles() {
        let mut camera = camera();

        // A wildly large upward pitch must stop short of the up axis
        camera.rotate_from_mouse(Vec2::new(0.0, 100.0));

        let angle_to_up = camera.direction().angle(&camera.up().normalize());
        assert!(angle_to_up >= PITCH_MARGIN * 0.9);

        // And the camera must still accept further rotations without
        // degenerating
        camera.rotate_from_mouse(Vec2::new(0.1, 0.1));
        assert_relative_eq!(camera.direction().norm(), 1.0, epsilon = 1.0e-5);
    }

    #[test]
    fn test_2d_camera_centers_on_viewport() {
        let camera = Camera::new_2d(800.0, 600.0, 10.0);

        assert_relative_eq!(
            camera.position(),
            Vec3::new(400.0, 300.0, 10.0),
            epsilon = 1.0e-5
        );
        assert_relative_eq!(camera.direction(), Vec3::new(0.0, 0.0, -1.0), epsilon = 1.0e-5);

        // Orthographic projection spans the viewport in pixels
        let projection = camera.projection_matrix();
        assert_relative_eq!(projection[(0, 0)], 2.0 / 800.0, epsilon = 1.0e-6);
        assert_relative_eq!(projection[(1, 1)], 2.0 / 600.0, epsilon = 1.0e-6);
    }

    #[test]
    fn test_view_matrix_tracks_every_mutation() {
        let mut camera = camera();
        let initial = camera.view_matrix();

        camera.set_position(Vec3::new(1.0, 0.0, 5.0));
        assert_ne!(camera.view_matrix(), initial);

        let after_move = camera.view_matrix();
        camera.set_target(Vec3::new(0.0, 3.0, 0.0)).unwrap();
        assert_ne!(camera.view_matrix(), after_move);
    }
}
