//! Per-frame render state threaded through draw calls
//!
//! The original design kept a "current camera" in ambient globals; here it is
//! an explicit value the per-frame driver owns and passes to the draw path,
//! preserving the same single-threaded update order: camera mutation, matrix
//! recomposition, uniform push, draw call.

use crate::device::GraphicsDevice;
use crate::foundation::math::{DegenerateTransform, Mat4, Vec3};
use crate::render::{Camera, ShaderProgram};

/// Viewport dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Viewport {
    /// Width / height ratio
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// The active camera and viewport for one frame
#[derive(Debug, Clone)]
pub struct RenderContext {
    camera: Camera,
    viewport: Viewport,
}

impl RenderContext {
    /// Create a context around a camera
    pub fn new(camera: Camera, viewport: Viewport) -> Self {
        Self { camera, viewport }
    }

    /// Create a context with a default camera behind the origin
    pub fn with_default_camera(viewport: Viewport) -> Result<Self, DegenerateTransform> {
        let camera = Camera::new(Vec3::new(0.0, 3.0, 3.0), Vec3::zeros(), Vec3::y())?;
        Ok(Self::new(camera, viewport))
    }

    /// The active camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable access to the active camera
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// The viewport
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// A screen-space overlay camera matching this context's viewport
    pub fn overlay_camera(&self, layer: f32) -> Camera {
        Camera::new_2d(self.viewport.width, self.viewport.height, layer)
    }

    /// Push the frame's transformation uniforms for one model
    ///
    /// Recomposes the matrices from the active camera and the given world
    /// matrix and hands them to the shader in one pass: model, view,
    /// projection, the combined camera matrix, and the full
    /// projection * view * model transformation.
    pub fn apply(
        &self,
        device: &mut dyn GraphicsDevice,
        shader: &mut ShaderProgram,
        world_matrix: &Mat4,
    ) {
        let view = self.camera.view_matrix();
        let projection = self.camera.projection_matrix();

        shader.set_model_matrix(device, *world_matrix);
        shader.set_view_matrix(device, view);
        shader.set_projection_matrix(device, projection);
        shader.set_camera_matrix(device, projection * view);
        shader.set_modelview_matrix(device, view * world_matrix);
        shader.set_transformation_matrix(device, projection * view * world_matrix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCommand, RecordingDevice};
    use crate::device::ShaderStageKind;
    use approx::assert_relative_eq;

    fn context() -> RenderContext {
        RenderContext::with_default_camera(Viewport {
            width: 1280.0,
            height: 720.0,
        })
        .unwrap()
    }

    #[test]
    fn test_apply_pushes_the_composed_transformation() {
        let mut device = RecordingDevice::new();
        let mut shader = ShaderProgram::new(&mut device);
        shader
            .add_stage(&mut device, ShaderStageKind::Vertex, "void main() {}")
            .unwrap();
        shader.link(&mut device).unwrap();
        device.declare_uniform(shader.handle(), "mvp_matrix");

        let ctx = context();
        let world = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        ctx.apply(&mut device, &mut shader, &world);

        let expected =
            ctx.camera().projection_matrix() * ctx.camera().view_matrix() * world;
        let pushed = device
            .commands()
            .iter()
            .find_map(|c| match c {
                DeviceCommand::SetUniformMat4 { value, .. } => Some(*value),
                _ => None,
            })
            .expect("transformation pushed");

        assert_relative_eq!(pushed, expected, epsilon = 1.0e-5);
        assert_relative_eq!(shader.transformation_matrix(), expected, epsilon = 1.0e-5);
    }

    #[test]
    fn test_overlay_camera_matches_viewport() {
        let ctx = context();

        let overlay = ctx.overlay_camera(10.0);

        assert_relative_eq!(
            overlay.position(),
            Vec3::new(640.0, 360.0, 10.0),
            epsilon = 1.0e-5
        );
    }

    #[test]
    fn test_viewport_aspect() {
        let viewport = Viewport {
            width: 1920.0,
            height: 1080.0,
        };
        assert_relative_eq!(viewport.aspect(), 16.0 / 9.0, epsilon = 1.0e-6);
    }
}
