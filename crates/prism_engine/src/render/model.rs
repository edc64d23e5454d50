//! Positioned, drawable instance of a mesh

use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::math::{Mat4, Quat, Quaternion, Unit, Vec3};
use crate::device::GraphicsDevice;
use crate::render::{GpuMesh, Material, MeshError};

/// A mesh placed in the world with position, rotation, and uniform scale
///
/// Several models may share one [`GpuMesh`]; the mesh is reference-counted
/// and mesh-level state such as the point-rendering toggle is visible to all
/// of them. An optional [`Material`] supplies the surface appearance.
#[derive(Debug, Clone)]
pub struct Model {
    mesh: Rc<RefCell<GpuMesh>>,
    rotation: Quat,

    /// Position in world space
    pub position: Vec3,
    /// Uniform scale factor
    pub scale: f32,
    /// Optional surface appearance
    pub material: Option<Material>,
}

impl Model {
    /// Create a model owning a fresh mesh
    pub fn new(mesh: GpuMesh) -> Self {
        Self::from_shared(Rc::new(RefCell::new(mesh)))
    }

    /// Create a model sharing an existing mesh
    pub fn from_shared(mesh: Rc<RefCell<GpuMesh>>) -> Self {
        Self {
            mesh,
            rotation: Quat::identity(),
            position: Vec3::zeros(),
            scale: 1.0,
            material: None,
        }
    }

    /// The shared mesh
    pub fn mesh(&self) -> Rc<RefCell<GpuMesh>> {
        Rc::clone(&self.mesh)
    }

    /// Rotation quaternion
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Assign the rotation, renormalizing the quaternion
    ///
    /// Renormalization happens on every write so the stored rotation is
    /// always a unit quaternion regardless of accumulated caller drift.
    pub fn set_rotation(&mut self, rotation: Quaternion<f32>) {
        self.rotation = Unit::new_normalize(rotation);
    }

    /// World transformation matrix
    ///
    /// Applies scale, then rotation, then translation. The order is fixed;
    /// changing it changes the visual semantics of every placed model.
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_scaling(self.scale)
    }

    /// Draw the mesh, binding the material texture around the call if one
    /// is attached
    pub fn draw(&self, device: &mut dyn GraphicsDevice) -> Result<(), MeshError> {
        let texture = self.material.as_ref().and_then(|material| material.texture);

        if let Some(texture) = texture {
            device.bind_texture(Some(texture.handle()));
            let result = self.mesh.borrow().draw(device);
            device.bind_texture(None);
            result
        } else {
            self.mesh.borrow().draw(device)
        }
    }

    /// Flip the shared mesh between triangle and point rendering
    ///
    /// Affects every model sharing the mesh.
    pub fn toggle_points(&self) {
        self.mesh.borrow_mut().toggle_points();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCommand, RecordingDevice};
    use crate::render::Texture;
    use approx::assert_relative_eq;

    fn triangle_model(device: &mut RecordingDevice) -> Model {
        let mut mesh = GpuMesh::new();
        mesh.add_vertex([0.0, 0.0, 0.0]);
        mesh.add_vertex([1.0, 0.0, 0.0]);
        mesh.add_vertex([0.0, 1.0, 0.0]);
        mesh.set_up(device).unwrap();
        Model::new(mesh)
    }

    #[test]
    fn test_world_matrix_reduces_to_scale_then_translate() {
        let mut device = RecordingDevice::new();
        let mut model = triangle_model(&mut device);
        model.position = Vec3::new(2.0, -1.0, 4.0);
        model.scale = 3.0;

        let expected = Mat4::new_translation(&model.position) * Mat4::new_scaling(3.0);
        assert_relative_eq!(model.world_matrix(), expected, epsilon = 1.0e-6);
    }

    #[test]
    fn test_world_matrix_scales_before_translating() {
        let mut device = RecordingDevice::new();
        let mut model = triangle_model(&mut device);
        model.position = Vec3::new(10.0, 0.0, 0.0);
        model.scale = 2.0;

        // A point at x=1 scales to x=2, then translates to x=12; translating
        // first would have produced x=22
        let point = nalgebra::Point3::new(1.0, 0.0, 0.0);
        let transformed = model.world_matrix().transform_point(&point);
        assert_relative_eq!(transformed.x, 12.0, epsilon = 1.0e-5);
    }

    #[test]
    fn test_rotation_is_renormalized_on_write() {
        let mut device = RecordingDevice::new();
        let mut model = triangle_model(&mut device);

        model.set_rotation(Quaternion::new(2.0, 0.0, 2.0, 0.0));

        assert_relative_eq!(model.rotation().norm(), 1.0, epsilon = 1.0e-6);
    }

    #[test]
    fn test_toggle_points_reaches_every_sharer() {
        let mut device = RecordingDevice::new();
        let first = triangle_model(&mut device);
        let second = Model::from_shared(first.mesh());

        first.toggle_points();

        assert!(second.mesh().borrow().draws_as_points());
    }

    #[test]
    fn test_draw_with_texture_brackets_the_binding() {
        let mut device = RecordingDevice::new();
        let mut model = triangle_model(&mut device);
        let texture = Texture::from_rgba(&mut device, 2, 2, &[0u8; 16]);
        model.material = Some(Material {
            texture: Some(texture),
            ..Material::default()
        });
        device.clear_commands();

        model.draw(&mut device).unwrap();

        let commands = device.commands();
        let bind_at = commands
            .iter()
            .position(|c| *c == DeviceCommand::BindTexture(Some(texture.handle())))
            .expect("texture bound");
        let draw_at = commands
            .iter()
            .position(|c| matches!(c, DeviceCommand::DrawArrays { .. }))
            .expect("mesh drawn");
        let unbind_at = commands
            .iter()
            .position(|c| *c == DeviceCommand::BindTexture(None))
            .expect("texture unbound");

        assert!(bind_at < draw_at && draw_at < unbind_at);
    }

    #[test]
    fn test_draw_without_material_skips_texture_binding() {
        let mut device = RecordingDevice::new();
        let model = triangle_model(&mut device);
        device.clear_commands();

        model.draw(&mut device).unwrap();

        assert_eq!(
            device.count_matching(|c| matches!(c, DeviceCommand::BindTexture(_))),
            0
        );
    }
}
