//! Shader program management
//!
//! [`ShaderProgram`] owns a GPU program object, stages vertex/fragment
//! compilation, and maps logical transform/material properties onto named
//! uniform variables. Uniform locations are looked up once per name and
//! memoized; a name the linked program does not declare degrades to a logged
//! warning and a GPU no-op rather than a failure, since halting rendering
//! over a single absent uniform is worse than a visibly wrong frame.

use std::collections::HashMap;

use thiserror::Error;

use crate::device::{
    AttributeSlot, GraphicsDevice, ProgramHandle, ShaderStageHandle, ShaderStageKind,
    UniformLocation,
};
use crate::foundation::math::Mat4;

/// Shader compilation and linking errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// A stage failed to compile; carries the device compiler log
    #[error("failed to compile {stage:?} shader: {log}")]
    Compile {
        /// Stage that failed
        stage: ShaderStageKind,
        /// Full compiler log
        log: String,
    },

    /// The program failed to link; carries the device linker log
    #[error("failed to link shader program: {log}")]
    Link {
        /// Full linker log
        log: String,
    },
}

/// Logical shader properties with convention-fixed uniform names
///
/// Replaces string-keyed uniform dispatch: call sites name the role, and the
/// program's [`UniformBindings`] decides which uniform variable it reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformRole {
    /// Projection matrix
    ProjectionMatrix,
    /// View matrix
    ViewMatrix,
    /// Model (world) matrix
    ModelMatrix,
    /// Combined projection * view matrix
    CameraMatrix,
    /// Combined view * model matrix
    ModelViewMatrix,
    /// Combined projection * view * model matrix
    TransformationMatrix,
    /// Diffuse texture sampler unit
    TextureUnit,
    /// Global opacity
    Alpha,
    /// Bump map sampler unit
    BumpMapUnit,
}

/// Uniform-variable names for each logical role
///
/// The defaults follow the engine's GLSL naming convention; assign other
/// names before linking when a shader uses its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBindings {
    /// Name bound to [`UniformRole::ProjectionMatrix`]
    pub projection_matrix: String,
    /// Name bound to [`UniformRole::ViewMatrix`]
    pub view_matrix: String,
    /// Name bound to [`UniformRole::ModelMatrix`]
    pub model_matrix: String,
    /// Name bound to [`UniformRole::CameraMatrix`]
    pub camera_matrix: String,
    /// Name bound to [`UniformRole::ModelViewMatrix`]
    pub modelview_matrix: String,
    /// Name bound to [`UniformRole::TransformationMatrix`]
    pub mvp_matrix: String,
    /// Name bound to [`UniformRole::TextureUnit`]
    pub texture_sampler: String,
    /// Name bound to [`UniformRole::Alpha`]
    pub alpha: String,
    /// Name bound to [`UniformRole::BumpMapUnit`]
    pub bump_sampler: String,
}

impl Default for UniformBindings {
    fn default() -> Self {
        Self {
            projection_matrix: "projection_matrix".to_owned(),
            view_matrix: "view_matrix".to_owned(),
            model_matrix: "model_matrix".to_owned(),
            camera_matrix: "camera_matrix".to_owned(),
            modelview_matrix: "modelview_matrix".to_owned(),
            mvp_matrix: "mvp_matrix".to_owned(),
            texture_sampler: "texture_sampler".to_owned(),
            alpha: "alpha".to_owned(),
            bump_sampler: "bump_sampler".to_owned(),
        }
    }
}

impl UniformBindings {
    /// The uniform-variable name bound to a role
    pub fn name_of(&self, role: UniformRole) -> &str {
        match role {
            UniformRole::ProjectionMatrix => &self.projection_matrix,
            UniformRole::ViewMatrix => &self.view_matrix,
            UniformRole::ModelMatrix => &self.model_matrix,
            UniformRole::CameraMatrix => &self.camera_matrix,
            UniformRole::ModelViewMatrix => &self.modelview_matrix,
            UniformRole::TransformationMatrix => &self.mvp_matrix,
            UniformRole::TextureUnit => &self.texture_sampler,
            UniformRole::Alpha => &self.alpha,
            UniformRole::BumpMapUnit => &self.bump_sampler,
        }
    }
}

/// Attribute names bound to the fixed slots at link time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeBindings {
    /// Name bound to [`AttributeSlot::Position`]
    pub position: String,
    /// Name bound to [`AttributeSlot::Color`]
    pub color: String,
    /// Name bound to [`AttributeSlot::Normal`]
    pub normal: String,
    /// Name bound to [`AttributeSlot::TexCoord`]
    pub tex_coord: String,
}

impl Default for AttributeBindings {
    fn default() -> Self {
        Self {
            position: "vertex_position".to_owned(),
            color: "vertex_color".to_owned(),
            normal: "vertex_normal".to_owned(),
            tex_coord: "vertex_texCoord".to_owned(),
        }
    }
}

impl AttributeBindings {
    /// The attribute name bound to a slot
    pub fn name_of(&self, slot: AttributeSlot) -> &str {
        match slot {
            AttributeSlot::Position => &self.position,
            AttributeSlot::Color => &self.color,
            AttributeSlot::Normal => &self.normal,
            AttributeSlot::TexCoord => &self.tex_coord,
        }
    }
}

/// Cached logical values of every uniform role
#[derive(Debug, Clone, PartialEq)]
struct UniformValues {
    projection_matrix: Mat4,
    view_matrix: Mat4,
    model_matrix: Mat4,
    camera_matrix: Mat4,
    modelview_matrix: Mat4,
    mvp_matrix: Mat4,
    texture_unit: i32,
    alpha: f32,
    bump_map_unit: i32,
}

impl Default for UniformValues {
    fn default() -> Self {
        Self {
            projection_matrix: Mat4::identity(),
            view_matrix: Mat4::identity(),
            model_matrix: Mat4::identity(),
            camera_matrix: Mat4::identity(),
            modelview_matrix: Mat4::identity(),
            mvp_matrix: Mat4::identity(),
            texture_unit: -1,
            alpha: 1.0,
            bump_map_unit: -1,
        }
    }
}

/// GPU shader program with staged compilation and role-based uniforms
///
/// Lifecycle: created → staged (zero or more [`add_stage`](Self::add_stage)
/// calls) → linked ([`link`](Self::link) frees the stage handles on success)
/// → active/inactive toggling → disposed.
#[derive(Debug)]
pub struct ShaderProgram {
    program: ProgramHandle,
    vertex_stage: Option<ShaderStageHandle>,
    fragment_stage: Option<ShaderStageHandle>,

    /// Uniform names reached by each logical role
    pub uniforms: UniformBindings,
    /// Attribute names bound to the fixed slots at link time
    pub attributes: AttributeBindings,

    locations: HashMap<String, Option<UniformLocation>>,
    values: UniformValues,
}

impl ShaderProgram {
    /// Create an empty program object on the device
    pub fn new(device: &mut dyn GraphicsDevice) -> Self {
        Self {
            program: device.create_program(),
            vertex_stage: None,
            fragment_stage: None,
            uniforms: UniformBindings::default(),
            attributes: AttributeBindings::default(),
            locations: HashMap::new(),
            values: UniformValues::default(),
        }
    }

    /// The device program handle
    pub fn handle(&self) -> ProgramHandle {
        self.program
    }

    /// Compile a stage from source and stage it for linking
    ///
    /// Replaces a previously staged handle of the same kind. Fails with the
    /// full compiler log on malformed source; the failure is fatal to this
    /// stage only, not to the program object.
    pub fn add_stage(
        &mut self,
        device: &mut dyn GraphicsDevice,
        kind: ShaderStageKind,
        source: &str,
    ) -> Result<(), ShaderError> {
        let stage = device
            .compile_stage(kind, source)
            .map_err(|log| ShaderError::Compile { stage: kind, log })?;

        let slot = match kind {
            ShaderStageKind::Vertex => &mut self.vertex_stage,
            ShaderStageKind::Fragment => &mut self.fragment_stage,
        };
        if let Some(previous) = slot.replace(stage) {
            device.delete_stage(previous);
        }

        Ok(())
    }

    /// Link the staged stages into a usable program
    ///
    /// Binds the fixed attribute slots to the configured attribute names
    /// before linking so the program's inputs match
    /// [`crate::render::GpuMesh::draw`]'s slot contract. On success the stage
    /// handles are detached and freed; they are not reusable. On failure the
    /// linker log is returned and the program object is left for disposal.
    pub fn link(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), ShaderError> {
        if let Some(stage) = self.vertex_stage {
            device.attach_stage(self.program, stage);
        }
        if let Some(stage) = self.fragment_stage {
            device.attach_stage(self.program, stage);
        }

        for slot in [
            AttributeSlot::Position,
            AttributeSlot::Color,
            AttributeSlot::Normal,
            AttributeSlot::TexCoord,
        ] {
            device.bind_attribute_location(self.program, slot, self.attributes.name_of(slot));
        }

        device
            .link_program(self.program)
            .map_err(|log| ShaderError::Link { log })?;

        for stage in [self.vertex_stage.take(), self.fragment_stage.take()]
            .into_iter()
            .flatten()
        {
            device.detach_stage(self.program, stage);
            device.delete_stage(stage);
        }

        Ok(())
    }

    /// Make this program current on the device
    pub fn activate(&self, device: &mut dyn GraphicsDevice) {
        device.use_program(Some(self.program));
    }

    /// Unbind whatever program is current
    pub fn deactivate(&self, device: &mut dyn GraphicsDevice) {
        device.use_program(None);
    }

    /// Release the program object and any still-staged stages
    pub fn dispose(&mut self, device: &mut dyn GraphicsDevice) {
        for stage in [self.vertex_stage.take(), self.fragment_stage.take()]
            .into_iter()
            .flatten()
        {
            device.delete_stage(stage);
        }
        device.delete_program(self.program);
    }

    /// Cached projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        self.values.projection_matrix
    }

    /// Cached view matrix
    pub fn view_matrix(&self) -> Mat4 {
        self.values.view_matrix
    }

    /// Cached model matrix
    pub fn model_matrix(&self) -> Mat4 {
        self.values.model_matrix
    }

    /// Cached combined projection * view matrix
    pub fn camera_matrix(&self) -> Mat4 {
        self.values.camera_matrix
    }

    /// Cached combined view * model matrix
    pub fn modelview_matrix(&self) -> Mat4 {
        self.values.modelview_matrix
    }

    /// Cached combined projection * view * model matrix
    pub fn transformation_matrix(&self) -> Mat4 {
        self.values.mvp_matrix
    }

    /// Cached texture unit
    pub fn texture_unit(&self) -> i32 {
        self.values.texture_unit
    }

    /// Cached opacity
    pub fn alpha(&self) -> f32 {
        self.values.alpha
    }

    /// Cached bump map unit
    pub fn bump_map_unit(&self) -> i32 {
        self.values.bump_map_unit
    }

    /// Set the projection matrix and push it to the GPU
    pub fn set_projection_matrix(&mut self, device: &mut dyn GraphicsDevice, matrix: Mat4) {
        self.values.projection_matrix = matrix;
        self.push_mat4(device, UniformRole::ProjectionMatrix, &matrix);
    }

    /// Set the view matrix and push it to the GPU
    pub fn set_view_matrix(&mut self, device: &mut dyn GraphicsDevice, matrix: Mat4) {
        self.values.view_matrix = matrix;
        self.push_mat4(device, UniformRole::ViewMatrix, &matrix);
    }

    /// Set the model matrix and push it to the GPU
    pub fn set_model_matrix(&mut self, device: &mut dyn GraphicsDevice, matrix: Mat4) {
        self.values.model_matrix = matrix;
        self.push_mat4(device, UniformRole::ModelMatrix, &matrix);
    }

    /// Set the combined projection * view matrix and push it to the GPU
    pub fn set_camera_matrix(&mut self, device: &mut dyn GraphicsDevice, matrix: Mat4) {
        self.values.camera_matrix = matrix;
        self.push_mat4(device, UniformRole::CameraMatrix, &matrix);
    }

    /// Set the combined view * model matrix and push it to the GPU
    pub fn set_modelview_matrix(&mut self, device: &mut dyn GraphicsDevice, matrix: Mat4) {
        self.values.modelview_matrix = matrix;
        self.push_mat4(device, UniformRole::ModelViewMatrix, &matrix);
    }

    /// Set the combined projection * view * model matrix and push it to the GPU
    pub fn set_transformation_matrix(&mut self, device: &mut dyn GraphicsDevice, matrix: Mat4) {
        self.values.mvp_matrix = matrix;
        self.push_mat4(device, UniformRole::TransformationMatrix, &matrix);
    }

    /// Set the diffuse texture sampler unit and push it to the GPU
    pub fn set_texture_unit(&mut self, device: &mut dyn GraphicsDevice, unit: i32) {
        self.values.texture_unit = unit;
        if let Some(location) = self.location_of(device, UniformRole::TextureUnit) {
            device.use_program(Some(self.program));
            device.set_uniform_i32(location, unit);
            device.use_program(None);
        }
    }

    /// Set the opacity and push it to the GPU
    pub fn set_alpha(&mut self, device: &mut dyn GraphicsDevice, alpha: f32) {
        self.values.alpha = alpha;
        if let Some(location) = self.location_of(device, UniformRole::Alpha) {
            device.use_program(Some(self.program));
            device.set_uniform_f32(location, alpha);
            device.use_program(None);
        }
    }

    /// Set the bump map sampler unit and push it to the GPU
    pub fn set_bump_map_unit(&mut self, device: &mut dyn GraphicsDevice, unit: i32) {
        self.values.bump_map_unit = unit;
        if let Some(location) = self.location_of(device, UniformRole::BumpMapUnit) {
            device.use_program(Some(self.program));
            device.set_uniform_i32(location, unit);
            device.use_program(None);
        }
    }

    fn push_mat4(&mut self, device: &mut dyn GraphicsDevice, role: UniformRole, matrix: &Mat4) {
        if let Some(location) = self.location_of(device, role) {
            device.use_program(Some(self.program));
            device.set_uniform_mat4(location, matrix);
            device.use_program(None);
        }
    }

    /// Memoized uniform-location lookup
    ///
    /// Each name is resolved against the device once; a name with no location
    /// in the linked program warns once and is remembered as absent.
    fn location_of(
        &mut self,
        device: &mut dyn GraphicsDevice,
        role: UniformRole,
    ) -> Option<UniformLocation> {
        let name = self.uniforms.name_of(role).to_owned();
        if let Some(&cached) = self.locations.get(&name) {
            return cached;
        }

        let location = device.uniform_location(self.program, &name);
        if location.is_none() {
            log::warn!("failed to retrieve location of uniform variable \"{name}\"");
        }
        self.locations.insert(name, location);
        location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCommand, RecordingDevice};

    const VS: &str = "void main() { gl_Position = vec4(0.0); }";
    const FS: &str = "void main() { }";

    fn linked_program(device: &mut RecordingDevice) -> ShaderProgram {
        let mut shader = ShaderProgram::new(device);
        shader.add_stage(device, ShaderStageKind::Vertex, VS).unwrap();
        shader.add_stage(device, ShaderStageKind::Fragment, FS).unwrap();
        shader.link(device).unwrap();
        shader
    }

    #[test]
    fn test_compile_failure_carries_the_log() {
        let mut device = RecordingDevice::new();
        let mut shader = ShaderProgram::new(&mut device);
        device.fail_next_compile("0:1: syntax error near 'vodi'");

        let result = shader.add_stage(&mut device, ShaderStageKind::Vertex, "vodi main() {}");

        assert_eq!(
            result,
            Err(ShaderError::Compile {
                stage: ShaderStageKind::Vertex,
                log: "0:1: syntax error near 'vodi'".to_owned(),
            })
        );
    }

    #[test]
    fn test_link_failure_carries_the_log() {
        let mut device = RecordingDevice::new();
        let mut shader = ShaderProgram::new(&mut device);
        shader.add_stage(&mut device, ShaderStageKind::Vertex, VS).unwrap();
        device.fail_next_link("unresolved symbol");

        let result = shader.link(&mut device);

        assert_eq!(
            result,
            Err(ShaderError::Link {
                log: "unresolved symbol".to_owned(),
            })
        );
    }

    #[test]
    fn test_link_binds_the_four_fixed_slots_before_linking() {
        let mut device = RecordingDevice::new();
        let shader = linked_program(&mut device);

        let commands = device.commands();
        let link_at = commands
            .iter()
            .position(|c| *c == DeviceCommand::LinkProgram(shader.handle()))
            .expect("program linked");

        for (slot, name) in [
            (AttributeSlot::Position, "vertex_position"),
            (AttributeSlot::Color, "vertex_color"),
            (AttributeSlot::Normal, "vertex_normal"),
            (AttributeSlot::TexCoord, "vertex_texCoord"),
        ] {
            let bind_at = commands
                .iter()
                .position(|c| {
                    *c == DeviceCommand::BindAttributeLocation {
                        program: shader.handle(),
                        slot,
                        name: name.to_owned(),
                    }
                })
                .expect("slot bound");
            assert!(bind_at < link_at);
        }
    }

    #[test]
    fn test_link_frees_the_stage_handles() {
        let mut device = RecordingDevice::new();
        let _shader = linked_program(&mut device);

        let detached = device.count_matching(|c| matches!(c, DeviceCommand::DetachStage { .. }));
        let deleted = device.count_matching(|c| matches!(c, DeviceCommand::DeleteStage(_)));
        assert_eq!(detached, 2);
        assert_eq!(deleted, 2);
    }

    #[test]
    fn test_uniform_location_is_looked_up_once() {
        let mut device = RecordingDevice::new();
        let mut shader = linked_program(&mut device);
        device.declare_uniform(shader.handle(), "alpha");

        shader.set_alpha(&mut device, 0.5);
        shader.set_alpha(&mut device, 0.25);

        let lookups = device.count_matching(
            |c| matches!(c, DeviceCommand::UniformLookup { name, .. } if name == "alpha"),
        );
        assert_eq!(lookups, 1);

        let writes = device.count_matching(|c| matches!(c, DeviceCommand::SetUniformF32 { .. }));
        assert_eq!(writes, 2);
        assert_eq!(shader.alpha(), 0.25);
    }

    #[test]
    fn test_missing_uniform_is_a_noop_but_still_cached() {
        let mut device = RecordingDevice::new();
        let mut shader = linked_program(&mut device);
        // "alpha" is never declared on the device

        shader.set_alpha(&mut device, 0.75);
        shader.set_alpha(&mut device, 0.75);

        assert_eq!(
            device.count_matching(|c| matches!(c, DeviceCommand::SetUniformF32 { .. })),
            0
        );
        // The miss is memoized: one lookup, not one per write
        let lookups = device.count_matching(
            |c| matches!(c, DeviceCommand::UniformLookup { name, .. } if name == "alpha"),
        );
        assert_eq!(lookups, 1);
        // The logical value still updates
        assert_eq!(shader.alpha(), 0.75);
    }

    #[test]
    fn test_uniform_write_is_bracketed_by_activation() {
        let mut device = RecordingDevice::new();
        let mut shader = linked_program(&mut device);
        device.declare_uniform(shader.handle(), "mvp_matrix");
        device.clear_commands();

        shader.set_transformation_matrix(&mut device, Mat4::identity());

        let commands = device.commands();
        let write_at = commands
            .iter()
            .position(|c| matches!(c, DeviceCommand::SetUniformMat4 { .. }))
            .expect("matrix written");

        assert_eq!(
            commands[write_at - 1],
            DeviceCommand::UseProgram(Some(shader.handle()))
        );
        assert_eq!(commands[write_at + 1], DeviceCommand::UseProgram(None));
    }

    #[test]
    fn test_custom_uniform_names_are_respected() {
        let mut device = RecordingDevice::new();
        let mut shader = ShaderProgram::new(&mut device);
        shader.uniforms.alpha = "u_opacity".to_owned();
        shader.add_stage(&mut device, ShaderStageKind::Vertex, VS).unwrap();
        shader.link(&mut device).unwrap();
        device.declare_uniform(shader.handle(), "u_opacity");

        shader.set_alpha(&mut device, 0.1);

        assert_eq!(
            device.count_matching(|c| matches!(c, DeviceCommand::SetUniformF32 { .. })),
            1
        );
    }

    #[test]
    fn test_activate_and_deactivate_toggle_the_program() {
        let mut device = RecordingDevice::new();
        let shader = linked_program(&mut device);
        device.clear_commands();

        shader.activate(&mut device);
        shader.deactivate(&mut device);

        assert_eq!(
            device.commands(),
            &[
                DeviceCommand::UseProgram(Some(shader.handle())),
                DeviceCommand::UseProgram(None),
            ]
        );
    }

    #[test]
    fn test_dispose_releases_the_program() {
        let mut device = RecordingDevice::new();
        let mut shader = linked_program(&mut device);
        device.clear_commands();

        shader.dispose(&mut device);

        assert!(device
            .commands()
            .contains(&DeviceCommand::DeleteProgram(shader.handle())));
    }
}
