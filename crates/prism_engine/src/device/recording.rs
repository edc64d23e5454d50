//! Command-recording graphics device
//!
//! [`RecordingDevice`] implements [`GraphicsDevice`] by allocating sequential
//! handles and appending every call to a command log. It backs the test suite
//! (draw-path assertions read the log) and doubles as a headless device for
//! running the pipeline without a GPU context.

use std::collections::HashMap;

use crate::device::{
    AttributeSlot, BufferHandle, GraphicsDevice, PrimitiveMode, ProgramHandle, ShaderStageHandle,
    ShaderStageKind, TextureHandle, UniformLocation,
};
use crate::foundation::math::{Mat4, Vec2, Vec3, Vec4};

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    /// `create_buffer` returned this handle
    CreateBuffer(BufferHandle),
    /// `upload_array_buffer` with this many bytes
    UploadArrayBuffer {
        /// Destination buffer
        buffer: BufferHandle,
        /// Number of bytes uploaded
        byte_len: usize,
    },
    /// `upload_index_buffer` with this many bytes
    UploadIndexBuffer {
        /// Destination buffer
        buffer: BufferHandle,
        /// Number of bytes uploaded
        byte_len: usize,
    },
    /// `bind_attribute_buffer`
    BindAttributeBuffer {
        /// Bound buffer
        buffer: BufferHandle,
        /// Target slot
        slot: AttributeSlot,
        /// Float components per vertex
        components: u32,
    },
    /// `bind_index_buffer`
    BindIndexBuffer(BufferHandle),
    /// `enable_attribute`
    EnableAttribute(AttributeSlot),
    /// `disable_attribute`
    DisableAttribute(AttributeSlot),
    /// `delete_buffer`
    DeleteBuffer(BufferHandle),
    /// `draw_indexed`
    DrawIndexed {
        /// Primitive topology
        mode: PrimitiveMode,
        /// Number of indices drawn
        index_count: u32,
    },
    /// `draw_arrays`
    DrawArrays {
        /// Primitive topology
        mode: PrimitiveMode,
        /// Number of vertices drawn
        vertex_count: u32,
    },
    /// `compile_stage` succeeded with this handle
    CompileStage {
        /// Stage kind
        kind: ShaderStageKind,
        /// Resulting handle
        stage: ShaderStageHandle,
    },
    /// `create_program` returned this handle
    CreateProgram(ProgramHandle),
    /// `attach_stage`
    AttachStage {
        /// Target program
        program: ProgramHandle,
        /// Attached stage
        stage: ShaderStageHandle,
    },
    /// `bind_attribute_location`
    BindAttributeLocation {
        /// Target program
        program: ProgramHandle,
        /// Bound slot
        slot: AttributeSlot,
        /// Attribute name in the program source
        name: String,
    },
    /// `link_program`
    LinkProgram(ProgramHandle),
    /// `detach_stage`
    DetachStage {
        /// Target program
        program: ProgramHandle,
        /// Detached stage
        stage: ShaderStageHandle,
    },
    /// `delete_stage`
    DeleteStage(ShaderStageHandle),
    /// `use_program`
    UseProgram(Option<ProgramHandle>),
    /// `delete_program`
    DeleteProgram(ProgramHandle),
    /// `uniform_location`
    UniformLookup {
        /// Queried program
        program: ProgramHandle,
        /// Queried uniform name
        name: String,
    },
    /// `set_uniform_f32`
    SetUniformF32 {
        /// Target location
        location: UniformLocation,
        /// Written value
        value: f32,
    },
    /// `set_uniform_i32`
    SetUniformI32 {
        /// Target location
        location: UniformLocation,
        /// Written value
        value: i32,
    },
    /// `set_uniform_vec2`
    SetUniformVec2 {
        /// Target location
        location: UniformLocation,
        /// Written value
        value: Vec2,
    },
    /// `set_uniform_vec3`
    SetUniformVec3 {
        /// Target location
        location: UniformLocation,
        /// Written value
        value: Vec3,
    },
    /// `set_uniform_vec4`
    SetUniformVec4 {
        /// Target location
        location: UniformLocation,
        /// Written value
        value: Vec4,
    },
    /// `set_uniform_mat4`
    SetUniformMat4 {
        /// Target location
        location: UniformLocation,
        /// Written value
        value: Mat4,
    },
    /// `create_texture`
    CreateTexture {
        /// Resulting handle
        texture: TextureHandle,
        /// Texture width in pixels
        width: u32,
        /// Texture height in pixels
        height: u32,
    },
    /// `bind_texture`
    BindTexture(Option<TextureHandle>),
    /// `delete_texture`
    DeleteTexture(TextureHandle),
}

/// Graphics device that records every call instead of talking to a GPU
#[derive(Debug, Default)]
pub struct RecordingDevice {
    next_handle: u32,
    next_location: i32,
    commands: Vec<DeviceCommand>,
    uniforms: HashMap<(ProgramHandle, String), UniformLocation>,
    fail_compile: Option<String>,
    fail_link: Option<String>,
}

impl RecordingDevice {
    /// Create an empty recording device
    pub fn new() -> Self {
        Self::default()
    }

    /// The commands recorded so far, in call order
    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    /// Discard the recorded commands, keeping declared uniforms and handles
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Declare that `name` resolves to a location in `program`
    ///
    /// Lookups for undeclared names return `None`, mirroring a uniform the
    /// device compiler optimized out.
    pub fn declare_uniform(&mut self, program: ProgramHandle, name: &str) -> UniformLocation {
        let location = UniformLocation(self.next_location);
        self.next_location += 1;
        self.uniforms.insert((program, name.to_owned()), location);
        location
    }

    /// Make the next `compile_stage` call fail with this compiler log
    pub fn fail_next_compile(&mut self, log: impl Into<String>) {
        self.fail_compile = Some(log.into());
    }

    /// Make the next `link_program` call fail with this linker log
    pub fn fail_next_link(&mut self, log: impl Into<String>) {
        self.fail_link = Some(log.into());
    }

    /// Count recorded commands matching a predicate
    pub fn count_matching(&self, predicate: impl Fn(&DeviceCommand) -> bool) -> usize {
        self.commands.iter().filter(|command| predicate(command)).count()
    }

    fn next(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_buffer(&mut self) -> BufferHandle {
        let handle = BufferHandle(self.next());
        self.commands.push(DeviceCommand::CreateBuffer(handle));
        handle
    }

    fn upload_array_buffer(&mut self, buffer: BufferHandle, bytes: &[u8]) {
        self.commands.push(DeviceCommand::UploadArrayBuffer {
            buffer,
            byte_len: bytes.len(),
        });
    }

    fn upload_index_buffer(&mut self, buffer: BufferHandle, bytes: &[u8]) {
        self.commands.push(DeviceCommand::UploadIndexBuffer {
            buffer,
            byte_len: bytes.len(),
        });
    }

    fn bind_attribute_buffer(&mut self, buffer: BufferHandle, slot: AttributeSlot, components: u32) {
        self.commands.push(DeviceCommand::BindAttributeBuffer {
            buffer,
            slot,
            components,
        });
    }

    fn bind_index_buffer(&mut self, buffer: BufferHandle) {
        self.commands.push(DeviceCommand::BindIndexBuffer(buffer));
    }

    fn enable_attribute(&mut self, slot: AttributeSlot) {
        self.commands.push(DeviceCommand::EnableAttribute(slot));
    }

    fn disable_attribute(&mut self, slot: AttributeSlot) {
        self.commands.push(DeviceCommand::DisableAttribute(slot));
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.commands.push(DeviceCommand::DeleteBuffer(buffer));
    }

    fn draw_indexed(&mut self, mode: PrimitiveMode, index_count: u32) {
        self.commands.push(DeviceCommand::DrawIndexed { mode, index_count });
    }

    fn draw_arrays(&mut self, mode: PrimitiveMode, vertex_count: u32) {
        self.commands.push(DeviceCommand::DrawArrays { mode, vertex_count });
    }

    fn compile_stage(
        &mut self,
        kind: ShaderStageKind,
        _source: &str,
    ) -> Result<ShaderStageHandle, String> {
        if let Some(log) = self.fail_compile.take() {
            return Err(log);
        }
        let stage = ShaderStageHandle(self.next());
        self.commands.push(DeviceCommand::CompileStage { kind, stage });
        Ok(stage)
    }

    fn create_program(&mut self) -> ProgramHandle {
        let program = ProgramHandle(self.next());
        self.commands.push(DeviceCommand::CreateProgram(program));
        program
    }

    fn attach_stage(&mut self, program: ProgramHandle, stage: ShaderStageHandle) {
        self.commands.push(DeviceCommand::AttachStage { program, stage });
    }

    fn bind_attribute_location(&mut self, program: ProgramHandle, slot: AttributeSlot, name: &str) {
        self.commands.push(DeviceCommand::BindAttributeLocation {
            program,
            slot,
            name: name.to_owned(),
        });
    }

    fn link_program(&mut self, program: ProgramHandle) -> Result<(), String> {
        if let Some(log) = self.fail_link.take() {
            return Err(log);
        }
        self.commands.push(DeviceCommand::LinkProgram(program));
        Ok(())
    }

    fn detach_stage(&mut self, program: ProgramHandle, stage: ShaderStageHandle) {
        self.commands.push(DeviceCommand::DetachStage { program, stage });
    }

    fn delete_stage(&mut self, stage: ShaderStageHandle) {
        self.commands.push(DeviceCommand::DeleteStage(stage));
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.commands.push(DeviceCommand::UseProgram(program));
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.commands.push(DeviceCommand::DeleteProgram(program));
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.commands.push(DeviceCommand::UniformLookup {
            program,
            name: name.to_owned(),
        });
        self.uniforms.get(&(program, name.to_owned())).copied()
    }

    fn set_uniform_f32(&mut self, location: UniformLocation, value: f32) {
        self.commands.push(DeviceCommand::SetUniformF32 { location, value });
    }

    fn set_uniform_i32(&mut self, location: UniformLocation, value: i32) {
        self.commands.push(DeviceCommand::SetUniformI32 { location, value });
    }

    fn set_uniform_vec2(&mut self, location: UniformLocation, value: Vec2) {
        self.commands.push(DeviceCommand::SetUniformVec2 { location, value });
    }

    fn set_uniform_vec3(&mut self, location: UniformLocation, value: Vec3) {
        self.commands.push(DeviceCommand::SetUniformVec3 { location, value });
    }

    fn set_uniform_vec4(&mut self, location: UniformLocation, value: Vec4) {
        self.commands.push(DeviceCommand::SetUniformVec4 { location, value });
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        self.commands.push(DeviceCommand::SetUniformMat4 {
            location,
            value: *value,
        });
    }

    fn create_texture(&mut self, width: u32, height: u32, _rgba: &[u8]) -> TextureHandle {
        let texture = TextureHandle(self.next());
        self.commands.push(DeviceCommand::CreateTexture {
            texture,
            width,
            height,
        });
        texture
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        self.commands.push(DeviceCommand::BindTexture(texture));
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.commands.push(DeviceCommand::DeleteTexture(texture));
    }
}
