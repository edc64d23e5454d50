//! Graphics device abstraction
//!
//! This module defines the trait that graphics backends must implement to
//! provide a consistent interface for the high-level rendering types. The
//! core calls a fixed set of primitives (buffer creation and upload,
//! attribute-slot binding, indexed/non-indexed draws, program compilation and
//! linking, uniform writes, and texture binding) and any binding exposing
//! these primitives satisfies the contract.
//!
//! Resource handles are opaque newtypes with explicit [`raw`](BufferHandle::raw)
//! accessors; the engine never relies on implicit conversions between a
//! resource wrapper and its device handle.

mod recording;

pub use recording::{DeviceCommand, RecordingDevice};

use crate::foundation::math::{Mat4, Vec2, Vec3, Vec4};

/// Handle to a GPU buffer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

impl BufferHandle {
    /// Get the raw device handle
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Handle to a compiled shader stage awaiting linking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderStageHandle(pub u32);

impl ShaderStageHandle {
    /// Get the raw device handle
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Handle to a linked GPU program object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

impl ProgramHandle {
    /// Get the raw device handle
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Handle to a GPU texture object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    /// Get the raw device handle
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Location of a uniform variable within a linked program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

impl UniformLocation {
    /// Get the raw device location
    pub fn raw(self) -> i32 {
        self.0
    }
}

/// Fixed numeric binding points for per-vertex data
///
/// These slot numbers are a global contract: [`crate::render::GpuMesh::draw`]
/// enables them and [`crate::render::ShaderProgram::link`] binds the program's
/// attribute names to them. The two must agree, so both read from this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum AttributeSlot {
    /// Vertex position (vec3)
    Position = 0,
    /// Vertex color (vec4)
    Color = 1,
    /// Vertex normal (vec3)
    Normal = 2,
    /// Vertex texture coordinate (vec2)
    TexCoord = 3,
}

impl AttributeSlot {
    /// The slot's numeric binding point
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Number of float components one attribute of this slot carries
    pub fn component_count(self) -> u32 {
        match self {
            Self::Position | Self::Normal => 3,
            Self::Color => 4,
            Self::TexCoord => 2,
        }
    }
}

/// Primitive topology for draw calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveMode {
    /// Filled triangle list
    Triangles,
    /// Point per vertex
    Points,
}

/// Kind of a programmable shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStageKind {
    /// Per-vertex stage
    Vertex,
    /// Per-fragment stage
    Fragment,
}

/// Graphics device primitive contract
///
/// All operations are synchronous and execute on the rendering thread; the
/// program that is current at the moment of a uniform write or draw call is
/// device-global state, so callers bracket activation explicitly.
///
/// Compilation and linking report failure as the raw device log; the shader
/// module wraps these into typed errors.
pub trait GraphicsDevice {
    // --- Buffers ---

    /// Create an empty buffer object
    fn create_buffer(&mut self) -> BufferHandle;

    /// Upload raw bytes into a vertex attribute buffer
    fn upload_array_buffer(&mut self, buffer: BufferHandle, bytes: &[u8]);

    /// Upload raw bytes into an index buffer
    fn upload_index_buffer(&mut self, buffer: BufferHandle, bytes: &[u8]);

    /// Bind a buffer as the data source for an attribute slot
    ///
    /// `components` is the number of float components per vertex (e.g. 3 for
    /// positions, 2 for texture coordinates).
    fn bind_attribute_buffer(&mut self, buffer: BufferHandle, slot: AttributeSlot, components: u32);

    /// Bind a buffer as the index source for subsequent indexed draws
    fn bind_index_buffer(&mut self, buffer: BufferHandle);

    /// Enable an attribute slot for the next draw call
    fn enable_attribute(&mut self, slot: AttributeSlot);

    /// Disable an attribute slot
    fn disable_attribute(&mut self, slot: AttributeSlot);

    /// Release a buffer object
    fn delete_buffer(&mut self, buffer: BufferHandle);

    // --- Draw calls ---

    /// Issue an indexed draw over the currently bound buffers
    fn draw_indexed(&mut self, mode: PrimitiveMode, index_count: u32);

    /// Issue a non-indexed draw over the currently bound buffers
    fn draw_arrays(&mut self, mode: PrimitiveMode, vertex_count: u32);

    // --- Programs ---

    /// Compile a shader stage from source text
    ///
    /// On failure the error is the device's compiler log.
    fn compile_stage(
        &mut self,
        kind: ShaderStageKind,
        source: &str,
    ) -> Result<ShaderStageHandle, String>;

    /// Create an empty program object
    fn create_program(&mut self) -> ProgramHandle;

    /// Attach a compiled stage to a program
    fn attach_stage(&mut self, program: ProgramHandle, stage: ShaderStageHandle);

    /// Bind an attribute slot number to a named attribute of the program
    ///
    /// Must be issued before linking to take effect.
    fn bind_attribute_location(&mut self, program: ProgramHandle, slot: AttributeSlot, name: &str);

    /// Link the program's attached stages
    ///
    /// On failure the error is the device's linker log.
    fn link_program(&mut self, program: ProgramHandle) -> Result<(), String>;

    /// Detach a stage from a program
    fn detach_stage(&mut self, program: ProgramHandle, stage: ShaderStageHandle);

    /// Release a compiled stage
    fn delete_stage(&mut self, stage: ShaderStageHandle);

    /// Make a program current, or unbind with `None`
    fn use_program(&mut self, program: Option<ProgramHandle>);

    /// Release a program object
    fn delete_program(&mut self, program: ProgramHandle);

    // --- Uniforms ---

    /// Look up the location of a named uniform in a linked program
    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Write a float uniform
    fn set_uniform_f32(&mut self, location: UniformLocation, value: f32);

    /// Write an integer uniform (texture units)
    fn set_uniform_i32(&mut self, location: UniformLocation, value: i32);

    /// Write a vec2 uniform
    fn set_uniform_vec2(&mut self, location: UniformLocation, value: Vec2);

    /// Write a vec3 uniform
    fn set_uniform_vec3(&mut self, location: UniformLocation, value: Vec3);

    /// Write a vec4 uniform
    fn set_uniform_vec4(&mut self, location: UniformLocation, value: Vec4);

    /// Write a mat4 uniform
    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4);

    // --- Textures ---

    /// Create a texture from RGBA8 pixel data
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureHandle;

    /// Bind a texture as current, or unbind with `None`
    fn bind_texture(&mut self, texture: Option<TextureHandle>);

    /// Release a texture object
    fn delete_texture(&mut self, texture: TextureHandle);
}
