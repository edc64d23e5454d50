//! GPU-resident drawable mesh
//!
//! [`GpuMesh`] owns the CPU-side attribute arrays, uploads them to GPU
//! buffers once, and issues draw calls through the fixed attribute-slot
//! contract shared with [`crate::render::ShaderProgram`].

use thiserror::Error;

use crate::device::{AttributeSlot, BufferHandle, GraphicsDevice, PrimitiveMode};
use crate::geometry::GeometryBuilder;

/// Mesh lifecycle usage errors
///
/// These are programming errors, not recoverable conditions; they fail loudly
/// rather than producing an empty or stale draw.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshError {
    /// `set_up` was called on a mesh that already uploaded its buffers
    #[error("mesh buffers were already uploaded; re-populating after setup is unsupported")]
    AlreadySetUp,

    /// `draw` was called before `set_up`
    #[error("mesh has not been uploaded to the GPU")]
    NotSetUp,

    /// `set_up` was called after `dispose`
    #[error("mesh GPU resources were disposed")]
    Disposed,
}

/// Drawable mesh backed by GPU buffer objects
///
/// Lifecycle: Empty (constructed) → Populated (`add_*` calls) → Ready
/// (`set_up` uploads and freezes the attribute presence flags) → Disposed
/// (`dispose` releases the GPU buffers). Adding data after setup has no
/// effect on the GPU copy, and re-entering the populated state is
/// unsupported.
#[derive(Debug, Clone, Default)]
pub struct GpuMesh {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    colors: Vec<[f32; 4]>,
    tex_coords: Vec<[f32; 2]>,
    indices: Vec<u32>,

    has_normals: bool,
    has_colors: bool,
    has_tex_coords: bool,
    is_indexed: bool,

    position_buffer: Option<BufferHandle>,
    normal_buffer: Option<BufferHandle>,
    color_buffer: Option<BufferHandle>,
    tex_coord_buffer: Option<BufferHandle>,
    index_buffer: Option<BufferHandle>,

    draw_as_points: bool,
    is_set_up: bool,
    is_disposed: bool,
}

impl GpuMesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from welded geometry, consuming it
    ///
    /// Unique vertices are copied into the flat attribute arrays in insertion
    /// order. An attribute array only receives values for vertices that carry
    /// a real (non-sentinel) value, so geometry without normals produces a
    /// mesh without a normal array.
    pub fn from_geometry(geometry: GeometryBuilder) -> Self {
        let mut mesh = Self::new();

        for unit in geometry.vertices() {
            mesh.positions.push(unit.position);
            if unit.has_normal() {
                mesh.normals.push(unit.normal);
            }
            if unit.has_tex_coord() {
                mesh.tex_coords.push(unit.tex_coord);
            }
            if unit.has_color() {
                mesh.colors.push(unit.color);
            }
        }
        mesh.indices.extend_from_slice(geometry.indices());

        mesh
    }

    /// Append a vertex position
    ///
    /// Has no effect on the GPU copy once the mesh is set up.
    pub fn add_vertex(&mut self, position: [f32; 3]) {
        self.positions.push(position);
    }

    /// Append a vertex normal
    pub fn add_normal(&mut self, normal: [f32; 3]) {
        self.normals.push(normal);
    }

    /// Append a vertex color
    pub fn add_color(&mut self, color: [f32; 4]) {
        self.colors.push(color);
    }

    /// Append a texture coordinate
    pub fn add_tex_coord(&mut self, tex_coord: [f32; 2]) {
        self.tex_coords.push(tex_coord);
    }

    /// Append one index
    pub fn add_index(&mut self, index: u32) {
        self.indices.push(index);
    }

    /// Append a batch of indices
    pub fn add_indices(&mut self, indices: &[u32]) {
        self.indices.extend_from_slice(indices);
    }

    /// Vertex positions
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Vertex normals
    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    /// Vertex colors
    pub fn colors(&self) -> &[[f32; 4]] {
        &self.colors
    }

    /// Texture coordinates
    pub fn tex_coords(&self) -> &[[f32; 2]] {
        &self.tex_coords
    }

    /// Index list
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Whether `set_up` has uploaded this mesh
    pub fn is_set_up(&self) -> bool {
        self.is_set_up
    }

    /// Whether this mesh draws points instead of triangles
    pub fn draws_as_points(&self) -> bool {
        self.draw_as_points
    }

    /// Flip between triangle and point rendering
    ///
    /// Affects every model sharing this mesh.
    pub fn toggle_points(&mut self) {
        self.draw_as_points = !self.draw_as_points;
    }

    fn primitive_mode(&self) -> PrimitiveMode {
        if self.draw_as_points {
            PrimitiveMode::Points
        } else {
            PrimitiveMode::Triangles
        }
    }

    /// Upload the attribute arrays to GPU buffers and freeze presence flags
    ///
    /// An attribute is present iff its array is non-empty at this moment;
    /// the flags are never recomputed afterwards.
    pub fn set_up(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), MeshError> {
        if self.is_disposed {
            return Err(MeshError::Disposed);
        }
        if self.is_set_up {
            return Err(MeshError::AlreadySetUp);
        }

        self.has_colors = !self.colors.is_empty();
        self.has_normals = !self.normals.is_empty();
        self.has_tex_coords = !self.tex_coords.is_empty();
        self.is_indexed = !self.indices.is_empty();

        let position_buffer = device.create_buffer();
        device.upload_array_buffer(position_buffer, bytemuck::cast_slice(&self.positions));
        self.position_buffer = Some(position_buffer);

        if self.has_colors {
            let color_buffer = device.create_buffer();
            device.upload_array_buffer(color_buffer, bytemuck::cast_slice(&self.colors));
            self.color_buffer = Some(color_buffer);
        }

        if self.has_normals {
            let normal_buffer = device.create_buffer();
            device.upload_array_buffer(normal_buffer, bytemuck::cast_slice(&self.normals));
            self.normal_buffer = Some(normal_buffer);
        }

        if self.has_tex_coords {
            let tex_coord_buffer = device.create_buffer();
            device.upload_array_buffer(tex_coord_buffer, bytemuck::cast_slice(&self.tex_coords));
            self.tex_coord_buffer = Some(tex_coord_buffer);
        }

        if self.is_indexed {
            let index_buffer = device.create_buffer();
            device.upload_index_buffer(index_buffer, bytemuck::cast_slice(&self.indices));
            self.index_buffer = Some(index_buffer);
        }

        self.is_set_up = true;
        log::debug!(
            "mesh uploaded: {} vertices, {} indices, normals={}, colors={}, tex_coords={}",
            self.positions.len(),
            self.indices.len(),
            self.has_normals,
            self.has_colors,
            self.has_tex_coords
        );

        Ok(())
    }

    /// Draw the mesh through the currently active shader program
    ///
    /// Binds the buffers, enables exactly the attribute slots for which data
    /// was uploaded, issues one indexed or non-indexed draw call, then
    /// disables the slots it enabled so no attribute state leaks into the
    /// next draw.
    pub fn draw(&self, device: &mut dyn GraphicsDevice) -> Result<(), MeshError> {
        if !self.is_set_up {
            return Err(MeshError::NotSetUp);
        }

        self.bind_buffers(device);

        let mut enabled = [AttributeSlot::Position; 4];
        let mut enabled_count = 0;
        for (slot, present) in [
            (AttributeSlot::Position, true),
            (AttributeSlot::Color, self.has_colors),
            (AttributeSlot::Normal, self.has_normals),
            (AttributeSlot::TexCoord, self.has_tex_coords),
        ] {
            if present {
                device.enable_attribute(slot);
                enabled[enabled_count] = slot;
                enabled_count += 1;
            }
        }

        if self.is_indexed {
            device.draw_indexed(self.primitive_mode(), self.indices.len() as u32);
        } else {
            device.draw_arrays(self.primitive_mode(), self.positions.len() as u32);
        }

        for &slot in &enabled[..enabled_count] {
            device.disable_attribute(slot);
        }

        Ok(())
    }

    fn bind_buffers(&self, device: &mut dyn GraphicsDevice) {
        if let Some(buffer) = self.position_buffer {
            device.bind_attribute_buffer(
                buffer,
                AttributeSlot::Position,
                AttributeSlot::Position.component_count(),
            );
        }
        if let Some(buffer) = self.color_buffer {
            device.bind_attribute_buffer(
                buffer,
                AttributeSlot::Color,
                AttributeSlot::Color.component_count(),
            );
        }
        if let Some(buffer) = self.normal_buffer {
            device.bind_attribute_buffer(
                buffer,
                AttributeSlot::Normal,
                AttributeSlot::Normal.component_count(),
            );
        }
        if let Some(buffer) = self.tex_coord_buffer {
            device.bind_attribute_buffer(
                buffer,
                AttributeSlot::TexCoord,
                AttributeSlot::TexCoord.component_count(),
            );
        }
        if let Some(buffer) = self.index_buffer {
            device.bind_index_buffer(buffer);
        }
    }

    /// Release the GPU buffers
    ///
    /// Terminal: subsequent draw or setup calls are usage errors.
    pub fn dispose(&mut self, device: &mut dyn GraphicsDevice) {
        for buffer in [
            self.position_buffer.take(),
            self.color_buffer.take(),
            self.normal_buffer.take(),
            self.tex_coord_buffer.take(),
            self.index_buffer.take(),
        ]
        .into_iter()
        .flatten()
        {
            device.delete_buffer(buffer);
        }

        self.is_set_up = false;
        self.is_disposed = true;
    }
}
