//! # Prism Engine
//!
//! A minimal real-time 3D rendering toolkit. Raw geometric data (vertex
//! positions, normals, texture coordinates, colors, and faces) becomes
//! GPU-resident drawable objects, and a camera plus shader-uniform pipeline
//! projects those objects onto the screen each frame.
//!
//! ## Pipeline
//!
//! 1. A face stream (e.g. an OBJ file) feeds [`geometry::GeometryBuilder`],
//!    which welds identical corners into a compact indexed vertex list.
//! 2. [`render::GpuMesh`] uploads the welded attribute arrays to GPU buffers
//!    and issues draw calls through fixed attribute slots.
//! 3. [`render::Model`] places a shared mesh in the world;
//!    [`render::Camera`] derives the view matrix; [`render::ShaderProgram`]
//!    pushes the composed transformation to the GPU.
//!
//! The GPU itself sits behind the [`device::GraphicsDevice`] trait; any
//! binding exposing its primitives works, and the bundled
//! [`device::RecordingDevice`] runs the whole pipeline headless.
//!
//! ## Quick Start
//!
//! ```rust
//! use prism_engine::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut device = RecordingDevice::new();
//!
//! let geometry = ObjLoader::parse_str(
//!     "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
//!     true,
//! )?;
//! let mut mesh = GpuMesh::from_geometry(geometry);
//! mesh.set_up(&mut device)?;
//!
//! let model = Model::new(mesh);
//! let camera = Camera::new(
//!     Vec3::new(0.0, 0.0, 5.0),
//!     Vec3::zeros(),
//!     Vec3::y(),
//! )?;
//! let ctx = RenderContext::new(camera, Viewport { width: 1280.0, height: 720.0 });
//!
//! let mut shader = ShaderProgram::new(&mut device);
//! shader.add_stage(&mut device, ShaderStageKind::Vertex, "void main() {}")?;
//! shader.link(&mut device)?;
//!
//! ctx.apply(&mut device, &mut shader, &model.world_matrix());
//! shader.activate(&mut device);
//! model.draw(&mut device)?;
//! shader.deactivate(&mut device);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod device;
pub mod foundation;
pub mod geometry;
pub mod render;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{ImageData, MtlParser, ObjLoader, ParseError},
        config::{CameraConfig, Config, EngineConfig, RendererConfig},
        device::{
            AttributeSlot, GraphicsDevice, PrimitiveMode, RecordingDevice, ShaderStageKind,
        },
        foundation::{
            math::{DegenerateTransform, Mat4, Mat4Ext, Quat, Vec2, Vec3, Vec4},
            time::Timer,
        },
        geometry::{GeometryBuilder, VertexKey},
        render::{
            Camera, GpuMesh, Material, MeshError, Model, RenderContext, ShaderError,
            ShaderProgram, Texture, UniformRole, Viewport,
        },
    };
}
