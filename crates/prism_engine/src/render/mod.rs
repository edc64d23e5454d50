//! Rendering types
//!
//! The drawable side of the toolkit: GPU meshes, placed models, the camera,
//! shader programs, materials, textures, and the per-frame render context
//! that ties them together.

mod camera;
mod context;
mod material;
mod mesh;
mod model;
mod shader;
mod texture;

pub use camera::Camera;
pub use context::{RenderContext, Viewport};
pub use material::Material;
pub use mesh::{GpuMesh, MeshError};
pub use model::Model;
pub use shader::{AttributeBindings, ShaderError, ShaderProgram, UniformBindings, UniformRole};
pub use texture::Texture;
