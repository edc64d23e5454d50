//! Geometry construction
//!
//! Turns a stream of raw face corners into a compact indexed vertex list.
//! [`VertexKey`] is the per-corner attribute tuple, [`GeometryBuilder`] welds
//! identical corners together so an indexed draw call can reuse GPU-resident
//! vertex data instead of repeating it per face corner.

mod builder;
mod vertex;

pub use builder::GeometryBuilder;
pub use vertex::VertexKey;
