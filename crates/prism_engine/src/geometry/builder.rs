//! Indexed geometry accumulation with vertex welding

use std::collections::HashMap;

use crate::geometry::VertexKey;

/// Accumulates unique vertices and a compact index list from a face stream
///
/// Fed one corner at a time while a face stream is parsed. In welding mode a
/// corner whose attribute tuple was already seen reuses the existing vertex
/// index; only genuinely new tuples grow the vertex list. Insertion order is
/// first-seen order, and the index list order defines triangle winding.
///
/// The uniqueness scan uses a hashed key lookup, which has externally
/// identical behavior to a linear scan of the vertex list but welds in
/// amortized constant time.
///
/// Non-welding mode skips the lookup entirely and appends one vertex per
/// corner with a counting index. It trades GPU memory for load speed on
/// large geometry where vertex reuse is not worth the bookkeeping.
#[derive(Debug, Clone)]
pub struct GeometryBuilder {
    vertices: Vec<VertexKey>,
    indices: Vec<u32>,
    welding: bool,
    index_of: HashMap<VertexKey, u32>,
}

impl Default for GeometryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryBuilder {
    /// Create a builder that welds identical corners
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            welding: true,
            index_of: HashMap::new(),
        }
    }

    /// Create a builder that appends every corner as a new vertex
    pub fn without_welding() -> Self {
        Self {
            welding: false,
            ..Self::new()
        }
    }

    /// Add one face corner
    ///
    /// Appends exactly one index per call; appends a vertex only when the key
    /// was not seen before (always, in non-welding mode).
    pub fn add_corner(&mut self, key: VertexKey) {
        if self.welding {
            if let Some(&index) = self.index_of.get(&key) {
                self.indices.push(index);
                return;
            }
        }

        let index = self.vertices.len() as u32;
        if self.welding {
            self.index_of.insert(key, index);
        }
        self.vertices.push(key);
        self.indices.push(index);
    }

    /// Unique vertices in first-seen order
    pub fn vertices(&self) -> &[VertexKey] {
        &self.vertices
    }

    /// One index per corner processed, in face order
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of unique vertices accumulated
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of corners processed
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Whether no geometry has been added
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}
