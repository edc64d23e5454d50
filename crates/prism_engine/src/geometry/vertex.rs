//! Per-corner vertex attribute tuple

use std::hash::{Hash, Hasher};

/// Immutable attribute tuple for one face corner
///
/// Holds the resolved position, normal, texture coordinate, and color of a
/// single corner. Attributes absent in the source data carry fixed sentinel
/// values so every record keeps the same shape; two keys are equal iff all
/// four fields match component-wise, sentinels included. A corner with no
/// normal is therefore only ever equal to another corner that also lacks a
/// normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexKey {
    /// Position in model space
    pub position: [f32; 3],
    /// Normal vector, or [`VertexKey::NO_NORMAL`]
    pub normal: [f32; 3],
    /// Texture coordinate, or [`VertexKey::NO_TEX_COORD`]
    pub tex_coord: [f32; 2],
    /// RGBA color, or [`VertexKey::NO_COLOR`]
    pub color: [f32; 4],
}

// Manual Eq and Hash over the float bit patterns so welding can use a hashed
// lookup. Safe for our use case as mesh data does not contain NaN values.
impl Eq for VertexKey {}

impl Hash for VertexKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for component in self.position {
            component.to_bits().hash(state);
        }
        for component in self.normal {
            component.to_bits().hash(state);
        }
        for component in self.tex_coord {
            component.to_bits().hash(state);
        }
        for component in self.color {
            component.to_bits().hash(state);
        }
    }
}

impl VertexKey {
    /// Sentinel standing in for a missing normal
    pub const NO_NORMAL: [f32; 3] = [0.0, 0.0, 0.0];

    /// Sentinel standing in for a missing texture coordinate
    pub const NO_TEX_COORD: [f32; 2] = [-1.0, -1.0];

    /// Sentinel standing in for a missing color
    pub const NO_COLOR: [f32; 4] = [-1.0, -1.0, -1.0, -1.0];

    /// Create a key carrying only a position
    pub fn new(position: [f32; 3]) -> Self {
        Self {
            position,
            normal: Self::NO_NORMAL,
            tex_coord: Self::NO_TEX_COORD,
            color: Self::NO_COLOR,
        }
    }

    /// Attach a normal
    pub fn with_normal(mut self, normal: [f32; 3]) -> Self {
        self.normal = normal;
        self
    }

    /// Attach a texture coordinate
    pub fn with_tex_coord(mut self, tex_coord: [f32; 2]) -> Self {
        self.tex_coord = tex_coord;
        self
    }

    /// Attach a color
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Whether this corner carries a real normal
    pub fn has_normal(&self) -> bool {
        self.normal != Self::NO_NORMAL
    }

    /// Whether this corner carries a real texture coordinate
    pub fn has_tex_coord(&self) -> bool {
        self.tex_coord != Self::NO_TEX_COORD
    }

    /// Whether this corner carries a real color
    pub fn has_color(&self) -> bool {
        self.color != Self::NO_COLOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_equal_only_with_identical_attributes() {
        let base = VertexKey::new([1.0, 2.0, 3.0]).with_normal([0.0, 1.0, 0.0]);

        assert_eq!(base, VertexKey::new([1.0, 2.0, 3.0]).with_normal([0.0, 1.0, 0.0]));
        assert_ne!(base, VertexKey::new([1.0, 2.0, 3.0]));
        assert_ne!(base, base.with_tex_coord([0.5, 0.5]));
    }

    #[test]
    fn test_missing_attribute_distinguishes_keys() {
        // A vertex with no normal is only equal to another vertex that also
        // lacks a normal
        let without = VertexKey::new([0.0, 0.0, 0.0]);
        let with = VertexKey::new([0.0, 0.0, 0.0]).with_normal([1.0, 0.0, 0.0]);

        assert_ne!(without, with);
        assert!(!without.has_normal());
        assert!(with.has_normal());
    }

    #[test]
    fn test_hash_matches_equality() {
        use std::collections::hash_map::DefaultHasher;

        let a = VertexKey::new([1.0, 0.0, 0.0]).with_tex_coord([0.25, 0.75]);
        let b = VertexKey::new([1.0, 0.0, 0.0]).with_tex_coord([0.25, 0.75]);

        let mut hasher_a = DefaultHasher::new();
        let mut hasher_b = DefaultHasher::new();
        a.hash(&mut hasher_a);
        b.hash(&mut hasher_b);

        assert_eq!(a, b);
        assert_eq!(hasher_a.finish(), hasher_b.finish());
    }
}
