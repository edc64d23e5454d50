//! Surface material properties
//!
//! Phong-style reflection coefficients plus an optional diffuse texture,
//! consumed by [`crate::render::Model`] at draw time and pushed to the GPU
//! through [`crate::render::ShaderProgram`]'s material uniforms.

use crate::assets::MtlData;
use crate::foundation::math::Vec3;
use crate::render::Texture;

/// Material value with Phong reflection coefficients
#[derive(Debug, Clone)]
pub struct Material {
    /// Material name (MTL files reference materials by this)
    pub name: String,
    /// Ambient reflection coefficient
    pub ambient: Vec3,
    /// Diffuse reflection coefficient
    pub diffuse: Vec3,
    /// Specular reflection coefficient
    pub specular: Vec3,
    /// Specular exponent; the greater, the more polished the surface looks
    pub shininess: f32,
    /// Opacity, 1.0 = opaque
    pub alpha: f32,
    /// Optional diffuse texture
    pub texture: Option<Texture>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: Vec3::new(0.0, 0.0, 0.0),
            diffuse: Vec3::new(1.0, 1.0, 1.0),
            specular: Vec3::new(0.4, 0.4, 0.4),
            shininess: 1.0,
            alpha: 1.0,
            texture: None,
        }
    }
}

impl Material {
    /// Build a material from a parsed MTL record
    ///
    /// Texture resolution is left to the caller: the record only carries the
    /// map path, and decoding plus GPU upload need a device.
    pub fn from_mtl(data: &MtlData, texture: Option<Texture>) -> Self {
        Self {
            name: data.name.clone(),
            ambient: data.ambient,
            diffuse: data.diffuse,
            specular: data.specular,
            shininess: data.shininess,
            alpha: data.alpha,
            texture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_material_is_matte_white() {
        let material = Material::default();

        assert_eq!(material.ambient, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(material.diffuse, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(material.alpha, 1.0);
        assert!(material.texture.is_none());
    }

    #[test]
    fn test_from_mtl_copies_every_coefficient() {
        let data = MtlData {
            name: "brushed_steel".to_owned(),
            ambient: Vec3::new(0.1, 0.1, 0.1),
            diffuse: Vec3::new(0.6, 0.6, 0.7),
            specular: Vec3::new(0.9, 0.9, 0.9),
            shininess: 96.0,
            alpha: 0.8,
            diffuse_map: None,
        };

        let material = Material::from_mtl(&data, None);

        assert_eq!(material.name, "brushed_steel");
        assert_eq!(material.specular, Vec3::new(0.9, 0.9, 0.9));
        assert_eq!(material.shininess, 96.0);
        assert_eq!(material.alpha, 0.8);
    }
}
