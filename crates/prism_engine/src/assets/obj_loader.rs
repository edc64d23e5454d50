//! OBJ file loader for 3D models
//!
//! Parses the Wavefront vertex-data and face records (`v`, `vn`, `vt`, `f`)
//! and feeds each face corner into a [`GeometryBuilder`], welding identical
//! corners into a compact indexed vertex list. Only triangular faces are
//! accepted.

use std::fs;
use std::path::Path;

use crate::assets::ParseError;
use crate::geometry::{GeometryBuilder, VertexKey};

/// Wavefront OBJ parser feeding the welding builder
pub struct ObjLoader;

impl ObjLoader {
    /// Load an OBJ file into welded geometry
    ///
    /// With `welding` disabled every corner becomes its own vertex, trading
    /// GPU memory for load speed on large models.
    pub fn load<P: AsRef<Path>>(path: P, welding: bool) -> Result<GeometryBuilder, ParseError> {
        let path = path.as_ref();
        log::debug!("loading OBJ model from {:?}", path);
        let source = fs::read_to_string(path)?;
        let geometry = Self::parse_str(&source, welding)?;
        log::info!(
            "loaded {:?}: {} unique vertices, {} indices",
            path,
            geometry.vertex_count(),
            geometry.index_count()
        );
        Ok(geometry)
    }

    /// Parse OBJ source text into welded geometry
    pub fn parse_str(source: &str, welding: bool) -> Result<GeometryBuilder, ParseError> {
        let mut positions: Vec<[f32; 3]> = Vec::new();
        let mut normals: Vec<[f32; 3]> = Vec::new();
        let mut tex_coords: Vec<[f32; 2]> = Vec::new();

        let mut geometry = if welding {
            GeometryBuilder::new()
        } else {
            GeometryBuilder::without_welding()
        };

        for (line_index, raw_line) in source.lines().enumerate() {
            let line_number = line_index + 1;
            let line = raw_line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let command = match tokens.next() {
                Some(command) => command,
                None => continue,
            };

            match command {
                "v" => {
                    positions.push(parse_floats::<3>(&mut tokens, line_number, "v")?);
                }
                "vn" => {
                    normals.push(parse_floats::<3>(&mut tokens, line_number, "vn")?);
                }
                "vt" => {
                    tex_coords.push(parse_floats::<2>(&mut tokens, line_number, "vt")?);
                }
                "f" => {
                    let corners: Vec<&str> = tokens.collect();
                    if corners.len() != 3 {
                        return Err(ParseError::NonTriangularFace {
                            line: line_number,
                            corners: corners.len(),
                        });
                    }

                    for corner in corners {
                        let key = resolve_corner(
                            corner,
                            line_number,
                            &positions,
                            &normals,
                            &tex_coords,
                        )?;
                        geometry.add_corner(key);
                    }
                }
                // Grouping, smoothing, and material statements are ignored
                _ => {}
            }
        }

        if geometry.is_empty() {
            return Err(ParseError::NoGeometry);
        }

        Ok(geometry)
    }
}

/// Parse a fixed number of float tokens from a record
fn parse_floats<const N: usize>(
    tokens: &mut std::str::SplitWhitespace<'_>,
    line: usize,
    record: &str,
) -> Result<[f32; N], ParseError> {
    let mut values = [0.0f32; N];
    for (i, value) in values.iter_mut().enumerate() {
        let token = tokens.next().ok_or_else(|| ParseError::Malformed {
            line,
            message: format!("{record} record needs {N} components, found {i}"),
        })?;
        *value = token.parse().map_err(|_| ParseError::Malformed {
            line,
            message: format!("invalid {record} component \"{token}\""),
        })?;
    }
    Ok(values)
}

/// Resolve one `p[/t[/n]]` face-corner reference against the attribute pools
fn resolve_corner(
    corner: &str,
    line: usize,
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
    tex_coords: &[[f32; 2]],
) -> Result<VertexKey, ParseError> {
    let mut parts = corner.split('/');

    let position_index = parse_index(parts.next().unwrap_or(""), line, "position")?;
    let position = *positions
        .get(position_index - 1)
        .ok_or(ParseError::IndexOutOfBounds {
            line,
            index: position_index,
            pool: "position",
        })?;
    let mut key = VertexKey::new(position);

    if let Some(token) = parts.next().filter(|token| !token.is_empty()) {
        let tex_index = parse_index(token, line, "texture coordinate")?;
        let tex_coord = *tex_coords
            .get(tex_index - 1)
            .ok_or(ParseError::IndexOutOfBounds {
                line,
                index: tex_index,
                pool: "texture coordinate",
            })?;
        key = key.with_tex_coord(tex_coord);
    }

    if let Some(token) = parts.next().filter(|token| !token.is_empty()) {
        let normal_index = parse_index(token, line, "normal")?;
        let normal = *normals
            .get(normal_index - 1)
            .ok_or(ParseError::IndexOutOfBounds {
                line,
                index: normal_index,
                pool: "normal",
            })?;
        key = key.with_normal(normal);
    }

    Ok(key)
}

/// Parse a 1-based attribute index
fn parse_index(token: &str, line: usize, pool: &str) -> Result<usize, ParseError> {
    let index: usize = token.parse().map_err(|_| ParseError::Malformed {
        line,
        message: format!("invalid {pool} index \"{token}\""),
    })?;
    if index == 0 {
        return Err(ParseError::Malformed {
            line,
            message: format!("{pool} indices are 1-based; 0 is not a valid reference"),
        });
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TRIANGLE_QUAD: &str = "\
# a unit quad split into two triangles
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
v 1.0 1.0 0.0
vn 0.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
vt 1.0 1.0
f 1/1/1 2/2/1 3/3/1
f 2/2/1 4/4/1 3/3/1
";

    #[test]
    fn test_quad_welds_shared_corners() {
        let geometry = ObjLoader::parse_str(TWO_TRIANGLE_QUAD, true).unwrap();

        // Corners 2/2/1 and 3/3/1 appear in both triangles
        assert_eq!(geometry.vertex_count(), 4);
        assert_eq!(geometry.indices(), &[0, 1, 2, 1, 3, 2]);
    }

    #[test]
    fn test_without_welding_duplicates_shared_corners() {
        let geometry = ObjLoader::parse_str(TWO_TRIANGLE_QUAD, false).unwrap();

        assert_eq!(geometry.vertex_count(), 6);
        assert_eq!(geometry.indices(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_position_only_corners_use_sentinels() {
        let source = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";
        let geometry = ObjLoader::parse_str(source, true).unwrap();

        assert_eq!(geometry.vertex_count(), 3);
        for vertex in geometry.vertices() {
            assert!(!vertex.has_normal());
            assert!(!vertex.has_tex_coord());
        }
    }

    #[test]
    fn test_position_and_normal_without_tex_coord() {
        let source = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
f 1//1 2//1 3//1
";
        let geometry = ObjLoader::parse_str(source, true).unwrap();

        for vertex in geometry.vertices() {
            assert!(vertex.has_normal());
            assert!(!vertex.has_tex_coord());
        }
    }

    #[test]
    fn test_quad_face_is_rejected() {
        let source = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
v 1.0 1.0 0.0
f 1 2 3 4
";
        let result = ObjLoader::parse_str(source, true);

        assert!(matches!(
            result,
            Err(ParseError::NonTriangularFace { line: 5, corners: 4 })
        ));
    }

    #[test]
    fn test_out_of_bounds_position_reference_is_rejected() {
        let source = "\
v 0.0 0.0 0.0
f 1 2 3
";
        let result = ObjLoader::parse_str(source, true);

        assert!(matches!(
            result,
            Err(ParseError::IndexOutOfBounds {
                index: 2,
                pool: "position",
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_vertex_component_is_rejected() {
        let source = "v 0.0 banana 0.0\n";
        let result = ObjLoader::parse_str(source, true);

        assert!(matches!(result, Err(ParseError::Malformed { line: 1, .. })));
    }

    #[test]
    fn test_empty_source_has_no_geometry() {
        let result = ObjLoader::parse_str("# just a comment\n", true);
        assert!(matches!(result, Err(ParseError::NoGeometry)));
    }
}
