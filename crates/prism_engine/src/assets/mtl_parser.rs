//! MTL (Material Template Library) file parser
//!
//! Parses Wavefront .mtl files into structured records for material
//! creation. Supports the standard Phong lighting properties and the diffuse
//! texture map.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::assets::ParseError;
use crate::foundation::math::Vec3;

/// Parsed MTL material record (Wavefront Phong model)
#[derive(Debug, Clone, PartialEq)]
pub struct MtlData {
    /// Material name
    pub name: String,
    /// Ambient reflection coefficient (Ka)
    pub ambient: Vec3,
    /// Diffuse reflection coefficient (Kd)
    pub diffuse: Vec3,
    /// Specular reflection coefficient (Ks)
    pub specular: Vec3,
    /// Specular exponent (Ns)
    pub shininess: f32,
    /// Opacity (d); 1.0 = opaque
    pub alpha: f32,
    /// Diffuse texture map path (map_Kd), relative to the MTL file
    pub diffuse_map: Option<String>,
}

impl Default for MtlData {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: Vec3::new(0.0, 0.0, 0.0),
            diffuse: Vec3::new(1.0, 1.0, 1.0),
            specular: Vec3::new(0.4, 0.4, 0.4),
            shininess: 1.0,
            alpha: 1.0,
            diffuse_map: None,
        }
    }
}

/// MTL file parser
pub struct MtlParser;

impl MtlParser {
    /// Load and parse an MTL file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<HashMap<String, MtlData>, ParseError> {
        let source = fs::read_to_string(path)?;
        Self::parse(&source)
    }

    /// Parse MTL file contents into a map of material name -> record
    pub fn parse(contents: &str) -> Result<HashMap<String, MtlData>, ParseError> {
        let mut materials = HashMap::new();
        let mut current: Option<MtlData> = None;

        for (line_index, raw_line) in contents.lines().enumerate() {
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
                "newmtl" => {
                    if let Some(material) = current.take() {
                        materials.insert(material.name.clone(), material);
                    }

                    let name = tokens.next().ok_or_else(|| ParseError::Malformed {
                        line: line_number,
                        message: "newmtl missing material name".to_owned(),
                    })?;
                    current = Some(MtlData {
                        name: name.to_owned(),
                        ..MtlData::default()
                    });
                }
                "Ka" => {
                    if let Some(ref mut material) = current {
                        material.ambient = parse_vec3(&mut tokens, line_number, "Ka")?;
                    }
                }
                "Kd" => {
                    if let Some(ref mut material) = current {
                        material.diffuse = parse_vec3(&mut tokens, line_number, "Kd")?;
                    }
                }
                "Ks" => {
                    if let Some(ref mut material) = current {
                        material.specular = parse_vec3(&mut tokens, line_number, "Ks")?;
                    }
                }
                "Ns" => {
                    if let Some(ref mut material) = current {
                        material.shininess = parse_scalar(&mut tokens, line_number, "Ns")?;
                    }
                }
                "d" => {
                    if let Some(ref mut material) = current {
                        // The value is the last token so an optional -halo
                        // flag is skipped over
                        let token = tokens.last().ok_or_else(|| ParseError::Malformed {
                            line: line_number,
                            message: "d record missing value".to_owned(),
                        })?;
                        material.alpha = token.parse().map_err(|_| ParseError::Malformed {
                            line: line_number,
                            message: format!("invalid d value \"{token}\""),
                        })?;
                    }
                }
                "map_Kd" => {
                    if let Some(ref mut material) = current {
                        let token = tokens.last().ok_or_else(|| ParseError::Malformed {
                            line: line_number,
                            message: "map_Kd record missing path".to_owned(),
                        })?;
                        material.diffuse_map = Some(token.to_owned());
                    }
                }
                // Other statements (illum, map_Ks, ...) are ignored
                _ => {}
            }
        }

        if let Some(material) = current.take() {
            materials.insert(material.name.clone(), material);
        }

        log::debug!("parsed {} material record(s)", materials.len());
        Ok(materials)
    }
}

/// Parse exactly three float tokens of a reflection coefficient record
fn parse_vec3(
    tokens: &mut std::str::SplitWhitespace<'_>,
    line: usize,
    record: &str,
) -> Result<Vec3, ParseError> {
    let mut components = [0.0f32; 3];
    for (i, component) in components.iter_mut().enumerate() {
        let token = tokens.next().ok_or_else(|| ParseError::Malformed {
            line,
            message: format!("wrong number of parameters for {record}: expected 3, found {i}"),
        })?;
        *component = token.parse().map_err(|_| ParseError::Malformed {
            line,
            message: format!("invalid {record} component \"{token}\""),
        })?;
    }
    if tokens.next().is_some() {
        return Err(ParseError::Malformed {
            line,
            message: format!("wrong number of parameters for {record}: expected 3"),
        });
    }
    Ok(Vec3::new(components[0], components[1], components[2]))
}

/// Parse a single float token
fn parse_scalar(
    tokens: &mut std::str::SplitWhitespace<'_>,
    line: usize,
    record: &str,
) -> Result<f32, ParseError> {
    let token = tokens.next().ok_or_else(|| ParseError::Malformed {
        line,
        message: format!("{record} record missing value"),
    })?;
    token.parse().map_err(|_| ParseError::Malformed {
        line,
        message: format!("invalid {record} value \"{token}\""),
    })
}
