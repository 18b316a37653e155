//! Face-file mesh parser
//!
//! Line-oriented text format: `v x y z` positions, `vt u v` texture
//! coordinates, `vn x y z` normals, and `f` faces referencing them with
//! 1-based indices. Two reference grammars are accepted, `pos/uv/normal`
//! and `pos//normal`; in the latter the uv is synthesized from the
//! normal's xy. Faces with more than three references are fan-triangulated
//! around the first reference.
//!
//! Line prefixes are checked in `vt`, `vn`, `v`, `f` order so the
//! two-letter prefixes are not shadowed by `v`. Unknown lines (comments,
//! smoothing groups) are skipped.

use glam::{Vec2, Vec3};

use crate::engine_bail;
use crate::error::Result;
use crate::mesh::intermediate::{MeshIntermediate, MeshVertex};

const LOG_SOURCE: &str = "vega::FaceFile";

/// Parsed face file: an object name, a material name and triangle data
pub struct FaceFileData {
    pub name: String,
    pub material_name: String,
    pub intermediate: MeshIntermediate,
}

struct VertexRef {
    position: usize,
    uv: Option<usize>,
    normal: usize,
}

fn parse_floats<const N: usize>(line: &str) -> [f32; N] {
    // Missing or malformed components default to zero
    let mut values = [0f32; N];
    for (slot, token) in values.iter_mut().zip(line.split_whitespace().skip(1)) {
        *slot = token.parse().unwrap_or(0.0);
    }
    values
}

fn parse_index(token: &str, available: usize, kind: &str) -> Result<usize> {
    let value: usize = match token.parse() {
        Ok(value) if value >= 1 => value,
        _ => engine_bail!(LOG_SOURCE, Validation, "invalid {} index '{}'", kind, token),
    };
    if value > available {
        engine_bail!(
            LOG_SOURCE,
            Validation,
            "face references {} {} but only {} are defined",
            kind,
            value,
            available
        );
    }
    Ok(value - 1)
}

fn parse_vertex_ref(
    token: &str,
    positions: usize,
    uvs: usize,
    normals: usize,
) -> Result<VertexRef> {
    if let Some((position, normal)) = token.split_once("//") {
        return Ok(VertexRef {
            position: parse_index(position, positions, "position")?,
            uv: None,
            normal: parse_index(normal, normals, "normal")?,
        });
    }

    let mut parts = token.split('/');
    let (Some(position), Some(uv), Some(normal), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        engine_bail!(LOG_SOURCE, Validation, "malformed face reference '{}'", token);
    };
    Ok(VertexRef {
        position: parse_index(position, positions, "position")?,
        uv: Some(parse_index(uv, uvs, "uv")?),
        normal: parse_index(normal, normals, "normal")?,
    })
}

/// Parse face-file text into triangle data
pub fn parse_face_file(contents: &str) -> Result<FaceFileData> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut uvs: Vec<Vec2> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut vertices: Vec<MeshVertex> = Vec::new();
    let mut name: Option<String> = None;
    let mut material_name: Option<String> = None;

    for raw_line in contents.lines() {
        let line = raw_line.trim();

        if line.starts_with("vt") {
            let [u, v] = parse_floats::<2>(line);
            uvs.push(Vec2::new(u, v));
        } else if line.starts_with("vn") {
            let [x, y, z] = parse_floats::<3>(line);
            normals.push(Vec3::new(x, y, z));
        } else if line.starts_with('v') {
            let [x, y, z] = parse_floats::<3>(line);
            positions.push(Vec3::new(x, y, z));
        } else if line.starts_with('f') {
            let refs: Vec<VertexRef> = line
                .split_whitespace()
                .skip(1)
                .map(|token| {
                    parse_vertex_ref(token, positions.len(), uvs.len(), normals.len())
                })
                .collect::<Result<_>>()?;
            if refs.len() < 3 {
                engine_bail!(
                    LOG_SOURCE,
                    Validation,
                    "face has {} vertex references, at least 3 required",
                    refs.len()
                );
            }

            // Fan triangulation around the first reference
            for i in 1..refs.len() - 1 {
                for vertex_ref in [&refs[0], &refs[i], &refs[i + 1]] {
                    let normal = normals[vertex_ref.normal];
                    let uv = match vertex_ref.uv {
                        Some(index) => uvs[index],
                        // pos//normal grammar: synthesize uv from the normal
                        None => Vec2::new(normal.x, normal.y),
                    };
                    vertices.push(MeshVertex::new(positions[vertex_ref.position], uv, normal));
                }
            }
        } else if let Some(rest) = line.strip_prefix("o ").or_else(|| line.strip_prefix("g ")) {
            name = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("usemtl ") {
            material_name = Some(rest.trim().to_string());
        }
    }

    Ok(FaceFileData {
        name: name.unwrap_or_else(|| "No name".to_string()),
        material_name: material_name.unwrap_or_else(|| "None".to_string()),
        intermediate: MeshIntermediate::new(vertices)?,
    })
}

#[cfg(test)]
#[path = "face_file_tests.rs"]
mod tests;
