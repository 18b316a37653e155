//! Intermediate mesh representation
//!
//! A flat triangle list of full-fat vertices (position, uv, normal,
//! tangent). Tangents are derived per triangle from the uv parameterization
//! and orthogonalized against the vertex normal, with handedness taken
//! from the raw tangent frame before orthogonalization. Degenerate uv
//! triangles produce non-finite tangents; callers own their uv quality.

use glam::{Vec2, Vec3, Vec4};

use crate::device::{Dimensions, GeometryLayout, TexelFormat, VertexAttribute};
use crate::engine_bail;
use crate::error::Result;

const LOG_SOURCE: &str = "vega::MeshIntermediate";

/// One vertex of a triangle-list mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub position: Vec3,
    pub uv: Vec2,
    pub normal: Vec3,
    /// xyz tangent plus handedness sign in w
    pub tangent: Vec4,
}

impl MeshVertex {
    pub fn new(position: Vec3, uv: Vec2, normal: Vec3) -> Self {
        Self {
            position,
            uv,
            normal,
            tangent: Vec4::ZERO,
        }
    }
}

/// Triangle-list mesh data, always whole triangles
pub struct MeshIntermediate {
    pub vertices: Vec<MeshVertex>,
}

impl MeshIntermediate {
    /// Build from a vertex list and derive tangents
    pub fn new(vertices: Vec<MeshVertex>) -> Result<Self> {
        if vertices.len() % 3 != 0 {
            engine_bail!(
                LOG_SOURCE,
                Validation,
                "{} vertices do not form whole triangles",
                vertices.len()
            );
        }
        let mut mesh = Self { vertices };
        mesh.recalculate_tangents();
        Ok(mesh)
    }

    /// Derive per-vertex tangents from positions and uvs
    ///
    /// Classic Lengyel derivation: invert the 2x2 uv edge matrix per
    /// triangle, accumulate raw tangent/bitangent directions, then per
    /// vertex compute handedness from the raw frame and Gram-Schmidt the
    /// tangent against the normal. The final tangent is negated after
    /// normalization.
    pub fn recalculate_tangents(&mut self) {
        let count = self.vertices.len();
        let mut tangents = Vec::with_capacity(count);
        let mut bitangents = Vec::with_capacity(count);

        for triangle in self.vertices.chunks_exact(3) {
            let [v1, v2, v3] = [triangle[0], triangle[1], triangle[2]];
            let edge1 = v2.position - v1.position;
            let edge2 = v3.position - v1.position;

            let s1 = v2.uv.x - v1.uv.x;
            let s2 = v3.uv.x - v1.uv.x;
            let t1 = v2.uv.y - v1.uv.y;
            let t2 = v3.uv.y - v1.uv.y;

            let r = 1.0 / (s1 * t2 - s2 * t1);
            let tangent = (edge1 * t2 - edge2 * t1) * r;
            let bitangent = (edge2 * s1 - edge1 * s2) * r;

            for _ in 0..3 {
                tangents.push(tangent);
                bitangents.push(bitangent);
            }
        }

        for (index, vertex) in self.vertices.iter_mut().enumerate() {
            let normal = vertex.normal;
            let raw_tangent = tangents[index];

            // Handedness comes from the raw frame, before orthogonalization
            let handedness = if normal.cross(raw_tangent).dot(bitangents[index]) < 0.0 {
                -1.0
            } else {
                1.0
            };

            let orthogonal =
                -((raw_tangent - normal * normal.dot(raw_tangent)).normalize());
            vertex.tangent = orthogonal.extend(handedness);
        }
    }

    /// Replace vertex normals with per-face normals, then re-derive tangents
    pub fn recalculate_normals_flat(&mut self) {
        for triangle in self.vertices.chunks_exact_mut(3) {
            let edge1 = triangle[1].position - triangle[0].position;
            let edge2 = triangle[2].position - triangle[0].position;
            let normal = edge1.cross(edge2).normalize();
            for vertex in triangle {
                vertex.normal = normal;
            }
        }
        self.recalculate_tangents();
    }

    /// Triangle count
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Interleave into bytes with the matching layout:
    /// pos3 uv2 normal3 tangent4, all float32
    pub fn to_vertex_data(&self) -> (Vec<u8>, GeometryLayout) {
        let mut floats = Vec::with_capacity(self.vertices.len() * 12);
        for vertex in &self.vertices {
            floats.extend_from_slice(&vertex.position.to_array());
            floats.extend_from_slice(&vertex.uv.to_array());
            floats.extend_from_slice(&vertex.normal.to_array());
            floats.extend_from_slice(&vertex.tangent.to_array());
        }
        let data = bytemuck::cast_slice(&floats).to_vec();

        let float3 = VertexAttribute {
            format: TexelFormat::Float32,
            dimensions: Dimensions::Three,
            normalize: false,
        };
        let layout = GeometryLayout {
            attributes: vec![
                float3,
                VertexAttribute {
                    format: TexelFormat::Float32,
                    dimensions: Dimensions::Two,
                    normalize: false,
                },
                float3,
                VertexAttribute {
                    format: TexelFormat::Float32,
                    dimensions: Dimensions::Four,
                    normalize: false,
                },
            ],
        };
        (data, layout)
    }
}

#[cfg(test)]
#[path = "intermediate_tests.rs"]
mod tests;
