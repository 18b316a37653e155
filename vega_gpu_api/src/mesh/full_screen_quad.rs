//! Full-screen quad for post-process passes
//!
//! Two clip-space triangles covering the viewport, interleaved as
//! pos2/uv2 float32. Drawn without any camera transform.

use crate::device::{Dimensions, GeometryLayout, TexelFormat, VertexAttribute};

#[rustfmt::skip]
const QUAD_FLOATS: [f32; 24] = [
    // pos.x  pos.y   u    v
    -1.0, -1.0,  0.0, 0.0,
     1.0, -1.0,  1.0, 0.0,
    -1.0,  1.0,  0.0, 1.0,

    -1.0,  1.0,  0.0, 1.0,
     1.0, -1.0,  1.0, 0.0,
     1.0,  1.0,  1.0, 1.0,
];

/// Vertex bytes and layout for the canonical full-screen quad
pub fn full_screen_quad_data() -> (Vec<u8>, GeometryLayout) {
    let float2 = VertexAttribute {
        format: TexelFormat::Float32,
        dimensions: Dimensions::Two,
        normalize: false,
    };
    let layout = GeometryLayout {
        attributes: vec![float2, float2],
    };
    (bytemuck::cast_slice(&QUAD_FLOATS).to_vec(), layout)
}
