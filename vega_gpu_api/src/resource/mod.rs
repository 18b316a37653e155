//! Typed GPU resources
//!
//! Each resource owns exactly one native handle for its lifetime: no
//! pooling, no aliasing. `free()` is idempotent and `Drop` releases the
//! handle if the caller never freed explicitly.

mod framebuffer;
mod geometry;
mod shader;
mod texture;

pub use framebuffer::{DefaultFramebuffer, OffscreenFramebuffer};
pub use geometry::Geometry;
pub use shader::{
    MatrixArrayBind, MatrixBind, MatrixUniform, SamplerBind, SamplerUniform, ScalarArrayBind,
    ScalarBind, ScalarUniform, ShaderProgram, UniformBinds, UniformsLayout, VectorArrayBind,
    VectorBind, VectorUniform,
};
pub use texture::{DecodedImage, LoadTextureParameters, Texture2D, TextureParameters};
