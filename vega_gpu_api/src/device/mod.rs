//! Device abstraction layer
//!
//! - **format**: total mapping tables from generic texel/vertex descriptors
//!   to native format triples, filters and wrap modes
//! - **layout**: vertex layout planning (stride/offset prefix sums) and
//!   buffer length validation
//! - **device**: the `RasterDevice` capability trait with opaque handles
//! - **mock_device**: test-only recording device (no GPU required)

mod device;
mod format;
mod layout;

#[cfg(test)]
pub mod mock_device;

pub use device::{
    BlendMode, ClearValues, CullMode, DepthBufferHandle, DeviceCapabilities, FramebufferHandle,
    MatrixDimensions, NativeTextureDesc, ProgramHandle, RasterDevice, TextureHandle,
    UniformArrayValues, UniformFormat, UniformLocation, UniformWrite, VectorDimensions,
    VertexArrayHandle,
};
pub use format::{
    map_mag_filter, map_min_filter, map_texel_format, map_vertex_element, map_wrap_mode,
    Dimensions, MagFilter, MinFilter, NativeChannelLayout, NativeDataType, NativeInternalFormat,
    NativeMagFilter, NativeMinFilter, NativeTexelFormat, NativeVertexElement, NativeWrapMode,
    TexelFormat, WrapMode,
};
pub use layout::{
    plan_layout, vertex_count_for, GeometryLayout, PlannedAttribute, VertexAttribute,
    VertexLayoutPlan,
};
