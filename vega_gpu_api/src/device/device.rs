//! The `RasterDevice` capability trait
//!
//! Everything a backend must provide: native object creation and
//! destruction, uniform writes, framebuffer plumbing, render state and
//! pixel readback. Resources never touch a native API directly, they go
//! through this trait behind `Arc<Mutex<dyn RasterDevice>>`.
//!
//! All operations are synchronous on the calling thread. The device
//! context is not safely shareable across threads, so the trait carries
//! no `Send` bound; concurrency, if any, is the caller's problem.

use crate::device::format::{NativeMagFilter, NativeMinFilter, NativeTexelFormat, NativeWrapMode};
use crate::device::layout::VertexLayoutPlan;
use crate::error::Result;

// ============================================================================
// Opaque handles
// ============================================================================

/// Opaque vertex array handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayHandle(pub u64);

/// Opaque texture handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Opaque shader program handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u64);

/// Opaque framebuffer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferHandle(pub u64);

/// Opaque depth renderbuffer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthBufferHandle(pub u64);

/// Opaque uniform location handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u64);

// ============================================================================
// Capabilities and state
// ============================================================================

/// Limits and feature bits reported by a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// Rendering to floating point color targets is supported
    pub float_color_targets: bool,
    pub max_color_attachments: u32,
    pub max_texture_units: u32,
    pub max_vertex_uniform_vectors: u32,
}

/// Global blending state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    None,
    Add,
}

/// Global face culling state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// Which buffers to clear, and with what
///
/// Both fields absent is legal and clears nothing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClearValues {
    pub color: Option<[f32; 4]>,
    pub depth: Option<f32>,
}

// ============================================================================
// Uniform writes
// ============================================================================

/// Numeric format of a uniform as declared in the shader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformFormat {
    Int,
    Uint,
    Float,
}

/// Vector uniform width (vec2/vec3/vec4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorDimensions {
    Two,
    Three,
    Four,
}

impl VectorDimensions {
    pub fn count(self) -> usize {
        match self {
            VectorDimensions::Two => 2,
            VectorDimensions::Three => 3,
            VectorDimensions::Four => 4,
        }
    }
}

/// Square matrix uniform order (mat2/mat3/mat4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixDimensions {
    Two,
    Three,
    Four,
}

impl MatrixDimensions {
    pub fn order(self) -> usize {
        match self {
            MatrixDimensions::Two => 2,
            MatrixDimensions::Three => 3,
            MatrixDimensions::Four => 4,
        }
    }

    /// Elements in one matrix (order squared)
    pub fn element_count(self) -> usize {
        let order = self.order();
        order * order
    }
}

/// Typed value slice for array uniforms
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformArrayValues<'a> {
    Float(&'a [f32]),
    Int(&'a [i32]),
    Uint(&'a [u32]),
}

impl UniformArrayValues<'_> {
    pub fn len(&self) -> usize {
        match self {
            UniformArrayValues::Float(values) => values.len(),
            UniformArrayValues::Int(values) => values.len(),
            UniformArrayValues::Uint(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric format the slice variant corresponds to
    pub fn format(&self) -> UniformFormat {
        match self {
            UniformArrayValues::Float(_) => UniformFormat::Float,
            UniformArrayValues::Int(_) => UniformFormat::Int,
            UniformArrayValues::Uint(_) => UniformFormat::Uint,
        }
    }
}

/// One validated uniform write, ready for the backend
///
/// Scalars and vectors arrive as `f64` and are cast to the declared
/// format by the backend. Array values are already typed. Matrices are
/// always float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformWrite<'a> {
    Scalar {
        format: UniformFormat,
        value: f64,
    },
    Vector {
        format: UniformFormat,
        dimensions: VectorDimensions,
        /// Only the first `dimensions.count()` entries are meaningful
        value: [f64; 4],
    },
    Matrix {
        dimensions: MatrixDimensions,
        transpose: bool,
        values: &'a [f32],
    },
    ScalarArray {
        values: UniformArrayValues<'a>,
    },
    VectorArray {
        dimensions: VectorDimensions,
        values: UniformArrayValues<'a>,
    },
    MatrixArray {
        dimensions: MatrixDimensions,
        transpose: bool,
        values: &'a [f32],
    },
    SamplerUnit {
        unit: u32,
    },
}

// ============================================================================
// Texture creation
// ============================================================================

/// Fully resolved native texture description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeTextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: NativeTexelFormat,
    pub min_filter: NativeMinFilter,
    pub mag_filter: NativeMagFilter,
    pub wrap_x: NativeWrapMode,
    pub wrap_y: NativeWrapMode,
    pub mipmap: bool,
}

// ============================================================================
// The device trait
// ============================================================================

/// Capability set every backend implements
pub trait RasterDevice {
    fn capabilities(&self) -> DeviceCapabilities;

    // ===== Geometry =====

    /// Upload an interleaved vertex buffer and describe its attributes
    fn create_vertex_array(
        &mut self,
        plan: &VertexLayoutPlan,
        data: &[u8],
    ) -> Result<VertexArrayHandle>;

    fn draw_triangles(&mut self, vertex_array: VertexArrayHandle, vertex_count: u32) -> Result<()>;

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    // ===== Textures =====

    /// Create a 2D texture, optionally uploading initial texel data
    fn create_texture_2d(
        &mut self,
        desc: &NativeTextureDesc,
        data: Option<&[u8]>,
    ) -> Result<TextureHandle>;

    fn destroy_texture(&mut self, texture: TextureHandle);

    // ===== Shader programs =====

    /// Compile and link; the error carries the backend diagnostic verbatim
    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle>;

    /// `None` when the uniform was optimized away or misspelled
    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    fn use_program(&mut self, program: ProgramHandle) -> Result<()>;

    fn write_uniform(&mut self, location: UniformLocation, write: &UniformWrite<'_>) -> Result<()>;

    fn bind_texture_unit(&mut self, unit: u32, texture: TextureHandle) -> Result<()>;

    fn destroy_program(&mut self, program: ProgramHandle);

    // ===== Framebuffers =====

    fn create_framebuffer(&mut self) -> Result<FramebufferHandle>;

    /// Allocate a depth renderbuffer (32-bit float depth)
    fn create_depth_buffer(&mut self, width: u32, height: u32) -> Result<DepthBufferHandle>;

    fn attach_depth_buffer(
        &mut self,
        framebuffer: FramebufferHandle,
        depth_buffer: DepthBufferHandle,
    ) -> Result<()>;

    fn destroy_depth_buffer(&mut self, depth_buffer: DepthBufferHandle);

    fn attach_color_texture(
        &mut self,
        framebuffer: FramebufferHandle,
        slot: u32,
        texture: TextureHandle,
    ) -> Result<()>;

    /// Route fragment outputs 0..count to color attachments 0..count
    fn set_draw_buffers(&mut self, framebuffer: FramebufferHandle, count: u32) -> Result<()>;

    fn framebuffer_complete(&mut self, framebuffer: FramebufferHandle) -> bool;

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle);

    // ===== Render state =====

    /// `None` binds the default framebuffer
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>);

    fn set_viewport(&mut self, width: u32, height: u32);

    fn set_depth_test(&mut self, enabled: bool);

    fn set_blend_mode(&mut self, mode: BlendMode);

    fn set_cull_mode(&mut self, mode: CullMode);

    fn clear(&mut self, values: &ClearValues);

    // ===== Readback =====

    /// Read back a rectangle from one color attachment of a framebuffer
    #[allow(clippy::too_many_arguments)]
    fn read_pixels(
        &mut self,
        framebuffer: FramebufferHandle,
        slot: u32,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        format: &NativeTexelFormat,
        destination: &mut [u8],
        destination_offset: usize,
    ) -> Result<()>;
}
