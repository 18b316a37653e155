//! Format mapping tables
//!
//! Maps generic texel formats, channel counts, filters and wrap modes to
//! their native (GL-style) counterparts. All mappings are total over their
//! enum domains, and the texel format table is injective: no two generic
//! (dimensions, format) pairs share a native internal format.

// ============================================================================
// Generic descriptors
// ============================================================================

/// Per-component numeric format of a texel or vertex element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TexelFormat {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float16,
    Float32,
}

impl TexelFormat {
    /// Size of one component in bytes
    pub fn component_size(self) -> u32 {
        match self {
            TexelFormat::Int8 | TexelFormat::Uint8 => 1,
            TexelFormat::Int16 | TexelFormat::Uint16 | TexelFormat::Float16 => 2,
            TexelFormat::Int32 | TexelFormat::Uint32 | TexelFormat::Float32 => 4,
        }
    }
}

/// Channel count of a texel or vertex element (1 to 4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimensions {
    One,
    Two,
    Three,
    Four,
}

impl Dimensions {
    pub fn count(self) -> u32 {
        match self {
            Dimensions::One => 1,
            Dimensions::Two => 2,
            Dimensions::Three => 3,
            Dimensions::Four => 4,
        }
    }
}

// ============================================================================
// Native format triples
// ============================================================================

/// Native component data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeDataType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    HalfFloat,
    Float,
}

impl NativeDataType {
    pub fn byte_size(self) -> u32 {
        match self {
            NativeDataType::Byte | NativeDataType::UnsignedByte => 1,
            NativeDataType::Short | NativeDataType::UnsignedShort | NativeDataType::HalfFloat => 2,
            NativeDataType::Int | NativeDataType::UnsignedInt | NativeDataType::Float => 4,
        }
    }
}

/// Native channel layout passed alongside pixel transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeChannelLayout {
    Red,
    RedInteger,
    Rg,
    RgInteger,
    Rgb,
    RgbInteger,
    Rgba,
    RgbaInteger,
}

impl NativeChannelLayout {
    /// Number of channels transferred per texel
    pub fn components(self) -> u32 {
        match self {
            NativeChannelLayout::Red | NativeChannelLayout::RedInteger => 1,
            NativeChannelLayout::Rg | NativeChannelLayout::RgInteger => 2,
            NativeChannelLayout::Rgb | NativeChannelLayout::RgbInteger => 3,
            NativeChannelLayout::Rgba | NativeChannelLayout::RgbaInteger => 4,
        }
    }
}

/// Native sized internal format
///
/// One variant per (channel count, texel format) pair. 8-bit unsigned maps
/// to the normalized formats so image assets sample as 0..1 floats; the
/// other integer formats map to non-normalized integer formats.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeInternalFormat {
    R8,
    RG8,
    RGB8,
    RGBA8,
    R8I,
    RG8I,
    RGB8I,
    RGBA8I,
    R16I,
    RG16I,
    RGB16I,
    RGBA16I,
    R16UI,
    RG16UI,
    RGB16UI,
    RGBA16UI,
    R32I,
    RG32I,
    RGB32I,
    RGBA32I,
    R32UI,
    RG32UI,
    RGB32UI,
    RGBA32UI,
    R16F,
    RG16F,
    RGB16F,
    RGBA16F,
    R32F,
    RG32F,
    RGB32F,
    RGBA32F,
}

/// Complete native format triple for one texture format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeTexelFormat {
    pub internal_format: NativeInternalFormat,
    pub channel_layout: NativeChannelLayout,
    pub data_type: NativeDataType,
}

/// Map a generic (dimensions, format) pair to its native format triple
pub fn map_texel_format(dimensions: Dimensions, format: TexelFormat) -> NativeTexelFormat {
    use Dimensions::*;
    use NativeChannelLayout as C;
    use NativeDataType as T;
    use NativeInternalFormat as I;
    use TexelFormat::*;

    let (internal_format, channel_layout, data_type) = match (format, dimensions) {
        (Uint8, One) => (I::R8, C::Red, T::UnsignedByte),
        (Uint8, Two) => (I::RG8, C::Rg, T::UnsignedByte),
        (Uint8, Three) => (I::RGB8, C::Rgb, T::UnsignedByte),
        (Uint8, Four) => (I::RGBA8, C::Rgba, T::UnsignedByte),

        (Int8, One) => (I::R8I, C::RedInteger, T::Byte),
        (Int8, Two) => (I::RG8I, C::RgInteger, T::Byte),
        (Int8, Three) => (I::RGB8I, C::RgbInteger, T::Byte),
        (Int8, Four) => (I::RGBA8I, C::RgbaInteger, T::Byte),

        (Int16, One) => (I::R16I, C::RedInteger, T::Short),
        (Int16, Two) => (I::RG16I, C::RgInteger, T::Short),
        (Int16, Three) => (I::RGB16I, C::RgbInteger, T::Short),
        (Int16, Four) => (I::RGBA16I, C::RgbaInteger, T::Short),

        (Uint16, One) => (I::R16UI, C::RedInteger, T::UnsignedShort),
        (Uint16, Two) => (I::RG16UI, C::RgInteger, T::UnsignedShort),
        (Uint16, Three) => (I::RGB16UI, C::RgbInteger, T::UnsignedShort),
        (Uint16, Four) => (I::RGBA16UI, C::RgbaInteger, T::UnsignedShort),

        (Int32, One) => (I::R32I, C::RedInteger, T::Int),
        (Int32, Two) => (I::RG32I, C::RgInteger, T::Int),
        (Int32, Three) => (I::RGB32I, C::RgbInteger, T::Int),
        (Int32, Four) => (I::RGBA32I, C::RgbaInteger, T::Int),

        (Uint32, One) => (I::R32UI, C::RedInteger, T::UnsignedInt),
        (Uint32, Two) => (I::RG32UI, C::RgInteger, T::UnsignedInt),
        (Uint32, Three) => (I::RGB32UI, C::RgbInteger, T::UnsignedInt),
        (Uint32, Four) => (I::RGBA32UI, C::RgbaInteger, T::UnsignedInt),

        (Float16, One) => (I::R16F, C::Red, T::HalfFloat),
        (Float16, Two) => (I::RG16F, C::Rg, T::HalfFloat),
        (Float16, Three) => (I::RGB16F, C::Rgb, T::HalfFloat),
        (Float16, Four) => (I::RGBA16F, C::Rgba, T::HalfFloat),

        (Float32, One) => (I::R32F, C::Red, T::Float),
        (Float32, Two) => (I::RG32F, C::Rg, T::Float),
        (Float32, Three) => (I::RGB32F, C::Rgb, T::Float),
        (Float32, Four) => (I::RGBA32F, C::Rgba, T::Float),
    };

    NativeTexelFormat {
        internal_format,
        channel_layout,
        data_type,
    }
}

// ============================================================================
// Vertex element mapping
// ============================================================================

/// Native description of one vertex attribute element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeVertexElement {
    pub data_type: NativeDataType,
    /// Total byte size of the element (component size times channel count)
    pub byte_size: u32,
}

/// Map a generic (dimensions, format) pair to its vertex element description
pub fn map_vertex_element(dimensions: Dimensions, format: TexelFormat) -> NativeVertexElement {
    let data_type = match format {
        TexelFormat::Int8 => NativeDataType::Byte,
        TexelFormat::Uint8 => NativeDataType::UnsignedByte,
        TexelFormat::Int16 => NativeDataType::Short,
        TexelFormat::Uint16 => NativeDataType::UnsignedShort,
        TexelFormat::Int32 => NativeDataType::Int,
        TexelFormat::Uint32 => NativeDataType::UnsignedInt,
        TexelFormat::Float16 => NativeDataType::HalfFloat,
        TexelFormat::Float32 => NativeDataType::Float,
    };
    NativeVertexElement {
        data_type,
        byte_size: format.component_size() * dimensions.count(),
    }
}

// ============================================================================
// Filters and wrap modes
// ============================================================================

/// Minification filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinFilter {
    Nearest,
    Linear,
    MipmapLinear,
}

/// Magnification filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagFilter {
    Nearest,
    Linear,
}

/// Texture coordinate wrap mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Clamp,
    Repeat,
    MirroredRepeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeMinFilter {
    Nearest,
    Linear,
    LinearMipmapLinear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeMagFilter {
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeWrapMode {
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

pub fn map_min_filter(filter: MinFilter) -> NativeMinFilter {
    match filter {
        MinFilter::Nearest => NativeMinFilter::Nearest,
        MinFilter::Linear => NativeMinFilter::Linear,
        MinFilter::MipmapLinear => NativeMinFilter::LinearMipmapLinear,
    }
}

pub fn map_mag_filter(filter: MagFilter) -> NativeMagFilter {
    match filter {
        MagFilter::Nearest => NativeMagFilter::Nearest,
        MagFilter::Linear => NativeMagFilter::Linear,
    }
}

pub fn map_wrap_mode(mode: WrapMode) -> NativeWrapMode {
    match mode {
        WrapMode::Clamp => NativeWrapMode::ClampToEdge,
        WrapMode::Repeat => NativeWrapMode::Repeat,
        WrapMode::MirroredRepeat => NativeWrapMode::MirroredRepeat,
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
