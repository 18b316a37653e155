//! Native enum to GL constant mapping
//!
//! Pure lookup tables from the core crate's native format enums to glow
//! constants. Kept separate from the device so they stay testable without
//! a context.

use vega_gpu_api::vega::device::{
    NativeChannelLayout, NativeDataType, NativeInternalFormat, NativeMagFilter, NativeMinFilter,
    NativeWrapMode,
};

pub fn internal_format(format: NativeInternalFormat) -> u32 {
    use NativeInternalFormat::*;
    match format {
        R8 => glow::R8,
        RG8 => glow::RG8,
        RGB8 => glow::RGB8,
        RGBA8 => glow::RGBA8,
        R8I => glow::R8I,
        RG8I => glow::RG8I,
        RGB8I => glow::RGB8I,
        RGBA8I => glow::RGBA8I,
        R16I => glow::R16I,
        RG16I => glow::RG16I,
        RGB16I => glow::RGB16I,
        RGBA16I => glow::RGBA16I,
        R16UI => glow::R16UI,
        RG16UI => glow::RG16UI,
        RGB16UI => glow::RGB16UI,
        RGBA16UI => glow::RGBA16UI,
        R32I => glow::R32I,
        RG32I => glow::RG32I,
        RGB32I => glow::RGB32I,
        RGBA32I => glow::RGBA32I,
        R32UI => glow::R32UI,
        RG32UI => glow::RG32UI,
        RGB32UI => glow::RGB32UI,
        RGBA32UI => glow::RGBA32UI,
        R16F => glow::R16F,
        RG16F => glow::RG16F,
        RGB16F => glow::RGB16F,
        RGBA16F => glow::RGBA16F,
        R32F => glow::R32F,
        RG32F => glow::RG32F,
        RGB32F => glow::RGB32F,
        RGBA32F => glow::RGBA32F,
    }
}

pub fn channel_layout(layout: NativeChannelLayout) -> u32 {
    match layout {
        NativeChannelLayout::Red => glow::RED,
        NativeChannelLayout::RedInteger => glow::RED_INTEGER,
        NativeChannelLayout::Rg => glow::RG,
        NativeChannelLayout::RgInteger => glow::RG_INTEGER,
        NativeChannelLayout::Rgb => glow::RGB,
        NativeChannelLayout::RgbInteger => glow::RGB_INTEGER,
        NativeChannelLayout::Rgba => glow::RGBA,
        NativeChannelLayout::RgbaInteger => glow::RGBA_INTEGER,
    }
}

pub fn data_type(data_type: NativeDataType) -> u32 {
    match data_type {
        NativeDataType::Byte => glow::BYTE,
        NativeDataType::UnsignedByte => glow::UNSIGNED_BYTE,
        NativeDataType::Short => glow::SHORT,
        NativeDataType::UnsignedShort => glow::UNSIGNED_SHORT,
        NativeDataType::Int => glow::INT,
        NativeDataType::UnsignedInt => glow::UNSIGNED_INT,
        NativeDataType::HalfFloat => glow::HALF_FLOAT,
        NativeDataType::Float => glow::FLOAT,
    }
}

pub fn min_filter(filter: NativeMinFilter) -> i32 {
    (match filter {
        NativeMinFilter::Nearest => glow::NEAREST,
        NativeMinFilter::Linear => glow::LINEAR,
        NativeMinFilter::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
    }) as i32
}

pub fn mag_filter(filter: NativeMagFilter) -> i32 {
    (match filter {
        NativeMagFilter::Nearest => glow::NEAREST,
        NativeMagFilter::Linear => glow::LINEAR,
    }) as i32
}

pub fn wrap_mode(mode: NativeWrapMode) -> i32 {
    (match mode {
        NativeWrapMode::ClampToEdge => glow::CLAMP_TO_EDGE,
        NativeWrapMode::Repeat => glow::REPEAT,
        NativeWrapMode::MirroredRepeat => glow::MIRRORED_REPEAT,
    }) as i32
}
