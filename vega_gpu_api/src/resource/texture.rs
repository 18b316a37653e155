//! 2D texture resource
//!
//! Remembers its originating parameters alongside the native handle so
//! framebuffers can later derive readback formats from attached textures.
//! Raw-texel creation defaults to nearest/clamp with no mipmaps; image
//! loading defaults to linear/repeat with mipmaps.

use std::sync::{Arc, Mutex};

use crate::device::{
    map_mag_filter, map_min_filter, map_texel_format, map_wrap_mode, Dimensions, MagFilter,
    MinFilter, NativeTextureDesc, RasterDevice, TexelFormat, TextureHandle, WrapMode,
};
use crate::engine_bail;
use crate::error::Result;

const LOG_SOURCE: &str = "vega::Texture2D";

/// Creation parameters for a 2D texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureParameters {
    pub width: u32,
    pub height: u32,
    pub dimensions: Dimensions,
    pub format: TexelFormat,
    pub mipmap: bool,
    pub min_filter: MinFilter,
    pub mag_filter: MagFilter,
    pub wrap_x: WrapMode,
    pub wrap_y: WrapMode,
}

impl TextureParameters {
    /// Parameters with the raw-create defaults: nearest, clamp, no mipmaps
    pub fn new(width: u32, height: u32, dimensions: Dimensions, format: TexelFormat) -> Self {
        Self {
            width,
            height,
            dimensions,
            format,
            mipmap: false,
            min_filter: MinFilter::Nearest,
            mag_filter: MagFilter::Nearest,
            wrap_x: WrapMode::Clamp,
            wrap_y: WrapMode::Clamp,
        }
    }

    /// Total byte size of one full-resolution image
    pub fn byte_size(&self) -> usize {
        (self.width * self.height * self.dimensions.count() * self.format.component_size()) as usize
    }

    pub(crate) fn to_native_desc(self) -> NativeTextureDesc {
        NativeTextureDesc {
            width: self.width,
            height: self.height,
            format: map_texel_format(self.dimensions, self.format),
            min_filter: map_min_filter(self.min_filter),
            mag_filter: map_mag_filter(self.mag_filter),
            wrap_x: map_wrap_mode(self.wrap_x),
            wrap_y: map_wrap_mode(self.wrap_y),
            mipmap: self.mipmap,
        }
    }
}

/// Sampling parameters for image loading; defaults differ from raw creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTextureParameters {
    pub mipmap: bool,
    pub min_filter: MinFilter,
    pub mag_filter: MagFilter,
    pub wrap_x: WrapMode,
    pub wrap_y: WrapMode,
}

impl Default for LoadTextureParameters {
    fn default() -> Self {
        Self {
            mipmap: true,
            min_filter: MinFilter::Linear,
            mag_filter: MagFilter::Linear,
            wrap_x: WrapMode::Repeat,
            wrap_y: WrapMode::Repeat,
        }
    }
}

/// An image decoded to tightly packed RGBA8 by an `AssetSource`
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes, row-major
    pub pixels: Vec<u8>,
}

/// A 2D texture owning one native handle
pub struct Texture2D {
    device: Arc<Mutex<dyn RasterDevice>>,
    parameters: TextureParameters,
    handle: Option<TextureHandle>,
}

impl std::fmt::Debug for Texture2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture2D")
            .field("parameters", &self.parameters)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl Texture2D {
    /// Create from raw texels (or allocate empty when `data` is `None`)
    pub(crate) fn from_texels(
        device: Arc<Mutex<dyn RasterDevice>>,
        parameters: TextureParameters,
        data: Option<&[u8]>,
    ) -> Result<Self> {
        if let Some(bytes) = data {
            let expected = parameters.byte_size();
            if bytes.len() != expected {
                engine_bail!(
                    LOG_SOURCE,
                    Validation,
                    "texture data is {} bytes, expected {} for {}x{}",
                    bytes.len(),
                    expected,
                    parameters.width,
                    parameters.height
                );
            }
        }
        let desc = parameters.to_native_desc();
        let handle = device.lock().unwrap().create_texture_2d(&desc, data)?;
        Ok(Self {
            device,
            parameters,
            handle: Some(handle),
        })
    }

    /// Create from a decoded image with image-loading defaults
    pub(crate) fn from_decoded_image(
        device: Arc<Mutex<dyn RasterDevice>>,
        image: &DecodedImage,
        load: &LoadTextureParameters,
    ) -> Result<Self> {
        let parameters = TextureParameters {
            width: image.width,
            height: image.height,
            dimensions: Dimensions::Four,
            format: TexelFormat::Uint8,
            mipmap: load.mipmap,
            min_filter: load.min_filter,
            mag_filter: load.mag_filter,
            wrap_x: load.wrap_x,
            wrap_y: load.wrap_y,
        };
        Self::from_texels(device, parameters, Some(&image.pixels))
    }

    pub fn handle(&self) -> Result<TextureHandle> {
        match self.handle {
            Some(handle) => Ok(handle),
            None => engine_bail!(LOG_SOURCE, UseAfterFree, "texture handle requested after free"),
        }
    }

    pub fn parameters(&self) -> &TextureParameters {
        &self.parameters
    }

    pub fn byte_size(&self) -> usize {
        self.parameters.byte_size()
    }

    /// Release the native texture; repeated calls are no-ops
    pub fn free(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.device.lock().unwrap().destroy_texture(handle);
        }
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        self.free();
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
