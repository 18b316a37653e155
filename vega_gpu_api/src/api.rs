//! Top-level API
//!
//! `GpuApi` is the factory consumers hold: it checks device capabilities
//! once at construction, owns the default framebuffer, and creates every
//! typed resource. Construction fails fast when the device cannot render
//! to floating point color targets, since the deferred pipelines this API
//! serves depend on them.

use std::sync::{Arc, Mutex};

use crate::assets::{reject_html_error_page, AssetSource};
use crate::device::{BlendMode, CullMode, GeometryLayout, RasterDevice};
use crate::engine_bail;
use crate::engine_info;
use crate::error::Result;
use crate::mesh::{full_screen_quad_data, parse_face_file};
use crate::resource::{
    DefaultFramebuffer, Geometry, LoadTextureParameters, OffscreenFramebuffer, ShaderProgram,
    Texture2D, TextureParameters, UniformsLayout,
};

const LOG_SOURCE: &str = "vega::GpuApi";

/// Resource factory over a raster device
pub struct GpuApi {
    device: Arc<Mutex<dyn RasterDevice>>,
    assets: Arc<dyn AssetSource>,
    default_framebuffer: DefaultFramebuffer,
}

impl GpuApi {
    /// Wrap an initialized device context
    ///
    /// `output_width`/`output_height` describe the current output surface;
    /// `with_depth` selects whether the default framebuffer depth-tests.
    pub fn new(
        device: Arc<Mutex<dyn RasterDevice>>,
        assets: Arc<dyn AssetSource>,
        output_width: u32,
        output_height: u32,
        with_depth: bool,
    ) -> Result<Self> {
        let capabilities = device.lock().unwrap().capabilities();
        if !capabilities.float_color_targets {
            engine_bail!(
                LOG_SOURCE,
                MissingCapability,
                "rendering to floating point color targets is not supported by this device"
            );
        }
        engine_info!(
            LOG_SOURCE,
            "Device limits: {} color attachments, {} texture units, {} vertex uniform vectors",
            capabilities.max_color_attachments,
            capabilities.max_texture_units,
            capabilities.max_vertex_uniform_vectors
        );

        // Back-face culling is the baseline state
        device.lock().unwrap().set_cull_mode(CullMode::Back);

        let default_framebuffer =
            DefaultFramebuffer::new(device.clone(), output_width, output_height, with_depth);
        Ok(Self {
            device,
            assets,
            default_framebuffer,
        })
    }

    // ===== Global state =====

    pub fn set_blending(&self, mode: BlendMode) {
        self.device.lock().unwrap().set_blend_mode(mode);
    }

    pub fn set_cull_face(&self, mode: CullMode) {
        self.device.lock().unwrap().set_cull_mode(mode);
    }

    // ===== Geometry =====

    pub fn create_geometry(&self, layout: &GeometryLayout, data: &[u8]) -> Result<Geometry> {
        Geometry::new(self.device.clone(), layout, data)
    }

    /// Load a face file through the asset source and upload it
    pub fn load_geometry(&self, path: &str) -> Result<Geometry> {
        let text = self.assets.load_text(path)?;
        reject_html_error_page(path, &text)?;
        let parsed = parse_face_file(&text)?;
        engine_info!(
            LOG_SOURCE,
            "Loaded '{}' ({}): {} triangles",
            path,
            parsed.name,
            parsed.intermediate.triangle_count()
        );
        let (data, layout) = parsed.intermediate.to_vertex_data();
        self.create_geometry(&layout, &data)
    }

    /// The canonical two-triangle clip-space quad
    pub fn create_full_screen_quad(&self) -> Result<Geometry> {
        let (data, layout) = full_screen_quad_data();
        self.create_geometry(&layout, &data)
    }

    // ===== Shaders =====

    pub fn create_shader_from_source(
        &self,
        vertex_source: &str,
        fragment_source: &str,
        layout: UniformsLayout,
    ) -> Result<ShaderProgram> {
        ShaderProgram::new(self.device.clone(), vertex_source, fragment_source, layout)
    }

    /// Load both shader stages through the asset source
    pub fn load_shader(
        &self,
        vertex_path: &str,
        fragment_path: &str,
        layout: UniformsLayout,
    ) -> Result<ShaderProgram> {
        let vertex_source = self.assets.load_text(vertex_path)?;
        reject_html_error_page(vertex_path, &vertex_source)?;
        let fragment_source = self.assets.load_text(fragment_path)?;
        reject_html_error_page(fragment_path, &fragment_source)?;
        self.create_shader_from_source(&vertex_source, &fragment_source, layout)
    }

    // ===== Textures =====

    pub fn create_texture_2d(
        &self,
        parameters: TextureParameters,
        data: Option<&[u8]>,
    ) -> Result<Texture2D> {
        Texture2D::from_texels(self.device.clone(), parameters, data)
    }

    /// Load and decode an image through the asset source
    pub fn load_texture_2d(&self, path: &str, load: LoadTextureParameters) -> Result<Texture2D> {
        let image = self.assets.load_image(path)?;
        Texture2D::from_decoded_image(self.device.clone(), &image, &load)
    }

    // ===== Framebuffers =====

    pub fn default_framebuffer(&mut self) -> &mut DefaultFramebuffer {
        &mut self.default_framebuffer
    }

    pub fn resize_default_framebuffer(&mut self, width: u32, height: u32) {
        self.default_framebuffer.resize(width, height);
    }

    pub fn create_framebuffer(
        &self,
        width: u32,
        height: u32,
        with_depth: bool,
    ) -> Result<OffscreenFramebuffer> {
        OffscreenFramebuffer::new(self.device.clone(), width, height, with_depth)
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
