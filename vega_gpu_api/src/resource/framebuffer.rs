//! Framebuffer resources
//!
//! `DefaultFramebuffer` wraps the device's output surface and owns no
//! native object: it only tracks dimensions, and binding it sets the
//! viewport, toggles depth testing and disables blending.
//!
//! `OffscreenFramebuffer` owns a native framebuffer plus an optional
//! 32-bit float depth renderbuffer. Attaching color textures records each
//! slot's texture parameters so pixel readback can later decode slot *k*
//! with slot *k*'s format.

use std::sync::{Arc, Mutex};

use crate::device::{
    map_texel_format, BlendMode, ClearValues, DepthBufferHandle, FramebufferHandle, RasterDevice,
};
use crate::engine_bail;
use crate::error::Result;
use crate::resource::texture::{Texture2D, TextureParameters};

const LOG_SOURCE: &str = "vega::Framebuffer";

// ============================================================================
// Default framebuffer
// ============================================================================

/// The device's output surface
pub struct DefaultFramebuffer {
    device: Arc<Mutex<dyn RasterDevice>>,
    width: u32,
    height: u32,
    with_depth: bool,
}

impl DefaultFramebuffer {
    pub(crate) fn new(
        device: Arc<Mutex<dyn RasterDevice>>,
        width: u32,
        height: u32,
        with_depth: bool,
    ) -> Self {
        Self {
            device,
            width,
            height,
            with_depth,
        }
    }

    /// Bind for rendering: viewport, depth-test toggle, blending off
    pub fn bind(&self) {
        let mut device = self.device.lock().unwrap();
        device.bind_framebuffer(None);
        device.set_blend_mode(BlendMode::None);
        device.set_viewport(self.width, self.height);
        device.set_depth_test(self.with_depth);
    }

    /// Clear the buffers selected by `values`; selecting none clears nothing
    pub fn clear(&self, values: &ClearValues) {
        self.device.lock().unwrap().clear(values);
    }

    /// The surface is resized externally; only the dimensions change here
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

// ============================================================================
// Offscreen framebuffer
// ============================================================================

/// A render target with caller-attached color textures
pub struct OffscreenFramebuffer {
    device: Arc<Mutex<dyn RasterDevice>>,
    width: u32,
    height: u32,
    with_depth: bool,
    handle: Option<FramebufferHandle>,
    depth_buffer: Option<DepthBufferHandle>,
    /// Per-slot parameters of the currently attached textures
    attachments: Vec<TextureParameters>,
}

impl OffscreenFramebuffer {
    pub(crate) fn new(
        device: Arc<Mutex<dyn RasterDevice>>,
        width: u32,
        height: u32,
        with_depth: bool,
    ) -> Result<Self> {
        let handle;
        let mut depth_buffer = None;
        {
            let mut guard = device.lock().unwrap();
            handle = guard.create_framebuffer()?;
            if with_depth {
                let depth = guard.create_depth_buffer(width, height)?;
                guard.attach_depth_buffer(handle, depth)?;
                depth_buffer = Some(depth);
            }
        }
        Ok(Self {
            device,
            width,
            height,
            with_depth,
            handle: Some(handle),
            depth_buffer,
            attachments: Vec::new(),
        })
    }

    fn live_handle(&self) -> Result<FramebufferHandle> {
        match self.handle {
            Some(handle) => Ok(handle),
            None => engine_bail!(LOG_SOURCE, UseAfterFree, "framebuffer used after free"),
        }
    }

    /// Bind for rendering: viewport, depth-test toggle, blending off
    pub fn bind(&self) -> Result<()> {
        let handle = self.live_handle()?;
        let mut device = self.device.lock().unwrap();
        device.bind_framebuffer(Some(handle));
        device.set_blend_mode(BlendMode::None);
        device.set_viewport(self.width, self.height);
        device.set_depth_test(self.with_depth);
        Ok(())
    }

    /// Clear the buffers selected by `values`; selecting none clears nothing
    pub fn clear(&self, values: &ClearValues) -> Result<()> {
        self.live_handle()?;
        self.device.lock().unwrap().clear(values);
        Ok(())
    }

    /// Resize; the depth renderbuffer is recreated at the new dimensions.
    /// Attached color textures are the caller's to recreate and re-attach.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let handle = self.live_handle()?;
        self.width = width;
        self.height = height;

        if self.with_depth {
            let mut device = self.device.lock().unwrap();
            if let Some(old) = self.depth_buffer.take() {
                device.destroy_depth_buffer(old);
            }
            let depth = device.create_depth_buffer(width, height)?;
            device.attach_depth_buffer(handle, depth)?;
            self.depth_buffer = Some(depth);
        }
        Ok(())
    }

    /// Attach color textures to slots 0..N-1, replacing previous attachments
    pub fn set_attachments(&mut self, textures: &[&Texture2D]) -> Result<()> {
        let handle = self.live_handle()?;

        let max_attachments = self.device.lock().unwrap().capabilities().max_color_attachments;
        if textures.len() as u32 > max_attachments {
            engine_bail!(
                LOG_SOURCE,
                Validation,
                "{} color attachments requested, device supports {}",
                textures.len(),
                max_attachments
            );
        }

        let mut recorded = Vec::with_capacity(textures.len());
        {
            let mut device = self.device.lock().unwrap();
            device.bind_framebuffer(Some(handle));
            for (slot, texture) in textures.iter().enumerate() {
                device.attach_color_texture(handle, slot as u32, texture.handle()?)?;
                recorded.push(*texture.parameters());
            }
            device.set_draw_buffers(handle, textures.len() as u32)?;

            if !device.framebuffer_complete(handle) {
                engine_bail!(
                    LOG_SOURCE,
                    Validation,
                    "framebuffer incomplete after attaching {} textures",
                    textures.len()
                );
            }
        }

        self.attachments = recorded;
        Ok(())
    }

    /// Read back a rectangle from slot `slot`, decoded with the format the
    /// attached texture was created with
    #[allow(clippy::too_many_arguments)]
    pub fn read_pixels(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        slot: u32,
        destination: &mut [u8],
        destination_offset: usize,
    ) -> Result<()> {
        let handle = self.live_handle()?;
        let Some(parameters) = self.attachments.get(slot as usize) else {
            engine_bail!(
                LOG_SOURCE,
                Validation,
                "no texture was ever attached to slot {}",
                slot
            );
        };
        let format = map_texel_format(parameters.dimensions, parameters.format);

        let texel = (parameters.dimensions.count() * parameters.format.component_size()) as usize;
        let required = destination_offset + width as usize * height as usize * texel;
        if destination.len() < required {
            engine_bail!(
                LOG_SOURCE,
                Validation,
                "destination holds {} bytes, readback needs {}",
                destination.len(),
                required
            );
        }

        self.device.lock().unwrap().read_pixels(
            handle,
            slot,
            x,
            y,
            width,
            height,
            &format,
            destination,
            destination_offset,
        )
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Release the native framebuffer and depth buffer; repeated calls are no-ops
    pub fn free(&mut self) {
        let mut device = self.device.lock().unwrap();
        if let Some(depth) = self.depth_buffer.take() {
            device.destroy_depth_buffer(depth);
        }
        if let Some(handle) = self.handle.take() {
            device.destroy_framebuffer(handle);
        }
    }
}

impl Drop for OffscreenFramebuffer {
    fn drop(&mut self) {
        self.free();
    }
}

#[cfg(test)]
#[path = "framebuffer_tests.rs"]
mod tests;
