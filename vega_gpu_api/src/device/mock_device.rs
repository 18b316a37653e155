//! Mock raster device for unit tests (no GPU required)
//!
//! Records every call so resource and dispatcher tests can assert on the
//! exact native operations performed. Textures keep their texel bytes in
//! memory, which lets readback tests verify both the requested format and
//! the returned data.

use rustc_hash::FxHashMap;
use std::collections::HashSet;

use crate::device::device::{
    BlendMode, ClearValues, CullMode, DepthBufferHandle, DeviceCapabilities, FramebufferHandle,
    MatrixDimensions, NativeTextureDesc, ProgramHandle, RasterDevice, TextureHandle,
    UniformArrayValues, UniformFormat, UniformLocation, UniformWrite, VectorDimensions,
    VertexArrayHandle,
};
use crate::device::format::NativeTexelFormat;
use crate::device::layout::VertexLayoutPlan;
use crate::engine_bail;
use crate::error::Result;

const LOG_SOURCE: &str = "vega::MockDevice";

// ============================================================================
// Recorded state
// ============================================================================

#[derive(Debug, Clone)]
pub struct MockVertexArray {
    pub stride: u32,
    pub attribute_offsets: Vec<u32>,
    pub data_len: usize,
}

#[derive(Debug, Clone)]
pub struct MockTexture {
    pub desc: NativeTextureDesc,
    /// Texel bytes; zero-filled when created without data
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct MockProgram {
    pub vertex_source: String,
    pub fragment_source: String,
}

#[derive(Debug, Clone, Default)]
pub struct MockFramebuffer {
    /// (slot, texture handle) pairs in attachment order
    pub color_attachments: Vec<(u32, u64)>,
    pub depth_attachment: Option<u64>,
    pub draw_buffer_count: u32,
}

/// Owned copy of a uniform write, kept for assertions
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedUniformWrite {
    Scalar {
        format: UniformFormat,
        value: f64,
    },
    Vector {
        format: UniformFormat,
        dimensions: VectorDimensions,
        value: Vec<f64>,
    },
    Matrix {
        dimensions: MatrixDimensions,
        transpose: bool,
        values: Vec<f32>,
    },
    ScalarArray {
        format: UniformFormat,
        len: usize,
    },
    VectorArray {
        format: UniformFormat,
        dimensions: VectorDimensions,
        len: usize,
    },
    MatrixArray {
        dimensions: MatrixDimensions,
        transpose: bool,
        len: usize,
    },
    SamplerUnit {
        unit: u32,
    },
}

fn record_write(write: &UniformWrite<'_>) -> RecordedUniformWrite {
    match *write {
        UniformWrite::Scalar { format, value } => RecordedUniformWrite::Scalar { format, value },
        UniformWrite::Vector {
            format,
            dimensions,
            value,
        } => RecordedUniformWrite::Vector {
            format,
            dimensions,
            value: value[..dimensions.count()].to_vec(),
        },
        UniformWrite::Matrix {
            dimensions,
            transpose,
            values,
        } => RecordedUniformWrite::Matrix {
            dimensions,
            transpose,
            values: values.to_vec(),
        },
        UniformWrite::ScalarArray { values } => RecordedUniformWrite::ScalarArray {
            format: values.format(),
            len: values.len(),
        },
        UniformWrite::VectorArray { dimensions, values } => RecordedUniformWrite::VectorArray {
            format: values.format(),
            dimensions,
            len: values.len(),
        },
        UniformWrite::MatrixArray {
            dimensions,
            transpose,
            values,
        } => RecordedUniformWrite::MatrixArray {
            dimensions,
            transpose,
            len: values.len(),
        },
        UniformWrite::SamplerUnit { unit } => RecordedUniformWrite::SamplerUnit { unit },
    }
}

// ============================================================================
// Mock device
// ============================================================================

pub struct MockRasterDevice {
    next_handle: u64,

    pub capabilities: DeviceCapabilities,
    /// Names reported as having no location (optimized away)
    pub missing_uniforms: HashSet<String>,
    /// Simulate an incomplete framebuffer after attachment
    pub fail_completeness: bool,
    /// Simulate a compile/link failure with this diagnostic
    pub compile_error: Option<String>,

    pub vertex_arrays: FxHashMap<u64, MockVertexArray>,
    pub textures: FxHashMap<u64, MockTexture>,
    pub programs: FxHashMap<u64, MockProgram>,
    pub framebuffers: FxHashMap<u64, MockFramebuffer>,
    pub depth_buffers: FxHashMap<u64, (u32, u32)>,

    locations: FxHashMap<(u64, String), UniformLocation>,
    pub location_names: FxHashMap<UniformLocation, String>,

    pub draw_calls: Vec<(VertexArrayHandle, u32)>,
    pub used_programs: Vec<ProgramHandle>,
    pub uniform_writes: Vec<(UniformLocation, RecordedUniformWrite)>,
    pub bound_texture_units: Vec<(u32, TextureHandle)>,
    pub bound_framebuffers: Vec<Option<FramebufferHandle>>,
    pub viewports: Vec<(u32, u32)>,
    pub depth_test_changes: Vec<bool>,
    pub blend_modes: Vec<BlendMode>,
    pub cull_modes: Vec<CullMode>,
    pub clears: Vec<ClearValues>,
}

impl Default for MockRasterDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRasterDevice {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            capabilities: DeviceCapabilities {
                float_color_targets: true,
                max_color_attachments: 8,
                max_texture_units: 16,
                max_vertex_uniform_vectors: 256,
            },
            missing_uniforms: HashSet::new(),
            fail_completeness: false,
            compile_error: None,
            vertex_arrays: FxHashMap::default(),
            textures: FxHashMap::default(),
            programs: FxHashMap::default(),
            framebuffers: FxHashMap::default(),
            depth_buffers: FxHashMap::default(),
            locations: FxHashMap::default(),
            location_names: FxHashMap::default(),
            draw_calls: Vec::new(),
            used_programs: Vec::new(),
            uniform_writes: Vec::new(),
            bound_texture_units: Vec::new(),
            bound_framebuffers: Vec::new(),
            viewports: Vec::new(),
            depth_test_changes: Vec::new(),
            blend_modes: Vec::new(),
            cull_modes: Vec::new(),
            clears: Vec::new(),
        }
    }

    fn allocate_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    /// Resolved location of a uniform name, if any program resolved it
    pub fn location_of(&self, name: &str) -> Option<UniformLocation> {
        self.location_names
            .iter()
            .find(|(_, candidate)| candidate.as_str() == name)
            .map(|(location, _)| *location)
    }

    /// Writes recorded against the location of the given uniform name
    pub fn writes_for(&self, name: &str) -> Vec<RecordedUniformWrite> {
        let Some(location) = self.location_of(name) else {
            return Vec::new();
        };
        self.uniform_writes
            .iter()
            .filter(|(candidate, _)| *candidate == location)
            .map(|(_, write)| write.clone())
            .collect()
    }

    fn texture_byte_size(desc: &NativeTextureDesc) -> usize {
        let texel = desc.format.channel_layout.components() * desc.format.data_type.byte_size();
        (desc.width * desc.height * texel) as usize
    }
}

impl RasterDevice for MockRasterDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    // ===== Geometry =====

    fn create_vertex_array(
        &mut self,
        plan: &VertexLayoutPlan,
        data: &[u8],
    ) -> Result<VertexArrayHandle> {
        let handle = self.allocate_handle();
        self.vertex_arrays.insert(
            handle,
            MockVertexArray {
                stride: plan.stride,
                attribute_offsets: plan.attributes.iter().map(|a| a.offset).collect(),
                data_len: data.len(),
            },
        );
        Ok(VertexArrayHandle(handle))
    }

    fn draw_triangles(&mut self, vertex_array: VertexArrayHandle, vertex_count: u32) -> Result<()> {
        if !self.vertex_arrays.contains_key(&vertex_array.0) {
            engine_bail!(LOG_SOURCE, BackendError, "unknown vertex array handle");
        }
        self.draw_calls.push((vertex_array, vertex_count));
        Ok(())
    }

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        self.vertex_arrays.remove(&vertex_array.0);
    }

    // ===== Textures =====

    fn create_texture_2d(
        &mut self,
        desc: &NativeTextureDesc,
        data: Option<&[u8]>,
    ) -> Result<TextureHandle> {
        let byte_size = Self::texture_byte_size(desc);
        let data = match data {
            Some(bytes) => bytes.to_vec(),
            None => vec![0u8; byte_size],
        };
        let handle = self.allocate_handle();
        self.textures.insert(handle, MockTexture { desc: *desc, data });
        Ok(TextureHandle(handle))
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture.0);
    }

    // ===== Shader programs =====

    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle> {
        if let Some(diagnostic) = &self.compile_error {
            engine_bail!(LOG_SOURCE, ShaderCompilation, "{}", diagnostic.clone());
        }
        let handle = self.allocate_handle();
        self.programs.insert(
            handle,
            MockProgram {
                vertex_source: vertex_source.to_string(),
                fragment_source: fragment_source.to_string(),
            },
        );
        Ok(ProgramHandle(handle))
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        if self.missing_uniforms.contains(name) {
            return None;
        }
        if let Some(existing) = self.locations.get(&(program.0, name.to_string())) {
            return Some(*existing);
        }
        let location = UniformLocation(self.allocate_handle());
        self.locations.insert((program.0, name.to_string()), location);
        self.location_names.insert(location, name.to_string());
        Some(location)
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<()> {
        if !self.programs.contains_key(&program.0) {
            engine_bail!(LOG_SOURCE, BackendError, "unknown program handle");
        }
        self.used_programs.push(program);
        Ok(())
    }

    fn write_uniform(&mut self, location: UniformLocation, write: &UniformWrite<'_>) -> Result<()> {
        self.uniform_writes.push((location, record_write(write)));
        Ok(())
    }

    fn bind_texture_unit(&mut self, unit: u32, texture: TextureHandle) -> Result<()> {
        if !self.textures.contains_key(&texture.0) {
            engine_bail!(LOG_SOURCE, BackendError, "unknown texture handle");
        }
        self.bound_texture_units.push((unit, texture));
        Ok(())
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program.0);
    }

    // ===== Framebuffers =====

    fn create_framebuffer(&mut self) -> Result<FramebufferHandle> {
        let handle = self.allocate_handle();
        self.framebuffers.insert(handle, MockFramebuffer::default());
        Ok(FramebufferHandle(handle))
    }

    fn create_depth_buffer(&mut self, width: u32, height: u32) -> Result<DepthBufferHandle> {
        let handle = self.allocate_handle();
        self.depth_buffers.insert(handle, (width, height));
        Ok(DepthBufferHandle(handle))
    }

    fn attach_depth_buffer(
        &mut self,
        framebuffer: FramebufferHandle,
        depth_buffer: DepthBufferHandle,
    ) -> Result<()> {
        let Some(fb) = self.framebuffers.get_mut(&framebuffer.0) else {
            engine_bail!(LOG_SOURCE, BackendError, "unknown framebuffer handle");
        };
        fb.depth_attachment = Some(depth_buffer.0);
        Ok(())
    }

    fn destroy_depth_buffer(&mut self, depth_buffer: DepthBufferHandle) {
        self.depth_buffers.remove(&depth_buffer.0);
    }

    fn attach_color_texture(
        &mut self,
        framebuffer: FramebufferHandle,
        slot: u32,
        texture: TextureHandle,
    ) -> Result<()> {
        if !self.textures.contains_key(&texture.0) {
            engine_bail!(LOG_SOURCE, BackendError, "unknown texture handle");
        }
        let Some(fb) = self.framebuffers.get_mut(&framebuffer.0) else {
            engine_bail!(LOG_SOURCE, BackendError, "unknown framebuffer handle");
        };
        fb.color_attachments.retain(|(existing, _)| *existing != slot);
        fb.color_attachments.push((slot, texture.0));
        Ok(())
    }

    fn set_draw_buffers(&mut self, framebuffer: FramebufferHandle, count: u32) -> Result<()> {
        let Some(fb) = self.framebuffers.get_mut(&framebuffer.0) else {
            engine_bail!(LOG_SOURCE, BackendError, "unknown framebuffer handle");
        };
        fb.draw_buffer_count = count;
        Ok(())
    }

    fn framebuffer_complete(&mut self, framebuffer: FramebufferHandle) -> bool {
        !self.fail_completeness && self.framebuffers.contains_key(&framebuffer.0)
    }

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.framebuffers.remove(&framebuffer.0);
    }

    // ===== Render state =====

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) {
        self.bound_framebuffers.push(framebuffer);
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewports.push((width, height));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test_changes.push(enabled);
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_modes.push(mode);
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull_modes.push(mode);
    }

    fn clear(&mut self, values: &ClearValues) {
        self.clears.push(*values);
    }

    // ===== Readback =====

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
    ) -> Result<()> {
        let Some(fb) = self.framebuffers.get(&framebuffer.0) else {
            engine_bail!(LOG_SOURCE, BackendError, "unknown framebuffer handle");
        };
        let Some((_, texture_handle)) = fb
            .color_attachments
            .iter()
            .find(|(candidate, _)| *candidate == slot)
        else {
            engine_bail!(LOG_SOURCE, BackendError, "no color attachment at slot {}", slot);
        };
        let Some(texture) = self.textures.get(texture_handle) else {
            engine_bail!(LOG_SOURCE, BackendError, "attached texture was destroyed");
        };
        if texture.desc.format != *format {
            engine_bail!(
                LOG_SOURCE,
                BackendError,
                "readback format does not match attachment format at slot {}",
                slot
            );
        }

        let texel = (format.channel_layout.components() * format.data_type.byte_size()) as usize;
        for row in 0..height as usize {
            let src_start = ((y as usize + row) * texture.desc.width as usize + x as usize) * texel;
            let src_end = src_start + width as usize * texel;
            let dst_start = destination_offset + row * width as usize * texel;
            let dst_end = dst_start + width as usize * texel;
            destination[dst_start..dst_end].copy_from_slice(&texture.data[src_start..src_end]);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_device_tests.rs"]
mod tests;
