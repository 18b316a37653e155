//! `RasterDevice` implementation over a glow context
//!
//! Every native GL object lives in a slotmap arena; the opaque `u64`
//! handles exchanged with the core crate are the slotmap keys in FFI
//! form. Destroy operations on unknown handles are no-ops, matching GL's
//! own delete semantics.

use glow::HasContext;
use slotmap::{DefaultKey, Key, KeyData, SlotMap};

use vega_gpu_api::vega::device::{
    BlendMode, ClearValues, CullMode, DepthBufferHandle, DeviceCapabilities, FramebufferHandle,
    MatrixDimensions, NativeTextureDesc, ProgramHandle, RasterDevice, TextureHandle,
    UniformArrayValues, UniformFormat, UniformLocation, UniformWrite, VectorDimensions,
    VertexArrayHandle, VertexLayoutPlan,
};
use vega_gpu_api::vega::{Error, Result};
use vega_gpu_api::{engine_bail, engine_debug, engine_info};

use crate::gl_format;

const LOG_SOURCE: &str = "vega::gl::Device";

fn key_of(bits: u64) -> DefaultKey {
    DefaultKey::from(KeyData::from_ffi(bits))
}

fn bits_of(key: DefaultKey) -> u64 {
    key.data().as_ffi()
}

struct GlVertexArray {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
}

/// OpenGL raster device over a loaded context
pub struct GlDevice {
    gl: glow::Context,
    capabilities: DeviceCapabilities,
    vertex_arrays: SlotMap<DefaultKey, GlVertexArray>,
    textures: SlotMap<DefaultKey, glow::Texture>,
    programs: SlotMap<DefaultKey, glow::Program>,
    framebuffers: SlotMap<DefaultKey, glow::Framebuffer>,
    depth_buffers: SlotMap<DefaultKey, glow::Renderbuffer>,
    uniform_locations: SlotMap<DefaultKey, glow::UniformLocation>,
}

impl GlDevice {
    /// Wrap a loaded context and query its limits
    pub fn new(gl: glow::Context) -> Result<Self> {
        let extensions = gl.supported_extensions();
        // Core desktop GL has renderable float formats since 3.0; GLES and
        // WebGL expose them through EXT_color_buffer_float.
        let float_color_targets = extensions.contains("EXT_color_buffer_float")
            || extensions.contains("GL_EXT_color_buffer_float")
            || !cfg!(target_arch = "wasm32");

        let capabilities = unsafe {
            DeviceCapabilities {
                float_color_targets,
                max_color_attachments: gl.get_parameter_i32(glow::MAX_COLOR_ATTACHMENTS) as u32,
                max_texture_units: gl.get_parameter_i32(glow::MAX_TEXTURE_IMAGE_UNITS) as u32,
                max_vertex_uniform_vectors: gl.get_parameter_i32(glow::MAX_VERTEX_UNIFORM_VECTORS)
                    as u32,
            }
        };
        engine_info!(
            LOG_SOURCE,
            "Context ready: float targets {}, {} color attachments",
            capabilities.float_color_targets,
            capabilities.max_color_attachments
        );

        Ok(Self {
            gl,
            capabilities,
            vertex_arrays: SlotMap::new(),
            textures: SlotMap::new(),
            programs: SlotMap::new(),
            framebuffers: SlotMap::new(),
            depth_buffers: SlotMap::new(),
            uniform_locations: SlotMap::new(),
        })
    }

    fn vertex_array(&self, handle: VertexArrayHandle) -> Result<&GlVertexArray> {
        match self.vertex_arrays.get(key_of(handle.0)) {
            Some(entry) => Ok(entry),
            None => Err(Error::BackendError("unknown vertex array handle".to_string())),
        }
    }

    fn texture(&self, handle: TextureHandle) -> Result<glow::Texture> {
        match self.textures.get(key_of(handle.0)) {
            Some(texture) => Ok(*texture),
            None => Err(Error::BackendError("unknown texture handle".to_string())),
        }
    }

    fn program(&self, handle: ProgramHandle) -> Result<glow::Program> {
        match self.programs.get(key_of(handle.0)) {
            Some(program) => Ok(*program),
            None => Err(Error::BackendError("unknown program handle".to_string())),
        }
    }

    fn framebuffer(&self, handle: FramebufferHandle) -> Result<glow::Framebuffer> {
        match self.framebuffers.get(key_of(handle.0)) {
            Some(framebuffer) => Ok(*framebuffer),
            None => Err(Error::BackendError("unknown framebuffer handle".to_string())),
        }
    }

    fn compile_stage(&self, stage: u32, source: &str) -> Result<glow::Shader> {
        unsafe {
            let shader = self
                .gl
                .create_shader(stage)
                .map_err(Error::BackendError)?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let diagnostic = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                engine_bail!(LOG_SOURCE, ShaderCompilation, "{}", diagnostic);
            }
            Ok(shader)
        }
    }
}

impl RasterDevice for GlDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    // ===== Geometry =====

    fn create_vertex_array(
        &mut self,
        plan: &VertexLayoutPlan,
        data: &[u8],
    ) -> Result<VertexArrayHandle> {
        unsafe {
            let vao = self
                .gl
                .create_vertex_array()
                .map_err(Error::BackendError)?;
            let vbo = self.gl.create_buffer().map_err(Error::BackendError)?;

            self.gl.bind_vertex_array(Some(vao));
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            self.gl
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW);

            for (index, attribute) in plan.attributes.iter().enumerate() {
                self.gl.enable_vertex_attrib_array(index as u32);
                self.gl.vertex_attrib_pointer_f32(
                    index as u32,
                    attribute.dimensions.count() as i32,
                    gl_format::data_type(attribute.data_type),
                    attribute.normalize,
                    plan.stride as i32,
                    attribute.offset as i32,
                );
            }

            self.gl.bind_vertex_array(None);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);

            let key = self.vertex_arrays.insert(GlVertexArray { vao, vbo });
            engine_debug!(
                LOG_SOURCE,
                "Created vertex array: {} bytes, stride {}",
                data.len(),
                plan.stride
            );
            Ok(VertexArrayHandle(bits_of(key)))
        }
    }

    fn draw_triangles(&mut self, vertex_array: VertexArrayHandle, vertex_count: u32) -> Result<()> {
        let entry = self.vertex_array(vertex_array)?;
        unsafe {
            self.gl.bind_vertex_array(Some(entry.vao));
            self.gl.draw_arrays(glow::TRIANGLES, 0, vertex_count as i32);
        }
        Ok(())
    }

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        if let Some(entry) = self.vertex_arrays.remove(key_of(vertex_array.0)) {
            unsafe {
                self.gl.delete_vertex_array(entry.vao);
                self.gl.delete_buffer(entry.vbo);
            }
        }
    }

    // ===== Textures =====

    fn create_texture_2d(
        &mut self,
        desc: &NativeTextureDesc,
        data: Option<&[u8]>,
    ) -> Result<TextureHandle> {
        unsafe {
            let texture = self.gl.create_texture().map_err(Error::BackendError)?;
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                gl_format::internal_format(desc.format.internal_format) as i32,
                desc.width as i32,
                desc.height as i32,
                0,
                gl_format::channel_layout(desc.format.channel_layout),
                gl_format::data_type(desc.format.data_type),
                glow::PixelUnpackData::Slice(data),
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                gl_format::min_filter(desc.min_filter),
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                gl_format::mag_filter(desc.mag_filter),
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                gl_format::wrap_mode(desc.wrap_x),
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                gl_format::wrap_mode(desc.wrap_y),
            );
            if desc.mipmap {
                self.gl.generate_mipmap(glow::TEXTURE_2D);
            }
            self.gl.bind_texture(glow::TEXTURE_2D, None);

            let key = self.textures.insert(texture);
            Ok(TextureHandle(bits_of(key)))
        }
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        if let Some(native) = self.textures.remove(key_of(texture.0)) {
            unsafe { self.gl.delete_texture(native) };
        }
    }

    // ===== Shader programs =====

    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle> {
        let vertex = self.compile_stage(glow::VERTEX_SHADER, vertex_source)?;
        let fragment = match self.compile_stage(glow::FRAGMENT_SHADER, fragment_source) {
            Ok(fragment) => fragment,
            Err(error) => {
                unsafe { self.gl.delete_shader(vertex) };
                return Err(error);
            }
        };

        unsafe {
            let program = self.gl.create_program().map_err(Error::BackendError)?;
            self.gl.attach_shader(program, vertex);
            self.gl.attach_shader(program, fragment);
            self.gl.link_program(program);

            self.gl.detach_shader(program, vertex);
            self.gl.detach_shader(program, fragment);
            self.gl.delete_shader(vertex);
            self.gl.delete_shader(fragment);

            if !self.gl.get_program_link_status(program) {
                let diagnostic = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                engine_bail!(LOG_SOURCE, ShaderCompilation, "{}", diagnostic);
            }

            let key = self.programs.insert(program);
            Ok(ProgramHandle(bits_of(key)))
        }
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let program = self.program(program).ok()?;
        let location = unsafe { self.gl.get_uniform_location(program, name) }?;
        let key = self.uniform_locations.insert(location);
        Some(UniformLocation(bits_of(key)))
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<()> {
        let native = self.program(program)?;
        unsafe { self.gl.use_program(Some(native)) };
        Ok(())
    }

    fn write_uniform(&mut self, location: UniformLocation, write: &UniformWrite<'_>) -> Result<()> {
        let Some(location) = self.uniform_locations.get(key_of(location.0)) else {
            engine_bail!(LOG_SOURCE, BackendError, "unknown uniform location");
        };
        let location = Some(location);
        let gl = &self.gl;

        unsafe {
            match *write {
                UniformWrite::Scalar { format, value } => match format {
                    UniformFormat::Float => gl.uniform_1_f32(location, value as f32),
                    UniformFormat::Int => gl.uniform_1_i32(location, value as i32),
                    UniformFormat::Uint => gl.uniform_1_u32(location, value as u32),
                },
                UniformWrite::Vector {
                    format,
                    dimensions,
                    value: v,
                } => match (format, dimensions) {
                    (UniformFormat::Float, VectorDimensions::Two) => {
                        gl.uniform_2_f32(location, v[0] as f32, v[1] as f32)
                    }
                    (UniformFormat::Float, VectorDimensions::Three) => {
                        gl.uniform_3_f32(location, v[0] as f32, v[1] as f32, v[2] as f32)
                    }
                    (UniformFormat::Float, VectorDimensions::Four) => gl.uniform_4_f32(
                        location, v[0] as f32, v[1] as f32, v[2] as f32, v[3] as f32,
                    ),
                    (UniformFormat::Int, VectorDimensions::Two) => {
                        gl.uniform_2_i32(location, v[0] as i32, v[1] as i32)
                    }
                    (UniformFormat::Int, VectorDimensions::Three) => {
                        gl.uniform_3_i32(location, v[0] as i32, v[1] as i32, v[2] as i32)
                    }
                    (UniformFormat::Int, VectorDimensions::Four) => gl.uniform_4_i32(
                        location, v[0] as i32, v[1] as i32, v[2] as i32, v[3] as i32,
                    ),
                    (UniformFormat::Uint, VectorDimensions::Two) => {
                        gl.uniform_2_u32(location, v[0] as u32, v[1] as u32)
                    }
                    (UniformFormat::Uint, VectorDimensions::Three) => {
                        gl.uniform_3_u32(location, v[0] as u32, v[1] as u32, v[2] as u32)
                    }
                    (UniformFormat::Uint, VectorDimensions::Four) => gl.uniform_4_u32(
                        location, v[0] as u32, v[1] as u32, v[2] as u32, v[3] as u32,
                    ),
                },
                UniformWrite::Matrix {
                    dimensions,
                    transpose,
                    values,
                }
                | UniformWrite::MatrixArray {
                    dimensions,
                    transpose,
                    values,
                } => match dimensions {
                    MatrixDimensions::Two => {
                        gl.uniform_matrix_2_f32_slice(location, transpose, values)
                    }
                    MatrixDimensions::Three => {
                        gl.uniform_matrix_3_f32_slice(location, transpose, values)
                    }
                    MatrixDimensions::Four => {
                        gl.uniform_matrix_4_f32_slice(location, transpose, values)
                    }
                },
                UniformWrite::ScalarArray { values } => match values {
                    UniformArrayValues::Float(values) => gl.uniform_1_f32_slice(location, values),
                    UniformArrayValues::Int(values) => gl.uniform_1_i32_slice(location, values),
                    UniformArrayValues::Uint(values) => gl.uniform_1_u32_slice(location, values),
                },
                UniformWrite::VectorArray { dimensions, values } => match (dimensions, values) {
                    (VectorDimensions::Two, UniformArrayValues::Float(values)) => {
                        gl.uniform_2_f32_slice(location, values)
                    }
                    (VectorDimensions::Three, UniformArrayValues::Float(values)) => {
                        gl.uniform_3_f32_slice(location, values)
                    }
                    (VectorDimensions::Four, UniformArrayValues::Float(values)) => {
                        gl.uniform_4_f32_slice(location, values)
                    }
                    (VectorDimensions::Two, UniformArrayValues::Int(values)) => {
                        gl.uniform_2_i32_slice(location, values)
                    }
                    (VectorDimensions::Three, UniformArrayValues::Int(values)) => {
                        gl.uniform_3_i32_slice(location, values)
                    }
                    (VectorDimensions::Four, UniformArrayValues::Int(values)) => {
                        gl.uniform_4_i32_slice(location, values)
                    }
                    (VectorDimensions::Two, UniformArrayValues::Uint(values)) => {
                        gl.uniform_2_u32_slice(location, values)
                    }
                    (VectorDimensions::Three, UniformArrayValues::Uint(values)) => {
                        gl.uniform_3_u32_slice(location, values)
                    }
                    (VectorDimensions::Four, UniformArrayValues::Uint(values)) => {
                        gl.uniform_4_u32_slice(location, values)
                    }
                },
                UniformWrite::SamplerUnit { unit } => gl.uniform_1_i32(location, unit as i32),
            }
        }
        Ok(())
    }

    fn bind_texture_unit(&mut self, unit: u32, texture: TextureHandle) -> Result<()> {
        let native = self.texture(texture)?;
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(native));
        }
        Ok(())
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        if let Some(native) = self.programs.remove(key_of(program.0)) {
            unsafe { self.gl.delete_program(native) };
        }
    }

    // ===== Framebuffers =====

    fn create_framebuffer(&mut self) -> Result<FramebufferHandle> {
        let framebuffer = unsafe { self.gl.create_framebuffer() }.map_err(Error::BackendError)?;
        let key = self.framebuffers.insert(framebuffer);
        Ok(FramebufferHandle(bits_of(key)))
    }

    fn create_depth_buffer(&mut self, width: u32, height: u32) -> Result<DepthBufferHandle> {
        unsafe {
            let renderbuffer = self
                .gl
                .create_renderbuffer()
                .map_err(Error::BackendError)?;
            self.gl.bind_renderbuffer(glow::RENDERBUFFER, Some(renderbuffer));
            self.gl.renderbuffer_storage(
                glow::RENDERBUFFER,
                glow::DEPTH_COMPONENT32F,
                width as i32,
                height as i32,
            );
            self.gl.bind_renderbuffer(glow::RENDERBUFFER, None);

            let key = self.depth_buffers.insert(renderbuffer);
            Ok(DepthBufferHandle(bits_of(key)))
        }
    }

    fn attach_depth_buffer(
        &mut self,
        framebuffer: FramebufferHandle,
        depth_buffer: DepthBufferHandle,
    ) -> Result<()> {
        let native_framebuffer = self.framebuffer(framebuffer)?;
        let Some(renderbuffer) = self.depth_buffers.get(key_of(depth_buffer.0)).copied() else {
            engine_bail!(LOG_SOURCE, BackendError, "unknown depth buffer handle");
        };
        unsafe {
            self.gl
                .bind_framebuffer(glow::FRAMEBUFFER, Some(native_framebuffer));
            self.gl.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                glow::DEPTH_ATTACHMENT,
                glow::RENDERBUFFER,
                Some(renderbuffer),
            );
        }
        Ok(())
    }

    fn destroy_depth_buffer(&mut self, depth_buffer: DepthBufferHandle) {
        if let Some(renderbuffer) = self.depth_buffers.remove(key_of(depth_buffer.0)) {
            unsafe { self.gl.delete_renderbuffer(renderbuffer) };
        }
    }

    fn attach_color_texture(
        &mut self,
        framebuffer: FramebufferHandle,
        slot: u32,
        texture: TextureHandle,
    ) -> Result<()> {
        let native_framebuffer = self.framebuffer(framebuffer)?;
        let native_texture = self.texture(texture)?;
        unsafe {
            self.gl
                .bind_framebuffer(glow::FRAMEBUFFER, Some(native_framebuffer));
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0 + slot,
                glow::TEXTURE_2D,
                Some(native_texture),
                0,
            );
        }
        Ok(())
    }

    fn set_draw_buffers(&mut self, framebuffer: FramebufferHandle, count: u32) -> Result<()> {
        let native = self.framebuffer(framebuffer)?;
        let buffers: Vec<u32> = (0..count).map(|i| glow::COLOR_ATTACHMENT0 + i).collect();
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(native));
            self.gl.draw_buffers(&buffers);
        }
        Ok(())
    }

    fn framebuffer_complete(&mut self, framebuffer: FramebufferHandle) -> bool {
        let Ok(native) = self.framebuffer(framebuffer) else {
            return false;
        };
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(native));
            self.gl.check_framebuffer_status(glow::FRAMEBUFFER) == glow::FRAMEBUFFER_COMPLETE
        }
    }

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        if let Some(native) = self.framebuffers.remove(key_of(framebuffer.0)) {
            unsafe { self.gl.delete_framebuffer(native) };
        }
    }

    // ===== Render state =====

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) {
        let native = framebuffer.and_then(|handle| self.framebuffer(handle).ok());
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, native) };
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        unsafe { self.gl.viewport(0, 0, width as i32, height as i32) };
    }

    fn set_depth_test(&mut self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(glow::DEPTH_TEST);
            } else {
                self.gl.disable(glow::DEPTH_TEST);
            }
        }
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        unsafe {
            match mode {
                BlendMode::None => self.gl.disable(glow::BLEND),
                BlendMode::Add => {
                    self.gl.enable(glow::BLEND);
                    self.gl.blend_equation(glow::FUNC_ADD);
                    self.gl.blend_func(glow::ONE, glow::ONE);
                }
            }
        }
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        unsafe {
            match mode {
                CullMode::None => self.gl.disable(glow::CULL_FACE),
                CullMode::Front => {
                    self.gl.enable(glow::CULL_FACE);
                    self.gl.cull_face(glow::FRONT);
                }
                CullMode::Back => {
                    self.gl.enable(glow::CULL_FACE);
                    self.gl.cull_face(glow::BACK);
                }
            }
        }
    }

    fn clear(&mut self, values: &ClearValues) {
        unsafe {
            let mut mask = 0u32;
            if let Some([r, g, b, a]) = values.color {
                mask |= glow::COLOR_BUFFER_BIT;
                self.gl.clear_color(r, g, b, a);
            }
            if let Some(depth) = values.depth {
                mask |= glow::DEPTH_BUFFER_BIT;
                self.gl.clear_depth_f32(depth);
            }
            self.gl.clear(mask);
        }
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
        format: &vega_gpu_api::vega::device::NativeTexelFormat,
        destination: &mut [u8],
        destination_offset: usize,
    ) -> Result<()> {
        let native = self.framebuffer(framebuffer)?;
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(native));
            self.gl.read_buffer(glow::COLOR_ATTACHMENT0 + slot);
            self.gl.read_pixels(
                x as i32,
                y as i32,
                width as i32,
                height as i32,
                gl_format::channel_layout(format.channel_layout),
                gl_format::data_type(format.data_type),
                glow::PixelPackData::Slice(Some(&mut destination[destination_offset..])),
            );
        }
        Ok(())
    }
}
