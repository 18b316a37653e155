//! Shader program resource and uniform dispatcher
//!
//! A program is created from vertex/fragment sources plus a declared
//! uniforms layout. Uniform locations for every declared name are resolved
//! once at creation; a missing location is tolerated with a warning (the
//! compiler may have optimized the uniform away) and later writes to it
//! are silently skipped.
//!
//! Binding validates in a fixed order: the name must exist in its
//! namespace, then the value shape must match the declaration, then array
//! values must carry the declared numeric format. Validation failures
//! identify the uniform by name.

use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};

use crate::device::{
    Dimensions, MatrixDimensions, ProgramHandle, RasterDevice, TexelFormat, UniformArrayValues,
    UniformFormat, UniformLocation, UniformWrite, VectorDimensions,
};
use crate::engine_bail;
use crate::engine_warn;
use crate::error::Result;
use crate::resource::texture::Texture2D;

const LOG_SOURCE: &str = "vega::ShaderProgram";

// ============================================================================
// Layout declarations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarUniform {
    pub format: UniformFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorUniform {
    pub format: UniformFormat,
    pub dimensions: VectorDimensions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixUniform {
    /// Declared for schema completeness; matrix writes are always float
    pub format: UniformFormat,
    pub dimensions: MatrixDimensions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerUniform {
    pub dimensions: Dimensions,
    pub format: TexelFormat,
}

/// Declared uniforms of a program, keyed by name within each namespace
///
/// Names must be unique across all namespaces; duplicates are rejected at
/// program creation.
#[derive(Debug, Clone, Default)]
pub struct UniformsLayout {
    pub single_scalars: FxHashMap<String, ScalarUniform>,
    pub single_vectors: FxHashMap<String, VectorUniform>,
    pub single_matrices: FxHashMap<String, MatrixUniform>,
    pub array_scalars: FxHashMap<String, ScalarUniform>,
    pub array_vectors: FxHashMap<String, VectorUniform>,
    pub array_matrices: FxHashMap<String, MatrixUniform>,
    pub samplers: FxHashMap<String, SamplerUniform>,
}

impl UniformsLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_single_scalar(mut self, name: &str, format: UniformFormat) -> Self {
        self.single_scalars
            .insert(name.to_string(), ScalarUniform { format });
        self
    }

    pub fn with_single_vector(
        mut self,
        name: &str,
        format: UniformFormat,
        dimensions: VectorDimensions,
    ) -> Self {
        self.single_vectors
            .insert(name.to_string(), VectorUniform { format, dimensions });
        self
    }

    pub fn with_single_matrix(mut self, name: &str, dimensions: MatrixDimensions) -> Self {
        self.single_matrices.insert(
            name.to_string(),
            MatrixUniform {
                format: UniformFormat::Float,
                dimensions,
            },
        );
        self
    }

    pub fn with_array_scalar(mut self, name: &str, format: UniformFormat) -> Self {
        self.array_scalars
            .insert(name.to_string(), ScalarUniform { format });
        self
    }

    pub fn with_array_vector(
        mut self,
        name: &str,
        format: UniformFormat,
        dimensions: VectorDimensions,
    ) -> Self {
        self.array_vectors
            .insert(name.to_string(), VectorUniform { format, dimensions });
        self
    }

    pub fn with_array_matrix(mut self, name: &str, dimensions: MatrixDimensions) -> Self {
        self.array_matrices.insert(
            name.to_string(),
            MatrixUniform {
                format: UniformFormat::Float,
                dimensions,
            },
        );
        self
    }

    pub fn with_sampler(mut self, name: &str, dimensions: Dimensions, format: TexelFormat) -> Self {
        self.samplers
            .insert(name.to_string(), SamplerUniform { dimensions, format });
        self
    }

    fn declared_names(&self) -> impl Iterator<Item = &String> {
        self.single_scalars
            .keys()
            .chain(self.single_vectors.keys())
            .chain(self.single_matrices.keys())
            .chain(self.array_scalars.keys())
            .chain(self.array_vectors.keys())
            .chain(self.array_matrices.keys())
            .chain(self.samplers.keys())
    }

    fn validate_unique_names(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for name in self.declared_names() {
            if !seen.insert(name.as_str()) {
                engine_bail!(
                    LOG_SOURCE,
                    Validation,
                    "uniform '{}' is declared in more than one namespace",
                    name
                );
            }
        }
        Ok(())
    }
}

// ============================================================================
// Bind requests
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct ScalarBind<'a> {
    pub name: &'a str,
    pub value: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct VectorBind<'a> {
    pub name: &'a str,
    pub value: &'a [f64],
}

#[derive(Debug, Clone, Copy)]
pub struct MatrixBind<'a> {
    pub name: &'a str,
    pub transpose: bool,
    /// Column-major elements, `order * order` of them
    pub value: &'a [f32],
}

#[derive(Debug, Clone, Copy)]
pub struct ScalarArrayBind<'a> {
    pub name: &'a str,
    pub values: UniformArrayValues<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct VectorArrayBind<'a> {
    pub name: &'a str,
    pub values: UniformArrayValues<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct MatrixArrayBind<'a> {
    pub name: &'a str,
    pub transpose: bool,
    pub values: &'a [f32],
}

#[derive(Debug, Clone, Copy)]
pub struct SamplerBind<'a> {
    pub name: &'a str,
    pub texture: &'a Texture2D,
}

/// A batch of uniform writes, grouped by kind
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformBinds<'a> {
    pub single_scalars: &'a [ScalarBind<'a>],
    pub single_vectors: &'a [VectorBind<'a>],
    pub single_matrices: &'a [MatrixBind<'a>],
    pub array_scalars: &'a [ScalarArrayBind<'a>],
    pub array_vectors: &'a [VectorArrayBind<'a>],
    pub array_matrices: &'a [MatrixArrayBind<'a>],
}

// ============================================================================
// Shader program
// ============================================================================

/// A compiled program with its declared layout and cached locations
pub struct ShaderProgram {
    device: Arc<Mutex<dyn RasterDevice>>,
    layout: UniformsLayout,
    handle: Option<ProgramHandle>,
    locations: FxHashMap<String, Option<UniformLocation>>,
}

impl ShaderProgram {
    pub(crate) fn new(
        device: Arc<Mutex<dyn RasterDevice>>,
        vertex_source: &str,
        fragment_source: &str,
        layout: UniformsLayout,
    ) -> Result<Self> {
        layout.validate_unique_names()?;

        let handle;
        let mut locations = FxHashMap::default();
        {
            let mut guard = device.lock().unwrap();
            handle = guard.compile_program(vertex_source, fragment_source)?;
            for name in layout.declared_names() {
                let location = guard.uniform_location(handle, name);
                if location.is_none() {
                    engine_warn!(
                        LOG_SOURCE,
                        "Cannot find the location of uniform '{}'",
                        name
                    );
                }
                locations.insert(name.clone(), location);
            }
        }

        Ok(Self {
            device,
            layout,
            handle: Some(handle),
            locations,
        })
    }

    fn live_handle(&self) -> Result<ProgramHandle> {
        match self.handle {
            Some(handle) => Ok(handle),
            None => engine_bail!(LOG_SOURCE, UseAfterFree, "program used after free"),
        }
    }

    /// Cached location, flattened: `None` if unresolved or undeclared
    fn location(&self, name: &str) -> Option<UniformLocation> {
        self.locations.get(name).copied().flatten()
    }

    /// Make this program current for subsequent draws
    pub fn bind(&self) -> Result<()> {
        let handle = self.live_handle()?;
        self.device.lock().unwrap().use_program(handle)
    }

    /// Validate and write a batch of uniforms
    pub fn set_uniforms(&self, binds: &UniformBinds<'_>) -> Result<()> {
        self.live_handle()?;
        let mut device = self.device.lock().unwrap();

        for bind in binds.single_scalars {
            let Some(declared) = self.layout.single_scalars.get(bind.name) else {
                engine_bail!(LOG_SOURCE, Validation, "unknown scalar uniform '{}'", bind.name);
            };
            if let Some(location) = self.location(bind.name) {
                device.write_uniform(
                    location,
                    &UniformWrite::Scalar {
                        format: declared.format,
                        value: bind.value,
                    },
                )?;
            }
        }

        for bind in binds.single_vectors {
            let Some(declared) = self.layout.single_vectors.get(bind.name) else {
                engine_bail!(LOG_SOURCE, Validation, "unknown vector uniform '{}'", bind.name);
            };
            let expected = declared.dimensions.count();
            if bind.value.len() != expected {
                engine_bail!(
                    LOG_SOURCE,
                    Validation,
                    "vector uniform '{}' expects {} components, got {}",
                    bind.name,
                    expected,
                    bind.value.len()
                );
            }
            if let Some(location) = self.location(bind.name) {
                let mut value = [0f64; 4];
                value[..expected].copy_from_slice(bind.value);
                device.write_uniform(
                    location,
                    &UniformWrite::Vector {
                        format: declared.format,
                        dimensions: declared.dimensions,
                        value,
                    },
                )?;
            }
        }

        for bind in binds.single_matrices {
            let Some(declared) = self.layout.single_matrices.get(bind.name) else {
                engine_bail!(LOG_SOURCE, Validation, "unknown matrix uniform '{}'", bind.name);
            };
            let expected = declared.dimensions.element_count();
            if bind.value.len() != expected {
                engine_bail!(
                    LOG_SOURCE,
                    Validation,
                    "matrix uniform '{}' expects {} elements, got {}",
                    bind.name,
                    expected,
                    bind.value.len()
                );
            }
            if let Some(location) = self.location(bind.name) {
                device.write_uniform(
                    location,
                    &UniformWrite::Matrix {
                        dimensions: declared.dimensions,
                        transpose: bind.transpose,
                        values: bind.value,
                    },
                )?;
            }
        }

        for bind in binds.array_scalars {
            let Some(declared) = self.layout.array_scalars.get(bind.name) else {
                engine_bail!(
                    LOG_SOURCE,
                    Validation,
                    "unknown scalar array uniform '{}'",
                    bind.name
                );
            };
            if bind.values.format() != declared.format {
                engine_bail!(
                    LOG_SOURCE,
                    Validation,
                    "scalar array uniform '{}' declared as {:?}, got {:?} values",
                    bind.name,
                    declared.format,
                    bind.values.format()
                );
            }
            if let Some(location) = self.location(bind.name) {
                device.write_uniform(location, &UniformWrite::ScalarArray { values: bind.values })?;
            }
        }

        for bind in binds.array_vectors {
            let Some(declared) = self.layout.array_vectors.get(bind.name) else {
                engine_bail!(
                    LOG_SOURCE,
                    Validation,
                    "unknown vector array uniform '{}'",
                    bind.name
                );
            };
            let arity = declared.dimensions.count();
            if bind.values.len() % arity != 0 {
                engine_bail!(
                    LOG_SOURCE,
                    Validation,
                    "vector array uniform '{}' expects a multiple of {} values, got {}",
                    bind.name,
                    arity,
                    bind.values.len()
                );
            }
            if bind.values.format() != declared.format {
                engine_bail!(
                    LOG_SOURCE,
                    Validation,
                    "vector array uniform '{}' declared as {:?}, got {:?} values",
                    bind.name,
                    declared.format,
                    bind.values.format()
                );
            }
            if let Some(location) = self.location(bind.name) {
                device.write_uniform(
                    location,
                    &UniformWrite::VectorArray {
                        dimensions: declared.dimensions,
                        values: bind.values,
                    },
                )?;
            }
        }

        for bind in binds.array_matrices {
            let Some(declared) = self.layout.array_matrices.get(bind.name) else {
                engine_bail!(
                    LOG_SOURCE,
                    Validation,
                    "unknown matrix array uniform '{}'",
                    bind.name
                );
            };
            let arity = declared.dimensions.element_count();
            if bind.values.len() % arity != 0 {
                engine_bail!(
                    LOG_SOURCE,
                    Validation,
                    "matrix array uniform '{}' expects a multiple of {} elements, got {}",
                    bind.name,
                    arity,
                    bind.values.len()
                );
            }
            if let Some(location) = self.location(bind.name) {
                device.write_uniform(
                    location,
                    &UniformWrite::MatrixArray {
                        dimensions: declared.dimensions,
                        transpose: bind.transpose,
                        values: bind.values,
                    },
                )?;
            }
        }

        Ok(())
    }

    /// Bind textures to consecutive units 0..N-1 and point samplers at them
    pub fn set_samplers_array(&self, binds: &[SamplerBind<'_>]) -> Result<()> {
        self.live_handle()?;
        for (unit, bind) in binds.iter().enumerate() {
            self.write_sampler(unit as u32, bind)?;
        }
        Ok(())
    }

    /// Bind one texture to an explicit unit and point its sampler at it
    pub fn set_sampler(&self, unit: u32, bind: &SamplerBind<'_>) -> Result<()> {
        self.live_handle()?;
        self.write_sampler(unit, bind)
    }

    fn write_sampler(&self, unit: u32, bind: &SamplerBind<'_>) -> Result<()> {
        if !self.layout.samplers.contains_key(bind.name) {
            engine_bail!(LOG_SOURCE, Validation, "unknown sampler uniform '{}'", bind.name);
        }
        let texture = bind.texture.handle()?;
        let mut device = self.device.lock().unwrap();
        device.bind_texture_unit(unit, texture)?;
        if let Some(location) = self.location(bind.name) {
            device.write_uniform(location, &UniformWrite::SamplerUnit { unit })?;
        }
        Ok(())
    }

    /// Release the native program; repeated calls are no-ops
    pub fn free(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.device.lock().unwrap().destroy_program(handle);
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        self.free();
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
