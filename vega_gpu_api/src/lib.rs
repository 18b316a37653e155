/*!
# Vega GPU API

Backend-agnostic raster GPU device abstraction.

This crate provides the platform-agnostic API for raster graphics using
trait-based dynamic polymorphism. Backend implementations (OpenGL, and
potentially others) provide a concrete `RasterDevice` behind the same trait.

## Architecture

- **RasterDevice**: capability trait every backend implements
- **GpuApi**: top-level factory for typed resources
- **Geometry / Texture2D / ShaderProgram / Framebuffers**: typed resources,
  each owning exactly one native handle
- **Mesh import**: face-file parsing, tangent-space derivation, interleaving

Backend crates provide concrete device types that implement `RasterDevice`.
*/

// Internal modules
mod error;
pub mod api;
pub mod assets;
pub mod device;
pub mod log;
pub mod mesh;
pub mod resource;

// Main vega namespace module
pub mod vega {
    // Error types
    pub use crate::error::{Error, Result};

    // Top-level API
    pub use crate::api::GpuApi;

    // Device abstraction
    pub use crate::device::RasterDevice;

    // Logging sub-module; the engine_* macros live at the crate root
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
    }

    // Device sub-module with handle, format and layout types
    pub mod device {
        pub use crate::device::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Mesh import sub-module
    pub mod mesh {
        pub use crate::mesh::*;
    }

    // Asset acquisition
    pub mod assets {
        pub use crate::assets::*;
    }
}

// Re-export math library at crate root
pub use glam;
