/*!
# Vega GPU API - OpenGL device

Implements `vega_gpu_api::vega::RasterDevice` over an OpenGL 3.3+/ES 3.0
context through the `glow` bindings. The caller owns context and surface
creation (windowing, swap); this crate only needs the loaded function
pointers:

```no_run
# fn load(_s: &str) -> *const core::ffi::c_void { std::ptr::null() }
use vega_gpu_api_device_gl::GlDevice;

let gl = unsafe { glow::Context::from_loader_function(load) };
let device = GlDevice::new(gl).unwrap();
```

Native GL objects live in `slotmap` arenas; the opaque `u64` handles the
core crate passes around are the slotmap keys' FFI representation.
*/

mod gl_device;
mod gl_format;

pub use gl_device::GlDevice;
