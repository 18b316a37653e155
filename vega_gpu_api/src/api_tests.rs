//! Unit tests for the top-level API

use super::*;
use crate::device::mock_device::MockRasterDevice;
use crate::device::{Dimensions, TexelFormat};
use crate::error::Error;
use crate::resource::DecodedImage;
use rustc_hash::FxHashMap;

// ============================================================================
// In-memory asset source
// ============================================================================

#[derive(Default)]
struct MemoryAssets {
    texts: FxHashMap<String, String>,
    images: FxHashMap<String, DecodedImage>,
}

impl AssetSource for MemoryAssets {
    fn load_text(&self, path: &str) -> Result<String> {
        match self.texts.get(path) {
            Some(text) => Ok(text.clone()),
            None => Err(Error::AssetLoad(format!("no such asset '{}'", path))),
        }
    }

    fn load_image(&self, path: &str) -> Result<DecodedImage> {
        match self.images.get(path) {
            Some(image) => Ok(image.clone()),
            None => Err(Error::AssetLoad(format!("no such asset '{}'", path))),
        }
    }
}

fn mock_device() -> Arc<Mutex<MockRasterDevice>> {
    Arc::new(Mutex::new(MockRasterDevice::new()))
}

fn api_with(device: &Arc<Mutex<MockRasterDevice>>, assets: MemoryAssets) -> GpuApi {
    GpuApi::new(device.clone(), Arc::new(assets), 640, 480, true).unwrap()
}

const TRIANGLE_OBJ: &str = "\
o Tri
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
";

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_missing_float_target_capability_is_fatal() {
    let device = mock_device();
    device.lock().unwrap().capabilities.float_color_targets = false;
    let result = GpuApi::new(
        device.clone(),
        Arc::new(MemoryAssets::default()),
        640,
        480,
        true,
    );
    assert!(matches!(result, Err(Error::MissingCapability(_))));
}

#[test]
fn test_construction_enables_back_face_culling() {
    let device = mock_device();
    let _api = api_with(&device, MemoryAssets::default());
    assert_eq!(device.lock().unwrap().cull_modes, vec![CullMode::Back]);
}

// ============================================================================
// Global state
// ============================================================================

#[test]
fn test_blend_and_cull_modes_are_forwarded() {
    let device = mock_device();
    let api = api_with(&device, MemoryAssets::default());
    api.set_blending(BlendMode::Add);
    api.set_blending(BlendMode::None);
    api.set_cull_face(CullMode::None);

    let mock = device.lock().unwrap();
    assert_eq!(mock.blend_modes, vec![BlendMode::Add, BlendMode::None]);
    assert_eq!(mock.cull_modes, vec![CullMode::Back, CullMode::None]);
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_load_geometry_parses_and_uploads() {
    let device = mock_device();
    let mut assets = MemoryAssets::default();
    assets
        .texts
        .insert("tri.obj".to_string(), TRIANGLE_OBJ.to_string());
    let api = api_with(&device, assets);

    let geometry = api.load_geometry("tri.obj").unwrap();
    assert_eq!(geometry.vertex_count(), Some(3));

    let mock = device.lock().unwrap();
    let uploaded = mock.vertex_arrays.values().next().unwrap();
    assert_eq!(uploaded.stride, 48);
    assert_eq!(uploaded.data_len, 3 * 48);
}

#[test]
fn test_load_geometry_rejects_html_error_page() {
    let device = mock_device();
    let mut assets = MemoryAssets::default();
    assets.texts.insert(
        "tri.obj".to_string(),
        "<!doctype html><html>404</html>".to_string(),
    );
    let api = api_with(&device, assets);

    assert!(matches!(
        api.load_geometry("tri.obj"),
        Err(Error::AssetLoad(_))
    ));
}

#[test]
fn test_load_geometry_missing_asset() {
    let device = mock_device();
    let api = api_with(&device, MemoryAssets::default());
    assert!(matches!(
        api.load_geometry("absent.obj"),
        Err(Error::AssetLoad(_))
    ));
}

#[test]
fn test_full_screen_quad_is_six_vertices() {
    let device = mock_device();
    let api = api_with(&device, MemoryAssets::default());
    let quad = api.create_full_screen_quad().unwrap();
    assert_eq!(quad.vertex_count(), Some(6));
    let mock = device.lock().unwrap();
    assert_eq!(mock.vertex_arrays.values().next().unwrap().stride, 16);
}

// ============================================================================
// Shaders and textures
// ============================================================================

#[test]
fn test_load_shader_pulls_both_stages() {
    let device = mock_device();
    let mut assets = MemoryAssets::default();
    assets
        .texts
        .insert("a.vert".to_string(), "void main_vs() {}".to_string());
    assets
        .texts
        .insert("a.frag".to_string(), "void main_fs() {}".to_string());
    let api = api_with(&device, assets);

    let _shader = api
        .load_shader("a.vert", "a.frag", UniformsLayout::new())
        .unwrap();
    let mock = device.lock().unwrap();
    let program = mock.programs.values().next().unwrap();
    assert_eq!(program.vertex_source, "void main_vs() {}");
    assert_eq!(program.fragment_source, "void main_fs() {}");
}

#[test]
fn test_load_shader_rejects_html_stage() {
    let device = mock_device();
    let mut assets = MemoryAssets::default();
    assets
        .texts
        .insert("a.vert".to_string(), "<html>503</html>".to_string());
    assets
        .texts
        .insert("a.frag".to_string(), "void main_fs() {}".to_string());
    let api = api_with(&device, assets);

    assert!(matches!(
        api.load_shader("a.vert", "a.frag", UniformsLayout::new()),
        Err(Error::AssetLoad(_))
    ));
}

#[test]
fn test_load_texture_uses_image_dimensions() {
    let device = mock_device();
    let mut assets = MemoryAssets::default();
    assets.images.insert(
        "albedo.png".to_string(),
        DecodedImage {
            width: 4,
            height: 2,
            pixels: vec![128u8; 32],
        },
    );
    let api = api_with(&device, assets);

    let texture = api
        .load_texture_2d("albedo.png", LoadTextureParameters::default())
        .unwrap();
    assert_eq!(texture.parameters().width, 4);
    assert_eq!(texture.parameters().height, 2);
    assert_eq!(texture.parameters().dimensions, Dimensions::Four);
    assert_eq!(texture.parameters().format, TexelFormat::Uint8);
}

#[test]
fn test_create_texture_validates_data_size() {
    let device = mock_device();
    let api = api_with(&device, MemoryAssets::default());
    let parameters = TextureParameters::new(2, 2, Dimensions::Four, TexelFormat::Uint8);
    assert!(matches!(
        api.create_texture_2d(parameters, Some(&[0u8; 3])),
        Err(Error::Validation(_))
    ));
}

// ============================================================================
// Framebuffers
// ============================================================================

#[test]
fn test_default_framebuffer_tracks_resize() {
    let device = mock_device();
    let mut api = api_with(&device, MemoryAssets::default());
    assert_eq!(api.default_framebuffer().size(), (640, 480));
    api.resize_default_framebuffer(1920, 1080);
    assert_eq!(api.default_framebuffer().size(), (1920, 1080));
}

#[test]
fn test_create_framebuffer_with_depth() {
    let device = mock_device();
    let api = api_with(&device, MemoryAssets::default());
    let _framebuffer = api.create_framebuffer(256, 256, true).unwrap();
    let mock = device.lock().unwrap();
    assert_eq!(mock.framebuffers.len(), 1);
    assert_eq!(mock.depth_buffers.len(), 1);
}
