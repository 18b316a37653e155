//! Asset acquisition
//!
//! The crate never fetches or decodes anything itself. Consumers implement
//! `AssetSource` over whatever transport they have (filesystem, HTTP,
//! archive) and hand back text or decoded RGBA8 images. Acquisition is
//! resolve-or-fail; there is no cancellation.

use crate::engine_bail;
use crate::error::Result;
use crate::resource::DecodedImage;

const LOG_SOURCE: &str = "vega::Assets";

/// Provider of asset bytes, implemented by the consumer
pub trait AssetSource: Send + Sync {
    /// Load a text asset (face files, shader sources)
    fn load_text(&self, path: &str) -> Result<String>;

    /// Load and decode an image asset to tightly packed RGBA8
    fn load_image(&self, path: &str) -> Result<DecodedImage>;
}

/// Reject text bodies that are HTML error pages
///
/// Servers answer missing assets with 404 pages; feeding one to the mesh
/// or shader parsers would produce garbage far from the actual cause.
pub(crate) fn reject_html_error_page(path: &str, body: &str) -> Result<()> {
    let head: String = body
        .trim_start()
        .chars()
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    if head.starts_with("<!doctype") || head.starts_with("<html") {
        engine_bail!(
            LOG_SOURCE,
            AssetLoad,
            "'{}' returned an HTML document instead of asset data",
            path
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "assets_tests.rs"]
mod tests;
