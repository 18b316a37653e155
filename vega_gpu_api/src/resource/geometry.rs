//! Geometry resource
//!
//! Owns one native vertex array created from an interleaved buffer and a
//! layout. The buffer length is validated against the layout's stride
//! before anything is uploaded.

use std::sync::{Arc, Mutex};

use crate::device::{plan_layout, vertex_count_for, GeometryLayout, RasterDevice, VertexArrayHandle};
use crate::engine_bail;
use crate::error::Result;

const LOG_SOURCE: &str = "vega::Geometry";

struct LiveGeometry {
    vertex_array: VertexArrayHandle,
    vertex_count: u32,
}

/// A drawable vertex buffer with a fixed interleaved layout
pub struct Geometry {
    device: Arc<Mutex<dyn RasterDevice>>,
    live: Option<LiveGeometry>,
}

impl Geometry {
    pub(crate) fn new(
        device: Arc<Mutex<dyn RasterDevice>>,
        layout: &GeometryLayout,
        data: &[u8],
    ) -> Result<Self> {
        let plan = plan_layout(layout)?;
        let vertex_count = vertex_count_for(&plan, data.len())?;
        let vertex_array = device.lock().unwrap().create_vertex_array(&plan, data)?;
        Ok(Self {
            device,
            live: Some(LiveGeometry {
                vertex_array,
                vertex_count,
            }),
        })
    }

    /// Vertex count, `None` once freed
    pub fn vertex_count(&self) -> Option<u32> {
        self.live.as_ref().map(|live| live.vertex_count)
    }

    /// Draw the whole buffer as triangles
    pub fn draw(&self) -> Result<()> {
        match &self.live {
            Some(live) => self
                .device
                .lock()
                .unwrap()
                .draw_triangles(live.vertex_array, live.vertex_count),
            None => engine_bail!(LOG_SOURCE, UseAfterFree, "draw after free"),
        }
    }

    /// Release the native vertex array; repeated calls are no-ops
    pub fn free(&mut self) {
        if let Some(live) = self.live.take() {
            self.device
                .lock()
                .unwrap()
                .destroy_vertex_array(live.vertex_array);
        }
    }
}

impl Drop for Geometry {
    fn drop(&mut self) {
        self.free();
    }
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
