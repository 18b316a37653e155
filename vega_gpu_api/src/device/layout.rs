//! Vertex layout planning
//!
//! Turns an ordered attribute list into a concrete interleaved layout:
//! per-attribute byte offsets (prefix sums) and the total vertex stride.
//! Buffer lengths validate against the stride before any native object
//! is created.

use crate::device::format::{map_vertex_element, Dimensions, NativeDataType, TexelFormat};
use crate::engine_bail;
use crate::error::Result;

const LOG_SOURCE: &str = "vega::VertexLayout";

/// One attribute of an interleaved vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub format: TexelFormat,
    pub dimensions: Dimensions,
    /// Integer formats are exposed to shaders as floats in -1..1 or 0..1
    pub normalize: bool,
}

/// Ordered attribute list describing one interleaved vertex buffer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeometryLayout {
    pub attributes: Vec<VertexAttribute>,
}

/// One attribute with its resolved native type and byte placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedAttribute {
    pub offset: u32,
    pub dimensions: Dimensions,
    pub normalize: bool,
    pub data_type: NativeDataType,
    pub byte_size: u32,
}

/// Fully resolved interleaved layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayoutPlan {
    /// Total byte size of one vertex
    pub stride: u32,
    pub attributes: Vec<PlannedAttribute>,
}

/// Resolve attribute offsets and the vertex stride for a layout
pub fn plan_layout(layout: &GeometryLayout) -> Result<VertexLayoutPlan> {
    if layout.attributes.is_empty() {
        engine_bail!(LOG_SOURCE, Validation, "geometry layout has no attributes");
    }

    let mut attributes = Vec::with_capacity(layout.attributes.len());
    let mut cursor = 0u32;
    for attribute in &layout.attributes {
        let element = map_vertex_element(attribute.dimensions, attribute.format);
        attributes.push(PlannedAttribute {
            offset: cursor,
            dimensions: attribute.dimensions,
            normalize: attribute.normalize,
            data_type: element.data_type,
            byte_size: element.byte_size,
        });
        cursor += element.byte_size;
    }

    Ok(VertexLayoutPlan {
        stride: cursor,
        attributes,
    })
}

/// Validate a buffer length against a plan and derive the vertex count
pub fn vertex_count_for(plan: &VertexLayoutPlan, byte_length: usize) -> Result<u32> {
    let stride = plan.stride as usize;
    if byte_length % stride != 0 {
        engine_bail!(
            LOG_SOURCE,
            Validation,
            "invalid vertex data: buffer length {} is not a multiple of vertex stride {}",
            byte_length,
            stride
        );
    }
    Ok((byte_length / stride) as u32)
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
