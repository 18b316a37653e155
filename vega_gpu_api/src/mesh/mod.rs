//! Mesh import pipeline
//!
//! - **face_file**: line-oriented parser for the `v`/`vt`/`vn`/`f` text format
//! - **intermediate**: triangle-list vertex data with tangent-space derivation
//! - **full_screen_quad**: the canonical clip-space quad for post-process passes

mod face_file;
mod full_screen_quad;
mod intermediate;

pub use face_file::{parse_face_file, FaceFileData};
pub use full_screen_quad::full_screen_quad_data;
pub use intermediate::{MeshIntermediate, MeshVertex};
