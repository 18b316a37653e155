//! Unit tests for the intermediate mesh representation

use super::*;

const EPSILON: f32 = 1e-5;

fn assert_vec3_eq(actual: Vec3, expected: Vec3) {
    assert!(
        (actual - expected).length() < EPSILON,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

/// Unit triangle in the xy plane with identity-ish uv mapping
fn xy_triangle() -> Vec<MeshVertex> {
    vec![
        MeshVertex::new(Vec3::new(0.0, 0.0, 0.0), Vec2::new(0.0, 0.0), Vec3::Z),
        MeshVertex::new(Vec3::new(1.0, 0.0, 0.0), Vec2::new(1.0, 0.0), Vec3::Z),
        MeshVertex::new(Vec3::new(0.0, 1.0, 0.0), Vec2::new(0.0, 1.0), Vec3::Z),
    ]
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_partial_triangles_are_rejected() {
    let mut vertices = xy_triangle();
    vertices.pop();
    let result = MeshIntermediate::new(vertices);
    assert!(result.is_err());
}

#[test]
fn test_empty_mesh_is_legal() {
    let mesh = MeshIntermediate::new(Vec::new()).unwrap();
    assert_eq!(mesh.triangle_count(), 0);
}

// ============================================================================
// Tangents
// ============================================================================

#[test]
fn test_tangent_of_axis_aligned_triangle() {
    // With uv = position.xy, the raw tangent is +X; the published tangent
    // is negated after orthogonalization, and the frame is right-handed.
    let mesh = MeshIntermediate::new(xy_triangle()).unwrap();
    for vertex in &mesh.vertices {
        assert_vec3_eq(vertex.tangent.truncate(), Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(vertex.tangent.w, 1.0);
    }
}

#[test]
fn test_mirrored_uv_flips_handedness() {
    // Mirror u: the bitangent flips side, so w flips sign.
    let mut vertices = xy_triangle();
    for vertex in &mut vertices {
        vertex.uv.x = -vertex.uv.x;
    }
    let mesh = MeshIntermediate::new(vertices).unwrap();
    for vertex in &mesh.vertices {
        assert_vec3_eq(vertex.tangent.truncate(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(vertex.tangent.w, -1.0);
    }
}

#[test]
fn test_tangents_are_unit_length_and_orthogonal_to_normals() {
    let vertices = vec![
        MeshVertex::new(Vec3::new(0.0, 0.0, 1.0), Vec2::new(0.1, 0.2), Vec3::Y),
        MeshVertex::new(Vec3::new(2.0, 0.0, 0.5), Vec2::new(0.9, 0.3), Vec3::Y),
        MeshVertex::new(Vec3::new(1.0, 0.0, -1.0), Vec2::new(0.4, 0.8), Vec3::Y),
    ];
    let mesh = MeshIntermediate::new(vertices).unwrap();
    for vertex in &mesh.vertices {
        let tangent = vertex.tangent.truncate();
        assert!((tangent.length() - 1.0).abs() < EPSILON);
        assert!(tangent.dot(vertex.normal).abs() < EPSILON);
        assert!(vertex.tangent.w == 1.0 || vertex.tangent.w == -1.0);
    }
}

#[test]
fn test_recalculating_tangents_is_idempotent() {
    let mut mesh = MeshIntermediate::new(xy_triangle()).unwrap();
    let first: Vec<Vec4> = mesh.vertices.iter().map(|v| v.tangent).collect();
    mesh.recalculate_tangents();
    for (vertex, expected) in mesh.vertices.iter().zip(first) {
        assert!((vertex.tangent - expected).length() < EPSILON);
    }
}

#[test]
fn test_degenerate_uv_produces_non_finite_tangent() {
    // All three vertices share one uv; the uv edge matrix is singular and
    // there is deliberately no epsilon guard.
    let vertices = vec![
        MeshVertex::new(Vec3::new(0.0, 0.0, 0.0), Vec2::new(0.5, 0.5), Vec3::Z),
        MeshVertex::new(Vec3::new(1.0, 0.0, 0.0), Vec2::new(0.5, 0.5), Vec3::Z),
        MeshVertex::new(Vec3::new(0.0, 1.0, 0.0), Vec2::new(0.5, 0.5), Vec3::Z),
    ];
    let mesh = MeshIntermediate::new(vertices).unwrap();
    assert!(!mesh.vertices[0].tangent.truncate().is_finite());
}

// ============================================================================
// Flat normals
// ============================================================================

#[test]
fn test_flat_normals_use_face_winding() {
    let mut vertices = xy_triangle();
    // Garbage normals to prove they get replaced
    for vertex in &mut vertices {
        vertex.normal = Vec3::new(0.3, 0.7, 0.1);
    }
    let mut mesh = MeshIntermediate::new(vertices).unwrap();
    mesh.recalculate_normals_flat();

    for vertex in &mesh.vertices {
        assert_vec3_eq(vertex.normal, Vec3::Z);
        // Tangents were re-derived against the new normals
        assert_vec3_eq(vertex.tangent.truncate(), Vec3::new(-1.0, 0.0, 0.0));
    }
}

// ============================================================================
// Interleaving
// ============================================================================

#[test]
fn test_vertex_data_is_twelve_floats_per_vertex() {
    let mesh = MeshIntermediate::new(xy_triangle()).unwrap();
    let (data, layout) = mesh.to_vertex_data();
    assert_eq!(data.len(), 3 * 12 * 4);
    assert_eq!(layout.attributes.len(), 4);

    let floats: &[f32] = bytemuck::cast_slice(&data);
    // First vertex: position
    assert_eq!(&floats[0..3], &[0.0, 0.0, 0.0]);
    // uv
    assert_eq!(&floats[3..5], &[0.0, 0.0]);
    // normal
    assert_eq!(&floats[5..8], &[0.0, 0.0, 1.0]);
    // tangent xyz + handedness
    assert_eq!(floats[11], 1.0);
}

#[test]
fn test_vertex_data_layout_matches_stride() {
    use crate::device::plan_layout;
    let mesh = MeshIntermediate::new(xy_triangle()).unwrap();
    let (data, layout) = mesh.to_vertex_data();
    let plan = plan_layout(&layout).unwrap();
    assert_eq!(plan.stride, 48);
    assert_eq!(data.len() % plan.stride as usize, 0);
}
