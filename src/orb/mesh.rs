//! Subdivided icosahedral mesh with radial noise deformation.

use std::collections::{HashMap, HashSet};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::noise_field::NoiseField;
use crate::params::{OrbGeometry, RadiusClamp};

/// Vertex data for the orb mesh (position + outward normal)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Subdivided icosahedron centered at the origin.
///
/// Topology (triangles, wireframe edges) is fixed at construction; only
/// vertex positions change across frames. Because the base shape is centered
/// at the origin, each vertex normal is simply its unit direction from
/// center, which is also the axis it is displaced along.
pub struct OrbMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Deduplicated edge pairs for line-list wireframe rendering
    pub edge_indices: Vec<u32>,
    /// Unit direction of each vertex from the mesh center (immutable)
    directions: Vec<Vec3>,
    base_radius: f32,
}

impl OrbMesh {
    /// Build an icosphere with the given base radius and subdivision level.
    ///
    /// Vertex count is `10 * 4^detail + 2` (detail 3 = 642 vertices).
    pub fn new(geometry: &OrbGeometry) -> Self {
        let (mut positions, mut indices) = icosahedron();

        for _ in 0..geometry.detail {
            subdivide(&mut positions, &mut indices);
        }

        let directions: Vec<Vec3> = positions.iter().map(|p| p.normalize()).collect();

        let vertices = directions
            .iter()
            .map(|dir| Vertex {
                position: (*dir * geometry.base_radius).to_array(),
                normal: dir.to_array(),
            })
            .collect();

        let edge_indices = unique_edges(&indices);

        Self {
            vertices,
            indices,
            edge_indices,
            directions,
            base_radius: geometry.base_radius,
        }
    }

    pub fn base_radius(&self) -> f32 {
        self.base_radius
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Displace every vertex along its own direction from center.
    ///
    /// New radius per vertex is `base_radius + bass + noise * treble`:
    /// bass pushes the whole surface outward uniformly, treble gates how
    /// much of the noise field shows through. The clamp policy bounds the
    /// result to keep distortion watchable. No vertex depends on any other,
    /// so the pass is trivially parallel if it ever needs to be.
    ///
    /// `time_ms` must be wall-clock elapsed milliseconds, not a frame
    /// count, so deformation speed is independent of frame rate.
    pub fn deform(
        &mut self,
        bass: f32,
        treble: f32,
        time_ms: f32,
        field: &NoiseField,
        clamp: &RadiusClamp,
    ) {
        for (vertex, dir) in self.vertices.iter_mut().zip(&self.directions) {
            let noise = field.sample(*dir, time_ms);
            let radius = clamp.apply(self.base_radius, self.base_radius + bass + noise * treble);

            vertex.position = (*dir * radius).to_array();
            vertex.normal = dir.to_array();
        }
    }
}

/// Unit-ish icosahedron: 12 vertices, 20 faces
fn icosahedron() -> (Vec<Vec3>, Vec<u32>) {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;

    let positions = vec![
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ];

    let indices = vec![
        0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, //
        1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7, 1, 8, //
        3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, //
        4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9, 8, 1,
    ];

    (positions, indices)
}

/// Split every triangle into four, deduplicating midpoints across edges
fn subdivide(positions: &mut Vec<Vec3>, indices: &mut Vec<u32>) {
    let mut midpoint_cache: HashMap<(u32, u32), u32> = HashMap::new();
    let mut new_indices = Vec::with_capacity(indices.len() * 4);

    let mut midpoint = |a: u32, b: u32, positions: &mut Vec<Vec3>| -> u32 {
        let key = if a < b { (a, b) } else { (b, a) };
        *midpoint_cache.entry(key).or_insert_with(|| {
            let mid = (positions[a as usize] + positions[b as usize]) / 2.0;
            positions.push(mid);
            (positions.len() - 1) as u32
        })
    };

    for tri in indices.chunks(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        let ab = midpoint(a, b, positions);
        let bc = midpoint(b, c, positions);
        let ca = midpoint(c, a, positions);

        new_indices.extend_from_slice(&[a, ab, ca, b, bc, ab, c, ca, bc, ab, bc, ca]);
    }

    *indices = new_indices;
}

/// Collect each triangle edge exactly once, as line-list index pairs
fn unique_edges(indices: &[u32]) -> Vec<u32> {
    let mut seen: HashSet<(u32, u32)> = HashSet::new();
    let mut edges = Vec::new();

    for tri in indices.chunks(3) {
        for &(a, b) in &[(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            let key = if a < b { (a, b) } else { (b, a) };
            if seen.insert(key) {
                edges.extend_from_slice(&[a, b]);
            }
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::NoiseParams;

    fn geometry(detail: u32) -> OrbGeometry {
        OrbGeometry {
            base_radius: 10.0,
            detail,
        }
    }

    fn radius(vertex: &Vertex) -> f32 {
        Vec3::from_array(vertex.position).length()
    }

    #[test]
    fn test_icosphere_counts_per_detail_level() {
        for detail in 0..4u32 {
            let mesh = OrbMesh::new(&geometry(detail));
            let faces = 20 * 4usize.pow(detail);

            // Euler: V = 10 * 4^d + 2, E = 30 * 4^d
            assert_eq!(mesh.vertex_count(), 10 * 4usize.pow(detail) + 2);
            assert_eq!(mesh.indices.len(), faces * 3);
            assert_eq!(mesh.edge_indices.len(), 30 * 4usize.pow(detail) * 2);
        }
    }

    #[test]
    fn test_base_mesh_vertices_sit_on_sphere() {
        let mesh = OrbMesh::new(&geometry(3));
        for vertex in &mesh.vertices {
            assert!((radius(vertex) - 10.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_deform_with_zero_noise_and_modulation_is_identity() {
        let mut mesh = OrbMesh::new(&geometry(2));
        let field = NoiseField::new(NoiseParams {
            intensity: 0.0,
            seed: Some(7),
            ..Default::default()
        });

        mesh.deform(0.0, 0.0, 5000.0, &field, &RadiusClamp::default());

        for vertex in &mesh.vertices {
            assert!((radius(vertex) - 10.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_treble_gates_noise_contribution() {
        // Intensity 5 but treble 0: the noise term is multiplied away and
        // every vertex lands back at exactly the base radius.
        let mut mesh = OrbMesh::new(&geometry(2));
        let field = NoiseField::new(NoiseParams {
            intensity: 5.0,
            seed: Some(7),
            ..Default::default()
        });

        mesh.deform(0.0, 0.0, 5000.0, &field, &RadiusClamp::default());

        for vertex in &mesh.vertices {
            assert!((radius(vertex) - 10.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_deformed_radii_respect_clamp_bounds() {
        let mut mesh = OrbMesh::new(&geometry(2));
        let field = NoiseField::new(NoiseParams {
            intensity: 5.0,
            seed: Some(7),
            ..Default::default()
        });
        let clamp = RadiusClamp::default();

        // Extreme modulation still stays within [0.5R, 1.5R]
        mesh.deform(40.0, 30.0, 1234.0, &field, &clamp);

        for vertex in &mesh.vertices {
            let r = radius(vertex);
            assert!(r >= 5.0 - 1e-4 && r <= 15.0 + 1e-4);
        }
    }

    #[test]
    fn test_deform_preserves_topology() {
        let mut mesh = OrbMesh::new(&geometry(2));
        let indices_before = mesh.indices.clone();
        let edges_before = mesh.edge_indices.clone();
        let field = NoiseField::new(NoiseParams {
            seed: Some(7),
            ..Default::default()
        });

        mesh.deform(3.0, 2.0, 250.0, &field, &RadiusClamp::default());

        assert_eq!(mesh.indices, indices_before);
        assert_eq!(mesh.edge_indices, edges_before);
    }

    #[test]
    fn test_deform_displaces_along_vertex_direction() {
        let mut mesh = OrbMesh::new(&geometry(1));
        let directions: Vec<Vec3> = mesh
            .vertices
            .iter()
            .map(|v| Vec3::from_array(v.position).normalize())
            .collect();
        let field = NoiseField::new(NoiseParams {
            seed: Some(7),
            ..Default::default()
        });

        mesh.deform(2.0, 3.0, 777.0, &field, &RadiusClamp::default());

        for (vertex, dir) in mesh.vertices.iter().zip(&directions) {
            let new_dir = Vec3::from_array(vertex.position).normalize();
            assert!(new_dir.dot(*dir) > 0.9999);
        }
    }
}
