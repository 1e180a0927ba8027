// mesh.rs — UV sphere mesh generator
//
// Rows run from the north pole (stack 0) to the south pole (stack `stacks`),
// columns run around the equator with one duplicated seam column, so the
// vertex at (stack, slice) lives at index `stack * (slices + 1) + slice`.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use log::debug;

use crate::error::ConfigurationError;

pub const MIN_STACKS: u32 = 2;
pub const MIN_SLICES: u32 = 3;

/// Tessellation and size of the sphere. Only constructible through [`SphereSpec::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereSpec {
    stacks: u32,
    slices: u32,
    radius: f32,
}

impl SphereSpec {
    pub fn new(stacks: u32, slices: u32, radius: f32) -> Result<Self, ConfigurationError> {
        if stacks < MIN_STACKS {
            return Err(ConfigurationError::TooFewStacks(stacks));
        }
        if slices < MIN_SLICES {
            return Err(ConfigurationError::TooFewSlices(slices));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ConfigurationError::InvalidRadius(radius));
        }

        // Vertex indices and the index count are both u32 on the GPU.
        let (vertices, triangles) = mesh_size(stacks, slices);
        if vertices > u128::from(u32::MAX) || triangles * 3 > u128::from(u32::MAX) {
            return Err(ConfigurationError::InvalidValue {
                key: "stacks x slices".to_string(),
                value: format!("{stacks} x {slices} ({vertices} vertices, {triangles} triangles)"),
            });
        }

        Ok(Self {
            stacks,
            slices,
            radius,
        })
    }

    pub fn stacks(&self) -> u32 {
        self.stacks
    }

    pub fn slices(&self) -> u32 {
        self.slices
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Same radius and stacks:slices ratio, twice as many of each.
    pub fn refined(&self) -> Result<Self, ConfigurationError> {
        let double = |n: u32, key: &str| {
            n.checked_mul(2).ok_or_else(|| ConfigurationError::InvalidValue {
                key: key.to_string(),
                value: format!("{n} x 2"),
            })
        };
        Self::new(double(self.stacks, "stacks")?, double(self.slices, "slices")?, self.radius)
    }

    /// Same radius and stacks:slices ratio, half as many of each.
    pub fn coarsened(&self) -> Result<Self, ConfigurationError> {
        Self::new(self.stacks / 2, self.slices / 2, self.radius)
    }

    // Both fit in u32 (checked in `new`), hence in usize on every target.
    pub fn vertex_count(&self) -> usize {
        mesh_size(self.stacks, self.slices).0 as usize
    }

    pub fn triangle_count(&self) -> usize {
        mesh_size(self.stacks, self.slices).1 as usize
    }
}

/// (vertices, triangles): two triangles per mid-band quad, one per quad in
/// each pole band.
fn mesh_size(stacks: u32, slices: u32) -> (u128, u128) {
    let (stacks, slices) = (u128::from(stacks), u128::from(slices));
    let vertices = (stacks + 1) * (slices + 1);
    let triangles = (stacks - 2) * slices * 2 + 2 * slices;
    (vertices, triangles)
}

/// GPU vertex: position, unit normal, equirectangular texture coordinate.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

/// Immutable sphere geometry. Rebuilt wholesale, never edited.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.indices
    }

    /// Indices flattened for an index buffer.
    pub fn indices(&self) -> &[u32] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }
}

pub fn build_sphere(spec: &SphereSpec) -> Mesh {
    let stacks = spec.stacks;
    let slices = spec.slices;

    let mut vertices = Vec::with_capacity(spec.vertex_count());
    for i in 0..=stacks {
        let v = i as f32 / stacks as f32;
        let polar = PI * v;

        // Pin the poles onto the axis so every pole copy shares one position.
        let (ring, y) = if i == 0 {
            (0.0, 1.0)
        } else if i == stacks {
            (0.0, -1.0)
        } else {
            (polar.sin(), polar.cos())
        };

        for j in 0..=slices {
            let u = j as f32 / slices as f32;
            // The seam column takes the azimuth of column 0, only its u differs.
            let azimuth = TAU * (j % slices) as f32 / slices as f32;

            let normal = Vec3::new(ring * azimuth.cos(), y, ring * azimuth.sin());
            let position = normal * spec.radius;

            vertices.push(Vertex {
                position: position.to_array(),
                normal: normal.to_array(),
                tex_coord: [u, v],
            });
        }
    }

    let row = slices + 1;
    let mut indices = Vec::with_capacity(spec.triangle_count());
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = a + row;
            let c = a + 1;
            let d = b + 1;

            // CCW seen from outside. The pole bands drop the half of the
            // quad that would collapse onto the pole.
            if i != 0 {
                indices.push([a, c, d]);
            }
            if i != stacks - 1 {
                indices.push([a, d, b]);
            }
        }
    }

    debug!(
        "built sphere {}x{} r={}: {} vertices, {} triangles",
        stacks,
        slices,
        spec.radius,
        vertices.len(),
        indices.len()
    );

    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn sphere(stacks: u32, slices: u32, radius: f32) -> Mesh {
        build_sphere(&SphereSpec::new(stacks, slices, radius).unwrap())
    }

    fn at(mesh: &Mesh, spec: &SphereSpec, stack: u32, slice: u32) -> Vertex {
        mesh.vertices()[(stack * (spec.slices() + 1) + slice) as usize]
    }

    #[test]
    fn test_counts() {
        for (stacks, slices) in [(2, 3), (2, 8), (3, 3), (8, 16), (17, 5), (64, 128)] {
            let spec = SphereSpec::new(stacks, slices, 1.0).unwrap();
            let mesh = build_sphere(&spec);
            let expected_tris = ((stacks - 2) * slices * 2 + 2 * slices) as usize;
            let expected_verts = ((stacks + 1) * (slices + 1)) as usize;

            assert_eq!(mesh.triangle_count(), expected_tris, "{stacks}x{slices}");
            assert_eq!(spec.triangle_count(), expected_tris);
            assert_eq!(mesh.vertices().len(), expected_verts, "{stacks}x{slices}");
            assert_eq!(mesh.indices().len(), expected_tris * 3);
        }
    }

    #[test]
    fn test_minimal_sphere_is_two_fans() {
        let spec = SphereSpec::new(2, 3, 1.0).unwrap();
        let mesh = build_sphere(&spec);
        assert_eq!(mesh.triangle_count(), 6);

        let north = 0..=spec.slices();
        let south_start = 2 * (spec.slices() + 1);
        for tri in mesh.triangles() {
            let touches_north = tri.iter().any(|i| north.contains(i));
            let touches_south = tri.iter().any(|&i| i >= south_start);
            assert!(touches_north ^ touches_south, "{tri:?} must belong to exactly one fan");
        }
    }

    #[test]
    fn test_indices_in_range() {
        let mesh = sphere(9, 7, 2.0);
        let count = mesh.vertices().len() as u32;
        assert!(mesh.indices().iter().all(|&i| i < count));
    }

    #[test]
    fn test_positions_on_radius_and_normals() {
        let radius = 3.5;
        let mesh = sphere(12, 24, radius);
        for v in mesh.vertices() {
            let p = Vec3::from_array(v.position);
            let n = Vec3::from_array(v.normal);
            assert!((p.length() - radius).abs() < EPS * radius, "|p| = {}", p.length());
            assert!((n.length() - 1.0).abs() < EPS, "|n| = {}", n.length());
            assert!((p / radius - n).length() < EPS);
        }
    }

    #[test]
    fn test_tex_coords_in_unit_square() {
        let mesh = sphere(7, 11, 1.0);
        for v in mesh.vertices() {
            let [u, w] = v.tex_coord;
            assert!((0.0..=1.0).contains(&u));
            assert!((0.0..=1.0).contains(&w));
        }
    }

    #[test]
    fn test_seam_shares_position() {
        let spec = SphereSpec::new(6, 10, 2.0).unwrap();
        let mesh = build_sphere(&spec);
        for i in 0..=spec.stacks() {
            let first = at(&mesh, &spec, i, 0);
            let last = at(&mesh, &spec, i, spec.slices());
            assert_eq!(first.position, last.position);
            assert_eq!(first.tex_coord[0], 0.0);
            assert_eq!(last.tex_coord[0], 1.0);
            assert_eq!(first.tex_coord[1], last.tex_coord[1]);
        }
    }

    #[test]
    fn test_pole_vertices() {
        let radius = 4.0;
        let spec = SphereSpec::new(5, 8, radius).unwrap();
        let mesh = build_sphere(&spec);

        let mut us = Vec::new();
        for j in 0..=spec.slices() {
            let north = at(&mesh, &spec, 0, j);
            let south = at(&mesh, &spec, spec.stacks(), j);
            assert_eq!(north.position, [0.0, radius, 0.0]);
            assert_eq!(south.position, [0.0, -radius, 0.0]);
            assert_eq!(north.tex_coord[1], 0.0);
            assert_eq!(south.tex_coord[1], 1.0);
            us.push(north.tex_coord[0]);
        }

        assert_eq!(us.first(), Some(&0.0));
        assert_eq!(us.last(), Some(&1.0));
        assert!(us.windows(2).all(|w| w[0] < w[1]), "pole u must be distinct: {us:?}");
    }

    #[test]
    fn test_tex_coord_follows_grid() {
        let spec = SphereSpec::new(4, 6, 1.0).unwrap();
        let mesh = build_sphere(&spec);
        let v = at(&mesh, &spec, 3, 2);
        assert!((v.tex_coord[0] - 2.0 / 6.0).abs() < EPS);
        assert!((v.tex_coord[1] - 3.0 / 4.0).abs() < EPS);
    }

    #[test]
    fn test_winding_outward_no_degenerates() {
        let mesh = sphere(16, 32, 1.0);
        let verts = mesh.vertices();
        for tri in mesh.triangles() {
            let [a, b, c] = tri.map(|i| Vec3::from_array(verts[i as usize].position));
            let face = (b - a).cross(c - a);
            assert!(face.length() > 1e-7, "degenerate triangle {tri:?}");

            let centroid = (a + b + c) / 3.0;
            assert!(face.dot(centroid) > 0.0, "triangle {tri:?} faces inward");
        }
    }

    #[test]
    fn test_deterministic() {
        let a = sphere(10, 20, 1.5);
        let b = sphere(10, 20, 1.5);
        assert_eq!(a.vertices(), b.vertices());
        assert_eq!(a.triangles(), b.triangles());
    }

    #[test]
    fn test_rejects_invalid_spec() {
        assert_eq!(
            SphereSpec::new(1, 4, 1.0),
            Err(ConfigurationError::TooFewStacks(1))
        );
        assert_eq!(
            SphereSpec::new(4, 2, 1.0),
            Err(ConfigurationError::TooFewSlices(2))
        );
        assert_eq!(
            SphereSpec::new(4, 4, 0.0),
            Err(ConfigurationError::InvalidRadius(0.0))
        );
        assert_eq!(
            SphereSpec::new(4, 4, -2.0),
            Err(ConfigurationError::InvalidRadius(-2.0))
        );
        assert!(matches!(
            SphereSpec::new(4, 4, f32::NAN),
            Err(ConfigurationError::InvalidRadius(_))
        ));
        assert!(matches!(
            SphereSpec::new(u32::MAX, u32::MAX, 1.0),
            Err(ConfigurationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_refine_and_coarsen_keep_ratio() {
        let spec = SphereSpec::new(12, 64, 3.0).unwrap();

        let finer = spec.refined().unwrap();
        assert_eq!((finer.stacks(), finer.slices()), (24, 128));
        assert_eq!(finer.radius(), 3.0);

        let coarser = spec.coarsened().unwrap();
        assert_eq!((coarser.stacks(), coarser.slices()), (6, 32));
        assert_eq!(coarser.radius(), 3.0);
        assert_eq!(coarser.refined().unwrap(), spec);

        // Halving below the minimum is an error, not a clamp.
        let minimal = SphereSpec::new(3, 8, 1.0).unwrap();
        assert_eq!(minimal.coarsened(), Err(ConfigurationError::TooFewStacks(1)));
        assert!(SphereSpec::new(2, 3, 1.0).unwrap().refined().is_ok());
    }

    #[test]
    fn test_rejects_index_count_beyond_u32() {
        // ~1.6e9 vertices fit in u32, ~9.6e9 indices do not.
        assert!(matches!(
            SphereSpec::new(40_000, 40_000, 1.0),
            Err(ConfigurationError::InvalidValue { .. })
        ));

        // Largest square tessellation whose index count still fits.
        let spec = SphereSpec::new(26_000, 26_000, 1.0).unwrap();
        let indices = spec.triangle_count() as u64 * 3;
        assert!(indices <= u64::from(u32::MAX));
        assert_eq!(spec.triangle_count() as u64, 2 * 25_999 * 26_000);
        assert_eq!(spec.vertex_count() as u64, 26_001 * 26_001);
    }
}
