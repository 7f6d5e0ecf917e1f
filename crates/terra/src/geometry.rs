//! Icosahedron-based unit sphere.
//!
//! The globe uses the same subdivided icosahedron twice:
//! - a triangle list with per-vertex texture coordinates (the "scaffold"),
//!   used for ray picking and drawn as a translucent wireframe;
//! - a lattice point cloud (the "terrain"), one [`PointSample`] per lattice
//!   vertex of every face.
//!
//! Texture coordinates follow the equirectangular mapping
//! `u = atan2(z, -x) / 2π + 0.5`, `v = 1 - (atan2(-y, hypot(x, z)) / π + 0.5)`.

use glam::{Vec2, Vec3};
use rayon::prelude::*;
use std::f32::consts::PI;

/// Golden ratio, `(1 + √5) / 2`.
const PHI: f32 = 1.618_034;

#[rustfmt::skip]
const ICOSAHEDRON_VERTICES: [[f32; 3]; 12] = [
    [-1.0,  PHI,  0.0], [ 1.0,  PHI,  0.0], [-1.0, -PHI,  0.0], [ 1.0, -PHI,  0.0],
    [ 0.0, -1.0,  PHI], [ 0.0,  1.0,  PHI], [ 0.0, -1.0, -PHI], [ 0.0,  1.0, -PHI],
    [ PHI,  0.0, -1.0], [ PHI,  0.0,  1.0], [-PHI,  0.0, -1.0], [-PHI,  0.0,  1.0],
];

/// Counter-clockwise when seen from outside.
#[rustfmt::skip]
const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

/// One vertex of the terrain point cloud, laid out for the GPU instance buffer.
/// Must match the instance inputs of `terrain_points.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointSample {
    /// Position on the unit sphere. Doubles as the surface normal.
    pub position: [f32; 3],
    /// Texture coordinate, fixed at construction.
    pub uv: [f32; 2],
}

impl PointSample {
    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    #[inline]
    pub fn uv(&self) -> Vec2 {
        Vec2::from(self.uv)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceVertex {
    pub position: Vec3,
    pub uv: Vec2,
}

/// Non-indexed triangle list on a sphere of radius `radius` centred at the origin.
#[derive(Clone, Debug)]
pub struct SphereMesh {
    vertices: Vec<SurfaceVertex>,
    radius: f32,
}

impl SphereMesh {
    /// Builds a unit icosphere with `detail` subdivisions per icosahedron edge.
    pub fn icosphere(detail: u32) -> Self {
        let mut vertices = Vec::with_capacity(20 * 3 * ((detail as usize) + 1).pow(2));

        for face in ICOSAHEDRON_FACES.iter() {
            let lattice = face_lattice(face, detail);
            let cols = (detail + 1) as usize;

            for i in 0..cols {
                for j in 0..(2 * (cols - i) - 1) {
                    let k = j / 2;
                    let corners = if j % 2 == 0 {
                        [lattice[i][k + 1], lattice[i + 1][k], lattice[i][k]]
                    } else {
                        [lattice[i][k + 1], lattice[i + 1][k + 1], lattice[i + 1][k]]
                    };

                    let mut tri = corners.map(|p| {
                        let position = p.normalize();
                        SurfaceVertex {
                            position,
                            uv: sphere_uv(position),
                        }
                    });
                    correct_pole_uvs(&mut tri);
                    correct_seam(&mut tri);
                    vertices.extend_from_slice(&tri);
                }
            }
        }

        Self {
            vertices,
            radius: 1.0,
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[SurfaceVertex] {
        &self.vertices
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = &[SurfaceVertex]> + '_ {
        self.vertices.chunks_exact(3)
    }

    /// Line-list positions for wireframe rendering, three edges per triangle.
    pub fn wireframe_segments(&self) -> Vec<[f32; 3]> {
        let mut lines = Vec::with_capacity(self.vertices.len() * 2);
        for tri in self.triangles() {
            let [a, b, c] = [tri[0].position, tri[1].position, tri[2].position];
            for (p, q) in [(a, b), (b, c), (c, a)] {
                lines.push(p.to_array());
                lines.push(q.to_array());
            }
        }
        lines
    }
}

/// Builds the terrain point cloud: every lattice vertex of every subdivided
/// face, projected onto the unit sphere.
///
/// Points are never interpolated, so their texture coordinates use the raw
/// mapping without seam fix-ups.
pub fn point_cloud(detail: u32) -> Vec<PointSample> {
    ICOSAHEDRON_FACES
        .par_iter()
        .flat_map_iter(|face| {
            face_lattice(face, detail)
                .into_iter()
                .flatten()
                .map(|p| {
                    let position = p.normalize();
                    PointSample {
                        position: position.to_array(),
                        uv: sphere_uv(position).to_array(),
                    }
                })
        })
        .collect()
}

/// Number of samples [`point_cloud`] produces for `detail`.
pub fn point_cloud_len(detail: u32) -> usize {
    let cols = detail as usize + 1;
    20 * (cols + 1) * (cols + 2) / 2
}

#[inline]
pub fn azimuth(p: Vec3) -> f32 {
    p.z.atan2(-p.x)
}

#[inline]
pub fn inclination(p: Vec3) -> f32 {
    (-p.y).atan2((p.x * p.x + p.z * p.z).sqrt())
}

/// Equirectangular texture coordinate of a direction.
#[inline]
pub fn sphere_uv(p: Vec3) -> Vec2 {
    Vec2::new(
        azimuth(p) / (2.0 * PI) + 0.5,
        1.0 - (inclination(p) / PI + 0.5),
    )
}

/// Barycentric lattice of one face: row `i` walks from edge `a→c`, and holds
/// `cols - i + 1` points interpolated towards edge `b→c`. Not normalized.
fn face_lattice(face: &[usize; 3], detail: u32) -> Vec<Vec<Vec3>> {
    let a = Vec3::from(ICOSAHEDRON_VERTICES[face[0]]);
    let b = Vec3::from(ICOSAHEDRON_VERTICES[face[1]]);
    let c = Vec3::from(ICOSAHEDRON_VERTICES[face[2]]);
    let cols = detail as usize + 1;

    (0..=cols)
        .map(|i| {
            let t = i as f32 / cols as f32;
            let aj = a.lerp(c, t);
            let bj = b.lerp(c, t);
            let rows = cols - i;

            (0..=rows)
                .map(|j| {
                    if j == 0 && i == cols {
                        aj
                    } else {
                        aj.lerp(bj, j as f32 / rows as f32)
                    }
                })
                .collect()
        })
        .collect()
}

/// Pole vertices have no azimuth of their own; borrow the triangle's.
fn correct_pole_uvs(tri: &mut [SurfaceVertex; 3]) {
    let centroid = (tri[0].position + tri[1].position + tri[2].position) / 3.0;
    let azi = azimuth(centroid);

    for v in tri.iter_mut() {
        if azi < 0.0 && v.uv.x == 1.0 {
            v.uv.x -= 1.0;
        }
        if v.position.x == 0.0 && v.position.z == 0.0 {
            v.uv.x = azi / (2.0 * PI) + 0.5;
        }
    }
}

/// Triangles straddling the u = 0/1 seam get their low side shifted past 1.
fn correct_seam(tri: &mut [SurfaceVertex; 3]) {
    let us = tri.map(|v| v.uv.x);
    let max = us[0].max(us[1]).max(us[2]);
    let min = us[0].min(us[1]).min(us[2]);

    if max > 0.9 && min < 0.1 {
        for v in tri.iter_mut() {
            if v.uv.x < 0.2 {
                v.uv.x += 1.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uv_mapping_of_axis_directions() {
        let front = sphere_uv(Vec3::Z);
        assert!((front - Vec2::new(0.75, 0.5)).length() < 1e-6);

        let back = sphere_uv(-Vec3::Z);
        assert!((back - Vec2::new(0.25, 0.5)).length() < 1e-6);

        let left = sphere_uv(-Vec3::X);
        assert!((left.x - 0.5).abs() < 1e-6);

        let north = sphere_uv(Vec3::new(0.0, 1.0, 1e-6).normalize());
        assert!((north.y - 1.0).abs() < 1e-3);
    }

    #[test]
    fn icosphere_triangle_count_and_radius() {
        for detail in [0, 1, 4, 16] {
            let mesh = SphereMesh::icosphere(detail);
            let cols = detail as usize + 1;
            assert_eq!(mesh.triangle_count(), 20 * cols * cols);
            for v in mesh.vertices() {
                assert!((v.position.length() - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn icosphere_triangles_wind_outward() {
        let mesh = SphereMesh::icosphere(2);
        for tri in mesh.triangles() {
            let n = (tri[1].position - tri[0].position).cross(tri[2].position - tri[0].position);
            let centroid = (tri[0].position + tri[1].position + tri[2].position) / 3.0;
            assert!(n.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn seam_triangles_do_not_span_the_whole_texture() {
        let mesh = SphereMesh::icosphere(16);
        // Azimuth is degenerate right at the poles.
        for tri in mesh.triangles().filter(|t| t.iter().all(|v| v.position.y.abs() < 0.95)) {
            let us = [tri[0].uv.x, tri[1].uv.x, tri[2].uv.x];
            let span = us.iter().cloned().fold(f32::MIN, f32::max)
                - us.iter().cloned().fold(f32::MAX, f32::min);
            assert!(span < 0.5, "triangle spans {span} in u");
        }
    }

    #[test]
    fn point_cloud_matches_lattice_size() {
        for detail in [0, 3, 10] {
            let points = point_cloud(detail);
            assert_eq!(points.len(), point_cloud_len(detail));
        }
        assert_eq!(point_cloud_len(120), 150_060);
    }

    #[test]
    fn point_cloud_is_on_unit_sphere_with_unit_uvs() {
        for p in point_cloud(8) {
            assert!((p.position().length() - 1.0).abs() < 1e-5);
            let uv = p.uv();
            assert!((0.0..=1.0).contains(&uv.x));
            assert!((0.0..=1.0).contains(&uv.y));
        }
    }

    #[test]
    fn wireframe_has_three_edges_per_triangle() {
        let mesh = SphereMesh::icosphere(1);
        assert_eq!(mesh.wireframe_segments().len(), mesh.triangle_count() * 6);
    }
}
