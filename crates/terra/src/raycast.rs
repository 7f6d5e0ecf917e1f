//! Ray casting against the reference sphere mesh.

use crate::geometry::SphereMesh;
use glam::{Mat4, Vec2, Vec3};

/// Barycentric slack so rays through a shared edge never fall between the
/// two triangles.
const EDGE_EPS: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Re-expresses the ray in the space `m` maps into. Lengths along the
    /// result are measured in that space.
    pub fn transformed(&self, m: &Mat4) -> Ray {
        Ray::new(
            m.transform_point3(self.origin),
            m.transform_vector3(self.direction).normalize(),
        )
    }

    /// Whether the ray passes within `radius` of `center` ahead of its origin.
    pub fn hits_sphere(&self, center: Vec3, radius: f32) -> bool {
        let to_center = center - self.origin;
        let along = to_center.dot(self.direction);
        let d2 = to_center.length_squared() - along * along;
        if d2 > radius * radius {
            return false;
        }
        // Origin outside and sphere behind.
        along >= 0.0 || to_center.length_squared() <= radius * radius
    }

    /// Front-face ray/triangle test. Returns `(t, [wa, wb, wc])`, the distance
    /// along the ray and the barycentric weights of the hit.
    pub fn intersect_triangle(&self, a: Vec3, b: Vec3, c: Vec3) -> Option<(f32, [f32; 3])> {
        let edge1 = b - a;
        let edge2 = c - a;
        let normal = edge1.cross(edge2);

        // Counter-clockwise triangles face the ray when the dot is negative.
        let ddn = -self.direction.dot(normal);
        if ddn <= 0.0 {
            return None;
        }

        let diff = self.origin - a;
        let wb = -self.direction.dot(diff.cross(edge2)) / ddn;
        let wc = -self.direction.dot(edge1.cross(diff)) / ddn;
        if wb < -EDGE_EPS || wc < -EDGE_EPS || wb + wc > 1.0 + EDGE_EPS {
            return None;
        }

        let t = diff.dot(normal) / ddn;
        if t < 0.0 {
            return None;
        }

        Some((t, [1.0 - wb - wc, wb, wc]))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// World-space distance from the ray origin.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec3,
    /// Texture coordinate interpolated across the hit triangle.
    pub uv: Vec2,
}

/// Nearest front-facing hit of `ray` (world space) on `mesh` placed by `model`.
pub fn raycast_mesh(mesh: &SphereMesh, model: &Mat4, ray: &Ray) -> Option<SurfaceHit> {
    let local = ray.transformed(&model.inverse());
    if !local.hits_sphere(Vec3::ZERO, mesh.radius()) {
        return None;
    }

    let mut best: Option<(f32, Vec3, Vec2)> = None;
    for tri in mesh.triangles() {
        let Some((t, w)) = local.intersect_triangle(tri[0].position, tri[1].position, tri[2].position)
        else {
            continue;
        };
        if best.map_or(true, |(bt, _, _)| t < bt) {
            let uv = tri[0].uv * w[0] + tri[1].uv * w[1] + tri[2].uv * w[2];
            best = Some((t, local.at(t), uv));
        }
    }

    let (_, local_point, uv) = best?;
    let point = model.transform_point3(local_point);
    Some(SurfaceHit {
        distance: point.distance(ray.origin),
        point,
        uv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_hit_reports_barycentrics() {
        let ray = Ray::new(Vec3::new(0.25, 0.25, 5.0), Vec3::NEG_Z);
        let (t, w) = ray
            .intersect_triangle(Vec3::ZERO, Vec3::X, Vec3::Y)
            .expect("hit");
        assert!((t - 5.0).abs() < 1e-6);
        assert!((w[0] - 0.5).abs() < 1e-6);
        assert!((w[1] - 0.25).abs() < 1e-6);
        assert!((w[2] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn back_faces_and_misses_are_rejected() {
        let down = Ray::new(Vec3::new(0.25, 0.25, 5.0), Vec3::NEG_Z);
        // Clockwise as seen from the ray.
        assert!(down.intersect_triangle(Vec3::ZERO, Vec3::Y, Vec3::X).is_none());

        let outside = Ray::new(Vec3::new(2.0, 2.0, 5.0), Vec3::NEG_Z);
        assert!(outside.intersect_triangle(Vec3::ZERO, Vec3::X, Vec3::Y).is_none());

        let behind = Ray::new(Vec3::new(0.25, 0.25, -5.0), Vec3::NEG_Z);
        assert!(behind.intersect_triangle(Vec3::ZERO, Vec3::X, Vec3::Y).is_none());
    }

    #[test]
    fn bounding_sphere_test() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 4.0), Vec3::NEG_Z);
        assert!(ray.hits_sphere(Vec3::ZERO, 1.0));
        let away = Ray::new(Vec3::new(0.0, 0.0, 4.0), Vec3::Z);
        assert!(!away.hits_sphere(Vec3::ZERO, 1.0));
        let wide = Ray::new(Vec3::new(1.5, 0.0, 4.0), Vec3::NEG_Z);
        assert!(!wide.hits_sphere(Vec3::ZERO, 1.0));
    }

    #[test]
    fn mesh_hit_is_nearest_and_on_surface() {
        let mesh = SphereMesh::icosphere(16);
        let ray = Ray::new(Vec3::new(0.1, 0.2, 4.0), Vec3::NEG_Z);
        let hit = raycast_mesh(&mesh, &Mat4::IDENTITY, &ray).expect("hit");

        // Tessellation keeps the surface slightly inside the unit sphere.
        assert!(hit.point.z > 0.9 && hit.point.z <= 1.0);
        assert!((hit.point.length() - 1.0).abs() < 5e-3);
        assert!((hit.distance - (4.0 - hit.point.z)).abs() < 1e-4);
    }

    #[test]
    fn mesh_rotation_moves_the_texture_coordinate() {
        let mesh = SphereMesh::icosphere(16);
        let ray = Ray::new(Vec3::new(0.0, 0.3, 4.0), Vec3::NEG_Z);

        let still = raycast_mesh(&mesh, &Mat4::IDENTITY, &ray).expect("hit");
        let turned = raycast_mesh(&mesh, &Mat4::from_rotation_y(0.5), &ray).expect("hit");

        // Same world point, different surface location.
        assert!(still.point.distance(turned.point) < 5e-3);
        assert!((still.uv.x - turned.uv.x).abs() > 0.05);
        assert!((still.uv.y - turned.uv.y).abs() < 5e-3);
    }
}
