use glam::{Mat4, Vec3};

use super::mesh::MeshData;

/// A ray in world space. `direction` is kept normalized so hit distances are in world units.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Distance and barycentric weights of a ray/triangle intersection
#[derive(Clone, Copy, Debug)]
pub struct TriangleIntersection {
    pub distance: f32,
    /// Weight of the second vertex
    pub u: f32,
    /// Weight of the third vertex
    pub v: f32,
}

impl TriangleIntersection {
    /// Barycentric coordinates as (w0, w1, w2)
    pub fn bary_coords(&self) -> Vec3 {
        Vec3::new(1.0 - self.u - self.v, self.u, self.v)
    }
}

/// Möller-Trumbore ray-triangle intersection algorithm.
/// Returns the hit distance and barycentrics, or None if no intersection.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<TriangleIntersection> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    // Intersection is behind ray origin
    if t > EPSILON {
        Some(TriangleIntersection { distance: t, u, v })
    } else {
        None
    }
}

/// Result of picking a triangle in a mesh
#[derive(Clone, Debug)]
pub struct TriangleHit {
    /// Index of the triangle (into mesh.indices / 3)
    pub triangle_index: usize,
    /// Distance from ray origin to hit point
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
    /// Barycentric coordinates of the hit inside the triangle
    pub bary_coords: Vec3,
}

/// Find the nearest triangle of `mesh`, placed in the world by `world`,
/// hit by the ray no farther than `max_distance`.
pub fn pick_triangle(ray: &Ray, mesh: &MeshData, world: &Mat4, max_distance: f32) -> Option<TriangleHit> {
    let mut best: Option<TriangleHit> = None;

    for tri_idx in 0..mesh.triangle_count() {
        let [v0, v1, v2] = mesh.world_triangle(tri_idx, world);

        let Some(hit) = ray_triangle_intersect(ray, v0, v1, v2) else {
            continue;
        };
        if hit.distance > max_distance {
            continue;
        }
        if best.as_ref().is_none_or(|b| hit.distance < b.distance) {
            best = Some(TriangleHit {
                triangle_index: tri_idx,
                distance: hit.distance,
                point: ray.at(hit.distance),
                bary_coords: hit.bary_coords(),
            });
        }
    }

    best
}
