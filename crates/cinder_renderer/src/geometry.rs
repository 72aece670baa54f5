//! Ray-primitive intersection.
//!
//! Triangles use the Möller-Trumbore algorithm; spheres are solved in
//! closed form. Both work in whatever space the ray is given in and
//! return only the ray parameter plus the data needed to shade the hit
//! later, so losing candidates cost nothing extra.

use std::f32::consts::PI;

use cinder_math::{Interval, Ray, Vec2, Vec3};

/// Determinants below this are treated as a ray parallel to the triangle.
const PARALLEL_EPSILON: f32 = 1e-9;

/// A ray-triangle hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriangleHit {
    pub t: f32,
    /// Barycentric weight of the second vertex
    pub u: f32,
    /// Barycentric weight of the third vertex
    pub v: f32,
}

/// Möller-Trumbore ray-triangle intersection.
///
/// Degenerate (zero-area) triangles never report a hit.
pub fn intersect_triangle(ray: &Ray, [v0, v1, v2]: [Vec3; 3], ray_t: Interval) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < PARALLEL_EPSILON {
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
    if !ray_t.surrounds(t) {
        return None;
    }

    Some(TriangleHit { t, u, v })
}

/// Closest sphere hit distance inside `ray_t`.
///
/// The ray direction need not be unit length.
pub fn intersect_sphere(ray: &Ray, center: Vec3, radius: f32, ray_t: Interval) -> Option<f32> {
    let oc = center - ray.origin;
    let a = ray.direction.length_squared();
    if a == 0.0 {
        return None;
    }
    let h = ray.direction.dot(oc);
    let c = oc.length_squared() - radius * radius;

    let discriminant = h * h - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();

    // Find the nearest root in the acceptable range
    let mut root = (h - sqrtd) / a;
    if !ray_t.surrounds(root) {
        root = (h + sqrtd) / a;
        if !ray_t.surrounds(root) {
            return None;
        }
    }
    Some(root)
}

/// UV coordinates for a point on the unit sphere.
///
/// u runs around Y starting from -X, v runs from the bottom pole to the top.
pub fn sphere_uv(p: Vec3) -> Vec2 {
    let theta = (-p.y).clamp(-1.0, 1.0).acos();
    let phi = (-p.z).atan2(p.x) + PI;
    Vec2::new(phi / (2.0 * PI), theta / PI)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRI: [Vec3; 3] = [
        Vec3::new(-1.0, -1.0, 0.0),
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ];

    #[test]
    fn test_triangle_hit() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);
        let hit = intersect_triangle(&ray, TRI, Interval::new(0.0, 100.0)).unwrap();
        assert!((hit.t - 3.0).abs() < 1e-5);
        assert!(hit.u >= 0.0 && hit.v >= 0.0 && hit.u + hit.v <= 1.0);
    }

    #[test]
    fn test_triangle_miss_and_range() {
        let outside = Ray::new(Vec3::new(5.0, 0.0, -3.0), Vec3::Z);
        assert!(intersect_triangle(&outside, TRI, Interval::new(0.0, 100.0)).is_none());

        let short = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);
        assert!(intersect_triangle(&short, TRI, Interval::new(0.0, 2.0)).is_none());

        let parallel = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        assert!(intersect_triangle(&parallel, TRI, Interval::new(0.0, 100.0)).is_none());
    }

    #[test]
    fn test_degenerate_triangle_misses() {
        let line = [Vec3::ZERO, Vec3::X, Vec3::X * 2.0];
        let ray = Ray::new(Vec3::new(1.0, 0.0, -1.0), Vec3::Z);
        assert!(intersect_triangle(&ray, line, Interval::new(0.0, 100.0)).is_none());
    }

    #[test]
    fn test_sphere_hit_and_inside() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let t = intersect_sphere(&ray, Vec3::ZERO, 1.0, Interval::new(0.001, 100.0)).unwrap();
        assert!((t - 4.0).abs() < 1e-5);

        // From the inside the far root is used
        let inside = Ray::new(Vec3::ZERO, Vec3::Z);
        let t = intersect_sphere(&inside, Vec3::ZERO, 1.0, Interval::new(0.001, 100.0)).unwrap();
        assert!((t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_unnormalized_direction() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 2.0));
        let t = intersect_sphere(&ray, Vec3::ZERO, 1.0, Interval::new(0.001, 100.0)).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let ray = Ray::new(Vec3::new(0.0, 5.0, -5.0), Vec3::Z);
        assert!(intersect_sphere(&ray, Vec3::ZERO, 1.0, Interval::new(0.001, 100.0)).is_none());
    }

    #[test]
    fn test_sphere_uv_range() {
        for p in [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z] {
            let uv = sphere_uv(p);
            assert!((0.0..=1.0).contains(&uv.x));
            assert!((0.0..=1.0).contains(&uv.y));
        }
        assert!((sphere_uv(Vec3::Y).y - 1.0).abs() < 1e-5);
    }
}
