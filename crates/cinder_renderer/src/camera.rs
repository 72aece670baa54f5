//! Camera ray generation.

use cinder_core::sampling::{gen_f32, random_in_unit_disk};
use cinder_core::{Camera, Projection};
use cinder_math::{Ray, Vec3};
use rand::RngCore;

/// Height of the virtual sensor in world units, used to turn a field of
/// view into a physical focal length for depth of field.
pub const SENSOR_HEIGHT: f32 = 0.024;

/// A [`Camera`] prepared for one image size.
///
/// Pixel `(0, 0)` is the top-left corner of the image.
#[derive(Clone, Debug)]
pub struct CameraRays {
    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
    orthographic: bool,
    lens_radius: f32,
}

impl CameraRays {
    pub fn new(camera: &Camera, width: u32, height: u32) -> Self {
        let width = width.max(1) as f32;
        let height = height.max(1) as f32;
        let aspect = width / height;

        // Camera basis vectors
        let w = (camera.position - camera.look_at).normalize_or_zero();
        let w = if w == Vec3::ZERO { Vec3::Z } else { w };
        let mut u = camera.up.cross(w).normalize_or_zero();
        if u == Vec3::ZERO {
            // Looking straight along `up`
            u = w.any_orthonormal_vector();
        }
        let v = w.cross(u);

        let focus_dist = camera.effective_focus_distance();

        let (viewport_width, viewport_height, lens_radius, orthographic) = match camera.projection {
            Projection::Perspective { fov } => {
                let h = (fov.to_radians() / 2.0).tan();
                let viewport_height = 2.0 * h * focus_dist;
                let lens_radius = if camera.fstop > 0.0 && h > 0.0 {
                    let focal_length = SENSOR_HEIGHT / (2.0 * h);
                    focal_length / (2.0 * camera.fstop)
                } else {
                    0.0
                };
                (viewport_height * aspect, viewport_height, lens_radius, false)
            }
            Projection::Orthographic { width: ortho_width } => (ortho_width, ortho_width / aspect, 0.0, true),
        };

        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;
        let pixel_delta_u = viewport_u / width;
        let pixel_delta_v = viewport_v / height;

        // Orthographic rays start on a plane through the camera position
        let plane_center = if orthographic {
            camera.position
        } else {
            camera.position - focus_dist * w
        };
        let viewport_upper_left = plane_center - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        Self {
            center: camera.position,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            w,
            defocus_disk_u: u * lens_radius,
            defocus_disk_v: v * lens_radius,
            orthographic,
            lens_radius,
        }
    }

    pub fn lens_radius(&self) -> f32 {
        self.lens_radius
    }

    /// A ray through a random point of pixel `(x, y)`.
    pub fn get_ray(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Ray {
        let offset_x = gen_f32(rng) - 0.5;
        let offset_y = gen_f32(rng) - 0.5;
        let pixel_sample = self.pixel00_loc
            + (x as f32 + offset_x) * self.pixel_delta_u
            + (y as f32 + offset_y) * self.pixel_delta_v;

        if self.orthographic {
            return Ray::new(pixel_sample, -self.w);
        }

        let origin = if self.lens_radius <= 0.0 {
            self.center
        } else {
            let p = random_in_unit_disk(rng);
            self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
        };

        Ray::new(origin, (pixel_sample - origin).normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_center_pixel_looks_forward() {
        let camera = Camera::perspective(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 45.0);
        let rays = CameraRays::new(&camera, 101, 101);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..10 {
            let ray = rays.get_ray(50, 50, &mut rng);
            assert_eq!(ray.origin, camera.position);
            assert!((ray.direction - -Vec3::Z).length() < 0.01);
        }
    }

    #[test]
    fn test_top_left_pixel_points_up_left() {
        let camera = Camera::perspective(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 90.0);
        let rays = CameraRays::new(&camera, 100, 100);
        let mut rng = StdRng::seed_from_u64(1);
        let ray = rays.get_ray(0, 0, &mut rng);
        assert!(ray.direction.x < 0.0);
        assert!(ray.direction.y > 0.0);
    }

    #[test]
    fn test_orthographic_rays_are_parallel() {
        let camera = Camera::orthographic(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 4.0);
        let rays = CameraRays::new(&camera, 64, 64);
        let mut rng = StdRng::seed_from_u64(1);

        let a = rays.get_ray(0, 0, &mut rng);
        let b = rays.get_ray(63, 63, &mut rng);
        assert_eq!(a.direction, -Vec3::Z);
        assert_eq!(b.direction, -Vec3::Z);
        // Corners span the orthographic width
        assert!(a.origin.x < -1.9 && a.origin.y > 1.9);
        assert!(b.origin.x > 1.9 && b.origin.y < -1.9);
    }

    #[test]
    fn test_depth_of_field_jitters_origin() {
        let camera = Camera::perspective(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 45.0).with_focus(5.0, 0.01);
        let rays = CameraRays::new(&camera, 64, 64);
        assert!(rays.lens_radius() > 0.0);

        let mut rng = StdRng::seed_from_u64(2);
        let moved = (0..20)
            .map(|_| rays.get_ray(32, 32, &mut rng))
            .any(|r| r.origin != camera.position);
        assert!(moved);
    }

    #[test]
    fn test_looking_along_up_does_not_produce_nan() {
        let camera = Camera::perspective(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, 45.0);
        let rays = CameraRays::new(&camera, 10, 10);
        let mut rng = StdRng::seed_from_u64(1);
        let ray = rays.get_ray(5, 5, &mut rng);
        assert!(ray.direction.is_finite());
    }
}
