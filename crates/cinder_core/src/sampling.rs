//! Random sampling helpers shared by the BSDFs, cameras and lights.
//!
//! Everything takes `&mut dyn RngCore` so callers pick the generator and
//! seeding strategy.

use cinder_math::Vec3;
use rand::{Rng, RngCore};

/// Uniform float in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniform direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    // Rejection sampling keeps the distribution uniform
    loop {
        let v = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Uniform point inside the unit disk in the XY plane.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_f32(rng) * 2.0 - 1.0, gen_f32(rng) * 2.0 - 1.0, 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Uniform point inside a ball of `radius` around `center`.
pub fn random_in_radius(center: Vec3, radius: f32, rng: &mut dyn RngCore) -> Vec3 {
    if radius <= 0.0 {
        return center;
    }
    loop {
        let p = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        if p.length_squared() <= 1.0 {
            return center + p * radius;
        }
    }
}

/// Cosine-weighted direction on the hemisphere around `normal`.
///
/// Returns the direction and its density `cos(theta) / pi`.
pub fn cosine_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> (Vec3, f32) {
    let r1 = gen_f32(rng);
    let r2 = gen_f32(rng);
    let phi = 2.0 * std::f32::consts::PI * r1;
    let r = r2.sqrt();
    let local = Vec3::new(r * phi.cos(), r * phi.sin(), (1.0 - r2).max(0.0).sqrt());

    let (tangent, bitangent) = orthonormal_basis(normal);
    let direction = (tangent * local.x + bitangent * local.y + normal * local.z).normalize();
    let pdf = local.z * std::f32::consts::FRAC_1_PI;
    (direction, pdf)
}

/// Two unit vectors completing `n` into a right-handed basis.
///
/// Branchless construction from Duff et al. 2017.
pub fn orthonormal_basis(n: Vec3) -> (Vec3, Vec3) {
    let sign = 1.0_f32.copysign(n.z);
    let a = -1.0 / (sign + n.z);
    let b = n.x * n.y * a;
    (
        Vec3::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x),
        Vec3::new(b, sign + n.y * n.y * a, -n.y),
    )
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

/// Schlick's approximation for Fresnel reflectance.
#[inline]
pub fn schlick(cosine: f32, ior: f32) -> f32 {
    let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
