//! BSDF sampling over the node graph.
//!
//! BSDF nodes are dispatched by variant. A handle that does not point at a
//! BSDF node, or no handle at all, samples as the warning material.

use cinder_math::{Color, Vec3};
use rand::RngCore;

use super::color::warning_color;
use super::{HitContext, Node, NodeId, NodeStore};
use crate::sampling::{cosine_hemisphere, gen_f32, random_unit_vector, reflect, refract, schlick};

/// An outgoing direction chosen by a BSDF.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BsdfSample {
    /// Unit outgoing direction
    pub direction: Vec3,
    pub attenuation: Color,
    /// Density of `direction`; 1 for specular lobes
    pub pdf: f32,
}

impl NodeStore {
    /// Sample an outgoing direction. `None` means the path is absorbed.
    pub fn sample_bsdf(
        &self,
        bsdf: Option<NodeId>,
        hit: &HitContext,
        rng: &mut dyn RngCore,
    ) -> Option<BsdfSample> {
        let node = match bsdf.and_then(|id| self.get(id)) {
            Some(node) if node.is_bsdf() => *node,
            _ => Node::Warning,
        };

        match node {
            Node::Diffuse { color } => Some(diffuse(self.color_of(color, hit), hit, rng)),
            Node::Metal { color, roughness } => {
                let fuzz = self.scalar(roughness, hit);
                specular(self.color_of(color, hit), fuzz, hit, rng)
            }
            Node::Glass {
                color,
                roughness,
                ior,
            } => {
                let fuzz = self.scalar(roughness, hit);
                let ior = self.scalar(ior, hit);
                Some(dielectric(self.color_of(color, hit), fuzz, ior, hit, rng))
            }
            Node::Plastic {
                color,
                roughness,
                ior,
            } => {
                let fuzz = roughness.map_or(hit.material.roughness, |r| self.scalar(r, hit));
                let ior = ior.map_or(hit.material.ior, |i| self.scalar(i, hit));
                let cosine = (-hit.incoming.dot(hit.normal)).clamp(0.0, 1.0);
                if gen_f32(rng) < schlick(cosine, ior) {
                    specular(Color::WHITE, fuzz, hit, rng)
                } else {
                    Some(diffuse(self.color_of(color, hit), hit, rng))
                }
            }
            Node::MixBsdf { a, b, factor } => {
                let t = self.scalar(factor, hit);
                let pick = if gen_f32(rng) < t { b } else { a };
                self.sample_bsdf(Some(pick), hit, rng)
            }
            Node::Emissive { .. } => None,
            _ => Some(diffuse(warning_color(hit.uv), hit, rng)),
        }
    }

    /// Light emitted by the surface toward the viewer.
    pub fn emission(&self, bsdf: Option<NodeId>, hit: &HitContext) -> Color {
        match bsdf.and_then(|id| self.get(id)) {
            Some(&Node::Emissive { color, strength }) => {
                self.color_of(color, hit) * self.scalar(strength, hit)
            }
            Some(&Node::MixBsdf { a, b, factor }) => {
                let t = self.scalar(factor, hit).clamp(0.0, 1.0);
                self.emission(Some(a), hit).lerp(self.emission(Some(b), hit), t)
            }
            _ => Color::BLACK,
        }
    }

    /// Diffuse response used for direct lighting.
    ///
    /// Purely specular lobes do not respond to point lights.
    pub fn albedo(&self, bsdf: NodeId, hit: &HitContext) -> Color {
        match self.get(bsdf) {
            Some(&Node::Diffuse { color }) | Some(&Node::Plastic { color, .. }) => {
                self.color_of(color, hit)
            }
            Some(&Node::MixBsdf { a, b, factor }) => {
                let t = self.scalar(factor, hit).clamp(0.0, 1.0);
                self.albedo(a, hit).lerp(self.albedo(b, hit), t)
            }
            Some(Node::Metal { .. }) | Some(Node::Glass { .. }) | Some(Node::Emissive { .. }) => {
                Color::BLACK
            }
            _ => warning_color(hit.uv),
        }
    }

    /// [`albedo`](Self::albedo) for an optional handle.
    pub fn diffuse_response(&self, bsdf: Option<NodeId>, hit: &HitContext) -> Color {
        match bsdf {
            Some(id) => self.albedo(id, hit),
            None => warning_color(hit.uv),
        }
    }
}

fn diffuse(color: Color, hit: &HitContext, rng: &mut dyn RngCore) -> BsdfSample {
    let (direction, pdf) = cosine_hemisphere(hit.normal, rng);
    BsdfSample {
        direction,
        attenuation: color,
        pdf,
    }
}

fn specular(color: Color, fuzz: f32, hit: &HitContext, rng: &mut dyn RngCore) -> Option<BsdfSample> {
    let mut reflected = reflect(hit.incoming, hit.normal).normalize();
    if fuzz > 0.0 {
        reflected = (reflected + fuzz * random_unit_vector(rng)).normalize();
    }
    // Fuzz pushed the ray under the surface
    if reflected.dot(hit.normal) <= 0.0 {
        return None;
    }
    Some(BsdfSample {
        direction: reflected,
        attenuation: color,
        pdf: 1.0,
    })
}

fn dielectric(color: Color, fuzz: f32, ior: f32, hit: &HitContext, rng: &mut dyn RngCore) -> BsdfSample {
    let ri = if hit.front_face { 1.0 / ior } else { ior };
    let unit = hit.incoming.normalize();
    let cos_theta = (-unit).dot(hit.normal).min(1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

    let cannot_refract = ri * sin_theta > 1.0;
    let mut direction = if cannot_refract || schlick(cos_theta, ri) > gen_f32(rng) {
        reflect(unit, hit.normal)
    } else {
        refract(unit, hit.normal, ri)
    };
    if fuzz > 0.0 {
        direction += fuzz * random_unit_vector(rng);
    }

    BsdfSample {
        direction: direction.normalize_or_zero(),
        attenuation: color,
        pdf: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::hit_with;
    use super::super::WARNING_LIGHT;
    use super::*;
    use crate::scene::Material;
    use cinder_math::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_diffuse_sample_upper_hemisphere() {
        let mut store = NodeStore::new();
        let red = store.color(Color::new(0.9, 0.1, 0.1));
        let bsdf = store.diffuse(red);
        let material = Material::default();
        let hit = hit_with(&material, Vec2::ZERO);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..100 {
            let sample = store.sample_bsdf(Some(bsdf), &hit, &mut rng).unwrap();
            assert!(sample.direction.dot(hit.normal) >= 0.0);
            assert_eq!(sample.attenuation, Color::new(0.9, 0.1, 0.1));
        }
        assert_eq!(store.albedo(bsdf, &hit), Color::new(0.9, 0.1, 0.1));
    }

    #[test]
    fn test_emissive_absorbs_and_emits() {
        let mut store = NodeStore::new();
        let white = store.color(Color::WHITE);
        let four = store.value(4.0);
        let light = store.emissive(white, four);
        let material = Material::default();
        let hit = hit_with(&material, Vec2::ZERO);
        let mut rng = StdRng::seed_from_u64(3);

        assert!(store.sample_bsdf(Some(light), &hit, &mut rng).is_none());
        assert_eq!(store.emission(Some(light), &hit), Color::gray(4.0));
        assert_eq!(store.emission(None, &hit), Color::BLACK);
    }

    #[test]
    fn test_smooth_metal_is_mirror() {
        let mut store = NodeStore::new();
        let white = store.color(Color::WHITE);
        let zero = store.value(0.0);
        let metal = store.metal(white, zero);
        let material = Material::default();
        let mut hit = hit_with(&material, Vec2::ZERO);
        hit.incoming = Vec3::new(1.0, -1.0, 0.0).normalize();
        let mut rng = StdRng::seed_from_u64(3);

        let sample = store.sample_bsdf(Some(metal), &hit, &mut rng).unwrap();
        assert!((sample.direction - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-5);
    }

    #[test]
    fn test_plastic_mixes_both_lobes() {
        let mut store = NodeStore::new();
        let blue = store.color(Color::new(0.1, 0.1, 0.9));
        let plastic = store.plastic(blue, None, None);
        let material = Material::default();
        let mut hit = hit_with(&material, Vec2::ZERO);
        // Grazing incidence makes the specular lobe likely but not certain
        hit.incoming = Vec3::new(1.0, -0.2, 0.0).normalize();
        let mut rng = StdRng::seed_from_u64(11);

        let mut specular = 0;
        let mut diffuse = 0;
        for _ in 0..500 {
            if let Some(s) = store.sample_bsdf(Some(plastic), &hit, &mut rng) {
                if s.attenuation == Color::WHITE {
                    specular += 1;
                } else {
                    diffuse += 1;
                }
            }
        }
        assert!(specular > 0);
        assert!(diffuse > 0);
    }

    #[test]
    fn test_glass_total_internal_reflection() {
        let mut store = NodeStore::new();
        let white = store.color(Color::WHITE);
        let zero = store.value(0.0);
        let ior = store.value(1.5);
        let glass = store.glass(white, zero, ior);
        let material = Material::default();
        let mut hit = hit_with(&material, Vec2::ZERO);
        hit.front_face = false;
        hit.incoming = Vec3::new(1.0, -0.1, 0.0).normalize();
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..20 {
            let s = store.sample_bsdf(Some(glass), &hit, &mut rng).unwrap();
            assert!(s.direction.y > 0.0);
        }
    }

    #[test]
    fn test_missing_or_non_bsdf_falls_back_to_warning() {
        let mut store = NodeStore::new();
        let not_a_bsdf = store.value(1.0);
        let material = Material::default();
        let hit = hit_with(&material, Vec2::new(0.01, 0.01));
        let mut rng = StdRng::seed_from_u64(5);

        let a = store.sample_bsdf(None, &hit, &mut rng).unwrap();
        let b = store.sample_bsdf(Some(not_a_bsdf), &hit, &mut rng).unwrap();
        assert_eq!(a.attenuation, WARNING_LIGHT);
        assert_eq!(b.attenuation, WARNING_LIGHT);
        assert_eq!(store.diffuse_response(None, &hit), WARNING_LIGHT);
    }

    #[test]
    fn test_mix_bsdf_extremes() {
        let mut store = NodeStore::new();
        let red = store.color(Color::new(1.0, 0.0, 0.0));
        let green = store.color(Color::new(0.0, 1.0, 0.0));
        let a = store.diffuse(red);
        let b = store.diffuse(green);
        let one = store.value(1.0);
        let mix = store.mix_bsdf(a, b, one);
        let material = Material::default();
        let hit = hit_with(&material, Vec2::ZERO);
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..20 {
            let s = store.sample_bsdf(Some(mix), &hit, &mut rng).unwrap();
            assert_eq!(s.attenuation, Color::new(0.0, 1.0, 0.0));
        }
        assert_eq!(store.albedo(mix, &hit), Color::new(0.0, 1.0, 0.0));
    }
}
