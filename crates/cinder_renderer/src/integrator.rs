//! Path tracing integrator.
//!
//! Iterative bounce loop with explicit direct lighting at every vertex.
//! There is no Russian roulette: paths end on a miss, on absorption, when
//! throughput falls to nearly zero, or at the bounce limit.

use cinder_core::sampling::random_in_radius;
use cinder_core::{HitContext, Material, MaterialId, NodeId, Scene};
use cinder_math::{Color, Ray};
use rand::RngCore;

use crate::world::{SurfaceHit, World};

/// Paths whose throughput drops to this level are terminated.
pub const THROUGHPUT_EPSILON: f32 = 1e-4;

/// Computes radiance samples for camera rays.
pub struct Integrator<'w, 'a> {
    world: &'w World<'a>,
    area_lights: bool,
    /// Stands in for unresolvable material slots
    fallback: Material,
}

impl<'w, 'a> Integrator<'w, 'a> {
    /// Create an integrator over a prepared world.
    ///
    /// Materials that will render with the warning BSDF are reported here,
    /// once per material.
    pub fn new(world: &'w World<'a>, area_lights: bool) -> Self {
        let scene = world.scene();
        for (i, material) in scene.materials.iter().enumerate() {
            let resolved = material
                .bsdf
                .and_then(|id| scene.nodes.get(id))
                .is_some_and(|node| node.is_bsdf());
            if !resolved {
                log::warn!(
                    "Material {} (\"{}\") has no usable BSDF, rendering with the warning material",
                    i,
                    material.name
                );
            }
        }

        Self {
            world,
            area_lights,
            fallback: Material::default(),
        }
    }

    /// Radiance arriving along `ray`.
    pub fn trace(&self, ray: Ray, max_bounces: u32, rng: &mut dyn RngCore) -> Color {
        let scene = self.world.scene();
        let mut radiance = Color::BLACK;
        let mut throughput = Color::WHITE;
        let mut ray = ray;

        for bounce in 0..=max_bounces {
            let Some(hit) = self.world.intersect(&ray) else {
                radiance += throughput * scene.background.sample(ray.direction);
                break;
            };

            let material = self.material(scene, hit.material);
            let context = HitContext {
                position: hit.position,
                normal: hit.normal,
                uv: hit.uv,
                incoming: ray.direction.normalize(),
                front_face: hit.front_face,
                material,
                textures: &scene.textures,
            };

            radiance += throughput * scene.nodes.emission(material.bsdf, &context);
            radiance += throughput * self.direct_light(&hit, material.bsdf, &context, rng);

            if bounce == max_bounces {
                break;
            }

            let Some(sample) = scene.nodes.sample_bsdf(material.bsdf, &context, rng) else {
                break;
            };

            throughput = throughput * sample.attenuation * material.reflectivity;
            if throughput.is_black(THROUGHPUT_EPSILON) {
                break;
            }

            ray = Ray::new(hit.position, sample.direction);
        }

        radiance.with_alpha(1.0)
    }

    fn material(&self, scene: &'a Scene, id: Option<MaterialId>) -> &Material {
        id.and_then(|id| scene.material(id)).unwrap_or(&self.fallback)
    }

    /// Unshadowed contribution of every light, without distance falloff.
    fn direct_light(
        &self,
        hit: &SurfaceHit,
        bsdf: Option<NodeId>,
        context: &HitContext,
        rng: &mut dyn RngCore,
    ) -> Color {
        let scene = self.world.scene();
        if scene.lights.is_empty() {
            return Color::BLACK;
        }

        let albedo = scene.nodes.diffuse_response(bsdf, context);
        if albedo.is_black(0.0) {
            return Color::BLACK;
        }

        let mut total = Color::BLACK;
        for light in &scene.lights {
            let target = if self.area_lights && light.radius > 0.0 {
                random_in_radius(light.position, light.radius, rng)
            } else {
                light.position
            };

            let to_light = target - hit.position;
            let distance = to_light.length();
            if distance <= 0.0 {
                continue;
            }
            let direction = to_light / distance;

            let cos_theta = hit.normal.dot(direction);
            if cos_theta <= 0.0 {
                continue;
            }

            if self.world.occluded(&Ray::new(hit.position, direction), distance) {
                continue;
            }

            total += light.intensity * albedo * cos_theta;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_core::{Background, Instance, Light, Sphere};
    use cinder_math::{Transform, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn lit_sphere_scene(color: Color) -> Scene {
        let mut scene = Scene::new("lit");
        let albedo = scene.nodes.color(color);
        let diffuse = scene.nodes.diffuse(albedo);
        let m = scene.add_material(Material::new("diffuse", diffuse));
        let s = scene.add_sphere(Sphere::new(Vec3::ZERO, 1.0, m));
        scene.add_instance(Instance::sphere(s, Transform::IDENTITY));
        scene.add_light(Light::new(Vec3::new(0.0, 0.0, 5.0), Color::WHITE));
        scene.background = Background::Solid(Color::BLACK);
        scene
    }

    #[test]
    fn test_miss_returns_background() {
        let mut scene = Scene::new("empty");
        scene.background = Background::Solid(Color::new(0.2, 0.3, 0.4));
        let world = World::build(&scene);
        let integrator = Integrator::new(&world, false);
        let mut rng = StdRng::seed_from_u64(1);

        let c = integrator.trace(Ray::new(Vec3::ZERO, Vec3::Z), 4, &mut rng);
        assert_eq!(c, Color::new(0.2, 0.3, 0.4));
    }

    #[test]
    fn test_direct_light_no_bounces() {
        let scene = lit_sphere_scene(Color::new(0.5, 0.25, 1.0));
        let world = World::build(&scene);
        let integrator = Integrator::new(&world, false);
        let mut rng = StdRng::seed_from_u64(1);

        // Head-on: n.l = 1, so the result is exactly the albedo
        let c = integrator.trace(Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z), 0, &mut rng);
        assert!((c.r - 0.5).abs() < 1e-4);
        assert!((c.g - 0.25).abs() < 1e-4);
        assert!((c.b - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_back_side_is_unlit() {
        let scene = lit_sphere_scene(Color::WHITE);
        let world = World::build(&scene);
        let integrator = Integrator::new(&world, false);
        let mut rng = StdRng::seed_from_u64(1);

        let c = integrator.trace(Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z), 0, &mut rng);
        assert_eq!(c, Color::BLACK);
    }

    #[test]
    fn test_emission_is_added() {
        let mut scene = Scene::new("emitter");
        let white = scene.nodes.color(Color::WHITE);
        let two = scene.nodes.value(2.0);
        let emissive = scene.nodes.emissive(white, two);
        let m = scene.add_material(Material::new("light", emissive));
        let s = scene.add_sphere(Sphere::new(Vec3::ZERO, 1.0, m));
        scene.add_instance(Instance::sphere(s, Transform::IDENTITY));
        scene.background = Background::Solid(Color::BLACK);
        let world = World::build(&scene);
        let integrator = Integrator::new(&world, false);
        let mut rng = StdRng::seed_from_u64(1);

        let c = integrator.trace(Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z), 3, &mut rng);
        assert_eq!(c, Color::gray(2.0));
    }

    #[test]
    fn test_missing_bsdf_renders_warning() {
        let mut scene = Scene::new("warning");
        let m = scene.add_material(Material::default());
        let s = scene.add_sphere(Sphere::new(Vec3::ZERO, 1.0, m));
        scene.add_instance(Instance::sphere(s, Transform::IDENTITY));
        scene.add_light(Light::new(Vec3::new(0.0, 0.0, 5.0), Color::WHITE));
        scene.background = Background::Solid(Color::BLACK);
        let world = World::build(&scene);
        let integrator = Integrator::new(&world, false);
        let mut rng = StdRng::seed_from_u64(1);

        let c = integrator.trace(Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z), 0, &mut rng);
        // Either checker color, never anything else
        let magenta = Color::new(1.0, 0.0, 1.0);
        assert!(c == Color::BLACK || (c.r - magenta.r).abs() < 1e-4 && c.g.abs() < 1e-4);
    }

    #[test]
    fn test_bounded_energy() {
        let scene = lit_sphere_scene(Color::gray(0.8));
        let world = World::build(&scene);
        let integrator = Integrator::new(&world, true);
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..50 {
            let c = integrator.trace(Ray::new(Vec3::new(0.3, 0.2, 5.0), -Vec3::Z), 8, &mut rng);
            assert!(c.r.is_finite() && c.r >= 0.0 && c.r <= 1.0 + 1e-4);
        }
    }
}
