//! The prepared, render-ready view of a scene.
//!
//! Preparing builds one BVH per mesh (in parallel), then a top-level BVH
//! over the world bounds of every mesh instance. Sphere instances are kept
//! in a flat list and tested brute force.

use std::time::Instant;

use cinder_core::{Instance, MaterialId, Mesh, ObjectRef, Scene};
use cinder_math::{Aabb, Interval, Ray, Vec2, Vec3, RAY_EPSILON};
use rayon::prelude::*;

use crate::bvh::Bvh;
use crate::geometry::{intersect_sphere, intersect_triangle, sphere_uv, TriangleHit};

/// Which kind of primitive produced a hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitKind {
    Sphere,
    Polygon { index: usize },
}

/// A fully resolved surface hit, in world space.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceHit {
    pub t: f32,
    pub position: Vec3,
    /// Unit normal facing against the ray
    pub normal: Vec3,
    /// True when the ray hit the outside of the surface
    pub front_face: bool,
    pub uv: Vec2,
    /// `None` when the material slot does not resolve
    pub material: Option<MaterialId>,
    pub instance: usize,
    pub kind: HitKind,
}

/// Closest polygon candidate, shaded only if it wins.
#[derive(Clone, Copy)]
struct MeshCandidate {
    instance: usize,
    mesh: usize,
    polygon: usize,
    hit: TriangleHit,
}

/// Immutable acceleration structures for one scene.
pub struct World<'a> {
    scene: &'a Scene,
    mesh_bvhs: Vec<Bvh>,
    /// Instance index for each top-level BVH primitive
    mesh_instances: Vec<usize>,
    /// World bounds, parallel to `mesh_instances`
    mesh_instance_bounds: Vec<Aabb>,
    top_level: Bvh,
    /// (instance, sphere) pairs
    sphere_instances: Vec<(usize, usize)>,
}

impl<'a> World<'a> {
    /// Build all acceleration structures for `scene`.
    ///
    /// The scene must already be validated.
    pub fn build(scene: &'a Scene) -> Self {
        let start = Instant::now();

        let mesh_bvhs: Vec<Bvh> = scene.meshes.par_iter().map(build_mesh_bvh).collect();
        log::info!(
            "Built {} mesh BVHs in {:.2}ms",
            mesh_bvhs.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        let mut mesh_instances = Vec::new();
        let mut mesh_instance_bounds = Vec::new();
        let mut sphere_instances = Vec::new();
        for (i, instance) in scene.instances.iter().enumerate() {
            match instance.object {
                ObjectRef::Mesh(m) => {
                    let local = mesh_bvhs[m].bounds();
                    if local.is_empty() {
                        continue;
                    }
                    mesh_instances.push(i);
                    mesh_instance_bounds.push(instance.transform.transform_aabb(&local));
                }
                ObjectRef::Sphere(s) => sphere_instances.push((i, s)),
            }
        }

        let top_start = Instant::now();
        let top_level = Bvh::build(&mesh_instance_bounds);
        log::info!(
            "Built top-level BVH over {} mesh instances (depth {}) in {:.2}ms, {} sphere instances",
            mesh_instances.len(),
            top_level.depth(),
            top_start.elapsed().as_secs_f64() * 1000.0,
            sphere_instances.len()
        );

        Self {
            scene,
            mesh_bvhs,
            mesh_instances,
            mesh_instance_bounds,
            top_level,
            sphere_instances,
        }
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    pub fn mesh_bvh(&self, mesh: usize) -> Option<&Bvh> {
        self.mesh_bvhs.get(mesh)
    }

    pub fn top_level(&self) -> &Bvh {
        &self.top_level
    }

    /// Closest hit along `ray`, spheres and polygons together.
    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let mut closest = f32::INFINITY;
        let mut sphere_hit: Option<(usize, usize, f32)> = None;

        for &(i, s) in &self.sphere_instances {
            let range = Interval::new(RAY_EPSILON, closest);
            if let Some(t) = self.intersect_sphere_instance(i, s, ray, range) {
                closest = t;
                sphere_hit = Some((i, s, t));
            }
        }

        // Polygons only count if they beat the best sphere
        let mut candidate: Option<MeshCandidate> = None;
        self.top_level
            .traverse_nearest(ray, Interval::new(RAY_EPSILON, closest), |slot, range| {
                let instance = self.mesh_instances[slot];
                let found = self.intersect_mesh_instance(instance, ray, range)?;
                candidate = Some(found);
                Some(found.hit.t)
            });

        match (candidate, sphere_hit) {
            (Some(c), _) => Some(self.shade_polygon(c, ray)),
            (None, Some((instance, sphere, t))) => Some(self.shade_sphere(instance, sphere, ray, t)),
            (None, None) => None,
        }
    }

    /// True if anything blocks the segment from `ray.origin` to
    /// `ray.at(max_t)`.
    ///
    /// Light-emitting instances never occlude. Instances flagged for
    /// approximate shadows occlude wherever their bounds are hit.
    pub fn occluded(&self, ray: &Ray, max_t: f32) -> bool {
        let range = Interval::new(RAY_EPSILON, max_t);
        let instances = &self.scene.instances;

        let sphere_blocks = self.sphere_instances.iter().any(|&(i, s)| {
            !instances[i].emits_light && self.intersect_sphere_instance(i, s, ray, range).is_some()
        });
        if sphere_blocks {
            return true;
        }

        self.top_level.traverse_any(ray, range, |slot, range| {
            let index = self.mesh_instances[slot];
            let instance = &instances[index];
            if instance.emits_light {
                return false;
            }
            if instance.approximate_shadows {
                return self.mesh_instance_bounds[slot].hit(ray, range);
            }
            self.any_mesh_hit(instance, ray, range)
        })
    }

    fn intersect_sphere_instance(&self, index: usize, sphere: usize, ray: &Ray, range: Interval) -> Option<f32> {
        let instance = &self.scene.instances[index];
        let sphere = &self.scene.spheres[sphere];
        let local = instance.transform.ray_to_local(ray);
        intersect_sphere(&local, sphere.center, sphere.radius, range)
    }

    fn intersect_mesh_instance(&self, index: usize, ray: &Ray, range: Interval) -> Option<MeshCandidate> {
        let instance = &self.scene.instances[index];
        let ObjectRef::Mesh(m) = instance.object else {
            return None;
        };
        let mesh = &self.scene.meshes[m];
        let local = instance.transform.ray_to_local(ray);

        let mut best: Option<MeshCandidate> = None;
        self.mesh_bvhs[m].traverse_nearest(&local, range, |p, range| {
            let hit = intersect_triangle(&local, mesh.triangle(&mesh.polygons[p]), range)?;
            best = Some(MeshCandidate {
                instance: index,
                mesh: m,
                polygon: p,
                hit,
            });
            Some(hit.t)
        });
        best
    }

    fn any_mesh_hit(&self, instance: &Instance, ray: &Ray, range: Interval) -> bool {
        let ObjectRef::Mesh(m) = instance.object else {
            return false;
        };
        let mesh = &self.scene.meshes[m];
        let local = instance.transform.ray_to_local(ray);
        self.mesh_bvhs[m].traverse_any(&local, range, |p, range| {
            intersect_triangle(&local, mesh.triangle(&mesh.polygons[p]), range).is_some()
        })
    }

    fn shade_sphere(&self, index: usize, sphere: usize, ray: &Ray, t: f32) -> SurfaceHit {
        let instance = &self.scene.instances[index];
        let sphere = &self.scene.spheres[sphere];

        let local_point = instance.transform.ray_to_local(ray).at(t);
        let local_normal = (local_point - sphere.center) / sphere.radius;
        let outward = instance.transform.transform_normal(local_normal).normalize_or_zero();

        let (normal, front_face) = face_forward(ray.direction, outward);
        SurfaceHit {
            t,
            position: ray.at(t),
            normal,
            front_face,
            uv: sphere_uv(local_normal),
            material: instance.resolve_material(0, std::slice::from_ref(&sphere.material)),
            instance: index,
            kind: HitKind::Sphere,
        }
    }

    fn shade_polygon(&self, candidate: MeshCandidate, ray: &Ray) -> SurfaceHit {
        let instance = &self.scene.instances[candidate.instance];
        let mesh = &self.scene.meshes[candidate.mesh];
        let polygon = &mesh.polygons[candidate.polygon];
        let TriangleHit { t, u, v } = candidate.hit;
        let w = 1.0 - u - v;

        let [a, b, c] = mesh.triangle(polygon);
        let geometric = (b - a).cross(c - a);
        let interpolated = polygon.normal.map(|[na, nb, nc]| {
            mesh.normals[na as usize] * w + mesh.normals[nb as usize] * u + mesh.normals[nc as usize] * v
        });
        // Fall back to the face normal when interpolation cancels out
        let local_normal = match interpolated {
            Some(n) if n.length_squared() > 0.0 => n,
            _ => geometric,
        };
        let outward = instance.transform.transform_normal(local_normal).normalize_or_zero();

        let uv = match polygon.uv {
            Some([ta, tb, tc]) => {
                mesh.uvs[ta as usize] * w + mesh.uvs[tb as usize] * u + mesh.uvs[tc as usize] * v
            }
            None => Vec2::new(u, v),
        };

        let (normal, front_face) = face_forward(ray.direction, outward);
        SurfaceHit {
            t,
            position: ray.at(t),
            normal,
            front_face,
            uv,
            material: instance.resolve_material(polygon.material, &mesh.materials),
            instance: candidate.instance,
            kind: HitKind::Polygon {
                index: candidate.polygon,
            },
        }
    }
}

/// Flip `outward` to face against `direction`; also report which side was hit.
#[inline]
fn face_forward(direction: Vec3, outward: Vec3) -> (Vec3, bool) {
    let front_face = direction.dot(outward) < 0.0;
    if front_face {
        (outward, true)
    } else {
        (-outward, false)
    }
}

fn build_mesh_bvh(mesh: &Mesh) -> Bvh {
    let bounds: Vec<Aabb> = mesh.polygons.iter().map(|p| mesh.polygon_bounds(p)).collect();
    let bvh = Bvh::build(&bounds);
    log::debug!(
        "Mesh \"{}\": {} triangles, BVH depth {}",
        mesh.name,
        mesh.triangle_count(),
        bvh.depth()
    );
    bvh
}
