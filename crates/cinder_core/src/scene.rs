//! Scene store types.
//!
//! A [`Scene`] is filled in by a loader, checked once with
//! [`Scene::validate`], and then shared read-only by every render thread.

use std::collections::HashSet;
use std::sync::Arc;

use cinder_math::{Color, Transform, Vec3};

use crate::error::{SceneError, SceneResult};
use crate::mesh::Mesh;
use crate::nodes::{Node, NodeId, NodeStore};
use crate::texture::{Texture, TextureId};

/// Index of a material in `Scene::materials`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

impl MaterialId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A surface material: a BSDF node plus the scalars the integrator and
/// some BSDFs read directly.
#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,

    /// Root BSDF node. `None` renders as the warning material.
    pub bsdf: Option<NodeId>,

    /// Throughput multiplier applied at every bounce off this surface
    pub reflectivity: f32,

    /// Default roughness for BSDFs without a roughness input
    pub roughness: f32,

    /// Default index of refraction for BSDFs without an IOR input
    pub ior: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            bsdf: None,
            reflectivity: 1.0,
            roughness: 0.0,
            ior: 1.45,
        }
    }
}

impl Material {
    pub fn new(name: impl Into<String>, bsdf: NodeId) -> Self {
        Self {
            name: name.into(),
            bsdf: Some(bsdf),
            ..Default::default()
        }
    }

    pub fn with_reflectivity(mut self, reflectivity: f32) -> Self {
        self.reflectivity = reflectivity;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_ior(mut self, ior: f32) -> Self {
        self.ior = ior;
        self
    }
}

/// An analytic sphere. Always intersected in closed form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: MaterialId,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: MaterialId) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }
}

/// What an [`Instance`] places in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectRef {
    Mesh(usize),
    Sphere(usize),
}

/// A placed copy of a mesh or sphere.
#[derive(Clone, Debug)]
pub struct Instance {
    pub object: ObjectRef,

    pub transform: Transform,

    /// Per-slot material overrides. When non-empty this table replaces the
    /// object's own material table entirely.
    pub materials: Vec<MaterialId>,

    /// Instance is a light source; it never casts shadows
    pub emits_light: bool,

    /// Shadow rays count any hit on this instance's bounds as occluded
    pub approximate_shadows: bool,
}

impl Instance {
    pub fn new(object: ObjectRef, transform: Transform) -> Self {
        Self {
            object,
            transform,
            materials: Vec::new(),
            emits_light: false,
            approximate_shadows: false,
        }
    }

    pub fn mesh(index: usize, transform: Transform) -> Self {
        Self::new(ObjectRef::Mesh(index), transform)
    }

    pub fn sphere(index: usize, transform: Transform) -> Self {
        Self::new(ObjectRef::Sphere(index), transform)
    }

    pub fn with_materials(mut self, materials: Vec<MaterialId>) -> Self {
        self.materials = materials;
        self
    }

    pub fn with_emits_light(mut self, emits_light: bool) -> Self {
        self.emits_light = emits_light;
        self
    }

    pub fn with_approximate_shadows(mut self, approximate: bool) -> Self {
        self.approximate_shadows = approximate;
        self
    }

    /// Resolve a material slot, preferring the override table.
    pub fn resolve_material(&self, slot: u32, object_table: &[MaterialId]) -> Option<MaterialId> {
        let table = if self.materials.is_empty() {
            object_table
        } else {
            &self.materials
        };
        table.get(slot as usize).copied()
    }
}

/// Camera projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    /// Vertical field of view in degrees
    Perspective { fov: f32 },
    /// Orthographic view, `width` world units across the image
    Orthographic { width: f32 },
}

/// A scene camera.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    pub projection: Projection,

    /// Distance to the plane of perfect focus, 0 focuses on `look_at`
    pub focus_distance: f32,

    /// Aperture f-number, 0 disables depth of field
    pub fstop: f32,

    pub width: u32,
    pub height: u32,

    /// Samples per pixel
    pub samples: u32,

    /// Bounce limit
    pub bounces: u32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            look_at: Vec3::ZERO,
            up: Vec3::Y,
            projection: Projection::Perspective { fov: 45.0 },
            focus_distance: 0.0,
            fstop: 0.0,
            width: 800,
            height: 600,
            samples: 16,
            bounces: 8,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn perspective(position: Vec3, look_at: Vec3, fov: f32) -> Self {
        Self {
            position,
            look_at,
            projection: Projection::Perspective { fov },
            ..Default::default()
        }
    }

    pub fn orthographic(position: Vec3, look_at: Vec3, width: f32) -> Self {
        Self {
            position,
            look_at,
            projection: Projection::Orthographic { width },
            ..Default::default()
        }
    }

    pub fn with_up(mut self, up: Vec3) -> Self {
        self.up = up;
        self
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_bounces(mut self, bounces: u32) -> Self {
        self.bounces = bounces;
        self
    }

    /// Enable depth of field.
    pub fn with_focus(mut self, focus_distance: f32, fstop: f32) -> Self {
        self.focus_distance = focus_distance;
        self.fstop = fstop;
        self
    }

    /// Focus distance actually used: the explicit one, else the look-at distance.
    pub fn effective_focus_distance(&self) -> f32 {
        if self.focus_distance > 0.0 {
            self.focus_distance
        } else {
            (self.look_at - self.position).length()
        }
    }
}

/// A point light, optionally sampled over a ball of `radius`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub intensity: Color,
    pub radius: f32,
}

impl Light {
    pub fn new(position: Vec3, intensity: Color) -> Self {
        Self {
            position,
            intensity,
            radius: 0.0,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }
}

/// What rays that leave the scene see.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Background {
    Solid(Color),
    /// Vertical blend from `bottom` (looking down) to `top` (looking up)
    Gradient { top: Color, bottom: Color },
}

impl Default for Background {
    fn default() -> Self {
        Background::Gradient {
            top: Color::new(0.5, 0.7, 1.0),
            bottom: Color::WHITE,
        }
    }
}

impl Background {
    pub fn sample(&self, direction: Vec3) -> Color {
        match *self {
            Background::Solid(c) => c,
            Background::Gradient { top, bottom } => {
                let a = 0.5 * (direction.normalize_or_zero().y + 1.0);
                bottom.lerp(top, a)
            }
        }
    }
}

/// Everything the renderer reads.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    /// Scene name, used in logs
    pub name: String,

    pub meshes: Vec<Mesh>,
    pub spheres: Vec<Sphere>,
    pub instances: Vec<Instance>,
    pub cameras: Vec<Camera>,
    pub lights: Vec<Light>,
    pub background: Background,
    pub materials: Vec<Material>,
    pub nodes: NodeStore,
    pub textures: Vec<Arc<Texture>>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn add_sphere(&mut self, sphere: Sphere) -> usize {
        self.spheres.push(sphere);
        self.spheres.len() - 1
    }

    pub fn add_instance(&mut self, instance: Instance) -> usize {
        self.instances.push(instance);
        self.instances.len() - 1
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() as u32 - 1)
    }

    pub fn add_camera(&mut self, camera: Camera) -> usize {
        self.cameras.push(camera);
        self.cameras.len() - 1
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn add_texture(&mut self, texture: Arc<Texture>) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() as u32 - 1)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.index())
    }

    /// Total triangles across all mesh instances.
    pub fn total_triangle_count(&self) -> usize {
        self.instances
            .iter()
            .filter_map(|i| match i.object {
                ObjectRef::Mesh(m) => self.meshes.get(m),
                ObjectRef::Sphere(_) => None,
            })
            .map(Mesh::triangle_count)
            .sum()
    }

    /// Check every cross-reference in the scene.
    ///
    /// A scene that passes can be rendered with unchecked lookups.
    /// Materials without a BSDF are allowed; they render with the
    /// warning material.
    pub fn validate(&self) -> SceneResult<()> {
        for (i, mesh) in self.meshes.iter().enumerate() {
            self.validate_mesh(mesh)?;
            for &id in &mesh.materials {
                self.check_material(id, || format!("mesh \"{}\"", mesh.name))?;
            }
            log::trace!("mesh {} \"{}\" ok", i, mesh.name);
        }

        for (i, sphere) in self.spheres.iter().enumerate() {
            if sphere.radius.is_nan() || sphere.radius <= 0.0 {
                return Err(SceneError::InvalidSphere {
                    sphere: i,
                    radius: sphere.radius,
                });
            }
            self.check_material(sphere.material, || format!("sphere {i}"))?;
        }

        for (i, instance) in self.instances.iter().enumerate() {
            for &id in &instance.materials {
                self.check_material(id, || format!("instance {i}"))?;
            }
            match instance.object {
                ObjectRef::Mesh(m) => {
                    let mesh = self.meshes.get(m).ok_or(SceneError::ObjectOutOfRange {
                        instance: i,
                        kind: "mesh",
                        index: m,
                        count: self.meshes.len(),
                    })?;
                    let slots: HashSet<u32> = mesh.polygons.iter().map(|p| p.material).collect();
                    for slot in slots {
                        if instance.resolve_material(slot, &mesh.materials).is_none() {
                            return Err(SceneError::MaterialSlotUnresolved {
                                owner: format!("instance {i} of mesh \"{}\"", mesh.name),
                                slot,
                                available: instance.materials.len().max(mesh.materials.len()),
                            });
                        }
                    }
                }
                ObjectRef::Sphere(s) => {
                    if s >= self.spheres.len() {
                        return Err(SceneError::ObjectOutOfRange {
                            instance: i,
                            kind: "sphere",
                            index: s,
                            count: self.spheres.len(),
                        });
                    }
                }
            }
        }

        for material in &self.materials {
            if let Some(node) = material.bsdf {
                if node.index() >= self.nodes.len() {
                    return Err(SceneError::NodeOutOfRange {
                        material: material.name.clone(),
                        node: node.index(),
                        count: self.nodes.len(),
                    });
                }
            }
        }

        self.validate_nodes()
    }

    fn check_material(&self, id: MaterialId, owner: impl FnOnce() -> String) -> SceneResult<()> {
        if id.index() < self.materials.len() {
            Ok(())
        } else {
            Err(SceneError::MaterialOutOfRange {
                owner: owner(),
                material: id.index(),
                count: self.materials.len(),
            })
        }
    }

    fn validate_mesh(&self, mesh: &Mesh) -> SceneResult<()> {
        let in_range = |indices: [u32; 3], len: usize| indices.iter().all(|&i| (i as usize) < len);

        for (p, polygon) in mesh.polygons.iter().enumerate() {
            let bad = if !in_range(polygon.vertex, mesh.positions.len()) {
                Some("position")
            } else if polygon.normal.is_some_and(|n| !in_range(n, mesh.normals.len())) {
                Some("normal")
            } else if polygon.uv.is_some_and(|uv| !in_range(uv, mesh.uvs.len())) {
                Some("uv")
            } else {
                None
            };
            if let Some(buffer) = bad {
                return Err(SceneError::PolygonIndexOutOfRange {
                    mesh: mesh.name.clone(),
                    polygon: p,
                    buffer,
                });
            }
        }
        Ok(())
    }

    /// Node inputs must point at earlier nodes, which also rules out cycles.
    fn validate_nodes(&self) -> SceneResult<()> {
        for (id, node) in self.nodes.iter() {
            if let Node::Image(texture) = node {
                if texture.index() >= self.textures.len() {
                    return Err(SceneError::TextureOutOfRange {
                        texture: texture.index(),
                        count: self.textures.len(),
                    });
                }
            }
            if let Some(input) = node.inputs().into_iter().find(|input| *input >= id) {
                return Err(SceneError::NodeOutOfRange {
                    material: format!("<node {}>", id.index()),
                    node: input.index(),
                    count: id.index(),
                });
            }
        }
        Ok(())
    }
}
