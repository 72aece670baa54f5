//! Cinder Core - scene store and shader graph for the cinder path tracer.
//!
//! This crate provides:
//!
//! - **Scene types**: `Scene`, `Mesh`, `Sphere`, `Instance`, `Camera`, `Light`
//! - **Shader graph**: a hash-consed `NodeStore` of value, vector, color and
//!   BSDF nodes, evaluated lazily per hit
//! - **Textures**: image loading into linear float textures
//!
//! # Example
//!
//! ```
//! use cinder_core::{Camera, Instance, Light, Material, Scene, Sphere};
//! use cinder_math::{Color, Transform, Vec3};
//!
//! let mut scene = Scene::new("example");
//! let red = scene.nodes.color(Color::new(0.8, 0.1, 0.1));
//! let bsdf = scene.nodes.diffuse(red);
//! let material = scene.add_material(Material::new("red", bsdf));
//!
//! let sphere = scene.add_sphere(Sphere::new(Vec3::ZERO, 1.0, material));
//! scene.add_instance(Instance::sphere(sphere, Transform::IDENTITY));
//! scene.add_light(Light::new(Vec3::new(0.0, 5.0, 5.0), Color::WHITE));
//! scene.add_camera(Camera::perspective(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 40.0));
//!
//! scene.validate().unwrap();
//! ```

pub mod error;
pub mod mesh;
pub mod nodes;
pub mod sampling;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use error::{SceneError, SceneResult};
pub use mesh::{Mesh, Polygon};
pub use nodes::{BsdfSample, HitContext, HitInput, MathOp, Node, NodeId, NodeStore, Value, VecOp};
pub use scene::{
    Background, Camera, Instance, Light, Material, MaterialId, ObjectRef, Projection, Scene,
    Sphere,
};
pub use texture::{Texture, TextureCache, TextureError, TextureId};
