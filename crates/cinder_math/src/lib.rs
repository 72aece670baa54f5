//! cinder math - vectors, colors, bounds and transforms.
//!
//! Thin layer over glam with the few types the renderer needs on top:
//! intervals along a ray, axis-aligned boxes, an RGBA color value type
//! and a matrix/inverse transform pair.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod color;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use color::Color;
pub use interval::Interval;
pub use ray::{Ray, RAY_EPSILON};
pub use transform::{Mat4Ext, Transform, TransformOp};
