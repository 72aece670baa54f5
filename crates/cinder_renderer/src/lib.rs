//! cinder renderer - tile-scheduled CPU path tracing.
//!
//! Takes a [`cinder_core::Scene`] and produces a linear framebuffer:
//!
//! - [`bvh`]: binned-SAH bounding volume hierarchy, used per mesh and
//!   over instances
//! - [`world`]: the prepared scene with its acceleration structures
//! - [`integrator`]: iterative path tracer with direct lighting
//! - [`tile`] and [`renderer`]: image tiles, worker pool and progress
//!
//! ```no_run
//! use cinder_core::Scene;
//! use cinder_renderer::{RenderPreferences, Renderer};
//!
//! # fn load() -> Scene { Scene::new("demo") }
//! let scene = load();
//! let output = Renderer::new(&scene, RenderPreferences::default().with_samples(64))
//!     .render(&())
//!     .expect("render failed");
//! output.to_rgba_image().save("out.png").expect("save failed");
//! ```

pub mod bvh;
pub mod camera;
pub mod framebuffer;
pub mod geometry;
pub mod integrator;
pub mod renderer;
pub mod tile;
pub mod world;

pub use bvh::{Bvh, BvhNode};
pub use camera::CameraRays;
pub use framebuffer::{running_average, Framebuffer, TileRegion, TileResult};
pub use integrator::Integrator;
pub use renderer::{
    RenderControl, RenderError, RenderMetadata, RenderObserver, RenderOutput, RenderPreferences, RenderResult,
    RenderStatus, Renderer,
};
pub use tile::{quantize, Tile, TileOrder, TileState, TileStatus, DEFAULT_TILE_SIZE};
pub use world::{HitKind, SurfaceHit, World};
