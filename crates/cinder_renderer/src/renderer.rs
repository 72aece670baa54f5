//! Render driver: preferences, thread pool, tile workers and progress.
//!
//! A render validates the scene, builds the acceleration structures inside
//! a dedicated rayon pool, cuts the image into tiles and starts one worker
//! per thread. Workers claim tiles through a shared atomic counter; the
//! calling thread stays behind and reports progress to the observer until
//! every worker has exited.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cinder_core::{Scene, SceneError};
use cinder_math::Color;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::CameraRays;
use crate::framebuffer::{Framebuffer, TileResult};
use crate::integrator::Integrator;
use crate::tile::{quantize, Tile, TileOrder, TileProgress, TileState, TileStatus, DEFAULT_TILE_SIZE};
use crate::world::World;

/// Extra threads on top of the logical core count when none is requested.
pub const THREAD_RESERVE: usize = 2;

/// How long a paused worker sleeps between checks.
const PAUSE_POLL: Duration = Duration::from_millis(10);

/// Errors that prevent a render from producing an image.
///
/// A stopped render is not an error.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid scene: {0}")]
    InvalidScene(#[from] SceneError),

    #[error("camera {index} out of range, scene has {count} cameras")]
    CameraOutOfRange { index: usize, count: usize },

    #[error("image size {width}x{height} has no pixels")]
    EmptyImage { width: u32, height: u32 },

    #[error("tile size {width}x{height} has no pixels")]
    EmptyTile { width: u32, height: u32 },

    #[error("tile {index} out of range, image has {count} tiles")]
    TileOutOfRange { index: usize, count: usize },

    #[error("failed to start a render thread pool")]
    ThreadPool(#[source] rayon::ThreadPoolBuildError),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Render settings that are not part of the scene.
///
/// Every field has a default, so a loader may deserialize a partial
/// object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderPreferences {
    /// Worker threads, 0 for logical cores plus [`THREAD_RESERVE`]
    pub threads: usize,
    /// Samples per pixel, `None` uses the camera's
    pub samples: Option<u32>,
    /// Bounce limit, `None` uses the camera's
    pub bounces: Option<u32>,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_order: TileOrder,
    /// Image width override
    pub width: Option<u32>,
    /// Image height override
    pub height: Option<u32>,
    /// Index into `Scene::cameras`
    pub camera: usize,
    pub seed: u64,
    /// Sample lights with a radius over their whole ball
    pub area_lights: bool,
    /// Cadence of `RenderObserver::on_status`
    pub progress_interval_ms: u64,
}

impl Default for RenderPreferences {
    fn default() -> Self {
        Self {
            threads: 0,
            samples: None,
            bounces: None,
            tile_width: DEFAULT_TILE_SIZE,
            tile_height: DEFAULT_TILE_SIZE,
            tile_order: TileOrder::default(),
            width: None,
            height: None,
            camera: 0,
            seed: 0,
            area_lights: true,
            progress_interval_ms: 500,
        }
    }
}

impl RenderPreferences {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = Some(samples);
        self
    }

    pub fn with_bounces(mut self, bounces: u32) -> Self {
        self.bounces = Some(bounces);
        self
    }

    pub fn with_tile_size(mut self, width: u32, height: u32) -> Self {
        self.tile_width = width;
        self.tile_height = height;
        self
    }

    pub fn with_tile_order(mut self, order: TileOrder) -> Self {
        self.tile_order = order;
        self
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_camera(mut self, camera: usize) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_area_lights(mut self, area_lights: bool) -> Self {
        self.area_lights = area_lights;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Thread count after resolving the automatic setting.
    pub fn resolved_threads(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            + THREAD_RESERVE
    }
}

#[derive(Debug, Default)]
struct ControlFlags {
    stop: AtomicBool,
    pause: AtomicBool,
}

/// Cloneable handle for stopping or pausing a render from any thread.
#[derive(Debug, Clone, Default)]
pub struct RenderControl {
    flags: Arc<ControlFlags>,
}

impl RenderControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask workers to abandon their tiles and exit.
    pub fn stop(&self) {
        self.flags.stop.store(true, Ordering::Release);
    }

    pub fn pause(&self) {
        self.flags.pause.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.flags.pause.store(false, Ordering::Release);
    }

    pub fn toggle_pause(&self) {
        self.flags.pause.fetch_xor(true, Ordering::AcqRel);
    }

    pub fn is_stopped(&self) -> bool {
        self.flags.stop.load(Ordering::Acquire)
    }

    pub fn is_paused(&self) -> bool {
        self.flags.pause.load(Ordering::Acquire)
    }

    /// Block while paused. Returns false once stopped.
    fn wait_while_paused(&self) -> bool {
        while self.is_paused() && !self.is_stopped() {
            std::thread::sleep(PAUSE_POLL);
        }
        !self.is_stopped()
    }
}

/// Progress report pushed to a [`RenderObserver`].
#[derive(Debug, Clone)]
pub struct RenderStatus {
    /// Fraction of all pixel samples done, 0 to 1
    pub completion: f32,
    pub elapsed: Duration,
    /// Pixel samples per second so far
    pub samples_per_second: f64,
    /// Mean wall time per pixel sample
    pub average_sample_time: Option<Duration>,
    /// Estimated time remaining
    pub eta: Option<Duration>,
    pub paused: bool,
    pub tiles: Vec<TileStatus>,
    /// Copy of the framebuffer, row-major
    pub framebuffer: Vec<Color>,
}

/// Receives render progress.
///
/// `on_start`, `on_status` and `on_stop` run on the thread that called
/// [`Renderer::render`]. `on_tile_finished` runs on the worker that
/// finished the tile, before it claims another, so it must return quickly.
pub trait RenderObserver: Sync {
    fn on_start(&self, _tiles: &[Tile], _threads: usize) {}

    fn on_status(&self, _status: &RenderStatus) {}

    fn on_tile_finished(&self, _tile: &TileStatus) {}

    /// Called once after every worker has exited.
    fn on_stop(&self, _metadata: &RenderMetadata) {}
}

/// Observer that ignores everything.
impl RenderObserver for () {}

/// Facts about a finished (or stopped) render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderMetadata {
    pub elapsed: Duration,
    pub samples: u32,
    pub bounces: u32,
    pub threads: usize,
    pub width: u32,
    pub height: u32,
    pub completed_tiles: usize,
    /// True when the render was stopped before every tile finished
    pub stopped: bool,
}

/// The result of [`Renderer::render`].
#[derive(Debug)]
pub struct RenderOutput {
    pub framebuffer: Framebuffer,
    pub metadata: RenderMetadata,
}

impl RenderOutput {
    /// Gamma-encoded 8-bit image.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        self.framebuffer.to_rgba_image()
    }

    /// Linear float image.
    pub fn to_rgba32f_image(&self) -> image::Rgba32FImage {
        self.framebuffer.to_rgba32f_image()
    }
}

/// Everything resolved from the scene and preferences before workers start.
struct RenderJob {
    camera: CameraRays,
    width: u32,
    height: u32,
    samples: u32,
    bounces: u32,
    tiles: Vec<Tile>,
}

/// What the workers leave behind.
struct RunResult {
    framebuffer: Framebuffer,
    progress: Vec<TileProgress>,
    metadata: RenderMetadata,
}

/// Renders one scene with one set of preferences.
pub struct Renderer<'a> {
    scene: &'a Scene,
    preferences: RenderPreferences,
    control: RenderControl,
}

impl<'a> Renderer<'a> {
    pub fn new(scene: &'a Scene, preferences: RenderPreferences) -> Self {
        Self {
            scene,
            preferences,
            control: RenderControl::new(),
        }
    }

    /// Use an existing control handle instead of a fresh one.
    pub fn with_control(mut self, control: RenderControl) -> Self {
        self.control = control;
        self
    }

    /// Handle for stopping or pausing this renderer.
    pub fn control(&self) -> RenderControl {
        self.control.clone()
    }

    pub fn preferences(&self) -> &RenderPreferences {
        &self.preferences
    }

    /// Tiles this renderer would produce, in render order.
    pub fn tiles(&self) -> RenderResult<Vec<Tile>> {
        Ok(self.prepare()?.tiles)
    }

    /// Render the whole image.
    ///
    /// A stop request still returns `Ok`, with `metadata.stopped` set and
    /// the framebuffer as far as it got.
    pub fn render(&self, observer: &dyn RenderObserver) -> RenderResult<RenderOutput> {
        let job = self.prepare()?;
        let queue: Vec<usize> = (0..job.tiles.len()).collect();
        let run = self.run(&job, &queue, observer)?;
        Ok(RenderOutput {
            framebuffer: run.framebuffer,
            metadata: run.metadata,
        })
    }

    /// Render only the tiles at `tile_indices` and return the ones that
    /// finished.
    ///
    /// Indices refer to positions in [`tiles`](Self::tiles). Repeated
    /// indices are rendered once, in the order they first appear. Results
    /// can be merged elsewhere with [`Framebuffer::apply_tile_result`].
    pub fn render_assigned(
        &self,
        tile_indices: &[usize],
        observer: &dyn RenderObserver,
    ) -> RenderResult<Vec<TileResult>> {
        let job = self.prepare()?;
        if let Some(&index) = tile_indices.iter().find(|&&i| i >= job.tiles.len()) {
            return Err(RenderError::TileOutOfRange {
                index,
                count: job.tiles.len(),
            });
        }

        let mut seen = HashSet::with_capacity(tile_indices.len());
        let queue: Vec<usize> = tile_indices.iter().copied().filter(|&i| seen.insert(i)).collect();
        if queue.len() < tile_indices.len() {
            log::warn!("Ignoring {} repeated tile indices", tile_indices.len() - queue.len());
        }

        let run = self.run(&job, &queue, observer)?;
        Ok(queue
            .iter()
            .map(|&i| &run.progress[i])
            .filter(|p| p.state() == TileState::Finished)
            .map(|p| run.framebuffer.region(p.tile).to_result())
            .collect())
    }

    fn prepare(&self) -> RenderResult<RenderJob> {
        let scene = self.scene;
        let prefs = &self.preferences;

        scene.validate()?;

        let camera = scene
            .cameras
            .get(prefs.camera)
            .ok_or(RenderError::CameraOutOfRange {
                index: prefs.camera,
                count: scene.cameras.len(),
            })?;

        let width = prefs.width.unwrap_or(camera.width);
        let height = prefs.height.unwrap_or(camera.height);
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyImage { width, height });
        }
        if prefs.tile_width == 0 || prefs.tile_height == 0 {
            return Err(RenderError::EmptyTile {
                width: prefs.tile_width,
                height: prefs.tile_height,
            });
        }

        let tiles = quantize(width, height, prefs.tile_width, prefs.tile_height, prefs.tile_order);

        Ok(RenderJob {
            camera: CameraRays::new(camera, width, height),
            width,
            height,
            samples: prefs.samples.unwrap_or(camera.samples).max(1),
            bounces: prefs.bounces.unwrap_or(camera.bounces),
            tiles,
        })
    }

    fn run(&self, job: &RenderJob, queue: &[usize], observer: &dyn RenderObserver) -> RenderResult<RunResult> {
        let start = Instant::now();

        let mut threads = self.preferences.resolved_threads();
        if queue.len() < threads {
            log::warn!(
                "Rendering with a less than optimal thread count due to large tile size, reducing from {} to {}",
                threads,
                queue.len().max(1)
            );
            threads = queue.len().max(1);
        }
        let (pool, threads) = build_pool(threads)?;

        let world = pool.install(|| World::build(self.scene));
        let integrator = Integrator::new(&world, self.preferences.area_lights);

        let framebuffer = Framebuffer::new(job.width, job.height);
        let progress: Vec<TileProgress> = job.tiles.iter().map(|&t| TileProgress::new(t)).collect();
        let next = AtomicUsize::new(0);

        log::info!(
            "Rendering \"{}\" at {}x{}, {} samples, {} bounces, {} tiles on {} threads",
            self.scene.name,
            job.width,
            job.height,
            job.samples,
            job.bounces,
            queue.len(),
            threads
        );
        let queued: Vec<Tile> = queue.iter().map(|&i| job.tiles[i]).collect();
        observer.on_start(&queued, threads);

        let worker = Worker {
            job,
            integrator: &integrator,
            framebuffer: &framebuffer,
            progress: &progress,
            queue,
            next: &next,
            control: &self.control,
            observer,
            seed: self.preferences.seed,
        };
        let interval = Duration::from_millis(self.preferences.progress_interval_ms.max(1));

        pool.in_place_scope(|scope| {
            let (done_tx, done_rx) = mpsc::channel::<usize>();
            for id in 0..threads {
                let worker = &worker;
                let done_tx = done_tx.clone();
                scope.spawn(move |_| {
                    worker.run();
                    let _ = done_tx.send(id);
                });
            }
            drop(done_tx);

            loop {
                match done_rx.recv_timeout(interval) {
                    Ok(id) => log::debug!("Worker {} done", id),
                    Err(RecvTimeoutError::Timeout) => {
                        observer.on_status(&self.status(job, &progress, &framebuffer, queue, start));
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        observer.on_status(&self.status(job, &progress, &framebuffer, queue, start));

        let completed_tiles = queue
            .iter()
            .filter(|&&i| progress[i].state() == TileState::Finished)
            .count();
        let stopped = completed_tiles < queue.len();
        let metadata = RenderMetadata {
            elapsed: start.elapsed(),
            samples: job.samples,
            bounces: job.bounces,
            threads,
            width: job.width,
            height: job.height,
            completed_tiles,
            stopped,
        };

        if stopped {
            log::info!(
                "Render stopped after {:.2}s, {}/{} tiles finished",
                metadata.elapsed.as_secs_f64(),
                completed_tiles,
                queue.len()
            );
        } else {
            log::info!("Render finished in {:.2}s", metadata.elapsed.as_secs_f64());
        }
        observer.on_stop(&metadata);

        Ok(RunResult {
            framebuffer,
            progress,
            metadata,
        })
    }

    fn status(
        &self,
        job: &RenderJob,
        progress: &[TileProgress],
        framebuffer: &Framebuffer,
        queue: &[usize],
        start: Instant,
    ) -> RenderStatus {
        let elapsed = start.elapsed();
        let tiles: Vec<TileStatus> = queue.iter().map(|&i| progress[i].status(job.samples)).collect();

        let done: u64 = tiles
            .iter()
            .map(|t| t.completed_samples as u64 * t.tile.pixel_count() as u64)
            .sum();
        let total: u64 = tiles
            .iter()
            .map(|t| job.samples as u64 * t.tile.pixel_count() as u64)
            .sum();

        let completion = if total > 0 { done as f64 / total as f64 } else { 1.0 };
        let seconds = elapsed.as_secs_f64();
        let samples_per_second = if seconds > 0.0 { done as f64 / seconds } else { 0.0 };
        let average_sample_time = (done > 0).then(|| elapsed.div_f64(done as f64));
        let eta = (samples_per_second > 0.0)
            .then(|| Duration::from_secs_f64((total - done) as f64 / samples_per_second));

        RenderStatus {
            completion: completion as f32,
            elapsed,
            samples_per_second,
            average_sample_time,
            eta,
            paused: self.control.is_paused(),
            tiles,
            framebuffer: framebuffer.snapshot(),
        }
    }
}

/// Shared state for the tile workers.
struct Worker<'r, 'w, 'a> {
    job: &'r RenderJob,
    integrator: &'r Integrator<'w, 'a>,
    framebuffer: &'r Framebuffer,
    progress: &'r [TileProgress],
    /// Tile indices to render, in claim order
    queue: &'r [usize],
    next: &'r AtomicUsize,
    control: &'r RenderControl,
    observer: &'r dyn RenderObserver,
    seed: u64,
}

impl Worker<'_, '_, '_> {
    fn run(&self) {
        loop {
            if self.control.is_stopped() {
                return;
            }
            let slot = self.next.fetch_add(1, Ordering::Relaxed);
            let Some(&index) = self.queue.get(slot) else {
                return;
            };
            self.render_tile(&self.progress[index]);
        }
    }

    fn render_tile(&self, progress: &TileProgress) {
        let tile = progress.tile;
        let region = self.framebuffer.region(tile);
        let samples = self.job.samples;
        progress.set_state(TileState::Rendering);
        log::debug!("Started tile {} at ({}, {})", tile.index, tile.x, tile.y);

        for pass in 1..=samples {
            if !self.control.wait_while_paused() {
                progress.set_state(TileState::Ready);
                log::debug!("Abandoned tile {} after {} samples", tile.index, pass - 1);
                return;
            }

            let mut rng = StdRng::seed_from_u64(sample_seed(self.seed, &tile, pass));
            for y in tile.y..tile.y + tile.height {
                for x in tile.x..tile.x + tile.width {
                    let ray = self.job.camera.get_ray(x, y, &mut rng);
                    let color = self.integrator.trace(ray, self.job.bounces, &mut rng);
                    region.accumulate(x, y, color, pass);
                }
            }
            progress.set_completed_samples(pass);
        }

        progress.set_state(TileState::Finished);
        log::debug!("Finished tile {}", tile.index);
        self.observer.on_tile_finished(&progress.status(samples));
    }
}

/// Build a pool of `threads` workers, halving the count on failure.
fn build_pool(threads: usize) -> RenderResult<(ThreadPool, usize)> {
    let mut threads = threads.max(1);
    loop {
        let built = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("cinder-worker-{}", i))
            .build();
        match built {
            Ok(pool) => return Ok((pool, threads)),
            Err(e) if threads > 1 => {
                let fewer = threads / 2;
                log::warn!("Failed to start {} render threads ({}), retrying with {}", threads, e, fewer);
                threads = fewer;
            }
            Err(e) => return Err(RenderError::ThreadPool(e)),
        }
    }
}

/// Seed for one pass over one tile, independent of which thread renders it.
fn sample_seed(seed: u64, tile: &Tile, pass: u32) -> u64 {
    let mut v = seed ^ ((tile.x as u64) << 40) ^ ((tile.y as u64) << 20) ^ pass as u64;
    v = v.wrapping_add(0x9e3779b97f4a7c15);
    v = (v ^ (v >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    v = (v ^ (v >> 27)).wrapping_mul(0x94d049bb133111eb);
    v ^ (v >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_core::{Camera, Instance, Material, Sphere};
    use cinder_math::{Transform, Vec3};

    fn small_scene() -> Scene {
        let mut scene = Scene::new("small");
        let gray = scene.nodes.color(Color::gray(0.5));
        let diffuse = scene.nodes.diffuse(gray);
        let m = scene.add_material(Material::new("gray", diffuse));
        let s = scene.add_sphere(Sphere::new(Vec3::ZERO, 1.0, m));
        scene.add_instance(Instance::sphere(s, Transform::IDENTITY));
        scene.add_camera(Camera::perspective(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 45.0).with_resolution(16, 16));
        scene
    }

    #[test]
    fn test_control_flags() {
        let control = RenderControl::new();
        let other = control.clone();
        assert!(!control.is_paused());
        other.toggle_pause();
        assert!(control.is_paused());
        control.resume();
        assert!(!other.is_paused());
        other.stop();
        assert!(control.is_stopped());
        assert!(!control.wait_while_paused());
    }

    #[test]
    fn test_preferences_defaults() {
        let prefs = RenderPreferences::default();
        assert_eq!(prefs.tile_order, TileOrder::BottomToTop);
        assert_eq!(prefs.tile_width, DEFAULT_TILE_SIZE);
        assert!(prefs.resolved_threads() > THREAD_RESERVE);
        assert_eq!(prefs.with_threads(3).resolved_threads(), 3);
    }

    #[test]
    fn test_missing_camera_is_error() {
        let mut scene = small_scene();
        scene.cameras.clear();
        let err = Renderer::new(&scene, RenderPreferences::default()).render(&()).unwrap_err();
        assert!(matches!(err, RenderError::CameraOutOfRange { index: 0, count: 0 }));
    }

    #[test]
    fn test_zero_sizes_are_errors() {
        let scene = small_scene();
        let prefs = RenderPreferences::default().with_resolution(0, 10);
        assert!(matches!(
            Renderer::new(&scene, prefs).render(&()),
            Err(RenderError::EmptyImage { .. })
        ));
        let prefs = RenderPreferences::default().with_tile_size(0, 8);
        assert!(matches!(
            Renderer::new(&scene, prefs).render(&()),
            Err(RenderError::EmptyTile { .. })
        ));
    }

    #[test]
    fn test_invalid_scene_is_error() {
        let mut scene = small_scene();
        scene.spheres[0].radius = -1.0;
        let err = Renderer::new(&scene, RenderPreferences::default()).render(&()).unwrap_err();
        assert!(matches!(err, RenderError::InvalidScene(_)));
    }

    #[test]
    fn test_render_is_deterministic_across_thread_counts() {
        let scene = small_scene();
        let prefs = RenderPreferences::default().with_samples(2).with_tile_size(4, 4).with_seed(7);
        let a = Renderer::new(&scene, prefs.clone().with_threads(1)).render(&()).unwrap();
        let b = Renderer::new(&scene, prefs.with_threads(4)).render(&()).unwrap();
        assert_eq!(a.framebuffer.snapshot(), b.framebuffer.snapshot());
        assert!(!a.metadata.stopped);
        assert_eq!(a.metadata.completed_tiles, 16);
    }

    #[test]
    fn test_threads_reduced_to_tile_count() {
        let scene = small_scene();
        let prefs = RenderPreferences::default().with_samples(1).with_tile_size(16, 16).with_threads(8);
        let output = Renderer::new(&scene, prefs).render(&()).unwrap();
        assert_eq!(output.metadata.threads, 1);
    }

    #[test]
    fn test_render_assigned_rejects_bad_index() {
        let scene = small_scene();
        let renderer = Renderer::new(&scene, RenderPreferences::default().with_tile_size(8, 8));
        let err = renderer.render_assigned(&[0, 4], &()).unwrap_err();
        assert!(matches!(err, RenderError::TileOutOfRange { index: 4, count: 4 }));
    }

    #[test]
    fn test_render_assigned_renders_repeats_once() {
        let scene = small_scene();
        let prefs = RenderPreferences::default().with_samples(1).with_tile_size(8, 8).with_threads(2);
        let renderer = Renderer::new(&scene, prefs);
        let tiles = renderer.tiles().unwrap();

        let results = renderer.render_assigned(&[1, 1, 3, 1], &()).unwrap();
        let rendered: Vec<Tile> = results.iter().map(|r| r.tile).collect();
        assert_eq!(rendered, vec![tiles[1], tiles[3]]);
    }

    #[test]
    fn test_sample_seed_varies() {
        let a = Tile::new(0, 0, 8, 8, 0);
        let b = Tile::new(8, 0, 8, 8, 1);
        assert_ne!(sample_seed(1, &a, 1), sample_seed(1, &b, 1));
        assert_ne!(sample_seed(1, &a, 1), sample_seed(1, &a, 2));
        assert_ne!(sample_seed(1, &a, 1), sample_seed(2, &a, 1));
    }
}
