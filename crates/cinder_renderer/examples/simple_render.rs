//! Simple path tracer example.
//!
//! Renders spheres on a ground plane with a few node-graph materials and
//! saves the result as a PNG.
//!
//! Run with `RUST_LOG=info cargo run --release --example simple_render`.
//! Pass an image path to use it as the ground texture instead of the
//! checkerboard.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use cinder_core::{
    Camera, HitInput, Instance, Light, MathOp, Material, Mesh, Scene, Sphere, Texture, TextureCache,
};
use cinder_math::{Color, Transform, TransformOp, Vec3};
use cinder_renderer::{RenderObserver, RenderPreferences, RenderStatus, Renderer, TileOrder, TileStatus};

/// Logs progress as tiles complete.
#[derive(Default)]
struct LogProgress {
    finished: AtomicUsize,
}

impl RenderObserver for LogProgress {
    fn on_status(&self, status: &RenderStatus) {
        log::info!(
            "{:5.1}% done, {:.0} samples/s, eta {:?}",
            status.completion * 100.0,
            status.samples_per_second,
            status.eta.unwrap_or_default()
        );
    }

    fn on_tile_finished(&self, _tile: &TileStatus) {
        self.finished.fetch_add(1, Ordering::Relaxed);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let ground_texture = match std::env::args().nth(1) {
        Some(path) => {
            let mut textures = TextureCache::new();
            Some(
                textures
                    .load(&path)
                    .with_context(|| format!("failed to load ground texture {}", path))?,
            )
        }
        None => None,
    };

    let scene = build_scene(ground_texture);
    let prefs = RenderPreferences::default()
        .with_samples(32)
        .with_bounces(6)
        .with_tile_order(TileOrder::Spiral)
        .with_seed(42);

    let observer = LogProgress::default();
    let output = Renderer::new(&scene, prefs)
        .render(&observer)
        .context("render failed")?;

    log::info!(
        "Rendered {}x{} in {:?}, {} tiles",
        output.metadata.width,
        output.metadata.height,
        output.metadata.elapsed,
        observer.finished.load(Ordering::Relaxed)
    );

    let filename = "output.png";
    output
        .to_rgba_image()
        .save(filename)
        .with_context(|| format!("failed to save {}", filename))?;
    log::info!("Saved to {}", filename);
    Ok(())
}

fn build_scene(ground_texture: Option<Arc<Texture>>) -> Scene {
    let mut scene = Scene::new("simple");

    // Ground: image texture if given, else a checkerboard over the plane's uv
    let ground_color = match ground_texture {
        Some(texture) => {
            let id = scene.add_texture(texture);
            scene.nodes.image(id)
        }
        None => {
            let light_gray = scene.nodes.color(Color::gray(0.8));
            let dark_gray = scene.nodes.color(Color::gray(0.2));
            let scale = scene.nodes.value(40.0);
            scene.nodes.checkerboard(light_gray, dark_gray, scale)
        }
    };
    let ground_bsdf = scene.nodes.diffuse(ground_color);
    let ground = scene.add_material(Material::new("ground", ground_bsdf));

    let red = scene.nodes.color(Color::new(0.7, 0.15, 0.1));
    let roughness = scene.nodes.value(0.05);
    let ior = scene.nodes.value(1.5);
    let plastic_bsdf = scene.nodes.plastic(red, Some(roughness), Some(ior));
    let plastic = scene.add_material(Material::new("red plastic", plastic_bsdf));

    let white = scene.nodes.color(Color::WHITE);
    let zero = scene.nodes.value(0.0);
    let glass_bsdf = scene.nodes.glass(white, zero, ior);
    let glass = scene.add_material(Material::new("glass", glass_bsdf));

    // Metal roughness driven by the u coordinate
    let gold = scene.nodes.color(Color::new(0.9, 0.7, 0.3));
    let u = scene.nodes.input(HitInput::U);
    let tenth = scene.nodes.value(0.1);
    let metal_roughness = scene.nodes.math(u, Some(tenth), MathOp::Multiply);
    let metal_bsdf = scene.nodes.metal(gold, metal_roughness);
    let metal = scene.add_material(Material::new("gold", metal_bsdf).with_reflectivity(0.95));

    let four = scene.nodes.value(4.0);
    let emissive_bsdf = scene.nodes.emissive(white, four);
    let lamp = scene.add_material(Material::new("lamp", emissive_bsdf));

    let plane = Mesh::from_triangles(
        "ground",
        vec![
            Vec3::new(-10.0, 0.0, -10.0),
            Vec3::new(10.0, 0.0, -10.0),
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::new(-10.0, 0.0, 10.0),
        ],
        &[0, 2, 1, 0, 3, 2],
    )
    .with_materials(vec![ground]);
    let plane = scene.add_mesh(plane);
    scene.add_instance(Instance::mesh(plane, Transform::IDENTITY));

    let unit = scene.add_sphere(Sphere::new(Vec3::ZERO, 1.0, plastic));
    for (x, material) in [(-2.2, plastic), (0.0, glass), (2.2, metal)] {
        scene.add_instance(
            Instance::sphere(
                unit,
                Transform::from_ops(&[TransformOp::Translate(Vec3::new(x, 1.0, 0.0))]),
            )
            .with_materials(vec![material]),
        );
    }
    scene.add_instance(
        Instance::sphere(
            unit,
            Transform::from_ops(&[
                TransformOp::Translate(Vec3::new(0.0, 4.0, -3.0)),
                TransformOp::ScaleUniform(0.5),
            ]),
        )
        .with_materials(vec![lamp])
        .with_emits_light(true),
    );

    scene.add_light(Light::new(Vec3::new(4.0, 6.0, 4.0), Color::gray(0.8)).with_radius(0.5));

    scene.add_camera(
        Camera::perspective(Vec3::new(0.0, 2.5, 8.0), Vec3::new(0.0, 1.0, 0.0), 40.0)
            .with_resolution(640, 360)
            .with_focus(0.0, 8.0),
    );

    scene
}
