//! Shared accumulation buffer.
//!
//! Pixels are stored as `f32` bit patterns in atomics so the observer can
//! read a snapshot while workers write. Each pixel is only ever written by
//! the worker holding the [`TileRegion`] that contains it.

use std::sync::atomic::{AtomicU32, Ordering};

use cinder_math::Color;
use image::{Rgba32FImage, RgbaImage};

use crate::tile::Tile;

/// One pixel, RGBA.
#[derive(Debug, Default)]
struct AtomicPixel([AtomicU32; 4]);

impl AtomicPixel {
    #[inline]
    fn load(&self) -> Color {
        let [r, g, b, a] = &self.0;
        Color::rgba(
            f32::from_bits(r.load(Ordering::Relaxed)),
            f32::from_bits(g.load(Ordering::Relaxed)),
            f32::from_bits(b.load(Ordering::Relaxed)),
            f32::from_bits(a.load(Ordering::Relaxed)),
        )
    }

    #[inline]
    fn store(&self, color: Color) {
        let [r, g, b, a] = &self.0;
        r.store(color.r.to_bits(), Ordering::Relaxed);
        g.store(color.g.to_bits(), Ordering::Relaxed);
        b.store(color.b.to_bits(), Ordering::Relaxed);
        a.store(color.a.to_bits(), Ordering::Relaxed);
    }
}

/// Linear radiance for a whole image, row-major, `(0, 0)` top left.
#[derive(Debug)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<AtomicPixel>,
}

impl Framebuffer {
    /// A buffer of transparent black pixels.
    pub fn new(width: u32, height: u32) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count);
        pixels.resize_with(count, AtomicPixel::default);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Current value of pixel `(x, y)`, or `None` outside the image.
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.offset(x, y)].load())
    }

    /// Copy of every pixel.
    ///
    /// Tiles still being rendered may show partially updated pixels.
    pub fn snapshot(&self) -> Vec<Color> {
        self.pixels.iter().map(AtomicPixel::load).collect()
    }

    /// Write access to the pixels of `tile`.
    ///
    /// Only the scheduler hands these out, one per claimed tile.
    pub(crate) fn region(&self, tile: Tile) -> TileRegion<'_> {
        debug_assert!(tile.x + tile.width <= self.width && tile.y + tile.height <= self.height);
        TileRegion { buffer: self, tile }
    }

    /// Merge a tile rendered elsewhere.
    ///
    /// Pixels outside the image are ignored, as are any beyond the tile's
    /// own pixel count.
    pub fn apply_tile_result(&mut self, result: &TileResult) {
        let tile = result.tile;
        for (i, color) in result.pixels.iter().take(tile.pixel_count()).enumerate() {
            let x = tile.x + (i as u32 % tile.width.max(1));
            let y = tile.y + (i as u32 / tile.width.max(1));
            if x < self.width && y < self.height {
                let offset = self.offset(x, y);
                self.pixels[offset].store(*color);
            }
        }
    }

    /// Gamma-encoded 8-bit image for an external encoder.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.width, self.height);
        for (pixel, source) in image.pixels_mut().zip(&self.pixels) {
            pixel.0 = source.load().to_rgba8();
        }
        image
    }

    /// Linear float image, unclamped, for HDR encoders.
    pub fn to_rgba32f_image(&self) -> Rgba32FImage {
        let mut image = Rgba32FImage::new(self.width, self.height);
        image.copy_from_slice(Color::as_flat(&self.snapshot()));
        image
    }
}

/// Exclusive write handle for one tile of a [`Framebuffer`].
pub struct TileRegion<'a> {
    buffer: &'a Framebuffer,
    tile: Tile,
}

impl TileRegion<'_> {
    pub fn tile(&self) -> Tile {
        self.tile
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        debug_assert!(self.tile.contains(x, y), "pixel ({x}, {y}) outside tile");
        self.buffer.offset(x, y)
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.buffer.pixels[self.offset(x, y)].load()
    }

    pub fn set(&self, x: u32, y: u32, color: Color) {
        self.buffer.pixels[self.offset(x, y)].store(color);
    }

    /// Fold the `n`th sample into the running average at `(x, y)`.
    ///
    /// `n` counts from 1; the first sample replaces whatever was there.
    pub fn accumulate(&self, x: u32, y: u32, sample: Color, n: u32) {
        let pixel = &self.buffer.pixels[self.offset(x, y)];
        let average = if n <= 1 {
            sample
        } else {
            running_average(pixel.load(), sample, n)
        };
        pixel.store(average);
    }

    /// Copy the tile's pixels out, row-major.
    pub fn to_result(&self) -> TileResult {
        let mut pixels = Vec::with_capacity(self.tile.pixel_count());
        for y in self.tile.y..self.tile.y + self.tile.height {
            for x in self.tile.x..self.tile.x + self.tile.width {
                pixels.push(self.get(x, y));
            }
        }
        TileResult {
            tile: self.tile,
            pixels,
        }
    }
}

/// `(old * (n - 1) + sample) / n`
#[inline]
pub fn running_average(old: Color, sample: Color, n: u32) -> Color {
    let n = n.max(1) as f32;
    (old * (n - 1.0) + sample) / n
}

/// A finished tile, row-major within the tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileResult {
    pub tile: Tile,
    pub pixels: Vec<Color>,
}
