//! Image tiles and render order.
//!
//! The image is cut into a grid of tiles that workers claim one at a time.
//! Tiles on the right and bottom edges are clipped to the image.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 32;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    /// X coordinate of the tile's top-left corner
    pub x: u32,
    /// Y coordinate of the tile's top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position of this tile in the render order
    pub index: usize,
}

impl Tile {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// True if the image pixel `(x, y)` lies inside this tile.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    fn center_distance_sq(&self, center_x: f32, center_y: f32) -> f32 {
        let x = self.x as f32 + self.width as f32 / 2.0;
        let y = self.y as f32 + self.height as f32 / 2.0;
        (x - center_x).powi(2) + (y - center_y).powi(2)
    }
}

/// Order in which tiles are handed out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileOrder {
    /// Raster order starting at the top row
    TopToBottom,
    /// Raster order reversed
    #[default]
    BottomToTop,
    /// Alternating outward from the middle tile index
    FromMiddle,
    /// Nearest to the image center first
    Spiral,
}

/// Cut a `width` x `height` image into tiles, sorted into `order`.
///
/// Tile indices match their position in the returned list. Returns an empty
/// list if any dimension is zero.
pub fn quantize(width: u32, height: u32, tile_width: u32, tile_height: u32, order: TileOrder) -> Vec<Tile> {
    if width == 0 || height == 0 || tile_width == 0 || tile_height == 0 {
        return Vec::new();
    }

    let tiles_x = width.div_ceil(tile_width);
    let tiles_y = height.div_ceil(tile_height);

    let mut tiles = Vec::with_capacity(tiles_x as usize * tiles_y as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x = tx * tile_width;
            let y = ty * tile_height;
            let w = tile_width.min(width - x);
            let h = tile_height.min(height - y);
            tiles.push(Tile::new(x, y, w, h, tiles.len()));
        }
    }

    let mut tiles = reorder(tiles, order, width, height);
    for (i, tile) in tiles.iter_mut().enumerate() {
        tile.index = i;
    }

    log::info!(
        "Quantized {}x{} image into {} tiles ({}x{}), order {:?}",
        width,
        height,
        tiles.len(),
        tiles_x,
        tiles_y,
        order
    );
    tiles
}

fn reorder(mut tiles: Vec<Tile>, order: TileOrder, width: u32, height: u32) -> Vec<Tile> {
    match order {
        TileOrder::TopToBottom => tiles,
        TileOrder::BottomToTop => {
            tiles.reverse();
            tiles
        }
        TileOrder::FromMiddle => {
            let count = tiles.len();
            let mut out = Vec::with_capacity(count);
            let mut right = count / 2;
            let mut left = right;
            let mut take_right = true;
            while out.len() < count {
                if take_right && right < count {
                    out.push(tiles[right]);
                    right += 1;
                } else if left > 0 {
                    left -= 1;
                    out.push(tiles[left]);
                } else {
                    out.push(tiles[right]);
                    right += 1;
                }
                take_right = !take_right;
            }
            out
        }
        TileOrder::Spiral => {
            let center_x = width as f32 / 2.0;
            let center_y = height as f32 / 2.0;
            // Stable sort keeps raster order among equidistant tiles
            tiles.sort_by(|a, b| {
                a.center_distance_sq(center_x, center_y)
                    .total_cmp(&b.center_distance_sq(center_x, center_y))
            });
            tiles
        }
    }
}

/// Lifecycle of a tile during a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    Ready,
    Rendering,
    Finished,
}

impl TileState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => TileState::Rendering,
            2 => TileState::Finished,
            _ => TileState::Ready,
        }
    }
}

/// Snapshot of one tile's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileStatus {
    pub tile: Tile,
    pub state: TileState,
    pub completed_samples: u32,
    pub target_samples: u32,
}

/// Shared, lock-free progress for one tile.
#[derive(Debug)]
pub(crate) struct TileProgress {
    pub tile: Tile,
    state: AtomicU8,
    completed: AtomicU32,
}

impl TileProgress {
    pub fn new(tile: Tile) -> Self {
        Self {
            tile,
            state: AtomicU8::new(TileState::Ready as u8),
            completed: AtomicU32::new(0),
        }
    }

    pub fn state(&self) -> TileState {
        TileState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set_state(&self, state: TileState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn completed_samples(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn set_completed_samples(&self, n: u32) {
        self.completed.store(n, Ordering::Relaxed);
    }

    pub fn status(&self, target_samples: u32) -> TileStatus {
        TileStatus {
            tile: self.tile,
            state: self.state(),
            completed_samples: self.completed_samples(),
            target_samples,
        }
    }
}
