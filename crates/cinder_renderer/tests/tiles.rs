//! Tile quantization scenarios.

use std::collections::HashMap;

use cinder_renderer::{quantize, TileOrder};

#[test]
fn test_full_hd_in_32px_tiles() {
    let tiles = quantize(1920, 1080, 32, 32, TileOrder::BottomToTop);
    // 60 columns, 34 rows with the last row 24 pixels tall
    assert_eq!(tiles.len(), 2040);

    let mut row_widths: HashMap<u32, u32> = HashMap::new();
    let mut column_heights: HashMap<u32, u32> = HashMap::new();
    for tile in &tiles {
        *row_widths.entry(tile.y).or_default() += tile.width;
        *column_heights.entry(tile.x).or_default() += tile.height;
    }
    assert_eq!(row_widths.len(), 34);
    assert_eq!(column_heights.len(), 60);
    assert!(row_widths.values().all(|&w| w == 1920));
    assert!(column_heights.values().all(|&h| h == 1080));

    let bottom_row: Vec<_> = tiles.iter().filter(|t| t.y == 1056).collect();
    assert_eq!(bottom_row.len(), 60);
    assert!(bottom_row.iter().all(|t| t.height == 24));

    let pixels: usize = tiles.iter().map(|t| t.pixel_count()).sum();
    assert_eq!(pixels, 1920 * 1080);
}

#[test]
fn test_orders_are_permutations() {
    let raster = quantize(300, 200, 64, 48, TileOrder::TopToBottom);
    for order in [TileOrder::BottomToTop, TileOrder::FromMiddle, TileOrder::Spiral] {
        let mut a: Vec<(u32, u32)> = raster.iter().map(|t| (t.x, t.y)).collect();
        let mut b: Vec<(u32, u32)> = quantize(300, 200, 64, 48, order).iter().map(|t| (t.x, t.y)).collect();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b, "{order:?}");
    }
}

#[test]
fn test_tile_larger_than_image() {
    let tiles = quantize(10, 7, 64, 64, TileOrder::default());
    assert_eq!(tiles.len(), 1);
    assert_eq!((tiles[0].width, tiles[0].height), (10, 7));
}

#[test]
fn test_tile_order_serde_names() {
    let order: TileOrder = serde_json::from_str("\"from_middle\"").unwrap();
    assert_eq!(order, TileOrder::FromMiddle);
    assert_eq!(serde_json::to_string(&TileOrder::BottomToTop).unwrap(), "\"bottom_to_top\"");
}
