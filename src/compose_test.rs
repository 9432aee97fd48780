use uuid::Uuid;

use super::*;
use crate::raster::SolidSource;

const BLACK: u32 = 0xFF00_0000;
const RED: u32 = 0xFFFF_0000;
const GREEN: u32 = 0xFF00_FF00;
const BLUE: u32 = 0xFF00_00FF;

/// An enabled item with a solid texture at the given box and layer.
fn solid_item(x: i32, y: i32, w: u32, h: u32, layer: i32, color: u32) -> Item {
    let mut item = make_item();
    item.x = x;
    item.y = y;
    item.width = w;
    item.height = h;
    item.layer = layer;
    item.enabled = true;
    item.texture = Box::new(SolidSource::new(color));
    item.resize_texture();
    item
}

fn make_item() -> Item {
    Item::new(Uuid::new_v4())
}

fn black_background() -> Box<dyn RasterSource> {
    Box::new(SolidSource::new(BLACK))
}

/// A source that reports one size but hands back a mismatched buffer.
#[derive(Debug, Clone)]
struct BrokenSource;

impl RasterSource for BrokenSource {
    fn resize(&mut self, _width: u32, _height: u32) {}

    fn image(&self) -> Raster {
        Raster::from_parts(8, 8, vec![RED; 3])
    }

    fn clone_box(&self) -> Box<dyn RasterSource> {
        Box::new(self.clone())
    }
}

// --- camera ---

#[test]
fn default_camera_is_inactive() {
    assert!(!Camera::full().is_active());
    assert!(!Camera::default().is_active());
}

#[test]
fn inverted_or_empty_rectangles_are_inactive() {
    assert!(!Camera { p1x: 10, p1y: 0, p2x: 5, p2y: 10 }.is_active());
    assert!(!Camera { p1x: 0, p1y: 0, p2x: 10, p2y: 0 }.is_active());
}

#[test]
fn proper_rectangle_is_active() {
    assert!(Camera { p1x: 1, p1y: 2, p2x: 3, p2y: 4 }.is_active());
}

// --- background ---

#[test]
fn empty_scene_is_the_background() {
    let out = compose(4, 3, black_background().as_mut(), Vec::new(), Camera::full());
    assert_eq!((out.width(), out.height()), (4, 3));
    for y in 0..3 {
        for x in 0..4 {
            assert_eq!(out.pixel(x, y), Some(BLACK));
        }
    }
}

#[test]
fn background_is_resized_to_frame() {
    let mut background = SolidSource::new(GREEN);
    let out = compose(7, 9, &mut background, Vec::new(), Camera::full());
    assert_eq!((out.width(), out.height()), (7, 9));
}

// --- items ---

#[test]
fn enabled_item_is_drawn_at_its_position() {
    let items = vec![solid_item(1, 1, 2, 2, 0, RED)];
    let out = compose(4, 4, black_background().as_mut(), items, Camera::full());
    assert_eq!(out.pixel(1, 1), Some(RED));
    assert_eq!(out.pixel(2, 2), Some(RED));
    assert_eq!(out.pixel(0, 0), Some(BLACK));
    assert_eq!(out.pixel(3, 3), Some(BLACK));
}

#[test]
fn disabled_item_is_skipped() {
    let mut item = solid_item(0, 0, 4, 4, 0, RED);
    item.enabled = false;
    let out = compose(4, 4, black_background().as_mut(), vec![item], Camera::full());
    assert_eq!(out.pixel(0, 0), Some(BLACK));
}

#[test]
fn higher_layer_draws_over_lower() {
    // Layers given out of order: 3, 1, 2 — partially overlapping boxes.
    let items = vec![
        solid_item(0, 0, 2, 2, 3, RED),
        solid_item(1, 1, 3, 3, 1, GREEN),
        solid_item(2, 2, 2, 2, 2, BLUE),
    ];
    let out = compose(6, 6, black_background().as_mut(), items, Camera::full());
    // Layer 3 wins where it overlaps layer 1; layer 2 wins over layer 1;
    // layer 1 survives where nothing covers it.
    assert_eq!(out.pixel(1, 1), Some(RED), "layer 3 over layer 1");
    assert_eq!(out.pixel(2, 2), Some(BLUE), "layer 2 over layer 1");
    assert_eq!(out.pixel(3, 1), Some(GREEN), "layer 1 visible uncovered");
    assert_eq!(out.pixel(5, 5), Some(BLACK));
}

#[test]
fn equal_layers_keep_snapshot_order() {
    let items = vec![
        solid_item(0, 0, 2, 2, 5, GREEN),
        solid_item(0, 0, 2, 2, 5, RED),
    ];
    let out = compose(2, 2, black_background().as_mut(), items, Camera::full());
    // The later snapshot entry draws last.
    assert_eq!(out.pixel(0, 0), Some(RED));
}

#[test]
fn item_partially_off_canvas_is_clipped() {
    let items = vec![solid_item(-1, -1, 2, 2, 0, RED)];
    let out = compose(3, 3, black_background().as_mut(), items, Camera::full());
    assert_eq!(out.pixel(0, 0), Some(RED));
    assert_eq!(out.pixel(1, 1), Some(BLACK));
}

#[test]
fn malformed_item_raster_is_skipped_not_fatal() {
    let mut broken = solid_item(0, 0, 8, 8, 0, RED);
    broken.texture = Box::new(BrokenSource);
    let items = vec![broken, solid_item(2, 2, 1, 1, 1, GREEN)];
    let out = compose(4, 4, black_background().as_mut(), items, Camera::full());
    // The broken item contributed nothing; the rest of the frame completed.
    assert_eq!(out.pixel(0, 0), Some(BLACK));
    assert_eq!(out.pixel(2, 2), Some(GREEN));
}

// --- determinism ---

#[test]
fn compose_is_deterministic() {
    let items = vec![
        solid_item(0, 0, 3, 3, 1, RED),
        solid_item(2, 2, 3, 3, 2, GREEN),
        solid_item(1, 0, 2, 5, 0, BLUE),
    ];
    let camera = Camera { p1x: 1, p1y: 1, p2x: 5, p2y: 5 };
    let a = compose(8, 8, black_background().as_mut(), items.clone(), camera);
    let b = compose(8, 8, black_background().as_mut(), items, camera);
    assert_eq!(a, b);
}

// --- camera remap ---

#[test]
fn camera_crops_and_scales_back_to_frame_size() {
    // Red 1×1 at (1, 1); camera selects (1,1)..(3,3), a 2×2 view scaled
    // up to the 4×4 output.
    let items = vec![solid_item(1, 1, 1, 1, 0, RED)];
    let camera = Camera { p1x: 1, p1y: 1, p2x: 3, p2y: 3 };
    let out = compose(4, 4, black_background().as_mut(), items, camera);
    assert_eq!((out.width(), out.height()), (4, 4));
    // The view pixel (0,0) is canvas (1,1): red, doubled to a 2×2 block.
    assert_eq!(out.pixel(0, 0), Some(RED));
    assert_eq!(out.pixel(1, 1), Some(RED));
    assert_eq!(out.pixel(2, 2), Some(BLACK));
}

#[test]
fn camera_vertical_offset_uses_p1x() {
    // Historical remap quirk: the placement offset is (-p1x, -p1x), so a
    // camera with p1y != p1x shifts vertically by p1x, not p1y.
    let items = vec![solid_item(2, 1, 1, 1, 0, RED)];
    let camera = Camera { p1x: 1, p1y: 0, p2x: 3, p2y: 2 };
    let out = compose(4, 4, black_background().as_mut(), items, camera);
    // View pixel (vx, vy) = canvas (vx + 1, vy + 1) — not (vx + 1, vy).
    // Red sits at canvas (2, 1) → view (1, 0) → output block x 2..4, y 0..2.
    assert_eq!(out.pixel(2, 0), Some(RED));
    assert_eq!(out.pixel(3, 1), Some(RED));
    assert_eq!(out.pixel(2, 2), Some(BLACK), "would be red if p1y were used");
}

#[test]
fn inactive_camera_skips_the_remap() {
    let items = vec![solid_item(0, 0, 1, 1, 0, RED)];
    let camera = Camera { p1x: 5, p1y: 5, p2x: 5, p2y: 9 };
    let out = compose(3, 3, black_background().as_mut(), items, camera);
    assert_eq!(out.pixel(0, 0), Some(RED));
    assert_eq!(out.pixel(1, 0), Some(BLACK));
}

#[test]
fn camera_view_outside_canvas_is_transparent() {
    let camera = Camera { p1x: 100, p1y: 100, p2x: 102, p2y: 102 };
    let out = compose(2, 2, black_background().as_mut(), Vec::new(), camera);
    // Nothing of the canvas lands in the view; the scaled result is blank.
    assert_eq!(out.pixel(0, 0), Some(0));
}
