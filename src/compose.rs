//! Frame composition: background + layered items + camera remap.
//!
//! Every frame recomposes the whole scene — there is no dirty-region
//! tracking. The compositor is a pure function of its inputs: the same
//! snapshot, background, and camera always produce a pixel-identical frame.

#[cfg(test)]
#[path = "compose_test.rs"]
mod compose_test;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::item::Item;
use crate::raster::{Raster, RasterSource};

/// The camera viewport, a rectangle in scene coordinates from (p1x, p1y)
/// to (p2x, p2y).
///
/// When the rectangle is empty or inverted the remap is skipped and the
/// composed canvas is emitted as-is; the all-zero [`Camera::full`] value is
/// the "no camera" default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camera {
    pub p1x: i32,
    pub p1y: i32,
    pub p2x: i32,
    pub p2y: i32,
}

impl Camera {
    /// The no-remap camera: the composed canvas is output unchanged.
    #[must_use]
    pub fn full() -> Self {
        Self::default()
    }

    /// Whether the rectangle selects a non-empty viewport.
    #[must_use]
    pub fn is_active(self) -> bool {
        self.p2x > self.p1x && self.p2y > self.p1y
    }

    fn size(self) -> (u32, u32) {
        let w = u32::try_from(i64::from(self.p2x) - i64::from(self.p1x)).unwrap_or(0);
        let h = u32::try_from(i64::from(self.p2y) - i64::from(self.p1y)).unwrap_or(0);
        (w, h)
    }
}

/// Compose one output frame.
///
/// The background is resized to (`width`, `height`) and used as the canvas.
/// Items are stable-sorted ascending by layer (equal layers keep snapshot
/// order); each enabled item's texture is blitted at its position. A blit
/// that fails — a source handing back a malformed raster — is logged and
/// skipped so the rest of the frame still completes.
///
/// With an active camera, the canvas is copied into a viewport-sized raster
/// and scaled back up to the output size. Note: the placement offset is
/// `(-p1x, -p1x)` on both axes — `p1y` only ever sizes the viewport. Hosts
/// that want a symmetric crop should keep `p1y` equal to `p1x`.
pub fn compose(
    width: u32,
    height: u32,
    background: &mut dyn RasterSource,
    mut items: Vec<Item>,
    camera: Camera,
) -> Raster {
    background.resize(width, height);
    let mut canvas = background.image();

    items.sort_by_key(|item| item.layer);
    for item in items.iter().filter(|item| item.enabled) {
        let texture = item.texture.image();
        if let Err(error) = canvas.blit(&texture, item.x, item.y) {
            warn!(item = %item.id(), %error, "skipping item with malformed raster");
        }
    }

    if camera.is_active() {
        let (view_w, view_h) = camera.size();
        let mut view = Raster::new(view_w, view_h);
        let offset = i32::try_from(-i64::from(camera.p1x)).unwrap_or(i32::MAX);
        if let Err(error) = view.blit(&canvas, offset, offset) {
            warn!(%error, "camera remap skipped: malformed canvas");
            return canvas;
        }
        return view.scaled(width, height);
    }

    canvas
}
