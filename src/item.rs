//! The item record: a positioned, sized, layered drawable with an identity.

#[cfg(test)]
#[path = "item_test.rs"]
mod item_test;

use uuid::Uuid;

use crate::consts::DEFAULT_ITEM_SIZE;
use crate::raster::{RasterSource, SolidSource};

/// Unique identifier for a scene item.
pub type ItemId = Uuid;

/// One drawable entity in the scene.
///
/// Everything except the identity is freely mutable on a copy; the store only
/// accepts changes back through its guarded setters. The texture is always
/// kept resized to the declared `width`/`height`, so the drawn raster matches
/// the item's box at composition time.
#[derive(Debug, Clone)]
pub struct Item {
    id: ItemId,
    /// Horizontal position in scene coordinates.
    pub x: i32,
    /// Vertical position in scene coordinates.
    pub y: i32,
    /// Declared box width; the texture is resized to it.
    pub width: u32,
    /// Declared box height; the texture is resized to it.
    pub height: u32,
    /// Stacking order; lower layers draw first.
    pub layer: i32,
    /// Disabled items are never drawn and never collide.
    pub enabled: bool,
    /// When false the item neither triggers nor blocks collision checks.
    pub collision_enabled: bool,
    /// The item's texture source.
    pub texture: Box<dyn RasterSource>,
}

impl Item {
    /// A default item: origin, 32×32, layer 0, disabled, collision checks on,
    /// opaque white texture.
    pub(crate) fn new(id: ItemId) -> Self {
        let mut texture: Box<dyn RasterSource> = Box::new(SolidSource::new(0xFFFF_FFFF));
        texture.resize(DEFAULT_ITEM_SIZE, DEFAULT_ITEM_SIZE);
        Self {
            id,
            x: 0,
            y: 0,
            width: DEFAULT_ITEM_SIZE,
            height: DEFAULT_ITEM_SIZE,
            layer: 0,
            enabled: false,
            collision_enabled: true,
            texture,
        }
    }

    /// The item's identity. Assigned at creation, stable for its lifetime.
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Re-target the texture to the declared box. Must run after any change
    /// to `width`, `height`, or `texture`.
    pub fn resize_texture(&mut self) {
        self.texture.resize(self.width, self.height);
    }

    /// Axis-aligned box overlap against another item, on half-open
    /// intervals: boxes that merely touch at an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Item) -> bool {
        let (ax2, ay2) = (far_edge(self.x, self.width), far_edge(self.y, self.height));
        let (bx2, by2) = (far_edge(other.x, other.width), far_edge(other.y, other.height));

        let x_disjoint = bx2 <= i64::from(self.x) || ax2 <= i64::from(other.x);
        let y_disjoint = i64::from(self.y) >= by2 || ay2 <= i64::from(other.y);
        !x_disjoint && !y_disjoint
    }
}

/// `pos + extent` widened to avoid overflow at the edges of the i32 range.
fn far_edge(pos: i32, extent: u32) -> i64 {
    i64::from(pos) + i64::from(extent)
}
