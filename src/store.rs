//! The scene store: the authoritative id→item mapping and its guarded
//! mutation surface.
//!
//! DESIGN
//! ======
//! `SceneStore` is a plain synchronous type so every operation can be tested
//! without a runtime. `SceneHandle` wraps it in `Arc<Mutex<..>>` and is the
//! shared surface: the render scheduler clones a handle for snapshots while
//! any number of callers mutate through their own clones. Every operation is
//! a bounded, non-yielding unit of work under one lock acquisition, so
//! mutations and snapshots serialize against each other and a snapshot can
//! never observe a half-applied mutation.
//!
//! Everything handed out — `get`, `create`, `snapshot` — is a deep copy,
//! textures included. Callers can never mutate store internals through a
//! returned item, and the compositor can never be mid-draw on a texture a
//! mutator is resizing.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;
use uuid::Uuid;

use crate::collision::{self, CollisionKind, CollisionObserver};
use crate::item::{Item, ItemId};
use crate::raster::RasterSource;

/// Why a store operation did not commit.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// No item with this id exists in the scene.
    #[error("no item with id {0}")]
    NotFound(ItemId),
    /// The collision guard found an overlapping enabled, collidable item.
    #[error("mutation rejected by collision check ({kind:?})")]
    Collision {
        /// The kind the guard ran with.
        kind: CollisionKind,
    },
}

/// Lock a mutex, recovering the guard if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The authoritative mapping of item identity to item state.
pub struct SceneStore {
    items: HashMap<ItemId, Item>,
    observer: Option<CollisionObserver>,
}

impl SceneStore {
    /// An empty scene with no collision observer.
    #[must_use]
    pub fn new() -> Self {
        Self { items: HashMap::new(), observer: None }
    }

    /// Create a default item under a fresh identity and return a copy.
    ///
    /// The returned item is disabled, so it can be positioned and configured
    /// before it starts drawing or colliding.
    pub fn create(&mut self) -> Item {
        let mut id = Uuid::new_v4();
        while self.items.contains_key(&id) {
            id = Uuid::new_v4();
        }
        let item = Item::new(id);
        self.items.insert(id, item.clone());
        item
    }

    /// Remove an item. Returns false if the id is unknown.
    pub fn delete(&mut self, id: ItemId) -> bool {
        self.items.remove(&id).is_some()
    }

    /// A copy of the stored item, or `None` if the id is unknown.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<Item> {
        self.items.get(&id).cloned()
    }

    /// Full replace of an existing item's record, guarded with
    /// [`CollisionKind::Undefined`]. The texture is resized to the declared
    /// box as part of the commit.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotFound`] if the id was never created here;
    /// [`SceneError::Collision`] if the guard rejects. The store is unchanged
    /// on error.
    pub fn set(&mut self, item: Item) -> Result<(), SceneError> {
        if !self.items.contains_key(&item.id()) {
            return Err(SceneError::NotFound(item.id()));
        }
        let mut candidate = item;
        candidate.resize_texture();
        let id = candidate.id();
        self.commit_guarded(id, CollisionKind::Undefined, candidate)
    }

    /// Place the item at (x, y), guarded with [`CollisionKind::Move`].
    ///
    /// # Errors
    ///
    /// See [`SceneStore::set`].
    pub fn set_position(&mut self, id: ItemId, x: i32, y: i32) -> Result<(), SceneError> {
        let mut candidate = self.items.get(&id).cloned().ok_or(SceneError::NotFound(id))?;
        candidate.x = x;
        candidate.y = y;
        self.commit_guarded(id, CollisionKind::Move, candidate)
    }

    /// Place the item at the polar coordinate `(length, angle_radians)`
    /// measured from the scene origin: `x = length·cos(angle)`,
    /// `y = length·sin(angle)`, truncated to integers.
    ///
    /// This is an absolute placement, not a displacement from the item's
    /// current position. Guarded with [`CollisionKind::Move`].
    ///
    /// # Errors
    ///
    /// See [`SceneStore::set`].
    #[allow(clippy::cast_possible_truncation)]
    pub fn move_polar(&mut self, id: ItemId, angle_radians: f64, length: f64) -> Result<(), SceneError> {
        let x = (length * angle_radians.cos()) as i32;
        let y = (length * angle_radians.sin()) as i32;
        self.set_position(id, x, y)
    }

    /// Resize the item's box, guarded with [`CollisionKind::Resize`]. On
    /// success the texture is resized to match.
    ///
    /// # Errors
    ///
    /// See [`SceneStore::set`].
    pub fn set_size(&mut self, id: ItemId, width: u32, height: u32) -> Result<(), SceneError> {
        let mut candidate = self.items.get(&id).cloned().ok_or(SceneError::NotFound(id))?;
        candidate.width = width;
        candidate.height = height;
        candidate.resize_texture();
        self.commit_guarded(id, CollisionKind::Resize, candidate)
    }

    /// Show or hide the item.
    ///
    /// Enabling is guarded with [`CollisionKind::Show`] — an item cannot
    /// appear on top of an overlapping collidable item. Disabling always
    /// succeeds for a known id: an item may always be hidden.
    ///
    /// # Errors
    ///
    /// See [`SceneStore::set`].
    pub fn set_enabled(&mut self, id: ItemId, enabled: bool) -> Result<(), SceneError> {
        if enabled {
            let mut candidate = self.items.get(&id).cloned().ok_or(SceneError::NotFound(id))?;
            candidate.enabled = true;
            self.commit_guarded(id, CollisionKind::Show, candidate)
        } else {
            let item = self.items.get_mut(&id).ok_or(SceneError::NotFound(id))?;
            item.enabled = false;
            Ok(())
        }
    }

    /// Swap the item's texture source. Never collision-guarded. The new
    /// source is resized to the item's declared box.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotFound`] if the id is unknown.
    pub fn set_texture(&mut self, id: ItemId, texture: Box<dyn RasterSource>) -> Result<(), SceneError> {
        let item = self.items.get_mut(&id).ok_or(SceneError::NotFound(id))?;
        item.texture = texture;
        item.resize_texture();
        Ok(())
    }

    /// Change the item's stacking layer. Never collision-guarded.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotFound`] if the id is unknown.
    pub fn set_layer(&mut self, id: ItemId, layer: i32) -> Result<(), SceneError> {
        let item = self.items.get_mut(&id).ok_or(SceneError::NotFound(id))?;
        item.layer = layer;
        Ok(())
    }

    /// A deep copy of every item in the scene, in no particular order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Item> {
        self.items.values().cloned().collect()
    }

    /// Number of items in the scene.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the scene holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Register the single collision listener, replacing any previous one.
    pub fn set_collision_observer(&mut self, observer: CollisionObserver) {
        self.observer = Some(observer);
    }

    /// Drop the collision listener, if any.
    pub fn clear_collision_observer(&mut self) {
        self.observer = None;
    }

    /// Run the collision guard for `candidate` and commit it on permit.
    ///
    /// Guarding is opt-in per item: a candidate with `collision_enabled`
    /// false always commits. Otherwise the candidate is tested against every
    /// stored item that is both collidable and enabled; the candidate's own
    /// stored record is skipped by identity inside the detector.
    fn commit_guarded(
        &mut self,
        id: ItemId,
        kind: CollisionKind,
        candidate: Item,
    ) -> Result<(), SceneError> {
        if candidate.collision_enabled {
            let Self { items, observer } = self;
            let others = items.values().filter(|it| it.collision_enabled && it.enabled);
            if !collision::check(&candidate, others, kind, observer.as_mut()) {
                debug!(item = %id, ?kind, "mutation rejected by collision check");
                return Err(SceneError::Collision { kind });
            }
        }
        self.items.insert(id, candidate);
        Ok(())
    }
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable, thread-safe handle to a shared [`SceneStore`].
///
/// Every method takes the lock exactly once, so each call is atomic with
/// respect to every other handle's calls and to scheduler snapshots.
#[derive(Clone)]
pub struct SceneHandle {
    inner: Arc<Mutex<SceneStore>>,
}

impl SceneHandle {
    /// A handle to a fresh, empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(SceneStore::new())) }
    }

    /// See [`SceneStore::create`].
    pub fn create(&self) -> Item {
        lock(&self.inner).create()
    }

    /// See [`SceneStore::delete`].
    pub fn delete(&self, id: ItemId) -> bool {
        lock(&self.inner).delete(id)
    }

    /// See [`SceneStore::get`].
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<Item> {
        lock(&self.inner).get(id)
    }

    /// See [`SceneStore::set`].
    ///
    /// # Errors
    ///
    /// See [`SceneStore::set`].
    pub fn set(&self, item: Item) -> Result<(), SceneError> {
        lock(&self.inner).set(item)
    }

    /// See [`SceneStore::set_position`].
    ///
    /// # Errors
    ///
    /// See [`SceneStore::set`].
    pub fn set_position(&self, id: ItemId, x: i32, y: i32) -> Result<(), SceneError> {
        lock(&self.inner).set_position(id, x, y)
    }

    /// See [`SceneStore::move_polar`].
    ///
    /// # Errors
    ///
    /// See [`SceneStore::set`].
    pub fn move_polar(&self, id: ItemId, angle_radians: f64, length: f64) -> Result<(), SceneError> {
        lock(&self.inner).move_polar(id, angle_radians, length)
    }

    /// See [`SceneStore::set_size`].
    ///
    /// # Errors
    ///
    /// See [`SceneStore::set`].
    pub fn set_size(&self, id: ItemId, width: u32, height: u32) -> Result<(), SceneError> {
        lock(&self.inner).set_size(id, width, height)
    }

    /// See [`SceneStore::set_enabled`].
    ///
    /// # Errors
    ///
    /// See [`SceneStore::set`].
    pub fn set_enabled(&self, id: ItemId, enabled: bool) -> Result<(), SceneError> {
        lock(&self.inner).set_enabled(id, enabled)
    }

    /// See [`SceneStore::set_texture`].
    ///
    /// # Errors
    ///
    /// [`SceneError::NotFound`] if the id is unknown.
    pub fn set_texture(&self, id: ItemId, texture: Box<dyn RasterSource>) -> Result<(), SceneError> {
        lock(&self.inner).set_texture(id, texture)
    }

    /// See [`SceneStore::set_layer`].
    ///
    /// # Errors
    ///
    /// [`SceneError::NotFound`] if the id is unknown.
    pub fn set_layer(&self, id: ItemId, layer: i32) -> Result<(), SceneError> {
        lock(&self.inner).set_layer(id, layer)
    }

    /// See [`SceneStore::snapshot`].
    #[must_use]
    pub fn snapshot(&self) -> Vec<Item> {
        lock(&self.inner).snapshot()
    }

    /// See [`SceneStore::len`].
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.inner).len()
    }

    /// See [`SceneStore::is_empty`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.inner).is_empty()
    }

    /// See [`SceneStore::set_collision_observer`].
    pub fn set_collision_observer(&self, observer: CollisionObserver) {
        lock(&self.inner).set_collision_observer(observer);
    }

    /// See [`SceneStore::clear_collision_observer`].
    pub fn clear_collision_observer(&self) {
        lock(&self.inner).clear_collision_observer();
    }
}

impl Default for SceneHandle {
    fn default() -> Self {
        Self::new()
    }
}
