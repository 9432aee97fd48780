//! Collision detection: a pure linear scan over a scene snapshot.
//!
//! The detector has no state and no spatial index — scenes here are dozens
//! to low hundreds of items, and each guarded mutation pays one O(n) pass.
//! Detection short-circuits on the first overlapping pair; when several
//! items overlap the candidate, which pair gets reported follows map
//! iteration order and is not guaranteed.

#[cfg(test)]
#[path = "collision_test.rs"]
mod collision_test;

use serde::{Deserialize, Serialize};

use crate::item::Item;

/// What kind of mutation triggered a collision check.
///
/// Purely descriptive: forwarded to the observer, never consulted by the
/// detection algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionKind {
    Move,
    Resize,
    Show,
    Undefined,
}

/// A detected overlap, delivered synchronously to the registered observer.
///
/// `active` and `passive` are independent copies of the colliding items.
/// The observer may set `cancelled` for its own bookkeeping; the flag has no
/// effect on whether the guarded mutation is rejected (see [`check`]).
#[derive(Debug, Clone)]
pub struct CollisionEvent {
    /// The item whose mutation triggered the check.
    pub active: Item,
    /// The first already-placed item found overlapping it.
    pub passive: Item,
    /// The mutation kind forwarded from the guard.
    pub kind: CollisionKind,
    /// Observer bookkeeping flag; ignored by the guard verdict.
    pub cancelled: bool,
}

/// The single registered collision listener.
pub type CollisionObserver = Box<dyn FnMut(&mut CollisionEvent) + Send>;

/// Test `active` against every other item in `others`.
///
/// Items sharing `active`'s identity are skipped, so an item already present
/// in the scene never collides with itself. On the first overlap the observer
/// (if any) is invoked once with a [`CollisionEvent`], and `false` is
/// returned — regardless of the event's `cancelled` flag. Returns `true`
/// only when nothing overlaps.
pub fn check<'a, I>(
    active: &Item,
    others: I,
    kind: CollisionKind,
    observer: Option<&mut CollisionObserver>,
) -> bool
where
    I: IntoIterator<Item = &'a Item>,
{
    for other in others {
        if other.id() == active.id() {
            continue;
        }
        if active.overlaps(other) {
            let mut event = CollisionEvent {
                active: active.clone(),
                passive: other.clone(),
                kind,
                cancelled: false,
            };
            if let Some(observer) = observer {
                observer(&mut event);
            }
            return false;
        }
    }
    true
}
