use std::sync::{Arc, Mutex};

use uuid::Uuid;

use super::*;

fn item_at(x: i32, y: i32) -> Item {
    let mut item = Item::new(Uuid::new_v4());
    item.x = x;
    item.y = y;
    item
}

/// An observer that records every event it sees.
fn recording_observer() -> (CollisionObserver, Arc<Mutex<Vec<CollisionEvent>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let observer: CollisionObserver = Box::new(move |event| {
        sink.lock().unwrap().push(event.clone());
    });
    (observer, seen)
}

// --- verdicts ---

#[test]
fn empty_scene_permits() {
    let active = item_at(0, 0);
    let others: [Item; 0] = [];
    assert!(check(&active, &others, CollisionKind::Move, None));
}

#[test]
fn disjoint_items_permit() {
    let active = item_at(0, 0);
    let others = [item_at(100, 0), item_at(0, 100), item_at(-100, -100)];
    assert!(check(&active, &others, CollisionKind::Move, None));
}

#[test]
fn overlapping_item_rejects() {
    let active = item_at(0, 0);
    let others = [item_at(16, 16)];
    assert!(!check(&active, &others, CollisionKind::Move, None));
}

#[test]
fn same_identity_is_skipped() {
    let active = item_at(0, 0);
    let stale = active.clone();
    assert!(check(&active, [&stale], CollisionKind::Move, None));
}

#[test]
fn same_identity_skipped_but_others_still_checked() {
    let active = item_at(0, 0);
    let stale = active.clone();
    let blocker = item_at(10, 10);
    assert!(!check(&active, [&stale, &blocker], CollisionKind::Move, None));
}

// --- observer ---

#[test]
fn no_event_when_nothing_overlaps() {
    let (mut observer, seen) = recording_observer();
    let active = item_at(0, 0);
    let others = [item_at(100, 100)];
    assert!(check(&active, &others, CollisionKind::Show, Some(&mut observer)));
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn exactly_one_event_per_rejection() {
    let (mut observer, seen) = recording_observer();
    let active = item_at(0, 0);
    // Both overlap; detection stops at the first hit.
    let others = [item_at(8, 8), item_at(16, 16)];
    assert!(!check(&active, &others, CollisionKind::Move, Some(&mut observer)));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn event_identifies_active_and_passive() {
    let (mut observer, seen) = recording_observer();
    let active = item_at(0, 0);
    let passive = item_at(16, 16);
    check(&active, [&passive], CollisionKind::Resize, Some(&mut observer));

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].active.id(), active.id());
    assert_eq!(seen[0].passive.id(), passive.id());
}

#[test]
fn event_forwards_the_kind() {
    for kind in [
        CollisionKind::Move,
        CollisionKind::Resize,
        CollisionKind::Show,
        CollisionKind::Undefined,
    ] {
        let (mut observer, seen) = recording_observer();
        let active = item_at(0, 0);
        check(&active, [&item_at(1, 1)], kind, Some(&mut observer));
        assert_eq!(seen.lock().unwrap()[0].kind, kind);
    }
}

#[test]
fn event_starts_uncancelled() {
    let (mut observer, seen) = recording_observer();
    let active = item_at(0, 0);
    check(&active, [&item_at(1, 1)], CollisionKind::Move, Some(&mut observer));
    assert!(!seen.lock().unwrap()[0].cancelled);
}

#[test]
fn cancel_flag_does_not_override_rejection() {
    let mut observer: CollisionObserver = Box::new(|event| {
        event.cancelled = true;
    });
    let active = item_at(0, 0);
    assert!(!check(&active, [&item_at(1, 1)], CollisionKind::Move, Some(&mut observer)));
}

#[test]
fn event_items_are_copies() {
    let result = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&result);
    let mut observer: CollisionObserver = Box::new(move |event| {
        // Mutating the event's copies must not reach the caller's items.
        event.active.x = 999;
        *sink.lock().unwrap() = Some(event.active.x);
    });
    let active = item_at(0, 0);
    check(&active, [&item_at(1, 1)], CollisionKind::Move, Some(&mut observer));
    assert_eq!(*result.lock().unwrap(), Some(999));
    assert_eq!(active.x, 0);
}

// --- serde ---

#[test]
fn kind_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&CollisionKind::Move).unwrap(), "\"move\"");
    assert_eq!(serde_json::to_string(&CollisionKind::Undefined).unwrap(), "\"undefined\"");
}
