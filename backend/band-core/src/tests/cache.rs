// Unit tests for the render state cache

use crate::cache::{RenderItem, RenderStateCache, SharedRenderState};

use bytes::Bytes;

fn item(id: &str, text: &str) -> RenderItem {
    RenderItem {
        id: String::from(id),
        text: String::from(text),
        x: 0,
        y: 0,
        style: Bytes::new(),
    }
}

/// **VALUE**: Verifies last-write-wins while keeping the original draw-order slot.
///
/// **WHY THIS MATTERS**: Controllers update existing items constantly (clock
/// ticks, CPU load). If an update re-appended the item, it would climb to the
/// top of the draw order and flicker over its neighbors on every refresh.
///
/// **BUG THIS CATCHES**: Would catch a set path implemented as remove+push,
/// or one that keeps both the old and the new descriptor under one id.
#[test]
fn given_two_sets_of_same_id_when_applied_then_one_item_with_second_descriptor() {
    // GIVEN: An empty cache
    let mut cache = RenderStateCache::new();

    // WHEN: Setting id "a", a neighbor, then updating "a"
    cache.apply_set_item(item("a", "first"));
    cache.apply_set_item(item("b", "neighbor"));
    cache.apply_set_item(item("a", "second"));

    // THEN: Exactly one "a", carrying the second descriptor, still first in draw order
    let snapshot = cache.snapshot();
    assert_eq!(snapshot.len(), 2, "update must not duplicate the item");
    assert_eq!(snapshot[0].id, "a", "update must keep the original position");
    assert_eq!(snapshot[0].text, "second", "last write must win");
    assert_eq!(snapshot[1].id, "b");
}

/// **VALUE**: Verifies removal of an absent id is a silent no-op.
///
/// **WHY THIS MATTERS**: The controller may race a removal against a stale
/// update or repeat a removal after a reconnect. Treating that as an error
/// would tear down a healthy session over a harmless message.
///
/// **BUG THIS CATCHES**: Would catch a remove path that panics, errors, or
/// disturbs unrelated items when the id is missing.
#[test]
fn given_absent_id_when_removed_then_cache_unchanged() {
    // GIVEN: A cache holding one item
    let mut cache = RenderStateCache::new();
    cache.apply_set_item(item("a", "kept"));
    let before = cache.snapshot();

    // WHEN: Removing an id that was never inserted
    cache.apply_remove_item("ghost");

    // THEN: Unchanged
    assert_eq!(cache.snapshot(), before);
}

/// **VALUE**: Verifies ClearAll leaves an empty ordered sequence.
///
/// **BUG THIS CATCHES**: Would catch a clear that leaves residue items which
/// the next paint would still draw.
#[test]
fn given_populated_cache_when_cleared_then_snapshot_is_empty() {
    // GIVEN: Several items
    let mut cache = RenderStateCache::new();
    cache.apply_set_item(item("a", "one"));
    cache.apply_set_item(item("b", "two"));

    // WHEN: Clearing
    cache.apply_clear_all();

    // THEN: Empty
    assert!(cache.snapshot().is_empty());
    assert!(cache.is_empty());
    assert_eq!(cache.len(), 0);
}

/// **VALUE**: Verifies remove preserves the relative order of survivors.
///
/// **WHY THIS MATTERS**: Draw order is the only z-ordering the panel has.
/// Removing one item must not shuffle what draws over what.
///
/// **BUG THIS CATCHES**: Would catch a swap-remove that reorders the tail.
#[test]
fn given_middle_item_removed_when_snapshotted_then_survivor_order_is_stable() {
    let mut cache = RenderStateCache::new();
    cache.apply_set_item(item("a", "bottom"));
    cache.apply_set_item(item("b", "middle"));
    cache.apply_set_item(item("c", "top"));

    cache.apply_remove_item("b");

    let snapshot = cache.snapshot();
    let ids: Vec<&str> = snapshot.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
}

/// **VALUE**: Verifies a snapshot is an immutable copy, decoupled from later writes.
///
/// **WHY THIS MATTERS**: This is the snapshot contract the painter
/// relies on: once taken, a snapshot must stay consistent even while the
/// listener worker keeps applying commands mid-paint.
///
/// **BUG THIS CATCHES**: Would catch a snapshot that hands out a live view
/// of the underlying sequence.
#[test]
fn given_snapshot_taken_when_cache_mutated_then_snapshot_unaffected() {
    // GIVEN: A shared cache with one item and a snapshot of it
    let shared = SharedRenderState::new();
    shared.apply_set_item(item("a", "before"));
    let snapshot = shared.snapshot();

    // WHEN: Mutating after the snapshot
    shared.apply_set_item(item("a", "after"));
    shared.apply_clear_all();

    // THEN: The snapshot still shows the state as of the call
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].text, "before");
}
