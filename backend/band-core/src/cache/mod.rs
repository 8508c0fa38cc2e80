//! Render state cache.
//!
//! An ordered mapping from item id to its display descriptor. Insertion
//! order is the draw order (later insertions draw on top). The cache is
//! mutated only by the listener worker's dispatch path and read by the
//! painter through [`SharedRenderState::snapshot`], so a paint never
//! observes a half-applied update.

use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use log::debug;

/// One displayable text descriptor, tracked by a stable, externally
/// assigned id. Style is an opaque blob the core never interprets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderItem {
    pub id: String,
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub style: Bytes,
}

/// Ordered sequence of render items with unique ids.
#[derive(Debug, Default)]
pub struct RenderStateCache {
    items: Vec<RenderItem>,
}

impl RenderStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the item with this id. A replace keeps the item's
    /// position in the draw order; a new id appends on top.
    pub fn apply_set_item(&mut self, item: RenderItem) {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Remove the item if present. The controller may race a removal with a
    /// stale update, so an absent id is a no-op, not an error.
    pub fn apply_remove_item(&mut self, id: &str) {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            debug!("remove of absent item id {id:?} ignored");
        }
    }

    pub fn apply_clear_all(&mut self) {
        self.items.clear();
    }

    /// Consistent copy of the cache in draw order.
    pub fn snapshot(&self) -> Vec<RenderItem> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Mutex-guarded cache shared between the listener worker (single writer)
/// and the host's paint path (reader).
#[derive(Clone, Default)]
pub struct SharedRenderState {
    inner: Arc<Mutex<RenderStateCache>>,
}

impl SharedRenderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_set_item(&self, item: RenderItem) {
        self.lock().apply_set_item(item);
    }

    pub fn apply_remove_item(&self, id: &str) {
        self.lock().apply_remove_item(id);
    }

    pub fn apply_clear_all(&self) {
        self.lock().apply_clear_all();
    }

    /// Atomic snapshot for the painter; concurrent mutation after this call
    /// cannot corrupt an in-progress paint.
    pub fn snapshot(&self) -> Vec<RenderItem> {
        self.lock().snapshot()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RenderStateCache> {
        // A poisoned lock only means a panicking thread held it; the cache
        // itself is still structurally sound.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
