//! Host hook wiring for the console harness.

use band_core::host::HostHooks;

use std::sync::atomic::{AtomicBool, Ordering};

/// Repaint request flag.
///
/// The listener worker sets it; the harness's main loop drains it and
/// paints. A real taskbar host would invalidate its window here instead.
#[derive(Debug, Default)]
pub struct RepaintFlag {
    dirty: AtomicBool,
}

impl RepaintFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the pending repaint request, if any.
    pub fn take(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }
}

impl HostHooks for RepaintFlag {
    fn request_repaint(&self) {
        self.dirty.store(true, Ordering::Release);
    }
}
