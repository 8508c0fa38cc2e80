//! Hooks the host adapter provides to the core.

/// Callbacks into the specific panel instance's host.
///
/// Carried as an explicit `Arc` reference, never through global routing,
/// so multiple panels in one process cannot cross wires. `request_repaint`
/// is called from the listener worker thread; implementations must be safe
/// to invoke off the UI thread (an invalidate-style trigger, not a draw).
pub trait HostHooks: Send + Sync {
    /// Schedule a repaint of the panel surface.
    fn request_repaint(&self);
}
