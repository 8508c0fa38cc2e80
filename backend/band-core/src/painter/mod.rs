//! Painting of cache snapshots onto a host-provided surface.

use crate::cache::RenderItem;

use log::trace;

/// Drawing surface supplied by the host on every paint event.
///
/// Implementations wrap whatever the host actually draws with (a device
/// context, a frame buffer, a log in tests). They must tolerate being
/// called repeatedly and rapidly.
pub trait DrawSurface {
    /// Erase the previous contents before a full repaint.
    fn clear(&mut self);

    /// Draw one item at its recorded position with its recorded style.
    fn draw_text(&mut self, item: &RenderItem);
}

/// Issue drawing calls for every item of a snapshot, in draw order.
///
/// Never mutates state and never touches the channel, so it is safe on
/// every paint event regardless of what the listener worker is doing.
pub fn paint_all(surface: &mut dyn DrawSurface, snapshot: &[RenderItem]) {
    surface.clear();
    for item in snapshot {
        trace!("draw {:?} at ({}, {})", item.id, item.x, item.y);
        surface.draw_text(item);
    }
}
