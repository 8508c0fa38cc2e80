// Unit tests for the log-backed draw surface

use crate::surface::LogSurface;

use band_core::cache::RenderItem;
use band_core::painter::{DrawSurface, paint_all};

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

/// **VALUE**: Verifies the surface counts exactly what the painter issues.
///
/// **WHY THIS MATTERS**: The counters are the only observable the harness's
/// integration tests have; if they drift from the actual draw calls, those
/// tests assert nothing.
///
/// **BUG THIS CATCHES**: Would catch a counter incremented in the wrong
/// trait method, or a paint that skips the clear.
#[test]
fn given_snapshot_when_painted_then_counts_match() {
    let mut surface = LogSurface::new();

    paint_all(&mut surface, &[item("a", "one"), item("b", "two")]);

    assert_eq!(surface.clears(), 1);
    assert_eq!(surface.items_drawn(), 2);
}

/// **VALUE**: Verifies repeated paints accumulate rather than reset.
///
/// **WHY THIS MATTERS**: The harness paints on every repaint request; the
/// counters must reflect the full history to detect missed or duplicated
/// repaints.
///
/// **BUG THIS CATCHES**: Would catch counters zeroed inside `clear()`.
#[test]
fn given_two_paints_when_counted_then_totals_accumulate() {
    let mut surface = LogSurface::new();

    paint_all(&mut surface, &[item("a", "one")]);
    paint_all(&mut surface, &[]);

    assert_eq!(surface.clears(), 2);
    assert_eq!(surface.items_drawn(), 1);
}
