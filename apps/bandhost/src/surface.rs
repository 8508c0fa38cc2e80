//! Console draw surface.
//!
//! Stands in for the real taskbar device context: paints land in the log,
//! which is exactly what a harness without a windowing system can show.

use band_core::cache::RenderItem;
use band_core::painter::DrawSurface;

use log::info;

/// Surface that renders to the log, one line per item.
#[derive(Debug, Default)]
pub struct LogSurface {
    clears: usize,
    items_drawn: usize,
}

impl LogSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of full repaints issued so far.
    pub fn clears(&self) -> usize {
        self.clears
    }

    /// Total items drawn across all repaints.
    pub fn items_drawn(&self) -> usize {
        self.items_drawn
    }
}

impl DrawSurface for LogSurface {
    fn clear(&mut self) {
        self.clears += 1;
        info!("paint: clear");
    }

    fn draw_text(&mut self, item: &RenderItem) {
        self.items_drawn += 1;
        info!(
            "paint: {:?} at ({}, {}): {}",
            item.id, item.x, item.y, item.text
        );
    }
}
