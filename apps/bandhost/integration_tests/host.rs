//! Harness-level tests: a hosted panel with no controller attached.

use bandhost::hooks::RepaintFlag;
use bandhost::surface::LogSurface;

use band_core::config::PanelConfig;
use band_core::listener::ListenerState;
use band_core::panel::Panel;

use std::sync::Arc;

/// **VALUE**: Verifies the harness wiring works before any controller
/// appears: the panel starts, paints an empty state, and stops cleanly.
///
/// **WHY THIS MATTERS**: The panel spends its first moments (often its
/// whole life) without a controller. Paint and teardown must not depend on
/// a connection.
///
/// **BUG THIS CATCHES**: Would catch a paint path that blocks on the
/// channel, or a stop that hangs waiting for a controller that never came.
#[test]
fn given_no_controller_when_hosted_then_paint_and_stop_work() {
    // GIVEN: A hosted panel on a fresh channel
    let repaint = Arc::new(RepaintFlag::new());
    let mut panel = Panel::new(PanelConfig::default(), repaint.clone());
    let channel_name = Panel::generate_channel_name();
    panel
        .start(&channel_name)
        .expect("panel start should succeed on a fresh channel");
    assert!(panel.is_running());

    // WHEN: Painting with nothing connected
    let mut surface = LogSurface::new();
    panel.on_paint(&mut surface);

    // THEN: An empty repaint - clear, no items
    assert_eq!(surface.clears(), 1);
    assert_eq!(surface.items_drawn(), 0);

    // AND: No repaint was ever requested
    assert!(!repaint.take());

    // WHEN: Stopping
    panel.stop();

    // THEN: Terminal state, and host events fall through immediately
    assert_eq!(panel.listener_state(), ListenerState::Stopped);
    assert!(!panel.on_host_event(0x0201));
}

/// **VALUE**: Verifies dropping a running panel tears it down without a
/// prior explicit `stop()`.
///
/// **WHY THIS MATTERS**: A harness unwinding from an error will drop the
/// panel wherever it happens to be; the worker thread must not outlive it.
///
/// **BUG THIS CATCHES**: Would catch a Drop impl that forgets to join,
/// leaving the endpoint bound after the panel is gone.
#[test]
fn given_running_panel_when_dropped_then_endpoint_released() {
    let channel_name = Panel::generate_channel_name();
    let endpoint;

    {
        let mut panel = Panel::new(PanelConfig::default(), Arc::new(RepaintFlag::new()));
        endpoint = band_core::transport::derive_endpoint(&channel_name, &panel.config().channel);
        panel
            .start(&channel_name)
            .expect("panel start should succeed on a fresh channel");
    }

    // The drop joined the worker, so the endpoint is free again.
    let rebound = std::net::TcpListener::bind(endpoint);
    assert!(rebound.is_ok(), "endpoint still bound after drop");
}
