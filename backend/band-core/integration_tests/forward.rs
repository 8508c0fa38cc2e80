use crate::helpers::{Controller, CountingHooks};

use band_core::config::PanelConfig;
use band_core::panel::Panel;
use band_core::protocol::ProtocolMessage;

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use serial_test::serial;

fn forward_test_panel(timeout_ms: u64) -> (Panel, String) {
    let mut config = PanelConfig::default();
    config.forward.timeout_ms = timeout_ms;

    let mut panel = Panel::new(config, Arc::new(CountingHooks::default()));
    let channel_name = Panel::generate_channel_name();
    panel
        .start(&channel_name)
        .expect("panel start should succeed on a fresh channel");
    (panel, channel_name)
}

/// **VALUE**: Verifies the full forwarded-event round-trip: host event out,
/// controller decision back, `true` returned to the host.
///
/// **WHY THIS MATTERS**: This is how a controller claims input events
/// (clicks) happening on the panel. The host thread blocks for the answer,
/// so correlation by request id must work across the thread boundary.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The ForwardEvent frame never reaches the controller
/// - The response payload is interpreted with inverted polarity
/// - Request id correlation delivers the reply to the wrong waiter
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn given_responsive_controller_when_event_forwarded_then_handled() {
    // GIVEN: A controller that claims every forwarded event
    let (panel, channel_name) = forward_test_panel(2_000);
    let mut controller = Controller::connect(&channel_name, panel.config()).await;

    let responder = tokio::spawn(async move {
        let message = controller.read().await;
        let ProtocolMessage::ForwardEvent {
            request_id,
            message_id,
            ..
        } = message
        else {
            panic!("expected a ForwardEvent, got {message:?}");
        };
        assert_eq!(message_id, 0x0201);

        controller
            .send(&ProtocolMessage::Response {
                request_id,
                payload: Bytes::from_static(&[1]),
            })
            .await;
        controller
    });

    // WHEN: The host offers a left-button-down
    let handled = tokio::task::block_in_place(|| panel.on_host_event(0x0201));

    // THEN: The controller's claim reaches the host
    assert!(handled, "controller claimed the event");
    responder.await.expect("responder task");
}

/// **VALUE**: Verifies an unresponsive controller yields "unhandled" within
/// the configured timeout, not a hang.
///
/// **WHY THIS MATTERS**: The host's message pump blocks inside
/// `on_host_event`. The timeout is the only thing standing between a
/// stalled controller and a frozen host shell.
///
/// **BUG THIS CATCHES**: Would catch a wait with no deadline, or a timeout
/// that reports "handled".
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn given_silent_controller_when_event_forwarded_then_unhandled_within_timeout() {
    // GIVEN: A connected controller that never replies
    let (panel, channel_name) = forward_test_panel(100);
    let _controller = Controller::connect(&channel_name, panel.config()).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    // WHEN: Forwarding with a 100ms timeout
    let began = Instant::now();
    let handled = tokio::task::block_in_place(|| panel.on_host_event(0x0201));
    let elapsed = began.elapsed();

    // THEN: Unhandled, and the wait respected the deadline
    assert!(!handled);
    assert!(elapsed >= Duration::from_millis(100), "returned early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(600), "overshot the timeout: {elapsed:?}");
}

/// **VALUE**: Verifies a controller reply of zero means "unhandled".
///
/// **WHY THIS MATTERS**: A controller must be able to decline an event so
/// the host's default handling still runs. Declining is not the same as
/// staying silent; it returns immediately.
///
/// **BUG THIS CATCHES**: Would catch payload interpretation treating any
/// reply as a claim.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn given_declining_controller_when_event_forwarded_then_unhandled() {
    let (panel, channel_name) = forward_test_panel(2_000);
    let mut controller = Controller::connect(&channel_name, panel.config()).await;

    let responder = tokio::spawn(async move {
        let message = controller.read().await;
        let ProtocolMessage::ForwardEvent { request_id, .. } = message else {
            panic!("expected a ForwardEvent, got {message:?}");
        };
        controller
            .send(&ProtocolMessage::Response {
                request_id,
                payload: Bytes::from_static(&[0]),
            })
            .await;
    });

    let handled = tokio::task::block_in_place(|| panel.on_host_event(0x0201));

    assert!(!handled, "a zero reply declines the event");
    responder.await.expect("responder task");
}

/// **VALUE**: Verifies message ids outside the forward policy never leave
/// the host.
///
/// **WHY THIS MATTERS**: Forwarding every window message would serialize
/// the host's entire pump through the controller. The policy whitelist is
/// what keeps uninteresting traffic on the fast path.
///
/// **BUG THIS CATCHES**: Would catch the policy check being skipped or the
/// wrong id list being consulted.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn given_unlisted_message_id_when_event_offered_then_immediate_false() {
    let (panel, channel_name) = forward_test_panel(2_000);
    let _controller = Controller::connect(&channel_name, panel.config()).await;

    // WHEN: An id the default policy does not forward
    let began = Instant::now();
    let handled = tokio::task::block_in_place(|| panel.on_host_event(0x9999));

    // THEN: No round-trip happened at all
    assert!(!handled);
    assert!(
        began.elapsed() < Duration::from_millis(50),
        "unlisted ids must not wait on the controller"
    );
}
