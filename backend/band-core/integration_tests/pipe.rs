use crate::helpers::{Controller, RecordingSurface, set_item, start_test_panel, wait_until};

use band_core::protocol::ProtocolMessage;

use bytes::Bytes;
use serial_test::serial;

/// **VALUE**: Verifies the full render path: controller command, framed
/// transport, dispatch, cache, repaint callback, paint.
///
/// **WHY THIS MATTERS**: This is the system's reason to exist. A controller
/// sets items; the panel must ask its host to repaint and then draw those
/// items in insertion order on the next paint event.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Frames are mis-parsed anywhere along the transport path
/// - Dispatch applies commands to the wrong cache entry
/// - The repaint callback is never issued
/// - Draw order diverges from insertion order
#[tokio::test]
#[serial]
async fn given_connected_controller_when_items_set_then_panel_paints_them_in_order() {
    // GIVEN: A started panel with a connected controller
    let (panel, hooks, channel_name) = start_test_panel();
    let mut controller = Controller::connect(&channel_name, panel.config()).await;

    // WHEN: The controller sets two items
    controller.send(&set_item("clock", "Hello", 0, 0)).await;
    controller.send(&set_item("status", "World", 40, 0)).await;
    wait_until(|| hooks.repaints() >= 2, "two repaint requests").await;

    // THEN: A paint clears and draws both items, first-inserted first
    let mut surface = RecordingSurface::default();
    panel.on_paint(&mut surface);

    assert_eq!(surface.ops.len(), 3, "clear plus two draws: {:?}", surface.ops);
    assert_eq!(surface.ops[0], "clear");
    assert!(surface.ops[1].contains("\"Hello\""), "ops: {:?}", surface.ops);
    assert!(surface.ops[2].contains("\"World\""), "ops: {:?}", surface.ops);
}

/// **VALUE**: Verifies removal and clear-all reach the painted output.
///
/// **WHY THIS MATTERS**: Stale items lingering on a panel after the
/// controller removed them is the most user-visible failure this system
/// can have.
///
/// **BUG THIS CATCHES**: Would catch if RemoveItem/ClearAll decode or
/// dispatch incorrectly, or if removal fails to trigger a repaint.
#[tokio::test]
#[serial]
async fn given_items_when_removed_and_cleared_then_paint_reflects_each_step() {
    let (panel, hooks, channel_name) = start_test_panel();
    let mut controller = Controller::connect(&channel_name, panel.config()).await;

    controller.send(&set_item("a", "one", 0, 0)).await;
    controller.send(&set_item("b", "two", 10, 0)).await;
    wait_until(|| hooks.repaints() >= 2, "initial repaints").await;

    // WHEN: One item is removed
    controller
        .send(&ProtocolMessage::RemoveItem {
            id: String::from("a"),
        })
        .await;
    wait_until(|| hooks.repaints() >= 3, "repaint after remove").await;

    // THEN: Only the survivor is painted
    let mut surface = RecordingSurface::default();
    panel.on_paint(&mut surface);
    assert_eq!(surface.ops.len(), 2, "clear plus one draw: {:?}", surface.ops);
    assert!(surface.ops[1].contains("\"two\""));

    // WHEN: Everything is cleared
    controller.send(&ProtocolMessage::ClearAll).await;
    wait_until(|| hooks.repaints() >= 4, "repaint after clear").await;

    // THEN: A paint only clears
    let mut surface = RecordingSurface::default();
    panel.on_paint(&mut surface);
    assert_eq!(surface.ops, vec![String::from("clear")]);
}

/// **VALUE**: Verifies the liveness probe round-trip over a live channel.
///
/// **WHY THIS MATTERS**: Ping is how a controller distinguishes a healthy
/// panel from a dead pipe. The response must carry the probe's request id
/// so concurrent probes correlate.
///
/// **BUG THIS CATCHES**: Would catch a dispatch path that drops Ping, or a
/// response written with the wrong request id or a non-empty payload.
#[tokio::test]
#[serial]
async fn given_connected_controller_when_ping_sent_then_correlated_empty_response() {
    let (panel, _hooks, channel_name) = start_test_panel();
    let mut controller = Controller::connect(&channel_name, panel.config()).await;

    // WHEN: A probe with a distinctive request id
    controller
        .send(&ProtocolMessage::Ping { request_id: 7001 })
        .await;

    // THEN: The reply correlates and carries no payload
    let reply = controller.read().await;
    assert_eq!(
        reply,
        ProtocolMessage::Response {
            request_id: 7001,
            payload: Bytes::new(),
        }
    );
}

/// **VALUE**: Verifies a malformed frame closes the channel rather than
/// being skipped.
///
/// **WHY THIS MATTERS**: The decoder is strict by design; after framing is
/// lost, every subsequent byte is suspect. The controller must observe EOF
/// so it can reconnect with a clean stream.
///
/// **BUG THIS CATCHES**: Would catch any attempt to resynchronize past an
/// unknown tag instead of closing.
#[tokio::test]
#[serial]
async fn given_connected_controller_when_unknown_tag_sent_then_channel_closes() {
    let (panel, hooks, channel_name) = start_test_panel();
    let mut controller = Controller::connect(&channel_name, panel.config()).await;

    controller.send(&set_item("a", "one", 0, 0)).await;
    wait_until(|| hooks.repaints() >= 1, "repaint before the bad frame").await;

    // WHEN: A frame with an undefined tag arrives
    controller
        .send_raw_ignoring_errors(&[1, 0, 0, 0, 0xEE])
        .await;

    // THEN: The panel closes the stream; a subsequent command has no effect
    controller
        .send_raw_ignoring_errors(&band_core::protocol::encode_message(&set_item(
            "b", "two", 10, 0,
        )))
        .await;
    tokio::time::sleep(std::time::Duration::from_millis(150)).await;

    let mut surface = RecordingSurface::default();
    panel.on_paint(&mut surface);
    assert_eq!(
        surface.ops.len(),
        2,
        "last-known state is kept, the post-error command is not applied: {:?}",
        surface.ops
    );
    assert!(surface.ops[1].contains("\"one\""));
}
