use crate::helpers::{Controller, CountingHooks, RecordingSurface, set_item, start_test_panel, wait_until};

use band_core::config::PanelConfig;
use band_core::error::CoreError;
use band_core::listener::ListenerState;
use band_core::panel::Panel;
use band_core::transport::derive_endpoint;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serial_test::serial;

/// **VALUE**: Verifies `stop()` joins the worker promptly while it is
/// blocked reading from an idle controller.
///
/// **WHY THIS MATTERS**: Teardown runs on the host's UI-bound thread. A
/// stop that waits for network traffic (or hangs) freezes the whole host
/// shell. The stop signal must abort the blocking read immediately.
///
/// **BUG THIS CATCHES**: Would catch a worker loop that only checks the
/// stop signal between messages instead of racing it against the read.
#[tokio::test]
#[serial]
async fn given_idle_connected_controller_when_stopped_then_join_is_prompt() {
    // GIVEN: A running panel whose worker is blocked in a read
    let (mut panel, hooks, channel_name) = start_test_panel();
    let mut controller = Controller::connect(&channel_name, panel.config()).await;
    controller.send(&set_item("a", "one", 0, 0)).await;
    wait_until(|| hooks.repaints() >= 1, "worker is live").await;

    // WHEN: Stopping
    let began = Instant::now();
    panel.stop();
    let elapsed = began.elapsed();

    // THEN: The join returned quickly and the state is terminal
    assert!(elapsed < Duration::from_secs(1), "stop took {elapsed:?}");
    assert_eq!(panel.listener_state(), ListenerState::Stopped);
    assert!(!panel.is_running());
}

/// **VALUE**: Verifies stop works before any controller ever connects, and
/// that repeated stops are harmless.
///
/// **WHY THIS MATTERS**: Most panel instances are created and destroyed
/// without a controller attaching. Teardown must not depend on a
/// connection having existed.
///
/// **BUG THIS CATCHES**: Would catch a worker that only honors the stop
/// signal after accept completes, or a second stop that panics on a
/// consumed join handle.
#[tokio::test]
#[serial]
async fn given_no_controller_when_stopped_twice_then_clean_both_times() {
    let (mut panel, _hooks, _channel_name) = start_test_panel();
    assert!(panel.is_running());

    panel.stop();
    assert_eq!(panel.listener_state(), ListenerState::Stopped);

    panel.stop();
    assert_eq!(panel.listener_state(), ListenerState::Stopped);

    // A forwarded event after stop is immediately unhandled.
    assert!(!panel.on_host_event(0x0201));
}

/// **VALUE**: Verifies an endpoint collision surfaces at `start()` as a
/// connection error and leaves the panel inert but reusable.
///
/// **WHY THIS MATTERS**: Two panel instances (or an unrelated process) can
/// race for the same channel endpoint. The loser must find out
/// synchronously, not via a worker that dies in the background.
///
/// **BUG THIS CATCHES**: Would catch binding moved into the worker, where
/// the error would be logged and lost.
#[tokio::test]
#[serial]
async fn given_endpoint_taken_when_started_then_connection_error_and_panel_inert() {
    let config = PanelConfig::default();
    let channel_name = Panel::generate_channel_name();

    // GIVEN: The derived endpoint is already claimed
    let endpoint = derive_endpoint(&channel_name, &config.channel);
    let _squatter = std::net::TcpListener::bind(endpoint).expect("claim endpoint");

    // WHEN: Starting a panel on the same channel
    let hooks = Arc::new(CountingHooks::default());
    let mut panel = Panel::new(config, hooks);
    let result = panel.start(&channel_name);

    // THEN: A connection error, no running listener, stop is still safe
    assert!(
        matches!(
            result,
            Err(CoreError::Pipe(
                band_core::error::pipe::PipeError::Connection { .. }
            ))
        ),
        "expected a connection error, got {result:?}"
    );
    assert!(!panel.is_running());
    assert_eq!(panel.listener_state(), ListenerState::NotStarted);
    panel.stop();
}

/// **VALUE**: Verifies a hand-built invalid config is rejected by `start()`
/// as an error instead of panicking inside endpoint derivation.
///
/// **WHY THIS MATTERS**: Hosts are free to construct `PanelConfig` directly
/// rather than going through `load()`, which is the only other place
/// validation runs. An empty port window would otherwise hit a
/// remainder-by-zero while folding the channel hash into a port, and an
/// oversized window would overflow `u16`.
///
/// **BUG THIS CATCHES**: Would catch removal of the validation call on the
/// start path, leaving `load()` as its only caller.
#[test]
fn given_invalid_port_window_when_started_then_config_error_not_panic() {
    // GIVEN: A config with an empty port window, built without load()
    let mut config = PanelConfig::default();
    config.channel.port_range = 0;
    let mut panel = Panel::new(config, Arc::new(CountingHooks::default()));

    // WHEN: Starting
    let result = panel.start("taskband-invalid-window");

    // THEN: A config error, and the panel is untouched
    assert!(
        matches!(result, Err(CoreError::Config(_))),
        "expected a config validation error, got {result:?}"
    );
    assert!(!panel.is_running());
    assert_eq!(panel.listener_state(), ListenerState::NotStarted);

    // AND: An overflowing window is rejected the same way
    let mut config = PanelConfig::default();
    config.channel.port_base = 65000;
    config.channel.port_range = 16384;
    let mut panel = Panel::new(config, Arc::new(CountingHooks::default()));
    assert!(matches!(
        panel.start("taskband-overflow-window"),
        Err(CoreError::Config(_))
    ));
}

/// **VALUE**: Verifies nothing mutates the render cache after `stop()`
/// returns, even when commands were still in flight.
///
/// **WHY THIS MATTERS**: This is the core teardown guarantee. The host
/// destroys the panel right after stop; a late cache mutation or repaint
/// callback would race destruction.
///
/// **BUG THIS CATCHES**: Would catch a stop that signals without joining,
/// leaving the worker to drain buffered commands into a dead panel.
#[tokio::test]
#[serial]
async fn given_stopped_panel_when_late_commands_sent_then_cache_unchanged() {
    let (mut panel, hooks, channel_name) = start_test_panel();
    let mut controller = Controller::connect(&channel_name, panel.config()).await;

    controller.send(&set_item("a", "one", 0, 0)).await;
    wait_until(|| hooks.repaints() >= 1, "first command applied").await;

    // WHEN: Stop, then a command races the closed channel
    panel.stop();
    let repaints_at_stop = hooks.repaints();
    controller
        .send_raw_ignoring_errors(&band_core::protocol::encode_message(&set_item(
            "b", "two", 10, 0,
        )))
        .await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    // THEN: Neither the cache nor the repaint count moved
    assert_eq!(hooks.repaints(), repaints_at_stop);
    let mut surface = RecordingSurface::default();
    panel.on_paint(&mut surface);
    assert_eq!(surface.ops.len(), 2, "ops: {:?}", surface.ops);
    assert!(surface.ops[1].contains("\"one\""));
}

/// **VALUE**: Verifies a stopped panel can be started again on a fresh
/// channel.
///
/// **WHY THIS MATTERS**: Hosts recycle panel instances across controller
/// sessions; a one-shot lifecycle would force a full reconstruction.
///
/// **BUG THIS CATCHES**: Would catch start-guard logic keyed on "a
/// listener has ever existed" rather than "a listener is running".
#[tokio::test]
#[serial]
async fn given_stopped_panel_when_restarted_then_new_channel_serves_commands() {
    let (mut panel, hooks, _channel_name) = start_test_panel();
    panel.stop();

    // WHEN: Restarting on a new channel
    let second_channel = Panel::generate_channel_name();
    panel
        .start(&second_channel)
        .expect("restart should succeed");
    assert!(panel.is_running());

    // THEN: The new channel carries commands
    let mut controller = Controller::connect(&second_channel, panel.config()).await;
    controller.send(&set_item("x", "again", 0, 0)).await;
    wait_until(|| hooks.repaints() >= 1, "repaint on the new channel").await;
}
