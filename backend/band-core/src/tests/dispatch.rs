// Unit tests for forwarded-event correlation and the handled convention

use crate::dispatch::{EventForwarder, PendingResponses, response_indicates_handled};

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::sync::mpsc;

/// **VALUE**: Verifies the reply-payload convention: non-zero first byte means
/// handled, empty or zero means unhandled.
///
/// **WHY THIS MATTERS**: This single byte decides whether the host suppresses
/// its default handling of an input event. Inverting it would make every
/// click behave wrong in both directions.
///
/// **BUG THIS CATCHES**: Would catch an accidental `!= 0` / `== 0` flip or a
/// panic on empty payloads.
#[test]
fn given_reply_payloads_when_interpreted_then_first_byte_decides() {
    assert!(!response_indicates_handled(&[]), "empty means unhandled");
    assert!(!response_indicates_handled(&[0]), "zero means unhandled");
    assert!(response_indicates_handled(&[1]));
    assert!(
        response_indicates_handled(&[7, 0, 0]),
        "only the first byte is meaningful"
    );
}

/// **VALUE**: Verifies a registered waiter receives its correlated payload.
///
/// **WHY THIS MATTERS**: Request-id correlation is what lets one channel
/// multiplex pings and forwarded events. A delivery to the wrong waiter
/// would hand one event's verdict to another.
///
/// **BUG THIS CATCHES**: Would catch completion keyed by the wrong id or a
/// slot map that drops entries on insert.
#[test]
fn given_registered_waiter_when_completed_then_payload_delivered() {
    // GIVEN: A waiter for request 5
    let pending = PendingResponses::new();
    let waiter = pending.register(5);

    // WHEN: The worker completes request 5
    pending.complete(5, Bytes::from_static(&[1]));

    // THEN: The payload arrives
    let payload = waiter
        .recv_timeout(Duration::from_secs(1))
        .expect("payload should be delivered");
    assert_eq!(&payload[..], &[1]);
}

/// **VALUE**: Verifies a late response (after cancel) is dropped, not queued.
///
/// **WHY THIS MATTERS**: A controller answering after the timeout must not
/// leave a stale verdict behind that the next forwarded event would consume
/// as its own.
///
/// **BUG THIS CATCHES**: Would catch slot reuse across requests or a
/// completion path that panics when the waiter is gone.
#[test]
fn given_cancelled_waiter_when_completed_then_late_response_is_dropped() {
    let pending = PendingResponses::new();
    let _waiter = pending.register(5);

    // WHEN: The host times out and cancels, then the response trickles in
    pending.cancel(5);
    pending.complete(5, Bytes::from_static(&[1]));

    // THEN: A new waiter under the same id sees nothing from the old exchange
    let fresh = pending.register(5);
    assert!(
        fresh.recv_timeout(Duration::from_millis(50)).is_err(),
        "stale response must not satisfy a later request"
    );
}

/// **VALUE**: Verifies the forward round-trip returns "unhandled" within the
/// configured timeout plus bounded overhead when nobody answers.
///
/// **WHY THIS MATTERS**: This is the liveness property protecting the host's
/// message pump: an absent or wedged controller must cost at most the
/// timeout, never an indefinite stall.
///
/// **BUG THIS CATCHES**: Would catch a wait without a deadline or a timeout
/// that surfaces as an error instead of the "unhandled" default.
#[test]
fn given_no_response_when_forwarding_then_unhandled_within_timeout_bound() {
    // GIVEN: A forwarder whose worker consumes frames but never replies
    let (tx, mut rx) = mpsc::unbounded_channel();
    let forwarder = EventForwarder::new(tx, Arc::new(PendingResponses::new()));
    let timeout = Duration::from_millis(100);

    // WHEN: Forwarding with nobody answering
    let started = Instant::now();
    let handled = forwarder.forward_event(0x0201, &[], timeout);
    let elapsed = started.elapsed();

    // THEN: Unhandled, after roughly the timeout and well within the bound
    assert!(!handled, "timeout must fall back to unhandled");
    assert!(elapsed >= timeout, "must actually wait out the timeout");
    assert!(
        elapsed < timeout + Duration::from_millis(500),
        "overhead past the timeout must be bounded, took {elapsed:?}"
    );

    // AND: The frame was queued for the worker exactly once
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());
}

/// **VALUE**: Verifies a stopped worker makes forwarding fail fast as
/// "unhandled" instead of waiting out the timeout.
///
/// **WHY THIS MATTERS**: After teardown (or a dead controller) every host
/// event would otherwise pay the full timeout, freezing input handling in
/// the host for no benefit.
///
/// **BUG THIS CATCHES**: Would catch a forward path that ignores the closed
/// outgoing queue and blocks anyway.
#[test]
fn given_stopped_worker_when_forwarding_then_immediate_unhandled() {
    // GIVEN: An outgoing queue whose receiver (the worker) is gone
    let (tx, rx) = mpsc::unbounded_channel::<Bytes>();
    drop(rx);
    let forwarder = EventForwarder::new(tx, Arc::new(PendingResponses::new()));

    // WHEN: Forwarding
    let started = Instant::now();
    let handled = forwarder.forward_event(0x0202, &[], Duration::from_secs(5));

    // THEN: Immediate unhandled, nowhere near the 5s timeout
    assert!(!handled);
    assert!(started.elapsed() < Duration::from_millis(500));
}

/// **VALUE**: Verifies a completed exchange reports the controller's verdict.
///
/// **WHY THIS MATTERS**: The happy path: controller answers "handled" in
/// time and the host suppresses default handling. This ties registration,
/// correlation, and payload interpretation together.
///
/// **BUG THIS CATCHES**: Would catch a request-id mismatch between the
/// encoded ForwardEvent and the waiter slot.
#[test]
fn given_timely_response_when_forwarding_then_handled_verdict_returned() {
    // GIVEN: A responder thread playing controller for request id 1
    let (tx, _rx) = mpsc::unbounded_channel();
    let pending = Arc::new(PendingResponses::new());
    let forwarder = EventForwarder::new(tx, Arc::clone(&pending));

    let responder = {
        let pending = Arc::clone(&pending);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            pending.complete(1, Bytes::from_static(&[1]));
        })
    };

    // WHEN: Forwarding the first event (request id 1)
    let handled = forwarder.forward_event(0x0201, &[], Duration::from_secs(2));

    // THEN: The verdict is "handled"
    assert!(handled);
    responder.join().expect("responder thread");
}
