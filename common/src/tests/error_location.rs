// Unit tests for ErrorLocation capture and formatting

use crate::ErrorLocation;
use std::panic::Location;

/// **VALUE**: Verifies that `ErrorLocation::from()` captures file, line, and column.
///
/// **WHY THIS MATTERS**: Every error variant in band-core carries an ErrorLocation.
/// If capture breaks, all pipe/protocol error messages lose their debugging value.
///
/// **BUG THIS CATCHES**: Would catch if `Location::caller()` stops being propagated
/// correctly or file/line/column extraction breaks.
#[test]
#[track_caller]
fn given_location_caller_when_error_location_created_then_captures_source_position() {
    // GIVEN: Current caller location
    // WHEN: Creating ErrorLocation from caller
    let location = ErrorLocation::from(Location::caller());

    // THEN: Should capture file, line, and column
    assert!(
        location.file.contains("error_location.rs"),
        "Should capture file path"
    );
    assert!(location.line > 0, "Should capture line number");
    assert!(location.column > 0, "Should capture column number");
}

/// **VALUE**: Verifies the Display format stays "[file:line:column]".
///
/// **WHY THIS MATTERS**: Locations are interpolated into every error Display string.
/// A format change makes log lines unreadable or loses the position entirely.
///
/// **BUG THIS CATCHES**: Would catch bracket removal, missing fields, or an
/// inconsistent separator count.
#[test]
#[track_caller]
fn given_error_location_when_formatted_then_produces_bracketed_format() {
    // GIVEN: An ErrorLocation
    let location = ErrorLocation::from(Location::caller());

    // WHEN: Formatting as string
    let formatted = format!("{}", location);

    // THEN: Should produce "[file:line:column]" format
    assert!(formatted.starts_with('['), "Should start with '['");
    assert!(formatted.ends_with(']'), "Should end with ']'");
    assert!(
        formatted.contains("error_location.rs"),
        "Should include filename"
    );
    assert!(
        formatted.contains(&location.line.to_string()),
        "Should include line number"
    );
    assert_eq!(
        formatted.matches(':').count(),
        2,
        "Should have exactly 2 colons"
    );
}

/// **VALUE**: Verifies that `#[track_caller]` propagation works through helpers.
///
/// **WHY THIS MATTERS**: band-core's `From` impls rely on `#[track_caller]` so
/// errors point at the conversion site, not the constructor. If propagation
/// breaks, every error reports the same useless line.
///
/// **BUG THIS CATCHES**: Would catch removal of `#[track_caller]` from
/// `ErrorLocation::from()` or a helper in the chain.
#[test]
fn given_multiple_call_sites_when_capturing_location_then_each_has_unique_line() {
    // GIVEN: A helper function that captures location
    #[track_caller]
    fn capture_location() -> ErrorLocation {
        ErrorLocation::from(Location::caller())
    }

    // WHEN: Capturing location from different call sites
    let first = capture_location();
    let second = capture_location();

    // THEN: Should have same file but different line numbers
    assert_eq!(first.file, second.file, "Should have same file");
    assert_eq!(first.line + 1, second.line, "Lines should be sequential");
}
