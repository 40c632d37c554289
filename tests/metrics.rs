#![cfg(feature = "metrics")]
//! Tests for `pushframe` metrics helpers.
//!
//! These tests verify that counters and gauges update as expected using
//! `metrics_util::debugging::DebuggingRecorder`.
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use pushframe::{ErrorCode, metrics as pf_metrics};
use rstest::rstest;

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

fn counter_value(snapshotter: &Snapshotter, name: &str) -> Option<u64> {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .find_map(|(k, _, _, v)| match v {
            DebugValue::Counter(c) if k.key().name() == name => Some(c),
            _ => None,
        })
}

#[test]
fn flushed_frame_records_frames_and_bytes() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        pf_metrics::inc_frames_flushed(107);
        pf_metrics::inc_frames_flushed(56);
    });

    let metrics = snapshotter.snapshot().into_vec();
    let frames = metrics.iter().find_map(|(k, _, _, v)| match v {
        DebugValue::Counter(c) if k.key().name() == pf_metrics::FRAMES_FLUSHED => Some(*c),
        _ => None,
    });
    let bytes = metrics.iter().find_map(|(k, _, _, v)| match v {
        DebugValue::Counter(c) if k.key().name() == pf_metrics::BYTES_FLUSHED => Some(*c),
        _ => None,
    });
    assert_eq!(frames, Some(2));
    assert_eq!(bytes, Some(163));
}

#[test]
fn submission_metric_increments() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, pf_metrics::inc_submitted);

    assert_eq!(
        counter_value(&snapshotter, pf_metrics::NOTIFICATIONS_SUBMITTED),
        Some(1)
    );
}

#[rstest]
#[case(ErrorCode::Shutdown, "SHUTDOWN")]
#[case(ErrorCode::InvalidToken, "INVALID_TOKEN")]
fn connection_error_metric_is_labelled_by_code(#[case] code: ErrorCode, #[case] label: &str) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || pf_metrics::inc_connection_errors(code));

    let metrics = snapshotter.snapshot().into_vec();
    let found = metrics.iter().any(|(k, _, _, v)| {
        k.key().name() == pf_metrics::CONNECTION_ERRORS
            && k.key()
                .labels()
                .any(|l| l.key() == "code" && l.value() == label)
            && matches!(v, DebugValue::Counter(c) if *c > 0)
    });
    assert!(found, "connection error metric not recorded for {label}");
}

#[test]
fn connection_gauge_moves_both_ways() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        pf_metrics::inc_connections();
        pf_metrics::inc_connections();
        pf_metrics::dec_connections();
    });

    let metrics = snapshotter.snapshot().into_vec();
    let value = metrics.iter().find_map(|(k, _, _, v)| match v {
        DebugValue::Gauge(g) if k.key().name() == pf_metrics::CONNECTIONS_ACTIVE => {
            Some(g.0)
        }
        _ => None,
    });
    assert_eq!(value, Some(1.0));
}
