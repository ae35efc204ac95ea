//! Per-message handling.
//!
//! Covers:
//! - well-formed requests reach the executor unchanged
//! - malformed bodies log one decode error and never reach the executor
//! - execution failures log one error and are swallowed

use super::harness::{message, request_message, LogCapture, RecordingExecutor};
use crate::handler::{HandleOutcome, RequestHandler};
use serde_json::json;
use writer_database::SqlParam;

#[tokio::test]
async fn well_formed_request_is_executed_without_errors() {
    let capture = LogCapture::default();
    let _guard = capture.install();

    let executor = RecordingExecutor::new();
    let handler = RequestHandler::new(executor.clone());

    let outcome = handler
        .handle(&request_message(
            "INSERT INTO t(a) VALUES (?)",
            json!([42]),
        ))
        .await;

    assert!(matches!(outcome, HandleOutcome::Executed(_)));
    let requests = executor.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].sql, "INSERT INTO t(a) VALUES (?)");
    assert_eq!(requests[0].params, vec![SqlParam::Integer(42)]);
    assert_eq!(capture.error_count(), 0);
}

#[tokio::test]
async fn mixed_scalar_params_are_passed_in_order() {
    let executor = RecordingExecutor::new();
    let handler = RequestHandler::new(executor.clone());

    handler
        .handle(&request_message(
            "INSERT OR IGNORE INTO payments (correlation_id, amount, requested_at, processor) VALUES (?, ?, ?, ?)",
            json!(["4a7d", 19.9, "2025-07-15T12:34:56.000Z", null]),
        ))
        .await;

    assert_eq!(
        executor.requests()[0].params,
        vec![
            SqlParam::Text("4a7d".into()),
            SqlParam::Real(19.9),
            SqlParam::Text("2025-07-15T12:34:56.000Z".into()),
            SqlParam::Null,
        ]
    );
}

#[tokio::test]
async fn not_json_logs_exactly_one_decode_error() {
    let capture = LogCapture::default();
    let _guard = capture.install();

    let executor = RecordingExecutor::new();
    let handler = RequestHandler::new(executor.clone());

    let outcome = handler.handle(&message("not-json")).await;

    assert_eq!(outcome, HandleOutcome::DecodeFailed);
    assert_eq!(executor.call_count(), 0);
    assert_eq!(capture.count("Failed to decode SQL request"), 1);
    assert_eq!(capture.error_count(), 1);
}

#[tokio::test]
async fn envelopes_with_missing_or_wrong_fields_are_not_executed() {
    let executor = RecordingExecutor::new();
    let handler = RequestHandler::new(executor.clone());

    for body in [
        r#"{"params": [1]}"#,
        r#"{"sql": "DELETE FROM t"}"#,
        r#"{"sql": ["DELETE FROM t"], "params": []}"#,
        r#"{"sql": "INSERT INTO t(a) VALUES (?)", "params": [{"nested": true}]}"#,
        r#"{"sql": "DELETE FROM t", "params": "1"}"#,
    ] {
        assert_eq!(
            handler.handle(&message(body)).await,
            HandleOutcome::DecodeFailed,
            "body {body} should fail to decode"
        );
    }

    assert_eq!(executor.call_count(), 0);
}

#[tokio::test]
async fn execution_failure_is_logged_and_swallowed() {
    let capture = LogCapture::default();
    let _guard = capture.install();

    let executor = RecordingExecutor::failing("disk I/O error");
    let handler = RequestHandler::new(executor.clone());

    let outcome = handler
        .handle(&request_message("DELETE FROM t WHERE a = ?", json!([1])))
        .await;

    assert_eq!(outcome, HandleOutcome::ExecuteFailed);
    assert_eq!(executor.call_count(), 1);
    assert_eq!(capture.count("Failed to execute SQL request"), 1);
    assert!(capture.output().contains("disk I/O error"));
    assert_eq!(capture.error_count(), 1);
}

#[tokio::test]
async fn handler_keeps_working_after_failures() {
    let executor = RecordingExecutor::new();
    let handler = RequestHandler::new(executor.clone());

    assert_eq!(
        handler.handle(&message("{broken")).await,
        HandleOutcome::DecodeFailed
    );
    assert!(matches!(
        handler
            .handle(&request_message("DELETE FROM t", json!([])))
            .await,
        HandleOutcome::Executed(_)
    ));
    assert_eq!(executor.call_count(), 1);
}
