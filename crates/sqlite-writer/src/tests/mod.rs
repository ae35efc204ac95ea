//! Integration tests for the writer.
//!
//! - `harness.rs`   - Fake executor, in-process message source, log capture
//! - `handling.rs`  - Per-message decode / execute / log behaviour
//! - `dispatch.rs`  - Dispatch loop fan-out and shutdown
//! - `scenarios.rs` - End-to-end runs against a real SQLite file

mod handling;
