// Copyright 2025-Present the console-relay authors.
// SPDX-License-Identifier: Apache-2.0

//! Client-side telemetry pipeline.
//!
//! Intercepted console calls are rendered into [`LogRecord`]s, buffered in a
//! bounded FIFO queue owned by a [`client::TelemetryClient`], and shipped in
//! batches to the relay endpoint. Delivery is strictly best-effort: failed
//! batches are re-queued up to a cap and a final fire-and-forget flush is
//! available for teardown. No failure in this pipeline ever suppresses the
//! original console output.
//!
//! [`LogRecord`]: console_relay_core::record::LogRecord

pub mod client;
pub mod queue;
pub mod retry;
pub mod sink;

pub use client::{ClientConfig, FlushOutcome, TelemetryClient};
pub use retry::RetryStrategy;
pub use sink::{setup_client_telemetry, ConsoleSink, LogSink, TelemetrySink};
