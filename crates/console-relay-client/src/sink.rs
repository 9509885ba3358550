// Copyright 2025-Present the console-relay authors.
// SPDX-License-Identifier: Apache-2.0

//! Interception layer: explicit wrapper sinks instead of monkey-patched
//! globals. Callers route their console output through a [`TelemetrySink`],
//! which always forwards to the wrapped sink first and additionally queues a
//! serialized record for transmission.

use crate::client::{ClientConfig, TelemetryClient};
use console_relay_core::error::RelayError;
use console_relay_core::record::{map_facade_level, ConsoleArg, LogLevel, LogRecord};

/// Destination of a console call.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, args: &[ConsoleArg]);
}

/// Writes to the process console the way a browser console would: errors and
/// warnings to stderr, everything else to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn log(&self, level: LogLevel, args: &[ConsoleArg]) {
        let line = args
            .iter()
            .map(ConsoleArg::render)
            .collect::<Vec<_>>()
            .join(" ");
        match level {
            LogLevel::Error | LogLevel::Warn => eprintln!("{line}"),
            _ => println!("{line}"),
        }
    }
}

/// Wraps any sink and mirrors every call into the telemetry queue.
///
/// Hard invariant: the wrapped sink runs first and the telemetry side can
/// never suppress its output. Enqueuing is infallible by construction.
pub struct TelemetrySink<S> {
    inner: S,
    client: TelemetryClient,
}

impl<S: LogSink> TelemetrySink<S> {
    pub fn new(inner: S, client: TelemetryClient) -> Self {
        TelemetrySink { inner, client }
    }

    /// Entry point for logging-facade calls carrying free-form level names.
    /// `error` maps to error, `warn`/`warning` to warn, everything else
    /// (`info`, `debug`, `verbose`, `silly`, unknown) to log.
    pub fn forward(&self, facade_level: &str, args: &[ConsoleArg]) {
        self.log(map_facade_level(facade_level), args);
    }

    /// The owning client, e.g. for a teardown-time [`final_flush`].
    ///
    /// [`final_flush`]: TelemetryClient::final_flush
    pub fn client(&self) -> &TelemetryClient {
        &self.client
    }
}

impl<S: LogSink> LogSink for TelemetrySink<S> {
    fn log(&self, level: LogLevel, args: &[ConsoleArg]) {
        // original output always comes first
        self.inner.log(level, args);
        self.client.enqueue(LogRecord::now(level, args));
    }
}

/// Builds the default interception stack: a console sink wrapped by a
/// telemetry sink shipping to the given endpoint.
pub fn setup_client_telemetry(
    config: ClientConfig,
) -> Result<TelemetrySink<ConsoleSink>, RelayError> {
    let client = TelemetryClient::new(config)?;
    Ok(TelemetrySink::new(ConsoleSink, client))
}
