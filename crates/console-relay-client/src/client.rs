// Copyright 2025-Present the console-relay authors.
// SPDX-License-Identifier: Apache-2.0

use crate::queue::RecordQueue;
use crate::retry::RetryStrategy;
use console_relay_core::envelope::LogEnvelope;
use console_relay_core::error::RelayError;
use console_relay_core::record::LogRecord;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BATCH_SIZE: usize = 10;
const DEFAULT_MAX_QUEUE: usize = 100;
const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for a [`TelemetryClient`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Full URL of the relay endpoint, e.g. `http://127.0.0.1:8126/api/telemetry`.
    pub endpoint: String,
    /// Oldest records drained per flush.
    pub batch_size: usize,
    /// Queue cap enforced on the re-queue-after-failure path.
    pub max_queue: usize,
    /// Delay between an enqueue and the flush it schedules.
    pub debounce: Duration,
    /// Delay before the next attempt when records remain after a flush.
    pub retry_delay: Duration,
    /// HTTP client timeout.
    pub timeout: Duration,
    /// Per-request retry policy.
    pub retry_strategy: RetryStrategy,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        ClientConfig {
            endpoint: endpoint.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_queue: DEFAULT_MAX_QUEUE,
            debounce: DEFAULT_DEBOUNCE,
            retry_delay: DEFAULT_RETRY_DELAY,
            timeout: DEFAULT_TIMEOUT,
            retry_strategy: RetryStrategy::default(),
        }
    }
}

/// Result of a single flush invocation.
#[derive(Debug, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing queued.
    Empty,
    /// Another flush was in flight; this call was a no-op.
    InFlight,
    /// The batch was delivered.
    Sent(usize),
    /// The batch failed and was restored to the front of the queue.
    Requeued { attempted: usize, dropped: usize },
}

/// Owns the record queue and ships batches to the relay endpoint.
///
/// One instance per application; clones share the same queue. All delivery
/// is best-effort and no method here ever surfaces a failure to the code
/// whose output is being forwarded.
#[derive(Clone)]
pub struct TelemetryClient {
    inner: Arc<Inner>,
}

struct Inner {
    queue: Mutex<RecordQueue>,
    in_flight: AtomicBool,
    http: reqwest::Client,
    config: ClientConfig,
}

#[derive(Debug, thiserror::Error)]
enum ShippingError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status {0}")]
    Status(StatusCode),
}

impl TelemetryClient {
    pub fn new(config: ClientConfig) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RelayError::ClientBuild(e.to_string()))?;
        Ok(TelemetryClient {
            inner: Arc::new(Inner {
                queue: Mutex::new(RecordQueue::new(config.max_queue)),
                in_flight: AtomicBool::new(false),
                http,
                config,
            }),
        })
    }

    /// Queues a record and schedules a debounced flush. Infallible: fresh
    /// enqueues are not capped and scheduling problems are only logged.
    pub fn enqueue(&self, record: LogRecord) {
        {
            let mut queue = self.lock_queue();
            queue.push(record);
        }
        self.schedule_flush(self.inner.config.debounce);
    }

    /// Number of records currently queued.
    pub fn pending(&self) -> usize {
        self.lock_queue().len()
    }

    /// Drains up to one batch and ships it. Non-reentrant: while a flush is
    /// in flight any other call is a no-op and the remaining records are
    /// picked up by the next scheduled attempt.
    pub async fn flush(&self) -> FlushOutcome {
        if self
            .inner
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return FlushOutcome::InFlight;
        }

        let batch = {
            let mut queue = self.lock_queue();
            queue.take_batch(self.inner.config.batch_size)
        };

        let outcome = if batch.is_empty() {
            FlushOutcome::Empty
        } else {
            let attempted = batch.len();
            match self.ship(batch.clone()).await {
                Ok(()) => {
                    debug!("Successfully flushed {attempted} records");
                    FlushOutcome::Sent(attempted)
                }
                Err(err) => {
                    warn!("Failed to send telemetry batch: {err}");
                    let dropped = {
                        let mut queue = self.lock_queue();
                        queue.restore_front(batch)
                    };
                    if dropped > 0 {
                        warn!("Dropped {dropped} telemetry records over the queue cap");
                    }
                    FlushOutcome::Requeued { attempted, dropped }
                }
            }
        };

        self.inner.in_flight.store(false, Ordering::SeqCst);

        if !self.lock_queue().is_empty() {
            self.schedule_flush(self.inner.config.retry_delay);
        }

        outcome
    }

    /// Best-effort final transmission of the entire remaining queue, fired on
    /// a detached task. No retry, no response handling; the request may not
    /// complete if the runtime shuts down first.
    pub fn final_flush(&self) {
        let remaining = {
            let mut queue = self.lock_queue();
            queue.drain_all()
        };
        if remaining.is_empty() {
            return;
        }
        debug!("Final flush of {} remaining records", remaining.len());

        let request = self
            .inner
            .http
            .post(&self.inner.config.endpoint)
            .json(&LogEnvelope { logs: remaining });
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let _ = request.send().await;
                });
            }
            Err(_) => warn!("No async runtime available, final telemetry flush skipped"),
        }
    }

    async fn ship(&self, batch: Vec<LogRecord>) -> Result<(), ShippingError> {
        let envelope = LogEnvelope { logs: batch };
        let strategy = &self.inner.config.retry_strategy;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let result = self
                .inner
                .http
                .post(&self.inner.config.endpoint)
                .json(&envelope)
                .send()
                .await;

            let last_error = match result {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                Ok(resp) => ShippingError::Status(resp.status()),
                Err(err) => ShippingError::Transport(err.to_string()),
            };

            if attempt >= strategy.attempts() {
                return Err(last_error);
            }
            debug!("Telemetry send attempt {attempt} failed, retrying: {last_error}");
            let delay = strategy.delay(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    fn schedule_flush(&self, delay: Duration) {
        // enqueue must work from sync code; without a runtime the records
        // simply wait for an explicit flush
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("No async runtime available, telemetry flush not scheduled");
            return;
        };
        let client = self.clone();
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            client.flush().await;
        });
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, RecordQueue> {
        #[allow(clippy::expect_used)]
        let guard = self.inner.queue.lock().expect("lock poisoned");
        guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_relay_core::record::{ConsoleArg, LogLevel};

    fn test_client(endpoint: &str) -> TelemetryClient {
        TelemetryClient::new(ClientConfig::new(endpoint)).expect("client should build")
    }

    #[test]
    fn test_enqueue_without_runtime_still_queues() {
        let client = test_client("http://127.0.0.1:9/api/telemetry");
        client.enqueue(LogRecord::now(LogLevel::Log, &[ConsoleArg::from("hello")]));
        client.enqueue(LogRecord::now(LogLevel::Warn, &[ConsoleArg::from("careful")]));
        assert_eq!(client.pending(), 2);
    }

    #[tokio::test]
    async fn test_flush_empty_queue_is_noop() {
        let client = test_client("http://127.0.0.1:9/api/telemetry");
        assert_eq!(client.flush().await, FlushOutcome::Empty);
    }

    #[tokio::test]
    async fn test_failed_flush_requeues_batch() {
        // port 9 (discard) is not listening; the send fails fast
        let client = test_client("http://127.0.0.1:9/api/telemetry");
        for n in 0..15 {
            client.enqueue(LogRecord::now(LogLevel::Log, &[ConsoleArg::from(n.to_string())]));
        }

        let outcome = client.flush().await;
        assert_eq!(
            outcome,
            FlushOutcome::Requeued {
                attempted: 10,
                dropped: 0
            }
        );
        assert_eq!(client.pending(), 15);
    }

    #[tokio::test]
    async fn test_final_flush_drains_queue() {
        let client = test_client("http://127.0.0.1:9/api/telemetry");
        client.enqueue(LogRecord::now(LogLevel::Error, &[ConsoleArg::from("bye")]));
        client.final_flush();
        assert_eq!(client.pending(), 0);
        // a second final flush with nothing queued is a no-op
        client.final_flush();
    }
}
