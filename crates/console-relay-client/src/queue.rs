// Copyright 2025-Present the console-relay authors.
// SPDX-License-Identifier: Apache-2.0

use console_relay_core::record::LogRecord;
use std::collections::VecDeque;

/// Ordered FIFO buffer of pending records.
///
/// The cap is soft: fresh enqueues are never rejected, it is only enforced
/// when a failed batch is restored to the front of the queue.
#[derive(Debug)]
pub struct RecordQueue {
    records: VecDeque<LogRecord>,
    cap: usize,
}

impl RecordQueue {
    pub fn new(cap: usize) -> Self {
        RecordQueue {
            records: VecDeque::new(),
            cap,
        }
    }

    pub fn push(&mut self, record: LogRecord) {
        self.records.push_back(record);
    }

    /// Removes and returns up to `max` oldest records, preserving order.
    pub fn take_batch(&mut self, max: usize) -> Vec<LogRecord> {
        let count = max.min(self.records.len());
        self.records.drain(..count).collect()
    }

    /// Reinserts a failed batch at the front, preserving its order, then
    /// clamps the queue to the cap by dropping from the back. Returns the
    /// number of records dropped.
    pub fn restore_front(&mut self, batch: Vec<LogRecord>) -> usize {
        for record in batch.into_iter().rev() {
            self.records.push_front(record);
        }
        let dropped = self.records.len().saturating_sub(self.cap);
        self.records.truncate(self.cap);
        dropped
    }

    pub fn drain_all(&mut self) -> Vec<LogRecord> {
        self.records.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
