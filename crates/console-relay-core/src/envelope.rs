// Copyright 2025-Present the console-relay authors.
// SPDX-License-Identifier: Apache-2.0

//! Wire format between the telemetry client and the relay endpoint.
//!
//! The client side is strictly typed; the receiving side parses defensively
//! so that one malformed record never fails a whole batch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::LogRecord;

/// Outbound request body: `{ "logs": [...] }`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogEnvelope {
    pub logs: Vec<LogRecord>,
}

/// Endpoint response body: `{ "status": "ok", "processed": <count> }`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TelemetryResponse {
    pub status: String,
    pub processed: usize,
}

impl TelemetryResponse {
    pub fn ok(processed: usize) -> Self {
        TelemetryResponse {
            status: "ok".to_string(),
            processed,
        }
    }
}

/// Inbound envelope, parsed leniently. A non-array `logs` value is coerced
/// into a single-element batch; a missing or null `logs` key is empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawEnvelope {
    pub logs: Vec<RawRecord>,
}

impl RawEnvelope {
    /// Parses a request body. Only a body that is not valid JSON at all is
    /// an error; individual records degrade field by field.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(bytes)?;
        Ok(Self::from_value(value))
    }

    pub fn from_value(value: Value) -> Self {
        let logs = match value.get("logs") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(other) => vec![other.clone()],
        };
        RawEnvelope {
            logs: logs.into_iter().map(RawRecord::from_value).collect(),
        }
    }
}

/// One inbound record with every field coerced best-effort.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawRecord {
    /// Raw timestamp string; empty when absent or unparseable.
    pub timestamp: String,
    /// Raw level string; defaults to `"log"`.
    pub level: String,
    pub args: Vec<String>,
}

impl RawRecord {
    pub fn from_value(value: Value) -> Self {
        let map = match value {
            Value::Object(map) => map,
            // a record that is not even an object keeps its raw rendering
            other => {
                return RawRecord {
                    timestamp: String::new(),
                    level: "log".to_string(),
                    args: vec![coerce_arg(&other)],
                }
            }
        };

        let timestamp = match map.get("timestamp") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let level = match map.get("level") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => "log".to_string(),
            Some(other) => other.to_string(),
        };
        let args = match map.get("args") {
            Some(Value::Array(items)) => items.iter().map(coerce_arg).collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![coerce_arg(other)],
        };

        RawRecord {
            timestamp,
            level,
            args,
        }
    }
}

/// Strings pass through as-is, anything else renders as compact JSON.
fn coerce_arg(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
