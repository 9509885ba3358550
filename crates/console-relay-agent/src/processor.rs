// Copyright 2025-Present the console-relay authors.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use http_body_util::BodyExt;
use hyper::body::{Bytes, Incoming};
use hyper::{http, Request, Response, StatusCode};
use tracing::{debug, error, info, warn};

use console_relay_core::config::AgentConfig;
use console_relay_core::envelope::{RawEnvelope, RawRecord, TelemetryResponse};
use console_relay_core::record::LogLevel;

use crate::format::RecordFormatter;
use crate::http_utils::{
    log_and_create_http_response, verify_request_content_length, HttpResponse,
};

#[async_trait]
pub trait LogProcessor {
    /// Deserializes a telemetry envelope from a hyper request body, re-emits
    /// every record, and builds the endpoint response.
    async fn process_logs(
        &self,
        config: Arc<AgentConfig>,
        req: Request<Incoming>,
    ) -> http::Result<HttpResponse>;
}

#[derive(Clone, Default)]
pub struct RelayLogProcessor {
    formatter: RecordFormatter,
}

impl RelayLogProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Formats a whole batch without emitting, each record independently.
    pub fn format_batch(&self, envelope: &RawEnvelope, config: &AgentConfig) -> Vec<String> {
        envelope
            .logs
            .iter()
            .map(|record| self.formatter.format(record, config.output_mode))
            .collect()
    }
}

/// One tracing event per record, on the channel matching its level.
fn emit(record: &RawRecord, line: &str) {
    match LogLevel::from_wire(&record.level) {
        LogLevel::Debug => debug!("{line}"),
        LogLevel::Error => error!("{line}"),
        LogLevel::Warn => warn!("{line}"),
        LogLevel::Log => info!("{line}"),
    }
}

#[async_trait]
impl LogProcessor for RelayLogProcessor {
    async fn process_logs(
        &self,
        config: Arc<AgentConfig>,
        req: Request<Incoming>,
    ) -> http::Result<HttpResponse> {
        debug!("Received telemetry logs to process");
        let (parts, body) = req.into_parts();

        if let Some(response) = verify_request_content_length(
            &parts.headers,
            config.max_content_length,
            "Error processing telemetry logs",
        ) {
            return response;
        }

        let body_bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) => {
                return log_and_create_http_response(
                    &format!("Error reading telemetry request body: {err}"),
                    StatusCode::INTERNAL_SERVER_ERROR,
                );
            }
        };

        // double check the size in case transfer encoding was used
        if body_bytes.len() > config.max_content_length {
            return log_and_create_http_response(
                "Error processing telemetry logs: Payload too large",
                StatusCode::PAYLOAD_TOO_LARGE,
            );
        }

        let envelope = match RawEnvelope::from_slice(&body_bytes) {
            Ok(envelope) => envelope,
            Err(err) => {
                return log_and_create_http_response(
                    &format!("Error deserializing telemetry envelope: {err}"),
                    StatusCode::BAD_REQUEST,
                );
            }
        };

        // each record is processed independently; a malformed one was
        // already coerced field by field and still counts as processed
        for record in &envelope.logs {
            let line = self.formatter.format(record, config.output_mode);
            emit(record, &line);
        }

        let response = TelemetryResponse::ok(envelope.logs.len());
        let body = serde_json::to_string(&response)
            .unwrap_or_else(|_| format!("{{\"status\":\"ok\",\"processed\":{}}}", response.processed));
        Response::builder()
            .status(StatusCode::OK)
            .body(http_body_util::Full::new(Bytes::from(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_relay_core::config::OutputMode;
    use serde_json::json;
    use tracing_test::traced_test;

    fn dev_config() -> AgentConfig {
        AgentConfig {
            output_mode: OutputMode::Development,
            ..Default::default()
        }
    }

    #[test]
    fn test_format_batch_produces_one_line_per_record() {
        let processor = RelayLogProcessor::new();
        let envelope = RawEnvelope::from_value(json!({
            "logs": [
                {"timestamp": "2026-08-27T10:00:00Z", "level": "log", "args": ["one"]},
                {"timestamp": "2026-08-27T10:00:01Z", "level": "error", "args": ["two"]},
                {"timestamp": "2026-08-27T10:00:02Z", "level": "debug", "args": ["three"]},
            ]
        }));

        let lines = processor.format_batch(&envelope, &dev_config());
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("one"));
        assert!(lines[1].starts_with("🔴"));
        assert!(lines[2].starts_with("🔵"));
    }

    #[traced_test]
    #[test]
    fn test_emit_uses_per_level_channels() {
        let record = RawRecord {
            timestamp: String::new(),
            level: "warn".to_string(),
            args: vec!["watch out".to_string()],
        };
        emit(&record, "🟡 watch out");
        assert!(logs_contain("watch out"));

        let unknown = RawRecord {
            timestamp: String::new(),
            level: "whatever".to_string(),
            args: vec![],
        };
        // unknown levels land on the plain log channel
        emit(&unknown, "plain channel line");
        assert!(logs_contain("plain channel line"));
    }
}
