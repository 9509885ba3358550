// Copyright 2025-Present the console-relay authors.
// SPDX-License-Identifier: Apache-2.0

use chrono::{SecondsFormat, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rendering of an argument whose serialization failed. Never propagated as
/// an error: telemetry must stay strictly additive to the original output.
pub const NON_SERIALIZABLE_PLACEHOLDER: &str = "[Non-serializable object]";

/// Severity of a forwarded console record, serialized lowercase on the wire.
///
/// Client-side interception only ever produces `Log`, `Warn` and `Error`;
/// `Debug` exists because the receiving side of the wire format accepts it.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[display("log")]
    Log,
    #[display("warn")]
    Warn,
    #[display("error")]
    Error,
    #[display("debug")]
    Debug,
}

impl LogLevel {
    /// Maps a raw wire-side level string onto an output channel. Unknown
    /// levels fall back to the plain `log` channel.
    pub fn from_wire(level: &str) -> Self {
        match level {
            "error" => LogLevel::Error,
            "warn" => LogLevel::Warn,
            "debug" => LogLevel::Debug,
            _ => LogLevel::Log,
        }
    }
}

/// Maps a logging-facade level (winston-style) onto the three client-side
/// levels. Lossy by design: there is no fourth level on the client.
pub fn map_facade_level(level: &str) -> LogLevel {
    match level.to_lowercase().as_str() {
        "error" => LogLevel::Error,
        "warn" | "warning" => LogLevel::Warn,
        // info, debug, verbose, silly, and anything unknown
        _ => LogLevel::Log,
    }
}

/// A single intercepted console call, immutable after creation. Consumed when
/// successfully sent, or dropped once the re-queue cap is exceeded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// ISO-8601 creation time.
    pub timestamp: String,
    pub level: LogLevel,
    /// Arguments of the intercepted call, already rendered to strings.
    pub args: Vec<String>,
}

impl LogRecord {
    /// Creates a record timestamped now, rendering each argument.
    pub fn now(level: LogLevel, args: &[ConsoleArg]) -> Self {
        LogRecord {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            args: args.iter().map(ConsoleArg::render).collect(),
        }
    }
}

/// One heterogeneous argument of an intercepted console call.
#[derive(Clone, Debug)]
pub enum ConsoleArg {
    /// Plain text, rendered verbatim.
    Text(String),
    /// A structured value, rendered as pretty JSON when it is an object or an
    /// array, via generic string conversion otherwise.
    Value(Value),
    /// An error value, rendered as `"Error: <message>"` followed by its
    /// cause chain.
    Failure {
        message: String,
        chain: Vec<String>,
    },
}

impl ConsoleArg {
    /// Captures any serializable value. A serialization failure yields the
    /// placeholder text instead of an error.
    pub fn from_serialize<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => ConsoleArg::Value(value),
            Err(_) => ConsoleArg::Text(NON_SERIALIZABLE_PLACEHOLDER.to_string()),
        }
    }

    /// Captures an error together with its source chain.
    pub fn from_error(err: &dyn std::error::Error) -> Self {
        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        ConsoleArg::Failure {
            message: err.to_string(),
            chain,
        }
    }

    pub fn render(&self) -> String {
        match self {
            ConsoleArg::Text(text) => text.clone(),
            ConsoleArg::Failure { message, chain } => {
                format!("Error: {}\n{}", message, chain.join("\n"))
            }
            ConsoleArg::Value(value) => match value {
                // JSON strings render without surrounding quotes
                Value::String(text) => text.clone(),
                Value::Object(_) | Value::Array(_) => serde_json::to_string_pretty(value)
                    .unwrap_or_else(|_| NON_SERIALIZABLE_PLACEHOLDER.to_string()),
                other => other.to_string(),
            },
        }
    }
}

impl From<&str> for ConsoleArg {
    fn from(text: &str) -> Self {
        ConsoleArg::Text(text.to_string())
    }
}

impl From<String> for ConsoleArg {
    fn from(text: String) -> Self {
        ConsoleArg::Text(text)
    }
}

impl From<Value> for ConsoleArg {
    fn from(value: Value) -> Self {
        ConsoleArg::Value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_level_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&LogLevel::Warn).expect("serialize level"),
            "\"warn\""
        );
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn test_facade_mapping() {
        for level in ["info", "debug", "verbose", "silly", "unknown-level"] {
            assert_eq!(map_facade_level(level), LogLevel::Log, "level '{level}'");
        }
        assert_eq!(map_facade_level("warn"), LogLevel::Warn);
        assert_eq!(map_facade_level("warning"), LogLevel::Warn);
        assert_eq!(map_facade_level("WARNING"), LogLevel::Warn);
        assert_eq!(map_facade_level("error"), LogLevel::Error);
    }

    #[test]
    fn test_wire_level_fallback() {
        assert_eq!(LogLevel::from_wire("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_wire("fatal"), LogLevel::Log);
        assert_eq!(LogLevel::from_wire(""), LogLevel::Log);
    }

    #[test]
    fn test_error_arg_contains_message() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let rendered = ConsoleArg::from_error(&err).render();
        assert!(rendered.contains("Error:"));
        assert!(rendered.contains("disk on fire"));
    }

    #[test]
    fn test_error_arg_renders_cause_chain() {
        #[derive(Debug, thiserror::Error)]
        #[error("outer failed")]
        struct Outer(#[source] std::io::Error);

        let err = Outer(std::io::Error::new(std::io::ErrorKind::Other, "inner"));
        let rendered = ConsoleArg::from_error(&err).render();
        assert!(rendered.starts_with("Error: outer failed\n"));
        assert!(rendered.contains("caused by: inner"));
    }

    #[test]
    fn test_object_arg_renders_pretty() {
        let rendered = ConsoleArg::from(json!({"a": 1})).render();
        assert_eq!(rendered, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_string_arg_renders_without_quotes() {
        assert_eq!(ConsoleArg::from(json!("hello")).render(), "hello");
        assert_eq!(ConsoleArg::from("plain").render(), "plain");
    }

    #[test]
    fn test_scalar_args_render_generically() {
        assert_eq!(ConsoleArg::from(json!(42)).render(), "42");
        assert_eq!(ConsoleArg::from(json!(true)).render(), "true");
        assert_eq!(ConsoleArg::from(json!(null)).render(), "null");
    }

    #[test]
    fn test_record_now_renders_args() {
        let record = LogRecord::now(
            LogLevel::Warn,
            &[ConsoleArg::from("slow request"), ConsoleArg::from(json!(17))],
        );
        assert_eq!(record.level, LogLevel::Warn);
        assert_eq!(record.args, vec!["slow request".to_string(), "17".to_string()]);
        // RFC 3339 with millisecond precision
        assert!(record.timestamp.ends_with('Z'));
        assert!(record.timestamp.contains('T'));
    }
}
