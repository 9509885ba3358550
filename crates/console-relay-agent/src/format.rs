// Copyright 2025-Present the console-relay authors.
// SPDX-License-Identifier: Apache-2.0

//! Per-record rendering: human-readable lines with emoji level icons and
//! ANSI-colorized JSON in development, single-line compact JSON objects in
//! production.

use chrono::DateTime;
use console_relay_core::config::OutputMode;
use console_relay_core::envelope::RawRecord;
use regex::Regex;
use serde_json::{json, Value};

const BLUE: &str = "\x1b[34m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const MAGENTA: &str = "\x1b[35m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Emoji icon for a raw level string; unknown levels share the plain icon.
pub fn level_icon(level: &str) -> &'static str {
    match level {
        "error" => "\u{1f534}", // red circle
        "warn" => "\u{1f7e1}",  // yellow circle
        "debug" => "\u{1f535}", // blue circle
        _ => "\u{26aa}",        // white circle
    }
}

/// Renders an ISO-8601 timestamp as `dd/mm/yyyy hh:mm:ss`, falling back to
/// the raw string when it does not parse.
pub fn localize_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.format("%d/%m/%Y %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Stateless formatter holding the compiled colorizer patterns.
#[derive(Clone, Debug)]
pub struct RecordFormatter {
    key_re: Regex,
    string_re: Regex,
    number_re: Regex,
    bool_re: Regex,
    null_re: Regex,
}

impl Default for RecordFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordFormatter {
    pub fn new() -> Self {
        #[allow(clippy::expect_used)]
        let compile = |pattern: &str| Regex::new(pattern).expect("static pattern");
        RecordFormatter {
            key_re: compile(r#""([^"]+)":"#),
            string_re: compile(r#": "([^"]*)""#),
            number_re: compile(r": (\d+\.?\d*)"),
            bool_re: compile(r": (true|false)"),
            null_re: compile(r": null"),
        }
    }

    /// Formats one record for re-emission.
    pub fn format(&self, record: &RawRecord, mode: OutputMode) -> String {
        match mode {
            OutputMode::Production => {
                let args: Vec<String> = record
                    .args
                    .iter()
                    .map(|arg| self.format_arg(arg, mode))
                    .collect();
                json!({
                    "labels": {
                        "job": "frontend",
                        "level": record.level,
                    },
                    "timestamp": record.timestamp,
                    "message": record.args.join(" "),
                    "args": args,
                })
                .to_string()
            }
            OutputMode::Development => {
                let icon = level_icon(&record.level);
                let timestamp = localize_timestamp(&record.timestamp);
                let args: Vec<String> = record
                    .args
                    .iter()
                    .map(|arg| self.format_arg(arg, mode))
                    .collect();
                // pretty-printed JSON arguments push the message onto
                // indented continuation lines
                let message = if args.iter().any(|arg| arg.contains('\n')) {
                    args.join("\n  ")
                } else {
                    args.join(" ")
                };
                if message.contains('\n') {
                    format!("{icon} [FRONTEND] {timestamp}\n  {message}")
                } else {
                    format!("{icon} [FRONTEND] {timestamp} - {message}")
                }
            }
        }
    }

    /// Arguments that look like JSON (leading `{` or `[`) are parsed and
    /// re-rendered; anything that fails to parse stays raw.
    fn format_arg(&self, arg: &str, mode: OutputMode) -> String {
        if !(arg.starts_with('{') || arg.starts_with('[')) {
            return arg.to_string();
        }
        let parsed: Value = match serde_json::from_str(arg) {
            Ok(parsed) => parsed,
            Err(_) => return arg.to_string(),
        };
        match mode {
            OutputMode::Development => {
                let pretty = serde_json::to_string_pretty(&parsed).unwrap_or_else(|_| arg.to_string());
                format!("\n{}\n", self.colorize_json(&pretty))
            }
            OutputMode::Production => {
                serde_json::to_string(&parsed).unwrap_or_else(|_| arg.to_string())
            }
        }
    }

    /// ANSI-colorizes a JSON string: keys blue, string values green, numbers
    /// yellow, booleans magenta, null red.
    fn colorize_json(&self, json_string: &str) -> String {
        let step = self
            .key_re
            .replace_all(json_string, format!("{BLUE}\"$1\"{RESET}:"));
        let step = self
            .string_re
            .replace_all(&step, format!(": {GREEN}\"$1\"{RESET}"));
        let step = self
            .number_re
            .replace_all(&step, format!(": {YELLOW}$1{RESET}"));
        let step = self
            .bool_re
            .replace_all(&step, format!(": {MAGENTA}$1{RESET}"));
        self.null_re
            .replace_all(&step, format!(": {RED}null{RESET}"))
            .into_owned()
    }
}
