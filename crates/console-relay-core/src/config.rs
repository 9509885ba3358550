// Copyright 2025-Present the console-relay authors.
// SPDX-License-Identifier: Apache-2.0

use crate::error::RelayError;
use std::env;

/// Path the relay endpoint listens on and the client posts to.
pub const TELEMETRY_ENDPOINT_PATH: &str = "/api/telemetry";

const DEFAULT_RELAY_PORT: u16 = 8126;
const DEFAULT_MAX_CONTENT_LENGTH: usize = 5 * 1024 * 1024;

/// Selects how received records are rendered before re-emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable lines with emoji level icons and colorized JSON.
    Development,
    /// Single-line compact JSON objects.
    Production,
}

impl OutputMode {
    /// Only the literal `development` selects development output; any other
    /// value (or no value at all) is production.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some("development") => OutputMode::Development,
            _ => OutputMode::Production,
        }
    }
}

/// Configuration for the relay agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Address the agent binds to
    pub host: String,
    /// Agent port
    pub port: u16,
    /// Rendering mode for received records
    pub output_mode: OutputMode,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
    /// Maximum accepted request body size in bytes
    pub max_content_length: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_RELAY_PORT,
            output_mode: OutputMode::Production,
            log_level: "info".to_string(),
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
        }
    }
}

impl AgentConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, RelayError> {
        let port = env::var("RELAY_PORT")
            .ok()
            .and_then(|port| port.parse::<u16>().ok())
            .unwrap_or(DEFAULT_RELAY_PORT);
        let output_mode = OutputMode::from_env_value(env::var("RELAY_ENV").ok().as_deref());
        let log_level = env::var("RELAY_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|_| "info".to_string());
        let max_content_length = env::var("RELAY_MAX_CONTENT_LENGTH")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_CONTENT_LENGTH);

        let config = Self {
            port,
            output_mode,
            log_level,
            max_content_length,
            ..Default::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.port == 0 {
            return Err(RelayError::InvalidConfig(
                "Relay port must be greater than 0".to_string(),
            ));
        }

        if self.host.trim().is_empty() {
            return Err(RelayError::InvalidConfig(
                "Relay host cannot be empty".to_string(),
            ));
        }

        if self.max_content_length == 0 {
            return Err(RelayError::InvalidConfig(
                "RELAY_MAX_CONTENT_LENGTH must be greater than 0".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(RelayError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }
}
