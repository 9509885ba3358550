// Copyright 2025-Present the console-relay authors.
// SPDX-License-Identifier: Apache-2.0

/// Errors that can occur when configuring or running the relay
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to start relay agent: {0}")]
    AgentStart(String),

    #[error("Failed to build telemetry client: {0}")]
    ClientBuild(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = RelayError::InvalidConfig("port must be greater than 0".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid configuration: port must be greater than 0"
        );
    }

    #[test]
    fn test_error_debug() {
        let error = RelayError::AgentStart("address in use".to_string());
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("AgentStart"));
    }
}
