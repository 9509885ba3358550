// Copyright 2025-Present the console-relay authors.
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use console_relay_agent::{agent::LogRelayAgent, processor::RelayLogProcessor};
use console_relay_core::config::AgentConfig;

#[tokio::main]
pub async fn main() {
    let config = match AgentConfig::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Error creating config on console relay startup: {e}");
            return;
        }
    };

    let env_filter = format!("h2=off,hyper=off,{}", config.log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let shutdown = CancellationToken::new();
    let agent = LogRelayAgent {
        config: Arc::clone(&config),
        processor: Arc::new(RelayLogProcessor::new()),
        shutdown: shutdown.clone(),
    };

    info!(
        "console-relay: starting to listen on port {} ({:?} output)",
        config.port, config.output_mode
    );

    let agent_handle = tokio::spawn(async move {
        if let Err(e) = agent.start().await {
            error!("Error when starting the console relay agent: {e}");
        }
    });

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, stopping"),
        Err(e) => error!("Failed to listen for shutdown signal: {e}"),
    }

    shutdown.cancel();
    let _ = agent_handle.await;
}
