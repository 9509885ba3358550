// Copyright 2025-Present the console-relay authors.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use console_relay_agent::agent::LogRelayAgent;
use console_relay_agent::processor::RelayLogProcessor;
use console_relay_core::config::AgentConfig;
use console_relay_core::envelope::TelemetryResponse;
use serde_json::json;
use tokio_util::sync::CancellationToken;

struct RunningAgent {
    url: String,
    shutdown: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

async fn start_agent() -> RunningAgent {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("failed to get local addr");

    let shutdown = CancellationToken::new();
    let agent = LogRelayAgent {
        config: Arc::new(AgentConfig::default()),
        processor: Arc::new(RelayLogProcessor::new()),
        shutdown: shutdown.clone(),
    };
    let handle = tokio::spawn(async move {
        agent.serve(listener).await.expect("agent failed");
    });

    RunningAgent {
        url: format!("http://{addr}"),
        shutdown,
        handle,
    }
}

#[tokio::test]
async fn well_formed_batch_reports_processed_count() {
    let agent = start_agent().await;
    let client = reqwest::Client::new();

    let body = json!({
        "logs": [
            {"timestamp": "2026-08-27T10:00:00Z", "level": "log", "args": ["a"]},
            {"timestamp": "2026-08-27T10:00:01Z", "level": "warn", "args": ["b"]},
            {"timestamp": "2026-08-27T10:00:02Z", "level": "error", "args": ["c"]},
        ]
    });
    let response = client
        .post(format!("{}/api/telemetry", agent.url))
        .json(&body)
        .send()
        .await
        .expect("request failed");

    assert_eq!(response.status(), 200);
    let parsed: TelemetryResponse = response.json().await.expect("invalid response body");
    assert_eq!(parsed.status, "ok");
    assert_eq!(parsed.processed, 3);

    agent.shutdown.cancel();
    agent.handle.await.expect("agent task panicked");
}

#[tokio::test]
async fn single_object_logs_value_counts_as_one() {
    let agent = start_agent().await;
    let client = reqwest::Client::new();

    let body = json!({
        "logs": {"timestamp": "2026-08-27T10:00:00Z", "level": "debug", "args": ["solo"]}
    });
    let response = client
        .post(format!("{}/api/telemetry", agent.url))
        .json(&body)
        .send()
        .await
        .expect("request failed");

    let parsed: TelemetryResponse = response.json().await.expect("invalid response body");
    assert_eq!(parsed.processed, 1);

    agent.shutdown.cancel();
    agent.handle.await.expect("agent task panicked");
}

#[tokio::test]
async fn malformed_records_still_processed() {
    let agent = start_agent().await;
    let client = reqwest::Client::new();

    let body = json!({
        "logs": [
            {"timestamp": 42, "level": 7, "args": "not-an-array"},
            "just a string",
        ]
    });
    let response = client
        .post(format!("{}/api/telemetry", agent.url))
        .json(&body)
        .send()
        .await
        .expect("request failed");

    assert_eq!(response.status(), 200);
    let parsed: TelemetryResponse = response.json().await.expect("invalid response body");
    assert_eq!(parsed.processed, 2);

    agent.shutdown.cancel();
    agent.handle.await.expect("agent task panicked");
}

#[tokio::test]
async fn invalid_json_body_is_rejected() {
    let agent = start_agent().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/telemetry", agent.url))
        .header("Content-Type", "application/json")
        .body("this is not json")
        .send()
        .await
        .expect("request failed");

    assert_eq!(response.status(), 400);

    agent.shutdown.cancel();
    agent.handle.await.expect("agent task panicked");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let agent = start_agent().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/other", agent.url))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 404);

    agent.shutdown.cancel();
    agent.handle.await.expect("agent task panicked");
}

#[tokio::test]
async fn info_endpoint_lists_telemetry_route() {
    let agent = start_agent().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/info", agent.url))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("invalid response body");
    assert_eq!(body["endpoints"][0], "/api/telemetry");

    agent.shutdown.cancel();
    agent.handle.await.expect("agent task panicked");
}
