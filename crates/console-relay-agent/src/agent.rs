// Copyright 2025-Present the console-relay authors.
// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::body::{Bytes, Incoming};
use hyper::service::service_fn;
use hyper::{http, Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use console_relay_core::config::{AgentConfig, TELEMETRY_ENDPOINT_PATH};
use console_relay_core::error::RelayError;

use crate::http_utils::{log_and_create_http_response, HttpResponse};
use crate::processor::LogProcessor;

const INFO_ENDPOINT_PATH: &str = "/info";

/// The relay HTTP server. Routes `POST /api/telemetry` to the processor and
/// shuts down cooperatively when the cancellation token fires.
pub struct LogRelayAgent {
    pub config: Arc<AgentConfig>,
    pub processor: Arc<dyn LogProcessor + Send + Sync>,
    pub shutdown: CancellationToken,
}

impl LogRelayAgent {
    /// Binds the listener and serves until cancelled.
    pub async fn start(&self) -> Result<(), RelayError> {
        let addr = format!("{}:{}", self.config.host, self.config.port)
            .parse::<SocketAddr>()
            .map_err(|e| RelayError::AgentStart(e.to_string()))?;
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| RelayError::AgentStart(e.to_string()))?;

        self.serve(listener).await
    }

    /// Serves on an already bound listener. Split from [`start`] so tests can
    /// bind an ephemeral port first.
    ///
    /// [`start`]: LogRelayAgent::start
    pub async fn serve(&self, listener: tokio::net::TcpListener) -> Result<(), RelayError> {
        let processor = self.processor.clone();
        let endpoint_config = self.config.clone();

        let service = service_fn(move |req| {
            // called for each http request
            let processor = processor.clone();
            let endpoint_config = endpoint_config.clone();
            Self::endpoint_handler(endpoint_config, req, processor)
        });

        debug!(
            "Log relay agent started: listening on port {}",
            self.config.port
        );
        self.serve_tcp(listener, service).await
    }

    async fn endpoint_handler(
        config: Arc<AgentConfig>,
        req: Request<Incoming>,
        processor: Arc<dyn LogProcessor + Send + Sync>,
    ) -> http::Result<HttpResponse> {
        match (req.method(), req.uri().path()) {
            (&Method::POST, TELEMETRY_ENDPOINT_PATH) => processor.process_logs(config, req).await,
            (_, INFO_ENDPOINT_PATH) => Self::info_handler(),
            _ => log_and_create_http_response("Unsupported endpoint", StatusCode::NOT_FOUND),
        }
    }

    fn info_handler() -> http::Result<HttpResponse> {
        let response_json = json!({
            "endpoints": [TELEMETRY_ENDPOINT_PATH],
        })
        .to_string();

        Response::builder()
            .status(StatusCode::OK)
            .body(http_body_util::Full::new(Bytes::from(response_json)))
    }

    async fn serve_tcp<S>(
        &self,
        listener: tokio::net::TcpListener,
        service: S,
    ) -> Result<(), RelayError>
    where
        S: hyper::service::Service<Request<Incoming>, Response = HttpResponse>
            + Clone
            + Send
            + 'static,
        S::Future: Send,
        S::Error: std::error::Error + Send + Sync + 'static,
    {
        let server = hyper::server::conn::http1::Builder::new();
        let mut joinset = tokio::task::JoinSet::new();

        loop {
            let conn = tokio::select! {
                con_res = listener.accept() => match con_res {
                    Err(e)
                        if matches!(
                            e.kind(),
                            io::ErrorKind::ConnectionAborted
                                | io::ErrorKind::ConnectionReset
                                | io::ErrorKind::ConnectionRefused
                        ) =>
                    {
                        continue;
                    }
                    Err(e) => {
                        error!("Server error: {e}");
                        return Err(RelayError::Runtime(e.to_string()));
                    }
                    Ok((conn, _)) => conn,
                },
                finished = async {
                    match joinset.join_next().await {
                        Some(finished) => finished,
                        None => std::future::pending().await,
                    }
                } => match finished {
                    Err(e) if e.is_panic() => {
                        // Don't kill server on panic - log and continue
                        error!("Connection handler panicked: {:?}", e);
                        continue;
                    },
                    Ok(()) | Err(_) => continue,
                },
                _ = self.shutdown.cancelled() => {
                    debug!("Log relay agent shutting down");
                    break;
                },
            };

            let conn = TokioIo::new(conn);
            let service = service.clone();
            let server = server.clone();
            joinset.spawn(async move {
                if let Err(e) = server.serve_connection(conn, service).await {
                    error!("Connection error: {e}");
                }
            });
        }

        // let in-flight connections finish before reporting shutdown complete
        while joinset.join_next().await.is_some() {}
        Ok(())
    }
}
