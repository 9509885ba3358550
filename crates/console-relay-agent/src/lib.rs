// Copyright 2025-Present the console-relay authors.
// SPDX-License-Identifier: Apache-2.0

//! Server side of the console log relay: a small hyper HTTP server exposing
//! `POST /api/telemetry`. Received batches are reformatted per record (human
//! readable in development, compact JSON in production) and re-emitted via
//! the per-level tracing channels.

pub mod agent;
pub mod format;
pub mod http_utils;
pub mod processor;
