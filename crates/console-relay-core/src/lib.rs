// Copyright 2025-Present the console-relay authors.
// SPDX-License-Identifier: Apache-2.0

//! Shared data model, wire envelope, configuration, and errors for the
//! console log relay.

pub mod config;
pub mod envelope;
pub mod error;
pub mod record;
