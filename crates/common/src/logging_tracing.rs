// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! # Tracing configuration setup.
//!
//! The schema builder is instrumented with Rust's `tracing` framework. It reports the progress of
//! each build pass at `debug` level and the warnings it records (for example, a synthetic field
//! that had to be omitted) at `warn` level.
//!
//! Calling the `init` function will initialize a global tracing subscriber based on the value of
//! the `SCHEMA_LOG` environment variable, which follows the same conventions as `RUST_LOG`:
//!
//! ```shell
//! $ SCHEMA_LOG=schema_builder=debug my-schema-tool
//! ```

use thiserror::Error;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, prelude::*};

pub const SCHEMA_LOG: &str = "SCHEMA_LOG";

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Unable to install the tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Initialize the tracing subscriber.
///
/// Installs a compact `tracing_subscriber::fmt` layer filtered by `SCHEMA_LOG` (defaulting to
/// `WARN`). Fails if a global subscriber has already been installed.
pub fn init() -> Result<(), LoggingError> {
    let fmt_layer = tracing_subscriber::fmt::layer().compact();

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(SCHEMA_LOG)
        .from_env_lossy()
}
