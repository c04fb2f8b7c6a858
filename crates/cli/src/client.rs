// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the simulation server's streaming `run-vivarium` endpoint.

use std::sync::Once;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::accumulator::StreamOutcome;
use crate::config::Config;
use crate::error::StreamError;
use crate::stream::StreamReader;
use crate::url::run_vivarium_url;

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
/// Safe to call multiple times; only the first call has effect.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Client for one simulation server.
pub struct SimulationClient {
    root: String,
    read_timeout: Option<Duration>,
    client: Client,
}

impl SimulationClient {
    pub fn new(
        root: impl Into<String>,
        connect_timeout: Duration,
        read_timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        ensure_crypto();
        let client = Client::builder().connect_timeout(connect_timeout).build()?;
        Ok(Self { root: root.into(), read_timeout, client })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(config.root.clone(), config.connect_timeout(), config.read_timeout())
    }

    /// A reader preconfigured with this client's read timeout.
    pub fn reader(&self) -> StreamReader {
        StreamReader::new().read_timeout(self.read_timeout)
    }

    /// Issue the request and return the response once headers arrive.
    ///
    /// A non-success status is a transport failure.
    pub async fn open_run(
        &self,
        duration: &str,
        vivarium_id: Option<&str>,
    ) -> Result<reqwest::Response, StreamError> {
        let url = run_vivarium_url(&self.root, duration, vivarium_id);
        debug!(%url, "requesting run");
        let resp = self.client.get(&url).send().await?;
        Ok(resp.error_for_status()?)
    }

    /// Run a vivarium and accumulate its streamed body with `reader`.
    pub async fn run_vivarium(
        &self,
        duration: &str,
        vivarium_id: Option<&str>,
        reader: StreamReader,
    ) -> Result<StreamOutcome, StreamError> {
        let resp = self.open_run(duration, vivarium_id).await?;
        reader.run(resp).await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
