// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use clap::Parser;

use crate::url::run_vivarium_url;

/// Default simulation server address.
pub const DEFAULT_ROOT: &str = "http://127.0.0.1:3001";

/// Vivarium identifier used when none is given for the run.
pub const DEFAULT_TEST_ID: &str = "vivarium-8463a3ef-5632-4e92-b04a-076b62deb3f3-395354397";

/// Stream a vivarium run and print the parsed result.
#[derive(Debug, Parser)]
#[command(name = "vivstream", version, about)]
pub struct Config {
    /// Base address of the simulation server.
    #[arg(long, env = "VIVSTREAM_ROOT", default_value = DEFAULT_ROOT)]
    pub root: String,

    /// Default vivarium identifier.
    #[arg(long, env = "VIVSTREAM_TEST_ID", default_value = DEFAULT_TEST_ID)]
    pub test_id: String,

    /// Vivarium to run (falls back to --test-id).
    #[arg(long, env = "VIVSTREAM_VIVARIUM_ID")]
    pub vivarium_id: Option<String>,

    /// Omit the vivarium identifier so the server creates a new one.
    #[arg(long, conflicts_with = "vivarium_id")]
    pub new: bool,

    /// Simulated duration, passed to the server as given.
    #[arg(long, env = "VIVSTREAM_DURATION", default_value = "10")]
    pub duration: String,

    /// Per-read timeout in ms (0 = wait indefinitely).
    #[arg(long, env = "VIVSTREAM_READ_TIMEOUT_MS", default_value_t = 0)]
    pub read_timeout_ms: u64,

    /// HTTP connect timeout in ms.
    #[arg(long, env = "VIVSTREAM_CONNECT_TIMEOUT_MS", default_value_t = 10_000)]
    pub connect_timeout_ms: u64,

    /// Log format (json or text).
    #[arg(long, env = "VIVSTREAM_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "VIVSTREAM_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.root.is_empty() {
            anyhow::bail!("--root must not be empty");
        }
        match self.log_format.as_str() {
            "json" | "text" => {}
            other => anyhow::bail!("invalid log format: {other} (expected json or text)"),
        }
        Ok(())
    }

    /// Identifier sent with the request, if any.
    pub fn vivarium_id(&self) -> Option<&str> {
        if self.new {
            return None;
        }
        Some(self.vivarium_id.as_deref().unwrap_or(&self.test_id))
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        match self.read_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Full request target for this run.
    pub fn run_url(&self) -> String {
        run_vivarium_url(&self.root, &self.duration, self.vivarium_id())
    }

    /// Build a config for tests without going through the command line.
    pub fn test(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            test_id: DEFAULT_TEST_ID.to_owned(),
            vivarium_id: None,
            new: false,
            duration: "10".to_owned(),
            read_timeout_ms: 0,
            connect_timeout_ms: 2_000,
            log_format: "text".to_owned(),
            log_level: "warn".to_owned(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
