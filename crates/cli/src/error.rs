// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;
use std::time::Duration;

/// Fatal failures of the read loop.
///
/// All variants are transport failures and are distinct from a stream that
/// ends cleanly without a document, which is reported as
/// [`StreamOutcome::NoDocument`](crate::accumulator::StreamOutcome::NoDocument).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The underlying read failed (connection reset, body error, bad status).
    Transport(String),
    /// No chunk or end-of-stream arrived within the configured read timeout.
    Timeout(Duration),
    /// The caller abandoned the stream.
    Cancelled,
}

impl StreamError {
    pub fn transport(err: impl fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport(_) => "TRANSPORT",
            Self::Timeout(_) => "TIMEOUT",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "transport failure: {msg}"),
            Self::Timeout(after) => write!(f, "no data received within {after:?}"),
            Self::Cancelled => f.write_str("stream cancelled"),
        }
    }
}

impl std::error::Error for StreamError {}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
