// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read loop: pulls chunks from a [`ChunkSource`] into a [`StreamAccumulator`].
//!
//! One read is in flight at a time. The loop exits on the first parsed
//! document, on end of stream, or on a transport failure. The source is
//! owned by the loop and dropped on every exit path.

use std::time::Duration;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::accumulator::{StreamAccumulator, StreamOutcome, Step};
use crate::error::StreamError;
use crate::source::ChunkSource;

type StepObserver = Box<dyn FnMut(&Step) + Send>;

/// Configures and runs one accumulation pass over a chunk source.
pub struct StreamReader {
    read_timeout: Option<Duration>,
    cancel: CancellationToken,
    observer: Option<StepObserver>,
}

impl Default for StreamReader {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamReader {
    pub fn new() -> Self {
        Self { read_timeout: None, cancel: CancellationToken::new(), observer: None }
    }

    /// Fail with [`StreamError::Timeout`] when a single read takes longer than `timeout`.
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Abandon the stream when `cancel` fires.
    pub fn cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Observe every step. The observer cannot influence the loop.
    pub fn on_step(mut self, observer: impl FnMut(&Step) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Drive `source` to a terminal outcome.
    pub async fn run<S: ChunkSource>(mut self, mut source: S) -> Result<StreamOutcome, StreamError> {
        let mut acc = StreamAccumulator::new();
        let mut chunks = 0u64;

        let result = loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(StreamError::Cancelled),
                next = read_next(&mut source, self.read_timeout) => next,
            };

            let bytes = match next {
                Ok(Some(bytes)) => bytes,
                Ok(None) => {
                    info!(chunks, phase = %acc.phase(), "stream finished without a document");
                    break Ok(acc.finish());
                }
                Err(e) => {
                    warn!(chunks, code = e.as_str(), err = %e, "stream read failed");
                    break Err(e);
                }
            };

            chunks += 1;
            let step = acc.push(&bytes);
            match &step {
                Step::Pending { buffered } => {
                    debug!(chunk = chunks, len = bytes.len(), buffered, "chunk received, not yet complete");
                }
                Step::ParseDeferred { buffered, error } => {
                    debug!(chunk = chunks, buffered, err = %error, "waiting for more data");
                }
                Step::Complete { buffered } => {
                    info!(chunks, buffered, "parsed final document");
                }
                Step::Ignored => {}
            }
            if let Some(ref mut observer) = self.observer {
                observer(&step);
            }
            if matches!(step, Step::Complete { .. }) {
                break Ok(acc.finish());
            }
        };

        drop(source);
        result
    }
}

async fn read_next<S: ChunkSource>(
    source: &mut S,
    timeout: Option<Duration>,
) -> Result<Option<Bytes>, StreamError> {
    match timeout {
        Some(after) => tokio::time::timeout(after, source.read())
            .await
            .map_err(|_| StreamError::Timeout(after))?,
        None => source.read().await,
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
