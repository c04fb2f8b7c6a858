// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::StreamError;

/// Future returned by [`ChunkSource::read`].
pub type ReadFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<Bytes>, StreamError>> + Send + 'a>>;

/// Transport capability: yields raw body chunks until end of stream.
///
/// `Ok(None)` signals the stream finished. Dropping the source releases
/// the underlying reader.
pub trait ChunkSource: Send {
    fn read(&mut self) -> ReadFuture<'_>;
}

impl ChunkSource for reqwest::Response {
    fn read(&mut self) -> ReadFuture<'_> {
        Box::pin(async move { Ok(self.chunk().await?) })
    }
}

/// Chunks forwarded over a channel by some other task.
///
/// The stream ends when every sender is dropped.
pub struct ChannelSource {
    rx: mpsc::Receiver<Result<Bytes, StreamError>>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<Result<Bytes, StreamError>>) -> Self {
        Self { rx }
    }
}

impl ChunkSource for ChannelSource {
    fn read(&mut self) -> ReadFuture<'_> {
        Box::pin(async move { self.rx.recv().await.transpose() })
    }
}
