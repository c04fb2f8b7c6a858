// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: scripted chunk sources and a fake simulation server.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::Mutex;

use crate::error::StreamError;
use crate::source::{ChunkSource, ReadFuture};

/// One scripted transport event.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    Chunk(Bytes),
    Fail(String),
    /// Sleep before serving the next step.
    Stall(Duration),
}

/// Shared counters observing a [`ScriptedSource`] after it moves into the read loop.
#[derive(Debug, Clone, Default)]
pub struct SourceProbe {
    reads: Arc<AtomicUsize>,
    released: Arc<AtomicBool>,
}

impl SourceProbe {
    /// Number of `read()` calls made.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Whether the source has been dropped.
    pub fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

/// In-memory [`ChunkSource`] replaying a fixed script, then ending the stream.
pub struct ScriptedSource {
    steps: VecDeque<ScriptStep>,
    probe: SourceProbe,
}

impl ScriptedSource {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self { steps: steps.into(), probe: SourceProbe::default() }
    }

    /// Script that yields each item as one chunk.
    pub fn chunks<I, T>(chunks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        Self::new(
            chunks
                .into_iter()
                .map(|c| ScriptStep::Chunk(Bytes::copy_from_slice(c.as_ref())))
                .collect(),
        )
    }

    pub fn probe(&self) -> SourceProbe {
        self.probe.clone()
    }
}

impl ChunkSource for ScriptedSource {
    fn read(&mut self) -> ReadFuture<'_> {
        self.probe.reads.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            loop {
                match self.steps.pop_front() {
                    Some(ScriptStep::Chunk(bytes)) => return Ok(Some(bytes)),
                    Some(ScriptStep::Fail(msg)) => return Err(StreamError::Transport(msg)),
                    Some(ScriptStep::Stall(delay)) => tokio::time::sleep(delay).await,
                    None => return Ok(None),
                }
            }
        })
    }
}

impl Drop for ScriptedSource {
    fn drop(&mut self) {
        self.probe.released.store(true, Ordering::SeqCst);
    }
}

struct SimState {
    chunks: Vec<Bytes>,
    delay: Duration,
    status: StatusCode,
    queries: Mutex<Vec<String>>,
}

/// Builder for a fake `run-vivarium` endpoint streaming a fixed body.
pub struct SimServerBuilder {
    chunks: Vec<Bytes>,
    delay: Duration,
    status: StatusCode,
}

impl Default for SimServerBuilder {
    fn default() -> Self {
        Self { chunks: vec![], delay: Duration::from_millis(5), status: StatusCode::OK }
    }
}

impl SimServerBuilder {
    /// Body chunks, written in order with `delay` before each one.
    pub fn chunks<I, T>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.chunks = chunks.into_iter().map(|c| Bytes::copy_from_slice(c.as_ref())).collect();
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Respond with `status` and an empty body instead of streaming.
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Bind to a random local port and start serving.
    pub async fn spawn(self) -> anyhow::Result<SimServer> {
        let state = Arc::new(SimState {
            chunks: self.chunks,
            delay: self.delay,
            status: self.status,
            queries: Mutex::new(vec![]),
        });
        let router = Router::new()
            .route("/run-vivarium", get(run_vivarium))
            .with_state(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Ok(SimServer { addr, state, handle })
    }
}

/// A running fake simulation server, shut down on drop.
pub struct SimServer {
    addr: std::net::SocketAddr,
    state: Arc<SimState>,
    handle: tokio::task::JoinHandle<()>,
}

impl SimServer {
    pub fn builder() -> SimServerBuilder {
        SimServerBuilder::default()
    }

    /// Base address suitable for `--root`.
    pub fn root(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Raw query strings of every request received so far.
    pub async fn queries(&self) -> Vec<String> {
        self.state.queries.lock().await.clone()
    }
}

impl Drop for SimServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run_vivarium(State(sim): State<Arc<SimState>>, RawQuery(query): RawQuery) -> Response {
    sim.queries.lock().await.push(query.unwrap_or_default());
    if !sim.status.is_success() {
        return sim.status.into_response();
    }

    let delay = sim.delay;
    let body = futures_util::stream::iter(sim.chunks.clone()).then(move |chunk| async move {
        tokio::time::sleep(delay).await;
        Ok::<_, Infallible>(chunk)
    });
    ([(header::CONTENT_TYPE, "application/json")], Body::from_stream(body)).into_response()
}

/// Assert that an expression evaluates to `Err` whose Display output
/// contains the given substring.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        let result = $expr;
        let err = result.expect_err(concat!("expected Err for: ", stringify!($expr)));
        let msg = err.to_string();
        assert!(msg.contains($substr), "expected error containing {:?}, got: {msg:?}", $substr);
    }};
}
