// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Accumulates a chunked `run-vivarium` response body into a JSON document.
//!
//! The server wraps its update array in a `{"updates": [` envelope. On the
//! first chunk that envelope opener is rewritten to a bare `[` so a parse can
//! be attempted early. After every chunk, if the buffered text ends with `]}`
//! a full parse is attempted; the JSON parser decides whether the document
//! is really complete. The suffix is checked literally, so the envelope's
//! closing brace must still be present even though its opener was stripped.

use serde_json::Value;
use tracing::debug;

use crate::decode::Utf8Decoder;

/// Envelope opener rewritten once on the first chunk.
pub const ENVELOPE_PREFIX: &str = "{\"updates\": [";

/// Replacement for [`ENVELOPE_PREFIX`].
pub const ENVELOPE_REPLACEMENT: &str = "[";

/// Suffix that triggers a parse attempt.
pub const COMPLETION_SUFFIX: &str = "]}";

/// Lifecycle of one accumulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No text decoded yet; the envelope rewrite is still armed.
    AwaitingFirstChunk,
    /// Rewrite consumed; appending chunks and probing for completion.
    Accumulating,
    /// A document parsed successfully.
    Done,
    /// The stream ended before a document parsed.
    Failed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingFirstChunk => "awaiting_first_chunk",
            Self::Accumulating => "accumulating",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of feeding one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Chunk appended; the buffer does not end with the completion suffix.
    Pending { buffered: usize },
    /// The suffix matched but the buffer is not valid JSON yet.
    ParseDeferred { buffered: usize, error: String },
    /// The buffer parsed; retrieve it with [`StreamAccumulator::finish`].
    Complete { buffered: usize },
    /// The accumulator already reached a terminal phase; chunk dropped.
    Ignored,
}

/// Terminal result of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamOutcome {
    Document(Value),
    NoDocument,
}

impl StreamOutcome {
    pub fn document(&self) -> Option<&Value> {
        match self {
            Self::Document(v) => Some(v),
            Self::NoDocument => None,
        }
    }

    pub fn into_document(self) -> Option<Value> {
        match self {
            Self::Document(v) => Some(v),
            Self::NoDocument => None,
        }
    }
}

/// Append-only text buffer fed by raw byte chunks.
#[derive(Debug)]
pub struct StreamAccumulator {
    decoder: Utf8Decoder,
    text: String,
    phase: Phase,
    rewrites: u32,
    document: Option<Value>,
}

impl Default for StreamAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self {
            decoder: Utf8Decoder::new(),
            text: String::new(),
            phase: Phase::AwaitingFirstChunk,
            rewrites: 0,
            document: None,
        }
    }

    /// Decode and append `chunk`, then probe for a complete document.
    pub fn push(&mut self, chunk: &[u8]) -> Step {
        if self.phase.is_terminal() {
            return Step::Ignored;
        }

        let decoded = self.decoder.decode(chunk);
        self.text.push_str(&decoded);

        if self.phase == Phase::AwaitingFirstChunk && !decoded.is_empty() {
            self.rewrite_envelope();
            self.phase = Phase::Accumulating;
        }

        let buffered = self.text.len();
        if !self.text.ends_with(COMPLETION_SUFFIX) {
            return Step::Pending { buffered };
        }

        match serde_json::from_str::<Value>(&self.text) {
            Ok(value) => {
                self.document = Some(value);
                self.phase = Phase::Done;
                Step::Complete { buffered }
            }
            Err(e) => Step::ParseDeferred { buffered, error: e.to_string() },
        }
    }

    /// Close the run and return its terminal outcome.
    ///
    /// Without a parsed document this moves the accumulator to
    /// [`Phase::Failed`] and yields [`StreamOutcome::NoDocument`]. A run
    /// that already reached [`Phase::Done`] stays done; once its document
    /// has been handed out, later calls yield `NoDocument`.
    pub fn finish(&mut self) -> StreamOutcome {
        match self.document.take() {
            Some(value) => StreamOutcome::Document(value),
            None => {
                if self.phase != Phase::Done {
                    self.phase = Phase::Failed;
                }
                StreamOutcome::NoDocument
            }
        }
    }

    fn rewrite_envelope(&mut self) {
        if self.text.contains(ENVELOPE_PREFIX) {
            self.text = self.text.replacen(ENVELOPE_PREFIX, ENVELOPE_REPLACEMENT, 1);
            self.rewrites += 1;
            debug!("stripped updates envelope from first chunk");
        }
    }

    /// Text accumulated so far (after the first-chunk rewrite).
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// How many times the envelope rewrite fired (zero or one).
    pub fn rewrites(&self) -> u32 {
        self.rewrites
    }

    /// Bytes held by the decoder awaiting the rest of a code point.
    pub fn pending_bytes(&self) -> usize {
        self.decoder.pending_len()
    }
}

#[cfg(test)]
#[path = "accumulator_tests.rs"]
mod tests;
