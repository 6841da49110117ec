//! Incremental decoding of OpenAI-style server-sent-event completions.
//!
//! The body is a sequence of `data: <json>` lines closed by `data: [DONE]`.
//! Bytes are buffered until a full line is available, so UTF-8 sequences
//! split across network chunks are decoded intact.

use futures_util::{Stream, StreamExt};
use log::{debug, trace};

use crate::llm::types::StreamChunk;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "data: [DONE]";

/// Outcome of decoding a single line of the body.
#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    /// Termination sentinel.
    Done,
    /// Text contributed by the first choice.
    Delta(String),
    /// Keep-alive, comment, foreign field or undecodable payload.
    Skip,
}

pub fn parse_frame(line: &str) -> Frame {
    let line = line.trim();

    if line == DONE_SENTINEL {
        return Frame::Done;
    }

    let Some(data) = line.strip_prefix(DATA_PREFIX) else {
        return Frame::Skip;
    };

    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => match chunk.first_delta() {
            Some(text) if !text.is_empty() => Frame::Delta(text.to_string()),
            _ => Frame::Skip,
        },
        Err(e) => {
            debug!("Skipping malformed frame: {e}");
            Frame::Skip
        }
    }
}

/// Accumulates deltas from a streamed body fed in arbitrary byte chunks.
#[derive(Debug, Default)]
pub struct StreamAggregator {
    pending: Vec<u8>,
    text: String,
    frames: usize,
    done: bool,
}

impl StreamAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds raw body bytes. Returns `true` once the sentinel has been seen;
    /// anything fed after that is ignored.
    pub fn feed(&mut self, bytes: &[u8]) -> bool {
        if self.done {
            return true;
        }

        self.pending.extend_from_slice(bytes);

        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);

            match parse_frame(&line) {
                Frame::Done => {
                    self.done = true;
                    self.pending.clear();
                    return true;
                }
                Frame::Delta(text) => {
                    self.frames += 1;
                    self.text.push_str(&text);
                }
                Frame::Skip => trace!("Ignoring line: {}", line.trim_end()),
            }
        }

        false
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Number of frames that contributed text so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consumes the aggregator. An unterminated trailing fragment is not a
    /// complete frame and is dropped.
    pub fn finish(self) -> String {
        if !self.pending.is_empty() {
            debug!(
                "Dropping {} bytes of unterminated trailing data",
                self.pending.len()
            );
        }
        self.text
    }
}

/// Drains a byte stream through a [`StreamAggregator`].
///
/// Stops at the sentinel or at end-of-stream. The first read error aborts
/// and any accumulated text is discarded.
pub async fn aggregate<S, B, E>(body: S) -> Result<String, E>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    futures_util::pin_mut!(body);
    let mut aggregator = StreamAggregator::new();

    while let Some(chunk) = body.next().await {
        if aggregator.feed(chunk?.as_ref()) {
            break;
        }
    }

    if !aggregator.is_done() {
        debug!("Stream ended without termination sentinel");
    }
    debug!("Aggregated {} frames", aggregator.frames());

    Ok(aggregator.finish())
}
