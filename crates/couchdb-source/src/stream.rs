//! Feed stream adapters for the continuous and normal `_changes` modes.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use checkpoint::Sequence;
use futures::{Stream, StreamExt};
use std::pin::Pin;

use crate::{ChangeRecord, ChangeStream};

/// One decoded line of the continuous feed.
#[derive(Debug)]
pub(crate) enum FeedLine {
    /// Empty keep-alive line emitted at the configured heartbeat interval.
    Heartbeat,
    /// A change record.
    Record(ChangeRecord),
    /// The `{"last_seq": ...}` terminator the server sends when it closes
    /// the feed.
    End(Sequence),
}

pub(crate) fn parse_feed_line(line: &str) -> Result<FeedLine> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(FeedLine::Heartbeat);
    }
    let value: serde_json::Value =
        serde_json::from_str(trimmed).with_context(|| format!("malformed feed line: {trimmed}"))?;
    if let Some(last_seq) = value.get("last_seq") {
        let seq: Sequence = serde_json::from_value(last_seq.clone())
            .context("malformed last_seq in feed terminator")?;
        return Ok(FeedLine::End(seq));
    }
    let record: ChangeRecord = serde_json::from_value(value)
        .with_context(|| format!("malformed change record: {trimmed}"))?;
    Ok(FeedLine::Record(record))
}

/// Streaming adapter over the line-delimited continuous feed.
///
/// Buffers response chunks and yields one record per complete line.
/// Heartbeat lines are consumed silently, so a quiet feed keeps this stream
/// pending rather than terminating it.
pub struct ContinuousStream {
    chunks: Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>,
    buffer: Vec<u8>,
    done: bool,
}

impl ContinuousStream {
    pub fn new(response: reqwest::Response) -> Self {
        Self::from_chunks(response.bytes_stream().map(|r| r.map_err(anyhow::Error::from)))
    }

    pub(crate) fn from_chunks(
        chunks: impl Stream<Item = Result<Bytes>> + Send + 'static,
    ) -> Self {
        Self {
            chunks: Box::pin(chunks),
            buffer: Vec::new(),
            done: false,
        }
    }

    /// Remove and return the next complete line from the buffer, if any.
    fn take_line(&mut self) -> Option<Vec<u8>> {
        let newline = self.buffer.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
        line.pop();
        Some(line)
    }

    fn decode_line(&mut self, line: Vec<u8>) -> Option<Result<ChangeRecord>> {
        let line = match String::from_utf8(line) {
            Ok(line) => line,
            Err(e) => {
                self.done = true;
                return Some(Err(anyhow!("feed line is not valid UTF-8: {e}")));
            }
        };
        match parse_feed_line(&line) {
            Ok(FeedLine::Heartbeat) => None,
            Ok(FeedLine::Record(record)) => Some(Ok(record)),
            Ok(FeedLine::End(seq)) => {
                tracing::debug!("changes feed closed by server at {seq}");
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[async_trait]
impl ChangeStream for ContinuousStream {
    async fn next(&mut self) -> Option<Result<ChangeRecord>> {
        loop {
            if self.done {
                return None;
            }
            while let Some(line) = self.take_line() {
                match self.decode_line(line) {
                    Some(item) => return Some(item),
                    None if self.done => return None,
                    None => continue,
                }
            }
            match self.chunks.next().await {
                Some(Ok(chunk)) => self.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.context("changes feed connection failed")));
                }
                None => {
                    // Connection closed. A trailing unterminated line may
                    // still hold one record.
                    let line = std::mem::take(&mut self.buffer);
                    self.done = true;
                    if line.iter().all(|b| b.is_ascii_whitespace()) {
                        return None;
                    }
                    return self.decode_line(line);
                }
            }
        }
    }
}

/// Response body of a `feed=normal` request.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ChangesResponse {
    pub results: Vec<ChangeRecord>,
    pub last_seq: Sequence,
}

/// Bounded replay over a fully parsed `feed=normal` response.
pub struct BoundedStream {
    pending: std::vec::IntoIter<ChangeRecord>,
    last_seq: Sequence,
    exhausted: bool,
}

impl BoundedStream {
    pub(crate) fn new(response: ChangesResponse) -> Self {
        Self {
            pending: response.results.into_iter(),
            last_seq: response.last_seq,
            exhausted: false,
        }
    }
}

#[async_trait]
impl ChangeStream for BoundedStream {
    async fn next(&mut self) -> Option<Result<ChangeRecord>> {
        match self.pending.next() {
            Some(record) => Some(Ok(record)),
            None => {
                if !self.exhausted {
                    self.exhausted = true;
                    tracing::debug!("bounded replay drained at {}", self.last_seq);
                }
                None
            }
        }
    }
}
