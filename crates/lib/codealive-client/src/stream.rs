//! Incremental decoding of streamed chat responses.
//!
//! The chat endpoint answers with server-sent events: `data: <json>` lines
//! carrying content deltas, terminated by a literal `data: [DONE]` marker.
//! Fragments are surfaced strictly in arrival order; a stream that ends
//! without the terminal marker is an error, never a silent partial answer.

use std::pin::Pin;

use futures::{Stream, StreamExt};
use memchr::memchr;
use serde_json::Value;

use crate::error::ApiError;
use crate::types::ChatChunk;

type EventSource = Pin<Box<dyn Stream<Item = Result<Vec<u8>, ApiError>> + Send>>;

/// One decoded event from a chat stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// An in-order text fragment of the answer.
    Delta(String),
    /// The terminal marker; no further events follow.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamPhase {
    Streaming,
    Completed,
    Failed,
}

/// Lazy reassembler over a chat event stream.
///
/// Callers either pull events one at a time with [`ChatStream::next_event`]
/// (progressive delivery) or buffer the whole answer with
/// [`ChatStream::collect_answer`]; the terminal-marker rule is identical
/// either way.
pub struct ChatStream {
    source: EventSource,
    buffer: Vec<u8>,
    phase: StreamPhase,
}

impl std::fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatStream")
            .field("buffer", &self.buffer)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl ChatStream {
    pub fn new(source: impl Stream<Item = Result<Vec<u8>, ApiError>> + Send + 'static) -> Self {
        Self {
            source: Box::pin(source),
            buffer: Vec::new(),
            phase: StreamPhase::Streaming,
        }
    }

    /// Decodes the next event, suspending only at transport reads.
    ///
    /// Returns `Ok(None)` once the terminal marker has been observed. Any
    /// error is terminal for the stream.
    pub async fn next_event(&mut self) -> Result<Option<ChatEvent>, ApiError> {
        if self.phase != StreamPhase::Streaming {
            return Ok(None);
        }
        loop {
            while let Some(newline) = memchr(b'\n', &self.buffer) {
                let line = match std::str::from_utf8(&self.buffer[..newline]) {
                    Ok(text) => text.trim().to_string(),
                    Err(err) => {
                        self.phase = StreamPhase::Failed;
                        return Err(ApiError::stream(format!(
                            "invalid UTF-8 in event stream: {err}"
                        )));
                    }
                };
                self.buffer.drain(..=newline);

                let Some(payload) = line.strip_prefix("data:") else {
                    continue;
                };
                match decode_data_payload(payload.trim_start()) {
                    Ok(Some(ChatEvent::Done)) => {
                        self.phase = StreamPhase::Completed;
                        return Ok(Some(ChatEvent::Done));
                    }
                    Ok(Some(event)) => return Ok(Some(event)),
                    Ok(None) => {}
                    Err(err) => {
                        self.phase = StreamPhase::Failed;
                        return Err(err);
                    }
                }
            }

            match self.source.next().await {
                Some(Ok(chunk)) => self.buffer.extend_from_slice(&chunk),
                Some(Err(err)) => {
                    self.phase = StreamPhase::Failed;
                    return Err(err);
                }
                None => {
                    self.phase = StreamPhase::Failed;
                    return Err(ApiError::stream(
                        "response stream ended before the terminal marker",
                    ));
                }
            }
        }
    }

    /// Buffers the whole answer: concatenates every delta in arrival order
    /// and returns once the terminal marker is observed.
    pub async fn collect_answer(mut self) -> Result<String, ApiError> {
        let mut answer = String::new();
        loop {
            match self.next_event().await? {
                Some(ChatEvent::Delta(text)) => answer.push_str(&text),
                Some(ChatEvent::Done) | None => return Ok(answer),
            }
        }
    }
}

/// Decodes one `data:` payload. `Ok(None)` means the event carried nothing
/// to surface (keep-alive, role-only delta, empty content).
fn decode_data_payload(payload: &str) -> Result<Option<ChatEvent>, ApiError> {
    if payload.is_empty() {
        return Ok(None);
    }
    if payload == "[DONE]" {
        return Ok(Some(ChatEvent::Done));
    }

    let value: Value = serde_json::from_str(payload)
        .map_err(|err| ApiError::stream(format!("malformed stream event: {err}")))?;

    if value.get("error").is_some() {
        let message = value
            .pointer("/error/message")
            .and_then(Value::as_str)
            .unwrap_or("the service reported an error mid-stream");
        return Err(ApiError::stream(message));
    }

    let chunk: ChatChunk = serde_json::from_value(value)
        .map_err(|err| ApiError::stream(format!("malformed stream event: {err}")))?;
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty())
        .map(ChatEvent::Delta))
}
