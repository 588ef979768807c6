//! Streaming responses
//!
//! Two layers: [`ndjson`] turns a response body into a stream of raw JSON
//! values, skipping blank and malformed lines, and [`ChunkStream`] decodes
//! those values into one typed chunk shape and enforces the terminal-chunk
//! contract.

pub mod parser;

pub use parser::{LineParser, MAX_LINE_SIZE};

use crate::errors::{OllamaError, Result};
use bytes::Bytes;
use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use serde_json::Value;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

/// Raw JSON values read from an NDJSON body
pub type RawStream = BoxStream<'static, Result<Value>>;

/// Per-operation decode function applied to each raw value
pub type Decoder<T> = fn(Value) -> Result<T>;

/// A chunk that can end a stream
pub trait StreamChunk {
    fn is_terminal(&self) -> bool;
}

/// A chunk carrying a piece of generated text
pub trait TextFragment {
    fn fragment(&self) -> &str;
}

struct LineState<S> {
    body: Pin<Box<S>>,
    parser: LineParser,
    base_url: String,
    read_timeout: Duration,
    finished: bool,
}

/// Parse an NDJSON body lazily
///
/// Each non-blank line is parsed on its own. Lines that are not valid JSON
/// are skipped. A read error or a read exceeding `read_timeout` is yielded
/// once as a connection error and ends the stream.
pub fn ndjson<S, E>(body: S, base_url: String, read_timeout: Duration) -> RawStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let state = LineState {
        body: Box::pin(body),
        parser: LineParser::new(),
        base_url,
        read_timeout,
        finished: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(line) = st.parser.next_line() {
                match parse_line(&line) {
                    Some(value) => return Some((Ok(value), st)),
                    None => continue,
                }
            }

            if st.finished {
                return None;
            }

            match tokio::time::timeout(st.read_timeout, st.body.next()).await {
                Ok(Some(Ok(bytes))) => st.parser.add_bytes(&bytes),
                Ok(Some(Err(e))) => {
                    st.finished = true;
                    st.parser.clear();
                    let err = OllamaError::connection(
                        &st.base_url,
                        format!("stream interrupted: {}", e),
                    );
                    return Some((Err(err), st));
                }
                Ok(None) => {
                    st.finished = true;
                    st.parser.finish();
                }
                Err(_) => {
                    st.finished = true;
                    st.parser.clear();
                    let err = OllamaError::connection(
                        &st.base_url,
                        format!("stream read timed out after {}s", st.read_timeout.as_secs()),
                    );
                    return Some((Err(err), st));
                }
            }
        }
    })
    .boxed()
}

fn parse_line(line: &[u8]) -> Option<Value> {
    let start = line.iter().position(|b| !b.is_ascii_whitespace())?;
    let end = line.iter().rposition(|b| !b.is_ascii_whitespace())?;
    let line = &line[start..=end];

    // from_slice also rejects invalid UTF-8
    match serde_json::from_slice(line) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::trace!(
                error = %e,
                line = %String::from_utf8_lossy(line),
                "skipping malformed stream line"
            );
            None
        }
    }
}

/// The `error` string of an in-stream error object
fn stream_error(value: &Value) -> Option<&str> {
    value.get("error")?.as_str()
}

struct ChunkState<T> {
    raw: Option<RawStream>,
    decode: Decoder<T>,
    base_url: String,
    server_error: Option<String>,
}

/// Lazy sequence of typed chunks from one streaming request
///
/// Yields zero or more chunks, at most one of them terminal, and nothing
/// after it. Lines that do not decode are dropped. If the body ends before
/// a terminal chunk arrives the stream yields a connection error. Dropping
/// the stream closes the underlying response.
pub struct ChunkStream<T> {
    inner: BoxStream<'static, Result<T>>,
}

impl<T> ChunkStream<T>
where
    T: StreamChunk + Send + 'static,
{
    /// Decode `raw` with `decode`
    pub fn new(raw: RawStream, decode: Decoder<T>, base_url: impl Into<String>) -> Self {
        let state = ChunkState {
            raw: Some(raw),
            decode,
            base_url: base_url.into(),
            server_error: None,
        };

        let inner = stream::unfold(state, |mut st| async move {
            loop {
                let raw = st.raw.as_mut()?;
                match raw.next().await {
                    Some(Ok(value)) => {
                        if let Some(message) = stream_error(&value) {
                            tracing::warn!(error = message, "server reported an error in stream");
                            st.server_error = Some(message.to_string());
                            continue;
                        }
                        match (st.decode)(value) {
                            Ok(chunk) => {
                                if chunk.is_terminal() {
                                    st.raw = None;
                                }
                                return Some((Ok(chunk), st));
                            }
                            Err(e) => {
                                tracing::trace!(error = %e, "dropping undecodable stream chunk");
                                continue;
                            }
                        }
                    }
                    Some(Err(e)) => {
                        st.raw = None;
                        return Some((Err(e), st));
                    }
                    None => {
                        st.raw = None;
                        let message = match st.server_error.take() {
                            Some(server) => format!(
                                "stream ended before a terminal chunk; server reported: {}",
                                server
                            ),
                            None => "stream ended before a terminal chunk".to_string(),
                        };
                        let err = OllamaError::connection(&st.base_url, message);
                        return Some((Err(err), st));
                    }
                }
            }
        })
        .boxed();

        Self { inner }
    }

    /// Single-element stream holding an already complete response
    pub fn once(chunk: T) -> Self {
        Self {
            inner: stream::once(async move { Ok(chunk) }).boxed(),
        }
    }
}

impl<T> ChunkStream<T>
where
    T: TextFragment,
{
    /// Concatenate every fragment in order
    pub async fn collect_text(mut self) -> Result<String> {
        let mut text = String::new();
        while let Some(chunk) = self.inner.next().await {
            text.push_str(chunk?.fragment());
        }
        Ok(text)
    }
}

impl<T> Stream for ChunkStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl<T> fmt::Debug for ChunkStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkStream").finish_non_exhaustive()
    }
}

/// Result of an operation that can run unary or streaming
#[derive(Debug)]
pub enum Reply<T> {
    Unary(T),
    Stream(ChunkStream<T>),
}

impl<T> Reply<T>
where
    T: StreamChunk + Send + 'static,
{
    pub fn is_stream(&self) -> bool {
        matches!(self, Reply::Stream(_))
    }

    /// View either mode as a stream
    pub fn into_stream(self) -> ChunkStream<T> {
        match self {
            Reply::Unary(value) => ChunkStream::once(value),
            Reply::Stream(stream) => stream,
        }
    }
}

impl<T> Reply<T>
where
    T: StreamChunk + TextFragment + Send + 'static,
{
    /// Full generated text, whichever mode was used
    pub async fn text(self) -> Result<String> {
        self.into_stream().collect_text().await
    }
}
