//! Streaming transport for the push channel.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use thiserror::Error;
use url::Url;

/// Errors at the transport level.
///
/// Recovered automatically by the channel's fixed-delay reconnect.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP connect or mid-stream failure.
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection attempt rejected before a stream was produced.
    #[error("transport rejected: {0}")]
    Rejected(String),
}

/// A stream of newline-delimited text lines from the server.
pub type LineStream = BoxStream<'static, Result<String, TransportError>>;

/// Opens the long-lived server-push stream.
///
/// The credential is passed as a connection parameter because the
/// transport does not support custom headers.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Open one streaming connection.
    async fn open(&self, credential: &str) -> Result<LineStream, TransportError>;
}

/// Production transport: a streaming GET with the credential as the
/// `token` query parameter, yielding one JSON event per line.
#[derive(Debug, Clone)]
pub struct HttpStreamTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpStreamTransport {
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl StreamTransport for HttpStreamTransport {
    async fn open(&self, credential: &str) -> Result<LineStream, TransportError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("token", credential);

        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(split_lines(Box::pin(response.bytes_stream())).boxed())
    }
}

/// Reframe a chunked byte stream into complete lines.
///
/// Chunk boundaries carry no meaning; a line may span several chunks
/// and one chunk may hold several lines. A trailing fragment without a
/// newline is flushed when the stream ends.
fn split_lines<S, B>(chunks: S) -> impl Stream<Item = Result<String, TransportError>> + Send
where
    S: Stream<Item = Result<B, reqwest::Error>> + Unpin + Send + 'static,
    B: AsRef<[u8]> + Send,
{
    futures_util::stream::unfold(LineFramer::new(chunks), |mut framer| async move {
        framer.next_line().await.map(|line| (line, framer))
    })
}

struct LineFramer<S> {
    chunks: S,
    buf: Vec<u8>,
    done: bool,
}

impl<S, B> LineFramer<S>
where
    S: Stream<Item = Result<B, reqwest::Error>> + Unpin,
    B: AsRef<[u8]> + Send,
{
    const fn new(chunks: S) -> Self {
        Self {
            chunks,
            buf: Vec::new(),
            done: false,
        }
    }

    async fn next_line(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Some(Ok(String::from_utf8_lossy(&line).into_owned()));
            }

            if self.done {
                if self.buf.is_empty() {
                    return None;
                }
                let rest = std::mem::take(&mut self.buf);
                return Some(Ok(String::from_utf8_lossy(&rest).into_owned()));
            }

            match self.chunks.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                None => self.done = true,
            }
        }
    }
}
