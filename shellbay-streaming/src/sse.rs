//! Server-Sent Events (SSE) line decoding.
//!
//! Generation endpoints answer with one JSON document per `data:` line. The
//! decoder here works on raw bytes so that a line, or a multi-byte character,
//! split across two network reads is reassembled before it is looked at.

use crate::error::{StreamError, StreamResult};
use bytes::Bytes;
use futures::Stream;
use pin_project_lite::pin_project;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::fmt::Display;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// Largest line the decoder will buffer before giving up.
pub const MAX_LINE_SIZE: usize = 10 * 1024 * 1024;

const DATA_PREFIX: &str = "data: ";

/// Extract the payload of a `data: ` line.
///
/// Returns `None` for any other field, comments, a `data:` without the
/// following space, and for payloads that are empty or whitespace-only.
#[must_use]
pub fn data_payload(line: &str) -> Option<&str> {
    let value = line.strip_prefix(DATA_PREFIX)?;
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Incremental decoder from bytes to `data:` payloads.
#[derive(Debug)]
pub struct SseLineDecoder {
    buffer: Vec<u8>,
    max_line_size: usize,
    overflowed: bool,
}

impl Default for SseLineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SseLineDecoder {
    /// Create a decoder with the default line limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_line_size(MAX_LINE_SIZE)
    }

    /// Create a decoder with a custom line limit.
    #[must_use]
    pub fn with_max_line_size(max_line_size: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_line_size,
            overflowed: false,
        }
    }

    /// Bytes held back waiting for a line terminator.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a chunk and return the payloads of every line it completed.
    ///
    /// If the unterminated tail grows past the line limit after some lines
    /// of the same chunk were completed, those payloads are returned and the
    /// overflow is held until [`take_overflow`](Self::take_overflow) or the
    /// next call.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::BufferOverflow`] if the unterminated tail grows
    /// past the line limit.
    pub fn feed(&mut self, chunk: &[u8]) -> StreamResult<Vec<String>> {
        if let Some(err) = self.take_overflow() {
            return Err(err);
        }
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let mut line = &self.buffer[start..end];
            if let Some(stripped) = line.strip_suffix(b"\r") {
                line = stripped;
            }
            if let Some(payload) = data_payload(&String::from_utf8_lossy(line)) {
                payloads.push(payload.to_string());
            }
            start = end + 1;
        }
        self.buffer.drain(..start);

        if self.buffer.len() > self.max_line_size {
            self.buffer.clear();
            if payloads.is_empty() {
                return Err(StreamError::BufferOverflow {
                    limit: self.max_line_size,
                });
            }
            self.overflowed = true;
        }

        Ok(payloads)
    }

    /// Take an overflow held back by [`feed`](Self::feed).
    pub fn take_overflow(&mut self) -> Option<StreamError> {
        if std::mem::take(&mut self.overflowed) {
            Some(StreamError::BufferOverflow {
                limit: self.max_line_size,
            })
        } else {
            None
        }
    }

    /// End of input. Drops any unterminated remainder and returns its length.
    pub fn finish(&mut self) -> usize {
        let dropped = self.buffer.len();
        if dropped > 0 {
            tracing::debug!(bytes = dropped, "Discarding unterminated trailing line");
        }
        self.buffer.clear();
        dropped
    }
}

pin_project! {
    /// Stream adapter yielding `data:` payloads from a byte stream.
    pub struct SseDataStream<S> {
        #[pin]
        inner: S,
        decoder: SseLineDecoder,
        pending: VecDeque<String>,
        error: Option<StreamError>,
        finished: bool,
    }
}

impl<S> SseDataStream<S> {
    /// Wrap a byte stream.
    pub fn new(inner: S) -> Self {
        Self::with_decoder(inner, SseLineDecoder::new())
    }

    /// Wrap a byte stream with a preconfigured decoder.
    pub fn with_decoder(inner: S, decoder: SseLineDecoder) -> Self {
        Self {
            inner,
            decoder,
            pending: VecDeque::new(),
            error: None,
            finished: false,
        }
    }

    /// Parse each payload as JSON of type `T`.
    pub fn json<T>(self) -> SseJsonStream<S, T> {
        SseJsonStream::from_data(self)
    }
}

impl<S, B, E> Stream for SseDataStream<S>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    type Item = StreamResult<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(payload) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(payload)));
            }

            if let Some(e) = this.error.take() {
                *this.finished = true;
                return Poll::Ready(Some(Err(e)));
            }

            if *this.finished {
                return Poll::Ready(None);
            }

            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => match this.decoder.feed(chunk.as_ref()) {
                    Ok(payloads) => {
                        this.pending.extend(payloads);
                        *this.error = this.decoder.take_overflow();
                    }
                    Err(e) => {
                        *this.finished = true;
                        return Poll::Ready(Some(Err(e)));
                    }
                },
                Some(Err(e)) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(StreamError::transport(e))));
                }
                None => {
                    *this.finished = true;
                    this.decoder.finish();
                }
            }
        }
    }
}

pin_project! {
    /// Stream adapter yielding `data:` payloads parsed as JSON.
    ///
    /// Payloads that fail to parse are logged and skipped.
    pub struct SseJsonStream<S, T> {
        #[pin]
        inner: SseDataStream<S>,
        skipped: usize,
        _marker: PhantomData<fn() -> T>,
    }
}

impl<S, T> SseJsonStream<S, T> {
    /// Wrap a byte stream.
    pub fn new(inner: S) -> Self {
        Self::from_data(SseDataStream::new(inner))
    }

    /// Wrap an existing payload stream.
    pub fn from_data(inner: SseDataStream<S>) -> Self {
        Self {
            inner,
            skipped: 0,
            _marker: PhantomData,
        }
    }

    /// Number of payloads skipped because they were not valid JSON.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<S, B, E, T> Stream for SseJsonStream<S, T>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
    T: DeserializeOwned,
{
    type Item = StreamResult<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(payload)) => match serde_json::from_str::<T>(&payload) {
                    Ok(value) => return Poll::Ready(Some(Ok(value))),
                    Err(e) => {
                        *this.skipped += 1;
                        tracing::warn!(error = %e, len = payload.len(), "Skipping malformed SSE payload");
                    }
                },
                Some(Err(e)) => return Poll::Ready(Some(Err(e))),
                None => return Poll::Ready(None),
            }
        }
    }
}

/// Extension methods for byte streams carrying SSE.
pub trait SseStreamExt: Sized {
    /// Decode `data:` payloads.
    fn sse_data(self) -> SseDataStream<Self> {
        SseDataStream::new(self)
    }

    /// Decode `data:` payloads as JSON.
    fn sse_json<T: DeserializeOwned>(self) -> SseJsonStream<Self, T> {
        SseJsonStream::new(self)
    }
}

impl<S, E> SseStreamExt for S where S: Stream<Item = Result<Bytes, E>> {}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream::{self, StreamExt};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Chunk {
        text: String,
    }

    fn byte_stream(chunks: Vec<Vec<u8>>) -> impl Stream<Item = Result<Bytes, String>> {
        stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from(c))))
    }

    async fn collect_payloads(chunks: Vec<Vec<u8>>) -> Vec<String> {
        SseDataStream::new(byte_stream(chunks))
            .map(|r| r.unwrap())
            .collect()
            .await
    }

    #[rstest]
    #[case("data: hello", Some("hello"))]
    #[case("data:hello", None)]
    #[case("data:{\"a\":1}", None)]
    #[case("data:  two spaces", Some(" two spaces"))]
    #[case("data: ", None)]
    #[case("data:    ", None)]
    #[case("event: message", None)]
    #[case(": keep-alive", None)]
    #[case("id: 7", None)]
    #[case("", None)]
    fn test_data_payload(#[case] line: &str, #[case] expected: Option<&str>) {
        assert_eq!(data_payload(line), expected);
    }

    #[test]
    fn test_decoder_buffers_partial_line() {
        let mut decoder = SseLineDecoder::new();
        assert!(decoder.feed(b"data: hel").unwrap().is_empty());
        assert_eq!(decoder.buffered_len(), 9);
        assert_eq!(decoder.feed(b"lo\n").unwrap(), vec!["hello".to_string()]);
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn test_decoder_strips_carriage_return() {
        let mut decoder = SseLineDecoder::new();
        let crlf = decoder.feed(b"data: {\"a\":1}\r\n\r\n").unwrap();
        let mut decoder = SseLineDecoder::new();
        let lf = decoder.feed(b"data: {\"a\":1}\n\n").unwrap();
        assert_eq!(crlf, lf);
    }

    #[test]
    fn test_decoder_finish_drops_remainder() {
        let mut decoder = SseLineDecoder::new();
        let payloads = decoder.feed(b"data: one\ndata: tw").unwrap();
        assert_eq!(payloads, vec!["one".to_string()]);
        assert_eq!(decoder.finish(), 7);
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn test_decoder_overflow() {
        let mut decoder = SseLineDecoder::with_max_line_size(8);
        let err = decoder.feed(b"data: 0123456789").unwrap_err();
        assert!(matches!(err, StreamError::BufferOverflow { limit: 8 }));
    }

    #[test]
    fn test_decoder_skips_data_without_space() {
        let mut decoder = SseLineDecoder::new();
        assert!(decoder.feed(b"data:{\"a\":1}\n").unwrap().is_empty());
        assert_eq!(decoder.feed(b"data: {\"a\":1}\n").unwrap(), vec![r#"{"a":1}"#]);
    }

    #[test]
    fn test_decoder_overflow_keeps_earlier_lines() {
        let mut decoder = SseLineDecoder::with_max_line_size(8);
        let payloads = decoder.feed(b"data: ok\ndata: 0123456789").unwrap();
        assert_eq!(payloads, vec!["ok".to_string()]);

        let err = decoder.feed(b"more\n").unwrap_err();
        assert!(matches!(err, StreamError::BufferOverflow { limit: 8 }));
        assert!(decoder.take_overflow().is_none());
    }

    #[tokio::test]
    async fn test_stream_delivers_lines_before_overflow() {
        let chunks = vec![b"data: ok\ndata: 0123456789".to_vec()];
        let decoder = SseLineDecoder::with_max_line_size(8);
        let mut stream = SseDataStream::with_decoder(byte_stream(chunks), decoder);

        assert_eq!(stream.next().await.unwrap().unwrap(), "ok");
        assert!(matches!(
            stream.next().await,
            Some(Err(StreamError::BufferOverflow { limit: 8 }))
        ));
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn test_decoder_overflow_ignores_completed_lines() {
        let mut decoder = SseLineDecoder::with_max_line_size(8);
        let payloads = decoder.feed(b"data: 0123456789\ndata").unwrap();
        assert_eq!(payloads, vec!["0123456789".to_string()]);
    }

    #[tokio::test]
    async fn test_every_split_point_decodes_identically() {
        let body = "data: {\"text\":\"const\"}\n\ndata: {\"text\":\" x = 1;\"}\r\n\r\nevent: ping\ndata: {\"text\":\"é✓\"}\n\n";
        let bytes = body.as_bytes();
        let whole = collect_payloads(vec![bytes.to_vec()]).await;
        assert_eq!(whole.len(), 3);

        for split in 0..=bytes.len() {
            let chunks = vec![bytes[..split].to_vec(), bytes[split..].to_vec()];
            assert_eq!(collect_payloads(chunks).await, whole, "split at {}", split);
        }
    }

    #[tokio::test]
    async fn test_byte_at_a_time() {
        let body = b"data: {\"text\":\"a\"}\n\ndata: {\"text\":\"b\"}\n\n";
        let chunks = body.iter().map(|b| vec![*b]).collect();
        let payloads = collect_payloads(chunks).await;
        assert_eq!(payloads, vec![r#"{"text":"a"}"#, r#"{"text":"b"}"#]);
    }

    #[tokio::test]
    async fn test_utf8_split_across_chunks() {
        let body = "data: {\"text\":\"✓\"}\n".as_bytes();
        let mark = body.iter().position(|&b| b == 0xE2).unwrap();
        let chunks = vec![body[..mark + 1].to_vec(), body[mark + 1..].to_vec()];

        let values: Vec<Chunk> = SseJsonStream::new(byte_stream(chunks))
            .map(|r| r.unwrap())
            .collect()
            .await;

        assert_eq!(
            values,
            vec![Chunk {
                text: "✓".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_truncated_tail_is_lost() {
        let chunks = vec![b"data: {\"text\":\"a\"}\ndata: {\"text\":\"b\"}".to_vec()];
        let values: Vec<Chunk> = SseJsonStream::new(byte_stream(chunks))
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].text, "a");
    }

    #[tokio::test]
    async fn test_malformed_json_is_skipped() {
        let body = b"data: {\"text\":\"a\"}\ndata: {not json\ndata: [DONE]\ndata: {\"text\":\"b\"}\n";
        let mut stream = SseJsonStream::<_, Chunk>::new(byte_stream(vec![body.to_vec()]));

        let mut texts = Vec::new();
        while let Some(item) = stream.next().await {
            texts.push(item.unwrap().text);
        }

        assert_eq!(texts, vec!["a", "b"]);
        assert_eq!(stream.skipped(), 2);
    }

    #[tokio::test]
    async fn test_non_data_lines_are_ignored() {
        let body = b": comment\nevent: message\nid: 1\nretry: 100\n\ndata: x\n";
        assert_eq!(collect_payloads(vec![body.to_vec()]).await, vec!["x"]);
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let items: Vec<Result<Bytes, String>> = vec![
            Ok(Bytes::from_static(b"data: one\n")),
            Err("connection reset".to_string()),
            Ok(Bytes::from_static(b"data: two\n")),
        ];
        let mut stream = SseDataStream::new(stream::iter(items));

        assert_eq!(stream.next().await.unwrap().unwrap(), "one");
        let err = stream.next().await.unwrap().unwrap_err();
        assert!(err.is_transport());
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn test_ext_trait() {
        let stream = byte_stream(vec![b"data: {\"text\":\"z\"}\n".to_vec()]);
        let values: Vec<Chunk> = tokio_test::block_on(
            stream.sse_json::<Chunk>().map(|r| r.unwrap()).collect(),
        );
        assert_eq!(values[0].text, "z");
    }
}
