//! Gemini SSE stream adapter.
//!
//! With `alt=sse` every `data:` line carries a complete
//! `GenerateContentResponse` whose first part holds the next text chunk.

use super::types::GenerateContentResponse;
use crate::error::ModelError;
use futures::Stream;
use pin_project_lite::pin_project;
use shellbay_streaming::SseJsonStream;
use std::fmt::Display;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

pin_project! {
    /// Stream of text chunks decoded from a Gemini SSE byte stream.
    pub struct GeminiTextStream<S> {
        #[pin]
        inner: SseJsonStream<S, GenerateContentResponse>,
        chunks: usize,
        done: bool,
    }
}

impl<S> GeminiTextStream<S> {
    /// Wrap a raw byte stream.
    pub fn new(inner: S) -> Self {
        Self {
            inner: SseJsonStream::new(inner),
            chunks: 0,
            done: false,
        }
    }
}

impl<S, B, E> Stream for GeminiTextStream<S>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    type Item = Result<String, ModelError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.done {
            return Poll::Ready(None);
        }

        loop {
            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(response)) => {
                    if let Some(reason) = response.finish_reason() {
                        tracing::debug!(finish_reason = reason, "Gemini candidate finished");
                    }
                    if let Some(feedback) = &response.prompt_feedback {
                        if let Some(reason) = &feedback.block_reason {
                            tracing::warn!(block_reason = %reason, "Gemini blocked the prompt");
                        }
                    }
                    if let Some(text) = response.first_text() {
                        *this.chunks += 1;
                        return Poll::Ready(Some(Ok(text.to_string())));
                    }
                }
                Some(Err(e)) => {
                    *this.done = true;
                    return Poll::Ready(Some(Err(e.into())));
                }
                None => {
                    *this.done = true;
                    tracing::debug!(chunks = *this.chunks, "Gemini stream ended");
                    return Poll::Ready(None);
                }
            }
        }
    }
}
