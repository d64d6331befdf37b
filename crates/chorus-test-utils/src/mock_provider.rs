// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation provider for deterministic testing.
//!
//! `MockProvider` pops a [`Script`] per request from a FIFO queue. When the
//! queue is empty a default text response is streamed.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chorus_core::{ChorusError, GenerationProvider, GenerationRequest, TokenStream};
use futures::{StreamExt, stream};

/// Default text streamed when no script is queued.
pub const DEFAULT_RESPONSE: &str = "I notice you slowed down right there.";

/// How one generation request should play out.
#[derive(Debug, Clone)]
pub enum Script {
    /// Stream these chunks, then end normally.
    Chunks(Vec<String>),
    /// Stream these chunks, then yield a transport error.
    FailAfter { chunks: Vec<String>, message: String },
    /// Fail before any stream is opened.
    FailToOpen(String),
    /// Stream these chunks, then never finish.
    Hang(Vec<String>),
}

impl Script {
    /// Stream `text` in small chunks that split words.
    pub fn text(text: &str) -> Self {
        Script::Chunks(chunk(text, 7))
    }
}

/// Split `text` into pieces of at most `size` chars.
pub fn chunk(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|c| c.iter().collect())
        .collect()
}

struct InFlight {
    current: Arc<AtomicUsize>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MockProvider {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<GenerationRequest>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock provider pre-loaded with the given scripts.
    pub fn with_scripts(scripts: Vec<Script>) -> Self {
        let provider = Self::new();
        for script in scripts {
            provider.push(script);
        }
        provider
    }

    pub fn push(&self, script: Script) {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(script);
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Highest number of streams that were open at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_script(&self) -> Script {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Script::text(DEFAULT_RESPONSE))
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    async fn stream(&self, request: GenerationRequest) -> Result<TokenStream, ChorusError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let script = self.next_script();
        if let Script::FailToOpen(message) = script {
            return Err(ChorusError::provider(message));
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight {
            current: Arc::clone(&self.in_flight),
        };

        let ok = |chunks: Vec<String>| stream::iter(chunks.into_iter().map(Ok));
        let body = match script {
            Script::Chunks(chunks) => ok(chunks).boxed(),
            Script::FailAfter { chunks, message } => ok(chunks)
                .chain(stream::once(async move { Err(ChorusError::provider(message)) }))
                .boxed(),
            Script::Hang(chunks) => ok(chunks).chain(stream::pending()).boxed(),
            Script::FailToOpen(_) => stream::empty().boxed(),
        };
        // The guard lives as long as the stream does.
        Ok(Box::pin(body.map(move |item| {
            let _held = &guard;
            item
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_core::ChatMessage;

    fn request() -> GenerationRequest {
        GenerationRequest {
            messages: vec![ChatMessage::user("hi")],
            max_tokens: 50,
        }
    }

    async fn collect(provider: &MockProvider) -> Result<String, ChorusError> {
        let mut stream = provider.stream(request()).await?;
        let mut out = String::new();
        while let Some(item) = stream.next().await {
            out.push_str(&item?);
        }
        Ok(out)
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockProvider::new();
        assert_eq!(collect(&provider).await.unwrap(), DEFAULT_RESPONSE);
        assert_eq!(provider.request_count(), 1);
    }

    #[tokio::test]
    async fn scripts_play_in_order() {
        let provider = MockProvider::with_scripts(vec![
            Script::text("first"),
            Script::FailAfter {
                chunks: vec!["par".into()],
                message: "reset".into(),
            },
            Script::FailToOpen("down".into()),
        ]);
        assert_eq!(collect(&provider).await.unwrap(), "first");
        assert!(collect(&provider).await.is_err());
        assert!(provider.stream(request()).await.is_err());
        assert_eq!(provider.request_count(), 3);
    }

    #[tokio::test]
    async fn in_flight_tracks_open_streams() {
        let provider = MockProvider::new();
        let a = provider.stream(request()).await.unwrap();
        let b = provider.stream(request()).await.unwrap();
        assert_eq!(provider.max_in_flight(), 2);
        drop(a);
        drop(b);
        let _c = provider.stream(request()).await.unwrap();
        assert_eq!(provider.max_in_flight(), 2);
    }

    #[test]
    fn chunk_splits_on_char_boundaries() {
        assert_eq!(chunk("héllo", 2), vec!["hé", "ll", "o"]);
        assert!(chunk("", 3).is_empty());
    }
}
