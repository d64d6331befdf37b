// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming generation transport.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::ChorusError;
use crate::types::GenerationRequest;

/// Ordered stream of raw token chunks. An `Err` item ends the generation.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, ChorusError>> + Send>>;

/// Produces a token stream for a generation request.
///
/// Chunks may split the annotation delimiter at any character boundary;
/// consumers must not assume a chunk is a whole word.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Start a streaming generation.
    async fn stream(&self, request: GenerationRequest) -> Result<TokenStream, ChorusError>;
}
