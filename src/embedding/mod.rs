//! Embedding generation for semantic memory search.
//!
//! Provides a trait-based interface plus a Cohere-backed client with API key
//! rotation, rate-limit backoff and a process-lifetime cache.

mod cohere;

pub use cohere::{classify_failure, CohereEmbedder, KeyPool, RetryDecision};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// How the embedding provider should treat the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    SearchDocument,
    SearchQuery,
    #[default]
    Classification,
    Clustering,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::SearchDocument => "search_document",
            InputType::SearchQuery => "search_query",
            InputType::Classification => "classification",
            InputType::Clustering => "clustering",
        }
    }
}

/// Numeric representation requested from the embedding provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingKind {
    #[default]
    Float,
    Int8,
    Uint8,
    Binary,
    Ubinary,
}

impl EmbeddingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingKind::Float => "float",
            EmbeddingKind::Int8 => "int8",
            EmbeddingKind::Uint8 => "uint8",
            EmbeddingKind::Binary => "binary",
            EmbeddingKind::Ubinary => "ubinary",
        }
    }
}

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str, input_type: InputType) -> Result<Vec<f32>>;
}
