//! Minne - Semantic Memory for Character Agents
//!
//! A CLI tool and library for building a question/answer knowledge base with
//! embeddings and retrieving relevant "memories" for prompt injection.
//!
//! The name "Minne" comes from the Norwegian/Scandinavian word for "memory."
//!
//! # Overview
//!
//! Minne allows you to:
//! - Split raw transcripts into sentence-aligned chunks for Q/A extraction
//! - Build an embedding index over topic files of question/answer pairs
//! - Incrementally update the index without re-embedding unchanged content
//! - Run similarity search across all topic files and format the top hits
//!   into a compact memory block for a language-model prompt
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `chunking` - Sentence-aligned text chunking
//! - `embedding` - Embedding client with key rotation and caching
//! - `knowledge` - Topic-file knowledge base store and index builder
//! - `search` - Cosine-similarity search across the corpus
//! - `memory` - Memory recall, query expansion and prompt formatting
//! - `llm` - Opaque chat-model interface used by query expansion
//! - `parse` - Tolerant extraction of JSON from model free text
//!
//! Embedding calls require Cohere API keys (`COHERE_API_KEYS` or the config
//! file); query expansion additionally needs `OPENAI_API_KEY`.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use minne::config::Settings;
//! use minne::embedding::CohereEmbedder;
//! use minne::knowledge::KnowledgeStore;
//! use minne::memory::{MemoryEngine, RecallOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let embedder = Arc::new(CohereEmbedder::from_settings(&settings.embedding)?);
//!     let store = KnowledgeStore::new(settings.dataset_dir());
//!     let engine = MemoryEngine::new(store, embedder);
//!
//!     let memories = engine
//!         .recall("tell me about your game projects", &RecallOptions::default())
//!         .await?;
//!     println!("{}", memories);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod knowledge;
pub mod llm;
pub mod memory;
pub mod parse;
pub mod search;

pub use error::{MinneError, Result};
