//! Topic-file knowledge base for character memory.
//!
//! Each knowledge file maps topic headers to a header embedding plus a list
//! of question/answer entries with their own embeddings. Plain input files
//! carry the same headers with unembedded Q/A pairs; the index builder is the
//! transform between the two.

mod builder;
mod store;

pub use builder::IndexBuilder;
pub use store::KnowledgeStore;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A question/answer pair without embeddings, as found in plain input files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// A question/answer entry with embeddings for both sides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaEntry {
    pub question: String,
    pub answer: String,
    pub question_embedding: Vec<f32>,
    pub answer_embedding: Vec<f32>,
}

impl QaEntry {
    /// Whether both embeddings are present and usable.
    pub fn is_embedded(&self) -> bool {
        !self.question_embedding.is_empty() && !self.answer_embedding.is_empty()
    }
}

/// One topic within a knowledge file: the header embedding plus its entries.
///
/// A topic with zero entries still carries its header embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicDocument {
    pub header_embedding: Vec<f32>,
    #[serde(default)]
    pub entries: Vec<QaEntry>,
}

/// An embedded knowledge file: header -> topic document. Headers are unique
/// per file; BTreeMap keeps iteration deterministic.
pub type TopicFile = BTreeMap<String, TopicDocument>;

/// A plain input file: header -> unembedded Q/A pairs.
pub type PlainFile = BTreeMap<String, Vec<QaPair>>;

/// The full embedded corpus, keyed by filename.
pub type Corpus = BTreeMap<String, TopicFile>;
