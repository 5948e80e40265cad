//! Cosine-similarity search across the embedded knowledge corpus.

use crate::embedding::{Embedder, InputType};
use crate::error::Result;
use crate::knowledge::Corpus;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// A ranked hit from a similarity search. Ephemeral, never persisted.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Filename of the knowledge file the hit came from.
    pub source: String,
    /// Topic header within that file.
    pub header: String,
    pub question: String,
    pub answer: String,
    /// Combined score: max(question, answer) similarity plus half the
    /// header similarity.
    pub similarity: f32,
    pub header_similarity: f32,
    pub question_similarity: f32,
    pub answer_similarity: f32,
}

/// Compute cosine similarity between two vectors. Returns 0.0 for
/// mismatched lengths or zero-norm inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Similarity search over a loaded corpus.
pub struct SearchEngine {
    embedder: Arc<dyn Embedder>,
    input_type: InputType,
}

impl SearchEngine {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            input_type: InputType::Classification,
        }
    }

    /// Override the input type used to embed queries. Vectors from different
    /// provider input types live in different spaces, so this must match the
    /// input type the index was built with.
    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    /// Embed the query once and rank every Q/A pair in the corpus.
    ///
    /// Each pair scores `max(question_sim, answer_sim) + header_sim / 2`.
    /// Results are sorted descending; ties keep the deterministic
    /// file/header iteration order of the corpus.
    #[instrument(skip(self, corpus), fields(query = %query))]
    pub async fn search(
        &self,
        query: &str,
        corpus: &Corpus,
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedder.embed(query, self.input_type).await?;

        let mut results = Vec::new();

        for (source, file) in corpus {
            for (header, doc) in file {
                if doc.header_embedding.is_empty() {
                    warn!("Skipping header '{}' in {}: empty embedding", header, source);
                    continue;
                }
                let header_similarity =
                    cosine_similarity(&query_embedding, &doc.header_embedding);

                for entry in &doc.entries {
                    if !entry.is_embedded() {
                        warn!(
                            "Skipping question '{}' in {}: missing embeddings",
                            entry.question, source
                        );
                        continue;
                    }
                    let question_similarity =
                        cosine_similarity(&query_embedding, &entry.question_embedding);
                    let answer_similarity =
                        cosine_similarity(&query_embedding, &entry.answer_embedding);
                    let base = question_similarity.max(answer_similarity);

                    results.push(SearchResult {
                        source: source.clone(),
                        header: header.clone(),
                        question: entry.question.clone(),
                        answer: entry.answer.clone(),
                        similarity: base + header_similarity / 2.0,
                        header_similarity,
                        question_similarity,
                        answer_similarity,
                    });
                }
            }
        }

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        debug!("Search returned {} results", results.len());
        Ok(results)
    }
}
