//! Memory recall: similarity search plus formatting for prompt injection.

mod expand;
mod format;

pub use expand::QueryExpander;
pub use format::format_memory;

use crate::embedding::Embedder;
use crate::error::Result;
use crate::knowledge::KnowledgeStore;
use crate::search::{SearchEngine, SearchResult};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// How many candidates each sub-query contributes before global ranking.
const CANDIDATES_PER_QUERY: usize = 100;

/// Options for one recall invocation.
#[derive(Debug, Clone)]
pub struct RecallOptions {
    /// Maximum results in the final memory block.
    pub max_results: usize,
    /// Results at or below this similarity are dropped.
    pub similarity_floor: f32,
    /// Expand the query into sub-queries via the language model.
    pub deep_search: bool,
    /// Restrict search to these knowledge files; `None` searches all.
    pub files: Option<Vec<String>>,
    /// Pre-formatted chat history passed to query expansion.
    pub history: Option<String>,
    /// Optional attachment passed to query expansion.
    pub file: Option<PathBuf>,
}

impl Default for RecallOptions {
    fn default() -> Self {
        Self {
            max_results: 5,
            similarity_floor: 0.80,
            deep_search: false,
            files: None,
            history: None,
            file: None,
        }
    }
}

/// Retrieves and formats character memories for a query.
pub struct MemoryEngine {
    store: KnowledgeStore,
    search: SearchEngine,
    expander: Option<QueryExpander>,
}

impl MemoryEngine {
    pub fn new(store: KnowledgeStore, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store,
            search: SearchEngine::new(embedder),
            expander: None,
        }
    }

    /// Attach a query expander, enabling deep search.
    pub fn with_expander(mut self, expander: QueryExpander) -> Self {
        self.expander = Some(expander);
        self
    }

    /// Run similarity search for the query and return a formatted memory
    /// block, or an empty string when nothing relevant is found.
    ///
    /// With `deep_search` enabled the query is first expanded into
    /// sub-queries; results are deduplicated by question text across
    /// sub-queries, ranked globally, and the final block lists the survivors
    /// in ascending similarity order.
    #[instrument(skip(self, options), fields(query = %query))]
    pub async fn recall(&self, query: &str, options: &RecallOptions) -> Result<String> {
        let results = self.recall_results(query, options).await?;
        Ok(format_memory(&results, options.similarity_floor))
    }

    /// Like [`recall`](Self::recall) but returns the raw ranked results in
    /// ascending similarity order, unfiltered by the floor.
    pub async fn recall_results(
        &self,
        query: &str,
        options: &RecallOptions,
    ) -> Result<Vec<SearchResult>> {
        let search_prompts = if options.deep_search {
            match &self.expander {
                Some(expander) => {
                    expander
                        .expand(query, options.history.as_deref(), options.file.as_deref())
                        .await
                }
                None => {
                    warn!("Deep search requested but no expander configured");
                    vec![query.to_string()]
                }
            }
        } else {
            vec![query.to_string()]
        };

        let corpus = self.store.load_corpus(options.files.as_deref())?;

        let mut collected: Vec<SearchResult> = Vec::new();
        let mut questions_seen: Vec<String> = Vec::new();

        for prompt in &search_prompts {
            match self.search.search(prompt, &corpus, CANDIDATES_PER_QUERY).await {
                Ok(hits) => {
                    for hit in hits {
                        if !questions_seen.contains(&hit.question) {
                            questions_seen.push(hit.question.clone());
                            collected.push(hit);
                        }
                    }
                }
                Err(e) => {
                    // One failed sub-query must not sink the whole recall
                    warn!("Search for '{}' failed: {}", prompt, e);
                }
            }
        }

        collected.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        collected.truncate(options.max_results);
        // Ascending for output: the strongest memory sits closest to the
        // end of the prompt
        collected.reverse();

        info!(
            "Recall for '{}': {} candidates after ranking",
            query,
            collected.len()
        );
        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::InputType;
    use crate::knowledge::{QaEntry, TopicDocument, TopicFile};
    use async_trait::async_trait;

    /// Stub embedder: the query and the indexed pair share a direction, so
    /// the pair scores high.
    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str, _input_type: InputType) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0, 0.0])
        }
    }

    fn store_with_hobbies(dir: &std::path::Path) -> KnowledgeStore {
        let store = KnowledgeStore::new(dir);
        store.ensure_dirs().unwrap();

        let mut file = TopicFile::new();
        file.insert(
            "Hobbies".to_string(),
            TopicDocument {
                header_embedding: vec![1.0, 0.0, 0.0],
                entries: vec![QaEntry {
                    question: "What games do you make?".to_string(),
                    answer: "Indie platformers".to_string(),
                    question_embedding: vec![1.0, 0.0, 0.0],
                    answer_embedding: vec![1.0, 0.0, 0.0],
                }],
            },
        );
        store.save_embedded("character.json", &file).unwrap();
        store
    }

    #[tokio::test]
    async fn test_recall_formats_matching_memory() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_hobbies(dir.path());
        let engine = MemoryEngine::new(store, Arc::new(StubEmbedder));

        let block = engine
            .recall("tell me about your game projects", &RecallOptions::default())
            .await
            .unwrap();

        assert!(block.starts_with("# Character memory"));
        assert!(block.contains("Information about 'character'"));
        assert!(block.contains("#### Topic: Hobbies"));
        assert!(block.contains("What games do you make?"));
        assert!(block.contains("Indie platformers"));
    }

    #[tokio::test]
    async fn test_recall_empty_corpus_gives_empty_block() {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::new(dir.path());
        store.ensure_dirs().unwrap();
        let engine = MemoryEngine::new(store, Arc::new(StubEmbedder));

        let block = engine
            .recall("anything", &RecallOptions::default())
            .await
            .unwrap();
        assert_eq!(block, "");
    }

    #[tokio::test]
    async fn test_recall_respects_max_results() {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::new(dir.path());
        store.ensure_dirs().unwrap();

        let mut file = TopicFile::new();
        file.insert(
            "Hobbies".to_string(),
            TopicDocument {
                header_embedding: vec![1.0, 0.0, 0.0],
                entries: (0..10)
                    .map(|i| QaEntry {
                        question: format!("question {}", i),
                        answer: format!("answer {}", i),
                        question_embedding: vec![1.0, 0.0, 0.0],
                        answer_embedding: vec![1.0, 0.0, 0.0],
                    })
                    .collect(),
            },
        );
        store.save_embedded("character.json", &file).unwrap();

        let engine = MemoryEngine::new(store, Arc::new(StubEmbedder));
        let options = RecallOptions {
            max_results: 3,
            ..Default::default()
        };
        let results = engine.recall_results("query", &options).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_recall_dedupes_across_sub_queries() {
        struct TwoQueryModel;

        #[async_trait]
        impl crate::llm::ChatModel for TwoQueryModel {
            async fn complete(
                &self,
                _prompt: &str,
                _history: Option<&str>,
                _file: Option<&std::path::Path>,
            ) -> Result<String> {
                Ok("[\"games\", \"projects\"]".to_string())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let store = store_with_hobbies(dir.path());
        let engine = MemoryEngine::new(store, Arc::new(StubEmbedder))
            .with_expander(QueryExpander::new(Arc::new(TwoQueryModel)));

        let options = RecallOptions {
            deep_search: true,
            ..Default::default()
        };
        let results = engine.recall_results("what games?", &options).await.unwrap();
        // Both sub-queries hit the same pair; it must appear once
        assert_eq!(results.len(), 1);
    }
}
