//! Incremental embedding index builder.
//!
//! Transforms plain Q/A files into embedded topic files. The build reuses
//! every embedding already present in the output file, so re-running after
//! adding new pairs only embeds the additions. Concurrent builds over the
//! same file are not supported; callers serialize access per file.

use super::{KnowledgeStore, QaEntry, TopicDocument, TopicFile};
use crate::embedding::{Embedder, InputType};
use crate::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Builds and maintains the embedded knowledge base.
pub struct IndexBuilder {
    store: KnowledgeStore,
    embedder: Arc<dyn Embedder>,
    input_type: InputType,
}

impl IndexBuilder {
    pub fn new(store: KnowledgeStore, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store,
            embedder,
            input_type: InputType::Classification,
        }
    }

    /// Override the input type sent to the embedding provider. Searches over
    /// the resulting index must use the same input type; see
    /// [`SearchEngine::with_input_type`](crate::search::SearchEngine::with_input_type).
    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    /// Build one file: merge the plain input with any existing embedded
    /// output, embedding only headers and pairs that are missing. Writes the
    /// result and returns it.
    #[instrument(skip(self))]
    pub async fn build_file(&self, filename: &str) -> Result<TopicFile> {
        let plain = self.store.load_plain(filename)?;
        let existing = self.store.load_embedded(filename).unwrap_or_default();

        let mut result = TopicFile::new();
        let mut embedded_new = 0usize;

        for (header, pairs) in &plain {
            let header_embedding = match existing.get(header) {
                Some(doc) if !doc.header_embedding.is_empty() => doc.header_embedding.clone(),
                _ => {
                    embedded_new += 1;
                    self.embedder.embed(header, self.input_type).await?
                }
            };

            // Existing entries by question text, the dedup key for reuse
            let existing_entries: HashMap<&str, &QaEntry> = existing
                .get(header)
                .map(|doc| {
                    doc.entries
                        .iter()
                        .map(|e| (e.question.as_str(), e))
                        .collect()
                })
                .unwrap_or_default();

            let mut entries = Vec::with_capacity(pairs.len());
            for pair in pairs {
                match existing_entries.get(pair.question.as_str()) {
                    Some(entry) if entry.is_embedded() => entries.push((*entry).clone()),
                    _ => {
                        embedded_new += 2;
                        let question_embedding =
                            self.embedder.embed(&pair.question, self.input_type).await?;
                        let answer_embedding =
                            self.embedder.embed(&pair.answer, self.input_type).await?;
                        entries.push(QaEntry {
                            question: pair.question.clone(),
                            answer: pair.answer.clone(),
                            question_embedding,
                            answer_embedding,
                        });
                    }
                }
            }

            result.insert(
                header.clone(),
                TopicDocument {
                    header_embedding,
                    entries,
                },
            );
        }

        self.store.save_embedded(filename, &result)?;
        info!(
            "Built {}: {} topics, {} new embeddings",
            filename,
            result.len(),
            embedded_new
        );
        Ok(result)
    }

    /// Build every plain input file. Returns the number of files processed.
    pub async fn build_all(&self) -> Result<usize> {
        self.store.ensure_dirs()?;
        let files = self.store.list_plain_files()?;
        for filename in &files {
            self.build_file(filename).await?;
        }
        Ok(files.len())
    }

    /// Embed a new Q/A pair and append it under a header in both the plain
    /// and the embedded file. A new header gets its embedding on first use.
    pub async fn add_qa(
        &self,
        filename: &str,
        header: &str,
        question: &str,
        answer: &str,
    ) -> Result<()> {
        let question_embedding = self.embedder.embed(question, self.input_type).await?;
        let answer_embedding = self.embedder.embed(answer, self.input_type).await?;

        let mut embedded = self.store.load_embedded(filename).unwrap_or_default();
        match embedded.get_mut(header) {
            Some(doc) => doc.entries.push(QaEntry {
                question: question.to_string(),
                answer: answer.to_string(),
                question_embedding,
                answer_embedding,
            }),
            None => {
                let header_embedding = self.embedder.embed(header, self.input_type).await?;
                embedded.insert(
                    header.to_string(),
                    TopicDocument {
                        header_embedding,
                        entries: vec![QaEntry {
                            question: question.to_string(),
                            answer: answer.to_string(),
                            question_embedding,
                            answer_embedding,
                        }],
                    },
                );
            }
        }
        self.store.save_embedded(filename, &embedded)?;

        let mut plain = self.store.load_plain(filename).unwrap_or_default();
        plain
            .entry(header.to_string())
            .or_default()
            .push(super::QaPair {
                question: question.to_string(),
                answer: answer.to_string(),
            });
        self.store.save_plain(filename, &plain)?;

        debug!("Added Q/A pair under '{}' in {}", header, filename);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{PlainFile, QaPair};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic embedder that counts provider calls.
    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    impl CountingEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, text: &str, _input_type: InputType) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Stable per-text vector so reuse is observable
            let seed = text.len() as f32;
            Ok(vec![seed, 1.0, 2.0])
        }
    }

    fn plain_fixture(questions: &[(&str, &str)]) -> PlainFile {
        let mut file = PlainFile::new();
        file.insert(
            "Hobbies".to_string(),
            questions
                .iter()
                .map(|(q, a)| QaPair {
                    question: q.to_string(),
                    answer: a.to_string(),
                })
                .collect(),
        );
        file
    }

    fn setup() -> (tempfile::TempDir, KnowledgeStore, Arc<CountingEmbedder>) {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::new(dir.path());
        store.ensure_dirs().unwrap();
        (dir, store, Arc::new(CountingEmbedder::new()))
    }

    #[tokio::test]
    async fn test_second_run_embeds_nothing() {
        let (_dir, store, embedder) = setup();
        store
            .save_plain(
                "facts.json",
                &plain_fixture(&[("What games do you make?", "Indie platformers")]),
            )
            .unwrap();

        let builder = IndexBuilder::new(store.clone(), embedder.clone());
        builder.build_file("facts.json").await.unwrap();
        // header + question + answer
        assert_eq!(embedder.calls(), 3);

        let first = std::fs::read(store.embeddings_dir().join("facts.json")).unwrap();

        builder.build_file("facts.json").await.unwrap();
        assert_eq!(embedder.calls(), 3, "second run must not call the provider");

        let second = std::fs::read(store.embeddings_dir().join("facts.json")).unwrap();
        assert_eq!(first, second, "second run must be byte-identical");
    }

    #[tokio::test]
    async fn test_incremental_build_embeds_only_new_pair() {
        let (_dir, store, embedder) = setup();
        store
            .save_plain("facts.json", &plain_fixture(&[("q1", "a1")]))
            .unwrap();

        let builder = IndexBuilder::new(store.clone(), embedder.clone());
        let before = builder.build_file("facts.json").await.unwrap();
        assert_eq!(embedder.calls(), 3);

        store
            .save_plain("facts.json", &plain_fixture(&[("q1", "a1"), ("q2", "a2")]))
            .unwrap();
        let after = builder.build_file("facts.json").await.unwrap();

        // Only the new pair was embedded
        assert_eq!(embedder.calls(), 5);
        // Pre-existing entry untouched
        assert_eq!(
            after["Hobbies"].entries[0],
            before["Hobbies"].entries[0]
        );
        assert_eq!(after["Hobbies"].entries.len(), 2);
    }

    #[tokio::test]
    async fn test_build_all_processes_every_file() {
        let (_dir, store, embedder) = setup();
        store
            .save_plain("a.json", &plain_fixture(&[("q", "a")]))
            .unwrap();
        store
            .save_plain("b.json", &plain_fixture(&[("q", "a")]))
            .unwrap();

        let builder = IndexBuilder::new(store.clone(), embedder.clone());
        let processed = builder.build_all().await.unwrap();
        assert_eq!(processed, 2);
        assert_eq!(store.list_embedded_files().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_add_qa_creates_header_and_syncs_plain() {
        let (_dir, store, embedder) = setup();
        let builder = IndexBuilder::new(store.clone(), embedder.clone());

        builder
            .add_qa("facts.json", "Projects", "What next?", "A roguelike")
            .await
            .unwrap();

        let embedded = store.load_embedded("facts.json").unwrap();
        let doc = &embedded["Projects"];
        assert!(!doc.header_embedding.is_empty());
        assert_eq!(doc.entries.len(), 1);

        let plain = store.load_plain("facts.json").unwrap();
        assert_eq!(plain["Projects"][0].question, "What next?");

        // Appending to the same header must not re-embed the header
        let calls_before = embedder.calls();
        builder
            .add_qa("facts.json", "Projects", "And after?", "A sequel")
            .await
            .unwrap();
        assert_eq!(embedder.calls(), calls_before + 2);
    }
}
