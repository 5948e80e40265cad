//! On-disk layout and IO for the knowledge base.
//!
//! A dataset root holds two sibling directories: `dataset_json` with plain
//! Q/A files and `dataset_embeddings` with the same filenames carrying
//! embeddings. Writes go through a temp file and rename so a crashed build
//! never leaves a half-written document behind.

use super::{Corpus, PlainFile, TopicFile};
use crate::error::{MinneError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Subdirectory with plain Q/A input files.
pub const PLAIN_DIR: &str = "dataset_json";

/// Subdirectory with embedded output files.
pub const EMBEDDINGS_DIR: &str = "dataset_embeddings";

/// Filesystem access to one dataset root.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    root: PathBuf,
}

impl KnowledgeStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory of plain Q/A input files.
    pub fn plain_dir(&self) -> PathBuf {
        self.root.join(PLAIN_DIR)
    }

    /// Directory of embedded output files.
    pub fn embeddings_dir(&self) -> PathBuf {
        self.root.join(EMBEDDINGS_DIR)
    }

    /// Create both directories if missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(self.plain_dir())?;
        std::fs::create_dir_all(self.embeddings_dir())?;
        Ok(())
    }

    /// Filenames of all `.json` files in a directory, sorted. A missing
    /// directory is an empty dataset, not an error.
    fn list_json(dir: &Path) -> Result<Vec<String>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Filenames of all plain input files.
    pub fn list_plain_files(&self) -> Result<Vec<String>> {
        Self::list_json(&self.plain_dir())
    }

    /// Filenames of all embedded files.
    pub fn list_embedded_files(&self) -> Result<Vec<String>> {
        Self::list_json(&self.embeddings_dir())
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Atomic write: serialize to a temp file in the target directory, then
    /// rename over the destination.
    fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        let dir = path.parent().ok_or_else(|| {
            MinneError::Knowledge(format!("no parent directory for {}", path.display()))
        })?;
        std::fs::create_dir_all(dir)?;

        let content = serde_json::to_string_pretty(value)?;
        let tmp = tempfile::NamedTempFile::new_in(dir)?;
        std::fs::write(tmp.path(), content)?;
        tmp.persist(path)
            .map_err(|e| MinneError::Knowledge(format!("persist failed: {}", e)))?;
        Ok(())
    }

    /// Load a plain input file.
    pub fn load_plain(&self, filename: &str) -> Result<PlainFile> {
        Self::read_json(&self.plain_dir().join(filename))
    }

    /// Write a plain input file.
    pub fn save_plain(&self, filename: &str, file: &PlainFile) -> Result<()> {
        Self::write_json(&self.plain_dir().join(filename), file)
    }

    /// Load an embedded file if it exists and parses; `None` otherwise.
    /// A corrupt file is logged and treated as absent, not fatal.
    pub fn load_embedded(&self, filename: &str) -> Option<TopicFile> {
        let path = self.embeddings_dir().join(filename);
        if !path.exists() {
            return None;
        }
        match Self::read_json(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("Skipping unreadable knowledge file {}: {}", filename, e);
                None
            }
        }
    }

    /// Write an embedded file.
    pub fn save_embedded(&self, filename: &str, file: &TopicFile) -> Result<()> {
        Self::write_json(&self.embeddings_dir().join(filename), file)
    }

    /// Load the embedded corpus, either every file or a specific subset.
    /// Missing or corrupt files are skipped with a warning.
    pub fn load_corpus(&self, filenames: Option<&[String]>) -> Result<Corpus> {
        let names = match filenames {
            Some(names) => names.to_vec(),
            None => self.list_embedded_files()?,
        };

        let mut corpus = Corpus::new();
        for name in names {
            match self.load_embedded(&name) {
                Some(file) => {
                    corpus.insert(name, file);
                }
                None => warn!("Knowledge file {} not loaded", name),
            }
        }

        debug!("Loaded corpus of {} files", corpus.len());
        Ok(corpus)
    }

    /// Remove every Q/A entry matching `question_text` from both the plain
    /// and the embedded file. Header embeddings are preserved even when a
    /// topic loses all its entries. Returns the number of entries removed
    /// from the embedded file.
    pub fn remove_question(&self, filename: &str, question_text: &str) -> Result<usize> {
        // Plain side
        match self.load_plain(filename) {
            Ok(mut plain) => {
                let mut modified = false;
                for pairs in plain.values_mut() {
                    let before = pairs.len();
                    pairs.retain(|p| p.question != question_text);
                    modified |= pairs.len() != before;
                }
                if modified {
                    self.save_plain(filename, &plain)?;
                }
            }
            Err(e) => warn!("Plain file {} not updated: {}", filename, e),
        }

        // Embedded side
        let mut removed = 0;
        if let Some(mut embedded) = self.load_embedded(filename) {
            for doc in embedded.values_mut() {
                let before = doc.entries.len();
                doc.entries.retain(|e| e.question != question_text);
                removed += before - doc.entries.len();
            }
            if removed > 0 {
                self.save_embedded(filename, &embedded)?;
            }
        } else {
            warn!("Embedded file {} not found", filename);
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{QaEntry, QaPair, TopicDocument};

    fn sample_entry(question: &str) -> QaEntry {
        QaEntry {
            question: question.to_string(),
            answer: "an answer".to_string(),
            question_embedding: vec![0.1, 0.2],
            answer_embedding: vec![0.3, 0.4],
        }
    }

    #[test]
    fn test_roundtrip_embedded_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::new(dir.path());

        let mut file = TopicFile::new();
        file.insert(
            "Hobbies".to_string(),
            TopicDocument {
                header_embedding: vec![1.0, 0.0],
                entries: vec![sample_entry("What games do you make?")],
            },
        );

        store.save_embedded("facts.json", &file).unwrap();
        let loaded = store.load_embedded("facts.json").unwrap();
        assert_eq!(loaded, file);
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::new(dir.path());
        assert!(store.load_embedded("nope.json").is_none());
    }

    #[test]
    fn test_corrupt_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::new(dir.path());
        store.ensure_dirs().unwrap();
        std::fs::write(store.embeddings_dir().join("bad.json"), "{ not json").unwrap();

        assert!(store.load_embedded("bad.json").is_none());
        let corpus = store.load_corpus(None).unwrap();
        assert!(corpus.is_empty());
    }

    #[test]
    fn test_remove_question_keeps_header_embedding() {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::new(dir.path());
        store.ensure_dirs().unwrap();

        let mut plain = PlainFile::new();
        plain.insert(
            "Hobbies".to_string(),
            vec![
                QaPair {
                    question: "q1".to_string(),
                    answer: "a1".to_string(),
                },
                QaPair {
                    question: "q2".to_string(),
                    answer: "a2".to_string(),
                },
            ],
        );
        store.save_plain("facts.json", &plain).unwrap();

        let mut embedded = TopicFile::new();
        embedded.insert(
            "Hobbies".to_string(),
            TopicDocument {
                header_embedding: vec![1.0],
                entries: vec![sample_entry("q1"), sample_entry("q2")],
            },
        );
        store.save_embedded("facts.json", &embedded).unwrap();

        let removed = store.remove_question("facts.json", "q1").unwrap();
        assert_eq!(removed, 1);

        let embedded = store.load_embedded("facts.json").unwrap();
        let doc = &embedded["Hobbies"];
        assert_eq!(doc.header_embedding, vec![1.0]);
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(doc.entries[0].question, "q2");

        let plain = store.load_plain("facts.json").unwrap();
        assert_eq!(plain["Hobbies"].len(), 1);
    }

    #[test]
    fn test_load_corpus_specific_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::new(dir.path());

        store.save_embedded("a.json", &TopicFile::new()).unwrap();
        store.save_embedded("b.json", &TopicFile::new()).unwrap();

        let corpus = store.load_corpus(Some(&["a.json".to_string()])).unwrap();
        assert_eq!(corpus.len(), 1);
        assert!(corpus.contains_key("a.json"));

        let corpus = store.load_corpus(None).unwrap();
        assert_eq!(corpus.len(), 2);
    }
}
