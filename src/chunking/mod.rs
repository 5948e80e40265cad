//! Sentence-aligned text chunking.
//!
//! Splits raw transcript text into bounded-size chunks that never break
//! mid-sentence. Used to prepare source material for Q/A extraction.

use crate::error::Result;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Default minimum chunk size in characters.
pub const DEFAULT_MIN_CHUNK_SIZE: usize = 5000;

/// Default maximum chunk size in characters.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 6500;

static SENTENCE_RE: OnceLock<Regex> = OnceLock::new();

/// Split text into sentences on `.`, `!` and `?`, keeping the terminator
/// attached. Whitespace-only sentences are dropped.
fn split_sentences(text: &str) -> Vec<String> {
    let re = SENTENCE_RE.get_or_init(|| Regex::new(r"[^.!?]+[.!?]*|[.!?]+").unwrap());
    re.find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Split text into sentence-aligned chunks between `min_size` and `max_size`
/// characters.
///
/// Sentences are accumulated greedily. When the next sentence would push the
/// buffer past `max_size`, the buffer is emitted only if it has already
/// reached `min_size`; otherwise the sentence is force-appended and the chunk
/// is allowed to exceed `max_size`. The trailing buffer is always emitted, so
/// the last chunk may be shorter than `min_size`.
pub fn chunk_text(text: &str, min_size: usize, max_size: usize) -> Vec<String> {
    let sentences = split_sentences(text);

    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in sentences {
        if current.len() + sentence.len() + 1 > max_size {
            if current.len() >= min_size {
                chunks.push(std::mem::take(&mut current));
                current = sentence;
            } else {
                // Too small to emit on its own, accept an oversized chunk
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(&sentence);
            }
        } else if current.is_empty() {
            current = sentence;
        } else {
            current.push(' ');
            current.push_str(&sentence);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Chunk every `.txt` file in a directory, concatenating the results in
/// filename order.
pub fn chunk_files(dir: &Path, min_size: usize, max_size: usize) -> Result<Vec<String>> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    entries.sort();

    let mut all_chunks = Vec::new();
    for path in entries {
        let text = std::fs::read_to_string(&path)?;
        let chunks = chunk_text(&text, min_size, max_size);
        debug!("Chunked {} into {} chunks", path.display(), chunks.len());
        all_chunks.extend(chunks);
    }

    Ok(all_chunks)
}
