//! Search command implementation.

use super::{embedder_from, store_from};
use crate::cli::Output;
use crate::config::Settings;
use crate::search::SearchEngine;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    limit: usize,
    files: &[String],
    settings: Settings,
) -> Result<()> {
    let store = store_from(&settings);
    let embedder = embedder_from(&settings)?;
    let engine = SearchEngine::new(embedder);

    let file_filter = if files.is_empty() {
        None
    } else {
        Some(files.to_vec())
    };
    let corpus = store.load_corpus(file_filter.as_deref())?;

    let spinner = Output::spinner("Searching...");
    let results = engine.search(query, &corpus, limit).await;
    spinner.finish_and_clear();

    match results {
        Ok(hits) => {
            if hits.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} results", hits.len()));
                for hit in &hits {
                    Output::search_result(
                        &hit.source,
                        &hit.header,
                        hit.similarity,
                        &hit.question,
                        &hit.answer,
                    );
                }
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            Err(e.into())
        }
    }
}
