//! Recall command implementation.

use super::{embedder_from, store_from};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::llm::OpenAIChatModel;
use crate::memory::{MemoryEngine, QueryExpander, RecallOptions};
use anyhow::Result;
use std::sync::Arc;

/// Run the recall command.
pub async fn run_recall(
    query: &str,
    deep: bool,
    max_results: Option<usize>,
    floor: Option<f32>,
    files: &[String],
    settings: Settings,
) -> Result<()> {
    let store = store_from(&settings);
    let embedder = embedder_from(&settings)?;

    let mut engine = MemoryEngine::new(store, embedder);
    if deep || settings.memory.deep_search {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let model = Arc::new(OpenAIChatModel::new(&settings.memory.expansion_model)?);
        engine = engine.with_expander(QueryExpander::new(model).with_prompts(prompts));
    }

    let options = RecallOptions {
        max_results: max_results.unwrap_or(settings.memory.max_results),
        similarity_floor: floor.unwrap_or(settings.memory.similarity_floor),
        deep_search: deep || settings.memory.deep_search,
        files: if files.is_empty() {
            None
        } else {
            Some(files.to_vec())
        },
        history: None,
        file: None,
    };

    let spinner = Output::spinner("Recalling...");
    let block = engine.recall(query, &options).await;
    spinner.finish_and_clear();

    match block {
        Ok(block) if block.is_empty() => {
            Output::warning("No memories cleared the similarity floor.");
            Ok(())
        }
        Ok(block) => {
            println!("{}", block);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Recall failed: {}", e));
            Err(e.into())
        }
    }
}
