//! Add command implementation.

use super::{embedder_from, store_from};
use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge::IndexBuilder;
use anyhow::Result;

/// Run the add command.
pub async fn run_add(
    file: &str,
    header: &str,
    question: &str,
    answer: &str,
    settings: Settings,
) -> Result<()> {
    let store = store_from(&settings);
    let embedder = embedder_from(&settings)?;
    let builder = IndexBuilder::new(store, embedder);

    let spinner = Output::spinner("Embedding new pair...");
    let result = builder.add_qa(file, header, question, answer).await;
    spinner.finish_and_clear();

    match result {
        Ok(()) => {
            Output::success(&format!("Added Q/A pair under '{}' in {}", header, file));
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Add failed: {}", e));
            Err(e.into())
        }
    }
}
