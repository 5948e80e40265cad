//! List command implementation.

use super::store_from;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the list command.
pub fn run_list(settings: Settings) -> Result<()> {
    let store = store_from(&settings);
    let corpus = store.load_corpus(None)?;

    if corpus.is_empty() {
        Output::warning("No embedded knowledge files found. Run 'minne build' first.");
        return Ok(());
    }

    Output::header("Knowledge files");
    for (name, file) in &corpus {
        let pairs: usize = file.values().map(|doc| doc.entries.len()).sum();
        Output::file_info(name, file.len(), pairs);
    }

    Ok(())
}
