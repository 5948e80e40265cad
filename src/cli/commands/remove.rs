//! Remove command implementation.

use super::store_from;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the remove command.
pub fn run_remove(file: &str, question: &str, settings: Settings) -> Result<()> {
    let store = store_from(&settings);

    let removed = store.remove_question(file, question)?;
    if removed == 0 {
        Output::warning(&format!("No entries matched the question in {}", file));
    } else {
        Output::success(&format!("Removed {} entry(ies) from {}", removed, file));
    }

    Ok(())
}
