//! Build command implementation.

use super::{embedder_from, store_from};
use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge::IndexBuilder;
use anyhow::Result;

/// Run the build command.
pub async fn run_build(file: Option<&str>, settings: Settings) -> Result<()> {
    let store = store_from(&settings);
    let embedder = embedder_from(&settings)?;
    let builder = IndexBuilder::new(store, embedder);

    let spinner = Output::spinner("Building embedding index...");

    let outcome = match file {
        Some(filename) => builder.build_file(filename).await.map(|_| 1),
        None => builder.build_all().await,
    };
    spinner.finish_and_clear();

    match outcome {
        Ok(count) => {
            Output::success(&format!("Built {} knowledge file(s)", count));
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Build failed: {}", e));
            Err(e.into())
        }
    }
}
