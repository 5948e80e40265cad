//! CLI command implementations.

mod add;
mod build;
mod chunk;
mod config;
mod init;
mod list;
mod recall;
mod remove;
mod search;

pub use add::run_add;
pub use build::run_build;
pub use chunk::run_chunk;
pub use config::run_config;
pub use init::run_init;
pub use list::run_list;
pub use recall::run_recall;
pub use remove::run_remove;
pub use search::run_search;

use crate::config::Settings;
use crate::embedding::CohereEmbedder;
use crate::knowledge::KnowledgeStore;
use std::sync::Arc;

/// Build the knowledge store for the configured dataset directory.
pub(crate) fn store_from(settings: &Settings) -> KnowledgeStore {
    KnowledgeStore::new(settings.dataset_dir())
}

/// Build the configured embedder.
pub(crate) fn embedder_from(settings: &Settings) -> anyhow::Result<Arc<CohereEmbedder>> {
    let keys = settings.embedding.resolved_api_keys();
    let embedder = CohereEmbedder::with_config(
        keys,
        &settings.embedding.endpoint,
        &settings.embedding.model,
    )?;
    Ok(Arc::new(embedder))
}
