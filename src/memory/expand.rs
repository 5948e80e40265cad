//! Deep-search query expansion.
//!
//! Asks the language model to turn one user utterance into several targeted
//! sub-queries before similarity search, improving recall for indirect
//! questions. Any failure falls back to the original query.

use crate::config::Prompts;
use crate::llm::ChatModel;
use crate::parse::parse_string_array;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Expands a query into sub-queries via the chat model.
pub struct QueryExpander {
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
}

impl QueryExpander {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Expand a query into up to 5 sub-queries. Fail-soft: on any model or
    /// parse failure the original query is returned unexpanded.
    pub async fn expand(
        &self,
        query: &str,
        history: Option<&str>,
        file: Option<&Path>,
    ) -> Vec<String> {
        let history_block = history
            .map(|h| format!("# Message history\n{}\n\n", h))
            .unwrap_or_default();

        let mut vars = HashMap::new();
        vars.insert("query".to_string(), query.to_string());
        vars.insert("history".to_string(), history_block);
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.deep_search.user, &vars);

        let response = match self.model.complete(&prompt, None, file).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Query expansion call failed, using original query: {}", e);
                return vec![query.to_string()];
            }
        };

        match parse_string_array(&response) {
            Ok(queries) if !queries.is_empty() => {
                debug!("Expanded query into {} sub-queries", queries.len());
                queries
            }
            Ok(_) => {
                warn!("Query expansion returned an empty array, using original query");
                vec![query.to_string()]
            }
            Err(e) => {
                warn!("Could not parse expansion response ({}), using original query", e);
                vec![query.to_string()]
            }
        }
    }
}
