//! Prompt templates for Minne.
//!
//! Prompts can be customized by placing TOML files in the custom prompts
//! directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub deep_search: DeepSearchPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for deep-search query expansion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepSearchPrompts {
    pub user: String,
}

impl Default for DeepSearchPrompts {
    fn default() -> Self {
        Self {
            user: r#"You help a character agent search its memory. The memory is a set of question/answer pairs about the character's life, opinions and projects.

Rewrite the current request as up to 5 short, targeted search queries that together cover what the user actually wants to know. Look at the message history for context the request leaves implicit (pronouns, follow-ups, topic switches).

Rules:
1. Each query is a standalone question or keyword phrase
2. Prefer concrete nouns over pronouns ("the game" -> the game's likely subject)
3. Fewer, sharper queries beat many vague ones
4. Respond with ONLY a JSON array of strings, no commentary

Example response:
["what games does the character develop", "opinions on platformers"]

{{history}}# Current request
{{query}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom
    /// directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let deep_search_path = custom_path.join("deep_search.toml");
            if deep_search_path.exists() {
                let content = std::fs::read_to_string(&deep_search_path)?;
                prompts.deep_search = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom
    /// config variables. Provided variables take precedence.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.deep_search.user.contains("JSON array"));
    }

    #[test]
    fn test_render_template() {
        let template = "Search for {{query}} in {{scope}}.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("query".to_string(), "games".to_string());
        vars.insert("scope".to_string(), "memory".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Search for games in memory.");
    }

    #[test]
    fn test_custom_variables_are_overridden() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("query".to_string(), "stale".to_string());

        let mut vars = std::collections::HashMap::new();
        vars.insert("query".to_string(), "fresh".to_string());

        let result = prompts.render_with_custom("{{query}}", &vars);
        assert_eq!(result, "fresh");
    }
}
