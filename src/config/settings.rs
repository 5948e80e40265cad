//! Configuration settings for Minne.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub memory: MemorySettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data (the dataset lives beneath it).
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.minne".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (cohere).
    pub provider: String,
    /// Embedding model to use. Changing the model invalidates every stored
    /// vector; rebuild the dataset afterwards.
    pub model: String,
    /// Embed endpoint URL.
    pub endpoint: String,
    /// API keys for the provider, tried in order.
    pub api_keys: Vec<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "cohere".to_string(),
            model: "embed-english-v3.0".to_string(),
            endpoint: "https://api.cohere.com/v2/embed".to_string(),
            api_keys: Vec::new(),
        }
    }
}

impl EmbeddingSettings {
    /// Configured keys plus any from the `COHERE_API_KEYS` environment
    /// variable (comma-separated). Environment keys come first.
    pub fn resolved_api_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = std::env::var("COHERE_API_KEYS")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        keys.extend(self.api_keys.iter().cloned());
        keys
    }
}

/// Text chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Minimum chunk size in characters.
    pub min_chars: usize,
    /// Maximum chunk size in characters (soft bound; a single long sentence
    /// may exceed it).
    pub max_chars: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            min_chars: crate::chunking::DEFAULT_MIN_CHUNK_SIZE,
            max_chars: crate::chunking::DEFAULT_MAX_CHUNK_SIZE,
        }
    }
}

/// Memory recall settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    /// Maximum results in the formatted memory block.
    pub max_results: usize,
    /// Results at or below this similarity are dropped.
    pub similarity_floor: f32,
    /// Expand queries via the language model before searching.
    pub deep_search: bool,
    /// Model used for query expansion.
    pub expansion_model: String,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            max_results: 5,
            similarity_floor: 0.80,
            deep_search: false,
            expansion_model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::MinneError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("minne")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the dataset root directory (input and embedded files live in
    /// subdirectories beneath it).
    pub fn dataset_dir(&self) -> PathBuf {
        self.data_dir().join("dataset")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_roundtrip() {
        let settings = Settings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.memory.max_results, 5);
        assert!((parsed.memory.similarity_floor - 0.80).abs() < f32::EPSILON);
        assert_eq!(parsed.chunking.min_chars, 5000);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let settings: Settings = toml::from_str("[memory]\nmax_results = 3\n").unwrap();
        assert_eq!(settings.memory.max_results, 3);
        assert_eq!(settings.embedding.provider, "cohere");
    }
}
