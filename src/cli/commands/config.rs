//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            let mut settings = settings;
            apply_setting(&mut settings, key, value)?;
            settings.save()?;
            Output::success(&format!("Set {} = {}", key, value));
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Apply a dotted-key assignment to the settings tree.
fn apply_setting(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match key {
        "general.data_dir" => settings.general.data_dir = value.to_string(),
        "general.log_level" => settings.general.log_level = value.to_string(),
        "embedding.model" => settings.embedding.model = value.to_string(),
        "embedding.endpoint" => settings.embedding.endpoint = value.to_string(),
        "chunking.min_chars" => settings.chunking.min_chars = value.parse()?,
        "chunking.max_chars" => settings.chunking.max_chars = value.parse()?,
        "memory.max_results" => settings.memory.max_results = value.parse()?,
        "memory.similarity_floor" => settings.memory.similarity_floor = value.parse()?,
        "memory.deep_search" => settings.memory.deep_search = value.parse()?,
        "memory.expansion_model" => settings.memory.expansion_model = value.to_string(),
        _ => anyhow::bail!("Unknown configuration key: {}", key),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_setting() {
        let mut settings = Settings::default();
        apply_setting(&mut settings, "memory.max_results", "7").unwrap();
        assert_eq!(settings.memory.max_results, 7);

        apply_setting(&mut settings, "memory.similarity_floor", "0.5").unwrap();
        assert!((settings.memory.similarity_floor - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_apply_unknown_key_fails() {
        let mut settings = Settings::default();
        assert!(apply_setting(&mut settings, "nope.nothing", "x").is_err());
    }
}
