//! Init command - first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge::KnowledgeStore;
use anyhow::Result;
use console::style;

/// Run the init command.
pub fn run_init(settings: &Settings) -> Result<()> {
    Output::header("Minne Setup");
    println!();

    // API keys
    if settings.embedding.resolved_api_keys().is_empty() {
        Output::warning("No embedding API keys configured.");
        println!();
        println!("  Minne needs at least one Cohere API key to build and search the index.");
        println!(
            "  Get a key from: {}",
            style("https://dashboard.cohere.com/api-keys").underlined()
        );
        println!();
        println!("  Either export it:");
        println!("  {}", style("export COHERE_API_KEYS='key1,key2'").green());
        println!("  or add it under [embedding] api_keys in the config file.");
        println!();
    } else {
        Output::success(&format!(
            "{} embedding API key(s) configured",
            settings.embedding.resolved_api_keys().len()
        ));
    }

    // Dataset directories
    let store = KnowledgeStore::new(settings.dataset_dir());
    store.ensure_dirs()?;
    Output::success(&format!(
        "Dataset directories ready under {}",
        settings.dataset_dir().display()
    ));
    Output::kv("plain Q/A files", &store.plain_dir().display().to_string());
    Output::kv("embedded files", &store.embeddings_dir().display().to_string());

    // Config file
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
    }

    println!();
    println!("Next steps:");
    println!(
        "  {} Put Q/A files into the plain dataset directory",
        style("1.").cyan()
    );
    println!("  {} Build the index: {}", style("2.").cyan(), style("minne build").green());
    println!(
        "  {} Try a recall: {}",
        style("3.").cyan(),
        style("minne recall \"tell me about yourself\"").green()
    );

    Ok(())
}
