//! Minne CLI entry point.

use anyhow::Result;
use clap::Parser;
use minne::cli::{commands, Cli, Commands};
use minne::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("minne={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings)?;
        }

        Commands::Build { file } => {
            commands::run_build(file.as_deref(), settings).await?;
        }

        Commands::Search { query, limit, files } => {
            commands::run_search(query, *limit, files, settings).await?;
        }

        Commands::Recall {
            query,
            deep,
            max_results,
            floor,
            files,
        } => {
            commands::run_recall(query, *deep, *max_results, *floor, files, settings).await?;
        }

        Commands::Add {
            file,
            header,
            question,
            answer,
        } => {
            commands::run_add(file, header, question, answer, settings).await?;
        }

        Commands::Remove { file, question } => {
            commands::run_remove(file, question, settings)?;
        }

        Commands::Chunk {
            input,
            min_size,
            max_size,
            output,
        } => {
            commands::run_chunk(input, *min_size, *max_size, output.as_deref(), settings)?;
        }

        Commands::List => {
            commands::run_list(settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
