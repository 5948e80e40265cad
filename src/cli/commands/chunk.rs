//! Chunk command implementation.

use crate::chunking::{chunk_files, chunk_text};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use std::path::Path;

/// Run the chunk command.
pub fn run_chunk(
    input: &str,
    min_size: Option<usize>,
    max_size: Option<usize>,
    output: Option<&str>,
    settings: Settings,
) -> Result<()> {
    let min_size = min_size.unwrap_or(settings.chunking.min_chars);
    let max_size = max_size.unwrap_or(settings.chunking.max_chars);
    if min_size >= max_size {
        anyhow::bail!("min_size must be smaller than max_size");
    }

    let path = Path::new(input);
    let chunks = if path.is_dir() {
        chunk_files(path, min_size, max_size)?
    } else {
        let text = std::fs::read_to_string(path)?;
        chunk_text(&text, min_size, max_size)
    };

    if chunks.is_empty() {
        Output::warning("Input produced no chunks.");
        return Ok(());
    }

    match output {
        Some(dir) => {
            let dir = Path::new(dir);
            std::fs::create_dir_all(dir)?;
            for (i, chunk) in chunks.iter().enumerate() {
                std::fs::write(dir.join(format!("chunk_{:04}.txt", i)), chunk)?;
            }
            Output::success(&format!(
                "Wrote {} chunks to {}",
                chunks.len(),
                dir.display()
            ));
        }
        None => {
            for (i, chunk) in chunks.iter().enumerate() {
                println!("--- chunk {} ({} chars) ---", i, chunk.len());
                println!("{}\n", chunk);
            }
            Output::success(&format!("{} chunks", chunks.len()));
        }
    }

    Ok(())
}
