//! CLI module for Minne.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Minne - Semantic Memory for Character Agents
///
/// Builds an embedding index over question/answer knowledge files and
/// retrieves relevant memories for prompt injection. The name "Minne" comes
/// from the Norwegian/Scandinavian word for "memory."
#[derive(Parser, Debug)]
#[command(name = "minne")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the dataset directories and default configuration
    Init,

    /// Build or update the embedding index from plain Q/A files
    Build {
        /// Only build this file (filename within the dataset)
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Search the knowledge base and show ranked results
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Restrict search to specific knowledge files
        #[arg(long)]
        files: Vec<String>,
    },

    /// Retrieve a formatted memory block for a query
    Recall {
        /// The query to recall memories for
        query: String,

        /// Expand the query with the language model before searching
        #[arg(short, long)]
        deep: bool,

        /// Maximum number of memories in the block
        #[arg(short, long)]
        max_results: Option<usize>,

        /// Minimum similarity for a memory to be included
        #[arg(long)]
        floor: Option<f32>,

        /// Restrict recall to specific knowledge files
        #[arg(long)]
        files: Vec<String>,
    },

    /// Add a Q/A pair to a knowledge file and embed it
    Add {
        /// Knowledge filename (e.g. "character.json")
        file: String,

        /// Topic header to add the pair under
        header: String,

        /// Question text
        question: String,

        /// Answer text
        answer: String,
    },

    /// Remove every Q/A pair matching a question from a knowledge file
    Remove {
        /// Knowledge filename (e.g. "character.json")
        file: String,

        /// Exact question text to remove
        question: String,
    },

    /// Split a transcript into sentence-aligned chunks
    Chunk {
        /// Text file or directory of .txt files
        input: String,

        /// Minimum chunk size in characters
        #[arg(long)]
        min_size: Option<usize>,

        /// Maximum chunk size in characters
        #[arg(long)]
        max_size: Option<usize>,

        /// Write chunks to this directory instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List knowledge files with topic and pair counts
    List,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "memory.similarity_floor")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Show configuration file path
    Path,
}
