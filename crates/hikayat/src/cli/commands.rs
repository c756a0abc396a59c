//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hikayat - illustrated storyboards from short stories
#[derive(Parser, Debug)]
#[command(name = "hikayat")]
#[command(about = "Illustrated storyboards from short stories", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a story into scenes and draw each one
    Draw {
        /// Story text file, or `-` for stdin
        #[arg(long)]
        story: PathBuf,

        /// Directory to write scene images and storyboard.json into
        #[arg(long)]
        out: Option<PathBuf>,

        /// Rounds of redrawing failed scenes before giving up
        #[arg(long, default_value = "0")]
        retry_failed: u32,

        /// Rate limit tier from the configuration (e.g. free, payasyougo)
        #[arg(long)]
        tier: Option<String>,
    },

    /// Print the scene split as JSON without drawing
    Analyze {
        /// Story text file, or `-` for stdin
        #[arg(long)]
        story: PathBuf,

        /// Rate limit tier from the configuration (e.g. free, payasyougo)
        #[arg(long)]
        tier: Option<String>,
    },
}
