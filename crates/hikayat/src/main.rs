//! Hikayat CLI binary.
//!
//! This binary provides command-line access to Hikayat:
//! - Draw a storyboard from a story file or stdin
//! - Inspect the scene split without drawing anything

use clap::Parser;
use std::process::ExitCode;

mod cli;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, DrawOptions, analyze_story, draw_story};

    // GEMINI_API_KEY may live in a .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    hikayat::init_console_telemetry(cli.verbose)?;

    let code = match cli.command {
        Commands::Draw {
            story,
            out,
            retry_failed,
            tier,
        } => {
            let options = DrawOptions { out, retry_failed };
            draw_story(&story, tier.as_deref(), options).await?
        }

        Commands::Analyze { story, tier } => {
            analyze_story(&story, tier.as_deref()).await?;
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}
