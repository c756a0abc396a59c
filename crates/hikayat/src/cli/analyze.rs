//! Analyze command handler.

use super::collaborators;
use super::input::read_story;
use hikayat::{HikayatConfig, HikayatResult, JsonError, StoryAnalyzer};
use std::path::Path;
use tracing::instrument;

/// Split the story into scenes and print them as pretty JSON.
#[instrument(skip_all, fields(story = %story.display()))]
pub async fn analyze_story(story: &Path, tier: Option<&str>) -> HikayatResult<()> {
    let text = read_story(story).await?;
    let config = HikayatConfig::load()?;
    let (analyzer, _) = collaborators(&config, tier)?;

    let analysis = analyzer.analyze(&text).await?;

    let json = serde_json::to_string_pretty(&analysis)
        .map_err(|e| JsonError::new(format!("Failed to serialize analysis: {}", e)))?;
    println!("{}", json);

    Ok(())
}
