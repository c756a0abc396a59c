//! Story input.

use hikayat::{HikayatResult, StorageError, StorageErrorKind, StoryText};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Read a story from `source`, or from stdin when it is `-`.
pub async fn read_story(source: &Path) -> HikayatResult<StoryText> {
    let text = if source.as_os_str() == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "Failed to read story from stdin: {}",
                    e
                )))
            })?;
        text
    } else {
        tokio::fs::read_to_string(source).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "Failed to read story from {}: {}",
                source.display(),
                e
            )))
        })?
    };

    let story = StoryText::new(text)?;
    debug!(chars = story.char_count(), "Story loaded");
    Ok(story)
}
