//! Writing a settled storyboard to disk.
//!
//! Layout:
//! ```text
//! out/
//! ├── scene-01.png
//! ├── scene-03.png
//! └── storyboard.json
//! ```
//! Only ready scenes get an image file; every scene gets a manifest entry.

use crate::SceneBoard;
use derive_getters::Getters;
use hikayat_core::{Scene, SceneId, SceneStatusKind};
use hikayat_error::{HikayatResult, StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Manifest file name inside the export directory.
pub const MANIFEST_FILE: &str = "storyboard.json";

/// One scene in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ManifestEntry {
    /// Scene id
    id: SceneId,
    /// Status at export time
    status: SceneStatusKind,
    /// Story excerpt
    narrative_segment: String,
    /// Character-consistency notes
    characters: String,
    /// Prompt sent to the image model
    visual_prompt: String,
    /// Error note of a failed scene
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_note: Option<String>,
    /// Image file name, relative to the manifest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    /// MIME type of the image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime: Option<String>,
    /// Hex SHA-256 of the image bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sha256: Option<String>,
}

/// Export manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct StoryboardManifest {
    /// Submission the scenes came from
    epoch: u64,
    /// Scenes in narrative order
    scenes: Vec<ManifestEntry>,
}

/// Image file name for a scene, e.g. `scene-03.png`.
pub fn scene_file_name(id: SceneId, extension: &str) -> String {
    format!("scene-{:02}.{}", id.get(), extension)
}

fn compute_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

fn entry_for(scene: &Scene) -> ManifestEntry {
    let image = scene.image_artifact();
    ManifestEntry {
        id: *scene.id(),
        status: scene.status_kind(),
        narrative_segment: scene.narrative_segment().clone(),
        characters: scene.characters().clone(),
        visual_prompt: scene.visual_prompt().clone(),
        error_note: scene.error_note().map(str::to_string),
        file: image.map(|a| scene_file_name(*scene.id(), a.file_extension())),
        mime: image.map(|a| a.mime().to_string()),
        sha256: image.map(|a| compute_hash(a.data())),
    }
}

/// Write every ready scene's image and a `storyboard.json` manifest into `dir`.
///
/// The directory is created if needed. Existing files with the same names are
/// replaced.
///
/// # Errors
///
/// Returns a [`StorageErrorKind`] error if the directory or a file cannot be
/// written, or the manifest cannot be serialized.
#[instrument(skip(board, dir), fields(dir = %dir.as_ref().display(), scenes = board.len()))]
pub async fn export_storyboard(
    board: &SceneBoard,
    dir: impl AsRef<Path>,
) -> HikayatResult<StoryboardManifest> {
    let dir = dir.as_ref();

    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        StorageError::new(StorageErrorKind::DirectoryCreation(format!(
            "Failed to create {}: {}",
            dir.display(),
            e
        )))
    })?;

    let mut entries = Vec::with_capacity(board.len());
    for scene in board.scenes() {
        let entry = entry_for(scene);
        if let (Some(artifact), Some(file)) = (scene.image_artifact(), entry.file.as_deref()) {
            write_atomic(&dir.join(file), artifact.data()).await?;
            debug!(scene_id = %scene.id(), file, bytes = artifact.len(), "Wrote scene image");
        }
        entries.push(entry);
    }

    let manifest = StoryboardManifest {
        epoch: board.epoch().get(),
        scenes: entries,
    };

    let json = serde_json::to_vec_pretty(&manifest).map_err(|e| {
        StorageError::new(StorageErrorKind::Serialization(format!(
            "Failed to serialize manifest: {}",
            e
        )))
    })?;
    write_atomic(&dir.join(MANIFEST_FILE), &json).await?;

    info!(
        images = manifest.scenes.iter().filter(|e| e.file.is_some()).count(),
        "Storyboard exported"
    );
    Ok(manifest)
}

/// Write through a temporary file and rename into place.
async fn write_atomic(path: &Path, data: &[u8]) -> HikayatResult<()> {
    let temp_path = path.with_extension("tmp");

    tokio::fs::write(&temp_path, data).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "Failed to write {}: {}",
            temp_path.display(),
            e
        )))
    })?;

    tokio::fs::rename(&temp_path, path).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "Failed to move {} into place: {}",
            path.display(),
            e
        )))
    })?;

    Ok(())
}
