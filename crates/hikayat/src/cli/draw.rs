//! Draw command handler.

use super::collaborators;
use super::input::read_story;
use hikayat::{
    HikayatConfig, HikayatResult, ProgressTracker, SceneBoard, Storyboard, export_storyboard,
    summary_table,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

/// Options for `hikayat draw`.
#[derive(Debug, Clone, Default)]
pub struct DrawOptions {
    /// Export directory, if any
    pub out: Option<PathBuf>,
    /// Rounds of redrawing failed scenes
    pub retry_failed: u32,
}

/// Print a line per scene state change until told to stop.
///
/// On stop, the board as it is then is reported before returning.
fn spawn_progress(storyboard: &Storyboard) -> (oneshot::Sender<()>, JoinHandle<()>) {
    let mut receiver = storyboard.subscribe();
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let mut tracker = ProgressTracker::new();
        loop {
            let stopping = tokio::select! {
                changed = receiver.changed() => changed.is_err(),
                _ = &mut stop_rx => true,
            };

            let changes = tracker.observe(&receiver.borrow_and_update());
            for change in changes {
                println!("  {}", change);
            }

            if stopping {
                break;
            }
        }
    });

    (stop_tx, handle)
}

/// Redraw failed scenes, one round at a time, until none fail or rounds run out.
async fn retry_failed(storyboard: &Storyboard, mut board: SceneBoard, rounds: u32) -> SceneBoard {
    for round in 1..=rounds {
        let failed = board.failed_ids();
        if failed.is_empty() {
            break;
        }

        info!(round, scenes = failed.len(), "Redrawing failed scenes");
        let handles: Vec<_> = failed
            .into_iter()
            .filter_map(|id| storyboard.retry_scene(id))
            .collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Retry task did not complete");
            }
        }

        board = storyboard.wait_until_settled().await;
    }
    board
}

/// Draw every scene of the story, print a summary, optionally export.
///
/// Exits with failure when the story could not be analyzed.
#[instrument(skip_all, fields(story = %story.display(), retry_failed = options.retry_failed))]
pub async fn draw_story(
    story: &Path,
    tier: Option<&str>,
    options: DrawOptions,
) -> HikayatResult<ExitCode> {
    let text = read_story(story).await?;
    let config = HikayatConfig::load()?;
    let (analyzer, renderer) = collaborators(&config, tier)?;
    let storyboard = Storyboard::with_options(analyzer, renderer, config.storyboard.into());

    let (stop_progress, progress) = spawn_progress(&storyboard);

    println!("Analyzing story ({} characters)...", text.char_count());
    let submission = storyboard.submit_story(text).await;
    info!(outcome = %submission.outcome(), "Submission analyzed");

    let board = storyboard.wait_until_settled().await;
    let board = retry_failed(&storyboard, board, options.retry_failed).await;

    let _ = stop_progress.send(());
    if let Err(e) = progress.await {
        warn!(error = %e, "Progress printer did not complete");
    }

    if let Some(error) = board.general_error() {
        eprintln!("{}", error);
        return Ok(ExitCode::FAILURE);
    }

    println!();
    print!("{}", summary_table(&board));

    if let Some(out) = &options.out {
        let manifest = export_storyboard(&board, out).await?;
        let images = manifest
            .scenes()
            .iter()
            .filter(|entry| entry.file().is_some())
            .count();
        println!(
            "Exported {} images and {} to {}",
            images,
            hikayat::MANIFEST_FILE,
            out.display()
        );
    }

    Ok(ExitCode::SUCCESS)
}
