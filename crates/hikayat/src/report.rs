//! Console views of a storyboard: progress lines and the final summary.

use hikayat_core::{SceneId, SceneStatusKind};
use hikayat_storyboard::{Epoch, SceneBoard};
use std::collections::BTreeMap;
use std::fmt::Write;

const SEGMENT_WIDTH: usize = 32;

/// A scene reached a state not reported before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("scene {:02} (attempt {}): {}", id.get(), attempt, status)]
pub struct SceneChange {
    /// Scene id
    pub id: SceneId,
    /// Render attempt the state belongs to
    pub attempt: u32,
    /// New status
    pub status: SceneStatusKind,
}

/// Remembers what was last reported for each scene.
///
/// A new submission resets it.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    epoch: Epoch,
    reported: BTreeMap<SceneId, (u32, SceneStatusKind)>,
}

impl ProgressTracker {
    /// Tracker that has reported nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Changes since the previous call, in scene order.
    pub fn observe(&mut self, board: &SceneBoard) -> Vec<SceneChange> {
        if board.epoch() != self.epoch {
            self.epoch = board.epoch();
            self.reported.clear();
        }

        board
            .scenes()
            .filter_map(|scene| {
                let state = (*scene.attempt(), scene.status_kind());
                let previous = self.reported.insert(*scene.id(), state);
                (previous != Some(state)).then_some(SceneChange {
                    id: *scene.id(),
                    attempt: state.0,
                    status: state.1,
                })
            })
            .collect()
    }
}

fn shorten(text: &str, width: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(width).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

/// Table of every scene with its status, plus a totals line.
///
/// A board showing a general error renders as that error alone.
pub fn summary_table(board: &SceneBoard) -> String {
    if let Some(error) = board.general_error() {
        return format!("{}\n", error);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6} {:<8} {:<8} {:<width$} DETAIL",
        "SCENE",
        "STATUS",
        "ATTEMPT",
        "SEGMENT",
        width = SEGMENT_WIDTH + 1
    );

    for scene in board.scenes() {
        let detail = match (scene.image_artifact(), scene.error_note()) {
            (Some(image), _) => format!("{}, {} bytes", image.mime(), image.len()),
            (None, Some(note)) => note.to_string(),
            (None, None) => "-".to_string(),
        };
        let _ = writeln!(
            out,
            "{:<6} {:<8} {:<8} {:<width$} {}",
            format!("{:02}", scene.id().get()),
            scene.status_kind().to_string(),
            scene.attempt(),
            shorten(scene.narrative_segment(), SEGMENT_WIDTH),
            detail,
            width = SEGMENT_WIDTH + 1
        );
    }

    let _ = writeln!(
        out,
        "{} ready, {} failed, {} pending",
        board.count(SceneStatusKind::Ready),
        board.count(SceneStatusKind::Failed),
        board.count(SceneStatusKind::Pending)
    );
    out
}
