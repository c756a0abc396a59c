//! Progress lines and summary table.

use async_trait::async_trait;
use hikayat::{
    GeminiError, GeminiErrorKind, HikayatResult, ImageArtifact, ImageRenderer, ProgressTracker,
    SceneChange, SceneId, SceneOutline, SceneStatusKind, StoryAnalysis, StoryAnalyzer, StoryText,
    Storyboard, messages, summary_table,
};
use std::sync::Arc;

struct FixedAnalyzer {
    scenes: usize,
    fail: bool,
}

#[async_trait]
impl StoryAnalyzer for FixedAnalyzer {
    async fn analyze(&self, _story: &StoryText) -> HikayatResult<StoryAnalysis> {
        if self.fail {
            return Err(GeminiError::new(GeminiErrorKind::InvalidResponse(
                "empty body".to_string(),
            ))
            .into());
        }
        Ok(StoryAnalysis::new(
            (1..=self.scenes)
                .map(|n| SceneOutline {
                    narrative_segment: format!("segment {}", n),
                    visual_prompt: format!("prompt {}", n),
                    characters: "Karim".to_string(),
                })
                .collect(),
        ))
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}

/// Fails every prompt ending in an even number.
struct EvenFailRenderer;

#[async_trait]
impl ImageRenderer for EvenFailRenderer {
    async fn render(&self, visual_prompt: &str) -> HikayatResult<ImageArtifact> {
        let even = visual_prompt
            .rsplit(' ')
            .next()
            .and_then(|n| n.parse::<u32>().ok())
            .is_some_and(|n| n % 2 == 0);
        if even {
            return Err(GeminiError::new(GeminiErrorKind::NoImageData("test".to_string())).into());
        }
        Ok(ImageArtifact::new("image/png", vec![0u8; 10]))
    }

    fn model_name(&self) -> &str {
        "even-fail"
    }
}

fn storyboard(scenes: usize, fail: bool) -> Storyboard {
    Storyboard::new(
        Arc::new(FixedAnalyzer { scenes, fail }),
        Arc::new(EvenFailRenderer),
    )
}

fn story() -> StoryText {
    StoryText::new("كان يا ما كان").expect("story")
}

#[test]
fn test_scene_change_display() {
    let change = SceneChange {
        id: SceneId::from(3),
        attempt: 2,
        status: SceneStatusKind::Ready,
    };
    assert_eq!(change.to_string(), "scene 03 (attempt 2): ready");
}

#[tokio::test]
async fn test_progress_reports_each_state_once() {
    let storyboard = storyboard(3, false);
    let mut tracker = ProgressTracker::new();
    assert!(tracker.observe(&storyboard.snapshot()).is_empty());

    let submission = storyboard.submit_story(story()).await;
    let pending = tracker.observe(&storyboard.snapshot());
    assert_eq!(pending.len(), 3);
    assert!(pending.iter().all(|c| c.status == SceneStatusKind::Pending));
    assert!(tracker.observe(&storyboard.snapshot()).is_empty());

    submission.settle().await;
    let settled = tracker.observe(&storyboard.snapshot());
    let statuses: Vec<_> = settled.iter().map(|c| (c.id.get(), c.status)).collect();
    assert_eq!(
        statuses,
        vec![
            (1, SceneStatusKind::Ready),
            (2, SceneStatusKind::Failed),
            (3, SceneStatusKind::Ready),
        ]
    );
}

#[tokio::test]
async fn test_progress_reports_retry_of_same_status() {
    let storyboard = storyboard(2, false);
    let mut tracker = ProgressTracker::new();

    storyboard.submit_story(story()).await.settle().await;
    tracker.observe(&storyboard.snapshot());

    // Scene 2 fails again; the new attempt still counts as a change.
    let handle = storyboard.retry_scene(SceneId::from(2)).expect("scene 2");
    handle.await.expect("retry task");
    let changes = tracker.observe(&storyboard.snapshot());
    assert_eq!(
        changes,
        vec![SceneChange {
            id: SceneId::from(2),
            attempt: 2,
            status: SceneStatusKind::Failed,
        }]
    );
}

#[tokio::test]
async fn test_progress_resets_on_new_submission() {
    let storyboard = storyboard(1, false);
    let mut tracker = ProgressTracker::new();

    storyboard.submit_story(story()).await.settle().await;
    assert_eq!(tracker.observe(&storyboard.snapshot()).len(), 1);

    storyboard.submit_story(story()).await.settle().await;
    assert_eq!(tracker.observe(&storyboard.snapshot()).len(), 1);
}

#[tokio::test]
async fn test_summary_table_lists_every_scene() {
    let storyboard = storyboard(4, false);
    storyboard.submit_story(story()).await.settle().await;

    let table = summary_table(&storyboard.snapshot());
    let lines: Vec<&str> = table.lines().collect();

    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("SCENE"));
    assert!(lines[1].starts_with("01"));
    assert!(lines[1].contains("ready"));
    assert!(lines[1].contains("image/png, 10 bytes"));
    assert!(lines[2].contains("failed"));
    assert!(lines[2].contains(messages::RENDER_FAILED));
    assert_eq!(lines[5], "2 ready, 2 failed, 0 pending");
}

#[tokio::test]
async fn test_summary_table_shows_general_error() {
    let storyboard = storyboard(3, true);
    storyboard.submit_story(story()).await;

    let table = summary_table(&storyboard.snapshot());
    assert_eq!(table.trim_end(), messages::ANALYSIS_FAILED);
}
