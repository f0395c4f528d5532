/// Integration tests for AnalysisPipeline
///
/// Tests cover:
/// - Full session with overlays and upload payload
/// - Degradation when the landmark model cannot be acquired
/// - Aborting on unreadable video
/// - Cancellation mid-batch
mod common;

use assert_matches::assert_matches;
use common::{init_test_logging, pose_with_knee_angle, FakeVideo, ScriptedLoader, Step};
use pose_coach::config::AnalysisConfig;
use pose_coach::errors::{AnalysisError, ExtractionError};
use pose_coach::models::Discipline;
use pose_coach::services::{AnalysisPipeline, AnalysisProgress, NO_POSE_DATA_SUMMARY};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn test_config() -> AnalysisConfig {
    AnalysisConfig {
        frame_count: 10,
        frame_width: 160,
        frame_height: 120,
        ..Default::default()
    }
}

fn knee_script() -> Vec<Step> {
    (0..10)
        .map(|i| match i {
            3 => Step::Nothing,
            i if i < 5 => Step::Body(pose_with_knee_angle(95.0)),
            _ => Step::Body(pose_with_knee_angle(160.0)),
        })
        .collect()
}

#[tokio::test]
async fn test_full_session() {
    init_test_logging();
    let pipeline = AnalysisPipeline::new(&test_config());
    let mut video = FakeVideo::new(8.0).playing_at(2.0);
    let loader = ScriptedLoader::Ready(knee_script());
    let mut events = Vec::new();

    let analysis = pipeline
        .run(&mut video, &loader, Discipline::Football, &CancellationToken::new(), |event| {
            events.push(event)
        })
        .await
        .unwrap();

    assert!(analysis.pose_detection_available);
    assert!(analysis.warnings.is_empty());
    assert_eq!(analysis.frames.len(), 10);
    assert_eq!(analysis.annotated_frames.len(), 10);
    assert_eq!(analysis.pose_data.len(), 9);
    assert!(analysis.summary.contains("plant leg too bent"));
    assert!(analysis.summary.contains("plant leg too straight"));

    // Frame 3 had no body and is left untouched; the others carry a skeleton
    assert_eq!(analysis.annotated_frames[3].image, analysis.frames[3].image);
    assert_ne!(analysis.annotated_frames[0].image, analysis.frames[0].image);

    // Player is handed back where the user left it
    assert_eq!(video.position, 2.0);
    assert!(!video.paused);

    let detecting: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            AnalysisProgress::DetectingPoses { current, total: 10 } => Some(*current),
            _ => None,
        })
        .collect();
    assert_eq!(detecting, (1..=10).collect::<Vec<_>>());
    assert_eq!(events.first(), Some(&AnalysisProgress::ExtractingFrames { count: 10 }));
    assert_eq!(events.last(), Some(&AnalysisProgress::Summarizing));

    let payload = analysis.upload_payload();
    assert_eq!(payload.images.len(), 10);
    assert_eq!(payload.summary, analysis.summary);
}

#[tokio::test]
async fn test_report_serializes_without_images() {
    let pipeline = AnalysisPipeline::new(&test_config());
    let mut video = FakeVideo::new(8.0);
    let loader = ScriptedLoader::Ready(knee_script());

    let analysis = pipeline
        .run(&mut video, &loader, Discipline::Football, &CancellationToken::new(), |_| {})
        .await
        .unwrap();
    let json = serde_json::to_value(analysis.report()).unwrap();

    assert_eq!(json["discipline"], "football");
    assert_eq!(json["frameCount"], 10);
    assert_eq!(json["poseData"].as_array().unwrap().len(), 9);
    assert_eq!(json["poseData"][0]["frameNumber"], 0);
    assert_eq!(json["sessionId"], analysis.session_id.to_string());
}

#[tokio::test]
async fn test_degrades_when_model_fails_to_load() {
    let pipeline = AnalysisPipeline::new(&test_config());
    let mut video = FakeVideo::new(8.0);

    let analysis = pipeline
        .run(
            &mut video,
            &ScriptedLoader::Broken,
            Discipline::Boxing,
            &CancellationToken::new(),
            |_| {},
        )
        .await
        .unwrap();

    assert!(!analysis.pose_detection_available);
    assert!(analysis.pose_data.is_empty());
    assert_eq!(analysis.frames.len(), 10);
    assert_eq!(analysis.upload_payload().images.len(), 10);
    assert_eq!(analysis.summary, NO_POSE_DATA_SUMMARY);
    assert_eq!(analysis.warnings.len(), 1);
    assert!(analysis.warnings[0].starts_with("Pose detection unavailable"));
}

#[tokio::test(start_paused = true)]
async fn test_degrades_when_model_load_times_out() {
    let pipeline = AnalysisPipeline::new(&test_config());
    let mut video = FakeVideo::new(8.0);
    let loader = ScriptedLoader::Slow(Duration::from_secs(60));

    let analysis = pipeline
        .run(&mut video, &loader, Discipline::Football, &CancellationToken::new(), |_| {})
        .await
        .unwrap();

    assert!(!analysis.pose_detection_available);
    assert!(analysis.warnings[0].starts_with("Pose detection unavailable"));
}

#[tokio::test]
async fn test_unreadable_video_aborts() {
    let pipeline = AnalysisPipeline::new(&test_config());
    let mut video = FakeVideo::new(8.0);
    video.duration = None;

    let err = pipeline
        .run(
            &mut video,
            &ScriptedLoader::Ready(knee_script()),
            Discipline::Football,
            &CancellationToken::new(),
            |_| {},
        )
        .await
        .unwrap_err();

    assert_matches!(err, AnalysisError::Extraction(ExtractionError::DurationUnavailable));
    assert!(err.user_message().starts_with("Could not read video"));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_cancel_mid_batch() {
    let pipeline = AnalysisPipeline::new(&test_config());
    let mut video = FakeVideo::new(8.0);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    let result = pipeline
        .run(
            &mut video,
            &ScriptedLoader::Ready(knee_script()),
            Discipline::Football,
            &cancel,
            |event| {
                if let AnalysisProgress::DetectingPoses { current: 4, .. } = event {
                    trigger.cancel();
                }
            },
        )
        .await;

    assert_matches!(result, Err(AnalysisError::Cancelled));
}

#[tokio::test]
async fn test_no_body_anywhere_warns() {
    let pipeline = AnalysisPipeline::new(&test_config());
    let mut video = FakeVideo::new(8.0);

    let analysis = pipeline
        .run(
            &mut video,
            &ScriptedLoader::Ready(Vec::new()),
            Discipline::Generic,
            &CancellationToken::new(),
            |_| {},
        )
        .await
        .unwrap();

    assert!(analysis.pose_detection_available);
    assert_eq!(analysis.summary, NO_POSE_DATA_SUMMARY);
    assert_eq!(analysis.warnings, vec!["No body was detected in any analyzed frame."]);
}
