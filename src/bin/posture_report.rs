//! Offline report: evaluates recorded detections and prints the per-frame
//! results and the session summary as JSON.
//!
//! Usage: posture_report <detections.json> [squat|desk]
//!
//! The input file is a JSON array of `{"landmarks": [...], "detected": bool}`.

use std::fs;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use posture_coach::analysis::{FrameOutcome, PostureType};
use posture_coach::config::Config;
use posture_coach::pose::Detection;
use posture_coach::session::{SessionRecorder, SessionSummary};

const CONFIG_PATH: &str = "posture.toml";

#[derive(Serialize)]
struct FrameLine {
    frame_number: u64,
    timestamp: f64,
    outcome: FrameOutcome,
}

#[derive(Serialize)]
struct Report {
    posture_type: PostureType,
    frames: Vec<FrameLine>,
    skipped_frames: usize,
    summary: SessionSummary,
}

fn build_report(detections: &[Detection], posture_type: PostureType, fps: f64) -> Result<Report> {
    if !(fps > 0.0) {
        bail!("fps must be positive, got {}", fps);
    }

    let mut recorder = SessionRecorder::new(posture_type);
    let frames = detections
        .iter()
        .enumerate()
        .map(|(index, detection)| {
            let timestamp = index as f64 / fps;
            let (frame_number, outcome) = recorder.record_next(timestamp, detection);
            FrameLine { frame_number, timestamp, outcome }
        })
        .collect();

    let summary = recorder.summarize().context("no frame with a detected pose")?;
    Ok(Report {
        posture_type,
        frames,
        skipped_frames: recorder.failed_frames(),
        summary,
    })
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else {
        bail!("usage: posture_report <detections.json> [squat|desk]");
    };
    let config = Config::load_or_default(CONFIG_PATH);
    let posture_arg = args.next().unwrap_or(config.session.default_posture);
    let posture_type: PostureType = posture_arg.parse()?;

    let content = fs::read_to_string(&input).with_context(|| format!("Failed to read {}", input))?;
    let detections: Vec<Detection> =
        serde_json::from_str(&content).with_context(|| format!("Invalid detections in {}", input))?;
    eprintln!("{}: {} frames, posture={}", input, detections.len(), posture_type);

    let report = build_report(&detections, posture_type, config.session.fps)?;
    eprintln!(
        "average score {} ({}), {} issues, {} skipped",
        report.summary.average_score,
        report.summary.overall_rating,
        report.summary.total_issues,
        report.skipped_frames
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use posture_coach::pose::{Landmark, LandmarkIndex};

    #[test]
    fn test_build_report() {
        let detections = vec![
            Detection::found(vec![Landmark::at(0.5, 0.5); LandmarkIndex::COUNT]),
            Detection::none(),
            Detection::found(Vec::new()),
        ];
        let report = build_report(&detections, PostureType::Squat, 10.0).unwrap();
        assert_eq!(report.frames.len(), 3);
        assert_eq!(report.skipped_frames, 1);
        assert_eq!(report.summary.frame_count, 2);
        assert!((report.frames[2].timestamp - 0.2).abs() < 1e-9);
        assert!(!report.frames[1].outcome.success);
    }

    #[test]
    fn test_build_report_without_detections() {
        assert!(build_report(&[Detection::none()], PostureType::Desk, 30.0).is_err());
        assert!(build_report(&[], PostureType::Desk, 30.0).is_err());
    }
}
