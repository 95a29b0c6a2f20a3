use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pose::{Detection, Landmark};

use super::{evaluate, FrameAnalysis, PostureType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("No pose detected in frame")]
    NoPoseDetected,
    #[error("Invalid analysis type '{0}': expected 'squat' or 'desk'")]
    InvalidPostureType(String),
}

/// 1フレーム分の評価結果（失敗もデータとして表す）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameOutcome {
    pub success: bool,
    pub landmarks: Option<Vec<Landmark>>,
    pub analysis: Option<FrameAnalysis>,
    pub error: Option<String>,
    /// 要求された姿勢種別（不正な値もそのまま返す）
    pub analysis_type: String,
}

impl FrameOutcome {
    fn succeeded(landmarks: Vec<Landmark>, analysis: FrameAnalysis, analysis_type: &str) -> Self {
        Self {
            success: true,
            landmarks: Some(landmarks),
            analysis: Some(analysis),
            error: None,
            analysis_type: analysis_type.to_string(),
        }
    }

    fn failed(error: &EvaluationError, analysis_type: &str) -> Self {
        Self {
            success: false,
            landmarks: None,
            analysis: None,
            error: Some(error.to_string()),
            analysis_type: analysis_type.to_string(),
        }
    }
}

/// 検出結果を指定姿勢で評価する
pub fn evaluate_frame(detection: &Detection, posture_type: &str) -> FrameOutcome {
    evaluate_frame_at(detection, posture_type, Utc::now())
}

/// タイムスタンプを指定して評価する
pub fn evaluate_frame_at(
    detection: &Detection,
    posture_type: &str,
    timestamp: DateTime<Utc>,
) -> FrameOutcome {
    match dispatch(detection, posture_type, timestamp) {
        Ok(analysis) => FrameOutcome::succeeded(detection.landmarks.clone(), analysis, posture_type),
        Err(e) => FrameOutcome::failed(&e, posture_type),
    }
}

fn dispatch(
    detection: &Detection,
    posture_type: &str,
    timestamp: DateTime<Utc>,
) -> Result<FrameAnalysis, EvaluationError> {
    if !detection.detected {
        return Err(EvaluationError::NoPoseDetected);
    }
    let posture: PostureType = posture_type.parse()?;
    Ok(evaluate(posture, &detection.landmarks, timestamp))
}
