pub mod desk;
pub mod frame;
pub mod squat;
pub mod thresholds;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pose::{Landmark, LandmarkSet};

pub use frame::{evaluate_frame, evaluate_frame_at, EvaluationError, FrameOutcome};

use thresholds::{DESK_ISSUE_PENALTY, MAX_SCORE, SQUAT_ISSUE_PENALTY};

const ANALYSIS_ERROR_FEEDBACK: &str =
    "Unable to analyze posture. Make sure your whole body is visible to the camera";

/// 評価対象の姿勢
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostureType {
    Squat,
    Desk,
}

impl PostureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostureType::Squat => "squat",
            PostureType::Desk => "desk",
        }
    }

    /// 問題1件あたりの減点
    pub fn issue_penalty(&self) -> u32 {
        match self {
            PostureType::Squat => SQUAT_ISSUE_PENALTY,
            PostureType::Desk => DESK_ISSUE_PENALTY,
        }
    }

    /// 問題件数からスコアを算出（0未満にはならない）
    pub fn score(&self, issue_count: usize) -> u32 {
        let count = u32::try_from(issue_count).unwrap_or(u32::MAX);
        MAX_SCORE.saturating_sub(self.issue_penalty().saturating_mul(count))
    }
}

impl FromStr for PostureType {
    type Err = EvaluationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "squat" => Ok(PostureType::Squat),
            "desk" => Ok(PostureType::Desk),
            other => Err(EvaluationError::InvalidPostureType(other.to_string())),
        }
    }
}

impl fmt::Display for PostureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 検出された姿勢の問題
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Issue {
    KneeOverToe,
    BackAnglePoor,
    NeckForward,
    UnevenShoulders,
    Slouching,
    HeadForward,
    AnalysisError,
}

impl Issue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Issue::KneeOverToe => "knee_over_toe",
            Issue::BackAnglePoor => "back_angle_poor",
            Issue::NeckForward => "neck_forward",
            Issue::UnevenShoulders => "uneven_shoulders",
            Issue::Slouching => "slouching",
            Issue::HeadForward => "head_forward",
            Issue::AnalysisError => "analysis_error",
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 評価器が出力する問題とフィードバック（出力順を保持）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Findings {
    pub issues: Vec<Issue>,
    pub feedback: Vec<String>,
}

impl Findings {
    /// 問題とそのフィードバックを追加
    pub fn flag(&mut self, issue: Issue, feedback: &str) {
        self.issues.push(issue);
        self.feedback.push(feedback.to_string());
    }

    /// スコアに影響しないフィードバックのみ追加
    pub fn note(&mut self, feedback: &str) {
        self.feedback.push(feedback.to_string());
    }

    /// ランドマークが不正な場合の結果
    pub fn analysis_error() -> Self {
        let mut findings = Self::default();
        findings.flag(Issue::AnalysisError, ANALYSIS_ERROR_FEEDBACK);
        findings
    }
}

/// 1フレームの評価結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    pub posture_type: PostureType,
    pub issues: Vec<Issue>,
    pub feedback: Vec<String>,
    pub score: u32,
    pub timestamp: DateTime<Utc>,
}

impl FrameAnalysis {
    pub fn new(posture_type: PostureType, findings: Findings, timestamp: DateTime<Utc>) -> Self {
        let score = posture_type.score(findings.issues.len());
        Self {
            posture_type,
            issues: findings.issues,
            feedback: findings.feedback,
            score,
            timestamp,
        }
    }
}

/// ランドマークを検証し、指定姿勢の評価器で判定する
///
/// 検証に失敗した場合は `analysis_error` 1件の結果になる
pub fn evaluate(
    posture_type: PostureType,
    landmarks: &[Landmark],
    timestamp: DateTime<Utc>,
) -> FrameAnalysis {
    let findings = match LandmarkSet::from_slice(landmarks) {
        Ok(set) => match posture_type {
            PostureType::Squat => squat::evaluate(&set),
            PostureType::Desk => desk::evaluate(&set),
        },
        Err(_) => Findings::analysis_error(),
    };
    FrameAnalysis::new(posture_type, findings, timestamp)
}

#[cfg(test)]
pub(crate) fn make_set(points: &[(crate::pose::LandmarkIndex, f32, f32)]) -> LandmarkSet {
    use crate::pose::LandmarkIndex;

    let mut raw = [Landmark::at(0.5, 0.5); LandmarkIndex::COUNT];
    for &(index, x, y) in points {
        raw[index as usize] = Landmark::at(x, y);
    }
    LandmarkSet::new(raw)
}
