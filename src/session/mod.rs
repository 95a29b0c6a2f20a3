pub mod recorder;
pub mod video;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::thresholds::{RATING_EXCELLENT_MIN, RATING_FAIR_MIN, RATING_GOOD_MIN};
use crate::analysis::{FrameAnalysis, Issue};

pub use recorder::SessionRecorder;
pub use video::{analyze_video, VideoOptions, VideoReport};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot summarize a session without analyzed frames")]
    Empty,
}

/// 総合評価
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl OverallRating {
    /// 平均スコアから評価を決める（下限を含む）
    pub fn from_score(average_score: u32) -> Self {
        if average_score >= RATING_EXCELLENT_MIN {
            OverallRating::Excellent
        } else if average_score >= RATING_GOOD_MIN {
            OverallRating::Good
        } else if average_score >= RATING_FAIR_MIN {
            OverallRating::Fair
        } else {
            OverallRating::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OverallRating::Excellent => "Excellent",
            OverallRating::Good => "Good",
            OverallRating::Fair => "Fair",
            OverallRating::Poor => "Poor",
        }
    }
}

impl fmt::Display for OverallRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// セッション内の1フレーム
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub frame_number: u64,
    /// セッション開始からの秒数
    pub timestamp: f64,
    pub analysis: FrameAnalysis,
}

/// セッション全体の集計
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub frame_count: usize,
    pub average_score: u32,
    pub total_issues: usize,
    pub issue_types: BTreeSet<Issue>,
    pub overall_rating: OverallRating,
}

/// フレームを保持せずに集計する途中経過
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionTally {
    frame_count: usize,
    score_sum: u64,
    total_issues: usize,
    issue_types: BTreeSet<Issue>,
}

impl SessionTally {
    pub fn add(&mut self, analysis: &FrameAnalysis) {
        self.frame_count += 1;
        self.score_sum += u64::from(analysis.score);
        self.total_issues += analysis.issues.len();
        self.issue_types.extend(analysis.issues.iter().copied());
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// 空の場合は `SessionError::Empty`
    pub fn summary(&self) -> Result<SessionSummary, SessionError> {
        if self.frame_count == 0 {
            return Err(SessionError::Empty);
        }
        let average_score = (self.score_sum as f64 / self.frame_count as f64).round() as u32;
        Ok(SessionSummary {
            frame_count: self.frame_count,
            average_score,
            total_issues: self.total_issues,
            issue_types: self.issue_types.clone(),
            overall_rating: OverallRating::from_score(average_score),
        })
    }
}

/// フレーム結果を集計する
///
/// 集計値はフレーム順に依存しない。空の場合は `SessionError::Empty`。
pub fn summarize(records: &[FrameRecord]) -> Result<SessionSummary, SessionError> {
    let mut tally = SessionTally::default();
    for record in records {
        tally.add(&record.analysis);
    }
    tally.summary()
}

#[cfg(test)]
pub(crate) fn record(frame_number: u64, score: u32, issues: Vec<Issue>) -> FrameRecord {
    use crate::analysis::PostureType;

    FrameRecord {
        frame_number,
        timestamp: frame_number as f64 / 30.0,
        analysis: FrameAnalysis {
            posture_type: PostureType::Desk,
            feedback: issues.iter().map(|i| i.to_string()).collect(),
            issues,
            score,
            timestamp: chrono::Utc::now(),
        },
    }
}
