use crate::analysis::{evaluate_frame_at, FrameOutcome, PostureType};
use crate::pose::Detection;

use super::{FrameRecord, SessionError, SessionSummary, SessionTally};

/// 1セッション分のフレーム結果を集計する
///
/// 評価に失敗したフレームは集計せず件数のみ数える。
/// `streaming` で作った場合はフレームを保持せず、集計値のみ更新する。
pub struct SessionRecorder {
    posture_type: PostureType,
    next_frame: u64,
    tally: SessionTally,
    records: Option<Vec<FrameRecord>>,
    failed_frames: usize,
}

impl SessionRecorder {
    /// フレーム結果を全て保持する
    pub fn new(posture_type: PostureType) -> Self {
        Self::with_records(posture_type, Some(Vec::new()))
    }

    /// 長時間の配信向け: メモリ使用量はフレーム数に依存しない
    pub fn streaming(posture_type: PostureType) -> Self {
        Self::with_records(posture_type, None)
    }

    fn with_records(posture_type: PostureType, records: Option<Vec<FrameRecord>>) -> Self {
        Self {
            posture_type,
            next_frame: 0,
            tally: SessionTally::default(),
            records,
            failed_frames: 0,
        }
    }

    pub fn posture_type(&self) -> PostureType {
        self.posture_type
    }

    /// フレーム番号を指定して評価・記録
    pub fn record(&mut self, frame_number: u64, timestamp: f64, detection: &Detection) -> FrameOutcome {
        let outcome = evaluate_frame_at(detection, self.posture_type.as_str(), chrono::Utc::now());
        match &outcome.analysis {
            Some(analysis) => {
                self.tally.add(analysis);
                if let Some(records) = self.records.as_mut() {
                    records.push(FrameRecord {
                        frame_number,
                        timestamp,
                        analysis: analysis.clone(),
                    });
                }
            }
            None => self.failed_frames += 1,
        }
        self.next_frame = self.next_frame.max(frame_number.saturating_add(1));
        outcome
    }

    /// 直前のフレームの次の番号で記録
    pub fn record_next(&mut self, timestamp: f64, detection: &Detection) -> (u64, FrameOutcome) {
        let frame_number = self.next_frame;
        let outcome = self.record(frame_number, timestamp, detection);
        (frame_number, outcome)
    }

    /// 保持しているフレーム（`streaming` では常に空）
    pub fn records(&self) -> &[FrameRecord] {
        self.records.as_deref().unwrap_or(&[])
    }

    /// 集計済みのフレーム数
    pub fn frame_count(&self) -> usize {
        self.tally.frame_count()
    }

    pub fn failed_frames(&self) -> usize {
        self.failed_frames
    }

    pub fn summarize(&self) -> Result<SessionSummary, SessionError> {
        self.tally.summary()
    }

    pub fn into_records(self) -> Vec<FrameRecord> {
        self.records.unwrap_or_default()
    }
}
