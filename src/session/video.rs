use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::PostureType;
use crate::config::SessionConfig;
use crate::pose::{PoseDetector, RawFrame};

use super::{FrameRecord, SessionRecorder, SessionSummary};

/// 動画解析の設定
#[derive(Debug, Clone, Copy)]
pub struct VideoOptions {
    /// Nフレームごとに解析
    pub sample_interval: u64,
    pub fps: f64,
}

impl VideoOptions {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            sample_interval: config.sample_interval,
            fps: config.fps,
        }
    }
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoReport {
    pub posture_type: PostureType,
    pub frames: Vec<FrameRecord>,
    /// 姿勢が検出できなかったサンプルフレーム数
    pub skipped_frames: usize,
    pub summary: SessionSummary,
}

/// 動画の各サンプルフレームを検出・評価して集計する
pub fn analyze_video<D, I>(
    detector: &mut D,
    frames: I,
    posture_type: PostureType,
    options: &VideoOptions,
) -> Result<VideoReport>
where
    D: PoseDetector,
    I: IntoIterator<Item = RawFrame>,
{
    if !(options.fps > 0.0) {
        bail!("fps must be positive, got {}", options.fps);
    }
    let interval = options.sample_interval.max(1);

    let mut recorder = SessionRecorder::new(posture_type);
    for (index, frame) in frames.into_iter().enumerate() {
        let frame_number = index as u64;
        if frame_number % interval != 0 {
            continue;
        }
        let detection = detector
            .detect(&frame)
            .with_context(|| format!("pose detection failed at frame {}", frame_number))?;
        recorder.record(frame_number, frame_number as f64 / options.fps, &detection);
    }

    let summary = recorder
        .summarize()
        .context("video has no frame with a detected pose")?;

    Ok(VideoReport {
        posture_type,
        skipped_frames: recorder.failed_frames(),
        frames: recorder.into_records(),
        summary,
    })
}
