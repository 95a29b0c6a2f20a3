use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::landmark::Landmark;

/// 検出器に渡す生フレーム
#[derive(Debug, Clone, Default)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RawFrame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, data }
    }
}

/// 検出結果
///
/// `detected` が true の場合、`landmarks` は33点を持つ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
    pub detected: bool,
}

impl Detection {
    pub fn found(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks, detected: true }
    }

    pub fn none() -> Self {
        Self { landmarks: Vec::new(), detected: false }
    }
}

/// フレームからランドマークを得る外部の検出器
pub trait PoseDetector {
    fn detect(&mut self, frame: &RawFrame) -> Result<Detection>;
}

/// 事前に用意した検出結果を順番に返す検出器
///
/// 末尾まで進んだら先頭に戻る
pub struct ScriptedDetector {
    script: Vec<Detection>,
    cursor: usize,
}

impl ScriptedDetector {
    pub fn new(script: Vec<Detection>) -> Self {
        Self { script, cursor: 0 }
    }

    /// 呼び出し回数
    pub fn calls(&self) -> usize {
        self.cursor
    }
}

impl PoseDetector for ScriptedDetector {
    fn detect(&mut self, _frame: &RawFrame) -> Result<Detection> {
        if self.script.is_empty() {
            bail!("scripted detector has no detections");
        }
        let detection = self.script[self.cursor % self.script.len()].clone();
        self.cursor += 1;
        Ok(detection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_detector_cycles() {
        let mut detector = ScriptedDetector::new(vec![
            Detection::found(vec![Landmark::at(0.1, 0.2)]),
            Detection::none(),
        ]);
        let frame = RawFrame::default();

        assert!(detector.detect(&frame).unwrap().detected);
        assert!(!detector.detect(&frame).unwrap().detected);
        assert!(detector.detect(&frame).unwrap().detected);
        assert_eq!(detector.calls(), 3);
    }

    #[test]
    fn test_scripted_detector_empty_script() {
        let mut detector = ScriptedDetector::new(Vec::new());
        assert!(detector.detect(&RawFrame::default()).is_err());
    }

    #[test]
    fn test_detection_json_without_landmarks() {
        let detection: Detection = serde_json::from_str(r#"{"detected": false}"#).unwrap();
        assert_eq!(detection, Detection::none());
    }
}
