use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 33点ボディモデルのランドマークインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    pub const COUNT: usize = 33;
}

/// 単一ランドマーク
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// 正規化X座標 (通常 0.0〜1.0、範囲外もあり得る)
    pub x: f32,
    /// 正規化Y座標 (下が正)
    pub y: f32,
    /// 腰を基準とした相対深度
    #[serde(default)]
    pub z: f32,
    /// 可視性 (0.0〜1.0)
    #[serde(default = "default_visibility")]
    pub visibility: f32,
}

fn default_visibility() -> f32 { 1.0 }

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self { x, y, z, visibility }
    }

    /// 2D座標のみ指定 (z=0, visibility=1)
    pub fn at(x: f32, y: f32) -> Self {
        Self::new(x, y, 0.0, 1.0)
    }

    /// Y方向にずらした合成点
    pub fn shifted_y(&self, dy: f32) -> Self {
        Self { y: self.y + dy, ..*self }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.visibility.is_finite()
    }
}

impl Default for Landmark {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LandmarkError {
    #[error("expected {expected} landmarks, got {actual}")]
    WrongCount { expected: usize, actual: usize },
    #[error("landmark {index} has non-finite coordinates")]
    NonFinite { index: usize },
}

/// 検証済みの33点ランドマーク
#[derive(Debug, Clone)]
pub struct LandmarkSet {
    landmarks: [Landmark; LandmarkIndex::COUNT],
}

impl LandmarkSet {
    pub fn new(landmarks: [Landmark; LandmarkIndex::COUNT]) -> Self {
        Self { landmarks }
    }

    /// 検出器の生配列をロール付きビューへ変換
    ///
    /// 点数が33でない、または座標が有限でない場合は失敗する。
    /// 評価器はこの変換を通ったセットしか受け取らない。
    pub fn from_slice(raw: &[Landmark]) -> Result<Self, LandmarkError> {
        let landmarks: [Landmark; LandmarkIndex::COUNT] =
            raw.try_into().map_err(|_| LandmarkError::WrongCount {
                expected: LandmarkIndex::COUNT,
                actual: raw.len(),
            })?;

        if let Some(index) = landmarks.iter().position(|lm| !lm.is_finite()) {
            return Err(LandmarkError::NonFinite { index });
        }

        Ok(Self { landmarks })
    }

    pub fn get(&self, index: LandmarkIndex) -> &Landmark {
        &self.landmarks[index as usize]
    }

    pub fn as_slice(&self) -> &[Landmark] {
        &self.landmarks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_index_count() {
        assert_eq!(LandmarkIndex::COUNT, 33);
        assert_eq!(LandmarkIndex::RightFootIndex as usize, 32);
    }

    #[test]
    fn test_from_slice_wrong_count() {
        let err = LandmarkSet::from_slice(&[]).unwrap_err();
        assert_eq!(err, LandmarkError::WrongCount { expected: 33, actual: 0 });

        let err = LandmarkSet::from_slice(&[Landmark::default(); 17]).unwrap_err();
        assert_eq!(err, LandmarkError::WrongCount { expected: 33, actual: 17 });
    }

    #[test]
    fn test_from_slice_non_finite() {
        let mut raw = vec![Landmark::at(0.5, 0.5); LandmarkIndex::COUNT];
        raw[LandmarkIndex::LeftKnee as usize].x = f32::NAN;
        let err = LandmarkSet::from_slice(&raw).unwrap_err();
        assert_eq!(err, LandmarkError::NonFinite { index: 25 });
    }

    #[test]
    fn test_get_by_role() {
        let mut raw = vec![Landmark::default(); LandmarkIndex::COUNT];
        raw[LandmarkIndex::Nose as usize] = Landmark::new(0.5, 0.3, -0.1, 0.9);
        let set = LandmarkSet::from_slice(&raw).unwrap();

        let nose = set.get(LandmarkIndex::Nose);
        assert_eq!(nose.x, 0.5);
        assert_eq!(nose.y, 0.3);
        assert_eq!(nose.z, -0.1);
        assert_eq!(nose.visibility, 0.9);
    }

    #[test]
    fn test_deserialize_defaults() {
        let lm: Landmark = serde_json::from_str(r#"{"x": 0.25, "y": 0.75}"#).unwrap();
        assert_eq!(lm.z, 0.0);
        assert_eq!(lm.visibility, 1.0);
    }
}
