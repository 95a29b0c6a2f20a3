use crate::geometry::{angle_at, midpoint};
use crate::pose::{LandmarkIndex, LandmarkSet};

use super::thresholds::{KNEE_OVER_TOE_TOLERANCE, SQUAT_BACK_ANGLE_MIN, SQUAT_DEPTH_KNEE_ANGLE_MAX};
use super::{Findings, Issue};

const KNEE_OVER_TOE_FEEDBACK: &str = "Keep your knees behind your toes";
const BACK_ANGLE_FEEDBACK: &str = "Keep your chest up and your back straighter";
const DEPTH_FEEDBACK: &str = "Try to squat deeper, aim for thighs parallel to the floor";

/// スクワット判定に使う計測値
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquatMeasurements {
    /// 膝X - 足首X
    pub left_knee_offset: f32,
    pub right_knee_offset: f32,
    /// 肩中点-腰中点-膝中点 の角度
    pub back_angle: f32,
    /// 左右の膝角度（腰-膝-足首）の平均
    pub knee_angle: f32,
}

impl SquatMeasurements {
    pub fn measure(set: &LandmarkSet) -> Self {
        use LandmarkIndex::*;

        let left_hip = set.get(LeftHip);
        let right_hip = set.get(RightHip);
        let left_knee = set.get(LeftKnee);
        let right_knee = set.get(RightKnee);
        let left_ankle = set.get(LeftAnkle);
        let right_ankle = set.get(RightAnkle);

        let shoulder_mid = midpoint(set.get(LeftShoulder), set.get(RightShoulder));
        let hip_mid = midpoint(left_hip, right_hip);
        let knee_mid = midpoint(left_knee, right_knee);

        let left_knee_angle = angle_at(left_hip, left_knee, left_ankle);
        let right_knee_angle = angle_at(right_hip, right_knee, right_ankle);

        Self {
            left_knee_offset: left_knee.x - left_ankle.x,
            right_knee_offset: right_knee.x - right_ankle.x,
            back_angle: angle_at(&shoulder_mid, &hip_mid, &knee_mid),
            knee_angle: (left_knee_angle + right_knee_angle) / 2.0,
        }
    }

    /// 判定順: 膝の突き出し → 背中角度 → 深さ
    ///
    /// 深さはフィードバックのみで問題として数えない
    pub fn assess(&self) -> Findings {
        let mut findings = Findings::default();

        if self.left_knee_offset > KNEE_OVER_TOE_TOLERANCE
            || self.right_knee_offset > KNEE_OVER_TOE_TOLERANCE
        {
            findings.flag(Issue::KneeOverToe, KNEE_OVER_TOE_FEEDBACK);
        }

        if self.back_angle < SQUAT_BACK_ANGLE_MIN {
            findings.flag(Issue::BackAnglePoor, BACK_ANGLE_FEEDBACK);
        }

        if self.knee_angle > SQUAT_DEPTH_KNEE_ANGLE_MAX {
            findings.note(DEPTH_FEEDBACK);
        }

        findings
    }
}

pub fn evaluate(set: &LandmarkSet) -> Findings {
    SquatMeasurements::measure(set).assess()
}
