use crate::geometry::{angle_at, midpoint};
use crate::pose::{LandmarkIndex, LandmarkSet};

use super::thresholds::{
    DESK_BACK_ANGLE_MIN, HEAD_FORWARD_TOLERANCE, NECK_ANGLE_MAX, SHOULDER_LEVEL_TOLERANCE,
    VERTICAL_REFERENCE_OFFSET,
};
use super::{Findings, Issue};

const NECK_FORWARD_FEEDBACK: &str = "Your neck is bent forward. Tuck your chin and raise the screen to eye level";
const UNEVEN_SHOULDERS_FEEDBACK: &str = "Your shoulders are uneven. Relax them and sit evenly on both hips";
const SLOUCHING_FEEDBACK: &str = "You are slouching. Sit back and straighten your spine";
const HEAD_FORWARD_FEEDBACK: &str = "Your head is ahead of your shoulders. Keep your ears over your shoulders";

/// 座位判定に使う計測値
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeskMeasurements {
    /// 耳中点における 肩中点-耳中点-耳の真上 の角度（度）
    pub neck_angle: f32,
    /// 左右の肩のY差（絶対値）
    pub shoulder_tilt: f32,
    /// 肩中点-腰中点-腰の真下 の角度
    pub back_angle: f32,
    /// 鼻X - 肩中点X
    pub head_offset: f32,
}

impl DeskMeasurements {
    pub fn measure(set: &LandmarkSet) -> Self {
        use LandmarkIndex::*;

        let left_shoulder = set.get(LeftShoulder);
        let right_shoulder = set.get(RightShoulder);

        let ear_mid = midpoint(set.get(LeftEar), set.get(RightEar));
        let shoulder_mid = midpoint(left_shoulder, right_shoulder);
        let hip_mid = midpoint(set.get(LeftHip), set.get(RightHip));

        // 画像Yは下が正: 耳の真上は -Y、腰の真下は +Y
        let above_ear = ear_mid.shifted_y(-VERTICAL_REFERENCE_OFFSET);
        let below_hip = hip_mid.shifted_y(VERTICAL_REFERENCE_OFFSET);

        Self {
            neck_angle: angle_at(&shoulder_mid, &ear_mid, &above_ear),
            shoulder_tilt: (left_shoulder.y - right_shoulder.y).abs(),
            back_angle: angle_at(&shoulder_mid, &hip_mid, &below_hip),
            head_offset: set.get(Nose).x - shoulder_mid.x,
        }
    }

    /// 判定順: 首 → 肩の水平 → 背中 → 頭の前方突出
    pub fn assess(&self) -> Findings {
        let mut findings = Findings::default();

        if self.neck_angle > NECK_ANGLE_MAX {
            findings.flag(Issue::NeckForward, NECK_FORWARD_FEEDBACK);
        }

        if self.shoulder_tilt > SHOULDER_LEVEL_TOLERANCE {
            findings.flag(Issue::UnevenShoulders, UNEVEN_SHOULDERS_FEEDBACK);
        }

        if self.back_angle < DESK_BACK_ANGLE_MIN {
            findings.flag(Issue::Slouching, SLOUCHING_FEEDBACK);
        }

        if self.head_offset > HEAD_FORWARD_TOLERANCE {
            findings.flag(Issue::HeadForward, HEAD_FORWARD_FEEDBACK);
        }

        findings
    }
}

pub fn evaluate(set: &LandmarkSet) -> Findings {
    DeskMeasurements::measure(set).assess()
}
