//! 判定閾値とスコア定数
//!
//! 座標系の値は正規化画像座標、角度は度。

/// 膝が足首より前に出てよい許容量（X）
pub const KNEE_OVER_TOE_TOLERANCE: f32 = 0.05;
/// スクワット時の背中角度の下限（肩中点-腰中点-膝中点）
pub const SQUAT_BACK_ANGLE_MIN: f32 = 150.0;
/// これより膝角度が大きいと「浅い」
pub const SQUAT_DEPTH_KNEE_ANGLE_MAX: f32 = 120.0;

/// 首角度の上限（耳中点で 肩中点 と 耳の真上の点 がなす角）
pub const NECK_ANGLE_MAX: f32 = 30.0;
/// 左右の肩の高さの差の許容量（Y）
pub const SHOULDER_LEVEL_TOLERANCE: f32 = 0.05;
/// 座位の背中角度の下限
pub const DESK_BACK_ANGLE_MIN: f32 = 160.0;
/// 鼻が肩中点より前に出てよい許容量（X）
pub const HEAD_FORWARD_TOLERANCE: f32 = 0.05;

/// 真上・真下の合成基準点を作るためのYオフセット
pub const VERTICAL_REFERENCE_OFFSET: f32 = 0.1;

pub const MAX_SCORE: u32 = 100;
/// 問題1件あたりの減点
pub const SQUAT_ISSUE_PENALTY: u32 = 25;
pub const DESK_ISSUE_PENALTY: u32 = 20;

/// 総合評価の下限（境界値を含む）
pub const RATING_EXCELLENT_MIN: u32 = 80;
pub const RATING_GOOD_MIN: u32 = 60;
pub const RATING_FAIR_MIN: u32 = 40;
