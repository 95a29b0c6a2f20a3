pub mod detector;
pub mod landmark;

pub use detector::{Detection, PoseDetector, RawFrame, ScriptedDetector};
pub use landmark::{Landmark, LandmarkError, LandmarkIndex, LandmarkSet};
