//! Pose-comparison engine
//!
//! Pure per-frame pipeline: keypoint normalization, joint-angle extraction,
//! similarity scoring, feedback classification, and the hold-timer that
//! turns sustained similarity into an achievement. No web types in here;
//! everything is natively testable.

mod angles;
mod config;
mod error;
mod feedback;
mod hold;
mod keypoints;
mod session;
mod similarity;

pub use angles::{calculate_angle, extract_angles, AngleJoint, AngleSet, ANGLE_COUNT};
pub use config::EngineConfig;
pub use error::EngineError;
pub use feedback::{classify, Hint, JointFeedback, Severity};
pub use hold::{HoldState, HoldStatus, HoldTimer};
pub use keypoints::{
    normalize, select_best_pose, DetectedPose, JointName, Keypoint, PoseFrame, JOINT_COUNT,
};
pub use session::{
    AchievementEvent, AngleEntry, ComparisonSession, FrameReport, ReferenceSnapshot,
};
pub use similarity::{angle_difference, similarity};
