//! Pose Coach - real-time pose comparison engine
//!
//! Compares live webcam keypoints against a reference pose: normalized
//! keypoints in, joint angles, similarity, per-joint feedback, and
//! achievement events out. Compiled to WASM; the JS host owns the camera,
//! the detector model, and the actual drawing.
//!
//! Module layout:
//! - `engine`: the pure pipeline (angles, similarity, feedback, hold timer)
//! - `overlay`: frame report -> render instructions
//! - `bridge`: wasm_bindgen entry points and session storage
//! - `driver`: the display-synced frame loop

mod bridge;
mod driver;
mod engine;
mod overlay;

use wasm_bindgen::prelude::*;

pub use bridge::{
    clear_reference_pose, configure, last_overlay, process_detections, process_frame,
    reference_angles, reset_hold, reset_session, set_participant, set_reference_pose,
};
pub use driver::FrameLoop;
pub use engine::{
    angle_difference, calculate_angle, classify, extract_angles, normalize, select_best_pose,
    similarity, AchievementEvent, AngleEntry, AngleJoint, AngleSet, ComparisonSession,
    DetectedPose, EngineConfig, EngineError, FrameReport, Hint, HoldState, HoldStatus, HoldTimer,
    JointFeedback, JointName, Keypoint, PoseFrame, ReferenceSnapshot, Severity, ANGLE_COUNT,
    JOINT_COUNT,
};
pub use overlay::{
    build_plan, HoldProgress, OverlayPlan, OverlayPoint, OverlaySegment, SegmentColor,
};

// ============================================================================
// CONSOLE LOGGING
// ============================================================================

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

macro_rules! console_log {
    ($($t:tt)*) => (log(&format_args!($($t)*).to_string()))
}

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when WASM module loads
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Engine identification, logged and returned as a loaded-and-alive probe
#[wasm_bindgen]
pub fn engine_info() -> String {
    let config = EngineConfig::default();
    console_log!(
        "pose-coach engine ready ({}% held for {:.1}s)",
        config.achievement_threshold_pct,
        config.hold_duration_secs
    );
    format!(
        "pose-coach-web {} ({} keypoints, {} angles)",
        env!("CARGO_PKG_VERSION"),
        JOINT_COUNT,
        ANGLE_COUNT
    )
}
