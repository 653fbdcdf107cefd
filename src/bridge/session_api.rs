//! Session storage and JS entry points
//!
//! The comparison session lives in thread-local storage (WASM is
//! single-threaded); every entry point borrows it for the duration of one
//! call, so a reference swap is a single atomic operation from the
//! pipeline's point of view.
//!
//! Keypoints cross the boundary as a flat `[x, y, confidence] * 17` array
//! in detector index order; structured data (config, reports, plans) goes
//! through serde.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use crate::engine::{
    AngleEntry, ComparisonSession, DetectedPose, EngineConfig, EngineError, FrameReport,
    JointName, Keypoint, JOINT_COUNT,
};
use crate::overlay;

thread_local! {
    static SESSION: RefCell<ComparisonSession> =
        RefCell::new(ComparisonSession::new(EngineConfig::default()));
    static LAST_REPORT: RefCell<Option<FrameReport>> = RefCell::new(None);
}

pub(crate) fn with_session<R>(f: impl FnOnce(&mut ComparisonSession) -> R) -> R {
    SESSION.with(|cell| f(&mut cell.borrow_mut()))
}

/// Run one frame of detections through the session and remember the report
/// for overlay building.
pub(crate) fn run_frame(
    poses: &[DetectedPose],
    width: f32,
    height: f32,
    now_secs: f64,
) -> Result<FrameReport, EngineError> {
    let report = with_session(|session| session.process_frame(poses, width, height, now_secs))?;
    LAST_REPORT.with(|cell| *cell.borrow_mut() = Some(report.clone()));
    Ok(report)
}

/// Swap in a new reference pose; returns its measured angles.
pub(crate) fn set_reference_raw(
    keypoints: &[Keypoint],
    width: f32,
    height: f32,
    reference_id: String,
    now_secs: f64,
) -> Result<Vec<AngleEntry>, EngineError> {
    with_session(|session| {
        let snapshot = session.set_reference(keypoints, width, height, reference_id, now_secs)?;
        Ok(snapshot
            .angles
            .iter()
            .map(|(joint, degrees)| AngleEntry { joint, degrees })
            .collect())
    })
}

fn keypoints_from_flat(data: &[f32]) -> Result<Vec<Keypoint>, JsValue> {
    if data.len() != JOINT_COUNT * 3 {
        let message = format!(
            "Invalid keypoint data length: {} (expected {})",
            data.len(),
            JOINT_COUNT * 3
        );
        web_sys::console::warn_1(&message.clone().into());
        return Err(JsValue::from_str(&message));
    }

    Ok(JointName::ALL
        .iter()
        .enumerate()
        .map(|(i, &name)| Keypoint::new(name, data[i * 3], data[i * 3 + 1], data[i * 3 + 2]))
        .collect())
}

// ============================================================================
// WASM-BINDGEN ENTRY POINTS
// ============================================================================

/// Replace the engine configuration (partial objects are filled with
/// defaults). Resets the current hold attempt.
#[wasm_bindgen]
pub fn configure(config: JsValue) -> Result<(), JsValue> {
    let config: EngineConfig = serde_wasm_bindgen::from_value(config)?;
    with_session(|session| session.configure(config));
    Ok(())
}

/// Identify this participant in achievement events.
#[wasm_bindgen]
pub fn set_participant(participant_id: Option<String>) {
    with_session(|session| session.set_participant(participant_id));
}

/// One-shot reference pass: measure the uploaded pose and make it the
/// comparison target. Returns the reference's joint angles.
#[wasm_bindgen]
pub fn set_reference_pose(
    data: &[f32],
    width: f32,
    height: f32,
    reference_id: String,
    timestamp_secs: f64,
) -> Result<JsValue, JsValue> {
    let keypoints = keypoints_from_flat(data)?;
    let entries = set_reference_raw(&keypoints, width, height, reference_id, timestamp_secs)?;
    Ok(serde_wasm_bindgen::to_value(&entries)?)
}

#[wasm_bindgen]
pub fn clear_reference_pose() {
    with_session(|session| session.clear_reference());
}

/// Angles of the current reference, for hosts that display the target pose.
#[wasm_bindgen]
pub fn reference_angles() -> Result<JsValue, JsValue> {
    let entries = with_session(|session| {
        session.reference_angles().map(|angles| {
            angles
                .iter()
                .map(|(joint, degrees)| AngleEntry { joint, degrees })
                .collect::<Vec<_>>()
        })
    })?;
    Ok(serde_wasm_bindgen::to_value(&entries)?)
}

/// Abandon the current hold attempt (webcam stopped) without dropping the
/// reference.
#[wasm_bindgen]
pub fn reset_hold() {
    with_session(|session| session.reset_hold());
}

/// Run one webcam frame through the pipeline. For hosts that drive their
/// own detector and pass the single best pose as a flat array.
#[wasm_bindgen]
pub fn process_frame(
    data: &[f32],
    width: f32,
    height: f32,
    timestamp_secs: f64,
) -> Result<JsValue, JsValue> {
    let keypoints = keypoints_from_flat(data)?;
    let pose = DetectedPose {
        score: None,
        keypoints,
    };
    let report = run_frame(std::slice::from_ref(&pose), width, height, timestamp_secs)?;
    Ok(serde_wasm_bindgen::to_value(&report)?)
}

/// Like [`process_frame`], but takes the detector's full multi-pose output
/// (array of `{score, keypoints: [{name, x, y, score}]}`); the engine keeps
/// only the best pose.
#[wasm_bindgen]
pub fn process_detections(
    poses: JsValue,
    width: f32,
    height: f32,
    timestamp_secs: f64,
) -> Result<JsValue, JsValue> {
    let poses: Vec<DetectedPose> = serde_wasm_bindgen::from_value(poses)
        .map_err(|err| EngineError::DetectorFailure(err.to_string()))?;
    let report = run_frame(&poses, width, height, timestamp_secs)?;
    Ok(serde_wasm_bindgen::to_value(&report)?)
}

/// Render instructions for the most recently processed frame.
#[wasm_bindgen]
pub fn last_overlay() -> Result<JsValue, JsValue> {
    let plan = LAST_REPORT.with(|cell| {
        cell.borrow().as_ref().map(|report| {
            with_session(|session| overlay::build_plan(report, session.config()))
        })
    });
    match plan {
        Some(plan) => Ok(serde_wasm_bindgen::to_value(&plan)?),
        None => Err(JsValue::from_str("no frame has been processed yet")),
    }
}

/// Drop all session state: reference, hold timer, participant, last report.
#[wasm_bindgen]
pub fn reset_session() {
    SESSION.with(|cell| {
        let config = *cell.borrow().config();
        *cell.borrow_mut() = ComparisonSession::new(config);
    });
    LAST_REPORT.with(|cell| *cell.borrow_mut() = None);
}
