//! Engine error taxonomy
//!
//! Per-frame errors are contained at the frame loop and never tear down a
//! session. Only resource-acquisition failures surface to the host before
//! the loop starts.

use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Malformed input frame size. The caller must skip the frame.
    #[error("invalid frame dimensions {width}x{height}")]
    InvalidFrameDimensions { width: f32, height: f32 },

    /// Not enough confident keypoints to compute any joint angle this frame.
    /// Non-fatal: surfaced to the UI as "pose not clear".
    #[error("no joint angles could be computed from this frame")]
    NoAnglesComputed,

    /// The external detector threw or returned nothing usable.
    #[error("pose detector failed: {0}")]
    DetectorFailure(String),

    /// Comparison requested with no reference pose set.
    #[error("no reference pose has been set")]
    ReferenceMissing,
}

impl From<EngineError> for JsValue {
    fn from(err: EngineError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
