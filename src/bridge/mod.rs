//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod session_api;

pub use session_api::{
    clear_reference_pose, configure, last_overlay, process_detections, process_frame,
    reference_angles, reset_hold, reset_session, set_participant, set_reference_pose,
};

pub(crate) use session_api::{run_frame, set_reference_raw};
