//! Render-instruction builder
//!
//! The pipeline computes, a host-side renderer draws. This module is the
//! seam between the two: it flattens a frame report into a plan of dots,
//! colored bones, and text the host can paint with any backend.

mod plan;
mod skeleton;

pub use plan::{
    build_plan, HoldProgress, OverlayPlan, OverlayPoint, OverlaySegment, SegmentColor,
};
pub use skeleton::{joint_segments, segment_belongs_to, SKELETON};
