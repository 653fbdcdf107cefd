//! Aggregate pose similarity scoring
//!
//! Compares two joint-angle sets over their common joints only. Joints
//! absent from either set are excluded from the average, never counted as
//! zero difference.

use super::angles::{AngleJoint, AngleSet};

/// Absolute angular difference with circular wraparound, capped at 180°.
pub fn angle_difference(a: f32, b: f32) -> f32 {
    let mut diff = (a - b).abs();
    if diff > 180.0 {
        diff = 360.0 - diff;
    }
    diff
}

/// Aggregate similarity percentage in [0, 100].
///
/// Per common joint: `1 - diff/180`, averaged, times 100. An empty
/// intersection scores 0 — a visible "no comparable pose" state, not an
/// error. Commutative in its two arguments.
pub fn similarity(reference: &AngleSet, current: &AngleSet) -> f32 {
    let mut total = 0.0f32;
    let mut common = 0usize;

    for joint in AngleJoint::ALL {
        let (Some(ref_deg), Some(cur_deg)) = (reference.get(joint), current.get(joint)) else {
            continue;
        };
        total += 1.0 - angle_difference(ref_deg, cur_deg) / 180.0;
        common += 1;
    }

    if common == 0 {
        return 0.0;
    }
    (total / common as f32) * 100.0
}
