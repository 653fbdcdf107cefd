//! Per-joint deviation classification and correction hints
//!
//! Deviation thresholds (degrees): up to 10 is good, up to 20 needs a
//! slight adjustment, beyond that a major one. The directional hint comes
//! from the sign of the deviation: an angle wider than the reference should
//! be bent, a narrower one straightened.

use serde::{Deserialize, Serialize};

use super::angles::{AngleJoint, AngleSet};
use super::similarity::angle_difference;

/// Largest deviation still classified as good alignment
pub const GOOD_MAX_DIFF_DEG: f32 = 10.0;

/// Largest deviation still classified as a warning
pub const WARNING_MAX_DIFF_DEG: f32 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Good,
    Warning,
    Error,
}

impl Severity {
    pub fn from_diff(diff_deg: f32) -> Severity {
        if diff_deg <= GOOD_MAX_DIFF_DEG {
            Severity::Good
        } else if diff_deg <= WARNING_MAX_DIFF_DEG {
            Severity::Warning
        } else {
            Severity::Error
        }
    }

    /// Whether this joint should be surfaced as an actionable correction
    pub fn is_actionable(self) -> bool {
        self != Severity::Good
    }
}

/// Which way to move the joint toward the reference angle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hint {
    Straighten,
    Bend,
}

impl Hint {
    pub fn verb(self) -> &'static str {
        match self {
            Hint::Straighten => "straighten",
            Hint::Bend => "bend",
        }
    }
}

/// One joint's comparison against the reference, produced fresh every frame
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointFeedback {
    pub joint: AngleJoint,
    pub reference_deg: f32,
    pub current_deg: f32,
    pub diff_deg: f32,
    pub severity: Severity,
    pub hint: Hint,
    pub message: String,
}

impl JointFeedback {
    fn new(joint: AngleJoint, reference_deg: f32, current_deg: f32) -> Self {
        let diff_deg = angle_difference(reference_deg, current_deg);
        let severity = Severity::from_diff(diff_deg);
        let hint = if current_deg > reference_deg {
            Hint::Straighten
        } else {
            Hint::Bend
        };
        let message = match severity {
            Severity::Good => "Good alignment".to_string(),
            Severity::Warning => "Slight adjustment needed".to_string(),
            Severity::Error => format!("Major adjustment needed ({:.0}\u{b0} off)", diff_deg),
        };
        Self {
            joint,
            reference_deg,
            current_deg,
            diff_deg,
            severity,
            hint,
            message,
        }
    }

    /// Overlay line for an actionable correction
    pub fn correction_line(&self) -> String {
        format!("Adjust {}: {} more", self.joint.label(), self.hint.verb())
    }
}

/// Classify every joint both angle sets share, in fixed joint order.
///
/// Passing joints are included (reported, not flagged); callers that only
/// want corrections filter on [`Severity::is_actionable`].
pub fn classify(reference: &AngleSet, current: &AngleSet) -> Vec<JointFeedback> {
    let mut items = Vec::new();
    for joint in AngleJoint::ALL {
        let (Some(ref_deg), Some(cur_deg)) = (reference.get(joint), current.get(joint)) else {
            continue;
        };
        items.push(JointFeedback::new(joint, ref_deg, cur_deg));
    }
    items
}
