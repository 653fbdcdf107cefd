//! Joint angle extraction using three-point vector geometry
//!
//! Each tracked angle sits at a vertex keypoint between two limb segments.
//! The angle is computed from the dot product of the vectors (a - vertex)
//! and (c - vertex), clamped into acos range so noise can never produce NaN.

use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::keypoints::{JointName, PoseFrame};

/// Number of tracked joint angles
pub const ANGLE_COUNT: usize = 8;

/// The fixed set of measured joint angles
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleJoint {
    RightElbow,
    LeftElbow,
    RightShoulder,
    LeftShoulder,
    RightHip,
    LeftHip,
    RightKnee,
    LeftKnee,
}

impl AngleJoint {
    pub const ALL: [AngleJoint; ANGLE_COUNT] = [
        AngleJoint::RightElbow,
        AngleJoint::LeftElbow,
        AngleJoint::RightShoulder,
        AngleJoint::LeftShoulder,
        AngleJoint::RightHip,
        AngleJoint::LeftHip,
        AngleJoint::RightKnee,
        AngleJoint::LeftKnee,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            AngleJoint::RightElbow => "right_elbow",
            AngleJoint::LeftElbow => "left_elbow",
            AngleJoint::RightShoulder => "right_shoulder",
            AngleJoint::LeftShoulder => "left_shoulder",
            AngleJoint::RightHip => "right_hip",
            AngleJoint::LeftHip => "left_hip",
            AngleJoint::RightKnee => "right_knee",
            AngleJoint::LeftKnee => "left_knee",
        }
    }

    /// Human-readable label for feedback text
    pub fn label(self) -> String {
        self.name().replace('_', " ")
    }

    /// The ordered `(a, vertex, c)` keypoint triple defining this angle
    pub fn triple(self) -> (JointName, JointName, JointName) {
        match self {
            AngleJoint::RightElbow => (
                JointName::RightShoulder,
                JointName::RightElbow,
                JointName::RightWrist,
            ),
            AngleJoint::LeftElbow => (
                JointName::LeftShoulder,
                JointName::LeftElbow,
                JointName::LeftWrist,
            ),
            AngleJoint::RightShoulder => (
                JointName::RightElbow,
                JointName::RightShoulder,
                JointName::RightHip,
            ),
            AngleJoint::LeftShoulder => (
                JointName::LeftElbow,
                JointName::LeftShoulder,
                JointName::LeftHip,
            ),
            AngleJoint::RightHip => (
                JointName::RightShoulder,
                JointName::RightHip,
                JointName::RightKnee,
            ),
            AngleJoint::LeftHip => (
                JointName::LeftShoulder,
                JointName::LeftHip,
                JointName::LeftKnee,
            ),
            AngleJoint::RightKnee => (
                JointName::RightHip,
                JointName::RightKnee,
                JointName::RightAnkle,
            ),
            AngleJoint::LeftKnee => (
                JointName::LeftHip,
                JointName::LeftKnee,
                JointName::LeftAnkle,
            ),
        }
    }
}

/// Fixed map from [`AngleJoint`] to degrees.
///
/// An entry is present iff all three defining keypoints were usable in the
/// source frame. Absent joints stay absent; they are never zero-filled.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AngleSet {
    values: [Option<f32>; ANGLE_COUNT],
}

impl AngleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, joint: AngleJoint) -> Option<f32> {
        self.values[joint.index()]
    }

    pub fn insert(&mut self, joint: AngleJoint, degrees: f32) {
        self.values[joint.index()] = Some(degrees);
    }

    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|v| v.is_none())
    }

    /// Present joints in fixed [`AngleJoint::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = (AngleJoint, f32)> + '_ {
        AngleJoint::ALL
            .iter()
            .filter_map(move |&joint| self.get(joint).map(|deg| (joint, deg)))
    }
}

impl FromIterator<(AngleJoint, f32)> for AngleSet {
    fn from_iter<T: IntoIterator<Item = (AngleJoint, f32)>>(iter: T) -> Self {
        let mut set = AngleSet::new();
        for (joint, degrees) in iter {
            set.insert(joint, degrees);
        }
        set
    }
}

/// Angle in degrees at vertex `b` between segments `b->a` and `b->c`.
///
/// Returns 0.0 when either vector has zero magnitude (documented edge
/// policy: a degenerate triple is "no angle", not a division by zero).
/// Result is always in [0, 180] and never NaN.
pub fn calculate_angle(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> f32 {
    let ba = (a.0 - b.0, a.1 - b.1);
    let bc = (c.0 - b.0, c.1 - b.1);

    let dot = ba.0 * bc.0 + ba.1 * bc.1;
    let mag_ba = (ba.0 * ba.0 + ba.1 * ba.1).sqrt();
    let mag_bc = (bc.0 * bc.0 + bc.1 * bc.1).sqrt();

    if mag_ba == 0.0 || mag_bc == 0.0 {
        return 0.0;
    }

    let cosine = (dot / (mag_ba * mag_bc)).clamp(-1.0, 1.0);
    cosine.acos().to_degrees()
}

/// Compute all computable joint angles for one normalized frame.
///
/// Joints whose triple has a missing or low-confidence keypoint are omitted.
/// Fails with [`EngineError::NoAnglesComputed`] when nothing at all could be
/// measured; callers treat that as "pose unusable this frame", not fatal.
pub fn extract_angles(frame: &PoseFrame, min_confidence: f32) -> Result<AngleSet, EngineError> {
    let mut angles = AngleSet::new();

    for joint in AngleJoint::ALL {
        let (a_name, vertex_name, c_name) = joint.triple();
        let (Some(a), Some(vertex), Some(c)) = (
            frame.usable(a_name, min_confidence),
            frame.usable(vertex_name, min_confidence),
            frame.usable(c_name, min_confidence),
        ) else {
            continue;
        };

        let degrees = calculate_angle((a.x, a.y), (vertex.x, vertex.y), (c.x, c.y));
        angles.insert(joint, degrees);
    }

    if angles.is_empty() {
        return Err(EngineError::NoAnglesComputed);
    }
    Ok(angles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::keypoints::Keypoint;

    #[test]
    fn straight_limb_is_180() {
        let angle = calculate_angle((0.0, 0.0), (0.5, 0.0), (1.0, 0.0));
        assert!((angle - 180.0).abs() < 1e-3);
    }

    #[test]
    fn right_angle_is_90() {
        let angle = calculate_angle((0.0, 0.0), (0.5, 0.0), (0.5, 0.5));
        assert!((angle - 90.0).abs() < 1e-3);
    }

    #[test]
    fn angle_is_symmetric_in_outer_points() {
        let a = (0.1, 0.7);
        let b = (0.4, 0.3);
        let c = (0.9, 0.6);
        let forward = calculate_angle(a, b, c);
        let reverse = calculate_angle(c, b, a);
        assert!((forward - reverse).abs() < 1e-4);
    }

    #[test]
    fn angle_stays_in_range() {
        let points = [
            ((0.0, 0.0), (0.1, 0.9), (0.8, 0.2)),
            ((1.0, 1.0), (0.5, 0.5), (0.0, 0.0)),
            ((0.3, 0.3), (0.3, 0.6), (0.3, 0.1)),
        ];
        for (a, b, c) in points {
            let angle = calculate_angle(a, b, c);
            assert!(angle.is_finite());
            assert!((0.0..=180.0).contains(&angle), "angle {angle} out of range");
        }
    }

    #[test]
    fn degenerate_vector_is_zero_not_nan() {
        let p = (0.4, 0.4);
        assert_eq!(calculate_angle(p, p, (0.9, 0.9)), 0.0);
        assert_eq!(calculate_angle((0.9, 0.9), p, p), 0.0);
        assert_eq!(calculate_angle(p, p, p), 0.0);
    }

    fn arm_frame(wrist_confidence: f32) -> PoseFrame {
        PoseFrame::from_keypoints(&[
            Keypoint::new(JointName::LeftShoulder, 0.3, 0.2, 0.9),
            Keypoint::new(JointName::LeftElbow, 0.3, 0.4, 0.9),
            Keypoint::new(JointName::LeftWrist, 0.3, 0.6, wrist_confidence),
        ])
    }

    #[test]
    fn extracts_only_fully_confident_triples() {
        let angles = extract_angles(&arm_frame(0.9), 0.3).unwrap();
        assert_eq!(angles.len(), 1);
        let elbow = angles.get(AngleJoint::LeftElbow).unwrap();
        assert!((elbow - 180.0).abs() < 1e-3);
    }

    #[test]
    fn low_confidence_keypoint_drops_the_whole_joint() {
        // wrist at 0.2 kills the elbow triple, leaving nothing measurable
        let result = extract_angles(&arm_frame(0.2), 0.3);
        assert_eq!(result, Err(EngineError::NoAnglesComputed));
    }

    #[test]
    fn empty_frame_yields_no_angles_error() {
        let result = extract_angles(&PoseFrame::new(), 0.3);
        assert_eq!(result, Err(EngineError::NoAnglesComputed));
    }
}
