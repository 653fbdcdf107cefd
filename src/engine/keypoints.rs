//! Keypoint schema, normalization, and best-pose selection
//!
//! The detector reports the fixed 17-point body schema (MoveNet ordering).
//! Raw keypoints arrive in pixel space; everything downstream of
//! [`normalize`] works in unit-square coordinates. The two must never be
//! mixed within one computation.

use serde::{Deserialize, Serialize};

use super::error::EngineError;

/// Number of keypoints in the body schema
pub const JOINT_COUNT: usize = 17;

/// Named body landmarks, in detector index order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointName {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl JointName {
    pub const ALL: [JointName; JOINT_COUNT] = [
        JointName::Nose,
        JointName::LeftEye,
        JointName::RightEye,
        JointName::LeftEar,
        JointName::RightEar,
        JointName::LeftShoulder,
        JointName::RightShoulder,
        JointName::LeftElbow,
        JointName::RightElbow,
        JointName::LeftWrist,
        JointName::RightWrist,
        JointName::LeftHip,
        JointName::RightHip,
        JointName::LeftKnee,
        JointName::RightKnee,
        JointName::LeftAnkle,
        JointName::RightAnkle,
    ];

    /// Detector index of this keypoint
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<JointName> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            JointName::Nose => "nose",
            JointName::LeftEye => "left_eye",
            JointName::RightEye => "right_eye",
            JointName::LeftEar => "left_ear",
            JointName::RightEar => "right_ear",
            JointName::LeftShoulder => "left_shoulder",
            JointName::RightShoulder => "right_shoulder",
            JointName::LeftElbow => "left_elbow",
            JointName::RightElbow => "right_elbow",
            JointName::LeftWrist => "left_wrist",
            JointName::RightWrist => "right_wrist",
            JointName::LeftHip => "left_hip",
            JointName::RightHip => "right_hip",
            JointName::LeftKnee => "left_knee",
            JointName::RightKnee => "right_knee",
            JointName::LeftAnkle => "left_ankle",
            JointName::RightAnkle => "right_ankle",
        }
    }

    /// Human-readable label for overlay text ("left_elbow" -> "left elbow")
    pub fn label(self) -> String {
        self.name().replace('_', " ")
    }
}

/// A single named 2D landmark with detection confidence
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub name: JointName,
    pub x: f32,
    pub y: f32,
    /// Detection confidence in [0, 1]. MoveNet calls this "score".
    #[serde(alias = "score")]
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(name: JointName, x: f32, y: f32, confidence: f32) -> Self {
        Self {
            name,
            x,
            y,
            confidence,
        }
    }
}

/// One frame's keypoints, unique by name (last write per joint wins)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoseFrame {
    slots: [Option<Keypoint>; JOINT_COUNT],
}

impl PoseFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keypoints(keypoints: &[Keypoint]) -> Self {
        let mut frame = Self::new();
        for kp in keypoints {
            frame.slots[kp.name.index()] = Some(*kp);
        }
        frame
    }

    pub fn get(&self, joint: JointName) -> Option<&Keypoint> {
        self.slots[joint.index()].as_ref()
    }

    pub fn set(&mut self, keypoint: Keypoint) {
        self.slots[keypoint.name.index()] = Some(keypoint);
    }

    /// Keypoint for `joint`, only if its confidence clears `min_confidence`
    pub fn usable(&self, joint: JointName, min_confidence: f32) -> Option<&Keypoint> {
        self.get(joint).filter(|kp| kp.confidence > min_confidence)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keypoint> {
        self.slots.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }
}

/// One detected pose as reported by the external detector
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DetectedPose {
    /// Whole-pose confidence; absent for detectors that only score keypoints
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
}

impl DetectedPose {
    /// Whole-pose score, falling back to mean keypoint confidence
    pub fn confidence(&self) -> f32 {
        if let Some(score) = self.score {
            return score;
        }
        if self.keypoints.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.keypoints.iter().map(|kp| kp.confidence).sum();
        sum / self.keypoints.len() as f32
    }
}

/// Pick the single highest-confidence pose; ties keep the earliest.
///
/// The engine only ever compares one body per frame; extra detections are
/// ignored.
pub fn select_best_pose(poses: &[DetectedPose]) -> Option<&DetectedPose> {
    let mut best: Option<&DetectedPose> = None;
    for pose in poses {
        match best {
            Some(current) if pose.confidence() <= current.confidence() => {}
            _ => best = Some(pose),
        }
    }
    best
}

/// Scale pixel-space keypoints into the unit square.
///
/// Confidence passes through unchanged. Pure function.
pub fn normalize(
    keypoints: &[Keypoint],
    width: f32,
    height: f32,
) -> Result<PoseFrame, EngineError> {
    if width <= 0.0 || height <= 0.0 {
        return Err(EngineError::InvalidFrameDimensions { width, height });
    }

    let mut frame = PoseFrame::new();
    for kp in keypoints {
        frame.set(Keypoint::new(
            kp.name,
            kp.x / width,
            kp.y / height,
            kp.confidence,
        ));
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(name: JointName, x: f32, y: f32, confidence: f32) -> Keypoint {
        Keypoint::new(name, x, y, confidence)
    }

    #[test]
    fn normalize_scales_into_unit_square() {
        let raw = [kp(JointName::Nose, 320.0, 120.0, 0.9)];
        let frame = normalize(&raw, 640.0, 480.0).unwrap();
        let nose = frame.get(JointName::Nose).unwrap();
        assert!((nose.x - 0.5).abs() < 1e-6);
        assert!((nose.y - 0.25).abs() < 1e-6);
        assert_eq!(nose.confidence, 0.9);
    }

    #[test]
    fn normalize_rejects_bad_dimensions() {
        let raw = [kp(JointName::Nose, 1.0, 1.0, 0.9)];
        assert!(matches!(
            normalize(&raw, 0.0, 480.0),
            Err(EngineError::InvalidFrameDimensions { .. })
        ));
        assert!(matches!(
            normalize(&raw, 640.0, -1.0),
            Err(EngineError::InvalidFrameDimensions { .. })
        ));
    }

    #[test]
    fn frame_is_unique_by_name() {
        let raw = [
            kp(JointName::Nose, 1.0, 1.0, 0.5),
            kp(JointName::Nose, 2.0, 2.0, 0.8),
        ];
        let frame = PoseFrame::from_keypoints(&raw);
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.get(JointName::Nose).unwrap().confidence, 0.8);
    }

    #[test]
    fn usable_applies_confidence_gate() {
        let frame = PoseFrame::from_keypoints(&[kp(JointName::LeftKnee, 0.5, 0.5, 0.3)]);
        // exactly at the gate does not count; the gate is strict
        assert!(frame.usable(JointName::LeftKnee, 0.3).is_none());
        assert!(frame.usable(JointName::LeftKnee, 0.2).is_some());
    }

    #[test]
    fn best_pose_prefers_highest_score() {
        let poses = vec![
            DetectedPose {
                score: Some(0.4),
                keypoints: vec![],
            },
            DetectedPose {
                score: Some(0.9),
                keypoints: vec![],
            },
            DetectedPose {
                score: Some(0.9),
                keypoints: vec![kp(JointName::Nose, 0.0, 0.0, 1.0)],
            },
        ];
        let best = select_best_pose(&poses).unwrap();
        // tie keeps the earliest of the two 0.9 poses
        assert!(best.keypoints.is_empty());
        assert_eq!(best.score, Some(0.9));
    }

    #[test]
    fn best_pose_of_nothing_is_none() {
        assert!(select_best_pose(&[]).is_none());
    }

    #[test]
    fn pose_confidence_falls_back_to_keypoint_mean() {
        let pose = DetectedPose {
            score: None,
            keypoints: vec![
                kp(JointName::Nose, 0.0, 0.0, 0.2),
                kp(JointName::LeftEye, 0.0, 0.0, 0.6),
            ],
        };
        assert!((pose.confidence() - 0.4).abs() < 1e-6);
    }
}
