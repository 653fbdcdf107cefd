//! Per-session pipeline orchestration
//!
//! A [`ComparisonSession`] holds the single reference snapshot and the hold
//! timer for one comparison session, and runs the full per-frame pipeline:
//! best-pose selection, normalization, angle extraction, similarity,
//! feedback, hold update. Replacing the reference is a wholesale swap that
//! atomically resets all accumulated hold state; no frame can observe a
//! half-updated reference.

use serde::{Deserialize, Serialize};

use super::angles::{extract_angles, AngleJoint, AngleSet};
use super::config::EngineConfig;
use super::error::EngineError;
use super::feedback::{classify, JointFeedback};
use super::hold::{HoldStatus, HoldTimer};
use super::keypoints::{normalize, select_best_pose, DetectedPose, Keypoint, PoseFrame};
use super::similarity::similarity;

/// One present joint angle, in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AngleEntry {
    pub joint: AngleJoint,
    pub degrees: f32,
}

/// Emitted at most once per reference pose, for the host to broadcast to
/// the room. The engine never touches the relay itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AchievementEvent {
    pub participant_id: Option<String>,
    pub reference_id: String,
}

/// The target pose the live input is compared against.
///
/// Replaced wholesale whenever the displayed pose changes; never mutated
/// field by field.
#[derive(Clone, Debug)]
pub struct ReferenceSnapshot {
    pub keypoints: PoseFrame,
    pub angles: AngleSet,
    pub reference_id: String,
    pub captured_at: f64,
}

/// Everything the host needs to render one frame
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrameReport {
    /// The detector found at least one pose this frame
    pub pose_detected: bool,
    /// Enough confident keypoints to measure at least one angle
    pub pose_clear: bool,
    pub has_reference: bool,
    /// Normalized keypoints of the best detected pose
    pub keypoints: Vec<Keypoint>,
    pub angles: Vec<AngleEntry>,
    pub similarity_pct: f32,
    pub feedback: Vec<JointFeedback>,
    pub hold: HoldStatus,
    pub achievement: Option<AchievementEvent>,
    pub captured_at: f64,
}

pub struct ComparisonSession {
    config: EngineConfig,
    participant_id: Option<String>,
    reference: Option<ReferenceSnapshot>,
    hold: HoldTimer,
}

impl ComparisonSession {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            participant_id: None,
            reference: None,
            hold: HoldTimer::new(config.achievement_threshold_pct, config.hold_duration_secs),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Swap in a new configuration. Threshold changes rebuild the hold
    /// timer, which starts a fresh attempt.
    pub fn configure(&mut self, config: EngineConfig) {
        self.config = config;
        self.hold = HoldTimer::new(config.achievement_threshold_pct, config.hold_duration_secs);
    }

    pub fn set_participant(&mut self, participant_id: Option<String>) {
        self.participant_id = participant_id;
    }

    pub fn reference(&self) -> Option<&ReferenceSnapshot> {
        self.reference.as_ref()
    }

    /// Reference angle set, for hosts that display the target pose.
    pub fn reference_angles(&self) -> Result<&AngleSet, EngineError> {
        self.reference
            .as_ref()
            .map(|snapshot| &snapshot.angles)
            .ok_or(EngineError::ReferenceMissing)
    }

    /// One-shot reference pass: normalize and measure the uploaded pose,
    /// then swap it in as the comparison target.
    ///
    /// A reference that yields no measurable angles is rejected and the
    /// previous reference (if any) stays in place. On success the hold
    /// timer resets, even from Achieved.
    pub fn set_reference(
        &mut self,
        keypoints: &[Keypoint],
        width: f32,
        height: f32,
        reference_id: String,
        now_secs: f64,
    ) -> Result<&ReferenceSnapshot, EngineError> {
        let frame = normalize(keypoints, width, height)?;
        let angles = extract_angles(&frame, self.config.min_keypoint_confidence)?;

        self.reference = Some(ReferenceSnapshot {
            keypoints: frame,
            angles,
            reference_id,
            captured_at: now_secs,
        });
        self.hold.reset();

        // the snapshot was just stored
        self.reference.as_ref().ok_or(EngineError::ReferenceMissing)
    }

    pub fn clear_reference(&mut self) {
        self.reference = None;
        self.hold.reset();
    }

    /// Abandon the current attempt without touching the reference
    /// (webcam stopped).
    pub fn reset_hold(&mut self) {
        self.hold.reset();
    }

    /// Run one webcam frame through the pipeline.
    ///
    /// Only malformed frame dimensions are an error (skip the frame). A
    /// frame with no detected pose or no measurable angles produces an
    /// "unclear" report and leaves the hold timer untouched: an unmeasurable
    /// frame is not a reading, so it neither advances nor resets the hold.
    /// Without a reference the report is the defined neutral result:
    /// similarity 0, no feedback, idle hold.
    pub fn process_frame(
        &mut self,
        poses: &[DetectedPose],
        width: f32,
        height: f32,
        now_secs: f64,
    ) -> Result<FrameReport, EngineError> {
        let Some(best) = select_best_pose(poses) else {
            return Ok(self.unclear_report(Vec::new(), false, now_secs));
        };

        let frame = normalize(&best.keypoints, width, height)?;
        let keypoints: Vec<Keypoint> = frame.iter().copied().collect();

        let angles = match extract_angles(&frame, self.config.min_keypoint_confidence) {
            Ok(angles) => angles,
            Err(EngineError::NoAnglesComputed) => {
                return Ok(self.unclear_report(keypoints, true, now_secs));
            }
            Err(err) => return Err(err),
        };
        let angle_entries: Vec<AngleEntry> = angles
            .iter()
            .map(|(joint, degrees)| AngleEntry { joint, degrees })
            .collect();

        let Some(reference) = self.reference.as_ref() else {
            // neutral result, not an error: nothing to compare against yet
            return Ok(FrameReport {
                pose_detected: true,
                pose_clear: true,
                has_reference: false,
                keypoints,
                angles: angle_entries,
                similarity_pct: 0.0,
                feedback: Vec::new(),
                hold: self.hold.peek(now_secs),
                achievement: None,
                captured_at: now_secs,
            });
        };

        let similarity_pct = similarity(&reference.angles, &angles);
        let feedback = classify(&reference.angles, &angles);
        let reference_id = reference.reference_id.clone();

        let hold = self.hold.update(similarity_pct, now_secs);
        let achievement = hold.achieved_now.then(|| AchievementEvent {
            participant_id: self.participant_id.clone(),
            reference_id,
        });

        Ok(FrameReport {
            pose_detected: true,
            pose_clear: true,
            has_reference: true,
            keypoints,
            angles: angle_entries,
            similarity_pct,
            feedback,
            hold,
            achievement,
            captured_at: now_secs,
        })
    }

    fn unclear_report(
        &self,
        keypoints: Vec<Keypoint>,
        pose_detected: bool,
        now_secs: f64,
    ) -> FrameReport {
        FrameReport {
            pose_detected,
            pose_clear: false,
            has_reference: self.reference.is_some(),
            keypoints,
            angles: Vec::new(),
            similarity_pct: 0.0,
            feedback: Vec::new(),
            hold: self.hold.peek(now_secs),
            achievement: None,
            captured_at: now_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::keypoints::JointName;

    // A pose with both arms fully measurable: shoulders, elbows, wrists,
    // hips. Elbow angle is controlled by the wrist position.
    fn arm_pose(left_wrist: (f32, f32), confidence: f32) -> Vec<Keypoint> {
        vec![
            Keypoint::new(JointName::LeftShoulder, 200.0, 100.0, confidence),
            Keypoint::new(JointName::RightShoulder, 400.0, 100.0, confidence),
            Keypoint::new(JointName::LeftElbow, 200.0, 200.0, confidence),
            Keypoint::new(JointName::RightElbow, 400.0, 200.0, confidence),
            Keypoint::new(JointName::LeftWrist, left_wrist.0, left_wrist.1, confidence),
            Keypoint::new(JointName::RightWrist, 400.0, 300.0, confidence),
            Keypoint::new(JointName::LeftHip, 200.0, 350.0, confidence),
            Keypoint::new(JointName::RightHip, 400.0, 350.0, confidence),
        ]
    }

    fn straight_arms() -> Vec<Keypoint> {
        arm_pose((200.0, 300.0), 0.9)
    }

    fn one_pose(keypoints: Vec<Keypoint>) -> Vec<DetectedPose> {
        vec![DetectedPose {
            score: Some(0.9),
            keypoints,
        }]
    }

    fn session() -> ComparisonSession {
        ComparisonSession::new(EngineConfig::default())
    }

    #[test]
    fn no_reference_yields_neutral_result() {
        let mut s = session();
        let report = s
            .process_frame(&one_pose(straight_arms()), 640.0, 480.0, 0.0)
            .unwrap();
        assert!(report.pose_clear);
        assert!(!report.has_reference);
        assert_eq!(report.similarity_pct, 0.0);
        assert!(report.feedback.is_empty());
        assert!(report.achievement.is_none());
    }

    #[test]
    fn matching_pose_scores_perfect_and_achieves() {
        let mut s = session();
        s.set_reference(&straight_arms(), 640.0, 480.0, "pose-1".into(), 0.0)
            .unwrap();

        let mut last = None;
        for i in 0..4 {
            last = Some(
                s.process_frame(&one_pose(straight_arms()), 640.0, 480.0, i as f64)
                    .unwrap(),
            );
        }
        let report = last.unwrap();
        assert!((report.similarity_pct - 100.0).abs() < 1e-3);
        assert!(report.hold.achieved);
        let event = report.achievement.unwrap();
        assert_eq!(event.reference_id, "pose-1");
    }

    #[test]
    fn achievement_event_fires_once_per_reference() {
        let mut s = session();
        s.set_participant(Some("mentee-7".into()));
        s.set_reference(&straight_arms(), 640.0, 480.0, "pose-1".into(), 0.0)
            .unwrap();

        let mut events = 0;
        for i in 0..10 {
            let report = s
                .process_frame(&one_pose(straight_arms()), 640.0, 480.0, i as f64)
                .unwrap();
            if let Some(event) = report.achievement {
                assert_eq!(event.participant_id.as_deref(), Some("mentee-7"));
                events += 1;
            }
        }
        assert_eq!(events, 1);
    }

    #[test]
    fn reference_replacement_resets_achieved() {
        let mut s = session();
        s.set_reference(&straight_arms(), 640.0, 480.0, "pose-1".into(), 0.0)
            .unwrap();
        for i in 0..4 {
            s.process_frame(&one_pose(straight_arms()), 640.0, 480.0, i as f64)
                .unwrap();
        }

        // new gallery item swaps the snapshot and zeroes the hold state
        s.set_reference(&straight_arms(), 640.0, 480.0, "pose-2".into(), 10.0)
            .unwrap();
        let report = s
            .process_frame(&one_pose(straight_arms()), 640.0, 480.0, 10.5)
            .unwrap();
        assert!(!report.hold.achieved);
        assert!(report.hold.holding);

        // and it can be achieved again for the new reference
        let report = s
            .process_frame(&one_pose(straight_arms()), 640.0, 480.0, 13.5)
            .unwrap();
        assert_eq!(
            report.achievement.map(|e| e.reference_id),
            Some("pose-2".to_string())
        );
    }

    #[test]
    fn unusable_frame_is_unclear_and_leaves_hold_alone() {
        let mut s = session();
        s.set_reference(&straight_arms(), 640.0, 480.0, "pose-1".into(), 0.0)
            .unwrap();
        s.process_frame(&one_pose(straight_arms()), 640.0, 480.0, 1.0)
            .unwrap();

        // all keypoints below the confidence gate: not a reading
        let report = s
            .process_frame(&one_pose(arm_pose((200.0, 300.0), 0.1)), 640.0, 480.0, 2.0)
            .unwrap();
        assert!(report.pose_detected);
        assert!(!report.pose_clear);
        assert!(report.angles.is_empty());
        assert!(report.hold.holding, "unmeasurable frame must not reset the hold");
    }

    #[test]
    fn empty_detection_reports_no_pose() {
        let mut s = session();
        let report = s.process_frame(&[], 640.0, 480.0, 0.0).unwrap();
        assert!(!report.pose_detected);
        assert!(!report.pose_clear);
        assert!(report.keypoints.is_empty());
    }

    #[test]
    fn bad_dimensions_are_a_frame_error() {
        let mut s = session();
        let result = s.process_frame(&one_pose(straight_arms()), 0.0, 480.0, 0.0);
        assert!(matches!(
            result,
            Err(EngineError::InvalidFrameDimensions { .. })
        ));
    }

    #[test]
    fn reference_without_measurable_angles_is_rejected() {
        let mut s = session();
        let result = s.set_reference(&arm_pose((0.0, 0.0), 0.1), 640.0, 480.0, "p".into(), 0.0);
        assert_eq!(result.err(), Some(EngineError::NoAnglesComputed));
        assert!(s.reference().is_none());
    }

    #[test]
    fn reference_angles_requires_a_reference() {
        let mut s = session();
        assert_eq!(
            s.reference_angles().err(),
            Some(EngineError::ReferenceMissing)
        );
        s.set_reference(&straight_arms(), 640.0, 480.0, "p".into(), 0.0)
            .unwrap();
        assert!(s.reference_angles().is_ok());
    }

    #[test]
    fn bent_arm_is_flagged_for_correction() {
        let mut s = session();
        s.set_reference(&straight_arms(), 640.0, 480.0, "pose-1".into(), 0.0)
            .unwrap();

        // left wrist pulled sideways bends the left elbow to 90°
        let report = s
            .process_frame(&one_pose(arm_pose((300.0, 200.0), 0.9)), 640.0, 480.0, 1.0)
            .unwrap();
        assert!(report.similarity_pct < 100.0);
        let left_elbow = report
            .feedback
            .iter()
            .find(|f| f.joint == AngleJoint::LeftElbow)
            .unwrap();
        assert!(left_elbow.severity.is_actionable());
        assert!(left_elbow.diff_deg > 20.0);
    }
}
