//! Overlay plan builder
//!
//! Turns one [`FrameReport`] into plain render instructions — dots,
//! colored bones, text lines, a progress bar — for whatever renderer the
//! host plugs in (2D canvas, WebGL, anything). The engine never draws.

use serde::Serialize;

use crate::engine::{EngineConfig, FrameReport, JointName, PoseFrame, Severity};

use super::skeleton::{segment_belongs_to, SKELETON};

/// Pass/warn/fail coloring for a skeleton segment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentColor {
    Pass,
    Warn,
    Fail,
}

impl From<Severity> for SegmentColor {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Good => SegmentColor::Pass,
            Severity::Warning => SegmentColor::Warn,
            Severity::Error => SegmentColor::Fail,
        }
    }
}

/// One keypoint dot, unit-square coordinates
#[derive(Clone, Copy, Debug, Serialize)]
pub struct OverlayPoint {
    pub joint: JointName,
    pub x: f32,
    pub y: f32,
    pub label: &'static str,
}

/// One skeleton bone, unit-square coordinates
#[derive(Clone, Copy, Debug, Serialize)]
pub struct OverlaySegment {
    pub from: JointName,
    pub to: JointName,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub color: SegmentColor,
    /// Draw thicker: this bone belongs to an off joint
    pub emphasized: bool,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct HoldProgress {
    /// Fill fraction in [0, 1]
    pub fraction: f32,
    pub held_secs: f64,
    pub required_secs: f64,
}

/// Render instructions for one frame
#[derive(Clone, Debug, Serialize)]
pub struct OverlayPlan {
    pub points: Vec<OverlayPoint>,
    pub segments: Vec<OverlaySegment>,
    pub similarity_pct: f32,
    /// Full-frame status text, when the frame warrants one
    pub banner: Option<String>,
    /// Correction lines, truncated with an "... and N more" tail
    pub feedback_lines: Vec<String>,
    pub progress: Option<HoldProgress>,
}

/// Build the overlay plan for one frame report.
pub fn build_plan(report: &FrameReport, config: &EngineConfig) -> OverlayPlan {
    let frame = PoseFrame::from_keypoints(&report.keypoints);

    let points = report
        .keypoints
        .iter()
        .filter(|kp| kp.confidence > config.draw_confidence)
        .map(|kp| OverlayPoint {
            joint: kp.name,
            x: kp.x,
            y: kp.y,
            label: kp.name.name(),
        })
        .collect();

    let segments = SKELETON
        .iter()
        .filter_map(|&(from, to)| {
            let a = frame.usable(from, config.draw_confidence)?;
            let b = frame.usable(to, config.draw_confidence)?;
            let color = segment_color(report, (from, to));
            Some(OverlaySegment {
                from,
                to,
                x1: a.x,
                y1: a.y,
                x2: b.x,
                y2: b.y,
                color,
                emphasized: color != SegmentColor::Pass,
            })
        })
        .collect();

    OverlayPlan {
        points,
        segments,
        similarity_pct: report.similarity_pct,
        banner: banner_for(report),
        feedback_lines: feedback_lines(report, config.max_feedback_lines),
        progress: progress_for(report),
    }
}

/// Worst severity among the angle joints this bone belongs to.
fn segment_color(report: &FrameReport, segment: (JointName, JointName)) -> SegmentColor {
    report
        .feedback
        .iter()
        .filter(|item| segment_belongs_to(item.joint, segment))
        .map(|item| item.severity)
        .max()
        .map(SegmentColor::from)
        .unwrap_or(SegmentColor::Pass)
}

fn banner_for(report: &FrameReport) -> Option<String> {
    if !report.pose_detected {
        return Some("No pose detected - please stand in frame".to_string());
    }
    if !report.pose_clear {
        return Some("Pose not clear - adjust your position".to_string());
    }
    if report.hold.achieved {
        return Some("Perfect Match!".to_string());
    }
    None
}

fn feedback_lines(report: &FrameReport, max_lines: usize) -> Vec<String> {
    let actionable: Vec<_> = report
        .feedback
        .iter()
        .filter(|item| item.severity.is_actionable())
        .collect();

    let mut lines: Vec<String> = actionable
        .iter()
        .take(max_lines)
        .map(|item| item.correction_line())
        .collect();
    if actionable.len() > max_lines {
        lines.push(format!(
            "... and {} more adjustments needed",
            actionable.len() - max_lines
        ));
    }
    lines
}

fn progress_for(report: &FrameReport) -> Option<HoldProgress> {
    if !(report.hold.holding || report.hold.achieved) {
        return None;
    }
    let fraction = if report.hold.required_secs > 0.0 {
        (report.hold.held_secs / report.hold.required_secs).clamp(0.0, 1.0) as f32
    } else {
        1.0
    };
    Some(HoldProgress {
        fraction,
        held_secs: report.hold.held_secs,
        required_secs: report.hold.required_secs,
    })
}
