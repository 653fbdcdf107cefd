//! Skeleton connection tables
//!
//! Which keypoint pairs form the drawn skeleton, and which two bone
//! segments each measured angle joint owns (the segments that get
//! highlighted when that joint is off).

use crate::engine::{AngleJoint, JointName};

/// Drawn skeleton: torso box, arms, legs
pub const SKELETON: [(JointName, JointName); 12] = [
    // torso
    (JointName::LeftShoulder, JointName::RightShoulder),
    (JointName::RightShoulder, JointName::RightHip),
    (JointName::RightHip, JointName::LeftHip),
    (JointName::LeftHip, JointName::LeftShoulder),
    // arms
    (JointName::LeftShoulder, JointName::LeftElbow),
    (JointName::LeftElbow, JointName::LeftWrist),
    (JointName::RightShoulder, JointName::RightElbow),
    (JointName::RightElbow, JointName::RightWrist),
    // legs
    (JointName::LeftHip, JointName::LeftKnee),
    (JointName::LeftKnee, JointName::LeftAnkle),
    (JointName::RightHip, JointName::RightKnee),
    (JointName::RightKnee, JointName::RightAnkle),
];

/// The two bone segments adjacent to a measured angle joint
pub fn joint_segments(joint: AngleJoint) -> [(JointName, JointName); 2] {
    match joint {
        AngleJoint::RightElbow => [
            (JointName::RightShoulder, JointName::RightElbow),
            (JointName::RightElbow, JointName::RightWrist),
        ],
        AngleJoint::LeftElbow => [
            (JointName::LeftShoulder, JointName::LeftElbow),
            (JointName::LeftElbow, JointName::LeftWrist),
        ],
        AngleJoint::RightShoulder => [
            (JointName::RightElbow, JointName::RightShoulder),
            (JointName::RightShoulder, JointName::RightHip),
        ],
        AngleJoint::LeftShoulder => [
            (JointName::LeftElbow, JointName::LeftShoulder),
            (JointName::LeftShoulder, JointName::LeftHip),
        ],
        AngleJoint::RightHip => [
            (JointName::RightShoulder, JointName::RightHip),
            (JointName::RightHip, JointName::RightKnee),
        ],
        AngleJoint::LeftHip => [
            (JointName::LeftShoulder, JointName::LeftHip),
            (JointName::LeftHip, JointName::LeftKnee),
        ],
        AngleJoint::RightKnee => [
            (JointName::RightHip, JointName::RightKnee),
            (JointName::RightKnee, JointName::RightAnkle),
        ],
        AngleJoint::LeftKnee => [
            (JointName::LeftHip, JointName::LeftKnee),
            (JointName::LeftKnee, JointName::LeftAnkle),
        ],
    }
}

/// Whether `segment` is one of the two bones owned by `joint`, in either
/// direction.
pub fn segment_belongs_to(joint: AngleJoint, segment: (JointName, JointName)) -> bool {
    joint_segments(joint).iter().any(|&(a, b)| {
        (a == segment.0 && b == segment.1) || (a == segment.1 && b == segment.0)
    })
}
