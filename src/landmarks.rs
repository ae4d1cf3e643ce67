//! Adapters from pose-estimator output to [`LandmarkFrame`].
//!
//! The MediaPipe pose model reports 33 landmarks per person. Only the ten
//! joints the detectors read are kept.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::{JointId, LandmarkFrame, Point3D};

/// Number of landmarks in the MediaPipe pose topology.
pub const MEDIAPIPE_LANDMARK_COUNT: usize = 33;

/// One landmark as reported by the pose estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseLandmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Estimator confidence that the point is visible. Not used for gating.
    #[serde(default)]
    pub visibility: Option<f32>,
}

impl PoseLandmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility: None,
        }
    }

    pub fn position(&self) -> Point3D {
        Point3D::new(self.x, self.y, self.z)
    }
}

/// Index of a joint in the MediaPipe pose topology.
pub fn mediapipe_index(joint: JointId) -> usize {
    match joint {
        JointId::LeftShoulder => 11,
        JointId::RightShoulder => 12,
        JointId::LeftElbow => 13,
        JointId::RightElbow => 14,
        JointId::LeftWrist => 15,
        JointId::RightWrist => 16,
        JointId::LeftHip => 23,
        JointId::RightHip => 24,
        JointId::LeftAnkle => 27,
        JointId::RightAnkle => 28,
    }
}

/// Build a frame from a full MediaPipe landmark list.
pub fn from_mediapipe(timestamp_ms: u64, landmarks: &[PoseLandmark]) -> EngineResult<LandmarkFrame> {
    if landmarks.len() != MEDIAPIPE_LANDMARK_COUNT {
        return Err(EngineError::LandmarkCountMismatch {
            expected: MEDIAPIPE_LANDMARK_COUNT,
            actual: landmarks.len(),
        });
    }

    let joints = JointId::ALL.map(|joint| landmarks[mediapipe_index(joint)].position());
    LandmarkFrame::new(timestamp_ms, joints)
}

impl LandmarkFrame {
    /// Build a frame from `(joint, position)` pairs in any order.
    /// Every joint must be present. Later duplicates overwrite earlier ones.
    pub fn from_joints<I>(timestamp_ms: u64, joints: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = (JointId, Point3D)>,
    {
        let mut slots: [Option<Point3D>; JointId::COUNT] = [None; JointId::COUNT];
        for (joint, position) in joints {
            slots[joint.index()] = Some(position);
        }

        let mut positions = [Point3D::new(0.0, 0.0, 0.0); JointId::COUNT];
        for joint in JointId::ALL {
            positions[joint.index()] = slots[joint.index()].ok_or(EngineError::MissingJoint(joint))?;
        }
        LandmarkFrame::new(timestamp_ms, positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mediapipe_pose() -> Vec<PoseLandmark> {
        (0..MEDIAPIPE_LANDMARK_COUNT)
            .map(|i| PoseLandmark::new(i as f32 / 100.0, 0.5, 0.0))
            .collect()
    }

    #[test]
    fn test_mediapipe_indices_mapped() {
        let frame = from_mediapipe(42, &mediapipe_pose()).unwrap();

        assert_eq!(frame.timestamp_ms, 42);
        assert!((frame.joint(JointId::RightWrist).x() - 0.16).abs() < 1e-6);
        assert!((frame.joint(JointId::LeftShoulder).x() - 0.11).abs() < 1e-6);
        assert!((frame.joint(JointId::RightAnkle).x() - 0.28).abs() < 1e-6);
    }

    #[test]
    fn test_mediapipe_wrong_count_rejected() {
        let mut pose = mediapipe_pose();
        pose.truncate(17);

        match from_mediapipe(0, &pose) {
            Err(EngineError::LandmarkCountMismatch { expected, actual }) => {
                assert_eq!(expected, 33);
                assert_eq!(actual, 17);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_mediapipe_non_finite_rejected() {
        let mut pose = mediapipe_pose();
        pose[15].y = f32::NAN;

        assert!(matches!(
            from_mediapipe(0, &pose),
            Err(EngineError::NonFiniteCoordinate { joint: JointId::LeftWrist })
        ));
    }

    #[test]
    fn test_ignored_landmarks_may_be_non_finite() {
        let mut pose = mediapipe_pose();
        pose[0].x = f32::NAN; // nose
        assert!(from_mediapipe(0, &pose).is_ok());
    }

    #[test]
    fn test_landmark_json() {
        let json = r#"{"x": 0.4, "y": 0.6, "z": -0.1, "visibility": 0.93}"#;
        let landmark: PoseLandmark = serde_json::from_str(json).unwrap();
        assert_eq!(landmark.visibility, Some(0.93));

        let bare: PoseLandmark = serde_json::from_str(r#"{"x": 0.4, "y": 0.6, "z": 0.0}"#).unwrap();
        assert_eq!(bare.visibility, None);
    }

    #[test]
    fn test_from_joints_requires_every_joint() {
        let partial = JointId::ALL
            .iter()
            .filter(|j| **j != JointId::LeftAnkle)
            .map(|j| (*j, Point3D::new(0.5, 0.5, 0.0)));

        assert!(matches!(
            LandmarkFrame::from_joints(0, partial),
            Err(EngineError::MissingJoint(JointId::LeftAnkle))
        ));
    }

    #[test]
    fn test_from_joints_any_order() {
        let pairs: Vec<_> = JointId::ALL
            .iter()
            .rev()
            .map(|j| (*j, Point3D::new(j.index() as f32 / 10.0, 0.0, 0.0)))
            .collect();

        let frame = LandmarkFrame::from_joints(7, pairs).unwrap();
        for joint in JointId::ALL {
            assert!((frame.joint(joint).x() - joint.index() as f32 / 10.0).abs() < 1e-6);
        }
    }
}
