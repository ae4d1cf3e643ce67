//! Core data types for the workout engine.
//!
//! Everything that flows between the pose collaborator, the detectors and
//! the stats aggregator is defined here. If a concept exists it gets a type:
//! joints are an enum rather than raw MediaPipe indices, sides are an enum
//! rather than strings, and activities are a closed set.
//!
//! Coordinates follow the pose collaborator's contract: x and y are
//! normalized to the image frame (roughly 0.0 to 1.0, y grows downward) and
//! z is a relative depth where smaller means closer to the camera.

use std::fmt;
use std::str::FromStr;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

// ============================================================================
// GEOMETRY
// ============================================================================

/// A normalized landmark position.
///
/// Internally a [`nalgebra::Vector3<f32>`] so distance and midpoint math stay
/// one-liners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D(pub Vector3<f32>);

impl Point3D {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vector3::new(x, y, z))
    }

    pub fn x(&self) -> f32 {
        self.0.x
    }

    pub fn y(&self) -> f32 {
        self.0.y
    }

    pub fn z(&self) -> f32 {
        self.0.z
    }

    /// Euclidean distance using all three axes.
    pub fn distance_to(&self, other: &Point3D) -> f32 {
        (self.0 - other.0).norm()
    }

    /// Euclidean distance in the image plane (x, y), ignoring depth.
    pub fn planar_distance_to(&self, other: &Point3D) -> f32 {
        let dx = self.0.x - other.0.x;
        let dy = self.0.y - other.0.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point3D) -> Point3D {
        Point3D((self.0 + other.0) * 0.5)
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }
}

// ============================================================================
// JOINTS
// ============================================================================

/// Body side of a limb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn name(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub fn wrist(&self) -> JointId {
        match self {
            Side::Left => JointId::LeftWrist,
            Side::Right => JointId::RightWrist,
        }
    }

    pub fn elbow(&self) -> JointId {
        match self {
            Side::Left => JointId::LeftElbow,
            Side::Right => JointId::RightElbow,
        }
    }

    pub fn shoulder(&self) -> JointId {
        match self {
            Side::Left => JointId::LeftShoulder,
            Side::Right => JointId::RightShoulder,
        }
    }
}

/// The joints the engine tracks. The set is fixed and small.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointId {
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftAnkle,
    RightAnkle,
}

impl JointId {
    pub const COUNT: usize = 10;

    pub const ALL: [JointId; JointId::COUNT] = [
        JointId::LeftShoulder,
        JointId::RightShoulder,
        JointId::LeftElbow,
        JointId::RightElbow,
        JointId::LeftWrist,
        JointId::RightWrist,
        JointId::LeftHip,
        JointId::RightHip,
        JointId::LeftAnkle,
        JointId::RightAnkle,
    ];

    /// Position of this joint inside a [`LandmarkFrame`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn side(&self) -> Side {
        match self {
            JointId::LeftShoulder
            | JointId::LeftElbow
            | JointId::LeftWrist
            | JointId::LeftHip
            | JointId::LeftAnkle => Side::Left,
            _ => Side::Right,
        }
    }
}

// ============================================================================
// FRAMES AND SAMPLES
// ============================================================================

/// Shoulder, elbow and wrist of one arm, read out of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmPose {
    pub shoulder: Point3D,
    pub elbow: Point3D,
    pub wrist: Point3D,
}

/// Immutable snapshot of every tracked joint at one tick.
///
/// A frame is always complete: construction fails if any coordinate is not
/// finite. A tick on which the pose collaborator withheld its output is
/// represented by the absence of a frame (`Option<LandmarkFrame>::None`),
/// never by a partially filled one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandmarkFrame {
    /// Monotonic timestamp in milliseconds.
    pub timestamp_ms: u64,
    joints: [Point3D; JointId::COUNT],
}

impl LandmarkFrame {
    /// Build a frame from positions ordered as [`JointId::ALL`].
    pub fn new(timestamp_ms: u64, joints: [Point3D; JointId::COUNT]) -> EngineResult<Self> {
        for joint in JointId::ALL {
            if !joints[joint.index()].is_finite() {
                return Err(EngineError::NonFiniteCoordinate { joint });
            }
        }
        Ok(Self {
            timestamp_ms,
            joints,
        })
    }

    pub fn joint(&self, id: JointId) -> Point3D {
        self.joints[id.index()]
    }

    pub fn arm(&self, side: Side) -> ArmPose {
        ArmPose {
            shoulder: self.joint(side.shoulder()),
            elbow: self.joint(side.elbow()),
            wrist: self.joint(side.wrist()),
        }
    }

    pub fn mid_hip(&self) -> Point3D {
        self.joint(JointId::LeftHip)
            .midpoint(&self.joint(JointId::RightHip))
    }

    pub fn mid_ankle(&self) -> Point3D {
        self.joint(JointId::LeftAnkle)
            .midpoint(&self.joint(JointId::RightAnkle))
    }

    /// Same joints, new timestamp. Used when the engine stamps frames from its clock.
    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }
}

/// One historical position of a limb.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub position: Point3D,
    pub timestamp_ms: u64,
}

impl MotionSample {
    pub fn new(position: Point3D, timestamp_ms: u64) -> Self {
        Self {
            position,
            timestamp_ms,
        }
    }
}

// ============================================================================
// EVENTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Punch,
    Jump,
}

/// A discrete workout event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkoutEvent {
    pub kind: EventKind,
    /// Arm that punched. Jumps have no side.
    pub side: Option<Side>,
    pub timestamp_ms: u64,
    /// Wrist velocity in units/s for punches, vertical displacement for jumps.
    pub magnitude: f32,
}

impl WorkoutEvent {
    pub fn punch(side: Side, timestamp_ms: u64, velocity: f32) -> Self {
        Self {
            kind: EventKind::Punch,
            side: Some(side),
            timestamp_ms,
            magnitude: velocity,
        }
    }

    pub fn jump(timestamp_ms: u64, displacement: f32) -> Self {
        Self {
            kind: EventKind::Jump,
            side: None,
            timestamp_ms,
            magnitude: displacement,
        }
    }
}

// ============================================================================
// ACTIVITIES
// ============================================================================

/// Activities with a known MET value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Boxing,
    JumpRope,
}

impl Activity {
    pub const COUNT: usize = 2;

    pub const ALL: [Activity; Activity::COUNT] = [Activity::Boxing, Activity::JumpRope];

    /// Reference MET value (Compendium of Physical Activities).
    pub fn default_met(&self) -> f64 {
        match self {
            Activity::Boxing => 7.5,
            Activity::JumpRope => 12.3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Activity::Boxing => "boxing",
            Activity::JumpRope => "jump_rope",
        }
    }

    /// Activity credited by events of the given kind.
    pub fn for_event(kind: EventKind) -> Activity {
        match kind {
            EventKind::Punch => Activity::Boxing,
            EventKind::Jump => Activity::JumpRope,
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activity {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boxing" => Ok(Activity::Boxing),
            "jump_rope" | "jump-rope" | "jumprope" | "skipping" => Ok(Activity::JumpRope),
            _ => Err(EngineError::UnknownActivity(s.to_string())),
        }
    }
}
