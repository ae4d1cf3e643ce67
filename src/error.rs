//! Error types for the workout engine.
//!
//! Runtime conditions that the engine tolerates (a tick with no detection,
//! a zero time delta) are not errors and never show up here. These variants
//! cover boundary validation only: malformed frames, bad configuration and
//! unknown activity names.

use crate::types::JointId;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Unknown activity: {0}")]
    UnknownActivity(String),

    #[error("Landmark frame is missing joint {0:?}")]
    MissingJoint(JointId),

    #[error("Joint {joint:?} has a non-finite coordinate")]
    NonFiniteCoordinate { joint: JointId },

    #[error("Expected {expected} pose landmarks, got {actual}")]
    LandmarkCountMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid user profile: {0}")]
    InvalidProfile(String),

    #[error("Failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
