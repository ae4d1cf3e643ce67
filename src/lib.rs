//! Pose Workout Engine Library
//!
//! A motion-event kernel that turns a stream of body-landmark frames from a
//! pose estimator into discrete workout events (punches and jump-rope skips)
//! and a running calorie estimate.
//!
//! # Design Philosophy
//!
//! - **One detector per gesture**: punch and jump detection are each a single
//!   state machine tuned by an explicit config struct. Left and right arms are
//!   two instances of the same punch detector.
//! - **No detection, no change**: a tick without a confident pose leaves every
//!   detector exactly as it was.
//! - **Injected time**: detection logic never reads the wall clock. The engine
//!   asks a [`Clock`], so tests drive synthetic time.
//! - **Derived statistics**: counts, speeds and calories are recomputed into an
//!   immutable [`StatsSnapshot`] on demand.
//!
//! # Example
//!
//! ```ignore
//! use workout_engine::{EngineConfig, UserProfile, WorkoutEngine};
//!
//! let mut engine = WorkoutEngine::new(EngineConfig::default(), UserProfile::new(70.0)?)?;
//!
//! // Each tick: Some(frame) from the pose estimator, or None on low confidence
//! for event in engine.tick(frame) {
//!     println!("{:?}", event);
//! }
//!
//! println!("{}", engine.snapshot());
//! ```

pub mod calories;
pub mod clock;
pub mod engine;
pub mod error;
pub mod history;
pub mod jump_detection;
pub mod landmarks;
pub mod punch_detection;
pub mod report;
pub mod stats;
pub mod types;


// Re-export commonly used types
pub use calories::{CalorieConfig, CalorieLedger, MetTable};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use engine::{EngineConfig, UserProfile, WorkoutEngine};
pub use error::{EngineError, EngineResult};
pub use history::{HistoryBuffer, HISTORY_CAPACITY};
pub use jump_detection::{JumpConfig, JumpDetector, JumpStrategy};
pub use landmarks::{from_mediapipe, PoseLandmark};
pub use punch_detection::{DistanceMetric, ForwardTest, PunchConfig, PunchDetector};
pub use report::SessionReport;
pub use stats::StatsSnapshot;
pub use types::{
    Activity, ArmPose, EventKind, JointId, LandmarkFrame, MotionSample, Point3D, Side,
    WorkoutEvent,
};
