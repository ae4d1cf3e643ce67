//! Session statistics.
//!
//! [`aggregate`] reads the detectors and the calorie ledger and composes an
//! immutable [`StatsSnapshot`]. It keeps no state of its own, so a snapshot
//! can be taken at any point without disturbing detection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::calories::CalorieLedger;
use crate::jump_detection::JumpDetector;
use crate::punch_detection::PunchDetector;
use crate::types::{Activity, Side};

/// Point-in-time view of a workout session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Punches from both arms.
    pub punch_count: u32,
    pub left_punches: u32,
    pub right_punches: u32,
    pub jump_count: u32,

    /// Faster of the two arms' current wrist speed (units/s).
    pub current_punch_speed: f32,
    pub left_speed: f32,
    pub right_speed: f32,

    pub elapsed_minutes: f64,
    pub boxing_calories: f64,
    pub jump_rope_calories: f64,
    /// Sum over the ledger's configured session activities.
    pub total_calories: f64,
}

impl StatsSnapshot {
    pub fn punches(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left_punches,
            Side::Right => self.right_punches,
        }
    }

    pub fn calories(&self, activity: Activity) -> f64 {
        match activity {
            Activity::Boxing => self.boxing_calories,
            Activity::JumpRope => self.jump_rope_calories,
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Punches: {} | Speed: {:.2} | Skips: {} | Calories: {:.2}",
            self.punch_count, self.current_punch_speed, self.jump_count, self.total_calories
        )
    }
}

/// Compose a snapshot from the current detector and ledger state.
pub fn aggregate(
    left: &PunchDetector,
    right: &PunchDetector,
    jump: &JumpDetector,
    ledger: &CalorieLedger,
    weight_kg: f64,
    elapsed_minutes: f64,
) -> StatsSnapshot {
    let left_speed = left.current_velocity();
    let right_speed = right.current_velocity();

    StatsSnapshot {
        punch_count: left.punch_count() + right.punch_count(),
        left_punches: left.punch_count(),
        right_punches: right.punch_count(),
        jump_count: jump.jump_count(),
        current_punch_speed: left_speed.max(right_speed),
        left_speed,
        right_speed,
        elapsed_minutes,
        boxing_calories: ledger.estimate(Activity::Boxing, weight_kg, elapsed_minutes),
        jump_rope_calories: ledger.estimate(Activity::JumpRope, weight_kg, elapsed_minutes),
        total_calories: ledger.session_total(weight_kg, elapsed_minutes),
    }
}
