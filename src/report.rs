//! End-of-session summary.
//!
//! The engine persists nothing itself. A [`SessionReport`] bundles what a
//! storage layer needs (when the session started, who trained, the final
//! stats) and renders the plain-text log format used by the app.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::engine::{UserProfile, WorkoutEngine};
use crate::stats::StatsSnapshot;

/// Timestamp layout used in session headers and log file names.
pub const SESSION_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub started_at: DateTime<Local>,
    pub profile: UserProfile,
    pub stats: StatsSnapshot,
}

impl SessionReport {
    pub fn new(started_at: DateTime<Local>, profile: UserProfile, stats: StatsSnapshot) -> Self {
        Self {
            started_at,
            profile,
            stats,
        }
    }

    /// Snapshot an engine's current state.
    pub fn from_engine<C: Clock>(started_at: DateTime<Local>, engine: &WorkoutEngine<C>) -> Self {
        Self::new(started_at, engine.profile().clone(), engine.snapshot())
    }

    pub fn session_id(&self) -> String {
        self.started_at.format(SESSION_TIMESTAMP_FORMAT).to_string()
    }

    /// Suggested log file name, e.g. `session_20240301_181500.txt`.
    pub fn file_name(&self) -> String {
        format!("session_{}.txt", self.session_id())
    }

    /// Three-line plain-text summary.
    pub fn to_text(&self) -> String {
        let height = self
            .profile
            .height_cm
            .map(|h| format!("{}cm", h))
            .unwrap_or_else(|| "n/a".to_string());
        let gender = self.profile.gender.as_deref().unwrap_or("n/a");

        format!(
            "Session: {}\nUser: Weight={}kg, Height={}, Gender={}\nStats: {}\n",
            self.session_id(),
            self.profile.weight_kg,
            height,
            gender,
            self.stats
        )
    }
}
