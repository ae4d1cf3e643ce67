//! Calorie accounting.
//!
//! Energy expenditure blends two sources:
//! - a time-based baseline, `MET × weight_kg × hours`, damped so it does not
//!   double count the work already credited per event
//! - per-event credits pushed in by the detectors as punches and jumps land
//!
//! Credits only ever accumulate. The baseline is recomputed from the elapsed
//! duration each time a total is requested.

use serde::{Deserialize, Serialize};

use crate::types::Activity;

/// MET value per activity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetTable {
    pub boxing: f64,
    pub jump_rope: f64,
}

impl MetTable {
    pub fn met(&self, activity: Activity) -> f64 {
        match activity {
            Activity::Boxing => self.boxing,
            Activity::JumpRope => self.jump_rope,
        }
    }
}

impl Default for MetTable {
    fn default() -> Self {
        Self {
            boxing: Activity::Boxing.default_met(),
            jump_rope: Activity::JumpRope.default_met(),
        }
    }
}

/// Configuration for the calorie model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalorieConfig {
    pub met_table: MetTable,
    /// Factor applied to the time-based baseline (0.0-1.0).
    pub baseline_damping: f64,
    /// Activities whose estimates are summed into the session total.
    pub session_activities: Vec<Activity>,
}

impl Default for CalorieConfig {
    fn default() -> Self {
        Self {
            met_table: MetTable::default(),
            baseline_damping: 0.7,
            session_activities: Activity::ALL.to_vec(),
        }
    }
}

/// Per-activity calorie accumulator.
#[derive(Debug, Clone)]
pub struct CalorieLedger {
    config: CalorieConfig,
    accumulated: [f64; Activity::COUNT],
}

impl CalorieLedger {
    pub fn new(config: CalorieConfig) -> Self {
        Self {
            config,
            accumulated: [0.0; Activity::COUNT],
        }
    }

    pub fn config(&self) -> &CalorieConfig {
        &self.config
    }

    /// Add event-based calories. Non-finite or negative amounts are ignored
    /// so the accumulator never decreases.
    pub fn credit(&mut self, activity: Activity, kcal: f64) {
        if kcal.is_finite() && kcal > 0.0 {
            self.accumulated[Self::slot(activity)] += kcal;
        }
    }

    /// Event-based calories credited so far for one activity.
    pub fn accumulated(&self, activity: Activity) -> f64 {
        self.accumulated[Self::slot(activity)]
    }

    /// Damped time-based component of [`CalorieLedger::estimate`].
    pub fn baseline(&self, activity: Activity, weight_kg: f64, duration_minutes: f64) -> f64 {
        let weight_kg = sanitize(weight_kg);
        let hours = sanitize(duration_minutes) / 60.0;
        self.config.met_table.met(activity) * weight_kg * hours * self.config.baseline_damping
    }

    /// Damped MET baseline plus the activity's accumulated event credits.
    pub fn estimate(&self, activity: Activity, weight_kg: f64, duration_minutes: f64) -> f64 {
        self.baseline(activity, weight_kg, duration_minutes) + self.accumulated(activity)
    }

    /// Sum of [`CalorieLedger::estimate`] over the configured session activities.
    pub fn session_total(&self, weight_kg: f64, duration_minutes: f64) -> f64 {
        self.config
            .session_activities
            .iter()
            .map(|activity| self.estimate(*activity, weight_kg, duration_minutes))
            .sum()
    }

    pub fn reset(&mut self) {
        self.accumulated = [0.0; Activity::COUNT];
    }

    fn slot(activity: Activity) -> usize {
        match activity {
            Activity::Boxing => 0,
            Activity::JumpRope => 1,
        }
    }
}

impl Default for CalorieLedger {
    fn default() -> Self {
        Self::new(CalorieConfig::default())
    }
}

// Non-finite or negative inputs contribute nothing.
fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
