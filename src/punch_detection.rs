//! Punch Detection Module.
//!
//! One [`PunchDetector`] runs per arm. Each tick it takes the shoulder,
//! elbow and wrist of its side and decides whether a punch just landed using:
//! - Wrist velocity over the history window (oldest to newest sample)
//! - Arm extension via the triangle inequality on the three arm joints
//! - Forward direction of the wrist relative to the shoulder
//! - Minimum wrist travel across the window
//!
//! Two guards keep a single punch from being counted twice. The in-progress
//! flag latches on the punch and only releases once the arm is no longer
//! extended. The cooldown additionally spaces consecutive punches of the
//! same arm in time.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calories::CalorieLedger;
use crate::history::HistoryBuffer;
use crate::types::{
    Activity, ArmPose, EventKind, LandmarkFrame, MotionSample, Point3D, Side, WorkoutEvent,
};

/// How distances between landmarks are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Image plane only (x, y). Depth from monocular pose models is noisy.
    #[default]
    Planar,
    /// All three axes.
    Spatial,
}

impl DistanceMetric {
    pub fn distance(&self, a: &Point3D, b: &Point3D) -> f32 {
        match self {
            DistanceMetric::Planar => a.planar_distance_to(b),
            DistanceMetric::Spatial => a.distance_to(b),
        }
    }
}

/// Which wrist displacement counts as "away from the body".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "axis", rename_all = "snake_case")]
pub enum ForwardTest {
    /// Wrist must be `threshold` past the shoulder along x, outward for its
    /// side: negative x for the right arm, positive x for the left.
    Horizontal { threshold: f32 },
    /// Wrist must be `threshold` closer to the camera than the shoulder.
    Depth { threshold: f32 },
}

impl ForwardTest {
    pub fn horizontal() -> Self {
        ForwardTest::Horizontal { threshold: 0.2 }
    }

    pub fn depth() -> Self {
        ForwardTest::Depth { threshold: 0.08 }
    }

    pub fn threshold(&self) -> f32 {
        match self {
            ForwardTest::Horizontal { threshold } | ForwardTest::Depth { threshold } => *threshold,
        }
    }

    pub fn is_forward(&self, side: Side, arm: &ArmPose) -> bool {
        match *self {
            ForwardTest::Horizontal { threshold } => {
                let dx = arm.wrist.x() - arm.shoulder.x();
                match side {
                    Side::Right => dx < -threshold,
                    Side::Left => dx > threshold,
                }
            }
            ForwardTest::Depth { threshold } => arm.wrist.z() - arm.shoulder.z() < -threshold,
        }
    }
}

impl Default for ForwardTest {
    fn default() -> Self {
        Self::horizontal()
    }
}

/// Configuration for punch detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PunchConfig {
    /// Minimum wrist speed to count as a punch (normalized units/s).
    pub speed_threshold: f32,
    /// Minimum time between two punches of the same arm (ms).
    pub cooldown_ms: u64,
    /// Shoulder-to-wrist distance must exceed this fraction of the summed
    /// upper and lower arm lengths.
    pub extension_ratio: f32,
    /// Direction test for the wrist relative to the shoulder.
    pub forward: ForwardTest,
    /// Minimum wrist travel across the history window (normalized units).
    pub min_travel: f32,
    /// Samples required before the velocity estimate is trusted.
    pub min_velocity_samples: usize,
    /// Calories credited for a punch before intensity scaling.
    pub calories_per_punch: f64,
    /// Speed at which the intensity bonus saturates.
    pub intensity_speed_cap: f32,
    /// Distance metric for velocity, travel and extension.
    pub metric: DistanceMetric,
}

impl Default for PunchConfig {
    fn default() -> Self {
        Self {
            speed_threshold: 1.0,               // ~1/3 of the frame width per 330ms
            cooldown_ms: 400,                   // Spacing between punches of one arm
            extension_ratio: 0.9,               // Near-collinear arm
            forward: ForwardTest::horizontal(), // Wrist 0.2 outward of the shoulder
            min_travel: 0.15,                   // Rules out jitter at full extension
            min_velocity_samples: 5,            // Half the history window
            calories_per_punch: 0.1,            // kcal at zero intensity
            intensity_speed_cap: 2.0,           // Double credit at or above this speed
            metric: DistanceMetric::Planar,     // Monocular depth is unreliable
        }
    }
}

impl PunchConfig {
    /// Intensity-scaled calories for a punch at `velocity`:
    /// `base × (1 + min(cap, v) / cap)`, so a punch earns between one and two
    /// times the base amount.
    pub fn calories_for(&self, velocity: f32) -> f64 {
        let cap = self.intensity_speed_cap.max(f32::EPSILON);
        let intensity = velocity.max(0.0).min(cap) / cap;
        self.calories_per_punch * (1.0 + intensity as f64)
    }
}

/// True when the arm is close to a straight line from shoulder to wrist.
pub fn is_arm_extended(arm: &ArmPose, ratio: f32, metric: DistanceMetric) -> bool {
    let upper = metric.distance(&arm.shoulder, &arm.elbow);
    let lower = metric.distance(&arm.elbow, &arm.wrist);
    let direct = metric.distance(&arm.shoulder, &arm.wrist);
    direct > ratio * (upper + lower)
}

/// Per-arm punch state machine.
#[derive(Debug, Clone)]
pub struct PunchDetector {
    side: Side,
    config: PunchConfig,

    // Wrist trajectory
    history: HistoryBuffer,
    velocity: f32,

    // Debounce state
    last_punch_ms: Option<u64>,
    in_progress: bool,

    // Statistics
    punch_count: u32,
}

impl PunchDetector {
    pub fn new(side: Side, config: PunchConfig) -> Self {
        Self {
            side,
            config,
            history: HistoryBuffer::new(),
            velocity: 0.0,
            last_punch_ms: None,
            in_progress: false,
            punch_count: 0,
        }
    }

    /// Process one frame for this detector's arm.
    pub fn process_frame(
        &mut self,
        frame: &LandmarkFrame,
        ledger: &mut CalorieLedger,
    ) -> Option<WorkoutEvent> {
        self.process_arm(&frame.arm(self.side), frame.timestamp_ms, ledger)
    }

    /// Update with this tick's arm joints.
    /// Returns a punch event and credits the ledger if a punch was detected.
    pub fn process_arm(
        &mut self,
        arm: &ArmPose,
        timestamp_ms: u64,
        ledger: &mut CalorieLedger,
    ) -> Option<WorkoutEvent> {
        self.history.push(MotionSample::new(arm.wrist, timestamp_ms));
        self.update_velocity();

        let extended = is_arm_extended(arm, self.config.extension_ratio, self.config.metric);

        if !self.in_progress
            && self.cooldown_elapsed(timestamp_ms)
            && self.velocity_ready()
            && self.velocity > self.config.speed_threshold
            && extended
            && self.config.forward.is_forward(self.side, arm)
            && self.travel() > self.config.min_travel
        {
            return Some(self.register_punch(timestamp_ms, ledger));
        }

        if self.in_progress && !extended {
            self.in_progress = false;
            debug!(side = self.side.name(), timestamp_ms, "arm retracted, punch detector re-armed");
        }

        None
    }

    /// Process a run of frames and return every punch detected.
    pub fn process_batch(
        &mut self,
        frames: &[LandmarkFrame],
        ledger: &mut CalorieLedger,
    ) -> Vec<WorkoutEvent> {
        frames
            .iter()
            .filter_map(|frame| self.process_frame(frame, ledger))
            .collect()
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn config(&self) -> &PunchConfig {
        &self.config
    }

    /// Latest wrist speed estimate (normalized units/s).
    pub fn current_velocity(&self) -> f32 {
        self.velocity
    }

    pub fn punch_count(&self) -> u32 {
        self.punch_count
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn last_punch_ms(&self) -> Option<u64> {
        self.last_punch_ms
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Clear all per-session state.
    pub fn reset(&mut self) {
        self.history.clear();
        self.velocity = 0.0;
        self.last_punch_ms = None;
        self.in_progress = false;
        self.punch_count = 0;
    }

    // =========================================================================
    // PRIVATE METHODS
    // =========================================================================

    fn velocity_ready(&self) -> bool {
        self.history.len() >= self.config.min_velocity_samples
    }

    fn update_velocity(&mut self) {
        if !self.velocity_ready() {
            return;
        }
        let (Some(oldest), Some(newest)) = (self.history.oldest(), self.history.newest()) else {
            return;
        };

        let dt_ms = newest.timestamp_ms.saturating_sub(oldest.timestamp_ms);
        // Identical timestamps: keep the previous estimate.
        if dt_ms == 0 {
            return;
        }

        let distance = self.config.metric.distance(&oldest.position, &newest.position);
        let velocity = distance / (dt_ms as f32 / 1000.0);
        // Overflowing coordinates: keep the previous estimate.
        if velocity.is_finite() {
            self.velocity = velocity;
        }
    }

    fn travel(&self) -> f32 {
        match (self.history.oldest(), self.history.newest()) {
            (Some(oldest), Some(newest)) => {
                self.config.metric.distance(&oldest.position, &newest.position)
            }
            _ => 0.0,
        }
    }

    fn cooldown_elapsed(&self, timestamp_ms: u64) -> bool {
        match self.last_punch_ms {
            Some(last) => timestamp_ms.saturating_sub(last) > self.config.cooldown_ms,
            None => true,
        }
    }

    fn register_punch(&mut self, timestamp_ms: u64, ledger: &mut CalorieLedger) -> WorkoutEvent {
        self.punch_count += 1;
        self.last_punch_ms = Some(timestamp_ms);
        self.in_progress = true;

        let kcal = self.config.calories_for(self.velocity);
        ledger.credit(Activity::for_event(EventKind::Punch), kcal);

        debug!(
            side = self.side.name(),
            timestamp_ms,
            velocity = self.velocity,
            kcal,
            count = self.punch_count,
            "punch detected"
        );

        WorkoutEvent::punch(self.side, timestamp_ms, self.velocity)
    }
}

// ============================================================================
// TESTS
// ============================================================================
