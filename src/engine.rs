//! Workout engine tying the detectors, the calorie ledger and the clock together.
//!
//! One engine tracks one person for one session. Each tick the pose
//! collaborator hands over either a complete [`LandmarkFrame`] or nothing:
//!
//! 1. **Gate**: missing or out-of-order frames are skipped, state untouched
//! 2. **Punches**: left and right arm detectors run independently
//! 3. **Jumps**: the jump detector reads hips and ankles
//! 4. **Calories**: detectors credit the shared ledger as events fire
//!
//! Statistics are never cached. [`WorkoutEngine::snapshot`] recomputes them
//! from detector state and the elapsed time reported by the injected clock.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, trace, warn};

use crate::calories::{CalorieConfig, CalorieLedger};
use crate::clock::{Clock, MonotonicClock};
use crate::error::{EngineError, EngineResult};
use crate::history::HISTORY_CAPACITY;
use crate::jump_detection::{JumpConfig, JumpDetector, JumpStrategy};
use crate::punch_detection::{PunchConfig, PunchDetector};
use crate::stats::{aggregate, StatsSnapshot};
use crate::types::{Activity, LandmarkFrame, Side, WorkoutEvent};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for a complete engine.
///
/// Every field has a default, so a JSON file only needs to name the values
/// it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub punch: PunchConfig,
    pub jump: JumpConfig,
    pub calories: CalorieConfig,
    /// Confidence below which a pose detection counts as "no detection".
    pub min_detection_confidence: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            punch: PunchConfig::default(),
            jump: JumpConfig::default(),
            calories: CalorieConfig::default(),
            min_detection_confidence: 0.7,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_pretty(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> EngineResult<()> {
        let punch = &self.punch;

        if !(punch.speed_threshold.is_finite() && punch.speed_threshold > 0.0) {
            return Err(invalid(format!(
                "Invalid punch speed threshold: {}. Must be positive",
                punch.speed_threshold
            )));
        }

        if !(punch.extension_ratio > 0.0 && punch.extension_ratio <= 1.0) {
            return Err(invalid(format!(
                "Invalid extension ratio: {}. Must be in (0.0, 1.0]",
                punch.extension_ratio
            )));
        }

        let forward = punch.forward.threshold();
        if !(forward.is_finite() && forward >= 0.0) {
            return Err(invalid(format!(
                "Invalid forward threshold: {}. Must be non-negative",
                forward
            )));
        }

        if !(punch.min_travel.is_finite() && punch.min_travel >= 0.0) {
            return Err(invalid(format!(
                "Invalid minimum punch travel: {}. Must be non-negative",
                punch.min_travel
            )));
        }

        // Velocity spans oldest to newest, so it needs two samples and can
        // never see more than the history holds.
        if !(2..=HISTORY_CAPACITY).contains(&punch.min_velocity_samples) {
            return Err(invalid(format!(
                "Invalid velocity sample count: {}. Must be between 2 and {}",
                punch.min_velocity_samples, HISTORY_CAPACITY
            )));
        }

        if !(punch.intensity_speed_cap.is_finite() && punch.intensity_speed_cap > 0.0) {
            return Err(invalid(format!(
                "Invalid intensity speed cap: {}. Must be positive",
                punch.intensity_speed_cap
            )));
        }

        check_calories("calories per punch", punch.calories_per_punch)?;
        check_calories("calories per jump", self.jump.calories_per_jump)?;

        match self.jump.strategy {
            JumpStrategy::HeightRatio { threshold } => {
                if !threshold.is_finite() {
                    return Err(invalid(format!(
                        "Invalid jump height threshold: {}",
                        threshold
                    )));
                }
            }
            JumpStrategy::Displacement { min_rise, .. } => {
                if !(min_rise.is_finite() && min_rise > 0.0) {
                    return Err(invalid(format!(
                        "Invalid jump minimum rise: {}. Must be positive",
                        min_rise
                    )));
                }
            }
        }

        for activity in Activity::ALL {
            let met = self.calories.met_table.met(activity);
            if !(met.is_finite() && met > 0.0) {
                return Err(invalid(format!(
                    "Invalid MET for {}: {}. Must be positive",
                    activity, met
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.calories.baseline_damping) {
            return Err(invalid(format!(
                "Invalid baseline damping: {}. Must be between 0.0 and 1.0",
                self.calories.baseline_damping
            )));
        }

        if !(0.0..=1.0).contains(&self.min_detection_confidence) {
            return Err(invalid(format!(
                "Invalid detection confidence: {}. Must be between 0.0 and 1.0",
                self.min_detection_confidence
            )));
        }

        Ok(())
    }
}

fn invalid(message: String) -> EngineError {
    EngineError::InvalidConfig(message)
}

fn check_calories(name: &str, kcal: f64) -> EngineResult<()> {
    if kcal.is_finite() && kcal >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("Invalid {}: {}. Must be non-negative", name, kcal)))
    }
}

// ============================================================================
// USER PROFILE
// ============================================================================

/// The person being tracked.
///
/// Only the weight feeds the calorie model. Height and gender are carried
/// for the session report and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub weight_kg: f64,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub gender: Option<String>,
}

impl UserProfile {
    pub fn new(weight_kg: f64) -> EngineResult<Self> {
        let profile = Self {
            weight_kg,
            height_cm: None,
            gender: None,
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn with_height(mut self, height_cm: f64) -> EngineResult<Self> {
        self.height_cm = Some(height_cm);
        self.validate()?;
        Ok(self)
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !(self.weight_kg.is_finite() && self.weight_kg > 0.0) {
            return Err(EngineError::InvalidProfile(format!(
                "weight must be a positive number of kilograms, got {}",
                self.weight_kg
            )));
        }
        if let Some(height) = self.height_cm {
            if !(height.is_finite() && height > 0.0) {
                return Err(EngineError::InvalidProfile(format!(
                    "height must be a positive number of centimeters, got {}",
                    height
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Frame-synchronous workout engine.
pub struct WorkoutEngine<C: Clock = MonotonicClock> {
    config: EngineConfig,
    profile: UserProfile,
    clock: C,

    // Detectors
    left: PunchDetector,
    right: PunchDetector,
    jump: JumpDetector,
    ledger: CalorieLedger,

    // Session tracking
    session_start_ms: u64,
    last_frame_ms: Option<u64>,
    frames_processed: u64,
    frames_skipped: u64,
}

impl WorkoutEngine<MonotonicClock> {
    /// Creates an engine timed by the process monotonic clock.
    pub fn new(config: EngineConfig, profile: UserProfile) -> EngineResult<Self> {
        Self::with_clock(config, profile, MonotonicClock::new())
    }
}

impl<C: Clock> WorkoutEngine<C> {
    /// Creates an engine timed by `clock`. The session starts now.
    pub fn with_clock(config: EngineConfig, profile: UserProfile, clock: C) -> EngineResult<Self> {
        config.validate()?;
        profile.validate()?;

        let session_start_ms = clock.now_ms();
        info!(
            weight_kg = profile.weight_kg,
            session_start_ms, "workout session started"
        );

        Ok(Self {
            left: PunchDetector::new(Side::Left, config.punch.clone()),
            right: PunchDetector::new(Side::Right, config.punch.clone()),
            jump: JumpDetector::new(config.jump.clone()),
            ledger: CalorieLedger::new(config.calories.clone()),
            config,
            profile,
            clock,
            session_start_ms,
            last_frame_ms: None,
            frames_processed: 0,
            frames_skipped: 0,
        })
    }

    /// Runs every detector on one tick.
    ///
    /// `None` means the pose collaborator had no confident detection; the
    /// tick is skipped and no state changes. A frame older than the last one
    /// processed is skipped as well. Returns at most one punch per arm and
    /// at most one jump.
    pub fn process_frame(&mut self, frame: Option<&LandmarkFrame>) -> Vec<WorkoutEvent> {
        let Some(frame) = frame else {
            self.frames_skipped += 1;
            trace!("no pose detected, tick skipped");
            return Vec::new();
        };

        if let Some(last) = self.last_frame_ms {
            if frame.timestamp_ms < last {
                self.frames_skipped += 1;
                warn!(
                    timestamp_ms = frame.timestamp_ms,
                    last_frame_ms = last,
                    "out-of-order frame skipped"
                );
                return Vec::new();
            }
        }

        self.last_frame_ms = Some(frame.timestamp_ms);
        self.frames_processed += 1;

        let mut events = Vec::with_capacity(3);
        events.extend(self.left.process_frame(frame, &mut self.ledger));
        events.extend(self.right.process_frame(frame, &mut self.ledger));
        events.extend(self.jump.process_frame(frame, &mut self.ledger));
        events
    }

    /// Like [`WorkoutEngine::process_frame`], but timestamps the frame with
    /// the engine clock first.
    pub fn tick(&mut self, frame: Option<LandmarkFrame>) -> Vec<WorkoutEvent> {
        let now_ms = self.clock.now_ms();
        let frame = frame.map(|frame| frame.with_timestamp(now_ms));
        self.process_frame(frame.as_ref())
    }

    /// Treats detections below the configured minimum confidence as absent.
    pub fn process_detection(&mut self, frame: &LandmarkFrame, confidence: f32) -> Vec<WorkoutEvent> {
        if confidence.is_nan() || confidence < self.config.min_detection_confidence {
            self.process_frame(None)
        } else {
            self.process_frame(Some(frame))
        }
    }

    /// Processes frames in order and returns all events.
    pub fn process_batch(&mut self, frames: &[Option<LandmarkFrame>]) -> Vec<WorkoutEvent> {
        frames
            .iter()
            .flat_map(|frame| self.process_frame(frame.as_ref()))
            .collect()
    }

    /// Current statistics at the clock's present time.
    pub fn snapshot(&self) -> StatsSnapshot {
        aggregate(
            &self.left,
            &self.right,
            &self.jump,
            &self.ledger,
            self.profile.weight_kg,
            self.elapsed_minutes(),
        )
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.clock.now_ms().saturating_sub(self.session_start_ms)
    }

    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed_ms() as f64 / 60_000.0
    }

    /// Calorie estimate for one activity at the clock's present time.
    pub fn estimate(&self, activity: Activity) -> f64 {
        self.ledger
            .estimate(activity, self.profile.weight_kg, self.elapsed_minutes())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn punch_detector(&self, side: Side) -> &PunchDetector {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn jump_detector(&self) -> &JumpDetector {
        &self.jump
    }

    pub fn ledger(&self) -> &CalorieLedger {
        &self.ledger
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn session_start_ms(&self) -> u64 {
        self.session_start_ms
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }

    /// Starts a fresh session: counts, credits and history are cleared and
    /// elapsed time restarts from now.
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        self.jump.reset();
        self.ledger.reset();

        self.session_start_ms = self.clock.now_ms();
        self.last_frame_ms = None;
        self.frames_processed = 0;
        self.frames_skipped = 0;

        info!(session_start_ms = self.session_start_ms, "workout session reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::types::{EventKind, JointId, Point3D};

    fn neutral_frame(timestamp_ms: u64) -> LandmarkFrame {
        let joints = JointId::ALL.map(|joint| match joint {
            JointId::LeftHip | JointId::RightHip => Point3D::new(0.5, 0.6, 0.0),
            JointId::LeftAnkle | JointId::RightAnkle => Point3D::new(0.5, 0.9, 0.0),
            _ => Point3D::new(0.5, 0.3, 0.0),
        });
        LandmarkFrame::new(timestamp_ms, joints).unwrap()
    }

    fn engine(clock: ManualClock) -> WorkoutEngine<ManualClock> {
        WorkoutEngine::with_clock(EngineConfig::default(), UserProfile::new(70.0).unwrap(), clock)
            .unwrap()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_config() {
        let config = EngineConfig::from_json_str(
            r#"{
                "punch": { "speed_threshold": 1.5, "cooldown_ms": 300 },
                "jump": { "strategy": { "kind": "displacement", "min_rise": 0.1, "cooldown_ms": 350 } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.punch.speed_threshold, 1.5);
        assert_eq!(config.punch.cooldown_ms, 300);
        assert_eq!(config.punch.extension_ratio, 0.9);
        assert_eq!(
            config.jump.strategy,
            JumpStrategy::Displacement { min_rise: 0.1, cooldown_ms: 350 }
        );
        assert_eq!(config.jump.calories_per_jump, 0.07);
        assert_eq!(config.calories.met_table.boxing, 7.5);
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = EngineConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.punch.extension_ratio = 1.5;
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));

        let mut config = EngineConfig::default();
        config.punch.min_velocity_samples = HISTORY_CAPACITY + 1;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.calories.met_table.jump_rope = 0.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.jump.calories_per_jump = -0.1;
        assert!(config.validate().is_err());

        assert!(matches!(
            EngineConfig::from_json_str("{ not json"),
            Err(EngineError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_missing_config_file() {
        assert!(matches!(
            EngineConfig::from_json_file("/nonexistent/workout-engine.json"),
            Err(EngineError::ConfigIo(_))
        ));
    }

    #[test]
    fn test_profile_validation() {
        assert!(UserProfile::new(70.0).is_ok());
        assert!(UserProfile::new(0.0).is_err());
        assert!(UserProfile::new(f64::NAN).is_err());
        assert!(UserProfile::new(70.0).unwrap().with_height(-180.0).is_err());

        let profile = UserProfile::new(70.0).unwrap().with_height(180.0).unwrap().with_gender("F");
        assert_eq!(profile.height_cm, Some(180.0));
        assert_eq!(profile.gender.as_deref(), Some("F"));
    }

    #[test]
    fn test_none_frame_leaves_state_untouched() {
        let clock = ManualClock::new(0);
        let mut engine = engine(clock.clone());

        engine.process_frame(Some(&neutral_frame(0)));
        let before = engine.snapshot();

        assert!(engine.process_frame(None).is_empty());
        assert_eq!(engine.snapshot(), before);
        assert_eq!(engine.frames_processed(), 1);
        assert_eq!(engine.frames_skipped(), 1);
        assert_eq!(engine.punch_detector(Side::Left).history().len(), 1);
    }

    #[test]
    fn test_low_confidence_detection_skipped() {
        let mut engine = engine(ManualClock::new(0));
        engine.process_detection(&neutral_frame(0), 0.5);
        assert_eq!(engine.frames_processed(), 0);

        engine.process_detection(&neutral_frame(33), 0.9);
        assert_eq!(engine.frames_processed(), 1);
    }

    #[test]
    fn test_out_of_order_frame_skipped() {
        let mut engine = engine(ManualClock::new(0));
        engine.process_frame(Some(&neutral_frame(100)));
        engine.process_frame(Some(&neutral_frame(50)));

        assert_eq!(engine.frames_processed(), 1);
        assert_eq!(engine.frames_skipped(), 1);
        assert_eq!(engine.jump_detector().history().len(), 1);
    }

    #[test]
    fn test_tick_stamps_frames_from_clock() {
        let clock = ManualClock::new(5_000);
        let mut engine = engine(clock.clone());

        clock.advance(40);
        engine.tick(Some(neutral_frame(0)));

        let newest = engine.jump_detector().history().newest().unwrap();
        assert_eq!(newest.timestamp_ms, 5_040);
    }

    #[test]
    fn test_elapsed_time_drives_baseline() {
        let clock = ManualClock::new(1_000);
        let engine = engine(clock.clone());

        clock.advance(10 * 60_000);

        assert!((engine.elapsed_minutes() - 10.0).abs() < 1e-12);
        assert!((engine.estimate(Activity::Boxing) - 61.25).abs() < 1e-9);
    }

    #[test]
    fn test_jump_through_engine() {
        let mut engine = engine(ManualClock::new(0));

        let high = {
            let joints = JointId::ALL.map(|joint| match joint {
                JointId::LeftHip | JointId::RightHip => Point3D::new(0.5, 0.9, 0.0),
                JointId::LeftAnkle | JointId::RightAnkle => Point3D::new(0.5, 0.5, 0.0),
                _ => Point3D::new(0.5, 0.3, 0.0),
            });
            LandmarkFrame::new(33, joints).unwrap()
        };

        engine.process_frame(Some(&neutral_frame(0)));
        let events = engine.process_frame(Some(&high));
        engine.process_frame(Some(&neutral_frame(66)));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Jump);
        assert_eq!(engine.snapshot().jump_count, 1);
    }

    #[test]
    fn test_reset_restarts_session() {
        let clock = ManualClock::new(0);
        let mut engine = engine(clock.clone());
        engine.process_frame(Some(&neutral_frame(0)));
        clock.advance(120_000);

        engine.reset();

        assert_eq!(engine.session_start_ms(), 120_000);
        assert_eq!(engine.elapsed_ms(), 0);
        assert_eq!(engine.frames_processed(), 0);
        assert_eq!(engine.snapshot(), StatsSnapshot::default());
    }
}
