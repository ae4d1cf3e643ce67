//! Jump Detection Module.
//!
//! Counts jump-rope skips from hip and ankle heights. Two strategies share
//! one detector:
//! - [`JumpStrategy::HeightRatio`]: hip height relative to the averaged
//!   ankles crosses a threshold. Latches until the ratio drops back.
//! - [`JumpStrategy::Displacement`]: the averaged ankles rise by more than a
//!   minimum amount between two consecutive frames, at most once per cooldown.
//!
//! Coordinates are normalized image coordinates with y growing downward.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calories::CalorieLedger;
use crate::history::HistoryBuffer;
use crate::types::{Activity, EventKind, LandmarkFrame, MotionSample, WorkoutEvent};

/// Jump detection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JumpStrategy {
    /// Fire when `hip.y - avg_ankle.y` exceeds `threshold`.
    HeightRatio { threshold: f32 },
    /// Fire when the averaged ankle rises more than `min_rise` in one frame
    /// and more than `cooldown_ms` have passed since the last jump.
    Displacement { min_rise: f32, cooldown_ms: u64 },
}

impl JumpStrategy {
    pub fn height_ratio() -> Self {
        JumpStrategy::HeightRatio { threshold: 0.3 }
    }

    pub fn displacement() -> Self {
        JumpStrategy::Displacement {
            min_rise: 0.08,
            cooldown_ms: 400,
        }
    }
}

impl Default for JumpStrategy {
    fn default() -> Self {
        Self::height_ratio()
    }
}

/// Configuration for jump detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    pub strategy: JumpStrategy,
    /// Calories credited per detected jump.
    pub calories_per_jump: f64,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            strategy: JumpStrategy::height_ratio(),
            calories_per_jump: 0.07,
        }
    }
}

/// `hip.y - avg_ankle.y` for a frame, using the midpoints of both sides.
pub fn height_ratio(frame: &LandmarkFrame) -> f32 {
    frame.mid_hip().y() - frame.mid_ankle().y()
}

/// Jump state machine.
#[derive(Debug, Clone)]
pub struct JumpDetector {
    config: JumpConfig,

    // Averaged ankle trajectory
    history: HistoryBuffer,
    last_ratio: f32,

    // Debounce state
    in_progress: bool,
    last_jump_ms: Option<u64>,

    // Statistics
    jump_count: u32,
}

impl JumpDetector {
    pub fn new(config: JumpConfig) -> Self {
        Self {
            config,
            history: HistoryBuffer::new(),
            last_ratio: 0.0,
            in_progress: false,
            last_jump_ms: None,
            jump_count: 0,
        }
    }

    /// Process one frame.
    /// Returns a jump event and credits the ledger if a jump was detected.
    pub fn process_frame(
        &mut self,
        frame: &LandmarkFrame,
        ledger: &mut CalorieLedger,
    ) -> Option<WorkoutEvent> {
        let timestamp_ms = frame.timestamp_ms;
        self.history
            .push(MotionSample::new(frame.mid_ankle(), timestamp_ms));
        self.last_ratio = height_ratio(frame);

        match self.config.strategy {
            JumpStrategy::HeightRatio { threshold } => {
                if self.last_ratio > threshold {
                    if !self.in_progress {
                        self.in_progress = true;
                        return Some(self.register_jump(timestamp_ms, self.last_ratio, ledger));
                    }
                } else if self.in_progress {
                    self.in_progress = false;
                    debug!(timestamp_ms, ratio = self.last_ratio, "landed, jump detector re-armed");
                }
                None
            }
            JumpStrategy::Displacement {
                min_rise,
                cooldown_ms,
            } => {
                let rise = self.last_rise()?;
                if rise > min_rise && self.cooldown_elapsed(timestamp_ms, cooldown_ms) {
                    return Some(self.register_jump(timestamp_ms, rise, ledger));
                }
                None
            }
        }
    }

    /// Process a run of frames and return every jump detected.
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

    pub fn config(&self) -> &JumpConfig {
        &self.config
    }

    pub fn jump_count(&self) -> u32 {
        self.jump_count
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn last_jump_ms(&self) -> Option<u64> {
        self.last_jump_ms
    }

    /// Height ratio of the most recent frame.
    pub fn last_ratio(&self) -> f32 {
        self.last_ratio
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.last_ratio = 0.0;
        self.in_progress = false;
        self.last_jump_ms = None;
        self.jump_count = 0;
    }

    // =========================================================================
    // PRIVATE METHODS
    // =========================================================================

    /// Upward movement of the averaged ankle since the previous frame.
    fn last_rise(&self) -> Option<f32> {
        let previous = self.history.previous()?;
        let newest = self.history.newest()?;
        Some(previous.position.y() - newest.position.y())
    }

    fn cooldown_elapsed(&self, timestamp_ms: u64, cooldown_ms: u64) -> bool {
        match self.last_jump_ms {
            Some(last) => timestamp_ms.saturating_sub(last) > cooldown_ms,
            None => true,
        }
    }

    fn register_jump(
        &mut self,
        timestamp_ms: u64,
        magnitude: f32,
        ledger: &mut CalorieLedger,
    ) -> WorkoutEvent {
        self.jump_count += 1;
        self.last_jump_ms = Some(timestamp_ms);
        ledger.credit(Activity::for_event(EventKind::Jump), self.config.calories_per_jump);

        debug!(timestamp_ms, magnitude, count = self.jump_count, "jump detected");

        WorkoutEvent::jump(timestamp_ms, magnitude)
    }
}

impl Default for JumpDetector {
    fn default() -> Self {
        Self::new(JumpConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{JointId, Point3D};

    /// Frame where hips sit at `hip_y` and both ankles at `ankle_y`.
    /// Upper body is parked at a neutral pose.
    fn body_frame(timestamp_ms: u64, hip_y: f32, ankle_y: f32) -> LandmarkFrame {
        let joints = JointId::ALL.map(|joint| match joint {
            JointId::LeftHip => Point3D::new(0.45, hip_y, 0.0),
            JointId::RightHip => Point3D::new(0.55, hip_y, 0.0),
            JointId::LeftAnkle => Point3D::new(0.45, ankle_y, 0.0),
            JointId::RightAnkle => Point3D::new(0.55, ankle_y, 0.0),
            _ => Point3D::new(0.5, 0.3, 0.0),
        });
        LandmarkFrame::new(timestamp_ms, joints).unwrap()
    }

    fn ratio_frame(timestamp_ms: u64, ratio: f32) -> LandmarkFrame {
        body_frame(timestamp_ms, 0.5 + ratio, 0.5)
    }

    #[test]
    fn test_height_ratio_uses_both_sides() {
        let frame = body_frame(0, 0.9, 0.5);
        assert!((height_ratio(&frame) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_rise_and_fall_yields_one_jump() {
        let mut detector = JumpDetector::default();
        let mut ledger = CalorieLedger::default();

        let events: Vec<_> = [0.1, 0.4, 0.1]
            .iter()
            .enumerate()
            .filter_map(|(i, r)| {
                detector.process_frame(&ratio_frame(i as u64 * 33, *r), &mut ledger)
            })
            .collect();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Jump);
        assert_eq!(events[0].side, None);
        assert_eq!(events[0].timestamp_ms, 33);
        assert_eq!(detector.jump_count(), 1);
        assert!(!detector.is_in_progress());
        assert!((ledger.accumulated(Activity::JumpRope) - 0.07).abs() < 1e-12);
    }

    #[test]
    fn test_sustained_elevation_counts_once() {
        let mut detector = JumpDetector::default();
        let mut ledger = CalorieLedger::default();

        let mut fired = 0;
        for i in 0..30u64 {
            if detector.process_frame(&ratio_frame(i * 33, 0.45), &mut ledger).is_some() {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
        assert!(detector.is_in_progress());
    }

    #[test]
    fn test_ratio_at_threshold_does_not_fire() {
        let config = JumpConfig {
            strategy: JumpStrategy::HeightRatio { threshold: 0.25 },
            ..JumpConfig::default()
        };
        let mut detector = JumpDetector::new(config);
        let mut ledger = CalorieLedger::default();

        // 0.75 - 0.5 is exactly representable.
        assert!(detector.process_frame(&body_frame(0, 0.75, 0.5), &mut ledger).is_none());
        assert!(detector.process_frame(&body_frame(33, 0.76, 0.5), &mut ledger).is_some());
    }

    #[test]
    fn test_repeated_skips_each_count() {
        let mut detector = JumpDetector::default();
        let mut ledger = CalorieLedger::default();

        let mut t = 0;
        for _ in 0..5 {
            for r in [0.1, 0.35, 0.4, 0.2] {
                detector.process_frame(&ratio_frame(t, r), &mut ledger);
                t += 33;
            }
        }
        assert_eq!(detector.jump_count(), 5);
    }

    #[test]
    fn test_displacement_strategy_with_cooldown() {
        let config = JumpConfig {
            strategy: JumpStrategy::displacement(),
            ..JumpConfig::default()
        };
        let mut detector = JumpDetector::new(config);
        let mut ledger = CalorieLedger::default();

        // First frame has nothing to compare against.
        assert!(detector.process_frame(&body_frame(0, 0.5, 0.9), &mut ledger).is_none());

        // Ankles rise 0.1 in one frame.
        let jump = detector.process_frame(&body_frame(33, 0.5, 0.8), &mut ledger);
        assert!(jump.is_some());
        assert!((jump.unwrap().magnitude - 0.1).abs() < 1e-5);

        // Land, then rise again too soon.
        detector.process_frame(&body_frame(200, 0.5, 0.9), &mut ledger);
        assert!(detector.process_frame(&body_frame(300, 0.5, 0.8), &mut ledger).is_none());

        // Land, then rise after the cooldown.
        detector.process_frame(&body_frame(500, 0.5, 0.9), &mut ledger);
        assert!(detector.process_frame(&body_frame(600, 0.5, 0.8), &mut ledger).is_some());
        assert_eq!(detector.jump_count(), 2);
    }

    #[test]
    fn test_displacement_ignores_small_rise() {
        let config = JumpConfig {
            strategy: JumpStrategy::displacement(),
            ..JumpConfig::default()
        };
        let mut detector = JumpDetector::new(config);
        let mut ledger = CalorieLedger::default();

        detector.process_frame(&body_frame(0, 0.5, 0.9), &mut ledger);
        assert!(detector.process_frame(&body_frame(33, 0.5, 0.85), &mut ledger).is_none());
        assert_eq!(ledger.accumulated(Activity::JumpRope), 0.0);
    }

    #[test]
    fn test_batch_counts_each_skip() {
        let frames: Vec<_> = [0.1, 0.4, 0.1, 0.35, 0.45, 0.0]
            .iter()
            .enumerate()
            .map(|(i, r)| ratio_frame(i as u64 * 33, *r))
            .collect();

        let mut detector = JumpDetector::default();
        let mut ledger = CalorieLedger::default();
        let events = detector.process_batch(&frames, &mut ledger);

        let timestamps: Vec<_> = events.iter().map(|e| e.timestamp_ms).collect();
        assert_eq!(timestamps, vec![33, 99]);
        assert_eq!(detector.jump_count(), 2);
        assert!((ledger.accumulated(Activity::JumpRope) - 0.14).abs() < 1e-12);
        assert_eq!(ledger.accumulated(Activity::Boxing), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut detector = JumpDetector::default();
        let mut ledger = CalorieLedger::default();
        detector.process_frame(&ratio_frame(0, 0.5), &mut ledger);

        detector.reset();

        assert_eq!(detector.jump_count(), 0);
        assert!(!detector.is_in_progress());
        assert!(detector.history().is_empty());
        assert_eq!(detector.last_jump_ms(), None);
    }
}
