//! Fixed-capacity motion history.
//!
//! Each detector keeps one of these per limb. Insertion order matters: the
//! oldest and newest entries bound the window used for velocity and travel.

use std::collections::VecDeque;

use crate::types::MotionSample;

/// Number of samples kept per limb (~330ms at 30 fps).
pub const HISTORY_CAPACITY: usize = 10;

/// FIFO window over the most recent [`MotionSample`]s of one limb.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    samples: VecDeque<MotionSample>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
        }
    }

    /// Append a sample, dropping the oldest one once capacity is exceeded.
    pub fn push(&mut self, sample: MotionSample) {
        self.samples.push_back(sample);
        while self.samples.len() > HISTORY_CAPACITY {
            self.samples.pop_front();
        }
    }

    pub fn oldest(&self) -> Option<&MotionSample> {
        self.samples.front()
    }

    pub fn newest(&self) -> Option<&MotionSample> {
        self.samples.back()
    }

    /// Newest sample before [`HistoryBuffer::newest`], if any.
    pub fn previous(&self) -> Option<&MotionSample> {
        let len = self.samples.len();
        if len < 2 {
            return None;
        }
        self.samples.get(len - 2)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point3D;

    fn sample(x: f32, t: u64) -> MotionSample {
        MotionSample::new(Point3D::new(x, 0.0, 0.0), t)
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = HistoryBuffer::new();
        assert!(buffer.is_empty());
        assert!(buffer.oldest().is_none());
        assert!(buffer.newest().is_none());
        assert!(buffer.previous().is_none());
    }

    #[test]
    fn test_push_keeps_order() {
        let mut buffer = HistoryBuffer::new();
        buffer.push(sample(0.1, 0));
        buffer.push(sample(0.2, 33));
        buffer.push(sample(0.3, 66));

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.oldest().unwrap().timestamp_ms, 0);
        assert_eq!(buffer.newest().unwrap().timestamp_ms, 66);
        assert_eq!(buffer.previous().unwrap().timestamp_ms, 33);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut buffer = HistoryBuffer::new();
        for i in 0..25u64 {
            buffer.push(sample(i as f32, i * 33));
            assert!(buffer.len() <= HISTORY_CAPACITY);
        }

        assert_eq!(buffer.len(), HISTORY_CAPACITY);
        assert_eq!(buffer.oldest().unwrap().timestamp_ms, 15 * 33);
        assert_eq!(buffer.newest().unwrap().timestamp_ms, 24 * 33);
    }

    #[test]
    fn test_clear() {
        let mut buffer = HistoryBuffer::new();
        buffer.push(sample(0.1, 0));
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
