// src/sensor/averaging.rs

use super::driver::RawReadings;
use crate::common::{FAILURE_SENTINEL, MAX_RETURNED_VALUES};

/// Outcome of one collected attempt.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AveragingProgress {
    /// More attempts are needed; `attempts_left` is what the retry budget
    /// still allows.
    Pending { attempts_left: u8 },
    /// Every index reached its target or the budget ran out. Results are
    /// published.
    Complete,
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
struct Accumulator {
    sum: f32,
    successes: u8,
}

/// Per-index running sums for one measurement cycle.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Averager {
    accumulators: [Accumulator; MAX_RETURNED_VALUES],
    len: usize,
    target: u8,
    max_attempts: u8,
    quorum: u8,
    attempts: u8,
}

impl Averager {
    pub(crate) fn new(len: usize, target: u8, retry_budget: u8, quorum: u8) -> Self {
        let target = target.max(1);
        Self {
            accumulators: [Accumulator::default(); MAX_RETURNED_VALUES],
            len: len.min(MAX_RETURNED_VALUES),
            target,
            max_attempts: target.saturating_add(retry_budget),
            quorum: quorum.clamp(1, target),
            attempts: 0,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.accumulators = [Accumulator::default(); MAX_RETURNED_VALUES];
        self.attempts = 0;
    }

    pub(crate) fn target(&self) -> u8 {
        self.target
    }

    pub(crate) fn attempts(&self) -> u8 {
        self.attempts
    }

    pub(crate) fn successes(&self, index: usize) -> u8 {
        if index < self.len {
            self.accumulators[index].successes
        } else {
            0
        }
    }

    /// Counts an attempt that produced nothing (e.g. a failed trigger).
    pub(crate) fn record_failed_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    /// Adds one attempt's raw readings. Indices that already have enough
    /// successes are left alone.
    pub(crate) fn record(&mut self, readings: &RawReadings) {
        let target = self.target;
        for (index, acc) in self.accumulators[..self.len].iter_mut().enumerate() {
            if acc.successes >= target {
                continue;
            }
            if let Some(value) = readings.get(index) {
                acc.sum += value;
                acc.successes += 1;
            }
        }
        self.attempts = self.attempts.saturating_add(1);
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.attempts >= self.max_attempts
            || self.accumulators[..self.len]
                .iter()
                .all(|acc| acc.successes >= self.target)
    }

    pub(crate) fn progress(&self) -> AveragingProgress {
        if self.is_complete() {
            AveragingProgress::Complete
        } else {
            AveragingProgress::Pending {
                attempts_left: self.max_attempts.saturating_sub(self.attempts),
            }
        }
    }

    /// Mean over the successful readings, or the failure sentinel when fewer
    /// than the quorum succeeded.
    pub(crate) fn mean(&self, index: usize) -> f32 {
        if index >= self.len {
            return FAILURE_SENTINEL;
        }
        let acc = &self.accumulators[index];
        if acc.successes == 0 || acc.successes < self.quorum {
            FAILURE_SENTINEL
        } else {
            acc.sum / acc.successes as f32
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn readings(values: &[Option<f32>]) -> RawReadings {
        let mut r = RawReadings::new(values.len());
        for (i, v) in values.iter().enumerate() {
            if let Some(v) = v {
                r.set(i, *v);
            }
        }
        r
    }

    #[test]
    fn test_mean_over_successes_only() {
        let mut avg = Averager::new(1, 3, 0, 1);
        avg.record(&readings(&[Some(10.0)]));
        avg.record(&readings(&[None]));
        assert!(!avg.is_complete());
        avg.record(&readings(&[Some(20.0)]));
        assert!(avg.is_complete());
        assert_eq!(avg.mean(0), 15.0);
    }

    #[test]
    fn test_zero_successes_is_sentinel_siblings_unaffected() {
        let mut avg = Averager::new(2, 2, 1, 1);
        avg.record(&readings(&[Some(1.0), None]));
        avg.record(&readings(&[Some(3.0), None]));
        assert_eq!(avg.progress(), AveragingProgress::Pending { attempts_left: 1 });
        avg.record(&readings(&[Some(100.0), None]));
        assert!(avg.is_complete());
        // index 0 was already full, the third reading is ignored
        assert_eq!(avg.mean(0), 2.0);
        assert_eq!(avg.mean(1), FAILURE_SENTINEL);
    }

    #[test]
    fn test_retry_budget_extends_attempts() {
        let mut avg = Averager::new(1, 2, 2, 1);
        avg.record(&readings(&[None]));
        avg.record(&readings(&[Some(4.0)]));
        avg.record_failed_attempt();
        assert!(!avg.is_complete());
        avg.record(&readings(&[Some(6.0)]));
        assert!(avg.is_complete());
        assert_eq!(avg.attempts(), 4);
        assert_eq!(avg.mean(0), 5.0);
    }

    #[test]
    fn test_quorum() {
        let mut avg = Averager::new(1, 3, 0, 2);
        avg.record(&readings(&[Some(7.0)]));
        avg.record(&readings(&[None]));
        avg.record(&readings(&[None]));
        assert!(avg.is_complete());
        assert_eq!(avg.successes(0), 1);
        assert_eq!(avg.mean(0), FAILURE_SENTINEL);
    }

    #[test]
    fn test_reset_clears_cycle() {
        let mut avg = Averager::new(1, 1, 0, 1);
        avg.record(&readings(&[Some(1.0)]));
        assert!(avg.is_complete());
        avg.reset();
        assert!(!avg.is_complete());
        assert_eq!(avg.attempts(), 0);
        assert_eq!(avg.mean(0), FAILURE_SENTINEL);
    }

    #[test]
    fn test_target_and_quorum_are_clamped() {
        let avg = Averager::new(1, 0, 0, 9);
        assert_eq!(avg.target(), 1);
        assert_eq!(avg.quorum, 1);
    }
}
