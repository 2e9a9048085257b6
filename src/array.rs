// src/array.rs

//! Drives many sensors from one polling loop.
//!
//! Each call to [`SensorArray::update`] advances every sensor of the current
//! round as far as its own timing gates allow, so the warm-up and measurement
//! windows of different sensors overlap instead of adding up.

use crate::common::{error::CycleFault, timing::Millis};
use crate::sensor::{CycleReport, Sensor, SensorDriver};
use core::convert::Infallible;
use embedded_hal::digital::OutputPin;

/// A sensor as seen by the array: something that can be polled to the end of
/// a measurement cycle.
pub trait Updatable {
    fn name(&self) -> &'static str;

    /// Same contract as [`Sensor::update`], with the error made uniform.
    fn update(&self, now: Millis) -> nb::Result<CycleReport, CycleFault>;
}

impl<D, P> Updatable for Sensor<D, P>
where
    D: SensorDriver,
    P: OutputPin,
{
    fn name(&self) -> &'static str {
        D::NAME
    }

    fn update(&self, now: Millis) -> nb::Result<CycleReport, CycleFault> {
        Sensor::update(self, now).map_err(|e| e.map(|e| e.fault()))
    }
}

/// Outcome of one round over all sensors.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct RoundReport {
    /// Sensors that finished their cycle without a failed value.
    pub completed: usize,
    /// Sensors that finished with at least one failed value.
    pub errored: usize,
    /// Sensors whose cycle was aborted.
    pub failed: usize,
}

/// The array has no room for another sensor.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[error("sensor array is full")]
pub struct ArrayFull;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Slot {
    Pending,
    Done,
}

/// A fixed-capacity set of sensors measured together.
pub struct SensorArray<'a, const N: usize> {
    sensors: heapless::Vec<(&'a dyn Updatable, Slot), N>,
    round: RoundReport,
}

impl<'a, const N: usize> Default for SensorArray<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> SensorArray<'a, N> {
    pub const fn new() -> Self {
        Self {
            sensors: heapless::Vec::new(),
            round: RoundReport {
                completed: 0,
                errored: 0,
                failed: 0,
            },
        }
    }

    pub fn push(&mut self, sensor: &'a dyn Updatable) -> Result<(), ArrayFull> {
        self.sensors
            .push((sensor, Slot::Pending))
            .map_err(|_| ArrayFull)
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Sensors still measuring in the current round.
    pub fn pending(&self) -> usize {
        self.sensors
            .iter()
            .filter(|(_, slot)| *slot == Slot::Pending)
            .count()
    }

    /// Polls every sensor that has not finished the current round.
    ///
    /// Returns `WouldBlock` until all sensors are done, then the round's
    /// report. The following call starts the next round.
    pub fn update(&mut self, now: Millis) -> nb::Result<RoundReport, Infallible> {
        for (sensor, slot) in self.sensors.iter_mut() {
            if *slot == Slot::Done {
                continue;
            }
            match sensor.update(now) {
                Ok(report) => {
                    *slot = Slot::Done;
                    if report.errored {
                        self.round.errored += 1;
                    } else {
                        self.round.completed += 1;
                    }
                }
                Err(nb::Error::WouldBlock) => {}
                Err(nb::Error::Other(fault)) => {
                    *slot = Slot::Done;
                    self.round.failed += 1;
                    warn!("{} aborted its cycle: {}", sensor.name(), fault);
                }
            }
        }

        if self.sensors.iter().any(|(_, slot)| *slot == Slot::Pending) {
            return Err(nb::Error::WouldBlock);
        }

        let report = core::mem::take(&mut self.round);
        for (_, slot) in self.sensors.iter_mut() {
            *slot = Slot::Pending;
        }
        debug!(
            "round done: {} ok, {} errored, {} failed",
            report.completed, report.errored, report.failed
        );
        Ok(report)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Finishes after `polls` calls with a fixed outcome.
    struct Countdown {
        polls: Cell<u32>,
        outcome: Result<CycleReport, CycleFault>,
        calls: Cell<u32>,
    }

    impl Countdown {
        fn new(polls: u32, outcome: Result<CycleReport, CycleFault>) -> Self {
            Countdown {
                polls: Cell::new(polls),
                outcome,
                calls: Cell::new(0),
            }
        }
    }

    impl Updatable for Countdown {
        fn name(&self) -> &'static str {
            "Countdown"
        }

        fn update(&self, _now: Millis) -> nb::Result<CycleReport, CycleFault> {
            self.calls.set(self.calls.get() + 1);
            if self.polls.get() > 1 {
                self.polls.set(self.polls.get() - 1);
                return Err(nb::Error::WouldBlock);
            }
            self.outcome.map_err(nb::Error::Other)
        }
    }

    const OK: CycleReport = CycleReport { attempts: 1, errored: false };

    #[test]
    fn test_round_waits_for_slowest_sensor() {
        let fast = Countdown::new(1, Ok(OK));
        let slow = Countdown::new(3, Ok(OK));
        let mut array: SensorArray<'_, 4> = SensorArray::new();
        array.push(&fast).unwrap();
        array.push(&slow).unwrap();

        assert!(matches!(array.update(0), Err(nb::Error::WouldBlock)));
        assert_eq!(array.pending(), 1);
        assert!(matches!(array.update(10), Err(nb::Error::WouldBlock)));
        let report = array.update(20).unwrap();
        assert_eq!(report, RoundReport { completed: 2, errored: 0, failed: 0 });
        // finished sensors are not polled again within the round
        assert_eq!(fast.calls.get(), 1);
        assert_eq!(slow.calls.get(), 3);
        assert_eq!(array.pending(), 2);
    }

    #[test]
    fn test_round_counts_failures() {
        let good = Countdown::new(1, Ok(OK));
        let noisy = Countdown::new(1, Ok(CycleReport { attempts: 3, errored: true }));
        let broken = Countdown::new(2, Err(CycleFault::Transport));
        let mut array: SensorArray<'_, 3> = SensorArray::new();
        array.push(&good).unwrap();
        array.push(&noisy).unwrap();
        array.push(&broken).unwrap();

        assert!(array.update(0).is_err());
        let report = array.update(1).unwrap();
        assert_eq!(report, RoundReport { completed: 1, errored: 1, failed: 1 });
    }

    #[test]
    fn test_push_beyond_capacity() {
        let a = Countdown::new(1, Ok(OK));
        let b = Countdown::new(1, Ok(OK));
        let mut array: SensorArray<'_, 1> = SensorArray::new();
        array.push(&a).unwrap();
        assert_eq!(array.push(&b), Err(ArrayFull));
        assert_eq!(array.len(), 1);
    }

    #[test]
    fn test_empty_array_completes_immediately() {
        let mut array: SensorArray<'_, 2> = SensorArray::default();
        assert!(array.is_empty());
        assert_eq!(array.update(0).unwrap(), RoundReport::default());
    }
}
