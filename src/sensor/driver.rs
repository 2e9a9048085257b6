// src/sensor/driver.rs

//! The capability contract between the lifecycle engine and a concrete
//! sensor driver.
//!
//! A driver only knows how to talk to its device: wake it, trigger a reading
//! and collect the raw values. Timing, averaging, power and status are all
//! handled by [`Sensor`](crate::Sensor).

use crate::common::{is_failure, Millis, MAX_RETURNED_VALUES};
use core::fmt::Debug;

/// Human-readable location of a sensor, e.g. `"I2C_0x63"` or `"SDI12-3"`.
pub type Location = heapless::String<24>;

/// Fixed timing windows of a sensor type, in milliseconds.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SensorTiming {
    /// Delay after wake before the sensor accepts a measurement command.
    pub warm_up_ms: Millis,
    /// Delay after warm-up before readings are accurate.
    pub stabilization_ms: Millis,
    /// Delay after a trigger before the result can be collected.
    pub measurement_ms: Millis,
}

impl SensorTiming {
    pub const fn new(warm_up_ms: Millis, stabilization_ms: Millis, measurement_ms: Millis) -> Self {
        Self {
            warm_up_ms,
            stabilization_ms,
            measurement_ms,
        }
    }

    /// Time from wake until the sensor is stable.
    pub const fn stable_after_ms(&self) -> Millis {
        self.warm_up_ms.saturating_add(self.stabilization_ms)
    }
}

/// Post-processing rule applied to every raw reading before it is averaged.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ReadingPolicy {
    /// Any finite reading other than the failure sentinel counts.
    #[default]
    AcceptAll,
    /// Negative readings are physically impossible for this sensor and count
    /// as failed readings.
    RejectNegative,
}

impl ReadingPolicy {
    /// Returns the reading if it survives the policy.
    pub fn apply(self, value: f32) -> Option<f32> {
        match self {
            ReadingPolicy::AcceptAll => Some(value),
            ReadingPolicy::RejectNegative if value < 0.0 => None,
            ReadingPolicy::RejectNegative => Some(value),
        }
    }
}

/// The raw values gathered by one collection attempt, one slot per output
/// index. A slot left empty is a failed reading for that index only.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReadings {
    slots: [Option<f32>; MAX_RETURNED_VALUES],
    len: usize,
}

impl RawReadings {
    /// Creates `len` empty slots (capped at [`MAX_RETURNED_VALUES`]).
    pub fn new(len: usize) -> Self {
        Self {
            slots: [None; MAX_RETURNED_VALUES],
            len: len.min(MAX_RETURNED_VALUES),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores a raw reading. The failure sentinel and NaN are stored as
    /// failures. Returns `false` if `index` is out of range or the value was
    /// rejected.
    pub fn set(&mut self, index: usize, value: f32) -> bool {
        if index >= self.len {
            return false;
        }
        if is_failure(value) {
            self.slots[index] = None;
            return false;
        }
        self.slots[index] = Some(value);
        true
    }

    /// Marks the reading at `index` as failed.
    pub fn fail(&mut self, index: usize) {
        if index < self.len {
            self.slots[index] = None;
        }
    }

    /// Marks every reading as failed.
    pub fn clear(&mut self) {
        self.slots = [None; MAX_RETURNED_VALUES];
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        if index < self.len {
            self.slots[index]
        } else {
            None
        }
    }

    /// Number of slots holding a successful reading.
    pub fn successes(&self) -> usize {
        self.slots[..self.len].iter().filter(|s| s.is_some()).count()
    }

    pub(crate) fn apply_policy(&mut self, policy: ReadingPolicy) {
        for slot in self.slots[..self.len].iter_mut() {
            *slot = slot.and_then(|v| policy.apply(v));
        }
    }
}

/// Implemented by every concrete sensor driver.
///
/// All methods must return promptly: a single bus transaction at most, never
/// a wait for a measurement to finish. Waiting is expressed through
/// [`SensorDriver::TIMING`] and enforced by the lifecycle engine.
pub trait SensorDriver {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Stable sensor type name, e.g. `"DecagonCTD"`.
    const NAME: &'static str;

    /// Number of values this sensor returns; at most [`MAX_RETURNED_VALUES`].
    const NUM_VALUES: usize;

    /// Warm-up, stabilization and measurement windows.
    const TIMING: SensorTiming;

    /// Number of readings averaged into one result unless configured.
    const DEFAULT_MEASUREMENTS_TO_AVERAGE: u8 = 1;

    /// Reading policy used unless configured.
    const DEFAULT_READING_POLICY: ReadingPolicy = ReadingPolicy::AcceptAll;

    /// Location of the device on its bus, for diagnostics.
    fn location(&self) -> Location;

    /// Performs the device-specific wake handshake after power-up.
    fn perform_wake(&mut self) -> Result<(), Self::Error>;

    /// Asks the device to start one measurement.
    fn perform_measurement_trigger(&mut self) -> Result<(), Self::Error>;

    /// Reads back one raw reading per output index.
    ///
    /// Indices that could not be read are left empty. Returning `Err` fails
    /// every index of this attempt.
    fn collect_raw_readings(&mut self, readings: &mut RawReadings) -> Result<(), Self::Error>;

    /// Puts an always-powered device into its low-power state.
    fn perform_sleep(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
