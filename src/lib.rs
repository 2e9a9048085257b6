// src/lib.rs

//! Power-managed, non-blocking measurement lifecycle for environmental sensors.
//!
//! A [`Sensor`] wraps a concrete [`SensorDriver`] (SDI-12, I2C, ...) and walks
//! it through power-up, wake, warm-up, measurement and averaging without ever
//! sleeping: every step either completes immediately or reports that its
//! timing gate is still closed. [`Variable`]s expose the individual averaged
//! outputs of a sensor with their own name, unit and resolution.
//!
//! ```ignore
//! let ctd = Sensor::new(DecagonCtd::new(bus, addr), Some(power_pin), SensorConfig::default());
//! let temperature = decagon_ctd::temperature(&ctd, "")?;
//!
//! loop {
//!     match ctd.update(millis()) {
//!         Ok(_report) => log_value(temperature.value()?),
//!         Err(nb::Error::WouldBlock) => {}
//!         Err(nb::Error::Other(e)) => handle(e),
//!     }
//! }
//! ```
//!
//! Power-switched sensors must be isolated from any shared bus: an unpowered
//! device can hold the bus lines low and lock up every other device on it.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod logging;

pub mod array;
pub mod common;
pub mod drivers;
pub mod sensor;
pub mod variable;

// Re-export key types for convenience
pub use array::{ArrayFull, RoundReport, SensorArray, Updatable};
pub use common::{
    CycleFault, Millis, SensorError, Step, TransportError, VariableError, FAILURE_SENTINEL,
    MAX_RETURNED_VALUES,
};
pub use sensor::{
    AlwaysPowered, AveragingProgress, CycleReport, Location, Phase, RawReadings, ReadingPolicy,
    Sensor, SensorConfig, SensorDriver, SensorTiming, StatusFlags, ValueSource,
};
pub use variable::{Variable, VariableSpec};
