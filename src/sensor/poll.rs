// src/sensor/poll.rs

use super::driver::SensorDriver;
use super::lifecycle::Sensor;
use super::status::Phase;
use crate::common::{error::SensorError, timing::Millis};
use embedded_hal::digital::OutputPin;

/// Summary of a finished measurement cycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CycleReport {
    /// Attempts made, including failed triggers.
    pub attempts: u8,
    /// Whether any published value is the failure sentinel.
    pub errored: bool,
}

impl<D, P> Sensor<D, P>
where
    D: SensorDriver,
    P: OutputPin,
{
    /// Advances the measurement cycle as far as `now` allows.
    ///
    /// Returns `WouldBlock` while a timing gate is closed. Returns the cycle
    /// report once averaging is complete and the sensor has been powered down
    /// again; the next call starts a new cycle.
    ///
    /// A failed wake powers the sensor down and is returned as an error.
    /// Failed triggers and failed collections are retried within the retry
    /// budget and only show up as sentinel values in the results.
    pub fn update(&self, now: Millis) -> nb::Result<CycleReport, SensorError<D::Error>> {
        loop {
            match self.phase() {
                Phase::Idle => self.power_up()?,
                Phase::Powered => {
                    self.power_up()?;
                    if let Err(e) = self.wake(now) {
                        if let Err(pin_err) = self.power_down() {
                            warn!("{} power-down after failed wake: {}", self.name(), pin_err);
                        }
                        return Err(nb::Error::Other(e));
                    }
                }
                Phase::Awake | Phase::MeasurementComplete => {
                    if self.is_averaging_complete() {
                        return self.finish_cycle();
                    }
                    if !self.is_warmed_up(now) {
                        return Err(nb::Error::WouldBlock);
                    }
                    match self.start_single_measurement(now) {
                        Ok(()) => {}
                        Err(SensorError::Transport(_)) if !self.is_averaging_complete() => {
                            return Err(nb::Error::WouldBlock);
                        }
                        Err(SensorError::Transport(_)) => {}
                        Err(e) => return Err(nb::Error::Other(e)),
                    }
                }
                Phase::MeasurementRequested => {
                    if !self.is_measurement_complete(now) {
                        return Err(nb::Error::WouldBlock);
                    }
                    self.add_single_measurement_result(now)?;
                }
            }
        }
    }

    fn finish_cycle(&self) -> nb::Result<CycleReport, SensorError<D::Error>> {
        let report = CycleReport {
            attempts: self.attempts(),
            errored: self.is_errored(),
        };
        self.power_down()?;
        debug!(
            "{} cycle done after {} attempts, errored: {}",
            self.name(),
            report.attempts,
            report.errored
        );
        Ok(report)
    }
}
