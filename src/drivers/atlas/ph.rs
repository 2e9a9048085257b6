// src/drivers/atlas/ph.rs

use super::AtlasCircuit;
use crate::common::error::{TransportError, VariableError};
use crate::sensor::{Location, RawReadings, Sensor, SensorDriver, SensorTiming};
use crate::variable::{Variable, VariableSpec};
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;

pub const DEFAULT_ADDRESS: u8 = 0x63;

pub const PH: VariableSpec = VariableSpec::new(0, 3, "pH", "pH", "AtlaspH");

/// Atlas Scientific EZO-pH circuit.
#[derive(Debug)]
pub struct AtlasPh<I2C> {
    circuit: AtlasCircuit<I2C>,
}

impl<I2C: I2c> AtlasPh<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            circuit: AtlasCircuit::new(i2c, address),
        }
    }

    pub fn release(self) -> I2C {
        self.circuit.release()
    }
}

impl<I2C: I2c> SensorDriver for AtlasPh<I2C> {
    type Error = TransportError<I2C::Error>;

    const NAME: &'static str = "AtlasScientificpH";
    const NUM_VALUES: usize = 1;
    const TIMING: SensorTiming = SensorTiming::new(850, 0, 1660);

    fn location(&self) -> Location {
        self.circuit.location()
    }

    // The circuit wakes on its own once powered or addressed.
    fn perform_wake(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn perform_measurement_trigger(&mut self) -> Result<(), Self::Error> {
        self.circuit.send_command("R")
    }

    fn collect_raw_readings(&mut self, readings: &mut RawReadings) -> Result<(), Self::Error> {
        self.circuit.read_values(readings).map(|_| ())
    }

    fn perform_sleep(&mut self) -> Result<(), Self::Error> {
        self.circuit.send_command("Sleep")
    }
}

/// pH, 3 decimals.
pub fn ph<'a, I2C: I2c, P: OutputPin>(
    sensor: &'a Sensor<AtlasPh<I2C>, P>,
    uuid: &'a str,
) -> Result<Variable<'a>, VariableError> {
    Variable::new(PH, sensor, uuid)
}
