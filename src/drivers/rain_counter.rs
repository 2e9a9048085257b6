// src/drivers/rain_counter.rs

//! Tipping-bucket rain gauge behind an I2C tip counter.
//!
//! The counter keeps counting while the logger sleeps and reports the tips
//! since its last read as a little-endian 16-bit integer. It needs no power
//! switching, warm-up or measurement time.

use super::i2c_location;
use crate::common::error::{TransportError, VariableError};
use crate::sensor::{Location, RawReadings, ReadingPolicy, Sensor, SensorDriver, SensorTiming};
use crate::variable::{Variable, VariableSpec};
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;

pub const DEFAULT_ADDRESS: u8 = 0x08;

/// Rain depth per bucket tip, mm.
pub const DEFAULT_RAIN_PER_TIP: f32 = 0.2;

pub const RAIN: VariableSpec =
    VariableSpec::new(0, 2, "precipitation", "millimeter", "RainCounterI2CVol");
pub const TIPS: VariableSpec =
    VariableSpec::new(1, 0, "precipitation", "event", "RainCounterI2CTips");

#[derive(Debug)]
pub struct RainCounter<I2C> {
    i2c: I2C,
    address: u8,
    rain_per_tip: f32,
}

impl<I2C: I2c> RainCounter<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: DEFAULT_ADDRESS,
            rain_per_tip: DEFAULT_RAIN_PER_TIP,
        }
    }

    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn with_rain_per_tip(mut self, rain_per_tip: f32) -> Self {
        self.rain_per_tip = rain_per_tip;
        self
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> SensorDriver for RainCounter<I2C> {
    type Error = TransportError<I2C::Error>;

    const NAME: &'static str = "RainCounterI2C";
    const NUM_VALUES: usize = 2;
    const TIMING: SensorTiming = SensorTiming::new(0, 0, 0);
    // A negative count means the counter sent garbage.
    const DEFAULT_READING_POLICY: ReadingPolicy = ReadingPolicy::RejectNegative;

    fn location(&self) -> Location {
        i2c_location(self.address)
    }

    fn perform_wake(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn perform_measurement_trigger(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn collect_raw_readings(&mut self, readings: &mut RawReadings) -> Result<(), Self::Error> {
        let mut buf = [0u8; 2];
        self.i2c.read(self.address, &mut buf)?;
        let tips = i16::from_le_bytes(buf);
        trace!("{} read {} tips", Self::NAME, tips);

        readings.set(RAIN.index, f32::from(tips) * self.rain_per_tip);
        readings.set(TIPS.index, f32::from(tips));
        Ok(())
    }
}

/// Rain depth in mm since the last read.
pub fn rain<'a, I2C: I2c, P: OutputPin>(
    sensor: &'a Sensor<RainCounter<I2C>, P>,
    uuid: &'a str,
) -> Result<Variable<'a>, VariableError> {
    Variable::new(RAIN, sensor, uuid)
}

/// Bucket tips since the last read.
pub fn tips<'a, I2C: I2c, P: OutputPin>(
    sensor: &'a Sensor<RainCounter<I2C>, P>,
    uuid: &'a str,
) -> Result<Variable<'a>, VariableError> {
    Variable::new(TIPS, sensor, uuid)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::test_support::MockI2c;
    use crate::sensor::SensorConfig;
    use crate::{CycleReport, FAILURE_SENTINEL};

    fn counter_reading(bytes: [u8; 2]) -> MockI2c {
        let mut i2c = MockI2c::default();
        i2c.reads.push_back(bytes.to_vec());
        i2c
    }

    #[test]
    fn test_tips_and_rain() {
        let sensor = Sensor::always_powered(
            RainCounter::new(counter_reading([0x0f, 0x00])),
            SensorConfig::default(),
        );
        let rain = rain(&sensor, "").unwrap();
        let tips = tips(&sensor, "").unwrap();

        // all windows are zero, so one update runs the whole cycle
        assert_eq!(sensor.update(0).unwrap(), CycleReport { attempts: 1, errored: false });
        assert_eq!(tips.value(), Ok(15.0));
        assert_eq!(rain.value(), Ok(3.0));
        assert_eq!(rain.parent_location().unwrap().as_str(), "I2C_0x8");
    }

    #[test]
    fn test_high_byte_and_custom_tip_size() {
        let driver = RainCounter::new(counter_reading([0x2c, 0x01]))
            .with_address(0x09)
            .with_rain_per_tip(0.01);
        let sensor = Sensor::always_powered(driver, SensorConfig::default());
        assert!(sensor.update(0).is_ok());
        assert_eq!(sensor.value(1), 300.0);
        assert_eq!(rain(&sensor, "").unwrap().value(), Ok(3.0));
        assert_eq!(sensor.location().as_str(), "I2C_0x9");
    }

    #[test]
    fn test_negative_count_is_rejected() {
        let sensor = Sensor::always_powered(
            RainCounter::new(counter_reading([0xff, 0xff])),
            SensorConfig::default(),
        );
        let report = sensor.update(0).unwrap();
        assert!(report.errored);
        assert_eq!(sensor.value(0), FAILURE_SENTINEL);
        assert_eq!(sensor.value(1), FAILURE_SENTINEL);
    }

    #[test]
    fn test_no_bytes_is_failed_reading() {
        let sensor = Sensor::always_powered(RainCounter::new(MockI2c::default()), SensorConfig::default());
        assert_eq!(sensor.update(0).unwrap(), CycleReport { attempts: 1, errored: true });
        assert_eq!(tips(&sensor, "").unwrap().value(), Ok(FAILURE_SENTINEL));
    }
}
