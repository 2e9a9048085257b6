// src/drivers/decagon_ctd.rs

//! Decagon CTD-10 conductivity, temperature and depth sensor, sold later as
//! the Meter Hydros 21.
//!
//! The sensor is SDI-12 and returns depth, temperature and conductivity, in
//! that order, from one concurrent measurement.

use super::sdi12::{Sdi12Addr, Sdi12Device};
use crate::common::{error::{TransportError, VariableError}, hal_traits::Sdi12Bus};
use crate::sensor::{Location, RawReadings, Sensor, SensorDriver, SensorTiming};
use crate::variable::{Variable, VariableSpec};
use embedded_hal::digital::OutputPin;

pub const DEPTH: VariableSpec =
    VariableSpec::new(0, 1, "waterDepth", "millimeter", "CTDdepth");
pub const TEMPERATURE: VariableSpec =
    VariableSpec::new(1, 2, "temperature", "degreeCelsius", "CTDtemp");
pub const CONDUCTIVITY: VariableSpec = VariableSpec::new(
    2,
    1,
    "specificConductance",
    "microsiemenPerCentimeter",
    "CTDcond",
);

#[derive(Debug)]
pub struct DecagonCtd<B> {
    device: Sdi12Device<B>,
}

impl<B: Sdi12Bus> DecagonCtd<B> {
    pub fn new(bus: B, address: Sdi12Addr) -> Self {
        Self {
            device: Sdi12Device::new(bus, address),
        }
    }

    /// Uses CRC-protected data pages.
    pub fn with_crc(self, crc: bool) -> Self {
        Self {
            device: self.device.with_crc(crc),
        }
    }

    pub fn address(&self) -> Sdi12Addr {
        self.device.address()
    }

    pub fn release(self) -> B {
        self.device.release()
    }
}

impl<B: Sdi12Bus> SensorDriver for DecagonCtd<B> {
    type Error = TransportError<B::Error>;

    const NAME: &'static str = "DecagonCTD";
    const NUM_VALUES: usize = 3;
    const TIMING: SensorTiming = SensorTiming::new(500, 0, 500);

    fn location(&self) -> Location {
        self.device.location()
    }

    fn perform_wake(&mut self) -> Result<(), Self::Error> {
        self.device.acknowledge()
    }

    fn perform_measurement_trigger(&mut self) -> Result<(), Self::Error> {
        let timing = self.device.start_concurrent()?;
        if usize::from(timing.values) < Self::NUM_VALUES {
            warn!(
                "{} at {} announced only {} values",
                Self::NAME,
                self.device.address(),
                timing.values
            );
        }
        Ok(())
    }

    fn collect_raw_readings(&mut self, readings: &mut RawReadings) -> Result<(), Self::Error> {
        self.device.read_data(readings).map(|_| ())
    }
}

/// Water depth in mm.
pub fn depth<'a, B: Sdi12Bus, P: OutputPin>(
    sensor: &'a Sensor<DecagonCtd<B>, P>,
    uuid: &'a str,
) -> Result<Variable<'a>, VariableError> {
    Variable::new(DEPTH, sensor, uuid)
}

/// Water temperature in °C.
pub fn temperature<'a, B: Sdi12Bus, P: OutputPin>(
    sensor: &'a Sensor<DecagonCtd<B>, P>,
    uuid: &'a str,
) -> Result<Variable<'a>, VariableError> {
    Variable::new(TEMPERATURE, sensor, uuid)
}

/// Specific conductance in µS/cm.
pub fn conductivity<'a, B: Sdi12Bus, P: OutputPin>(
    sensor: &'a Sensor<DecagonCtd<B>, P>,
    uuid: &'a str,
) -> Result<Variable<'a>, VariableError> {
    Variable::new(CONDUCTIVITY, sensor, uuid)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SensorConfig;
    use crate::AveragingProgress;
    use std::collections::VecDeque;

    #[derive(Debug)]
    struct NoAnswer;

    struct ScriptedBus {
        responses: VecDeque<&'static [u8]>,
    }

    impl Sdi12Bus for ScriptedBus {
        type Error = NoAnswer;

        fn transaction(&mut self, _command: &[u8], response: &mut [u8]) -> Result<usize, NoAnswer> {
            let reply = self.responses.pop_front().ok_or(NoAnswer)?;
            response[..reply.len()].copy_from_slice(reply);
            Ok(reply.len())
        }
    }

    fn ctd(responses: &[&'static [u8]]) -> DecagonCtd<ScriptedBus> {
        let bus = ScriptedBus {
            responses: responses.iter().copied().collect(),
        };
        DecagonCtd::new(bus, Sdi12Addr::new('2').unwrap())
    }

    #[test]
    fn test_full_cycle_through_variables() {
        let driver = ctd(&[b"2\r\n", b"200103\r\n", b"2+123.4+21.456+812\r\n"]);
        let sensor = Sensor::always_powered(driver, SensorConfig::default());
        let depth = depth(&sensor, "").unwrap();
        let temp = temperature(&sensor, "").unwrap();
        let cond = conductivity(&sensor, "").unwrap();

        sensor.power_up().unwrap();
        sensor.wake(0).unwrap();
        sensor.start_single_measurement(500).unwrap();
        assert_eq!(
            sensor.add_single_measurement_result(1000).unwrap(),
            AveragingProgress::Complete
        );

        assert_eq!(depth.value(), Ok(123.4));
        assert_eq!(temp.value(), Ok(21.46));
        assert_eq!(cond.value(), Ok(812.0));
        assert_eq!(temp.code(), "CTDtemp");
        assert_eq!(depth.parent_location().unwrap().as_str(), "SDI12-2");
    }

    #[test]
    fn test_no_answer_is_failed_reading() {
        let driver = ctd(&[b"2\r\n", b"200103\r\n"]);
        let sensor = Sensor::always_powered(driver, SensorConfig::default());
        sensor.power_up().unwrap();
        sensor.wake(0).unwrap();
        sensor.start_single_measurement(500).unwrap();
        sensor.add_single_measurement_result(1000).unwrap();

        assert!(sensor.is_errored());
        assert_eq!(temperature(&sensor, "").unwrap().value(), Ok(crate::FAILURE_SENTINEL));
    }

    #[test]
    fn test_wake_needs_acknowledge() {
        let driver = ctd(&[b"3\r\n"]);
        let sensor = Sensor::always_powered(driver, SensorConfig::default());
        sensor.power_up().unwrap();
        assert!(matches!(
            sensor.wake(0),
            Err(crate::SensorError::Transport(TransportError::UnexpectedAddress('3')))
        ));
    }
}
