// src/sensor/power.rs

use core::convert::Infallible;
use embedded_hal::digital::{ErrorType, OutputPin};

/// Pin type for sensors without a switched power supply.
///
/// Sensors built with [`Sensor::always_powered`](crate::Sensor::always_powered)
/// never hold one of these; it only names the pin type parameter.
#[derive(Debug, Copy, Clone, Default)]
pub struct AlwaysPowered;

impl ErrorType for AlwaysPowered {
    type Error = Infallible;
}

impl OutputPin for AlwaysPowered {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
