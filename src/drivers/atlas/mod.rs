// src/drivers/atlas/mod.rs

//! Atlas Scientific EZO circuits in I2C mode.
//!
//! Every EZO circuit speaks the same protocol: an ASCII command is written,
//! and after the command's processing time the circuit is read back. The
//! first byte read is a response code, followed by NUL-terminated ASCII,
//! values separated by commas.
//!
//! EZO circuits must be isolated from the main I2C bus if their power is
//! switched off between measurements; unpowered they hold the bus low.

pub mod ph;

pub use ph::AtlasPh;

use super::i2c_location;
use crate::common::error::TransportError;
use crate::sensor::{Location, RawReadings};
use embedded_hal::i2c::I2c;

/// Longest response read back from a circuit, code byte included.
pub const RESPONSE_LEN: usize = 41;

/// First byte of every response.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResponseCode {
    Success,
    SyntaxError,
    StillProcessing,
    NoData,
    Unknown(u8),
}

impl From<u8> for ResponseCode {
    fn from(code: u8) -> Self {
        match code {
            1 => ResponseCode::Success,
            2 => ResponseCode::SyntaxError,
            254 => ResponseCode::StillProcessing,
            255 => ResponseCode::NoData,
            other => ResponseCode::Unknown(other),
        }
    }
}

/// One EZO circuit at a fixed address.
#[derive(Debug)]
pub struct AtlasCircuit<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> AtlasCircuit<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn location(&self) -> Location {
        i2c_location(self.address)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    pub fn send_command(&mut self, command: &str) -> Result<(), TransportError<I2C::Error>> {
        self.i2c.write(self.address, command.as_bytes())?;
        Ok(())
    }

    /// Reads a response and stores its comma-separated values into
    /// `readings`.
    ///
    /// Returns how many values were parsed. A value that does not parse is a
    /// failed reading for its index only.
    pub fn read_values(&mut self, readings: &mut RawReadings) -> Result<usize, TransportError<I2C::Error>> {
        let mut buf = [0u8; RESPONSE_LEN];
        self.i2c.read(self.address, &mut buf)?;

        match ResponseCode::from(buf[0]) {
            ResponseCode::Success => {}
            ResponseCode::NoData => return Err(TransportError::NoData),
            ResponseCode::SyntaxError | ResponseCode::StillProcessing | ResponseCode::Unknown(_) => {
                return Err(TransportError::DeviceStatus(buf[0]))
            }
        }

        let body = &buf[1..];
        let end = body.iter().position(|&b| b == 0).unwrap_or(body.len());
        let text = core::str::from_utf8(&body[..end]).map_err(|_| TransportError::InvalidFormat)?;
        if text.trim().is_empty() {
            return Err(TransportError::NoData);
        }

        let mut parsed = 0;
        for (index, field) in text.split(',').enumerate() {
            match field.trim().parse::<f32>() {
                Ok(value) if readings.set(index, value) => parsed += 1,
                _ => readings.fail(index),
            }
        }
        Ok(parsed)
    }
}
