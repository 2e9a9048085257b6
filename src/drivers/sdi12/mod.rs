// src/drivers/sdi12/mod.rs

//! Just enough SDI-12 to run a measurement cycle against one device:
//! acknowledge, start a concurrent measurement and read the data pages.
//!
//! Concurrent measurements (`aC!`) are used instead of `aM!` so the device
//! never sends a service request; the measurement window of the sensor type
//! covers the time it needs.

mod address;
mod command;
pub mod crc;
mod values;

pub use address::Sdi12Addr;
pub use command::{Command, CommandBuffer, MAX_COMMAND_LEN, MAX_DATA_PAGE};
pub use values::{parse_value, parse_values, MeasurementTiming};

use crate::common::{error::TransportError, hal_traits::Sdi12Bus};
use crate::sensor::{Location, RawReadings};
use core::fmt::Write;

/// Longest response line handled, CRC and `<CR><LF>` included.
pub const RESPONSE_CAPACITY: usize = 82;

/// One device on an SDI-12 bus.
#[derive(Debug)]
pub struct Sdi12Device<B> {
    bus: B,
    address: Sdi12Addr,
    crc: bool,
    /// Values announced by the last start-measurement response.
    announced: u8,
}

impl<B> Sdi12Device<B>
where
    B: Sdi12Bus,
{
    pub fn new(bus: B, address: Sdi12Addr) -> Self {
        Sdi12Device {
            bus,
            address,
            crc: false,
            announced: 0,
        }
    }

    /// Requests CRC-protected data pages (`aCC!`) and verifies them.
    pub fn with_crc(mut self, crc: bool) -> Self {
        self.crc = crc;
        self
    }

    pub fn address(&self) -> Sdi12Addr {
        self.address
    }

    /// `"SDI12-<address>"`
    pub fn location(&self) -> Location {
        let mut location = Location::new();
        // "SDI12-" plus one character always fits
        let _ = write!(location, "SDI12-{}", self.address);
        location
    }

    pub fn release(self) -> B {
        self.bus
    }

    /// Sends `a!` and checks the device answers with its address.
    pub fn acknowledge(&mut self) -> Result<(), TransportError<B::Error>> {
        let mut buf = [0u8; RESPONSE_CAPACITY];
        let body = self.exchange(
            Command::AcknowledgeActive {
                address: self.address,
            },
            &mut buf,
            false,
        )?;
        if !body.is_empty() {
            return Err(TransportError::InvalidFormat);
        }
        Ok(())
    }

    /// Starts a concurrent measurement and returns what the device announced.
    pub fn start_concurrent(&mut self) -> Result<MeasurementTiming, TransportError<B::Error>> {
        let mut buf = [0u8; RESPONSE_CAPACITY];
        let command = Command::StartConcurrentMeasurement {
            address: self.address,
            crc: self.crc,
        };
        let body = self.exchange(command, &mut buf, false)?;
        let timing = MeasurementTiming::parse_concurrent::<B::Error>(body)?;
        if timing.values == 0 {
            return Err(TransportError::NoData);
        }
        self.announced = timing.values;
        Ok(timing)
    }

    /// Reads data pages `aD0!`, `aD1!`, ... until every announced value (or
    /// every slot of `readings`) is filled.
    ///
    /// Returns the number of values received. Values beyond the capacity of
    /// `readings` are dropped.
    pub fn read_data(&mut self, readings: &mut RawReadings) -> Result<usize, TransportError<B::Error>> {
        let wanted = match self.announced {
            0 => readings.len(),
            n => usize::from(n).min(readings.len()),
        };
        self.announced = 0;

        let mut received = 0;
        for page in 0..=MAX_DATA_PAGE {
            if received >= wanted {
                break;
            }
            let mut buf = [0u8; RESPONSE_CAPACITY];
            let command = Command::SendData {
                address: self.address,
                page,
            };
            let body = self.exchange(command, &mut buf, self.crc)?;
            if body.is_empty() {
                break;
            }
            received += parse_values::<B::Error>(body, readings, received)?;
        }

        if received == 0 {
            return Err(TransportError::NoData);
        }
        Ok(received)
    }

    /// Runs one command and returns the response body: address, CRC and line
    /// ending stripped.
    fn exchange<'b>(
        &mut self,
        command: Command,
        buf: &'b mut [u8],
        verify_crc: bool,
    ) -> Result<&'b str, TransportError<B::Error>> {
        let formatted = command.format::<B::Error>()?;
        let len = self.bus.transaction(formatted.as_bytes(), buf)?;
        let buf: &'b [u8] = buf;

        let mut line = &buf[..len.min(buf.len())];
        while let [rest @ .., b'\r' | b'\n'] = line {
            line = rest;
        }
        let (&first, _) = line.split_first().ok_or(TransportError::NoResponse)?;
        if first != self.address.as_byte() {
            return Err(TransportError::UnexpectedAddress(first as char));
        }
        if verify_crc {
            line = crc::strip_verified_crc::<B::Error>(line)?;
        }
        core::str::from_utf8(&line[1..]).map_err(|_| TransportError::InvalidFormat)
    }
}
