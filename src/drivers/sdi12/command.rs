// src/drivers/sdi12/command.rs

use super::address::Sdi12Addr;
use crate::common::error::TransportError;
use arrayvec::ArrayString;
use core::fmt::{self, Write};

/// Longest command this driver sends (`aCC!`) with some headroom.
pub const MAX_COMMAND_LEN: usize = 8;

/// Formatted command, ready for [`Sdi12Bus::transaction`](crate::common::Sdi12Bus::transaction).
pub type CommandBuffer = ArrayString<MAX_COMMAND_LEN>;

/// Highest page index of a send-data command (`aD9!`).
pub const MAX_DATA_PAGE: u8 = 9;

/// The subset of SDI-12 commands used by the measurement cycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Command {
    /// `a!`
    AcknowledgeActive { address: Sdi12Addr },
    /// `aC!`, or `aCC!` when the data pages carry a CRC.
    StartConcurrentMeasurement { address: Sdi12Addr, crc: bool },
    /// `aD0!` to `aD9!`
    SendData { address: Sdi12Addr, page: u8 },
}

impl Command {
    pub fn address(&self) -> Sdi12Addr {
        match *self {
            Command::AcknowledgeActive { address }
            | Command::StartConcurrentMeasurement { address, .. }
            | Command::SendData { address, .. } => address,
        }
    }

    /// Formats the command into a fixed buffer.
    pub fn format<E: fmt::Debug>(&self) -> Result<CommandBuffer, TransportError<E>> {
        if let Command::SendData { page, .. } = *self {
            if page > MAX_DATA_PAGE {
                return Err(TransportError::InvalidFormat);
            }
        }
        let mut buf = CommandBuffer::new();
        write!(buf, "{}", self).map_err(|_| TransportError::BufferOverflow {
            needed: MAX_COMMAND_LEN + 1,
            got: MAX_COMMAND_LEN,
        })?;
        Ok(buf)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Command::AcknowledgeActive { address } => write!(f, "{}!", address),
            Command::StartConcurrentMeasurement { address, crc: false } => {
                write!(f, "{}C!", address)
            }
            Command::StartConcurrentMeasurement { address, crc: true } => {
                write!(f, "{}CC!", address)
            }
            Command::SendData { address, page } => write!(f, "{}D{}!", address, page),
        }
    }
}
