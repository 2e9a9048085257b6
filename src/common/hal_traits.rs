// src/common/hal_traits.rs

use core::fmt::Debug;

/// Abstraction for one SDI-12 command/response exchange.
///
/// The implementation owns the data line and is responsible for the break,
/// the 1200 baud 7E1 framing, marking times and retries. Drivers only see
/// whole commands going out and whole response lines coming back. Several
/// sensors on one data line can share a bus through a wrapper that hands out
/// exclusive access per transaction.
pub trait Sdi12Bus {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Sends `command` (e.g. `b"3C!"`) and reads one response line into
    /// `response`.
    ///
    /// Returns the number of bytes written to `response`. The trailing
    /// `<CR><LF>` may or may not be included. A device that never answered is
    /// reported as `Ok(0)` or as an error, at the implementation's choice.
    fn transaction(&mut self, command: &[u8], response: &mut [u8]) -> Result<usize, Self::Error>;
}

impl<T: Sdi12Bus + ?Sized> Sdi12Bus for &mut T {
    type Error = T::Error;

    fn transaction(&mut self, command: &[u8], response: &mut [u8]) -> Result<usize, Self::Error> {
        T::transaction(self, command, response)
    }
}
