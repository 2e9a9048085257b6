// src/common/error.rs

use core::fmt;

/// Errors raised by a concrete driver while talking to its device.
///
/// These are never fatal to the lifecycle: the sensor counts the attempt as
/// failed and moves on.
#[derive(Debug, thiserror::Error)]
pub enum TransportError<E = ()>
where
    E: fmt::Debug, // Still need Debug for the generic Bus error
{
    /// Underlying bus error from the HAL implementation.
    #[error("bus error: {0:?}")]
    Bus(E),

    /// The device did not answer (empty response line, zero bytes read).
    #[error("no response from device")]
    NoResponse,

    /// The device answered but has no values to report.
    #[error("device has no data")]
    NoData,

    /// The response did not have the expected shape.
    #[error("invalid response format")]
    InvalidFormat,

    /// The response came from a different device than the one addressed.
    #[error("response from unexpected address '{0}'")]
    UnexpectedAddress(char),

    /// Received CRC does not match calculated CRC.
    #[error("CRC mismatch: expected {expected:#06x}, calculated {calculated:#06x}")]
    CrcMismatch { expected: u16, calculated: u16 },

    /// The device reported a status code other than success.
    #[error("device reported status code {0}")]
    DeviceStatus(u8),

    /// Not a valid device address.
    #[error("invalid device address '{0}'")]
    InvalidAddress(char),

    /// Buffer provided was too small.
    #[error("buffer overflow: needed {needed}, got {got}")]
    BufferOverflow { needed: usize, got: usize },
}

// Allow `?` on raw HAL results inside drivers
impl<E: fmt::Debug> From<E> for TransportError<E> {
    fn from(e: E) -> Self {
        TransportError::Bus(e)
    }
}

/// Lifecycle step named in ordering and timing errors.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Step {
    Wake,
    StartMeasurement,
    CollectResult,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Step::*;
        match self {
            Wake => write!(f, "wake"),
            StartMeasurement => write!(f, "start-measurement"),
            CollectResult => write!(f, "collect-result"),
        }
    }
}

/// Errors returned by the [`Sensor`](crate::Sensor) lifecycle steps.
#[derive(Debug, thiserror::Error)]
pub enum SensorError<E = ()>
where
    E: fmt::Debug,
{
    /// The driver failed to wake or trigger the device.
    #[error("transport failure: {0:?}")]
    Transport(E),

    /// Switching the power pin failed.
    #[error("power pin error: {0:?}")]
    PowerPin(embedded_hal::digital::ErrorKind),

    /// The step was called while its timing gate was still closed.
    /// Nothing changed.
    #[error("{0} called before its timing gate opened")]
    NotReady(Step),

    /// The step was called in the wrong lifecycle phase. Nothing changed.
    #[error("{0} called out of order")]
    OutOfOrder(Step),
}

impl<E: fmt::Debug> SensorError<E> {
    /// Drops the driver-specific payload so errors of different sensors can
    /// be handled together.
    pub fn fault(&self) -> CycleFault {
        match self {
            SensorError::Transport(_) => CycleFault::Transport,
            SensorError::PowerPin(kind) => CycleFault::PowerPin(*kind),
            SensorError::NotReady(step) => CycleFault::NotReady(*step),
            SensorError::OutOfOrder(step) => CycleFault::OutOfOrder(*step),
        }
    }
}

/// Type-erased [`SensorError`], used where many different sensors are driven
/// together.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum CycleFault {
    #[error("transport failure")]
    Transport,
    #[error("power pin error: {0:?}")]
    PowerPin(embedded_hal::digital::ErrorKind),
    #[error("{0} called before its timing gate opened")]
    NotReady(Step),
    #[error("{0} called out of order")]
    OutOfOrder(Step),
}

/// Errors reading or binding a [`Variable`](crate::Variable).
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum VariableError {
    /// The variable was never attached to a sensor.
    #[error("variable is not attached to a sensor")]
    Unbound,

    /// The variable is already attached; parents cannot be swapped.
    #[error("variable is already attached to a sensor")]
    AlreadyBound,

    /// The variable index does not exist on the sensor it was attached to.
    #[error("variable index {index} out of range for a sensor with {available} values")]
    IndexOutOfRange { index: usize, available: usize },

    /// The value does not fit the fixed-capacity output string.
    #[error("value does not fit the output buffer")]
    Unrenderable,
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;
    use embedded_hal::digital::ErrorKind;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct MockBusError;

    #[test]
    fn test_bus_error_conversion() {
        let err: TransportError<MockBusError> = MockBusError.into();
        assert!(matches!(err, TransportError::Bus(MockBusError)));
    }

    #[test]
    fn test_fault_erases_payload() {
        let err: SensorError<TransportError<MockBusError>> =
            SensorError::Transport(TransportError::NoResponse);
        assert_eq!(err.fault(), CycleFault::Transport);

        let err: SensorError<()> = SensorError::PowerPin(ErrorKind::Other);
        assert_eq!(err.fault(), CycleFault::PowerPin(ErrorKind::Other));

        let err: SensorError<()> = SensorError::NotReady(Step::CollectResult);
        assert_eq!(err.fault(), CycleFault::NotReady(Step::CollectResult));
    }

    #[test]
    fn test_display_messages() {
        let mut s: heapless::String<64> = heapless::String::new();
        write!(s, "{}", SensorError::<()>::OutOfOrder(Step::StartMeasurement)).unwrap();
        assert_eq!(s.as_str(), "start-measurement called out of order");

        s.clear();
        write!(s, "{}", VariableError::IndexOutOfRange { index: 3, available: 2 }).unwrap();
        assert_eq!(s.as_str(), "variable index 3 out of range for a sensor with 2 values");

        s.clear();
        let crc: TransportError = TransportError::CrcMismatch { expected: 0x1234, calculated: 0xabcd };
        write!(s, "{}", crc).unwrap();
        assert_eq!(s.as_str(), "CRC mismatch: expected 0x1234, calculated 0xabcd");
    }
}
