// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod error;
pub mod hal_traits;
pub mod timing;

// --- Re-export key types/traits/functions for easier access ---

// From error.rs
pub use error::{CycleFault, SensorError, Step, TransportError, VariableError};

// From hal_traits.rs
pub use hal_traits::Sdi12Bus;

// From timing.rs
pub use timing::{has_elapsed, remaining, MeasurementTimer, Millis};

/// Reserved "no data" value used for raw readings, averaged results and
/// variable reads of failed sensors.
pub const FAILURE_SENTINEL: f32 = -9999.0;

/// Upper bound on the number of values a single sensor may return.
pub const MAX_RETURNED_VALUES: usize = 8;

/// Returns `true` if `value` is the failure sentinel or otherwise unusable.
#[inline]
pub fn is_failure(value: f32) -> bool {
    value.is_nan() || value == FAILURE_SENTINEL
}
