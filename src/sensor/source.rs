// src/sensor/source.rs

use super::driver::Location;

/// Read-only view of a sensor's published results, as seen by a
/// [`Variable`](crate::Variable).
pub trait ValueSource {
    /// Sensor type name.
    fn sensor_name(&self) -> &'static str;

    /// Location of the sensor on its bus.
    fn sensor_location(&self) -> Location;

    /// Number of values the sensor returns.
    fn num_values(&self) -> usize;

    /// Last averaged result at `index`, or the failure sentinel.
    fn result(&self, index: usize) -> f32;
}
