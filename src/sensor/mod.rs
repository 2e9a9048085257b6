// src/sensor/mod.rs

// Declare the modules within the sensor directory.
// These modules contain the different logical parts of the lifecycle engine.

// Shared building blocks
mod averaging;    // Per-index accumulators, quorum and retry budget
mod config;       // SensorConfig (averaging target, retries, reading policy)
pub mod driver;   // Defines the SensorDriver trait (concrete drivers implement this)
mod power;        // Power pin handling, AlwaysPowered placeholder pin
mod source;       // ValueSource trait read by variables
mod status;       // Phase enum and diagnostic status bitmask

// The lifecycle engine itself
mod lifecycle;    // Sensor struct and the individual lifecycle steps
mod poll;         // Non-blocking update() driving a whole cycle

// --- Public Re-exports ---
pub use averaging::AveragingProgress;
pub use config::SensorConfig;
pub use driver::{Location, RawReadings, ReadingPolicy, SensorDriver, SensorTiming};
pub use lifecycle::Sensor;
pub use poll::CycleReport;
pub use power::AlwaysPowered;
pub use source::ValueSource;
pub use status::{Phase, StatusFlags};
