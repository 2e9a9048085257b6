// src/common/timing.rs

//! Wall-clock time gates for warm-up, stabilization and measurement windows.
//!
//! Timestamps are free-running millisecond counters (an Arduino-style
//! `millis()`), so every comparison is done with wrapping subtraction and
//! keeps working after the counter rolls over roughly every 49.7 days.

/// Milliseconds since an arbitrary, wrapping epoch.
pub type Millis = u32;

/// Stateless window checks. Callers poll these from the scheduler tick; none
/// of them ever waits.
#[derive(Debug, Copy, Clone, Default)]
pub struct MeasurementTimer;

impl MeasurementTimer {
    /// Returns `true` once `required` milliseconds have passed since `start`.
    ///
    /// An unset start (`None`) never opens the gate. A zero duration opens
    /// it as soon as the start is set.
    #[inline]
    pub const fn has_elapsed(start: Option<Millis>, required: Millis, now: Millis) -> bool {
        match start {
            Some(start) => now.wrapping_sub(start) >= required,
            None => false,
        }
    }

    /// Milliseconds left before the gate opens, `Some(0)` if it already has,
    /// `None` if the window was never armed.
    #[inline]
    pub const fn remaining(start: Option<Millis>, required: Millis, now: Millis) -> Option<Millis> {
        match start {
            Some(start) => Some(required.saturating_sub(now.wrapping_sub(start))),
            None => None,
        }
    }
}

/// Shorthand for [`MeasurementTimer::has_elapsed`].
#[inline]
pub const fn has_elapsed(start: Option<Millis>, required: Millis, now: Millis) -> bool {
    MeasurementTimer::has_elapsed(start, required, now)
}

/// Shorthand for [`MeasurementTimer::remaining`].
#[inline]
pub const fn remaining(start: Option<Millis>, required: Millis, now: Millis) -> Option<Millis> {
    MeasurementTimer::remaining(start, required, now)
}
