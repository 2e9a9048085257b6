// src/sensor/status.rs

use core::fmt;

/// Where a sensor is in its measurement cycle.
///
/// Phases only move forward within a cycle; `power_down` returns to `Idle`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Phase {
    /// Powered down (or never powered).
    #[default]
    Idle,
    /// Power applied, wake not yet done.
    Powered,
    /// Wake succeeded; the warm-up window is running.
    Awake,
    /// A measurement was triggered and has not been collected yet.
    MeasurementRequested,
    /// The last triggered measurement was collected.
    MeasurementComplete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Phase::*;
        match self {
            Idle => write!(f, "idle"),
            Powered => write!(f, "powered"),
            Awake => write!(f, "awake"),
            MeasurementRequested => write!(f, "measurement requested"),
            MeasurementComplete => write!(f, "measurement complete"),
        }
    }
}

/// Diagnostic bitmask view of a sensor's status.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct StatusFlags(u8);

impl StatusFlags {
    pub const POWERED: StatusFlags = StatusFlags(1 << 0);
    pub const WAKE_COMPLETE: StatusFlags = StatusFlags(1 << 1);
    pub const WARMED_UP: StatusFlags = StatusFlags(1 << 2);
    pub const MEASUREMENT_REQUESTED: StatusFlags = StatusFlags(1 << 3);
    pub const STABILIZED: StatusFlags = StatusFlags(1 << 4);
    pub const MEASUREMENT_COMPLETE: StatusFlags = StatusFlags(1 << 5);
    pub const ERRORED: StatusFlags = StatusFlags(1 << 7);

    pub const fn empty() -> Self {
        StatusFlags(0)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(&self, other: StatusFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: StatusFlags) {
        self.0 |= other.0;
    }

    pub(crate) fn from_parts(phase: Phase, warmed_up: bool, stabilized: bool, errored: bool) -> Self {
        let mut flags = StatusFlags::empty();
        let phase_bits = match phase {
            Phase::Idle => StatusFlags::empty(),
            Phase::Powered => StatusFlags::POWERED,
            Phase::Awake => StatusFlags(StatusFlags::POWERED.0 | StatusFlags::WAKE_COMPLETE.0),
            Phase::MeasurementRequested => StatusFlags(
                StatusFlags::POWERED.0
                    | StatusFlags::WAKE_COMPLETE.0
                    | StatusFlags::MEASUREMENT_REQUESTED.0,
            ),
            Phase::MeasurementComplete => StatusFlags(
                StatusFlags::POWERED.0
                    | StatusFlags::WAKE_COMPLETE.0
                    | StatusFlags::MEASUREMENT_COMPLETE.0,
            ),
        };
        flags.insert(phase_bits);
        if warmed_up {
            flags.insert(StatusFlags::WARMED_UP);
        }
        if stabilized {
            flags.insert(StatusFlags::STABILIZED);
        }
        if errored {
            flags.insert(StatusFlags::ERRORED);
        }
        flags
    }
}

impl core::ops::BitOr for StatusFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        StatusFlags(self.0 | rhs.0)
    }
}
