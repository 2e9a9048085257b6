// tests/common/mod.rs

#![allow(dead_code)]

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use modular_sensors::{Location, RawReadings, SensorDriver, SensorTiming};
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BusFault;

/// One scripted collection: `None` for a whole-frame failure, otherwise one
/// entry per index (`None` for a failed index).
pub type Frame<const N: usize> = Option<[Option<f32>; N]>;

/// Driver answering from a script. Timing matches the reference scenario:
/// 500 ms warm-up, no stabilization, 500 ms measurement.
pub struct ScriptedDriver<const N: usize> {
    pub frames: VecDeque<Frame<N>>,
    pub wake_ok: bool,
    pub log: Rc<DriverLog>,
}

#[derive(Debug, Default)]
pub struct DriverLog {
    pub wakes: Cell<u32>,
    pub triggers: Cell<u32>,
    pub collects: Cell<u32>,
    pub sleeps: Cell<u32>,
}

impl<const N: usize> ScriptedDriver<N> {
    pub fn new(frames: &[Frame<N>]) -> (Self, Rc<DriverLog>) {
        let log = Rc::new(DriverLog::default());
        let driver = ScriptedDriver {
            frames: frames.iter().copied().collect(),
            wake_ok: true,
            log: Rc::clone(&log),
        };
        (driver, log)
    }
}

fn bump(counter: &Cell<u32>) {
    counter.set(counter.get() + 1);
}

impl<const N: usize> SensorDriver for ScriptedDriver<N> {
    type Error = BusFault;

    const NAME: &'static str = "Scripted";
    const NUM_VALUES: usize = N;
    const TIMING: SensorTiming = SensorTiming::new(500, 0, 500);

    fn location(&self) -> Location {
        Location::try_from("bench").unwrap()
    }

    fn perform_wake(&mut self) -> Result<(), BusFault> {
        bump(&self.log.wakes);
        if self.wake_ok {
            Ok(())
        } else {
            Err(BusFault)
        }
    }

    fn perform_measurement_trigger(&mut self) -> Result<(), BusFault> {
        bump(&self.log.triggers);
        Ok(())
    }

    fn collect_raw_readings(&mut self, readings: &mut RawReadings) -> Result<(), BusFault> {
        bump(&self.log.collects);
        let frame = self.frames.pop_front().flatten().ok_or(BusFault)?;
        for (index, value) in frame.iter().enumerate() {
            if let Some(value) = value {
                readings.set(index, *value);
            }
        }
        Ok(())
    }

    fn perform_sleep(&mut self) -> Result<(), BusFault> {
        bump(&self.log.sleeps);
        Ok(())
    }
}

/// Power pin whose level can be observed from the test.
#[derive(Debug, Clone, Default)]
pub struct ObservedPin {
    pub high: Rc<Cell<bool>>,
    pub switches: Rc<Cell<u32>>,
}

impl ErrorType for ObservedPin {
    type Error = ErrorKind;
}

impl OutputPin for ObservedPin {
    fn set_low(&mut self) -> Result<(), ErrorKind> {
        self.high.set(false);
        bump(&self.switches);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), ErrorKind> {
        self.high.set(true);
        bump(&self.switches);
        Ok(())
    }
}
