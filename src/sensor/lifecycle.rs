// src/sensor/lifecycle.rs

use super::averaging::{Averager, AveragingProgress};
use super::config::SensorConfig;
use super::driver::{Location, RawReadings, ReadingPolicy, SensorDriver, SensorTiming};
use super::power::AlwaysPowered;
use super::source::ValueSource;
use super::status::{Phase, StatusFlags};
use crate::common::{
    error::{SensorError, Step},
    timing::{has_elapsed, Millis},
    FAILURE_SENTINEL, MAX_RETURNED_VALUES,
};
use core::cell::{Cell, RefCell};
use embedded_hal::digital::{Error as _, OutputPin};

/// State that only lives for one measurement cycle.
#[derive(Debug)]
struct Cycle {
    phase: Phase,
    warmed_up: bool,
    stabilized: bool,
    errored: bool,
    /// Start of the warm-up window, armed by a successful wake.
    awake_since: Option<Millis>,
    /// Start of the current measurement window, armed by a trigger.
    measurement_started: Option<Millis>,
    averager: Averager,
}

impl Cycle {
    fn restart(&mut self) {
        self.phase = Phase::Powered;
        self.warmed_up = false;
        self.stabilized = false;
        self.errored = false;
        self.awake_since = None;
        self.measurement_started = None;
        self.averager.reset();
    }

    fn is_awake(&self) -> bool {
        matches!(
            self.phase,
            Phase::Awake | Phase::MeasurementRequested | Phase::MeasurementComplete
        )
    }
}

/// A physical sensor driven through the power, wake, warm-up, measurement and
/// averaging cycle.
///
/// Every step takes `&self`: the sensor keeps its state in cells so that the
/// scheduler and any number of [`Variable`](crate::Variable)s can hold it at
/// the same time. A `Sensor` is therefore not `Sync` and belongs to the one
/// thread running the scheduler.
#[derive(Debug)]
pub struct Sensor<D, P = AlwaysPowered> {
    driver: RefCell<D>,
    power_pin: Option<RefCell<P>>,
    policy: ReadingPolicy,
    cycle: RefCell<Cycle>,
    results: [Cell<f32>; MAX_RETURNED_VALUES],
}

impl<D> Sensor<D, AlwaysPowered>
where
    D: SensorDriver,
{
    /// Creates a sensor that is permanently powered. Power-down sends the
    /// driver's sleep command instead of cutting power.
    pub fn always_powered(driver: D, config: SensorConfig) -> Self {
        Self::new(driver, None, config)
    }
}

impl<D, P> Sensor<D, P>
where
    D: SensorDriver,
    P: OutputPin,
{
    const VALUE_COUNT_OK: () = assert!(
        D::NUM_VALUES > 0 && D::NUM_VALUES <= MAX_RETURNED_VALUES,
        "driver NUM_VALUES must be between 1 and MAX_RETURNED_VALUES"
    );

    /// Creates a sensor. `power_pin` of `None` means the sensor is always
    /// powered.
    pub fn new(driver: D, power_pin: Option<P>, config: SensorConfig) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALUE_COUNT_OK;

        let averager = Averager::new(
            D::NUM_VALUES,
            config.measurements_to_average_for::<D>(),
            config.retry_budget,
            config.quorum,
        );
        Sensor {
            driver: RefCell::new(driver),
            power_pin: power_pin.map(RefCell::new),
            policy: config.reading_policy_for::<D>(),
            cycle: RefCell::new(Cycle {
                phase: Phase::Idle,
                warmed_up: false,
                stabilized: false,
                errored: false,
                awake_since: None,
                measurement_started: None,
                averager,
            }),
            results: core::array::from_fn(|_| Cell::new(FAILURE_SENTINEL)),
        }
    }

    /// Gives back the driver and power pin.
    pub fn release(self) -> (D, Option<P>) {
        (
            self.driver.into_inner(),
            self.power_pin.map(RefCell::into_inner),
        )
    }

    // --- Descriptive accessors ---

    pub fn name(&self) -> &'static str {
        D::NAME
    }

    pub fn location(&self) -> Location {
        self.driver.borrow().location()
    }

    pub fn num_values(&self) -> usize {
        D::NUM_VALUES
    }

    pub fn timing(&self) -> SensorTiming {
        D::TIMING
    }

    pub fn measurements_to_average(&self) -> u8 {
        self.cycle.borrow().averager.target()
    }

    pub fn reading_policy(&self) -> ReadingPolicy {
        self.policy
    }

    pub fn has_power_pin(&self) -> bool {
        self.power_pin.is_some()
    }

    pub fn phase(&self) -> Phase {
        self.cycle.borrow().phase
    }

    pub fn is_errored(&self) -> bool {
        self.cycle.borrow().errored
    }

    /// Status as a bitmask, for diagnostics.
    pub fn status(&self) -> StatusFlags {
        let cycle = self.cycle.borrow();
        StatusFlags::from_parts(cycle.phase, cycle.warmed_up, cycle.stabilized, cycle.errored)
    }

    /// Attempts made so far in the current cycle.
    pub fn attempts(&self) -> u8 {
        self.cycle.borrow().averager.attempts()
    }

    /// Successful readings collected so far for `index` in the current cycle.
    pub fn successes(&self, index: usize) -> u8 {
        self.cycle.borrow().averager.successes(index)
    }

    /// Last published averaged result for `index`; the failure sentinel if
    /// none exists or `index` is out of range.
    pub fn value(&self, index: usize) -> f32 {
        if index < D::NUM_VALUES {
            self.results[index].get()
        } else {
            FAILURE_SENTINEL
        }
    }

    // --- Lifecycle steps ---

    /// Applies power and starts a new cycle, clearing the previous results.
    ///
    /// A no-op while a cycle is already running. After a failed wake it
    /// starts the cycle over.
    pub fn power_up(&self) -> Result<(), SensorError<D::Error>> {
        let mut cycle = self.cycle.borrow_mut();
        let restart = match cycle.phase {
            Phase::Idle => true,
            Phase::Powered => cycle.errored,
            _ => false,
        };
        if !restart {
            trace!("{} already powered, phase {}", D::NAME, cycle.phase);
            return Ok(());
        }

        if let Some(pin) = &self.power_pin {
            pin.borrow_mut()
                .set_high()
                .map_err(|e| SensorError::PowerPin(e.kind()))?;
        }
        cycle.restart();
        for slot in &self.results[..D::NUM_VALUES] {
            slot.set(FAILURE_SENTINEL);
        }
        debug!("{} powered up", D::NAME);
        Ok(())
    }

    /// Wakes the device and arms the warm-up window at `now`.
    ///
    /// A failed wake marks the sensor errored and aborts the cycle; call
    /// [`power_up`](Self::power_up) again to retry.
    pub fn wake(&self, now: Millis) -> Result<(), SensorError<D::Error>> {
        let mut cycle = self.cycle.borrow_mut();
        if cycle.phase != Phase::Powered || cycle.errored {
            return Err(SensorError::OutOfOrder(Step::Wake));
        }

        match self.driver.borrow_mut().perform_wake() {
            Ok(()) => {
                cycle.phase = Phase::Awake;
                cycle.awake_since = Some(now);
                debug!("{} awake at {} ms", D::NAME, now);
                Ok(())
            }
            Err(e) => {
                cycle.errored = true;
                cycle.awake_since = None;
                warn!("{} failed to wake: {:?}", D::NAME, e);
                Err(SensorError::Transport(e))
            }
        }
    }

    /// Whether the warm-up window has passed.
    pub fn is_warmed_up(&self, now: Millis) -> bool {
        let mut cycle = self.cycle.borrow_mut();
        if !cycle.is_awake() {
            return false;
        }
        if !cycle.warmed_up && has_elapsed(cycle.awake_since, D::TIMING.warm_up_ms, now) {
            cycle.warmed_up = true;
        }
        cycle.warmed_up
    }

    /// Whether the stabilization window, which starts when warm-up ends, has
    /// passed.
    pub fn is_stabilized(&self, now: Millis) -> bool {
        let mut cycle = self.cycle.borrow_mut();
        if !cycle.is_awake() {
            return false;
        }
        if !cycle.stabilized && has_elapsed(cycle.awake_since, D::TIMING.stable_after_ms(), now) {
            cycle.warmed_up = true;
            cycle.stabilized = true;
        }
        cycle.stabilized
    }

    /// Whether the triggered measurement can be collected.
    pub fn is_measurement_complete(&self, now: Millis) -> bool {
        if self.phase() != Phase::MeasurementRequested || !self.is_stabilized(now) {
            return false;
        }
        let cycle = self.cycle.borrow();
        has_elapsed(cycle.measurement_started, D::TIMING.measurement_ms, now)
    }

    /// Whether every index has its readings or the retry budget is spent.
    pub fn is_averaging_complete(&self) -> bool {
        let cycle = self.cycle.borrow();
        cycle.is_awake() && cycle.averager.is_complete()
    }

    /// Triggers one measurement and arms the measurement window at `now`.
    ///
    /// Rejected without any state change before warm-up has passed, outside
    /// a running cycle, or once averaging is complete. A failed trigger
    /// counts as a failed attempt.
    pub fn start_single_measurement(&self, now: Millis) -> Result<(), SensorError<D::Error>> {
        if !self.is_warmed_up(now) {
            return match self.phase() {
                Phase::Awake | Phase::MeasurementComplete => {
                    Err(SensorError::NotReady(Step::StartMeasurement))
                }
                _ => Err(SensorError::OutOfOrder(Step::StartMeasurement)),
            };
        }

        let mut cycle = self.cycle.borrow_mut();
        if !matches!(cycle.phase, Phase::Awake | Phase::MeasurementComplete)
            || cycle.averager.is_complete()
        {
            return Err(SensorError::OutOfOrder(Step::StartMeasurement));
        }

        match self.driver.borrow_mut().perform_measurement_trigger() {
            Ok(()) => {
                cycle.phase = Phase::MeasurementRequested;
                cycle.measurement_started = Some(now);
                trace!("{} measurement requested at {} ms", D::NAME, now);
                Ok(())
            }
            Err(e) => {
                cycle.averager.record_failed_attempt();
                warn!(
                    "{} measurement trigger failed (attempt {}): {:?}",
                    D::NAME,
                    cycle.averager.attempts(),
                    e
                );
                if cycle.averager.is_complete() {
                    self.publish(&mut cycle);
                }
                Err(SensorError::Transport(e))
            }
        }
    }

    /// Collects the triggered measurement and folds it into the running
    /// averages.
    ///
    /// Rejected without any state change unless a measurement was requested
    /// and its window has passed. Transport failures do not surface here:
    /// they count as a failed attempt for every index.
    pub fn add_single_measurement_result(
        &self,
        now: Millis,
    ) -> Result<AveragingProgress, SensorError<D::Error>> {
        if self.phase() != Phase::MeasurementRequested {
            return Err(SensorError::OutOfOrder(Step::CollectResult));
        }
        if !self.is_measurement_complete(now) {
            return Err(SensorError::NotReady(Step::CollectResult));
        }

        let mut readings = RawReadings::new(D::NUM_VALUES);
        if let Err(e) = self.driver.borrow_mut().collect_raw_readings(&mut readings) {
            warn!("{} failed to return readings: {:?}", D::NAME, e);
            readings.clear();
        }
        readings.apply_policy(self.policy);

        let mut cycle = self.cycle.borrow_mut();
        cycle.averager.record(&readings);
        cycle.measurement_started = None;
        cycle.phase = Phase::MeasurementComplete;
        debug!(
            "{} attempt {}: {} of {} readings ok",
            D::NAME,
            cycle.averager.attempts(),
            readings.successes(),
            D::NUM_VALUES
        );

        let progress = cycle.averager.progress();
        if progress == AveragingProgress::Complete {
            self.publish(&mut cycle);
        }
        Ok(progress)
    }

    /// Sleeps or cuts power and returns to [`Phase::Idle`].
    ///
    /// Always resets the cycle, even if switching the pin fails. Published
    /// results stay readable and the errored flag stays set until the next
    /// cycle starts.
    pub fn power_down(&self) -> Result<(), SensorError<D::Error>> {
        let mut cycle = self.cycle.borrow_mut();
        if cycle.phase == Phase::Idle {
            return Ok(());
        }

        if self.power_pin.is_none() && cycle.is_awake() {
            if let Err(e) = self.driver.borrow_mut().perform_sleep() {
                warn!("{} failed to sleep: {:?}", D::NAME, e);
            }
        }

        cycle.phase = Phase::Idle;
        cycle.warmed_up = false;
        cycle.stabilized = false;
        cycle.awake_since = None;
        cycle.measurement_started = None;
        debug!("{} powered down", D::NAME);

        if let Some(pin) = &self.power_pin {
            pin.borrow_mut()
                .set_low()
                .map_err(|e| SensorError::PowerPin(e.kind()))?;
        }
        Ok(())
    }

    fn publish(&self, cycle: &mut Cycle) {
        for (index, slot) in self.results[..D::NUM_VALUES].iter().enumerate() {
            let value = cycle.averager.mean(index);
            if value == FAILURE_SENTINEL {
                cycle.errored = true;
            }
            slot.set(value);
        }
        if cycle.errored {
            warn!("{} finished averaging with failed values", D::NAME);
        }
    }
}

impl<D, P> ValueSource for Sensor<D, P>
where
    D: SensorDriver,
    P: OutputPin,
{
    fn sensor_name(&self) -> &'static str {
        D::NAME
    }

    fn sensor_location(&self) -> Location {
        self.location()
    }

    fn num_values(&self) -> usize {
        D::NUM_VALUES
    }

    fn result(&self, index: usize) -> f32 {
        self.value(index)
    }
}
