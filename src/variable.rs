// src/variable.rs

//! Named, unit-tagged views onto single outputs of a sensor.

use crate::common::{error::VariableError, FAILURE_SENTINEL};
use crate::sensor::{Location, ValueSource};
use core::fmt::{self, Write as _};

/// Rendered form of a variable value. Holds any `f32` at
/// [`MAX_RENDERED_DECIMALS`].
pub type ValueString = heapless::String<48>;

/// Decimal places rendered by [`Variable::value_string`] at most.
pub const MAX_RENDERED_DECIMALS: u8 = 6;

/// Static description of one sensor output. Drivers publish one of these per
/// value they return.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VariableSpec {
    /// Output index on the parent sensor.
    pub index: usize,
    /// Decimal places kept when the value is read.
    pub resolution: u8,
    pub name: &'static str,
    pub unit: &'static str,
    /// Short code used unless the variable overrides it.
    pub default_code: &'static str,
}

impl VariableSpec {
    pub const fn new(
        index: usize,
        resolution: u8,
        name: &'static str,
        unit: &'static str,
        default_code: &'static str,
    ) -> Self {
        Self {
            index,
            resolution,
            name,
            unit,
            default_code,
        }
    }
}

/// One output of a sensor.
///
/// A variable borrows its parent and never changes it: reading a value has no
/// side effects on the sensor.
#[derive(Copy, Clone)]
pub struct Variable<'a> {
    parent: Option<&'a dyn ValueSource>,
    spec: VariableSpec,
    code: &'a str,
    uuid: &'a str,
}

impl<'a> Variable<'a> {
    /// Creates a variable bound to `parent`. An empty `uuid` means none is
    /// assigned.
    pub fn new(
        spec: VariableSpec,
        parent: &'a dyn ValueSource,
        uuid: &'a str,
    ) -> Result<Self, VariableError> {
        let mut variable = Self::unbound(spec).with_uuid(uuid);
        variable.attach(parent)?;
        Ok(variable)
    }

    /// Creates a variable that is not yet attached to a sensor.
    pub const fn unbound(spec: VariableSpec) -> Self {
        Self {
            parent: None,
            spec,
            code: spec.default_code,
            uuid: "",
        }
    }

    /// Attaches the variable to its sensor. Allowed exactly once.
    pub fn attach(&mut self, parent: &'a dyn ValueSource) -> Result<(), VariableError> {
        if self.parent.is_some() {
            return Err(VariableError::AlreadyBound);
        }
        let available = parent.num_values();
        if self.spec.index >= available {
            return Err(VariableError::IndexOutOfRange {
                index: self.spec.index,
                available,
            });
        }
        self.parent = Some(parent);
        Ok(())
    }

    /// Overrides the short code.
    pub fn with_code(mut self, code: &'a str) -> Self {
        self.code = code;
        self
    }

    pub fn with_uuid(mut self, uuid: &'a str) -> Self {
        self.uuid = uuid;
        self
    }

    /// The parent's latest result rounded to `resolution` decimals. The
    /// failure sentinel is passed through untouched.
    pub fn value(&self) -> Result<f32, VariableError> {
        let parent = self.parent.ok_or(VariableError::Unbound)?;
        let raw = parent.result(self.spec.index);
        if raw == FAILURE_SENTINEL {
            return Ok(FAILURE_SENTINEL);
        }
        Ok(round_to(raw, self.spec.resolution))
    }

    /// The value formatted with exactly `resolution` decimals (capped at
    /// [`MAX_RENDERED_DECIMALS`]).
    pub fn value_string(&self) -> Result<ValueString, VariableError> {
        let value = self.value()?;
        let decimals = self.spec.resolution.min(MAX_RENDERED_DECIMALS) as usize;
        let mut out = ValueString::new();
        write!(out, "{:.*}", decimals, value).map_err(|_| VariableError::Unrenderable)?;
        Ok(out)
    }

    pub fn is_bound(&self) -> bool {
        self.parent.is_some()
    }

    pub fn parent_name(&self) -> Option<&'static str> {
        self.parent.map(|p| p.sensor_name())
    }

    pub fn parent_location(&self) -> Option<Location> {
        self.parent.map(|p| p.sensor_location())
    }

    pub fn spec(&self) -> &VariableSpec {
        &self.spec
    }

    pub fn index(&self) -> usize {
        self.spec.index
    }

    pub fn resolution(&self) -> u8 {
        self.spec.resolution
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn unit(&self) -> &'static str {
        self.spec.unit
    }

    pub fn code(&self) -> &'a str {
        self.code
    }

    pub fn uuid(&self) -> &'a str {
        self.uuid
    }
}

impl fmt::Debug for Variable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("parent", &self.parent_name())
            .field("spec", &self.spec)
            .field("code", &self.code)
            .field("uuid", &self.uuid)
            .finish()
    }
}

fn round_to(value: f32, decimals: u8) -> f32 {
    let factor = libm::powf(10.0, decimals as f32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    libm::roundf(scaled) / factor
}
