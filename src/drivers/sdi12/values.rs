// src/drivers/sdi12/values.rs

use crate::common::error::TransportError;
use crate::sensor::RawReadings;
use core::fmt::Debug;
use core::str::FromStr;

/// What a device announced in answer to a start-measurement command
/// (`atttnn`).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MeasurementTiming {
    /// Seconds until the values are ready.
    pub ready_in_s: u16,
    /// Number of values the measurement will return.
    pub values: u8,
}

impl MeasurementTiming {
    /// Parses the `tttnn` part of a concurrent measurement response, the
    /// address already stripped.
    pub fn parse_concurrent<E: Debug>(body: &str) -> Result<Self, TransportError<E>> {
        let bytes = body.as_bytes();
        if bytes.len() != 5 || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(TransportError::InvalidFormat);
        }
        let ready_in_s = digits(&bytes[..3]);
        let values = digits(&bytes[3..]);
        Ok(MeasurementTiming {
            ready_in_s,
            values: values as u8,
        })
    }
}

fn digits(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'))
}

/// Parses one value as sent by a device: a mandatory sign followed by up to
/// seven digits with an optional decimal point (`+1.23`, `-45`).
pub fn parse_value<E: Debug>(s: &str) -> Result<f32, TransportError<E>> {
    if s.len() < 2 || s.len() > 9 {
        return Err(TransportError::InvalidFormat);
    }
    let sign = match s.as_bytes()[0] {
        b'+' => 1.0,
        b'-' => -1.0,
        _ => return Err(TransportError::InvalidFormat),
    };
    let rest = &s[1..];

    let mut decimal_found = false;
    let mut digit_count = 0;
    for c in rest.chars() {
        match c {
            '0'..='9' => digit_count += 1,
            '.' if !decimal_found => decimal_found = true,
            _ => return Err(TransportError::InvalidFormat),
        }
    }
    if digit_count == 0 || digit_count > 7 {
        return Err(TransportError::InvalidFormat);
    }

    let magnitude = f32::from_str(rest).map_err(|_| TransportError::InvalidFormat)?;
    Ok(sign * magnitude)
}

/// Splits a data response body (`+1.23-4.5+6`) into its values and stores
/// them into `readings` starting at `first_index`.
///
/// Returns the number of values found, including any that did not fit.
pub fn parse_values<E: Debug>(
    body: &str,
    readings: &mut RawReadings,
    first_index: usize,
) -> Result<usize, TransportError<E>> {
    let mut found = 0;
    let mut rest = body;
    while !rest.is_empty() {
        let end = rest
            .bytes()
            .skip(1)
            .position(|b| b == b'+' || b == b'-')
            .map_or(rest.len(), |pos| pos + 1);
        let value = parse_value(&rest[..end])?;
        readings.set(first_index + found, value);
        found += 1;
        rest = &rest[end..];
    }
    Ok(found)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    type Result<T> = core::result::Result<T, TransportError>;

    fn value(s: &str) -> Result<f32> {
        parse_value(s)
    }

    fn values(body: &str, readings: &mut RawReadings, first: usize) -> Result<usize> {
        parse_values(body, readings, first)
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(value("+1.23").unwrap(), 1.23);
        assert_eq!(value("-45").unwrap(), -45.0);
        assert_eq!(value("+.5").unwrap(), 0.5);
        assert_eq!(value("+1234567").unwrap(), 1234567.0);
    }

    #[test]
    fn test_parse_value_invalid() {
        assert!(value("").is_err());
        assert!(value("+").is_err());
        assert!(value("1.0").is_err());
        assert!(value("+1.2.3").is_err());
        assert!(value("+12345678").is_err());
        assert!(value("+1a").is_err());
    }

    #[test]
    fn test_parse_values_sequence() {
        let mut readings = RawReadings::new(3);
        let found = values("+12.5+21.37-0.4", &mut readings, 0).unwrap();
        assert_eq!(found, 3);
        assert_eq!(readings.get(0), Some(12.5));
        assert_eq!(readings.get(1), Some(21.37));
        assert_eq!(readings.get(2), Some(-0.4));
    }

    #[test]
    fn test_parse_values_continues_at_offset() {
        let mut readings = RawReadings::new(3);
        assert_eq!(values("+1", &mut readings, 0).unwrap(), 1);
        assert_eq!(values("+2+3+4", &mut readings, 1).unwrap(), 3);
        assert_eq!(readings.get(1), Some(2.0));
        assert_eq!(readings.get(2), Some(3.0));
        assert_eq!(readings.successes(), 3);
    }

    #[test]
    fn test_parse_values_device_sentinel_is_failure() {
        let mut readings = RawReadings::new(2);
        values("-9999+5", &mut readings, 0).unwrap();
        assert_eq!(readings.get(0), None);
        assert_eq!(readings.get(1), Some(5.0));
    }

    #[test]
    fn test_parse_values_empty_body() {
        let mut readings = RawReadings::new(2);
        assert_eq!(values("", &mut readings, 0).unwrap(), 0);
    }

    #[test]
    fn test_parse_concurrent_timing() {
        assert_eq!(
            MeasurementTiming::parse_concurrent::<()>("00103").unwrap(),
            MeasurementTiming { ready_in_s: 1, values: 3 }
        );
        assert!(MeasurementTiming::parse_concurrent::<()>("0013").is_err());
        assert!(MeasurementTiming::parse_concurrent::<()>("0a103").is_err());
    }
}
