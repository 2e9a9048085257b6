// src/drivers/mod.rs

// Concrete sensor drivers, one module per device family.

pub mod atlas;        // Atlas Scientific EZO circuits (I2C)
pub mod decagon_ctd;  // Decagon CTD-10 / Meter Hydros 21 (SDI-12)
pub mod rain_counter; // I2C tipping-bucket counter
pub mod sdi12;        // SDI-12 device helper shared by SDI-12 drivers

use crate::sensor::Location;
use core::fmt::Write;

/// `"I2C_0x<address in hex>"`
pub(crate) fn i2c_location(address: u8) -> Location {
    let mut location = Location::new();
    // at most 8 characters
    let _ = write!(location, "I2C_0x{:x}", address);
    location
}
