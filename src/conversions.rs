//! Sensor readings to celsius, percent relative humidity and volts.
//!
//! These functions are used by the driver when reading the sensor but are
//! provided here should you need to convert raw register values yourself.
//!
//! Temperature and humidity formulas are those in the CHT8305 datasheet:
//! both registers are full-scale 16-bit counts, with temperature
//! spanning -40°C to 125°C and humidity spanning 0 to 100 %RH.
//!
//! The conversions in the root of this module work with and return `f32`s.
//! If you prefer to work with fixed- rather than floating-point numbers,
//! use the `fixed` feature and the [`fixed_point`] submodule.

const FULL_SCALE: f32 = 65_535.0;
const TEMPERATURE_SPAN: f32 = 165.0;
const TEMPERATURE_MINIMUM: f32 = -40.0;
const HUMIDITY_SPAN: f32 = 100.0;

/// Convert the raw temperature reading to celsius.
pub fn temperature_reading_to_celsius(reading: u16) -> f32 {
    let d_t: f32 = reading.into();
    TEMPERATURE_MINIMUM + TEMPERATURE_SPAN * (d_t / FULL_SCALE)
}

/// Convert the raw humidity reading to percent relative humidity.
///
/// Unlike some sensors, every CHT8305 reading maps inside `0.0..=100.0`,
/// so no clamping is needed.
pub fn humidity_reading_to_percent_rh(reading: u16) -> f32 {
    let d_rh: f32 = reading.into();
    HUMIDITY_SPAN * (d_rh / FULL_SCALE)
}

/// Convert the raw supply voltage reading to volts.
///
/// The voltage register is only updated while VCC measurement is enabled in
/// the config register.
pub fn voltage_reading_to_volts(reading: u16) -> f32 {
    let d_v: f32 = reading.into();
    d_v * (5.0 / 32_768.0)
}

/// Convert a temperature in celsius to the raw 16-bit count the sensor would
/// report for it. Values outside the measurement range saturate.
pub fn celsius_to_temperature_reading(celsius: f32) -> u16 {
    ((celsius - TEMPERATURE_MINIMUM) / TEMPERATURE_SPAN * FULL_SCALE) as u16
}

/// Convert percent relative humidity to the raw 16-bit count the sensor would
/// report for it. Values outside the measurement range saturate.
pub fn percent_rh_to_humidity_reading(humidity: f32) -> u16 {
    (humidity / HUMIDITY_SPAN * FULL_SCALE) as u16
}

/// Fixed-point numeric conversions from sensor readings.
///
/// The functions in this module are the same as those in the parent
/// `conversions` module, except that they operate with fixed-point numbers
/// rather than floating-point numbers.
#[cfg(feature = "fixed")]
pub mod fixed_point {
    use fixed::types::{I16F16, U16F16};

    /// Convert the raw temperature reading to celsius.
    pub fn temperature_reading_to_celsius(reading: u16) -> I16F16 {
        // Convert u16 reading into a fraction 0..=1
        let fraction: U16F16 = U16F16::from_num(reading) / U16F16::from_num(u16::MAX);
        I16F16::from_num(-40) + I16F16::from_num(165) * I16F16::from_num(fraction)
    }

    /// Convert the raw humidity reading to percent relative humidity.
    pub fn humidity_reading_to_percent_rh(reading: u16) -> I16F16 {
        let fraction: U16F16 = U16F16::from_num(reading) / U16F16::from_num(u16::MAX);
        I16F16::from_num(100) * I16F16::from_num(fraction)
    }

    /// Convert the raw supply voltage reading to volts.
    pub fn voltage_reading_to_volts(reading: u16) -> I16F16 {
        // Up to 2.0, which would overflow I16F16 before the division.
        let fraction: U16F16 = U16F16::from_num(reading) / U16F16::from_num(32_768);
        I16F16::from_num(fraction) * I16F16::from_num(5)
    }

}
