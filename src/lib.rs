//! Driver for the Sensylink CHT8305 temperature and humidity sensor.
//!
//! The [`blocking`] (default) and [`asynch`] (`async` feature) modules each
//! provide a `Cht8305` driver over the corresponding `embedded-hal` I2C
//! trait. Both read the sensor on demand with `read` and cache the result;
//! configuration methods go straight to the sensor's config register.
//!
//! ```rust,ignore
//! let mut sensor = cht8305::blocking::Cht8305::new(i2c);
//! sensor.verify_manufacturer()?;
//! sensor.read(&mut delay, now_ms())?;
//! println!("{:.1}°C {:.1} %RH", sensor.temperature(), sensor.humidity());
//! ```
#![no_std]

#[cfg(feature = "async")]
pub mod asynch;
#[cfg(feature = "blocking")]
pub mod blocking;
pub mod common;
pub mod conversions;
pub mod error;
