/// Numeric code for an invalid device address.
pub const ERROR_ADDRESS: i8 = -10;
/// Numeric code for a failed bus transaction.
pub const ERROR_I2C: i8 = -11;
/// Numeric code for a device that does not identify as a CHT8305.
pub const ERROR_CONNECT: i8 = -12;
/// Numeric code for a read attempted before the minimum read interval elapsed.
pub const ERROR_LAST_READ: i8 = -20;

#[derive(Debug)]
pub enum Error<I2cError>
where
    I2cError: embedded_hal::i2c::Error,
{
    /// The address is outside the usable 7-bit range `0x08..=0x77`.
    InvalidAddress(u8),
    /// The manufacturer register did not read `0x5959`.
    UnexpectedManufacturer(u16),
    /// A measurement was requested within [`MIN_READ_INTERVAL_MS`] of the
    /// previous successful one.
    ///
    /// [`MIN_READ_INTERVAL_MS`]: crate::common::MIN_READ_INTERVAL_MS
    ReadTooSoon,
    I2c(I2cError),
}

impl<I2cError> Error<I2cError>
where
    I2cError: embedded_hal::i2c::Error,
{
    /// The small negative integer conventionally used for this error by
    /// CHT8305 libraries on other platforms. Success is `0`.
    pub fn code(&self) -> i8 {
        match self {
            Error::InvalidAddress(_) => ERROR_ADDRESS,
            Error::I2c(_) => ERROR_I2C,
            Error::UnexpectedManufacturer(_) => ERROR_CONNECT,
            Error::ReadTooSoon => ERROR_LAST_READ,
        }
    }
}

impl<I2cError> From<I2cError> for Error<I2cError>
where
    I2cError: embedded_hal::i2c::Error,
{
    fn from(value: I2cError) -> Self {
        Error::I2c(value)
    }
}

impl<I2cError> core::fmt::Display for Error<I2cError>
where
    I2cError: embedded_hal::i2c::Error,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidAddress(address) => {
                write!(f, "Address {address:#04x} is outside 0x08..=0x77")
            }
            Error::UnexpectedManufacturer(id) => {
                write!(f, "Unexpected manufacturer ID {id:#06x}, expected 0x5959")
            }
            Error::ReadTooSoon => write!(f, "Sensor read again too soon"),
            Error::I2c(e) => write!(f, "Received I2C error: {:?}", e),
        }
    }
}

impl<I> core::error::Error for Error<I> where I: embedded_hal::i2c::Error {}

/// An alert trigger mode outside `0..=3` was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidAlertMode(pub u8);

impl core::fmt::Display for InvalidAlertMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Alert mode {} is not one of 0, 1, 2, 3", self.0)
    }
}

impl core::error::Error for InvalidAlertMode {}

/// An alert threshold outside the sensor's measurement range was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertLevelOutOfRange {
    /// Temperature threshold outside -40°C to 125°C.
    Temperature,
    /// Humidity threshold outside 0 to 100 %RH.
    Humidity,
}

impl core::fmt::Display for AlertLevelOutOfRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AlertLevelOutOfRange::Temperature => {
                write!(f, "Temperature alert level outside -40°C to 125°C")
            }
            AlertLevelOutOfRange::Humidity => {
                write!(f, "Humidity alert level outside 0 to 100 %RH")
            }
        }
    }
}

impl core::error::Error for AlertLevelOutOfRange {}
