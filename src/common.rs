use embedded_hal::i2c::SevenBitAddress;

use crate::conversions::{
    celsius_to_temperature_reading, humidity_reading_to_percent_rh,
    percent_rh_to_humidity_reading, temperature_reading_to_celsius,
};
use crate::error::{AlertLevelOutOfRange, Error, InvalidAlertMode};

/// Address of the sensor with ADR pin tied to ground.
///
/// The ADR pin selects one of `0x40` (GND), `0x41` (VDD), `0x42` (SDA)
/// or `0x43` (SCL).
pub const DEFAULT_ADDRESS: SevenBitAddress = 0x40;

/// Value of the manufacturer ID register on a genuine CHT8305.
pub const MANUFACTURER_ID: u16 = 0x5959;

/// Minimum time between measurements accepted by `read`.
pub const MIN_READ_INTERVAL_MS: u32 = 1_000;

/// Time to wait between selecting a measurement register and reading it.
///
/// The sensor converts on demand and NACKs reads until the conversion is
/// done: 6.5ms for each channel at 14 bit resolution.
pub(crate) const CONVERSION_DELAY_MS: u32 = 14;

const FIRST_USABLE_ADDRESS: SevenBitAddress = 0x08;
const LAST_USABLE_ADDRESS: SevenBitAddress = 0x77;

/// Check that the address is not one of the reserved I2C addresses.
pub(crate) fn validate_address<I>(address: SevenBitAddress) -> Result<SevenBitAddress, Error<I>>
where
    I: embedded_hal::i2c::Error,
{
    if (FIRST_USABLE_ADDRESS..=LAST_USABLE_ADDRESS).contains(&address) {
        Ok(address)
    } else {
        Err(Error::InvalidAddress(address))
    }
}

/// Sensor register pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    Temperature = 0x00,
    Humidity = 0x01,
    Config = 0x02,
    Alert = 0x03,
    Voltage = 0x04,
    Manufacturer = 0xFE,
    Version = 0xFF,
}

impl Register {
    /// Bytes for a single write of `value` to this register.
    pub(crate) fn write_bytes(&self, value: u16) -> [u8; 3] {
        let [msb, lsb] = value.to_be_bytes();
        [*self as u8, msb, lsb]
    }
}

const SOFT_RESET: u16 = 0x8000;
const CLOCK_STRETCH: u16 = 0x4000;
const HEATER: u16 = 0x2000;
const MODE: u16 = 0x1000;
const VCCS: u16 = 0x0800;
const TEMPERATURE_RESOLUTION: u16 = 0x0400;
const HUMIDITY_RESOLUTION: u16 = 0x0300;
const ALERT_MODE: u16 = 0x00C0;
const ALERT_PENDING: u16 = 0x0020;
const ALERT_HUMIDITY: u16 = 0x0010;
const ALERT_TEMPERATURE: u16 = 0x0008;
const VCC_ENABLE: u16 = 0x0004;

/// Contents of the 16-bit config register (0x02).
///
/// | bit | field           | meaning |
/// |:---:|:----------------|:--------|
/// | 15  | soft reset      | 1 = reboot the sensor, self-clearing |
/// | 14  | clock stretch   | 1 = on, 0 = off (default) |
/// | 13  | heater          | 1 = on, 0 = off (default) |
/// | 12  | mode            | 1 = temperature and humidity (default), 0 = one channel |
/// | 11  | VCCS            | 1 = supply above 2.8V, read only |
/// | 10  | T-RES           | 1 = 11 bit, 0 = 14 bit (default) |
/// | 9-8 | H-RES           | 10 = 8 bit, 01 = 11 bit, 00 = 14 bit (default) |
/// | 7-6 | ALTM            | alert trigger mode, see [`AlertMode`] |
/// | 5   | APS             | alert pending status |
/// | 4   | H-ALT           | humidity alert status |
/// | 3   | T-ALT           | temperature alert status |
/// | 2   | VCC enable      | 1 = measure supply voltage |
/// | 1-0 | reserved        | |
///
/// The `with_*` methods change a single field and leave every other bit,
/// reserved bits included, untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigRegister(pub u16);

impl ConfigRegister {
    pub fn bits(&self) -> u16 {
        self.0
    }

    fn flag(&self, mask: u16) -> bool {
        self.0 & mask == mask
    }

    fn with_flag(self, mask: u16, on: bool) -> Self {
        if on {
            Self(self.0 | mask)
        } else {
            Self(self.0 & !mask)
        }
    }

    fn with_field(self, mask: u16, value: u16) -> Self {
        Self((self.0 & !mask) | (value & mask))
    }

    pub fn soft_reset(&self) -> bool {
        self.flag(SOFT_RESET)
    }

    pub fn with_soft_reset(self) -> Self {
        self.with_flag(SOFT_RESET, true)
    }

    pub fn clock_stretch(&self) -> bool {
        self.flag(CLOCK_STRETCH)
    }

    pub fn with_clock_stretch(self, on: bool) -> Self {
        self.with_flag(CLOCK_STRETCH, on)
    }

    pub fn heater(&self) -> bool {
        self.flag(HEATER)
    }

    pub fn with_heater(self, on: bool) -> Self {
        self.with_flag(HEATER, on)
    }

    pub fn measurement_mode(&self) -> MeasurementMode {
        if self.flag(MODE) {
            MeasurementMode::Both
        } else {
            MeasurementMode::Single
        }
    }

    pub fn with_measurement_mode(self, mode: MeasurementMode) -> Self {
        self.with_flag(MODE, mode == MeasurementMode::Both)
    }

    /// Whether the sensor reports its supply as above 2.8V.
    pub fn vcc_status(&self) -> bool {
        self.flag(VCCS)
    }

    pub fn temperature_resolution(&self) -> TemperatureResolution {
        if self.flag(TEMPERATURE_RESOLUTION) {
            TemperatureResolution::Bits11
        } else {
            TemperatureResolution::Bits14
        }
    }

    pub fn with_temperature_resolution(self, resolution: TemperatureResolution) -> Self {
        self.with_flag(
            TEMPERATURE_RESOLUTION,
            resolution == TemperatureResolution::Bits11,
        )
    }

    pub fn humidity_resolution(&self) -> HumidityResolution {
        match (self.0 & HUMIDITY_RESOLUTION) >> 8 {
            0b10 => HumidityResolution::Bits8,
            0b01 => HumidityResolution::Bits11,
            _ => HumidityResolution::Bits14,
        }
    }

    pub fn with_humidity_resolution(self, resolution: HumidityResolution) -> Self {
        let bits = match resolution {
            HumidityResolution::Bits8 => 0b10,
            HumidityResolution::Bits11 => 0b01,
            HumidityResolution::Bits14 => 0b00,
        };
        self.with_field(HUMIDITY_RESOLUTION, bits << 8)
    }

    pub fn alert_mode(&self) -> AlertMode {
        match (self.0 & ALERT_MODE) >> 6 {
            0 => AlertMode::TemperatureOrHumidity,
            1 => AlertMode::Temperature,
            2 => AlertMode::Humidity,
            _ => AlertMode::TemperatureAndHumidity,
        }
    }

    pub fn with_alert_mode(self, mode: AlertMode) -> Self {
        self.with_field(ALERT_MODE, (mode as u16) << 6)
    }

    pub fn alert_pending(&self) -> bool {
        self.flag(ALERT_PENDING)
    }

    pub fn alert_humidity(&self) -> bool {
        self.flag(ALERT_HUMIDITY)
    }

    pub fn alert_temperature(&self) -> bool {
        self.flag(ALERT_TEMPERATURE)
    }

    pub fn vcc_enable(&self) -> bool {
        self.flag(VCC_ENABLE)
    }

    pub fn with_vcc_enable(self, on: bool) -> Self {
        self.with_flag(VCC_ENABLE, on)
    }
}

/// Whether a measurement converts both channels or only one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasurementMode {
    /// Temperature and humidity are both acquired (power-on default).
    Both,
    /// Only the addressed channel is acquired.
    Single,
}

/// Resolution of the temperature conversion.
///
/// Lower resolution converts faster but the lowest bits of the reading are
/// no longer meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TemperatureResolution {
    Bits11,
    /// Power-on default.
    Bits14,
}

/// Resolution of the humidity conversion.
///
/// The unused register encoding `0b11` is reported as [`Bits14`].
///
/// [`Bits14`]: HumidityResolution::Bits14
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HumidityResolution {
    Bits8,
    Bits11,
    /// Power-on default.
    Bits14,
}

/// Condition under which the ALERT pin is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AlertMode {
    /// Temperature or humidity crosses its threshold (power-on default).
    TemperatureOrHumidity = 0,
    Temperature = 1,
    Humidity = 2,
    /// Both temperature and humidity cross their thresholds.
    TemperatureAndHumidity = 3,
}

impl TryFrom<u8> for AlertMode {
    type Error = InvalidAlertMode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AlertMode::TemperatureOrHumidity),
            1 => Ok(AlertMode::Temperature),
            2 => Ok(AlertMode::Humidity),
            3 => Ok(AlertMode::TemperatureAndHumidity),
            other => Err(InvalidAlertMode(other)),
        }
    }
}

const ALERT_HUMIDITY_BITS: u16 = 0xFE00;
const ALERT_TEMPERATURE_BITS: u16 = 0x01FF;

/// Temperature and humidity alert thresholds.
///
/// The alert register (0x03) holds both thresholds, so they are always
/// written together: the top 7 bits of the humidity reading in bits 15-9
/// and the top 9 bits of the temperature reading in bits 8-0. Thresholds
/// read back from the sensor are therefore truncated to that precision,
/// about 0.8 %RH and 0.3°C.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertLevels {
    temperature: f32,
    humidity: f32,
}

impl AlertLevels {
    /// Thresholds in celsius and percent relative humidity.
    ///
    /// Use 125.0 and 100.0 to effectively disable a channel's alert.
    pub fn new(temperature: f32, humidity: f32) -> Result<Self, AlertLevelOutOfRange> {
        if !(-40.0..=125.0).contains(&temperature) {
            return Err(AlertLevelOutOfRange::Temperature);
        }
        if !(0.0..=100.0).contains(&humidity) {
            return Err(AlertLevelOutOfRange::Humidity);
        }
        Ok(Self {
            temperature,
            humidity,
        })
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn humidity(&self) -> f32 {
        self.humidity
    }

    pub(crate) fn to_register(self) -> u16 {
        let humidity = percent_rh_to_humidity_reading(self.humidity) & ALERT_HUMIDITY_BITS;
        let temperature = celsius_to_temperature_reading(self.temperature) >> 7;
        humidity | temperature
    }

    pub(crate) fn from_register(value: u16) -> Self {
        Self {
            temperature: temperature_reading_to_celsius((value & ALERT_TEMPERATURE_BITS) << 7),
            humidity: humidity_reading_to_percent_rh(value & ALERT_HUMIDITY_BITS),
        }
    }
}

/// Temperature and humidity from one successful read, offsets included.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Degrees celsius.
    pub temperature: f32,
    /// Percent relative humidity.
    pub humidity: f32,
}

/// Host-side state of the driver: calibration offsets and the most recent
/// successful measurement.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Readings {
    pub(crate) temperature_offset: f32,
    pub(crate) humidity_offset: f32,
    pub(crate) last: Measurement,
    pub(crate) last_read: Option<u32>,
}

impl Readings {
    pub(crate) fn check_interval<I>(&self, now_ms: u32) -> Result<(), Error<I>>
    where
        I: embedded_hal::i2c::Error,
    {
        match self.last_read {
            Some(previous) if now_ms.wrapping_sub(previous) < MIN_READ_INTERVAL_MS => {
                Err(Error::ReadTooSoon)
            }
            _ => Ok(()),
        }
    }

    /// Convert and cache a pair of raw readings taken at `now_ms`.
    pub(crate) fn record(&mut self, temperature: u16, humidity: u16, now_ms: u32) -> Measurement {
        self.last = Measurement {
            temperature: temperature_reading_to_celsius(temperature) + self.temperature_offset,
            humidity: humidity_reading_to_percent_rh(humidity) + self.humidity_offset,
        };
        self.last_read = Some(now_ms);
        self.last
    }
}
