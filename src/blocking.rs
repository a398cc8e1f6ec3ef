use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, SevenBitAddress};

use crate::common::{
    AlertLevels, AlertMode, CONVERSION_DELAY_MS, ConfigRegister, DEFAULT_ADDRESS,
    HumidityResolution, MANUFACTURER_ID, Measurement, MeasurementMode, Readings, Register,
    TemperatureResolution, validate_address,
};
use crate::conversions::voltage_reading_to_volts;
use crate::error::Error;

/// CHT8305 driver over a blocking I2C bus.
///
/// Measurements are pulled from the sensor with [`read`] and cached, so
/// [`temperature`] and [`humidity`] never touch the bus. Everything else is
/// a live register access: the driver keeps no copy of the config register,
/// and each setter is an independent read-modify-write.
///
/// [`read`]: Cht8305::read
/// [`temperature`]: Cht8305::temperature
/// [`humidity`]: Cht8305::humidity
pub struct Cht8305<I: I2c> {
    i2c: I,
    address: SevenBitAddress,
    readings: Readings,
}

impl<I: I2c> Cht8305<I> {
    /// Driver for a sensor at the default address, 0x40.
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            address: DEFAULT_ADDRESS,
            readings: Readings::default(),
        }
    }

    pub fn destroy(self) -> I {
        self.i2c
    }

    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    /// Talk to the sensor at `address` from now on.
    ///
    /// Reserved I2C addresses are rejected and the current address kept.
    /// This does not check that a sensor is present; see [`is_connected`].
    ///
    /// [`is_connected`]: Cht8305::is_connected
    pub fn set_address(&mut self, address: SevenBitAddress) -> Result<(), Error<I::Error>> {
        self.address = validate_address::<I::Error>(address)?;
        Ok(())
    }

    /// Probe the sensor address with an empty write.
    pub fn is_connected(&mut self) -> bool {
        self.i2c.write(self.address, &[]).is_ok()
    }

    /// Measure temperature and humidity, caching the result.
    ///
    /// `now_ms` is the caller's monotonic millisecond clock, used to refuse
    /// reads less than [`MIN_READ_INTERVAL_MS`] apart and reported back by
    /// [`last_read`]. On any error the cached values and timestamp are
    /// left as they were.
    ///
    /// [`MIN_READ_INTERVAL_MS`]: crate::common::MIN_READ_INTERVAL_MS
    /// [`last_read`]: Cht8305::last_read
    pub fn read(&mut self, mut delay: impl DelayNs, now_ms: u32) -> Result<Measurement, Error<I::Error>> {
        self.readings.check_interval::<I::Error>(now_ms)?;

        let temperature = self.read_register_with_delay(Register::Temperature, &mut delay)?;
        let humidity = self.read_register_with_delay(Register::Humidity, &mut delay)?;

        Ok(self.readings.record(temperature, humidity, now_ms))
    }

    /// Timestamp passed to the last successful [`read`], if any.
    ///
    /// [`read`]: Cht8305::read
    pub fn last_read(&self) -> Option<u32> {
        self.readings.last_read
    }

    /// Temperature in celsius from the last successful read, offset included.
    pub fn temperature(&self) -> f32 {
        self.readings.last.temperature
    }

    /// Percent relative humidity from the last successful read, offset included.
    pub fn humidity(&self) -> f32 {
        self.readings.last.humidity
    }

    /// Calibration offset added to every subsequent temperature reading.
    ///
    /// Offsets work well in the normal range but can push readings past the
    /// ends of the sensor's range.
    pub fn set_temperature_offset(&mut self, offset: f32) {
        self.readings.temperature_offset = offset;
    }

    pub fn temperature_offset(&self) -> f32 {
        self.readings.temperature_offset
    }

    /// Calibration offset added to every subsequent humidity reading.
    pub fn set_humidity_offset(&mut self, offset: f32) {
        self.readings.humidity_offset = offset;
    }

    pub fn humidity_offset(&self) -> f32 {
        self.readings.humidity_offset
    }

    pub fn config_register(&mut self) -> Result<ConfigRegister, Error<I::Error>> {
        Ok(ConfigRegister(self.read_register(Register::Config)?))
    }

    /// Overwrite the whole config register.
    pub fn set_config_register(&mut self, config: ConfigRegister) -> Result<(), Error<I::Error>> {
        self.write_register(Register::Config, config.bits())
    }

    /// Reboot the sensor to its power-on configuration.
    pub fn soft_reset(&mut self) -> Result<(), Error<I::Error>> {
        self.update_config(ConfigRegister::with_soft_reset)
    }

    pub fn set_clock_stretch(&mut self, on: bool) -> Result<(), Error<I::Error>> {
        self.update_config(|config| config.with_clock_stretch(on))
    }

    pub fn clock_stretch(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.config_register()?.clock_stretch())
    }

    /// Switch the on-chip heater on or off.
    ///
    /// The sensor does not switch the heater off by itself.
    pub fn set_heater(&mut self, on: bool) -> Result<(), Error<I::Error>> {
        self.update_config(|config| config.with_heater(on))
    }

    pub fn heater(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.config_register()?.heater())
    }

    pub fn set_measurement_mode(&mut self, mode: MeasurementMode) -> Result<(), Error<I::Error>> {
        self.update_config(|config| config.with_measurement_mode(mode))
    }

    pub fn measurement_mode(&mut self) -> Result<MeasurementMode, Error<I::Error>> {
        Ok(self.config_register()?.measurement_mode())
    }

    /// Whether the sensor reports its supply as above 2.8V.
    pub fn vcc_status(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.config_register()?.vcc_status())
    }

    pub fn set_temperature_resolution(
        &mut self,
        resolution: TemperatureResolution,
    ) -> Result<(), Error<I::Error>> {
        self.update_config(|config| config.with_temperature_resolution(resolution))
    }

    pub fn temperature_resolution(&mut self) -> Result<TemperatureResolution, Error<I::Error>> {
        Ok(self.config_register()?.temperature_resolution())
    }

    pub fn set_humidity_resolution(
        &mut self,
        resolution: HumidityResolution,
    ) -> Result<(), Error<I::Error>> {
        self.update_config(|config| config.with_humidity_resolution(resolution))
    }

    pub fn humidity_resolution(&mut self) -> Result<HumidityResolution, Error<I::Error>> {
        Ok(self.config_register()?.humidity_resolution())
    }

    /// Enable or disable supply voltage measurement, read with [`voltage`].
    ///
    /// [`voltage`]: Cht8305::voltage
    pub fn set_vcc_enable(&mut self, on: bool) -> Result<(), Error<I::Error>> {
        self.update_config(|config| config.with_vcc_enable(on))
    }

    pub fn vcc_enable(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.config_register()?.vcc_enable())
    }

    /// Supply voltage in volts.
    pub fn voltage(&mut self) -> Result<f32, Error<I::Error>> {
        Ok(voltage_reading_to_volts(self.read_register(Register::Voltage)?))
    }

    pub fn set_alert_trigger_mode(&mut self, mode: AlertMode) -> Result<(), Error<I::Error>> {
        self.update_config(|config| config.with_alert_mode(mode))
    }

    pub fn alert_trigger_mode(&mut self) -> Result<AlertMode, Error<I::Error>> {
        Ok(self.config_register()?.alert_mode())
    }

    pub fn alert_pending(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.config_register()?.alert_pending())
    }

    pub fn alert_humidity(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.config_register()?.alert_humidity())
    }

    pub fn alert_temperature(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.config_register()?.alert_temperature())
    }

    /// Write both alert thresholds in a single transaction.
    pub fn set_alert_levels(&mut self, levels: AlertLevels) -> Result<(), Error<I::Error>> {
        self.write_register(Register::Alert, levels.to_register())
    }

    /// Alert thresholds as stored on the sensor, truncated to register precision.
    pub fn alert_levels(&mut self) -> Result<AlertLevels, Error<I::Error>> {
        Ok(AlertLevels::from_register(self.read_register(Register::Alert)?))
    }

    /// Manufacturer ID register, 0x5959 on a genuine CHT8305.
    pub fn manufacturer(&mut self) -> Result<u16, Error<I::Error>> {
        self.read_register(Register::Manufacturer)
    }

    pub fn version_id(&mut self) -> Result<u16, Error<I::Error>> {
        self.read_register(Register::Version)
    }

    /// Check that the device at the current address identifies as a CHT8305.
    pub fn verify_manufacturer(&mut self) -> Result<(), Error<I::Error>> {
        match self.manufacturer()? {
            MANUFACTURER_ID => Ok(()),
            other => Err(Error::UnexpectedManufacturer(other)),
        }
    }

    fn update_config(
        &mut self,
        change: impl FnOnce(ConfigRegister) -> ConfigRegister,
    ) -> Result<(), Error<I::Error>> {
        let config = self.config_register()?;
        self.set_config_register(change(config))
    }

    fn read_register(&mut self, register: Register) -> Result<u16, Error<I::Error>> {
        let mut buffer = [0u8; 2];
        self.i2c
            .write_read(self.address, &[register as u8], &mut buffer)?;
        let value = u16::from_be_bytes(buffer);
        #[cfg(feature = "defmt")]
        defmt::trace!("cht8305 {=u8:#x}: read {} = {=u16:#x}", self.address, register, value);
        Ok(value)
    }

    /// Read a measurement register, waiting out the conversion the pointer
    /// write starts.
    fn read_register_with_delay(
        &mut self,
        register: Register,
        delay: &mut impl DelayNs,
    ) -> Result<u16, Error<I::Error>> {
        let mut buffer = [0u8; 2];
        self.i2c.write(self.address, &[register as u8])?;
        delay.delay_ms(CONVERSION_DELAY_MS);
        self.i2c.read(self.address, &mut buffer)?;
        let value = u16::from_be_bytes(buffer);
        #[cfg(feature = "defmt")]
        defmt::trace!("cht8305 {=u8:#x}: read {} = {=u16:#x}", self.address, register, value);
        Ok(value)
    }

    fn write_register(&mut self, register: Register, value: u16) -> Result<(), Error<I::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("cht8305 {=u8:#x}: write {} = {=u16:#x}", self.address, register, value);
        self.i2c
            .write(self.address, &register.write_bytes(value))?;
        Ok(())
    }
}
