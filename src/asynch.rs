use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};

use crate::common::{
    AlertLevels, AlertMode, CONVERSION_DELAY_MS, ConfigRegister, DEFAULT_ADDRESS,
    HumidityResolution, MANUFACTURER_ID, Measurement, MeasurementMode, Readings, Register,
    TemperatureResolution, validate_address,
};
use crate::conversions::voltage_reading_to_volts;
use crate::error::Error;

/// CHT8305 driver over an async I2C bus.
///
/// Behaves exactly as [`blocking::Cht8305`](crate::blocking::Cht8305) when
/// the `blocking` feature is also enabled, with every bus access awaited.
pub struct Cht8305<I: I2c> {
    i2c: I,
    address: SevenBitAddress,
    readings: Readings,
}

impl<I: I2c> Cht8305<I> {
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

    pub fn set_address(&mut self, address: SevenBitAddress) -> Result<(), Error<I::Error>> {
        self.address = validate_address::<I::Error>(address)?;
        Ok(())
    }

    pub async fn is_connected(&mut self) -> bool {
        self.i2c.write(self.address, &[]).await.is_ok()
    }

    /// Measure temperature and humidity, caching the result.
    ///
    /// Reads less than [`MIN_READ_INTERVAL_MS`] after the previous successful
    /// one (by the caller's `now_ms` clock) are refused without touching the
    /// bus.
    ///
    /// [`MIN_READ_INTERVAL_MS`]: crate::common::MIN_READ_INTERVAL_MS
    pub async fn read(
        &mut self,
        mut delay: impl DelayNs,
        now_ms: u32,
    ) -> Result<Measurement, Error<I::Error>> {
        self.readings.check_interval::<I::Error>(now_ms)?;

        let temperature = self
            .read_register_with_delay(Register::Temperature, &mut delay)
            .await?;
        let humidity = self
            .read_register_with_delay(Register::Humidity, &mut delay)
            .await?;

        Ok(self.readings.record(temperature, humidity, now_ms))
    }

    pub fn last_read(&self) -> Option<u32> {
        self.readings.last_read
    }

    pub fn temperature(&self) -> f32 {
        self.readings.last.temperature
    }

    pub fn humidity(&self) -> f32 {
        self.readings.last.humidity
    }

    pub fn set_temperature_offset(&mut self, offset: f32) {
        self.readings.temperature_offset = offset;
    }

    pub fn temperature_offset(&self) -> f32 {
        self.readings.temperature_offset
    }

    pub fn set_humidity_offset(&mut self, offset: f32) {
        self.readings.humidity_offset = offset;
    }

    pub fn humidity_offset(&self) -> f32 {
        self.readings.humidity_offset
    }

    pub async fn config_register(&mut self) -> Result<ConfigRegister, Error<I::Error>> {
        Ok(ConfigRegister(self.read_register(Register::Config).await?))
    }

    pub async fn set_config_register(
        &mut self,
        config: ConfigRegister,
    ) -> Result<(), Error<I::Error>> {
        self.write_register(Register::Config, config.bits()).await
    }

    pub async fn soft_reset(&mut self) -> Result<(), Error<I::Error>> {
        self.update_config(ConfigRegister::with_soft_reset).await
    }

    pub async fn set_clock_stretch(&mut self, on: bool) -> Result<(), Error<I::Error>> {
        self.update_config(|config| config.with_clock_stretch(on))
            .await
    }

    pub async fn clock_stretch(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.config_register().await?.clock_stretch())
    }

    /// Switch the on-chip heater on or off. The caller is responsible for
    /// switching it off again.
    pub async fn set_heater(&mut self, on: bool) -> Result<(), Error<I::Error>> {
        self.update_config(|config| config.with_heater(on)).await
    }

    pub async fn heater(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.config_register().await?.heater())
    }

    pub async fn set_measurement_mode(
        &mut self,
        mode: MeasurementMode,
    ) -> Result<(), Error<I::Error>> {
        self.update_config(|config| config.with_measurement_mode(mode))
            .await
    }

    pub async fn measurement_mode(&mut self) -> Result<MeasurementMode, Error<I::Error>> {
        Ok(self.config_register().await?.measurement_mode())
    }

    pub async fn vcc_status(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.config_register().await?.vcc_status())
    }

    pub async fn set_temperature_resolution(
        &mut self,
        resolution: TemperatureResolution,
    ) -> Result<(), Error<I::Error>> {
        self.update_config(|config| config.with_temperature_resolution(resolution))
            .await
    }

    pub async fn temperature_resolution(
        &mut self,
    ) -> Result<TemperatureResolution, Error<I::Error>> {
        Ok(self.config_register().await?.temperature_resolution())
    }

    pub async fn set_humidity_resolution(
        &mut self,
        resolution: HumidityResolution,
    ) -> Result<(), Error<I::Error>> {
        self.update_config(|config| config.with_humidity_resolution(resolution))
            .await
    }

    pub async fn humidity_resolution(&mut self) -> Result<HumidityResolution, Error<I::Error>> {
        Ok(self.config_register().await?.humidity_resolution())
    }

    pub async fn set_vcc_enable(&mut self, on: bool) -> Result<(), Error<I::Error>> {
        self.update_config(|config| config.with_vcc_enable(on))
            .await
    }

    pub async fn vcc_enable(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.config_register().await?.vcc_enable())
    }

    pub async fn voltage(&mut self) -> Result<f32, Error<I::Error>> {
        Ok(voltage_reading_to_volts(
            self.read_register(Register::Voltage).await?,
        ))
    }

    pub async fn set_alert_trigger_mode(&mut self, mode: AlertMode) -> Result<(), Error<I::Error>> {
        self.update_config(|config| config.with_alert_mode(mode))
            .await
    }

    pub async fn alert_trigger_mode(&mut self) -> Result<AlertMode, Error<I::Error>> {
        Ok(self.config_register().await?.alert_mode())
    }

    pub async fn alert_pending(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.config_register().await?.alert_pending())
    }

    pub async fn alert_humidity(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.config_register().await?.alert_humidity())
    }

    pub async fn alert_temperature(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.config_register().await?.alert_temperature())
    }

    pub async fn set_alert_levels(&mut self, levels: AlertLevels) -> Result<(), Error<I::Error>> {
        self.write_register(Register::Alert, levels.to_register())
            .await
    }

    pub async fn alert_levels(&mut self) -> Result<AlertLevels, Error<I::Error>> {
        Ok(AlertLevels::from_register(
            self.read_register(Register::Alert).await?,
        ))
    }

    pub async fn manufacturer(&mut self) -> Result<u16, Error<I::Error>> {
        self.read_register(Register::Manufacturer).await
    }

    pub async fn version_id(&mut self) -> Result<u16, Error<I::Error>> {
        self.read_register(Register::Version).await
    }

    pub async fn verify_manufacturer(&mut self) -> Result<(), Error<I::Error>> {
        match self.manufacturer().await? {
            MANUFACTURER_ID => Ok(()),
            other => Err(Error::UnexpectedManufacturer(other)),
        }
    }

    async fn update_config(
        &mut self,
        change: impl FnOnce(ConfigRegister) -> ConfigRegister,
    ) -> Result<(), Error<I::Error>> {
        let config = self.config_register().await?;
        self.set_config_register(change(config)).await
    }

    async fn read_register(&mut self, register: Register) -> Result<u16, Error<I::Error>> {
        let mut buffer = [0u8; 2];
        self.i2c
            .write_read(self.address, &[register as u8], &mut buffer)
            .await?;
        let value = u16::from_be_bytes(buffer);
        #[cfg(feature = "defmt")]
        defmt::trace!("cht8305 {=u8:#x}: read {} = {=u16:#x}", self.address, register, value);
        Ok(value)
    }

    async fn read_register_with_delay(
        &mut self,
        register: Register,
        delay: &mut impl DelayNs,
    ) -> Result<u16, Error<I::Error>> {
        let mut buffer = [0u8; 2];
        self.i2c.write(self.address, &[register as u8]).await?;
        delay.delay_ms(CONVERSION_DELAY_MS).await;
        self.i2c.read(self.address, &mut buffer).await?;
        let value = u16::from_be_bytes(buffer);
        #[cfg(feature = "defmt")]
        defmt::trace!("cht8305 {=u8:#x}: read {} = {=u16:#x}", self.address, register, value);
        Ok(value)
    }

    async fn write_register(&mut self, register: Register, value: u16) -> Result<(), Error<I::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("cht8305 {=u8:#x}: write {} = {=u16:#x}", self.address, register, value);
        self.i2c
            .write(self.address, &register.write_bytes(value))
            .await?;
        Ok(())
    }
}
