use cht8305::blocking::Cht8305;
use cht8305::common::{
    AlertLevels, AlertMode, ConfigRegister, HumidityResolution, MeasurementMode,
    TemperatureResolution,
};
use cht8305::error::{Error, InvalidAlertMode};
use embedded_hal::i2c::ErrorKind;
use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

const ADDRESS: u8 = 0x40;

fn measurement_transactions(temperature: [u8; 2], humidity: [u8; 2]) -> Vec<Transaction> {
    vec![
        Transaction::write(ADDRESS, vec![0x00]),
        Transaction::read(ADDRESS, temperature.to_vec()),
        Transaction::write(ADDRESS, vec![0x01]),
        Transaction::read(ADDRESS, humidity.to_vec()),
    ]
}

fn config_read(value: u16) -> Transaction {
    Transaction::write_read(ADDRESS, vec![0x02], value.to_be_bytes().to_vec())
}

fn config_write(value: u16) -> Transaction {
    let [msb, lsb] = value.to_be_bytes();
    Transaction::write(ADDRESS, vec![0x02, msb, lsb])
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 0.01,
        "{actual} is not close to {expected}"
    );
}

#[test]
fn read_converts_and_caches() {
    // 0x6666 is 40% of full scale: -40 + 0.4 * 165 = 26°C.
    let expectations = measurement_transactions([0x66, 0x66], [0x80, 0x00]);
    let mut sensor = Cht8305::new(I2cMock::new(&expectations));

    assert_eq!(sensor.last_read(), None);
    let measurement = sensor.read(NoopDelay::new(), 5_000).unwrap();
    assert_close(measurement.temperature, 26.0);
    assert_close(measurement.humidity, 50.0);

    // Cached values come back without further bus traffic.
    assert_eq!(sensor.temperature(), measurement.temperature);
    assert_eq!(sensor.humidity(), measurement.humidity);
    assert_eq!(sensor.last_read(), Some(5_000));

    sensor.destroy().done();
}

#[test]
fn offsets_round_trip_and_apply_to_reads() {
    let expectations = measurement_transactions([0x66, 0x66], [0x80, 0x00]);
    let mut sensor = Cht8305::new(I2cMock::new(&expectations));

    assert_eq!(sensor.temperature_offset(), 0.0);
    assert_eq!(sensor.humidity_offset(), 0.0);
    sensor.set_temperature_offset(-1.25);
    sensor.set_humidity_offset(3.5);
    assert_eq!(sensor.temperature_offset(), -1.25);
    assert_eq!(sensor.humidity_offset(), 3.5);

    sensor.read(NoopDelay::new(), 0).unwrap();
    assert_close(sensor.temperature(), 24.75);
    assert_close(sensor.humidity(), 53.5);

    sensor.destroy().done();
}

#[test]
fn failed_read_keeps_previous_values() {
    let mut expectations = measurement_transactions([0x66, 0x66], [0x80, 0x00]);
    expectations.extend([
        Transaction::write(ADDRESS, vec![0x00]),
        Transaction::read(ADDRESS, vec![0x00, 0x00]),
        Transaction::write(ADDRESS, vec![0x01]),
        Transaction::read(ADDRESS, vec![0x00, 0x00]).with_error(ErrorKind::Other),
    ]);
    let mut sensor = Cht8305::new(I2cMock::new(&expectations));

    sensor.read(NoopDelay::new(), 1_000).unwrap();
    let temperature = sensor.temperature();
    let humidity = sensor.humidity();

    let result = sensor.read(NoopDelay::new(), 3_000);
    assert!(matches!(result, Err(Error::I2c(ErrorKind::Other))));
    assert_eq!(result.unwrap_err().code(), -11);

    assert_eq!(sensor.temperature(), temperature);
    assert_eq!(sensor.humidity(), humidity);
    assert_eq!(sensor.last_read(), Some(1_000));

    sensor.destroy().done();
}

#[test]
fn reads_closer_than_a_second_are_refused() {
    let mut expectations = measurement_transactions([0x00, 0x00], [0x00, 0x00]);
    expectations.extend(measurement_transactions([0xFF, 0xFF], [0xFF, 0xFF]));
    let mut sensor = Cht8305::new(I2cMock::new(&expectations));

    sensor.read(NoopDelay::new(), 100).unwrap();
    assert_eq!(sensor.temperature(), -40.0);

    let too_soon = sensor.read(NoopDelay::new(), 1_099);
    assert!(matches!(too_soon, Err(Error::ReadTooSoon)));
    assert_eq!(too_soon.unwrap_err().code(), -20);
    assert_eq!(sensor.last_read(), Some(100));

    sensor.read(NoopDelay::new(), 1_100).unwrap();
    assert_close(sensor.temperature(), 125.0);
    assert_close(sensor.humidity(), 100.0);
    assert_eq!(sensor.last_read(), Some(1_100));

    sensor.destroy().done();
}

#[test]
fn connection_probe() {
    let expectations = [
        Transaction::write(ADDRESS, vec![]).with_error(ErrorKind::NoAcknowledge(
            embedded_hal::i2c::NoAcknowledgeSource::Address,
        )),
        Transaction::write(ADDRESS, vec![]),
    ];
    let mut sensor = Cht8305::new(I2cMock::new(&expectations));

    assert!(!sensor.is_connected());
    assert!(sensor.is_connected());

    sensor.destroy().done();
}

#[test]
fn address_selection() {
    let expectations = [Transaction::write(0x43, vec![])];
    let mut sensor = Cht8305::new(I2cMock::new(&expectations));
    assert_eq!(sensor.address(), 0x40);

    let invalid = sensor.set_address(0x78);
    assert!(matches!(invalid, Err(Error::InvalidAddress(0x78))));
    assert_eq!(invalid.unwrap_err().code(), -10);
    assert!(sensor.set_address(0x00).is_err());
    assert_eq!(sensor.address(), 0x40);

    sensor.set_address(0x43).unwrap();
    assert_eq!(sensor.address(), 0x43);
    assert!(sensor.is_connected());

    sensor.destroy().done();
}

#[test]
fn config_register_round_trip() {
    let expectations = [config_write(0x1234), config_read(0x1234)];
    let mut sensor = Cht8305::new(I2cMock::new(&expectations));

    sensor.set_config_register(ConfigRegister(0x1234)).unwrap();
    assert_eq!(sensor.config_register().unwrap(), ConfigRegister(0x1234));

    sensor.destroy().done();
}

#[test]
fn setters_read_modify_write() {
    let expectations = [
        // Heater on, keeping mode and reserved bits.
        config_read(0x1003),
        config_write(0x3003),
        // Clock stretch on.
        config_read(0x3003),
        config_write(0x7003),
        // Single channel mode.
        config_read(0x7003),
        config_write(0x6003),
        // 11 bit temperature.
        config_read(0x6003),
        config_write(0x6403),
        // 8 bit humidity.
        config_read(0x6403),
        config_write(0x6603),
        // Heater off again.
        config_read(0x6603),
        config_write(0x4603),
    ];
    let mut sensor = Cht8305::new(I2cMock::new(&expectations));

    sensor.set_heater(true).unwrap();
    sensor.set_clock_stretch(true).unwrap();
    sensor.set_measurement_mode(MeasurementMode::Single).unwrap();
    sensor
        .set_temperature_resolution(TemperatureResolution::Bits11)
        .unwrap();
    sensor
        .set_humidity_resolution(HumidityResolution::Bits8)
        .unwrap();
    sensor.set_heater(false).unwrap();

    sensor.destroy().done();
}

#[test]
fn getters_decode_live_register() {
    let expectations = [
        config_read(0x6603),
        config_read(0x6603),
        config_read(0x6603),
        config_read(0x6603),
        config_read(0x6603),
        config_read(0x6603),
    ];
    let mut sensor = Cht8305::new(I2cMock::new(&expectations));

    assert!(sensor.heater().unwrap());
    assert!(sensor.clock_stretch().unwrap());
    assert_eq!(sensor.measurement_mode().unwrap(), MeasurementMode::Single);
    assert_eq!(
        sensor.temperature_resolution().unwrap(),
        TemperatureResolution::Bits11
    );
    assert_eq!(
        sensor.humidity_resolution().unwrap(),
        HumidityResolution::Bits8
    );
    assert!(!sensor.vcc_enable().unwrap());

    sensor.destroy().done();
}

#[test]
fn soft_reset_sets_reset_bit() {
    let expectations = [config_read(0x1000), config_write(0x9000)];
    let mut sensor = Cht8305::new(I2cMock::new(&expectations));

    sensor.soft_reset().unwrap();

    sensor.destroy().done();
}

#[test]
fn invalid_alert_mode_never_reaches_the_bus() {
    let mut sensor = Cht8305::new(I2cMock::new(&[]));

    let mode = AlertMode::try_from(4);
    assert_eq!(mode, Err(InvalidAlertMode(4)));

    sensor.destroy().done();
}

#[test]
fn alert_trigger_mode() {
    let expectations = [
        config_read(0x10C3),
        config_write(0x1083),
        config_read(0x1083),
    ];
    let mut sensor = Cht8305::new(I2cMock::new(&expectations));

    let mode = AlertMode::try_from(2).unwrap();
    sensor.set_alert_trigger_mode(mode).unwrap();
    assert_eq!(sensor.alert_trigger_mode().unwrap(), AlertMode::Humidity);

    sensor.destroy().done();
}

#[test]
fn alert_status_flags() {
    let expectations = [
        config_read(0x1038),
        config_read(0x1038),
        config_read(0x1028),
    ];
    let mut sensor = Cht8305::new(I2cMock::new(&expectations));

    assert!(sensor.alert_pending().unwrap());
    assert!(sensor.alert_humidity().unwrap());
    assert!(!sensor.alert_humidity().unwrap());

    sensor.destroy().done();
}

#[test]
fn alert_levels_written_together() {
    let expectations = [
        Transaction::write(ADDRESS, vec![0x03, 0x7E, 0xFF]),
        Transaction::write_read(ADDRESS, vec![0x03], vec![0x7E, 0xFF]),
    ];
    let mut sensor = Cht8305::new(I2cMock::new(&expectations));

    let levels = AlertLevels::new(42.5, 50.0).unwrap();
    sensor.set_alert_levels(levels).unwrap();

    let stored = sensor.alert_levels().unwrap();
    assert!((stored.temperature() - 42.5).abs() < 0.33);
    assert!((stored.humidity() - 50.0).abs() < 0.8);

    sensor.destroy().done();
}

#[test]
fn supply_voltage() {
    let expectations = [
        config_read(0x1000),
        config_write(0x1004),
        config_read(0x1804),
        Transaction::write_read(ADDRESS, vec![0x04], vec![0x54, 0x7B]),
    ];
    let mut sensor = Cht8305::new(I2cMock::new(&expectations));

    sensor.set_vcc_enable(true).unwrap();
    assert!(sensor.vcc_status().unwrap());
    // 0x547B = 21627, 21627 * 5 / 32768 = 3.3V
    assert_close(sensor.voltage().unwrap(), 3.3);

    sensor.destroy().done();
}

#[test]
fn identity_registers() {
    let expectations = [
        Transaction::write_read(ADDRESS, vec![0xFE], vec![0x59, 0x59]),
        Transaction::write_read(ADDRESS, vec![0xFF], vec![0x83, 0x05]),
        Transaction::write_read(ADDRESS, vec![0xFE], vec![0x59, 0x59]),
        Transaction::write_read(ADDRESS, vec![0xFE], vec![0x12, 0x34]),
    ];
    let mut sensor = Cht8305::new(I2cMock::new(&expectations));

    assert_eq!(sensor.manufacturer().unwrap(), 0x5959);
    assert_eq!(sensor.version_id().unwrap(), 0x8305);
    sensor.verify_manufacturer().unwrap();

    let wrong = sensor.verify_manufacturer();
    assert!(matches!(wrong, Err(Error::UnexpectedManufacturer(0x1234))));
    assert_eq!(wrong.unwrap_err().code(), -12);

    sensor.destroy().done();
}

#[test]
fn bus_errors_propagate_from_config_access() {
    let expectations = [
        Transaction::write_read(ADDRESS, vec![0x02], vec![0x00, 0x00]).with_error(ErrorKind::Bus),
    ];
    let mut sensor = Cht8305::new(I2cMock::new(&expectations));

    assert!(matches!(
        sensor.set_heater(true),
        Err(Error::I2c(ErrorKind::Bus))
    ));

    sensor.destroy().done();
}
