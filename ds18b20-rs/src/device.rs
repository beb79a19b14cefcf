use core::time::Duration;
use embedded_hal::delay::DelayNs;
use embedded_onewire::{
    ONEWIRE_MATCH_ROM_CMD, ONEWIRE_SKIP_ROM_CMD, OneWire, OneWireError, OneWireStatus,
};
use log::{debug, error, warn};

use crate::{
    Configuration, Ds18b20Error, Ds18b20Result, ReadoutResolution, SCRATCHPAD_LEN, Scratchpad,
    Temperature, decode_temperature_fixed, scratchpad::THROUGH_CONFIGURATION,
};

/// Log target used when none is configured.
pub const DEFAULT_LOG_TARGET: &str = "ds18b20";

/// Builder for creating a [`Ds18b20`] session with custom configuration.
#[derive(Debug, Clone, Copy)]
pub struct Ds18b20Builder {
    crc: bool,
    poll_interval_us: u32,
    log_target: &'static str,
}

impl Default for Ds18b20Builder {
    fn default() -> Self {
        Ds18b20Builder {
            crc: false,
            poll_interval_us: 1000,
            log_target: DEFAULT_LOG_TARGET,
        }
    }
}

impl Ds18b20Builder {
    /// Validate every scratchpad read with its CRC.
    ///
    /// Without CRC only the requested bytes are read and the transfer is cut
    /// short with a bus reset: faster, but corrupted data goes unnoticed.
    pub fn with_crc(mut self, crc: bool) -> Self {
        self.crc = crc;
        self
    }

    /// Sets the time slept between two polls of the bus while waiting for a
    /// conversion to finish. Clamped to at least 1 µs.
    pub fn with_poll_interval_us(mut self, poll_interval_us: u32) -> Self {
        self.poll_interval_us = poll_interval_us.max(1);
        self
    }

    /// Sets the `log` target of every record emitted by the session.
    pub fn with_log_target(mut self, log_target: &'static str) -> Self {
        self.log_target = log_target;
        self
    }

    /// Builds a session for the device with the given ROM code, on a bus
    /// that may hold other devices.
    ///
    /// The resolution is read from the device, since it may not be the
    /// power-on default.
    pub fn build<O: OneWire>(
        self,
        bus: &mut O,
        rom: u64,
    ) -> Ds18b20Result<Ds18b20, O::BusError> {
        self.finish(bus, Some(rom))
    }

    /// Builds a session for the only device on the bus. Commands are sent
    /// with Skip ROM instead of addressing the device by its ROM code.
    pub fn build_solo<O: OneWire>(self, bus: &mut O) -> Ds18b20Result<Ds18b20, O::BusError> {
        self.finish(bus, None)
    }

    fn finish<O: OneWire>(
        self,
        bus: &mut O,
        rom: Option<u64>,
    ) -> Ds18b20Result<Ds18b20, O::BusError> {
        let mut dev = Ds18b20 {
            rom,
            crc: self.crc,
            resolution: None,
            poll_interval_us: self.poll_interval_us,
            log_target: self.log_target,
        };
        dev.resolution = match dev.read_resolution(bus) {
            Ok(res) => Some(res),
            Err(Ds18b20Error::OneWire(e)) => return Err(Ds18b20Error::OneWire(e)),
            // already logged, the session starts with an unknown resolution
            Err(_) => None,
        };
        Ok(dev)
    }
}

/// Power source of a DS18B20, see [`Ds18b20::read_power_supply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerSupply {
    /// Powered through the data line. The device cannot signal the end of a
    /// conversion, and needs a strong pull-up while converting.
    Parasite,
    /// Powered through V<sub>DD</sub>.
    External,
}

/// A DS18B20 on a 1-Wire bus.
///
/// The session does not own the bus: every operation borrows it, so several
/// sessions can take turns on the same bus. The resolution is cached from
/// the configuration register and only refreshed by the operations that
/// change it; a device reconfigured behind the session's back leaves the
/// cache stale until [`Ds18b20::refresh_resolution`] is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ds18b20 {
    rom: Option<u64>,
    crc: bool,
    resolution: Option<ReadoutResolution>,
    poll_interval_us: u32,
    log_target: &'static str,
}

impl Ds18b20 {
    /// 1-Wire family code of the DS18B20, the first byte of its ROM code.
    #[inline]
    pub const fn family() -> u8 {
        0x28
    }

    /// Creates a session for the device with the given ROM code, with the default configuration.
    pub fn new<O: OneWire>(bus: &mut O, rom: u64) -> Ds18b20Result<Self, O::BusError> {
        Ds18b20Builder::default().build(bus, rom)
    }

    /// Creates a session for the only device on the bus, with the default configuration.
    pub fn new_solo<O: OneWire>(bus: &mut O) -> Ds18b20Result<Self, O::BusError> {
        Ds18b20Builder::default().build_solo(bus)
    }

    /// ROM code of the device, [`None`] for a solo session.
    pub fn rom(&self) -> Option<u64> {
        self.rom
    }

    /// Whether the device is addressed with Skip ROM.
    pub fn is_solo(&self) -> bool {
        self.rom.is_none()
    }

    /// Whether scratchpad reads are CRC-validated.
    pub fn crc(&self) -> bool {
        self.crc
    }

    /// Enable or disable CRC validation of scratchpad reads.
    pub fn set_crc(&mut self, crc: bool) {
        self.crc = crc;
        debug!(target: self.log_target, "use_crc {}", crc);
    }

    /// Cached resolution, [`None`] if it could not be determined.
    pub fn resolution(&self) -> Option<ReadoutResolution> {
        self.resolution
    }

    /// Resets the bus and selects the device.
    ///
    /// # Errors
    /// [`Ds18b20Error::NotPresent`] if no device answered the reset. Nothing is
    /// sent on the bus in that case.
    pub fn address<O: OneWire>(&self, bus: &mut O) -> Ds18b20Result<(), O::BusError> {
        let status = bus.reset()?;
        if status.shortcircuit() {
            error!(target: self.log_target, "1-Wire bus short circuit");
            return Err(OneWireError::ShortCircuit.into());
        }
        if !status.presence() {
            error!(target: self.log_target, "ds18b20 device not responding");
            return Err(Ds18b20Error::NotPresent);
        }
        match self.rom {
            // only one device on the bus, instruct it directly
            None => bus.write_byte(ONEWIRE_SKIP_ROM_CMD)?,
            Some(rom) => {
                bus.write_byte(ONEWIRE_MATCH_ROM_CMD)?;
                bus.write_rom(rom)?;
            }
        }
        Ok(())
    }

    /// Reads the scratchpad.
    ///
    /// With CRC enabled the whole scratchpad is read and validated whatever
    /// `count` is. Otherwise only the first `count` bytes are read, the rest
    /// stays zero, and the transfer is terminated by a bus reset.
    pub fn read_scratchpad<O: OneWire>(
        &self,
        bus: &mut O,
        count: usize,
    ) -> Ds18b20Result<Scratchpad, O::BusError> {
        let count = if self.crc {
            SCRATCHPAD_LEN
        } else {
            count.min(SCRATCHPAD_LEN)
        };
        debug!(target: self.log_target, "scratchpad read: CRC {}, count {}", self.crc, count);
        self.address(bus)?;
        bus.write_byte(DS18B20_READ_SCRATCH)?;
        let mut scratchpad = Scratchpad::default();
        let bytes = &mut scratchpad.as_mut_bytes()[..count];
        bus.read_bytes(bytes)?;
        debug!(target: self.log_target, "scratchpad: {:02x?}", bytes);
        if self.crc {
            if !scratchpad.is_crc_valid() {
                error!(target: self.log_target, "CRC failed");
                return Err(Ds18b20Error::InvalidCrc);
            }
        } else {
            // the device keeps shifting out the scratchpad until reset
            bus.reset()?;
        }
        Ok(scratchpad)
    }

    /// Writes the alarm triggers and configuration register of `scratchpad`.
    ///
    /// With `verify`, the written bytes are read back and compared. Returns
    /// `false` if they differ or could not be read back.
    pub fn write_scratchpad<O: OneWire>(
        &self,
        bus: &mut O,
        scratchpad: &Scratchpad,
        verify: bool,
    ) -> Ds18b20Result<bool, O::BusError> {
        self.address(bus)?;
        let written = scratchpad.writable();
        debug!(target: self.log_target, "scratchpad write 3 bytes: {:02x?}", written);
        // all three bytes must be on the bus before the next reset
        let [th, tl, config] = written;
        bus.write_bytes(&[DS18B20_WRITE_SCRATCH, th, tl, config])?;
        if !verify {
            return Ok(true);
        }
        match self.read_scratchpad(bus, THROUGH_CONFIGURATION) {
            Ok(read) if read.writable() == written => Ok(true),
            Ok(read) => {
                error!(
                    target: self.log_target,
                    "scratchpad verify failed: wrote {:02x?}, read {:02x?}",
                    written,
                    read.writable()
                );
                Ok(false)
            }
            Err(_) => {
                error!(target: self.log_target, "read scratchpad failed");
                Ok(false)
            }
        }
    }

    /// Reads the resolution from the configuration register of the device.
    /// The cache is left untouched.
    pub fn read_resolution<O: OneWire>(
        &self,
        bus: &mut O,
    ) -> Ds18b20Result<ReadoutResolution, O::BusError> {
        let config = self
            .read_scratchpad(bus, THROUGH_CONFIGURATION)?
            .configuration();
        match config.resolution() {
            Some(res) => {
                debug!(target: self.log_target, "Resolution read as {}", res.bits());
                Ok(res)
            }
            None => {
                let raw = config.into_bits();
                error!(target: self.log_target, "invalid resolution read from device: 0x{:02x}", raw);
                Err(Ds18b20Error::InvalidResolution(raw))
            }
        }
    }

    /// Replaces the cached resolution with the one configured in the device.
    /// The cache becomes [`None`] if it cannot be read.
    pub fn refresh_resolution<O: OneWire>(&mut self, bus: &mut O) -> Option<ReadoutResolution> {
        self.resolution = self.read_resolution(bus).ok();
        self.resolution
    }

    /// Configures the conversion resolution, keeping the alarm triggers.
    ///
    /// Returns `true` once the device verifiably holds the new configuration.
    /// On failure the cache is refreshed from the device, so that it never
    /// claims a resolution the device does not have.
    ///
    /// # Errors
    /// [`Ds18b20Error::UnknownResolution`] if the cached resolution is unknown;
    /// bus errors after the cache was refreshed.
    pub fn set_resolution<O: OneWire>(
        &mut self,
        bus: &mut O,
        resolution: ReadoutResolution,
    ) -> Ds18b20Result<bool, O::BusError> {
        if self.resolution.is_none() {
            error!(target: self.log_target, "Resolution unknown, refusing to set {} bits", resolution.bits());
            return Err(Ds18b20Error::UnknownResolution);
        }
        let config = Configuration::for_resolution(resolution);
        debug!(target: self.log_target, "configuration value 0x{:02x}", config.into_bits());
        let result = self
            .read_scratchpad(bus, THROUGH_CONFIGURATION)
            .and_then(|mut scratchpad| {
                scratchpad.set_configuration(config);
                self.write_scratchpad(bus, &scratchpad, true)
            });
        match result {
            Ok(true) => {
                self.resolution = Some(resolution);
                debug!(target: self.log_target, "Resolution set to {} bits", resolution.bits());
                Ok(true)
            }
            other => {
                let refreshed = self.refresh_resolution(bus);
                warn!(
                    target: self.log_target,
                    "Resolution consistency lost - refreshed from device: {:?}",
                    refreshed.map(|r| r.bits())
                );
                other
            }
        }
    }

    /// Reads the alarm triggers, high then low.
    pub fn read_alarm_triggers<O: OneWire>(
        &self,
        bus: &mut O,
    ) -> Ds18b20Result<(i8, i8), O::BusError> {
        let scratchpad = self.read_scratchpad(bus, THROUGH_CONFIGURATION)?;
        Ok((scratchpad.trigger_high(), scratchpad.trigger_low()))
    }

    /// Writes the alarm triggers, keeping the configuration register.
    /// Returns `true` if the write was verified.
    pub fn set_alarm_triggers<O: OneWire>(
        &self,
        bus: &mut O,
        high: i8,
        low: i8,
    ) -> Ds18b20Result<bool, O::BusError> {
        let mut scratchpad = self.read_scratchpad(bus, THROUGH_CONFIGURATION)?;
        scratchpad.set_trigger_high(high);
        scratchpad.set_trigger_low(low);
        self.write_scratchpad(bus, &scratchpad, true)
    }

    /// Copies the alarm triggers and configuration register to EEPROM, and
    /// waits for the EEPROM write to complete.
    pub fn copy_scratchpad<O: OneWire, D: DelayNs>(
        &self,
        bus: &mut O,
        delay: &mut D,
    ) -> Ds18b20Result<(), O::BusError> {
        self.address(bus)?;
        bus.write_byte(DS18B20_COPY_SCRATCH)?;
        delay.delay_ms(DS18B20_EEPROM_WRITE_MS);
        debug!(target: self.log_target, "scratchpad copied to EEPROM");
        Ok(())
    }

    /// Reloads the alarm triggers and configuration register from EEPROM,
    /// then refreshes the cached resolution.
    pub fn recall_eeprom<O: OneWire, D: DelayNs>(
        &mut self,
        bus: &mut O,
        delay: &mut D,
    ) -> Ds18b20Result<Option<ReadoutResolution>, O::BusError> {
        self.address(bus)?;
        bus.write_byte(DS18B20_RECALL_EEPROM)?;
        let max = Duration::from_millis(DS18B20_EEPROM_WRITE_MS as u64);
        let elapsed = self.poll_until_done(bus, delay, max)?;
        if elapsed >= max {
            warn!(target: self.log_target, "EEPROM recall timed out");
        }
        Ok(self.refresh_resolution(bus))
    }

    /// Queries whether the device is parasite powered.
    pub fn read_power_supply<O: OneWire>(
        &self,
        bus: &mut O,
    ) -> Ds18b20Result<PowerSupply, O::BusError> {
        self.address(bus)?;
        bus.write_byte(DS18B20_READ_POWERMODE)?;
        // parasite powered devices pull the bus low during the read slot
        let supply = if bus.read_bit()? {
            PowerSupply::External
        } else {
            PowerSupply::Parasite
        };
        debug!(target: self.log_target, "power supply: {:?}", supply);
        Ok(supply)
    }

    /// Starts a temperature conversion on this device.
    pub fn convert<O: OneWire>(&self, bus: &mut O) -> Ds18b20Result<(), O::BusError> {
        self.address(bus)?;
        bus.write_byte(DS18B20_START_CONV)?;
        Ok(())
    }

    /// Starts a temperature conversion on every device on the bus at once.
    pub fn convert_all<O: OneWire>(bus: &mut O) -> Ds18b20Result<(), O::BusError> {
        if !bus.reset()?.presence() {
            debug!(target: DEFAULT_LOG_TARGET, "convert all: no presence pulse");
        }
        bus.write_byte(ONEWIRE_SKIP_ROM_CMD)?; // address all devices
        bus.write_byte(DS18B20_START_CONV)?;
        Ok(())
    }

    /// Waits for a conversion to complete, at most for the maximum
    /// conversion time of the cached resolution.
    ///
    /// A timeout is logged but not an error: the device may be parasite
    /// powered, in which case completion cannot be observed on the bus.
    /// Returns the time waited, or zero without waiting if the resolution
    /// is unknown.
    pub fn wait_for_conversion<O: OneWire, D: DelayNs>(
        &self,
        bus: &mut O,
        delay: &mut D,
    ) -> Ds18b20Result<Duration, O::BusError> {
        let Some(resolution) = self.resolution else {
            error!(target: self.log_target, "Resolution unknown, not waiting for conversion");
            return Ok(Duration::ZERO);
        };
        let max = resolution.max_conversion_time();
        debug!(target: self.log_target, "wait for conversion: max {} us", max.as_micros());
        let elapsed = self.poll_until_done(bus, delay, max)?;
        if elapsed >= max {
            warn!(target: self.log_target, "conversion timed out");
        } else {
            debug!(target: self.log_target, "conversion took at most {} us", elapsed.as_micros());
        }
        Ok(elapsed)
    }

    /// Sleeps and polls read slots until the device returns a 1 or `max` elapsed.
    fn poll_until_done<O: OneWire, D: DelayNs>(
        &self,
        bus: &mut O,
        delay: &mut D,
        max: Duration,
    ) -> Ds18b20Result<Duration, O::BusError> {
        let step = Duration::from_micros(self.poll_interval_us as u64);
        let mut elapsed = Duration::ZERO;
        loop {
            delay.delay_us(self.poll_interval_us);
            elapsed += step;
            if bus.read_bit()? || elapsed >= max {
                return Ok(elapsed);
            }
        }
    }

    /// Reads the last conversion result.
    ///
    /// # Errors
    /// [`Ds18b20Error::UnknownResolution`] without touching the bus if the
    /// cached resolution is unknown, since the undefined low bits cannot
    /// be masked.
    pub fn read_temperature_fixed<O: OneWire>(
        &self,
        bus: &mut O,
    ) -> Ds18b20Result<Temperature, O::BusError> {
        let Some(resolution) = self.resolution else {
            error!(target: self.log_target, "Unsupported resolution: unknown");
            return Err(Ds18b20Error::UnknownResolution);
        };
        let scratchpad = self.read_scratchpad(bus, 2)?;
        let (lsb, msb) = (scratchpad.temperature_lsb(), scratchpad.temperature_msb());
        let temp = decode_temperature_fixed(lsb, msb, resolution);
        debug!(
            target: self.log_target,
            "temp_LSB 0x{:02x}, temp_MSB 0x{:02x}, temp {}",
            lsb,
            msb,
            temp
        );
        Ok(temp)
    }

    /// Reads the last conversion result, in °C.
    pub fn read_temperature<O: OneWire>(&self, bus: &mut O) -> Ds18b20Result<f32, O::BusError> {
        self.read_temperature_fixed(bus).map(|t| t.to_num::<f32>())
    }

    /// Starts a conversion, waits for it and reads the result, in °C.
    ///
    /// The result is read even if the wait timed out, in which case it
    /// may be the previous conversion result.
    pub fn convert_and_read_temperature<O: OneWire, D: DelayNs>(
        &self,
        bus: &mut O,
        delay: &mut D,
    ) -> Ds18b20Result<f32, O::BusError> {
        self.convert(bus)?;
        self.wait_for_conversion(bus, delay)?;
        self.read_temperature(bus)
    }
}

const DS18B20_READ_SCRATCH: u8 = 0xbe;
const DS18B20_WRITE_SCRATCH: u8 = 0x4e;
const DS18B20_COPY_SCRATCH: u8 = 0x48;
const DS18B20_START_CONV: u8 = 0x44;
const DS18B20_READ_POWERMODE: u8 = 0xb4;
const DS18B20_RECALL_EEPROM: u8 = 0xb8;
const DS18B20_EEPROM_WRITE_MS: u32 = 10;
