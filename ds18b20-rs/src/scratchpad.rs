use bitfield_struct::bitfield;
use embedded_onewire::OneWireCrc;

use crate::ReadoutResolution;

/// Size of the scratchpad, CRC byte included.
pub const SCRATCHPAD_LEN: usize = 9;

pub(crate) const TEMPERATURE_LSB: usize = 0;
pub(crate) const TEMPERATURE_MSB: usize = 1;
pub(crate) const TRIGGER_HIGH: usize = 2;
pub(crate) const TRIGGER_LOW: usize = 3;
pub(crate) const CONFIGURATION: usize = 4;
pub(crate) const RESERVED: usize = 5;
pub(crate) const CRC: usize = 8;

/// Number of bytes to read to get everything up to the configuration register.
pub(crate) const THROUGH_CONFIGURATION: usize = CONFIGURATION + 1;

/// # Configuration register
///
/// Byte 4 of the scratchpad. Bits 5 and 6 select the conversion
/// resolution, the remaining bits are reserved: bits 0 to 4 always
/// read as 1 and bit 7 always reads as 0.
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct Configuration {
    #[bits(5, default = 0x1f)]
    reserved_low: u8,
    /// Resolution code, 0 for 9 bits up to 3 for 12 bits.
    #[bits(2)]
    pub resolution_code: u8,
    reserved_high: bool,
}

impl Configuration {
    /// Configuration register value selecting `resolution`.
    pub fn for_resolution(resolution: ReadoutResolution) -> Self {
        Self::new().with_resolution_code(resolution.code())
    }

    /// Resolution selected by this register value, or [`None`] if the
    /// reserved high bit is set, which no DS18B20 reports. An all-ones
    /// byte read from a floating bus is rejected this way.
    pub fn resolution(&self) -> Option<ReadoutResolution> {
        if self.reserved_high() {
            None
        } else {
            Some(ReadoutResolution::from_code(self.resolution_code()))
        }
    }
}

/// The 9-byte working register of the DS18B20.
///
/// | Byte | Content |
/// |------|---------|
/// | 0 | Temperature LSB |
/// | 1 | Temperature MSB |
/// | 2 | T<sub>H</sub> alarm trigger |
/// | 3 | T<sub>L</sub> alarm trigger |
/// | 4 | [Configuration] |
/// | 5-7 | Reserved |
/// | 8 | CRC-8 of bytes 0 to 7 |
///
/// Only bytes 2 to 4 are writable, and the device expects all three of
/// them in a single transfer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Scratchpad([u8; SCRATCHPAD_LEN]);

impl Scratchpad {
    /// Wrap raw scratchpad bytes, in bus order.
    pub const fn from_bytes(bytes: [u8; SCRATCHPAD_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes, in bus order.
    pub fn as_bytes(&self) -> &[u8; SCRATCHPAD_LEN] {
        &self.0
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; SCRATCHPAD_LEN] {
        &mut self.0
    }

    /// Least significant byte of the last conversion result.
    pub fn temperature_lsb(&self) -> u8 {
        self.0[TEMPERATURE_LSB]
    }

    /// Most significant byte of the last conversion result.
    pub fn temperature_msb(&self) -> u8 {
        self.0[TEMPERATURE_MSB]
    }

    /// High alarm trigger, in whole °C.
    pub fn trigger_high(&self) -> i8 {
        self.0[TRIGGER_HIGH] as i8
    }

    /// Set the high alarm trigger.
    pub fn set_trigger_high(&mut self, value: i8) {
        self.0[TRIGGER_HIGH] = value as u8;
    }

    /// Low alarm trigger, in whole °C.
    pub fn trigger_low(&self) -> i8 {
        self.0[TRIGGER_LOW] as i8
    }

    /// Set the low alarm trigger.
    pub fn set_trigger_low(&mut self, value: i8) {
        self.0[TRIGGER_LOW] = value as u8;
    }

    /// Configuration register.
    pub fn configuration(&self) -> Configuration {
        Configuration::from_bits(self.0[CONFIGURATION])
    }

    /// Set the configuration register.
    pub fn set_configuration(&mut self, config: Configuration) {
        self.0[CONFIGURATION] = config.into_bits();
    }

    /// Reserved bytes 5 to 7.
    pub fn reserved(&self) -> [u8; 3] {
        [self.0[RESERVED], self.0[RESERVED + 1], self.0[RESERVED + 2]]
    }

    /// CRC byte as read from the device.
    pub fn crc(&self) -> u8 {
        self.0[CRC]
    }

    /// The three writable bytes: high trigger, low trigger, configuration.
    pub fn writable(&self) -> [u8; 3] {
        [
            self.0[TRIGGER_HIGH],
            self.0[TRIGGER_LOW],
            self.0[CONFIGURATION],
        ]
    }

    /// Whether the CRC byte matches the other eight bytes.
    pub fn is_crc_valid(&self) -> bool {
        OneWireCrc::validate(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POWER_ON: [u8; 9] = [0x50, 0x05, 0x4b, 0x46, 0x7f, 0xff, 0x0c, 0x10, 0x1c];

    #[test]
    fn named_offsets() {
        let sp = Scratchpad::from_bytes(POWER_ON);
        assert_eq!(sp.temperature_lsb(), 0x50);
        assert_eq!(sp.temperature_msb(), 0x05);
        assert_eq!(sp.trigger_high(), 75);
        assert_eq!(sp.trigger_low(), 70);
        assert_eq!(sp.configuration().into_bits(), 0x7f);
        assert_eq!(sp.reserved(), [0xff, 0x0c, 0x10]);
        assert_eq!(sp.crc(), 0x1c);
        assert_eq!(sp.writable(), [0x4b, 0x46, 0x7f]);
        assert!(sp.is_crc_valid());
    }

    #[test]
    fn negative_triggers() {
        let mut sp = Scratchpad::default();
        sp.set_trigger_high(-10);
        sp.set_trigger_low(-55);
        assert_eq!(sp.writable()[..2], [0xf6, 0xc9]);
        assert_eq!((sp.trigger_high(), sp.trigger_low()), (-10, -55));
    }

    #[test]
    fn configuration_register() {
        assert_eq!(Configuration::new().into_bits(), 0x1f);
        for res in ReadoutResolution::ALL {
            let config = Configuration::for_resolution(res);
            assert_eq!(config.into_bits(), res as u8);
            assert_eq!(config.resolution(), Some(res));
        }
        assert_eq!(Configuration::from_bits(0xff).resolution(), None);
        // reserved low bits do not matter when decoding
        assert_eq!(
            Configuration::from_bits(0x40).resolution(),
            Some(ReadoutResolution::Resolution11bit)
        );
    }
}
