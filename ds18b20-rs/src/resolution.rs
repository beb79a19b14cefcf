use core::time::Duration;
use fixed::types::I12F4;

use crate::Configuration;

/// Temperature in degrees Celsius, in steps of 1/16 °C.
pub type Temperature = I12F4;

/// Maximum conversion time at 12-bit resolution, in microseconds.
const T_CONV_US: u32 = 750_000;

/// Resolution of the temperature conversion.
///
/// The discriminant is the value of the configuration register selecting the
/// resolution, with the reserved bits set as the device reports them.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ReadoutResolution {
    /// 0.5 °C steps, 93.75 ms conversion.
    Resolution9bit = 0x1f,
    /// 0.25 °C steps, 187.5 ms conversion.
    Resolution10bit = 0x3f,
    /// 0.125 °C steps, 375 ms conversion.
    Resolution11bit = 0x5f,
    /// 0.0625 °C steps, 750 ms conversion. Power-on default.
    #[default]
    Resolution12bit = 0x7f,
}

impl ReadoutResolution {
    /// All resolutions, coarsest first.
    pub const ALL: [ReadoutResolution; 4] = [
        ReadoutResolution::Resolution9bit,
        ReadoutResolution::Resolution10bit,
        ReadoutResolution::Resolution11bit,
        ReadoutResolution::Resolution12bit,
    ];

    /// Number of bits of the conversion result.
    pub fn bits(&self) -> u8 {
        self.code() + 9
    }

    /// Two-bit code stored in bits 5 and 6 of the configuration register.
    pub fn code(&self) -> u8 {
        (*self as u8 >> 5) & 0x03
    }

    /// Resolution selected by a two-bit configuration code. Higher bits are ignored.
    pub fn from_code(code: u8) -> Self {
        use ReadoutResolution::*;
        match code & 0x03 {
            0 => Resolution9bit,
            1 => Resolution10bit,
            2 => Resolution11bit,
            _ => Resolution12bit,
        }
    }

    /// Upper bound of the conversion time: the datasheet maximum with a 10% margin.
    ///
    /// Every bit of resolution less halves the conversion time.
    pub fn max_conversion_time(&self) -> Duration {
        let shift = 12 - self.bits();
        Duration::from_micros(((T_CONV_US / 10 * 11) >> shift) as u64)
    }

    /// Mask of the defined bits of the temperature LSB.
    ///
    /// The device leaves the lowest bits undefined below 12-bit resolution.
    pub fn lsb_mask(&self) -> u8 {
        use ReadoutResolution::*;
        match self {
            Resolution9bit => !0x07,
            Resolution10bit => !0x03,
            Resolution11bit => !0x01,
            Resolution12bit => !0x00,
        }
    }

    /// Smallest temperature difference the resolution can express, in °C.
    pub fn step(&self) -> f32 {
        1.0 / (1u32 << (self.bits() - 8)) as f32
    }
}

impl TryFrom<u8> for ReadoutResolution {
    type Error = &'static str;

    /// Decodes a configuration register value.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Configuration::from_bits(value)
            .resolution()
            .ok_or("Invalid readout resolution")
    }
}

/// Decode the two temperature bytes of the scratchpad at the given resolution.
pub fn decode_temperature_fixed(lsb: u8, msb: u8, resolution: ReadoutResolution) -> Temperature {
    Temperature::from_bits(i16::from_le_bytes([lsb & resolution.lsb_mask(), msb]))
}

/// Decode the two temperature bytes of the scratchpad at the given resolution, in °C.
pub fn decode_temperature(lsb: u8, msb: u8, resolution: ReadoutResolution) -> f32 {
    decode_temperature_fixed(lsb, msb, resolution).to_num::<f32>()
}
