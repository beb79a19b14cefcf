#![no_std]
#![deny(missing_docs)]
//! # ds18b20
//! A no-std driver for the DS18B20 1-Wire digital thermometer.
//!
//! The driver talks to the device through any bus master implementing the
//! [`OneWire`](embedded_onewire::OneWire) trait. A [Ds18b20] session binds the ROM
//! code of a device (or the knowledge that it is alone on the bus) to its cached
//! [ReadoutResolution], and provides conversion, scratchpad and configuration
//! operations. Waits use an [`embedded_hal::delay::DelayNs`] implementation.
//!
//! ```ignore
//! let mut sensor = Ds18b20Builder::default().with_crc(true).build(&mut bus, rom)?;
//! sensor.set_resolution(&mut bus, ReadoutResolution::Resolution10bit)?;
//! let celsius = sensor.convert_and_read_temperature(&mut bus, &mut delay)?;
//! ```
//!
//! Several sensors on one bus can be sampled together with
//! [`Ds18b20::convert_all`], followed by one wait and one read per sensor.

#[cfg(test)]
extern crate std;

mod device;
mod error;
mod resolution;
mod scratchpad;
#[cfg(test)]
mod testing;

pub use device::{DEFAULT_LOG_TARGET, Ds18b20, Ds18b20Builder, PowerSupply};
pub use embedded_onewire::{OneWire, OneWireError, OneWireResult};
pub use error::Ds18b20Error;
pub use resolution::{ReadoutResolution, Temperature, decode_temperature, decode_temperature_fixed};
pub use scratchpad::{Configuration, SCRATCHPAD_LEN, Scratchpad};

/// Results of DS18B20-specific function calls.
pub type Ds18b20Result<T, E> = Result<T, Ds18b20Error<E>>;
