#![no_std]
#![deny(missing_docs)]
//! # embedded-onewire
//! A no-std trait definition for the 1-Wire protocol.
//!
//! This crate provides a trait-based interface for 1-Wire communication, allowing device drivers to be written once
//! and used with any bus master: a bit-banged GPIO, a UART, or an I2C bridge.
//! [OneWire] trait defines the basic operations required for 1-Wire communication, such as resetting the bus,
//! writing and reading bytes, and writing and reading bits.
//!
//! The crate also provides the 1-Wire CRC-8 in [OneWireCrc], used to validate ROM codes and device memory transfers.

pub mod consts;
mod error;
mod traits;
mod utils;
pub use consts::{ONEWIRE_MATCH_ROM_CMD, ONEWIRE_SKIP_ROM_CMD};
pub use error::OneWireError;
pub use traits::{OneWire, OneWireStatus};
pub use utils::OneWireCrc;

/// Error type for 1-Wire operations.
pub type OneWireResult<T, E> = Result<T, OneWireError<E>>;
