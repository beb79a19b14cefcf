use crate::OneWireResult;

/// Status of the 1-Wire bus, as reported by a [`OneWire::reset`].
pub trait OneWireStatus {
    /// Returns `true` if at least one device answered the reset with a presence pulse.
    fn presence(&self) -> bool;

    /// Returns `true` if a short circuit was detected on the bus during the reset.
    fn shortcircuit(&self) -> bool;
}

impl OneWireStatus for bool {
    fn presence(&self) -> bool {
        *self
    }

    fn shortcircuit(&self) -> bool {
        false
    }
}

/// Trait for 1-Wire communication.
/// This trait defines the basic operations required for 1-Wire communication, such as resetting the bus,
/// writing and reading bytes, and writing and reading bits.
///
/// Implementors only provide the bit and byte level primitives. Multi-byte transfers and
/// ROM code transmission are provided on top of them, and may be overridden by hardware
/// that can move several bytes in one transaction.
pub trait OneWire {
    /// The status type returned by the reset operation.
    /// This type must implement the [OneWireStatus] trait.
    type Status: OneWireStatus;
    /// The error type returned by the operations of this trait.
    /// This type is used to indicate errors in the underlying hardware or communication.
    type BusError;

    /// Resets the 1-Wire bus and returns the status of the bus.
    ///
    /// The absence of a presence pulse is not an error at this level: it is reported
    /// through [`OneWireStatus::presence`] so that callers can decide how to react.
    ///
    /// # Errors
    /// This method returns an error if the reset operation fails.
    fn reset(&mut self) -> OneWireResult<Self::Status, Self::BusError>;

    /// Writes a byte to the 1-Wire bus, least significant bit first.
    /// # Arguments
    /// * `byte` - The byte to write to the bus.
    ///
    /// # Errors
    /// This method returns an error if the write operation fails.
    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError>;

    /// Reads a byte from the 1-Wire bus.
    /// # Returns
    /// Byte read from the bus.
    ///
    /// # Errors
    /// This method returns an error if the read operation fails.
    fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError>;

    /// Writes a single bit to the 1-Wire bus.
    /// # Arguments
    ///
    /// * `bit` - The bit to write.
    ///
    /// # Errors
    /// This method returns an error if the write operation fails.
    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError>;

    /// Generates a read time slot and returns the bit sampled from the bus.
    ///
    /// Slaves busy with an internal operation (temperature conversion, EEPROM recall)
    /// answer read time slots with `0` and with `1` once they are done.
    /// # Errors
    /// This method returns an error if the read operation fails.
    fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError>;

    /// Writes all bytes of `bytes` back to back, without resetting the bus in between.
    ///
    /// # Errors
    /// This method returns an error if any write fails. Bytes following the failed one
    /// are not written.
    fn write_bytes(&mut self, bytes: &[u8]) -> OneWireResult<(), Self::BusError> {
        for &byte in bytes.iter() {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Fills `buf` with bytes read from the bus.
    ///
    /// # Errors
    /// This method returns an error if any read fails.
    fn read_bytes(&mut self, buf: &mut [u8]) -> OneWireResult<(), Self::BusError> {
        for byte in buf.iter_mut() {
            *byte = self.read_byte()?;
        }
        Ok(())
    }

    /// Writes a 64-bit ROM code, least significant byte (family code) first.
    ///
    /// Used after [`ONEWIRE_MATCH_ROM_CMD`](crate::ONEWIRE_MATCH_ROM_CMD) to select a single device.
    ///
    /// | Bit | Description |
    /// |-----|-------------|
    /// | 0-7 | Family code (e.g., 0x28 for DS18B20) |
    /// | 8-55 | Serial number |
    /// | 56-63 | CRC-8 of the first seven bytes |
    fn write_rom(&mut self, rom: u64) -> OneWireResult<(), Self::BusError> {
        self.write_bytes(&rom.to_le_bytes())
    }
}
