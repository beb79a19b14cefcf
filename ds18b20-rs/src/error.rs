use embedded_onewire::OneWireError;

#[derive(Debug, PartialEq, Eq)]
/// DS18B20 errors
pub enum Ds18b20Error<E> {
    /// 1-Wire bus errors.
    OneWire(OneWireError<E>),
    /// No device answered the bus reset with a presence pulse.
    NotPresent,
    /// The scratchpad CRC did not match.
    InvalidCrc,
    /// The configuration register read from the device does not encode a resolution.
    InvalidResolution(u8),
    /// The cached resolution is unknown, so the operation cannot proceed.
    UnknownResolution,
}

impl<E> From<OneWireError<E>> for Ds18b20Error<E> {
    fn from(value: OneWireError<E>) -> Self {
        Self::OneWire(value)
    }
}
