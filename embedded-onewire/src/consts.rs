//! ROM command constants for 1-Wire communication.

/// Command to match a specific ROM address in 1-Wire communication (non-overdrive mode).
///
/// Must be followed by the 64-bit ROM code, least significant byte first.
pub const ONEWIRE_MATCH_ROM_CMD: u8 = 0x55;

/// Command to skip ROM addressing in 1-Wire communication (non-overdrive mode).
///
/// On a single-drop bus this saves the time needed to send the 64-bit ROM code.
/// On a multi-drop bus every device acts on the function command that follows,
/// which is only useful for commands that do not put data on the bus, such as
/// starting a temperature conversion on all devices at once.
pub const ONEWIRE_SKIP_ROM_CMD: u8 = 0xcc;
