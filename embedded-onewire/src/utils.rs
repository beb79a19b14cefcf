#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
/// Calculate CRC-8 used in 1-Wire communications.
///
/// This is the Maxim/Dallas CRC-8 (`x^8 + x^5 + x^4 + 1`), processed least
/// significant bit first, so the reflected polynomial `0x8c` is used.
pub struct OneWireCrc(u8);

#[cfg(feature = "crc-table")]
static CRC_TABLE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut idx = 0;
    while idx < 256 {
        table[idx] = crc_byte(idx as u8);
        idx += 1;
    }
    table
};

/// Shift one byte worth of bits through the CRC register.
const fn crc_byte(mut crc: u8) -> u8 {
    let mut bit = 0;
    while bit < 8 {
        if crc & 0x1 == 0x1 {
            crc = (crc >> 1) ^ 0x8c; // Polynomial for CRC-8
        } else {
            crc >>= 1;
        }
        bit += 1;
    }
    crc
}

impl OneWireCrc {
    /// Start a CRC computation from `seed`.
    pub const fn new(seed: u8) -> Self {
        Self(seed)
    }

    /// Get the current CRC value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Update the CRC with the incoming byte.
    pub fn update(&mut self, byte: u8) {
        #[cfg(feature = "crc-table")]
        {
            self.0 = CRC_TABLE[(self.0 ^ byte) as usize];
        }
        #[cfg(not(feature = "crc-table"))]
        {
            self.0 = crc_byte(self.0 ^ byte);
        }
    }

    /// Compute the CRC of `data`, starting from `seed`.
    ///
    /// Passing a previous result as `seed` continues a computation over
    /// split buffers.
    pub fn compute(seed: u8, data: &[u8]) -> u8 {
        let mut crc = OneWireCrc(seed);
        for &byte in data.iter() {
            crc.update(byte);
        }
        crc.0
    }

    /// Valudate a sequence of bytes where the last byte is the 1-Wire CRC of
    /// the previous bytes.
    pub fn validate(sequence: &[u8]) -> bool {
        // If the last byte is the CRC of the others, the result is 0
        Self::compute(0, sequence) == 0x0
    }
}
