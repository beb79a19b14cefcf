//! A simulated DS18B20 alone on a 1-Wire bus, recording the bus traffic.

use embedded_onewire::{OneWire, OneWireCrc, OneWireError, OneWireResult};
use std::vec::Vec;

pub(crate) const POWER_ON_SCRATCHPAD: [u8; 9] =
    [0x50, 0x05, 0x4b, 0x46, 0x7f, 0xff, 0x0c, 0x10, 0x1c];

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    Reset,
    Write(u8),
    Read(u8),
    WriteBit(bool),
    ReadBit(bool),
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct SimFault;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Rom,
    MatchRom(usize, [u8; 8]),
    Function,
    ReadScratch(usize),
    WriteScratch(usize),
    Converting(Option<u32>),
    Recalling,
    PowerSupply,
}

pub(crate) struct SimBus {
    pub rom: u64,
    pub present: bool,
    pub scratchpad: [u8; 9],
    pub eeprom: [u8; 3],
    /// Recompute byte 8 before every scratchpad read.
    pub auto_crc: bool,
    pub honor_writes: bool,
    /// Busy read slots before a conversion completes, [`None`] to never complete.
    pub conversion_polls: Option<u32>,
    /// Temperature bytes stored when a conversion completes.
    pub converted: [u8; 2],
    pub parasite: bool,
    pub fail_reads: bool,
    /// A reset arrived in the middle of a scratchpad write.
    pub corrupted: bool,
    pub events: Vec<Event>,
    state: State,
}

impl SimBus {
    pub fn new(rom: u64) -> Self {
        Self {
            rom,
            present: true,
            scratchpad: POWER_ON_SCRATCHPAD,
            eeprom: [0x4b, 0x46, 0x7f],
            auto_crc: true,
            honor_writes: true,
            conversion_polls: Some(3),
            converted: [0x50, 0x05],
            parasite: false,
            fail_reads: false,
            corrupted: false,
            events: Vec::new(),
            state: State::Idle,
        }
    }

    pub fn written(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Write(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    pub fn resets(&self) -> usize {
        self.events.iter().filter(|e| **e == Event::Reset).count()
    }

    fn function(&mut self, cmd: u8) -> State {
        match cmd {
            0xbe => {
                if self.auto_crc {
                    self.scratchpad[8] = OneWireCrc::compute(0, &self.scratchpad[..8]);
                }
                State::ReadScratch(0)
            }
            0x4e => State::WriteScratch(0),
            0x44 => State::Converting(self.conversion_polls),
            0x48 => {
                self.eeprom.copy_from_slice(&self.scratchpad[2..5]);
                State::Idle
            }
            0xb8 => {
                self.scratchpad[2..5].copy_from_slice(&self.eeprom);
                State::Recalling
            }
            0xb4 => State::PowerSupply,
            _ => State::Idle,
        }
    }
}

impl OneWire for SimBus {
    type Status = bool;
    type BusError = SimFault;

    fn reset(&mut self) -> OneWireResult<bool, SimFault> {
        self.events.push(Event::Reset);
        if let State::WriteScratch(1..=2) = self.state {
            self.corrupted = true;
        }
        self.state = if self.present { State::Rom } else { State::Idle };
        Ok(self.present)
    }

    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), SimFault> {
        self.events.push(Event::Write(byte));
        self.state = match self.state {
            State::Rom => match byte {
                0xcc => State::Function,
                0x55 => State::MatchRom(0, [0; 8]),
                _ => State::Idle,
            },
            State::MatchRom(idx, mut rom) => {
                rom[idx] = byte;
                if idx < 7 {
                    State::MatchRom(idx + 1, rom)
                } else if u64::from_le_bytes(rom) == self.rom {
                    State::Function
                } else {
                    State::Idle
                }
            }
            State::Function => self.function(byte),
            State::WriteScratch(idx) => {
                if self.honor_writes {
                    self.scratchpad[2 + idx] = byte;
                }
                if idx < 2 {
                    State::WriteScratch(idx + 1)
                } else {
                    State::Idle
                }
            }
            _ => State::Idle,
        };
        Ok(())
    }

    fn read_byte(&mut self) -> OneWireResult<u8, SimFault> {
        if self.fail_reads {
            return Err(OneWireError::Other(SimFault));
        }
        let byte = match self.state {
            State::ReadScratch(idx) if idx < 9 => {
                self.state = State::ReadScratch(idx + 1);
                self.scratchpad[idx]
            }
            _ => 0xff,
        };
        self.events.push(Event::Read(byte));
        Ok(byte)
    }

    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), SimFault> {
        self.events.push(Event::WriteBit(bit));
        Ok(())
    }

    fn read_bit(&mut self) -> OneWireResult<bool, SimFault> {
        if self.fail_reads {
            return Err(OneWireError::Other(SimFault));
        }
        let bit = match self.state {
            State::Converting(None) => false,
            State::Converting(Some(0)) => {
                self.scratchpad[..2].copy_from_slice(&self.converted);
                self.state = State::Idle;
                true
            }
            State::Converting(Some(n)) => {
                self.state = State::Converting(Some(n - 1));
                false
            }
            State::Recalling => {
                self.state = State::Idle;
                true
            }
            State::PowerSupply => !self.parasite,
            _ => true,
        };
        self.events.push(Event::ReadBit(bit));
        Ok(bit)
    }
}
