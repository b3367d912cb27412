//! Recording bus double with a model of the controller's RAM window.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_hal::delay::DelayNs;

use crate::config::{DisplayConfig, PanelVariant};
use crate::instruction::Instruction;
use crate::interface::Interface;
use crate::ST7735;

#[derive(Debug, Default)]
pub struct RecordingInterface {
    /// Every command with the data bytes sent after it.
    pub transactions: Vec<(u8, Vec<u8>)>,
    /// Controller RAM cells that received a pixel, keyed by `(x, y)`.
    pub ram: BTreeMap<(u16, u16), u16>,
    /// Number of pixels streamed through RAMWR.
    pub pixel_writes: usize,
    pub resets: usize,
    columns: (u16, u16),
    rows: (u16, u16),
    cursor: (u16, u16),
    pending: Option<u8>,
}

impl RecordingInterface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<u8> {
        self.transactions.iter().map(|(c, _)| *c).collect()
    }

    pub fn count(&self, instruction: Instruction) -> usize {
        self.transactions
            .iter()
            .filter(|(c, _)| *c == instruction as u8)
            .count()
    }

    /// Data bytes of every transaction with this command.
    pub fn data_of(&self, instruction: Instruction) -> Vec<Vec<u8>> {
        self.transactions
            .iter()
            .filter(|(c, _)| *c == instruction as u8)
            .map(|(_, d)| d.clone())
            .collect()
    }

    /// Painted cells in `(x, y)` order.
    pub fn painted(&self) -> Vec<(u16, u16)> {
        self.ram.keys().copied().collect()
    }

    pub fn pixel(&self, x: u16, y: u16) -> Option<u16> {
        self.ram.get(&(x, y)).copied()
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
        self.ram.clear();
        self.pixel_writes = 0;
    }

    fn word(data: &[u8], at: usize) -> u16 {
        u16::from_be_bytes([data[at], data[at + 1]])
    }

    fn push_byte(&mut self, byte: u8) {
        let (command, data) = self
            .transactions
            .last_mut()
            .expect("data sent before any command");
        data.push(byte);
        let command = *command;
        match command {
            c if c == Instruction::CASET as u8 && data.len() == 4 => {
                self.columns = (Self::word(data, 0), Self::word(data, 2));
            }
            c if c == Instruction::RASET as u8 && data.len() == 4 => {
                self.rows = (Self::word(data, 0), Self::word(data, 2));
            }
            c if c == Instruction::RAMWR as u8 => match self.pending.take() {
                None => self.pending = Some(byte),
                Some(hi) => {
                    let color = u16::from_be_bytes([hi, byte]);
                    self.ram.insert(self.cursor, color);
                    self.pixel_writes += 1;
                    self.advance();
                }
            },
            _ => {}
        }
    }

    fn advance(&mut self) {
        let (x, y) = self.cursor;
        if x >= self.columns.1 {
            let y = if y >= self.rows.1 { self.rows.0 } else { y + 1 };
            self.cursor = (self.columns.0, y);
        } else {
            self.cursor = (x + 1, y);
        }
    }
}

impl Interface for RecordingInterface {
    type Error = Infallible;

    fn write_command(&mut self, command: u8) -> Result<(), Infallible> {
        self.transactions.push((command, Vec::new()));
        self.pending = None;
        if command == Instruction::RAMWR as u8 {
            self.cursor = (self.columns.0, self.rows.0);
        }
        Ok(())
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), Infallible> {
        for &b in data {
            self.push_byte(b);
        }
        Ok(())
    }

    fn reset<D: DelayNs>(&mut self, _delay: &mut D) -> Result<(), Infallible> {
        self.resets += 1;
        Ok(())
    }
}

/// Delay that records requested milliseconds instead of sleeping.
#[derive(Debug, Default)]
pub struct MockDelay {
    pub waits: Vec<u32>,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_us(&mut self, _us: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.waits.push(ms);
    }
}

/// An initialized display with an empty recording.
pub fn display(config: DisplayConfig) -> ST7735<RecordingInterface> {
    let mut display = ST7735::with_config(RecordingInterface::new(), config);
    display.init(&mut MockDelay::default()).unwrap();
    display.interface.clear();
    display
}

/// An initialized `width` x `height` panel without RAM offset.
pub fn canvas(width: u16, height: u16) -> ST7735<RecordingInterface> {
    display(
        DisplayConfig::new(PanelVariant::RedTab)
            .with_dimensions(width, height)
            .with_offset(0, 0),
    )
}
