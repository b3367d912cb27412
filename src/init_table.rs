//! Packed initialization tables and the engine that replays them.
//!
//! A table is `[count, (command, arg_count, args..., [delay])...]`. When bit 7
//! of `arg_count` is set, one delay byte follows the arguments; the value
//! [`DELAY_MAX`] stands for the longest wait, [`LONG_WAIT_MS`].

use embedded_hal::delay::DelayNs;

use crate::instruction::Instruction::{self, *};
use crate::interface::Interface;
use crate::{Error, ST7735};

/// Flag in the argument count byte announcing a trailing delay byte.
pub const DELAY: u8 = 0x80;
/// Delay byte meaning "wait [`LONG_WAIT_MS`]".
pub const DELAY_MAX: u8 = 255;
pub const LONG_WAIT_MS: u32 = 500;

const SHORT: u8 = 10;
const MIDDLE: u8 = 50;
const MIDLONG: u8 = 150;

const fn c(instruction: Instruction) -> u8 {
    instruction as u8
}

/// ST7735B init.
#[rustfmt::skip]
pub const BCMD: &[u8] = &[
    18,
    c(SWRESET), DELAY, MIDDLE,
    c(SLPOUT), DELAY, DELAY_MAX,
    c(COLMOD), 1 + DELAY, 0x05, SHORT,
    c(FRMCTR1), 3 + DELAY, 0x00, 0x06, 0x03, SHORT,
    c(MADCTL), 1, 0x08,
    c(DISSET5), 2, 0x15, 0x02,
    c(INVCTR), 1, 0x00,
    c(PWCTR1), 2 + DELAY, 0x02, 0x70, SHORT,
    c(PWCTR2), 1, 0x05,
    c(PWCTR3), 2, 0x01, 0x02,
    c(VMCTR1), 2 + DELAY, 0x3C, 0x38, SHORT,
    c(PWCTR6), 2, 0x11, 0x15,
    c(GMCTRP1), 16,
    0x09, 0x16, 0x09, 0x20, 0x21, 0x1B, 0x13, 0x19,
    0x17, 0x15, 0x1E, 0x2B, 0x04, 0x05, 0x02, 0x0E,
    c(GMCTRN1), 16 + DELAY,
    0x0B, 0x14, 0x08, 0x1E, 0x22, 0x1D, 0x18, 0x1E,
    0x1B, 0x1A, 0x24, 0x2B, 0x06, 0x06, 0x02, 0x0F,
    SHORT,
    c(CASET), 4, 0x00, 0x02, 0x00, 0x81,
    c(RASET), 4, 0x00, 0x02, 0x00, 0x81,
    c(NORON), DELAY, SHORT,
    c(DISPON), DELAY, DELAY_MAX,
];

/// ST7735R init, part 1 (all R variants).
#[rustfmt::skip]
pub const RCMD1: &[u8] = &[
    15,
    c(SWRESET), DELAY, MIDLONG,
    c(SLPOUT), DELAY, DELAY_MAX,
    c(FRMCTR1), 3, 0x01, 0x2C, 0x2D,
    c(FRMCTR2), 3, 0x01, 0x2C, 0x2D,
    c(FRMCTR3), 6, 0x01, 0x2C, 0x2D, 0x01, 0x2C, 0x2D,
    c(INVCTR), 1, 0x07,
    c(PWCTR1), 3, 0xA2, 0x02, 0x84,
    c(PWCTR2), 1, 0xC5,
    c(PWCTR3), 2, 0x0A, 0x00,
    c(PWCTR4), 2, 0x8A, 0x2A,
    c(PWCTR5), 2, 0x8A, 0xEE,
    c(VMCTR1), 1, 0x0E,
    c(INVOFF), 0,
    c(MADCTL), 1, 0xC8,
    c(COLMOD), 1, 0x05,
];

/// ST7735R init, part 2, green tab.
#[rustfmt::skip]
pub const RCMD2_GREEN: &[u8] = &[
    2,
    c(CASET), 4, 0x00, 0x02, 0x00, 0x7F + 0x02,
    c(RASET), 4, 0x00, 0x01, 0x00, 0x9F + 0x01,
];

/// ST7735R init, part 2, red and black tab.
#[rustfmt::skip]
pub const RCMD2_RED: &[u8] = &[
    2,
    c(CASET), 4, 0x00, 0x00, 0x00, 0x7F,
    c(RASET), 4, 0x00, 0x00, 0x00, 0x9F,
];

/// ST7735R init, part 2, 1.44" green tab.
#[rustfmt::skip]
pub const RCMD2_GREEN144: &[u8] = &[
    2,
    c(CASET), 4, 0x00, 0x00, 0x00, 0x7F,
    c(RASET), 4, 0x00, 0x00, 0x00, 0x7F,
];

/// ST7735R init, part 2, mini 160x80.
#[rustfmt::skip]
pub const RCMD2_GREEN160X80: &[u8] = &[
    2,
    c(CASET), 4, 0x00, 0x00, 0x00, 0x4F,
    c(RASET), 4, 0x00, 0x00, 0x00, 0x9F,
];

/// ST7735R init, part 2, mini 160x80 with plug-in FPC (inverted panel).
#[rustfmt::skip]
pub const RCMD2_GREEN160X80_PLUGIN: &[u8] = &[
    3,
    c(INVON), 0,
    c(CASET), 4, 0x00, 0x00, 0x00, 0x4F,
    c(RASET), 4, 0x00, 0x00, 0x00, 0x9F,
];

/// ST7735R init, part 3: gamma and display on.
#[rustfmt::skip]
pub const RCMD3: &[u8] = &[
    4,
    c(GMCTRP1), 16,
    0x02, 0x1c, 0x07, 0x12, 0x37, 0x32, 0x29, 0x2d,
    0x29, 0x25, 0x2B, 0x39, 0x00, 0x01, 0x03, 0x10,
    c(GMCTRN1), 16,
    0x03, 0x1d, 0x07, 0x06, 0x2E, 0x2C, 0x29, 0x2D,
    0x2E, 0x2E, 0x37, 0x3F, 0x00, 0x00, 0x02, 0x10,
    c(NORON), DELAY, SHORT,
    c(DISPON), DELAY, MIDLONG,
];

/// One record of an init table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableCommand<'a> {
    pub command: u8,
    pub args: &'a [u8],
    pub delay_ms: Option<u32>,
}

/// Bounds-checked reader over a packed init table.
#[derive(Debug, Clone)]
pub struct CommandTable<'a> {
    bytes: &'a [u8],
    pos: usize,
    remaining: u8,
}

/// Offset of the record that runs past the end of its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncated {
    pub offset: usize,
}

impl<'a> CommandTable<'a> {
    pub fn new(bytes: &'a [u8]) -> Result<Self, Truncated> {
        let (&count, _) = bytes.split_first().ok_or(Truncated { offset: 0 })?;
        Ok(CommandTable {
            bytes,
            pos: 1,
            remaining: count,
        })
    }

    /// Declared number of records.
    pub fn len(&self) -> usize {
        self.bytes.first().copied().unwrap_or(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take(&mut self, n: usize, record: usize) -> Result<&'a [u8], Truncated> {
        let end = self.pos + n;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or(Truncated { offset: record })?;
        self.pos = end;
        Ok(slice)
    }

    fn parse_next(&mut self) -> Result<TableCommand<'a>, Truncated> {
        let record = self.pos;
        let header = self.take(2, record)?;
        let (command, count) = (header[0], header[1]);
        let args = self.take((count & !DELAY) as usize, record)?;
        let delay_ms = if count & DELAY != 0 {
            let ms = self.take(1, record)?[0];
            Some(if ms == DELAY_MAX {
                LONG_WAIT_MS
            } else {
                u32::from(ms)
            })
        } else {
            None
        };
        Ok(TableCommand {
            command,
            args,
            delay_ms,
        })
    }
}

impl<'a> Iterator for CommandTable<'a> {
    type Item = Result<TableCommand<'a>, Truncated>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let item = self.parse_next();
        if item.is_err() {
            self.remaining = 0;
        }
        Some(item)
    }
}

impl<DI> ST7735<DI>
where
    DI: Interface,
{
    /// Sends one command with its argument bytes.
    pub fn send_command(&mut self, command: u8, args: &[u8]) -> Result<(), Error<DI::Error>> {
        self.interface.write_command(command)?;
        self.interface.write_data(args)?;
        Ok(())
    }

    /// Replays a packed init table, waiting wherever a record asks for it.
    ///
    /// The whole table is validated before the first byte goes out, so a
    /// truncated table leaves the controller untouched.
    pub fn replay<D: DelayNs>(&mut self, table: &[u8], delay: &mut D) -> Result<(), Error<DI::Error>> {
        let malformed = |t: Truncated| Error::MalformedTable { offset: t.offset };
        let commands = CommandTable::new(table).map_err(malformed)?;
        log::debug!("replaying {} init commands", commands.len());
        for record in commands.clone() {
            record.map_err(malformed)?;
        }
        for record in commands {
            let TableCommand {
                command,
                args,
                delay_ms,
            } = record.map_err(malformed)?;
            log::trace!("cmd {:#04x} args {:02x?} delay {:?}", command, args, delay_ms);
            self.send_command(command, args)?;
            if let Some(ms) = delay_ms {
                delay.delay_ms(ms);
            }
        }
        Ok(())
    }
}
