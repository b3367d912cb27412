//! Kanji text: UTF-8 byte patterns resolved against sorted glyph tables.
//!
//! Characters are keyed by their raw UTF-8 bytes packed big-endian into a
//! `u32` (`"漢"` is `0xE6BCA2`), not by Unicode scalar value. Single-byte keys
//! index the ASCII table directly, longer keys are found by binary search in
//! the kanji table.

use crate::font::BitReader;
use crate::interface::Interface;
use crate::{Error, ST7735};

/// Bitmap of one character. Rows are padded to whole bytes, MSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KanjiGlyph {
    pub width: u8,
    pub height: u8,
    pub bitmap: &'static [u8],
}

impl KanjiGlyph {
    /// Bytes per bitmap row.
    pub fn row_bytes(&self) -> usize {
        usize::from(self.width).div_ceil(8)
    }

    fn row(&self, y: usize) -> BitReader<'static> {
        let start = y * self.row_bytes();
        BitReader::new(self.bitmap.get(start..).unwrap_or(&[]))
    }
}

/// One row of the kanji table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KanjiEntry {
    /// Packed UTF-8 key.
    pub code: u32,
    pub glyph: KanjiGlyph,
}

/// Glyph tables for [`ST7735::draw_text_kanji`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KanjiFonts {
    /// Glyph for byte `n` at index `n - 1`.
    pub ascii: &'static [KanjiGlyph],
    /// Sorted by `code`, keys unique.
    pub kanji: &'static [KanjiEntry],
}

impl KanjiFonts {
    pub fn find_ascii(&self, code: u8) -> Option<&'static KanjiGlyph> {
        let table = self.ascii;
        table.get(usize::from(code).checked_sub(1)?)
    }

    pub fn find_kanji(&self, code: u32) -> Option<&'static KanjiEntry> {
        let table = self.kanji;
        table
            .binary_search_by_key(&code, |entry| entry.code)
            .ok()
            .and_then(|index| table.get(index))
    }

    /// Glyph for a packed code, from the table its size selects.
    pub fn resolve(&self, code: u32) -> Option<&'static KanjiGlyph> {
        match u8::try_from(code) {
            Ok(byte) => self.find_ascii(byte),
            Err(_) => self.find_kanji(code).map(|entry| &entry.glyph),
        }
    }

    /// Cursor advance for a code without a glyph: the width of the first
    /// entry of the table the code belongs to.
    pub fn fallback_width(&self, code: u32) -> u8 {
        let first = if code <= 0xFF {
            self.ascii.first()
        } else {
            self.kanji.first().map(|entry| &entry.glyph)
        };
        first.map_or(0, |glyph| glyph.width)
    }
}

/// Length of the UTF-8 sequence introduced by `lead`, `None` for bytes that
/// cannot start one.
pub fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        b if b & 0x80 == 0x00 => Some(1),
        b if b & 0xE0 == 0xC0 => Some(2),
        b if b & 0xF0 == 0xE0 => Some(3),
        b if b & 0xF8 == 0xF0 => Some(4),
        _ => None,
    }
}

/// Maps half-width katakana (`EF BD xx`, `EF BE xx`) onto the single-byte
/// JIS X 0201 range.
pub fn fold_halfwidth_kana(code: u32) -> u32 {
    match code >> 8 {
        0xEFBD => code & 0xFF,
        0xEFBE => (code & 0xFF) + 0x40,
        _ => code,
    }
}

/// Packed codes of a UTF-8 byte string. Ends early at a byte that cannot
/// start a sequence or at a sequence cut short by the end of input.
#[derive(Debug, Clone)]
pub struct Utf8Codes<'a> {
    bytes: &'a [u8],
    halfwidth_kana: bool,
}

impl<'a> Utf8Codes<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Utf8Codes {
            bytes,
            halfwidth_kana: false,
        }
    }

    /// Folds half-width katakana into single-byte codes.
    pub fn halfwidth_kana(mut self, fold: bool) -> Self {
        self.halfwidth_kana = fold;
        self
    }
}

impl Iterator for Utf8Codes<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let (&lead, _) = self.bytes.split_first()?;
        let sequence = sequence_len(lead).and_then(|len| self.bytes.get(..len));
        let Some(sequence) = sequence else {
            log::warn!("stopping at undecodable byte {:#04x}", lead);
            self.bytes = &[];
            return None;
        };
        self.bytes = &self.bytes[sequence.len()..];
        let code = sequence
            .iter()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
        Some(if self.halfwidth_kana {
            fold_halfwidth_kana(code)
        } else {
            code
        })
    }
}

impl<DI> ST7735<DI>
where
    DI: Interface,
{
    /// Installs the glyph tables used by the kanji text functions.
    pub fn set_kanji_fonts(&mut self, fonts: Option<KanjiFonts>) {
        self.kanji = fonts;
    }

    /// Draws half-width katakana with the single-byte glyphs.
    pub fn set_halfwidth_kana(&mut self, fold: bool) {
        self.halfwidth_kana = fold;
    }

    /// Draws the character for one packed code at the cursor and returns
    /// the advanced cursor. Unknown codes only move the cursor.
    pub fn draw_kanji(
        &mut self,
        x: i32,
        y: i32,
        code: u32,
        color: u16,
        bg: u16,
    ) -> Result<(i32, i32), Error<DI::Error>> {
        let Some(fonts) = self.kanji else {
            log::warn!("no kanji fonts installed");
            return Ok((x, y));
        };
        let Some(glyph) = fonts.resolve(code) else {
            log::warn!("no glyph for {:#x}", code);
            return Ok((x + i32::from(fonts.fallback_width(code)), y));
        };
        let (w, h) = (i32::from(glyph.width), i32::from(glyph.height));
        let (mut x, mut y) = (x, y);
        if self.text_wrap && x + w > i32::from(self.width()) {
            x = 0;
            y += h;
        }
        self.draw_kanji_block(x, y, glyph, color, bg)?;
        Ok((x + w, y))
    }

    /// Draws UTF-8 `text` with the kanji tables and returns the final cursor.
    pub fn draw_text_kanji(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        color: u16,
        bg: u16,
    ) -> Result<(i32, i32), Error<DI::Error>> {
        let codes = Utf8Codes::new(text.as_bytes()).halfwidth_kana(self.halfwidth_kana);
        let mut cursor = (x, y);
        for code in codes {
            cursor = self.draw_kanji(cursor.0, cursor.1, code, color, bg)?;
        }
        Ok(cursor)
    }

    fn draw_kanji_block(
        &mut self,
        x: i32,
        y: i32,
        glyph: &KanjiGlyph,
        color: u16,
        bg: u16,
    ) -> Result<(), Error<DI::Error>> {
        let (w, h) = (i32::from(glyph.width), i32::from(glyph.height));
        let Some(visible) = self.clip(x, y, w, h) else {
            return Ok(());
        };
        let fully_visible = visible == (x as u16, y as u16, w as u16, h as u16);
        if fully_visible && !self.skips_background(bg) {
            let (x, y) = (x as u16, y as u16);
            self.set_addr_window(x, y, x + w as u16 - 1, y + h as u16 - 1)?;
            let pixels = (0..usize::from(glyph.height)).flat_map(|row| {
                let mut bits = glyph.row(row);
                (0..glyph.width).map(move |_| if bits.next() == Some(true) { color } else { bg })
            });
            return self.write_pixels(pixels);
        }

        let paint_bg = !self.skips_background(bg);
        for row in 0..h {
            let mut bits = glyph.row(row as usize);
            for col in 0..w {
                if bits.next() == Some(true) {
                    self.draw_pixel(x + col, y + row, color)?;
                } else if paint_bg {
                    self.draw_pixel(x + col, y + row, bg)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLACK, WHITE};
    use crate::instruction::Instruction;
    use crate::test_support::canvas;
    use alloc::vec;
    use alloc::vec::Vec;

    const HALF: KanjiGlyph = KanjiGlyph {
        width: 6,
        height: 12,
        bitmap: &[0xFC; 12],
    };
    const FULL: KanjiGlyph = KanjiGlyph {
        width: 12,
        height: 12,
        bitmap: &[0xFF; 24],
    };
    static ASCII: [KanjiGlyph; 0x7E] = [HALF; 0x7E];
    static KANJI: [KanjiEntry; 3] = [
        KanjiEntry {
            code: 0xE38182, // あ
            glyph: FULL,
        },
        KanjiEntry {
            code: 0xE5AD97, // 字
            glyph: FULL,
        },
        KanjiEntry {
            code: 0xE6BCA2, // 漢
            glyph: FULL,
        },
    ];
    const FONTS: KanjiFonts = KanjiFonts {
        ascii: &ASCII,
        kanji: &KANJI,
    };

    fn codes(bytes: &[u8], fold: bool) -> Vec<u32> {
        Utf8Codes::new(bytes).halfwidth_kana(fold).collect()
    }

    #[test]
    fn decodes_packed_codes() {
        assert_eq!(codes(b"A", false), vec![0x41]);
        assert_eq!(codes("漢".as_bytes(), false), vec![0xE6BCA2]);
        assert_eq!(codes("é😀".as_bytes(), false), vec![0xC3A9, 0xF09F9880]);
    }

    #[test]
    fn folds_halfwidth_kana_when_enabled() {
        assert_eq!(codes(&[0xEF, 0xBD, 0xA1], true), vec![0xA1]);
        assert_eq!(codes(&[0xEF, 0xBE, 0x80], true), vec![0xC0]);
        assert_eq!(codes(&[0xEF, 0xBD, 0xA1], false), vec![0xEFBDA1]);
        assert_eq!(codes("漢".as_bytes(), true), vec![0xE6BCA2]);
    }

    #[test]
    fn stops_at_bad_or_truncated_input() {
        assert_eq!(codes(&[0x41, 0x80, 0x42], false), vec![0x41]);
        assert_eq!(codes(&[0x41, 0xE6, 0xBC], false), vec![0x41]);
        assert_eq!(codes(&[0xF8, 0x41], false), Vec::<u32>::new());
    }

    #[test]
    fn binary_search_finds_exact_entries_only() {
        for entry in &KANJI {
            assert_eq!(FONTS.find_kanji(entry.code), Some(entry));
        }
        for missing in [0xE38181, 0xE5AD98, 0xE6BCA3, 0x100] {
            assert_eq!(FONTS.find_kanji(missing), None);
        }
        let empty = KanjiFonts {
            ascii: &[],
            kanji: &[],
        };
        assert_eq!(empty.resolve(0xE6BCA2), None);
        assert_eq!(empty.fallback_width(0xE6BCA2), 0);
    }

    #[test]
    fn ascii_codes_index_directly() {
        assert_eq!(FONTS.resolve(0x41), Some(&ASCII[0x40]));
        assert_eq!(FONTS.resolve(0), None);
        assert_eq!(FONTS.resolve(0xFF), None);
        assert_eq!(FONTS.fallback_width(0xFF), 6);
        assert_eq!(FONTS.fallback_width(0xE5AD98), 12);
    }

    #[test]
    fn visible_glyph_streams_through_one_window() {
        static ODD: [KanjiEntry; 1] = [KanjiEntry {
            code: 0xE6BCA2,
            glyph: KanjiGlyph {
                width: 10,
                height: 2,
                bitmap: &[0xFF, 0xC0, 0x80, 0x40],
            },
        }];
        let mut display = canvas(20, 10);
        display.set_kanji_fonts(Some(KanjiFonts {
            ascii: &ASCII,
            kanji: &ODD,
        }));
        let cursor = display.draw_kanji(0, 0, 0xE6BCA2, WHITE, BLACK).unwrap();
        assert_eq!(cursor, (10, 0));
        assert_eq!(display.interface.count(Instruction::RAMWR), 1);
        assert_eq!(display.interface.pixel_writes, 20);
        assert_eq!(display.interface.pixel(9, 0), Some(WHITE));
        assert_eq!(display.interface.pixel(0, 1), Some(WHITE));
        assert_eq!(display.interface.pixel(1, 1), Some(BLACK));
        assert_eq!(display.interface.pixel(8, 1), Some(BLACK));
        assert_eq!(display.interface.pixel(9, 1), Some(WHITE));

        display.interface.clear();
        display.bmp_use_trans_color(BLACK);
        display.draw_kanji(0, 0, 0xE6BCA2, WHITE, BLACK).unwrap();
        assert_eq!(display.interface.painted().len(), 12);
        assert_eq!(display.interface.count(Instruction::RAMWR), 12);
    }

    #[test]
    fn clipped_glyph_falls_back_to_pixels() {
        let mut display = canvas(20, 20);
        display.set_kanji_fonts(Some(FONTS));
        display.set_text_wrap(false);
        let cursor = display.draw_kanji(15, 0, 0xE6BCA2, WHITE, BLACK).unwrap();
        assert_eq!(cursor, (27, 0));
        assert_eq!(display.interface.painted().len(), 5 * 12);
        assert!(display.interface.painted().iter().all(|&(x, _)| x >= 15));
    }

    #[test]
    fn text_advances_and_skips_unknown() {
        let mut display = canvas(30, 20);
        display.set_kanji_fonts(Some(KanjiFonts {
            ascii: &ASCII,
            kanji: &KANJI[..1],
        }));
        let cursor = display.draw_text_kanji(0, 0, "A字A", WHITE, BLACK).unwrap();
        assert_eq!(cursor, (24, 0));
        assert_eq!(display.interface.count(Instruction::RAMWR), 2);
        assert_eq!(display.interface.pixel(6, 0), None);
        assert_eq!(display.interface.pixel(18, 0), Some(WHITE));
    }

    #[test]
    fn text_wraps_by_glyph_height() {
        let mut display = canvas(20, 30);
        display.set_kanji_fonts(Some(FONTS));
        let cursor = display.draw_text_kanji(0, 0, "漢漢", WHITE, BLACK).unwrap();
        assert_eq!(cursor, (12, 12));
        assert_eq!(display.interface.pixel(0, 12), Some(WHITE));
    }

    #[test]
    fn halfwidth_kana_uses_ascii_table() {
        let mut display = canvas(30, 20);
        display.set_kanji_fonts(Some(FONTS));
        display.set_halfwidth_kana(true);
        // U+FF61, folded to 0xA1, which is past the ASCII table
        let cursor = display.draw_text_kanji(0, 0, "\u{FF61}A", WHITE, BLACK).unwrap();
        assert_eq!(cursor, (12, 0));
        assert_eq!(display.interface.count(Instruction::RAMWR), 1);
    }

    #[test]
    fn without_tables_nothing_is_drawn() {
        let mut display = canvas(30, 20);
        assert_eq!(display.draw_text_kanji(3, 4, "漢A", WHITE, BLACK), Ok((3, 4)));
        assert!(display.interface.transactions.is_empty());
    }
}
