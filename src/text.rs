//! Text rendering with the fixed 5x7 font or a glyph-table [`Font`].

use crate::font::{self, FIXED_HEIGHT, FIXED_WIDTH, Font, Glyph};
use crate::interface::Interface;
use crate::{Error, ST7735};

/// Extra rows between fixed-font lines.
const FIXED_LINE_GAP: i32 = 3;
/// Fixed-font column step, glyph plus one column of spacing.
const FIXED_ADVANCE: i32 = FIXED_WIDTH as i32 + 1;

impl<DI> ST7735<DI>
where
    DI: Interface,
{
    /// Enables or disables wrapping at the right edge. On by default.
    pub fn set_text_wrap(&mut self, wrap: bool) {
        self.text_wrap = wrap;
    }

    /// Selects a glyph-table font, or the built-in 5x7 font with `None`.
    pub fn set_font(&mut self, font: Option<&'static Font>) {
        self.font = font;
    }

    pub fn font(&self) -> Option<&'static Font> {
        self.font
    }

    /// Whether background pixels of color `bg` are left untouched.
    pub(crate) fn skips_background(&self, bg: u16) -> bool {
        self.transparent == Some(bg)
    }

    /// Paints one `size` x `size` cell of a scaled glyph.
    fn draw_cell(&mut self, x: i32, y: i32, size: i32, color: u16) -> Result<(), Error<DI::Error>> {
        if size == 1 {
            self.draw_pixel(x, y, color)
        } else {
            self.fill_rect_wh(x, y, size, size, color)
        }
    }

    /// Draws one character with the active font, top-left anchored for the
    /// fixed font and baseline anchored for glyph fonts.
    pub fn draw_char(
        &mut self,
        x: i32,
        y: i32,
        c: u8,
        color: u16,
        bg: u16,
        size: u8,
    ) -> Result<(), Error<DI::Error>> {
        let size = i32::from(size.max(1));
        match self.font {
            None => self.draw_fixed_char(x, y, c, color, bg, size),
            Some(font) => match font.glyph(u16::from(c)) {
                Some(glyph) => self.draw_glyph(x, y, font, glyph, color, bg, size),
                None => Ok(()),
            },
        }
    }

    fn draw_fixed_char(
        &mut self,
        x: i32,
        y: i32,
        c: u8,
        color: u16,
        bg: u16,
        size: i32,
    ) -> Result<(), Error<DI::Error>> {
        let paint_bg = bg != color && !self.skips_background(bg);
        for (i, &column) in font::fixed_glyph(c).iter().enumerate() {
            let mut line = column;
            for j in 0..i32::from(FIXED_HEIGHT) {
                let cx = x + i as i32 * size;
                let cy = y + j * size;
                if line & 0x01 != 0 {
                    self.draw_cell(cx, cy, size, color)?;
                } else if paint_bg {
                    self.draw_cell(cx, cy, size, bg)?;
                }
                line >>= 1;
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_glyph(
        &mut self,
        x: i32,
        y: i32,
        font: &Font,
        glyph: &Glyph,
        color: u16,
        bg: u16,
        size: i32,
    ) -> Result<(), Error<DI::Error>> {
        let paint_bg = !self.skips_background(bg);
        let (xo, yo) = (i32::from(glyph.x_offset), i32::from(glyph.y_offset));
        let (w, h) = (i32::from(glyph.width), i32::from(glyph.height));
        let mut bits = font.bits(glyph);
        for yy in 0..h {
            for xx in 0..w {
                let on = bits.next().unwrap_or(false);
                let cx = x + (xo + xx) * size;
                let cy = y + (yo + yy) * size;
                if on {
                    self.draw_cell(cx, cy, size, color)?;
                } else if paint_bg {
                    self.draw_cell(cx, cy, size, bg)?;
                }
            }
        }
        Ok(())
    }

    /// Draws `text` starting at `(x, y)` and returns the final cursor.
    ///
    /// Without a glyph font every byte is drawn with the 5x7 font; bytes
    /// outside printable ASCII show as `?`. With a glyph font, bytes outside
    /// the font's range are skipped.
    pub fn draw_text(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        color: u16,
        bg: u16,
        size: u8,
    ) -> Result<(i32, i32), Error<DI::Error>> {
        match self.font {
            None => self.draw_fixed_text(x, y, text, color, bg, size),
            Some(font) => self.draw_glyph_text(x, y, font, text, color, bg, size),
        }
    }

    fn draw_fixed_text(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        color: u16,
        bg: u16,
        size: u8,
    ) -> Result<(i32, i32), Error<DI::Error>> {
        let scale = i32::from(size.max(1));
        let (width, height) = (i32::from(self.width()), i32::from(self.height()));
        let line_height = i32::from(FIXED_HEIGHT) * scale + FIXED_LINE_GAP;
        let (mut cx, mut cy) = (x, y);
        for &c in text.as_bytes() {
            if c == b'\n' {
                cx = 0;
                cy = (cy + line_height).min(height);
                continue;
            }
            if self.text_wrap && cx + i32::from(FIXED_WIDTH) * scale > width {
                cx = 0;
                cy = (cy + line_height).min(height);
                if c == b' ' {
                    continue;
                }
            }
            self.draw_char(cx, cy, c, color, bg, size)?;
            cx = (cx + FIXED_ADVANCE * scale).min(width);
        }
        Ok((cx, cy))
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_glyph_text(
        &mut self,
        x: i32,
        y: i32,
        font: &'static Font,
        text: &str,
        color: u16,
        bg: u16,
        size: u8,
    ) -> Result<(i32, i32), Error<DI::Error>> {
        let scale = i32::from(size.max(1));
        let width = i32::from(self.width());
        let line_height = i32::from(font.y_advance) * scale;
        let (mut cx, mut cy) = (x, y);
        for &c in text.as_bytes() {
            if c == b'\n' {
                cx = 0;
                cy += line_height;
                continue;
            }
            let Some(glyph) = font.glyph(u16::from(c)) else {
                continue;
            };
            if glyph.width > 0 && glyph.height > 0 {
                let right = i32::from(glyph.x_offset) + i32::from(glyph.width);
                if self.text_wrap && cx + scale * right > width {
                    cx = 0;
                    cy += line_height;
                }
                self.draw_glyph(cx, cy, font, glyph, color, bg, scale)?;
            }
            cx += i32::from(glyph.x_advance) * scale;
        }
        Ok((cx, cy))
    }
}
