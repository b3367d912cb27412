//! RGB565 colors.

pub const BLACK: u16 = 0x0000;
pub const BLUE: u16 = 0x001F;
pub const RED: u16 = 0xF800;
pub const GREEN: u16 = 0x07E0;
pub const CYAN: u16 = 0x07FF;
pub const MAGENTA: u16 = 0xF81F;
pub const YELLOW: u16 = 0xFFE0;
pub const WHITE: u16 = 0xFFFF;
pub const GRAY: u16 = 0x8410;
pub const LIGHT_BLUE: u16 = 0x03EF;
pub const DARK_GREEN: u16 = 0x03E0;
pub const DARK_BLUE: u16 = 0x0010;
pub const LIGHT_GREEN: u16 = 0x07E8;
pub const DARK_RED: u16 = 0x7800;
pub const ORANGE: u16 = 0xFC00;
pub const PINK: u16 = 0xF81F;

/// Packs 8-bit channels into RGB565, dropping the low bits of each.
pub const fn color565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_channels() {
        assert_eq!(color565(255, 255, 255), WHITE);
        assert_eq!(color565(255, 0, 0), RED);
        assert_eq!(color565(0, 255, 0), GREEN);
        assert_eq!(color565(0, 0, 255), BLUE);
        assert_eq!(color565(128, 128, 128), GRAY);
        assert_eq!(color565(7, 3, 7), BLACK);
    }
}
