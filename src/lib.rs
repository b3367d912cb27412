#![no_std]
//! This crate provides a streaming ST7735 TFT driver. Based on [st7735-lcd-rs](https://github.com/sajattack/st7735-lcd-rs)
//!
//! Nothing is buffered on the host: every primitive opens an address window on
//! the controller and streams its pixels straight into it. On top of the
//! rasterizers sit fixed 5x7 and GFX-style glyph fonts, a name-keyed font
//! registry, Kanji text resolved from UTF-8, hardware scrolling and bitmap
//! blits with an optional transparent color.
extern crate alloc;

pub mod bitmap;
pub mod color;
pub mod config;
pub mod error;
pub mod font;
pub mod init_table;
pub mod instruction;
pub mod interface;
pub mod kanji;
pub mod primitives;
pub mod registry;
pub mod scroll;
pub mod text;

#[cfg(test)]
pub(crate) mod test_support;

use core::iter;

use embedded_graphics_core::pixelcolor::raw::RawU16;
use embedded_graphics_core::primitives::Rectangle;
use embedded_graphics_core::{draw_target::DrawTarget, pixelcolor::Rgb565, prelude::*};
use embedded_hal::delay::DelayNs;

pub use crate::bitmap::{BitmapStore, BlitDirection};
pub use crate::config::{DisplayConfig, PanelVariant, Rotation};
pub use crate::error::Error;
pub use crate::font::{Font, Glyph};
pub use crate::interface::{Interface, InterfaceError, NoResetPin, SpiInterface};
pub use crate::kanji::{KanjiEntry, KanjiFonts, KanjiGlyph};
pub use crate::registry::FontRegistry;
pub use crate::scroll::ScrollDirection;

use crate::init_table::{
    BCMD, RCMD1, RCMD2_GREEN, RCMD2_GREEN144, RCMD2_GREEN160X80, RCMD2_GREEN160X80_PLUGIN,
    RCMD2_RED, RCMD3,
};
use crate::instruction::Instruction;

/// ST7735 driver to connect to TFT displays.
pub struct ST7735<DI>
where
    DI: Interface,
{
    /// Bus transport
    interface: DI,
    /// Rotation-dependent geometry
    config: DisplayConfig,
    /// Last value written to MADCTL
    madctl: u8,
    initialized: bool,
    text_wrap: bool,
    /// Active glyph font, `None` selects the built-in 5x7 font
    font: Option<&'static Font>,
    fonts: FontRegistry,
    kanji: Option<KanjiFonts>,
    halfwidth_kana: bool,
    /// Color skipped by blits and glyph backgrounds
    transparent: Option<u16>,
    bitmaps: BitmapStore,
}

impl<DI> ST7735<DI>
where
    DI: Interface,
{
    /// Creates a new driver instance for a panel variant.
    /// # Examples
    /// ```ignore
    /// // Initialization of 1.8" black tab module
    /// // ... platform-dependent SPI initialization and GPIO
    /// let interface = SpiInterface::new(spi, dc);
    /// let mut display = ST7735::new(interface, PanelVariant::BlackTab);
    /// display.init(&mut delay).unwrap();
    /// display.set_rotation(Rotation::Deg90).unwrap();
    /// display.fill_screen(color::BLACK).unwrap();
    /// ```
    pub fn new(interface: DI, variant: PanelVariant) -> Self {
        Self::with_config(interface, DisplayConfig::new(variant))
    }

    /// Creates a driver with explicit geometry, e.g. for modules with
    /// non-standard RAM offsets.
    pub fn with_config(interface: DI, config: DisplayConfig) -> Self {
        ST7735 {
            interface,
            config,
            madctl: config.rotation.madctl(),
            initialized: false,
            text_wrap: true,
            font: None,
            fonts: FontRegistry::new(),
            kanji: None,
            halfwidth_kana: false,
            transparent: None,
            bitmaps: BitmapStore::new(),
        }
    }

    /// Runs the variant's command tables to initialize the display.
    pub fn init<DELAY>(&mut self, delay: &mut DELAY) -> Result<(), Error<DI::Error>>
    where
        DELAY: DelayNs,
    {
        let variant = self.config.variant;
        log::debug!("initializing {:?} panel", variant);
        if variant == PanelVariant::TypeB {
            self.replay(BCMD, delay)?;
        } else {
            self.replay(RCMD1, delay)?;
            let part2 = match variant {
                PanelVariant::GreenTab => RCMD2_GREEN,
                PanelVariant::GreenTab144 | PanelVariant::Hallowing => RCMD2_GREEN144,
                PanelVariant::Mini160x80 => RCMD2_GREEN160X80,
                PanelVariant::Mini160x80Plugin => RCMD2_GREEN160X80_PLUGIN,
                _ => RCMD2_RED,
            };
            self.replay(part2, delay)?;
            self.replay(RCMD3, delay)?;
            if matches!(variant, PanelVariant::BlackTab | PanelVariant::Mini160x80) {
                self.write_madctl(0xC0)?;
            }
        }
        self.initialized = true;
        self.set_rotation(variant.initial_rotation())
    }

    /// Hardware reset through the interface. Call BEFORE init
    pub fn hard_reset<DELAY>(&mut self, delay: &mut DELAY) -> Result<(), Error<DI::Error>>
    where
        DELAY: DelayNs,
    {
        self.interface.reset(delay)?;
        Ok(())
    }

    /// Gives the interface back.
    pub fn release(self) -> DI {
        self.interface
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Drawable width for the current rotation.
    pub fn width(&self) -> u16 {
        self.config.width
    }

    /// Drawable height for the current rotation.
    pub fn height(&self) -> u16 {
        self.config.height
    }

    pub fn rotation(&self) -> Rotation {
        self.config.rotation
    }

    fn ensure_initialized(&self) -> Result<(), Error<DI::Error>> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    fn write_command(&mut self, command: Instruction, params: &[u8]) -> Result<(), Error<DI::Error>> {
        self.send_command(command as u8, params)
    }

    fn write_madctl(&mut self, value: u8) -> Result<(), Error<DI::Error>> {
        self.write_command(Instruction::MADCTL, &[value])?;
        self.madctl = value;
        Ok(())
    }

    /// Sets the display rotation. Content already on screen is not moved.
    pub fn set_rotation(&mut self, rotation: Rotation) -> Result<(), Error<DI::Error>> {
        self.ensure_initialized()?;
        self.config = self.config.apply(rotation);
        log::debug!(
            "rotation {:?}: {}x{} at ({}, {})",
            rotation,
            self.config.width,
            self.config.height,
            self.config.xstart,
            self.config.ystart
        );
        self.write_madctl(rotation.madctl())
    }

    /// Turns the display by `turn` relative to the current rotation.
    pub fn rotate_by(&mut self, turn: Rotation) -> Result<(), Error<DI::Error>> {
        self.set_rotation(self.config.rotation.then(turn))
    }

    /// Sets the RAM offset of the visible area for modules that differ from
    /// their variant's defaults.
    pub fn set_offset(&mut self, colstart: u16, rowstart: u16) {
        self.config = self.config.with_offset(colstart, rowstart);
    }

    /// Whether the colours are inverted (true) or not (false)
    pub fn invert_display(&mut self, inverted: bool) -> Result<(), Error<DI::Error>> {
        self.ensure_initialized()?;
        if inverted {
            self.write_command(Instruction::INVON, &[])
        } else {
            self.write_command(Instruction::INVOFF, &[])
        }
    }

    /// Leaves partial mode.
    pub fn normal_display(&mut self) -> Result<(), Error<DI::Error>> {
        self.ensure_initialized()?;
        self.write_command(Instruction::NORON, &[])
    }

    /// Sets the address window and starts a RAM write. Coordinates are
    /// inclusive and relative to the visible area.
    pub fn set_addr_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> Result<(), Error<DI::Error>> {
        self.ensure_initialized()?;
        let (dx, dy) = (self.config.xstart, self.config.ystart);
        let [a, b] = (x0 + dx).to_be_bytes();
        let [c, d] = (x1 + dx).to_be_bytes();
        self.write_command(Instruction::CASET, &[a, b, c, d])?;
        let [a, b] = (y0 + dy).to_be_bytes();
        let [c, d] = (y1 + dy).to_be_bytes();
        self.write_command(Instruction::RASET, &[a, b, c, d])?;
        self.write_command(Instruction::RAMWR, &[])
    }

    /// Streams pixels into the current window.
    fn write_pixels<P: IntoIterator<Item = u16>>(&mut self, colors: P) -> Result<(), Error<DI::Error>> {
        let mut buffer = [0; 32];
        let mut index = 0;
        for word in colors {
            let as_bytes = word.to_be_bytes();
            buffer[index] = as_bytes[0];
            buffer[index + 1] = as_bytes[1];
            index += 2;
            if index >= buffer.len() {
                self.interface.write_data(&buffer)?;
                index = 0;
            }
        }
        self.interface.write_data(&buffer[0..index])?;
        Ok(())
    }

    /// Opens a window over an already clipped area and fills it.
    fn fill_window(&mut self, x: u16, y: u16, w: u16, h: u16, color: u16) -> Result<(), Error<DI::Error>> {
        self.set_addr_window(x, y, x + w - 1, y + h - 1)?;
        self.write_pixels(iter::repeat_n(color, w as usize * h as usize))
    }
}

impl<DI: Interface> DrawTarget for ST7735<DI> {
    type Color = Rgb565;

    type Error = Error<DI::Error>;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(pos, color) in pixels {
            self.draw_pixel(pos.x, pos.y, RawU16::from(color).into_inner())?;
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect_wh(
            area.top_left.x,
            area.top_left.y,
            area.size.width as i32,
            area.size.height as i32,
            RawU16::from(color).into_inner(),
        )
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_screen(RawU16::from(color).into_inner())
    }
}

impl<DI> OriginDimensions for ST7735<DI>
where
    DI: Interface,
{
    fn size(&self) -> Size {
        Size::new(self.config.width as u32, self.config.height as u32)
    }
}
