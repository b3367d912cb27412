//! RGB565 bitmap blits and the registered-bitmap store.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::instruction::madctl;
use crate::interface::Interface;
use crate::{Error, ST7735};

/// Number of bitmap ids.
pub const SLOTS: usize = 16;

/// Horizontal orientation of a blit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlitDirection {
    #[default]
    Normal,
    /// Drawn mirrored left to right, anchored at the mirrored position.
    Mirrored,
}

/// A registered bitmap, pixels row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u16,
    pub height: u16,
    pub pixels: Vec<u16>,
}

/// Owned bitmaps addressed by id `0..SLOTS`.
#[derive(Debug, Default, Clone)]
pub struct BitmapStore {
    slots: BTreeMap<usize, Bitmap>,
}

impl BitmapStore {
    pub const fn new() -> Self {
        BitmapStore {
            slots: BTreeMap::new(),
        }
    }

    /// Copies `pixels` into slot `id`, replacing what was there.
    pub fn register<E>(&mut self, id: usize, width: u16, height: u16, pixels: &[u16]) -> Result<(), Error<E>> {
        if id >= SLOTS {
            return Err(Error::SlotOutOfRange { id });
        }
        let expected = usize::from(width) * usize::from(height);
        if pixels.len() != expected {
            return Err(Error::BitmapSizeMismatch {
                expected,
                provided: pixels.len(),
            });
        }
        self.slots.insert(
            id,
            Bitmap {
                width,
                height,
                pixels: pixels.to_vec(),
            },
        );
        Ok(())
    }

    pub fn get(&self, id: usize) -> Option<&Bitmap> {
        self.slots.get(&id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<DI> ST7735<DI>
where
    DI: Interface,
{
    /// Makes blits skip pixels of `color` and glyph renderers skip
    /// backgrounds of that color.
    pub fn bmp_use_trans_color(&mut self, color: u16) {
        self.transparent = Some(color);
    }

    pub fn bmp_unuse_trans_color(&mut self) {
        self.transparent = None;
    }

    pub fn register_bitmap(
        &mut self,
        id: usize,
        width: u16,
        height: u16,
        pixels: &[u16],
    ) -> Result<(), Error<DI::Error>> {
        self.bitmaps.register::<DI::Error>(id, width, height, pixels)
    }

    pub fn bitmaps(&self) -> &BitmapStore {
        &self.bitmaps
    }

    /// Draws a `width` x `height` bitmap at `(x, y)`.
    ///
    /// Without a transparent color the visible part is streamed through one
    /// window. With one, every other pixel is written on its own and matching
    /// pixels leave the screen untouched.
    pub fn bmp_draw(
        &mut self,
        x: i32,
        y: i32,
        width: u16,
        height: u16,
        pixels: &[u16],
        direction: BlitDirection,
    ) -> Result<(), Error<DI::Error>> {
        self.ensure_initialized()?;
        let expected = usize::from(width) * usize::from(height);
        if pixels.len() != expected {
            return Err(Error::BitmapSizeMismatch {
                expected,
                provided: pixels.len(),
            });
        }
        if expected == 0 {
            return Ok(());
        }

        let mirrored = direction == BlitDirection::Mirrored;
        let saved = self.madctl;
        let mut x = x;
        if mirrored {
            // Column order is the row-scan bit once the axes are exchanged.
            let flip = if self.config.rotation.swaps_axes() {
                madctl::MY
            } else {
                madctl::MX
            };
            self.write_madctl(saved ^ flip)?;
            x = i32::from(self.width()) - x - i32::from(width);
        }
        let drawn = self.blit(x, y, width, height, pixels);
        if mirrored {
            self.write_madctl(saved)?;
        }
        drawn
    }

    /// Draws the bitmap registered under `id`. An empty slot draws nothing.
    pub fn bmp_reg_draw(
        &mut self,
        id: usize,
        x: i32,
        y: i32,
        direction: BlitDirection,
    ) -> Result<(), Error<DI::Error>> {
        // The blit needs `&mut self`, so it works on a copy of the slot.
        let Some(bitmap) = self.bitmaps.get(id).cloned() else {
            log::warn!("bitmap slot {} is empty", id);
            return Ok(());
        };
        self.bmp_draw(x, y, bitmap.width, bitmap.height, &bitmap.pixels, direction)
    }

    fn blit(&mut self, x: i32, y: i32, width: u16, height: u16, pixels: &[u16]) -> Result<(), Error<DI::Error>> {
        let w = usize::from(width);
        if let Some(key) = self.transparent {
            for (i, &color) in pixels.iter().enumerate() {
                if color != key {
                    self.draw_pixel(x + (i % w) as i32, y + (i / w) as i32, color)?;
                }
            }
            return Ok(());
        }

        let Some((cx, cy, cw, ch)) = self.clip(x, y, i32::from(width), i32::from(height)) else {
            return Ok(());
        };
        let skip_x = (i32::from(cx) - x) as usize;
        let skip_y = (i32::from(cy) - y) as usize;
        self.set_addr_window(cx, cy, cx + cw - 1, cy + ch - 1)?;
        let visible = pixels
            .chunks(w)
            .skip(skip_y)
            .take(usize::from(ch))
            .flat_map(|row| row.iter().skip(skip_x).take(usize::from(cw)).copied());
        self.write_pixels(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PanelVariant, Rotation};
    use crate::instruction::Instruction;
    use crate::test_support::{RecordingInterface, canvas};
    use alloc::vec;

    #[test]
    fn registered_bitmap_round_trips() {
        let mut display = canvas(10, 10);
        display.register_bitmap(3, 3, 2, &[1, 2, 3, 4, 5, 6]).unwrap();
        display.bmp_reg_draw(3, 4, 5, BlitDirection::Normal).unwrap();
        assert_eq!(display.interface.count(Instruction::RAMWR), 1);
        assert_eq!(
            display.interface.data_of(Instruction::RAMWR),
            vec![vec![0, 1, 0, 2, 0, 3, 0, 4, 0, 5, 0, 6]]
        );
        assert_eq!(display.interface.pixel(4, 5), Some(1));
        assert_eq!(display.interface.pixel(6, 5), Some(3));
        assert_eq!(display.interface.pixel(4, 6), Some(4));
        assert_eq!(display.interface.pixel(6, 6), Some(6));
        assert_eq!(display.bitmaps().len(), 1);
        assert_eq!(display.bitmaps().get(3).map(|b| b.pixels.len()), Some(6));
    }

    #[test]
    fn failed_registered_draw_keeps_the_slot() {
        let mut display = ST7735::new(RecordingInterface::new(), PanelVariant::RedTab);
        display.register_bitmap(2, 1, 1, &[7]).unwrap();
        assert_eq!(
            display.bmp_reg_draw(2, 0, 0, BlitDirection::Normal),
            Err(Error::NotInitialized)
        );
        assert_eq!(display.bitmaps().get(2).map(|b| b.pixels.clone()), Some(vec![7]));
    }

    #[test]
    fn registration_is_checked() {
        let mut display = canvas(10, 10);
        assert_eq!(
            display.register_bitmap(16, 1, 1, &[0]),
            Err(Error::SlotOutOfRange { id: 16 })
        );
        assert_eq!(
            display.register_bitmap(0, 2, 2, &[1, 2, 3]),
            Err(Error::BitmapSizeMismatch {
                expected: 4,
                provided: 3
            })
        );
        assert!(display.bitmaps().is_empty());
        display.register_bitmap(0, 1, 1, &[1]).unwrap();
        display.register_bitmap(0, 1, 1, &[2]).unwrap();
        assert_eq!(display.bitmaps().get(0).map(|b| b.pixels.clone()), Some(vec![2]));
    }

    #[test]
    fn empty_slot_is_a_no_op() {
        let mut display = canvas(10, 10);
        display.bmp_reg_draw(5, 0, 0, BlitDirection::Normal).unwrap();
        assert!(display.interface.transactions.is_empty());
    }

    #[test]
    fn transparent_pixels_keep_old_content() {
        let mut display = canvas(10, 10);
        display.fill_rect_wh(0, 0, 2, 2, 9).unwrap();
        display.interface.transactions.clear();
        display.bmp_use_trans_color(0);
        display.bmp_draw(0, 0, 2, 2, &[0, 7, 7, 0], BlitDirection::Normal).unwrap();
        assert_eq!(display.interface.count(Instruction::RAMWR), 2);
        assert_eq!(display.interface.pixel(0, 0), Some(9));
        assert_eq!(display.interface.pixel(1, 0), Some(7));
        assert_eq!(display.interface.pixel(0, 1), Some(7));
        assert_eq!(display.interface.pixel(1, 1), Some(9));

        display.bmp_unuse_trans_color();
        display.interface.transactions.clear();
        display.bmp_draw(0, 0, 2, 2, &[0, 7, 7, 0], BlitDirection::Normal).unwrap();
        assert_eq!(display.interface.count(Instruction::RAMWR), 1);
        assert_eq!(display.interface.pixel(0, 0), Some(0));
    }

    #[test]
    fn streaming_blit_is_clipped() {
        let mut display = canvas(10, 10);
        let pixels: Vec<u16> = (1..=9).collect();
        display.bmp_draw(8, 8, 3, 3, &pixels, BlitDirection::Normal).unwrap();
        assert_eq!(display.interface.pixel_writes, 4);
        assert_eq!(display.interface.pixel(8, 8), Some(1));
        assert_eq!(display.interface.pixel(9, 8), Some(2));
        assert_eq!(display.interface.pixel(8, 9), Some(4));
        assert_eq!(display.interface.pixel(9, 9), Some(5));

        display.interface.clear();
        display.bmp_draw(-1, -2, 3, 3, &pixels, BlitDirection::Normal).unwrap();
        assert_eq!(display.interface.painted(), vec![(0, 0), (1, 0)]);
        assert_eq!(display.interface.pixel(0, 0), Some(8));
    }

    #[test]
    fn mirrored_blit_flips_and_restores_orientation() {
        let mut display = canvas(10, 10);
        display.bmp_draw(1, 0, 3, 1, &[1, 2, 3], BlitDirection::Mirrored).unwrap();
        assert_eq!(
            display.interface.data_of(Instruction::MADCTL),
            vec![vec![0x80], vec![0xC0]]
        );
        assert_eq!(display.interface.data_of(Instruction::CASET), vec![vec![0, 6, 0, 8]]);

        display.set_rotation(Rotation::Deg90).unwrap();
        display.interface.clear();
        display.bmp_draw(0, 0, 1, 1, &[1], BlitDirection::Mirrored).unwrap();
        assert_eq!(
            display.interface.data_of(Instruction::MADCTL),
            vec![vec![0x20], vec![0xA0]]
        );
    }

    #[test]
    fn blit_checks_state_and_size() {
        let mut display = ST7735::new(RecordingInterface::new(), PanelVariant::RedTab);
        assert_eq!(
            display.bmp_draw(0, 0, 1, 1, &[1], BlitDirection::Normal),
            Err(Error::NotInitialized)
        );
        let mut display = canvas(10, 10);
        assert_eq!(
            display.bmp_draw(0, 0, 2, 1, &[1], BlitDirection::Normal),
            Err(Error::BitmapSizeMismatch {
                expected: 2,
                provided: 1
            })
        );
    }
}
