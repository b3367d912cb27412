//! Name-keyed font table.

use alloc::vec::Vec;

use crate::font::Font;
use crate::interface::Interface;
use crate::{Error, ST7735};

/// Maximum number of registered fonts.
pub const CAPACITY: usize = 16;

/// Append-only list of named fonts, in registration order.
#[derive(Debug, Default, Clone)]
pub struct FontRegistry {
    entries: Vec<(&'static str, &'static Font)>,
}

impl FontRegistry {
    pub const fn new() -> Self {
        FontRegistry {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds a font under `name`.
    pub fn register<E>(&mut self, name: &'static str, font: &'static Font) -> Result<(), Error<E>> {
        if self.find(name).is_some() {
            return Err(Error::DuplicateFont);
        }
        if self.entries.len() >= CAPACITY {
            return Err(Error::RegistryFull);
        }
        self.entries.push((name, font));
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&'static Font> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, font)| font)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|&(name, _)| name)
    }

    /// Writes the names as `a,b,c` into `buf` and returns the byte count.
    /// Nothing is written when `buf` is too small.
    pub fn write_names<E>(&self, buf: &mut [u8]) -> Result<usize, Error<E>> {
        let needed = self
            .names()
            .map(str::len)
            .sum::<usize>()
            + self.entries.len().saturating_sub(1);
        if needed > buf.len() {
            return Err(Error::BufferTooSmall {
                needed,
                available: buf.len(),
            });
        }
        let mut at = 0;
        for (i, name) in self.names().enumerate() {
            if i > 0 {
                buf[at] = b',';
                at += 1;
            }
            buf[at..at + name.len()].copy_from_slice(name.as_bytes());
            at += name.len();
        }
        Ok(at)
    }
}

impl<DI> ST7735<DI>
where
    DI: Interface,
{
    pub fn register_font(&mut self, name: &'static str, font: &'static Font) -> Result<(), Error<DI::Error>> {
        self.fonts.register::<DI::Error>(name, font)?;
        log::debug!("registered font {:?} ({} of {})", name, self.fonts.len(), CAPACITY);
        Ok(())
    }

    /// Activates a registered font. Returns `false` and keeps the current
    /// font when `name` is unknown.
    pub fn set_font_by_name(&mut self, name: &str) -> bool {
        match self.fonts.find(name) {
            Some(font) => {
                self.font = Some(font);
                true
            }
            None => {
                log::warn!("font {:?} is not registered", name);
                false
            }
        }
    }

    pub fn font_names(&self) -> &FontRegistry {
        &self.fonts
    }
}
