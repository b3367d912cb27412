/// Errors reported by the driver.
///
/// Lookup misses (unknown glyphs, unknown font names, empty bitmap slots) are
/// not errors: they fall back to default spacing or do nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// The bus transport failed.
    Interface(E),
    /// A drawing or register call was made before [`init`](crate::ST7735::init).
    NotInitialized,
    /// An init table declares more bytes than it contains.
    MalformedTable { offset: usize },
    /// Corner radius larger than half the shorter side, or negative.
    InvalidRadius { radius: i32, width: i32, height: i32 },
    /// Fixed areas do not fit in the panel height.
    InvalidScrollArea { top: u16, bottom: u16, height: u16 },
    /// All font registry slots are taken.
    RegistryFull,
    /// A font with this name is already registered.
    DuplicateFont,
    /// The output buffer cannot hold the font name list.
    BufferTooSmall { needed: usize, available: usize },
    /// Bitmap slot id past the store capacity.
    SlotOutOfRange { id: usize },
    /// Pixel count does not match `width * height`.
    BitmapSizeMismatch { expected: usize, provided: usize },
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::Interface(error)
    }
}
