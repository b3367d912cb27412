//! Panel variants, rotation and the coordinate model.

use crate::instruction::madctl;

/// Vendor panel variants ("tabs") of ST7735 modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelVariant {
    /// ST7735B controller.
    TypeB,
    /// 1.8" green tab, 128x160.
    GreenTab,
    /// 1.8" red tab, 128x160.
    RedTab,
    /// 1.8" black tab, 128x160.
    BlackTab,
    /// 1.44" green tab, 128x128.
    GreenTab144,
    /// 0.96" mini display, 160x80.
    Mini160x80,
    /// 0.96" mini display with plug-in FPC, 160x80.
    Mini160x80Plugin,
    /// Adafruit Hallowing: a 1.44" green tab mounted upside down.
    Hallowing,
}

/// MADCTL values written by the scroll definition, per panel family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScrollMasks {
    pub bottom_to_top: u8,
    pub top_to_bottom: u8,
}

impl PanelVariant {
    /// Unrotated panel size in pixels.
    pub const fn base_size(self) -> (u16, u16) {
        match self {
            PanelVariant::GreenTab144 | PanelVariant::Hallowing => (128, 128),
            PanelVariant::Mini160x80 | PanelVariant::Mini160x80Plugin => (160, 80),
            _ => (128, 160),
        }
    }

    /// Controller RAM offset of the visible area as `(colstart, rowstart)`.
    pub const fn offset(self) -> (u16, u16) {
        match self {
            PanelVariant::GreenTab => (2, 1),
            PanelVariant::GreenTab144 | PanelVariant::Hallowing => (2, 3),
            PanelVariant::Mini160x80 => (24, 0),
            PanelVariant::Mini160x80Plugin => (26, 1),
            _ => (0, 0),
        }
    }

    /// Rotation applied at the end of init.
    pub const fn initial_rotation(self) -> Rotation {
        match self {
            PanelVariant::Hallowing => Rotation::Deg270,
            _ => Rotation::Deg0,
        }
    }

    pub(crate) const fn scroll_masks(self) -> ScrollMasks {
        match self {
            PanelVariant::RedTab | PanelVariant::Mini160x80 | PanelVariant::Mini160x80Plugin => {
                ScrollMasks {
                    bottom_to_top: 0xD0,
                    top_to_bottom: 0xC0,
                }
            }
            PanelVariant::BlackTab => ScrollMasks {
                bottom_to_top: 0x18,
                top_to_bottom: 0x08,
            },
            _ => ScrollMasks {
                bottom_to_top: 0xD8,
                top_to_bottom: 0xC8,
            },
        }
    }
}

/// Display rotation, counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Maps a count of quarter turns, modulo 4, to a rotation.
    pub const fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Rotation::Deg0,
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }

    pub const fn quarter_turns(self) -> u8 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    /// This rotation followed by `other`.
    pub const fn then(self, other: Rotation) -> Self {
        Rotation::from_index(self.quarter_turns() + other.quarter_turns())
    }

    /// The rotation that undoes this one: `r.then(r.inverse())` is `Deg0`.
    pub const fn inverse(self) -> Self {
        Rotation::from_index(4 - self.quarter_turns())
    }

    /// Whether the panel axes are exchanged.
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Orientation register value for this rotation.
    pub const fn madctl(self) -> u8 {
        match self {
            Rotation::Deg0 => madctl::MX | madctl::MY | madctl::RGB,
            Rotation::Deg90 => madctl::MY | madctl::MV | madctl::RGB,
            Rotation::Deg180 => madctl::RGB,
            Rotation::Deg270 => madctl::MX | madctl::MV | madctl::RGB,
        }
    }
}

/// Visible size and RAM origin for one rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u16,
    pub height: u16,
    pub xstart: u16,
    pub ystart: u16,
}

/// Derives the drawable area from the unrotated panel and a rotation.
pub const fn geometry(
    base_width: u16,
    base_height: u16,
    colstart: u16,
    rowstart: u16,
    rotation: Rotation,
) -> Geometry {
    if rotation.swaps_axes() {
        Geometry {
            width: base_height,
            height: base_width,
            xstart: rowstart,
            ystart: colstart,
        }
    } else {
        Geometry {
            width: base_width,
            height: base_height,
            xstart: colstart,
            ystart: rowstart,
        }
    }
}

/// Coordinate state of one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    pub colstart: u16,
    pub rowstart: u16,
    pub variant: PanelVariant,
    pub rotation: Rotation,
    pub xstart: u16,
    pub ystart: u16,
    pub width: u16,
    pub height: u16,
    pub base_width: u16,
    pub base_height: u16,
}

impl DisplayConfig {
    /// Defaults for a panel variant in its unrotated orientation.
    pub const fn new(variant: PanelVariant) -> Self {
        let (base_width, base_height) = variant.base_size();
        let (colstart, rowstart) = variant.offset();
        DisplayConfig {
            colstart,
            rowstart,
            variant,
            rotation: Rotation::Deg0,
            xstart: colstart,
            ystart: rowstart,
            width: base_width,
            height: base_height,
            base_width,
            base_height,
        }
    }

    /// Overrides the unrotated panel size.
    pub const fn with_dimensions(mut self, base_width: u16, base_height: u16) -> Self {
        self.base_width = base_width;
        self.base_height = base_height;
        self.apply(self.rotation)
    }

    /// Overrides the RAM offset of the visible area.
    pub const fn with_offset(mut self, colstart: u16, rowstart: u16) -> Self {
        self.colstart = colstart;
        self.rowstart = rowstart;
        self.apply(self.rotation)
    }

    /// Turns the panel by `turn` relative to its current rotation.
    pub const fn rotate_by(self, turn: Rotation) -> Self {
        self.apply(self.rotation.then(turn))
    }

    /// Recomputes width, height and origin for `rotation`.
    pub const fn apply(mut self, rotation: Rotation) -> Self {
        let g = geometry(
            self.base_width,
            self.base_height,
            self.colstart,
            self.rowstart,
            rotation,
        );
        self.rotation = rotation;
        self.width = g.width;
        self.height = g.height;
        self.xstart = g.xstart;
        self.ystart = g.ystart;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROTATIONS: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    #[test]
    fn rotation_then_inverse_restores_base_size() {
        for variant in [
            PanelVariant::GreenTab,
            PanelVariant::GreenTab144,
            PanelVariant::Mini160x80Plugin,
        ] {
            let config = DisplayConfig::new(variant);
            for r in ROTATIONS {
                let turned = config.rotate_by(r);
                assert_eq!(turned.rotation, r);
                let back = turned.rotate_by(r.inverse());
                assert_eq!(back.rotation, Rotation::Deg0);
                assert_eq!(back.width, config.base_width);
                assert_eq!(back.height, config.base_height);
                assert_eq!((back.xstart, back.ystart), (config.colstart, config.rowstart));
            }
        }
    }

    #[test]
    fn turns_compose_modulo_four() {
        assert_eq!(Rotation::Deg90.then(Rotation::Deg270), Rotation::Deg0);
        assert_eq!(Rotation::Deg270.then(Rotation::Deg180), Rotation::Deg90);
        assert_eq!(Rotation::Deg180.inverse(), Rotation::Deg180);
        assert_eq!(Rotation::Deg90.inverse(), Rotation::Deg270);
        for r in ROTATIONS {
            assert_eq!(Rotation::from_index(r.quarter_turns() + 4), r);
        }
    }

    #[test]
    fn quarter_turns_swap_size_and_offset() {
        let g = geometry(128, 160, 2, 1, Rotation::Deg90);
        assert_eq!(
            g,
            Geometry {
                width: 160,
                height: 128,
                xstart: 1,
                ystart: 2
            }
        );
        let g = geometry(128, 160, 2, 1, Rotation::Deg180);
        assert_eq!((g.width, g.height, g.xstart, g.ystart), (128, 160, 2, 1));
    }

    #[test]
    fn each_rotation_has_its_own_madctl() {
        assert_eq!(Rotation::Deg0.madctl(), 0xC0);
        assert_eq!(Rotation::Deg90.madctl(), 0xA0);
        assert_eq!(Rotation::Deg180.madctl(), 0x00);
        assert_eq!(Rotation::Deg270.madctl(), 0x60);
    }

    #[test]
    fn overrides_keep_rotation() {
        let config = DisplayConfig::new(PanelVariant::RedTab)
            .apply(Rotation::Deg270)
            .with_offset(4, 7)
            .with_dimensions(80, 100);
        assert_eq!(config.rotation, Rotation::Deg270);
        assert_eq!((config.width, config.height), (100, 80));
        assert_eq!((config.xstart, config.ystart), (7, 4));
    }
}
