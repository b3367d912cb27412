//! Hardware vertical scrolling.

use crate::instruction::Instruction;
use crate::interface::Interface;
use crate::{Error, ST7735};

/// Refresh order of the scroll area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    #[default]
    TopToBottom,
    BottomToTop,
}

impl<DI> ST7735<DI>
where
    DI: Interface,
{
    /// Splits the screen into a fixed top band, a scroll area and a fixed
    /// bottom band, and sets the refresh direction.
    pub fn set_scroll_definition(
        &mut self,
        top_fixed: u16,
        bottom_fixed: u16,
        direction: ScrollDirection,
    ) -> Result<(), Error<DI::Error>> {
        self.ensure_initialized()?;
        let height = self.height();
        let scroll_height = top_fixed
            .checked_add(bottom_fixed)
            .and_then(|fixed| height.checked_sub(fixed))
            .ok_or(Error::InvalidScrollArea {
                top: top_fixed,
                bottom: bottom_fixed,
                height,
            })?;
        log::debug!(
            "scroll area: {} fixed, {} scrolling, {} fixed, {:?}",
            top_fixed,
            scroll_height,
            bottom_fixed,
            direction
        );

        let [t0, t1] = top_fixed.to_be_bytes();
        let [s0, s1] = scroll_height.to_be_bytes();
        let [b0, b1] = bottom_fixed.to_be_bytes();
        self.write_command(Instruction::VSCRDEF, &[t0, t1, s0, s1, b0, b1])?;

        let masks = self.config.variant.scroll_masks();
        let madctl = match direction {
            ScrollDirection::TopToBottom => masks.top_to_bottom,
            ScrollDirection::BottomToTop => masks.bottom_to_top,
        };
        self.write_madctl(madctl)
    }

    /// Sets the first line shown at the top of the scroll area. Offsets are
    /// absolute; animate by passing successive values.
    pub fn vertical_scroll(&mut self, offset: u16) -> Result<(), Error<DI::Error>> {
        self.ensure_initialized()?;
        self.write_command(Instruction::VSCRSADD, &offset.to_be_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DisplayConfig, PanelVariant};
    use crate::test_support::{RecordingInterface, canvas, display};
    use alloc::vec;

    #[test]
    fn definition_then_repeated_offsets() {
        let mut display = canvas(128, 160);
        display
            .set_scroll_definition(10, 10, ScrollDirection::TopToBottom)
            .unwrap();
        display.vertical_scroll(5).unwrap();
        display.vertical_scroll(5).unwrap();
        assert_eq!(display.interface.count(Instruction::VSCRDEF), 1);
        assert_eq!(
            display.interface.data_of(Instruction::VSCRDEF),
            vec![vec![0, 10, 0, 140, 0, 10]]
        );
        assert_eq!(
            display.interface.data_of(Instruction::VSCRSADD),
            vec![vec![0, 5], vec![0, 5]]
        );
    }

    #[test]
    fn direction_mask_depends_on_variant() {
        let cases = [
            (PanelVariant::GreenTab, 0xD8, 0xC8),
            (PanelVariant::RedTab, 0xD0, 0xC0),
            (PanelVariant::BlackTab, 0x18, 0x08),
        ];
        for (variant, up, down) in cases {
            let mut display = display(DisplayConfig::new(variant));
            display
                .set_scroll_definition(0, 0, ScrollDirection::BottomToTop)
                .unwrap();
            display
                .set_scroll_definition(0, 0, ScrollDirection::TopToBottom)
                .unwrap();
            assert_eq!(
                display.interface.data_of(Instruction::MADCTL),
                vec![vec![up], vec![down]]
            );
        }
    }

    #[test]
    fn oversized_fixed_areas_are_rejected() {
        let mut display = canvas(128, 160);
        assert_eq!(
            display.set_scroll_definition(100, 61, ScrollDirection::TopToBottom),
            Err(Error::InvalidScrollArea {
                top: 100,
                bottom: 61,
                height: 160
            })
        );
        assert!(display.interface.transactions.is_empty());
        display
            .set_scroll_definition(100, 60, ScrollDirection::TopToBottom)
            .unwrap();
    }

    #[test]
    fn scrolling_requires_init() {
        let mut display = ST7735::new(RecordingInterface::new(), PanelVariant::RedTab);
        assert_eq!(display.vertical_scroll(1), Err(Error::NotInitialized));
    }
}
