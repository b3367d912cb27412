//! Bus transport between the driver and the controller.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::SpiDevice;

/// Byte-level access to the controller.
///
/// Every call is one framed transfer: command bytes go out with DC low,
/// data bytes with DC high, each under its own chip-select assertion.
pub trait Interface {
    type Error;

    /// Sends a single command byte.
    fn write_command(&mut self, command: u8) -> Result<(), Self::Error>;

    /// Sends data bytes belonging to the last command.
    fn write_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Hardware reset. Interfaces without a reset line do nothing.
    fn reset<D: DelayNs>(&mut self, _delay: &mut D) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Where a transfer failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceError<SpiE> {
    Spi(SpiE),
    DataCommandPin,
    ResetPin,
}

/// Placeholder for panels whose reset line is tied high.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoResetPin;

impl digital::ErrorType for NoResetPin {
    type Error = Infallible;
}

impl OutputPin for NoResetPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// SPI transport with a data/command pin and an optional reset pin.
pub struct SpiInterface<SPI, DC, RST = NoResetPin> {
    spi: SPI,
    dc: DC,
    rst: Option<RST>,
}

impl<SPI, DC> SpiInterface<SPI, DC, NoResetPin>
where
    SPI: SpiDevice,
    DC: OutputPin,
{
    /// Creates a transport for a panel without a reset line.
    pub fn new(spi: SPI, dc: DC) -> Self {
        SpiInterface { spi, dc, rst: None }
    }
}

impl<SPI, DC, RST> SpiInterface<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Creates a transport that drives the reset line in [`Interface::reset`].
    pub fn with_reset(spi: SPI, dc: DC, rst: RST) -> Self {
        SpiInterface {
            spi,
            dc,
            rst: Some(rst),
        }
    }

    /// Gives the bus and pins back.
    pub fn release(self) -> (SPI, DC, Option<RST>) {
        (self.spi, self.dc, self.rst)
    }
}

impl<SPI, DC, RST> Interface for SpiInterface<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    type Error = InterfaceError<SPI::Error>;

    fn write_command(&mut self, command: u8) -> Result<(), Self::Error> {
        self.dc
            .set_low()
            .map_err(|_| InterfaceError::DataCommandPin)?;
        self.spi.write(&[command]).map_err(InterfaceError::Spi)
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if data.is_empty() {
            return Ok(());
        }
        self.dc
            .set_high()
            .map_err(|_| InterfaceError::DataCommandPin)?;
        self.spi.write(data).map_err(InterfaceError::Spi)
    }

    fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Self::Error> {
        let Some(rst) = self.rst.as_mut() else {
            return Ok(());
        };
        rst.set_high().map_err(|_| InterfaceError::ResetPin)?;
        delay.delay_ms(10);
        rst.set_low().map_err(|_| InterfaceError::ResetPin)?;
        delay.delay_ms(10);
        rst.set_high().map_err(|_| InterfaceError::ResetPin)?;
        delay.delay_ms(10);
        Ok(())
    }
}
