//! RP2350 DAC transport and laser gate: MCP4922-style dual DAC on SPI0,
//! laser on a plain GPIO.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus as _;
use pico_galvo_hal::{DacTransport, LaserGate};
use rp235x_hal as hal;

/// DAC transport error for the RP2350 platform.
#[derive(Debug, defmt::Format)]
pub enum TransportError {
    /// SPI bus error during the frame transfer.
    SpiBusError,
}

/// Pin type aliases for the DAC interface.
type SpiPins = (
    hal::gpio::Pin<hal::gpio::bank0::Gpio3, hal::gpio::FunctionSpi, hal::gpio::PullDown>,
    hal::gpio::Pin<hal::gpio::bank0::Gpio2, hal::gpio::FunctionSpi, hal::gpio::PullDown>,
);

pub type SpiBus = hal::spi::Spi<hal::spi::Enabled, hal::pac::SPI0, SpiPins, 8>;
pub type CsPin =
    hal::gpio::Pin<hal::gpio::bank0::Gpio5, hal::gpio::FunctionSioOutput, hal::gpio::PullDown>;
pub type LaserPin =
    hal::gpio::Pin<hal::gpio::bank0::Gpio9, hal::gpio::FunctionSioOutput, hal::gpio::PullDown>;

/// MCP4922-style transport: one 16-bit frame per CS window, MSB first.
pub struct Mcp4922Transport {
    spi: SpiBus,
    cs: CsPin,
}

impl Mcp4922Transport {
    pub fn new(spi: SpiBus, cs: CsPin) -> Self {
        Self { spi, cs }
    }
}

impl DacTransport for Mcp4922Transport {
    type Error = TransportError;

    fn write_frame(&mut self, frame: u16) -> Result<(), Self::Error> {
        let buf = frame.to_be_bytes();

        self.cs.set_low().unwrap();
        let result = self.spi.write(&buf);
        self.cs.set_high().unwrap();

        result.map_err(|_| TransportError::SpiBusError)
    }
}

/// Laser gate on a push-pull GPIO.
pub struct LaserOutput {
    pin: LaserPin,
}

impl LaserOutput {
    pub fn new(pin: LaserPin) -> Self {
        Self { pin }
    }
}

impl LaserGate for LaserOutput {
    fn set(&mut self, on: bool) {
        if on {
            self.pin.set_high().unwrap();
        } else {
            self.pin.set_low().unwrap();
        }
    }
}
