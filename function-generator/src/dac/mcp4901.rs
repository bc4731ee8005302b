//! MCP4901 8-bit voltage-output DAC driver.
//!
//! The driver is generic over any [`embedded_hal::spi::SpiDevice`]. Each
//! command is a single `SpiDevice::write`, so chip-select is asserted,
//! the two bytes are clocked out and the bus is released again on every
//! path, including transfer errors. Transfer timeouts are enforced by the
//! `SpiDevice` implementation.
//!
//! # Example
//!
//! ```ignore
//! let mut dac = Mcp4901::new(spi_device);
//! dac.write_voltage(1.0)?;   // code 51 at 5 V reference
//! dac.shutdown()?;           // quiet code, output stage powered down
//! ```

use embedded_hal::spi::SpiDevice;

use super::{frame, quantize};
use crate::constants::{DAC_REFERENCE_VOLTAGE, QUIET_CODE};
use crate::control::AnalogOutput;

/// Static control bits applied to every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputMode {
    /// Buffer the VREF input (BUF bit).
    pub buffered: bool,
    /// 1× output gain when `true`, 2× when `false` (GA bit).
    pub unity_gain: bool,
}

impl Default for OutputMode {
    /// Unbuffered reference, 1× gain.
    fn default() -> Self {
        OutputMode {
            buffered: false,
            unity_gain: true,
        }
    }
}

/// MCP4901 DAC driver.
pub struct Mcp4901<SPI> {
    spi: SPI,
    /// Voltage corresponding to one step above the maximum code.
    reference_voltage: f32,
    mode: OutputMode,
}

impl<SPI> Mcp4901<SPI>
where
    SPI: SpiDevice,
{
    /// Create a driver for a DAC referenced to 5.0 V.
    pub fn new(spi: SPI) -> Self {
        Self::with_reference(spi, DAC_REFERENCE_VOLTAGE)
    }

    /// Create a driver for a DAC with a specific reference voltage.
    pub fn with_reference(spi: SPI, reference_voltage: f32) -> Self {
        Self {
            spi,
            reference_voltage,
            mode: OutputMode::default(),
        }
    }

    pub fn reference_voltage(&self) -> f32 {
        self.reference_voltage
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    /// Send one raw command.
    ///
    /// `shdn` is the active-low SHDN bit: `false` powers the output down.
    pub fn write(
        &mut self,
        code: u8,
        buffered: bool,
        gain: bool,
        shdn: bool,
    ) -> Result<(), SPI::Error> {
        let command = frame(code, buffered, gain, shdn);
        self.spi.write(&command)
    }

    /// Output `code` with the configured mode and the output stage active.
    pub fn write_code(&mut self, code: u8) -> Result<(), SPI::Error> {
        self.write(code, self.mode.buffered, self.mode.unity_gain, true)
    }

    /// Quantize `voltage`, output it, and return the code that was sent.
    pub fn write_voltage(&mut self, voltage: f32) -> Result<u8, SPI::Error> {
        let code = quantize(voltage, self.reference_voltage);
        self.write_code(code)?;
        Ok(code)
    }

    /// Write the quiet code with SHDN asserted.
    pub fn shutdown(&mut self) -> Result<(), SPI::Error> {
        self.write(QUIET_CODE, self.mode.buffered, self.mode.unity_gain, false)
    }

    /// Give back the SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> AnalogOutput for Mcp4901<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    fn write_voltage(&mut self, voltage: f32) -> Result<u8, Self::Error> {
        Mcp4901::write_voltage(self, voltage)
    }

    fn shutdown(&mut self) -> Result<(), Self::Error> {
        Mcp4901::shutdown(self)
    }
}
