//! Voltage quantization and the MCP4901 8-bit DAC driver.
//!
//! [`quantize`] maps a voltage onto the DAC's code range, saturating outside
//! `[0, full_scale]`. [`frame`] builds the bit-exact two-byte command that
//! [`Mcp4901`] sends over SPI.

pub(crate) mod registers;
mod mcp4901;

pub use mcp4901::{Mcp4901, OutputMode};

use crate::constants::DAC_MAX_CODE;
use registers as reg;

/// Map `voltage` to a DAC code: `round(voltage × (max_code + 1) / full_scale)`,
/// clamped to `[0, max_code]`.
///
/// Never fails; out-of-range and NaN voltages saturate (NaN maps to 0).
pub fn quantize(voltage: f32, full_scale: f32) -> u8 {
    let steps = DAC_MAX_CODE as f32 + 1.0;
    let scaled = libm::roundf(voltage * steps / full_scale);
    // Float-to-int `as` saturates and maps NaN to 0.
    (scaled as i32).clamp(0, DAC_MAX_CODE as i32) as u8
}

/// Build the two-byte command for `code` and the three control bits.
///
/// `byte0 = (buffered << 6) | (gain << 5) | (shdn << 4) | (code >> 4)`,
/// `byte1 = code << 4`.
pub fn frame(code: u8, buffered: bool, gain: bool, shdn: bool) -> [u8; reg::COMMAND_LEN] {
    [
        ((buffered as u8) << reg::BUF_SHIFT)
            | ((gain as u8) << reg::GAIN_SHIFT)
            | ((shdn as u8) << reg::SHDN_SHIFT)
            | (code >> reg::DATA_HIGH_SHIFT),
        code << reg::DATA_LOW_SHIFT,
    ]
}
