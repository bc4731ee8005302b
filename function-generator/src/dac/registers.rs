//! MCP4901 command word layout.
//!
//! The device takes one 16-bit write command, MSB first:
//!
//! ```text
//!  15   14   13   12   11 ........ 4   3 .. 0
//! [0 ] [BUF] [GA] [SHDN] [D7 ....... D0] [x x x x]
//! ```
//!
//! - BUF  — 1 = buffered VREF input
//! - GA   — 1 = 1× output gain, 0 = 2×
//! - SHDN — active low: 0 powers the output stage down

/// Bit position of BUF within the first command byte.
pub const BUF_SHIFT: u8 = 6;

/// Bit position of GA within the first command byte.
pub const GAIN_SHIFT: u8 = 5;

/// Bit position of SHDN within the first command byte.
pub const SHDN_SHIFT: u8 = 4;

/// Data bits carried in the low nibble of the first byte.
pub const DATA_HIGH_SHIFT: u8 = 4;

/// Data bits carried in the high nibble of the second byte.
pub const DATA_LOW_SHIFT: u8 = 4;

/// Length of one command in bytes.
pub const COMMAND_LEN: usize = 2;
