//! Traits for the collaborators the control loop drives but does not own.

use crate::params::GeneratorState;

/// Voltage output device (e.g. the MCP4901 DAC).
pub trait AnalogOutput {
    /// Error type for bus transfers.
    type Error: embedded_hal::spi::Error;

    /// Output `voltage`, saturating to the device range. Returns the code sent.
    fn write_voltage(&mut self, voltage: f32) -> Result<u8, Self::Error>;

    /// Silence the output with the device's quiet command.
    fn shutdown(&mut self) -> Result<(), Self::Error>;
}

/// Auxiliary supply rail powering the output stage (e.g. a 5 V boost/OTG rail).
pub trait PowerRail {
    type Error: core::fmt::Debug;

    fn enable(&mut self) -> Result<(), Self::Error>;

    fn disable(&mut self) -> Result<(), Self::Error>;
}

/// Monotonic millisecond counter. May wrap at `u32::MAX`.
pub trait Clock {
    fn now_ms(&mut self) -> u32;
}

/// Screen that renders the generator panel.
///
/// The control loop only requests redraws; layout and drawing belong to
/// the implementation.
pub trait DisplaySink {
    fn redraw(&mut self, state: &GeneratorState);
}
