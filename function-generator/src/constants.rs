/// Number of samples in one period of every waveform table.
pub const WAVEFORM_SAMPLES: usize = 1000;

/// Number of selectable waveform shapes.
pub const NUM_WAVEFORMS: usize = 5;

/// Number of editable parameter slots (shape, frequency, magnitude, offset).
pub const NUM_PARAMS: usize = 4;

/// Inclusive bounds and step size of one numeric parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamBounds {
    /// Lowest reachable value.
    pub min: f32,
    /// Highest reachable value.
    pub max: f32,
    /// Amount added or removed per key press; values stay on this grid.
    pub step: f32,
}

/// Output frequency in Hz.
pub const FREQUENCY_BOUNDS: ParamBounds = ParamBounds { min: 0.0, max: 100.0, step: 0.1 };

/// Peak magnitude in volts.
pub const MAGNITUDE_BOUNDS: ParamBounds = ParamBounds { min: 0.0, max: 5.0, step: 0.1 };

/// DC offset in volts.
pub const OFFSET_BOUNDS: ParamBounds = ParamBounds { min: -5.0, max: 5.0, step: 0.1 };

/// Highest code accepted by the 8-bit DAC.
pub const DAC_MAX_CODE: u8 = u8::MAX;

/// Default DAC reference voltage (full scale) in volts.
pub const DAC_REFERENCE_VOLTAGE: f32 = 5.0;

/// Code written together with the shutdown command.
pub const QUIET_CODE: u8 = 0;

/// Longest wait for an input event per loop iteration, in milliseconds.
pub const INPUT_POLL_TIMEOUT_MS: u32 = 100;

/// Minimum time between display redraw requests, in milliseconds.
pub const DISPLAY_REFRESH_PERIOD_MS: u32 = 200;

/// Total slots in the input event queue. Usable capacity is one less.
pub const EVENT_QUEUE_SLOTS: usize = 9;
