//! Waveform shapes and their precomputed sample tables.
//!
//! Every shape owns one period of [`WAVEFORM_SAMPLES`](crate::constants::WAVEFORM_SAMPLES)
//! normalized samples. Periodic shapes span `[-1, 1]`; [`WaveformShape::Constant`]
//! is a flat `1.0` so that magnitude alone sets the DC level.

mod tables;

pub use tables::WaveformTables;

/// Selectable output waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaveformShape {
    Constant = 0,
    Sine = 1,
    Sawtooth = 2,
    Triangle = 3,
    Square = 4,
}

impl WaveformShape {
    /// All shapes in selection order.
    pub const ALL: [WaveformShape; crate::constants::NUM_WAVEFORMS] = [
        WaveformShape::Constant,
        WaveformShape::Sine,
        WaveformShape::Sawtooth,
        WaveformShape::Triangle,
        WaveformShape::Square,
    ];

    /// Short label shown on the display.
    pub const fn name(self) -> &'static str {
        match self {
            WaveformShape::Constant => "DC",
            WaveformShape::Sine => "Sine",
            WaveformShape::Sawtooth => "Saw",
            WaveformShape::Triangle => "Tri",
            WaveformShape::Square => "Square",
        }
    }

    /// Position of this shape in [`ALL`](Self::ALL).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Next shape, wrapping from the last back to the first.
    pub const fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous shape, wrapping from the first to the last.
    pub const fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}
