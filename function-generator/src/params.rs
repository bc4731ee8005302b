//! Editable generator parameters.
//!
//! [`GeneratorState`] holds the four user-editable parameters, the slot that
//! currently receives up/down adjustments, and the output-enabled flag.
//! Numeric parameters saturate at their bounds; the shape and slot selectors
//! wrap.

use crate::constants::{
    ParamBounds, FREQUENCY_BOUNDS, MAGNITUDE_BOUNDS, NUM_PARAMS, OFFSET_BOUNDS,
};
use crate::waveform::WaveformShape;

/// Parameter slot receiving increment/decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamSlot {
    Shape = 0,
    Frequency = 1,
    Magnitude = 2,
    Offset = 3,
}

impl ParamSlot {
    /// All slots in on-screen order.
    pub const ALL: [ParamSlot; NUM_PARAMS] = [
        ParamSlot::Shape,
        ParamSlot::Frequency,
        ParamSlot::Magnitude,
        ParamSlot::Offset,
    ];

    /// Column label shown on the display.
    pub const fn label(self) -> &'static str {
        match self {
            ParamSlot::Shape => "Type",
            ParamSlot::Frequency => "Freq",
            ParamSlot::Magnitude => "Mag",
            ParamSlot::Offset => "Offset",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % NUM_PARAMS]
    }

    pub const fn previous(self) -> Self {
        Self::ALL[(self.index() + NUM_PARAMS - 1) % NUM_PARAMS]
    }

    /// Bounds of the numeric parameter in this slot, `None` for [`ParamSlot::Shape`].
    pub const fn bounds(self) -> Option<ParamBounds> {
        match self {
            ParamSlot::Shape => None,
            ParamSlot::Frequency => Some(FREQUENCY_BOUNDS),
            ParamSlot::Magnitude => Some(MAGNITUDE_BOUNDS),
            ParamSlot::Offset => Some(OFFSET_BOUNDS),
        }
    }
}

/// Result of [`GeneratorState::toggle_output`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputTransition {
    /// Output went off → on. The phase cursor must restart.
    Enabled,
    /// Output went on → off. The DAC must be silenced.
    Disabled,
}

/// Apply one signed step to `value`, snap it to the step grid and saturate
/// at the bounds.
fn step_clamped(value: f32, bounds: ParamBounds, direction: f32) -> f32 {
    let stepped = libm::roundf(value / bounds.step + direction) * bounds.step;
    if stepped > bounds.max {
        bounds.max
    } else if stepped < bounds.min {
        bounds.min
    } else {
        stepped
    }
}

/// User-editable generator settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GeneratorState {
    shape: WaveformShape,
    selected: ParamSlot,
    frequency: f32,
    magnitude: f32,
    offset: f32,
    output_enabled: bool,
}

impl Default for GeneratorState {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorState {
    /// DC at 1 V, 1 Hz, no offset, output off, shape slot selected.
    pub const fn new() -> Self {
        GeneratorState {
            shape: WaveformShape::Constant,
            selected: ParamSlot::Shape,
            frequency: 1.0,
            magnitude: 1.0,
            offset: 0.0,
            output_enabled: false,
        }
    }

    pub fn shape(&self) -> WaveformShape {
        self.shape
    }

    pub fn selected(&self) -> ParamSlot {
        self.selected
    }

    /// Output frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Peak magnitude in volts.
    pub fn magnitude(&self) -> f32 {
        self.magnitude
    }

    /// DC offset in volts.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn output_enabled(&self) -> bool {
        self.output_enabled
    }

    /// Current value of a numeric slot, `None` for [`ParamSlot::Shape`].
    pub fn value(&self, slot: ParamSlot) -> Option<f32> {
        match slot {
            ParamSlot::Shape => None,
            ParamSlot::Frequency => Some(self.frequency),
            ParamSlot::Magnitude => Some(self.magnitude),
            ParamSlot::Offset => Some(self.offset),
        }
    }

    pub fn select_next(&mut self) {
        self.selected = self.selected.next();
        debug!("selected {}", self.selected);
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.previous();
        debug!("selected {}", self.selected);
    }

    /// Step the selected parameter up (next shape for the shape slot).
    pub fn increment(&mut self) {
        self.adjust(1.0);
    }

    /// Step the selected parameter down (previous shape for the shape slot).
    pub fn decrement(&mut self) {
        self.adjust(-1.0);
    }

    fn adjust(&mut self, direction: f32) {
        match self.selected {
            ParamSlot::Shape => {
                self.shape = if direction > 0.0 {
                    self.shape.next()
                } else {
                    self.shape.previous()
                };
                debug!("shape = {}", self.shape);
            }
            ParamSlot::Frequency => {
                self.frequency = step_clamped(self.frequency, FREQUENCY_BOUNDS, direction);
                debug!("frequency = {} Hz", self.frequency);
            }
            ParamSlot::Magnitude => {
                self.magnitude = step_clamped(self.magnitude, MAGNITUDE_BOUNDS, direction);
                debug!("magnitude = {} V", self.magnitude);
            }
            ParamSlot::Offset => {
                self.offset = step_clamped(self.offset, OFFSET_BOUNDS, direction);
                debug!("offset = {} V", self.offset);
            }
        }
    }

    /// Flip the output-enabled flag and report which way it went.
    pub fn toggle_output(&mut self) -> OutputTransition {
        self.output_enabled = !self.output_enabled;
        if self.output_enabled {
            OutputTransition::Enabled
        } else {
            OutputTransition::Disabled
        }
    }

    /// Force the output flag off. Returns `true` if it was on.
    pub fn disable_output(&mut self) -> bool {
        core::mem::replace(&mut self.output_enabled, false)
    }
}
