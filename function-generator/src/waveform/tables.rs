//! One-period lookup tables for every [`WaveformShape`].
//!
//! Tables are computed once at startup and only read afterwards, so a single
//! instance is shared by reference for the lifetime of the program. On target
//! the tables live in a `static` filled in place with
//! [`WaveformTables::init_static`]; [`WaveformTables::build`] returns them by
//! value and is meant for hosts with a large stack.

use core::f32::consts::PI;
use core::mem::MaybeUninit;

use static_cell::StaticCell;

use super::WaveformShape;
use crate::constants::{NUM_WAVEFORMS, WAVEFORM_SAMPLES};

/// Precomputed samples for all waveform shapes.
pub struct WaveformTables {
    samples: [[f32; WAVEFORM_SAMPLES]; NUM_WAVEFORMS],
}

impl WaveformTables {
    /// Compute all tables by value.
    pub fn build() -> Self {
        let mut tables = WaveformTables {
            samples: [[0.0f32; WAVEFORM_SAMPLES]; NUM_WAVEFORMS],
        };
        tables.fill();
        tables
    }

    /// Compute all tables directly into `slot`, without a temporary.
    pub fn init(slot: &mut MaybeUninit<Self>) -> &mut Self {
        let ptr = slot.as_mut_ptr();
        // SAFETY: the struct is plain `f32`s and the all-zero pattern is 0.0,
        // so zeroing the slot fully initializes it.
        let tables = unsafe {
            ptr.write_bytes(0, 1);
            &mut *ptr
        };
        tables.fill();
        tables
    }

    /// Compute all tables into `cell` and share them for the rest of the program.
    ///
    /// # Panics
    ///
    /// Panics if `cell` was already initialized.
    pub fn init_static(cell: &'static StaticCell<Self>) -> &'static Self {
        Self::init(cell.uninit())
    }

    fn fill(&mut self) {
        for shape in WaveformShape::ALL {
            let table = &mut self.samples[shape.index()];
            for (i, slot) in table.iter_mut().enumerate() {
                *slot = Self::compute(shape, i);
            }
        }
        debug!("waveform tables built: {} samples per shape", WAVEFORM_SAMPLES);
    }

    fn compute(shape: WaveformShape, i: usize) -> f32 {
        let n = WAVEFORM_SAMPLES;
        let half = n / 2;
        match shape {
            WaveformShape::Constant => 1.0,
            WaveformShape::Sine => libm::sinf(2.0 * PI * i as f32 / n as f32),
            // Hits both extremes: -1 at index 0, +1 at index N-1.
            WaveformShape::Sawtooth => 2.0 * i as f32 / (n - 1) as f32 - 1.0,
            // Rises from -1 to +1 at the midpoint, then falls back.
            WaveformShape::Triangle => {
                if i <= half {
                    2.0 * i as f32 / half as f32 - 1.0
                } else {
                    1.0 - 2.0 * (i - half) as f32 / (n - half) as f32
                }
            }
            WaveformShape::Square => {
                if i < half {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }

    /// Sample `index` of `shape`'s table.
    ///
    /// # Panics
    ///
    /// Panics if `index >= WAVEFORM_SAMPLES`. Callers wrap the phase first.
    #[inline(always)]
    pub fn sample(&self, shape: WaveformShape, index: usize) -> f32 {
        self.samples[shape.index()][index]
    }

    /// Display label of `shape`.
    pub fn name(&self, shape: WaveformShape) -> &'static str {
        shape.name()
    }

    /// Number of samples per table.
    pub const fn len(&self) -> usize {
        WAVEFORM_SAMPLES
    }

    /// The whole table for `shape`.
    pub fn table(&self, shape: WaveformShape) -> &[f32; WAVEFORM_SAMPLES] {
        &self.samples[shape.index()]
    }
}
