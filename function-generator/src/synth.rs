//! Time-based phase accumulator and sample transform.
//!
//! Unlike a fixed-rate oscillator, the phase here advances by the wall-clock
//! time elapsed since the previous tick: `phase += frequency × Δt × N`. Loop
//! latency from input polling and redraws therefore changes the effective
//! sample rate but never the output frequency. When `frequency × Δt × N`
//! exceeds one sample the intermediate samples are skipped.
//!
//! Table lookup truncates the phase to the sample below it; there is no
//! interpolation between entries.

use crate::params::GeneratorState;
use crate::waveform::WaveformTables;

/// Advance `phase` by `frequency × elapsed_ms / 1000 × len` and wrap into `[0, len)`.
pub fn advance_phase(phase: f32, frequency: f32, elapsed_ms: u32, len: usize) -> f32 {
    let n = len as f32;
    // Multiply before dividing so whole-millisecond steps stay exact.
    let next = phase + frequency * elapsed_ms as f32 * n / 1000.0;
    let wrapped = libm::fmodf(next, n);
    // fmodf keeps the sign of its input and may round up to `n`.
    if wrapped < 0.0 {
        wrapped + n
    } else if wrapped >= n {
        0.0
    } else {
        wrapped
    }
}

/// Fractional position within one waveform period plus the time it was last advanced.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseCursor {
    phase: f32,
    last_ms: u32,
}

impl PhaseCursor {
    pub const fn new(now_ms: u32) -> Self {
        PhaseCursor { phase: 0.0, last_ms: now_ms }
    }

    /// Current phase in samples, `0 <= phase < N`.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn last_ms(&self) -> u32 {
        self.last_ms
    }

    /// Restart at phase zero with `now_ms` as the reference time.
    pub fn reset(&mut self, now_ms: u32) {
        self.phase = 0.0;
        self.last_ms = now_ms;
    }

    /// Advance to `now_ms` and return the truncated sample index.
    ///
    /// The millisecond counter may wrap; the difference is taken modulo 2³².
    pub fn advance(&mut self, frequency: f32, now_ms: u32, len: usize) -> usize {
        let elapsed_ms = now_ms.wrapping_sub(self.last_ms);
        self.last_ms = now_ms;
        self.phase = advance_phase(self.phase, frequency, elapsed_ms, len);
        self.index(len)
    }

    /// `floor(phase)`, clamped to a valid table index.
    pub fn index(&self, len: usize) -> usize {
        let i = libm::floorf(self.phase) as usize;
        i.min(len - 1)
    }
}

/// Synthesizer run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SynthState {
    /// Output disabled: no phase advance, no samples.
    Idle,
    /// Output enabled: one sample per tick.
    Running,
}

/// Voltage produced by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Table index that was read.
    pub index: usize,
    /// `offset + magnitude × table[index]`, in volts.
    pub voltage: f32,
}

/// Phase accumulator driving table lookups.
///
/// # Example
/// ```ignore
/// let tables = WaveformTables::build();
/// let mut synth = Synthesizer::new(&tables);
/// synth.start(clock.now_ms());
/// if let Some(sample) = synth.tick(&state, clock.now_ms()) {
///     dac.write_voltage(sample.voltage)?;
/// }
/// ```
pub struct Synthesizer<'t> {
    tables: &'t WaveformTables,
    cursor: PhaseCursor,
    state: SynthState,
}

impl<'t> Synthesizer<'t> {
    /// Create an idle synthesizer reading from `tables`.
    pub fn new(tables: &'t WaveformTables) -> Self {
        Synthesizer {
            tables,
            cursor: PhaseCursor::new(0),
            state: SynthState::Idle,
        }
    }

    pub fn state(&self) -> SynthState {
        self.state
    }

    pub fn cursor(&self) -> &PhaseCursor {
        &self.cursor
    }

    /// Idle → Running. Phase restarts at zero from `now_ms`.
    pub fn start(&mut self, now_ms: u32) {
        self.cursor.reset(now_ms);
        self.state = SynthState::Running;
    }

    /// Running → Idle. Phase stops advancing.
    pub fn stop(&mut self) {
        self.state = SynthState::Idle;
    }

    /// Advance to `now_ms` and compute the output voltage.
    ///
    /// Returns `None` while idle.
    pub fn tick(&mut self, params: &GeneratorState, now_ms: u32) -> Option<Sample> {
        if self.state == SynthState::Idle {
            return None;
        }
        let index = self
            .cursor
            .advance(params.frequency(), now_ms, self.tables.len());
        let raw = self.tables.sample(params.shape(), index);
        let voltage = params.offset() + params.magnitude() * raw;
        trace!("tick: phase={} index={} v={}", self.cursor.phase(), index, voltage);
        Some(Sample { index, voltage })
    }
}
