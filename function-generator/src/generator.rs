//! Cooperative control loop tying input, parameters, synthesis and output together.
//!
//! Each [`step`](FunctionGenerator::step):
//!
//! 1. waits up to the poll timeout for one input event and applies it,
//! 2. if output is enabled, runs one synthesizer tick and writes the sample,
//! 3. requests a redraw when the refresh period has elapsed.
//!
//! The loop owns all mutable state; the input queue is its only suspension
//! point. A failed DAC write drops that sample and the loop carries on.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::Error as _;

use crate::constants::{DISPLAY_REFRESH_PERIOD_MS, INPUT_POLL_TIMEOUT_MS};
use crate::control::{AnalogOutput, Clock, DisplaySink, PowerRail};
use crate::error::Error;
use crate::input::{Action, InputEvent, InputSource};
use crate::params::{GeneratorState, OutputTransition};
use crate::synth::Synthesizer;
use crate::waveform::WaveformTables;

/// Loop timing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Longest wait for an input event per iteration.
    pub poll_timeout_ms: u32,
    /// Minimum time between redraw requests.
    pub refresh_period_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            poll_timeout_ms: INPUT_POLL_TIMEOUT_MS,
            refresh_period_ms: DISPLAY_REFRESH_PERIOD_MS,
        }
    }
}

/// Whether the loop keeps going after an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Peripherals handed back after shutdown.
pub struct Parts<DAC, LDAC, PWR, CLK> {
    pub dac: DAC,
    pub ldac: LDAC,
    pub power: PWR,
    pub clock: CLK,
}

/// The running function generator.
///
/// Generic over the DAC, the LDAC pin, the auxiliary power rail and the
/// millisecond clock. Construct it with [`start`](Self::start), which brings
/// the hardware up; the control loop is never entered if that fails.
pub struct FunctionGenerator<'t, DAC, LDAC, PWR, CLK> {
    dac: DAC,
    ldac: LDAC,
    power: PWR,
    clock: CLK,
    state: GeneratorState,
    synth: Synthesizer<'t>,
    timing: Timing,
    last_refresh_ms: u32,
    dropped_samples: u32,
}

impl<'t, DAC, LDAC, PWR, CLK> FunctionGenerator<'t, DAC, LDAC, PWR, CLK>
where
    DAC: AnalogOutput,
    LDAC: OutputPin,
    PWR: PowerRail,
    CLK: Clock,
{
    /// Bring the hardware up with default [`Timing`].
    pub fn start(
        dac: DAC,
        ldac: LDAC,
        power: PWR,
        clock: CLK,
        tables: &'t WaveformTables,
    ) -> Result<Self, Error> {
        Self::start_with(dac, ldac, power, clock, tables, Timing::default())
    }

    /// Bring the hardware up: power rail on, LDAC low, DAC silenced.
    ///
    /// On failure the steps already taken are undone (best effort) and the
    /// peripherals are dropped.
    pub fn start_with(
        mut dac: DAC,
        mut ldac: LDAC,
        mut power: PWR,
        mut clock: CLK,
        tables: &'t WaveformTables,
        timing: Timing,
    ) -> Result<Self, Error> {
        info!("function generator starting");

        if power.enable().is_err() {
            error!("auxiliary power rail failed to enable");
            return Err(Error::Power);
        }

        // LDAC low latches every write straight to the output.
        if let Err(e) = ldac.set_low() {
            let e = Error::pin(e);
            error!("startup failed: {}", e);
            let _ = power.disable();
            return Err(e);
        }

        if let Err(e) = dac.shutdown() {
            let e = Error::bus(e);
            error!("startup failed: {}", e);
            let _ = ldac.set_high();
            let _ = power.disable();
            return Err(e);
        }

        let now = clock.now_ms();
        info!("function generator ready");
        Ok(FunctionGenerator {
            dac,
            ldac,
            power,
            clock,
            state: GeneratorState::new(),
            synth: Synthesizer::new(tables),
            timing,
            last_refresh_ms: now,
            dropped_samples: 0,
        })
    }

    pub fn state(&self) -> &GeneratorState {
        &self.state
    }

    pub fn synth(&self) -> &Synthesizer<'t> {
        &self.synth
    }

    pub fn dac(&self) -> &DAC {
        &self.dac
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Samples lost to failed bus writes since startup.
    pub fn dropped_samples(&self) -> u32 {
        self.dropped_samples
    }

    /// Apply one input event.
    pub fn handle_event(&mut self, event: InputEvent) -> LoopControl {
        match event.action() {
            Some(action) => self.apply(action),
            None => LoopControl::Continue,
        }
    }

    /// Apply one control action.
    pub fn apply(&mut self, action: Action) -> LoopControl {
        match action {
            Action::Exit => return LoopControl::Exit,
            Action::ToggleOutput => self.toggle_output(),
            Action::SelectNext => self.state.select_next(),
            Action::SelectPrevious => self.state.select_previous(),
            Action::Increment => self.state.increment(),
            Action::Decrement => self.state.decrement(),
        }
        LoopControl::Continue
    }

    /// Switch output on (phase restarts now) or off (one quiet write).
    pub fn toggle_output(&mut self) {
        match self.state.toggle_output() {
            OutputTransition::Enabled => {
                let now = self.clock.now_ms();
                self.synth.start(now);
                info!("output on");
            }
            OutputTransition::Disabled => {
                self.synth.stop();
                self.silence();
                info!("output off");
            }
        }
    }

    fn silence(&mut self) {
        if let Err(e) = self.dac.shutdown() {
            warn!("DAC shutdown write failed: {}", e.kind());
        }
    }

    /// Advance the synthesizer to now and write the sample.
    ///
    /// Returns the code written, or `None` when idle or the write failed.
    pub fn tick(&mut self) -> Option<u8> {
        let now = self.clock.now_ms();
        let sample = self.synth.tick(&self.state, now)?;
        match self.dac.write_voltage(sample.voltage) {
            Ok(code) => Some(code),
            Err(e) => {
                self.dropped_samples = self.dropped_samples.wrapping_add(1);
                warn!("dropped sample {}: {}", sample.index, e.kind());
                None
            }
        }
    }

    /// Ask `display` to redraw if the refresh period has elapsed.
    pub fn refresh_display<D: DisplaySink>(&mut self, display: &mut D) -> bool {
        let now = self.clock.now_ms();
        if now.wrapping_sub(self.last_refresh_ms) < self.timing.refresh_period_ms {
            return false;
        }
        display.redraw(&self.state);
        self.last_refresh_ms = now;
        true
    }

    /// Run one loop iteration.
    pub fn step<IN, D>(&mut self, input: &mut IN, display: &mut D) -> LoopControl
    where
        IN: InputSource,
        D: DisplaySink,
    {
        if let Some(event) = input.poll(self.timing.poll_timeout_ms) {
            trace!("input {}", event);
            if self.handle_event(event) == LoopControl::Exit {
                return LoopControl::Exit;
            }
        }
        self.tick();
        self.refresh_display(display);
        LoopControl::Continue
    }

    /// Run until the exit gesture, then shut down.
    pub fn run<IN, D>(mut self, input: &mut IN, display: &mut D) -> Parts<DAC, LDAC, PWR, CLK>
    where
        IN: InputSource,
        D: DisplaySink,
    {
        info!("entering control loop");
        while self.step(input, display) == LoopControl::Continue {}
        self.shutdown()
    }

    /// Silence the DAC, release LDAC, cut the power rail and hand the
    /// peripherals back.
    ///
    /// The quiet command is written even when output is already off.
    /// Failures here are logged; the peripherals are returned regardless.
    pub fn shutdown(mut self) -> Parts<DAC, LDAC, PWR, CLK> {
        if self.state.disable_output() {
            info!("output off");
        }
        self.synth.stop();
        self.silence();
        if let Err(e) = self.ldac.set_high() {
            error!("LDAC release failed: {}", Error::pin(e));
        }
        if self.power.disable().is_err() {
            error!("auxiliary power rail failed to disable");
        }
        info!("function generator stopped, {} samples dropped", self.dropped_samples);
        Parts {
            dac: self.dac,
            ldac: self.ldac,
            power: self.power,
            clock: self.clock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Key, PressKind};
    use crate::params::ParamSlot;
    use crate::synth::SynthState;
    use crate::waveform::WaveformShape;
    use core::cell::Cell;
    use embedded_hal::digital::{self, ErrorType};
    use embedded_hal::spi;

    // ── Mocks ─────────────────────────────────────────────────────────

    #[derive(Debug)]
    struct MockBusError;

    impl spi::Error for MockBusError {
        fn kind(&self) -> spi::ErrorKind {
            spi::ErrorKind::Other
        }
    }

    /// DAC that logs voltages and shutdowns.
    struct MockDac {
        voltages: [f32; 64],
        voltage_count: usize,
        shutdowns: usize,
        fail_writes: bool,
        fail_shutdown: bool,
    }

    impl MockDac {
        fn new() -> Self {
            Self {
                voltages: [0.0; 64],
                voltage_count: 0,
                shutdowns: 0,
                fail_writes: false,
                fail_shutdown: false,
            }
        }
    }

    impl AnalogOutput for MockDac {
        type Error = MockBusError;

        fn write_voltage(&mut self, voltage: f32) -> Result<u8, Self::Error> {
            if self.fail_writes {
                return Err(MockBusError);
            }
            self.voltages[self.voltage_count] = voltage;
            self.voltage_count += 1;
            Ok(crate::dac::quantize(voltage, 5.0))
        }

        fn shutdown(&mut self) -> Result<(), Self::Error> {
            if self.fail_shutdown {
                return Err(MockBusError);
            }
            self.shutdowns += 1;
            Ok(())
        }
    }

    #[derive(Debug)]
    struct MockPinError;

    impl digital::Error for MockPinError {
        fn kind(&self) -> digital::ErrorKind {
            digital::ErrorKind::Other
        }
    }

    /// Pin recording its level; `None` until first driven.
    struct MockPin {
        level: Option<bool>,
        fail: bool,
    }

    impl ErrorType for MockPin {
        type Error = MockPinError;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            if self.fail {
                return Err(MockPinError);
            }
            self.level = Some(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            if self.fail {
                return Err(MockPinError);
            }
            self.level = Some(true);
            Ok(())
        }
    }

    struct MockPower {
        on: bool,
        enables: usize,
        disables: usize,
        fail: bool,
    }

    impl PowerRail for MockPower {
        type Error = ();

        fn enable(&mut self) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.on = true;
            self.enables += 1;
            Ok(())
        }

        fn disable(&mut self) -> Result<(), ()> {
            self.on = false;
            self.disables += 1;
            Ok(())
        }
    }

    /// Clock reading a shared counter the test advances.
    struct MockClock<'a>(&'a Cell<u32>);

    impl Clock for MockClock<'_> {
        fn now_ms(&mut self) -> u32 {
            self.0.get()
        }
    }

    /// Input replaying a script; each poll advances time by `step_ms`.
    struct ScriptedInput<'a> {
        script: &'a [Option<InputEvent>],
        pos: usize,
        time: &'a Cell<u32>,
        step_ms: u32,
    }

    impl InputSource for ScriptedInput<'_> {
        fn poll(&mut self, _timeout_ms: u32) -> Option<InputEvent> {
            self.time.set(self.time.get() + self.step_ms);
            let event = self.script.get(self.pos).copied().flatten();
            self.pos += 1;
            event
        }
    }

    struct CountingDisplay {
        redraws: usize,
        last_enabled: bool,
    }

    impl DisplaySink for CountingDisplay {
        fn redraw(&mut self, state: &GeneratorState) {
            self.redraws += 1;
            self.last_enabled = state.output_enabled();
        }
    }

    fn pin() -> MockPin {
        MockPin { level: None, fail: false }
    }

    fn power() -> MockPower {
        MockPower { on: false, enables: 0, disables: 0, fail: false }
    }

    fn display() -> CountingDisplay {
        CountingDisplay { redraws: 0, last_enabled: false }
    }

    type TestGenerator<'t, 'c> = FunctionGenerator<'t, MockDac, MockPin, MockPower, MockClock<'c>>;

    fn started<'t, 'c>(tables: &'t WaveformTables, time: &'c Cell<u32>) -> TestGenerator<'t, 'c> {
        FunctionGenerator::start(MockDac::new(), pin(), power(), MockClock(time), tables).unwrap()
    }

    // ── Startup ───────────────────────────────────────────────────────

    #[test]
    fn start_powers_up_and_silences_dac() {
        let tables = WaveformTables::build();
        let time = Cell::new(0);
        let generator = started(&tables, &time);

        assert_eq!(generator.dac().shutdowns, 1);
        assert_eq!(*generator.state(), GeneratorState::new());
        let parts = generator.shutdown();
        assert_eq!(parts.power.enables, 1);
    }

    #[test]
    fn start_fails_on_power_rail() {
        let tables = WaveformTables::build();
        let time = Cell::new(0);
        let mut pwr = power();
        pwr.fail = true;
        let result = FunctionGenerator::start(MockDac::new(), pin(), pwr, MockClock(&time), &tables);
        assert_eq!(result.err(), Some(Error::Power));
    }

    #[test]
    fn start_fails_on_pin() {
        let tables = WaveformTables::build();
        let time = Cell::new(0);
        let bad_pin = MockPin { level: None, fail: true };
        let result = FunctionGenerator::start(MockDac::new(), bad_pin, power(), MockClock(&time), &tables);
        assert_eq!(result.err(), Some(Error::Pin(digital::ErrorKind::Other)));
    }

    #[test]
    fn start_fails_on_bus() {
        let tables = WaveformTables::build();
        let time = Cell::new(0);
        let mut dac = MockDac::new();
        dac.fail_shutdown = true;
        let result = FunctionGenerator::start(dac, pin(), power(), MockClock(&time), &tables);
        assert_eq!(result.err(), Some(Error::Bus(spi::ErrorKind::Other)));
    }

    // ── Events ────────────────────────────────────────────────────────

    #[test]
    fn events_edit_parameters() {
        let tables = WaveformTables::build();
        let time = Cell::new(0);
        let mut g = started(&tables, &time);

        g.handle_event(InputEvent::short(Key::Up));
        assert_eq!(g.state().shape(), WaveformShape::Sine);

        g.handle_event(InputEvent::repeat(Key::Right));
        assert_eq!(g.state().selected(), ParamSlot::Frequency);
        g.handle_event(InputEvent::short(Key::Up));
        assert!((g.state().frequency() - 1.1).abs() < 1e-5);

        g.handle_event(InputEvent::short(Key::Left));
        g.handle_event(InputEvent::short(Key::Left));
        assert_eq!(g.state().selected(), ParamSlot::Offset);
        g.handle_event(InputEvent::short(Key::Down));
        assert!((g.state().offset() + 0.1).abs() < 1e-5);

        // Unmapped combinations do nothing.
        let before = *g.state();
        g.handle_event(InputEvent::short(Key::Ok));
        g.handle_event(InputEvent::new(Key::Up, PressKind::Long));
        assert_eq!(*g.state(), before);
    }

    #[test]
    fn back_exits() {
        let tables = WaveformTables::build();
        let time = Cell::new(0);
        let mut g = started(&tables, &time);
        assert_eq!(g.handle_event(InputEvent::short(Key::Back)), LoopControl::Exit);
    }

    // ── Output toggling ───────────────────────────────────────────────

    #[test]
    fn toggle_on_resets_phase() {
        let tables = WaveformTables::build();
        let time = Cell::new(0);
        let mut g = started(&tables, &time);

        g.toggle_output();
        time.set(300);
        g.tick();
        assert!(g.synth().cursor().phase() > 0.0);

        g.toggle_output();
        time.set(1000);
        g.toggle_output();
        assert_eq!(g.synth().state(), SynthState::Running);
        assert_eq!(g.synth().cursor().phase(), 0.0);
        assert_eq!(g.synth().cursor().last_ms(), 1000);
    }

    #[test]
    fn toggle_off_writes_exactly_one_shutdown() {
        let tables = WaveformTables::build();
        let time = Cell::new(0);
        let mut g = started(&tables, &time);
        let at_start = g.dac().shutdowns;

        g.toggle_output();
        assert_eq!(g.dac().shutdowns, at_start);
        g.toggle_output();
        assert_eq!(g.dac().shutdowns, at_start + 1);

        // Idle ticks write nothing.
        time.set(500);
        assert_eq!(g.tick(), None);
        assert_eq!(g.dac().voltage_count, 0);
        assert_eq!(g.dac().shutdowns, at_start + 1);
    }

    // ── Ticks ─────────────────────────────────────────────────────────

    #[test]
    fn tick_writes_offset_plus_magnitude() {
        let tables = WaveformTables::build();
        let time = Cell::new(0);
        let mut g = started(&tables, &time);
        g.toggle_output();

        time.set(50);
        assert_eq!(g.tick(), Some(51));
        assert_eq!(g.dac().voltages[0], 1.0);
    }

    #[test]
    fn failed_write_drops_sample_and_continues() {
        let tables = WaveformTables::build();
        let time = Cell::new(0);
        let mut dac = MockDac::new();
        dac.fail_writes = true;
        let mut g = FunctionGenerator::start(dac, pin(), power(), MockClock(&time), &tables).unwrap();
        g.toggle_output();

        for t in 1..=3 {
            time.set(t * 10);
            assert_eq!(g.tick(), None);
        }
        assert_eq!(g.dropped_samples(), 3);
        // Phase still advanced: 30 ms at 1 Hz.
        assert!((g.synth().cursor().phase() - 30.0).abs() < 1e-3);
    }

    // ── Display refresh ───────────────────────────────────────────────

    #[test]
    fn display_refreshes_once_per_period() {
        let tables = WaveformTables::build();
        let time = Cell::new(0);
        let mut g = started(&tables, &time);
        let mut screen = display();

        time.set(199);
        assert!(!g.refresh_display(&mut screen));
        time.set(200);
        assert!(g.refresh_display(&mut screen));
        time.set(300);
        assert!(!g.refresh_display(&mut screen));
        time.set(400);
        assert!(g.refresh_display(&mut screen));
        assert_eq!(screen.redraws, 2);
    }

    // ── Full loop ─────────────────────────────────────────────────────

    #[test]
    fn run_until_back_then_shut_down() {
        let tables = WaveformTables::build();
        let time = Cell::new(0);
        let g = started(&tables, &time);
        let script = [
            Some(InputEvent::long(Key::Ok)),
            None,
            None,
            None,
            Some(InputEvent::short(Key::Back)),
            // Never reached.
            Some(InputEvent::long(Key::Ok)),
        ];
        let mut input = ScriptedInput { script: &script, pos: 0, time: &time, step_ms: 100 };
        let mut screen = display();

        let parts = g.run(&mut input, &mut screen);

        assert_eq!(input.pos, 5);
        // One sample on the toggle iteration plus three idle polls.
        assert_eq!(parts.dac.voltage_count, 4);
        // Startup + exit while running.
        assert_eq!(parts.dac.shutdowns, 2);
        assert_eq!(parts.ldac.level, Some(true));
        assert!(!parts.power.on);
        assert_eq!(parts.power.disables, 1);
        assert!(screen.redraws >= 1);
        assert!(screen.last_enabled);
    }

    #[test]
    fn shutdown_when_idle_still_writes_quiet_command() {
        let tables = WaveformTables::build();
        let time = Cell::new(0);
        let g = started(&tables, &time);
        let parts = g.shutdown();
        // Startup + exit.
        assert_eq!(parts.dac.shutdowns, 2);
        assert_eq!(parts.ldac.level, Some(true));
    }

    #[test]
    fn exit_after_toggling_off_silences_again() {
        let tables = WaveformTables::build();
        let time = Cell::new(0);
        let mut g = started(&tables, &time);
        g.toggle_output();
        g.toggle_output();
        assert_eq!(g.dac().shutdowns, 2);
        let parts = g.shutdown();
        assert_eq!(parts.dac.shutdowns, 3);
    }
}
