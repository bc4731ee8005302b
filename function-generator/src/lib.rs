//! # function-generator
//!
//! A `no_std`, zero-allocation wavetable function generator. It keeps a
//! small editable parameter set (shape, frequency, magnitude, offset),
//! advances a phase accumulator from wall-clock deltas, samples a
//! precomputed waveform table and pushes the resulting voltage to an
//! MCP4901 8-bit DAC over SPI.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Data | [`waveform`] | Precomputed normalized waveform tables |
//! | State | [`params`] | Bounded, step-edited generator parameters |
//! | DSP | [`synth`] | Time-based phase accumulator and sample transform |
//! | Device | [`dac`] | Voltage quantizer and MCP4901 SPI driver |
//! | Input | [`input`] | Key events, key mapping, bounded event queue |
//! | Traits | [`control`] | Collaborator traits (DAC, power rail, clock, display) |
//! | Loop | [`generator`] | Cooperative control loop and lifecycle |
//!
//! ## Quick start
//!
//! ```ignore
//! use function_generator::dac::Mcp4901;
//! use function_generator::generator::FunctionGenerator;
//! use function_generator::input::{EventQueue, QueueInput};
//! use function_generator::waveform::WaveformTables;
//! use static_cell::StaticCell;
//!
//! static EVENTS: EventQueue = EventQueue::new();
//! static TABLES: StaticCell<WaveformTables> = StaticCell::new();
//!
//! let tables: &'static WaveformTables = WaveformTables::init_static(&TABLES);
//! let dac = Mcp4901::new(spi_device);
//! let generator = FunctionGenerator::start(dac, ldac_pin, otg_rail, clock, tables)?;
//!
//! // The input ISR calls `EVENTS.post(event)`.
//! let parts = generator.run(&mut QueueInput::new(&EVENTS, delay), &mut screen);
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `defmt` | no | Logging through `defmt`, `defmt::Format` on public types |
//!
//! ## Output parameters
//!
//! - **Table length:** 1000 samples ([`constants::WAVEFORM_SAMPLES`])
//! - **DAC resolution:** 8 bits ([`constants::DAC_MAX_CODE`])
//! - **Reference voltage:** 5.0 V ([`constants::DAC_REFERENCE_VOLTAGE`])
//! - **Input poll timeout:** 100 ms, **display refresh:** 200 ms

#![no_std]

#[macro_use]
mod fmt;

pub mod constants;
pub mod control;
pub mod dac;
pub mod error;
pub mod generator;
pub mod input;
pub mod params;
pub mod synth;
pub mod waveform;

pub use error::Error;
