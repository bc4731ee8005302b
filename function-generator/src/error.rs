//! Startup failures.
//!
//! Only resource acquisition can fail fatally. Bus errors during normal
//! operation drop the current sample and are never surfaced here.

use embedded_hal::{digital, spi};

/// Failure while bringing up or tearing down the output hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The DAC did not accept a command.
    #[error("DAC bus transfer failed: {0}")]
    Bus(spi::ErrorKind),
    /// The LDAC pin could not be driven.
    #[error("LDAC pin could not be driven: {0}")]
    Pin(digital::ErrorKind),
    /// The auxiliary power rail could not be switched.
    #[error("auxiliary power rail could not be switched")]
    Power,
}

impl Error {
    pub(crate) fn bus<E: spi::Error>(e: E) -> Self {
        Error::Bus(e.kind())
    }

    pub(crate) fn pin<E: digital::Error>(e: E) -> Self {
        Error::Pin(e.kind())
    }
}
