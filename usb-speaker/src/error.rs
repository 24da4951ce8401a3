//! Crate error type.
//!
//! Only configuration and control-request failures are reported as errors.
//! Buffer overrun and underrun are recovered in place by the interrupt paths
//! and show up in the stream statistics instead.

/// Errors returned by the clock solver and the control-request handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// No prescale/X/Y combination reaches the requested bit clock from the
    /// reference clock. The rate cannot be supported on this board.
    #[error("no fractional divider reaches {sample_rate} Hz from a {reference_hz} Hz reference")]
    NoValidDivider {
        /// Requested sample rate in Hz.
        sample_rate: u32,
        /// Reference clock feeding the I2S peripheral, in Hz.
        reference_hz: u32,
    },

    /// The host asked for a rate above the maximum, or one with no profile.
    #[error("sample rate {0} Hz is not supported")]
    RateUnsupported(u32),

    /// A control-request payload was shorter than its encoding requires.
    #[error("control request payload too short ({0} bytes)")]
    ShortRequest(usize),
}
