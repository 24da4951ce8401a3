//! I2S transmitter seam.
//!
//! The player drives the hardware only through [`I2sTx`], so the pipeline
//! runs unchanged against a register-level driver on target and against
//! [`mock::MockI2s`] in tests.

use crate::clock::FracDivider;

#[cfg(test)]
pub(crate) mod mock;

/// Transmit half of an I2S peripheral with an X/Y fractional rate divider.
pub trait I2sTx {
    /// Frames currently waiting in the transmit FIFO.
    fn tx_level(&self) -> usize;

    /// Push one packed stereo frame into the transmit FIFO.
    fn send(&mut self, word: u32);

    /// Program the BITRATE prescale (`N - 1`).
    fn set_bit_rate(&mut self, prescale: u8);

    /// Program the X/Y fractional rate divider.
    ///
    /// Called from the FIFO interrupt to nudge playback speed, so it must
    /// not stop the clock.
    fn set_divider(&mut self, divider: FracDivider);

    /// Start the transmitter: unmute, run the clock, unmask the FIFO
    /// interrupt.
    fn start(&mut self);

    /// Stop the transmitter and mask the FIFO interrupt.
    fn stop(&mut self);
}
