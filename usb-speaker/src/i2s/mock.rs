//! Software I2S transmitter for host tests.
//!
//! Records every frame and divider write. The FIFO level is whatever the
//! test sets, so each `service()` call pushes a predictable number of frames.

use crate::clock::FracDivider;

use super::I2sTx;

/// Frames recorded before the mock starts dropping them.
pub const MAX_SENT: usize = 512;

pub struct MockI2s {
    /// FIFO level reported to the player.
    pub level: usize,
    pub sent: [u32; MAX_SENT],
    pub sent_len: usize,
    pub prescale: Option<u8>,
    pub divider: Option<FracDivider>,
    pub divider_writes: usize,
    pub running: bool,
    pub starts: usize,
    pub stops: usize,
}

impl MockI2s {
    pub fn new() -> Self {
        MockI2s {
            level: 0,
            sent: [0; MAX_SENT],
            sent_len: 0,
            prescale: None,
            divider: None,
            divider_writes: 0,
            running: false,
            starts: 0,
            stops: 0,
        }
    }

    pub fn sent(&self) -> &[u32] {
        &self.sent[..self.sent_len]
    }

    pub fn clear_sent(&mut self) {
        self.sent_len = 0;
    }
}

impl I2sTx for MockI2s {
    fn tx_level(&self) -> usize {
        self.level
    }

    fn send(&mut self, word: u32) {
        if self.sent_len < MAX_SENT {
            self.sent[self.sent_len] = word;
            self.sent_len += 1;
        }
    }

    fn set_bit_rate(&mut self, prescale: u8) {
        self.prescale = Some(prescale);
    }

    fn set_divider(&mut self, divider: FracDivider) {
        self.divider = Some(divider);
        self.divider_writes += 1;
    }

    fn start(&mut self) {
        self.running = true;
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.running = false;
        self.stops += 1;
    }
}
