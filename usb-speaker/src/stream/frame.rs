//! Packed stereo frames.
//!
//! USB Audio Class 16-bit stereo arrives as little-endian `[L, R]` pairs of
//! `i16`. The I2S transmit FIFO takes one `u32` per frame in the same layout:
//!
//! - Lower 16 bits (bits 0–15): left channel sample
//! - Upper 16 bits (bits 16–31): right channel sample
//!
//! so a frame moves from the stream buffer to the FIFO without reordering.

use crate::constants::BYTES_PER_FRAME;

/// One stereo frame as written to the I2S FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct StereoFrame(pub u32);

impl StereoFrame {
    /// Both channels at zero.
    pub const SILENCE: StereoFrame = StereoFrame(0);

    /// Pack a left/right pair: `(right << 16) | (left & 0xFFFF)`.
    pub const fn new(left: i16, right: i16) -> Self {
        StereoFrame((left as u16 as u32) | ((right as u16 as u32) << 16))
    }

    /// Decode the four little-endian bytes of a USB audio frame.
    pub const fn from_le_bytes(bytes: [u8; BYTES_PER_FRAME]) -> Self {
        StereoFrame(u32::from_le_bytes(bytes))
    }

    /// Encode as the four bytes a host would send.
    pub const fn to_le_bytes(self) -> [u8; BYTES_PER_FRAME] {
        self.0.to_le_bytes()
    }

    /// Left channel sample.
    pub const fn left(self) -> i16 {
        self.0 as i16
    }

    /// Right channel sample.
    pub const fn right(self) -> i16 {
        (self.0 >> 16) as i16
    }

    /// The FIFO word.
    pub const fn word(self) -> u32 {
        self.0
    }
}

impl From<StereoFrame> for u32 {
    fn from(frame: StereoFrame) -> u32 {
        frame.0
    }
}
