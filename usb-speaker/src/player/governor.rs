//! Buffer-level speed governor.
//!
//! Two watermarks split the buffer into three bands:
//!
//! ```text
//! 0 ─────── low (3/8) ─────── high (5/8) ─────── capacity
//!   ◄── back to Normal          SpedUp from here ──►
//! ```
//!
//! Between the two marks the current mode is kept, so a fill level hovering
//! around either mark can't toggle the divider on every interrupt.

use crate::constants::{HIGH_WATERMARK_EIGHTHS, LOW_WATERMARK_EIGHTHS};

/// Which divider pair the transmitter is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedMode {
    /// Slow divider: bit clock at or just below nominal.
    #[default]
    Normal,
    /// Fast divider: bit clock at or just above nominal, draining backlog.
    SpedUp,
}

/// Fill level at or above which playback speeds up.
pub const fn high_watermark(capacity: usize) -> usize {
    capacity * HIGH_WATERMARK_EIGHTHS / 8
}

/// Fill level below which sped-up playback returns to normal.
pub const fn low_watermark(capacity: usize) -> usize {
    capacity * LOW_WATERMARK_EIGHTHS / 8
}

/// Hysteresis state machine over the buffer fill level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RateGovernor {
    mode: SpeedMode,
}

impl RateGovernor {
    /// Start in [`SpeedMode::Normal`].
    pub const fn new() -> Self {
        RateGovernor {
            mode: SpeedMode::Normal,
        }
    }

    /// Current mode.
    pub fn mode(&self) -> SpeedMode {
        self.mode
    }

    /// Force [`SpeedMode::Normal`] (the slow divider is being programmed).
    pub fn reset(&mut self) {
        self.mode = SpeedMode::Normal;
    }

    /// Feed the current fill level. Returns the new mode on a transition.
    ///
    /// A zero `capacity` means no ring is configured and never transitions.
    pub fn update(&mut self, count: usize, capacity: usize) -> Option<SpeedMode> {
        if capacity == 0 {
            return None;
        }
        let next = match self.mode {
            SpeedMode::Normal if count >= high_watermark(capacity) => SpeedMode::SpedUp,
            SpeedMode::SpedUp if count < low_watermark(capacity) => SpeedMode::Normal,
            _ => return None,
        };
        self.mode = next;
        Some(next)
    }
}
