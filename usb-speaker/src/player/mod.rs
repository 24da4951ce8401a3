//! Rate-adaptive playback.
//!
//! Instead of resampling, the player keeps the stream buffer inside its
//! safe band by switching the I2S transmitter between two precomputed X/Y
//! dividers: the slow pair (at or just under the nominal bit clock) and the
//! fast pair (at or just over it). [`RateGovernor`] decides when, with
//! hysteresis between the 3/8 and 5/8 fill marks.

mod governor;
mod playback;

pub use governor::{high_watermark, low_watermark, RateGovernor, SpeedMode};
pub use playback::Player;
