//! I2S clock-rate solving.
//!
//! [`solve`] turns a sample rate into a [`SampleRateProfile`]: a bit-rate
//! prescale plus two fractional X/Y pairs bracketing the exact bit clock.
//! [`RateTable`] holds one profile per supported rate and is built once at
//! startup.
//!
//! ```ignore
//! let table = RateTable::build(&ClockConfig::LPC43XX)?;
//! let profile = table.profile(44_100).unwrap();
//! i2s.set_bit_rate(profile.bit_rate_prescale);
//! i2s.set_divider(profile.slow);
//! ```

mod solver;
mod table;

pub use solver::{
    solve, target_ratio, FracDivider, RateRequest, SampleRateProfile, FRACTIONAL_STAGE_DIVISOR,
    FRAC_BITS, MAX_PRESCALE,
};
pub use table::{buffer_capacity, ClockConfig, RateTable};
