//! Fractional I2S bit-clock divider search.
//!
//! The LPC18xx/43xx I2S transmitter derives its bit clock from the peripheral
//! clock in three stages:
//!
//! ```text
//! reference ──► × X / Y ──► ÷ 2 ──► ÷ (BITRATE + 1) ──► bit clock
//! ```
//!
//! `X` and `Y` are 8-bit values and `BITRATE` is a 6-bit prescale, so for a
//! given sample rate we look for the largest prescale `N = BITRATE + 1` that
//! keeps `X / Y` below one, then scan every denominator for the numerators
//! that land closest to the exact ratio from above and from below.
//!
//! Everything is integer arithmetic: the exact ratio is held as a fixed-point
//! value with 16 fractional bits.

use core::cmp::Ordering;

use crate::constants::{BITS_PER_SAMPLE, CHANNELS};
use crate::error::Error;

/// Fractional bits in the fixed-point divider.
pub const FRAC_BITS: u32 = 16;

/// Largest prescale `N` the BITRATE field can encode (`BITRATE = N - 1`).
pub const MAX_PRESCALE: u32 = 64;

/// Fixed divide-by-two between the X/Y stage and the bit-rate prescaler.
pub const FRACTIONAL_STAGE_DIVISOR: u64 = 2;

const ONE: u64 = 1 << FRAC_BITS;
const HALF: u64 = ONE / 2;
const FRAC_MASK: u64 = ONE - 1;

/// An X/Y fractional multiplier pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FracDivider {
    /// Numerator (1..=255).
    pub x: u8,
    /// Denominator (1..=255).
    pub y: u8,
}

impl FracDivider {
    /// Create a divider from its raw register values.
    pub const fn new(x: u8, y: u8) -> Self {
        FracDivider { x, y }
    }

    /// Compare `x / y` against `num / den` without rounding.
    pub fn cmp_ratio(self, num: u64, den: u64) -> Ordering {
        let lhs = u128::from(self.x) * u128::from(den);
        let rhs = u128::from(self.y) * u128::from(num);
        lhs.cmp(&rhs)
    }
}

/// Stream format the divider has to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RateRequest {
    /// Frames per second.
    pub sample_rate: u32,
    /// Interleaved channels per frame.
    pub channels: u32,
    /// Bits per channel sample.
    pub bits_per_sample: u32,
}

impl RateRequest {
    /// A request for the speaker's fixed 16-bit stereo format.
    pub const fn stereo16(sample_rate: u32) -> Self {
        RateRequest {
            sample_rate,
            channels: CHANNELS,
            bits_per_sample: BITS_PER_SAMPLE,
        }
    }

    /// Bits per frame (all channels).
    pub const fn bits_per_frame(&self) -> u32 {
        self.channels * self.bits_per_sample
    }

    /// Required I2S bit clock in Hz.
    pub const fn bit_clock_hz(&self) -> u64 {
        self.sample_rate as u64 * self.bits_per_frame() as u64
    }
}

/// Divider settings for one sample rate.
///
/// Programming `bit_rate_prescale` plus `slow` gives a bit clock at or just
/// below the target; swapping in `fast` gives one at or just above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleRateProfile {
    /// The rate the divider was solved for (may include a board trim).
    pub sample_rate: u32,
    /// Bits per frame the divider was solved for.
    pub bits_per_frame: u32,
    /// Reference clock the divider was solved against.
    pub reference_hz: u32,
    /// BITRATE register value (`N - 1`, 0..=63).
    pub bit_rate_prescale: u8,
    /// Over-approximating X/Y pair.
    pub fast: FracDivider,
    /// Under-approximating X/Y pair.
    pub slow: FracDivider,
}

impl SampleRateProfile {
    /// The prescale divisor `N`.
    pub const fn prescale(&self) -> u32 {
        self.bit_rate_prescale as u32 + 1
    }

    /// The exact X/Y ratio this profile approximates, as `(num, den)`.
    pub const fn target_ratio(&self) -> (u64, u64) {
        target_ratio(
            self.sample_rate as u64 * self.bits_per_frame as u64,
            self.prescale(),
            self.reference_hz,
        )
    }

    /// Sample rate actually produced with `divider` programmed, in Hz.
    pub fn achieved_rate(&self, divider: FracDivider) -> f64 {
        let bit_clock = f64::from(self.reference_hz) * f64::from(divider.x)
            / f64::from(divider.y)
            / FRACTIONAL_STAGE_DIVISOR as f64
            / f64::from(self.prescale());
        bit_clock / f64::from(self.bits_per_frame)
    }

    /// Deviation of the slow divider's output from `nominal_rate`, in ppm.
    pub fn error_ppm(&self, nominal_rate: u32) -> f64 {
        let nominal = f64::from(nominal_rate);
        libm::fabs(self.achieved_rate(self.slow) - nominal) / nominal * 1e6
    }
}

/// Exact `X / Y` ratio for a bit clock at prescale `n`, as `(num, den)`.
pub const fn target_ratio(bit_clock_hz: u64, n: u32, reference_hz: u32) -> (u64, u64) {
    (
        bit_clock_hz * FRACTIONAL_STAGE_DIVISOR * n as u64,
        reference_hz as u64,
    )
}

/// Best denominator seen so far on one side of the target.
#[derive(Clone, Copy)]
struct Best {
    y: u32,
    err: u64,
}

fn keep_better(best: &mut Option<Best>, y: u32, err: u64) {
    match best {
        Some(b) if b.err <= err => {}
        _ => *best = Some(Best { y, err }),
    }
}

/// Numerator for denominator `y`, computed from the exact ratio.
fn numerator(y: u32, num: u64, den: u64, round_up: bool) -> u8 {
    let mut x = u128::from(y) * u128::from(num) / u128::from(den);
    if round_up {
        x += 1;
    }
    x.clamp(1, 255) as u8
}

/// Find the fast/slow divider pair for `request` on a `reference_hz` clock.
///
/// # Errors
///
/// [`Error::NoValidDivider`] if no prescale keeps the ratio below one, or if
/// the ratio is under `1/255` even at the largest prescale (no non-zero
/// numerator can sit below it).
pub fn solve(request: RateRequest, reference_hz: u32) -> Result<SampleRateProfile, Error> {
    let no_divider = Error::NoValidDivider {
        sample_rate: request.sample_rate,
        reference_hz,
    };
    let bit_clock = request.bit_clock_hz();
    if reference_hz == 0 || bit_clock == 0 {
        return Err(no_divider);
    }

    // Largest N whose fixed-point ratio still has no integer part.
    let reference = u128::from(reference_hz);
    let scaled = u128::from(bit_clock) * u128::from(FRACTIONAL_STAGE_DIVISOR);
    let (n, divider) = (1..=MAX_PRESCALE)
        .rev()
        .map(|n| (n, (scaled << FRAC_BITS) * u128::from(n) / reference))
        .find(|&(_, d)| d < u128::from(ONE))
        .ok_or(no_divider)?;
    let divider = divider as u64;

    let mut fast: Option<Best> = None;
    let mut slow: Option<Best> = None;
    // Best on each side over every y, for a ratio so close to a whole step
    // that all candidates round the same way.
    let mut fast_any: Option<Best> = None;
    let mut slow_any: Option<Best> = None;
    for y in (1..=255u32).rev() {
        let x = u64::from(y) * divider;
        let whole = x >> FRAC_BITS;
        if whole > 0xFF {
            continue;
        }
        let rem = x & FRAC_MASK;
        // x + 1 must fit in eight bits
        if whole < 0xFF {
            keep_better(&mut fast_any, y, ONE - rem);
            if rem > HALF {
                keep_better(&mut fast, y, ONE - rem);
            }
        }
        // a zero numerator can't sit below a non-zero target
        if whole > 0 {
            keep_better(&mut slow_any, y, rem);
            if rem <= HALF {
                keep_better(&mut slow, y, rem);
            }
        }
    }

    let (Some(fast), Some(slow)) = (fast.or(fast_any), slow.or(slow_any)) else {
        return Err(no_divider);
    };

    let (num, den) = target_ratio(bit_clock, n, reference_hz);
    Ok(SampleRateProfile {
        sample_rate: request.sample_rate,
        bits_per_frame: request.bits_per_frame(),
        reference_hz,
        bit_rate_prescale: (n - 1) as u8,
        fast: FracDivider::new(numerator(fast.y, num, den, true), fast.y as u8),
        slow: FracDivider::new(numerator(slow.y, num, den, false), slow.y as u8),
    })
}
