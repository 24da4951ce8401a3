//! Per-rate divider table, solved once at startup.

use crate::constants::{
    BYTES_PER_FRAME, CD_FAMILY_WORKING_BYTES, SUPPORTED_SAMPLE_RATES, WORKING_PACKETS,
};
use crate::error::Error;

use super::solver::{solve, FracDivider, RateRequest, SampleRateProfile};

/// Board clocking parameters for the I2S peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfig {
    /// Clock feeding the I2S fractional divider, in Hz.
    pub reference_hz: u32,
    /// Added to rates of 44.1 kHz and above before solving.
    ///
    /// Solving slightly high lets the slow divider keep up with hosts whose
    /// USB frame clock runs faster than the board crystal.
    pub trim_hz: u32,
}

impl ClockConfig {
    /// LPC18xx with the I2S block on a 180 MHz APB clock.
    pub const LPC18XX: ClockConfig = ClockConfig {
        reference_hz: 180_000_000,
        trim_hz: 0,
    };

    /// LPC43xx with the I2S block on a 204 MHz APB clock.
    pub const LPC43XX: ClockConfig = ClockConfig {
        reference_hz: 204_000_000,
        trim_hz: 1,
    };

    /// Rate handed to the solver for a nominal host rate.
    pub const fn solver_rate(&self, nominal: u32) -> u32 {
        if nominal >= 44_100 {
            nominal + self.trim_hz
        } else {
            nominal
        }
    }
}

/// Ring capacity, in bytes, used while streaming at `sample_rate`.
///
/// Twice the working size: ten 1 ms packets for the 8 kHz family, and a
/// fixed 1764 bytes for the 11.025 kHz family.
pub const fn buffer_capacity(sample_rate: u32) -> usize {
    let working = if sample_rate % 11_025 == 0 {
        CD_FAMILY_WORKING_BYTES
    } else {
        sample_rate as usize * BYTES_PER_FRAME * WORKING_PACKETS as usize / 1000
    };
    working * 2
}

const PLACEHOLDER: SampleRateProfile = SampleRateProfile {
    sample_rate: 0,
    bits_per_frame: 0,
    reference_hz: 0,
    bit_rate_prescale: 0,
    fast: FracDivider::new(1, 1),
    slow: FracDivider::new(1, 1),
};

/// Immutable mapping from host sample rate to divider profile.
#[derive(Debug, Clone)]
pub struct RateTable {
    entries: [(u32, SampleRateProfile); SUPPORTED_SAMPLE_RATES.len()],
}

impl RateTable {
    /// Solve every supported rate for `config`.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::NoValidDivider`] for the first rate the board
    /// cannot produce.
    pub fn build(config: &ClockConfig) -> Result<Self, Error> {
        let mut entries = [(0, PLACEHOLDER); SUPPORTED_SAMPLE_RATES.len()];
        for (slot, &rate) in entries.iter_mut().zip(SUPPORTED_SAMPLE_RATES.iter()) {
            let request = RateRequest::stereo16(config.solver_rate(rate));
            let profile = solve(request, config.reference_hz)?;

            #[cfg(feature = "defmt")]
            defmt::debug!(
                "rate {=u32} Hz: BITRATE={=u8} fast={=u8}/{=u8} slow={=u8}/{=u8}",
                rate,
                profile.bit_rate_prescale,
                profile.fast.x,
                profile.fast.y,
                profile.slow.x,
                profile.slow.y
            );

            *slot = (rate, profile);
        }
        Ok(RateTable { entries })
    }

    /// Profile for a nominal host rate, if supported.
    pub fn profile(&self, sample_rate: u32) -> Option<&SampleRateProfile> {
        self.entries
            .iter()
            .find(|(rate, _)| *rate == sample_rate)
            .map(|(_, profile)| profile)
    }

    /// Whether `sample_rate` has a profile.
    pub fn supports(&self, sample_rate: u32) -> bool {
        self.profile(sample_rate).is_some()
    }

    /// Iterate `(nominal rate, profile)` pairs in ascending rate order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &SampleRateProfile)> {
        self.entries.iter().map(|(rate, profile)| (*rate, profile))
    }

    /// Iterate the supported nominal rates in ascending order.
    pub fn rates(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|(rate, _)| *rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MAX_PACKET_BYTES, STORAGE_BYTES};

    #[test]
    fn builds_for_both_boards() {
        for config in [ClockConfig::LPC18XX, ClockConfig::LPC43XX] {
            let table = RateTable::build(&config).unwrap();
            assert_eq!(table.rates().count(), SUPPORTED_SAMPLE_RATES.len());
            for (rate, profile) in table.iter() {
                assert_eq!(profile.reference_hz, config.reference_hz);
                assert_eq!(profile.sample_rate, config.solver_rate(rate));
            }
        }
    }

    #[test]
    fn lookup_by_rate_value() {
        let table = RateTable::build(&ClockConfig::LPC18XX).unwrap();
        assert!(table.supports(44_100));
        assert!(table.supports(8_000));
        assert!(!table.supports(24_000));
        assert!(!table.supports(96_000));
        assert_eq!(table.profile(22_050).unwrap().sample_rate, 22_050);
    }

    #[test]
    fn trim_applies_to_high_rates_only() {
        let table = RateTable::build(&ClockConfig::LPC43XX).unwrap();
        assert_eq!(table.profile(48_000).unwrap().sample_rate, 48_001);
        assert_eq!(table.profile(44_100).unwrap().sample_rate, 44_101);
        assert_eq!(table.profile(32_000).unwrap().sample_rate, 32_000);
    }

    #[test]
    fn unreachable_reference_fails_the_build() {
        let config = ClockConfig {
            reference_hz: 2_000_000,
            trim_hz: 0,
        };
        assert!(matches!(
            RateTable::build(&config),
            Err(Error::NoValidDivider { .. })
        ));
    }

    #[test]
    fn capacity_per_rate() {
        assert_eq!(buffer_capacity(8_000), 640);
        assert_eq!(buffer_capacity(16_000), 1280);
        assert_eq!(buffer_capacity(32_000), 2560);
        assert_eq!(buffer_capacity(48_000), 3840);
        assert_eq!(buffer_capacity(11_025), 3528);
        assert_eq!(buffer_capacity(22_050), 3528);
        assert_eq!(buffer_capacity(44_100), 3528);
    }

    #[test]
    fn every_capacity_fits_storage_with_packet_headroom() {
        for &rate in SUPPORTED_SAMPLE_RATES.iter() {
            let capacity = buffer_capacity(rate);
            assert_eq!(capacity % BYTES_PER_FRAME, 0, "{rate} Hz");
            assert!(capacity + MAX_PACKET_BYTES <= STORAGE_BYTES, "{rate} Hz");
            assert!(capacity >= MAX_PACKET_BYTES, "{rate} Hz");
        }
    }
}
