//! Interrupt-driven, rate-adaptive I2S playback.
//!
//! [`Player`] owns the drain side of the stream buffer and the I2S
//! transmitter. Each FIFO interrupt tops the transmit FIFO back up from the
//! buffer and then lets the [`RateGovernor`] pick the divider pair.
//!
//! ## Architecture
//!
//! ```text
//! StreamBuffer                Player::service()                 I2S TX
//! ┌──────────────┐        ┌──────────────────────┐         ┌──────────┐
//! │ Consumer     ├─frame─►│ drain_one / repeat   ├──send──►│ FIFO (8) │
//! │ count        ├───────►│ governor: slow/fast  ├──X/Y───►│ divider  │
//! └──────────────┘        └──────────────────────┘         └──────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! // Once: build the player around the drain half of the buffer.
//! let mut player = Player::new(consumer, i2s);
//! player.start(*table.profile(48_000).unwrap());
//!
//! // In the I2S FIFO interrupt:
//! player.service();
//! ```

use crate::clock::SampleRateProfile;
use crate::constants::{FIFO_DEPTH, FIFO_REFILL_LEVEL, STORAGE_BYTES};
use crate::i2s::I2sTx;
use crate::stream::{Consumer, StereoFrame};

use super::governor::{RateGovernor, SpeedMode};

/// Rate-adaptive I2S output fed from a [`Consumer`].
pub struct Player<'a, T, const N: usize = STORAGE_BYTES> {
    consumer: Consumer<'a, N>,
    i2s: T,
    profile: Option<SampleRateProfile>,
    governor: RateGovernor,
    /// Frame repeated when the buffer runs dry.
    last_frame: StereoFrame,
    underruns: u32,
}

impl<'a, T: I2sTx, const N: usize> Player<'a, T, N> {
    /// Wrap the drain half of the buffer and a stopped transmitter.
    pub fn new(consumer: Consumer<'a, N>, i2s: T) -> Self {
        Player {
            consumer,
            i2s,
            profile: None,
            governor: RateGovernor::new(),
            last_frame: StereoFrame::SILENCE,
            underruns: 0,
        }
    }

    /// Program `profile` at normal speed and start the transmitter.
    pub fn start(&mut self, profile: SampleRateProfile) {
        self.i2s.set_bit_rate(profile.bit_rate_prescale);
        self.i2s.set_divider(profile.slow);
        self.governor.reset();
        self.last_frame = StereoFrame::SILENCE;
        self.profile = Some(profile);
        self.i2s.start();
    }

    /// Stop the transmitter and mask its interrupt.
    pub fn stop(&mut self) {
        self.i2s.stop();
        self.profile = None;
    }

    /// Whether [`start`](Self::start) has been called without a matching stop.
    pub fn is_running(&self) -> bool {
        self.profile.is_some()
    }

    /// Service the FIFO interrupt.
    ///
    /// When the FIFO has drained to `FIFO_REFILL_LEVEL` or below, pushes
    /// frames until it holds `FIFO_DEPTH`, repeating the last frame for any
    /// slot the buffer can't fill. Then re-evaluates the speed mode. Returns
    /// the number of frames pushed.
    pub fn service(&mut self) -> usize {
        let Some(profile) = self.profile else {
            return 0;
        };

        let level = self.i2s.tx_level();
        if level > FIFO_REFILL_LEVEL {
            return 0;
        }

        let slots = FIFO_DEPTH.saturating_sub(level);
        for _ in 0..slots {
            match self.consumer.drain_one() {
                Some(frame) => self.last_frame = frame,
                None => self.underruns = self.underruns.wrapping_add(1),
            }
            self.i2s.send(self.last_frame.word());
        }

        let count = self.consumer.count();
        match self.governor.update(count, self.consumer.capacity()) {
            Some(SpeedMode::SpedUp) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("buffer at {=usize} bytes, speeding up", count);
                self.i2s.set_divider(profile.fast);
            }
            Some(SpeedMode::Normal) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("buffer at {=usize} bytes, back to normal speed", count);
                self.i2s.set_divider(profile.slow);
            }
            None => {}
        }

        slots
    }

    /// Current divider selection.
    pub fn speed_mode(&self) -> SpeedMode {
        self.governor.mode()
    }

    /// Profile being played, if running.
    pub fn profile(&self) -> Option<&SampleRateProfile> {
        self.profile.as_ref()
    }

    /// FIFO slots filled by repeating the last frame.
    pub fn underruns(&self) -> u32 {
        self.underruns
    }

    /// Frame that will be repeated on the next underrun.
    pub fn last_frame(&self) -> StereoFrame {
        self.last_frame
    }

    /// The drain half of the buffer.
    pub fn consumer(&self) -> &Consumer<'a, N> {
        &self.consumer
    }

    /// The transmitter.
    pub fn i2s(&self) -> &T {
        &self.i2s
    }

    /// Mutable access to the transmitter.
    pub fn i2s_mut(&mut self) -> &mut T {
        &mut self.i2s
    }

    /// Give back the consumer and the transmitter.
    pub fn release(self) -> (Consumer<'a, N>, T) {
        (self.consumer, self.i2s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ClockConfig, RateTable};
    use crate::i2s::mock::MockI2s;
    use crate::stream::{Producer, StreamBuffer};

    type Small = StreamBuffer<1024>;

    fn profile() -> SampleRateProfile {
        *RateTable::build(&ClockConfig::LPC43XX)
            .unwrap()
            .profile(48_000)
            .unwrap()
    }

    fn push_frames<const N: usize>(
        p: &mut Producer<'_, N>,
        frames: impl Iterator<Item = StereoFrame>,
    ) {
        let slot = p.write_slot();
        let mut len = 0;
        for f in frames {
            slot[len..len + 4].copy_from_slice(&f.to_le_bytes());
            len += 4;
        }
        p.submit(len);
    }

    #[test]
    fn start_programs_slow_divider_and_runs() {
        let mut buf = Small::new();
        let (_p, c) = buf.split();
        let mut player = Player::new(c, MockI2s::new());
        let prof = profile();

        player.start(prof);

        assert!(player.is_running());
        assert!(player.i2s().running);
        assert_eq!(player.i2s().prescale, Some(prof.bit_rate_prescale));
        assert_eq!(player.i2s().divider, Some(prof.slow));
        assert_eq!(player.speed_mode(), SpeedMode::Normal);
    }

    #[test]
    fn service_before_start_does_nothing() {
        let mut buf = Small::new();
        let (_p, c) = buf.split();
        let mut player = Player::new(c, MockI2s::new());
        assert_eq!(player.service(), 0);
        assert!(player.i2s().sent().is_empty());
    }

    #[test]
    fn refills_fifo_to_depth() {
        let mut buf = Small::new();
        let (mut p, c) = buf.split();
        p.resize(640);
        push_frames(&mut p, (0..10).map(|i| StereoFrame::new(i, i)));

        let mut player = Player::new(c, MockI2s::new());
        player.start(profile());

        // Empty FIFO: eight slots
        assert_eq!(player.service(), 8);
        assert_eq!(player.consumer().count(), 8);
        assert_eq!(player.consumer().read_index(), 32);
        assert_eq!(player.underruns(), 0);
        let expected: [u32; 8] =
            core::array::from_fn(|i| StereoFrame::new(i as i16, i as i16).word());
        assert_eq!(player.i2s().sent(), &expected);
    }

    #[test]
    fn skips_while_fifo_above_refill_level() {
        let mut buf = Small::new();
        let (mut p, c) = buf.split();
        p.resize(640);
        push_frames(&mut p, (0..10).map(|i| StereoFrame::new(i, i)));

        let mut player = Player::new(c, MockI2s::new());
        player.start(profile());

        player.i2s_mut().level = 5;
        assert_eq!(player.service(), 0);

        player.i2s_mut().level = 4;
        assert_eq!(player.service(), 4);
        assert_eq!(player.consumer().count(), 24);
    }

    #[test]
    fn underrun_repeats_last_frame() {
        let mut buf = Small::new();
        let (mut p, c) = buf.split();
        p.resize(640);
        push_frames(&mut p, [StereoFrame::new(7, -7), StereoFrame::new(9, -9)].into_iter());

        let mut player = Player::new(c, MockI2s::new());
        player.start(profile());
        player.service();

        let sent = player.i2s().sent();
        assert_eq!(sent[0], StereoFrame::new(7, -7).word());
        assert!(sent[1..].iter().all(|&w| w == StereoFrame::new(9, -9).word()));
        assert_eq!(player.underruns(), 6);
        assert_eq!(player.consumer().count(), 0);
    }

    #[test]
    fn empty_buffer_sends_silence_first() {
        let mut buf = Small::new();
        let (mut p, c) = buf.split();
        p.resize(640);

        let mut player = Player::new(c, MockI2s::new());
        player.start(profile());

        assert_eq!(player.service(), 8);
        assert!(player.i2s().sent().iter().all(|&w| w == 0));
        assert_eq!(player.consumer().count(), 0);
        assert_eq!(player.underruns(), 8);
    }

    #[test]
    fn switches_dividers_with_hysteresis() {
        let mut buf = Small::new();
        let (mut p, c) = buf.split();
        // high = 400, low = 240
        p.resize(640);
        let prof = profile();

        let mut player = Player::new(c, MockI2s::new());
        player.start(prof);

        // 110 frames = 440 bytes; after 8 drained, 408 >= 400
        push_frames(&mut p, (0..45).map(|i| StereoFrame::new(i, 0)));
        push_frames(&mut p, (0..45).map(|i| StereoFrame::new(i, 0)));
        push_frames(&mut p, (0..20).map(|i| StereoFrame::new(i, 0)));
        player.service();
        assert_eq!(player.speed_mode(), SpeedMode::SpedUp);
        assert_eq!(player.i2s().divider, Some(prof.fast));

        // Drain into the dead band: stays sped up.
        while player.consumer().count() >= 240 + 32 {
            player.service();
        }
        assert_eq!(player.speed_mode(), SpeedMode::SpedUp);

        // Below low watermark: back to slow.
        while player.speed_mode() == SpeedMode::SpedUp {
            player.service();
        }
        assert!(player.consumer().count() < 240);
        assert_eq!(player.i2s().divider, Some(prof.slow));
        assert_eq!(player.i2s().divider_writes, 3);
    }

    #[test]
    fn stop_masks_and_restart_resets_mode() {
        let mut buf = Small::new();
        let (mut p, c) = buf.split();
        p.resize(640);
        let prof = profile();
        let mut player = Player::new(c, MockI2s::new());
        player.start(prof);

        push_frames(&mut p, (0..45).map(|i| StereoFrame::new(i, 0)));
        push_frames(&mut p, (0..45).map(|i| StereoFrame::new(i, 0)));
        push_frames(&mut p, (0..20).map(|i| StereoFrame::new(i, 0)));
        player.service();
        assert_eq!(player.speed_mode(), SpeedMode::SpedUp);

        player.stop();
        assert!(!player.is_running());
        assert!(!player.i2s().running);
        assert_eq!(player.service(), 0);

        player.start(prof);
        assert_eq!(player.speed_mode(), SpeedMode::Normal);
        assert_eq!(player.i2s().divider, Some(prof.slow));
        assert_eq!(player.last_frame(), StereoFrame::SILENCE);
    }

    #[test]
    fn overrun_while_sped_up_recovers_on_next_service() {
        let mut buf = Small::new();
        let (mut p, c) = buf.split();
        p.resize(640);
        let prof = profile();
        let mut player = Player::new(c, MockI2s::new());
        player.start(prof);

        push_frames(&mut p, (0..45).map(|i| StereoFrame::new(i, 0)));
        push_frames(&mut p, (0..45).map(|i| StereoFrame::new(i, 0)));
        push_frames(&mut p, (0..20).map(|i| StereoFrame::new(i, 0)));
        player.service();
        assert_eq!(player.speed_mode(), SpeedMode::SpedUp);

        // Host bursts past capacity: the buffer resets under the player.
        p.submit(196);
        p.submit(196);
        assert_eq!(p.stats().overruns, 1);

        player.service();
        assert_eq!(player.speed_mode(), SpeedMode::Normal);
        assert_eq!(player.i2s().divider, Some(prof.slow));
    }
}
