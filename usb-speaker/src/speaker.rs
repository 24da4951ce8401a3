//! Speaker glue: rate table, stream buffer producer, player and amplifier.
//!
//! [`Speaker`] is what the USB audio-class handlers talk to. It owns the
//! write half of the [`StreamBuffer`](crate::stream::StreamBuffer) and the
//! [`Player`], so a rate change can stop playback, resize the ring and
//! restart at the new dividers in one place.
//!
//! Every entry point takes `&mut self`, so on target the `Speaker` is one
//! shared resource locked by both the USB and the I2S interrupt (an RTIC
//! resource or a critical-section mutex). The atomic split underneath
//! only matters to firmware that drives a [`Producer`] and a [`Player`]
//! directly from the two interrupts without this glue; it then has to mask
//! the I2S interrupt itself around a rate change.
//!
//! ```ignore
//! let table = RateTable::build(&ClockConfig::LPC43XX)?;
//! let (producer, consumer) = BUFFER.split();
//! let mut speaker = Speaker::new(table, producer, Player::new(consumer, i2s), amp)?;
//!
//! // Isochronous OUT endpoint:
//! let slot = speaker.on_iso_packet(received_len);
//! usb.set_rx_buffer(slot);
//!
//! // Alternate setting changed:
//! speaker.set_stream_active(alt == 1)?;
//!
//! // SET_CUR sampling frequency:
//! speaker.set_sample_rate(&ctrl_data, RateEncoding::Uac1)?;
//! ```

use crate::clock::{buffer_capacity, RateTable};
use crate::constants::{DEFAULT_SAMPLE_RATE, MAX_SAMPLE_RATE, STORAGE_BYTES};
use crate::control::AudioControl;
use crate::error::Error;
use crate::i2s::I2sTx;
use crate::player::Player;
use crate::stream::Producer;
use crate::uac::{self, RateEncoding};

/// USB speaker core.
pub struct Speaker<'a, T, A, const N: usize = STORAGE_BYTES> {
    table: RateTable,
    producer: Producer<'a, N>,
    player: Player<'a, T, N>,
    amp: A,
    sample_rate: u32,
}

impl<'a, T: I2sTx, A: AudioControl, const N: usize> Speaker<'a, T, A, N> {
    /// Assemble the speaker and start playing at [`DEFAULT_SAMPLE_RATE`].
    ///
    /// # Errors
    ///
    /// [`Error::RateUnsupported`] if `table` has no profile for the default
    /// rate.
    pub fn new(
        table: RateTable,
        producer: Producer<'a, N>,
        player: Player<'a, T, N>,
        amp: A,
    ) -> Result<Self, Error> {
        let mut speaker = Speaker {
            table,
            producer,
            player,
            amp,
            sample_rate: 0,
        };
        speaker.apply_rate(DEFAULT_SAMPLE_RATE)?;
        Ok(speaker)
    }

    /// Hand a received isochronous packet to the buffer and get the slot for
    /// the next one. See [`Producer::submit`].
    pub fn on_iso_packet(&mut self, len: usize) -> &mut [u8] {
        self.producer.submit(len)
    }

    /// Slot the next packet should be received into, without submitting.
    pub fn rx_slot(&mut self) -> &mut [u8] {
        self.producer.write_slot()
    }

    /// The streaming interface switched alternate setting.
    ///
    /// Either way the buffer starts over empty. The amplifier follows the
    /// stream so it is silent while the host isn't sending audio.
    pub fn set_stream_active(&mut self, active: bool) -> Result<(), A::Error> {
        self.producer.reset();
        if active {
            #[cfg(feature = "defmt")]
            defmt::info!("stream started at {=u32} Hz", self.sample_rate);
            self.amp.enable()
        } else {
            #[cfg(feature = "defmt")]
            defmt::info!("stream stopped");
            self.amp.disable()
        }
    }

    /// Handle a `SET_CUR` sampling-frequency request.
    ///
    /// # Errors
    ///
    /// - [`Error::ShortRequest`] if `data` is shorter than `encoding`.
    /// - [`Error::RateUnsupported`] for a rate above [`MAX_SAMPLE_RATE`] or
    ///   missing from the table. Nothing is changed in either case.
    pub fn set_sample_rate(&mut self, data: &[u8], encoding: RateEncoding) -> Result<(), Error> {
        let rate = uac::decode_rate(data, encoding)?;
        self.apply_rate(rate)
    }

    /// Handle a `GET_CUR` sampling-frequency request, replying in the
    /// encoding it was asked in. Returns the bytes written.
    pub fn sample_rate_request(&self, encoding: RateEncoding, out: &mut [u8]) -> usize {
        uac::encode_rate(self.sample_rate, encoding, out)
    }

    /// Handle a UAC2 `GET_RANGE` sampling-frequency request.
    pub fn sample_rate_ranges(&self, out: &mut [u8]) -> usize {
        uac::write_rate_ranges(self.table.rates(), out)
    }

    /// Handle a UAC2 clock-valid request.
    pub fn clock_valid_request(&self, out: &mut [u8]) -> usize {
        uac::write_clock_valid(out)
    }

    /// I2S FIFO interrupt entry point. See [`Player::service`].
    pub fn service(&mut self) -> usize {
        self.player.service()
    }

    /// Current nominal sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Divider table in use.
    pub fn table(&self) -> &RateTable {
        &self.table
    }

    /// Write half of the stream buffer.
    pub fn producer(&self) -> &Producer<'a, N> {
        &self.producer
    }

    /// The player.
    pub fn player(&self) -> &Player<'a, T, N> {
        &self.player
    }

    /// Mutable access to the player, e.g. to poke the transmitter in tests.
    /// The caller still holds the whole `Speaker`.
    pub fn player_mut(&mut self) -> &mut Player<'a, T, N> {
        &mut self.player
    }

    /// The amplifier.
    pub fn amp(&self) -> &A {
        &self.amp
    }

    fn apply_rate(&mut self, rate: u32) -> Result<(), Error> {
        let profile = match self.table.profile(rate) {
            Some(profile) if rate <= MAX_SAMPLE_RATE => *profile,
            _ => {
                #[cfg(feature = "defmt")]
                defmt::warn!("rejected sample rate {=u32} Hz", rate);
                return Err(Error::RateUnsupported(rate));
            }
        };

        if self.player.is_running() {
            self.player.stop();
        }
        self.producer.resize(buffer_capacity(rate));
        self.player.start(profile);
        self.sample_rate = rate;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "sample rate {=u32} Hz, ring {=usize} bytes",
            rate,
            self.producer.capacity()
        );
        Ok(())
    }
}
