//! # usb-speaker
//!
//! A `no_std`, zero-allocation USB Audio Class speaker core for
//! microcontrollers with an LPC-style I2S transmitter (X/Y fractional rate
//! divider, 8-deep TX FIFO).
//!
//! The host streams 16-bit stereo PCM over an isochronous OUT endpoint. The
//! core buffers it, plays it out of the I2S FIFO interrupt, and keeps the
//! buffer level in check by nudging the bit clock between two precomputed
//! dividers instead of resampling.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Clock | [`clock`] | Fractional divider solver and per-rate table |
//! | Buffer | [`stream`] | Linearising SPSC byte ring for USB packets |
//! | Playback | [`player`] | FIFO refill, underrun repeat, speed governor |
//! | Trait | [`i2s`] / [`control`] | `I2sTx` and `AudioControl` hardware seams |
//! | Amp | [`amp`] | MAX98357A driver (feature-gated) |
//! | Control | [`uac`] | Sampling-frequency request payloads |
//! | Glue | [`speaker`] | Rate changes, stream start/stop |
//!
//! ## Quick start
//!
//! ```ignore
//! use usb_speaker::clock::{ClockConfig, RateTable};
//! use usb_speaker::player::Player;
//! use usb_speaker::speaker::Speaker;
//! use usb_speaker::stream::StreamBuffer;
//!
//! static mut BUFFER: StreamBuffer = StreamBuffer::new();
//!
//! let table = RateTable::build(&ClockConfig::LPC43XX)?;
//! let (producer, consumer) = unsafe { BUFFER.split() };
//! let mut speaker = Speaker::new(table, producer, Player::new(consumer, i2s), amp)?;
//!
//! // USB isochronous OUT complete:
//! let next = speaker.on_iso_packet(len);
//!
//! // I2S FIFO interrupt:
//! speaker.service();
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `max98357a` | yes | MAX98357A amplifier driver (requires `embedded-hal`) |
//! | `defmt` | no | `defmt` logging and `defmt::Format` derives |
//!
//! ## Audio parameters
//!
//! - **Rates:** 8, 11.025, 16, 22.05, 32, 44.1, 48 kHz ([`constants::SUPPORTED_SAMPLE_RATES`])
//! - **Sample format:** 16-bit stereo, one `u32` word per frame
//! - **Storage:** 4096 bytes ([`constants::STORAGE_BYTES`])
//! - **Max packet:** 196 bytes ([`constants::MAX_PACKET_BYTES`])

#![no_std]

pub mod constants;
pub mod error;
pub mod clock;
pub mod stream;
pub mod i2s;
pub mod player;
pub mod control;
pub mod uac;
pub mod speaker;

#[cfg(feature = "max98357a")]
pub mod amp;


pub use error::Error;
