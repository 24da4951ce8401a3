//! Stream buffering between the USB receive path and the I2S drain path.
//!
//! ## Components
//!
//! | Type | Context | Description |
//! |------|---------|-------------|
//! | [`StreamBuffer`] | startup | Owns the storage; [`split`](StreamBuffer::split) once |
//! | [`Producer`] | USB isochronous OUT | [`submit`](Producer::submit) a packet, get the next slot |
//! | [`Consumer`] | I2S FIFO interrupt | [`drain_one`](Consumer::drain_one) frame at a time |
//! | [`StereoFrame`] | both | One packed 16-bit stereo frame |

mod buffer;
mod frame;

pub use buffer::{Consumer, Producer, StreamBuffer, StreamStats};
pub use frame::StereoFrame;
