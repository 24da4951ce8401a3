/// Sample rates the speaker advertises, in ascending order.
pub const SUPPORTED_SAMPLE_RATES: [u32; 7] =
    [8_000, 11_025, 16_000, 22_050, 32_000, 44_100, 48_000];

/// Highest sample rate a host may select, in Hz.
pub const MAX_SAMPLE_RATE: u32 = 48_000;

/// Sample rate selected at power-on, before the host sends a request.
pub const DEFAULT_SAMPLE_RATE: u32 = MAX_SAMPLE_RATE;

/// Number of interleaved channels in the stream (stereo).
pub const CHANNELS: u32 = 2;

/// Bits per sample (signed 16-bit PCM).
pub const BITS_PER_SAMPLE: u32 = 16;

/// Bytes per stereo frame: one `i16` for each channel.
pub const BYTES_PER_FRAME: usize = 4;

/// Total bytes of ring storage, including the spare tail for wraparound.
pub const STORAGE_BYTES: usize = 4096;

/// Largest isochronous packet the USB stack may write in one transfer.
///
/// 48 one-millisecond frames at 48 kHz plus one extra frame for hosts that
/// pad packets to keep their own clock in step.
pub const MAX_PACKET_BYTES: usize = 196;

/// Number of 1 ms packets the working buffer holds before doubling.
pub const WORKING_PACKETS: u32 = 10;

/// Fixed working size for the 11.025 kHz rate family, in bytes.
///
/// These rates deliver 44/45-frame packets at 44.1 kHz, so the buffer is
/// sized for the fastest member of the family.
pub const CD_FAMILY_WORKING_BYTES: usize = 1764;

/// Depth of the I2S transmit FIFO, in frames.
pub const FIFO_DEPTH: usize = 8;

/// The FIFO is refilled when its level drops to this many frames or fewer.
pub const FIFO_REFILL_LEVEL: usize = 4;

/// Fill level (as `numerator / 8` of capacity) at which playback speeds up.
pub const HIGH_WATERMARK_EIGHTHS: usize = 5;

/// Fill level (as `numerator / 8` of capacity) below which playback returns
/// to normal speed.
pub const LOW_WATERMARK_EIGHTHS: usize = 3;
