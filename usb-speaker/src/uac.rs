//! Audio-class control payloads for the sampling-frequency control.
//!
//! | Request | Encoding |
//! |---------|----------|
//! | UAC1 endpoint `SET_CUR` / `GET_CUR` | 3-byte little-endian Hz |
//! | UAC2 clock source `CUR` | 4-byte little-endian Hz |
//! | UAC2 clock source `RANGE` | `wNumSubRanges` (u16 LE) + `{min, max, res}` u32 LE triples |
//! | UAC2 clock `VALID` | one byte, always `0x01` |
//!
//! Everything here writes into caller-provided buffers; nothing allocates.

use crate::constants::SUPPORTED_SAMPLE_RATES;
use crate::error::Error;

/// Reply to a UAC2 clock-valid `GET_CUR`: the clock is always valid.
pub const CLOCK_VALID: [u8; 1] = [0x01];

/// Size of a full RANGE reply for every supported rate.
pub const RANGE_REPLY_BYTES: usize = 2 + SUPPORTED_SAMPLE_RATES.len() * 12;

/// Width of a sampling-frequency payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RateEncoding {
    /// Audio class 1.0 endpoint control, 3 bytes.
    Uac1,
    /// Audio class 2.0 clock source control, 4 bytes.
    Uac2,
}

impl RateEncoding {
    /// Payload length in bytes.
    pub const fn width(self) -> usize {
        match self {
            RateEncoding::Uac1 => 3,
            RateEncoding::Uac2 => 4,
        }
    }
}

/// Decode a sampling frequency from a `SET_CUR` payload.
///
/// Trailing bytes past the encoding's width are ignored.
pub fn decode_rate(data: &[u8], encoding: RateEncoding) -> Result<u32, Error> {
    let n = encoding.width();
    if data.len() < n {
        return Err(Error::ShortRequest(data.len()));
    }
    let mut bytes = [0u8; 4];
    bytes[..n].copy_from_slice(&data[..n]);
    Ok(u32::from_le_bytes(bytes))
}

/// Encode `rate` for a `GET_CUR` reply. Returns the bytes written, which is
/// less than the encoding width only if `out` is too short.
pub fn encode_rate(rate: u32, encoding: RateEncoding, out: &mut [u8]) -> usize {
    let bytes = rate.to_le_bytes();
    let n = encoding.width().min(out.len());
    out[..n].copy_from_slice(&bytes[..n]);
    n
}

/// Write a RANGE reply listing each rate as a discrete sub-range
/// (`min == max`, `res == 0`). The reply is truncated to `out`; the return
/// value is the number of bytes written.
pub fn write_rate_ranges<I>(rates: I, out: &mut [u8]) -> usize
where
    I: IntoIterator<Item = u32>,
{
    let mut reply = [0u8; RANGE_REPLY_BYTES];
    let mut len = 2;
    let mut subranges: u16 = 0;

    for rate in rates {
        if len + 12 > reply.len() {
            break;
        }
        reply[len..len + 4].copy_from_slice(&rate.to_le_bytes());
        reply[len + 4..len + 8].copy_from_slice(&rate.to_le_bytes());
        reply[len + 8..len + 12].copy_from_slice(&0u32.to_le_bytes());
        len += 12;
        subranges += 1;
    }
    reply[..2].copy_from_slice(&subranges.to_le_bytes());

    let n = len.min(out.len());
    out[..n].copy_from_slice(&reply[..n]);
    n
}

/// Write the clock-valid reply. Returns the bytes written (0 or 1).
pub fn write_clock_valid(out: &mut [u8]) -> usize {
    let n = CLOCK_VALID.len().min(out.len());
    out[..n].copy_from_slice(&CLOCK_VALID[..n]);
    n
}
