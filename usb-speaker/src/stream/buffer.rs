//! Linearising single-producer single-consumer byte ring.
//!
//! The USB stack writes each isochronous packet straight into the ring and
//! then reports its length through [`Producer::submit`], which hands back the
//! slot for the next packet. The I2S interrupt pulls one frame at a time
//! through [`Consumer::drain_one`].
//!
//! Unlike a modular ring, a packet is always written contiguously. When it
//! runs past `capacity` the spilled tail is copied back to the start of the
//! storage, so every buffered frame sits inside `[0, capacity)` and the read
//! path never splits a frame across the wrap. Storage is therefore
//! `capacity + MAX_PACKET_BYTES` bytes or more.
//!
//! ```text
//!  0          read                 write     capacity      N
//!  ├───────────┼━━━━━━━━━━━━━━━━━━━━┼────────────┼─ spill ─┤
//!              └── count bytes ─────┘
//! ```
//!
//! # Ownership
//!
//! [`StreamBuffer::split`] yields exactly one [`Producer`] and one
//! [`Consumer`]:
//!
//! - the producer owns `write_index` and increments `count`,
//! - the consumer owns `read_index` and decrements `count`.
//!
//! An overrun reset is the one place the producer also stores `read_index`.
//! That race is bounded: the consumer's decrement is a checked update, so
//! `count` never wraps, and every stored index stays inside the storage.

use core::cell::UnsafeCell;
use core::ptr;
use core::slice;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::constants::{BYTES_PER_FRAME, MAX_PACKET_BYTES, STORAGE_BYTES};

use super::frame::StereoFrame;

#[repr(C, align(4))]
struct Storage<const N: usize>([u8; N]);

/// Fixed-size stream buffer shared by the USB and I2S contexts.
///
/// `N` is the storage size in bytes. The active ring size is set with
/// [`Producer::resize`] and may not exceed `N - MAX_PACKET_BYTES`.
pub struct StreamBuffer<const N: usize = STORAGE_BYTES> {
    storage: UnsafeCell<Storage<N>>,
    capacity: AtomicUsize,
    write_index: AtomicUsize,
    read_index: AtomicUsize,
    count: AtomicUsize,
}

// SAFETY: the producer and consumer touch disjoint byte ranges of `storage`
// (free space vs. buffered frames) and coordinate through the atomic
// `count`, which is published with Release after the bytes are in place.
unsafe impl<const N: usize> Sync for StreamBuffer<N> {}
unsafe impl<const N: usize> Send for StreamBuffer<N> {}

impl<const N: usize> StreamBuffer<N> {
    /// Create an empty buffer with zero capacity.
    ///
    /// # Panics
    ///
    /// Compile-time assertion: `N` must hold at least two maximum packets.
    pub const fn new() -> Self {
        assert!(
            N >= 2 * MAX_PACKET_BYTES,
            "stream storage must hold at least two maximum-size packets"
        );

        StreamBuffer {
            storage: UnsafeCell::new(Storage([0; N])),
            capacity: AtomicUsize::new(0),
            write_index: AtomicUsize::new(0),
            read_index: AtomicUsize::new(0),
            count: AtomicUsize::new(0),
        }
    }

    /// Largest ring capacity this storage supports.
    pub const fn max_capacity() -> usize {
        (N - MAX_PACKET_BYTES) / BYTES_PER_FRAME * BYTES_PER_FRAME
    }

    /// Split into the USB-side producer and the I2S-side consumer.
    pub fn split(&mut self) -> (Producer<'_, N>, Consumer<'_, N>) {
        let buf: &StreamBuffer<N> = self;
        (
            Producer {
                buf,
                stats: StreamStats::default(),
            },
            Consumer { buf },
        )
    }

    fn base(&self) -> *mut u8 {
        self.storage.get().cast::<u8>()
    }

    fn clear(&self) {
        self.count.store(0, Ordering::Release);
        self.write_index.store(0, Ordering::Relaxed);
        self.read_index.store(0, Ordering::Relaxed);
    }
}

impl<const N: usize> Default for StreamBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer-side counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamStats {
    /// Packets that overflowed the ring and forced a reset.
    pub overruns: u32,
    /// Packets that crossed `capacity` and were folded back to the start.
    pub wraps: u32,
}

/// USB receive side of a [`StreamBuffer`].
pub struct Producer<'a, const N: usize = STORAGE_BYTES> {
    buf: &'a StreamBuffer<N>,
    stats: StreamStats,
}

impl<'a, const N: usize> Producer<'a, N> {
    /// Account for a packet of `len` bytes written at the current slot and
    /// return the slot for the next packet.
    ///
    /// A packet that would push `count` past `capacity`, or that claims more
    /// than `MAX_PACKET_BYTES`, resets the whole buffer: the packet is
    /// dropped and the next one lands at offset zero.
    ///
    /// The returned slice is `MAX_PACKET_BYTES` long and stays valid until
    /// the next call on this producer.
    pub fn submit(&mut self, len: usize) -> &mut [u8] {
        let capacity = self.buf.capacity.load(Ordering::Relaxed);
        let count = self.buf.count.load(Ordering::Acquire);

        if len > MAX_PACKET_BYTES || count + len > capacity {
            self.stats.overruns = self.stats.overruns.wrapping_add(1);

            #[cfg(feature = "defmt")]
            defmt::warn!(
                "stream overrun: {=usize} + {=usize} > {=usize}, resetting",
                count,
                len,
                capacity
            );

            self.buf.clear();
            return self.write_slot();
        }

        let mut write = self.buf.write_index.load(Ordering::Relaxed) + len;
        if write >= capacity {
            let spill = write - capacity;
            // SAFETY: `write < capacity + MAX_PACKET_BYTES <= N`, so both the
            // source `[capacity, write)` and destination `[0, spill)` lie in
            // storage. The destination is free space: the frames it held were
            // drained before `count` could make room for this packet.
            unsafe {
                let base = self.buf.base();
                ptr::copy(base.add(capacity), base, spill);
            }
            write = spill;
            self.stats.wraps = self.stats.wraps.wrapping_add(1);
        }

        self.buf.write_index.store(write, Ordering::Relaxed);
        // Release publishes the packet bytes (and the folded tail) before the
        // consumer can see the larger count.
        self.buf.count.fetch_add(len, Ordering::Release);
        self.write_slot()
    }

    /// The slot the next packet should be written into, without advancing.
    ///
    /// Hand this to the USB stack when arming the first transfer.
    pub fn write_slot(&mut self) -> &mut [u8] {
        let write = self.buf.write_index.load(Ordering::Relaxed);
        debug_assert!(write + MAX_PACKET_BYTES <= N);
        // SAFETY: `write < capacity <= N - MAX_PACKET_BYTES` (or zero), so the
        // slot is in bounds. It starts at the first free byte; a host that
        // writes past the free space is caught by the overrun check on the
        // next submit. The `&mut self` borrow keeps a second slot from being
        // handed out while this one is live.
        unsafe { slice::from_raw_parts_mut(self.buf.base().add(write), MAX_PACKET_BYTES) }
    }

    /// Drop all buffered data.
    ///
    /// Exact only while the drain interrupt is masked.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Set the ring size and reset the buffer.
    ///
    /// `capacity` is rounded down to whole frames and clamped to
    /// [`StreamBuffer::max_capacity`]. Returns the size applied. Call only
    /// while the drain interrupt is masked.
    pub fn resize(&mut self, capacity: usize) -> usize {
        let capacity = (capacity / BYTES_PER_FRAME * BYTES_PER_FRAME)
            .min(StreamBuffer::<N>::max_capacity());
        self.buf.capacity.store(capacity, Ordering::Relaxed);
        self.buf.clear();
        capacity
    }

    /// Bytes currently buffered.
    pub fn count(&self) -> usize {
        self.buf.count.load(Ordering::Acquire)
    }

    /// Active ring size in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.capacity.load(Ordering::Relaxed)
    }

    /// Offset the next packet will be written at.
    pub fn write_index(&self) -> usize {
        self.buf.write_index.load(Ordering::Relaxed)
    }

    /// Overrun and wrap counters since the producer was created.
    pub fn stats(&self) -> StreamStats {
        self.stats
    }
}

/// I2S drain side of a [`StreamBuffer`].
pub struct Consumer<'a, const N: usize = STORAGE_BYTES> {
    buf: &'a StreamBuffer<N>,
}

impl<'a, const N: usize> Consumer<'a, N> {
    /// Take the next frame, or `None` if less than one frame is buffered.
    pub fn drain_one(&mut self) -> Option<StereoFrame> {
        let read = self.buf.read_index.load(Ordering::Relaxed);
        if read + BYTES_PER_FRAME > N {
            return None;
        }

        // Claim the frame first so a concurrent reset can't drive count below zero.
        self.buf
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| {
                c.checked_sub(BYTES_PER_FRAME)
            })
            .ok()?;

        let mut bytes = [0u8; BYTES_PER_FRAME];
        // SAFETY: `read + BYTES_PER_FRAME <= N` was checked above, and the
        // Acquire on `count` makes the producer's bytes visible.
        unsafe {
            ptr::copy_nonoverlapping(
                self.buf.base().add(read),
                bytes.as_mut_ptr(),
                BYTES_PER_FRAME,
            );
        }

        let capacity = self.buf.capacity.load(Ordering::Relaxed);
        let mut next = read + BYTES_PER_FRAME;
        if next >= capacity {
            next = next.saturating_sub(capacity);
        }
        self.buf.read_index.store(next, Ordering::Relaxed);

        Some(StereoFrame::from_le_bytes(bytes))
    }

    /// Bytes currently buffered.
    pub fn count(&self) -> usize {
        self.buf.count.load(Ordering::Acquire)
    }

    /// Active ring size in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.capacity.load(Ordering::Relaxed)
    }

    /// Offset the next frame will be read from.
    pub fn read_index(&self) -> usize {
        self.buf.read_index.load(Ordering::Relaxed)
    }

    /// Check if no whole frame is buffered.
    pub fn is_empty(&self) -> bool {
        self.count() < BYTES_PER_FRAME
    }
}
