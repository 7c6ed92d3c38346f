/*
    woznib

    Copyright 2024-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------
*/

//! A [BitCursor] is a circular reader over the bitstream of a WOZ track. A disk
//! track is a continuous topological ring, and a read head will happily pass
//! the index mark and continue reading from the start of the track. The cursor
//! emulates this by wrapping back to the start of the track when it reaches the
//! track's declared bit count, counting each wrap as a `revolution`.
//!
//! The declared bit count rarely falls on a byte boundary, so the wrap point is
//! usually somewhere inside the last byte of the track buffer.

use bit_vec::BitVec;

/// The number of extra disk nibbles read past one revolution when materializing a track.
/// Reading past the wrap point guarantees that a field spanning the index is captured whole.
pub const TRACK_OVERRUN_BYTES: usize = 520;

/// A [BitCursor] reads the bits of a track region MSB first, wrapping at the declared bit count.
///
/// Byte and bit indices are relative to the start of the track's bit region.
#[derive(Clone, Debug)]
pub struct BitCursor<'a> {
    bits: &'a BitVec,
    bit_count: usize,
    track_index: usize,
    byte_index: usize,
    bit_index: usize,
    revolutions: usize,
}

impl<'a> BitCursor<'a> {
    /// Create a new [BitCursor] over `bits`, wrapping after `bit_count` bits.
    /// `bit_count` is limited to the length of the underlying [BitVec].
    pub fn new(bits: &'a BitVec, bit_count: usize) -> BitCursor<'a> {
        if bit_count > bits.len() {
            log::warn!(
                "BitCursor::new(): bit count {} exceeds track buffer of {} bits",
                bit_count,
                bits.len()
            );
        }
        BitCursor {
            bits,
            bit_count: std::cmp::min(bit_count, bits.len()),
            track_index: 0,
            byte_index: 0,
            bit_index: 0,
            revolutions: 0,
        }
    }

    /// Return the cursor to the start of the track. The revolution counter is preserved.
    pub fn reset(&mut self) {
        self.track_index = 0;
        self.byte_index = 0;
        self.bit_index = 0;
    }

    #[inline]
    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    /// Return the absolute bit position within the current revolution.
    #[inline]
    pub fn track_index(&self) -> usize {
        self.track_index
    }

    #[inline]
    pub fn byte_index(&self) -> usize {
        self.byte_index
    }

    #[inline]
    pub fn bit_index(&self) -> usize {
        self.bit_index
    }

    /// Return the number of times the cursor has passed the end of the track.
    #[inline]
    pub fn revolutions(&self) -> usize {
        self.revolutions
    }

    /// Read the bit under the cursor and advance by one bit, wrapping to the start of the track
    /// when the declared bit count is reached.
    pub fn next_bit(&mut self) -> bool {
        let bit = self
            .bits
            .get(self.byte_index * 8 + self.bit_index)
            .unwrap_or(false);

        self.track_index += 1;
        if self.track_index >= self.bit_count {
            self.revolutions += 1;
            self.reset();
        }
        else {
            self.bit_index += 1;
            if self.bit_index >= 8 {
                self.byte_index += 1;
                self.bit_index = 0;
            }
        }

        bit
    }

    /// Read one self-synchronized disk nibble. Bits are shifted in until a 1 bit lands in the
    /// most significant position; leading zero bits are sync filler and are absorbed.
    ///
    /// Returns `None` if a full revolution passes without framing a nibble, which can only
    /// happen if the track contains no 1 bits at all.
    pub fn next_byte(&mut self) -> Option<u8> {
        let limit = self.bit_count + 8;
        let mut byte = 0u8;
        let mut consumed = 0;

        while byte & 0x80 == 0 {
            if consumed >= limit {
                return None;
            }
            byte = (byte << 1) | self.next_bit() as u8;
            consumed += 1;
        }
        Some(byte)
    }

    /// Read one revolution worth of disk nibbles plus `overrun` additional nibbles.
    /// The result is shorter than requested only if the track cannot frame a nibble.
    pub fn read_track(&mut self, overrun: usize) -> Vec<u8> {
        self.read_track_indexed(overrun).0
    }

    /// Like [BitCursor::read_track], but also return the number of nibbles that began before the
    /// cursor first passed the index. Nibbles at or beyond that position repeat the start of the
    /// track.
    pub fn read_track_indexed(&mut self, overrun: usize) -> (Vec<u8>, usize) {
        let byte_ct = self.bit_count.div_ceil(8) + overrun;
        let start_revolution = self.revolutions;
        let mut track_bytes = Vec::with_capacity(byte_ct);
        let mut revolution_len = 0;

        for _ in 0..byte_ct {
            let first_revolution = self.revolutions == start_revolution;
            match self.next_byte() {
                Some(byte) => track_bytes.push(byte),
                None => {
                    log::warn!("read_track(): track of {} bits contains no flux transitions", self.bit_count);
                    break;
                }
            }
            if first_revolution {
                revolution_len = track_bytes.len();
            }
        }
        log::trace!(
            "read_track(): read {} nibbles over {} revolution(s), {} before the index",
            track_bytes.len(),
            self.revolutions,
            revolution_len
        );
        (track_bytes, revolution_len)
    }
}

impl Iterator for BitCursor<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bit_count == 0 {
            return None;
        }
        Some(self.next_bit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraparound() {
        let bits = BitVec::from_bytes(&[0xFF, 0x00, 0xAA]);
        let mut cursor = BitCursor::new(&bits, 20);

        for _ in 0..19 {
            cursor.next_bit();
        }
        assert_eq!(cursor.revolutions(), 0);
        assert_eq!(cursor.track_index(), 19);
        assert_eq!(cursor.byte_index(), 2);
        assert_eq!(cursor.bit_index(), 3);

        cursor.next_bit();
        assert_eq!(cursor.revolutions(), 1);
        assert_eq!(cursor.track_index(), 0);
        assert_eq!(cursor.byte_index(), 0);
        assert_eq!(cursor.bit_index(), 0);

        // The first bit of the second revolution is the first bit of the track.
        assert!(cursor.next_bit());
    }

    #[test]
    fn test_wraparound_every_revolution() {
        let bits = BitVec::from_bytes(&[0b1010_1010, 0b1100_0000]);
        let mut cursor = BitCursor::new(&bits, 10);

        let first: Vec<bool> = cursor.by_ref().take(10).collect();
        let second: Vec<bool> = cursor.by_ref().take(10).collect();
        assert_eq!(first, second);
        assert_eq!(cursor.revolutions(), 2);
    }

    #[test]
    fn test_self_sync_byte() {
        // 0 0 1 1 0 1 0 1 0 1 1
        let bits = BitVec::from_bytes(&[0b0011_0101, 0b0110_0000]);
        let mut cursor = BitCursor::new(&bits, 11);

        assert_eq!(cursor.next_byte(), Some(0b1101_0101));
        // Ten bits were consumed: two sync zeros and eight data bits.
        assert_eq!(cursor.track_index(), 10);
    }

    #[test]
    fn test_no_flux_transitions() {
        let bits = BitVec::from_bytes(&[0x00, 0x00]);
        let mut cursor = BitCursor::new(&bits, 16);

        assert_eq!(cursor.next_byte(), None);
        assert!(cursor.read_track(TRACK_OVERRUN_BYTES).is_empty());
    }

    #[test]
    fn test_read_track_length() {
        let bits = BitVec::from_bytes(&[0xD5, 0xAA, 0x96, 0xFF]);
        let mut cursor = BitCursor::new(&bits, 30);

        let track = cursor.read_track(4);
        assert_eq!(track.len(), 4 + 4);
        assert_eq!(&track[0..3], &[0xD5, 0xAA, 0x96]);
    }

    #[test]
    fn test_read_track_revolution_len() {
        // Four nibbles per revolution, the last one ending exactly at the index.
        let bits = BitVec::from_bytes(&[0xD5, 0xAA, 0x96, 0xFF]);
        let mut cursor = BitCursor::new(&bits, 32);

        let (track, revolution_len) = cursor.read_track_indexed(6);
        assert_eq!(track.len(), 4 + 6);
        assert_eq!(revolution_len, 4);
        assert_eq!(&track[4..8], &[0xD5, 0xAA, 0x96, 0xFF]);

        // A nibble straddling the index counts toward the first revolution.
        let bits = BitVec::from_bytes(&[0xFF, 0xD5, 0xAA, 0x96]);
        let mut cursor = BitCursor::new(&bits, 28);

        let (track, revolution_len) = cursor.read_track_indexed(4);
        assert_eq!(revolution_len, 4);
        assert_eq!(&track[0..3], &[0xFF, 0xD5, 0xAA]);
    }

    #[test]
    fn test_bit_count_clamped() {
        let bits = BitVec::from_bytes(&[0xFF]);
        let cursor = BitCursor::new(&bits, 100);
        assert_eq!(cursor.bit_count(), 8);
    }
}
