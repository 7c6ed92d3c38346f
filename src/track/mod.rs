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

    src/track/mod.rs

    Defines the Track type

*/
pub mod assembler;
pub mod scanner;
pub mod sector;

use crate::{bit_cursor::BitCursor, track::sector::Sector};
use bit_vec::BitVec;
use std::{
    fmt,
    fmt::{Display, Formatter},
    sync::OnceLock,
};

/// The TRKS entry a [Track] was read from. WOZ1 stores each track's bitstream inline in a fixed
/// size record, while WOZ2 stores a block address and length for data stored after the chunks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackGeometry {
    Woz1 {
        bytes_used: u16,
        bit_count: u16,
        splice_point: u16,
        splice_nibble: u8,
        splice_bit_count: u8,
    },
    Woz2 {
        starting_block: u16,
        block_count: u16,
        bit_count: u32,
    },
}

impl TrackGeometry {
    pub fn bit_count(&self) -> usize {
        match self {
            TrackGeometry::Woz1 { bit_count, .. } => *bit_count as usize,
            TrackGeometry::Woz2 { bit_count, .. } => *bit_count as usize,
        }
    }
}

/// A [Track] holds the bitstream of a single TRKS entry along with the sectors found on it.
///
/// The nibble stream produced by reading the bitstream is materialized on first use and kept
/// for the lifetime of the track.
#[derive(Debug)]
pub struct Track {
    index: usize,
    geometry: TrackGeometry,
    file_offset: usize,
    bits: BitVec,
    overrun: usize,
    track_bytes: OnceLock<(Vec<u8>, usize)>,
    sectors: Vec<Sector>,
}

impl Track {
    /// Create a new [Track] from the raw bitstream region `data`, which begins at `file_offset`
    /// in the image file.
    pub fn new(index: usize, geometry: TrackGeometry, file_offset: usize, data: &[u8], overrun: usize) -> Self {
        Track {
            index,
            geometry,
            file_offset,
            bits: BitVec::from_bytes(data),
            overrun,
            track_bytes: OnceLock::new(),
            sectors: Vec::new(),
        }
    }

    /// Return the index of the TRKS entry this track was read from.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }

    /// Return the offset of the track's bitstream within the image file.
    #[inline]
    pub fn file_offset(&self) -> usize {
        self.file_offset
    }

    #[inline]
    pub fn bit_count(&self) -> usize {
        self.geometry.bit_count()
    }

    /// A track with a zero bit count is unused and is never scanned.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bit_count() == 0
    }

    #[inline]
    pub fn bits(&self) -> &BitVec {
        &self.bits
    }

    /// Return a new [BitCursor] positioned at the start of the track.
    pub fn cursor(&self) -> BitCursor<'_> {
        BitCursor::new(&self.bits, self.bit_count())
    }

    fn nibbles(&self) -> &(Vec<u8>, usize) {
        self.track_bytes.get_or_init(|| {
            log::trace!("Track {}: materializing {} bits", self.index, self.bit_count());
            self.cursor().read_track_indexed(self.overrun)
        })
    }

    /// Return the decoded nibble stream of the track, reading the bitstream on first access.
    /// The stream runs past the index by the configured overrun.
    pub fn track_bytes(&self) -> &[u8] {
        &self.nibbles().0
    }

    /// Return the number of nibbles in [Track::track_bytes] that start before the index.
    /// Anything after this offset repeats the start of the track.
    pub fn revolution_len(&self) -> usize {
        self.nibbles().1
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sector> {
        self.sectors.iter()
    }

    pub(crate) fn set_sectors(&mut self, sectors: Vec<Sector>) {
        self.sectors = sectors;
    }
}

impl<'a> IntoIterator for &'a Track {
    type Item = &'a Sector;
    type IntoIter = std::slice::Iter<'a, Sector>;

    fn into_iter(self) -> Self::IntoIter {
        self.sectors.iter()
    }
}

impl Display for Track {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.geometry {
            TrackGeometry::Woz1 {
                bytes_used, bit_count, ..
            } => writeln!(f, "WOZ1: Bytes: {:5}  Bits: {:8}", bytes_used, bit_count)?,
            TrackGeometry::Woz2 {
                starting_block,
                block_count,
                bit_count,
            } => writeln!(
                f,
                "WOZ2: Start: {:4}  Blocks: {:2}  Bits: {:8}",
                starting_block, block_count, bit_count
            )?,
        }
        for (i, sector) in self.sectors.iter().enumerate() {
            writeln!(f, "{:2}  {}", i, sector)?;
        }
        Ok(())
    }
}
