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

    src/track/scanner.rs

    Marker search over a track's decoded nibble stream.
*/

//! Disk II tracks carry no explicit sector table. Sectors are found by
//! searching the nibble stream for the three byte prologues that start each
//! address and data field.

use crate::{track::Track, types::SectorGeometry};
use strum::IntoEnumIterator;

pub const ADDRESS_PROLOGUE_16: [u8; 3] = [0xD5, 0xAA, 0x96];
pub const ADDRESS_PROLOGUE_13: [u8; 3] = [0xD5, 0xAA, 0xB5];
pub const DATA_PROLOGUE: [u8; 3] = [0xD5, 0xAA, 0xAD];
pub const EPILOGUE: [u8; 3] = [0xDE, 0xAA, 0xEB];

/// The number of nibbles from an address prologue to the end of its checksum pair.
pub const ADDRESS_FIELD_LEN: usize = 11;
/// A data field farther than this from its address field belongs to another sector.
pub const DATA_FIELD_WINDOW: usize = 200;

/// Return the offset of the first occurrence of `marker` in `track_bytes` at or after `start`.
///
/// A match must leave at least one nibble after the marker, so the final position of the
/// buffer is never searched.
pub fn find_marker(track_bytes: &[u8], marker: &[u8; 3], start: usize) -> Option<usize> {
    let end = track_bytes.len().checked_sub(marker.len())?;
    if start >= end {
        return None;
    }
    track_bytes[start..end + marker.len() - 1]
        .windows(marker.len())
        .position(|window| window == marker)
        .map(|pos| pos + start)
}

/// Return true if the field ending at `offset` is closed by an epilogue. Some mastering tools
/// write DE AA Ex, so only the first two nibbles are compared. A missing epilogue never
/// invalidates a sector.
pub fn has_epilogue(track_bytes: &[u8], offset: usize) -> bool {
    track_bytes
        .get(offset..offset + 2)
        .is_some_and(|bytes| bytes == &EPILOGUE[..2])
}

/// Return the offset of the data field belonging to the address field at `address_offset`, or
/// `None` if the nearest data prologue is more than `window` nibbles away.
pub fn find_data_field(track_bytes: &[u8], address_offset: usize, window: usize) -> Option<usize> {
    match find_marker(track_bytes, &DATA_PROLOGUE, address_offset + ADDRESS_FIELD_LEN) {
        Some(offset) if offset <= address_offset + window => Some(offset),
        Some(offset) => {
            log::trace!(
                "find_data_field(): data prologue at {:04X} too far from address field at {:04X}",
                offset,
                address_offset
            );
            None
        }
        None => None,
    }
}

/// Determine the sector geometry of a track by looking for either address prologue.
pub fn probe_geometry(track: &Track) -> Option<SectorGeometry> {
    let track_bytes = track.track_bytes();
    SectorGeometry::iter().find(|geometry| find_marker(track_bytes, geometry.address_prologue(), 0).is_some())
}
