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

    src/sector_decoder.rs

    The interface to data field decoders.
*/

//! woznib locates data fields but does not translate them. Converting the
//! 343 (6-and-2) or 411 (5-and-3) disk nibbles of a data field into 256 bytes
//! is the job of a [SectorDecoder] supplied by the caller.

use crate::{types::SectorGeometry, SECTOR_SIZE};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SectorDecodeError {
    #[error("Invalid disk nibble {nibble:02X} at offset {offset}")]
    InvalidNibble { nibble: u8, offset: usize },
    #[error("Data field checksum mismatch")]
    Checksum,
    #[error("Data field runs past the end of the track")]
    Truncated,
}

/// A [SectorDecoder] converts the data field of a sector into decoded bytes.
///
/// `track_bytes` is the full nibble stream of the track and `data_offset` is the offset of the
/// field's `D5 AA AD` prologue; the encoded data begins three nibbles later. Decoders should verify
/// the field's own checksum. Any error is treated as if the data field were absent.
pub trait SectorDecoder: Sync {
    fn decode_sector(
        &self,
        geometry: SectorGeometry,
        track_bytes: &[u8],
        data_offset: usize,
    ) -> Result<[u8; SECTOR_SIZE], SectorDecodeError>;
}

/// Closures may be used as decoders.
impl<F> SectorDecoder for F
where
    F: Fn(SectorGeometry, &[u8], usize) -> Result<[u8; SECTOR_SIZE], SectorDecodeError> + Sync,
{
    fn decode_sector(
        &self,
        geometry: SectorGeometry,
        track_bytes: &[u8],
        data_offset: usize,
    ) -> Result<[u8; SECTOR_SIZE], SectorDecodeError> {
        self(geometry, track_bytes, data_offset)
    }
}
