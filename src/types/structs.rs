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

    structs.rs

    Defines common struct types
*/

use crate::{
    track::sector::Sector,
    types::{SectorFault, TrackStatus},
};
use std::{
    fmt,
    fmt::{Display, Formatter},
};

/// A [BadSector] describes a sector that could not be read into the flat sector image.
///
/// Address values are zero when the address field itself could not be decoded
/// ([SectorFault::TruncatedAddress] or [SectorFault::NoAddressMarker]). For
/// [SectorFault::NoAddressMarker] the `sector` field holds the expected sector number.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BadSector {
    /// The index of the TRKS entry this sector was read from.
    pub track_index: usize,
    pub volume: u8,
    pub track: u8,
    pub sector: u8,
    pub checksum: u8,
    pub address_offset: Option<usize>,
    pub data_offset: Option<usize>,
    pub fault: SectorFault,
}

impl BadSector {
    pub fn from_sector(sector: &Sector, fault: SectorFault) -> Self {
        BadSector {
            track_index: sector.track_index(),
            volume: sector.volume(),
            track: sector.track(),
            sector: sector.sector(),
            checksum: sector.checksum(),
            address_offset: Some(sector.address_offset()),
            data_offset: sector.data_offset(),
            fault,
        }
    }

    /// Create an entry for an expected sector on a track whose address field could not be found.
    pub fn unresolved(track_index: usize, sector: u8) -> Self {
        BadSector {
            track_index,
            volume: 0,
            track: 0,
            sector,
            checksum: 0,
            address_offset: None,
            data_offset: None,
            fault: SectorFault::NoAddressMarker,
        }
    }
}

impl Display for BadSector {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "[{:02}] Vol: {:02X}  Trk: {:02X}  Sct: {:02X}  Chk: {:02X}",
            self.track_index, self.volume, self.track, self.sector, self.checksum
        )?;
        match self.address_offset {
            Some(offset) => write!(f, "  Add: {:04X}", offset)?,
            None => write!(f, "  Add: ----")?,
        }
        match self.data_offset {
            Some(offset) => write!(f, "  Dat: {:04X}", offset)?,
            None => write!(f, "  Dat: ----")?,
        }
        write!(f, "  ({})", self.fault)
    }
}

/// A [TrackReport] summarizes the result of assembling one track, so that callers can tell a
/// perfectly readable disk from a partially corrupt one without walking the bad sector list.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackReport {
    pub track_index: usize,
    pub status: TrackStatus,
    pub sectors_found: usize,
    pub bad_sectors: usize,
    /// Sector numbers claimed by more than one address field on this track.
    pub duplicates: Vec<u8>,
}

impl TrackReport {
    pub fn is_complete(&self) -> bool {
        matches!(self.status, TrackStatus::Complete)
    }
}
