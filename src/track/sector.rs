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

    src/track/sector.rs

    Address fields and the sectors they identify.
*/
use crate::track::scanner::ADDRESS_FIELD_LEN;
use std::{
    fmt,
    fmt::{Display, Formatter},
};

/// Decode a 4-and-4 encoded value. The odd bits of the value are stored in the first nibble and
/// the even bits in the second, each interleaved with 1 bits to satisfy the disk's bit rules.
#[inline]
pub fn decode_44(odd: u8, even: u8) -> u8 {
    ((odd << 1) | 0x01) & even
}

/// The decoded contents of an address field: `D5 AA 96 VV VV TT TT SS SS CC CC`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddressField {
    pub volume: u8,
    pub track: u8,
    pub sector: u8,
    pub checksum: u8,
}

impl AddressField {
    /// Decode the address field whose prologue starts at `offset`. Returns `None` if the buffer
    /// ends before the checksum pair.
    pub fn decode(track_bytes: &[u8], offset: usize) -> Option<AddressField> {
        let field = track_bytes.get(offset..offset + ADDRESS_FIELD_LEN)?;
        Some(AddressField {
            volume: decode_44(field[3], field[4]),
            track: decode_44(field[5], field[6]),
            sector: decode_44(field[7], field[8]),
            checksum: decode_44(field[9], field[10]),
        })
    }

    /// The stored checksum is the XOR of volume, track and sector.
    pub fn checksum_valid(&self) -> bool {
        self.volume ^ self.track ^ self.sector == self.checksum
    }
}

/// A [Sector] found on a track. A sector refers back to the track it was found on by TRKS index;
/// the track owns its sectors.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sector {
    track_index: usize,
    address: AddressField,
    address_offset: usize,
    data_offset: Option<usize>,
}

impl Sector {
    pub fn new(track_index: usize, address: AddressField, address_offset: usize, data_offset: Option<usize>) -> Self {
        Sector {
            track_index,
            address,
            address_offset,
            data_offset,
        }
    }

    #[inline]
    pub fn track_index(&self) -> usize {
        self.track_index
    }

    #[inline]
    pub fn address(&self) -> &AddressField {
        &self.address
    }

    #[inline]
    pub fn volume(&self) -> u8 {
        self.address.volume
    }

    /// Return the track number recorded in the address field.
    #[inline]
    pub fn track(&self) -> u8 {
        self.address.track
    }

    /// Return the physical sector number recorded in the address field.
    #[inline]
    pub fn sector(&self) -> u8 {
        self.address.sector
    }

    #[inline]
    pub fn checksum(&self) -> u8 {
        self.address.checksum
    }

    /// Return the offset of the address prologue within the track's nibble stream.
    #[inline]
    pub fn address_offset(&self) -> usize {
        self.address_offset
    }

    /// Return the offset of the data prologue within the track's nibble stream, if one was found.
    #[inline]
    pub fn data_offset(&self) -> Option<usize> {
        self.data_offset
    }

    pub fn is_duplicate(&self, other: &Sector) -> bool {
        self.address.sector == other.address.sector
    }
}

impl Display for Sector {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "Vol: {:02X}  Trk: {:02X}  Sct: {:02X}  Chk: {:02X}  Add: {:04X}  Dat: ",
            self.address.volume, self.address.track, self.address.sector, self.address.checksum, self.address_offset
        )?;
        match self.data_offset {
            Some(offset) => write!(f, "{:04X}", offset),
            None => Ok(()),
        }
    }
}
