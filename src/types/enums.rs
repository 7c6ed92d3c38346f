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

    enums.rs

    Defines common enum types
*/
use crate::track::scanner::{ADDRESS_PROLOGUE_13, ADDRESS_PROLOGUE_16};
use std::{
    fmt,
    fmt::{Display, Formatter},
};
use strum::{Display as StrumDisplay, EnumIter, IntoEnumIterator};

/// The WOZ container revision, as identified by the file's magic bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WozVersion {
    Woz1,
    Woz2,
}

impl WozVersion {
    pub fn from_magic(magic: &[u8; 4]) -> Option<WozVersion> {
        WozVersion::iter().find(|version| version.magic() == magic)
    }

    pub fn magic(&self) -> &'static [u8; 4] {
        match self {
            WozVersion::Woz1 => b"WOZ1",
            WozVersion::Woz2 => b"WOZ2",
        }
    }
}

impl Display for WozVersion {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            WozVersion::Woz1 => write!(f, "WOZ 1"),
            WozVersion::Woz2 => write!(f, "WOZ 2"),
        }
    }
}

/// The physical kind of disk captured in a WOZ image, from the INFO chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiskKind {
    #[doc = "A 5.25\" Disk II diskette"]
    FiveAndQuarter,
    #[doc = "A 3.5\" diskette"]
    ThreeAndHalf,
    Unknown(u8),
}

impl From<u8> for DiskKind {
    fn from(value: u8) -> Self {
        match value {
            1 => DiskKind::FiveAndQuarter,
            2 => DiskKind::ThreeAndHalf,
            _ => DiskKind::Unknown(value),
        }
    }
}

impl Display for DiskKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            DiskKind::FiveAndQuarter => write!(f, "5.25\""),
            DiskKind::ThreeAndHalf => write!(f, "3.5\""),
            DiskKind::Unknown(v) => write!(f, "Unknown ({})", v),
        }
    }
}

/// The boot sector format field of a WOZ2 INFO chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, StrumDisplay)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BootSectorFormat {
    #[strum(to_string = "Unknown")]
    Unknown,
    #[strum(to_string = "16 sector")]
    Sectors16,
    #[strum(to_string = "13 sector")]
    Sectors13,
    #[strum(to_string = "Hybrid")]
    Hybrid,
}

impl From<u8> for BootSectorFormat {
    fn from(value: u8) -> Self {
        match value {
            1 => BootSectorFormat::Sectors16,
            2 => BootSectorFormat::Sectors13,
            3 => BootSectorFormat::Hybrid,
            _ => BootSectorFormat::Unknown,
        }
    }
}

/// The sector geometry of a 5.25" disk: either the DOS 3.2 era 13 sector format using 5-and-3
/// encoding, or the 16 sector format using 6-and-2 encoding. The geometry determines which
/// address prologue marks each sector and which interleave table maps sectors into the flat image.
///
/// Variants are declared in probing order; 16 sector disks are far more common.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SectorGeometry {
    Sectors16,
    Sectors13,
}

impl SectorGeometry {
    /// Return the number of sectors per track.
    pub fn sectors(&self) -> usize {
        match self {
            SectorGeometry::Sectors13 => 13,
            SectorGeometry::Sectors16 => 16,
        }
    }

    /// Return the three byte prologue that starts each address field.
    pub fn address_prologue(&self) -> &'static [u8; 3] {
        match self {
            SectorGeometry::Sectors13 => &ADDRESS_PROLOGUE_13,
            SectorGeometry::Sectors16 => &ADDRESS_PROLOGUE_16,
        }
    }
}

impl From<BootSectorFormat> for SectorGeometry {
    fn from(format: BootSectorFormat) -> Self {
        match format {
            BootSectorFormat::Sectors13 => SectorGeometry::Sectors13,
            _ => SectorGeometry::Sectors16,
        }
    }
}

impl Display for SectorGeometry {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} sector", self.sectors())
    }
}

/// The reason a sector was recorded as unreadable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SectorFault {
    #[doc = "No data prologue was found within range of the address field"]
    DataFieldMissing,
    #[doc = "The address field ran off the end of the track buffer"]
    TruncatedAddress,
    #[doc = "The data field was found but the sector decoder rejected it"]
    DataDecodeFailed,
    #[doc = "The address field names a track or sector outside the flat image"]
    OutOfGeometry,
    #[doc = "No address prologue could be found on the track"]
    NoAddressMarker,
}

impl Display for SectorFault {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            SectorFault::DataFieldMissing => write!(f, "data field missing"),
            SectorFault::TruncatedAddress => write!(f, "truncated address field"),
            SectorFault::DataDecodeFailed => write!(f, "data field decode failed"),
            SectorFault::OutOfGeometry => write!(f, "address outside disk geometry"),
            SectorFault::NoAddressMarker => write!(f, "no address marker"),
        }
    }
}

/// The overall outcome of assembling a single track.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackStatus {
    #[doc = "Every expected sector was found with a data field"]
    Complete,
    #[doc = "Some sectors were missing or lacked a data field"]
    Partial,
    #[doc = "The track's address prologue could not be resolved"]
    NoAddressMarker,
}

impl Display for TrackStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TrackStatus::Complete => write!(f, "Complete"),
            TrackStatus::Partial => write!(f, "Partial"),
            TrackStatus::NoAddressMarker => write!(f, "No address marker"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_probe_order() {
        let order: Vec<SectorGeometry> = SectorGeometry::iter().collect();
        assert_eq!(order, vec![SectorGeometry::Sectors16, SectorGeometry::Sectors13]);
    }

    #[test]
    fn test_boot_sector_format_geometry() {
        assert_eq!(SectorGeometry::from(BootSectorFormat::from(2)), SectorGeometry::Sectors13);
        assert_eq!(SectorGeometry::from(BootSectorFormat::from(1)), SectorGeometry::Sectors16);
        assert_eq!(SectorGeometry::from(BootSectorFormat::from(0)), SectorGeometry::Sectors16);
        assert_eq!(SectorGeometry::from(BootSectorFormat::from(3)), SectorGeometry::Sectors16);
        assert_eq!(BootSectorFormat::from(2).to_string(), "13 sector");
    }

    #[test]
    fn test_magic() {
        assert_eq!(WozVersion::from_magic(b"WOZ1"), Some(WozVersion::Woz1));
        assert_eq!(WozVersion::from_magic(b"WOZ2"), Some(WozVersion::Woz2));
        assert_eq!(WozVersion::from_magic(b"MOOF"), None);
        assert_eq!(WozVersion::from_magic(b"woz2"), None);
        for version in WozVersion::iter() {
            assert_eq!(WozVersion::from_magic(version.magic()), Some(version));
        }
        assert_eq!(DiskKind::from(1), DiskKind::FiveAndQuarter);
        assert_eq!(DiskKind::from(7), DiskKind::Unknown(7));
    }
}
