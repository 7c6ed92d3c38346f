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

//! # woznib
//!
//! woznib decodes WOZ disk images - bit-accurate captures of Apple II floppy
//! disks produced by the Applesauce project - and reconstructs the logical
//! sectors recorded on them.
//!
//! Decoding proceeds in stages:
//! * The WOZ container is validated (magic, CRC32) and its chunks are parsed.
//! * Each track's bitstream is read with a [BitCursor], which frames
//!   self-sync disk nibbles the way a Disk II controller would.
//! * Address and data fields are located by their prologue markers, and each
//!   address field's 4-and-4 encoded header is decoded into a [Sector].
//! * Sectors are placed into a flat, interleaved sector image. The 6-and-2 /
//!   5-and-3 translation of data fields is delegated to a caller supplied
//!   [SectorDecoder].
//!
//! The result is a [DiskImage] holding the flat sector buffer along with a
//! list of [BadSector]s that could not be read.

pub mod bit_cursor;
pub mod diskimage;
pub mod file_parsers;
pub mod image_builder;
pub mod sector_decoder;
pub mod track;
pub mod types;

use thiserror::Error;

/// The size in bytes of a decoded Apple II sector.
pub const SECTOR_SIZE: usize = 256;
/// The number of tracks represented in a flat 5.25" sector image.
pub const DISK_TRACKS: usize = 35;
/// The WOZ2 block size. Track data offsets are expressed in blocks.
pub const BLOCK_SIZE: usize = 512;

/// The map type used for META entries. Ordered so that output is deterministic.
pub type WozHashMap<K, V> = std::collections::BTreeMap<K, V>;

/// Fatal problems with the structure of a WOZ container. Any of these aborts the decode.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("WOZ magic bytes not found: {0:02X?}")]
    BadMagic([u8; 4]),
    #[error("Header CRC mismatch: stored {stored:08X} calculated {calculated:08X}")]
    ChecksumMismatch { stored: u32, calculated: u32 },
    #[error("Missing required chunk: {0}")]
    MissingChunk(&'static str),
    #[error("Image is truncated or malformed: {0}")]
    Truncated(String),
    #[error("Track {track} data lies outside the image ({detail})")]
    TrackBounds { track: usize, detail: String },
    #[error("No address prologue found on any track")]
    NoAddressMarker,
    #[error("Unsupported WOZ INFO version: {0}")]
    UnsupportedVersion(u8),
}

#[derive(Debug, Error)]
pub enum DiskImageError {
    #[error("An IO error occurred reading the disk image: {0}")]
    IoError(String),
    #[error("The WOZ parser rejected the image: {0}")]
    FormatError(#[from] FormatError),
}

impl From<std::io::Error> for DiskImageError {
    fn from(err: std::io::Error) -> Self {
        DiskImageError::IoError(err.to_string())
    }
}

impl From<binrw::Error> for DiskImageError {
    fn from(err: binrw::Error) -> Self {
        DiskImageError::FormatError(FormatError::Truncated(err.to_string()))
    }
}

pub use crate::{
    bit_cursor::BitCursor,
    diskimage::DiskImage,
    file_parsers::{
        r#as::woz::{WozFormat, WozInfo, WozInfoV2},
        ParserReadOptions,
    },
    image_builder::{interleave_table, DiskImageBuilder},
    sector_decoder::{SectorDecodeError, SectorDecoder},
    track::{
        sector::{AddressField, Sector},
        Track,
        TrackGeometry,
    },
    types::{
        BadSector,
        BootSectorFormat,
        CompatibleHardware,
        DiskKind,
        SectorFault,
        SectorGeometry,
        TrackReport,
        TrackStatus,
        WozVersion,
    },
};

pub mod prelude {
    pub use crate::{
        types::{BadSector, DiskKind, SectorFault, SectorGeometry, TrackReport, TrackStatus, WozVersion},
        DiskImage,
        DiskImageError,
        FormatError,
        ParserReadOptions,
        SectorDecodeError,
        SectorDecoder,
        SECTOR_SIZE,
    };
}
