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

//! File format parser for the WOZ disk image format.
//! WOZ images store bit-level captures of Apple II 5.25" and 3.5" disks.
//! The format was developed by the author of the Applesauce project.
//! https://applesaucefdc.com/woz/reference2/

use crate::{
    file_parsers::{r#as::crc::applesauce_crc32, ParserReadOptions},
    track::{Track, TrackGeometry},
    types::{BootSectorFormat, CompatibleHardware, DiskKind, SectorGeometry, WozVersion},
    DiskImageError,
    FormatError,
    WozHashMap,
    BLOCK_SIZE,
};
use binrw::{binrw, BinRead};
use std::io::Cursor;

pub const WOZ_HEADER_SIZE: usize = 12;
pub const WOZ_LINE_ENDING: [u8; 4] = [0xFF, 0x0A, 0x0D, 0x0A];
pub const CHUNK_HEADER_SIZE: usize = 8;
pub const TMAP_SIZE: usize = 160;

/// The size of a WOZ1 TRKS record: the bitstream followed by ten bytes of track metadata.
pub const TRK_V1_RECORD_SIZE: usize = 6656;
/// The size of the bitstream region of a WOZ1 TRKS record.
pub const TRK_V1_DATA_SIZE: usize = 6646;
pub const TRK_V1_MAX_TRACKS: usize = 35;
pub const TRK_V2_RECORD_SIZE: usize = 8;
pub const TRK_V2_MAX_TRACKS: usize = 160;

#[binrw]
#[brw(little)]
pub struct WozHeader {
    magic: [u8; 4],
    line_ending: [u8; 4],
    crc: u32,
}

#[binrw]
#[brw(little)]
pub struct WozChunkHeader {
    id:   [u8; 4],
    size: u32,
}

/// The contents of the INFO chunk.
#[derive(BinRead, Clone, Debug)]
#[br(little)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WozInfo {
    pub version: u8,
    #[br(map = |x: u8| DiskKind::from(x))]
    pub disk_kind: DiskKind,
    #[br(map = |x: u8| x != 0)]
    pub write_protected: bool,
    #[br(map = |x: u8| x != 0)]
    pub synchronized: bool,
    #[br(map = |x: u8| x != 0)]
    pub cleaned: bool,
    #[br(map = |x: [u8; 32]| String::from_utf8_lossy(&x).trim_end().to_string())]
    pub creator: String, // 32-byte UTF-8 string padded with spaces
    #[br(if(version >= 2))]
    pub v2: Option<WozInfoV2>,
}

/// Fields added to the INFO chunk in version 2.
#[derive(BinRead, Clone, Debug)]
#[br(little)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WozInfoV2 {
    pub sides: u8,
    #[br(map = |x: u8| BootSectorFormat::from(x))]
    pub boot_sector_format: BootSectorFormat,
    /// Bit timing in 125ns increments. 32 (4us) is standard for 5.25" disks.
    pub optimal_bit_timing: u8,
    #[br(map = |x: u16| CompatibleHardware::from_bits_retain(x))]
    pub compatible_hardware: CompatibleHardware,
    /// Minimum RAM in kilobytes. 0 if unknown.
    pub required_ram: u16,
    /// The block count of the largest track.
    pub largest_track: u16,
}

impl WozInfo {
    /// Return the sector geometry declared by a version 2 INFO chunk. Version 1 INFO chunks do not
    /// declare a geometry and it must be probed from the tracks.
    pub fn declared_geometry(&self) -> Option<SectorGeometry> {
        self.v2.as_ref().map(|v2| SectorGeometry::from(v2.boot_sector_format))
    }
}

#[binrw]
#[br(little)]
pub struct TMapChunk {
    pub(crate) track_map: [u8; TMAP_SIZE],
}

#[derive(BinRead)]
#[br(little)]
pub struct TrkV1 {
    #[br(pad_before = 6646)]
    bytes_used: u16,
    bit_count: u16,
    splice_point: u16,
    splice_nibble: u8,
    splice_bit_count: u8,
    _reserved: u16,
}

#[derive(BinRead)]
#[br(little)]
pub struct TrkV2 {
    starting_block: u16,
    block_count: u16,
    bit_count: u32,
}

/// Everything read from a WOZ container before sector assembly.
#[derive(Debug)]
pub struct WozContainer {
    pub version: WozVersion,
    pub info: WozInfo,
    pub track_map: Option<[u8; TMAP_SIZE]>,
    pub meta: WozHashMap<String, String>,
    pub tracks: Vec<Track>,
}

pub struct WozFormat;

impl WozFormat {
    pub fn extensions() -> Vec<&'static str> {
        vec!["woz"]
    }

    /// Return true if `bytes` begins with a WOZ1 or WOZ2 magic.
    pub fn detect(bytes: &[u8]) -> bool {
        let mut detected = false;
        if let Ok(file_header) = WozHeader::read(&mut Cursor::new(bytes)) {
            detected = WozVersion::from_magic(&file_header.magic).is_some();
        }
        detected
    }

    /// Validate the header and CRC of the image in `bytes`, then read its chunks and tracks.
    pub fn parse(bytes: &[u8], opts: &ParserReadOptions) -> Result<WozContainer, DiskImageError> {
        log::debug!("Image size: {} bytes", bytes.len());

        let mut magic = [0u8; 4];
        let prefix = bytes.len().min(4);
        magic[..prefix].copy_from_slice(&bytes[..prefix]);
        let Some(version) = WozVersion::from_magic(&magic)
        else {
            log::error!("WOZ magic bytes not found");
            return Err(FormatError::BadMagic(magic).into());
        };

        let file_header = WozHeader::read(&mut Cursor::new(bytes))?;
        if file_header.line_ending != WOZ_LINE_ENDING {
            log::warn!("Unexpected header line ending bytes: {:02X?}", file_header.line_ending);
        }

        let crc = applesauce_crc32(&bytes[WOZ_HEADER_SIZE..], 0);
        log::debug!("Header CRC: {:0X?} Calculated CRC: {:0X?}", file_header.crc, crc);
        if file_header.crc != crc {
            if file_header.crc == 0 && opts.allow_zero_crc {
                log::warn!("Header CRC is zero, skipping CRC check");
            }
            else {
                return Err(FormatError::ChecksumMismatch {
                    stored: file_header.crc,
                    calculated: crc,
                }
                .into());
            }
        }

        let mut info_opt = None;
        let mut track_map = None;
        let mut trks_opt = None;
        let mut meta = WozHashMap::new();

        log::debug!("Reading chunks...");
        let mut offset = WOZ_HEADER_SIZE;
        while let Some((chunk_header, body_offset)) = Self::read_chunk(bytes, offset)? {
            let body = &bytes[body_offset..body_offset + chunk_header.size as usize];
            match &chunk_header.id {
                b"INFO" => {
                    let info = WozInfo::read(&mut Cursor::new(body))?;
                    log::debug!(
                        "Got Info Chunk: version: {} Disk Type: {} Creator: {}",
                        info.version,
                        info.disk_kind,
                        info.creator
                    );
                    info_opt = Some(info);
                }
                b"TMAP" => {
                    log::debug!("Got Track Map Chunk");
                    let tmap = TMapChunk::read(&mut Cursor::new(body))?;
                    track_map = Some(tmap.track_map);
                }
                b"TRKS" => {
                    log::debug!("Got Tracks Chunk: {} bytes at offset {}", body.len(), body_offset);
                    // Records are laid out according to the INFO version, which may not be known yet.
                    trks_opt = Some((body_offset, body.len()));
                }
                b"META" => {
                    meta = Self::parse_meta(&String::from_utf8_lossy(body));
                    log::debug!("Metadata KV pairs:");
                    for (key, value) in meta.iter() {
                        log::debug!("{}: {}", key, value);
                    }
                }
                id => {
                    log::debug!("Skipping chunk {:?} ({} bytes)", String::from_utf8_lossy(id), body.len());
                }
            }
            offset = body_offset + chunk_header.size as usize;
        }

        let Some(info) = info_opt
        else {
            log::error!("Missing Info chunk");
            return Err(FormatError::MissingChunk("INFO").into());
        };
        let Some((trks_offset, trks_len)) = trks_opt
        else {
            log::error!("Missing Tracks chunk");
            return Err(FormatError::MissingChunk("TRKS").into());
        };

        if (info.version == 1) != (version == WozVersion::Woz1) {
            log::warn!(
                "INFO version {} does not match {} container, using INFO version",
                info.version,
                version
            );
        }

        let tracks = Self::read_tracks(bytes, trks_offset, trks_len, info.version, opts)?;
        log::debug!("Read {} tracks", tracks.len());

        Ok(WozContainer {
            version,
            info,
            track_map,
            meta,
            tracks,
        })
    }

    /// Read the chunk header at `offset`. Returns the header and the offset of the chunk body, or
    /// `None` when there is no room left for another chunk.
    fn read_chunk(bytes: &[u8], offset: usize) -> Result<Option<(WozChunkHeader, usize)>, DiskImageError> {
        if offset + CHUNK_HEADER_SIZE > bytes.len() {
            if offset < bytes.len() {
                log::debug!("Ignoring {} trailing bytes", bytes.len() - offset);
            }
            log::debug!("No more chunks found in WOZ image");
            return Ok(None);
        }

        let chunk_header = WozChunkHeader::read(&mut Cursor::new(&bytes[offset..]))?;
        let body_offset = offset + CHUNK_HEADER_SIZE;
        if body_offset.saturating_add(chunk_header.size as usize) > bytes.len() {
            log::error!(
                "Chunk {:?} at offset {} overruns image",
                String::from_utf8_lossy(&chunk_header.id),
                offset
            );
            return Err(FormatError::Truncated(format!(
                "chunk {} of {} bytes at offset {} runs past end of image",
                String::from_utf8_lossy(&chunk_header.id),
                chunk_header.size,
                offset
            ))
            .into());
        }
        Ok(Some((chunk_header, body_offset)))
    }

    /// Read the TRKS records stored at `trks_offset`, stopping at the first record with a zero
    /// bit count.
    fn read_tracks(
        bytes: &[u8],
        trks_offset: usize,
        trks_len: usize,
        info_version: u8,
        opts: &ParserReadOptions,
    ) -> Result<Vec<Track>, DiskImageError> {
        let mut tracks = Vec::new();
        match info_version {
            0 => return Err(FormatError::UnsupportedVersion(info_version).into()),
            1 => {
                let record_ct = (trks_len / TRK_V1_RECORD_SIZE).min(TRK_V1_MAX_TRACKS);
                for index in 0..record_ct {
                    let record_offset = trks_offset + index * TRK_V1_RECORD_SIZE;
                    let record = &bytes[record_offset..record_offset + TRK_V1_RECORD_SIZE];
                    let trk = TrkV1::read(&mut Cursor::new(record))?;
                    if trk.bit_count == 0 {
                        break;
                    }
                    if trk.bit_count as usize > TRK_V1_DATA_SIZE * 8 {
                        return Err(FormatError::TrackBounds {
                            track: index,
                            detail: format!("{} bits in a {} byte record", trk.bit_count, TRK_V1_DATA_SIZE),
                        }
                        .into());
                    }

                    log::trace!(
                        "Track {}: bytes used: {} bits: {} splice: {}",
                        index,
                        trk.bytes_used,
                        trk.bit_count,
                        trk.splice_point
                    );
                    let geometry = TrackGeometry::Woz1 {
                        bytes_used: trk.bytes_used,
                        bit_count: trk.bit_count,
                        splice_point: trk.splice_point,
                        splice_nibble: trk.splice_nibble,
                        splice_bit_count: trk.splice_bit_count,
                    };
                    tracks.push(Track::new(
                        index,
                        geometry,
                        record_offset,
                        &record[..TRK_V1_DATA_SIZE],
                        opts.track_overrun,
                    ));
                }
            }
            _ => {
                let record_ct = (trks_len / TRK_V2_RECORD_SIZE).min(TRK_V2_MAX_TRACKS);
                for index in 0..record_ct {
                    let record_offset = trks_offset + index * TRK_V2_RECORD_SIZE;
                    let trk = TrkV2::read(&mut Cursor::new(
                        &bytes[record_offset..record_offset + TRK_V2_RECORD_SIZE],
                    ))?;
                    if trk.bit_count == 0 {
                        break;
                    }

                    let data_offset = trk.starting_block as usize * BLOCK_SIZE;
                    let data_len = trk.block_count as usize * BLOCK_SIZE;
                    if data_offset + data_len > bytes.len() {
                        return Err(FormatError::TrackBounds {
                            track: index,
                            detail: format!(
                                "blocks {}..{} exceed image of {} bytes",
                                trk.starting_block,
                                trk.starting_block as usize + trk.block_count as usize,
                                bytes.len()
                            ),
                        }
                        .into());
                    }
                    if trk.bit_count as usize > data_len * 8 {
                        return Err(FormatError::TrackBounds {
                            track: index,
                            detail: format!("{} bits in {} blocks", trk.bit_count, trk.block_count),
                        }
                        .into());
                    }

                    log::trace!(
                        "Track {}: starting block: {} blocks: {} bits: {}",
                        index,
                        trk.starting_block,
                        trk.block_count,
                        trk.bit_count
                    );
                    let geometry = TrackGeometry::Woz2 {
                        starting_block: trk.starting_block,
                        block_count: trk.block_count,
                        bit_count: trk.bit_count,
                    };
                    tracks.push(Track::new(
                        index,
                        geometry,
                        data_offset,
                        &bytes[data_offset..data_offset + data_len],
                        opts.track_overrun,
                    ));
                }
            }
        }
        Ok(tracks)
    }

    /// Parse the tab separated key/value lines of a META chunk. Lines without a tab are ignored.
    pub fn parse_meta(meta_str: &str) -> WozHashMap<String, String> {
        let mut meta_map = WozHashMap::new();

        for line in meta_str.lines() {
            let mut parts = line.splitn(2, '\t');
            let key = parts.next().unwrap_or_default().trim();
            if let Some(value) = parts.next() {
                if !key.is_empty() {
                    meta_map.insert(key.to_string(), value.to_string());
                }
            }
        }

        meta_map
    }
}
