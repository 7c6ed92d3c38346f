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

    tests/common/mod.rs

    Common support routines for tests. Builds synthetic WOZ images in memory
    so that tests don't depend on copyrighted disk images.
*/
#![allow(dead_code)]

use bit_vec::BitVec;
use hex::encode;
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use woznib::{prelude::*, SectorDecodeError};

pub const ADDRESS_PROLOGUE_16: [u8; 3] = [0xD5, 0xAA, 0x96];
pub const ADDRESS_PROLOGUE_13: [u8; 3] = [0xD5, 0xAA, 0xB5];
pub const DATA_PROLOGUE: [u8; 3] = [0xD5, 0xAA, 0xAD];
pub const EPILOGUE: [u8; 3] = [0xDE, 0xAA, 0xEB];
pub const VOLUME: u8 = 0xFE;

const LINE_ENDING: [u8; 4] = [0xFF, 0x0A, 0x0D, 0x0A];
const BLOCK_SIZE: usize = 512;
const WOZ2_TRACK_BLOCKS: usize = 13;
const WOZ1_RECORD_SIZE: usize = 6656;
const WOZ1_DATA_SIZE: usize = 6646;
const DATA_FILLER: usize = 339;

pub fn compute_slice_hash(slice: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(slice);
    let result = hasher.finalize();

    encode(result)
}

pub fn encode_44(val: u8) -> [u8; 2] {
    [(val >> 1) | 0xAA, val | 0xAA]
}

/// How the data field following an address field is written.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DataField {
    Good,
    /// The data prologue is overwritten with sync bytes.
    Missing,
    /// The data field is present but carries an invalid nibble where the decoder expects its tag.
    Corrupt,
}

#[derive(Copy, Clone, Debug)]
pub struct SectorSpec {
    pub track: u8,
    pub sector: u8,
    pub data: DataField,
}

impl SectorSpec {
    pub fn new(track: u8, sector: u8) -> Self {
        SectorSpec {
            track,
            sector,
            data: DataField::Good,
        }
    }

    pub fn with_data(mut self, data: DataField) -> Self {
        self.data = data;
        self
    }
}

/// Build the nibble stream of a track holding the sectors in `specs`, in order.
///
/// Data fields carry a 4-and-4 encoded tag of the track and sector numbers, read back by
/// [MockDecoder].
pub fn build_track(prologue: &[u8; 3], specs: &[SectorSpec]) -> Vec<u8> {
    let mut buf = vec![0xFF; 16];
    for spec in specs {
        buf.extend_from_slice(prologue);
        for val in [VOLUME, spec.track, spec.sector, VOLUME ^ spec.track ^ spec.sector] {
            buf.extend_from_slice(&encode_44(val));
        }
        buf.extend_from_slice(&EPILOGUE);
        buf.extend_from_slice(&[0xFF; 6]);

        match spec.data {
            DataField::Missing => buf.extend_from_slice(&[0xFF; 3]),
            _ => buf.extend_from_slice(&DATA_PROLOGUE),
        }
        match spec.data {
            DataField::Corrupt => buf.extend_from_slice(&[0x80; 4]),
            _ => {
                buf.extend_from_slice(&encode_44(spec.track));
                buf.extend_from_slice(&encode_44(spec.sector));
            }
        }
        buf.extend(std::iter::repeat(0x96).take(DATA_FILLER));
        buf.extend_from_slice(&EPILOGUE);
        buf.extend_from_slice(&[0xFF; 16]);
    }
    buf
}

/// Build a track with every sector of the geometry present and readable.
pub fn standard_track(geometry: SectorGeometry, track: u8) -> Vec<u8> {
    let specs: Vec<SectorSpec> = (0..geometry.sectors() as u8)
        .map(|s| SectorSpec::new(track, s))
        .collect();
    build_track(geometry.address_prologue(), &specs)
}

/// A track of sync bytes with no address fields.
pub fn blank_track() -> Vec<u8> {
    vec![0xFF; 6000]
}

/// Pack a nibble stream into a track bitstream as a real drive writes it: every 0xFF is a 10 bit
/// self-sync nibble followed by two zero bits. Returns the packed bytes and the bit count, which is
/// generally not a multiple of 8.
pub fn sync_bitstream(nibbles: &[u8]) -> (Vec<u8>, usize) {
    let mut bits = BitVec::new();
    for &nibble in nibbles {
        for i in (0..8).rev() {
            bits.push(nibble & (1 << i) != 0);
        }
        if nibble == 0xFF {
            bits.push(false);
            bits.push(false);
        }
    }
    (bits.to_bytes(), bits.len())
}

/// Decodes the tag written by [build_track] into a recognizable sector: the first two bytes hold
/// the track and sector numbers and the rest is filled with 0x5A.
pub struct MockDecoder;

impl SectorDecoder for MockDecoder {
    fn decode_sector(
        &self,
        _geometry: SectorGeometry,
        track_bytes: &[u8],
        data_offset: usize,
    ) -> Result<[u8; SECTOR_SIZE], SectorDecodeError> {
        let tag = track_bytes
            .get(data_offset + 3..data_offset + 7)
            .ok_or(SectorDecodeError::Truncated)?;
        for (i, nibble) in tag.iter().enumerate() {
            if nibble & 0xAA != 0xAA {
                return Err(SectorDecodeError::InvalidNibble {
                    nibble: *nibble,
                    offset: data_offset + 3 + i,
                });
            }
        }

        let mut sector = [0x5A; SECTOR_SIZE];
        sector[0] = ((tag[0] << 1) | 1) & tag[1];
        sector[1] = ((tag[2] << 1) | 1) & tag[3];
        Ok(sector)
    }
}

/// Builds WOZ1 and WOZ2 images from track nibble streams.
pub struct WozBuilder {
    pub version: u8,
    pub disk_kind: u8,
    pub boot_sector_format: u8,
    pub include_info: bool,
    pub include_trks: bool,
    pub meta: Option<String>,
    pub tracks: Vec<Vec<u8>>,
    /// Bit counts for tracks whose bitstream does not end on a byte boundary, by track position.
    /// Other tracks use eight bits per byte.
    pub bit_counts: HashMap<usize, usize>,
}

impl WozBuilder {
    pub fn new(version: u8) -> Self {
        WozBuilder {
            version,
            disk_kind: 1,
            boot_sector_format: 1,
            include_info: true,
            include_trks: true,
            meta: None,
            tracks: Vec::new(),
            bit_counts: HashMap::new(),
        }
    }

    /// A builder holding 35 standard tracks of the given geometry.
    pub fn standard(version: u8, geometry: SectorGeometry) -> Self {
        let mut builder = WozBuilder::new(version);
        builder.boot_sector_format = match geometry {
            SectorGeometry::Sectors13 => 2,
            SectorGeometry::Sectors16 => 1,
        };
        builder.tracks = (0..35).map(|t| standard_track(geometry, t)).collect();
        builder
    }

    /// Replace the track at `index` with a packed bitstream of `bit_count` bits.
    pub fn set_bitstream(&mut self, index: usize, bytes: Vec<u8>, bit_count: usize) {
        assert!(bit_count <= bytes.len() * 8);
        self.tracks[index] = bytes;
        self.bit_counts.insert(index, bit_count);
    }

    fn bit_count(&self, index: usize) -> usize {
        self.bit_counts
            .get(&index)
            .copied()
            .unwrap_or(self.tracks[index].len() * 8)
    }

    pub fn build(&self) -> Vec<u8> {
        let mut chunks = Vec::new();

        if self.include_info {
            chunks.extend(chunk(b"INFO", &self.info_body()));
        }

        let mut tmap = [0xFFu8; 160];
        for i in 0..self.tracks.len().min(40) {
            tmap[i * 4] = i as u8;
        }
        chunks.extend(chunk(b"TMAP", &tmap));

        if self.include_trks {
            // The TRKS body begins after the 12 byte header and its own 8 byte chunk header.
            let trks_body_offset = 12 + chunks.len() + 8;
            let body = match self.version {
                1 => self.trks_v1(),
                _ => self.trks_v2(trks_body_offset),
            };
            chunks.extend(chunk(b"TRKS", &body));
        }

        if let Some(meta) = &self.meta {
            chunks.extend(chunk(b"META", meta.as_bytes()));
        }

        let magic: &[u8; 4] = if self.version == 1 { b"WOZ1" } else { b"WOZ2" };
        let mut image = magic.to_vec();
        image.extend_from_slice(&LINE_ENDING);
        image.extend_from_slice(&crc32fast::hash(&chunks).to_le_bytes());
        image.extend(chunks);
        image
    }

    fn info_body(&self) -> Vec<u8> {
        let info_version = if self.version == 1 { 1 } else { 2 };
        let mut body = vec![info_version, self.disk_kind, 0, 1, 0];
        let mut creator = b"woznib tests".to_vec();
        creator.resize(32, b' ');
        body.extend_from_slice(&creator);
        if info_version >= 2 {
            let largest_track = WOZ2_TRACK_BLOCKS as u16;
            body.extend_from_slice(&[1, self.boot_sector_format, 32]);
            body.extend_from_slice(&0x0001u16.to_le_bytes());
            body.extend_from_slice(&0u16.to_le_bytes());
            body.extend_from_slice(&largest_track.to_le_bytes());
        }
        body.resize(60, 0);
        body
    }

    fn trks_v1(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(self.tracks.len() * WOZ1_RECORD_SIZE);
        for (i, nibbles) in self.tracks.iter().enumerate() {
            assert!(nibbles.len() <= WOZ1_DATA_SIZE);
            let mut record = nibbles.clone();
            record.resize(WOZ1_DATA_SIZE, 0);
            record.extend_from_slice(&(nibbles.len() as u16).to_le_bytes());
            record.extend_from_slice(&(self.bit_count(i) as u16).to_le_bytes());
            record.extend_from_slice(&0xFFFFu16.to_le_bytes());
            record.extend_from_slice(&[0, 0]);
            record.extend_from_slice(&[0, 0]);
            body.extend(record);
        }
        body
    }

    fn trks_v2(&self, body_offset: usize) -> Vec<u8> {
        let mut records = vec![0u8; 160 * 8];
        let first_block = (body_offset + records.len()).div_ceil(BLOCK_SIZE);

        let mut data = vec![0u8; first_block * BLOCK_SIZE - body_offset - records.len()];
        for (i, nibbles) in self.tracks.iter().enumerate() {
            assert!(nibbles.len() <= WOZ2_TRACK_BLOCKS * BLOCK_SIZE);
            let block = (first_block + i * WOZ2_TRACK_BLOCKS) as u16;
            let record = &mut records[i * 8..i * 8 + 8];
            record[0..2].copy_from_slice(&block.to_le_bytes());
            record[2..4].copy_from_slice(&(WOZ2_TRACK_BLOCKS as u16).to_le_bytes());
            record[4..8].copy_from_slice(&(self.bit_count(i) as u32).to_le_bytes());

            let mut track_data = nibbles.clone();
            track_data.resize(WOZ2_TRACK_BLOCKS * BLOCK_SIZE, 0);
            data.extend(track_data);
        }

        records.extend(data);
        records
    }
}

fn chunk(id: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = id.to_vec();
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(body);
    out
}

pub fn decode(image: &[u8]) -> Result<DiskImage, DiskImageError> {
    let decoder: &dyn SectorDecoder = &MockDecoder;
    DiskImage::from_bytes(image, Some(decoder), &ParserReadOptions::default())
}
