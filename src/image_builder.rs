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

    src/image_builder.rs

    Implements the Builder pattern for flat sector images.

    Places the data fields of assembled tracks into a flat, interleaved
    35 track sector image.
*/

use crate::{
    sector_decoder::SectorDecoder,
    track::{sector::Sector, Track},
    types::{BadSector, DiskKind, SectorFault, SectorGeometry},
    DISK_TRACKS,
    SECTOR_SIZE,
};

/// Physical to logical sector order for each geometry. The 13 sector table is the identity.
#[rustfmt::skip]
pub const INTERLEAVE: [[usize; 16]; 2] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],     // 13 sector
    [0, 7, 14, 6, 13, 5, 12, 4, 11, 3, 10, 2, 9, 1, 8, 15],     // 16 sector
];

/// Return the interleave table for the specified geometry.
pub fn interleave_table(geometry: SectorGeometry) -> &'static [usize; 16] {
    match geometry {
        SectorGeometry::Sectors13 => &INTERLEAVE[0],
        SectorGeometry::Sectors16 => &INTERLEAVE[1],
    }
}

/// The output of [DiskImageBuilder::build].
pub struct BuiltImage {
    pub data: Vec<u8>,
    /// Sectors that were found on a track but could not be placed in the image.
    pub bad_sectors: Vec<BadSector>,
}

/// Implements the Builder pattern for flat sector images.
pub struct DiskImageBuilder<'a> {
    #[doc = "The sector geometry of the disk. Determines image size and interleave."]
    pub geometry: SectorGeometry,
    #[doc = "The decoder used to translate data fields. Without one, the image is left blank."]
    pub decoder: Option<&'a dyn SectorDecoder>,
}

impl<'a> DiskImageBuilder<'a> {
    pub fn new(geometry: SectorGeometry) -> DiskImageBuilder<'a> {
        DiskImageBuilder {
            geometry,
            decoder: None,
        }
    }

    /// Set the [SectorDecoder] used to translate data fields.
    pub fn with_decoder(mut self, decoder: &'a dyn SectorDecoder) -> DiskImageBuilder<'a> {
        self.decoder = Some(decoder);
        self
    }

    /// Return the size in bytes of the flat image.
    pub fn image_size(&self) -> usize {
        DISK_TRACKS * self.geometry.sectors() * SECTOR_SIZE
    }

    /// Return the offset within the flat image of the physical sector `sector` on track `track`,
    /// or `None` if the address lies outside the image.
    pub fn sector_address(&self, track: u8, sector: u8) -> Option<usize> {
        let (track, sector) = (track as usize, sector as usize);
        if track >= DISK_TRACKS || sector >= self.geometry.sectors() {
            return None;
        }
        let slot = interleave_table(self.geometry)[sector];
        Some(SECTOR_SIZE * (track * self.geometry.sectors() + slot))
    }

    /// Build the flat image from assembled `tracks`. Only 5.25" disks are placed; for any other
    /// kind of disk the image is returned blank.
    pub fn build(&self, disk_kind: DiskKind, tracks: &[Track]) -> BuiltImage {
        let mut image = BuiltImage {
            data: vec![0u8; self.image_size()],
            bad_sectors: Vec::new(),
        };

        if disk_kind != DiskKind::FiveAndQuarter {
            log::warn!("DiskImageBuilder::build(): {} disks are not placed in a sector image", disk_kind);
            return image;
        }

        let Some(decoder) = self.decoder
        else {
            log::debug!("DiskImageBuilder::build(): no sector decoder, leaving image blank");
            return image;
        };

        for track in tracks {
            for sector in track {
                if let Some(fault) = self.place_sector(decoder, track, sector, &mut image.data) {
                    image.bad_sectors.push(BadSector::from_sector(sector, fault));
                }
            }
        }
        image
    }

    fn place_sector(
        &self,
        decoder: &dyn SectorDecoder,
        track: &Track,
        sector: &Sector,
        data: &mut [u8],
    ) -> Option<SectorFault> {
        // Sectors without a data field were reported during assembly.
        let data_offset = sector.data_offset()?;

        let Some(address) = self.sector_address(sector.track(), sector.sector())
        else {
            log::warn!("Track {}: sector outside image geometry: {}", track.index(), sector);
            return Some(SectorFault::OutOfGeometry);
        };

        match decoder.decode_sector(self.geometry, track.track_bytes(), data_offset) {
            Ok(decoded) => {
                data[address..address + SECTOR_SIZE].copy_from_slice(&decoded);
                None
            }
            Err(e) => {
                log::debug!("Track {}: failed to decode sector: {} ({})", track.index(), sector, e);
                Some(SectorFault::DataDecodeFailed)
            }
        }
    }
}
