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

    src/diskimage.rs

    The top-level decode entry point.
*/

use crate::{
    file_parsers::{
        r#as::woz::{WozContainer, WozFormat, WozInfo, TMAP_SIZE},
        ParserReadOptions,
    },
    image_builder::DiskImageBuilder,
    sector_decoder::SectorDecoder,
    track::{
        assembler::{assemble_track, AssembledTrack},
        scanner::probe_geometry,
        Track,
    },
    types::{BadSector, DiskKind, SectorGeometry, TrackReport, TrackStatus, WozVersion},
    DiskImageError,
    FormatError,
    WozHashMap,
    SECTOR_SIZE,
};
use std::io::Read;

/// A decoded WOZ disk image.
///
/// A [DiskImage] owns the tracks read from the WOZ container along with the flat, interleaved
/// sector image reconstructed from them. It is immutable once constructed.
pub struct DiskImage {
    version: WozVersion,
    info: WozInfo,
    geometry: SectorGeometry,
    track_map: Option<[u8; TMAP_SIZE]>,
    meta: WozHashMap<String, String>,
    tracks: Vec<Track>,
    data: Vec<u8>,
    bad_sectors: Vec<BadSector>,
    track_reports: Vec<TrackReport>,
}

impl DiskImage {
    /// Return true if `bytes` appears to be a WOZ image.
    pub fn detect(bytes: &[u8]) -> bool {
        WozFormat::detect(bytes)
    }

    /// Read a WOZ image from `reader` and decode it. See [DiskImage::from_bytes].
    pub fn load<R: Read>(
        mut reader: R,
        decoder: Option<&dyn SectorDecoder>,
        opts: &ParserReadOptions,
    ) -> Result<DiskImage, DiskImageError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        DiskImage::from_bytes(&bytes, decoder, opts)
    }

    /// Decode the WOZ image in `bytes`.
    ///
    /// Data fields are translated by `decoder`. Without a decoder, tracks and sectors are still
    /// located and reported but the flat sector image is left zero-filled.
    ///
    /// Structural problems with the container are returned as errors. Problems with individual
    /// sectors are recorded in [DiskImage::bad_sectors] and [DiskImage::track_reports].
    pub fn from_bytes(
        bytes: &[u8],
        decoder: Option<&dyn SectorDecoder>,
        opts: &ParserReadOptions,
    ) -> Result<DiskImage, DiskImageError> {
        let WozContainer {
            version,
            info,
            track_map,
            meta,
            mut tracks,
        } = WozFormat::parse(bytes, opts)?;

        let (geometry, first_resolved) = Self::resolve_geometry(&info, &tracks)?;
        log::debug!(
            "Disk geometry: {} ({} tracks, first resolved track: {})",
            geometry,
            tracks.len(),
            first_resolved
        );

        let mut bad_sectors = Vec::new();
        let mut track_reports = Vec::with_capacity(tracks.len());

        for track in &tracks[..first_resolved] {
            log::warn!("Track {}: no address prologue found", track.index());
            let AssembledTrack {
                bad_sectors: track_bad,
                report,
                ..
            } = AssembledTrack::unresolved(track.index(), geometry);
            bad_sectors.extend(track_bad);
            track_reports.push(report);
        }

        let assembled = Self::assemble_tracks(&tracks[first_resolved..], geometry, opts.data_field_window);
        for (track, result) in tracks[first_resolved..].iter_mut().zip(assembled) {
            track.set_sectors(result.sectors);
            bad_sectors.extend(result.bad_sectors);
            track_reports.push(result.report);
        }

        let mut builder = DiskImageBuilder::new(geometry);
        if let Some(decoder) = decoder {
            builder = builder.with_decoder(decoder);
        }
        let built = builder.build(info.disk_kind, &tracks);

        for bad in &built.bad_sectors {
            if let Some(report) = track_reports.iter_mut().find(|r| r.track_index == bad.track_index) {
                report.bad_sectors += 1;
                report.status = TrackStatus::Partial;
            }
        }
        bad_sectors.extend(built.bad_sectors);
        // Stable, so entries within a track keep the order they were found in.
        bad_sectors.sort_by_key(|b| b.track_index);

        log::debug!(
            "Decoded {} image: {} tracks, {} bad sectors",
            version,
            tracks.len(),
            bad_sectors.len()
        );

        Ok(DiskImage {
            version,
            info,
            geometry,
            track_map,
            meta,
            tracks,
            data: built.data,
            bad_sectors,
            track_reports,
        })
    }

    /// Determine the sector geometry of the disk, and the position of the first track it applies
    /// to. Version 2 INFO chunks declare a geometry. Otherwise tracks are probed in order and the
    /// first track carrying either address prologue decides; earlier tracks are unresolved.
    fn resolve_geometry(info: &WozInfo, tracks: &[Track]) -> Result<(SectorGeometry, usize), DiskImageError> {
        if let Some(geometry) = info.declared_geometry() {
            return Ok((geometry, 0));
        }

        for (pos, track) in tracks.iter().enumerate() {
            if let Some(geometry) = probe_geometry(track) {
                log::debug!("Track {}: detected {} address prologue", track.index(), geometry);
                return Ok((geometry, pos));
            }
        }

        log::error!("No address prologue found on any of {} tracks", tracks.len());
        Err(FormatError::NoAddressMarker.into())
    }

    #[cfg(not(feature = "rayon"))]
    fn assemble_tracks(tracks: &[Track], geometry: SectorGeometry, data_window: usize) -> Vec<AssembledTrack> {
        tracks
            .iter()
            .map(|track| assemble_track(track, geometry, data_window))
            .collect()
    }

    #[cfg(feature = "rayon")]
    fn assemble_tracks(tracks: &[Track], geometry: SectorGeometry, data_window: usize) -> Vec<AssembledTrack> {
        use rayon::prelude::*;
        tracks
            .par_iter()
            .map(|track| assemble_track(track, geometry, data_window))
            .collect()
    }

    /// Return the container revision from the file's magic bytes.
    pub fn version(&self) -> WozVersion {
        self.version
    }

    pub fn info(&self) -> &WozInfo {
        &self.info
    }

    pub fn disk_kind(&self) -> DiskKind {
        self.info.disk_kind
    }

    pub fn sector_geometry(&self) -> SectorGeometry {
        self.geometry
    }

    /// Return the number of sectors per track, 13 or 16.
    pub fn sectors_per_track(&self) -> usize {
        self.geometry.sectors()
    }

    /// Return the address prologue used to locate sectors on this disk.
    pub fn address_prologue(&self) -> &'static [u8; 3] {
        self.geometry.address_prologue()
    }

    /// Return the flat sector image: 35 tracks of 13 or 16 sectors, 256 bytes each, in logical
    /// order. Sectors that could not be read are zero-filled.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Return the 256 bytes of physical sector `sector` on track `track` in the flat image.
    pub fn read_sector(&self, track: u8, sector: u8) -> Option<&[u8]> {
        let address = DiskImageBuilder::new(self.geometry).sector_address(track, sector)?;
        self.data.get(address..address + SECTOR_SIZE)
    }

    /// Return the list of sectors that could not be read, in track order.
    pub fn bad_sectors(&self) -> &[BadSector] {
        &self.bad_sectors
    }

    /// Return one [TrackReport] per track read from the image, in track order.
    pub fn track_reports(&self) -> &[TrackReport] {
        &self.track_reports
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Return the key/value pairs of the META chunk, if any.
    pub fn meta(&self) -> &WozHashMap<String, String> {
        &self.meta
    }

    /// Return the TMAP chunk, mapping quarter track positions to TRKS entries. 0xFF marks an
    /// empty position.
    pub fn track_map(&self) -> Option<&[u8; TMAP_SIZE]> {
        self.track_map.as_ref()
    }

    /// Return true if every track was read without a bad sector.
    pub fn is_clean(&self) -> bool {
        self.bad_sectors.is_empty()
    }
}
