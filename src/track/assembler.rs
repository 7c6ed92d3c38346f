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

    src/track/assembler.rs

    Builds the sector list of a track from its nibble stream.
*/

use crate::{
    track::{
        scanner::{find_data_field, find_marker, has_epilogue, ADDRESS_FIELD_LEN},
        sector::{AddressField, Sector},
        Track,
    },
    types::{BadSector, SectorFault, SectorGeometry, TrackReport, TrackStatus},
};

/// The result of assembling a single track.
pub struct AssembledTrack {
    pub sectors: Vec<Sector>,
    pub bad_sectors: Vec<BadSector>,
    pub report: TrackReport,
}

impl AssembledTrack {
    /// Produce the result for a track whose address prologue could not be found. Every sector the
    /// geometry expects is reported as bad.
    pub fn unresolved(track_index: usize, geometry: SectorGeometry) -> AssembledTrack {
        let bad_sectors: Vec<BadSector> = (0..geometry.sectors())
            .map(|s| BadSector::unresolved(track_index, s as u8))
            .collect();

        AssembledTrack {
            sectors: Vec::new(),
            report: TrackReport {
                track_index,
                status: TrackStatus::NoAddressMarker,
                sectors_found: 0,
                bad_sectors: bad_sectors.len(),
                duplicates: Vec::new(),
            },
            bad_sectors,
        }
    }
}

/// Find the sectors of `track` using the address prologue of `geometry`.
///
/// Address fields are collected in track order until the geometry's sector count is reached or no
/// more prologues are found within the first revolution. Sectors without a data field within
/// `data_window` nibbles are kept in the sector list and also reported as bad. A track where no
/// address prologue is found at all is reported as [AssembledTrack::unresolved].
pub fn assemble_track(track: &Track, geometry: SectorGeometry, data_window: usize) -> AssembledTrack {
    let track_bytes = track.track_bytes();
    let revolution_len = track.revolution_len();
    let prologue = geometry.address_prologue();
    let mut sectors: Vec<Sector> = Vec::with_capacity(geometry.sectors());
    let mut bad_sectors = Vec::new();
    let mut duplicates = Vec::new();
    let mut search_offset = 0;

    while sectors.len() < geometry.sectors() {
        let Some(address_offset) = find_marker(track_bytes, prologue, search_offset)
        else {
            break;
        };
        // Past the index the stream repeats, and any address found there was already seen.
        if address_offset >= revolution_len {
            break;
        }
        search_offset = address_offset + 1;

        let Some(address) = AddressField::decode(track_bytes, address_offset)
        else {
            log::warn!(
                "Track {}: address field at {:04X} truncated by end of track",
                track.index(),
                address_offset
            );
            bad_sectors.push(BadSector {
                track_index: track.index(),
                volume: 0,
                track: 0,
                sector: 0,
                checksum: 0,
                address_offset: Some(address_offset),
                data_offset: None,
                fault: SectorFault::TruncatedAddress,
            });
            break;
        };

        if !has_epilogue(track_bytes, address_offset + ADDRESS_FIELD_LEN) {
            log::trace!(
                "Track {}: address field at {:04X} has no epilogue",
                track.index(),
                address_offset
            );
        }

        if !address.checksum_valid() {
            log::debug!(
                "Track {}: address field at {:04X} has bad checksum {:02X}",
                track.index(),
                address_offset,
                address.checksum
            );
        }

        let data_offset = find_data_field(track_bytes, address_offset, data_window);
        let sector = Sector::new(track.index(), address, address_offset, data_offset);

        if sectors.iter().any(|s| s.is_duplicate(&sector)) {
            log::warn!("Track {}: duplicate sector: {}", track.index(), sector);
            if !duplicates.contains(&sector.sector()) {
                duplicates.push(sector.sector());
            }
        }

        if data_offset.is_none() {
            log::debug!("Track {}: no data field for sector: {}", track.index(), sector);
            bad_sectors.push(BadSector::from_sector(&sector, SectorFault::DataFieldMissing));
        }
        sectors.push(sector);
    }

    if sectors.is_empty() && bad_sectors.is_empty() {
        log::warn!("Track {}: no {} address prologue found", track.index(), geometry);
        return AssembledTrack::unresolved(track.index(), geometry);
    }

    let mut distinct: Vec<u8> = sectors.iter().map(|s| s.sector()).collect();
    distinct.sort_unstable();
    distinct.dedup();

    let status = if bad_sectors.is_empty() && distinct.len() == geometry.sectors() {
        TrackStatus::Complete
    }
    else {
        TrackStatus::Partial
    };

    log::debug!(
        "Track {}: found {} sectors, {} bad, status: {}",
        track.index(),
        sectors.len(),
        bad_sectors.len(),
        status
    );

    AssembledTrack {
        report: TrackReport {
            track_index: track.index(),
            status,
            sectors_found: sectors.len(),
            bad_sectors: bad_sectors.len(),
            duplicates,
        },
        sectors,
        bad_sectors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{
        scanner::{ADDRESS_PROLOGUE_13, ADDRESS_PROLOGUE_16, DATA_PROLOGUE},
        TrackGeometry,
    };

    fn encode_44(val: u8) -> [u8; 2] {
        [(val >> 1) | 0xAA, val | 0xAA]
    }

    fn push_address(buf: &mut Vec<u8>, prologue: &[u8; 3], track: u8, sector: u8) {
        buf.extend_from_slice(&[0xFF; 8]);
        buf.extend_from_slice(prologue);
        for val in [0xFE, track, sector, 0xFE ^ track ^ sector] {
            buf.extend_from_slice(&encode_44(val));
        }
        buf.extend_from_slice(&[0xDE, 0xAA, 0xEB]);
    }

    fn push_data(buf: &mut Vec<u8>) {
        buf.extend_from_slice(&[0xFF; 6]);
        buf.extend_from_slice(&DATA_PROLOGUE);
        buf.extend_from_slice(&[0x96; 343]);
        buf.extend_from_slice(&[0xDE, 0xAA, 0xEB]);
    }

    fn make_track(nibbles: &[u8]) -> Track {
        make_track_overrun(nibbles, 0)
    }

    fn make_track_overrun(nibbles: &[u8], overrun: usize) -> Track {
        Track::new(
            3,
            TrackGeometry::Woz2 {
                starting_block: 3,
                block_count: 13,
                bit_count: (nibbles.len() * 8) as u32,
            },
            0,
            nibbles,
            overrun,
        )
    }

    #[test]
    fn test_assemble_complete_track() {
        let mut buf = Vec::new();
        for s in 0..16 {
            push_address(&mut buf, &ADDRESS_PROLOGUE_16, 3, s);
            push_data(&mut buf);
        }
        let track = make_track(&buf);
        let assembled = assemble_track(&track, SectorGeometry::Sectors16, 200);

        assert_eq!(assembled.sectors.len(), 16);
        assert!(assembled.bad_sectors.is_empty());
        assert_eq!(assembled.report.status, TrackStatus::Complete);
        for (i, sector) in assembled.sectors.iter().enumerate() {
            assert_eq!(sector.sector(), i as u8);
            assert_eq!(sector.track(), 3);
            assert_eq!(sector.volume(), 0xFE);
            assert_eq!(sector.track_index(), 3);
            assert!(sector.data_offset().unwrap() > sector.address_offset());
        }
    }

    #[test]
    fn test_missing_data_field() {
        let mut buf = Vec::new();
        push_address(&mut buf, &ADDRESS_PROLOGUE_16, 0, 0);
        buf.extend_from_slice(&[0xFF; 300]);
        push_address(&mut buf, &ADDRESS_PROLOGUE_16, 0, 1);
        push_data(&mut buf);

        let track = make_track(&buf);
        let assembled = assemble_track(&track, SectorGeometry::Sectors16, 200);

        assert_eq!(assembled.sectors.len(), 2);
        assert_eq!(assembled.bad_sectors.len(), 1);
        assert_eq!(assembled.bad_sectors[0].sector, 0);
        assert_eq!(assembled.bad_sectors[0].fault, SectorFault::DataFieldMissing);
        assert_eq!(assembled.sectors[0].data_offset(), None);
        assert!(assembled.sectors[1].data_offset().is_some());
        assert_eq!(assembled.report.status, TrackStatus::Partial);
    }

    #[test]
    fn test_duplicate_sectors_kept() {
        let mut buf = Vec::new();
        for s in [0, 1, 1, 2] {
            push_address(&mut buf, &ADDRESS_PROLOGUE_16, 0, s);
            push_data(&mut buf);
        }
        let track = make_track(&buf);
        let assembled = assemble_track(&track, SectorGeometry::Sectors16, 200);

        assert_eq!(assembled.sectors.len(), 4);
        assert_eq!(assembled.report.duplicates, vec![1]);
        assert_eq!(assembled.report.status, TrackStatus::Partial);
    }

    #[test]
    fn test_sector_limit() {
        // More address fields than the geometry allows; the surplus are ignored.
        let mut buf = Vec::new();
        for s in 0..15 {
            push_address(&mut buf, &ADDRESS_PROLOGUE_13, 0, s % 13);
            push_data(&mut buf);
        }
        let track = make_track(&buf);
        let assembled = assemble_track(&track, SectorGeometry::Sectors13, 200);
        assert_eq!(assembled.sectors.len(), 13);
        assert_eq!(assembled.report.status, TrackStatus::Complete);

        // The 16 sector prologue does not appear on a 13 sector track.
        let assembled = assemble_track(&track, SectorGeometry::Sectors16, 200);
        assert!(assembled.sectors.is_empty());
        assert_eq!(assembled.bad_sectors.len(), 16);
        assert_eq!(assembled.report.status, TrackStatus::NoAddressMarker);
    }

    #[test]
    fn test_sync_only_track_unresolved() {
        let track = make_track_overrun(&[0xFF; 6000], 520);
        let assembled = assemble_track(&track, SectorGeometry::Sectors16, 200);

        assert!(assembled.sectors.is_empty());
        assert_eq!(assembled.bad_sectors.len(), 16);
        assert!(assembled
            .bad_sectors
            .iter()
            .all(|b| b.fault == SectorFault::NoAddressMarker && b.track_index == 3));
        assert_eq!(assembled.report.status, TrackStatus::NoAddressMarker);
        assert_eq!(assembled.report.bad_sectors, 16);
    }

    #[test]
    fn test_overrun_not_rescanned() {
        // One sector on a short track: the overrun wraps around several times and repeats it.
        let mut buf = Vec::new();
        push_address(&mut buf, &ADDRESS_PROLOGUE_16, 0, 4);
        buf.extend_from_slice(&[0xFF; 300]);
        let track = make_track_overrun(&buf, 520);
        assert!(track.track_bytes().len() > 2 * buf.len());

        let assembled = assemble_track(&track, SectorGeometry::Sectors16, 200);
        assert_eq!(assembled.sectors.len(), 1);
        assert_eq!(assembled.sectors[0].sector(), 4);
        assert_eq!(assembled.bad_sectors.len(), 1);
        assert_eq!(assembled.bad_sectors[0].fault, SectorFault::DataFieldMissing);
        assert!(assembled.report.duplicates.is_empty());

        // The same holds with a data field present.
        let mut buf = Vec::new();
        push_address(&mut buf, &ADDRESS_PROLOGUE_16, 0, 4);
        push_data(&mut buf);
        let track = make_track_overrun(&buf, 520);

        let assembled = assemble_track(&track, SectorGeometry::Sectors16, 200);
        assert_eq!(assembled.sectors.len(), 1);
        assert!(assembled.bad_sectors.is_empty());
        assert!(assembled.report.duplicates.is_empty());
        assert_eq!(assembled.report.status, TrackStatus::Partial);
    }

    #[test]
    fn test_address_field_across_index() {
        // The track begins partway into sector 2's address field, so that field only
        // completes in the overrun.
        let mut buf = Vec::new();
        let mut split = 0;
        for s in 0..3 {
            if s == 2 {
                // Past the sync run and the prologue, one nibble into the field.
                split = buf.len() + 8 + 4;
            }
            push_address(&mut buf, &ADDRESS_PROLOGUE_16, 0, s);
            push_data(&mut buf);
        }
        buf.rotate_left(split);
        let track = make_track_overrun(&buf, 520);

        let assembled = assemble_track(&track, SectorGeometry::Sectors16, 200);
        let found: Vec<u8> = assembled.sectors.iter().map(|s| s.sector()).collect();
        assert_eq!(found, vec![0, 1, 2]);
        assert!(assembled.bad_sectors.is_empty());
        assert!(assembled.report.duplicates.is_empty());
        assert!(assembled.sectors[2].address_offset() < track.revolution_len());
        assert!(assembled.sectors[2].data_offset().unwrap() >= track.revolution_len());
    }

    #[test]
    fn test_unresolved_track() {
        let assembled = AssembledTrack::unresolved(7, SectorGeometry::Sectors13);
        assert_eq!(assembled.bad_sectors.len(), 13);
        assert!(assembled
            .bad_sectors
            .iter()
            .all(|b| b.fault == SectorFault::NoAddressMarker && b.track_index == 7));
        assert_eq!(assembled.report.status, TrackStatus::NoAddressMarker);
    }
}
