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
use crate::{
    args::{GlobalOptions, InfoParams},
    read_file,
};
use anyhow::{bail, Error};
use woznib::{DiskImage, ParserReadOptions};

pub(crate) fn run(global: &GlobalOptions, params: &InfoParams) -> Result<(), Error> {
    let buffer = read_file(&params.in_file)?;

    if !DiskImage::detect(&buffer) {
        bail!("{} is not a WOZ image", params.in_file.display());
    }

    // Data fields are located but not translated, so the sector image stays blank.
    let disk = match DiskImage::from_bytes(&buffer, None, &ParserReadOptions::default()) {
        Ok(disk) => disk,
        Err(e) => {
            bail!("Error loading disk image: {}", e);
        }
    };

    let info = disk.info();
    if !global.silent {
        println!("Disk image info:");
        println!("{}", "-".repeat(79));
    }
    println!("Container:          {}", disk.version());
    println!("INFO version:       {}", info.version);
    println!("Disk kind:          {}", info.disk_kind);
    println!("Creator:            {}", info.creator);
    println!("Write protected:    {}", info.write_protected);
    println!("Synchronized:       {}", info.synchronized);
    println!("Cleaned:            {}", info.cleaned);
    if let Some(v2) = &info.v2 {
        println!("Sides:              {}", v2.sides);
        println!("Boot sector format: {}", v2.boot_sector_format);
        println!("Optimal bit timing: {}ns", v2.optimal_bit_timing as u32 * 125);
        println!("Compatible hardware: {:?}", v2.compatible_hardware);
        println!("Required RAM:       {}K", v2.required_ram);
        println!("Largest track:      {} blocks", v2.largest_track);
    }
    println!("Geometry:           {}", disk.sector_geometry());
    println!();

    if !disk.meta().is_empty() {
        if !global.silent {
            println!("Metadata:");
            println!("{}", "-".repeat(79));
        }
        for (key, value) in disk.meta() {
            println!("{:<20}{}", key, value);
        }
        println!();
    }

    if !global.silent {
        println!("Track report:");
        println!("{}", "-".repeat(79));
    }
    for report in disk.track_reports() {
        print!(
            "Track {:3}: {:<18} sectors: {:2} bad: {:2}",
            report.track_index,
            report.status.to_string(),
            report.sectors_found,
            report.bad_sectors
        );
        if !report.duplicates.is_empty() {
            print!(" duplicates: {:?}", report.duplicates);
        }
        println!();
    }
    println!();

    if !disk.bad_sectors().is_empty() {
        if !global.silent {
            println!("Bad sectors:");
            println!("{}", "-".repeat(79));
        }
        for bad in disk.bad_sectors() {
            println!("{}", bad);
        }
        println!();
    }

    if params.sector_list {
        for track in disk.tracks() {
            println!("Track {}: {}", track.index(), track);
        }
    }

    Ok(())
}
