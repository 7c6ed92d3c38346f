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
    args::{DumpParams, GlobalOptions},
    read_file,
};
use anyhow::{bail, Error};
use std::io::{BufWriter, Write};
use woznib::{DiskImage, ParserReadOptions};

pub(crate) fn run(global: &GlobalOptions, params: &DumpParams) -> Result<(), Error> {
    let buffer = read_file(&params.in_file)?;

    let disk = match DiskImage::from_bytes(&buffer, None, &ParserReadOptions::default()) {
        Ok(disk) => disk,
        Err(e) => {
            bail!("Error loading disk image: {}", e);
        }
    };

    let Some(track) = disk.tracks().get(params.track)
    else {
        bail!("Specified track: {} not found. Image has {} tracks.", params.track, disk.tracks().len());
    };

    let mut buf = BufWriter::new(std::io::stdout());
    if !global.silent {
        write!(buf, "Track {}: {}", track.index(), track)?;
    }

    for (row, nibbles) in track.track_bytes().chunks(params.row_size).enumerate() {
        write!(buf, "{:04X}:", row * params.row_size)?;
        for nibble in nibbles {
            write!(buf, " {:02X}", nibble)?;
        }
        writeln!(buf)?;
    }
    buf.flush()?;

    Ok(())
}
