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
use bpaf::*;
use std::{
    fmt::{self, Display, Formatter},
    path::PathBuf,
};

#[derive(Clone, Debug)]
pub(crate) struct InfoParams {
    pub(crate) in_file: PathBuf,
    pub(crate) sector_list: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct DumpParams {
    pub(crate) in_file: PathBuf,
    pub(crate) track: usize,
    pub(crate) row_size: usize,
}

#[derive(Clone, Debug)]
pub(crate) enum Command {
    Version,
    Info(InfoParams),
    Dump(DumpParams),
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Command::Version => write!(f, "version"),
            Command::Info(_) => write!(f, "info"),
            Command::Dump(_) => write!(f, "dump"),
        }
    }
}

#[derive(Debug)]
pub(crate) struct AppParams {
    pub(crate) global: GlobalOptions,
    pub(crate) command: Command,
}

#[derive(Debug)]
pub(crate) struct GlobalOptions {
    pub(crate) silent: bool,
}

fn global_options_parser() -> impl Parser<GlobalOptions> {
    let silent = long("silent")
        .help("Suppress all output except required output")
        .switch();

    construct!(GlobalOptions { silent })
}

fn in_file_parser() -> impl Parser<PathBuf> {
    long("in_file")
        .short('i')
        .argument::<PathBuf>("IN_FILE")
        .help("Path to input file")
}

fn info_parser() -> impl Parser<InfoParams> {
    let in_file = in_file_parser();
    let sector_list = long("sector_list")
        .short('s')
        .help("List the sectors found on each track")
        .switch();

    construct!(InfoParams { in_file, sector_list })
}

fn dump_parser() -> impl Parser<DumpParams> {
    let in_file = in_file_parser();
    let track = long("track")
        .short('t')
        .argument::<usize>("TRACK")
        .help("Specify the TRKS index of the track to dump");
    let row_size = long("row_size")
        .argument::<usize>("ROW_SIZE")
        .help("Specify the number of nibbles per row")
        .guard(|&size| size > 0 && size <= 64, "Row size must be between 1 and 64")
        .fallback(16);

    construct!(DumpParams {
        in_file,
        track,
        row_size
    })
}

pub(crate) fn command_parser() -> OptionParser<AppParams> {
    let global = global_options_parser();

    let version = pure(Command::Version)
        .to_options()
        .command("version")
        .help("Display version information and exit");
    let info = construct!(Command::Info(info_parser()))
        .to_options()
        .command("info")
        .help("Display information about a WOZ image");
    let dump = construct!(Command::Dump(dump_parser()))
        .to_options()
        .command("dump")
        .help("Dump the nibble stream of a track");

    let command = construct!([version, info, dump]);

    construct!(AppParams { global, command }).to_options()
}
