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
use crate::{bit_cursor::TRACK_OVERRUN_BYTES, track::scanner::DATA_FIELD_WINDOW};

pub mod r#as;

/// Options controlling how a WOZ image is read.
#[derive(Clone, Debug)]
pub struct ParserReadOptions {
    #[doc = "Accept a stored CRC of zero, which the WOZ reference uses to mark an uncalculated CRC."]
    pub allow_zero_crc: bool,
    #[doc = "The maximum distance in nibbles from an address field to its data field."]
    pub data_field_window: usize,
    #[doc = "The number of nibbles read past one revolution when materializing a track."]
    pub track_overrun: usize,
}

impl Default for ParserReadOptions {
    fn default() -> Self {
        ParserReadOptions {
            allow_zero_crc: false,
            data_field_window: DATA_FIELD_WINDOW,
            track_overrun: TRACK_OVERRUN_BYTES,
        }
    }
}
