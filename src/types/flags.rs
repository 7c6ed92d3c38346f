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

    flags.rs

    Defines common bitflags
*/

use bitflags::bitflags;

bitflags! {
    /// The compatible hardware bitmask of a WOZ2 INFO chunk. An empty set means the
    /// compatibility is unknown.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[rustfmt::skip]
    pub struct CompatibleHardware: u16 {
        const APPLE_II              = 0b0000_0000_0000_0001;
        const APPLE_II_PLUS         = 0b0000_0000_0000_0010;
        const APPLE_IIE             = 0b0000_0000_0000_0100;
        const APPLE_IIC             = 0b0000_0000_0000_1000;
        const APPLE_IIE_ENHANCED    = 0b0000_0000_0001_0000;
        const APPLE_IIGS            = 0b0000_0000_0010_0000;
        const APPLE_IIC_PLUS        = 0b0000_0000_0100_0000;
        const APPLE_III             = 0b0000_0000_1000_0000;
        const APPLE_III_PLUS        = 0b0000_0001_0000_0000;
    }
}
