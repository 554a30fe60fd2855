//! PNG chunk reader and encoder.
//!
//! The reader handles 8- and 16-bit non-interlaced RGB/RGBA, the subset the
//! HDR pipeline consumes. The encoder writes
//!
//! ```text
//! signature | IHDR | cICP? | IDAT | IEND
//! ```
//!
//! with filter type 0 on every row and a zlib envelope built by hand around
//! raw deflate. 16-bit samples are always written big-endian.

pub mod crc;
pub mod filter;
pub mod reader;
pub mod writer;

pub use reader::{chunks, decode, read_info, ChunkIter, PngChunk, PngInfo};
pub use writer::{encode_png, inject_cicp, write_chunk};

/// PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Byte offset of the chunk that follows IHDR (signature + 25-byte IHDR).
pub const AFTER_IHDR: usize = 33;

/// Byte offset of the IHDR bit-depth field.
pub const IHDR_BIT_DEPTH_OFFSET: usize = 24;

/// Chunk type tags.
pub mod kind {
    /// Image header.
    pub const IHDR: [u8; 4] = *b"IHDR";
    /// Coding-independent code points.
    pub const CICP: [u8; 4] = *b"cICP";
    /// Image data.
    pub const IDAT: [u8; 4] = *b"IDAT";
    /// Image end.
    pub const IEND: [u8; 4] = *b"IEND";
}

/// PNG colour type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorType {
    /// Greyscale (0).
    Gray,
    /// Truecolour (2).
    Rgb,
    /// Indexed (3).
    Indexed,
    /// Greyscale with alpha (4).
    GrayAlpha,
    /// Truecolour with alpha (6).
    Rgba,
}

impl ColorType {
    /// Maps the IHDR byte.
    pub fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            0 => Self::Gray,
            2 => Self::Rgb,
            3 => Self::Indexed,
            4 => Self::GrayAlpha,
            6 => Self::Rgba,
            _ => return None,
        })
    }

    /// IHDR byte.
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Gray => 0,
            Self::Rgb => 2,
            Self::Indexed => 3,
            Self::GrayAlpha => 4,
            Self::Rgba => 6,
        }
    }

    /// Samples per pixel.
    pub const fn channels(self) -> usize {
        match self {
            Self::Gray | Self::Indexed => 1,
            Self::GrayAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

impl From<hdrshot_core::ChannelLayout> for ColorType {
    fn from(layout: hdrshot_core::ChannelLayout) -> Self {
        match layout {
            hdrshot_core::ChannelLayout::Rgb => Self::Rgb,
            hdrshot_core::ChannelLayout::Rgba => Self::Rgba,
        }
    }
}
