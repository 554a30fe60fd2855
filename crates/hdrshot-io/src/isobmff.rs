//! ISOBMFF box walker.
//!
//! Boxes are `{size:u32, type:[u8;4], payload}`; `size == 1` means a 64-bit
//! size follows the type, `size == 0` means the box runs to the end of its
//! parent. The walk recurses into the container boxes that can hold colour
//! metadata and never into `mdat`.
//!
//! Input is untrusted: the walk only looks at the first [`SCAN_LIMIT`]
//! bytes and stops descending after [`MAX_DEPTH`] levels. Malformed boxes
//! end the walk of their parent without an error.

use byteorder::{BigEndian, ByteOrder};
use tracing::trace;

/// Bytes of the file the walker will look at.
pub const SCAN_LIMIT: usize = 256 * 1024;

/// Deepest nesting the walker descends into.
pub const MAX_DEPTH: usize = 16;

/// Size of an AV1 visual sample entry before its child boxes.
const AV01_ENTRY_LEN: usize = 78;

/// Recognised box types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    /// Plain container; children start at the payload.
    Container,
    /// Full box container (`meta`); children follow version and flags.
    FullContainer,
    /// Item info (`iinf`); children follow version, flags and entry count.
    ItemInfo,
    /// Sample description (`stsd`); children follow version, flags and entry count.
    SampleDescription,
    /// AV1 sample entry (`av01`); children follow the visual sample entry.
    Av01,
    /// Colour information (`colr`).
    Colr,
    /// Pixel information (`pixi`).
    Pixi,
    /// Content light level (`clli`).
    Clli,
    /// Mastering display colour volume (`mdcv`).
    Mdcv,
    /// Image spatial extents (`ispe`).
    Ispe,
    /// File type (`ftyp`).
    Ftyp,
    /// Media data (`mdat`); never entered.
    Mdat,
    /// Anything else.
    Unknown,
}

impl BoxKind {
    /// Classifies a four-character code.
    pub fn from_fourcc(fourcc: &[u8; 4]) -> Self {
        match fourcc {
            b"moov" | b"trak" | b"mdia" | b"minf" | b"stbl" | b"avio" | b"ipco" | b"iprp"
            | b"moof" | b"traf" => Self::Container,
            b"meta" => Self::FullContainer,
            b"iinf" => Self::ItemInfo,
            b"stsd" => Self::SampleDescription,
            b"av01" => Self::Av01,
            b"colr" => Self::Colr,
            b"pixi" => Self::Pixi,
            b"clli" => Self::Clli,
            b"mdcv" => Self::Mdcv,
            b"ispe" => Self::Ispe,
            b"ftyp" => Self::Ftyp,
            b"mdat" => Self::Mdat,
            _ => Self::Unknown,
        }
    }

    /// Offset of the first child box within the payload, if this kind has
    /// children.
    fn child_offset(self, payload: &[u8]) -> Option<usize> {
        match self {
            Self::Container => Some(0),
            Self::FullContainer => Some(4),
            Self::SampleDescription => Some(8),
            Self::ItemInfo => Some(if payload.first() == Some(&0) { 6 } else { 8 }),
            Self::Av01 => Some(AV01_ENTRY_LEN),
            _ => None,
        }
    }
}

/// A box found by [`walk`].
#[derive(Debug, Clone, Copy)]
pub struct IsoBox<'a> {
    /// Four-character type.
    pub fourcc: [u8; 4],
    /// Classified type.
    pub kind: BoxKind,
    /// Offset of the box header in the file.
    pub offset: usize,
    /// Offset of the payload in the file.
    pub payload_offset: usize,
    /// Payload, clipped to the scanned window.
    pub payload: &'a [u8],
    /// Nesting depth, 0 for top level.
    pub depth: usize,
}

impl IsoBox<'_> {
    /// Type as text.
    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.fourcc).into_owned()
    }
}

/// Walks the first [`SCAN_LIMIT`] bytes, returning boxes depth-first.
pub fn walk(bytes: &[u8]) -> Vec<IsoBox<'_>> {
    walk_limited(bytes, SCAN_LIMIT)
}

/// Walks the first `limit` bytes.
pub fn walk_limited(bytes: &[u8], limit: usize) -> Vec<IsoBox<'_>> {
    let window = &bytes[..bytes.len().min(limit)];
    let mut out = Vec::new();
    walk_range(window, 0, window.len(), 0, &mut out);
    out
}

fn walk_range<'a>(window: &'a [u8], start: usize, end: usize, depth: usize, out: &mut Vec<IsoBox<'a>>) {
    let mut pos = start;
    while pos + 8 <= end {
        let size32 = BigEndian::read_u32(&window[pos..pos + 4]) as u64;
        let fourcc = [window[pos + 4], window[pos + 5], window[pos + 6], window[pos + 7]];
        let (size, header_len) = match size32 {
            0 => ((end - pos) as u64, 8),
            1 => {
                if pos + 16 > end {
                    return;
                }
                (BigEndian::read_u64(&window[pos + 8..pos + 16]), 16)
            }
            n => (n, 8),
        };
        if size < header_len as u64 {
            trace!(offset = pos, size, "box smaller than its header");
            return;
        }

        let Some(box_end) = (pos as u64).checked_add(size) else {
            trace!(offset = pos, size, "box size overflows the file offset");
            return;
        };
        let clipped_end = box_end.min(end as u64) as usize;
        let payload_offset = pos + header_len;
        let payload = &window[payload_offset.min(clipped_end)..clipped_end];
        let kind = BoxKind::from_fourcc(&fourcc);
        out.push(IsoBox {
            fourcc,
            kind,
            offset: pos,
            payload_offset,
            payload,
            depth,
        });

        if depth + 1 < MAX_DEPTH {
            if let Some(skip) = kind.child_offset(payload) {
                let child_start = payload_offset + skip;
                if child_start <= clipped_end {
                    walk_range(window, child_start, clipped_end, depth + 1, out);
                }
            }
        }

        if box_end >= end as u64 {
            return;
        }
        pos = box_end as usize;
    }
}
