//! OpenEXR scan-line reader.
//!
//! Supports single-part scan-line files with NONE, ZIPS or ZIP compression
//! and HALF or FLOAT channels. Tiled, deep and multi-part files, and any
//! other compression, fail with [`IoError::UnsupportedFeature`].
//!
//! # Layout
//!
//! ```text
//! magic (76 2F 31 01) | version (u32, flags in bits 8+)
//! attributes: name\0 type\0 size:i32 value ... \0
//! offset table: one u64 per chunk
//! chunk: y:i32 size:i32 payload
//! ```
//!
//! A decompressed chunk holds, per scanline, each channel in alphabetical
//! order, `width` little-endian samples at the channel's native width.

use crate::error::eof_as_truncated;
use crate::{zlib, IoError, IoResult};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use half::f16;
use hdrshot_core::cicp::{PRIMARIES_BT709, TRANSFER_LINEAR};
use hdrshot_core::error::checked_sample_count;
use hdrshot_core::{ChannelLayout, DecodedImage, Samples};
use std::io::{Cursor, Read};
use tracing::{debug, trace, warn};

/// OpenEXR magic number (20000630 little-endian).
pub const EXR_MAGIC: [u8; 4] = [0x76, 0x2f, 0x31, 0x01];

const FLAG_TILED: u32 = 0x200;
const FLAG_NON_IMAGE: u32 = 0x800;
const FLAG_MULTIPART: u32 = 0x1000;

/// Chunk compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Uncompressed, one line per chunk.
    None,
    /// zlib, one line per chunk.
    Zips,
    /// zlib, sixteen lines per chunk.
    Zip,
}

impl Compression {
    /// Maps the header byte, rejecting unsupported methods by name.
    pub fn from_byte(b: u8) -> IoResult<Self> {
        let name = match b {
            0 => return Ok(Self::None),
            2 => return Ok(Self::Zips),
            3 => return Ok(Self::Zip),
            1 => "RLE",
            4 => "PIZ",
            5 => "PXR24",
            6 => "B44",
            7 => "B44A",
            8 => "DWAA",
            9 => "DWAB",
            _ => "unknown",
        };
        Err(IoError::UnsupportedFeature(format!(
            "EXR compression {name} ({b})"
        )))
    }

    /// Scanlines per chunk.
    pub const fn lines_per_chunk(self) -> usize {
        match self {
            Self::None | Self::Zips => 1,
            Self::Zip => 16,
        }
    }
}

/// Channel sample type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    /// 32-bit unsigned integer; carried in the layout, never decoded.
    Uint,
    /// IEEE binary16.
    Half,
    /// IEEE binary32.
    Float,
}

impl PixelType {
    fn from_i32(v: i32) -> Self {
        match v {
            1 => Self::Half,
            2 => Self::Float,
            _ => Self::Uint,
        }
    }

    /// Bytes per sample.
    pub const fn bytes(self) -> usize {
        match self {
            Self::Half => 2,
            Self::Uint | Self::Float => 4,
        }
    }
}

/// One entry of the `channels` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Channel name.
    pub name: String,
    /// Sample type.
    pub pixel_type: PixelType,
    /// Horizontal subsampling.
    pub x_sampling: i32,
    /// Vertical subsampling.
    pub y_sampling: i32,
}

/// Header fields the decoder needs.
#[derive(Debug, Clone)]
pub struct ExrHeader {
    /// Channels sorted by name.
    pub channels: Vec<Channel>,
    /// Chunk compression.
    pub compression: Compression,
    /// `xMin, yMin, xMax, yMax`.
    pub data_window: [i32; 4],
    /// Offset of the chunk offset table.
    pub table_offset: usize,
}

impl ExrHeader {
    /// Data window width.
    pub fn width(&self) -> usize {
        (self.data_window[2] as i64 - self.data_window[0] as i64 + 1).max(0) as usize
    }

    /// Data window height.
    pub fn height(&self) -> usize {
        (self.data_window[3] as i64 - self.data_window[1] as i64 + 1).max(0) as usize
    }

    /// Bytes of one scanline across all channels.
    pub fn bytes_per_line(&self) -> usize {
        self.channels.iter().fold(0usize, |acc, c| {
            acc.saturating_add(c.pixel_type.bytes().saturating_mul(self.width()))
        })
    }

    /// Number of chunks in the offset table.
    pub fn chunk_count(&self) -> usize {
        self.height().div_ceil(self.compression.lines_per_chunk())
    }
}

/// Reads and validates the header.
pub fn read_header(bytes: &[u8]) -> IoResult<ExrHeader> {
    let truncated = eof_as_truncated("EXR header");
    let mut cur = Cursor::new(bytes);

    let mut magic = [0u8; 4];
    cur.read_exact(&mut magic).map_err(&truncated)?;
    if magic != EXR_MAGIC {
        return Err(IoError::InvalidFile("EXR magic not found".into()));
    }
    let version = cur.read_u32::<LittleEndian>().map_err(&truncated)?;
    if version & FLAG_TILED != 0 {
        return Err(IoError::UnsupportedFeature("tiled EXR".into()));
    }
    if version & FLAG_NON_IMAGE != 0 {
        return Err(IoError::UnsupportedFeature("deep EXR".into()));
    }
    if version & FLAG_MULTIPART != 0 {
        return Err(IoError::UnsupportedFeature("multi-part EXR".into()));
    }

    let mut channels = None;
    let mut compression = None;
    let mut data_window = None;

    loop {
        let name = read_cstr(&mut cur)?;
        if name.is_empty() {
            break;
        }
        let ty = read_cstr(&mut cur)?;
        let size = cur.read_i32::<LittleEndian>().map_err(&truncated)?;
        let size = usize::try_from(size)
            .map_err(|_| IoError::InvalidFile(format!("EXR attribute {name} has size {size}")))?;
        let start = cur.position() as usize;
        let value = bytes
            .get(start..start + size)
            .ok_or_else(|| IoError::truncated("EXR attribute"))?;
        trace!(name = %name, ty = %ty, size, "EXR attribute");

        match (name.as_str(), ty.as_str()) {
            ("channels", "chlist") => channels = Some(parse_channels(value)?),
            ("compression", "compression") => {
                let b = *value
                    .first()
                    .ok_or_else(|| IoError::truncated("EXR compression"))?;
                compression = Some(Compression::from_byte(b)?);
            }
            ("dataWindow", "box2i") => {
                let mut v = Cursor::new(value);
                let mut w = [0i32; 4];
                for slot in &mut w {
                    *slot = v.read_i32::<LittleEndian>().map_err(&truncated)?;
                }
                data_window = Some(w);
            }
            _ => {}
        }
        cur.set_position((start + size) as u64);
    }

    let mut channels =
        channels.ok_or_else(|| IoError::MissingData("EXR channels attribute".into()))?;
    channels.sort_by(|a, b| a.name.cmp(&b.name));
    if let Some(c) = channels
        .iter()
        .find(|c| c.x_sampling != 1 || c.y_sampling != 1)
    {
        return Err(IoError::UnsupportedFeature(format!(
            "subsampled EXR channel {} ({}x{})",
            c.name, c.x_sampling, c.y_sampling
        )));
    }

    let header = ExrHeader {
        channels,
        compression: compression
            .ok_or_else(|| IoError::MissingData("EXR compression attribute".into()))?,
        data_window: data_window
            .ok_or_else(|| IoError::MissingData("EXR dataWindow attribute".into()))?,
        table_offset: cur.position() as usize,
    };
    if header.width() == 0 || header.height() == 0 {
        return Err(IoError::InvalidFile(format!(
            "EXR data window {:?} is empty",
            header.data_window
        )));
    }
    Ok(header)
}

fn read_cstr(cur: &mut Cursor<&[u8]>) -> IoResult<String> {
    let mut out = Vec::new();
    loop {
        let b = cur
            .read_u8()
            .map_err(eof_as_truncated("EXR attribute name"))?;
        if b == 0 {
            break;
        }
        if out.len() == 255 {
            return Err(IoError::InvalidFile("EXR name longer than 255 bytes".into()));
        }
        out.push(b);
    }
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn parse_channels(value: &[u8]) -> IoResult<Vec<Channel>> {
    let truncated = eof_as_truncated("EXR channel list");
    let mut cur = Cursor::new(value);
    let mut channels = Vec::new();
    loop {
        let name = read_cstr(&mut cur)?;
        if name.is_empty() {
            break;
        }
        let pixel_type = PixelType::from_i32(cur.read_i32::<LittleEndian>().map_err(&truncated)?);
        // pLinear + 3 reserved bytes
        cur.set_position(cur.position() + 4);
        let x_sampling = cur.read_i32::<LittleEndian>().map_err(&truncated)?;
        let y_sampling = cur.read_i32::<LittleEndian>().map_err(&truncated)?;
        channels.push(Channel {
            name,
            pixel_type,
            x_sampling,
            y_sampling,
        });
    }
    Ok(channels)
}

/// Indices of the channels feeding R, G and B.
///
/// Names match case-insensitively on their last `.` component, preferring
/// unlayered names. A lone `Y` stands in for green.
fn select_rgb(channels: &[Channel]) -> [Option<usize>; 3] {
    let find = |aliases: &[&str]| {
        let mut layered = None;
        for (i, c) in channels.iter().enumerate() {
            if c.pixel_type == PixelType::Uint {
                continue;
            }
            let base = c.name.rsplit('.').next().unwrap_or(&c.name).to_lowercase();
            if aliases.contains(&base.as_str()) {
                if !c.name.contains('.') {
                    return Some(i);
                }
                layered.get_or_insert(i);
            }
        }
        layered
    };

    let mut rgb = [find(&["r", "red"]), find(&["g", "green"]), find(&["b", "blue"])];
    if rgb == [None, None, None] {
        rgb[1] = find(&["y"]);
        if rgb[1].is_some() {
            warn!("EXR has only a Y channel; decoding it as green with R and B at 0");
        }
    } else if rgb.iter().any(Option::is_none) {
        warn!(
            channels = ?channels.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            "EXR is missing an R, G or B channel; filling it with 0"
        );
    }
    rgb
}

/// Decodes an EXR file held in memory to linear Rec.709 RGB floats.
pub fn decode(bytes: &[u8]) -> IoResult<DecodedImage> {
    let header = read_header(bytes)?;
    let width = header.width();
    let height = header.height();
    debug!(
        width,
        height,
        compression = ?header.compression,
        channels = header.channels.len(),
        "EXR header"
    );

    let rgb = select_rgb(&header.channels);
    if rgb == [None, None, None] {
        return Err(IoError::MissingData("EXR has no R, G, B or Y channel".into()));
    }

    let sample_count = checked_sample_count(
        u32::try_from(width).map_err(|_| IoError::InvalidFile(format!("EXR width {width}")))?,
        u32::try_from(height).map_err(|_| IoError::InvalidFile(format!("EXR height {height}")))?,
        3,
    )?;

    let chunk_count = header.chunk_count();
    let table = chunk_count
        .checked_mul(8)
        .and_then(|len| bytes.get(header.table_offset..header.table_offset.checked_add(len)?))
        .ok_or_else(|| IoError::truncated("EXR offset table"))?;

    let line_bytes = header.bytes_per_line();
    let capacity = match header.compression {
        Compression::None => bytes.len(),
        Compression::Zips | Compression::Zip => zlib::max_inflated_len(bytes.len()),
    };
    if height.saturating_mul(line_bytes) > capacity {
        return Err(IoError::InvalidFile(format!(
            "EXR data window {width}x{height} is larger than a {} byte file can hold",
            bytes.len()
        )));
    }

    let offsets: Vec<u64> = table.chunks_exact(8).map(LittleEndian::read_u64).collect();
    let lines_per_chunk = header.compression.lines_per_chunk();
    let mut data = vec![0.0f32; sample_count];

    for (index, &offset) in offsets.iter().enumerate() {
        let chunk = read_chunk(bytes, offset, index)?;
        let line = chunk.y as i64 - header.data_window[1] as i64;
        if line < 0 || line as usize >= height {
            return Err(IoError::InvalidFile(format!(
                "EXR chunk {index} starts at y={} outside the data window",
                chunk.y
            )));
        }
        let line = line as usize;
        let lines = lines_per_chunk.min(height - line);
        let raw_size = lines * line_bytes;

        let raw = if header.compression == Compression::None || chunk.payload.len() == raw_size {
            chunk.payload.to_vec()
        } else {
            unpredict(&zlib::inflate(chunk.payload, Some(raw_size))?)
        };
        if raw.len() != raw_size {
            return Err(IoError::DecodeError(format!(
                "EXR chunk {index} holds {} bytes, expected {raw_size}",
                raw.len()
            )));
        }

        scatter_lines(&header, &rgb, &raw, line, lines, &mut data);
    }

    Ok(
        DecodedImage::new(width as u32, height as u32, ChannelLayout::Rgb, Samples::F32(data))?
            .with_tags(Some(TRANSFER_LINEAR), Some(PRIMARIES_BT709)),
    )
}

struct Chunk<'a> {
    y: i32,
    payload: &'a [u8],
}

fn read_chunk(bytes: &[u8], offset: u64, index: usize) -> IoResult<Chunk<'_>> {
    let start = usize::try_from(offset)
        .ok()
        .filter(|&o| o > 0 && o < bytes.len())
        .ok_or_else(|| IoError::InvalidFile(format!("EXR chunk {index} offset {offset} out of range")))?;
    let mut cur = Cursor::new(&bytes[start..]);
    let truncated = eof_as_truncated("EXR chunk header");
    let y = cur.read_i32::<LittleEndian>().map_err(&truncated)?;
    let size = cur.read_i32::<LittleEndian>().map_err(&truncated)?;
    let size = usize::try_from(size)
        .map_err(|_| IoError::InvalidFile(format!("EXR chunk {index} has size {size}")))?;
    let payload = bytes
        .get(start + 8..start + 8 + size)
        .ok_or_else(|| IoError::truncated("EXR chunk"))?;
    Ok(Chunk { y, payload })
}

/// Copies the selected channels of `lines` scanlines into `out` (RGB).
fn scatter_lines(
    header: &ExrHeader,
    rgb: &[Option<usize>; 3],
    raw: &[u8],
    first_line: usize,
    lines: usize,
    out: &mut [f32],
) {
    let width = header.width();
    let mut pos = 0usize;
    for l in 0..lines {
        let row = (first_line + l) * width;
        for (ci, channel) in header.channels.iter().enumerate() {
            let bytes = channel.pixel_type.bytes();
            let span = &raw[pos..pos + width * bytes];
            pos += width * bytes;
            let Some(slot) = rgb.iter().position(|s| *s == Some(ci)) else {
                continue;
            };
            for x in 0..width {
                let s = &span[x * bytes..(x + 1) * bytes];
                let v = match channel.pixel_type {
                    PixelType::Half => f16::from_bits(u16::from_le_bytes([s[0], s[1]])).to_f32(),
                    PixelType::Float => f32::from_le_bytes([s[0], s[1], s[2], s[3]]),
                    PixelType::Uint => 0.0,
                };
                out[(row + x) * 3 + slot] = v;
            }
        }
    }
}

/// Reverses the ZIP predictor.
///
/// Undoes the byte delta (`p[i] = stored[i] + p[i-1] - 128`), then
/// re-interleaves the split halves: the first `ceil(n/2)` bytes are the
/// even positions, the rest the odd ones.
pub fn unpredict(stored: &[u8]) -> Vec<u8> {
    let mut t = stored.to_vec();
    for i in 1..t.len() {
        t[i] = t[i].wrapping_add(t[i - 1]).wrapping_sub(128);
    }
    let (even, odd) = t.split_at(t.len().div_ceil(2));
    let mut out = Vec::with_capacity(t.len());
    for i in 0..t.len() {
        out.push(if i % 2 == 0 { even[i / 2] } else { odd[i / 2] });
    }
    out
}
