//! zlib envelope and deflate helpers shared by the PNG and EXR codecs.
//!
//! Decoding accepts either a zlib-wrapped stream or raw deflate, told apart
//! by the two-byte zlib header. Encoding produces a minimal zlib envelope
//! around raw deflate: `78 9C`, payload, Adler-32 of the uncompressed bytes.

use crate::{IoError, IoResult};
use zune_inflate::{DeflateDecoder, DeflateOptions};

/// zlib header written by [`wrap`] (deflate, 32K window, default level).
pub const ZLIB_HEADER: [u8; 2] = [0x78, 0x9C];

/// Second header bytes that follow `0x78` for the four compression levels.
const ZLIB_FLG: [u8; 4] = [0x01, 0x5E, 0x9C, 0xDA];

/// Deflate level used by [`compress`].
pub const DEFLATE_LEVEL: u8 = 6;

const ADLER_MOD: u32 = 65521;

/// Largest expansion deflate can reach: a 258-byte match per 2 bits.
pub const MAX_DEFLATE_RATIO: usize = 1032;

/// Upper bound on the inflated size of `compressed_len` bytes of deflate.
#[inline]
pub fn max_inflated_len(compressed_len: usize) -> usize {
    compressed_len.saturating_mul(MAX_DEFLATE_RATIO)
}

/// True if `data` starts with a zlib header.
#[inline]
pub fn is_zlib(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x78 && ZLIB_FLG.contains(&data[1])
}

/// Inflates zlib or raw deflate, auto-detected.
///
/// `expected` is the uncompressed size when known; output larger than it is
/// rejected. The preallocation never exceeds what `data` can inflate to, so
/// a lying header cannot force a huge allocation.
pub fn inflate(data: &[u8], expected: Option<usize>) -> IoResult<Vec<u8>> {
    let mut options = DeflateOptions::default();
    if let Some(size) = expected {
        let hint = size.min(max_inflated_len(data.len()));
        options = options.set_size_hint(hint).set_limit(size.max(1));
    }
    let mut decoder = DeflateDecoder::new_with_options(data, options);
    let result = if is_zlib(data) {
        decoder.decode_zlib()
    } else {
        decoder.decode_deflate()
    };
    result.map_err(|e| IoError::DecodeError(format!("deflate stream malformed: {e:?}")))
}

/// Adler-32 checksum.
pub fn adler32(data: &[u8]) -> u32 {
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    // 5552 is the largest block that cannot overflow u32 before the modulo
    for block in data.chunks(5552) {
        for &byte in block {
            a += byte as u32;
            b += a;
        }
        a %= ADLER_MOD;
        b %= ADLER_MOD;
    }
    (b << 16) | a
}

/// Raw deflate of `data`.
pub fn compress(data: &[u8]) -> Vec<u8> {
    miniz_oxide::deflate::compress_to_vec(data, DEFLATE_LEVEL)
}

/// Wraps raw deflate in a zlib envelope.
///
/// `original` is the uncompressed input; its Adler-32 closes the stream.
pub fn wrap(deflate: &[u8], original: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(deflate.len() + 6);
    out.extend_from_slice(&ZLIB_HEADER);
    out.extend_from_slice(deflate);
    out.extend_from_slice(&adler32(original).to_be_bytes());
    out
}

/// Compresses `data` into a complete zlib stream.
pub fn compress_zlib(data: &[u8]) -> Vec<u8> {
    wrap(&compress(data), data)
}
