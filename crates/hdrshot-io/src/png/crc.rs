//! CRC-32 (reflected, polynomial 0xEDB88320) as used by PNG chunks.

use lazy_static::lazy_static;

const POLY: u32 = 0xEDB8_8320;

lazy_static! {
    static ref TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        for (n, slot) in table.iter_mut().enumerate() {
            let mut c = n as u32;
            for _ in 0..8 {
                c = if c & 1 != 0 { POLY ^ (c >> 1) } else { c >> 1 };
            }
            *slot = c;
        }
        table
    };
}

/// Feeds `data` into a running (pre-inverted) CRC register.
#[inline]
pub fn update(mut crc: u32, data: &[u8]) -> u32 {
    for &b in data {
        crc = TABLE[((crc ^ b as u32) & 0xFF) as usize] ^ (crc >> 8);
    }
    crc
}

/// CRC-32 of `data`.
pub fn crc32(data: &[u8]) -> u32 {
    update(0xFFFF_FFFF, data) ^ 0xFFFF_FFFF
}

/// CRC of a chunk: type followed by data.
pub fn chunk_crc(kind: &[u8; 4], data: &[u8]) -> u32 {
    update(update(0xFFFF_FFFF, kind), data) ^ 0xFFFF_FFFF
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(crc32(b""), 0);
    }

    #[test]
    fn test_iend() {
        // every PNG ends with this CRC
        assert_eq!(chunk_crc(b"IEND", &[]), 0xAE42_6082);
    }
}
