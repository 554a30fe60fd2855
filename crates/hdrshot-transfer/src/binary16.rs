//! IEEE 754 binary16 decoding.
//!
//! Exponent 0 is subnormal (`s * 2^-14 * mantissa / 1024`), exponent 31 is
//! NaN (mantissa != 0) or infinity. The conversion itself is `half::f16`;
//! this module adds the byte-level helpers the decoders need.

use half::f16;

/// Decodes raw binary16 bits to f32.
#[inline]
pub fn half_to_f32(bits: u16) -> f32 {
    f16::from_bits(bits).to_f32()
}

/// Reads little-endian binary16 values from a byte slice.
///
/// A trailing odd byte is ignored.
pub fn halves_from_le_bytes(bytes: &[u8]) -> Vec<f16> {
    bytes
        .chunks_exact(2)
        .map(|c| f16::from_bits(u16::from_le_bytes([c[0], c[1]])))
        .collect()
}

/// Reads little-endian binary32 values from a byte slice.
///
/// Trailing bytes that do not form a full value are ignored.
pub fn floats_from_le_bytes(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_values() {
        assert_eq!(half_to_f32(0x3C00), 1.0);
        assert_eq!(half_to_f32(0xC000), -2.0);
        assert_eq!(half_to_f32(0x7BFF), 65504.0);
    }

    #[test]
    fn test_subnormal() {
        // smallest subnormal: 2^-14 * 1/1024
        assert_eq!(half_to_f32(0x0001), 2f32.powi(-14) / 1024.0);
        assert_eq!(half_to_f32(0x0200), 2f32.powi(-14) * 0.5);
        assert_eq!(half_to_f32(0x8000), -0.0);
        assert!(half_to_f32(0x8000).is_sign_negative());
    }

    #[test]
    fn test_specials() {
        assert_eq!(half_to_f32(0x7C00), f32::INFINITY);
        assert_eq!(half_to_f32(0xFC00), f32::NEG_INFINITY);
        assert!(half_to_f32(0x7C01).is_nan());
    }

    #[test]
    fn test_le_helpers() {
        let v = halves_from_le_bytes(&[0x00, 0x3C, 0x00, 0x40, 0xFF]);
        assert_eq!(v.len(), 2);
        assert_eq!(v[1].to_f32(), 2.0);

        let f = floats_from_le_bytes(&1.5f32.to_le_bytes());
        assert_eq!(f, vec![1.5]);
    }
}
