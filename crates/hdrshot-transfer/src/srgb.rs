//! sRGB transfer function.
//!
//! Piecewise: a linear segment near black and a 1/2.4 power curve above.
//!
//! # Reference
//!
//! IEC 61966-2-1:1999

use lazy_static::lazy_static;

/// sRGB EOTF: decodes sRGB encoded values to linear light.
///
/// ```text
/// if V <= 0.04045:
///     L = V / 12.92
/// else:
///     L = ((V + 0.055) / 1.055)^2.4
/// ```
#[inline]
pub fn eotf(v: f64) -> f64 {
    let v = v.max(0.0);
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB OETF: encodes linear light to sRGB.
///
/// ```text
/// if L <= 0.0031308:
///     V = L * 12.92
/// else:
///     V = 1.055 * L^(1/2.4) - 0.055
/// ```
#[inline]
pub fn oetf(l: f64) -> f64 {
    let l = l.max(0.0);
    if l <= 0.0031308 {
        l * 12.92
    } else {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    }
}

/// Number of entries in [`SrgbLut`].
pub const LUT_SIZE: usize = 4096;

/// Lookup table for the sRGB OETF over linear [0, 1].
///
/// Linearly interpolated; inputs outside [0, 1] are clamped. Max error is
/// well under the 8-bit quantization step.
#[derive(Debug, Clone)]
pub struct SrgbLut {
    table: Vec<f32>,
}

impl SrgbLut {
    /// Builds the table.
    pub fn new() -> Self {
        let last = (LUT_SIZE - 1) as f64;
        let table = (0..LUT_SIZE)
            .map(|i| oetf(i as f64 / last) as f32)
            .collect();
        Self { table }
    }

    /// Encodes a linear value through the table.
    #[inline]
    pub fn oetf(&self, linear: f64) -> f64 {
        let x = if linear.is_nan() { 0.0 } else { linear.clamp(0.0, 1.0) };
        let pos = x * (LUT_SIZE - 1) as f64;
        let i = (pos as usize).min(LUT_SIZE - 2);
        let t = pos - i as f64;
        let a = self.table[i] as f64;
        let b = self.table[i + 1] as f64;
        a + (b - a) * t
    }

    /// Encodes and quantizes to 8 bits.
    #[inline]
    pub fn oetf_u8(&self, linear: f64) -> u8 {
        (self.oetf(linear) * 255.0).round() as u8
    }
}

impl Default for SrgbLut {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    /// Shared read-only OETF table.
    pub static ref SRGB_LUT: SrgbLut = SrgbLut::new();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for i in 0..=100 {
            let v = i as f64 / 100.0;
            let back = oetf(eotf(v));
            assert!((v - back).abs() < 1e-9, "v={v}, back={back}");
        }
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(eotf(0.0), 0.0);
        assert!((eotf(1.0) - 1.0).abs() < 1e-12);
        assert_eq!(oetf(0.0), 0.0);
        assert!((oetf(1.0) - 1.0).abs() < 1e-12);
        assert_eq!(oetf(-1.0), 0.0);
    }

    #[test]
    fn test_midpoint() {
        assert!((eotf(0.5) - 0.214).abs() < 0.001);
    }

    #[test]
    fn test_lut_accuracy() {
        let lut = &*SRGB_LUT;
        let mut max_err: f64 = 0.0;
        for i in 0..=100_000 {
            let x = i as f64 / 100_000.0;
            max_err = max_err.max((lut.oetf(x) - oetf(x)).abs());
        }
        assert!(max_err < 1.0 / 255.0, "max_err={max_err}");
        assert!(max_err < 1e-4, "max_err={max_err}");
    }

    #[test]
    fn test_lut_monotonic_and_clamped() {
        let lut = SrgbLut::new();
        let mut prev = -1.0;
        for i in 0..=1000 {
            let v = lut.oetf(i as f64 / 1000.0);
            assert!(v >= prev);
            prev = v;
        }
        assert_eq!(lut.oetf_u8(4.0), 255);
        assert_eq!(lut.oetf_u8(-1.0), 0);
        assert_eq!(lut.oetf_u8(f64::NAN), 0);
    }
}
