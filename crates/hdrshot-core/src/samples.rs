//! Sample array sum type.
//!
//! Decoders and collaborators hand back one of several sample kinds:
//! half floats (EXR, JPEG-XR `16Float`), 32-bit floats (EXR, RGBE,
//! JPEG-XR `32Float`), or integers (PNG, general backend output).
//! Callers work against [`Samples::get_linear`] and never against the tag.

use half::f16;

/// Flat, interleaved sample storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    /// IEEE 754 binary16 samples.
    Half(Vec<f16>),
    /// IEEE 754 binary32 samples.
    F32(Vec<f32>),
    /// 8-bit unsigned integer samples.
    U8(Vec<u8>),
    /// 16-bit unsigned integer samples.
    U16(Vec<u16>),
}

impl Samples {
    /// Number of samples (not pixels).
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::Half(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
        }
    }

    /// True when no samples are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for the half and single precision variants.
    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Half(_) | Self::F32(_))
    }

    /// Returns sample `index` as f32.
    ///
    /// Float variants return the stored value unchanged (including values
    /// above 1.0, negative zero, NaN). Integer variants are normalized to
    /// [0, 1] by their maximum code value.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[inline]
    pub fn get_linear(&self, index: usize) -> f32 {
        match self {
            Self::Half(v) => v[index].to_f32(),
            Self::F32(v) => v[index],
            Self::U8(v) => v[index] as f32 / 255.0,
            Self::U16(v) => v[index] as f32 / 65535.0,
        }
    }

    /// Returns sample `index` widened to 16 bits.
    ///
    /// 8-bit values are scaled by exactly 257 (65535 / 255). Float values
    /// are clamped to [0, 1] and rounded.
    #[inline]
    pub fn get_u16(&self, index: usize) -> u16 {
        match self {
            Self::U8(v) => v[index] as u16 * 257,
            Self::U16(v) => v[index],
            _ => (self.get_linear(index).clamp(0.0, 1.0) * 65535.0).round() as u16,
        }
    }

    /// Short name of the stored sample kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Half(_) => "half",
            Self::F32(_) => "float",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
        }
    }
}
