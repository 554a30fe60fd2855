//! Decoded container record.
//!
//! A [`DecodedImage`] is created once per input file by a container decoder,
//! consumed by an orchestrator and then dropped. It is never persisted.

use crate::error::{checked_sample_count, Error, Result};
use crate::samples::Samples;

/// Interleaved channel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// Three channels: R, G, B.
    Rgb,
    /// Four channels: R, G, B, A.
    Rgba,
}

impl ChannelLayout {
    /// Number of interleaved channels.
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    /// Layout for a channel count, if supported.
    pub const fn from_channels(channels: usize) -> Option<Self> {
        match channels {
            3 => Some(Self::Rgb),
            4 => Some(Self::Rgba),
            _ => None,
        }
    }
}

/// Storage type of a decoded sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// IEEE binary16.
    Half,
    /// IEEE binary32.
    F32,
}

impl SampleType {
    /// Bit depth of one sample.
    pub const fn bits(self) -> u8 {
        match self {
            Self::U8 => 8,
            Self::U16 | Self::Half => 16,
            Self::F32 => 32,
        }
    }
}

/// One decoded input file.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channel layout of `samples`.
    pub layout: ChannelLayout,
    /// Row-major interleaved samples.
    pub samples: Samples,
    /// Transfer characteristic code point, when the container declares one.
    pub transfer: Option<u8>,
    /// Colour primaries code point, when the container declares one.
    pub primaries: Option<u8>,
}

impl DecodedImage {
    /// Creates a record, checking that the sample count matches the geometry.
    pub fn new(width: u32, height: u32, layout: ChannelLayout, samples: Samples) -> Result<Self> {
        let expected = checked_sample_count(width, height, layout.channels())?;
        if samples.len() != expected {
            return Err(Error::sample_count(expected, samples.len()));
        }
        Ok(Self {
            width,
            height,
            layout,
            samples,
            transfer: None,
            primaries: None,
        })
    }

    /// Sets the transfer and primaries tags.
    pub fn with_tags(mut self, transfer: Option<u8>, primaries: Option<u8>) -> Self {
        self.transfer = transfer;
        self.primaries = primaries;
        self
    }

    /// Storage type of the samples.
    pub fn sample_type(&self) -> SampleType {
        match &self.samples {
            Samples::Half(_) => SampleType::Half,
            Samples::F32(_) => SampleType::F32,
            Samples::U8(_) => SampleType::U8,
            Samples::U16(_) => SampleType::U16,
        }
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Interleaved channel count.
    #[inline]
    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// RGB of pixel `index` via [`Samples::get_linear`], alpha ignored.
    #[inline]
    pub fn rgb(&self, index: usize) -> [f32; 3] {
        let base = index * self.channels();
        [
            self.samples.get_linear(base),
            self.samples.get_linear(base + 1),
            self.samples.get_linear(base + 2),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_count() {
        let ok = DecodedImage::new(2, 1, ChannelLayout::Rgb, Samples::F32(vec![0.0; 6]));
        assert!(ok.is_ok());
        let bad = DecodedImage::new(2, 1, ChannelLayout::Rgba, Samples::F32(vec![0.0; 6]));
        assert!(bad.is_err());
    }

    #[test]
    fn test_rgb_skips_alpha() {
        let img = DecodedImage::new(
            2,
            1,
            ChannelLayout::Rgba,
            Samples::F32(vec![1.0, 2.0, 3.0, 0.5, 4.0, 5.0, 6.0, 0.25]),
        )
        .unwrap();
        assert_eq!(img.rgb(1), [4.0, 5.0, 6.0]);
        assert_eq!(img.sample_type(), SampleType::F32);
        assert_eq!(img.sample_type().bits(), 32);
    }
}
