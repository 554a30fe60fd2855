//! External codec seams.
//!
//! Pixels of AVIF, JPEG-XR and legacy formats come from codecs outside this
//! workspace. They are reached through two object-safe traits; everything
//! HDR-aware (colour math, tagging, statistics) stays on this side.

use crate::{ConvertError, Result};
use hdrshot_core::cicp::{PRIMARIES_BT709, TRANSFER_LINEAR};
use hdrshot_core::{ChannelLayout, Cicp, DecodedImage, Samples};
use hdrshot_transfer::binary16::{floats_from_le_bytes, halves_from_le_bytes};

/// General-purpose image codec.
pub trait ImageBackend: Send + Sync {
    /// Codec name, for logs.
    fn name(&self) -> &'static str;

    /// Decodes any supported file to interleaved RGBA integers.
    ///
    /// `bit_depth` is 8 or 16 and selects [`Samples::U8`] or
    /// [`Samples::U16`]. Colour tags are left unset; the caller attaches
    /// whatever the container declares.
    fn decode_rgba(&self, bytes: &[u8], bit_depth: u8) -> Result<DecodedImage>;

    /// Encodes 16-bit RGB(A) samples as AVIF.
    ///
    /// The codec may drop `cicp`; callers re-tag the result.
    fn encode_avif(
        &self,
        samples: &Samples,
        width: u32,
        height: u32,
        layout: ChannelLayout,
        cicp: Cicp,
    ) -> Result<Vec<u8>>;
}

/// JPEG-XR decoder.
pub trait JxrDecoder: Send + Sync {
    /// Decodes one file.
    fn decode(&self, bytes: &[u8]) -> Result<JxrImage>;
}

/// Sample format reported by a JPEG-XR decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JxrBitDepth {
    /// Little-endian binary16.
    Float16,
    /// Little-endian binary32.
    Float32,
    /// Little-endian 16-bit integers.
    Uint16,
    /// 8-bit integers.
    Uint8,
}

impl JxrBitDepth {
    /// Bytes per sample.
    pub const fn bytes(self) -> usize {
        match self {
            Self::Float16 | Self::Uint16 => 2,
            Self::Float32 => 4,
            Self::Uint8 => 1,
        }
    }
}

/// Pixel layout reported by a JPEG-XR decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JxrPixelInfo {
    /// Interleaved channels per pixel.
    pub channels: u8,
    /// Sample format.
    pub bit_depth: JxrBitDepth,
    /// Whether the last channel is alpha.
    pub has_alpha: bool,
}

/// Raw JPEG-XR decoder output.
#[derive(Debug, Clone)]
pub struct JxrImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Layout of `bytes`.
    pub pixel_info: JxrPixelInfo,
    /// Interleaved sample bytes.
    pub bytes: Vec<u8>,
}

impl JxrImage {
    /// Lifts the byte payload into a [`DecodedImage`].
    ///
    /// Float payloads are scRGB: linear Rec.709 with 1.0 = 80 cd/m2, and are
    /// tagged accordingly. Integer payloads stay untagged.
    pub fn into_decoded(self) -> Result<DecodedImage> {
        let info = self.pixel_info;
        let layout = ChannelLayout::from_channels(info.channels as usize).ok_or_else(|| {
            ConvertError::backend(format!("JPEG-XR with {} channels", info.channels))
        })?;
        let samples = match info.bit_depth {
            JxrBitDepth::Float16 => Samples::Half(halves_from_le_bytes(&self.bytes)),
            JxrBitDepth::Float32 => Samples::F32(floats_from_le_bytes(&self.bytes)),
            JxrBitDepth::Uint16 => Samples::U16(
                self.bytes
                    .chunks_exact(2)
                    .map(|c| u16::from_le_bytes([c[0], c[1]]))
                    .collect(),
            ),
            JxrBitDepth::Uint8 => Samples::U8(self.bytes),
        };
        let is_float = samples.is_float();
        let image = DecodedImage::new(self.width, self.height, layout, samples)?;
        Ok(if is_float {
            image.with_tags(Some(TRANSFER_LINEAR), Some(PRIMARIES_BT709))
        } else {
            image
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use half::f16;

    fn jxr(bit_depth: JxrBitDepth, channels: u8, bytes: Vec<u8>) -> JxrImage {
        JxrImage {
            width: 1,
            height: 1,
            pixel_info: JxrPixelInfo {
                channels,
                bit_depth,
                has_alpha: channels == 4,
            },
            bytes,
        }
    }

    #[test]
    fn test_half_payload() {
        let bytes: Vec<u8> = [2.0f32, 1.0, 0.5, 1.0]
            .iter()
            .flat_map(|v| f16::from_f32(*v).to_bits().to_le_bytes())
            .collect();
        let image = jxr(JxrBitDepth::Float16, 4, bytes).into_decoded().unwrap();
        assert_eq!(image.layout, ChannelLayout::Rgba);
        assert_eq!(image.rgb(0), [2.0, 1.0, 0.5]);
        assert_eq!(image.transfer, Some(TRANSFER_LINEAR));
    }

    #[test]
    fn test_integer_payload_untagged() {
        let bytes = [0x00, 0x01, 0xFF, 0xFF, 0x00, 0x00].to_vec();
        let image = jxr(JxrBitDepth::Uint16, 3, bytes).into_decoded().unwrap();
        assert_eq!(image.samples, Samples::U16(vec![256, 65535, 0]));
        assert_eq!(image.transfer, None);
    }

    #[test]
    fn test_bad_layouts() {
        assert!(matches!(
            jxr(JxrBitDepth::Uint8, 2, vec![0, 0]).into_decoded(),
            Err(ConvertError::Backend(_))
        ));
        // 3 channels of f32 need 12 bytes
        assert!(matches!(
            jxr(JxrBitDepth::Float32, 3, vec![0; 8]).into_decoded(),
            Err(ConvertError::Core(_))
        ));
    }
}
