//! Per-file conversion.
//!
//! ```text
//! decode -> [peak] -> per-pixel {gamut, BT.2020/PQ, tone-map} -> encode HDR [+ SDR] [+ thumbnail]
//! ```
//!
//! Radiance, OpenEXR and 8/16-bit RGB(A) PNG are decoded here. JPEG-XR,
//! AVIF and anything else go through the collaborator traits in
//! [`backend`](crate::backend).

use crate::backend::{ImageBackend, JxrDecoder};
use crate::options::{ConvertOptions, OutputContainer};
use crate::pipeline::{self, LinearView, SourceTransfer};
use crate::thumbnail;
use crate::{ConvertError, Result};
use hdrshot_core::{ChannelLayout, Cicp, DecodedImage, GamutCoverage, LuminanceStats, Samples};
use hdrshot_io::png::{self, ColorType};
use hdrshot_io::{avif, exr, hdr, Format, IoError};
use std::sync::Arc;
use tracing::{debug, info};

/// One encoded output image.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    /// Complete file bytes.
    pub bytes: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Container of `bytes`.
    pub format: Format,
}

/// Everything produced for one input file.
///
/// Statistics are filled when the per-pixel pass already computed them;
/// integer pass-through conversions leave them `None`.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Canonical BT.2020/PQ 16-bit image.
    pub hdr: EncodedImage,
    /// Tone-mapped 8-bit sRGB PNG.
    pub sdr: Option<EncodedImage>,
    /// Downscaled copy of `hdr`, same container and tag.
    pub thumbnail: Option<EncodedImage>,
    /// Gamut coverage of the source.
    pub gamut: Option<GamutCoverage>,
    /// Source luminance.
    pub luminance: Option<LuminanceStats>,
    /// Tone-map peak (PQ) used for `sdr`.
    pub peak_pq: Option<f64>,
}

/// Converts input files to the canonical HDR representation.
#[derive(Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
    backend: Option<Arc<dyn ImageBackend>>,
    jxr: Option<Arc<dyn JxrDecoder>>,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("options", &self.options)
            .field("backend", &self.backend.as_ref().map(|b| b.name()))
            .field("jxr", &self.jxr.is_some())
            .finish()
    }
}

impl Converter {
    /// Creates a converter without external codecs.
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            backend: None,
            jxr: None,
        }
    }

    /// Attaches a general image codec.
    pub fn with_backend(mut self, backend: Arc<dyn ImageBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attaches a JPEG-XR decoder.
    pub fn with_jxr_decoder(mut self, decoder: Arc<dyn JxrDecoder>) -> Self {
        self.jxr = Some(decoder);
        self
    }

    /// Options in effect.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Converts one file. `name` selects the decoder by extension.
    pub fn convert(&self, name: &str, bytes: &[u8]) -> Result<Conversion> {
        let format = Format::detect(name, bytes);
        let image = self.decode(format, name, bytes)?;
        info!(
            name,
            %format,
            width = image.width,
            height = image.height,
            samples = image.samples.kind_name(),
            "decoded"
        );
        if image.layout == ChannelLayout::Rgba {
            debug!(name, "alpha channel dropped");
        }
        self.convert_image(&image)
    }

    /// Decodes a file of a known format.
    pub fn decode(&self, format: Format, name: &str, bytes: &[u8]) -> Result<DecodedImage> {
        match format {
            Format::Hdr => Ok(hdr::decode(bytes)?),
            Format::Exr => Ok(exr::decode(bytes)?),
            Format::Jxr => {
                let jxr = self.jxr.as_ref().ok_or(ConvertError::NoBackend { format })?;
                jxr.decode(bytes)?.into_decoded()
            }
            Format::Png => match png::decode(bytes) {
                Ok(image) => Ok(image),
                Err(IoError::UnsupportedFeature(why)) if self.backend.is_some() => {
                    debug!(name, %why, "PNG handed to backend");
                    let cicp = png::read_info(bytes).ok().and_then(|i| i.cicp);
                    let image = self.backend_decode(format, bytes)?;
                    Ok(image.with_tags(cicp.map(|c| c.transfer), cicp.map(|c| c.primaries)))
                }
                Err(e) => Err(e.into()),
            },
            Format::Avif => {
                let meta = avif::read_metadata(bytes);
                let image = self.backend_decode(format, bytes)?;
                Ok(image.with_tags(meta.cicp.map(|c| c.transfer), meta.cicp.map(|c| c.primaries)))
            }
            Format::Unknown => match self.backend {
                Some(_) => self.backend_decode(format, bytes),
                None => Err(ConvertError::UnsupportedFormat(name.to_string())),
            },
        }
    }

    fn backend_decode(&self, format: Format, bytes: &[u8]) -> Result<DecodedImage> {
        let backend = self.backend.as_ref().ok_or(ConvertError::NoBackend { format })?;
        let image = backend.decode_rgba(bytes, 16)?;
        if image.samples.is_float() {
            return Err(ConvertError::backend(format!(
                "{} returned {} samples, expected integers",
                backend.name(),
                image.samples.kind_name()
            )));
        }
        Ok(image)
    }

    /// Runs the colour pipeline and the encoders on a decoded image.
    pub fn convert_image(&self, image: &DecodedImage) -> Result<Conversion> {
        let (width, height) = (image.width, image.height);
        let Some(transfer) = SourceTransfer::for_image(image) else {
            debug!(width, height, "integer pass-through");
            let (hdr, thumbnail) =
                self.encode_outputs(pipeline::passthrough(image), width, height)?;
            return Ok(Conversion {
                hdr,
                thumbnail,
                sdr: None,
                gamut: None,
                luminance: None,
                peak_pq: None,
            });
        };

        let view = LinearView::new(image, transfer);
        let opts = &self.options;
        let rendered = pipeline::render(&view, opts.generate_sdr, opts.peak_percentile);

        let sdr = match rendered.sdr {
            Some(rgb) => Some(EncodedImage {
                bytes: png::encode_png(
                    &Samples::U8(rgb),
                    width,
                    height,
                    ColorType::Rgb,
                    Some(Cicp::SRGB),
                )?,
                width,
                height,
                format: Format::Png,
            }),
            None => None,
        };
        let (hdr, thumbnail) = self.encode_outputs(rendered.hdr, width, height)?;

        debug!(
            peak_pq = ?rendered.peak_pq,
            rec709 = rendered.gamut.rec709,
            max_cll = rendered.luminance.max_cll,
            "converted"
        );
        Ok(Conversion {
            hdr,
            sdr,
            thumbnail,
            gamut: Some(rendered.gamut),
            luminance: Some(rendered.luminance),
            peak_pq: rendered.peak_pq,
        })
    }

    /// Encodes a 16-bit RGB BT.2020/PQ buffer in the output container.
    pub fn encode_hdr(&self, samples: Vec<u16>, width: u32, height: u32) -> Result<EncodedImage> {
        let samples = Samples::U16(samples);
        let (bytes, format) = match self.options.output {
            OutputContainer::Png => (
                png::encode_png(&samples, width, height, ColorType::Rgb, Some(Cicp::BT2020_PQ))?,
                Format::Png,
            ),
            OutputContainer::Avif => {
                let backend = self
                    .backend
                    .as_ref()
                    .ok_or(ConvertError::NoBackend { format: Format::Avif })?;
                let mut bytes =
                    backend.encode_avif(&samples, width, height, ChannelLayout::Rgb, Cicp::BT2020_PQ)?;
                avif::set_nclx(&mut bytes, Cicp::BT2020_PQ)?;
                (bytes, Format::Avif)
            }
        };
        Ok(EncodedImage {
            bytes,
            width,
            height,
            format,
        })
    }

    /// Encodes the HDR buffer and, when enabled, its thumbnail.
    ///
    /// An image that already fits the thumbnail bound reuses the
    /// full-size encode.
    fn encode_outputs(
        &self,
        hdr: Vec<u16>,
        width: u32,
        height: u32,
    ) -> Result<(EncodedImage, Option<EncodedImage>)> {
        let small = self.options.generate_thumbnail.then(|| {
            thumbnail::fit(width, height, self.options.thumbnail_max_edge).map(|(tw, th)| {
                debug!(width = tw, height = th, "thumbnail");
                (thumbnail::resize_nearest(&hdr, width, height, 3, tw, th), tw, th)
            })
        });
        let full = self.encode_hdr(hdr, width, height)?;
        let thumbnail = match small {
            None => None,
            Some(None) => Some(full.clone()),
            Some(Some((pixels, tw, th))) => Some(self.encode_hdr(pixels, tw, th)?),
        };
        Ok((full, thumbnail))
    }
}
