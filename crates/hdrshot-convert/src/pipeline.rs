//! The per-pixel pass.
//!
//! One loop over the image builds the canonical 16-bit BT.2020/PQ buffer,
//! the tone-mapped SDR buffer and both statistics records. The only other
//! traversal is the peak histogram, which has to finish before the first
//! pixel can be tone-mapped.

use hdrshot_color::{finite_or_zero, GamutAccumulator, LuminanceAccumulator, PeakHistogram, ToneMapper};
use hdrshot_core::cicp::{TRANSFER_BT709, TRANSFER_LINEAR, TRANSFER_PQ, TRANSFER_SRGB};
use hdrshot_core::{DecodedImage, GamutCoverage, LuminanceStats, Samples};
use hdrshot_math::Mat3;
use hdrshot_primaries::{RgbSpace, MATRICES};
use hdrshot_transfer::pq;
use hdrshot_transfer::srgb::{self, SRGB_LUT};
use tracing::{debug, trace};

/// How stored sample values relate to linear light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTransfer {
    /// Already linear scRGB (1.0 = 80 cd/m2).
    Linear,
    /// PQ code values.
    Pq,
    /// sRGB encoded, 1.0 = 80 cd/m2 after decoding.
    Srgb,
}

impl SourceTransfer {
    /// Maps a transfer code point. Unknown codes return `None`.
    pub fn from_cicp(code: u8) -> Option<Self> {
        match code {
            TRANSFER_LINEAR => Some(Self::Linear),
            TRANSFER_PQ => Some(Self::Pq),
            TRANSFER_SRGB | TRANSFER_BT709 => Some(Self::Srgb),
            _ => None,
        }
    }

    /// Transfer to run colour math with, or `None` for the integer
    /// pass-through.
    ///
    /// Float samples are linear unless tagged otherwise. Integer samples
    /// only take the colour path when they are PQ tagged; any other
    /// integer data has no defined light level here.
    pub fn for_image(image: &DecodedImage) -> Option<Self> {
        let tagged = image.transfer.and_then(Self::from_cicp);
        if image.samples.is_float() {
            Some(tagged.unwrap_or(Self::Linear))
        } else {
            tagged.filter(|t| *t == Self::Pq)
        }
    }

    #[inline]
    fn decode(self, v: f64) -> f64 {
        match self {
            Self::Linear => v,
            Self::Pq => pq::eotf(v),
            Self::Srgb => srgb::eotf(v),
        }
    }
}

/// Linear-light view over a decoded image.
#[derive(Debug, Clone, Copy)]
pub struct LinearView<'a> {
    image: &'a DecodedImage,
    transfer: SourceTransfer,
    space: RgbSpace,
    to_rec709: &'static Mat3,
}

impl<'a> LinearView<'a> {
    /// Creates a view; untagged or unknown primaries are taken as Rec.709.
    pub fn new(image: &'a DecodedImage, transfer: SourceTransfer) -> Self {
        let space = image
            .primaries
            .and_then(RgbSpace::from_cicp)
            .unwrap_or(RgbSpace::Rec709);
        Self {
            image,
            transfer,
            space,
            to_rec709: space.to_rec709(),
        }
    }

    /// Underlying image.
    pub fn image(&self) -> &DecodedImage {
        self.image
    }

    /// Primaries of the stored samples.
    pub fn space(&self) -> RgbSpace {
        self.space
    }

    /// Linear scRGB of pixel `i` in the stored primaries.
    #[inline]
    pub fn native(&self, i: usize) -> [f64; 3] {
        let [r, g, b] = self.image.rgb(i);
        let t = self.transfer;
        finite_or_zero([t.decode(r as f64), t.decode(g as f64), t.decode(b as f64)])
    }

    /// Linear scRGB of pixel `i` in Rec.709 primaries.
    #[inline]
    pub fn rec709(&self, i: usize) -> [f64; 3] {
        self.to_rec709 * self.native(i)
    }

    /// True when the stored samples already are 16-bit BT.2020/PQ.
    pub fn is_canonical(&self) -> bool {
        self.transfer == SourceTransfer::Pq
            && self.space == RgbSpace::Rec2020
            && matches!(self.image.samples, Samples::U16(_))
    }
}

/// Percentile peak of a view, in PQ.
pub fn estimate_peak(view: &LinearView<'_>, percentile: f64) -> f64 {
    let mut hist = PeakHistogram::new();
    for i in 0..view.image.pixel_count() {
        hist.add_rgb(view.rec709(i));
    }
    hist.estimate(percentile)
}

/// Quantizes a PQ code to 16 bits.
#[inline]
pub fn quantize_u16(code: f64) -> u16 {
    (code.clamp(0.0, 1.0) * 65535.0).round() as u16
}

/// Encodes tone-mapped linear scRGB for an 8-bit sRGB display.
///
/// The tone-map target (1.5 scRGB, 120 cd/m2) becomes display white.
#[inline]
pub fn sdr_u8(linear: f64) -> u8 {
    SRGB_LUT.oetf_u8(linear / pq::SDR_WHITE_SCRGB)
}

/// Output of [`render`].
#[derive(Debug, Clone)]
pub struct Rendered {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Interleaved RGB, BT.2020 primaries, PQ, 16 bits.
    pub hdr: Vec<u16>,
    /// Interleaved RGB, Rec.709 primaries, sRGB, 8 bits.
    pub sdr: Option<Vec<u8>>,
    /// Tone-map peak when an SDR buffer was built.
    pub peak_pq: Option<f64>,
    /// Gamut coverage of the source.
    pub gamut: GamutCoverage,
    /// Source luminance, tagged as the 16-bit PQ output.
    pub luminance: LuminanceStats,
}

/// Runs the colour pipeline over a view.
pub fn render(view: &LinearView<'_>, generate_sdr: bool, percentile: f64) -> Rendered {
    let image = view.image;
    let pixels = image.pixel_count();

    let mapper = generate_sdr.then(|| ToneMapper::new(estimate_peak(view, percentile)));
    if let Some(m) = &mapper {
        debug!(peak_pq = m.peak_pq(), percentile, "tone-map peak");
    }

    let canonical = view.is_canonical();
    let to_bt2020: Option<Mat3> = match view.space {
        RgbSpace::Rec2020 => None,
        _ => Some(MATRICES.bt709_to_bt2020 * *view.to_rec709),
    };
    trace!(canonical, space = ?view.space, transfer = ?view.transfer, pixels, "render");

    let mut hdr = Vec::with_capacity(pixels * 3);
    let mut sdr = mapper.map(|_| Vec::with_capacity(pixels * 3));
    let mut gamut = GamutAccumulator::new();
    let mut luminance = LuminanceAccumulator::new();

    let channels = image.channels();
    for i in 0..pixels {
        let native = view.native(i);
        let rec709 = view.to_rec709 * native;

        gamut.add_rec709(rec709);
        luminance.add_scrgb(rec709);

        if canonical {
            let base = i * channels;
            for c in 0..3 {
                hdr.push(image.samples.get_u16(base + c));
            }
        } else {
            let bt2020 = to_bt2020.map_or(native, |m| m * native);
            hdr.extend(pq::oetf_rgb(bt2020).map(quantize_u16));
        }

        if let (Some(m), Some(out)) = (&mapper, sdr.as_mut()) {
            out.extend(m.map(rec709).map(sdr_u8));
        }
    }

    Rendered {
        width: image.width,
        height: image.height,
        hdr,
        sdr,
        peak_pq: mapper.map(|m| m.peak_pq()),
        gamut: gamut.coverage(),
        luminance: luminance.finish(16, TRANSFER_PQ),
    }
}

/// Integer pass-through: RGB widened to 16 bits, no colour math.
///
/// 8-bit samples scale by exactly 257; alpha is dropped.
pub fn passthrough(image: &DecodedImage) -> Vec<u16> {
    let channels = image.channels();
    let mut out = Vec::with_capacity(image.pixel_count() * 3);
    for i in 0..image.pixel_count() {
        let base = i * channels;
        for c in 0..3 {
            out.push(image.samples.get_u16(base + c));
        }
    }
    out
}
