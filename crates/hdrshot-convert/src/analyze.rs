//! Statistics from a full decode.
//!
//! Used when a stored PNG comes without the statistics its encoder
//! computed. Untagged files are read as linear scRGB, 80 cd/m2 per unit.

use crate::pipeline::{LinearView, SourceTransfer};
use crate::Result;
use hdrshot_color::{GamutAccumulator, LuminanceAccumulator};
use hdrshot_core::cicp::TRANSFER_LINEAR;
use hdrshot_core::{DecodedImage, GamutCoverage, LuminanceStats};
use hdrshot_io::png;
use serde::Serialize;
use tracing::debug;

/// Statistics of one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Analysis {
    /// Gamut coverage.
    pub gamut: GamutCoverage,
    /// Luminance statistics.
    pub luminance: LuminanceStats,
}

/// Decodes a PNG and measures it.
pub fn analyze_png(bytes: &[u8]) -> Result<Analysis> {
    let image = png::decode(bytes)?;
    Ok(analyze_image(&image))
}

/// Measures a decoded image.
///
/// The transfer comes from the image tag; an absent or unknown tag means
/// linear light.
pub fn analyze_image(image: &DecodedImage) -> Analysis {
    let transfer = image
        .transfer
        .and_then(SourceTransfer::from_cicp)
        .unwrap_or(SourceTransfer::Linear);
    let view = LinearView::new(image, transfer);

    let mut gamut = GamutAccumulator::new();
    let mut luminance = LuminanceAccumulator::new();
    for i in 0..image.pixel_count() {
        let rgb = view.rec709(i);
        gamut.add_rec709(rgb);
        luminance.add_scrgb(rgb);
    }
    debug!(
        width = image.width,
        height = image.height,
        transfer = ?transfer,
        pixels = luminance.count(),
        "analyzed"
    );

    Analysis {
        gamut: gamut.coverage(),
        luminance: luminance.finish(
            image.sample_type().bits(),
            image.transfer.unwrap_or(TRANSFER_LINEAR),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hdrshot_core::{Cicp, Samples};
    use hdrshot_io::png::ColorType;
    use hdrshot_transfer::pq;

    #[test]
    fn test_untagged_is_linear_scrgb() {
        let bytes = png::encode_png(&Samples::U16(vec![65535; 3]), 1, 1, ColorType::Rgb, None).unwrap();
        let a = analyze_png(&bytes).unwrap();
        assert_relative_eq!(a.luminance.max_luminance, 80.0, max_relative = 1e-5);
        assert_eq!(a.luminance.bit_depth, 16);
        assert_eq!(a.luminance.transfer, TRANSFER_LINEAR);
        assert_eq!(a.gamut.rec709, 100.0);
    }

    #[test]
    fn test_canonical_png() {
        let code = (pq::oetf_nits(1000.0) * 65535.0).round() as u16;
        let samples = Samples::U16(vec![code, code, code, 0, 0, 0]);
        let bytes = png::encode_png(&samples, 2, 1, ColorType::Rgb, Some(Cicp::BT2020_PQ)).unwrap();
        let a = analyze_png(&bytes).unwrap();
        assert_relative_eq!(a.luminance.max_luminance, 1000.0, max_relative = 1e-3);
        assert_relative_eq!(a.luminance.avg_luminance, 500.0, max_relative = 1e-3);
        assert_eq!(a.luminance.min_luminance, 0.0);
        assert_eq!(a.luminance.transfer, 16);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(analyze_png(b"not a png").is_err());
    }
}
