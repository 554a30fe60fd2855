//! End-to-end conversions with in-memory fixtures and mock codecs.

use approx::assert_abs_diff_eq;
use half::f16;
use hdrshot_convert::{
    ConvertError, ConvertOptions, Converter, ImageBackend, JxrBitDepth, JxrDecoder, JxrImage,
    JxrPixelInfo, OutputContainer, Result,
};
use hdrshot_core::cicp::{PRIMARIES_BT2020, TRANSFER_PQ};
use hdrshot_core::{ChannelLayout, Cicp, DecodedImage, Samples};
use hdrshot_io::png::{self, ColorType};
use hdrshot_io::{avif, Format};
use std::sync::Arc;

/// Radiance file with flat scanlines.
fn radiance(width: u32, height: u32, rgbe: [u8; 4]) -> Vec<u8> {
    let mut out = format!("#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y {height} +X {width}\n").into_bytes();
    for _ in 0..width * height {
        out.extend_from_slice(&rgbe);
    }
    out
}

fn bx(fourcc: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(fourcc);
    out.extend_from_slice(payload);
    out
}

/// Minimal AVIF carrying only an nclx colour box.
fn avif_with_nclx(cicp: Cicp) -> Vec<u8> {
    let mut nclx = b"nclx".to_vec();
    for c in [cicp.primaries, cicp.transfer, cicp.matrix] {
        nclx.extend_from_slice(&(c as u16).to_be_bytes());
    }
    nclx.push(if cicp.full_range { 0x80 } else { 0 });
    let ipco = bx(b"ipco", &bx(b"colr", &nclx));
    let mut meta = vec![0, 0, 0, 0];
    meta.extend_from_slice(&bx(b"iprp", &ipco));
    [bx(b"ftyp", b"avif\0\0\0\0mif1"), bx(b"meta", &meta), bx(b"mdat", &[0; 16])].concat()
}

struct MockJxr(JxrBitDepth);

impl JxrDecoder for MockJxr {
    fn decode(&self, bytes: &[u8]) -> Result<JxrImage> {
        if bytes.is_empty() {
            return Err(ConvertError::backend("empty JPEG-XR stream"));
        }
        let bytes = match self.0 {
            JxrBitDepth::Float16 => [4.0f32, 2.0, 1.0, 1.0, 0.25, 0.25, 0.25, 1.0]
                .iter()
                .flat_map(|v| f16::from_f32(*v).to_bits().to_le_bytes())
                .collect(),
            JxrBitDepth::Uint8 => vec![255, 0, 0, 255, 1, 2, 3, 255],
            other => panic!("mock does not produce {other:?}"),
        };
        Ok(JxrImage {
            width: 2,
            height: 1,
            pixel_info: JxrPixelInfo {
                channels: 4,
                bit_depth: self.0,
                has_alpha: true,
            },
            bytes,
        })
    }
}

/// Backend that decodes everything to a fixed 2x2 PQ grey and writes an
/// AVIF whose nclx tag is wrong, as real encoders sometimes do.
struct MockBackend;

impl ImageBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn decode_rgba(&self, _bytes: &[u8], bit_depth: u8) -> Result<DecodedImage> {
        assert_eq!(bit_depth, 16);
        let samples = Samples::U16([40000u16, 40000, 40000, 65535].repeat(4));
        Ok(DecodedImage::new(2, 2, ChannelLayout::Rgba, samples)?)
    }

    fn encode_avif(
        &self,
        samples: &Samples,
        width: u32,
        height: u32,
        layout: ChannelLayout,
        _cicp: Cicp,
    ) -> Result<Vec<u8>> {
        assert_eq!(samples.len(), (width * height) as usize * layout.channels());
        Ok(avif_with_nclx(Cicp::SRGB))
    }
}

#[test]
fn radiance_to_canonical_png() {
    let file = radiance(2, 2, [128, 64, 32, 130]);
    let out = Converter::default().convert("shot.hdr", &file).unwrap();

    assert_eq!(out.hdr.format, Format::Png);
    let hdr = png::decode(&out.hdr.bytes).unwrap();
    assert_eq!((hdr.width, hdr.height), (2, 2));
    assert_eq!(hdr.layout, ChannelLayout::Rgb);
    assert_eq!(hdr.transfer, Some(TRANSFER_PQ));
    assert_eq!(hdr.primaries, Some(PRIMARIES_BT2020));
    assert!(matches!(hdr.samples, Samples::U16(_)));

    let sdr = png::read_info(&out.sdr.as_ref().unwrap().bytes).unwrap();
    assert_eq!(sdr.bit_depth, 8);
    assert_eq!(sdr.cicp, Some(Cicp::SRGB));

    // fits the bound, so the thumbnail is the full image
    assert_eq!(out.thumbnail.as_ref().unwrap(), &out.hdr);

    let lum = out.luminance.unwrap();
    assert_abs_diff_eq!(lum.max_cll, 160.0, epsilon = 1e-3);
    assert_abs_diff_eq!(out.gamut.unwrap().total(), 100.0, epsilon = 1e-9);
    assert!(out.peak_pq.is_some());
}

#[test]
fn options_switch_outputs_off() {
    let file = radiance(2, 1, [128, 128, 128, 129]);
    let converter = Converter::new(ConvertOptions::default().with_sdr(false).with_thumbnail(false));
    let out = converter.convert("a.hdr", &file).unwrap();
    assert!(out.sdr.is_none());
    assert!(out.thumbnail.is_none());
    assert!(out.peak_pq.is_none());
    assert!(out.luminance.is_some());
}

#[test]
fn thumbnail_is_bounded() {
    let file = radiance(40, 10, [100, 100, 100, 128]);
    let converter = Converter::new(ConvertOptions::default().with_thumbnail_edge(16));
    let out = converter.convert("wide.hdr", &file).unwrap();
    let thumb = out.thumbnail.unwrap();
    assert_eq!((thumb.width, thumb.height), (16, 4));
    let decoded = png::decode(&thumb.bytes).unwrap();
    assert_eq!(decoded.transfer, Some(TRANSFER_PQ));
    assert_eq!((decoded.width, decoded.height), (16, 4));
}

#[test]
fn jxr_float_gets_colour_math() {
    let converter = Converter::default().with_jxr_decoder(Arc::new(MockJxr(JxrBitDepth::Float16)));
    let out = converter.convert("game.jxr", b"jxr").unwrap();
    let lum = out.luminance.unwrap();
    assert_abs_diff_eq!(lum.max_cll, 320.0, epsilon = 1e-3);
    assert!(out.sdr.is_some());
}

#[test]
fn jxr_integer_is_passed_through() {
    let converter = Converter::default().with_jxr_decoder(Arc::new(MockJxr(JxrBitDepth::Uint8)));
    let out = converter.convert("game.jxr", b"jxr").unwrap();
    assert!(out.gamut.is_none());
    assert!(out.luminance.is_none());
    assert!(out.sdr.is_none());
    let hdr = png::decode(&out.hdr.bytes).unwrap();
    assert_eq!(hdr.samples, Samples::U16(vec![65535, 0, 0, 257, 514, 771]));
}

#[test]
fn jxr_without_decoder() {
    let err = Converter::default().convert("game.jxr", b"jxr").unwrap_err();
    assert!(matches!(err, ConvertError::NoBackend { format: Format::Jxr }));
}

#[test]
fn avif_input_takes_tags_from_container() {
    let converter = Converter::default().with_backend(Arc::new(MockBackend));
    let out = converter.convert("x.avif", &avif_with_nclx(Cicp::BT2020_PQ)).unwrap();
    // canonical source: codes survive untouched
    let hdr = png::decode(&out.hdr.bytes).unwrap();
    assert_eq!(hdr.samples, Samples::U16([40000u16; 3].repeat(4)));
    assert!(out.luminance.is_some());
    assert!(out.sdr.is_some());
}

#[test]
fn avif_output_is_retagged() {
    let converter = Converter::new(ConvertOptions::default().with_output(OutputContainer::Avif))
        .with_backend(Arc::new(MockBackend));
    let out = converter.convert("shot.hdr", &radiance(2, 2, [1, 2, 3, 140])).unwrap();
    assert_eq!(out.hdr.format, Format::Avif);
    assert_eq!(avif::read_metadata(&out.hdr.bytes).cicp, Some(Cicp::BT2020_PQ));
    assert_eq!(out.sdr.unwrap().format, Format::Png);
}

#[test]
fn avif_output_needs_backend() {
    let converter = Converter::new(ConvertOptions::default().with_output(OutputContainer::Avif));
    let err = converter.convert("shot.hdr", &radiance(1, 1, [1, 1, 1, 128])).unwrap_err();
    assert!(matches!(err, ConvertError::NoBackend { format: Format::Avif }));
}

#[test]
fn eight_bit_png_is_widened() {
    let file = png::encode_png(&Samples::U8(vec![255, 128, 0]), 1, 1, ColorType::Rgb, None).unwrap();
    let out = Converter::default().convert("old.png", &file).unwrap();
    let hdr = png::decode(&out.hdr.bytes).unwrap();
    assert_eq!(hdr.samples, Samples::U16(vec![65535, 128 * 257, 0]));
}

#[test]
fn unknown_input() {
    let err = Converter::default().convert("notes.txt", b"hello").unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedFormat(_)));
}

#[test]
fn batch_keeps_order_and_names_failures() {
    let inputs = vec![
        ("good.hdr".to_string(), radiance(1, 1, [128, 64, 32, 130])),
        ("broken.exr".to_string(), b"not an exr".to_vec()),
        ("also_good.hdr".to_string(), radiance(1, 1, [1, 1, 1, 129])),
    ];
    let results = Converter::default().convert_batch(&inputs);
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    let failure = results[1].as_ref().unwrap_err();
    assert_eq!(failure.name, "broken.exr");
    assert!(failure.to_string().starts_with("broken.exr: "));
    assert!(results[2].is_ok());
}

#[test]
fn batch_survives_headers_that_overstate_size() {
    let mut huge_hdr = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 200000 +X 200000\n".to_vec();
    huge_hdr.extend_from_slice(&[128, 64, 32, 130]);
    let mut overflow_hdr = b"#?RADIANCE\n\n-Y 4294967295 +X 4294967295\n".to_vec();
    overflow_hdr.extend_from_slice(&[128, 64, 32, 130]);

    let inputs = vec![
        ("huge.hdr".to_string(), huge_hdr),
        ("overflow.hdr".to_string(), overflow_hdr),
        ("good.hdr".to_string(), radiance(1, 1, [128, 64, 32, 130])),
    ];
    let results = Converter::default().convert_batch(&inputs);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap_err().name, "huge.hdr");
    assert_eq!(results[1].as_ref().unwrap_err().name, "overflow.hdr");
    assert!(results[2].is_ok());
}
