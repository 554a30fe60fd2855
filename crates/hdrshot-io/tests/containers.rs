//! Public-API tests across the container codecs.

use hdrshot_core::cicp::TRANSFER_LINEAR;
use hdrshot_core::{ChannelLayout, Cicp, Samples};
use hdrshot_io::png::{self, ColorType, AFTER_IHDR};
use hdrshot_io::probe::SdrReason;
use hdrshot_io::{hdr, probe, Format, IoError, Verdict};

#[test]
fn png_rgba16_roundtrip_is_lossless() {
    let (w, h) = (13u32, 7u32);
    let data: Vec<u16> = (0..w * h * 4)
        .map(|i| (i.wrapping_mul(2_654_435_761) >> 16) as u16)
        .collect();
    let samples = Samples::U16(data);
    let bytes = png::encode_png(&samples, w, h, ColorType::Rgba, Some(Cicp::BT2020_PQ)).unwrap();

    let image = png::decode(&bytes).unwrap();
    assert_eq!(image.layout, ChannelLayout::Rgba);
    assert_eq!(image.samples, samples);
    assert_eq!(image.transfer, Some(16));
}

#[test]
fn cicp_lands_after_ihdr() {
    let plain = png::encode_png(&Samples::U16(vec![1, 2, 3]), 1, 1, ColorType::Rgb, None).unwrap();
    let tagged = png::inject_cicp(&plain, Cicp::BT2020_PQ).unwrap();

    assert_eq!(&tagged[..AFTER_IHDR], &plain[..AFTER_IHDR]);
    assert_eq!(&tagged[AFTER_IHDR..AFTER_IHDR + 4], &4u32.to_be_bytes());
    assert_eq!(&tagged[AFTER_IHDR + 4..AFTER_IHDR + 8], b"cICP");
    for chunk in png::chunks(&tagged).unwrap() {
        chunk.unwrap();
    }
    assert_eq!(png::read_info(&tagged).unwrap().cicp, Some(Cicp::BT2020_PQ));
}

#[test]
fn radiance_known_vector() {
    let mut bytes = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 1 +X 1\n".to_vec();
    bytes.extend_from_slice(&[128, 64, 32, 130]);
    assert_eq!(Format::detect("sky.hdr", &bytes), Format::Hdr);

    let image = hdr::decode(&bytes).unwrap();
    assert_eq!(image.rgb(0), [2.0, 1.0, 0.5]);
    assert_eq!(image.transfer, Some(TRANSFER_LINEAR));
}

#[test]
fn probe_rejects_only_detectable_sdr() {
    let sdr = png::encode_png(&Samples::U8(vec![9; 12]), 2, 2, ColorType::Rgb, None).unwrap();
    let format = Format::detect("shot.png", &sdr);
    let head = &sdr[..probe::probe_len(format)];
    assert_eq!(probe(format, head), Verdict::Sdr(SdrReason::EightBitPng(8)));

    let hdr16 = png::encode_png(&Samples::U16(vec![9; 12]), 2, 2, ColorType::Rgb, None).unwrap();
    assert_eq!(probe(Format::Png, &hdr16), Verdict::Hdr);
    assert_eq!(probe(Format::Exr, b"anything"), Verdict::Hdr);
}

#[test]
fn malformed_inputs_fail_without_panicking() {
    let junk: Vec<u8> = (0..512u32).map(|i| (i * 7 + 3) as u8).collect();
    assert!(matches!(png::decode(&junk), Err(IoError::InvalidFile(_))));
    assert!(matches!(hdr::decode(&junk), Err(IoError::InvalidFile(_))));
    assert!(hdrshot_io::exr::decode(&junk).is_err());
    assert!(hdrshot_io::avif::read_metadata(&junk).cicp.is_none());
}
