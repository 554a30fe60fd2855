//! Format detection utilities.
//!
//! Dispatch is by file extension; magic bytes decide only when the
//! extension is missing or unknown.

use crate::exr::EXR_MAGIC;
use crate::png::PNG_SIGNATURE;
use std::path::Path;

/// JPEG XR magic ("II", 0xBC, version 1).
const JXR_MAGIC: [u8; 4] = [0x49, 0x49, 0xBC, 0x01];

/// Input formats the pipeline knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// PNG.
    Png,
    /// AVIF (ISOBMFF with an AV1 image item).
    Avif,
    /// JPEG XR.
    Jxr,
    /// OpenEXR.
    Exr,
    /// Radiance RGBE.
    Hdr,
    /// Unknown/unsupported format.
    Unknown,
}

impl Format {
    /// Extension first, then magic bytes.
    pub fn detect<P: AsRef<Path>>(name: P, bytes: &[u8]) -> Self {
        match Self::from_extension(name) {
            Format::Unknown => Self::from_bytes(bytes),
            known => known,
        }
    }

    /// Detects format from file extension only.
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("png") => Format::Png,
            Some("avif") => Format::Avif,
            Some("jxr") | Some("wdp") | Some("hdp") => Format::Jxr,
            Some("exr") => Format::Exr,
            Some("hdr") | Some("pic") | Some("rgbe") => Format::Hdr,
            _ => Format::Unknown,
        }
    }

    /// Detects format from raw bytes (magic number check).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.starts_with(&PNG_SIGNATURE) {
            return Format::Png;
        }
        if bytes.starts_with(&EXR_MAGIC) {
            return Format::Exr;
        }
        if bytes.starts_with(&JXR_MAGIC) {
            return Format::Jxr;
        }
        if bytes.starts_with(b"#?") {
            return Format::Hdr;
        }
        if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
            let brand = &bytes[8..12];
            if brand == b"avif" || brand == b"avis" {
                return Format::Avif;
            }
        }
        Format::Unknown
    }

    /// Returns the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Png => "png",
            Format::Avif => "avif",
            Format::Jxr => "jxr",
            Format::Exr => "exr",
            Format::Hdr => "hdr",
            Format::Unknown => "",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Png => "image/png",
            Format::Avif => "image/avif",
            Format::Jxr => "image/vnd.ms-photo",
            Format::Exr => "image/x-exr",
            Format::Hdr => "image/vnd.radiance",
            Format::Unknown => "application/octet-stream",
        }
    }

    /// Formats with no cheap header-level SDR signal.
    pub fn always_hdr(&self) -> bool {
        matches!(self, Format::Jxr | Format::Exr | Format::Hdr)
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Format::Png => "PNG",
            Format::Avif => "AVIF",
            Format::Jxr => "JPEG XR",
            Format::Exr => "OpenEXR",
            Format::Hdr => "Radiance HDR",
            Format::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(Format::from_extension("shot.PNG"), Format::Png);
        assert_eq!(Format::from_extension("a/b/c.jxr"), Format::Jxr);
        assert_eq!(Format::from_extension("x.exr"), Format::Exr);
        assert_eq!(Format::from_extension("x.hdr"), Format::Hdr);
        assert_eq!(Format::from_extension("x"), Format::Unknown);
    }

    #[test]
    fn test_magic() {
        assert_eq!(Format::from_bytes(&PNG_SIGNATURE), Format::Png);
        assert_eq!(Format::from_bytes(&[0x76, 0x2f, 0x31, 0x01, 2, 0, 0, 0]), Format::Exr);
        assert_eq!(Format::from_bytes(b"#?RADIANCE\n"), Format::Hdr);
        assert_eq!(Format::from_bytes(b"\0\0\0\x1cftypavif"), Format::Avif);
        assert_eq!(Format::from_bytes(&[0x49, 0x49, 0xBC, 0x01]), Format::Jxr);
        assert_eq!(Format::from_bytes(b"GIF8"), Format::Unknown);
    }

    #[test]
    fn test_extension_wins() {
        assert_eq!(Format::detect("x.avif", &PNG_SIGNATURE), Format::Avif);
        assert_eq!(Format::detect("noext", &PNG_SIGNATURE), Format::Png);
    }
}
