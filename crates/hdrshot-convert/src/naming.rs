//! Output file names.

use crate::options::OutputContainer;
use std::path::Path;

/// File name without directory and extension.
///
/// Falls back to `"image"` for names with no usable stem.
pub fn output_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string())
}

/// Names of the files written for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    /// Canonical HDR image.
    pub hdr: String,
    /// SDR preview (always PNG).
    pub sdr: String,
    /// Thumbnail.
    pub thumbnail: String,
}

impl OutputNames {
    /// `<stem>.<ext>`, `<stem>.sdr.png`, `<stem>.thumb.<ext>`.
    pub fn new(name: &str, container: OutputContainer) -> Self {
        let stem = output_stem(name);
        let ext = container.extension();
        Self {
            hdr: format!("{stem}.{ext}"),
            sdr: format!("{stem}.sdr.png"),
            thumbnail: format!("{stem}.thumb.{ext}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem() {
        assert_eq!(output_stem("shots/Game 2024.jxr"), "Game 2024");
        assert_eq!(output_stem("a.b.exr"), "a.b");
        assert_eq!(output_stem("noext"), "noext");
        assert_eq!(output_stem(""), "image");
    }

    #[test]
    fn test_names() {
        let n = OutputNames::new("/tmp/x.exr", OutputContainer::Avif);
        assert_eq!(n.hdr, "x.avif");
        assert_eq!(n.sdr, "x.sdr.png");
        assert_eq!(n.thumbnail, "x.thumb.avif");
    }
}
