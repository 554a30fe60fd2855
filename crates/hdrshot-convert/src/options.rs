//! Conversion options.
//!
//! Every field has a default, so a YAML file only needs the keys it
//! changes:
//!
//! ```yaml
//! generate_thumbnail: false
//! peak_percentile: 99.9
//! output: avif
//! ```

use hdrshot_color::DEFAULT_PERCENTILE;
use serde::Deserialize;

/// Longest thumbnail edge in pixels.
pub const DEFAULT_THUMBNAIL_EDGE: u32 = 1280;

/// Container of the HDR output and its thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputContainer {
    /// 16-bit PNG with a cICP chunk.
    #[default]
    Png,
    /// AVIF through the image backend, `nclx` re-tagged afterwards.
    Avif,
}

impl OutputContainer {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Avif => "avif",
        }
    }
}

/// What a conversion produces and how.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Produce the tone-mapped 8-bit sRGB preview.
    pub generate_sdr: bool,
    /// Produce a downscaled copy of the HDR output.
    pub generate_thumbnail: bool,
    /// Longest thumbnail edge.
    pub thumbnail_max_edge: u32,
    /// Luminance percentile used as the tone-map peak.
    pub peak_percentile: f64,
    /// Container of the HDR output.
    pub output: OutputContainer,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            generate_sdr: true,
            generate_thumbnail: true,
            thumbnail_max_edge: DEFAULT_THUMBNAIL_EDGE,
            peak_percentile: DEFAULT_PERCENTILE,
            output: OutputContainer::Png,
        }
    }
}

impl ConvertOptions {
    /// Enables or disables the SDR preview.
    pub fn with_sdr(mut self, enabled: bool) -> Self {
        self.generate_sdr = enabled;
        self
    }

    /// Enables or disables the thumbnail.
    pub fn with_thumbnail(mut self, enabled: bool) -> Self {
        self.generate_thumbnail = enabled;
        self
    }

    /// Sets the longest thumbnail edge (at least 1).
    pub fn with_thumbnail_edge(mut self, edge: u32) -> Self {
        self.thumbnail_max_edge = edge.max(1);
        self
    }

    /// Sets the peak percentile.
    pub fn with_percentile(mut self, percentile: f64) -> Self {
        self.peak_percentile = percentile;
        self
    }

    /// Sets the output container.
    pub fn with_output(mut self, output: OutputContainer) -> Self {
        self.output = output;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let o = ConvertOptions::default();
        assert!(o.generate_sdr && o.generate_thumbnail);
        assert_eq!(o.thumbnail_max_edge, 1280);
        assert_eq!(o.peak_percentile, 99.94);
        assert_eq!(o.output, OutputContainer::Png);
    }

    #[test]
    fn test_partial_yaml() {
        let o: ConvertOptions =
            serde_yaml::from_str("generate_thumbnail: false\noutput: avif\n").unwrap();
        assert!(!o.generate_thumbnail);
        assert!(o.generate_sdr);
        assert_eq!(o.output, OutputContainer::Avif);
        assert_eq!(o.output.extension(), "avif");
    }

    #[test]
    fn test_builders() {
        let o = ConvertOptions::default()
            .with_sdr(false)
            .with_thumbnail_edge(0)
            .with_percentile(99.0);
        assert!(!o.generate_sdr);
        assert_eq!(o.thumbnail_max_edge, 1);
        assert_eq!(o.peak_percentile, 99.0);
    }
}
