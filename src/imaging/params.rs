//! Parameter types for image operations.
//!
//! These types describe *what* to produce, not *how*. They are shared between
//! the [`codec`](super::codec), the [`operations`](super::operations), and the
//! pipeline options in [`process`](crate::process).
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 80). Clamped on construction.
//! - [`Opacity`]: Watermark opacity (0–100, default 100). Clamped on construction.
//! - [`OutputFormat`]: The four encodable containers, parsed case-insensitively.
//! - [`EncodeParams`]: Everything the codec needs to encode one raster.

use super::codec::CodecError;
use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Watermark opacity as a percentage (0 = invisible, 100 = fully opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opacity(u32);

impl Opacity {
    pub fn new(value: u32) -> Self {
        Self(value.min(100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Uniform mask alpha applied to every watermark pixel: `round(opacity / 100 × 255)`.
    pub fn mask_alpha(self) -> u8 {
        (self.0 as f64 / 100.0 * 255.0).round() as u8
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self(100)
    }
}

/// Output container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
}

impl OutputFormat {
    /// Canonical file extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Gif => "gif",
            OutputFormat::WebP => "webp",
        }
    }

    /// Whether `quality` influences the encoded output.
    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg | OutputFormat::WebP)
    }
}

impl FromStr for OutputFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "gif" => Ok(OutputFormat::Gif),
            "webp" => Ok(OutputFormat::WebP),
            _ => Err(CodecError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Gif => "GIF",
            OutputFormat::WebP => "WebP",
        };
        f.write_str(name)
    }
}

/// Parameters for a single encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub format: OutputFormat,
    pub quality: Quality,
    /// Keep WebP pixels exact instead of quantizing by quality.
    pub webp_lossless: bool,
}

impl EncodeParams {
    pub fn new(format: OutputFormat, quality: Quality) -> Self {
        Self {
            format,
            quality,
            webp_lossless: false,
        }
    }
}
