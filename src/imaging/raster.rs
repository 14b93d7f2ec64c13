//! Owned in-memory pixel buffer passed between pipeline stages.

use image::{Rgba, RgbaImage};

/// Decoded RGBA8 image with non-zero width and height.
///
/// Rasters are never mutated after construction: every transform in
/// [`operations`](super::operations) returns a fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pixels: RgbaImage,
}

impl Raster {
    /// Wrap a pixel buffer. Returns `None` when either dimension is zero.
    pub fn new(pixels: RgbaImage) -> Option<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return None;
        }
        Some(Self { pixels })
    }

    /// Solid-colour raster. Returns `None` when either dimension is zero.
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Option<Self> {
        Self::new(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.pixels
    }
}
