//! Byte-level decode and encode.
//!
//! | Format | Decode | Encode |
//! |---|---|---|
//! | PNG | `image` | `PngEncoder`, lossless RGBA, quality ignored |
//! | JPEG | `image` | `JpegEncoder::new_with_quality`, flattened onto black |
//! | GIF | `image` | `GifEncoder`, single frame, 256-colour NeuQuant palette |
//! | WebP | `image` | `WebPEncoder` (VP8L) after quality-driven RGB quantization |
//!
//! The `image` crate only ships a lossless WebP encoder. Lossy output is
//! approximated by snapping RGB channels to a coarser grid before encoding, so
//! lower quality still means smaller files. Alpha is left untouched.

use super::params::{EncodeParams, OutputFormat};
use super::raster::Raster;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError, RgbImage};
use thiserror::Error;

/// Input extensions with a compiled-in decoder.
const INPUT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] ImageError),
    #[error("Decoded image has no pixels")]
    EmptyImage,
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to encode {format}: {source}")]
    Encode {
        format: OutputFormat,
        #[source]
        source: ImageError,
    },
}

/// Returns the image file extensions this build can decode.
pub fn supported_input_extensions() -> &'static [&'static str] {
    INPUT_EXTENSIONS
}

/// Decode a PNG, JPEG, GIF or WebP byte stream. The container is sniffed from
/// the content, not from any file name.
pub fn decode(bytes: &[u8]) -> Result<Raster, CodecError> {
    let img = image::load_from_memory(bytes).map_err(CodecError::Decode)?;
    Raster::new(img.to_rgba8()).ok_or(CodecError::EmptyImage)
}

/// Encode a raster into the container described by `params`.
pub fn encode(raster: &Raster, params: &EncodeParams) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    let (width, height) = raster.dimensions();
    // PNG and GIF have no quality knob.
    let quality = if params.format.is_lossy() {
        params.quality.value() as u8
    } else {
        100
    };

    let result = match params.format {
        OutputFormat::Png => PngEncoder::new(&mut buf).write_image(
            raster.as_rgba().as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        OutputFormat::Jpeg => {
            let rgb = flatten_onto_black(raster);
            JpegEncoder::new_with_quality(&mut buf, quality).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
        OutputFormat::Gif => {
            // The trailer is written when the encoder drops at the end of this block.
            let mut encoder = GifEncoder::new(&mut buf);
            encoder.encode(
                raster.as_rgba().as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )
        }
        OutputFormat::WebP => {
            let mut data = raster.as_rgba().as_raw().clone();
            if !params.webp_lossless {
                quantize_rgb(&mut data, quality);
            }
            WebPEncoder::new_lossless(&mut buf).encode(
                &data,
                width,
                height,
                ExtendedColorType::Rgba8,
            )
        }
    };

    result.map_err(|source| CodecError::Encode {
        format: params.format,
        source,
    })?;
    Ok(buf)
}

/// Premultiply by alpha and drop it: transparent pixels come out black.
fn flatten_onto_black(raster: &Raster) -> RgbImage {
    let rgba = raster.as_rgba();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let scale = |c: u8| ((u32::from(c) * u32::from(a) + 127) / 255) as u8;
        image::Rgb([scale(r), scale(g), scale(b)])
    })
}

/// Snap RGB channels to `levels_for_quality(quality)` evenly spaced values.
fn quantize_rgb(data: &mut [u8], quality: u8) {
    let levels = levels_for_quality(quality);
    if levels >= 256 {
        return;
    }
    let step = 255.0 / (levels - 1) as f32;
    for pixel in data.chunks_exact_mut(4) {
        for channel in pixel.iter_mut().take(3) {
            let bucket = (f32::from(*channel) / step).round();
            *channel = (bucket * step).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// 1 → 4 levels per channel, 99 → 253, 100 → 256 (untouched).
fn levels_for_quality(quality: u8) -> u32 {
    if quality >= 100 {
        return 256;
    }
    4 + (u32::from(quality.max(1)) - 1) * 252 / 99
}
