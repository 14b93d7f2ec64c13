//! High-level raster transforms.
//!
//! These functions combine the pure [`calculations`](super::calculations) with
//! pixel work. Each takes its input by reference or by value and returns a new
//! [`Raster`]; nothing is modified in place.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{ResizeSpec, ResizeSpecWarning, target_dimensions};
use super::params::Opacity;
use super::raster::Raster;
use image::imageops::{self, FilterType};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Gap in pixels between the watermark and the bottom-right edges of the base.
pub const WATERMARK_INSET: i64 = 10;

/// Result of a resize request.
#[derive(Debug)]
pub enum ResizeOutcome {
    Resized(Raster),
    /// The spec could not be applied; the original raster is handed back as-is.
    Skipped {
        raster: Raster,
        warning: ResizeSpecWarning,
    },
}

impl ResizeOutcome {
    pub fn into_raster(self) -> Raster {
        match self {
            ResizeOutcome::Resized(raster) | ResizeOutcome::Skipped { raster, .. } => raster,
        }
    }

    pub fn warning(&self) -> Option<&ResizeSpecWarning> {
        match self {
            ResizeOutcome::Resized(_) => None,
            ResizeOutcome::Skipped { warning, .. } => Some(warning),
        }
    }
}

/// Resize `raster` according to a `"WxH"` / `"P%"` string.
///
/// Resampling uses Catmull-Rom over the full source into a freshly allocated
/// buffer of the target size. A malformed, degenerate or oversized spec yields
/// [`ResizeOutcome::Skipped`] with the input raster unchanged.
pub fn resize(raster: Raster, spec: &str) -> ResizeOutcome {
    let target = ResizeSpec::parse(spec)
        .and_then(|parsed| target_dimensions(raster.dimensions(), &parsed, spec));

    let (width, height) = match target {
        Ok(dims) => dims,
        Err(warning) => return ResizeOutcome::Skipped { raster, warning },
    };

    if (width, height) == raster.dimensions() {
        return ResizeOutcome::Resized(raster);
    }

    let resized = imageops::resize(raster.as_rgba(), width, height, FilterType::CatmullRom);
    match Raster::new(resized) {
        Some(resized) => ResizeOutcome::Resized(resized),
        None => ResizeOutcome::Skipped {
            raster,
            warning: ResizeSpecWarning::Degenerate {
                spec: spec.to_string(),
                width,
                height,
            },
        },
    }
}

/// Top-left position of a watermark anchored bottom-right with [`WATERMARK_INSET`].
///
/// Not clamped: a watermark larger than the base lands partly off-canvas.
pub fn watermark_offset(base: (u32, u32), watermark: (u32, u32)) -> (i64, i64) {
    (
        i64::from(base.0) - i64::from(watermark.0) - WATERMARK_INSET,
        i64::from(base.1) - i64::from(watermark.1) - WATERMARK_INSET,
    )
}

/// Composite `watermark` over a copy of `base` at the bottom-right corner.
///
/// Every watermark pixel's alpha is scaled by the uniform mask
/// `round(opacity / 100 × 255)`, then blended with straight-alpha "over".
/// Pixels falling outside the base are clipped.
pub fn apply_watermark(base: &Raster, watermark: &Raster, opacity: Opacity) -> Raster {
    let mask = u32::from(opacity.mask_alpha());
    let (offset_x, offset_y) = watermark_offset(base.dimensions(), watermark.dimensions());
    let (base_w, base_h) = base.dimensions();
    let mut canvas = base.as_rgba().clone();

    if mask > 0 {
        for (wx, wy, src) in watermark.as_rgba().enumerate_pixels() {
            let x = offset_x + i64::from(wx);
            let y = offset_y + i64::from(wy);
            if x < 0 || y < 0 || x >= i64::from(base_w) || y >= i64::from(base_h) {
                continue;
            }
            let dst = canvas.get_pixel_mut(x as u32, y as u32);
            dst.0 = blend_over(dst.0, src.0, mask);
        }
    }

    Raster::new(canvas).unwrap_or_else(|| base.clone())
}

/// Straight-alpha "over" in integer arithmetic. `mask` scales the source alpha.
fn blend_over(dst: [u8; 4], src: [u8; 4], mask: u32) -> [u8; 4] {
    let src_a = (u32::from(src[3]) * mask + 127) / 255;
    if src_a == 0 {
        return dst;
    }
    let dst_a = u32::from(dst[3]);
    // Output alpha scaled by 255: sa·255 + da·(255 − sa)
    let out_a = src_a * 255 + dst_a * (255 - src_a);

    let mut out = [0u8; 4];
    for c in 0..3 {
        let premul = u32::from(src[c]) * src_a * 255 + u32::from(dst[c]) * dst_a * (255 - src_a);
        out[c] = ((premul + out_a / 2) / out_a) as u8;
    }
    out[3] = ((out_a + 127) / 255) as u8;
    out
}

#[derive(Error, Debug)]
#[error("Failed to load watermark {}: {source}", path.display())]
pub struct WatermarkError {
    pub path: PathBuf,
    #[source]
    pub source: BackendError,
}

/// Read and decode the watermark image through `backend`.
pub fn load_watermark(backend: &impl ImageBackend, path: &Path) -> Result<Raster, WatermarkError> {
    backend.load(path).map_err(|source| WatermarkError {
        path: path.to_path_buf(),
        source,
    })
}
