//! Pure calculation functions for resize dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use std::fmt;

/// Largest RGBA8 buffer a resize may allocate: 512 MiB, the same ceiling as
/// `image::Limits::default().max_alloc`.
pub const MAX_TARGET_BYTES: u64 = 512 * 1024 * 1024;

/// Parsed form of a resize string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeSpec {
    /// `"WxH"`. A zero on one axis means "derive from the other, keeping aspect".
    Exact { width: u32, height: u32 },
    /// `"P%"`, applied to both axes.
    Percent(u32),
}

/// Why a resize request was skipped. Never fatal: the pipeline carries on
/// with the unresized raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResizeSpecWarning {
    /// The string is neither `P%` nor `WxH`.
    Malformed(String),
    /// The spec parsed, but the computed target has a zero dimension.
    Degenerate {
        spec: String,
        width: u32,
        height: u32,
    },
    /// The computed target would need more than [`MAX_TARGET_BYTES`].
    TooLarge {
        spec: String,
        width: u32,
        height: u32,
    },
}

impl fmt::Display for ResizeSpecWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResizeSpecWarning::Malformed(spec) => write!(f, "Invalid resize format: {spec}"),
            ResizeSpecWarning::Degenerate {
                spec,
                width,
                height,
            } => write!(
                f,
                "Resize {spec} would produce an empty {width}x{height} image"
            ),
            ResizeSpecWarning::TooLarge {
                spec,
                width,
                height,
            } => write!(
                f,
                "Resize {spec} would produce a {width}x{height} image, larger than {} MiB",
                MAX_TARGET_BYTES / (1024 * 1024)
            ),
        }
    }
}

impl ResizeSpec {
    /// Parse `"800x600"`, `"0x600"`, `"800X0"` or `"50%"`.
    ///
    /// # Examples
    /// ```
    /// # use imgtool::imaging::ResizeSpec;
    /// assert_eq!(ResizeSpec::parse("50%"), Ok(ResizeSpec::Percent(50)));
    /// assert_eq!(
    ///     ResizeSpec::parse("800X600"),
    ///     Ok(ResizeSpec::Exact { width: 800, height: 600 })
    /// );
    /// assert!(ResizeSpec::parse("big").is_err());
    /// ```
    pub fn parse(spec: &str) -> Result<Self, ResizeSpecWarning> {
        let malformed = || ResizeSpecWarning::Malformed(spec.to_string());
        let trimmed = spec.trim();

        if let Some(pct) = trimmed.strip_suffix('%') {
            return pct
                .trim()
                .parse::<u32>()
                .map(ResizeSpec::Percent)
                .map_err(|_| malformed());
        }

        let lower = trimmed.to_ascii_lowercase();
        let parts: Vec<&str> = lower.split('x').collect();
        let [w, h] = parts.as_slice() else {
            return Err(malformed());
        };
        let width = w.trim().parse::<u32>().map_err(|_| malformed())?;
        let height = h.trim().parse::<u32>().map_err(|_| malformed())?;
        Ok(ResizeSpec::Exact { width, height })
    }
}

/// Compute the output size for `original` under `spec`.
///
/// - Percent: `floor(orig × p / 100)` on each axis.
/// - Exact with one zero axis: the zero axis is derived from the other using
///   the original aspect ratio, rounded toward zero.
/// - A zero result on either axis is reported as [`ResizeSpecWarning::Degenerate`].
/// - A target whose RGBA8 buffer exceeds [`MAX_TARGET_BYTES`] is reported as
///   [`ResizeSpecWarning::TooLarge`].
///
/// # Examples
/// ```
/// # use imgtool::imaging::{ResizeSpec, target_dimensions};
/// // 400x200 source, height 100 requested → width follows the 2:1 aspect
/// let spec = ResizeSpec::Exact { width: 0, height: 100 };
/// assert_eq!(target_dimensions((400, 200), &spec, "0x100"), Ok((200, 100)));
///
/// assert_eq!(target_dimensions((333, 100), &ResizeSpec::Percent(50), "50%"), Ok((166, 50)));
/// ```
pub fn target_dimensions(
    original: (u32, u32),
    spec: &ResizeSpec,
    raw: &str,
) -> Result<(u32, u32), ResizeSpecWarning> {
    let (orig_w, orig_h) = original;

    let (width, height) = match *spec {
        ResizeSpec::Percent(pct) => (
            scale_axis(orig_w, pct, 100),
            scale_axis(orig_h, pct, 100),
        ),
        // Integer math keeps the truncation exact: h × (w/h) without float drift.
        ResizeSpec::Exact { width, height } => match (width, height) {
            (0, 0) => (0, 0),
            (0, h) => (scale_axis(h, orig_w, orig_h), h),
            (w, 0) => (w, scale_axis(w, orig_h, orig_w)),
            (w, h) => (w, h),
        },
    };

    if width == 0 || height == 0 {
        return Err(ResizeSpecWarning::Degenerate {
            spec: raw.to_string(),
            width,
            height,
        });
    }
    if rgba_bytes(width, height).is_none_or(|bytes| bytes > MAX_TARGET_BYTES) {
        return Err(ResizeSpecWarning::TooLarge {
            spec: raw.to_string(),
            width,
            height,
        });
    }
    Ok((width, height))
}

/// Size of a `width × height` RGBA8 buffer, `None` on overflow.
fn rgba_bytes(width: u32, height: u32) -> Option<u64> {
    u64::from(width)
        .checked_mul(u64::from(height))?
        .checked_mul(4)
}

/// `value × numerator / denominator`, rounded toward zero and saturated to `u32`.
fn scale_axis(value: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = u64::from(value) * u64::from(numerator) / u64::from(denominator);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}
