//! Image processing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory`, format sniffed from content |
//! | **Resize** | `image::imageops::resize` with `CatmullRom` |
//! | **Watermark** | integer alpha blend, bottom-right, 10 px inset |
//! | **Encode** | PNG, JPEG, GIF, WebP encoders from `image` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for resize dimension math (unit testable)
//! - **Parameters**: Quality, opacity and output format types
//! - **Raster / Codec**: in-memory pixels and byte-level decode/encode
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: resize and watermark transforms over rasters

pub mod backend;
mod calculations;
pub mod codec;
pub mod operations;
mod params;
mod raster;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{MAX_TARGET_BYTES, ResizeSpec, ResizeSpecWarning, target_dimensions};
pub use codec::{CodecError, decode, encode, supported_input_extensions};
pub use operations::{
    ResizeOutcome, WatermarkError, apply_watermark, load_watermark, resize,
};
pub use params::{EncodeParams, Opacity, OutputFormat, Quality};
pub use raster::Raster;
pub use rust_backend::RustBackend;
