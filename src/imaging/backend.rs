//! Image backend trait and shared error type.
//!
//! The [`ImageBackend`] trait is the file-level seam of the crate: load a
//! raster from a path, save a raster to a path. Everything above it (the
//! single-image pipeline and the batch scheduler) is backend-agnostic.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the pure Rust
//! decoders and encoders of the `image` crate. Tests use the recording `MockBackend`.

use super::codec::CodecError;
use super::params::EncodeParams;
use super::raster::Raster;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// File-level image operations.
///
/// `Sync` so one backend can be shared by every worker in a batch.
pub trait ImageBackend: Sync {
    /// Read and decode the image at `path`.
    fn load(&self, path: &Path) -> Result<Raster, BackendError>;

    /// Encode `raster` and write it to `path`. On error, `path` is left as it was.
    fn save(&self, raster: &Raster, path: &Path, params: &EncodeParams)
    -> Result<(), BackendError>;
}
