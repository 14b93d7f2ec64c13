//! Pure Rust image backend. Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP) | [`codec::decode`](super::codec::decode) over `image` decoders |
//! | Encode | [`codec::encode`](super::codec::encode) over `image` encoders |
//! | Write | encode to memory, write a hidden `.partial` sibling, rename into place |
//!
//! Encoding fully in memory before touching the filesystem means a failed
//! encode never creates the destination, and the rename means a reader never
//! sees a half-written file.

use super::backend::{BackendError, ImageBackend};
use super::codec;
use super::params::EncodeParams;
use super::raster::Raster;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static PARTIAL_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn load(&self, path: &Path) -> Result<Raster, BackendError> {
        let bytes = fs::read(path)?;
        Ok(codec::decode(&bytes)?)
    }

    fn save(
        &self,
        raster: &Raster,
        path: &Path,
        params: &EncodeParams,
    ) -> Result<(), BackendError> {
        let bytes = codec::encode(raster, params)?;
        write_atomically(path, &bytes)?;
        Ok(())
    }
}

/// Write `bytes` to a sibling temp file, then rename it over `path`.
/// The temp file is removed if either step fails.
fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let partial = partial_path(path);
    let result = fs::write(&partial, bytes).and_then(|()| fs::rename(&partial, path));
    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

/// `dir/.name.<pid>-<n>.partial`, unique per process and per call so
/// concurrent workers writing the same target never share a temp file.
fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let n = PARTIAL_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}-{n}.partial", std::process::id()))
}
