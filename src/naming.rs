//! Output file naming.
//!
//! Outputs keep the input's stem and take the canonical extension of the
//! target format:
//! - `photos/cat.jpeg` → `out/cat.png` (batch)
//! - `photos/cat.jpeg` → `photos/cat.png` (single, no explicit output)
//! - `archive.tar.png` → `archive.tar.webp` (only the last extension is replaced)
//!
//! Two inputs with the same stem map to the same output in a flat batch
//! directory. Each write is an atomic rename, so the survivor is one complete
//! file from whichever job finished last.

use crate::imaging::OutputFormat;
use std::path::{Path, PathBuf};

/// `stem.ext` for `input` under `format`. Falls back to `output` for inputs
/// with no file name.
pub fn output_file_name(input: &Path, format: OutputFormat) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    format!("{stem}.{}", format.extension())
}

/// Output path inside a batch output directory.
pub fn batch_output_path(output_dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    output_dir.join(output_file_name(input, format))
}

/// Output path next to the input, used when single mode has no explicit output.
pub fn sibling_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    input.with_file_name(output_file_name(input, format))
}
