//! # imgtool
//!
//! Converts, resizes and watermarks raster images, one at a time or a whole
//! directory across a fixed pool of workers.
//!
//! # Architecture: Pipeline + Scheduler
//!
//! Every file goes through the same four steps, each returning a new owned
//! [`imaging::Raster`]:
//!
//! ```text
//! decode  →  resize (optional)  →  watermark (optional)  →  encode
//! ```
//!
//! The [`batch`] scheduler fans a list of files out to `workers` threads and
//! fans the results back in as an ordered [`batch::BatchReport`]. A file that
//! fails is reported and skipped. It never stops the batch.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pure-Rust image operations: codec, resize math, resize, watermark, backend trait |
//! | [`process`] | Single-image pipeline, options, progress events |
//! | [`batch`] | Worker pool, per-file outcomes, batch report |
//! | [`scan`] | Directory discovery of supported image files |
//! | [`naming`] | Output file names: input stem + canonical extension |
//! | [`config`] | `imgtool.toml` loading, merging onto stock defaults, validation |
//! | [`output`] | CLI output formatting for events and summaries |
//!
//! # Design Decisions
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling and encoding all use the `image` crate. There are no
//! system libraries to install; the binary is self-contained.
//!
//! ## Warnings Are Values
//!
//! A resize spec that cannot be applied is a
//! [`imaging::ResizeSpecWarning`], carried in the result next to the converted
//! image. Nothing is logged from inside the library. Callers decide how to
//! show warnings, see [`process::ProcessEvent`].
//!
//! ## Atomic Outputs
//!
//! Images are encoded in memory and written through a temp file that is
//! renamed into place. A failed file leaves nothing behind, and a reader never
//! sees half an image.
//!
//! ## Bounded Memory
//!
//! The worker count is the only concurrency knob. With `n` workers, at most
//! `n` decoded images are held at once.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
