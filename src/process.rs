//! Single-image pipeline.
//!
//! Each file goes through the same strictly ordered steps:
//!
//! ```text
//! load + decode  →  resize (optional)  →  watermark (optional)  →  encode + write
//! ```
//!
//! Decode, watermark and encode failures abort the file. A malformed or
//! degenerate resize spec does not: it is recorded as a warning in the
//! [`ImageReport`] and the unresized raster carries on to the next step.
//!
//! Output is written by the backend, which encodes in memory and renames a
//! finished temp file into place, so an aborted pipeline leaves no partial
//! output behind.
//!
//! [`ProcessEvent`] is the line-oriented progress vocabulary shared by the
//! batch scheduler and the CLI. The library never prints; it sends events and
//! the binary decides how to render them (see [`output`](crate::output)).

use crate::imaging::{
    BackendError, EncodeParams, ImageBackend, Opacity, OutputFormat, Quality, ResizeSpecWarning,
    RustBackend, WatermarkError, apply_watermark, load_watermark, resize,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Decode error in {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error(transparent)]
    WatermarkLoad(#[from] WatermarkError),
    #[error("Encode error for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// What to produce for each input file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingOptions {
    pub format: OutputFormat,
    /// Only affects lossy formats (JPEG, WebP).
    pub quality: Quality,
    /// `"WxH"` or `"P%"`. `None` means no resize.
    pub resize: Option<String>,
    /// `None` means no watermark.
    pub watermark: Option<PathBuf>,
    pub watermark_opacity: Opacity,
    /// Encode WebP without the quality-driven quantization pass.
    pub webp_lossless: bool,
}

impl ProcessingOptions {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            quality: Quality::default(),
            resize: None,
            watermark: None,
            watermark_opacity: Opacity::default(),
            webp_lossless: false,
        }
    }

    /// Build options from raw values, treating empty strings as "not set".
    pub fn from_parts(
        format: OutputFormat,
        quality: u32,
        resize: Option<&str>,
        watermark: Option<&Path>,
        watermark_opacity: u32,
        webp_lossless: bool,
    ) -> Self {
        Self {
            format,
            quality: Quality::new(quality),
            resize: resize
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            watermark: watermark
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf),
            watermark_opacity: Opacity::new(watermark_opacity),
            webp_lossless,
        }
    }

    pub fn encode_params(&self) -> EncodeParams {
        EncodeParams {
            webp_lossless: self.webp_lossless,
            ..EncodeParams::new(self.format, self.quality)
        }
    }
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self::new(OutputFormat::Png)
    }
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageReport {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "serialize_warnings")]
    pub warnings: Vec<ResizeSpecWarning>,
}

fn serialize_warnings<S: serde::Serializer>(
    warnings: &[ResizeSpecWarning],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(warnings.iter().map(ToString::to_string))
}

/// Progress notifications, one per line of human-readable output.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Started {
        input: PathBuf,
        output: PathBuf,
    },
    Warning {
        input: PathBuf,
        warning: ResizeSpecWarning,
    },
    Failed {
        input: PathBuf,
        error: String,
    },
}

/// Send an event if anyone is listening. A dropped receiver is not an error.
pub(crate) fn emit(events: Option<&Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}

/// Run the pipeline for one file with the production backend.
pub fn process_image(
    input: &Path,
    output: &Path,
    options: &ProcessingOptions,
) -> Result<ImageReport, ProcessError> {
    let backend = RustBackend::new();
    process_image_with_backend(&backend, input, output, options)
}

/// Run the pipeline for one file using a specific backend (allows testing with mock).
pub fn process_image_with_backend(
    backend: &impl ImageBackend,
    input: &Path,
    output: &Path,
    options: &ProcessingOptions,
) -> Result<ImageReport, ProcessError> {
    let mut raster = backend
        .load(input)
        .map_err(|source| ProcessError::Decode {
            path: input.to_path_buf(),
            source,
        })?;

    let mut warnings = Vec::new();
    if let Some(spec) = &options.resize {
        let outcome = resize(raster, spec);
        if let Some(warning) = outcome.warning() {
            warnings.push(warning.clone());
        }
        raster = outcome.into_raster();
    }

    if let Some(path) = &options.watermark {
        let mark = load_watermark(backend, path)?;
        raster = apply_watermark(&raster, &mark, options.watermark_opacity);
    }

    backend
        .save(&raster, output, &options.encode_params())
        .map_err(|source| ProcessError::Encode {
            path: output.to_path_buf(),
            source,
        })?;

    Ok(ImageReport {
        output: output.to_path_buf(),
        width: raster.width(),
        height: raster.height(),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Raster;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::write_png;
    use std::fs;
    use tempfile::TempDir;

    fn solid(width: u32, height: u32) -> Raster {
        Raster::filled(width, height, [40, 80, 120, 255]).unwrap()
    }

    // =========================================================================
    // ProcessingOptions
    // =========================================================================

    #[test]
    fn options_defaults() {
        let options = ProcessingOptions::default();
        assert_eq!(options.format, OutputFormat::Png);
        assert_eq!(options.quality.value(), 80);
        assert_eq!(options.watermark_opacity.value(), 100);
        assert!(options.resize.is_none());
        assert!(options.watermark.is_none());
        assert!(!options.webp_lossless);
    }

    #[test]
    fn options_from_parts_treats_empty_as_unset_and_clamps() {
        let options = ProcessingOptions::from_parts(
            OutputFormat::Jpeg,
            0,
            Some("  "),
            Some(Path::new("")),
            250,
            false,
        );
        assert_eq!(options.quality.value(), 1);
        assert_eq!(options.watermark_opacity.value(), 100);
        assert!(options.resize.is_none());
        assert!(options.watermark.is_none());
    }

    #[test]
    fn options_encode_params_carry_lossless_flag() {
        let options = ProcessingOptions {
            webp_lossless: true,
            ..ProcessingOptions::new(OutputFormat::WebP)
        };
        let params = options.encode_params();
        assert_eq!(params.format, OutputFormat::WebP);
        assert!(params.webp_lossless);
    }

    // =========================================================================
    // Pipeline with mock backend
    // =========================================================================

    #[test]
    fn plain_conversion_loads_then_saves() {
        let backend = MockBackend::new().with_image("/in/a.jpg", solid(64, 32));
        let options = ProcessingOptions {
            quality: Quality::new(70),
            ..ProcessingOptions::new(OutputFormat::WebP)
        };

        let report = process_image_with_backend(
            &backend,
            Path::new("/in/a.jpg"),
            Path::new("/out/a.webp"),
            &options,
        )
        .unwrap();

        assert_eq!(report.output, PathBuf::from("/out/a.webp"));
        assert_eq!((report.width, report.height), (64, 32));
        assert!(report.warnings.is_empty());
        assert_eq!(
            backend.get_operations(),
            vec![
                RecordedOp::Load("/in/a.jpg".to_string()),
                RecordedOp::Save {
                    output: "/out/a.webp".to_string(),
                    width: 64,
                    height: 32,
                    format: OutputFormat::WebP,
                    quality: 70,
                },
            ]
        );
    }

    #[test]
    fn resize_changes_saved_dimensions() {
        let backend = MockBackend::new().with_image("/in/a.png", solid(200, 200));
        let options = ProcessingOptions {
            resize: Some("100x100".to_string()),
            ..ProcessingOptions::default()
        };

        let report = process_image_with_backend(
            &backend,
            Path::new("/in/a.png"),
            Path::new("/out/a.png"),
            &options,
        )
        .unwrap();

        assert_eq!((report.width, report.height), (100, 100));
        assert!(matches!(
            backend.get_operations().last(),
            Some(RecordedOp::Save {
                width: 100,
                height: 100,
                ..
            })
        ));
    }

    #[test]
    fn malformed_resize_is_a_warning_not_a_failure() {
        let backend = MockBackend::new().with_image("/in/a.png", solid(120, 80));
        let options = ProcessingOptions {
            resize: Some("garbage".to_string()),
            ..ProcessingOptions::default()
        };

        let report = process_image_with_backend(
            &backend,
            Path::new("/in/a.png"),
            Path::new("/out/a.png"),
            &options,
        )
        .unwrap();

        assert_eq!((report.width, report.height), (120, 80));
        assert_eq!(
            report.warnings,
            vec![ResizeSpecWarning::Malformed("garbage".to_string())]
        );
        assert_eq!(backend.saved_outputs(), vec!["/out/a.png".to_string()]);
    }

    #[test]
    fn watermark_is_loaded_after_input() {
        let backend = MockBackend::new()
            .with_image("/in/a.png", solid(300, 300))
            .with_image("/marks/logo.png", solid(50, 50));
        let options = ProcessingOptions {
            watermark: Some(PathBuf::from("/marks/logo.png")),
            ..ProcessingOptions::default()
        };

        process_image_with_backend(
            &backend,
            Path::new("/in/a.png"),
            Path::new("/out/a.png"),
            &options,
        )
        .unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops[0], RecordedOp::Load("/in/a.png".to_string()));
        assert_eq!(ops[1], RecordedOp::Load("/marks/logo.png".to_string()));
        assert!(matches!(ops[2], RecordedOp::Save { width: 300, height: 300, .. }));
    }

    #[test]
    fn missing_input_is_decode_error_and_nothing_is_saved() {
        let backend = MockBackend::new();
        let result = process_image_with_backend(
            &backend,
            Path::new("/in/missing.png"),
            Path::new("/out/missing.png"),
            &ProcessingOptions::default(),
        );

        assert!(matches!(result, Err(ProcessError::Decode { .. })));
        assert!(backend.saved_outputs().is_empty());
    }

    #[test]
    fn missing_watermark_aborts_before_save() {
        let backend = MockBackend::new().with_image("/in/a.png", solid(100, 100));
        let options = ProcessingOptions {
            watermark: Some(PathBuf::from("/marks/nope.png")),
            ..ProcessingOptions::default()
        };

        let result = process_image_with_backend(
            &backend,
            Path::new("/in/a.png"),
            Path::new("/out/a.png"),
            &options,
        );

        let err = result.unwrap_err();
        assert!(matches!(err, ProcessError::WatermarkLoad(_)));
        assert!(err.to_string().contains("/marks/nope.png"));
        assert!(backend.saved_outputs().is_empty());
    }

    #[test]
    fn save_failure_is_encode_error() {
        let backend = MockBackend::new()
            .with_image("/in/a.png", solid(10, 10))
            .failing_save("/out/a.png");

        let result = process_image_with_backend(
            &backend,
            Path::new("/in/a.png"),
            Path::new("/out/a.png"),
            &ProcessingOptions::default(),
        );

        assert!(matches!(result, Err(ProcessError::Encode { .. })));
    }

    #[test]
    fn report_serializes_warnings_as_messages() {
        let report = ImageReport {
            output: PathBuf::from("/out/a.png"),
            width: 10,
            height: 10,
            warnings: vec![ResizeSpecWarning::Malformed("huge".to_string())],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["warnings"][0], "Invalid resize format: huge");

        let clean = ImageReport {
            warnings: vec![],
            ..report
        };
        let json = serde_json::to_value(&clean).unwrap();
        assert!(json.get("warnings").is_none());
    }

    #[test]
    fn emit_without_listener_is_noop() {
        emit(
            None,
            ProcessEvent::Failed {
                input: PathBuf::from("a.png"),
                error: "boom".to_string(),
            },
        );
    }

    // =========================================================================
    // Pipeline with the real backend
    // =========================================================================

    #[test]
    fn real_png_to_jpeg_conversion() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("photo.png");
        let output = tmp.path().join("photo.jpg");
        write_png(&input, 48, 36);

        let report = process_image(
            &input,
            &output,
            &ProcessingOptions::new(OutputFormat::Jpeg),
        )
        .unwrap();

        assert_eq!((report.width, report.height), (48, 36));
        let bytes = fs::read(&output).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn real_corrupt_input_leaves_no_output() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("broken.png");
        let output = tmp.path().join("broken.webp");
        fs::write(&input, b"garbage bytes").unwrap();

        let result = process_image(&input, &output, &ProcessingOptions::new(OutputFormat::WebP));

        assert!(matches!(result, Err(ProcessError::Decode { .. })));
        assert!(!output.exists());
    }
}
