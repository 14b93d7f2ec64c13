//! Batch scheduler: one pipeline per input file across a fixed worker pool.
//!
//! ## Scheduling
//!
//! Every job is known before any worker starts. A dedicated rayon
//! [`ThreadPool`](rayon::ThreadPool) with exactly `workers` threads drains
//! them; each job is delivered to exactly one worker. At most `workers`
//! rasters are in memory at once, so the worker count is also the memory knob.
//!
//! [`process_batch`] returns only after every job has finished. Outputs that
//! will ever exist are on disk by then.
//!
//! ## Failure isolation
//!
//! A failing file is reported (as a [`ProcessEvent::Failed`] and in the
//! returned [`BatchReport`]) and never stops the other jobs. Only problems with
//! the batch itself, creating the output directory or the pool, are errors of
//! this function.
//!
//! Events arrive in completion order. The report is in input order.

use crate::imaging::{ImageBackend, RustBackend};
use crate::naming::batch_output_path;
use crate::process::{
    ImageReport, ProcessError, ProcessEvent, ProcessingOptions, emit, process_image_with_backend,
};
use rayon::prelude::*;
use serde::Serialize;
use serde::ser::SerializeStruct;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// What happened to one input file.
#[derive(Debug)]
pub struct JobOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: Result<ImageReport, ProcessError>,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl Serialize for JobOutcome {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("JobOutcome", 4)?;
        state.serialize_field("input", &self.input)?;
        state.serialize_field("output", &self.output)?;
        match &self.result {
            Ok(report) => {
                state.serialize_field("status", "converted")?;
                state.serialize_field("report", report)?;
            }
            Err(e) => {
                state.serialize_field("status", "failed")?;
                state.serialize_field("error", &e.to_string())?;
            }
        }
        state.end()
    }
}

/// Per-file outcomes of a batch, in input order.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} converted, {} failed ({} total)",
            self.succeeded(),
            self.failed(),
            self.total()
        )
    }
}

/// Process every input into `output_dir` with the production backend.
pub fn process_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    options: &ProcessingOptions,
    workers: usize,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, BatchError> {
    let backend = RustBackend::new();
    process_batch_with_backend(&backend, inputs, output_dir, options, workers, events)
}

/// Process every input using a specific backend (allows testing with mock).
///
/// `workers == 0` is treated as 1.
pub fn process_batch_with_backend(
    backend: &impl ImageBackend,
    inputs: &[PathBuf],
    output_dir: &Path,
    options: &ProcessingOptions,
    workers: usize,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, BatchError> {
    std::fs::create_dir_all(output_dir)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("imgtool-worker-{i}"))
        .build()?;

    let events = events.as_ref();
    let outcomes = pool.install(|| {
        inputs
            .par_iter()
            .map(|input| run_job(backend, input, output_dir, options, events))
            .collect()
    });

    Ok(BatchReport { outcomes })
}

fn run_job(
    backend: &impl ImageBackend,
    input: &Path,
    output_dir: &Path,
    options: &ProcessingOptions,
    events: Option<&Sender<ProcessEvent>>,
) -> JobOutcome {
    let output = batch_output_path(output_dir, input, options.format);
    emit(
        events,
        ProcessEvent::Started {
            input: input.to_path_buf(),
            output: output.clone(),
        },
    );

    let result = process_image_with_backend(backend, input, &output, options);
    match &result {
        Ok(report) => {
            for warning in &report.warnings {
                emit(
                    events,
                    ProcessEvent::Warning {
                        input: input.to_path_buf(),
                        warning: warning.clone(),
                    },
                );
            }
        }
        Err(e) => emit(
            events,
            ProcessEvent::Failed {
                input: input.to_path_buf(),
                error: e.to_string(),
            },
        ),
    }

    JobOutcome {
        input: input.to_path_buf(),
        output,
        result,
    }
}
