//! Core data types: jobs, outcomes, and the batch report.

use serde::Serialize;
use std::path::PathBuf;

use crate::error::TaskError;
use crate::format::OutputFormat;
use crate::transform::Transform;

/// One unit of work: a source file bound to a destination path and a
/// transform configuration.
///
/// Built once per discovered input file and moved into the worker that
/// executes it; never shared or mutated after construction.
#[derive(Debug, Clone)]
pub struct Job {
    /// Input image path
    pub source: PathBuf,
    /// Output image path (`<output_dir>/<stem>.<format_extension>`)
    pub destination: PathBuf,
    /// Operation to apply
    pub transform: Transform,
    /// Output encoding format
    pub format: OutputFormat,
    /// Requested quality 0-100; `None` uses the per-format default
    pub quality: Option<u8>,
}

/// The resolved result of a job. Produced exactly once per job.
#[derive(Debug)]
pub enum Outcome {
    Success {
        source: PathBuf,
    },
    Failure {
        source: PathBuf,
        error: TaskError,
    },
}

impl Outcome {
    /// The source path this outcome belongs to.
    pub fn source(&self) -> &PathBuf {
        match self {
            Outcome::Success { source } | Outcome::Failure { source, .. } => source,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// One failed job as recorded in the report.
#[derive(Debug, Clone, Serialize)]
pub struct FailedJob {
    pub source: PathBuf,
    pub message: String,
}

/// Aggregate counts and error list for a full batch run.
///
/// Invariant once finalized: `successful + failed == total`, where
/// `total` is the number of discovered eligible files. The error list
/// is complete; any truncation is left to presentation.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Task name (e.g. "resize")
    pub task: String,
    /// Output format name (e.g. "jpeg")
    pub format: String,
    /// Effective quality, if the format uses one
    pub quality: Option<u8>,
    /// Number of eligible files discovered
    pub total: usize,
    /// Jobs that completed successfully
    pub successful: usize,
    /// Jobs that failed
    pub failed: usize,
    /// One entry per failed job, in recording order
    pub errors: Vec<FailedJob>,
}

impl BatchReport {
    /// Create an empty report for `total` discovered files.
    pub fn new(task: &str, format: OutputFormat, quality: Option<u8>, total: usize) -> Self {
        Self {
            task: task.to_string(),
            format: format.to_string(),
            quality,
            total,
            successful: 0,
            failed: 0,
            errors: Vec::new(),
        }
    }

    /// Record a single resolved outcome.
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Success { .. } => self.successful += 1,
            Outcome::Failure { source, error } => {
                self.failed += 1;
                self.errors.push(FailedJob {
                    source: source.clone(),
                    message: error.to_string(),
                });
            }
        }
    }

    /// Whether every discovered file has a recorded outcome.
    pub fn is_complete(&self) -> bool {
        self.successful + self.failed == self.total
    }
}
