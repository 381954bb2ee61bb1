//! The batch coordinator: job construction, bounded dispatch, and
//! result aggregation.
//!
//! One tokio task per job, each running its codec work in
//! `spawn_blocking`, with concurrency bounded by a semaphore. The
//! coordinator is the single owner of the `BatchReport`; workers hand
//! outcomes back through their join handles, so no shared mutable
//! state crosses the worker boundary.

pub mod discovery;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::error::{BatchError, TaskError, TaskResult};
use crate::format::OutputFormat;
use crate::transform::{self, Transform};
use crate::types::{BatchReport, Job, Outcome};

/// Everything needed to run one batch.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub transform: Transform,
    pub format: OutputFormat,
    pub quality: Option<u8>,
}

/// Executes batch plans over a bounded worker pool.
pub struct BatchRunner {
    parallel: usize,
}

impl BatchRunner {
    /// Create a runner with the given worker count; 0 means one worker
    /// per available CPU core.
    pub fn new(parallel: usize) -> Self {
        let parallel = if parallel == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            parallel
        };
        Self { parallel }
    }

    /// Effective worker pool size.
    pub fn parallel(&self) -> usize {
        self.parallel
    }

    /// Run a batch to completion and return the final report.
    ///
    /// Fails only for coordinator-level conditions (input directory
    /// unreadable, output directory uncreatable); per-file failures are
    /// recorded in the report and never abort the batch.
    pub async fn run(&self, plan: BatchPlan) -> Result<BatchReport, BatchError> {
        self.run_with_progress(plan, |_| {}).await
    }

    /// Like [`run`](Self::run), invoking `on_outcome` as each job
    /// resolves so callers can drive progress display.
    pub async fn run_with_progress<F>(
        &self,
        plan: BatchPlan,
        on_outcome: F,
    ) -> Result<BatchReport, BatchError>
    where
        F: Fn(&Outcome) + Send + Sync + 'static,
    {
        // Idempotent precondition, not part of the concurrency core
        std::fs::create_dir_all(&plan.output_dir).map_err(|e| BatchError::OutputDirCreate {
            path: plan.output_dir.clone(),
            message: e.to_string(),
        })?;

        let files = discovery::discover(&plan.input_dir)?;
        let quality = plan.format.effective_quality(plan.quality);
        let mut report =
            BatchReport::new(plan.transform.name(), plan.format, quality, files.len());

        if files.is_empty() {
            tracing::info!("No supported images found in {:?}", plan.input_dir);
            return Ok(report);
        }
        tracing::info!(
            "Processing {} image(s) with {} worker(s)",
            files.len(),
            self.parallel
        );

        let (jobs, collisions) = build_jobs(&plan, quality, files);
        let on_outcome = Arc::new(on_outcome);

        for outcome in collisions {
            on_outcome(&outcome);
            report.record(&outcome);
        }

        let handles = self.dispatch(jobs, on_outcome.clone()).await;
        for (source, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    // The worker task itself died; contain it to this job
                    let outcome = Outcome::Failure {
                        source,
                        error: TaskError::Panicked {
                            message: e.to_string(),
                        },
                    };
                    on_outcome(&outcome);
                    outcome
                }
            };
            report.record(&outcome);
        }

        debug_assert!(report.is_complete());
        Ok(report)
    }

    /// Spawn one worker task per job, bounded by a semaphore.
    async fn dispatch<F>(
        &self,
        jobs: Vec<Job>,
        on_outcome: Arc<F>,
    ) -> Vec<(PathBuf, JoinHandle<Outcome>)>
    where
        F: Fn(&Outcome) + Send + Sync + 'static,
    {
        self.dispatch_with(jobs, on_outcome, transform::apply).await
    }

    /// Dispatch with an explicit worker function. The semaphore bound
    /// holds for any worker; taking it as a parameter lets the pool
    /// tests measure in-flight concurrency directly.
    async fn dispatch_with<F, W>(
        &self,
        jobs: Vec<Job>,
        on_outcome: Arc<F>,
        worker: W,
    ) -> Vec<(PathBuf, JoinHandle<Outcome>)>
    where
        F: Fn(&Outcome) + Send + Sync + 'static,
        W: Fn(&Job) -> TaskResult<()> + Send + Sync + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.parallel));
        let worker = Arc::new(worker);
        let mut handles = Vec::with_capacity(jobs.len());

        for job in jobs {
            // The semaphore is never closed while jobs remain, so this
            // only fails if the runtime is tearing down
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    let source = job.source.clone();
                    let on_outcome = on_outcome.clone();
                    let handle = tokio::spawn(async move {
                        let outcome = Outcome::Failure {
                            source,
                            error: TaskError::Panicked {
                                message: format!("worker pool closed: {e}"),
                            },
                        };
                        on_outcome(&outcome);
                        outcome
                    });
                    handles.push((job.source, handle));
                    continue;
                }
            };

            let source = job.source.clone();
            let on_outcome = on_outcome.clone();
            let worker = worker.clone();
            let handle = tokio::spawn(async move {
                let worker_source = job.source.clone();
                let result = tokio::task::spawn_blocking(move || worker(&job)).await;
                let outcome = match result {
                    Ok(Ok(())) => Outcome::Success {
                        source: worker_source,
                    },
                    Ok(Err(error)) => {
                        tracing::error!("Failed: {:?} - {}", worker_source, error);
                        Outcome::Failure {
                            source: worker_source,
                            error,
                        }
                    }
                    Err(e) => Outcome::Failure {
                        source: worker_source,
                        error: TaskError::Panicked {
                            message: e.to_string(),
                        },
                    },
                };
                drop(permit);
                on_outcome(&outcome);
                outcome
            });
            handles.push((source, handle));
        }

        handles
    }
}

/// Build one job per discovered file.
///
/// Destination is `<output_dir>/<stem>.<format_extension>`; that naming
/// is only injective when stems are unique, so files whose destination
/// is already claimed become collision failures instead of jobs.
fn build_jobs(
    plan: &BatchPlan,
    quality: Option<u8>,
    files: Vec<PathBuf>,
) -> (Vec<Job>, Vec<Outcome>) {
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    let mut jobs = Vec::with_capacity(files.len());
    let mut collisions = Vec::new();

    for source in files {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.to_string_lossy().into_owned());
        let destination = plan
            .output_dir
            .join(format!("{stem}.{}", plan.format.extension()));

        if let Some(first) = claimed.get(&destination) {
            collisions.push(Outcome::Failure {
                error: TaskError::DestinationCollision {
                    destination,
                    other_source: first.clone(),
                },
                source,
            });
            continue;
        }

        claimed.insert(destination.clone(), source.clone());
        jobs.push(Job {
            source,
            destination,
            transform: plan.transform,
            format: plan.format,
            quality,
        });
    }

    (jobs, collisions)
}
