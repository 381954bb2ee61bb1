//! Imagemill Core - embeddable batch image processing library.
//!
//! Imagemill applies one of a small set of transforms (EXIF-aware
//! rotate, resize, grayscale, blur) to every supported image in a
//! directory, fanning the work out across a bounded worker pool and
//! collecting per-file outcomes into an aggregate report. One file's
//! failure never blocks or corrupts the others.
//!
//! # Architecture
//!
//! ```text
//! Discover -> Build jobs -> Bounded worker pool -> Outcomes -> BatchReport
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use imagemill_core::{BatchPlan, BatchRunner, OutputFormat, Transform};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), imagemill_core::BatchError> {
//!     let runner = BatchRunner::new(0); // one worker per core
//!     let report = runner
//!         .run(BatchPlan {
//!             input_dir: "./photos".into(),
//!             output_dir: "./out".into(),
//!             transform: Transform::Grayscale,
//!             format: OutputFormat::Jpeg,
//!             quality: None,
//!         })
//!         .await?;
//!     println!("{}/{} processed", report.successful, report.total);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod batch;
pub mod config;
pub mod error;
pub mod format;
pub mod orientation;
pub mod transform;
pub mod types;

// Re-exports for convenient access
pub use batch::{BatchPlan, BatchRunner};
pub use config::Config;
pub use error::{BatchError, ConfigError, ImagemillError, Result, TaskError, TaskResult};
pub use format::OutputFormat;
pub use transform::Transform;
pub use types::{BatchReport, FailedJob, Job, Outcome};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
