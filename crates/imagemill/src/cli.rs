//! Argument surface and run flow for the imagemill binary.

use clap::{Args, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use imagemill_core::batch::discovery;
use imagemill_core::transform::{DEFAULT_BLUR_SIGMA, DEFAULT_RESIZE};
use imagemill_core::{BatchPlan, BatchReport, BatchRunner, Config, OutputFormat, Transform};

/// How many error lines the summary shows before collapsing the rest
/// into an overflow count. The report itself keeps the full list.
const MAX_DISPLAY_ERRORS: usize = 5;

/// Arguments for a batch run.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Folder containing input images
    pub input_folder: PathBuf,

    /// Folder to save processed images (created if absent)
    pub output_folder: PathBuf,

    /// Image processing task
    #[arg(long, value_enum)]
    pub task: Task,

    /// Output format (default: jpeg)
    #[arg(long, value_enum)]
    pub format: Option<Format>,

    /// Compression quality 0-100 (default: 85 for JPEG, 80 for WebP)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: Option<u8>,

    /// Resize target width in pixels
    #[arg(long, default_value_t = DEFAULT_RESIZE.0)]
    pub width: u32,

    /// Resize target height in pixels
    #[arg(long, default_value_t = DEFAULT_RESIZE.1)]
    pub height: u32,

    /// Blur strength (gaussian sigma)
    #[arg(long, default_value_t = DEFAULT_BLUR_SIGMA)]
    pub sigma: f32,

    /// Number of parallel workers (0 = one per CPU core)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Print the full report as JSON to stdout instead of a summary
    #[arg(long)]
    pub json: bool,
}

/// Image processing tasks.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Task {
    /// Rotate upright according to the EXIF orientation tag
    Rotate,
    /// Scale to an exact pixel size
    Resize,
    /// Convert to grayscale
    Grayscale,
    /// Apply a gaussian blur
    Blur,
}

impl Task {
    fn to_transform(self, args: &RunArgs) -> Transform {
        match self {
            Task::Rotate => Transform::Rotate,
            Task::Resize => Transform::Resize {
                width: args.width,
                height: args.height,
            },
            Task::Grayscale => Transform::Grayscale,
            Task::Blur => Transform::Blur { sigma: args.sigma },
        }
    }
}

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Format {
    Jpeg,
    Webp,
    Png,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Jpeg => OutputFormat::Jpeg,
            Format::Webp => OutputFormat::WebP,
            Format::Png => OutputFormat::Png,
        }
    }
}

/// Execute a batch run: discover, process with progress, summarize.
pub async fn execute(args: RunArgs, config: &Config) -> anyhow::Result<()> {
    let input_dir = expand(&args.input_folder);
    let output_dir = expand(&args.output_folder);

    let format: OutputFormat = match args.format {
        Some(f) => f.into(),
        None => config.output_format().unwrap_or(OutputFormat::Jpeg),
    };
    let plan = BatchPlan {
        input_dir: input_dir.clone(),
        output_dir,
        transform: args.task.to_transform(&args),
        format,
        quality: args.quality.or(config.output.quality),
    };

    let parallel = args
        .parallel
        .unwrap_or(config.processing.parallel_workers);
    let runner = BatchRunner::new(parallel);

    // Count up front so the progress bar has a length; the runner
    // re-lists the directory itself when it builds jobs.
    let total = discovery::discover(&input_dir)?.len() as u64;
    let progress = create_progress_bar(total);

    let bar = progress.clone();
    let batch = runner.run_with_progress(plan, move |_| bar.inc(1));

    let report = tokio::select! {
        result = batch => {
            progress.finish_and_clear();
            result?
        }
        _ = tokio::signal::ctrl_c() => {
            progress.finish_and_clear();
            eprintln!("\nProcessing interrupted by user");
            std::process::exit(130);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.total == 0 {
        println!("No supported images found in {}", input_dir.display());
    } else {
        for line in summary_lines(&report) {
            eprintln!("{line}");
        }
    }

    Ok(())
}

/// Expand a leading `~` in a user-supplied folder argument.
fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy().into_owned();
    let expanded = shellexpand::tilde(&path_str);
    PathBuf::from(expanded.into_owned())
}

/// Create a progress bar for batch processing.
fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb
}

/// Render the completion summary, capping the error list at
/// [`MAX_DISPLAY_ERRORS`] entries plus an overflow count.
fn summary_lines(report: &BatchReport) -> Vec<String> {
    let mut lines = vec![String::new()];

    if report.failed == 0 {
        lines.push(style("✓ Processing complete!").green().to_string());
    } else {
        lines.push(
            style("✓ Processing complete with some errors")
                .green()
                .to_string(),
        );
    }
    lines.push(style(format!("  • Task: {}", report.task)).green().to_string());
    lines.push(
        style(format!("  • Format: {}", report.format.to_uppercase()))
            .green()
            .to_string(),
    );
    if report.format == "webp" {
        // The webp encoder is lossless; the quality setting is not applied
        lines.push(style("  • Quality: lossless").green().to_string());
    } else if let Some(quality) = report.quality {
        lines.push(style(format!("  • Quality: {quality}%")).green().to_string());
    }

    if report.failed == 0 {
        lines.push(
            style(format!(
                "  • Images processed: {}/{}",
                report.successful, report.total
            ))
            .green()
            .to_string(),
        );
    } else {
        lines.push(
            style(format!(
                "  • Successfully processed: {}/{}",
                report.successful, report.total
            ))
            .green()
            .to_string(),
        );
        lines.push(
            style(format!("✗ Failed to process {} images:", report.failed))
                .red()
                .to_string(),
        );
        for error in report.errors.iter().take(MAX_DISPLAY_ERRORS) {
            lines.push(
                style(format!("  • {}: {}", error.source.display(), error.message))
                    .red()
                    .to_string(),
            );
        }
        if report.errors.len() > MAX_DISPLAY_ERRORS {
            lines.push(
                style(format!(
                    "  ... and {} more errors",
                    report.errors.len() - MAX_DISPLAY_ERRORS
                ))
                .red()
                .to_string(),
            );
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use imagemill_core::types::FailedJob;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        run: RunArgs,
    }

    fn parse(argv: &[&str]) -> Result<TestCli, clap::Error> {
        TestCli::try_parse_from(argv)
    }

    #[test]
    fn test_minimal_invocation() {
        let cli = parse(&["imagemill", "in", "out", "--task", "resize"]).unwrap();
        assert!(matches!(cli.run.task, Task::Resize));
        assert!(cli.run.format.is_none());
        assert!(cli.run.quality.is_none());
        assert_eq!(cli.run.width, 128);
        assert_eq!(cli.run.height, 128);
    }

    #[test]
    fn test_task_is_required() {
        assert!(parse(&["imagemill", "in", "out"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_task_and_format() {
        assert!(parse(&["imagemill", "in", "out", "--task", "sharpen"]).is_err());
        assert!(parse(&["imagemill", "in", "out", "--task", "blur", "--format", "bmp"]).is_err());
    }

    #[test]
    fn test_quality_range() {
        let cli = parse(&[
            "imagemill", "in", "out", "--task", "blur", "--quality", "90",
        ])
        .unwrap();
        assert_eq!(cli.run.quality, Some(90));
        assert!(parse(&[
            "imagemill", "in", "out", "--task", "blur", "--quality", "101",
        ])
        .is_err());
    }

    #[test]
    fn test_resize_args_flow_into_transform() {
        let cli = parse(&[
            "imagemill", "in", "out", "--task", "resize", "--width", "64", "--height", "48",
        ])
        .unwrap();
        match cli.run.task.to_transform(&cli.run) {
            Transform::Resize { width, height } => {
                assert_eq!((width, height), (64, 48));
            }
            other => panic!("Expected resize, got {other:?}"),
        }
    }

    #[test]
    fn test_format_maps_to_core() {
        assert_eq!(OutputFormat::from(Format::Jpeg), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from(Format::Webp), OutputFormat::WebP);
        assert_eq!(OutputFormat::from(Format::Png), OutputFormat::Png);
    }

    fn report_with_failures(failed: usize) -> BatchReport {
        let mut report = BatchReport::new("resize", OutputFormat::Jpeg, Some(85), failed + 1);
        report.successful = 1;
        report.failed = failed;
        for i in 0..failed {
            report.errors.push(FailedJob {
                source: PathBuf::from(format!("bad{i}.jpg")),
                message: "decode failed".to_string(),
            });
        }
        report
    }

    #[test]
    fn test_summary_clean_run() {
        let report = BatchReport::new("resize", OutputFormat::Jpeg, Some(85), 3);
        let lines = summary_lines(&report);
        let text = lines.join("\n");
        assert!(text.contains("Processing complete!"));
        assert!(text.contains("Task: resize"));
        assert!(text.contains("Format: JPEG"));
        assert!(text.contains("Quality: 85%"));
        assert!(!text.contains("Failed"));
    }

    #[test]
    fn test_summary_webp_reports_lossless() {
        let report = BatchReport::new("grayscale", OutputFormat::WebP, Some(80), 3);
        let text = summary_lines(&report).join("\n");
        assert!(text.contains("Format: WEBP"));
        assert!(text.contains("Quality: lossless"));
        assert!(!text.contains("80%"));
    }

    #[test]
    fn test_summary_caps_error_list_at_five() {
        let lines = summary_lines(&report_with_failures(8));
        let text = lines.join("\n");
        assert!(text.contains("Failed to process 8 images"));
        assert!(text.contains("bad0.jpg"));
        assert!(text.contains("bad4.jpg"));
        assert!(!text.contains("bad5.jpg"));
        assert!(text.contains("... and 3 more errors"));
    }

    #[test]
    fn test_summary_no_overflow_line_at_exactly_five() {
        let text = summary_lines(&report_with_failures(5)).join("\n");
        assert!(text.contains("bad4.jpg"));
        assert!(!text.contains("more errors"));
    }

    #[test]
    fn test_expand_tilde() {
        let plain = expand(Path::new("photos/in"));
        assert_eq!(plain, PathBuf::from("photos/in"));
    }
}
