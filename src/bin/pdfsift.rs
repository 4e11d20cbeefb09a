//! CLI binary for pdfsift.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `CleanConfig` / `VideoConfig` and prints batch results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdfsift::{
    clean_directory, convert_videos, BatchProgressCallback, BatchReport, CleanConfig,
    FileOutcome, PageSize, ProgressCallback, VideoConfig,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Live progress bar with one log line per finished file.
struct CliProgressCallback {
    bar: ProgressBar,
    /// "PDFs" or "videos", for the counter.
    unit: &'static str,
}

impl CliProgressCallback {
    fn new(unit: &'static str) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar, unit })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        let style = ProgressStyle::with_template(&format!(
            "{{spinner:.cyan}} {{prefix:.bold}}  [{{bar:42.green/238}}] {{pos:>3}}/{{len}} {}  \
             ⏱ {{elapsed_precise}}  {{msg}}",
            self.unit
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_files as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Processing");
        self.bar.reset_eta();
    }

    fn on_file_start(&self, _index: usize, _total: usize, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_message(name);
    }

    fn on_file_complete(&self, index: usize, total: usize, path: &Path, outcome: &FileOutcome) {
        let line = match outcome {
            FileOutcome::Cleaned(s) => format!(
                "{} {:>3}/{:<3} {}  {}",
                green("✓"),
                index,
                total,
                path.display(),
                dim(&format!(
                    "{} → {} pages, removed {:?}",
                    s.pages_in,
                    s.pages_out(),
                    s.deleted_pages
                )),
            ),
            FileOutcome::Converted(s) => format!(
                "{} {:>3}/{:<3} {}  {}",
                green("✓"),
                index,
                total,
                path.display(),
                dim(&format!("{} frames → {}", s.frames, s.output.display())),
            ),
            FileOutcome::Skipped { reason } => format!(
                "{} {:>3}/{:<3} {}  {}",
                yellow("–"),
                index,
                total,
                path.display(),
                dim(&truncate(reason)),
            ),
            FileOutcome::Failed { error } => format!(
                "{} {:>3}/{:<3} {}  {}",
                red("✗"),
                index,
                total,
                path.display(),
                red(&truncate(error)),
            ),
        };
        self.bar.println(line);
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _report: &BatchReport) {
        self.bar.finish_and_clear();
    }
}

/// Keep one-line log output tidy.
fn truncate(msg: &str) -> String {
    if msg.chars().count() > 80 {
        let head: String = msg.chars().take(79).collect();
        format!("{head}\u{2026}")
    } else {
        msg.to_string()
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Remove near-duplicate pages from every PDF under lectures/
  pdfsift clean lectures/

  # Only drop pages that are almost identical
  pdfsift clean --threshold 97 lectures/

  # See what would be removed without writing anything
  pdfsift clean --dry-run --json lectures/ > report.json

  # One screenshot every 5 seconds from every .mp4 under recordings/
  pdfsift video --seconds 5 recordings/

  # A4 pages instead of US Letter
  pdfsift video --page-size a4 recordings/

OUTPUTS:
  clean   <dir>/<stem>_cleaned.pdf next to each <stem>.pdf
  video   <dir>/<stem>.pdf next to each <stem>.mp4

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH      Directory containing libpdfium (default: system library)
  RUST_LOG             Override the log filter (e.g. pdfsift=debug)
"#;

/// Remove near-duplicate PDF pages and turn lecture videos into PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "pdfsift",
    version,
    about = "Remove near-duplicate pages from PDFs and turn videos into screenshot PDFs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Print the batch report as JSON on stdout.
    #[arg(long, global = true, env = "PDFSIFT_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "PDFSIFT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDFSIFT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDFSIFT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write <stem>_cleaned.pdf without near-duplicate pages for every PDF.
    Clean(CleanArgs),
    /// Write <stem>.pdf of periodic screenshots for every .mp4.
    Video(VideoArgs),
}

#[derive(Args, Debug)]
struct CleanArgs {
    /// Directory to search recursively.
    root: PathBuf,

    /// Similarity threshold in percent; higher deletes less.
    #[arg(short, long, env = "PDFSIFT_THRESHOLD", default_value_t = 90.0)]
    threshold: f64,

    /// Rendering DPI (72–400).
    #[arg(long, env = "PDFSIFT_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Resize target before hashing, as WIDTHxHEIGHT.
    #[arg(long, env = "PDFSIFT_RESIZE", default_value = "100x100")]
    resize: String,

    /// Hash matrix edge length (8 gives a 64-bit hash).
    #[arg(long, env = "PDFSIFT_HASH_SIZE", default_value_t = 8)]
    hash_size: u32,

    /// Suffix appended to the output file stem.
    #[arg(long, env = "PDFSIFT_SUFFIX", default_value = pdfsift::config::CLEANED_SUFFIX)]
    suffix: String,

    /// Also process PDFs that look like earlier outputs.
    #[arg(long, env = "PDFSIFT_INCLUDE_CLEANED")]
    include_cleaned: bool,

    /// Compute duplicates but write nothing.
    #[arg(long, env = "PDFSIFT_DRY_RUN")]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct VideoArgs {
    /// Directory to search recursively.
    root: PathBuf,

    /// Seconds of video between two screenshots.
    #[arg(short, long, env = "PDFSIFT_SECONDS", default_value_t = 2,
          value_parser = clap::value_parser!(u32).range(1..))]
    seconds: u32,

    /// Page size of the generated PDF.
    #[arg(long, env = "PDFSIFT_PAGE_SIZE", value_enum, default_value = "letter")]
    page_size: PageSizeArg,

    /// JPEG quality for captured frames (1–100).
    #[arg(long, env = "PDFSIFT_QUALITY", default_value_t = 90,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Create scratch frame directories here instead of next to each video.
    #[arg(long, env = "PDFSIFT_TEMP_ROOT")]
    temp_root: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum PageSizeArg {
    Letter,
    A4,
}

impl From<PageSizeArg> for PageSize {
    fn from(v: PageSizeArg) -> Self {
        match v {
            PageSizeArg::Letter => PageSize::Letter,
            PageSizeArg::A4 => PageSize::A4,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let common = &cli.common;

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs would fight with the progress bar for the terminal.
    let show_progress = !common.quiet && !common.no_progress && !common.json;
    let filter = if common.verbose {
        "debug"
    } else if common.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let report = match &cli.command {
        Command::Clean(args) => {
            let config = build_clean_config(args)?;
            let progress = show_progress.then(|| CliProgressCallback::new("PDFs") as ProgressCallback);
            clean_directory(&args.root, &config, progress)
                .with_context(|| format!("Failed to clean PDFs under {}", args.root.display()))?
        }
        Command::Video(args) => {
            let config = build_video_config(args)?;
            let progress =
                show_progress.then(|| CliProgressCallback::new("videos") as ProgressCallback);
            convert_videos(&args.root, &config, progress)
                .with_context(|| format!("Failed to convert videos under {}", args.root.display()))?
        }
    };

    if common.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !common.quiet {
        print_summary(&report, &cli.command);
    }

    Ok(())
}

fn print_summary(report: &BatchReport, command: &Command) {
    let status = if report.failed() == 0 {
        green("✔")
    } else if report.succeeded() == 0 && report.total() > 0 {
        red("✘")
    } else {
        cyan("⚠")
    };
    let detail = match command {
        Command::Clean(args) if args.dry_run => {
            format!("{} pages would be removed", report.pages_removed())
        }
        Command::Clean(_) => format!("{} pages removed", report.pages_removed()),
        Command::Video(_) => format!("{} skipped", report.skipped()),
    };
    eprintln!(
        "{}  {}/{} files  {}  {}  {}",
        status,
        bold(&report.succeeded().to_string()),
        report.total(),
        detail,
        if report.failed() > 0 {
            red(&format!("{} failed", report.failed()))
        } else {
            String::new()
        },
        dim(&format!("{}ms", report.total_duration_ms)),
    );
}

/// Map CLI args to `CleanConfig`.
fn build_clean_config(args: &CleanArgs) -> Result<CleanConfig> {
    let (width, height) = parse_resize(&args.resize)?;
    CleanConfig::builder()
        .threshold(args.threshold)
        .dpi(args.dpi)
        .resize_to(width, height)
        .hash_size(args.hash_size)
        .output_suffix(args.suffix.clone())
        .include_cleaned(args.include_cleaned)
        .dry_run(args.dry_run)
        .build()
        .context("Invalid configuration")
}

/// Map CLI args to `VideoConfig`.
fn build_video_config(args: &VideoArgs) -> Result<VideoConfig> {
    let mut builder = VideoConfig::builder()
        .seconds_between(args.seconds)
        .page_size(args.page_size.clone().into())
        .jpeg_quality(args.quality);
    if let Some(dir) = &args.temp_root {
        builder = builder.temp_root(dir);
    }
    builder.build().context("Invalid configuration")
}

/// Parse `--resize` as `WIDTHxHEIGHT` (or a single number for a square).
fn parse_resize(s: &str) -> Result<(u32, u32)> {
    let s = s.trim().to_lowercase();
    let (w, h) = match s.split_once('x') {
        Some((w, h)) => (w.trim(), h.trim()),
        None => (s.as_str(), s.as_str()),
    };
    let width: u32 = w
        .parse()
        .with_context(|| format!("Invalid resize width: '{w}'"))?;
    let height: u32 = h
        .parse()
        .with_context(|| format!("Invalid resize height: '{h}'"))?;
    if width == 0 || height == 0 {
        anyhow::bail!("Resize dimensions must be non-zero (got {width}x{height})");
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_parses_pairs_and_squares() {
        assert_eq!(parse_resize("100x100").unwrap(), (100, 100));
        assert_eq!(parse_resize("64X32").unwrap(), (64, 32));
        assert_eq!(parse_resize("50").unwrap(), (50, 50));
        assert!(parse_resize("0x10").is_err());
        assert!(parse_resize("axb").is_err());
    }

    #[test]
    fn clean_args_map_to_config() {
        let cli = Cli::parse_from(["pdfsift", "clean", "--threshold", "80", "--dry-run", "docs"]);
        let Command::Clean(args) = cli.command else {
            panic!("expected clean subcommand");
        };
        let config = build_clean_config(&args).unwrap();
        assert_eq!(config.threshold, 80.0);
        assert!(config.dry_run);
        assert_eq!(config.resize_to, (100, 100));
        assert_eq!(args.root, PathBuf::from("docs"));
    }

    #[test]
    fn video_args_map_to_config() {
        let cli = Cli::parse_from(["pdfsift", "--json", "video", "-s", "5", "--page-size", "a4", "rec"]);
        assert!(cli.common.json);
        let Command::Video(args) = cli.command else {
            panic!("expected video subcommand");
        };
        let config = build_video_config(&args).unwrap();
        assert_eq!(config.seconds_between, 5);
        assert_eq!(config.page_size, PageSize::A4);
    }

    #[test]
    fn truncate_keeps_short_messages() {
        assert_eq!(truncate("short"), "short");
        assert_eq!(truncate(&"x".repeat(100)).chars().count(), 80);
    }
}
