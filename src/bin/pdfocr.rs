//! CLI binary for pdfocr.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdfocr::{
    extract, extract_to_file, inspect, EngineMode, ExtractionConfig, ExtractionProgressCallback,
    PageSelection, ProgressCallback,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
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
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a single live progress bar that works
/// correctly when pages complete out of order (concurrent workers).
struct CliProgress {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_job_start
        let spinner = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl ExtractionProgressCallback for CliProgress {
    fn on_job_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:40.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Recognising");
        self.bar.set_message("");
    }

    fn on_page_complete(&self, page_num: usize, _total_pages: usize, text_len: usize) {
        self.bar.inc(1);
        self.bar.println(format!(
            "  {} page {:>3}  {}",
            green("✓"),
            page_num,
            dim(&format!("{} bytes", text_len))
        ));
    }

    fn on_page_error(&self, page_num: usize, _total_pages: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        self.bar.inc(1);
        self.bar
            .println(format!("  {} page {:>3}  {}", red("✗"), page_num, dim(error)));
    }

    fn on_job_complete(&self, _total_pages: usize, _recognized_count: usize) {
        self.bar.finish_and_clear();
    }
}

// ── CLI definition ───────────────────────────────────────────────────────────

/// Extract per-page plain text from a PDF via rasterisation and OCR.
#[derive(Parser, Debug)]
#[command(name = "pdfocr", version, about, long_about = None)]
struct Cli {
    /// PDF to process: a local file path or an HTTP/HTTPS URL.
    input: String,

    /// Write the extracted text to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the result as JSON (ordered array of per-page entries + stats).
    #[arg(long, conflicts_with = "output")]
    json: bool,

    /// Only print document metadata; no rasterisation or recognition.
    #[arg(long)]
    inspect: bool,

    /// Pages processed simultaneously.
    #[arg(short, long, default_value_t = 8)]
    concurrency: usize,

    /// Recognition strategy: legacy, neural, or combined.
    #[arg(long, default_value = "combined")]
    engine_mode: String,

    /// Thread cap inside a single engine invocation.
    #[arg(long, default_value_t = 8)]
    engine_thread_limit: u32,

    /// Recognition language(s), e.g. "eng" or "eng+deu".
    #[arg(short, long, default_value = "eng", env = "PDFOCR_LANG")]
    language: String,

    /// Rendering DPI (72–400).
    #[arg(long, default_value_t = 200)]
    dpi: u32,

    /// Pages to process: "all", a single page "3", or a range "2-10" (1-indexed).
    #[arg(short, long, default_value = "all")]
    pages: String,

    /// Password for encrypted PDFs.
    #[arg(long)]
    password: Option<String>,

    /// Per-page timeout in seconds; an expired page degrades to an empty entry.
    #[arg(long)]
    page_timeout: Option<u64>,

    /// Download timeout for URL inputs, in seconds.
    #[arg(long, default_value_t = 120)]
    download_timeout: u64,

    /// Suppress the progress bar and per-page log lines.
    #[arg(short, long)]
    quiet: bool,
}

fn parse_engine_mode(s: &str) -> Result<EngineMode> {
    match s {
        "legacy" => Ok(EngineMode::Legacy),
        "neural" => Ok(EngineMode::Neural),
        "combined" => Ok(EngineMode::Combined),
        other => anyhow::bail!("unknown engine mode '{other}' (expected legacy|neural|combined)"),
    }
}

fn parse_pages(s: &str) -> Result<PageSelection> {
    if s == "all" {
        return Ok(PageSelection::All);
    }
    if let Some((a, b)) = s.split_once('-') {
        let start: usize = a.trim().parse().context("invalid page range start")?;
        let end: usize = b.trim().parse().context("invalid page range end")?;
        return Ok(PageSelection::Range(start, end));
    }
    let single: usize = s.trim().parse().context("invalid page number")?;
    Ok(PageSelection::Single(single))
}

fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .concurrency(cli.concurrency)
        .engine_mode(parse_engine_mode(&cli.engine_mode)?)
        .engine_thread_limit(cli.engine_thread_limit)
        .language(cli.language.clone())
        .dpi(cli.dpi)
        .pages(parse_pages(&cli.pages)?)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(secs) = cli.page_timeout {
        builder = builder.page_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress(cb);
    }

    Ok(builder.build()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.inspect {
        let meta = inspect(&cli.input).await?;
        println!("{}", serde_json::to_string_pretty(&meta)?);
        return Ok(());
    }

    let progress: Option<ProgressCallback> = if cli.quiet || cli.json {
        None
    } else {
        Some(CliProgress::new())
    };
    let config = build_config(&cli, progress)?;

    if let Some(ref out_path) = cli.output {
        let stats = extract_to_file(&cli.input, out_path, &config).await?;
        eprintln!(
            "{} {} {}",
            green("✓"),
            bold(&format!("{} pages", stats.recognized_pages)),
            dim(&format!(
                "→ {} ({} failed, {}ms)",
                out_path.display(),
                stats.failed_pages,
                stats.total_duration_ms
            ))
        );
        return Ok(());
    }

    let output = extract(&cli.input, &config).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for page in &output.pages {
            println!("{}", page.text);
        }
        eprintln!(
            "{} {}",
            green("✓"),
            dim(&format!(
                "{}/{} pages recognised, {} failed, {}ms",
                output.stats.recognized_pages,
                output.pages.len(),
                output.stats.failed_pages,
                output.stats.total_duration_ms
            ))
        );
    }

    if output.stats.failed_pages > 0 {
        std::process::exit(2);
    }

    Ok(())
}
