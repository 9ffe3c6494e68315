//! scanbook-rs: turn scanned double-page PDF books into page images,
//! OCR text, and per-chapter text files.
//!
//! Supports two CLI modes:
//! - Legacy: `scanbook-rs input.pdf out_dir [--options]`
//! - Modern: `scanbook-rs process input.pdf -o out_dir`

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use scan_core::layout::BookLayout;
use scan_core::options::ScanOptions;
use scan_core::pipeline::{Pipeline, PipelineBuilder};
use scan_core::plugin::{PageSource, TextOutput};
use scan_chapters::{page_texts, ChapterOutput};
use scan_input_pdf::PdfSpreadSource;
use scan_ocr::TesseractEngine;

const APP_NAME: &str = "scanbook-rs";

#[derive(Parser)]
#[command(
    name = "scanbook-rs",
    version,
    about = "Split scanned book spreads into pages, OCR them, and cut the text into chapters"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input PDF (legacy mode)
    #[arg(global = false)]
    input: Option<PathBuf>,

    /// Output folder (legacy mode)
    #[arg(global = false)]
    output: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Rendering resolution in DPI (default: 200)
    #[arg(long, global = true)]
    dpi: Option<u16>,

    /// Directory containing the Poppler binaries (pdftoppm)
    #[arg(long, global = true)]
    poppler_path: Option<PathBuf>,

    /// Tesseract executable to use
    #[arg(long, global = true)]
    tesseract: Option<PathBuf>,

    /// Zip archive with a bundled Tesseract-OCR folder
    #[arg(long, global = true)]
    tesseract_bundle: Option<PathBuf>,

    /// OCR language passed to tesseract -l (default: eng)
    #[arg(long, global = true)]
    lang: Option<String>,

    /// OCR worker threads (default: one per CPU)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Chapter heading regex; the first capture group is the chapter number
    #[arg(long, global = true)]
    chapter_regex: Option<String>,

    /// Lines at the top of each page searched for a heading (default: 5)
    #[arg(long, global = true)]
    heading_lines: Option<usize>,

    /// Also write the text preceding the first chapter
    #[arg(long, global = true)]
    front_matter: bool,

    /// Stop after OCR
    #[arg(long, global = true)]
    no_chapters: bool,

    /// Dump effective merged config as TOML and exit
    #[arg(long, global = true)]
    dump_config: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render, split, OCR, and cut into chapters
    Process {
        /// Scanned PDF
        input: PathBuf,

        /// Output folder; results land in <output>/<pdf name>/
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Render and split spreads into page images only
    Pages {
        /// Scanned PDF
        input: PathBuf,

        /// Output folder; images land in <output>/<pdf name>/img/
        #[arg(short, long)]
        output: PathBuf,
    },

    /// OCR every PNG in a folder into <folder>/ocr_text/
    Ocr {
        /// Folder of page images
        image_dir: PathBuf,
    },

    /// Cut a folder of page text files into chapters
    Chapters {
        /// Folder of page text files
        text_dir: PathBuf,

        /// Folder for chapter files
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Load config from global and project-local TOML files.
/// Later files override earlier ones. Missing files are silently ignored.
fn load_config() -> ScanOptions {
    let mut opts = ScanOptions::default();

    // 1. Global config: ~/.config/scanbook-rs/config.toml
    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join(APP_NAME).join("config.toml");
        if let Some(parsed) = read_config_file(&global_path) {
            opts = parsed;
        }
    }

    // 2. Project-local config: ./.scanbook-rs.toml
    let local_path = PathBuf::from(format!(".{}.toml", APP_NAME));
    if let Some(parsed) = read_config_file(&local_path) {
        // serde(default) fills every missing field, so the local file
        // replaces the global one wholesale.
        opts = parsed;
    }

    opts
}

fn read_config_file(path: &Path) -> Option<ScanOptions> {
    let contents = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<ScanOptions>(&contents) {
        Ok(parsed) => {
            log::debug!("Loaded config from {}", path.display());
            Some(parsed)
        }
        Err(e) => {
            log::warn!("Failed to parse {}: {}", path.display(), e);
            None
        }
    }
}

/// Apply CLI flags on top of config-loaded options.
/// Only overrides when the CLI flag was explicitly provided.
fn apply_cli_overrides(opts: &mut ScanOptions, cli: &Cli) {
    if let Some(dpi) = cli.dpi {
        opts.dpi = dpi.max(1);
    }

    if cli.poppler_path.is_some() {
        opts.poppler_path = cli.poppler_path.clone();
    }

    if cli.tesseract.is_some() {
        opts.tesseract_path = cli.tesseract.clone();
    }

    if cli.tesseract_bundle.is_some() {
        opts.tesseract_bundle = cli.tesseract_bundle.clone();
    }

    if let Some(ref lang) = cli.lang {
        opts.ocr_language = lang.clone();
    }

    if let Some(threads) = cli.threads {
        opts.ocr_threads = threads;
    }

    if let Some(ref regex) = cli.chapter_regex {
        opts.chapter_regex = regex.clone();
    }

    if let Some(lines) = cli.heading_lines {
        opts.heading_scan_lines = lines;
    }

    if cli.front_matter {
        opts.write_front_matter = true;
    }

    if cli.no_chapters {
        opts.skip_chapters = true;
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose > 0 { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut options = load_config();
    apply_cli_overrides(&mut options, &cli);

    // Handle --dump-config
    if cli.dump_config {
        match toml::to_string_pretty(&options) {
            Ok(s) => {
                println!("{}", s);
                process::exit(0);
            }
            Err(e) => {
                eprintln!("Error serializing config: {}", e);
                process::exit(1);
            }
        }
    }

    let result = match &cli.command {
        Some(Commands::Process { input, output }) => run_process(input, output, &options),
        Some(Commands::Pages { input, output }) => run_pages(input, output, &options),
        Some(Commands::Ocr { image_dir }) => run_ocr(image_dir, &options),
        Some(Commands::Chapters { text_dir, output }) => run_chapters(text_dir, output, &options),
        None => {
            // Legacy mode: positional args
            match (&cli.input, &cli.output) {
                (Some(input), Some(output)) => run_process(input, output, &options),
                _ => {
                    eprintln!("Usage: scanbook-rs <input.pdf> <output_dir> [options]");
                    eprintln!("   or: scanbook-rs process <input.pdf> -o <output_dir> [options]");
                    process::exit(1);
                }
            }
        }
    };

    match result {
        Ok(message) => println!("{}", message),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn build_pipeline(options: &ScanOptions) -> Result<Pipeline> {
    let engine = TesseractEngine::from_options(options)
        .context("Cannot set up Tesseract")?;

    let pipeline = PipelineBuilder::new()
        .source(Box::new(PdfSpreadSource))
        .engine(Box::new(engine))
        .output(Box::new(ChapterOutput))
        .progress_reporter(Box::new(|frac, msg| {
            if frac < 1.0 {
                log::info!("[{:3.0}%] {}", frac * 100.0, msg);
            } else {
                log::info!("Done!");
            }
        }))
        .build()?;
    Ok(pipeline)
}

fn run_process(input: &Path, output: &Path, options: &ScanOptions) -> Result<String> {
    log::info!("Processing {} → {}", input.display(), output.display());

    let pipeline = build_pipeline(options)?;
    let summary = pipeline
        .run(input, output, options)
        .with_context(|| format!("Error during conversion of {}", input.display()))?;

    Ok(summary.to_string())
}

fn run_pages(input: &Path, output: &Path, options: &ScanOptions) -> Result<String> {
    let layout = BookLayout::for_input(input, output);
    std::fs::create_dir_all(&layout.image_dir)
        .with_context(|| format!("Failed to create {}", layout.image_dir.display()))?;

    let pages = PdfSpreadSource
        .extract(input, &layout.image_dir, options)
        .with_context(|| format!("Error during conversion of {}", input.display()))?;

    Ok(format!(
        "Conversion successful! {} images saved in: {}.",
        pages.len(),
        layout.image_dir.display()
    ))
}

fn run_ocr(image_dir: &Path, options: &ScanOptions) -> Result<String> {
    let pipeline = build_pipeline(options)?;
    let summary = pipeline
        .ocr_only(image_dir, options)
        .context("Error during OCR")?;
    Ok(summary.to_string())
}

fn run_chapters(text_dir: &Path, output: &Path, options: &ScanOptions) -> Result<String> {
    let texts = page_texts(text_dir)
        .with_context(|| format!("Failed to list {}", text_dir.display()))?;
    let report = ChapterOutput
        .write(&texts, output, options)
        .context("Error during chapter split")?;

    Ok(format!(
        "{} chapters written to: {}.",
        report.chapter_count,
        report.output_dir.display()
    ))
}
