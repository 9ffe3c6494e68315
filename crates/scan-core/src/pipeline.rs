//! Pipeline orchestrator: runs a full scan-to-chapters conversion.
//!
//! The pipeline runs in three phases:
//!   Phase 1 (0-30%): Page source → page images on disk
//!   Phase 2 (30-90%): OCR over every page image, in parallel
//!   Phase 3 (90-100%): Text output → chapter files

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use log::info;
use rayon::prelude::*;

use crate::book::RunSummary;
use crate::error::{Result, ScanError};
use crate::layout::{text_dir_for, BookLayout};
use crate::options::ScanOptions;
use crate::plugin::{OcrEngine, PageSource, ProgressReporter, TextOutput};

const OCR_START: f64 = 0.30;
const OCR_END: f64 = 0.90;

/// The conversion pipeline orchestrator.
pub struct Pipeline {
    source: Box<dyn PageSource>,
    engine: Box<dyn OcrEngine>,
    output: Option<Box<dyn TextOutput>>,
    progress_reporter: Option<ProgressReporter>,
}

impl Pipeline {
    pub fn new(source: Box<dyn PageSource>, engine: Box<dyn OcrEngine>) -> Self {
        Self {
            source,
            engine,
            output: None,
            progress_reporter: None,
        }
    }

    /// Set the stage that consumes the OCR text.
    pub fn set_output(&mut self, output: Box<dyn TextOutput>) {
        self.output = Some(output);
    }

    /// Set a progress reporter callback.
    pub fn set_progress_reporter(&mut self, reporter: ProgressReporter) {
        self.progress_reporter = Some(reporter);
    }

    /// Run the full pipeline for `input`, writing below `output_root/<stem>/`.
    pub fn run(
        &self,
        input: &Path,
        output_root: &Path,
        options: &ScanOptions,
    ) -> Result<RunSummary> {
        let layout = BookLayout::for_input(input, output_root);
        layout.create_dirs()?;

        // Phase 1: Pages
        self.report_progress(0.0, "Starting conversion...");
        info!("Running {} page source...", self.source.name());
        let pages = self.source.extract(input, &layout.image_dir, options)?;
        info!(
            "{} page images saved in {}",
            pages.len(),
            layout.image_dir.display()
        );
        self.report_progress(OCR_START, &format!("{} page images ready", pages.len()));

        // Phase 2: OCR
        let images: Vec<PathBuf> = pages.into_iter().map(|p| p.path).collect();
        let texts = self.recognize_all(&images, &layout.text_dir, options)?;
        self.report_progress(OCR_END, "OCR complete");

        // Phase 3: Output
        let output = self.write_output(&texts, &layout.chapter_dir, options)?;

        self.report_progress(1.0, "Conversion complete");

        Ok(RunSummary {
            images: Some((images.len(), layout.image_dir)),
            text_count: texts.len(),
            text_dir: layout.text_dir,
            output,
        })
    }

    /// OCR every PNG already present in `image_dir`, writing text to
    /// `image_dir/ocr_text/`. The text output stage does not run.
    pub fn ocr_only(&self, image_dir: &Path, options: &ScanOptions) -> Result<RunSummary> {
        let images = scan_utils::files::list_files_with_extension(image_dir, "png")?;
        if images.is_empty() {
            return Err(ScanError::Pipeline(format!(
                "No PNG images found in {}",
                image_dir.display()
            )));
        }

        let text_dir = text_dir_for(image_dir);
        std::fs::create_dir_all(&text_dir)?;

        self.report_progress(OCR_START, &format!("{} page images found", images.len()));
        let texts = self.recognize_all(&images, &text_dir, options)?;
        self.report_progress(1.0, "OCR complete");

        Ok(RunSummary {
            images: None,
            text_count: texts.len(),
            text_dir,
            output: None,
        })
    }

    /// Run OCR over `images`, writing `<text_dir>/<image stem>.txt` for each.
    /// Returns the text file paths in the same order as `images`.
    fn recognize_all(
        &self,
        images: &[PathBuf],
        text_dir: &Path,
        options: &ScanOptions,
    ) -> Result<Vec<PathBuf>> {
        info!(
            "Running {} OCR on {} images...",
            self.engine.name(),
            images.len()
        );

        let done = AtomicUsize::new(0);
        let total = images.len().max(1);

        let work = || -> Result<Vec<PathBuf>> {
            images
                .par_iter()
                .map(|image| {
                    let text_path = self.recognize_one(image, text_dir, options)?;
                    let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                    let fraction =
                        OCR_START + (OCR_END - OCR_START) * finished as f64 / total as f64;
                    self.report_progress(
                        fraction,
                        &format!("OCR {}/{}", finished, images.len()),
                    );
                    Ok(text_path)
                })
                .collect()
        };

        if options.ocr_threads == 0 {
            return work();
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.ocr_threads)
            .build()
            .map_err(|e| ScanError::Pipeline(format!("Failed to build OCR thread pool: {}", e)))?;
        pool.install(work)
    }

    fn recognize_one(&self, image: &Path, text_dir: &Path, options: &ScanOptions) -> Result<PathBuf> {
        let name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let text = self.engine.recognize(image, options).map_err(|e| match e {
            ScanError::Ocr(msg) => ScanError::Ocr(format!("{}: {}", name, msg)),
            other => ScanError::Ocr(format!("{}: {}", name, other)),
        })?;

        let stem = image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.clone());
        let text_path = text_dir.join(format!("{}.txt", stem));
        std::fs::write(&text_path, text.as_bytes())?;
        log::debug!("OCR {} -> {}", name, text_path.display());
        Ok(text_path)
    }

    fn write_output(
        &self,
        texts: &[PathBuf],
        output_dir: &Path,
        options: &ScanOptions,
    ) -> Result<Option<crate::book::OutputReport>> {
        let output = match &self.output {
            Some(output) => output,
            None => return Ok(None),
        };

        if options.skip_chapters || !output.should_run(options) {
            info!("Skipping output: {}", output.name());
            return Ok(None);
        }

        info!("Running {} output...", output.name());
        self.report_progress(OCR_END, &format!("Running {}", output.name()));
        let report = output.write(texts, output_dir, options).map_err(|e| {
            ScanError::Pipeline(format!("Output '{}' failed: {}", output.name(), e))
        })?;
        Ok(Some(report))
    }

    fn report_progress(&self, fraction: f64, message: &str) {
        if let Some(ref reporter) = self.progress_reporter {
            reporter(fraction, message);
        }
    }
}

/// Builder for constructing a pipeline.
pub struct PipelineBuilder {
    source: Option<Box<dyn PageSource>>,
    engine: Option<Box<dyn OcrEngine>>,
    output: Option<Box<dyn TextOutput>>,
    progress_reporter: Option<ProgressReporter>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            source: None,
            engine: None,
            output: None,
            progress_reporter: None,
        }
    }

    pub fn source(mut self, source: Box<dyn PageSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn engine(mut self, engine: Box<dyn OcrEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn output(mut self, output: Box<dyn TextOutput>) -> Self {
        self.output = Some(output);
        self
    }

    pub fn progress_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let source = self
            .source
            .ok_or_else(|| ScanError::Pipeline("No page source specified".to_string()))?;
        let engine = self
            .engine
            .ok_or_else(|| ScanError::Pipeline("No OCR engine specified".to_string()))?;

        let mut pipeline = Pipeline::new(source, engine);
        if let Some(output) = self.output {
            pipeline.set_output(output);
        }
        if let Some(reporter) = self.progress_reporter {
            pipeline.set_progress_reporter(reporter);
        }
        Ok(pipeline)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
