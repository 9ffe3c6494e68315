//! Stage traits: page sources, OCR engines, and text outputs.

use std::path::{Path, PathBuf};

use crate::book::{OutputReport, PageImage};
use crate::error::Result;
use crate::options::ScanOptions;

/// Progress reporter callback type.
pub type ProgressReporter = Box<dyn Fn(f64, &str) + Send + Sync>;

/// Produces numbered page images from an input document.
pub trait PageSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Write page images for `input` into `image_dir` and return them in
    /// page-number order.
    fn extract(
        &self,
        input: &Path,
        image_dir: &Path,
        options: &ScanOptions,
    ) -> Result<Vec<PageImage>>;
}

/// Recognizes the text on a single page image.
pub trait OcrEngine: Send + Sync {
    /// Human-readable name of this engine.
    fn name(&self) -> &str;

    /// Run OCR on `image` and return the recognized text.
    fn recognize(&self, image: &Path, options: &ScanOptions) -> Result<String>;
}

/// Turns per-page text files into final output files.
pub trait TextOutput: Send + Sync {
    /// Human-readable name of this output.
    fn name(&self) -> &str;

    /// Consume `texts`, given in reading order, and write into `output_dir`.
    fn write(&self, texts: &[PathBuf], output_dir: &Path, options: &ScanOptions)
        -> Result<OutputReport>;

    /// Whether this output should run given the current options.
    /// Default: always run.
    fn should_run(&self, _options: &ScanOptions) -> bool {
        true
    }
}
