//! Records passed between pipeline stages.

use std::fmt;
use std::path::PathBuf;

/// Which half of a scanned spread a page image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSide {
    Left,
    Right,
}

/// One page image written by a [`PageSource`](crate::plugin::PageSource).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// 1-based sequential page number.
    pub number: u32,
    /// 1-based PDF page the image was cut from.
    pub source_page: u32,
    pub side: PageSide,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// What a [`TextOutput`](crate::plugin::TextOutput) produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputReport {
    pub output_dir: PathBuf,
    pub chapter_count: usize,
    pub files: Vec<PathBuf>,
}

/// Result of a pipeline run. `Display` renders the final status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Page images produced in this run; `None` when OCR ran over an
    /// existing image directory.
    pub images: Option<(usize, PathBuf)>,
    pub text_count: usize,
    pub text_dir: PathBuf,
    pub output: Option<OutputReport>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((count, dir)) = &self.images {
            write!(
                f,
                "Conversion successful! {} images saved in: {}. ",
                count,
                dir.display()
            )?;
        }
        write!(f, "OCR completed! Text saved in: {}.", self.text_dir.display())?;
        if let Some(report) = self.output.as_ref().filter(|r| r.chapter_count > 0) {
            write!(
                f,
                " {} chapters written to: {}.",
                report.chapter_count,
                report.output_dir.display()
            )?;
        }
        Ok(())
    }
}
