//! Chapter text output: writes one file per detected chapter.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use scan_core::book::OutputReport;
use scan_core::error::Result;
use scan_core::options::ScanOptions;
use scan_core::plugin::TextOutput;
use scan_utils::encoding::read_text_file;
use scan_utils::files::list_files_with_extension;

use crate::detect::ChapterPattern;
use crate::split::{split_chapters, Chapter, ChapterSplit, SourceText};

pub const FRONT_MATTER_FILE: &str = "front_matter.txt";

/// Splits a directory of page texts into `chapter_<number>.txt` files.
pub struct ChapterOutput;

impl TextOutput for ChapterOutput {
    fn name(&self) -> &str {
        "Chapter Text"
    }

    fn write(
        &self,
        texts: &[PathBuf],
        output_dir: &Path,
        options: &ScanOptions,
    ) -> Result<OutputReport> {
        let split = split_files(texts, options)?;

        if split.chapters.is_empty() {
            log::warn!(
                "No chapter headings found in {} page(s); no chapter files written",
                texts.len()
            );
        } else {
            log::info!(
                "Found {} chapter(s) in {} page(s)",
                split.chapters.len(),
                texts.len()
            );
        }

        let mut report = OutputReport {
            output_dir: output_dir.to_path_buf(),
            chapter_count: split.chapters.len(),
            files: Vec::new(),
        };

        let front_matter = options.write_front_matter && !split.front_matter.is_empty();
        if split.chapters.is_empty() && !front_matter {
            return Ok(report);
        }
        std::fs::create_dir_all(output_dir)?;

        if front_matter {
            let path = output_dir.join(FRONT_MATTER_FILE);
            std::fs::write(&path, split.front_matter.as_bytes())?;
            report.files.push(path);
        }

        for (chapter, name) in split.chapters.iter().zip(chapter_file_names(&split.chapters)) {
            let path = output_dir.join(name);
            log::debug!(
                "Chapter {} ({}..{}) -> {}",
                chapter.number,
                chapter.first_file,
                chapter.last_file,
                path.display()
            );
            std::fs::write(&path, chapter.text.as_bytes())?;
            report.files.push(path);
        }

        Ok(report)
    }
}

/// Every `*.txt` in `text_dir`, in natural filename order.
pub fn page_texts(text_dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(list_files_with_extension(text_dir, "txt")?)
}

/// Read `texts` in the given order and split them into chapters.
pub fn split_files(texts: &[PathBuf], options: &ScanOptions) -> Result<ChapterSplit> {
    let pattern = ChapterPattern::from_options(options)?;

    let sources = texts
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(SourceText::new(name, read_text_file(path)?))
        })
        .collect::<Result<Vec<_>>>()?;

    log::info!("Scanning {} page text file(s) for chapters", sources.len());
    Ok(split_chapters(&sources, &pattern))
}

/// `chapter_<number>.txt`, with `_2`, `_3`, ... appended to repeated numbers.
pub fn chapter_file_names(chapters: &[Chapter]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    chapters
        .iter()
        .map(|chapter| {
            let number = file_name_part(&chapter.number);
            let count = seen.entry(number.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                format!("chapter_{}.txt", number)
            } else {
                format!("chapter_{}_{}.txt", number, count)
            }
        })
        .collect()
}

/// Replace characters that cannot appear in a file name on common platforms.
fn file_name_part(number: &str) -> String {
    let cleaned: String = number
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}
