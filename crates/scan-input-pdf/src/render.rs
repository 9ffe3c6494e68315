//! PDF page rendering via `pdftoppm` (poppler-utils).
//!
//! Renders only the requested pages, batching contiguous runs into one
//! `pdftoppm` invocation each.

use std::collections::{BTreeMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use lopdf::Document;
use rayon::prelude::*;

use scan_core::error::{Result, ScanError};
use scan_core::options::ScanOptions;

/// Path of the `pdftoppm` executable: inside `poppler_path` when configured,
/// otherwise the bare name resolved through `PATH`.
pub fn pdftoppm_program(options: &ScanOptions) -> PathBuf {
    let exe = format!("pdftoppm{}", std::env::consts::EXE_SUFFIX);
    match &options.poppler_path {
        Some(dir) => dir.join(exe),
        None => PathBuf::from(exe),
    }
}

/// Check that pdftoppm can be started.
pub fn check_pdftoppm(options: &ScanOptions) -> Result<()> {
    let program = pdftoppm_program(options);
    match Command::new(&program).arg("-v").output() {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ScanError::Render(format!(
            "{} not found. pdftoppm (poppler-utils) is required for PDF rendering. \
             Install with: brew install poppler (macOS) or apt install poppler-utils (Linux), \
             or point poppler_path at a Poppler bin directory",
            program.display()
        ))),
        Err(e) => Err(ScanError::Render(format!(
            "Failed to run {}: {}",
            program.display(),
            e
        ))),
    }
}

/// Number of pages in a PDF.
pub fn page_count(pdf_path: &Path) -> Result<u32> {
    let doc = Document::load(pdf_path)
        .map_err(|e| ScanError::Pdf(format!("Failed to load PDF: {}", e)))?;
    Ok(doc.get_pages().len() as u32)
}

/// Render specific pages to PNG via pdftoppm.
/// Returns a map of page_number -> png_data.
pub fn render_pages(
    pdf_path: &Path,
    page_numbers: &[u32],
    total_pages: u32,
    options: &ScanOptions,
) -> Result<BTreeMap<u32, Vec<u8>>> {
    if page_numbers.is_empty() {
        return Ok(BTreeMap::new());
    }

    check_pdftoppm(options)?;

    let program = pdftoppm_program(options);
    let dpi = options.dpi.to_string();
    let ranges = contiguous_ranges(page_numbers);
    let wanted: HashSet<u32> = page_numbers.iter().copied().collect();

    log::info!(
        "Rendering {} of {} pages in {} batch(es) with pdftoppm at {} DPI...",
        page_numbers.len(),
        total_pages,
        ranges.len(),
        dpi
    );

    // Each range spawns its own pdftoppm + temp dir
    let batch_results: Vec<Result<BTreeMap<u32, Vec<u8>>>> = ranges
        .par_iter()
        .map(|&(first, last)| {
            log::debug!("[pdftoppm] Rendering pages {}-{}...", first, last);

            let tmp_dir = tempfile::TempDir::new()
                .map_err(|e| ScanError::Render(format!("Failed to create temp dir: {}", e)))?;
            let prefix = tmp_dir.path().join("page");

            let output = Command::new(&program)
                .arg("-png")
                .arg("-r")
                .arg(&dpi)
                .arg("-f")
                .arg(first.to_string())
                .arg("-l")
                .arg(last.to_string())
                .arg(pdf_path.as_os_str())
                .arg(prefix.as_os_str())
                .output()
                .map_err(|e| ScanError::Render(format!("Failed to run pdftoppm: {}", e)))?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(ScanError::Render(format!(
                    "pdftoppm failed for pages {}-{}: {}",
                    first,
                    last,
                    stderr.trim()
                )));
            }

            let mut batch = BTreeMap::new();
            for page_num in (first..=last).filter(|p| wanted.contains(p)) {
                let path = find_rendered_page(tmp_dir.path(), page_num, total_pages)
                    .ok_or_else(|| {
                        ScanError::Render(format!(
                            "pdftoppm produced no image for page {}",
                            page_num
                        ))
                    })?;
                let data = std::fs::read(&path).map_err(|e| {
                    ScanError::Render(format!("Failed to read rendered page {}: {}", page_num, e))
                })?;
                batch.insert(page_num, data);
            }
            Ok(batch)
        })
        .collect();

    let mut result = BTreeMap::new();
    for batch_result in batch_results {
        result.extend(batch_result?);
    }
    Ok(result)
}

/// Group non-contiguous page numbers into minimal contiguous ranges.
///
/// E.g., `[1, 2, 3, 7, 8, 12]` → `[(1, 3), (7, 8), (12, 12)]`
pub fn contiguous_ranges(pages: &[u32]) -> Vec<(u32, u32)> {
    let mut sorted: Vec<u32> = pages.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let Some((&head, tail)) = sorted.split_first() else {
        return Vec::new();
    };

    let mut ranges = Vec::new();
    let (mut start, mut end) = (head, head);
    for &p in tail {
        if p == end + 1 {
            end = p;
        } else {
            ranges.push((start, end));
            start = p;
            end = p;
        }
    }
    ranges.push((start, end));

    ranges
}

/// Find the rendered PNG file for a given page number.
/// pdftoppm zero-pads based on total page count.
pub fn find_rendered_page(dir: &Path, page_num: u32, total_pages: u32) -> Option<PathBuf> {
    let width = total_pages.max(1).to_string().len().max(2);
    let expected = dir.join(format!("page-{:0>width$}.png", page_num, width = width));
    if expected.exists() {
        return Some(expected);
    }

    // Older poppler releases pad differently
    (1..=6)
        .map(|w| dir.join(format!("page-{:0>width$}.png", page_num, width = w)))
        .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_ranges_basic() {
        assert_eq!(
            contiguous_ranges(&[1, 2, 3, 7, 8, 12]),
            vec![(1, 3), (7, 8), (12, 12)]
        );
    }

    #[test]
    fn test_contiguous_ranges_kept_spreads() {
        // Page selection for a 6-page scan keeps 1, 3, 5, 6
        assert_eq!(
            contiguous_ranges(&[1, 3, 5, 6]),
            vec![(1, 1), (3, 3), (5, 6)]
        );
    }

    #[test]
    fn test_contiguous_ranges_empty() {
        assert_eq!(contiguous_ranges(&[]), Vec::<(u32, u32)>::new());
    }

    #[test]
    fn test_contiguous_ranges_unsorted_with_duplicates() {
        assert_eq!(contiguous_ranges(&[5, 3, 1, 2, 4, 3]), vec![(1, 5)]);
    }

    #[test]
    fn test_find_rendered_page() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("page-03.png");
        std::fs::write(&path, b"fake png").unwrap();
        assert_eq!(find_rendered_page(dir.path(), 3, 56), Some(path));
    }

    #[test]
    fn test_find_rendered_page_three_digits() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("page-007.png");
        std::fs::write(&path, b"fake png").unwrap();
        assert_eq!(find_rendered_page(dir.path(), 7, 250), Some(path));
        assert_eq!(find_rendered_page(dir.path(), 8, 250), None);
    }

    #[test]
    fn test_pdftoppm_program_uses_poppler_path() {
        let mut opts = ScanOptions::default();
        assert_eq!(
            pdftoppm_program(&opts),
            PathBuf::from(format!("pdftoppm{}", std::env::consts::EXE_SUFFIX))
        );

        opts.poppler_path = Some(PathBuf::from("/opt/poppler/bin"));
        assert!(pdftoppm_program(&opts).starts_with("/opt/poppler/bin"));
    }

    #[test]
    fn test_missing_pdftoppm_reported() {
        let mut opts = ScanOptions::default();
        opts.poppler_path = Some(PathBuf::from("/nonexistent/poppler/bin"));
        let err = check_pdftoppm(&opts).unwrap_err();
        assert!(matches!(err, ScanError::Render(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_page_count_rejects_garbage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();
        assert!(matches!(page_count(&path), Err(ScanError::Pdf(_))));
    }
}
