//! On-disk layout of one processed book.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Output directories for a single input PDF.
///
/// ```text
/// <out>/<stem>/img/page_<n>.png
/// <out>/<stem>/img/ocr_text/page_<n>.txt
/// <out>/<stem>/chapters/chapter_<number>.txt
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookLayout {
    pub root: PathBuf,
    pub image_dir: PathBuf,
    pub text_dir: PathBuf,
    pub chapter_dir: PathBuf,
}

impl BookLayout {
    /// Layout for `input` (a PDF path) under the output root `output_root`.
    pub fn for_input(input: &Path, output_root: &Path) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "book".to_string());
        Self::at(output_root.join(stem))
    }

    /// Layout rooted directly at `root`.
    pub fn at(root: PathBuf) -> Self {
        let image_dir = root.join("img");
        Self {
            text_dir: text_dir_for(&image_dir),
            chapter_dir: root.join("chapters"),
            image_dir,
            root,
        }
    }

    /// Create the image and text directories.
    pub fn create_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.image_dir)?;
        std::fs::create_dir_all(&self.text_dir)?;
        Ok(())
    }
}

/// OCR text directory for a directory of page images.
pub fn text_dir_for(image_dir: &Path) -> PathBuf {
    image_dir.join("ocr_text")
}

/// File name of the `number`-th page image.
pub fn page_image_name(number: u32) -> String {
    format!("page_{}.png", number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_for_input() {
        let layout = BookLayout::for_input(Path::new("/books/My Scan.pdf"), Path::new("/out"));
        assert_eq!(layout.root, PathBuf::from("/out/My Scan"));
        assert_eq!(layout.image_dir, PathBuf::from("/out/My Scan/img"));
        assert_eq!(layout.text_dir, PathBuf::from("/out/My Scan/img/ocr_text"));
        assert_eq!(layout.chapter_dir, PathBuf::from("/out/My Scan/chapters"));
    }

    #[test]
    fn test_page_image_name() {
        assert_eq!(page_image_name(1), "page_1.png");
        assert_eq!(page_image_name(12), "page_12.png");
    }

    #[test]
    fn test_create_dirs_is_idempotent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let layout = BookLayout::at(tmp.path().join("book"));
        layout.create_dirs().unwrap();
        layout.create_dirs().unwrap();
        assert!(layout.text_dir.is_dir());
        assert!(!layout.chapter_dir.exists());
    }
}
