//! Processing options shared across the pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default chapter heading pattern. Matched case-insensitively; the first
/// capture group is the chapter number.
pub const DEFAULT_CHAPTER_REGEX: &str = r"^Chapter\s+(\d+)";

/// Default folder prefix of the Tesseract installation inside a bundle zip.
pub const DEFAULT_BUNDLE_PREFIX: &str = "Tesseract-OCR/";

/// All options controlling a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    // -- Rendering --
    /// Resolution passed to `pdftoppm -r`.
    pub dpi: u16,
    /// Directory holding the Poppler binaries. Falls back to `PATH`.
    pub poppler_path: Option<PathBuf>,

    // -- OCR --
    pub tesseract_path: Option<PathBuf>,
    /// Zip archive carrying a Tesseract installation folder.
    pub tesseract_bundle: Option<PathBuf>,
    pub bundle_prefix: String,
    pub ocr_language: String,
    /// Worker threads for OCR; 0 lets rayon pick one per CPU.
    pub ocr_threads: usize,

    // -- Chapters --
    pub chapter_regex: String,
    pub heading_scan_lines: usize,
    pub write_front_matter: bool,
    pub skip_chapters: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            dpi: 200,
            poppler_path: None,
            tesseract_path: None,
            tesseract_bundle: None,
            bundle_prefix: DEFAULT_BUNDLE_PREFIX.to_string(),
            ocr_language: "eng".to_string(),
            ocr_threads: 0,
            chapter_regex: DEFAULT_CHAPTER_REGEX.to_string(),
            heading_scan_lines: 5,
            write_front_matter: false,
            skip_chapters: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_round_trip_full() {
        let mut opts = ScanOptions::default();
        opts.dpi = 300;
        opts.poppler_path = Some(PathBuf::from("/opt/poppler/bin"));
        opts.tesseract_bundle = Some(PathBuf::from("/plugins/bundle.zip"));
        opts.ocr_language = "deu".to_string();
        opts.ocr_threads = 4;
        opts.chapter_regex = r"^Kapitel\s+(\d+)".to_string();
        opts.heading_scan_lines = 3;
        opts.write_front_matter = true;

        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: ScanOptions = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.dpi, 300);
        assert_eq!(parsed.poppler_path, Some(PathBuf::from("/opt/poppler/bin")));
        assert_eq!(
            parsed.tesseract_bundle,
            Some(PathBuf::from("/plugins/bundle.zip"))
        );
        assert_eq!(parsed.ocr_language, "deu");
        assert_eq!(parsed.ocr_threads, 4);
        assert_eq!(parsed.chapter_regex, r"^Kapitel\s+(\d+)");
        assert_eq!(parsed.heading_scan_lines, 3);
        assert!(parsed.write_front_matter);
        assert!(!parsed.skip_chapters);
    }

    #[test]
    fn test_toml_partial_config() {
        let toml_str = r#"
dpi = 150
ocr_language = "fra"
"#;
        let opts: ScanOptions = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.dpi, 150);
        assert_eq!(opts.ocr_language, "fra");
        // Defaults filled in
        assert_eq!(opts.heading_scan_lines, 5);
        assert_eq!(opts.chapter_regex, DEFAULT_CHAPTER_REGEX);
        assert_eq!(opts.bundle_prefix, "Tesseract-OCR/");
        assert!(opts.tesseract_path.is_none());
    }

    #[test]
    fn test_verbosity_not_a_config_key() {
        // Log verbosity comes from -v only; an old config key is ignored
        let opts: ScanOptions = toml::from_str("verbose = 2\ndpi = 300\n").unwrap();
        assert_eq!(opts.dpi, 300);
        assert!(!toml::to_string_pretty(&opts).unwrap().contains("verbose"));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let toml_str = r#"dpi = "high""#;
        assert!(toml::from_str::<ScanOptions>(toml_str).is_err());
    }
}
