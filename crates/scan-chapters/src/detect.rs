//! Chapter heading recognition.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use scan_core::error::{Result, ScanError};
use scan_core::options::{ScanOptions, DEFAULT_CHAPTER_REGEX};

static DEFAULT_HEADING: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(DEFAULT_CHAPTER_REGEX)
        .case_insensitive(true)
        .build()
        .unwrap()
});

const DEFAULT_SCAN_LINES: usize = 5;

/// A heading line found near the top of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// 0-based line index within the page text.
    pub line: usize,
    /// Chapter number as written, e.g. `"12"`.
    pub number: String,
}

/// Case-insensitive heading pattern plus how many leading lines to inspect.
#[derive(Debug, Clone)]
pub struct ChapterPattern {
    regex: Regex,
    scan_lines: usize,
}

impl Default for ChapterPattern {
    fn default() -> Self {
        Self {
            regex: DEFAULT_HEADING.clone(),
            scan_lines: DEFAULT_SCAN_LINES,
        }
    }
}

impl ChapterPattern {
    /// Compile `pattern` case-insensitively. The first capture group is the
    /// chapter number, so the pattern must have one.
    pub fn new(pattern: &str, scan_lines: usize) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ScanError::Config(format!("Invalid chapter regex '{}': {}", pattern, e)))?;

        if regex.captures_len() < 2 {
            return Err(ScanError::Config(format!(
                "Chapter regex '{}' needs a capture group for the chapter number",
                pattern
            )));
        }

        Ok(Self { regex, scan_lines })
    }

    pub fn from_options(options: &ScanOptions) -> Result<Self> {
        if options.chapter_regex == DEFAULT_CHAPTER_REGEX
            && options.heading_scan_lines == DEFAULT_SCAN_LINES
        {
            return Ok(Self::default());
        }
        Self::new(&options.chapter_regex, options.heading_scan_lines)
    }

    /// First heading among the first `scan_lines` lines of `text`.
    pub fn find_opening(&self, text: &str) -> Option<Heading> {
        text.lines()
            .take(self.scan_lines)
            .enumerate()
            .find_map(|(line, content)| {
                self.regex.captures(content).and_then(|caps| {
                    caps.get(1).map(|m| Heading {
                        line,
                        number: m.as_str().to_string(),
                    })
                })
            })
    }
}
