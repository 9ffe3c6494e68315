//! Cutting an ordered corpus of page texts at chapter openings.

use crate::detect::ChapterPattern;

/// One page's text and the file name it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub name: String,
    pub text: String,
}

impl SourceText {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// A detected chapter and its full text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub number: String,
    /// Name of the file holding the heading.
    pub first_file: String,
    /// Name of the last file in the chapter's span.
    pub last_file: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterSplit {
    /// Text before the first heading; empty when the corpus opens with one.
    pub front_matter: String,
    pub chapters: Vec<Chapter>,
}

/// Position of a chapter opening in the corpus.
struct Opening {
    file: usize,
    line: usize,
    number: String,
}

/// Split `files` (already in reading order) into chapters.
///
/// Each file may open at most one chapter. A chapter runs from its heading
/// line to the line before the next opening, or to the end of the corpus.
pub fn split_chapters(files: &[SourceText], pattern: &ChapterPattern) -> ChapterSplit {
    // Tesseract ends every page with a form feed
    let cleaned: Vec<String> = files.iter().map(|f| f.text.replace('\u{c}', "")).collect();
    let lines: Vec<Vec<&str>> = cleaned.iter().map(|t| t.lines().collect()).collect();

    let openings: Vec<Opening> = cleaned
        .iter()
        .enumerate()
        .filter_map(|(file, text)| {
            pattern.find_opening(text).map(|h| Opening {
                file,
                line: h.line,
                number: h.number,
            })
        })
        .collect();

    let corpus_end = (lines.len(), 0);
    let front_end = openings
        .first()
        .map(|o| (o.file, o.line))
        .unwrap_or(corpus_end);
    let front_matter = join_span(&lines, (0, 0), front_end);

    let chapters = openings
        .iter()
        .enumerate()
        .map(|(i, opening)| {
            let end = openings
                .get(i + 1)
                .map(|next| (next.file, next.line))
                .unwrap_or(corpus_end);
            let last = if end.1 > 0 { end.0 } else { end.0 - 1 };
            Chapter {
                number: opening.number.clone(),
                first_file: files[opening.file].name.clone(),
                last_file: files[last].name.clone(),
                text: join_span(&lines, (opening.file, opening.line), end),
            }
        })
        .collect();

    ChapterSplit {
        front_matter,
        chapters,
    }
}

/// Lines from `start` (inclusive) to `end` (exclusive), both `(file, line)`,
/// joined with newlines. Empty when the span is empty.
fn join_span(lines: &[Vec<&str>], start: (usize, usize), end: (usize, usize)) -> String {
    let mut out = String::new();
    for (file, file_lines) in lines.iter().enumerate().take(end.0 + 1).skip(start.0) {
        let from = if file == start.0 { start.1 } else { 0 };
        let to = if file == end.0 { end.1 } else { file_lines.len() };
        for line in file_lines.iter().take(to).skip(from) {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
