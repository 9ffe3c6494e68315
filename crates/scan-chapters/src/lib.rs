//! Chapter detection over per-page OCR text.
//!
//! Page text files are read in reading order, which for a folder is natural
//! filename order. A file opens a
//! chapter when one of its first few lines looks like `Chapter 12`; the
//! chapter then runs up to the line before the next opening.

pub mod detect;
pub mod split;
pub mod writer;

pub use detect::{ChapterPattern, Heading};
pub use split::{split_chapters, Chapter, ChapterSplit, SourceText};
pub use writer::{page_texts, ChapterOutput};
