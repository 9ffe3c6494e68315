//! OCR engines for page images.

pub mod tesseract;

pub use tesseract::TesseractEngine;
