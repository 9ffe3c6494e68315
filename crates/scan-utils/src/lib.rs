//! Shared helpers: archive extraction, text decoding, and directory listing.

pub mod archive;
pub mod encoding;
pub mod files;
