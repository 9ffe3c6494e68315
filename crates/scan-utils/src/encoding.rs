//! Character encoding detection for text read back from disk.

/// Detect encoding from a byte string and decode to UTF-8.
/// Tries BOM detection first, then strict UTF-8, then Windows-1252.
pub fn decode_to_utf8(bytes: &[u8]) -> (String, &'static str) {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return (String::from_utf8_lossy(&bytes[3..]).to_string(), "UTF-8");
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        let (result, _, _) = encoding_rs::UTF_16LE.decode(bytes);
        return (result.to_string(), "UTF-16LE");
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let (result, _, _) = encoding_rs::UTF_16BE.decode(bytes);
        return (result.to_string(), "UTF-16BE");
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => (s.to_string(), "UTF-8"),
        Err(_) => {
            let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            (result.to_string(), "Windows-1252")
        }
    }
}

/// Read a text file, decoding it with [`decode_to_utf8`].
pub fn read_text_file(path: &std::path::Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    let (text, encoding) = decode_to_utf8(&bytes);
    if encoding != "UTF-8" {
        log::debug!("Decoded {} as {}", path.display(), encoding);
    }
    Ok(text)
}
