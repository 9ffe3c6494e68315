//! Directory listing in natural filename order.

use std::cmp::Ordering;
use std::io;
use std::path::{Path, PathBuf};

/// List the regular files in `dir` with the given extension (case-insensitive),
/// sorted by [`natural_cmp`] on the file name.
pub fn list_files_with_extension(dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compare two names so that runs of ASCII digits compare by numeric value.
///
/// `page_2.txt` sorts before `page_10.txt`. Equal numeric values with a
/// different number of leading zeros fall back to the shorter run first.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.as_bytes();
    let mut b = b.as_bytes();

    loop {
        match (a.first(), b.first()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let (run_a, rest_a) = split_digits(a);
                let (run_b, rest_b) = split_digits(b);
                let ord = cmp_digit_runs(run_a, run_b);
                if ord != Ordering::Equal {
                    return ord;
                }
                a = rest_a;
                b = rest_b;
            }
            (Some(x), Some(y)) => {
                let ord = x.cmp(y);
                if ord != Ordering::Equal {
                    return ord;
                }
                a = &a[1..];
                b = &b[1..];
            }
        }
    }
}

fn split_digits(s: &[u8]) -> (&[u8], &[u8]) {
    let end = s.iter().position(|c| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn cmp_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let trim = |s: &[u8]| -> usize { s.iter().take_while(|&&c| c == b'0').count() };
    let a_sig = &a[trim(a)..];
    let b_sig = &b[trim(b)..];
    a_sig
        .len()
        .cmp(&b_sig.len())
        .then_with(|| a_sig.cmp(b_sig))
        .then_with(|| a.len().cmp(&b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_cmp_numeric_runs() {
        assert_eq!(natural_cmp("page_2.txt", "page_10.txt"), Ordering::Less);
        assert_eq!(natural_cmp("page_10.txt", "page_9.txt"), Ordering::Greater);
        assert_eq!(natural_cmp("page_3.txt", "page_3.txt"), Ordering::Equal);
    }

    #[test]
    fn test_natural_cmp_leading_zeros() {
        assert_eq!(natural_cmp("page_02", "page_2"), Ordering::Greater);
        assert_eq!(natural_cmp("page_02", "page_3"), Ordering::Less);
    }

    #[test]
    fn test_natural_cmp_text() {
        assert_eq!(natural_cmp("a", "b"), Ordering::Less);
        assert_eq!(natural_cmp("page", "page_1"), Ordering::Less);
    }

    #[test]
    fn test_list_files_sorted_and_filtered() {
        let dir = tempfile::TempDir::new().unwrap();
        for name in ["page_10.txt", "page_2.txt", "page_1.TXT", "notes.md"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.txt")).unwrap();

        let files = list_files_with_extension(dir.path(), "txt").unwrap();
        let names: Vec<String> = files.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["page_1.TXT", "page_2.txt", "page_10.txt"]);
    }
}
