//! Which rendered PDF pages hold scanned spreads worth keeping.
//!
//! Scans of a bound book come out as: a single cover page, then spreads
//! where every odd interior page repeats part of its neighbour, then a
//! single back page. The first page, the last page, and the even-indexed
//! interior pages are kept.

/// Whether the page at 0-based `index` of `total` pages is kept.
pub fn should_keep(index: usize, total: usize) -> bool {
    if index >= total {
        return false;
    }
    if index == 0 || index == total - 1 {
        return true;
    }
    index % 2 == 0
}

/// 1-based page numbers to keep for a document of `total` pages, ascending.
pub fn kept_page_numbers(total: u32) -> Vec<u32> {
    (0..total as usize)
        .filter(|&i| should_keep(i, total as usize))
        .map(|i| i as u32 + 1)
        .collect()
}
