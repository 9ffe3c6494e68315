//! PDF page source: renders a scanned spread PDF and cuts it into pages.

pub mod render;
pub mod select;
pub mod spread;

use std::collections::BTreeMap;
use std::path::Path;

use rayon::prelude::*;

use scan_core::book::PageImage;
use scan_core::error::{Result, ScanError};
use scan_core::options::ScanOptions;
use scan_core::plugin::PageSource;

pub struct PdfSpreadSource;

impl PageSource for PdfSpreadSource {
    fn name(&self) -> &str {
        "PDF Spread"
    }

    fn extract(
        &self,
        input: &Path,
        image_dir: &Path,
        options: &ScanOptions,
    ) -> Result<Vec<PageImage>> {
        log::info!("Reading PDF: {}", input.display());

        let total = render::page_count(input)?;
        if total == 0 {
            return Err(ScanError::Pdf(format!("{} has no pages", input.display())));
        }

        let kept = select::kept_page_numbers(total);
        log::info!(
            "PDF has {} pages, keeping {} spread(s)",
            total,
            kept.len()
        );

        let rendered = render::render_pages(input, &kept, total, options)?;
        split_rendered(&rendered, &kept, image_dir)
    }
}

/// Split each rendered spread in `kept` order into two numbered page images.
///
/// The spread at position `k` of `kept` becomes pages `2k + 1` (left) and
/// `2k + 2` (right).
pub fn split_rendered(
    rendered: &BTreeMap<u32, Vec<u8>>,
    kept: &[u32],
    image_dir: &Path,
) -> Result<Vec<PageImage>> {
    std::fs::create_dir_all(image_dir)?;

    let spreads: Vec<Result<[PageImage; 2]>> = kept
        .par_iter()
        .enumerate()
        .map(|(k, &page)| {
            let data = rendered.get(&page).ok_or_else(|| {
                ScanError::Render(format!("No rendered image for page {}", page))
            })?;
            spread::write_spread_pages(data, page, 2 * k as u32 + 1, image_dir)
        })
        .collect();

    let mut pages = Vec::with_capacity(kept.len() * 2);
    for spread in spreads {
        pages.extend(spread?);
    }
    Ok(pages)
}
