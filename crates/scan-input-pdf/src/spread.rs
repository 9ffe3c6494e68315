//! Cutting a scanned double-page spread into its left and right pages.

use std::path::Path;

use image::{DynamicImage, ImageFormat};

use scan_core::book::{PageImage, PageSide};
use scan_core::error::{Result, ScanError};
use scan_core::layout::page_image_name;

/// Widths of the left and right halves of a spread `width` pixels wide.
/// The left half gets `floor(width / 2)`, the right half the remainder.
pub fn split_widths(width: u32) -> (u32, u32) {
    let left = width / 2;
    (left, width - left)
}

/// Split a spread at its horizontal midpoint. Both halves keep the full height.
pub fn split_spread(image: &DynamicImage) -> Result<(DynamicImage, DynamicImage)> {
    let (width, height) = (image.width(), image.height());
    if width < 2 || height == 0 {
        return Err(ScanError::Image(format!(
            "Cannot split a {}x{} image into two pages",
            width, height
        )));
    }

    let (left_w, right_w) = split_widths(width);
    let left = image.crop_imm(0, 0, left_w, height);
    let right = image.crop_imm(left_w, 0, right_w, height);
    Ok((left, right))
}

/// Decode one rendered spread, split it, and save both halves as
/// `page_<first_number>.png` and `page_<first_number + 1>.png`.
pub fn write_spread_pages(
    data: &[u8],
    source_page: u32,
    first_number: u32,
    image_dir: &Path,
) -> Result<[PageImage; 2]> {
    let spread = image::load_from_memory(data).map_err(|e| {
        ScanError::Image(format!("Failed to decode rendered page {}: {}", source_page, e))
    })?;

    let (left, right) = split_spread(&spread)?;

    let left_page = save_page(&left, source_page, first_number, PageSide::Left, image_dir)?;
    let right_page = save_page(&right, source_page, first_number + 1, PageSide::Right, image_dir)?;
    Ok([left_page, right_page])
}

fn save_page(
    image: &DynamicImage,
    source_page: u32,
    number: u32,
    side: PageSide,
    image_dir: &Path,
) -> Result<PageImage> {
    let path = image_dir.join(page_image_name(number));
    image
        .save_with_format(&path, ImageFormat::Png)
        .map_err(|e| ScanError::Image(format!("Failed to save {}: {}", path.display(), e)))?;

    Ok(PageImage {
        number,
        source_page,
        side,
        width: image.width(),
        height: image.height(),
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    /// Spread whose left half is black and right half is white.
    fn two_tone(width: u32, height: u32) -> DynamicImage {
        let left_w = width / 2;
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, _| {
            if x < left_w {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        }))
    }

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_split_widths() {
        assert_eq!(split_widths(100), (50, 50));
        assert_eq!(split_widths(101), (50, 51));
        assert_eq!(split_widths(2), (1, 1));
    }

    #[test]
    fn test_split_spread_odd_width() {
        let (left, right) = split_spread(&two_tone(11, 4)).unwrap();
        assert_eq!((left.width(), left.height()), (5, 4));
        assert_eq!((right.width(), right.height()), (6, 4));

        assert!(left.to_rgb8().pixels().all(|p| p.0 == [0, 0, 0]));
        assert!(right.to_rgb8().pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn test_split_spread_too_narrow() {
        let narrow = DynamicImage::new_rgb8(1, 10);
        assert!(matches!(split_spread(&narrow), Err(ScanError::Image(_))));
    }

    #[test]
    fn test_write_spread_pages() {
        let dir = tempfile::TempDir::new().unwrap();
        let data = png_bytes(&two_tone(20, 8));

        let [left, right] = write_spread_pages(&data, 3, 5, dir.path()).unwrap();

        assert_eq!(left.number, 5);
        assert_eq!(left.side, PageSide::Left);
        assert_eq!(left.source_page, 3);
        assert_eq!(left.path, dir.path().join("page_5.png"));
        assert_eq!(right.number, 6);
        assert_eq!(right.side, PageSide::Right);
        assert_eq!((right.width, right.height), (10, 8));

        let reloaded = image::open(&right.path).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (10, 8));
    }

    #[test]
    fn test_write_spread_pages_bad_data() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = write_spread_pages(b"not an image", 1, 1, dir.path()).unwrap_err();
        assert!(err.to_string().contains("rendered page 1"));
    }
}
