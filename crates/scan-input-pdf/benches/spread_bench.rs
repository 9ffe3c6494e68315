//! Benchmarks for spread splitting and page selection.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use image::{DynamicImage, Rgb, RgbImage};

use scan_input_pdf::select::kept_page_numbers;
use scan_input_pdf::spread::split_spread;

fn make_spread(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        let v = ((x ^ y) & 0xff) as u8;
        Rgb([v, v, v])
    }))
}

fn bench_split_spread(c: &mut Criterion) {
    // A4 spread at 200 DPI
    let spread = make_spread(3308, 2339);
    c.bench_function("split_spread_200dpi", |b| {
        b.iter(|| split_spread(black_box(&spread)).unwrap())
    });
}

fn bench_page_selection(c: &mut Criterion) {
    c.bench_function("kept_page_numbers_1000", |b| {
        b.iter(|| kept_page_numbers(black_box(1000)))
    });
}

criterion_group!(benches, bench_split_spread, bench_page_selection);
criterion_main!(benches);
