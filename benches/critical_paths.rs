//! Criterion benchmarks for chrtool critical paths
//!
//! Benchmarks the core performance-critical operations:
//! - Tile: single tile pack/unpack
//! - Sheet: whole image to CHR and back
//! - Render: indices through a display palette to RGBA
//! - Tile text: parsing the text notation

use chrtool::indexed_png::render_rgba;
use chrtool::palette::DisplayPalette;
use chrtool::sheet::{image_to_sheet, sheet_to_image, IndexedImage, TruncationPolicy};
use chrtool::tile::{decode, encode, PackedTile, Tile};
use chrtool::tile_text::{format_tile, parse_sheet};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// =============================================================================
// Test Data Generators
// =============================================================================

/// Image of the given size filled with a diagonal 0-3 pattern
fn make_image(width: u32, height: u32) -> IndexedImage {
    let mut image = IndexedImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            image.set(x, y, ((x + y) % 4) as u8);
        }
    }
    image
}

fn make_tile() -> Tile {
    let mut rows = [[0u8; 8]; 8];
    for (y, row) in rows.iter_mut().enumerate() {
        for (x, value) in row.iter_mut().enumerate() {
            *value = ((x * 3 + y) % 4) as u8;
        }
    }
    Tile::new(rows).unwrap_or(Tile::BLANK)
}

/// Tile text for `count` tiles
fn make_tile_text(count: usize) -> String {
    let tile = format_tile(&make_tile());
    (0..count).map(|i| format!("# ${:02X}\n{}", i, tile)).collect()
}

// =============================================================================
// Tile Benchmarks
// =============================================================================

fn bench_tile(c: &mut Criterion) {
    let mut group = c.benchmark_group("tile");
    let tile = make_tile();
    let packed: PackedTile = encode(&tile);

    group.bench_function("encode", |b| b.iter(|| encode(black_box(&tile))));
    group.bench_function("decode", |b| b.iter(|| decode(black_box(&packed))));

    group.finish();
}

// =============================================================================
// Sheet Benchmarks
// =============================================================================

fn bench_sheet(c: &mut Criterion) {
    let mut group = c.benchmark_group("sheet");

    // 1 bank, 1 pattern table, 8 KiB CHR ROM
    for (width, height) in [(128u32, 32u32), (128, 128), (128, 256)] {
        let image = make_image(width, height);
        let tiles = image.tile_count() as u64;
        let sheet = image_to_sheet(&image).unwrap_or_default();
        let label = format!("{}x{}", width, height);

        group.throughput(Throughput::Elements(tiles));
        group.bench_with_input(BenchmarkId::new("image_to_sheet", &label), &image, |b, image| {
            b.iter(|| image_to_sheet(black_box(image)))
        });
        group.bench_with_input(BenchmarkId::new("sheet_to_image", &label), &sheet, |b, sheet| {
            b.iter(|| sheet_to_image(black_box(sheet), 16, TruncationPolicy::Truncate))
        });
    }

    group.finish();
}

// =============================================================================
// Render Benchmarks
// =============================================================================

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let image = make_image(128, 256);
    let palette = DisplayPalette::from_nes_indices([0x0F, 0x29, 0x19, 0x09]);

    group.throughput(Throughput::Elements(128 * 256));
    group.bench_function("render_rgba_128x256", |b| {
        b.iter(|| render_rgba(black_box(&image), black_box(&palette)))
    });

    group.finish();
}

// =============================================================================
// Tile Text Benchmarks
// =============================================================================

fn bench_tile_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("tile_text");

    for count in [16usize, 256].iter() {
        let text = make_tile_text(*count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("parse_sheet", count), &text, |b, text| {
            b.iter(|| parse_sheet(black_box(text)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tile, bench_sheet, bench_render, bench_tile_text);
criterion_main!(benches);
