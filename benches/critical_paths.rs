//! Criterion benchmarks for sprite565 critical paths
//!
//! Benchmarks the per-pixel stages of the pipeline:
//! - Background: border flood fill
//! - Key: collision-free key selection over a group
//! - Encode: RGBA to RGB565 tables
//! - Emit: header text generation

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use image::{Rgba, RgbaImage};
use sprite565::background::{remove_background, DEFAULT_TOLERANCE};
use sprite565::emit::{HeaderEmitter, SingleImage};
use sprite565::encode::encode_image;
use sprite565::key::{select_key, DEFAULT_KEY_CANDIDATES};

// =============================================================================
// Test Data Generators
// =============================================================================

/// White canvas with a colorful disc in the middle
fn make_sprite_on_white(size: u32) -> RgbaImage {
    let center = size as i64 / 2;
    let radius = size as i64 / 3;
    RgbaImage::from_fn(size, size, |x, y| {
        let (dx, dy) = (x as i64 - center, y as i64 - center);
        if dx * dx + dy * dy <= radius * radius {
            Rgba([(x * 7 % 256) as u8, (y * 5 % 256) as u8, 40, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    })
}

/// Frames whose opaque colors cover most of the key candidates
fn make_crowded_frames(count: usize, size: u32) -> Vec<RgbaImage> {
    (0..count)
        .map(|i| {
            let taken = DEFAULT_KEY_CANDIDATES[i % (DEFAULT_KEY_CANDIDATES.len() - 1)].unpack();
            RgbaImage::from_fn(size, size, |x, y| {
                if (x + y) % 2 == 0 {
                    Rgba([taken.r, taken.g, taken.b, 255])
                } else {
                    Rgba([(x % 256) as u8, (y % 256) as u8, i as u8, 255])
                }
            })
        })
        .collect()
}

// =============================================================================
// Background Benchmarks
// =============================================================================

fn bench_background(c: &mut Criterion) {
    let mut group = c.benchmark_group("background");

    for size in [16, 64, 128, 240].iter() {
        let image = make_sprite_on_white(*size);

        group.throughput(Throughput::Elements((*size * *size) as u64));
        group.bench_with_input(
            BenchmarkId::new("remove_background", format!("{}x{}", size, size)),
            &image,
            |b, image| {
                b.iter_batched(
                    || image.clone(),
                    |mut image| remove_background(black_box(&mut image), DEFAULT_TOLERANCE),
                    BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

// =============================================================================
// Key Selection Benchmarks
// =============================================================================

fn bench_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("key");

    for count in [1, 8, 32].iter() {
        let frames = make_crowded_frames(*count, 64);

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("select_key", count), &frames, |b, frames| {
            b.iter(|| select_key(black_box(frames.iter()), &DEFAULT_KEY_CANDIDATES, 0))
        });
    }

    group.finish();
}

// =============================================================================
// Encode and Emit Benchmarks
// =============================================================================

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for size in [16, 64, 240].iter() {
        let mut image = make_sprite_on_white(*size);
        remove_background(&mut image, DEFAULT_TOLERANCE);
        let key = select_key([&image], &DEFAULT_KEY_CANDIDATES, 0);

        group.throughput(Throughput::Elements((*size * *size) as u64));
        group.bench_with_input(
            BenchmarkId::new("encode_image", format!("{}x{}", size, size)),
            &image,
            |b, image| b.iter(|| encode_image(black_box(image), key, 0)),
        );

        let encoded = encode_image(&image, key, 0);
        let emitter = HeaderEmitter::new();
        group.bench_with_input(
            BenchmarkId::new("single_header", format!("{}x{}", size, size)),
            &encoded,
            |b, encoded| {
                b.iter(|| {
                    emitter.single_header(black_box(&SingleImage {
                        name: "bench",
                        width: encoded.width,
                        height: encoded.height,
                        pixels: &encoded.pixels,
                        key,
                        trim: None,
                        collision: encoded.collision,
                    }))
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_background, bench_key, bench_encode);

criterion_main!(benches);
