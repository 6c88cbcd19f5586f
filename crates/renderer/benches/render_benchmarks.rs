//! Benchmarks for class overlay rendering.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use landcover_common::ClassMapping;
use rand::Rng;
use renderer::{colorize_classes, png, render_class_overlay, ClassGrid};

/// Random class ids 0..=5 with roughly 10% no-data.
fn generate_class_grid(width: usize, height: usize) -> Vec<i32> {
    let mut rng = rand::thread_rng();
    (0..width * height)
        .map(|_| if rng.gen_bool(0.1) { 255 } else { rng.gen_range(0..=5) })
        .collect()
}

fn bench_colorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("colorize_classes");
    let mapping = ClassMapping::default();

    for (width, height) in [(256, 256), (1024, 1024), (2048, 2048)] {
        let values = generate_class_grid(width, height);
        group.throughput(Throughput::Elements((width * height) as u64));

        group.bench_with_input(
            BenchmarkId::new("rgba", format!("{}x{}", width, height)),
            &values,
            |b, values| {
                let grid = ClassGrid::new(values, width, height, None);
                b.iter(|| colorize_classes(black_box(&grid), &mapping));
            },
        );
    }

    group.finish();
}

fn bench_overlay(c: &mut Criterion) {
    let mut group = c.benchmark_group("class_overlay");
    let mapping = ClassMapping::default();

    for (width, height) in [(256, 256), (1024, 1024)] {
        let values = generate_class_grid(width, height);
        group.throughput(Throughput::Elements((width * height) as u64));

        group.bench_with_input(
            BenchmarkId::new("data_uri", format!("{}x{}", width, height)),
            &values,
            |b, values| {
                let grid = ClassGrid::new(values, width, height, None);
                b.iter(|| render_class_overlay(black_box(&grid), &mapping));
            },
        );

        // Indexed vs forced RGBA on the same colorized buffer
        let grid = ClassGrid::new(&values, width, height, None);
        if let Ok(rgba) = colorize_classes(&grid, &mapping) {
            group.bench_with_input(
                BenchmarkId::new("png_auto", format!("{}x{}", width, height)),
                &rgba,
                |b, rgba| b.iter(|| png::create_png_auto(black_box(rgba), width, height)),
            );
            group.bench_with_input(
                BenchmarkId::new("png_rgba", format!("{}x{}", width, height)),
                &rgba,
                |b, rgba| b.iter(|| png::create_png(black_box(rgba), width, height)),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_colorize, bench_overlay);
criterion_main!(benches);
