//! Benchmarks for cached and uncached transformation calls

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fieldmap_core::{get_compatibility_level, SourceFieldType, TargetFieldType, TransformationCache, TransformationRegistry};
use serde_json::{json, Value};

fn rich_text(blocks: usize) -> Value {
    Value::Array(
        (0..blocks)
            .map(|i| json!({"plain_text": format!("block {i} "), "annotations": {"bold": i % 2 == 0}}))
            .collect(),
    )
}

fn bench_transformations(c: &mut Criterion) {
    let registry = TransformationRegistry::with_built_ins().unwrap();
    let html = registry.get_transformation("richText-to-html").unwrap();

    let mut group = c.benchmark_group("richText-to-html");
    for blocks in [1usize, 10, 100] {
        let value = rich_text(blocks);
        group.bench_with_input(BenchmarkId::new("uncached", blocks), &value, |b, v| {
            b.iter(|| html.apply(black_box(v)).unwrap())
        });
        let mut cache = TransformationCache::new();
        group.bench_with_input(BenchmarkId::new("cached", blocks), &value, |b, v| {
            b.iter(|| cache.get_or_compute(html, black_box(v)).unwrap())
        });
    }
    group.finish();
}

fn bench_compatibility(c: &mut Criterion) {
    c.bench_function("compatibility_full_matrix", |b| {
        b.iter(|| {
            let mut direct = 0;
            for source in SourceFieldType::ALL {
                for target in TargetFieldType::ALL {
                    if get_compatibility_level(black_box(source), black_box(target)).is_direct() {
                        direct += 1;
                    }
                }
            }
            direct
        })
    });
}

criterion_group!(benches, bench_transformations, bench_compatibility);
criterion_main!(benches);
