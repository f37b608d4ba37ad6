use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use std::collections::HashMap;

use webrouter::Route;

fn simple_pattern_compile_benchmark(c: &mut Criterion) {
    c.bench_function("simple_pattern_compile", |b| {
        b.iter(|| {
            let _ = Route::new(black_box("/news/(:id)")).unwrap();
        });
    });
}

fn complex_pattern_compile_benchmark(c: &mut Criterion) {
    let requirements: HashMap<String, String> =
        [("1".to_string(), "id".to_string())].into_iter().collect();

    c.bench_function("complex_pattern_compile", |b| {
        b.iter(|| {
            let _ = Route::with_requirements(
                black_box("/:module/:controller/(:id)/:action"),
                requirements.clone(),
            )
            .unwrap();
        });
    });
}

fn pattern_kind_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_compile_kind");

    let patterns = [
        ("static", "/about/contact"),
        ("named", "/:module/:action"),
        ("macro", "/news/(:id)/(:year)"),
        ("mixed", "/:module/archive/(:year)/:action"),
    ];

    for (name, pattern) in patterns.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(name), pattern, |b, pattern| {
            b.iter(|| {
                let _ = Route::new(black_box(pattern)).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    simple_pattern_compile_benchmark,
    complex_pattern_compile_benchmark,
    pattern_kind_benchmark
);
criterion_main!(benches);
