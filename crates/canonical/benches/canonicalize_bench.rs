use canonical::{canonicalize, CanonicalizeConfig, Cell, Notebook};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn synthetic_notebook(cells: usize) -> Notebook {
    let cells = (0..cells)
        .map(|i| {
            Cell::code(format!(
                "# Estimation: metric_{i}: {i}.5\ndef step_{i}(x):\n    return x * {i}\n"
            ))
        })
        .collect();
    Notebook::new(cells)
}

fn bench_canonicalize(c: &mut Criterion) {
    let config = CanonicalizeConfig::default();
    let mut group = c.benchmark_group("canonicalize");

    for size in [8usize, 64, 512].iter() {
        let notebook = synthetic_notebook(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("cells_{size}"), |b| {
            b.iter(|| canonicalize(black_box(&notebook), black_box(&config)).expect("canonicalize"))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_canonicalize);
criterion_main!(benches);
