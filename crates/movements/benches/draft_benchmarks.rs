use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use farmastock_catalog::{CatalogIndex, CatalogProduct};
use farmastock_core::{Money, ProductId};
use farmastock_draft::{MovementDraft, MovementKind, RejectedLine};
use farmastock_movements::rejected_in_draft;

fn catalog(size: i64) -> Vec<CatalogProduct> {
    (1..=size)
        .map(|id| CatalogProduct {
            id: ProductId::new(id),
            name: format!("product {id} ibuprofeno"),
            description: format!("presentation {id}"),
            price: Money::from_cents(100 + id as u64),
            stock: 50,
        })
        .collect()
}

fn bench_catalog_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog_filter");
    for size in [100i64, 1_000, 10_000] {
        let index = CatalogIndex::new(catalog(size));
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &index, |b, index| {
            b.iter(|| black_box(index.filter(black_box("ibupro"))));
        });
    }
    group.finish();
}

fn bench_reconciliation(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    for lines in [10usize, 100, 500] {
        let mut draft = MovementDraft::new(MovementKind::Sale);
        draft.add_products(&catalog(lines as i64)).unwrap();
        let draft_ids = draft.product_ids();

        // Every third product rejected, half of them no longer in the draft.
        let rejected: Vec<RejectedLine> = (1..=(lines as i64 * 2))
            .step_by(3)
            .map(|id| RejectedLine {
                product_id: ProductId::new(id),
                reason: "insufficient stock".to_string(),
            })
            .collect();

        group.throughput(Throughput::Elements(lines as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(lines),
            &(draft_ids, rejected),
            |b, (draft_ids, rejected)| {
                b.iter(|| black_box(rejected_in_draft(draft_ids, rejected)));
            },
        );
    }
    group.finish();
}

fn bench_total_recompute(c: &mut Criterion) {
    let mut draft = MovementDraft::new(MovementKind::Sale);
    draft.add_products(&catalog(200)).unwrap();

    c.bench_function("sale_total_200_lines", |b| {
        b.iter(|| black_box(draft.total()));
    });
}

criterion_group!(
    benches,
    bench_catalog_filter,
    bench_reconciliation,
    bench_total_recompute
);
criterion_main!(benches);
