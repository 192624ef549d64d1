//! Benchmark for category membership lookups.
//!
//! Run with: cargo bench --package linktip_core --bench membership_benchmark

use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use linktip_core::{CategoryIndex, MemoryWiki, OnDemandIndex, PrecomputedIndex};
use linktip_shared::Namespace;

fn create_test_wiki() -> MemoryWiki {
    let mut wiki = MemoryWiki::new();

    // 20 subcategories under Root, 100 pages each
    for sub in 0..20u32 {
        wiki.categorize(&format!("Category:Sub {sub}"), "Root");
        for page in 0..100u32 {
            wiki.categorize(&format!("Page {sub}-{page}"), &format!("Sub {sub}"));
        }
    }
    for page in 0..1000u32 {
        wiki.add_page(&format!("Outside {page}"), "");
    }

    wiki
}

fn eligible() -> BTreeSet<Namespace> {
    [Namespace::MAIN].into_iter().collect()
}

fn benchmark_precomputed_build(c: &mut Criterion) {
    let wiki = create_test_wiki();

    c.bench_function("precomputed_build_2000_pages", |b| {
        b.iter(|| black_box(PrecomputedIndex::build(&wiki, "Root", &eligible())));
    });
}

fn benchmark_precomputed_lookup(c: &mut Criterion) {
    let wiki = create_test_wiki();
    let index = CategoryIndex::Precomputed(
        PrecomputedIndex::build(&wiki, "Root", &eligible()).unwrap_or_default(),
    );

    c.bench_function("precomputed_lookup", |b| {
        let mut id = 0u32;
        b.iter(|| {
            id = (id + 7) % 3100;
            black_box(index.is_member(id).ok())
        });
    });
}

fn benchmark_on_demand_lookup(c: &mut Criterion) {
    let wiki = create_test_wiki();
    let index = CategoryIndex::OnDemand(OnDemandIndex::new(&wiki, "Root"));

    c.bench_function("on_demand_lookup_memoized", |b| {
        let mut id = 0u32;
        b.iter(|| {
            id = (id + 7) % 3100;
            black_box(index.is_member(id).ok())
        });
    });
}

criterion_group!(
    benches,
    benchmark_precomputed_build,
    benchmark_precomputed_lookup,
    benchmark_on_demand_lookup
);
criterion_main!(benches);
