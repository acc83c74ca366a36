use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use fbref_stats::catalog::Category;
use fbref_stats::html_table::{parse_document, parse_table};
use fbref_stats::ingest::merged_category;
use fbref_stats::normalize::normalize_table;

const LEAGUE_PAGE: &str = include_str!("../tests/fixtures/la_liga_stats.html");

fn bench_table_parse(c: &mut Criterion) {
    c.bench_function("table_parse_normalize", |b| {
        b.iter(|| {
            let table = parse_table(black_box(LEAGUE_PAGE), "stats_squads_shooting_for").unwrap();
            let records = normalize_table(&table).unwrap();
            black_box(records.len());
        })
    });
}

fn bench_category_merge(c: &mut Criterion) {
    let document = parse_document(LEAGUE_PAGE);
    c.bench_function("category_merge", |b| {
        b.iter(|| {
            let merged = merged_category(&document, black_box(Category::Standard), "2025-2026").unwrap();
            black_box(merged.len());
        })
    });
}

criterion_group!(benches, bench_table_parse, bench_category_merge);
criterion_main!(benches);
