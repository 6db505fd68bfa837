//! Benchmarks for tokenizing.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use codeframe::highlight::{LanguageTag, tokenize};

fn bench_tokenize_simple(c: &mut Criterion) {
    let code = "fn main() {\n    println!(\"hello\");\n}\n";
    let language = LanguageTag::new("rust");
    c.bench_function("tokenize_simple", |b| {
        b.iter(|| tokenize(black_box(code), &language))
    });
}

fn bench_tokenize_own_source(c: &mut Criterion) {
    let code = include_str!("../src/layout/mod.rs");
    let language = LanguageTag::new("rust");
    c.bench_function("tokenize_layout_source", |b| {
        b.iter(|| tokenize(black_box(code), &language))
    });
}

fn bench_tokenize_plain(c: &mut Criterion) {
    let code = include_str!("../src/layout/mod.rs");
    let language = LanguageTag::plain();
    c.bench_function("tokenize_plain", |b| {
        b.iter(|| tokenize(black_box(code), &language))
    });
}

criterion_group!(
    benches,
    bench_tokenize_simple,
    bench_tokenize_own_source,
    bench_tokenize_plain
);
criterion_main!(benches);
