//! Chunking benchmarks over representative documents.

#![allow(missing_docs)]

use criterion::{Criterion, criterion_group, criterion_main};
use mdchunk_rs::{ChunkConfig, analyze, chunk};
use std::hint::black_box;

fn prose_document(paragraphs: usize) -> String {
    "A reasonably sized paragraph of running prose for benchmarks. \
     It has several sentences. Each one ends with a period.\n\n"
        .repeat(paragraphs)
}

fn mixed_document(sections: usize) -> String {
    let mut doc = String::from("# Benchmark Document\n\nIntro paragraph.\n\n");
    for i in 0..sections {
        doc.push_str(&format!(
            "## Section {i}\n\nSome prose for the section body here.\n\n\
             ```rust\nfn section_{i}() -> usize {{\n    {i}\n}}\n```\n\n\
             | col a | col b |\n|-------|-------|\n| {i}     | {i}     |\n\n\
             - item one\n- item two\n\n"
        ));
    }
    doc
}

fn bench_analyze(c: &mut Criterion) {
    let doc = mixed_document(50);
    c.bench_function("analyze_mixed_50_sections", |b| {
        b.iter(|| analyze(black_box(&doc)));
    });
}

fn bench_chunk_prose(c: &mut Criterion) {
    let doc = prose_document(200);
    let config = ChunkConfig::default();
    c.bench_function("chunk_prose_200_paragraphs", |b| {
        b.iter(|| chunk(black_box(&doc), &config));
    });
}

fn bench_chunk_mixed(c: &mut Criterion) {
    let doc = mixed_document(50);
    let config = ChunkConfig::default();
    c.bench_function("chunk_mixed_50_sections", |b| {
        b.iter(|| chunk(black_box(&doc), &config));
    });
}

fn bench_chunk_no_overlap(c: &mut Criterion) {
    let doc = mixed_document(50);
    let config = ChunkConfig::new().enable_overlap(false);
    c.bench_function("chunk_mixed_no_overlap", |b| {
        b.iter(|| chunk(black_box(&doc), &config));
    });
}

criterion_group!(
    benches,
    bench_analyze,
    bench_chunk_prose,
    bench_chunk_mixed,
    bench_chunk_no_overlap
);
criterion_main!(benches);
