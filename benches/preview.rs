//! Benchmarks for preview rendering.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tripane::highlight::BackgroundMode;
use tripane::preview::{render_body, render_lines};

fn sample_document(sections: usize) -> String {
    let mut md = String::from("# Benchmark\n\n");
    for i in 1..=sections {
        md.push_str(&format!(
            "## Section {i}\n\nSome **bold** and *italic* text with `code`.\n\n- item one\n- item two\n\n```rust\nfn main() {{ println!(\"{i}\"); }}\n```\n\n| a | b |\n|---|---|\n| {i} | x |\n\n"
        ));
    }
    md
}

fn bench_preview_lines(c: &mut Criterion) {
    let md = sample_document(50);
    c.bench_function("preview_lines_50_sections", |b| {
        b.iter(|| render_lines(black_box(&md), BackgroundMode::Dark));
    });
}

fn bench_preview_html(c: &mut Criterion) {
    let md = sample_document(50);
    c.bench_function("preview_html_50_sections", |b| {
        b.iter(|| render_body(black_box(&md)));
    });
}

criterion_group!(benches, bench_preview_lines, bench_preview_html);
criterion_main!(benches);
