//! Benchmarks for syntax highlighting of the markdown source pane.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tripane::highlight::{BackgroundMode, highlight_code, highlight_markdown};

fn bench_highlight_markdown(c: &mut Criterion) {
    let md = "# Title\n\nParagraph with **bold** text.\n\n- a\n- b\n\n".repeat(100);
    c.bench_function("highlight_markdown", |b| {
        b.iter(|| highlight_markdown(black_box(&md), BackgroundMode::Dark));
    });
}

fn bench_highlight_code(c: &mut Criterion) {
    let code = "fn main() {\n    let x = 42;\n    println!(\"{x}\");\n}\n".repeat(50);
    c.bench_function("highlight_rust_code", |b| {
        b.iter(|| highlight_code(Some("rust"), black_box(&code), BackgroundMode::Light));
    });
}

criterion_group!(benches, bench_highlight_markdown, bench_highlight_code);
criterion_main!(benches);
