//! Benchmarks for pipeline parsing.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use wd_pipeline::{
    AlertTransformer, AnchorTransformer, CodeCopyTransformer, ContainerTransformer, Highlighter,
    HighlighterTransformer, MarkdownPipeline, MermaidTransformer,
};

/// Generate markdown content with specified structure.
fn generate_markdown(headings: usize, paragraphs_per_section: usize) -> String {
    let mut md = String::with_capacity(headings * 50 + headings * paragraphs_per_section * 200);
    md.push_str("# Document Title\n\n");

    for i in 0..headings {
        md.push_str(&format!("## Section {i}\n\n"));
        for j in 0..paragraphs_per_section {
            md.push_str(&format!(
                "This is paragraph {j} in section {i}. It contains **bold** and *italic* text.\n\n"
            ));
        }
        md.push_str(":::tip\nRemember this.\n:::\n\n");
    }
    md
}

fn builtin_pipeline() -> MarkdownPipeline {
    let mut pipeline = MarkdownPipeline::new();
    pipeline
        .add_transformer(AnchorTransformer)
        .add_transformer(ContainerTransformer::new("tip"))
        .add_transformer(AlertTransformer)
        .add_transformer(MermaidTransformer)
        .add_transformer(CodeCopyTransformer);
    pipeline
}

fn bench_parse_simple(c: &mut Criterion) {
    let pipeline = builtin_pipeline();

    c.bench_function("parse_simple_markdown", |b| {
        b.iter(|| pipeline.parse("# Hello\n\nSimple content.", false));
    });
}

fn bench_parse_varying_sizes(c: &mut Criterion) {
    let pipeline = builtin_pipeline();
    let mut group = c.benchmark_group("parse_by_size");

    for (headings, paragraphs) in [(5, 2), (20, 3), (50, 5)] {
        let markdown = generate_markdown(headings, paragraphs);
        group.throughput(Throughput::Bytes(markdown.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("markdown", format!("{headings}h_{paragraphs}p")),
            &markdown,
            |b, md| b.iter(|| pipeline.parse(md, false)),
        );
    }

    group.finish();
}

fn bench_parse_cached_vs_uncached(c: &mut Criterion) {
    let pipeline = builtin_pipeline();
    let markdown = generate_markdown(10, 3);
    let mut group = c.benchmark_group("caching");

    group.bench_function("parse_uncached", |b| {
        b.iter(|| pipeline.parse(&markdown, false));
    });

    // Prime the cache
    let _ = pipeline.parse(&markdown, true);

    group.bench_function("parse_cache_hit", |b| {
        b.iter(|| pipeline.parse(&markdown, true));
    });

    group.finish();
}

fn bench_parse_highlighted(c: &mut Criterion) {
    let highlighter = Arc::new(Highlighter::load_defaults());
    let mut pipeline = builtin_pipeline();
    pipeline.add_transformer(HighlighterTransformer::new(highlighter));

    let markdown = r#"# Code Examples

```rust
fn main() {
    println!("Hello, world!");
    let x = 42;
    for i in 0..10 {
        println!("{}", i * x);
    }
}
```

```python
def greet(name):
    return f"Hello, {name}!"
```
"#;

    c.bench_function("parse_highlighted_code", |b| {
        b.iter(|| pipeline.parse(markdown, false));
    });
}

fn bench_assembly(c: &mut Criterion) {
    let pipeline = builtin_pipeline();

    c.bench_function("assemble_parser", |b| {
        b.iter(|| {
            pipeline.invalidate();
            pipeline.ensure_assembled()
        });
    });
}

criterion_group!(
    benches,
    bench_parse_simple,
    bench_parse_varying_sizes,
    bench_parse_cached_vs_uncached,
    bench_parse_highlighted,
    bench_assembly,
);
criterion_main!(benches);
