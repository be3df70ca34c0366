//! Criterion benchmarks for the pipeline's pure hot paths.
//!
//! Run with:
//!   cargo bench
//!
//! Covers:
//!   - scope classification (keyword tables over the lowercased message)
//!   - file-listing budgeter (greedy pass over many-small-files projects)
//!   - user-message augmentation under a constrained ceiling

use buildflow_core::{
    build_user_message_with_context, classify_scope, format_file_listing, ChangeScope, FileInfo,
    IterationContext,
};
use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sample_files(count: usize, content_len: usize) -> Vec<FileInfo> {
    (0..count)
        .map(|i| {
            let path = match i % 4 {
                0 => format!("pages/page{i}.html"),
                1 => format!("styles/style{i}.css"),
                2 => format!("scripts/app{i}.js"),
                _ => format!("docs/notes{i}.md"),
            };
            FileInfo::new(path, "x".repeat(content_len), Utc::now())
        })
        .collect()
}

fn bench_classify_scope(c: &mut Criterion) {
    let messages = [
        "change the button color",
        "add a blog page with an archive and tags",
        "completely redesign the whole site with a dark theme",
    ];
    c.bench_function("classify_scope", |b| {
        b.iter(|| {
            for m in &messages {
                black_box(classify_scope(black_box(m)));
            }
        });
    });
}

fn bench_format_file_listing(c: &mut Criterion) {
    let files = sample_files(200, 2_000);
    c.bench_function("format_file_listing_200_files", |b| {
        b.iter(|| black_box(format_file_listing(black_box(&files), 300_000)));
    });

    c.bench_function("format_file_listing_constrained", |b| {
        b.iter(|| black_box(format_file_listing(black_box(&files), 10_000)));
    });
}

fn bench_user_message(c: &mut Criterion) {
    let ctx = IterationContext {
        is_iteration: true,
        project_id: Some("bench".into()),
        existing_files: sample_files(50, 4_000),
        change_scope: ChangeScope::Medium,
        previous_prompts: vec!["build a portfolio site".into()],
    };
    c.bench_function("build_user_message_with_context", |b| {
        b.iter(|| {
            black_box(build_user_message_with_context(
                black_box("add a contact form to the website"),
                black_box(&ctx),
                250_000,
            ))
        });
    });
}

criterion_group!(
    benches,
    bench_classify_scope,
    bench_format_file_listing,
    bench_user_message
);
criterion_main!(benches);
