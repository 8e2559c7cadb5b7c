// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the taskmaster-document crate: booklet page
// layout and the CSV decode path.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use taskmaster_core::PaperSize;
use taskmaster_document::pdf::writer::fit_above_caption;
use taskmaster_document::sheet::encoding::decode_csv_bytes;
use taskmaster_document::sheet::reader::parse_csv_text;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Layout of a spread of image shapes on an A4 page above a 40 pt band.
fn bench_layout(c: &mut Criterion) {
    let (page_w, page_h) = PaperSize::A4.dimensions_pt();
    let shapes: Vec<(f32, f32)> = (1..=64)
        .map(|i| (i as f32 * 37.0, (65 - i) as f32 * 23.0))
        .collect();

    c.bench_function("fit_above_caption (64 shapes)", |b| {
        b.iter(|| {
            for &(w, h) in &shapes {
                black_box(fit_above_caption(black_box(w), black_box(h), page_w, page_h, 40.0));
            }
        });
    });
}

/// Decode and parse a 1000-row CSV, once as UTF-8 and once through the
/// Latin-1 fallback.
fn bench_csv_decode(c: &mut Criterion) {
    let mut utf8 = String::from("name,city,amount\n");
    for i in 0..1000 {
        utf8.push_str(&format!("row{i},Zürich,{}.5\n", i * 3));
    }
    let latin1: Vec<u8> = utf8
        .chars()
        .map(|ch| if ch == 'ü' { 0xFC } else { ch as u8 })
        .collect();
    let utf8 = utf8.into_bytes();

    c.bench_function("decode+parse csv utf-8 (1000 rows)", |b| {
        b.iter(|| {
            let (text, _) = decode_csv_bytes(black_box(&utf8), "bench.csv").unwrap();
            black_box(parse_csv_text(&text, "bench.csv").unwrap());
        });
    });

    c.bench_function("decode+parse csv latin-1 (1000 rows)", |b| {
        b.iter(|| {
            let (text, _) = decode_csv_bytes(black_box(&latin1), "bench.csv").unwrap();
            black_box(parse_csv_text(&text, "bench.csv").unwrap());
        });
    });
}

criterion_group!(benches, bench_layout, bench_csv_decode);
criterion_main!(benches);
