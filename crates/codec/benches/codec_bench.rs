use barch_codec::{Codec, ParallelRowRuns, Raster, RowRuns, BACKGROUND, FOREGROUND};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::hint::black_box;

/// Synthetic scan page: mostly blank rows, with text bands of black runs
/// and a sprinkle of grey anti-aliasing bytes (the literal path).
fn scan_page(stride: usize, rows: usize) -> Raster {
    let mut rng = rand::thread_rng();
    let mut bytes = vec![BACKGROUND; stride * rows];

    for r in 0..rows {
        // Roughly one text band in three.
        if r % 9 >= 6 {
            let row = &mut bytes[r * stride..(r + 1) * stride];
            let mut c = 0;
            while c < row.len() {
                let run = rng.gen_range(1..24).min(row.len() - c);
                match rng.gen_range(0..10) {
                    0..=5 => {} // leave white
                    6..=8 => row[c..c + run].fill(FOREGROUND),
                    _ => {
                        for b in &mut row[c..c + run] {
                            *b = rng.gen_range(0x40..0xC0);
                        }
                    }
                }
                c += run;
            }
        }
    }

    Raster::new(stride as u32, rows as u32, bytes)
}

fn bench_codecs(c: &mut Criterion) {
    let strategies: Vec<(&str, Box<dyn Codec>)> = vec![
        ("RowRuns", Box::new(RowRuns)),
        ("ParallelRowRuns", Box::new(ParallelRowRuns)),
    ];

    // (Name, stride, rows): thumbnail, screen-sized, A4 at 300 dpi.
    let sizes = vec![
        ("Small", 64usize, 64usize),
        ("Medium", 640, 480),
        ("Large_A4", 2480, 3508),
    ];

    for (size_name, stride, rows) in sizes {
        let raster = scan_page(stride, rows);
        let raw_len = (stride * rows) as u64;

        let mut group_encode = c.benchmark_group(format!("Encode_{size_name}"));
        group_encode.throughput(Throughput::Bytes(raw_len));
        for (strategy_name, strategy) in &strategies {
            group_encode.bench_with_input(
                BenchmarkId::new(*strategy_name, raw_len),
                &raster,
                |b, r| b.iter(|| strategy.encode(black_box(r))),
            );
        }
        group_encode.finish();

        let mut group_decode = c.benchmark_group(format!("Decode_{size_name}"));
        group_decode.throughput(Throughput::Bytes(raw_len));
        for (strategy_name, strategy) in &strategies {
            let encoded = strategy.encode(&raster);
            group_decode.bench_with_input(
                BenchmarkId::new(*strategy_name, raw_len),
                &encoded,
                |b, e| b.iter(|| strategy.decode(black_box(e)).unwrap()),
            );
        }
        group_decode.finish();
    }
}

criterion_group!(benches, bench_codecs);
criterion_main!(benches);
