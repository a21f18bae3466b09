use std::io::Cursor;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use geofile::io::asc::{AscReader, AscReaderConfiguration};
use log::{set_max_level, LevelFilter};

fn synthetic_cloud(lines: usize) -> Vec<u8> {
    let mut text = String::with_capacity(lines * 48);
    for i in 0..lines {
        let x = 600_000.0 + (i % 1000) as f64 * 0.05;
        let y = 131_000.0 + (i / 1000) as f64 * 0.05;
        let z = 60.0 + (i % 17) as f64 * 0.1;
        text.push_str(&format!("{x:.3} {y:.3} {z:.3} {} {} {}\n", i % 256, (i * 3) % 256, (i * 7) % 256));
    }
    text.into_bytes()
}

fn decode_asc(c: &mut Criterion) {
    set_max_level(LevelFilter::Warn);

    let data = synthetic_cloud(200_000);
    let mut group = c.benchmark_group("asc_decode");
    group
        .sample_size(10)
        .measurement_time(Duration::from_secs(10))
        .throughput(Throughput::Bytes(data.len() as u64));

    for chunk_size in [64 * 1024, 4 * 1024 * 1024] {
        group.bench_function(format!("chunk_{chunk_size}"), |b| {
            b.iter(|| {
                let config = AscReaderConfiguration {
                    chunk_size,
                    max_batch_points: 50_000,
                    ..Default::default()
                };
                let cloud = AscReader::new(Cursor::new(data.as_slice()))
                    .with_configuration(config)
                    .read()
                    .unwrap();
                black_box(cloud.summary.point_count)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, decode_asc);
criterion_main!(benches);
