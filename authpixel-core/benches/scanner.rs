use authpixel_core::{
    decode_with_stats, embed,
    encoder::encode_packet,
    scanner::{scan_bitstream, scan_plane, OffsetBitstream, ScanStats},
    types::BlockGrid,
    Plane, WatermarkConfig,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn marked_plane(size: usize, config: &WatermarkConfig) -> Plane {
    let plane = Plane::from_fn(size, size, |x, y| ((3 * x + 5 * y) % 200 + 20) as f64);
    embed(&plane, "AuthPixel", config).unwrap()
}

fn bench_scanner(c: &mut Criterion) {
    let config = WatermarkConfig::default();
    let mut group = c.benchmark_group("scanner");

    for &size in &[128usize, 256, 512] {
        let plane = marked_plane(size, &config);
        group.throughput(Throughput::Elements((size * size) as u64));

        group.bench_with_input(BenchmarkId::new("scan_plane", size), &plane, |b, plane| {
            b.iter(|| {
                let res = scan_plane(plane, &config);
                criterion::black_box(res);
            });
        });

        group.bench_with_input(
            BenchmarkId::new("decode_with_stats", size),
            &plane,
            |b, plane| {
                b.iter(|| {
                    let res = decode_with_stats(plane, &config);
                    criterion::black_box(res);
                });
            },
        );
    }

    // Bitstream scan alone, with some noise between packets
    let mut bits = Vec::new();
    for i in 0..500 {
        bits.extend(encode_packet("AuthPixel", &config).unwrap());
        if i % 10 == 0 {
            bits.extend([1, 1, 1, 0, 0, 0, 1]);
        }
    }
    let stream = OffsetBitstream {
        grid: BlockGrid::new(8 * bits.len(), 8, 8, 0, 0),
        bits,
    };
    group.throughput(Throughput::Elements(stream.bits.len() as u64));
    group.bench_function("scan_bitstream", |b| {
        b.iter(|| {
            let mut stats = ScanStats::default();
            let res = scan_bitstream(&stream, &config, &mut stats);
            criterion::black_box(res);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_scanner);
criterion_main!(benches);
