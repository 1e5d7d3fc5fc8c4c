use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mmap_view::{granularity, MappedView};
use std::fs;
use std::path::PathBuf;

// Simple helper to build a unique temp path per bench
fn tmp_path(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("mmap_view_bench_{}_{}", name, std::process::id()));
    p
}

fn seed_file(path: &PathBuf, size: usize) {
    let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
    fs::write(path, data).expect("seed file");
}

fn bench_open_aligned(b: &mut Criterion) {
    let mut group = b.benchmark_group("open_aligned");
    for &size in &[4_usize * 1024, 64 * 1024, 1024 * 1024] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |ben, &sz| {
            let path = tmp_path(&format!("open_aligned_{}", sz));
            seed_file(&path, sz);

            ben.iter(|| {
                let view = MappedView::open(&path, "r", sz, 0).expect("open");
                criterion::black_box(view.len());
            });

            let _ = fs::remove_file(&path);
        });
    }
    group.finish();
}

fn bench_open_unaligned(b: &mut Criterion) {
    // The unaligned path exercises the shift arithmetic: the OS maps from
    // the aligned offset below and the view skips the padding.
    let mut group = b.benchmark_group("open_unaligned");
    let gran = granularity().max(4096);
    for &size in &[4_usize * 1024, 64 * 1024] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |ben, &sz| {
            let path = tmp_path(&format!("open_unaligned_{}", sz));
            seed_file(&path, sz + gran);
            let offset = (gran - 46) as u64;

            ben.iter(|| {
                let view = MappedView::open(&path, "r", sz, offset).expect("open");
                criterion::black_box(view.len());
            });

            let _ = fs::remove_file(&path);
        });
    }
    group.finish();
}

fn bench_read_through_view(b: &mut Criterion) {
    let mut group = b.benchmark_group("read_through_view");
    for &size in &[64_usize * 1024, 1024 * 1024] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |ben, &sz| {
            let path = tmp_path(&format!("read_through_view_{}", sz));
            seed_file(&path, sz);
            let view = MappedView::open(&path, "r", sz, 0).expect("open");

            ben.iter(|| {
                let sum: u64 = view.as_slice().iter().map(|&b| u64::from(b)).sum();
                criterion::black_box(sum);
            });

            drop(view);
            let _ = fs::remove_file(&path);
        });
    }
    group.finish();
}

fn bench_open_extend_to_end(b: &mut Criterion) {
    let mut group = b.benchmark_group("open_extend_to_end");
    group.bench_function("tail_of_1MB", |ben| {
        let path = tmp_path("open_extend");
        seed_file(&path, 1024 * 1024);

        ben.iter(|| {
            let view = MappedView::open(&path, "re", 0, 512 * 1024).expect("open");
            criterion::black_box(view.len());
        });

        let _ = fs::remove_file(&path);
    });
    group.finish();
}

fn criterion_config() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .warm_up_time(std::time::Duration::from_millis(300))
        .measurement_time(std::time::Duration::from_secs(3))
}

criterion_group! {
    name = map_benches;
    config = criterion_config();
    targets =
        bench_open_aligned,
        bench_open_unaligned,
        bench_read_through_view,
        bench_open_extend_to_end
}

criterion_main!(map_benches);
