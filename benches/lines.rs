use std::io::Write;
use std::time::Instant;

use criterion::async_executor::AsyncStdExecutor;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use history_server::{bounds, Event, HistoryFile, Indexable, ReadByLine};
use rand::distributions::Uniform;
use rand::Rng;

/// Writes a history with `iterations` rounds of ant moves, best tours and pheromone levels
fn generate_history(iterations: usize) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let mut rng = rand::thread_rng();

    for _ in 0..iterations {
        for _ in 0..10 {
            let positions: Vec<String> = (0..50).map(|_| rng.gen_range(0..100).to_string()).collect();
            writeln!(file, "ANTS,{}", positions.join(",")).unwrap();
        }

        let tour: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        writeln!(file, "BEST,{},{}", rng.gen_range(100.0..1000.0), tour.join(",")).unwrap();

        let trails: Vec<String> = (1..100)
            .map(|i| format!("{}-{}:{}", i, i - 1, rng.gen_range(0.0..1.0)))
            .collect();
        writeln!(file, "PHEROMONES,1.0,{}", trails.join(",")).unwrap();
    }

    file.flush().unwrap();
    file
}

fn random_lines_bench(c: &mut Criterion) {
    let history = generate_history(100);
    let path = history.path().to_str().unwrap().to_owned();

    c.bench_function("read random lines", |b| {
        b.to_async(AsyncStdExecutor).iter_custom(|iters| {
            let path = path.clone();
            async move {
                let file = HistoryFile::open(&path).await.unwrap();

                let lines: Vec<_> = rand::thread_rng()
                    .sample_iter(Uniform::new(0, file.total_lines()))
                    .take(file.total_lines())
                    .collect();

                let start = Instant::now();

                for _i in 0..iters {
                    for line in &lines {
                        file.read_line(black_box(*line)).await.unwrap();
                    }
                }

                start.elapsed()
            }
        });
    });
}

fn index_bench(c: &mut Criterion) {
    let history = generate_history(100);
    let path = history.path().to_str().unwrap().to_owned();

    c.bench_function("build index", |b| {
        b.to_async(AsyncStdExecutor).iter(|| {
            let path = path.clone();
            async move { black_box(HistoryFile::open(&path).await.unwrap()) }
        });
    });
}

fn parse_bench(c: &mut Criterion) {
    let trails: Vec<String> = (1..100).map(|i| format!("{}-{}:0.{}", i, i - 1, i)).collect();
    let line = format!("PHEROMONES,1.0,{}", trails.join(","));

    c.bench_function("parse pheromone line", |b| {
        b.iter(|| Event::parse(black_box(&line)).unwrap())
    });
}

fn bounds_bench(c: &mut Criterion) {
    let history = generate_history(20);
    let path = history.path().to_str().unwrap().to_owned();

    c.bench_function("scan pheromone bounds", |b| {
        b.to_async(AsyncStdExecutor).iter_custom(|iters| {
            let path = path.clone();
            async move {
                let file = HistoryFile::open(&path).await.unwrap();

                let start = Instant::now();
                for _i in 0..iters {
                    black_box(bounds::scan(&file).await.unwrap());
                }
                start.elapsed()
            }
        });
    });
}

criterion_group!(
    benches,
    random_lines_bench,
    index_bench,
    parse_bench,
    bounds_bench
);
criterion_main!(benches);
