use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use healthcheck::{CheckResult, HttpProber, Job, PoolConfig, Prober, WorkerPool};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Prober that answers immediately, isolating pool overhead
struct InstantProber;

#[async_trait]
impl Prober for InstantProber {
    async fn probe(&self, job: &Job) -> CheckResult {
        CheckResult::success(&job.url, 200, Duration::ZERO)
    }
}

fn http_probe_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("http_probe");

    // Failure path against a closed port
    let prober = HttpProber::new(Duration::from_millis(100)).unwrap();
    let job = Job::new("http://127.0.0.1:1/health");

    group.bench_function("http_connection_refused", |b| {
        let rt = tokio::runtime::Runtime::new().unwrap();
        b.iter(|| rt.block_on(async { black_box(prober.probe(&job).await) }));
    });

    group.finish();
}

fn pool_throughput_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_throughput");
    group.sample_size(20);

    for workers in [1usize, 4, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            let rt = tokio::runtime::Runtime::new().unwrap();
            b.iter(|| {
                rt.block_on(async {
                    let (tx, mut rx) = mpsc::channel(1000);
                    let config = PoolConfig {
                        worker_count: workers,
                        queue_capacity: 1000,
                    };
                    let pool = WorkerPool::with_prober(config, Arc::new(InstantProber), tx).unwrap();
                    pool.init().await.unwrap();

                    for i in 0..500 {
                        pool.push(Job::new(format!("http://svc{i}.test"))).await;
                    }
                    for _ in 0..500 {
                        black_box(rx.recv().await);
                    }
                    pool.stop().await.unwrap();
                })
            });
        });
    }

    group.finish();
}

fn push_drop_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("push");

    // Queue stays full: measures the drop-on-full path
    group.bench_function("push_full_queue", |b| {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (tx, _rx) = mpsc::channel(1);
        let config = PoolConfig {
            worker_count: 1,
            queue_capacity: 1,
        };
        let pool = WorkerPool::with_prober(config, Arc::new(InstantProber), tx).unwrap();
        rt.block_on(async {
            pool.init().await.unwrap();
            // Park the worker on a result send and fill the queue
            for i in 0..3 {
                pool.push(Job::new(format!("http://fill{i}.test"))).await;
            }
        });

        let job = Job::new("http://bench.test");
        b.iter(|| rt.block_on(async { black_box(pool.push(job.clone()).await) }));
    });

    group.finish();
}

criterion_group!(
    benches,
    http_probe_benchmark,
    pool_throughput_benchmark,
    push_drop_benchmark
);
criterion_main!(benches);
