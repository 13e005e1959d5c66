use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use serqlite::{QueryOptions, Serqlite, Server};
use tokio::runtime::{Handle, Runtime};

const BENCH_SCHEMA: &str = "CREATE TABLE data (a INTEGER, b TEXT, at DATETIME, price DECIMAL(8, 2))";

/// How many concurrent read or write requests should we make?
const CONCURRENCY: usize = 20;

async fn server() -> Server {
    let server = Serqlite::new().start().await.unwrap();
    server.exec(BENCH_SCHEMA).await.unwrap();
    server
        .execute(
            "INSERT INTO data (a, b, at, price) VALUES (?1, ?2, ?3, ?4)",
            QueryOptions::new()
                .bind(1_i64)
                .bind("two")
                .bind("2024-01-01 00:00:00.000000")
                .bind("12.50"),
        )
        .await
        .unwrap();
    server
}

fn setup() -> Server {
    let (tx, rx) = std::sync::mpsc::channel();
    Handle::current().spawn(async move {
        tx.send(server().await).unwrap();
    });
    rx.recv().unwrap()
}

async fn writes(server: Server) {
    let mut futs = vec![];
    for i in 0..CONCURRENCY {
        let server = server.clone();
        futs.push(async move {
            server
                .execute(
                    "INSERT INTO data (a, b) VALUES (?1, ?2)",
                    QueryOptions::new().bind(i as i64).bind("two"),
                )
                .await
        });
    }
    futures::future::join_all(futs).await;
}

async fn reads(server: Server) {
    let mut futs = vec![];
    for _ in 0..CONCURRENCY {
        let server = server.clone();
        futs.push(async move { server.query("SELECT * FROM data", QueryOptions::new()).await });
    }
    futures::future::join_all(futs).await;
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("write", |b| {
        b.to_async(Runtime::new().unwrap())
            .iter_batched(setup, writes, BatchSize::SmallInput)
    });
    c.bench_function("read", |b| {
        b.to_async(Runtime::new().unwrap())
            .iter_batched(setup, reads, BatchSize::SmallInput)
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
