//! Criterion benchmarks for evlog

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use evlog::core::format::{render, rewrite};
use evlog::{Args, Discard, Logger, Value};
use std::sync::Arc;

fn bench_rewrite(c: &mut Criterion) {
    let cases: Vec<(&str, Vec<Value>)> = vec![
        ("no verbs at all", vec![]),
        ("Hello %{name}s!", vec![Value::String("Luke".to_string())]),
        (
            "%{a}s %{b}d %{c}f",
            vec![
                Value::String("x".to_string()),
                Value::Int(42),
                Value::Float(1.5),
            ],
        ),
        ("100%% escaped", vec![]),
    ];

    let mut group = c.benchmark_group("format_rewrite");
    for (template, values) in &cases {
        group.bench_function(*template, |b| {
            let mut fmt = String::with_capacity(128);
            let mut args = Args::with_capacity(8);
            b.iter(|| {
                fmt.clear();
                args.clear();
                rewrite(
                    black_box(template),
                    black_box(values.as_slice()),
                    &mut fmt,
                    &mut args,
                );
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let values = [Value::String("Luke".to_string()), Value::Int(42)];

    c.bench_function("format_render", |b| {
        let mut message = String::with_capacity(128);
        b.iter(|| {
            message.clear();
            render(black_box("Hello %s, attempt %d"), black_box(&values), &mut message);
        });
    });
}

fn bench_logger(c: &mut Criterion) {
    let mut group = c.benchmark_group("logger");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::new(Discard);
    group.bench_function("log_with_source", |b| {
        b.iter(|| {
            logger.log(
                black_box("Hello %{name}s!"),
                black_box(&[Value::String("Luke".to_string())]),
            );
        });
    });

    let logger = Logger::new(Discard).with_source(false);
    group.bench_function("log_without_source", |b| {
        b.iter(|| {
            logger.log(
                black_box("Hello %{name}s!"),
                black_box(&[Value::String("Luke".to_string())]),
            );
        });
    });

    let logger = Logger::new(Discard).with_debug(false);
    group.bench_function("debug_disabled", |b| {
        b.iter(|| {
            logger.debug(
                black_box("Hello %{name}s!"),
                black_box(&[Value::String("Luke".to_string())]),
            );
        });
    });

    group.finish();
}

fn bench_concurrent_logging(c: &mut Criterion) {
    c.bench_function("concurrent_log_4_threads", |b| {
        let logger = Arc::new(Logger::new(Discard));
        b.iter(|| {
            let threads: Vec<_> = (0..4)
                .map(|t| {
                    let logger = Arc::clone(&logger);
                    std::thread::spawn(move || {
                        for i in 0..100 {
                            logger.log(
                                "thread %{thread}d iteration %{i}d",
                                &[Value::Int(t as i64), Value::Int(i as i64)],
                            );
                        }
                    })
                })
                .collect();
            for thread in threads {
                thread.join().unwrap();
            }
        });
    });
}

criterion_group!(
    benches,
    bench_rewrite,
    bench_render,
    bench_logger,
    bench_concurrent_logging
);
criterion_main!(benches);
