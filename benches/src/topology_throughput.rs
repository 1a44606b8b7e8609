use std::sync::Arc;
use std::time::Duration;

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde_json::json;
use tokio::runtime::Runtime;
use willa::prelude::*;

/// Generate order records with amounts cycling through 0..1000
fn generate_orders(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| Record::new(i as u64, json!({"amount": i % 1000, "user-id": i % 97, "note": "bench"})))
        .collect()
}

fn large_orders() -> Pipeline {
    Pipeline::new()
        .try_filter(field_at_least("amount", 500.0))
        .try_map(select_fields(&["amount", "user-id"]))
}

/// Diamond: two sources merged, filtered, fanned out to two sinks
fn diamond_topology() -> Topology {
    Topology::new()
        .with_entity("east", Entity::source(TopicConfig::new("east")))
        .with_entity("west", Entity::source(TopicConfig::new("west")))
        .with_entity("large", Entity::stream(large_orders()))
        .with_entity("audit", Entity::sink(TopicConfig::new("audit")))
        .with_entity("alerts", Entity::sink(TopicConfig::new("alerts")))
        .with_edge("east", "large")
        .with_edge("west", "large")
        .with_edge("large", "audit")
        .with_edge("large", "alerts")
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_run");

    for size in [1_000, 10_000] {
        let records = generate_orders(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            let pipeline = large_orders();
            b.iter_batched(
                || records.clone(),
                |input| black_box(pipeline.run(input)),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_experiment(c: &mut Criterion) {
    let mut group = c.benchmark_group("experiment_diamond");
    let topology = diamond_topology();

    for size in [1_000, 10_000] {
        let mut inputs = ExperimentInputs::new();
        inputs.insert("east".into(), generate_orders(size / 2));
        inputs.insert("west".into(), generate_orders(size / 2));

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &inputs, |b, inputs| {
            b.iter(|| black_box(run_experiment(&topology, inputs)));
        });
    }

    group.finish();
}

/// Live engine over a finite transport, for varying inbox bounds
fn bench_live_channel_capacity(c: &mut Criterion) {
    let mut group = c.benchmark_group("live_channel_capacity");
    group.measurement_time(Duration::from_secs(10));
    let runtime = Runtime::new().unwrap();
    let topology = diamond_topology();
    let records = generate_orders(5_000);

    for capacity in [1, 16, 64, 256] {
        let setup = || {
            Arc::new(SimulatedTransport::seeded([
                ("east".to_string(), records.clone()),
                ("west".to_string(), records.clone()),
            ]))
        };

        let bench = |transport: Arc<SimulatedTransport>| {
            let topology = &topology;
            async move {
                let running = TopologyCompiler::new(transport)
                    .with_channel_capacity(capacity)
                    .compile(topology)
                    .await
                    .unwrap();
                black_box(running.wait().await);
            }
        };

        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, _| {
            b.to_async(&runtime).iter_batched(setup, bench, BatchSize::SmallInput);
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline, bench_experiment, bench_live_channel_capacity);
criterion_main!(benches);
