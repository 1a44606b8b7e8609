//! Example: Declarative Topology
//!
//! Builds a topology from a JSON definition plus registered pipelines, checks
//! it, dry-runs it against literal records, then runs it live on the
//! in-process broker and compares the two.
//!
//! Usage:
//!   cargo run --example declarative_topology
//!   WILLA_LOG=debug cargo run --example declarative_topology

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing_subscriber::EnvFilter;
use willa::prelude::*;

const DEFINITION: &str = r#"{
    "entities": {
        "web-orders": {"kind": "source-topic", "topic": {"name": "orders.web"}},
        "app-orders": {"kind": "source-topic", "topic": {"name": "orders.app"}},
        "large": {"kind": "processing-stream", "pipeline": "large-orders"},
        "alerts": {"kind": "sink-topic", "topic": {"name": "alerts"}},
        "archive": {"kind": "sink-topic", "topic": {"name": "archive"}}
    },
    "workflow": [
        ["web-orders", "large"],
        ["app-orders", "large"],
        ["large", "alerts"],
        ["web-orders", "archive"],
        ["app-orders", "archive"]
    ]
}"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("WILLA_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let registry = PipelineRegistry::with_builtins().register(
        "large-orders",
        Pipeline::new()
            .try_filter(field_at_least("amount", 100.0))
            .try_map(select_fields(&["amount", "user-id"])),
    );
    let def: TopologyDef = serde_json::from_str(DEFINITION)?;
    let topology = def.resolve(&registry)?;

    eprintln!("=== Declarative Topology Example ===");
    eprintln!("{}", serde_json::to_string(&ValidationReport::for_topology(&topology))?);
    eprintln!();
    eprintln!("{}", render_dot(&topology));

    let web = vec![
        Record::new(1, json!({"amount": 10, "user-id": 2})),
        Record::new(3, json!({"amount": 500, "user-id": 4})),
    ];
    let app = vec![Record::new(5, json!({"amount": 250, "user-id": 6}))];

    // Dry run
    let mut inputs = ExperimentInputs::new();
    inputs.insert("web-orders".into(), web.clone());
    inputs.insert("app-orders".into(), app.clone());
    let outputs = run_experiment(&topology, &inputs)?;
    for (entity, records) in &outputs.entities {
        eprintln!("experiment {entity}: {} record(s)", records.len());
    }

    // Live run
    let broker = Arc::new(InMemoryBroker::new());
    broker.publish("orders.web", web).await;
    broker.publish("orders.app", app).await;

    let running = TopologyCompiler::new(broker.clone())
        .with_channel_capacity(16)
        .with_error_policy(LogAndDrop)
        .compile(&topology)
        .await?;

    let expected = outputs.records(&"alerts".into()).len();
    tokio::time::timeout(Duration::from_secs(5), broker.wait_for("alerts", expected)).await??;
    let report = running.stop().await;

    eprintln!();
    for (entity, stats) in &report.entities {
        eprintln!(
            "live {entity}: in={} out={} dropped={}",
            stats.records_in, stats.records_out, stats.records_dropped
        );
    }
    for record in broker.records("alerts").await? {
        println!("{}", serde_json::to_string(&record.value)?);
    }

    if !report.all_succeeded() {
        eprintln!("Topology reported {} error(s)", report.errors.len());
        std::process::exit(1);
    }
    Ok(())
}
