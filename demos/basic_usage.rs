// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic docsearch usage example.
//!
//! Demonstrates:
//! 1. Seeding a small knowledge base into the in-memory engine
//! 2. The four leaf constraints (directory, collection, value, word)
//! 3. Three assembly routes building one identical query
//! 4. Facets, ordering, and pagination
//! 5. Query plan and permissions projections
//! 6. Displaying metrics (OTEL-compatible)
//!
//! Runs entirely in-process, no backends required.
//!
//! # Run
//!
//! ```bash
//! cargo run --example basic_usage
//! ```

use std::sync::Arc;

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use serde_json::json;

use docsearch::{
    bind, by_example, facet, parse_bindings, parsed_from, where_, Category, Constraint,
    DocumentSink, DocumentWrite, MemoryEngine, QueryOptions, SearchClient,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install metrics recorder (captures all metrics for OTEL export)
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder.install().expect("failed to install metrics recorder");

    // Simple logging (no filter for simplicity)
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║              docsearch: Basic Usage Example                   ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Seed a small knowledge base
    // ─────────────────────────────────────────────────────────────────────────
    println!("📦 Seeding the in-memory engine...");

    let engine = Arc::new(MemoryEngine::new());
    let documents = vec![
        DocumentWrite::new(
            "/kb/rust/ownership.json",
            json!({"title": "Ownership and Borrowing", "author": "alice", "level": "intro",
                   "body": "ownership borrowing lifetimes"}),
        )
        .in_collection("guides"),
        DocumentWrite::new(
            "/kb/rust/async.json",
            json!({"title": "Async in Practice", "author": "bob", "level": "advanced",
                   "body": "async await executors async"}),
        )
        .in_collection("guides"),
        DocumentWrite::new(
            "/kb/rust/errors.json",
            json!({"title": "Error Handling", "author": "alice", "level": "intro",
                   "body": "errors results panics errors errors"}),
        )
        .in_collection("guides"),
        DocumentWrite::new(
            "/kb/ops/deploy.json",
            json!({"title": "Deploying Services", "author": "carol", "level": "advanced",
                   "body": "containers rollouts canaries"}),
        )
        .in_collection("runbooks"),
        DocumentWrite::new(
            "/kb/ops/oncall.json",
            json!({"title": "On-call Checklist", "author": "carol", "level": "intro",
                   "body": "alerts escalation dashboards"}),
        )
        .in_collection("runbooks"),
    ];
    engine.write(documents).await?;
    println!("   ✅ {} documents written", engine.len());

    let client = SearchClient::new(engine.clone());

    // ─────────────────────────────────────────────────────────────────────────
    // 2. The four leaf constraints
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🔍 Leaf constraints...");

    let leaves = vec![
        ("directory('/kb/rust/')", Constraint::directory("/kb/rust/")),
        ("collection('runbooks')", Constraint::collection("runbooks")),
        ("value('author', 'alice')", Constraint::value("author", "alice")),
        ("word('body', 'async')", Constraint::word("body", "async")),
    ];

    for (label, constraint) in leaves {
        let query = where_(constraint).build()?;
        let start = std::time::Instant::now();
        let items = client.query(&query).await?;
        let elapsed = start.elapsed();
        let uris: Vec<&str> = items
            .iter()
            .filter_map(|i| i.as_document().map(|d| d.uri.as_str()))
            .collect();
        println!("   ├─ {} → {} match(es) in {:?}", label, uris.len(), elapsed);
        for uri in uris {
            println!("   │     {}", uri);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Three assembly routes, one query
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🔀 Three assembly routes...");

    let typed = where_(Constraint::value("author", "alice")).build()?;
    let qbe = where_(by_example(json!({"author": "alice"}))?).build()?;
    let bindings = parse_bindings([bind("by").value("author")])?;
    let parsed = where_(parsed_from("by:alice", &bindings)?).build()?;

    assert_eq!(typed, qbe);
    assert_eq!(typed, parsed);
    println!("   ├─ typed == by_example == parsed_from ✅");
    println!("   └─ wire form: {}", serde_json::to_string(&typed)?);

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Facets, ordering, pagination
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📊 Facets over the whole knowledge base, two documents per page...");

    let paged = where_(Constraint::directory("/kb/"))
        .calculate([facet("author"), facet("level")])
        .order_by(["title"])
        .slice(1, 2)
        .build()?;

    let items = client.query(&paged).await?;
    if let Some(summary) = items[0].as_facets() {
        for (field, result) in &summary.facets {
            let rendered: Vec<String> = result
                .facet_values
                .iter()
                .map(|v| format!("{}={}", v.name, v.count))
                .collect();
            println!("   ├─ {}: {}", field, rendered.join(", "));
        }
    }
    println!("   ├─ page 1 (titles ascending):");
    for item in &items[1..] {
        if let Some(doc) = item.as_document() {
            println!("   │     {}", doc.content_str("title").unwrap_or("?"));
        }
    }

    // Built queries are immutable; the next page is a fresh build
    let page2 = where_(Constraint::directory("/kb/"))
        .order_by(["title"])
        .slice(3, 2)
        .build()?;
    println!("   └─ page 2:");
    for item in client.query(&page2).await? {
        if let Some(doc) = item.as_document() {
            println!("         {}", doc.content_str("title").unwrap_or("?"));
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 5. Query plan and permissions projections
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🧾 Diagnostics and permissions...");

    let diagnosed = where_(Constraint::word("body", "errors"))
        .with_options(QueryOptions::new().with_query_plan())
        .build()?;
    let items = client.query(&diagnosed).await?;
    if let Some(diag) = items[0].as_diagnostic() {
        println!("   ├─ plan: {}", diag.plan);
    }

    let perms = where_(Constraint::collection("guides"))
        .with_options(QueryOptions::new().with_category(Category::Permissions))
        .build()?;
    for item in client.query(&perms).await? {
        if let Some(doc) = item.as_document() {
            let roles: Vec<&str> = doc
                .permissions
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .map(|p| p.role.as_str())
                .collect();
            println!("   ├─ {} → roles {:?}", doc.uri, roles);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 6. Dump raw metrics (OTEL-compatible)
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📈 Raw Metrics (OTEL export format):");
    dump_metrics(&snapshotter);

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║                      Example complete!                        ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    Ok(())
}

/// Dump all captured metrics in OTEL-compatible format
fn dump_metrics(snapshotter: &Snapshotter) {
    let snapshot = snapshotter.snapshot();

    let mut counters = Vec::new();
    let mut histograms = Vec::new();

    for (composite_key, _, _, value) in snapshot.into_vec() {
        let (_kind, key) = composite_key.into_parts();
        let name = key.name().to_string();
        let labels: Vec<String> = key
            .labels()
            .map(|l| format!("{}={}", l.key(), l.value()))
            .collect();
        let label_str = if labels.is_empty() {
            String::new()
        } else {
            format!("{{{}}}", labels.join(","))
        };

        match value {
            DebugValue::Counter(v) => counters.push((name, label_str, v)),
            DebugValue::Gauge(_) => {}
            DebugValue::Histogram(samples) => {
                let count = samples.len();
                let sum: f64 = samples.iter().map(|v| v.into_inner()).sum();
                histograms.push((name, label_str, count, sum));
            }
        }
    }

    counters.sort_by(|a, b| a.0.cmp(&b.0));
    histograms.sort_by(|a, b| a.0.cmp(&b.0));

    println!("   ┌─ Counters (cumulative):");
    for (name, labels, value) in &counters {
        println!("   │    {}{} = {}", name, labels, value);
    }

    println!("   └─ Histograms (distributions):");
    for (name, labels, count, sum) in &histograms {
        println!("        {}{} count={} sum={:.4}", name, labels, count, sum);
    }
}
