//! # Example: LocalBroker round trip
//!
//! One supervisor attached to an in-process broker:
//! - `work` is started, replaced with a new command, then stopped;
//! - `short` exits on its own;
//! - every termination is printed as it is announced on `<root>.stopped`.
//!
//! Run with: `RUST_LOG=debug cargo run --example local_broker`

use std::{sync::Arc, time::Duration};

use shellvisor::{
    EventKind, LocalBroker, LogWriter, ShellFactory, StartRequest, StopRequest, Supervisor,
    SupervisorConfig,
};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = SupervisorConfig::for_service("demo");
    let broker = LocalBroker::new(&cfg);

    let sup = Supervisor::builder(cfg, Arc::new(ShellFactory::default()))
        .with_subscriber(Arc::new(LogWriter::new()))
        .with_announcer(broker.announcer())
        .build();

    let mut announcements = broker.announcements();
    let printer = tokio::spawn(async move {
        while let Ok(payload) = announcements.recv().await {
            println!("[stopped] {}", String::from_utf8_lossy(&payload));
        }
    });

    let mut events = sup.subscribe();
    sup.start(broker.feeds()).await?;

    broker
        .publish_start(&StartRequest::new("work").with_param("command", "sleep 30"))
        .await;
    broker
        .publish_start(&StartRequest::new("short").with_param("argv", vec!["true"]))
        .await;
    broker
        .publish_start(
            &StartRequest::new("work")
                .with_param("argv", vec!["sleep", "60"])
                .with_param("env", serde_json_map(&[("DEMO", "1")])),
        )
        .await;

    // The second `work` request replaces the first.
    while events.recv().await?.kind != EventKind::SessionReplaced {}
    println!("[demo] live sessions: {:?}", sup.sessions().await);

    let delivered = broker.publish_stop(&StopRequest::new("work"));
    println!("[demo] stop delivered to {delivered} instance(s)");

    tokio::time::sleep(Duration::from_millis(500)).await;
    sup.stop().await?;

    // Let the finish hooks of the stopped processes announce.
    tokio::time::sleep(Duration::from_millis(500)).await;
    printer.abort();
    Ok(())
}

fn serde_json_map(pairs: &[(&str, &str)]) -> serde_json::Value {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), serde_json::Value::from(*v)))
        .collect::<serde_json::Map<_, _>>()
        .into()
}
