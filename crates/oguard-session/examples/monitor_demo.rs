//! Demo: simulated monitoring session
//!
//! Runs a short camera session over the simulated capture and detection
//! backends, printing events and a final snapshot.
//!
//! Run with: cargo run -p oguard-session --example monitor_demo

use std::time::Duration;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use oguard_models::{CaptureSource, SessionEvent};
use oguard_session::{SessionConfig, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("oguard=info,monitor_demo=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(env_filter)
        .init();

    let mut config = SessionConfig::from_env();
    config.poll_interval = Duration::from_millis(500);

    let store = SessionStore::simulated(config);
    let mut events = store.subscribe();

    let event_task = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SessionEvent::PhaseChanged { phase, error, .. } => match error {
                    Some(error) => println!("phase -> {} ({})", phase, error),
                    None => println!("phase -> {}", phase),
                },
                SessionEvent::AlertsAppended { alerts } => {
                    for alert in alerts {
                        println!("[{}] {}", alert.severity, alert.message);
                    }
                }
            }
        }
    });

    store.start_session(CaptureSource::camera(640, 480)).await?;
    tokio::time::sleep(Duration::from_secs(5)).await;
    store.stop_session().await;

    let snapshot = store.snapshot();
    println!(
        "\nfinal snapshot ({} critical alerts):\n{}",
        snapshot.critical_alert_count(),
        serde_json::to_string_pretty(&snapshot)?
    );

    drop(store);
    event_task.abort();
    Ok(())
}
