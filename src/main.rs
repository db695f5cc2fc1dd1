use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use testbed_monitor::api::{create_router, AppState};
use testbed_monitor::bus::MqttBus;
use testbed_monitor::commands::{CommandConsole, ManagerClient};
use testbed_monitor::config::load_from_env;
use testbed_monitor::settings::SettingsStore;
use testbed_monitor::state::{Monitor, MonitorHandle};
use tokio::sync::mpsc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "testbed_monitor=info".into()),
        )
        .init();

    info!("Testbed monitor starting...");

    let config = load_from_env()?;
    info!(
        mqtt_host = %config.mqtt.host,
        mqtt_port = config.mqtt.port,
        manager_api = %config.manager_api.base_url,
        settings_db = %config.storage.path,
        bind = %config.server.bind,
        "Configuration loaded"
    );

    // Restore persisted settings
    let settings_store = Arc::new(
        SettingsStore::new(&config.storage.path).context("Failed to open settings store")?,
    );
    let settings = settings_store
        .load(&config.display.default_prefix)
        .context("Failed to load settings")?;
    info!(
        prefix = %settings.prefix,
        panels = settings.logs_count,
        theme = settings.theme.as_str(),
        "Settings restored"
    );

    // Monitor state and ingestion
    let monitor = MonitorHandle::new(Monitor::new(
        settings.prefix.clone(),
        settings.logs_count,
        config.display.max_count,
    ));
    let (events_tx, events_rx) = mpsc::channel(config.mqtt.channel_capacity);
    let (bus, bus_handle) = MqttBus::spawn(config.mqtt.clone(), events_tx);
    let ingest_handle = tokio::spawn(monitor.clone().run_ingest(events_rx));

    // Manager command console
    let client =
        ManagerClient::new(&config.manager_api).context("Failed to create manager client")?;
    let console = Arc::new(CommandConsole::new(client, Arc::clone(&settings_store)));

    // Start HTTP API server
    let app_state = Arc::new(AppState {
        monitor,
        console,
        settings: settings_store,
        connection: bus.watch_status(),
        export_dir: PathBuf::from(&config.storage.export_dir),
    });
    let router = create_router(app_state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!(bind = %config.server.bind, "Console API listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "Console API server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    // Graceful shutdown
    server_handle.abort();
    if let Err(e) = bus.disconnect().await {
        warn!(error = %e, "Failed to disconnect from MQTT broker");
    }
    bus_handle.abort();
    ingest_handle.abort();
    info!("Testbed monitor stopped");

    Ok(())
}
