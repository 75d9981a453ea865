use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use towerwatch_api::LogKind;

use crate::app::create_app;
use crate::configs::Settings;
use crate::services::*;

pub mod app;
pub mod configs;
pub mod errors;
pub mod handles;
pub mod services;

pub async fn run(settings: &Arc<Settings>) -> anyhow::Result<()> {
    let registry = DeviceRegistry::seed(
        default_regions(),
        settings.fleet.total_towers,
        settings.fleet.first_sequence,
        &mut rand::rng(),
    );
    tracing::info!("Seeded {} towers", registry.len());

    let mut engine = FleetEngine::new(registry, &settings.fleet, Simulator::from_os_rng());

    let gateway = match &settings.gateway {
        Some(gateway) => {
            let (outbox, commands) = mpsc::unbounded_channel();
            engine = engine.with_outbox(outbox);
            Some((MqttGateway::new(gateway), commands))
        }
        None => {
            engine.log(LogKind::Mqtt, "MQTT gateway not configured. MQTT disabled; running simulator only.");
            None
        }
    };

    engine.log(
        LogKind::System,
        format!(
            "Server started on {} (simulator={}, mqtt={})",
            settings.server.port,
            settings.simulator.enabled,
            if gateway.is_some() { "on" } else { "off" },
        ),
    );

    let (runtime, fleet) = FleetRuntime::new(engine, settings.fleet.clone(), settings.simulator.clone());
    let runtime = tokio::spawn(runtime.run());

    if let Some((gateway, commands)) = gateway {
        gateway.start(fleet.clone(), commands);
    }

    let app = create_app(fleet);

    let ip_addr = settings
        .server
        .host
        .parse::<IpAddr>()
        .with_context(|| format!("Invalid server host {}", settings.server.host))?;
    let address = SocketAddr::from((ip_addr, settings.server.port));
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    tracing::info!("listening on {:?}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    runtime.abort();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutting down");
}
