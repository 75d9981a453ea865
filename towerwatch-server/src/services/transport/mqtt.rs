use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use towerwatch_api::{LogKind, topics};

use crate::configs::Gateway;
use crate::errors::ApiError;
use crate::services::{DeviceCommand, FleetHandle};

const MIN_KEEP_ALIVE: Duration = Duration::from_secs(5);
const RECONNECT_DELAY: Duration = Duration::from_secs(1);
const REQUEST_CAPACITY: usize = 64;

const CONNECTED: &str = "Connected to broker";
const DISCONNECTED: &str = "Disconnected from broker";

/// Bridge between the broker and the fleet engine.
///
/// Telemetry publishes are forwarded into the engine; device commands from
/// the engine are published while a broker session is up and dropped
/// otherwise.
pub struct MqttGateway {
    client: AsyncClient,
    event_loop: EventLoop,
    connected: Arc<AtomicBool>,
}

impl MqttGateway {
    pub fn new(gateway: &Gateway) -> Self {
        let mut options = MqttOptions::new(&gateway.client_id, &gateway.host, gateway.port);
        options.set_keep_alive(Duration::from_secs(gateway.keep_alive_secs).max(MIN_KEEP_ALIVE));

        if let Some(username) = &gateway.username {
            options.set_credentials(username, gateway.password.as_deref().unwrap_or_default());
        }

        let (client, event_loop) = AsyncClient::new(options, REQUEST_CAPACITY);

        Self {
            client,
            event_loop,
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawns the poll loop and the command publisher.
    pub fn start(self, fleet: FleetHandle, commands: mpsc::UnboundedReceiver<DeviceCommand>) -> (JoinHandle<()>, JoinHandle<()>) {
        let publisher = tokio::spawn(publish_commands(self.client.clone(), Arc::clone(&self.connected), commands));
        let poller = tokio::spawn(poll_broker(self.client, self.event_loop, self.connected, fleet));

        (poller, publisher)
    }
}

async fn poll_broker(client: AsyncClient, mut event_loop: EventLoop, connected: Arc<AtomicBool>, fleet: FleetHandle) {
    let mut healthy = true;

    loop {
        let forwarded = match event_loop.poll().await {
            Ok(event) => {
                if matches!(event, Event::Incoming(Packet::ConnAck(_))) {
                    healthy = true;
                }
                handle_event(event, &client, &connected, &fleet).await
            }
            Err(e) => {
                connected.store(false, Ordering::Release);
                tracing::error!("MQTT connection error: {}", e);

                let logged = if healthy {
                    healthy = false;
                    fleet.log(LogKind::Error, format!("Error: {e}")).await
                } else {
                    Ok(())
                };

                tokio::time::sleep(RECONNECT_DELAY).await;
                logged
            }
        };

        if forwarded.is_err() {
            break;
        }
    }

    tracing::debug!("MQTT poll loop stopped");
}

/// Applies one broker event. Fails only when the fleet engine is gone.
async fn handle_event(event: Event, client: &AsyncClient, connected: &AtomicBool, fleet: &FleetHandle) -> Result<(), ApiError> {
    match event {
        Event::Incoming(Packet::ConnAck(_)) => {
            connected.store(true, Ordering::Release);

            if let Err(e) = client.try_subscribe(topics::TOWER_EVENTS, QoS::AtLeastOnce) {
                tracing::error!("Failed to subscribe {}: {}", topics::TOWER_EVENTS, e);
            }
            tracing::info!("Connected to MQTT broker");
            fleet.log(LogKind::Mqtt, CONNECTED).await
        }
        Event::Incoming(Packet::Publish(publish)) => {
            fleet.telemetry(publish.topic, publish.payload.to_vec()).await
        }
        Event::Incoming(Packet::Disconnect) => {
            connected.store(false, Ordering::Release);
            tracing::warn!("Broker closed the MQTT session");
            fleet.log(LogKind::Mqtt, DISCONNECTED).await
        }
        _ => Ok(()),
    }
}

async fn publish_commands(client: AsyncClient, connected: Arc<AtomicBool>, mut commands: mpsc::UnboundedReceiver<DeviceCommand>) {
    while let Some(command) = commands.recv().await {
        if !connected.load(Ordering::Acquire) {
            tracing::debug!("MQTT offline, dropping command on {}", command.topic);
            continue;
        }

        let payload = match serde_json::to_vec(&command.payload) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to encode command for {}: {}", command.topic, e);
                continue;
            }
        };

        if let Err(e) = client.publish(&command.topic, QoS::AtMostOnce, false, payload).await {
            tracing::warn!("Failed to publish {}: {}", command.topic, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rumqttc::{ConnAck, ConnectReturnCode, Publish};

    use super::*;
    use crate::configs::{Fleet, Simulator as SimulatorSettings};
    use crate::services::{DeviceRegistry, FleetEngine, FleetRuntime, Simulator, default_regions};

    fn fleet() -> FleetHandle {
        let registry = DeviceRegistry::seed(default_regions(), 8, 1001, &mut StdRng::seed_from_u64(5));
        let engine = FleetEngine::new(registry, &Fleet::default(), Simulator::seeded(5));
        let simulator = SimulatorSettings {
            enabled: false,
            ..SimulatorSettings::default()
        };
        let (runtime, handle) = FleetRuntime::new(engine, Fleet::default(), simulator);
        tokio::spawn(runtime.run());
        handle
    }

    fn client() -> AsyncClient {
        let (client, _event_loop) = AsyncClient::new(MqttOptions::new("towerwatch-test", "localhost", 1883), 10);
        client
    }

    #[tokio::test]
    async fn test_session_changes_are_audited() {
        let fleet = fleet();
        let client = client();
        let connected = AtomicBool::new(false);

        let connack = Event::Incoming(Packet::ConnAck(ConnAck::new(ConnectReturnCode::Success, false)));
        handle_event(connack, &client, &connected, &fleet).await.unwrap();
        assert!(connected.load(Ordering::Acquire));

        handle_event(Event::Incoming(Packet::Disconnect), &client, &connected, &fleet)
            .await
            .unwrap();
        assert!(!connected.load(Ordering::Acquire));

        let logs = fleet.snapshot().await.unwrap().logs;
        let session: Vec<_> = logs
            .iter()
            .filter(|entry| entry.kind == LogKind::Mqtt)
            .map(|entry| entry.msg.as_str())
            .collect();
        assert_eq!(session, vec![CONNECTED, DISCONNECTED]);
    }

    #[tokio::test]
    async fn test_publish_is_forwarded_as_telemetry() {
        let fleet = fleet();
        let connected = AtomicBool::new(true);

        let publish = Publish::new("tower/PERTH PR1001/event/io", QoS::AtLeastOnce, r#"{"inputs":[1,0,0]}"#);
        handle_event(Event::Incoming(Packet::Publish(publish)), &client(), &connected, &fleet)
            .await
            .unwrap();

        let snapshot = fleet.snapshot().await.unwrap();
        assert_eq!(snapshot.towers[0].inputs, [1, 0, 0]);
        assert_eq!(snapshot.stats.alarms, 1);
    }
}
