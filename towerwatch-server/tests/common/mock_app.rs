use axum::Router;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;
use towerwatch_server::app::create_app;
use towerwatch_server::configs::{Fleet, Simulator as SimulatorSettings};
use towerwatch_server::services::{
    DeviceCommand, DeviceRegistry, FleetEngine, FleetHandle, FleetRuntime, Simulator, default_regions,
};

pub const TOWERS: usize = 16;

pub struct MockApp {
    pub router: Router,
    pub fleet: FleetHandle,
    pub commands: mpsc::UnboundedReceiver<DeviceCommand>,
}

impl MockApp {
    pub fn new() -> Self {
        Self::with_fleet(Fleet::default())
    }

    pub fn with_fleet(fleet: Fleet) -> Self {
        let mut rng = StdRng::seed_from_u64(42);
        let mut registry = DeviceRegistry::seed(default_regions(), TOWERS, fleet.first_sequence, &mut rng);
        for tower in registry.towers_mut() {
            tower.online = true;
        }

        let (outbox, commands) = mpsc::unbounded_channel();
        let engine = FleetEngine::new(registry, &fleet, Simulator::seeded(42)).with_outbox(outbox);

        let simulator = SimulatorSettings {
            enabled: false,
            ..SimulatorSettings::default()
        };
        let (runtime, handle) = FleetRuntime::new(engine, fleet, simulator);
        tokio::spawn(runtime.run());

        Self {
            router: create_app(handle.clone()),
            fleet: handle,
            commands,
        }
    }
}
