use std::env;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gateway {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "Gateway::default_keep_alive")]
    pub keep_alive_secs: u64,
}

impl Gateway {
    fn default_keep_alive() -> u64 {
        5
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Fleet {
    pub total_towers: usize,
    pub first_sequence: u32,
    /// Entries kept in the log ring buffer
    pub log_capacity: usize,
    /// Entries included in snapshots sent to new observers
    pub snapshot_logs: usize,
    pub broadcast_capacity: usize,
    pub sweep_interval_ms: u64,
    pub demo_call_clear_ms: u64,
}

impl Default for Fleet {
    fn default() -> Self {
        Self {
            total_towers: 1000,
            first_sequence: 1001,
            log_capacity: 300,
            snapshot_logs: 80,
            broadcast_capacity: 1024,
            sweep_interval_ms: 1000,
            demo_call_clear_ms: 15_000,
        }
    }
}

impl Fleet {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn demo_call_clear(&self) -> Duration {
        Duration::from_millis(self.demo_call_clear_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Simulator {
    pub enabled: bool,
    pub call_interval_secs: u64,
    pub call_clear_ms: u64,
    pub output_interval_secs: u64,
}

impl Default for Simulator {
    fn default() -> Self {
        Self {
            enabled: true,
            call_interval_secs: 15,
            call_clear_ms: 12_000,
            output_interval_secs: 18,
        }
    }
}

impl Simulator {
    pub fn call_interval(&self) -> Duration {
        Duration::from_secs(self.call_interval_secs)
    }

    pub fn call_clear(&self) -> Duration {
        Duration::from_millis(self.call_clear_ms)
    }

    pub fn output_interval(&self) -> Duration {
        Duration::from_secs(self.output_interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub gateway: Option<Gateway>,
    #[serde(default)]
    pub fleet: Fleet,
    #[serde(default)]
    pub simulator: Simulator,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()?;

        if settings.fleet.total_towers == 0 {
            return Err(ConfigError::Message("fleet.total_towers must be positive".into()));
        }

        if settings.fleet.sweep_interval_ms == 0 {
            return Err(ConfigError::Message("fleet.sweep_interval_ms must be positive".into()));
        }

        if settings.simulator.enabled
            && (settings.simulator.call_interval_secs == 0 || settings.simulator.output_interval_secs == 0)
        {
            return Err(ConfigError::Message("simulator intervals must be positive".into()));
        }

        Ok(settings)
    }
}
