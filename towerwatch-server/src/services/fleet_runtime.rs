use std::future::pending;
use std::time::Duration;

use anyhow::anyhow;
use time::OffsetDateTime;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use towerwatch_api::restful::{AckResponse, LedRequest, LedResponse, TowerResponse};
use towerwatch_api::{FleetSnapshot, LogKind};

use crate::configs::{Fleet, Simulator as SimulatorSettings};
use crate::errors::{ApiError, TowerError};
use crate::services::alarm_service::PendingClear;
use crate::services::broadcast_service::Observer;
use crate::services::fleet_service::FleetEngine;

const INBOX_CAPACITY: usize = 256;

/// Unix epoch milliseconds.
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Wall-clock milliseconds advanced by the tokio clock, so LED expiry and
/// the sweep interval measure the same time.
#[derive(Debug, Clone, Copy)]
struct FleetClock {
    epoch_ms: i64,
    started: Instant,
}

impl FleetClock {
    fn start() -> Self {
        Self {
            epoch_ms: now_millis(),
            started: Instant::now(),
        }
    }

    fn now(&self) -> i64 {
        self.epoch_ms + self.started.elapsed().as_millis() as i64
    }
}

type Reply<T> = oneshot::Sender<T>;

pub enum FleetRequest {
    Telemetry { topic: String, payload: Vec<u8> },
    Log { kind: LogKind, msg: String },
    Snapshot(Reply<FleetSnapshot>),
    Subscribe(Reply<Observer>),
    ToggleOutput { tower: String, index: i64, reply: Reply<Result<TowerResponse, TowerError>> },
    ApplyLed { tower: String, request: LedRequest, reply: Reply<Result<LedResponse, TowerError>> },
    PressToTalk { tower: String, reply: Reply<Result<AckResponse, TowerError>> },
    DemoCall { tower: Option<String>, reply: Reply<Result<AckResponse, TowerError>> },
    ExpireCall { tower: String },
}

/// Cloneable entry point into the running engine.
#[derive(Clone)]
pub struct FleetHandle {
    sender: mpsc::Sender<FleetRequest>,
}

impl FleetHandle {
    pub async fn telemetry(&self, topic: String, payload: Vec<u8>) -> Result<(), ApiError> {
        self.send(FleetRequest::Telemetry { topic, payload }).await
    }

    pub async fn log(&self, kind: LogKind, msg: impl Into<String>) -> Result<(), ApiError> {
        self.send(FleetRequest::Log { kind, msg: msg.into() }).await
    }

    pub async fn snapshot(&self) -> Result<FleetSnapshot, ApiError> {
        self.call(FleetRequest::Snapshot).await
    }

    pub async fn subscribe(&self) -> Result<Observer, ApiError> {
        self.call(FleetRequest::Subscribe).await
    }

    pub async fn toggle_output(&self, tower: String, index: i64) -> Result<TowerResponse, ApiError> {
        Ok(self
            .call(|reply| FleetRequest::ToggleOutput { tower, index, reply })
            .await??)
    }

    pub async fn apply_led(&self, tower: String, request: LedRequest) -> Result<LedResponse, ApiError> {
        Ok(self
            .call(|reply| FleetRequest::ApplyLed { tower, request, reply })
            .await??)
    }

    pub async fn press_to_talk(&self, tower: String) -> Result<AckResponse, ApiError> {
        Ok(self
            .call(|reply| FleetRequest::PressToTalk { tower, reply })
            .await??)
    }

    pub async fn demo_call(&self, tower: Option<String>) -> Result<AckResponse, ApiError> {
        Ok(self
            .call(|reply| FleetRequest::DemoCall { tower, reply })
            .await??)
    }

    async fn send(&self, request: FleetRequest) -> Result<(), ApiError> {
        self.sender
            .send(request)
            .await
            .map_err(|_| ApiError::InternalError(anyhow!("Fleet engine stopped")))
    }

    async fn call<T>(&self, request: impl FnOnce(Reply<T>) -> FleetRequest) -> Result<T, ApiError> {
        let (reply, response) = oneshot::channel();
        self.send(request(reply)).await?;

        response
            .await
            .map_err(|_| ApiError::InternalError(anyhow!("Fleet engine dropped the request")))
    }
}

/// Task that exclusively owns the [`FleetEngine`].
///
/// Requests, the LED sweep and simulator ticks are handled one at a time, so
/// each mutation and its broadcasts complete before the next begins.
pub struct FleetRuntime {
    engine: FleetEngine,
    inbox: mpsc::Receiver<FleetRequest>,
    weak: mpsc::WeakSender<FleetRequest>,
    clock: FleetClock,
    fleet: Fleet,
    simulator: SimulatorSettings,
}

impl FleetRuntime {
    pub fn new(engine: FleetEngine, fleet: Fleet, simulator: SimulatorSettings) -> (Self, FleetHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let weak = sender.downgrade();

        let runtime = Self {
            engine,
            inbox,
            weak,
            clock: FleetClock::start(),
            fleet,
            simulator,
        };

        (runtime, FleetHandle { sender })
    }

    /// Runs until every [`FleetHandle`] is dropped, then returns the engine.
    pub async fn run(mut self) -> FleetEngine {
        let mut sweep = ticker(self.fleet.sweep_interval());
        let (mut calls, mut outputs) = if self.simulator.enabled {
            (
                Some(ticker(self.simulator.call_interval())),
                Some(ticker(self.simulator.output_interval())),
            )
        } else {
            (None, None)
        };

        loop {
            tokio::select! {
                request = self.inbox.recv() => {
                    match request {
                        Some(request) => self.handle(request),
                        None => break,
                    }
                }
                _ = sweep.tick() => {
                    let expired = self.engine.sweep_leds(self.clock.now());
                    if expired > 0 {
                        tracing::debug!("LED sweep reset {} towers", expired);
                    }
                }
                _ = tick(&mut calls) => {
                    if let Some(pending) = self.engine.simulate_call(self.simulator.call_clear()) {
                        self.schedule(pending);
                    }
                }
                _ = tick(&mut outputs) => {
                    self.engine.simulate_output();
                }
            }
        }

        tracing::info!("Fleet runtime stopped");
        self.engine
    }

    fn handle(&mut self, request: FleetRequest) {
        match request {
            FleetRequest::Telemetry { topic, payload } => {
                let outcome = self.engine.ingest(&topic, &payload, self.clock.now());
                tracing::trace!("{} -> {:?}", topic, outcome);
            }
            FleetRequest::Log { kind, msg } => self.engine.log(kind, msg),
            FleetRequest::Snapshot(reply) => {
                let _ = reply.send(self.engine.snapshot());
            }
            FleetRequest::Subscribe(reply) => {
                let _ = reply.send(self.engine.subscribe());
            }
            FleetRequest::ToggleOutput { tower, index, reply } => {
                let _ = reply.send(self.engine.toggle_output(&tower, index));
            }
            FleetRequest::ApplyLed { tower, request, reply } => {
                let _ = reply.send(self.engine.apply_led(&tower, &request, self.clock.now()));
            }
            FleetRequest::PressToTalk { tower, reply } => {
                let _ = reply.send(self.engine.press_to_talk(&tower));
            }
            FleetRequest::DemoCall { tower, reply } => {
                let result = self
                    .engine
                    .demo_call(tower.as_deref(), self.fleet.demo_call_clear())
                    .map(|pending| {
                        self.schedule(pending);
                        AckResponse::ok()
                    });
                let _ = reply.send(result);
            }
            FleetRequest::ExpireCall { tower } => {
                if !self.engine.expire_call(&tower) {
                    tracing::debug!("Call on {} already cleared", tower);
                }
            }
        }
    }

    /// Posts an [`FleetRequest::ExpireCall`] after the clear delay. Not
    /// cancelled when superseded; the engine re-checks the line on arrival.
    fn schedule(&self, pending: PendingClear) {
        let weak = self.weak.clone();

        tokio::spawn(async move {
            tokio::time::sleep(pending.after).await;
            if let Some(sender) = weak.upgrade() {
                let _ = sender
                    .send(FleetRequest::ExpireCall { tower: pending.tower })
                    .await;
            }
        });
    }
}

fn ticker(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending::<()>().await,
    }
}
