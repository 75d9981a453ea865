use std::collections::VecDeque;

use tokio::sync::broadcast;
use towerwatch_api::{FleetSnapshot, FleetStats, LogEntry, LogKind, ObserverMessage, Tower};

/// Append-only ring buffer of domain log entries.
pub struct LogBook {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl LogBook {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an entry, evicting the oldest once full.
    pub fn append(&mut self, kind: LogKind, msg: impl Into<String>) -> LogEntry {
        let entry = LogEntry::now(kind, msg);

        if self.capacity == 0 {
            return entry;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.clone());

        entry
    }

    /// The last `count` entries, oldest first.
    pub fn recent(&self, count: usize) -> Vec<LogEntry> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A connected observer: the snapshot to send first, then every broadcast
/// published after it was taken.
pub struct Observer {
    pub init: ObserverMessage,
    pub receiver: broadcast::Receiver<ObserverMessage>,
}

/// Fan-out of state deltas to every connected observer.
///
/// Backed by a bounded broadcast channel, so publishing never waits on an
/// observer; one that falls behind skips ahead on its own receiver.
pub struct BroadcastHub {
    sender: broadcast::Sender<ObserverMessage>,
}

impl BroadcastHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));

        Self { sender }
    }

    /// Registers an observer starting from `snapshot`.
    pub fn subscribe(&self, snapshot: FleetSnapshot) -> Observer {
        Observer {
            init: ObserverMessage::Init { data: snapshot },
            receiver: self.sender.subscribe(),
        }
    }

    /// Sends to every observer, returning how many were connected.
    pub fn publish(&self, message: ObserverMessage) -> usize {
        self.sender.send(message).unwrap_or(0)
    }

    pub fn publish_tower(&self, tower: Tower) -> usize {
        self.publish(ObserverMessage::TowerUpdate { tower })
    }

    pub fn publish_stats(&self, stats: FleetStats) -> usize {
        self.publish(ObserverMessage::Stats { stats })
    }

    pub fn publish_log(&self, entry: LogEntry) -> usize {
        self.publish(ObserverMessage::Log { entry })
    }

    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
