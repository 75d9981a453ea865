use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogKind {
    System,
    #[serde(rename = "MQTT")]
    Mqtt,
    #[serde(rename = "ALARM")]
    Alarm,
    #[serde(rename = "LED")]
    Led,
    Output,
    #[serde(rename = "PTT")]
    Ptt,
    #[serde(rename = "error")]
    Error,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(with = "time::serde::rfc3339")]
    pub ts: OffsetDateTime,
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub msg: String,
}

impl LogEntry {
    pub fn now(kind: LogKind, msg: impl Into<String>) -> Self {
        Self {
            ts: OffsetDateTime::now_utc(),
            kind,
            msg: msg.into(),
        }
    }
}
