use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Status,
    Io,
    Call,
    Led,
}

impl EventKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "status" => Some(EventKind::Status),
            "io" => Some(EventKind::Io),
            "call" => Some(EventKind::Call),
            "led" => Some(EventKind::Led),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventKind::Status => write!(f, "status"),
            EventKind::Io => write!(f, "io"),
            EventKind::Call => write!(f, "call"),
            EventKind::Led => write!(f, "led"),
        }
    }
}

/// A `tower/<id>/event/<kind>` topic with the id percent-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryTopic {
    pub tower: String,
    pub kind: EventKind,
}

impl TelemetryTopic {
    pub fn parse(topic: &str) -> Option<Self> {
        let parts: Vec<&str> = topic.split('/').collect();
        if parts.len() < 4 || parts[0] != "tower" || parts[2] != "event" {
            return None;
        }

        let kind = EventKind::parse(parts[3])?;
        let tower = urlencoding::decode(parts[1]).ok()?.into_owned();

        Some(Self { tower, kind })
    }
}
