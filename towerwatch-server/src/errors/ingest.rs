/// Reasons a telemetry payload is rejected before it reaches the registry.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("{0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("expected a JSON object")]
    NotAnObject,
}
