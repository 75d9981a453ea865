use super::TowerError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Tower error: {0}")]
    TowerError(#[from] TowerError),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}
