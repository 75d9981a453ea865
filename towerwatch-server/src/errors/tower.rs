use axum::http::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TowerError {
    #[error("Tower not found")]
    TowerNotFound,

    #[error("Invalid output index")]
    InvalidOutputIndex,

    #[error("Missing mode")]
    MissingMode,
}

impl TowerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TowerError::TowerNotFound => StatusCode::NOT_FOUND,
            TowerError::InvalidOutputIndex => StatusCode::BAD_REQUEST,
            TowerError::MissingMode => StatusCode::BAD_REQUEST,
        }
    }
}
