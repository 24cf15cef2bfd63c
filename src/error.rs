use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Failures this service actually produces: startup wiring and store calls.
/// No error after startup is fatal, and none is surfaced to a client beyond
/// server-side logging.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server start failure: {0}")]
    StartServer(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
