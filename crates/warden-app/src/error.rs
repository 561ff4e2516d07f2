use thiserror::Error;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    CoreError(#[from] warden_core::error::CoreError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
