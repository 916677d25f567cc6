use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration file not found: {path:?}")]
  ConfigNotFound { path: PathBuf },

  #[error("Invalid configuration in {path:?}: {details}")]
  ConfigInvalid { path: PathBuf, details: String },

  #[error("Invalid duration '{input}': {reason}")]
  InvalidDuration { input: String, reason: String },

  #[error("Audio error: {0}")]
  Audio(String),

  #[error("IO error: {0}")]
  IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
