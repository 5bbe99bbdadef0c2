//! Error types for `madrasa-core`.

use thiserror::Error;

use crate::roster::StudentId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("student not found: {0}")]
  StudentNotFound(StudentId),

  #[error("student {0} already exists")]
  DuplicateStudent(StudentId),

  #[error("invalid {field}: {reason}")]
  Validation {
    field:  &'static str,
    reason: String,
  },

  #[error("invalid date: {0:?}")]
  InvalidDate(String),

  #[error("invalid time: {0:?}")]
  InvalidTime(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
    Self::Validation { field, reason: reason.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
