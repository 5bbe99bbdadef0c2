//! API error type and [`axum::response::IntoResponse`] implementation.

use std::error::Error as StdError;

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use madrasa_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn StdError + Send + Sync>),
}

impl ApiError {
  /// Wrap a store error, surfacing domain failures anywhere in its source
  /// chain as client errors.
  pub fn store<E>(e: E) -> Self
  where
    E: StdError + Send + Sync + 'static,
  {
    core_error(&e)
      .and_then(Self::classify)
      .unwrap_or_else(|| Self::Store(Box::new(e)))
  }

  fn classify(e: &CoreError) -> Option<Self> {
    match e {
      CoreError::StudentNotFound(_) => Some(Self::NotFound(e.to_string())),
      CoreError::DuplicateStudent(_) => Some(Self::Conflict(e.to_string())),
      CoreError::Validation { .. }
      | CoreError::InvalidDate(_)
      | CoreError::InvalidTime(_) => Some(Self::BadRequest(e.to_string())),
      CoreError::Serialization(_) => None,
    }
  }
}

impl From<CoreError> for ApiError {
  fn from(e: CoreError) -> Self { Self::store(e) }
}

fn core_error<'a>(e: &'a (dyn StdError + 'static)) -> Option<&'a CoreError> {
  let mut current = Some(e);
  while let Some(err) = current {
    if let Some(core) = err.downcast_ref::<CoreError>() {
      return Some(core);
    }
    current = err.source();
  }
  None
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    let mut res = (status, Json(json!({ "error": self.to_string() }))).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"madrasa\""),
      );
    }
    res
  }
}
