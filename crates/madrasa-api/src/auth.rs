//! HTTP Basic authentication and the per-request access check.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use madrasa_core::{
  access::{self, Access, Role, Section},
  store::SchoolStore,
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

/// A configured login.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub role:          Role,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
  pub username: String,
  pub role:     Role,
}

impl Principal {
  /// Consult the access table for this request.
  pub fn require(&self, section: Section, access: Access) -> Result<(), ApiError> {
    if access::allows(self.role, section, access) {
      return Ok(());
    }
    tracing::debug!(user = %self.username, role = %self.role, %section, %access, "access denied");
    Err(ApiError::Forbidden(format!(
      "role {} may not {access} {section}",
      self.role
    )))
  }
}

/// Verify Basic credentials against the configured accounts.
pub fn authenticate(headers: &HeaderMap, accounts: &[Account]) -> Result<Principal, ApiError> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  let account = accounts
    .iter()
    .find(|a| a.username == username)
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&account.password_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(Principal { username: account.username.clone(), role: account.role })
}

impl<S> FromRequestParts<ApiState<S>> for Principal
where
  S: SchoolStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    authenticate(&parts.headers, &state.accounts)
  }
}

/// Argon2id hash with light parameters; verification reads them back from
/// the PHC string.
#[cfg(test)]
pub(crate) fn test_hash(password: &str) -> String {
  use argon2::{Algorithm, Params, PasswordHasher, Version, password_hash::SaltString};
  use rand_core::OsRng;

  let params = Params::new(1024, 1, 1, None).unwrap();
  let salt = SaltString::generate(&mut OsRng);
  Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    .hash_password(password.as_bytes(), &salt)
    .unwrap()
    .to_string()
}
