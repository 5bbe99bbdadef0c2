//! Generic handlers shared by the five tracked dimensions.
//!
//! Mounted once per dimension (e.g. `/attendance`, `/namaz`):
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/{dim}` | `?date=&className=&studentId=`; date defaults to today |
//! | `PUT`    | `/{dim}` | Body: `{"studentId","date",...patch}`; 201 created, 200 updated |
//! | `DELETE` | `/{dim}` | `?date=` required, `&className=&studentId=` optional |
//! | `GET`    | `/{dim}/stats` | `?date=&className=` |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
};
use chrono::NaiveDate;
use madrasa_core::{
  access::Access,
  dimension::Dimension,
  record::{Record, Scope},
  roster::StudentId,
  store::SchoolStore,
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, auth::Principal, error::ApiError, today};

// ─── Parameters ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeParams {
  #[serde(default, deserialize_with = "madrasa_core::day::deserialize_opt")]
  pub date:       Option<NaiveDate>,
  pub class_name: Option<String>,
  pub student_id: Option<StudentId>,
}

impl ScopeParams {
  fn scope_on(self, date: NaiveDate) -> Scope {
    Scope {
      date,
      class_name: self.class_name.filter(|c| !c.trim().is_empty()),
      student_id: self.student_id.filter(|id| !id.as_str().trim().is_empty()),
    }
  }

  fn or_today(self) -> Scope {
    let date = self.date.unwrap_or_else(today);
    self.scope_on(date)
  }

  fn required(self) -> Result<Scope, ApiError> {
    let date = self
      .date
      .ok_or_else(|| ApiError::BadRequest("a date is required".into()))?;
    Ok(self.scope_on(date))
  }
}

/// A mark: the record's natural key plus the dimension's patch fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkBody<P> {
  pub student_id: StudentId,
  #[serde(deserialize_with = "madrasa_core::day::deserialize")]
  pub date:       NaiveDate,
  #[serde(flatten)]
  pub patch:      P,
}

#[derive(Debug, Serialize)]
pub struct Cleared {
  pub removed: usize,
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

/// `GET /{dim}`: the filter view.
pub async fn list<S, D>(
  principal: Principal,
  State(state): State<ApiState<S>>,
  Query(params): Query<ScopeParams>,
) -> Result<Json<Vec<Record<D>>>, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  D: Dimension,
{
  principal.require(D::SECTION, Access::Read)?;
  let records = state
    .store
    .records::<D>(params.or_today())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(records))
}

/// `PUT /{dim}`: create or update the record for `(studentId, date)`.
pub async fn mark<S, D>(
  principal: Principal,
  State(state): State<ApiState<S>>,
  Json(body): Json<MarkBody<D::Patch>>,
) -> Result<(StatusCode, Json<Record<D>>), ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  D: Dimension,
{
  principal.require(D::SECTION, Access::Write)?;
  let upserted = state
    .store
    .mark::<D>(body.student_id, body.date, body.patch)
    .await
    .map_err(ApiError::store)?;
  let status = if upserted.created { StatusCode::CREATED } else { StatusCode::OK };
  Ok((status, Json(upserted.record)))
}

/// `DELETE /{dim}`: bulk clear.
pub async fn clear<S, D>(
  principal: Principal,
  State(state): State<ApiState<S>>,
  Query(params): Query<ScopeParams>,
) -> Result<Json<Cleared>, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  D: Dimension,
{
  principal.require(D::SECTION, Access::Write)?;
  let removed = state
    .store
    .clear::<D>(params.required()?)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(Cleared { removed }))
}

/// `GET /{dim}/stats`
pub async fn stats<S, D>(
  principal: Principal,
  State(state): State<ApiState<S>>,
  Query(params): Query<ScopeParams>,
) -> Result<Json<D::Stats>, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  D: Dimension,
{
  principal.require(D::SECTION, Access::Read)?;
  let stats = state
    .store
    .summarize::<D>(params.or_today())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(stats))
}

#[cfg(test)]
mod tests {
  use axum::http::Uri;

  use super::*;

  fn params(query: &str) -> ScopeParams {
    let uri: Uri = format!("/api/attendance?{query}").parse().unwrap();
    Query::<ScopeParams>::try_from_uri(&uri).unwrap().0
  }

  #[test]
  fn blank_filters_mean_no_filter() {
    let scope = params("date=2024-01-15&className=&studentId=").or_today();
    assert_eq!(scope.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    assert_eq!(scope.class_name, None);
    assert_eq!(scope.student_id, None);

    let scope = params("date=2024-01-15&className=Hifz%20A&studentId=s1").or_today();
    assert_eq!(scope.class_name.as_deref(), Some("Hifz A"));
    assert_eq!(scope.student_id, Some(StudentId::from("s1")));
  }

  #[test]
  fn clearing_requires_a_date() {
    assert!(matches!(params("className=Hifz%20A").required(), Err(ApiError::BadRequest(_))));
    assert!(params("date=2024-01-15").required().is_ok());
  }
}
