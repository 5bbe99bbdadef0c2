//! Date-range reports.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/reports/attendance` | `?from=&to=[&className=]` |
//! | `GET`  | `/reports/namaz` | `?from=&to=[&className=]` |

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDate;
use madrasa_core::{
  access::{Access, Section},
  dimension::{Attendance, Namaz},
  report::{self, AttendanceReportRow, DateRange, NamazReportRow},
  store::SchoolStore,
};
use serde::Deserialize;

use crate::{ApiState, auth::Principal, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeParams {
  #[serde(deserialize_with = "madrasa_core::day::deserialize")]
  pub from:       NaiveDate,
  #[serde(deserialize_with = "madrasa_core::day::deserialize")]
  pub to:         NaiveDate,
  pub class_name: Option<String>,
}

impl RangeParams {
  fn range(&self) -> Result<DateRange, ApiError> {
    Ok(DateRange::new(self.from, self.to)?)
  }
}

/// `GET /reports/attendance`
pub async fn attendance<S>(
  principal: Principal,
  State(state): State<ApiState<S>>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Vec<AttendanceReportRow>>, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  principal.require(Section::Reports, Access::Read)?;
  let range = params.range()?;
  let (roster, set) = state
    .store
    .snapshot::<Attendance>(range)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(report::attendance(&roster, &set, &range, params.class_name.as_deref())))
}

/// `GET /reports/namaz`
pub async fn namaz<S>(
  principal: Principal,
  State(state): State<ApiState<S>>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Vec<NamazReportRow>>, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  principal.require(Section::Reports, Access::Read)?;
  let range = params.range()?;
  let (roster, set) = state
    .store
    .snapshot::<Namaz>(range)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(report::namaz(&roster, &set, &range, params.class_name.as_deref())))
}
