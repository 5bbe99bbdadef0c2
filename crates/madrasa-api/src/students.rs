//! Handlers for the roster.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/students` | Optional `?className=` |
//! | `POST`   | `/students` | Body: a `NewStudent`; admission date defaults to today |
//! | `GET`    | `/students/{id}` | 404 if not found |
//! | `PATCH`  | `/students/{id}` | Body: a `StudentPatch` |
//! | `DELETE` | `/students/{id}` | Existing records are kept |
//! | `GET`    | `/classes` | Derived from the roster |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use madrasa_core::{
  access::{Access, Section},
  roster::{ClassSummary, NewStudent, Student, StudentId, StudentPatch},
  store::SchoolStore,
};
use serde::Deserialize;

use crate::{ApiState, auth::Principal, error::ApiError, today};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub class_name: Option<String>,
}

/// `GET /students[?className=<class>]`
pub async fn list<S>(
  principal: Principal,
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Student>>, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  principal.require(Section::Students, Access::Read)?;
  let students = state
    .store
    .list_students(params.class_name)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(students))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /students`
pub async fn create<S>(
  principal: Principal,
  State(state): State<ApiState<S>>,
  Json(body): Json<NewStudent>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  principal.require(Section::Students, Access::Write)?;
  let student = state
    .store
    .add_student(body, today())
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(student)))
}

// ─── Single student ───────────────────────────────────────────────────────────

/// `GET /students/{id}`
pub async fn get_one<S>(
  principal: Principal,
  State(state): State<ApiState<S>>,
  Path(id): Path<StudentId>,
) -> Result<Json<Student>, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  principal.require(Section::Students, Access::Read)?;
  let student = state
    .store
    .get_student(id.clone())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("student {id}")))?;
  Ok(Json(student))
}

/// `PATCH /students/{id}`
pub async fn update<S>(
  principal: Principal,
  State(state): State<ApiState<S>>,
  Path(id): Path<StudentId>,
  Json(patch): Json<StudentPatch>,
) -> Result<Json<Student>, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  principal.require(Section::Students, Access::Write)?;
  let student = state
    .store
    .update_student(id, patch)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(student))
}

/// `DELETE /students/{id}`
pub async fn remove<S>(
  principal: Principal,
  State(state): State<ApiState<S>>,
  Path(id): Path<StudentId>,
) -> Result<StatusCode, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  principal.require(Section::Students, Access::Write)?;
  if state
    .store
    .remove_student(id.clone())
    .await
    .map_err(ApiError::store)?
  {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("student {id}")))
  }
}

// ─── Classes ──────────────────────────────────────────────────────────────────

/// `GET /classes`
pub async fn classes<S>(
  principal: Principal,
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<ClassSummary>>, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  principal.require(Section::Classes, Access::Read)?;
  let classes = state.store.classes().await.map_err(ApiError::store)?;
  Ok(Json(classes))
}
