//! JSON REST API for the Madrasa record ledger.
//!
//! Exposes an axum [`Router`] backed by any [`SchoolStore`]. Every route
//! except `/api/status` requires HTTP Basic credentials, and each handler
//! checks the caller's role against the access table before touching the
//! store.

pub mod auth;
pub mod error;
pub mod records;
pub mod reports;
pub mod students;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  extract::{Request, State},
  http::{HeaderName, HeaderValue},
  middleware::{self, Next},
  response::Response,
  routing::get,
};
use chrono::NaiveDate;
use madrasa_core::{
  access::{self, Role, Section},
  dimension::{Attendance, Dimension, Discipline, Fitness, IslamicStudies, Namaz},
  store::{DataSource, SchoolStore},
};
use serde::{Deserialize, Serialize};

pub use auth::{Account, Principal};
pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Load the demo roster into an empty store at startup.
  #[serde(default)]
  pub seed_demo:  bool,
  #[serde(default)]
  pub users:      Vec<Account>,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct ApiState<S: SchoolStore> {
  pub store:    Arc<S>,
  pub accounts: Arc<Vec<Account>>,
}

/// The server's local calendar day.
pub fn today() -> NaiveDate { chrono::Local::now().date_naive() }

const DATA_SOURCE_HEADER: HeaderName = HeaderName::from_static("x-data-source");

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router, with every route under `/api`.
pub fn router<S>(state: ApiState<S>) -> Router
where
  S: SchoolStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let api = Router::new()
    .route("/status", get(status::<S>))
    .route("/auth/profile", get(profile::<S>))
    // Roster
    .route("/students", get(students::list::<S>).post(students::create::<S>))
    .route(
      "/students/{id}",
      get(students::get_one::<S>)
        .patch(students::update::<S>)
        .delete(students::remove::<S>),
    )
    .route("/classes", get(students::classes::<S>))
    // Reports
    .route("/reports/attendance", get(reports::attendance::<S>))
    .route("/reports/namaz", get(reports::namaz::<S>));

  let api = dimension::<S, Attendance>(api, "/attendance");
  let api = dimension::<S, Namaz>(api, "/namaz");
  let api = dimension::<S, IslamicStudies>(api, "/islamic-studies");
  let api = dimension::<S, Discipline>(api, "/discipline");
  let api = dimension::<S, Fitness>(api, "/fitness");

  Router::new()
    .nest("/api", api)
    .layer(middleware::from_fn_with_state(state.clone(), data_source_header::<S>))
    .with_state(state)
}

/// Mount the record routes for one dimension at `path`.
fn dimension<S, D>(router: Router<ApiState<S>>, path: &str) -> Router<ApiState<S>>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  D: Dimension,
{
  router
    .route(
      path,
      get(records::list::<S, D>)
        .put(records::mark::<S, D>)
        .delete(records::clear::<S, D>),
    )
    .route(&format!("{path}/stats"), get(records::stats::<S, D>))
}

/// Tag every response with where the store's data came from.
async fn data_source_header<S>(
  State(state): State<ApiState<S>>,
  req: Request,
  next: Next,
) -> Response
where
  S: SchoolStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut res = next.run(req).await;
  match state.store.data_source().await {
    Ok(source) => {
      let name: &'static str = source.into();
      res
        .headers_mut()
        .insert(DATA_SOURCE_HEADER, HeaderValue::from_static(name));
    }
    Err(e) => tracing::warn!(error = %e, "could not read data source"),
  }
  res
}

// ─── Session handlers ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
  pub data_source: DataSource,
}

/// `GET /status`: unauthenticated.
async fn status<S>(State(state): State<ApiState<S>>) -> Result<Json<Status>, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let data_source = state.store.data_source().await.map_err(ApiError::store)?;
  Ok(Json(Status { data_source }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
  pub username: String,
  pub role:     Role,
  /// Sections this role may open, in navigation order.
  pub sections: Vec<Section>,
}

/// `GET /auth/profile`
async fn profile<S>(principal: Principal) -> Json<Profile>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Json(Profile {
    sections: access::sections(principal.role),
    username: principal.username,
    role:     principal.role,
  })
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use madrasa_core::demo::demo_roster;
  use madrasa_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use crate::auth::test_hash;

  async fn make_state() -> ApiState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store.seed_roster(demo_roster(today())).await.unwrap();
    let hash = test_hash("secret");
    let account = |username: &str, role| Account {
      username: username.to_string(),
      password_hash: hash.clone(),
      role,
    };
    ApiState {
      store:    Arc::new(store),
      accounts: Arc::new(vec![
        account("admin", Role::Admin),
        account("teacher", Role::Teacher),
        account("parent", Role::Parent),
      ]),
    }
  }

  async fn call(
    state: &ApiState<SqliteStore>,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
      let creds = B64.encode(format!("{user}:secret"));
      builder = builder.header(header::AUTHORIZATION, format!("Basic {creds}"));
    }
    let req = match body {
      Some(body) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let source = resp
      .headers()
      .get("x-data-source")
      .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, source, json)
  }

  // ── Session ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn status_is_public_and_reports_demo_data() {
    let state = make_state().await;
    let (status, source, body) = call(&state, Method::GET, "/api/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dataSource"], "demo");
    assert_eq!(source.as_deref(), Some("demo"));
  }

  #[tokio::test]
  async fn profile_lists_visible_sections() {
    let state = make_state().await;
    let (status, _, body) =
      call(&state, Method::GET, "/api/auth/profile", Some("parent"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "parent");
    let sections = body["sections"].as_array().unwrap();
    assert!(sections.contains(&json!("namaz")));
    assert!(!sections.contains(&json!("students")));
  }

  // ── Access ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_credentials_return_401() {
    let state = make_state().await;
    let (status, _, body) = call(&state, Method::GET, "/api/students", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
  }

  #[tokio::test]
  async fn parents_cannot_mark() {
    let state = make_state().await;
    let mark = json!({ "studentId": "s1", "date": "2024-05-01", "status": "absent" });
    let (status, _, _) =
      call(&state, Method::PUT, "/api/attendance", Some("parent"), Some(mark)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, body) = call(
      &state,
      Method::GET,
      "/api/attendance?date=2024-05-01",
      Some("parent"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
  }

  // ── Roster ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn roster_crud_flips_data_source_to_live() {
    let state = make_state().await;
    let new = json!({ "name": "Khadija Omar", "className": "Hifz A", "guardianName": "Omar" });

    let (status, _, _) =
      call(&state, Method::POST, "/api/students", Some("teacher"), Some(new.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, source, created) =
      call(&state, Method::POST, "/api/students", Some("admin"), Some(new)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(source.as_deref(), Some("live"));
    let id = created["studentId"].as_str().unwrap().to_string();
    assert_eq!(created["active"], true);

    let (status, _, patched) = call(
      &state,
      Method::PATCH,
      &format!("/api/students/{id}"),
      Some("admin"),
      Some(json!({ "className": "Nazra B" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["className"], "Nazra B");

    let (_, _, classes) = call(&state, Method::GET, "/api/classes", Some("teacher"), None).await;
    assert_eq!(classes[1], json!({ "className": "Nazra B", "students": 4 }));

    let uri = format!("/api/students/{id}");
    let (status, _, _) = call(&state, Method::DELETE, &uri, Some("admin"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = call(&state, Method::GET, &uri, Some("admin"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn blank_student_name_is_a_bad_request() {
    let state = make_state().await;
    let (status, _, body) = call(
      &state,
      Method::POST,
      "/api/students",
      Some("admin"),
      Some(json!({ "name": "  ", "className": "Hifz A" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));
  }

  // ── Records ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn mark_then_re_mark() {
    let state = make_state().await;
    let first = json!({ "studentId": "s1", "date": "2024-05-01T07:45:00", "status": "absent" });
    let (status, _, created) =
      call(&state, Method::PUT, "/api/attendance", Some("teacher"), Some(first)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["date"], "2024-05-01");
    assert_eq!(created["studentName"], "Ahmed Hassan");

    let again = json!({ "studentId": "s1", "date": "2024-05-01", "status": "present" });
    let (status, _, updated) =
      call(&state, Method::PUT, "/api/attendance", Some("teacher"), Some(again)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);

    let (_, _, stats) = call(
      &state,
      Method::GET,
      "/api/attendance/stats?date=2024-05-01&className=Hifz%20A",
      Some("teacher"),
      None,
    )
    .await;
    assert_eq!(stats["present"], 1);
    assert_eq!(stats["absent"], 0);
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["marked"], 1);
    assert_eq!(stats["presentPercentage"], 33);
  }

  #[tokio::test]
  async fn single_prayer_mark_fills_the_day() {
    let state = make_state().await;
    let mark = json!({
      "studentId": "s2",
      "date": "2024-05-01",
      "fajr": { "location": "madrassah", "time": "05:10" }
    });
    let (status, _, record) =
      call(&state, Method::PUT, "/api/namaz", Some("teacher"), Some(mark)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["fajr"], json!({ "prayed": true, "time": "05:10", "location": "madrassah" }));
    assert_eq!(record["isha"], json!({ "prayed": false, "location": "missed" }));

    let (_, _, stats) = call(
      &state,
      Method::GET,
      "/api/namaz/stats?date=2024-05-01&studentId=s2",
      Some("teacher"),
      None,
    )
    .await;
    assert_eq!(stats["prayedSlots"], 1);
    assert_eq!(stats["completionPercentage"], 20);
  }

  #[tokio::test]
  async fn marking_an_unknown_student_is_404() {
    let state = make_state().await;
    let mark = json!({ "studentId": "ghost", "date": "2024-05-01", "behavior": 7 });
    let (status, _, body) =
      call(&state, Method::PUT, "/api/discipline", Some("teacher"), Some(mark)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("ghost"));
  }

  #[tokio::test]
  async fn out_of_range_points_are_a_bad_request() {
    let state = make_state().await;
    let mark = json!({ "studentId": "s4", "date": "2024-05-01", "strength": 15 });
    let (status, _, _) =
      call(&state, Method::PUT, "/api/fitness", Some("teacher"), Some(mark)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn islamic_studies_route_uses_its_own_collection() {
    let state = make_state().await;
    let mark = json!({
      "studentId": "s5",
      "date": "2024-05-01",
      "subject": "hadith",
      "memorization": "memorized",
      "score": 9
    });
    let (status, _, _) =
      call(&state, Method::PUT, "/api/islamic-studies", Some("teacher"), Some(mark)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, _, stats) = call(
      &state,
      Method::GET,
      "/api/islamic-studies/stats?date=2024-05-01&className=Nazra%20B",
      Some("parent"),
      None,
    )
    .await;
    assert_eq!(stats["memorized"], 1);
    assert_eq!(stats["averageScore"], 9.0);
    assert_eq!(stats["memorizedPercentage"], 33);
  }

  #[tokio::test]
  async fn clear_needs_a_date_and_removes_one_day() {
    let state = make_state().await;
    for (id, date) in [("s1", "2024-05-01"), ("s2", "2024-05-01"), ("s1", "2024-05-02")] {
      let mark = json!({ "studentId": id, "date": date, "status": "present" });
      call(&state, Method::PUT, "/api/attendance", Some("teacher"), Some(mark)).await;
    }

    let (status, _, _) =
      call(&state, Method::DELETE, "/api/attendance", Some("teacher"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = call(
      &state,
      Method::DELETE,
      "/api/attendance?date=2024-05-01",
      Some("teacher"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 2);

    let (_, _, left) = call(
      &state,
      Method::GET,
      "/api/attendance?date=2024-05-02",
      Some("teacher"),
      None,
    )
    .await;
    assert_eq!(left.as_array().unwrap().len(), 1);
  }

  // ── Reports ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn reports_reject_inverted_ranges() {
    let state = make_state().await;
    let (status, _, _) = call(
      &state,
      Method::GET,
      "/api/reports/attendance?from=2024-05-10&to=2024-05-01",
      Some("admin"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn attendance_report_has_a_row_per_student() {
    let state = make_state().await;
    for date in ["2024-05-01", "2024-05-02"] {
      let mark = json!({ "studentId": "s4", "date": date, "status": "late" });
      call(&state, Method::PUT, "/api/attendance", Some("teacher"), Some(mark)).await;
    }
    let (status, _, rows) = call(
      &state,
      Method::GET,
      "/api/reports/attendance?from=2024-05-01&to=2024-05-31&className=Nazra%20B",
      Some("teacher"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["studentId"], "s4");
    assert_eq!(rows[0]["late"], 2);
    assert_eq!(rows[0]["attendancePercentage"], 100);

    let (status, _, _) = call(
      &state,
      Method::GET,
      "/api/reports/namaz?from=2024-05-01&to=2024-05-31",
      Some("parent"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }
}
