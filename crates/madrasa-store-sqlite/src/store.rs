//! [`SqliteStore`]: the SQLite implementation of [`SchoolStore`].

use std::path::Path;

use chrono::NaiveDate;
use madrasa_core::{
  dimension::Dimension,
  record::{Record, RecordSet, Scope, Upserted},
  report::DateRange,
  roster::{ClassSummary, NewStudent, Roster, Student, StudentId, StudentPatch},
  store::{DataSource, SchoolStore},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  encode::{
    delete_scope, import_legacy_records, load_key, load_meta, load_range,
    load_roster, load_scope, save_meta, save_record, save_roster,
  },
  schema::SCHEMA,
};

/// Store bookkeeping persisted under the `meta` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
  #[serde(default)]
  pub data_source: DataSource,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A school record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls
/// run on the connection's own thread one at a time, so every write is
/// serialised. A mark touches only the row for its `(student, day)`.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Apply the schema and move any legacy record lists into rows.
  pub(crate) async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;

    let imported = self.transact(import_legacy_records).await?;
    if imported > 0 {
      tracing::info!(records = imported, "imported legacy record lists");
    }
    Ok(())
  }

  /// Run `f` inside one transaction. It commits only if `f` succeeds; a
  /// domain error rolls everything back.
  async fn transact<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        match f(&*tx) {
          Ok(value) => {
            tx.commit()?;
            Ok(Ok(value))
          }
          Err(e) => Ok(Err(e)),
        }
      })
      .await?
  }

  /// Apply a roster edit and flip a demo store to live.
  async fn edit_roster<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut Roster) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .transact(move |conn| {
        let mut roster = load_roster(conn)?;
        let out = f(&mut roster)?;
        save_roster(conn, &roster)?;

        let mut meta = load_meta(conn)?;
        if meta.data_source == DataSource::Demo {
          meta.data_source = DataSource::Live;
          save_meta(conn, &meta)?;
          tracing::info!("roster edited, store now holds live data");
        }
        Ok(out)
      })
      .await
  }
}

// ─── SchoolStore impl ────────────────────────────────────────────────────────

impl SchoolStore for SqliteStore {
  type Error = crate::Error;

  // ── Roster ────────────────────────────────────────────────────────────────

  async fn list_students(&self, class_name: Option<String>) -> Result<Vec<Student>> {
    self
      .transact(move |conn| {
        let roster = load_roster(conn)?;
        Ok(
          roster
            .into_students()
            .into_iter()
            .filter(|s| class_name.as_ref().is_none_or(|c| &s.class_name == c))
            .collect(),
        )
      })
      .await
  }

  async fn get_student(&self, id: StudentId) -> Result<Option<Student>> {
    self
      .transact(move |conn| Ok(load_roster(conn)?.get(&id).cloned()))
      .await
  }

  async fn add_student(&self, input: NewStudent, today: NaiveDate) -> Result<Student> {
    let student = self
      .edit_roster(move |roster| Ok(roster.add(input, today)?.clone()))
      .await?;
    tracing::info!(
      student = %student.student_id,
      class = %student.class_name,
      "added student"
    );
    Ok(student)
  }

  async fn update_student(&self, id: StudentId, patch: StudentPatch) -> Result<Student> {
    let student = self
      .edit_roster(move |roster| Ok(roster.update(&id, patch)?.clone()))
      .await?;
    tracing::info!(student = %student.student_id, "updated student");
    Ok(student)
  }

  async fn remove_student(&self, id: StudentId) -> Result<bool> {
    let removed = {
      let id = id.clone();
      self
        .edit_roster(move |roster| Ok(roster.remove(&id).is_some()))
        .await?
    };
    if removed {
      tracing::info!(student = %id, "removed student");
    }
    Ok(removed)
  }

  async fn classes(&self) -> Result<Vec<ClassSummary>> {
    self
      .transact(|conn| Ok(load_roster(conn)?.classes()))
      .await
  }

  async fn seed_roster(&self, students: Vec<Student>) -> Result<bool> {
    let count = students.len();
    let seeded = self
      .transact(move |conn| {
        if !load_roster(conn)?.is_empty() {
          return Ok(false);
        }
        save_roster(conn, &Roster::new(students))?;
        save_meta(conn, &Meta { data_source: DataSource::Demo })?;
        Ok(true)
      })
      .await?;
    if seeded {
      tracing::info!(students = count, "seeded demo roster");
    }
    Ok(seeded)
  }

  async fn data_source(&self) -> Result<DataSource> {
    self
      .transact(|conn| Ok(load_meta(conn)?.data_source))
      .await
  }

  // ── Records ───────────────────────────────────────────────────────────────

  async fn mark<D: Dimension>(
    &self,
    student_id: StudentId,
    date: NaiveDate,
    patch: D::Patch,
  ) -> Result<Upserted<D>> {
    let upserted = self
      .transact(move |conn| {
        let roster = load_roster(conn)?;
        let existing = load_key::<D>(conn, &student_id, date)?;
        let mut set = RecordSet::from_records(existing.into_iter().collect());
        let upserted = set.upsert(&roster, &student_id, date, patch)?;
        save_record(conn, &upserted.record)?;
        Ok(upserted)
      })
      .await?;
    tracing::info!(
      collection = %D::COLLECTION,
      student = %upserted.record.student_id,
      %date,
      created = upserted.created,
      "marked record"
    );
    Ok(upserted)
  }

  async fn records<D: Dimension>(&self, scope: Scope) -> Result<Vec<Record<D>>> {
    self
      .transact(move |conn| load_scope::<D>(conn, &scope))
      .await
  }

  async fn summarize<D: Dimension>(&self, scope: Scope) -> Result<D::Stats> {
    self
      .transact(move |conn| {
        let roster = load_roster(conn)?;
        let set = RecordSet::from_records(load_scope::<D>(conn, &scope)?);
        Ok(set.aggregate(&roster, &scope))
      })
      .await
  }

  async fn clear<D: Dimension>(&self, scope: Scope) -> Result<usize> {
    let date = scope.date;
    let class_name = scope.class_name.clone();
    let removed = self
      .transact(move |conn| delete_scope::<D>(conn, &scope))
      .await?;
    tracing::info!(
      collection = %D::COLLECTION,
      %date,
      class = class_name.as_deref().unwrap_or("*"),
      removed,
      "cleared records"
    );
    Ok(removed)
  }

  async fn snapshot<D: Dimension>(&self, range: DateRange) -> Result<(Roster, RecordSet<D>)> {
    self
      .transact(move |conn| {
        let records = load_range::<D>(conn, range.start(), range.end())?;
        Ok((load_roster(conn)?, RecordSet::from_records(records)))
      })
      .await
  }
}
