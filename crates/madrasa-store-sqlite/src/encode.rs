//! Encoding and decoding between domain types and SQLite rows.
//!
//! The roster and store metadata are small documents kept as JSON under a
//! collection key. Records are one row each, keyed by collection, student
//! and `YYYY-MM-DD` day, with the dimension's fields as a JSON payload.

use chrono::{NaiveDate, Utc};
use madrasa_core::{
  day::parse_day,
  dimension::{Attendance, Dimension, Discipline, Fitness, IslamicStudies, Namaz},
  record::{Record, RecordId, RecordSet, Scope},
  roster::{Roster, Student, StudentId},
  store::Collection,
};
use rusqlite::{Connection, OptionalExtension as _, Row};
use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result, store::Meta};

// ─── Documents ───────────────────────────────────────────────────────────────

pub fn read_json<T: DeserializeOwned>(
  conn: &Connection,
  collection: Collection,
) -> Result<Option<T>> {
  let raw: Option<String> = conn
    .query_row(
      "SELECT value_json FROM collections WHERE name = ?1",
      rusqlite::params![collection.key()],
      |r| r.get(0),
    )
    .optional()?;

  raw
    .map(|s| serde_json::from_str(&s))
    .transpose()
    .map_err(|source| Error::Json { collection: collection.key(), source })
}

pub fn write_json<T: Serialize + ?Sized>(
  conn: &Connection,
  collection: Collection,
  value: &T,
) -> Result<()> {
  let json = serde_json::to_string(value)
    .map_err(|source| Error::Json { collection: collection.key(), source })?;
  conn.execute(
    "INSERT INTO collections (name, value_json, updated_at) VALUES (?1, ?2, ?3)
     ON CONFLICT(name) DO UPDATE SET
       value_json = excluded.value_json,
       updated_at = excluded.updated_at",
    rusqlite::params![collection.key(), json, Utc::now().to_rfc3339()],
  )?;
  tracing::debug!(%collection, bytes = json.len(), "persisted collection");
  Ok(())
}

pub fn load_roster(conn: &Connection) -> Result<Roster> {
  let students: Vec<Student> =
    read_json(conn, Collection::Students)?.unwrap_or_default();
  Ok(Roster::new(students))
}

pub fn save_roster(conn: &Connection, roster: &Roster) -> Result<()> {
  write_json(conn, Collection::Students, roster.students())
}

pub fn load_meta(conn: &Connection) -> Result<Meta> {
  Ok(read_json(conn, Collection::Meta)?.unwrap_or_default())
}

pub fn save_meta(conn: &Connection, meta: &Meta) -> Result<()> {
  write_json(conn, Collection::Meta, meta)
}

// ─── Records ─────────────────────────────────────────────────────────────────

const RECORD_COLUMNS: &str =
  "record_id, student_id, student_name, class_name, date, payload_json";

/// Matches the rows a [`Scope`] selects: `?1` collection, `?2` day, then an
/// optional class (`?3`) and student (`?4`).
const SCOPE_FILTER: &str = "collection = ?1 AND date = ?2
  AND (?3 IS NULL OR class_name = ?3)
  AND (?4 IS NULL OR student_id = ?4)";

pub fn encode_date(date: NaiveDate) -> String { date.format("%Y-%m-%d").to_string() }

/// A record row as stored, before the payload is decoded.
struct RawRecord {
  record_id:    String,
  student_id:   String,
  student_name: String,
  class_name:   String,
  date:         String,
  payload_json: String,
}

impl RawRecord {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:    row.get(0)?,
      student_id:   row.get(1)?,
      student_name: row.get(2)?,
      class_name:   row.get(3)?,
      date:         row.get(4)?,
      payload_json: row.get(5)?,
    })
  }

  fn into_record<D: Dimension>(self) -> Result<Record<D>> {
    let payload = serde_json::from_str(&self.payload_json)
      .map_err(|source| Error::Json { collection: D::COLLECTION.key(), source })?;
    Ok(Record {
      id: RecordId::new(self.record_id),
      student_id: StudentId::new(self.student_id),
      student_name: self.student_name,
      class_name: self.class_name,
      date: parse_day(&self.date)?,
      payload,
    })
  }
}

fn query_records<D: Dimension>(
  conn: &Connection,
  sql: &str,
  params: impl rusqlite::Params,
) -> Result<Vec<Record<D>>> {
  let mut stmt = conn.prepare(sql)?;
  let raws = stmt
    .query_map(params, RawRecord::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawRecord::into_record).collect()
}

/// Records a scope selects, in insertion order.
pub fn load_scope<D: Dimension>(conn: &Connection, scope: &Scope) -> Result<Vec<Record<D>>> {
  query_records(
    conn,
    &format!("SELECT {RECORD_COLUMNS} FROM records WHERE {SCOPE_FILTER} ORDER BY seq"),
    rusqlite::params![
      D::COLLECTION.key(),
      encode_date(scope.date),
      scope.class_name.as_deref(),
      scope.student_id.as_ref().map(StudentId::as_str),
    ],
  )
}

/// The record for one `(student, day)`, if there is one.
pub fn load_key<D: Dimension>(
  conn: &Connection,
  student_id: &StudentId,
  date: NaiveDate,
) -> Result<Option<Record<D>>> {
  let mut records = query_records(
    conn,
    &format!(
      "SELECT {RECORD_COLUMNS} FROM records
       WHERE collection = ?1 AND student_id = ?2 AND date = ?3"
    ),
    rusqlite::params![D::COLLECTION.key(), student_id.as_str(), encode_date(date)],
  )?;
  Ok(records.pop())
}

/// Records within `from..=to`, in insertion order.
pub fn load_range<D: Dimension>(
  conn: &Connection,
  from: NaiveDate,
  to: NaiveDate,
) -> Result<Vec<Record<D>>> {
  query_records(
    conn,
    &format!(
      "SELECT {RECORD_COLUMNS} FROM records
       WHERE collection = ?1 AND date BETWEEN ?2 AND ?3
       ORDER BY seq"
    ),
    rusqlite::params![D::COLLECTION.key(), encode_date(from), encode_date(to)],
  )
}

/// Insert a record, or replace the payload of the row already holding its
/// `(student, day)`. The row keeps its id, snapshot fields and position.
pub fn save_record<D: Dimension>(conn: &Connection, record: &Record<D>) -> Result<()> {
  let payload = serde_json::to_string(&record.payload)
    .map_err(|source| Error::Json { collection: D::COLLECTION.key(), source })?;
  conn.execute(
    "INSERT INTO records
       (collection, record_id, student_id, student_name, class_name, date,
        payload_json, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
     ON CONFLICT(collection, student_id, date) DO UPDATE SET
       payload_json = excluded.payload_json,
       updated_at   = excluded.updated_at",
    rusqlite::params![
      D::COLLECTION.key(),
      record.id.as_str(),
      record.student_id.as_str(),
      record.student_name,
      record.class_name,
      encode_date(record.date),
      payload,
      Utc::now().to_rfc3339(),
    ],
  )?;
  tracing::debug!(
    collection = %D::COLLECTION,
    record = record.id.as_str(),
    "persisted record"
  );
  Ok(())
}

/// Delete the rows a scope selects. Returns how many were deleted.
pub fn delete_scope<D: Dimension>(conn: &Connection, scope: &Scope) -> Result<usize> {
  Ok(conn.execute(
    &format!("DELETE FROM records WHERE {SCOPE_FILTER}"),
    rusqlite::params![
      D::COLLECTION.key(),
      encode_date(scope.date),
      scope.class_name.as_deref(),
      scope.student_id.as_ref().map(StudentId::as_str),
    ],
  )?)
}

// ─── Legacy lists ────────────────────────────────────────────────────────────

/// Move a dimension's flat JSON list, as version 1 stores and browser
/// exports kept it, into the `records` table, then drop the list.
///
/// Duplicates sharing a student and day are folded once here.
fn import_legacy<D: Dimension>(conn: &Connection) -> Result<usize> {
  let Some(records) = read_json::<Vec<Record<D>>>(conn, D::COLLECTION)? else {
    return Ok(0);
  };
  let set = RecordSet::from_records(records);
  if set.collapsed() > 0 {
    tracing::warn!(
      collection = %D::COLLECTION,
      collapsed = set.collapsed(),
      "collapsed duplicate records sharing a student and day"
    );
  }
  for record in set.records() {
    save_record(conn, record)?;
  }
  conn.execute(
    "DELETE FROM collections WHERE name = ?1",
    rusqlite::params![D::COLLECTION.key()],
  )?;
  Ok(set.len())
}

/// Import every dimension's legacy list. Returns the number of records moved.
pub fn import_legacy_records(conn: &Connection) -> Result<usize> {
  Ok(
    import_legacy::<Attendance>(conn)?
      + import_legacy::<Namaz>(conn)?
      + import_legacy::<IslamicStudies>(conn)?
      + import_legacy::<Discipline>(conn)?
      + import_legacy::<Fitness>(conn)?,
  )
}
