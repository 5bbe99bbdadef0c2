//! Dated per-student records and the rules that reconcile them.
//!
//! A [`RecordSet`] holds every record of one dimension in insertion order,
//! with a composite-key index beside it. At most one record exists per
//! `(studentId, date)`; marking the same student on the same day again
//! updates that record in place.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  day::IntoDay,
  dimension::Dimension,
  roster::{Roster, Student, StudentId},
};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque record identifier, stable for the record's lifetime.
///
/// Fresh ids are UUIDs. Older lists persisted with numeric, timestamp-based
/// ids load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn generate() -> Self { Self(Uuid::new_v4().to_string()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl<'de> Deserialize<'de> for RecordId {
  fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
      Text(String),
      Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
      Raw::Text(s) => Self(s),
      Raw::Number(n) => Self(n.to_string()),
    })
  }
}

/// The natural key of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
  pub student_id: StudentId,
  pub date:       NaiveDate,
}

impl RecordKey {
  pub fn new(student_id: StudentId, on: impl IntoDay) -> Self {
    Self { student_id, date: on.into_day() }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One student's mark for one day in one dimension.
///
/// `student_name` and `class_name` are copied from the roster when the record
/// is created and never refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<D> {
  pub id:           RecordId,
  pub student_id:   StudentId,
  pub student_name: String,
  pub class_name:   String,
  #[serde(deserialize_with = "crate::day::deserialize")]
  pub date:         NaiveDate,
  #[serde(flatten)]
  pub payload:      D,
}

impl<D> Record<D> {
  pub fn key(&self) -> RecordKey {
    RecordKey { student_id: self.student_id.clone(), date: self.date }
  }
}

/// The result of [`RecordSet::upsert`].
#[derive(Debug, Clone)]
pub struct Upserted<D> {
  pub record:  Record<D>,
  /// `true` if the mark created the record, `false` if it updated one.
  pub created: bool,
}

// ─── Scope ───────────────────────────────────────────────────────────────────

/// A filter over one calendar day, optionally narrowed to a class and/or a
/// student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
  pub date:       NaiveDate,
  pub class_name: Option<String>,
  pub student_id: Option<StudentId>,
}

impl Scope {
  pub fn day(on: impl IntoDay) -> Self {
    Self { date: on.into_day(), class_name: None, student_id: None }
  }

  pub fn class(mut self, class_name: impl Into<String>) -> Self {
    self.class_name = Some(class_name.into());
    self
  }

  pub fn student(mut self, student_id: impl Into<StudentId>) -> Self {
    self.student_id = Some(student_id.into());
    self
  }

  pub fn matches<D>(&self, record: &Record<D>) -> bool {
    record.date == self.date
      && self.class_name.as_ref().is_none_or(|c| &record.class_name == c)
      && self.student_id.as_ref().is_none_or(|id| &record.student_id == id)
  }

  /// Active roster students this scope expects to be marked.
  pub fn expected<'a>(&'a self, roster: &'a Roster) -> impl Iterator<Item = &'a Student> + 'a {
    roster.active(self.class_name.as_deref(), self.student_id.as_ref())
  }
}

// ─── RecordSet ───────────────────────────────────────────────────────────────

/// Every record of one dimension, in insertion order.
#[derive(Debug, Clone)]
pub struct RecordSet<D> {
  records:   Vec<Record<D>>,
  index:     HashMap<RecordKey, usize>,
  collapsed: usize,
}

impl<D> Default for RecordSet<D> {
  fn default() -> Self {
    Self { records: Vec::new(), index: HashMap::new(), collapsed: 0 }
  }
}

impl<D: Dimension> RecordSet<D> {
  pub fn new() -> Self { Self::default() }

  /// Build a set from a persisted list.
  ///
  /// Lists written by older clients may hold more than one record for a key.
  /// Those are collapsed onto the first occurrence (keeping its id and
  /// position) with the last occurrence's payload; see [`Self::collapsed`].
  pub fn from_records(records: Vec<Record<D>>) -> Self {
    let mut set = Self::default();
    for record in records {
      match set.index.get(&record.key()) {
        Some(&i) => {
          set.records[i].payload = record.payload;
          set.collapsed += 1;
        }
        None => {
          set.index.insert(record.key(), set.records.len());
          set.records.push(record);
        }
      }
    }
    set
  }

  /// How many duplicate records [`Self::from_records`] folded away.
  pub fn collapsed(&self) -> usize { self.collapsed }

  pub fn records(&self) -> &[Record<D>] { &self.records }

  pub fn into_records(self) -> Vec<Record<D>> { self.records }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  pub fn get(&self, key: &RecordKey) -> Option<&Record<D>> {
    self.index.get(key).map(|&i| &self.records[i])
  }

  /// Mark `student_id` on the day of `on`, creating the record if needed.
  ///
  /// The student must be on the roster; otherwise nothing changes and
  /// [`Error::StudentNotFound`] is returned. An existing record gets the
  /// patch merged over its payload. A new record gets a fresh id, the
  /// student's current name and class, and the patch applied over
  /// [`Dimension::seed`].
  pub fn upsert(
    &mut self,
    roster: &Roster,
    student_id: &StudentId,
    on: impl IntoDay,
    patch: D::Patch,
  ) -> Result<Upserted<D>> {
    let student = roster
      .get(student_id)
      .ok_or_else(|| Error::StudentNotFound(student_id.clone()))?;
    D::check(&patch)?;

    let key = RecordKey::new(student_id.clone(), on);
    if let Some(&i) = self.index.get(&key) {
      let record = &mut self.records[i];
      record.payload.apply(patch);
      return Ok(Upserted { record: record.clone(), created: false });
    }

    let mut payload = D::seed();
    payload.apply(patch);
    let record = Record {
      id: RecordId::generate(),
      student_id: student.student_id.clone(),
      student_name: student.name.clone(),
      class_name: student.class_name.clone(),
      date: key.date,
      payload,
    };
    self.index.insert(key, self.records.len());
    self.records.push(record.clone());
    Ok(Upserted { record, created: true })
  }

  /// Records on the scope's day (and class/student, if set), in insertion
  /// order.
  pub fn filter<'a>(&'a self, scope: &'a Scope) -> impl Iterator<Item = &'a Record<D>> + 'a {
    self.records.iter().filter(move |r| scope.matches(r))
  }

  /// Records within `from..=to`, optionally for one class, in insertion
  /// order.
  pub fn between<'a>(
    &'a self,
    from: NaiveDate,
    to: NaiveDate,
    class_name: Option<&'a str>,
  ) -> impl Iterator<Item = &'a Record<D>> + 'a {
    self.records.iter().filter(move |r| {
      (from..=to).contains(&r.date) && class_name.is_none_or(|c| r.class_name == c)
    })
  }

  /// Remove every record the scope matches. Returns how many were removed.
  pub fn clear(&mut self, scope: &Scope) -> usize {
    let before = self.records.len();
    self.records.retain(|r| !scope.matches(r));
    let removed = before - self.records.len();
    if removed > 0 {
      self.reindex();
    }
    removed
  }

  /// Derived statistics for the scope. Recomputed from scratch on every call.
  ///
  /// Only records of students the scope still expects are counted, so a
  /// student who has since changed class, been deactivated or been removed
  /// does not inflate the marked count beyond the total.
  pub fn aggregate(&self, roster: &Roster, scope: &Scope) -> D::Stats {
    let expected: HashSet<&StudentId> =
      scope.expected(roster).map(|s| &s.student_id).collect();
    let marked: Vec<&Record<D>> = self
      .filter(scope)
      .filter(|r| expected.contains(&r.student_id))
      .collect();
    D::summarize(&marked, expected.len())
  }

  fn reindex(&mut self) {
    self.index = self
      .records
      .iter()
      .enumerate()
      .map(|(i, r)| (r.key(), i))
      .collect();
  }
}
