//! The `SchoolStore` trait and the storage keys it persists under.
//!
//! The trait is implemented by storage backends (e.g. `madrasa-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use crate::{
  dimension::Dimension,
  record::{Record, RecordSet, Scope, Upserted},
  report::DateRange,
  roster::{ClassSummary, NewStudent, Roster, Student, StudentId, StudentPatch},
};

// ─── Keys ────────────────────────────────────────────────────────────────────

/// A named, independently persisted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum Collection {
  Students,
  Attendance,
  Namaz,
  IslamicStudies,
  Discipline,
  Fitness,
  /// Store bookkeeping, such as the [`DataSource`].
  Meta,
}

impl Collection {
  pub fn key(self) -> &'static str { self.into() }
}

/// Where the store's current contents came from.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DataSource {
  #[default]
  Live,
  /// Seeded with the built-in demo roster and not yet edited.
  Demo,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a school record store backend.
///
/// Every write is atomic on the backend and persisted before the returned
/// future resolves. All methods return `Send` futures so the trait can be
/// used from multi-threaded runtimes (e.g. tokio with `axum`).
pub trait SchoolStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Roster ────────────────────────────────────────────────────────────

  /// Students in roster order, optionally for one class.
  fn list_students(
    &self,
    class_name: Option<String>,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  fn get_student(
    &self,
    id: StudentId,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// Add a student. Admission date defaults to `today`.
  fn add_student(
    &self,
    input: NewStudent,
    today: NaiveDate,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  fn update_student(
    &self,
    id: StudentId,
    patch: StudentPatch,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  /// Remove a student, keeping their records. `false` if there was no such
  /// student.
  fn remove_student(
    &self,
    id: StudentId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn classes(
    &self,
  ) -> impl Future<Output = Result<Vec<ClassSummary>, Self::Error>> + Send + '_;

  /// Replace an empty roster with `students` and flag the store as
  /// [`DataSource::Demo`]. Does nothing and returns `false` if the roster
  /// already has students.
  fn seed_roster(
    &self,
    students: Vec<Student>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn data_source(
    &self,
  ) -> impl Future<Output = Result<DataSource, Self::Error>> + Send + '_;

  // ── Records ───────────────────────────────────────────────────────────

  /// Mark a student for a day, creating or updating the record.
  fn mark<D: Dimension>(
    &self,
    student_id: StudentId,
    date: NaiveDate,
    patch: D::Patch,
  ) -> impl Future<Output = Result<Upserted<D>, Self::Error>> + Send + '_;

  /// Records matching `scope`, in insertion order.
  fn records<D: Dimension>(
    &self,
    scope: Scope,
  ) -> impl Future<Output = Result<Vec<Record<D>>, Self::Error>> + Send + '_;

  /// Derived statistics for `scope`.
  fn summarize<D: Dimension>(
    &self,
    scope: Scope,
  ) -> impl Future<Output = Result<D::Stats, Self::Error>> + Send + '_;

  /// Remove every record matching `scope`. Returns how many were removed.
  fn clear<D: Dimension>(
    &self,
    scope: Scope,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// A consistent view of the roster and one dimension's records within
  /// `range`, for reports that span many days.
  fn snapshot<D: Dimension>(
    &self,
    range: DateRange,
  ) -> impl Future<Output = Result<(Roster, RecordSet<D>), Self::Error>> + Send + '_;
}
