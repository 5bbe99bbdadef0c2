//! The student roster.
//!
//! Records copy a student's name and class from here when they are created.
//! Those copies are snapshots: editing a student later leaves existing
//! records untouched.

use std::{collections::BTreeMap, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque student identifier (`"s1"`, or a UUID for API-created students).
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn generate() -> Self { Self(Uuid::new_v4().to_string()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for StudentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for StudentId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for StudentId {
  fn from(s: String) -> Self { Self(s) }
}

// ─── Student ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
  pub student_id:     StudentId,
  pub name:           String,
  pub class_name:     String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub roll_number:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub guardian_name:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub guardian_phone: Option<String>,
  #[serde(
    default,
    deserialize_with = "crate::day::deserialize_opt",
    skip_serializing_if = "Option::is_none"
  )]
  pub date_of_birth:  Option<NaiveDate>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub address:        Option<String>,
  #[serde(
    default,
    deserialize_with = "crate::day::deserialize_opt",
    skip_serializing_if = "Option::is_none"
  )]
  pub admission_date: Option<NaiveDate>,
  /// Inactive students stay on the roster but are not expected to be marked.
  #[serde(default = "default_active")]
  pub active:         bool,
}

fn default_active() -> bool { true }

/// Input to [`Roster::add`]. A missing `student_id` gets a fresh UUID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
  #[serde(default)]
  pub student_id:     Option<StudentId>,
  pub name:           String,
  pub class_name:     String,
  #[serde(default)]
  pub roll_number:    Option<String>,
  #[serde(default)]
  pub guardian_name:  Option<String>,
  #[serde(default)]
  pub guardian_phone: Option<String>,
  #[serde(default, deserialize_with = "crate::day::deserialize_opt")]
  pub date_of_birth:  Option<NaiveDate>,
  #[serde(default)]
  pub address:        Option<String>,
  #[serde(default, deserialize_with = "crate::day::deserialize_opt")]
  pub admission_date: Option<NaiveDate>,
}

impl NewStudent {
  pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      class_name: class_name.into(),
      ..Self::default()
    }
  }

  pub fn with_id(mut self, id: impl Into<StudentId>) -> Self {
    self.student_id = Some(id.into());
    self
  }

  fn into_student(self, today: NaiveDate) -> Result<Student> {
    let name = required("name", &self.name)?;
    let class_name = required("className", &self.class_name)?;
    Ok(Student {
      student_id: self.student_id.unwrap_or_else(StudentId::generate),
      name,
      class_name,
      roll_number: non_blank(self.roll_number),
      guardian_name: non_blank(self.guardian_name),
      guardian_phone: non_blank(self.guardian_phone),
      date_of_birth: self.date_of_birth,
      address: non_blank(self.address),
      admission_date: Some(self.admission_date.unwrap_or(today)),
      active: true,
    })
  }
}

/// A partial update to a [`Student`]. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
  pub name:           Option<String>,
  pub class_name:     Option<String>,
  pub roll_number:    Option<String>,
  pub guardian_name:  Option<String>,
  pub guardian_phone: Option<String>,
  pub address:        Option<String>,
  pub active:         Option<bool>,
}

impl StudentPatch {
  fn apply(self, student: &mut Student) -> Result<()> {
    if let Some(name) = self.name {
      student.name = required("name", &name)?;
    }
    if let Some(class_name) = self.class_name {
      student.class_name = required("className", &class_name)?;
    }
    if self.roll_number.is_some() {
      student.roll_number = non_blank(self.roll_number);
    }
    if self.guardian_name.is_some() {
      student.guardian_name = non_blank(self.guardian_name);
    }
    if self.guardian_phone.is_some() {
      student.guardian_phone = non_blank(self.guardian_phone);
    }
    if self.address.is_some() {
      student.address = non_blank(self.address);
    }
    if let Some(active) = self.active {
      student.active = active;
    }
    Ok(())
  }
}

fn required(field: &'static str, value: &str) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(Error::validation(field, "must not be blank"));
  }
  Ok(trimmed.to_owned())
}

fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

// ─── Classes ─────────────────────────────────────────────────────────────────

/// A class as derived from the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
  pub class_name: String,
  /// Active students only.
  pub students:   usize,
}

// ─── Roster ──────────────────────────────────────────────────────────────────

/// The ordered list of students, as persisted under the `students` key.
#[derive(Debug, Clone, Default)]
pub struct Roster {
  students: Vec<Student>,
}

impl Roster {
  pub fn new(students: Vec<Student>) -> Self { Self { students } }

  pub fn students(&self) -> &[Student] { &self.students }

  pub fn into_students(self) -> Vec<Student> { self.students }

  pub fn is_empty(&self) -> bool { self.students.is_empty() }

  pub fn get(&self, id: &StudentId) -> Option<&Student> {
    self.students.iter().find(|s| &s.student_id == id)
  }

  /// Active students, optionally restricted to a class and/or one student.
  pub fn active<'a>(
    &'a self,
    class_name: Option<&'a str>,
    student_id: Option<&'a StudentId>,
  ) -> impl Iterator<Item = &'a Student> + 'a {
    self.students.iter().filter(move |s| {
      s.active
        && class_name.is_none_or(|c| s.class_name == c)
        && student_id.is_none_or(|id| &s.student_id == id)
    })
  }

  pub fn add(&mut self, input: NewStudent, today: NaiveDate) -> Result<&Student> {
    let student = input.into_student(today)?;
    if self.get(&student.student_id).is_some() {
      return Err(Error::DuplicateStudent(student.student_id));
    }
    self.students.push(student);
    Ok(&self.students[self.students.len() - 1])
  }

  pub fn update(&mut self, id: &StudentId, patch: StudentPatch) -> Result<&Student> {
    let student = self
      .students
      .iter_mut()
      .find(|s| &s.student_id == id)
      .ok_or_else(|| Error::StudentNotFound(id.clone()))?;
    patch.apply(student)?;
    Ok(&*student)
  }

  /// Remove a student. Their existing records are kept.
  pub fn remove(&mut self, id: &StudentId) -> Option<Student> {
    let pos = self.students.iter().position(|s| &s.student_id == id)?;
    Some(self.students.remove(pos))
  }

  /// Distinct class names, sorted, with their active student counts.
  pub fn classes(&self) -> Vec<ClassSummary> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for s in &self.students {
      let count = counts.entry(s.class_name.as_str()).or_default();
      if s.active {
        *count += 1;
      }
    }
    counts
      .into_iter()
      .map(|(class_name, students)| ClassSummary {
        class_name: class_name.to_owned(),
        students,
      })
      .collect()
  }
}
