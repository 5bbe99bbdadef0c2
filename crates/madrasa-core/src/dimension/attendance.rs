//! Daily attendance.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::{Coverage, Dimension, percentage};
use crate::{access::Section, record::Record, store::Collection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
  Present,
  Absent,
  Late,
  Excused,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
  pub status:   AttendanceStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub remarks:  Option<String>,
  #[serde(
    default,
    with = "crate::day::clock",
    skip_serializing_if = "Option::is_none"
  )]
  pub check_in: Option<NaiveTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendancePatch {
  #[serde(default)]
  pub status:   Option<AttendanceStatus>,
  #[serde(default)]
  pub remarks:  Option<String>,
  #[serde(default, with = "crate::day::clock")]
  pub check_in: Option<NaiveTime>,
}

impl AttendancePatch {
  pub fn status(status: AttendanceStatus) -> Self {
    Self { status: Some(status), ..Self::default() }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
  #[serde(flatten)]
  pub coverage:           Coverage,
  pub present:            usize,
  pub absent:             usize,
  pub late:               usize,
  pub excused:            usize,
  pub present_percentage: u32,
}

impl Dimension for Attendance {
  type Patch = AttendancePatch;
  type Stats = AttendanceStats;

  const COLLECTION: Collection = Collection::Attendance;
  const SECTION: Section = Section::Attendance;

  fn seed() -> Self {
    Self { status: AttendanceStatus::Present, remarks: None, check_in: None }
  }

  fn apply(&mut self, patch: AttendancePatch) {
    if let Some(status) = patch.status {
      self.status = status;
    }
    if patch.remarks.is_some() {
      self.remarks = patch.remarks;
    }
    if patch.check_in.is_some() {
      self.check_in = patch.check_in;
    }
  }

  fn summarize(records: &[&Record<Self>], expected: usize) -> AttendanceStats {
    let count = |status: AttendanceStatus| records.iter().filter(|r| r.payload.status == status).count();
    let present = count(AttendanceStatus::Present);
    AttendanceStats {
      coverage: Coverage::new(expected, records.len()),
      present,
      absent: count(AttendanceStatus::Absent),
      late: count(AttendanceStatus::Late),
      excused: count(AttendanceStatus::Excused),
      present_percentage: percentage(present, expected),
    }
  }
}
