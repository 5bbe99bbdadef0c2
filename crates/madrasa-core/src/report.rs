//! Per-student reports over a range of days.

use chrono::NaiveDate;
use serde::Serialize;
use strum::IntoEnumIterator as _;

use crate::{
  Error, Result,
  dimension::{
    Attendance, Dimension, Namaz, percentage,
    attendance::AttendanceStatus,
    namaz::{PRAYERS_PER_DAY, Prayer, PrayerLocation},
  },
  record::{Record, RecordSet},
  roster::{Roster, Student, StudentId},
};

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
  from: NaiveDate,
  to:   NaiveDate,
}

impl DateRange {
  pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
    if from > to {
      return Err(Error::validation("from", format!("{from} is after {to}")));
    }
    Ok(Self { from, to })
  }

  pub fn start(&self) -> NaiveDate { self.from }

  pub fn end(&self) -> NaiveDate { self.to }

  pub fn contains(&self, day: NaiveDate) -> bool { (self.from..=self.to).contains(&day) }

  /// Number of days in the range, both ends included.
  pub fn days(&self) -> i64 { (self.to - self.from).num_days() + 1 }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReportRow {
  pub student_id:            StudentId,
  pub name:                  String,
  pub class_name:            String,
  pub days_marked:           usize,
  pub present:               usize,
  pub absent:                usize,
  pub late:                  usize,
  pub excused:               usize,
  /// Present or late, over the days marked.
  pub attendance_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamazReportRow {
  pub student_id:            StudentId,
  pub name:                  String,
  pub class_name:            String,
  pub days_marked:           usize,
  pub prayed:                usize,
  pub at_madrassah:          usize,
  pub at_home:               usize,
  pub missed:                usize,
  /// Prayed slots over five slots per day marked.
  pub completion_percentage: u32,
}

fn rows<'a, D, R>(
  roster: &'a Roster,
  set: &'a RecordSet<D>,
  range: &'a DateRange,
  class_name: Option<&'a str>,
  mut build: impl FnMut(&Student, &[&Record<D>]) -> R,
) -> Vec<R>
where
  D: Dimension,
{
  roster
    .active(class_name, None)
    .map(|student| {
      let records: Vec<&Record<D>> = set
        .between(range.from, range.to, None)
        .filter(|r| r.student_id == student.student_id)
        .collect();
      build(student, &records)
    })
    .collect()
}

/// One row per active student in scope, in roster order.
pub fn attendance(
  roster: &Roster,
  set: &RecordSet<Attendance>,
  range: &DateRange,
  class_name: Option<&str>,
) -> Vec<AttendanceReportRow> {
  rows(roster, set, range, class_name, |student, records| {
    let count = |status: AttendanceStatus| {
      records.iter().filter(|r| r.payload.status == status).count()
    };
    let present = count(AttendanceStatus::Present);
    let late = count(AttendanceStatus::Late);
    AttendanceReportRow {
      student_id: student.student_id.clone(),
      name: student.name.clone(),
      class_name: student.class_name.clone(),
      days_marked: records.len(),
      present,
      absent: count(AttendanceStatus::Absent),
      late,
      excused: count(AttendanceStatus::Excused),
      attendance_percentage: percentage(present + late, records.len()),
    }
  })
}

/// One row per active student in scope, in roster order.
pub fn namaz(
  roster: &Roster,
  set: &RecordSet<Namaz>,
  range: &DateRange,
  class_name: Option<&str>,
) -> Vec<NamazReportRow> {
  rows(roster, set, range, class_name, |student, records| {
    let at = |location: PrayerLocation| {
      records
        .iter()
        .map(|r| Prayer::iter().filter(|&p| r.payload.get(p).location == location).count())
        .sum::<usize>()
    };
    let at_madrassah = at(PrayerLocation::Madrassah);
    let at_home = at(PrayerLocation::Home);
    NamazReportRow {
      student_id: student.student_id.clone(),
      name: student.name.clone(),
      class_name: student.class_name.clone(),
      days_marked: records.len(),
      prayed: at_madrassah + at_home,
      at_madrassah,
      at_home,
      missed: at(PrayerLocation::Missed),
      completion_percentage: percentage(at_madrassah + at_home, records.len() * PRAYERS_PER_DAY),
    }
  })
}
