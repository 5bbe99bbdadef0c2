//! Daily discipline points.
//!
//! Every category is scored 0..=10. A fresh record starts from a clean day,
//! full marks everywhere, and patches deduct by setting lower values.

use serde::{Deserialize, Serialize};

use super::{Coverage, Dimension, MAX_POINTS, average, check_points};
use crate::{Result, access::Section, record::Record, store::Collection};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discipline {
  pub behavior:    u8,
  pub punctuality: u8,
  pub uniform:     u8,
  pub homework:    u8,
  pub respect:     u8,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub remarks:     Option<String>,
}

impl Discipline {
  pub fn total_points(&self) -> u32 {
    [self.behavior, self.punctuality, self.uniform, self.homework, self.respect]
      .into_iter()
      .map(u32::from)
      .sum()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisciplinePatch {
  #[serde(default)]
  pub behavior:    Option<u8>,
  #[serde(default)]
  pub punctuality: Option<u8>,
  #[serde(default)]
  pub uniform:     Option<u8>,
  #[serde(default)]
  pub homework:    Option<u8>,
  #[serde(default)]
  pub respect:     Option<u8>,
  #[serde(default)]
  pub remarks:     Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisciplineStats {
  #[serde(flatten)]
  pub coverage:       Coverage,
  pub behavior:       u32,
  pub punctuality:    u32,
  pub uniform:        u32,
  pub homework:       u32,
  pub respect:        u32,
  pub total_points:   u32,
  /// Mean total per marked student.
  pub average_points: f64,
}

impl Dimension for Discipline {
  type Patch = DisciplinePatch;
  type Stats = DisciplineStats;

  const COLLECTION: Collection = Collection::Discipline;
  const SECTION: Section = Section::Discipline;

  fn seed() -> Self {
    Self {
      behavior:    MAX_POINTS,
      punctuality: MAX_POINTS,
      uniform:     MAX_POINTS,
      homework:    MAX_POINTS,
      respect:     MAX_POINTS,
      remarks:     None,
    }
  }

  fn check(patch: &DisciplinePatch) -> Result<()> {
    check_points("behavior", patch.behavior)?;
    check_points("punctuality", patch.punctuality)?;
    check_points("uniform", patch.uniform)?;
    check_points("homework", patch.homework)?;
    check_points("respect", patch.respect)
  }

  fn apply(&mut self, patch: DisciplinePatch) {
    let set = |field: &mut u8, value: Option<u8>| {
      if let Some(v) = value {
        *field = v.min(MAX_POINTS);
      }
    };
    set(&mut self.behavior, patch.behavior);
    set(&mut self.punctuality, patch.punctuality);
    set(&mut self.uniform, patch.uniform);
    set(&mut self.homework, patch.homework);
    set(&mut self.respect, patch.respect);
    if patch.remarks.is_some() {
      self.remarks = patch.remarks;
    }
  }

  fn summarize(records: &[&Record<Self>], expected: usize) -> DisciplineStats {
    let sum = |field: fn(&Discipline) -> u8| -> u32 {
      records.iter().map(|r| u32::from(field(&r.payload))).sum()
    };
    let total_points: u32 = records.iter().map(|r| r.payload.total_points()).sum();
    DisciplineStats {
      coverage: Coverage::new(expected, records.len()),
      behavior: sum(|d| d.behavior),
      punctuality: sum(|d| d.punctuality),
      uniform: sum(|d| d.uniform),
      homework: sum(|d| d.homework),
      respect: sum(|d| d.respect),
      total_points,
      average_points: average(u64::from(total_points), records.len()),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::{
    Error,
    record::{RecordSet, Scope},
    roster::{NewStudent, Roster, StudentId},
  };

  fn day() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 2, 1).unwrap() }

  fn roster() -> Roster {
    let mut r = Roster::default();
    r.add(NewStudent::new("Aisha", "Hifz A").with_id("s1"), day()).unwrap();
    r.add(NewStudent::new("Bilal", "Hifz A").with_id("s2"), day()).unwrap();
    r.add(NewStudent::new("Yusuf", "Hifz A").with_id("s3"), day()).unwrap();
    r
  }

  #[test]
  fn deductions_apply_over_a_clean_day() {
    let roster = roster();
    let mut set = RecordSet::<Discipline>::new();
    let up = set
      .upsert(&roster, &StudentId::from("s1"), day(), DisciplinePatch {
        punctuality: Some(6),
        remarks: Some("late twice".into()),
        ..Default::default()
      })
      .unwrap();
    assert_eq!(up.record.payload.behavior, 10);
    assert_eq!(up.record.payload.punctuality, 6);
    assert_eq!(up.record.payload.total_points(), 46);
  }

  #[test]
  fn points_above_ten_are_rejected() {
    let roster = roster();
    let mut set = RecordSet::<Discipline>::new();
    let err = set
      .upsert(&roster, &StudentId::from("s1"), day(), DisciplinePatch {
        uniform: Some(12),
        ..Default::default()
      })
      .unwrap_err();
    assert!(matches!(err, Error::Validation { field: "uniform", .. }));
  }

  #[test]
  fn stats_sum_each_category() {
    let roster = roster();
    let mut set = RecordSet::<Discipline>::new();
    set.upsert(&roster, &StudentId::from("s1"), day(), DisciplinePatch {
      homework: Some(4),
      ..Default::default()
    })
    .unwrap();
    set.upsert(&roster, &StudentId::from("s2"), day(), DisciplinePatch::default())
      .unwrap();

    let stats = set.aggregate(&roster, &Scope::day(day()));
    assert_eq!(stats.coverage.total, 3);
    assert_eq!(stats.coverage.marked, 2);
    assert_eq!(stats.behavior, 20);
    assert_eq!(stats.homework, 14);
    assert_eq!(stats.total_points, 94);
    assert_eq!(stats.average_points, 47.0);
  }

  #[test]
  fn empty_scope_has_zero_average() {
    let roster = roster();
    let set = RecordSet::<Discipline>::new();
    let stats = set.aggregate(&roster, &Scope::day(day()));
    assert_eq!(stats.total_points, 0);
    assert_eq!(stats.average_points, 0.0);
  }
}
