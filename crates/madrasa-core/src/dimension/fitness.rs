//! Daily fitness scoring.

use serde::{Deserialize, Serialize};

use super::{Coverage, Dimension, MAX_POINTS, average, check_points};
use crate::{Result, access::Section, record::Record, store::Collection};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fitness {
  pub endurance:     u8,
  pub strength:      u8,
  pub flexibility:   u8,
  pub participation: u8,
  /// What the session was, e.g. "football" or "morning run".
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub activity:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub remarks:       Option<String>,
}

impl Fitness {
  pub fn total_points(&self) -> u32 {
    [self.endurance, self.strength, self.flexibility, self.participation]
      .into_iter()
      .map(u32::from)
      .sum()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessPatch {
  #[serde(default)]
  pub endurance:     Option<u8>,
  #[serde(default)]
  pub strength:      Option<u8>,
  #[serde(default)]
  pub flexibility:   Option<u8>,
  #[serde(default)]
  pub participation: Option<u8>,
  #[serde(default)]
  pub activity:      Option<String>,
  #[serde(default)]
  pub remarks:       Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessStats {
  #[serde(flatten)]
  pub coverage:       Coverage,
  pub endurance:      u32,
  pub strength:       u32,
  pub flexibility:    u32,
  pub participation:  u32,
  pub total_points:   u32,
  pub average_points: f64,
}

impl Dimension for Fitness {
  type Patch = FitnessPatch;
  type Stats = FitnessStats;

  const COLLECTION: Collection = Collection::Fitness;
  const SECTION: Section = Section::Fitness;

  fn seed() -> Self { Self::default() }

  fn check(patch: &FitnessPatch) -> Result<()> {
    check_points("endurance", patch.endurance)?;
    check_points("strength", patch.strength)?;
    check_points("flexibility", patch.flexibility)?;
    check_points("participation", patch.participation)
  }

  fn apply(&mut self, patch: FitnessPatch) {
    let set = |field: &mut u8, value: Option<u8>| {
      if let Some(v) = value {
        *field = v.min(MAX_POINTS);
      }
    };
    set(&mut self.endurance, patch.endurance);
    set(&mut self.strength, patch.strength);
    set(&mut self.flexibility, patch.flexibility);
    set(&mut self.participation, patch.participation);
    if patch.activity.is_some() {
      self.activity = patch.activity;
    }
    if patch.remarks.is_some() {
      self.remarks = patch.remarks;
    }
  }

  fn summarize(records: &[&Record<Self>], expected: usize) -> FitnessStats {
    let sum = |field: fn(&Fitness) -> u8| -> u32 {
      records.iter().map(|r| u32::from(field(&r.payload))).sum()
    };
    let total_points: u32 = records.iter().map(|r| r.payload.total_points()).sum();
    FitnessStats {
      coverage: Coverage::new(expected, records.len()),
      endurance: sum(|f| f.endurance),
      strength: sum(|f| f.strength),
      flexibility: sum(|f| f.flexibility),
      participation: sum(|f| f.participation),
      total_points,
      average_points: average(u64::from(total_points), records.len()),
    }
  }
}
