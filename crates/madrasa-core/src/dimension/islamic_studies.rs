//! Islamic-studies progress: the day's lesson, memorisation state and score.

use serde::{Deserialize, Serialize};

use super::{Coverage, Dimension, MAX_POINTS, average, check_points, percentage};
use crate::{Result, access::Section, record::Record, store::Collection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudySubject {
  Quran,
  Hadith,
  Fiqh,
  Aqeedah,
  Seerah,
  Duas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Memorization {
  NotStarted,
  InProgress,
  Memorized,
  NeedsRevision,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IslamicStudies {
  pub subject:      StudySubject,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lesson:       Option<String>,
  pub memorization: Memorization,
  /// Teacher's score for the day, 0..=10.
  pub score:        u8,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes:        Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IslamicStudiesPatch {
  #[serde(default)]
  pub subject:      Option<StudySubject>,
  #[serde(default)]
  pub lesson:       Option<String>,
  #[serde(default)]
  pub memorization: Option<Memorization>,
  #[serde(default)]
  pub score:        Option<u8>,
  #[serde(default)]
  pub notes:        Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IslamicStudiesStats {
  #[serde(flatten)]
  pub coverage:             Coverage,
  pub not_started:          usize,
  pub in_progress:          usize,
  pub memorized:            usize,
  pub needs_revision:       usize,
  pub average_score:        f64,
  pub memorized_percentage: u32,
}

impl Dimension for IslamicStudies {
  type Patch = IslamicStudiesPatch;
  type Stats = IslamicStudiesStats;

  const COLLECTION: Collection = Collection::IslamicStudies;
  const SECTION: Section = Section::IslamicStudies;

  fn seed() -> Self {
    Self {
      subject:      StudySubject::Quran,
      lesson:       None,
      memorization: Memorization::NotStarted,
      score:        0,
      notes:        None,
    }
  }

  fn check(patch: &IslamicStudiesPatch) -> Result<()> {
    check_points("score", patch.score)
  }

  fn apply(&mut self, patch: IslamicStudiesPatch) {
    if let Some(subject) = patch.subject {
      self.subject = subject;
    }
    if patch.lesson.is_some() {
      self.lesson = patch.lesson;
    }
    if let Some(memorization) = patch.memorization {
      self.memorization = memorization;
    }
    if let Some(score) = patch.score {
      self.score = score.min(MAX_POINTS);
    }
    if patch.notes.is_some() {
      self.notes = patch.notes;
    }
  }

  fn summarize(records: &[&Record<Self>], expected: usize) -> IslamicStudiesStats {
    let count = |m: Memorization| records.iter().filter(|r| r.payload.memorization == m).count();
    let memorized = count(Memorization::Memorized);
    let score_sum: u64 = records.iter().map(|r| u64::from(r.payload.score)).sum();
    IslamicStudiesStats {
      coverage: Coverage::new(expected, records.len()),
      not_started: count(Memorization::NotStarted),
      in_progress: count(Memorization::InProgress),
      memorized,
      needs_revision: count(Memorization::NeedsRevision),
      average_score: average(score_sum, records.len()),
      memorized_percentage: percentage(memorized, expected),
    }
  }
}
