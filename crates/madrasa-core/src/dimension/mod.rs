//! The tracked dimensions and the statistics derived from them.
//!
//! Each dimension is a payload type stored flattened into a
//! [`Record`](crate::record::Record). Totals and percentages are never stored;
//! [`Dimension::summarize`] recomputes them from the records on every read.

pub mod attendance;
pub mod discipline;
pub mod fitness;
pub mod islamic_studies;
pub mod namaz;

use std::fmt::Debug;

use serde::{Serialize, de::DeserializeOwned};

use crate::{Result, access::Section, record::Record, store::Collection};

pub use attendance::Attendance;
pub use discipline::Discipline;
pub use fitness::Fitness;
pub use islamic_studies::IslamicStudies;
pub use namaz::Namaz;

/// A daily-tracked dimension.
pub trait Dimension:
  Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
  /// A partial update; unset fields leave the payload as it is.
  type Patch: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static;
  type Stats: Clone + Debug + Serialize + Send + Sync + 'static;

  /// Storage key the records are persisted under.
  const COLLECTION: Collection;
  /// Access-table section guarding this dimension.
  const SECTION: Section;

  /// Payload of a brand-new record before the first patch is applied.
  fn seed() -> Self;

  /// Reject a patch before anything is touched.
  fn check(_patch: &Self::Patch) -> Result<()> { Ok(()) }

  /// Merge a patch over the payload. Set fields win.
  fn apply(&mut self, patch: Self::Patch);

  /// Statistics over the records in a scope, where `expected` is the number
  /// of active roster students in that scope.
  fn summarize(records: &[&Record<Self>], expected: usize) -> Self::Stats;
}

// ─── Shared statistics ───────────────────────────────────────────────────────

/// `round(part / total * 100)`, with an empty total yielding `0`.
pub fn percentage(part: usize, total: usize) -> u32 {
  if total == 0 {
    return 0;
  }
  (part as f64 / total as f64 * 100.0).round() as u32
}

/// Mean rounded to one decimal place, with no samples yielding `0.0`.
pub fn average(sum: u64, count: usize) -> f64 {
  if count == 0 {
    return 0.0;
  }
  (sum as f64 / count as f64 * 10.0).round() / 10.0
}

/// How much of a scope has been marked at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
  /// Active roster students in scope.
  pub total:              usize,
  /// Records in scope.
  pub marked:             usize,
  pub unmarked:           usize,
  pub marked_percentage:  u32,
}

impl Coverage {
  pub fn new(total: usize, marked: usize) -> Self {
    Self {
      total,
      marked,
      unmarked: total.saturating_sub(marked),
      marked_percentage: percentage(marked, total),
    }
  }
}

/// Validate a 0..=10 point field.
pub(crate) fn check_points(field: &'static str, value: Option<u8>) -> Result<()> {
  match value {
    Some(v) if v > MAX_POINTS => Err(crate::Error::validation(
      field,
      format!("{v} is above the maximum of {MAX_POINTS}"),
    )),
    _ => Ok(()),
  }
}

pub const MAX_POINTS: u8 = 10;
