//! Daily prayer (namaz) tracking.
//!
//! A record holds all five prayers of the day. Each is set independently; a
//! record created by marking a single prayer starts with the other four
//! missed.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator as _};

use super::{Coverage, Dimension, percentage};
use crate::{Error, Result, access::Section, record::Record, store::Collection};

pub const PRAYERS_PER_DAY: usize = 5;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Prayer {
  Fajr,
  Dhuhr,
  Asr,
  Maghrib,
  Isha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerLocation {
  Madrassah,
  Home,
  Missed,
}

/// One prayer's mark. `prayed` is true exactly when `location` is not
/// [`PrayerLocation::Missed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerMark {
  pub prayed:   bool,
  #[serde(
    default,
    with = "crate::day::clock",
    skip_serializing_if = "Option::is_none"
  )]
  pub time:     Option<NaiveTime>,
  pub location: PrayerLocation,
}

impl PrayerMark {
  pub fn missed() -> Self {
    Self { prayed: false, time: None, location: PrayerLocation::Missed }
  }

  pub fn at(location: PrayerLocation, time: Option<NaiveTime>) -> Self {
    match location {
      PrayerLocation::Missed => Self::missed(),
      _ => Self { prayed: true, time, location },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namaz {
  pub fajr:    PrayerMark,
  pub dhuhr:   PrayerMark,
  pub asr:     PrayerMark,
  pub maghrib: PrayerMark,
  pub isha:    PrayerMark,
}

impl Namaz {
  pub fn get(&self, prayer: Prayer) -> &PrayerMark {
    match prayer {
      Prayer::Fajr => &self.fajr,
      Prayer::Dhuhr => &self.dhuhr,
      Prayer::Asr => &self.asr,
      Prayer::Maghrib => &self.maghrib,
      Prayer::Isha => &self.isha,
    }
  }

  fn get_mut(&mut self, prayer: Prayer) -> &mut PrayerMark {
    match prayer {
      Prayer::Fajr => &mut self.fajr,
      Prayer::Dhuhr => &mut self.dhuhr,
      Prayer::Asr => &mut self.asr,
      Prayer::Maghrib => &mut self.maghrib,
      Prayer::Isha => &mut self.isha,
    }
  }

  /// Prayers offered on this day, 0..=5.
  pub fn prayed_count(&self) -> usize {
    Prayer::iter().filter(|&p| self.get(p).prayed).count()
  }

  /// `round(prayed_count / 5 * 100)`.
  pub fn percentage(&self) -> u32 { percentage(self.prayed_count(), PRAYERS_PER_DAY) }
}

// ─── Patch ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerInput {
  pub location: PrayerLocation,
  #[serde(default, with = "crate::day::clock")]
  pub time:     Option<NaiveTime>,
}

impl PrayerInput {
  pub fn at(location: PrayerLocation) -> Self { Self { location, time: None } }
}

/// Sets any subset of the five prayers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamazPatch {
  #[serde(default)]
  pub fajr:    Option<PrayerInput>,
  #[serde(default)]
  pub dhuhr:   Option<PrayerInput>,
  #[serde(default)]
  pub asr:     Option<PrayerInput>,
  #[serde(default)]
  pub maghrib: Option<PrayerInput>,
  #[serde(default)]
  pub isha:    Option<PrayerInput>,
}

impl NamazPatch {
  pub fn single(prayer: Prayer, input: PrayerInput) -> Self {
    Self::default().with(prayer, input)
  }

  pub fn with(mut self, prayer: Prayer, input: PrayerInput) -> Self {
    *self.slot_mut(prayer) = Some(input);
    self
  }

  fn slot_mut(&mut self, prayer: Prayer) -> &mut Option<PrayerInput> {
    match prayer {
      Prayer::Fajr => &mut self.fajr,
      Prayer::Dhuhr => &mut self.dhuhr,
      Prayer::Asr => &mut self.asr,
      Prayer::Maghrib => &mut self.maghrib,
      Prayer::Isha => &mut self.isha,
    }
  }

  fn is_empty(&self) -> bool {
    self.fajr.is_none()
      && self.dhuhr.is_none()
      && self.asr.is_none()
      && self.maghrib.is_none()
      && self.isha.is_none()
  }
}

// ─── Stats ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayerTally {
  pub prayer:       Prayer,
  pub prayed:       usize,
  pub at_madrassah: usize,
  pub at_home:      usize,
  pub missed:       usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamazStats {
  #[serde(flatten)]
  pub coverage:              Coverage,
  /// One entry per prayer, in the order of the day.
  pub prayers:               Vec<PrayerTally>,
  pub prayed_slots:          usize,
  /// Prayed slots over five slots per expected student.
  pub completion_percentage: u32,
}

impl Dimension for Namaz {
  type Patch = NamazPatch;
  type Stats = NamazStats;

  const COLLECTION: Collection = Collection::Namaz;
  const SECTION: Section = Section::Namaz;

  fn seed() -> Self {
    Self {
      fajr:    PrayerMark::missed(),
      dhuhr:   PrayerMark::missed(),
      asr:     PrayerMark::missed(),
      maghrib: PrayerMark::missed(),
      isha:    PrayerMark::missed(),
    }
  }

  fn check(patch: &NamazPatch) -> Result<()> {
    if patch.is_empty() {
      return Err(Error::validation("prayers", "at least one prayer must be marked"));
    }
    Ok(())
  }

  fn apply(&mut self, mut patch: NamazPatch) {
    for prayer in Prayer::iter() {
      if let Some(input) = patch.slot_mut(prayer).take() {
        *self.get_mut(prayer) = PrayerMark::at(input.location, input.time);
      }
    }
  }

  fn summarize(records: &[&Record<Self>], expected: usize) -> NamazStats {
    let prayers: Vec<PrayerTally> = Prayer::iter()
      .map(|prayer| {
        let at = |location: PrayerLocation| {
          records
            .iter()
            .filter(|r| r.payload.get(prayer).location == location)
            .count()
        };
        let at_madrassah = at(PrayerLocation::Madrassah);
        let at_home = at(PrayerLocation::Home);
        PrayerTally {
          prayer,
          prayed: at_madrassah + at_home,
          at_madrassah,
          at_home,
          missed: at(PrayerLocation::Missed),
        }
      })
      .collect();

    let prayed_slots: usize = prayers.iter().map(|t| t.prayed).sum();
    NamazStats {
      coverage: Coverage::new(expected, records.len()),
      prayers,
      prayed_slots,
      completion_percentage: percentage(prayed_slots, expected * PRAYERS_PER_DAY),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::{
    record::{RecordSet, Scope},
    roster::{NewStudent, Roster, StudentId},
  };

  fn day() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 1, 15).unwrap() }

  fn roster() -> Roster {
    let mut r = Roster::default();
    r.add(NewStudent::new("Aisha", "Hifz A").with_id("s1"), day()).unwrap();
    r.add(NewStudent::new("Bilal", "Hifz A").with_id("s2"), day()).unwrap();
    r
  }

  #[test]
  fn single_prayer_creates_a_full_day_with_the_rest_missed() {
    let roster = roster();
    let mut set = RecordSet::<Namaz>::new();

    let up = set
      .upsert(
        &roster,
        &StudentId::from("s2"),
        day(),
        NamazPatch::single(Prayer::Fajr, PrayerInput::at(PrayerLocation::Madrassah)),
      )
      .unwrap();

    assert!(up.created);
    let namaz = &up.record.payload;
    assert!(namaz.fajr.prayed);
    assert_eq!(namaz.fajr.location, PrayerLocation::Madrassah);
    for prayer in [Prayer::Dhuhr, Prayer::Asr, Prayer::Maghrib, Prayer::Isha] {
      assert_eq!(namaz.get(prayer), &PrayerMark::missed());
    }
    assert_eq!(namaz.prayed_count(), 1);
    assert_eq!(namaz.percentage(), 20);
  }

  #[test]
  fn later_prayers_update_the_same_record() {
    let roster = roster();
    let mut set = RecordSet::<Namaz>::new();
    let s1 = StudentId::from("s1");

    let first = set
      .upsert(&roster, &s1, day(), NamazPatch::single(Prayer::Fajr, PrayerInput::at(PrayerLocation::Home)))
      .unwrap();
    let second = set
      .upsert(
        &roster,
        &s1,
        day(),
        NamazPatch::single(Prayer::Asr, PrayerInput {
          location: PrayerLocation::Madrassah,
          time:     NaiveTime::from_hms_opt(15, 45, 0),
        }),
      )
      .unwrap();

    assert_eq!(first.record.id, second.record.id);
    assert_eq!(set.len(), 1);
    let namaz = &second.record.payload;
    assert_eq!(namaz.fajr.location, PrayerLocation::Home);
    assert_eq!(namaz.asr.time, NaiveTime::from_hms_opt(15, 45, 0));
    assert_eq!(namaz.prayed_count(), 2);
    assert_eq!(namaz.percentage(), 40);
  }

  #[test]
  fn marking_missed_clears_prayed_and_time() {
    let mut namaz = Namaz::seed();
    namaz.apply(NamazPatch::single(Prayer::Isha, PrayerInput {
      location: PrayerLocation::Home,
      time:     NaiveTime::from_hms_opt(20, 0, 0),
    }));
    namaz.apply(NamazPatch::single(Prayer::Isha, PrayerInput {
      location: PrayerLocation::Missed,
      time:     NaiveTime::from_hms_opt(20, 0, 0),
    }));
    assert_eq!(namaz.isha, PrayerMark::missed());
  }

  #[test]
  fn empty_patch_is_rejected() {
    let roster = roster();
    let mut set = RecordSet::<Namaz>::new();
    let err = set
      .upsert(&roster, &StudentId::from("s1"), day(), NamazPatch::default())
      .unwrap_err();
    assert!(matches!(err, Error::Validation { field: "prayers", .. }));
    assert!(set.is_empty());
  }

  #[test]
  fn stats_tally_each_prayer() {
    let roster = roster();
    let mut set = RecordSet::<Namaz>::new();
    set.upsert(
      &roster,
      &StudentId::from("s1"),
      day(),
      NamazPatch::single(Prayer::Fajr, PrayerInput::at(PrayerLocation::Madrassah))
        .with(Prayer::Dhuhr, PrayerInput::at(PrayerLocation::Home)),
    )
    .unwrap();

    let stats = set.aggregate(&roster, &Scope::day(day()));
    assert_eq!(stats.coverage.total, 2);
    assert_eq!(stats.coverage.marked, 1);
    assert_eq!(stats.prayed_slots, 2);
    // 2 of 10 expected slots.
    assert_eq!(stats.completion_percentage, 20);

    let fajr = &stats.prayers[0];
    assert_eq!(fajr.prayer, Prayer::Fajr);
    assert_eq!((fajr.prayed, fajr.at_madrassah, fajr.at_home, fajr.missed), (1, 1, 0, 0));
    let isha = &stats.prayers[4];
    assert_eq!((isha.prayed, isha.missed), (0, 1));
  }

  #[test]
  fn record_json_nests_the_five_prayers() {
    let roster = roster();
    let mut set = RecordSet::<Namaz>::new();
    let up = set
      .upsert(
        &roster,
        &StudentId::from("s1"),
        day(),
        serde_json::from_str(r#"{"maghrib":{"location":"madrassah","time":"17:40"}}"#).unwrap(),
      )
      .unwrap();

    let json = serde_json::to_value(&up.record).unwrap();
    assert_eq!(json["maghrib"]["prayed"], true);
    assert_eq!(json["maghrib"]["time"], "17:40");
    assert_eq!(json["fajr"]["location"], "missed");
    assert_eq!(json["fajr"]["prayed"], false);
  }
}
