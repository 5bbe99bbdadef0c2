//! Role-based access to the sections of the system.
//!
//! One table, [`RULES`], says which roles may read and which may write each
//! section. The HTTP layer asks [`allows`] once per request; navigation asks
//! [`sections`] which sections a role can see at all.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator as _};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Admin,
  Teacher,
  Student,
  Parent,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Section {
  Students,
  Classes,
  Attendance,
  Namaz,
  IslamicStudies,
  Discipline,
  Fitness,
  Reports,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Access {
  Read,
  Write,
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
  pub section: Section,
  pub read:    &'static [Role],
  pub write:   &'static [Role],
}

use Role::{Admin, Parent, Student, Teacher};

const STAFF: &[Role] = &[Admin, Teacher];
const EVERYONE: &[Role] = &[Admin, Teacher, Student, Parent];

pub const RULES: &[Rule] = &[
  Rule { section: Section::Students,       read: STAFF,    write: &[Admin] },
  Rule { section: Section::Classes,        read: STAFF,    write: &[] },
  Rule { section: Section::Attendance,     read: EVERYONE, write: STAFF },
  Rule { section: Section::Namaz,          read: EVERYONE, write: STAFF },
  Rule { section: Section::IslamicStudies, read: EVERYONE, write: STAFF },
  Rule { section: Section::Discipline,     read: EVERYONE, write: STAFF },
  Rule { section: Section::Fitness,        read: EVERYONE, write: STAFF },
  Rule { section: Section::Reports,        read: STAFF,    write: &[] },
];

pub fn rule(section: Section) -> Option<&'static Rule> {
  RULES.iter().find(|r| r.section == section)
}

/// Whether `role` may perform `access` on `section`. Sections missing from
/// the table are closed to everyone.
pub fn allows(role: Role, section: Section, access: Access) -> bool {
  rule(section).is_some_and(|r| match access {
    Access::Read => r.read.contains(&role),
    Access::Write => r.write.contains(&role),
  })
}

/// Sections `role` can read, in navigation order.
pub fn sections(role: Role) -> Vec<Section> {
  Section::iter()
    .filter(|&s| allows(role, s, Access::Read))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_section_has_exactly_one_rule() {
    for section in Section::iter() {
      assert_eq!(
        RULES.iter().filter(|r| r.section == section).count(),
        1,
        "{section}"
      );
    }
  }

  #[test]
  fn staff_mark_records_families_only_read() {
    for role in [Admin, Teacher] {
      assert!(allows(role, Section::Attendance, Access::Write));
      assert!(allows(role, Section::Namaz, Access::Write));
    }
    for role in [Student, Parent] {
      assert!(allows(role, Section::Attendance, Access::Read));
      assert!(!allows(role, Section::Attendance, Access::Write));
      assert!(!allows(role, Section::Students, Access::Read));
    }
  }

  #[test]
  fn only_admins_edit_the_roster() {
    assert!(allows(Admin, Section::Students, Access::Write));
    assert!(!allows(Teacher, Section::Students, Access::Write));
    assert!(allows(Teacher, Section::Students, Access::Read));
  }

  #[test]
  fn derived_sections_are_read_only() {
    for role in [Admin, Teacher, Student, Parent] {
      assert!(!allows(role, Section::Classes, Access::Write));
      assert!(!allows(role, Section::Reports, Access::Write));
    }
  }

  #[test]
  fn navigation_follows_the_table() {
    assert_eq!(sections(Admin).len(), 8);
    assert_eq!(sections(Parent), vec![
      Section::Attendance,
      Section::Namaz,
      Section::IslamicStudies,
      Section::Discipline,
      Section::Fitness,
    ]);
  }

  #[test]
  fn roles_parse_from_config_strings() {
    assert_eq!("teacher".parse::<Role>().unwrap(), Teacher);
    assert!("janitor".parse::<Role>().is_err());
  }
}
