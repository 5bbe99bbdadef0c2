//! The built-in demo roster.
//!
//! Only ever loaded on request (`seed_demo`), and a store holding it reports
//! itself as [`DataSource::Demo`](crate::store::DataSource::Demo) until the
//! roster is first edited.

use chrono::NaiveDate;

use crate::roster::{Student, StudentId};

const STUDENTS: &[(&str, &str, &str, &str, &str)] = &[
  ("s1", "Ahmed Hassan", "Hifz A", "1", "Hassan Ali"),
  ("s2", "Aisha Rahman", "Hifz A", "2", "Abdul Rahman"),
  ("s3", "Yusuf Khan", "Hifz A", "3", "Imran Khan"),
  ("s4", "Maryam Siddiqui", "Nazra B", "1", "Tariq Siddiqui"),
  ("s5", "Ibrahim Malik", "Nazra B", "2", "Faisal Malik"),
  ("s6", "Fatima Noor", "Nazra B", "3", "Zainab Noor"),
];

pub fn demo_roster(today: NaiveDate) -> Vec<Student> {
  STUDENTS
    .iter()
    .map(|&(id, name, class_name, roll, guardian)| Student {
      student_id:     StudentId::new(id),
      name:           name.to_owned(),
      class_name:     class_name.to_owned(),
      roll_number:    Some(roll.to_owned()),
      guardian_name:  Some(guardian.to_owned()),
      guardian_phone: None,
      date_of_birth:  None,
      address:        None,
      admission_date: Some(today),
      active:         true,
    })
    .collect()
}
