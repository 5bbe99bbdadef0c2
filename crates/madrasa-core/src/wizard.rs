//! The four-step student registration wizard.
//!
//! A bounded, linear state machine. [`RegistrationWizard::next`] validates
//! only the step being left; [`RegistrationWizard::prev`] never validates.
//! Both clamp at the ends instead of failing. Only the review step can be
//! submitted, and it packages everything gathered into one [`NewStudent`].

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roster::NewStudent;

pub const TOTAL_STEPS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
  Personal,
  Guardian,
  Enrolment,
  Review,
}

impl Step {
  /// 1-based position.
  pub fn number(self) -> u8 {
    match self {
      Self::Personal => 1,
      Self::Guardian => 2,
      Self::Enrolment => 3,
      Self::Review => 4,
    }
  }

  fn forward(self) -> Self {
    match self {
      Self::Personal => Self::Guardian,
      Self::Guardian => Self::Enrolment,
      Self::Enrolment | Self::Review => Self::Review,
    }
  }

  fn back(self) -> Self {
    match self {
      Self::Personal | Self::Guardian => Self::Personal,
      Self::Enrolment => Self::Guardian,
      Self::Review => Self::Enrolment,
    }
  }
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "step {} of {TOTAL_STEPS}", self.number())
  }
}

/// Everything the wizard has gathered so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
  // Personal
  pub name:           String,
  pub date_of_birth:  Option<NaiveDate>,
  pub address:        String,
  // Guardian
  pub guardian_name:  String,
  pub guardian_phone: String,
  // Enrolment
  pub class_name:     String,
  pub roll_number:    String,
  pub admission_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:   &'static str,
  pub message: &'static str,
}

#[derive(Debug, Error)]
pub enum WizardError {
  #[error("{step} is incomplete")]
  Invalid {
    step:   Step,
    errors: Vec<FieldError>,
  },

  #[error("only the review step can be submitted, wizard is on {0}")]
  NotAtLastStep(Step),

  #[error("registration failed: {0}")]
  Rejected(String),
}

#[derive(Debug, Clone)]
pub struct RegistrationWizard {
  step:   Step,
  form:   RegistrationForm,
  today:  NaiveDate,
  notice: Option<String>,
}

impl RegistrationWizard {
  /// A fresh wizard on step 1. `today` is the default admission date.
  pub fn new(today: NaiveDate) -> Self {
    Self { step: Step::Personal, form: RegistrationForm::default(), today, notice: None }
  }

  pub fn step(&self) -> Step { self.step }

  pub fn form(&self) -> &RegistrationForm { &self.form }

  pub fn form_mut(&mut self) -> &mut RegistrationForm { &mut self.form }

  /// The last submission failure, if the wizard is still waiting on a retry.
  pub fn notice(&self) -> Option<&str> { self.notice.as_deref() }

  /// Missing required fields on the current step.
  pub fn validate(&self) -> Vec<FieldError> {
    let f = &self.form;
    let mut errors = Vec::new();
    let mut require = |field, value: &str, message| {
      if value.trim().is_empty() {
        errors.push(FieldError { field, message });
      }
    };
    match self.step {
      Step::Personal => require("name", &f.name, "name is required"),
      Step::Guardian => {
        require("guardianName", &f.guardian_name, "guardian name is required");
        require("guardianPhone", &f.guardian_phone, "guardian phone is required");
      }
      Step::Enrolment => require("className", &f.class_name, "class is required"),
      Step::Review => {}
    }
    errors
  }

  /// Advance one step if the current step is complete. On the last step this
  /// stays put.
  pub fn next(&mut self) -> Result<Step, WizardError> {
    let errors = self.validate();
    if !errors.is_empty() {
      return Err(WizardError::Invalid { step: self.step, errors });
    }
    if self.step == Step::Enrolment && self.form.admission_date.is_none() {
      self.form.admission_date = Some(self.today);
    }
    self.step = self.step.forward();
    Ok(self.step)
  }

  /// Go back one step, stopping at the first.
  pub fn prev(&mut self) -> Step {
    self.step = self.step.back();
    self.step
  }

  /// The finished registration. Only available on the review step.
  pub fn submission(&self) -> Result<NewStudent, WizardError> {
    if self.step != Step::Review {
      return Err(WizardError::NotAtLastStep(self.step));
    }
    let f = self.form.clone();
    let text = |s: String| Some(s).filter(|s| !s.trim().is_empty());
    Ok(NewStudent {
      student_id: None,
      name: f.name,
      class_name: f.class_name,
      roll_number: text(f.roll_number),
      guardian_name: text(f.guardian_name),
      guardian_phone: text(f.guardian_phone),
      date_of_birth: f.date_of_birth,
      address: text(f.address),
      admission_date: Some(f.admission_date.unwrap_or(self.today)),
    })
  }

  /// Hand the submission to `create`. Success starts a fresh registration;
  /// failure keeps the wizard on the review step with a notice.
  pub fn submit<T, E>(
    &mut self,
    create: impl FnOnce(NewStudent) -> Result<T, E>,
  ) -> Result<T, WizardError>
  where
    E: fmt::Display,
  {
    let submission = self.submission()?;
    match create(submission) {
      Ok(created) => {
        *self = Self::new(self.today);
        Ok(created)
      }
      Err(e) => {
        let message = e.to_string();
        self.notice = Some(message.clone());
        Err(WizardError::Rejected(message))
      }
    }
  }
}
