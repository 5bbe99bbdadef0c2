//! Core types for the Madrasa record ledger.
//!
//! The student roster, the five daily-tracked dimensions (attendance, namaz,
//! Islamic studies, discipline, fitness), the upsert/aggregate/filter rules
//! that govern their records, and the [`store::SchoolStore`] abstraction
//! that backends implement. No HTTP or database code lives here.

pub mod access;
pub mod day;
pub mod demo;
pub mod dimension;
pub mod error;
pub mod record;
pub mod report;
pub mod roster;
pub mod store;
pub mod wizard;

pub use error::{Error, Result};
