//! SQLite backend for the Madrasa record ledger.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The roster and store metadata are kept
//! as JSON documents; records are one row each, unique per collection,
//! student and day. Every write runs inside a single transaction.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
