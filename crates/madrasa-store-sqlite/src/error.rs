//! Error type for `madrasa-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] madrasa_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error in {collection}: {source}")]
  Json {
    collection: &'static str,
    #[source]
    source:     serde_json::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
