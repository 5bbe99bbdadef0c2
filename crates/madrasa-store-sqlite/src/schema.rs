//! SQL schema for the Madrasa SQLite store.
//!
//! Executed once at connection startup. Migrations are gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Small whole documents: 'students' (the roster) and 'meta'.
-- Version 1 stores also kept each dimension's records here as one JSON
-- array; those are moved into `records` when the store is opened.
CREATE TABLE IF NOT EXISTS collections (
    name        TEXT PRIMARY KEY,
    value_json  TEXT NOT NULL,
    updated_at  TEXT NOT NULL   -- RFC 3339 UTC
);

-- One row per record. `seq` keeps insertion order and survives updates.
CREATE TABLE IF NOT EXISTS records (
    seq           INTEGER PRIMARY KEY AUTOINCREMENT,
    collection    TEXT NOT NULL,   -- 'attendance' | 'namaz' | 'islamicStudies' | ...
    record_id     TEXT NOT NULL,
    student_id    TEXT NOT NULL,
    student_name  TEXT NOT NULL,
    class_name    TEXT NOT NULL,
    date          TEXT NOT NULL,   -- YYYY-MM-DD
    payload_json  TEXT NOT NULL,   -- the dimension's fields only
    updated_at    TEXT NOT NULL,   -- RFC 3339 UTC
    UNIQUE (collection, student_id, date)
);

CREATE INDEX IF NOT EXISTS records_day_idx ON records(collection, date, class_name);

PRAGMA user_version = 2;
";
