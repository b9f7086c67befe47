//! SQL migration definitions for the rigmate catalog database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a set of SQL statements executed within a transaction.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: components, price_history",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version   INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Normalized catalog components. The (ctype, dedup_key) uniqueness makes
-- dedup-and-upsert atomic per key: concurrent ingestions of the same model
-- cannot create two rows.
CREATE TABLE IF NOT EXISTS components (
    id                 TEXT PRIMARY KEY,
    ctype              TEXT NOT NULL,
    dedup_key          TEXT NOT NULL,
    manufacturer       TEXT,
    model              TEXT,
    raw_name           TEXT NOT NULL,
    description        TEXT,
    specs_json         TEXT NOT NULL,
    price_dzd          INTEGER NOT NULL,
    benchmark_score    INTEGER,
    gaming_score       INTEGER,
    productivity_score INTEGER,
    ai_score           INTEGER,
    condition          TEXT,
    source_url         TEXT NOT NULL,
    location           TEXT,
    first_seen         TEXT NOT NULL,
    last_seen          TEXT NOT NULL,
    UNIQUE(ctype, dedup_key)
);

CREATE INDEX IF NOT EXISTS idx_components_ctype ON components(ctype);
CREATE INDEX IF NOT EXISTS idx_components_last_seen ON components(last_seen);

-- Append-only price observations, one row per sighting
CREATE TABLE IF NOT EXISTS price_history (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    component_id TEXT NOT NULL REFERENCES components(id) ON DELETE CASCADE,
    price_dzd    INTEGER NOT NULL,
    observed_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_price_history_component ON price_history(component_id);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
