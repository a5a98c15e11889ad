//! SQL migration definitions for the Polidoc catalog database.
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
        description: "Initial schema: entries, staging, FTS5, files, attachments, pages, audit log",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Catalog entries. Multi-value fields are JSON arrays queried through
-- json_each; dates are ISO-8601 text so lexical order is date order.
CREATE TABLE IF NOT EXISTS entries (
    id                TEXT PRIMARY KEY,
    title             TEXT NOT NULL,
    authors           TEXT NOT NULL,
    url               TEXT NOT NULL,
    org_publishers    TEXT NOT NULL,
    org_doc_id        TEXT NOT NULL,
    org_type          TEXT NOT NULL,
    doc_type          TEXT NOT NULL,
    abstract          TEXT NOT NULL,
    youth_led         TEXT NOT NULL,
    youth_led_details TEXT NOT NULL,
    keywords          TEXT NOT NULL,
    regions           TEXT NOT NULL,
    start_date        TEXT,
    end_date          TEXT,
    language          TEXT NOT NULL,
    alt_language_ids  TEXT NOT NULL,
    related_ids       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entries_start_date ON entries(start_date);
CREATE INDEX IF NOT EXISTS idx_entries_language ON entries(language);
CREATE INDEX IF NOT EXISTS idx_entries_youth_led ON entries(youth_led);
CREATE INDEX IF NOT EXISTS idx_entries_doc_type ON entries(doc_type);

-- Staging area for atomic bulk replacement
CREATE TABLE IF NOT EXISTS entries_staging (
    id                TEXT PRIMARY KEY,
    title             TEXT NOT NULL,
    authors           TEXT NOT NULL,
    url               TEXT NOT NULL,
    org_publishers    TEXT NOT NULL,
    org_doc_id        TEXT NOT NULL,
    org_type          TEXT NOT NULL,
    doc_type          TEXT NOT NULL,
    abstract          TEXT NOT NULL,
    youth_led         TEXT NOT NULL,
    youth_led_details TEXT NOT NULL,
    keywords          TEXT NOT NULL,
    regions           TEXT NOT NULL,
    start_date        TEXT,
    end_date          TEXT,
    language          TEXT NOT NULL,
    alt_language_ids  TEXT NOT NULL,
    related_ids       TEXT NOT NULL
);

-- Full-text search over entries. alltext folds in the fields that are
-- searchable but not individually scoped.
CREATE VIRTUAL TABLE IF NOT EXISTS entries_fts USING fts5(
    title,
    abstract,
    alltext
);

-- Triggers to keep FTS in sync with entries
CREATE TRIGGER IF NOT EXISTS entries_fts_insert AFTER INSERT ON entries BEGIN
    INSERT INTO entries_fts(rowid, title, abstract, alltext)
    VALUES (
        new.rowid, new.title, new.abstract,
        new.title || ' ' || new.abstract || ' ' || new.authors || ' '
            || new.keywords || ' ' || new.org_publishers || ' ' || new.org_doc_id
    );
END;

CREATE TRIGGER IF NOT EXISTS entries_fts_delete AFTER DELETE ON entries BEGIN
    DELETE FROM entries_fts WHERE rowid = old.rowid;
END;

CREATE TRIGGER IF NOT EXISTS entries_fts_update AFTER UPDATE ON entries BEGIN
    DELETE FROM entries_fts WHERE rowid = old.rowid;
    INSERT INTO entries_fts(rowid, title, abstract, alltext)
    VALUES (
        new.rowid, new.title, new.abstract,
        new.title || ' ' || new.abstract || ' ' || new.authors || ' '
            || new.keywords || ' ' || new.org_publishers || ' ' || new.org_doc_id
    );
END;

-- Registry of uploaded spreadsheet files
CREATE TABLE IF NOT EXISTS spreadsheet_files (
    id          TEXT PRIMARY KEY,
    filename    TEXT NOT NULL UNIQUE,
    sha256      TEXT NOT NULL,
    size_bytes  INTEGER NOT NULL,
    object_key  TEXT NOT NULL,
    uploaded_at TEXT NOT NULL
);

-- Files attached to individual entries (translations, summaries, ...).
-- Entry ids stay stable across catalog replacements, so attachments
-- survive re-imports.
CREATE TABLE IF NOT EXISTS entry_files (
    entry_id   TEXT NOT NULL,
    filename   TEXT NOT NULL,
    object_key TEXT NOT NULL,
    added_at   TEXT NOT NULL,
    PRIMARY KEY (entry_id, filename)
);

-- Editable content pages (about, FAQ, ...), keyed by slug
CREATE TABLE IF NOT EXISTS pages (
    slug       TEXT PRIMARY KEY,
    content    TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Append-only audit trail of catalog mutations
CREATE TABLE IF NOT EXISTS audit_log (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    event_type TEXT NOT NULL,
    message    TEXT NOT NULL,
    data_json  TEXT,
    created_at TEXT NOT NULL
);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
