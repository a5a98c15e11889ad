//! libSQL catalog store.
//!
//! The [`Catalog`] struct wraps a libSQL database holding the entries
//! table (plus its FTS index), the uploaded-file registry, editable
//! content pages, and the audit log.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{NaiveDate, Utc};
use libsql::{Connection, Database, Value, params, params_from_iter};
use polidoc_shared::{Entry, PolidocError, Region, Result, YouthLed, languages};
use uuid::Uuid;

use crate::migrations;

/// Column list shared by every query that materializes an [`Entry`].
pub(crate) const ENTRY_COLUMNS: &str = "id, title, authors, url, org_publishers, org_doc_id, \
     org_type, doc_type, abstract, youth_led, youth_led_details, keywords, regions, \
     start_date, end_date, language, alt_language_ids, related_ids";

/// Primary storage handle wrapping a libSQL database.
pub struct Catalog {
    #[allow(dead_code)]
    db: Database,
    pub(crate) conn: Connection,
}

pub(crate) fn storage_err(e: impl std::fmt::Display) -> PolidocError {
    PolidocError::Storage(e.to_string())
}

impl Catalog {
    /// Open or create a database at `path` and run pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PolidocError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(storage_err)?;
        let conn = db.connect().map_err(storage_err)?;

        let catalog = Self { db, conn };
        catalog.run_migrations().await?;
        Ok(catalog)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    PolidocError::Storage(format!("migration v{} failed: {e}", migration.version))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    pub(crate) async fn schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // Entry reads
    // -----------------------------------------------------------------------

    /// All entries, ordered by id.
    pub async fn get_all_entries(&self) -> Result<Vec<Entry>> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries ORDER BY id");
        let mut rows = self
            .conn
            .query(&sql, params![])
            .await
            .map_err(storage_err)?;

        let mut entries = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            entries.push(row_to_entry(&row)?);
        }
        Ok(entries)
    }

    /// One entry with its alternate-language and related-document
    /// cross-references resolved to display data.
    pub async fn get_entry(&self, id: &str) -> Result<Option<EntryDetail>> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1");
        let mut rows = self
            .conn
            .query(&sql, params![id])
            .await
            .map_err(storage_err)?;

        let entry = match rows.next().await {
            Ok(Some(row)) => row_to_entry(&row)?,
            Ok(None) => return Ok(None),
            Err(e) => return Err(storage_err(e)),
        };

        // Alternates keyed by language display name; the entry itself is
        // excluded since it is a member of its own class.
        let mut alternates = BTreeMap::new();
        for alt_id in &entry.alt_language_ids {
            if alt_id == id {
                continue;
            }
            let mut alt_rows = self
                .conn
                .query(
                    "SELECT language FROM entries WHERE id = ?1",
                    params![alt_id.as_str()],
                )
                .await
                .map_err(storage_err)?;
            if let Ok(Some(row)) = alt_rows.next().await {
                let code: String = row.get(0).map_err(storage_err)?;
                alternates.insert(languages::display_name(&code).to_string(), alt_id.clone());
            }
        }

        let mut related = BTreeMap::new();
        for related_id in &entry.related_ids {
            let mut rel_rows = self
                .conn
                .query(
                    "SELECT title FROM entries WHERE id = ?1",
                    params![related_id.as_str()],
                )
                .await
                .map_err(storage_err)?;
            if let Ok(Some(row)) = rel_rows.next().await {
                let title: String = row.get(0).map_err(storage_err)?;
                related.insert(related_id.clone(), title);
            }
        }

        // Attachments cover the whole alternate class so every rendition
        // surfaces the same set of downloadable files.
        let mut class_ids: Vec<String> = entry.alt_language_ids.clone();
        if !class_ids.iter().any(|member| member == id) {
            class_ids.push(id.to_string());
        }
        let files = self.entry_files(&class_ids).await?;

        Ok(Some(EntryDetail {
            entry,
            alternates,
            related,
            files,
        }))
    }

    /// High-level catalog counts for the info surface.
    pub async fn info(&self) -> Result<CatalogInfo> {
        let entry_count = self.scalar_count("SELECT COUNT(*) FROM entries").await?;
        let language_count = self
            .scalar_count("SELECT COUNT(DISTINCT language) FROM entries")
            .await?;
        let file_count = self
            .scalar_count("SELECT COUNT(*) FROM spreadsheet_files")
            .await?;

        let mut rows = self
            .conn
            .query(
                "SELECT MAX(uploaded_at) FROM spreadsheet_files",
                params![],
            )
            .await
            .map_err(storage_err)?;
        let last_import_at = match rows.next().await {
            Ok(Some(row)) => row.get::<String>(0).ok(),
            _ => None,
        };

        Ok(CatalogInfo {
            entry_count,
            language_count,
            file_count,
            last_import_at,
        })
    }

    pub(crate) async fn scalar_count(&self, sql: &str) -> Result<u64> {
        let mut rows = self
            .conn
            .query(sql, params![])
            .await
            .map_err(storage_err)?;
        match rows.next().await {
            Ok(Some(row)) => Ok(row.get::<u64>(0).unwrap_or(0)),
            Ok(None) => Ok(0),
            Err(e) => Err(storage_err(e)),
        }
    }

    // -----------------------------------------------------------------------
    // Uploaded-file registry
    // -----------------------------------------------------------------------

    /// Record an uploaded spreadsheet, replacing any previous record with
    /// the same filename.
    pub async fn record_file(
        &self,
        filename: &str,
        sha256: &str,
        size_bytes: u64,
        object_key: &str,
    ) -> Result<FileRecord> {
        let record = FileRecord {
            id: Uuid::now_v7().to_string(),
            filename: filename.to_string(),
            sha256: sha256.to_string(),
            size_bytes,
            object_key: object_key.to_string(),
            uploaded_at: Utc::now().to_rfc3339(),
        };
        self.conn
            .execute(
                "INSERT INTO spreadsheet_files (id, filename, sha256, size_bytes, object_key, uploaded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(filename) DO UPDATE SET
                   sha256 = excluded.sha256,
                   size_bytes = excluded.size_bytes,
                   object_key = excluded.object_key,
                   uploaded_at = excluded.uploaded_at",
                params![
                    record.id.as_str(),
                    record.filename.as_str(),
                    record.sha256.as_str(),
                    record.size_bytes as i64,
                    record.object_key.as_str(),
                    record.uploaded_at.as_str(),
                ],
            )
            .await
            .map_err(storage_err)?;
        Ok(record)
    }

    /// Look up a file record by filename.
    pub async fn find_file(&self, filename: &str) -> Result<Option<FileRecord>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, filename, sha256, size_bytes, object_key, uploaded_at
                 FROM spreadsheet_files WHERE filename = ?1",
                params![filename],
            )
            .await
            .map_err(storage_err)?;
        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_file(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(storage_err(e)),
        }
    }

    /// All uploaded files, most recent first.
    pub async fn list_files(&self) -> Result<Vec<FileRecord>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, filename, sha256, size_bytes, object_key, uploaded_at
                 FROM spreadsheet_files ORDER BY uploaded_at DESC",
                params![],
            )
            .await
            .map_err(storage_err)?;
        let mut files = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            files.push(row_to_file(&row)?);
        }
        Ok(files)
    }

    /// Delete a file record, returning it so the caller can also remove
    /// the stored object.
    pub async fn delete_file(&self, filename: &str) -> Result<Option<FileRecord>> {
        let record = self.find_file(filename).await?;
        if record.is_some() {
            self.conn
                .execute(
                    "DELETE FROM spreadsheet_files WHERE filename = ?1",
                    params![filename],
                )
                .await
                .map_err(storage_err)?;
        }
        Ok(record)
    }

    // -----------------------------------------------------------------------
    // Entry attachments
    // -----------------------------------------------------------------------

    /// Attach a file to an entry, replacing any attachment of the same
    /// name.
    pub async fn add_entry_file(
        &self,
        entry_id: &str,
        filename: &str,
        object_key: &str,
    ) -> Result<EntryFile> {
        let record = EntryFile {
            entry_id: entry_id.to_string(),
            filename: filename.to_string(),
            object_key: object_key.to_string(),
            added_at: Utc::now().to_rfc3339(),
        };
        self.conn
            .execute(
                "INSERT INTO entry_files (entry_id, filename, object_key, added_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(entry_id, filename) DO UPDATE SET
                   object_key = excluded.object_key,
                   added_at = excluded.added_at",
                params![
                    record.entry_id.as_str(),
                    record.filename.as_str(),
                    record.object_key.as_str(),
                    record.added_at.as_str(),
                ],
            )
            .await
            .map_err(storage_err)?;
        Ok(record)
    }

    /// Detach a file from an entry, returning the record so the caller
    /// can also remove the stored object.
    pub async fn remove_entry_file(
        &self,
        entry_id: &str,
        filename: &str,
    ) -> Result<Option<EntryFile>> {
        let mut rows = self
            .conn
            .query(
                "SELECT entry_id, filename, object_key, added_at
                 FROM entry_files WHERE entry_id = ?1 AND filename = ?2",
                params![entry_id, filename],
            )
            .await
            .map_err(storage_err)?;
        let record = match rows.next().await {
            Ok(Some(row)) => row_to_entry_file(&row)?,
            Ok(None) => return Ok(None),
            Err(e) => return Err(storage_err(e)),
        };
        self.conn
            .execute(
                "DELETE FROM entry_files WHERE entry_id = ?1 AND filename = ?2",
                params![entry_id, filename],
            )
            .await
            .map_err(storage_err)?;
        Ok(Some(record))
    }

    /// All attachments of the given entries, ordered by entry then
    /// filename.
    pub async fn entry_files(&self, entry_ids: &[String]) -> Result<Vec<EntryFile>> {
        if entry_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders: Vec<String> = (1..=entry_ids.len()).map(|n| format!("?{n}")).collect();
        let sql = format!(
            "SELECT entry_id, filename, object_key, added_at
             FROM entry_files WHERE entry_id IN ({})
             ORDER BY entry_id, filename",
            placeholders.join(", ")
        );
        let values: Vec<Value> = entry_ids
            .iter()
            .map(|id| Value::Text(id.clone()))
            .collect();
        let mut rows = self
            .conn
            .query(&sql, params_from_iter(values))
            .await
            .map_err(storage_err)?;
        let mut files = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            files.push(row_to_entry_file(&row)?);
        }
        Ok(files)
    }

    // -----------------------------------------------------------------------
    // Content pages
    // -----------------------------------------------------------------------

    /// Get a content page body by slug.
    pub async fn get_page(&self, slug: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query("SELECT content FROM pages WHERE slug = ?1", params![slug])
            .await
            .map_err(storage_err)?;
        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row.get::<String>(0).map_err(storage_err)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(storage_err(e)),
        }
    }

    /// Create or replace a content page.
    pub async fn set_page(&self, slug: &str, content: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO pages (slug, content, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(slug) DO UPDATE SET
                   content = excluded.content,
                   updated_at = excluded.updated_at",
                params![slug, content, now.as_str()],
            )
            .await
            .map_err(storage_err)?;
        Ok(())
    }
}

/// A catalog entry joined with display data for its cross-references.
#[derive(Debug, Clone)]
pub struct EntryDetail {
    pub entry: Entry,
    /// Language display name -> item id of the alternate rendition.
    pub alternates: BTreeMap<String, String>,
    /// Item id -> title of the related document.
    pub related: BTreeMap<String, String>,
    /// Attachments of the entry and its language alternates.
    pub files: Vec<EntryFile>,
}

/// Catalog counts for the info surface.
#[derive(Debug, Clone)]
pub struct CatalogInfo {
    pub entry_count: u64,
    pub language_count: u64,
    pub file_count: u64,
    pub last_import_at: Option<String>,
}

/// A row of the uploaded-file registry.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub id: String,
    pub filename: String,
    pub sha256: String,
    pub size_bytes: u64,
    pub object_key: String,
    pub uploaded_at: String,
}

/// A file attached to one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFile {
    pub entry_id: String,
    pub filename: String,
    pub object_key: String,
    pub added_at: String,
}

fn row_to_entry_file(row: &libsql::Row) -> Result<EntryFile> {
    Ok(EntryFile {
        entry_id: row.get::<String>(0).map_err(storage_err)?,
        filename: row.get::<String>(1).map_err(storage_err)?,
        object_key: row.get::<String>(2).map_err(storage_err)?,
        added_at: row.get::<String>(3).map_err(storage_err)?,
    })
}

fn row_to_file(row: &libsql::Row) -> Result<FileRecord> {
    Ok(FileRecord {
        id: row.get::<String>(0).map_err(storage_err)?,
        filename: row.get::<String>(1).map_err(storage_err)?,
        sha256: row.get::<String>(2).map_err(storage_err)?,
        size_bytes: row.get::<i64>(3).map_err(storage_err)? as u64,
        object_key: row.get::<String>(4).map_err(storage_err)?,
        uploaded_at: row.get::<String>(5).map_err(storage_err)?,
    })
}

fn parse_string_list(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|e| PolidocError::Storage(format!("invalid JSON list {raw:?}: {e}")))
}

fn parse_date(raw: Option<String>) -> Result<Option<NaiveDate>> {
    match raw {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| PolidocError::Storage(format!("invalid date {s:?}: {e}"))),
    }
}

/// Convert a database row (in [`ENTRY_COLUMNS`] order) to an [`Entry`].
pub(crate) fn row_to_entry(row: &libsql::Row) -> Result<Entry> {
    let youth_led_raw: String = row.get(9).map_err(storage_err)?;
    let youth_led = YouthLed::from_str_opt(&youth_led_raw)
        .ok_or_else(|| PolidocError::Storage(format!("invalid youth-led value {youth_led_raw:?}")))?;

    let regions_raw: String = row.get(12).map_err(storage_err)?;
    let regions = parse_string_list(&regions_raw)?
        .into_iter()
        .map(|name| {
            Region::from_name(&name)
                .ok_or_else(|| PolidocError::Storage(format!("invalid region {name:?}")))
        })
        .collect::<Result<Vec<Region>>>()?;

    let org_publishers_raw: String = row.get(4).map_err(storage_err)?;
    let keywords_raw: String = row.get(11).map_err(storage_err)?;
    let alt_ids_raw: String = row.get(16).map_err(storage_err)?;
    let related_raw: String = row.get(17).map_err(storage_err)?;

    Ok(Entry {
        item_id: row.get::<String>(0).map_err(storage_err)?,
        title: row.get::<String>(1).map_err(storage_err)?,
        authors: row.get::<String>(2).map_err(storage_err)?,
        url: row.get::<String>(3).map_err(storage_err)?,
        org_publishers: parse_string_list(&org_publishers_raw)?,
        org_doc_id: row.get::<String>(5).map_err(storage_err)?,
        org_type: row.get::<String>(6).map_err(storage_err)?,
        doc_type: row.get::<String>(7).map_err(storage_err)?,
        abstract_text: row.get::<String>(8).map_err(storage_err)?,
        youth_led,
        youth_led_details: row.get::<String>(10).map_err(storage_err)?,
        keywords: parse_string_list(&keywords_raw)?,
        regions,
        start_date: parse_date(row.get::<Option<String>>(13).map_err(storage_err)?)?,
        end_date: parse_date(row.get::<Option<String>>(14).map_err(storage_err)?)?,
        language: row.get::<String>(15).map_err(storage_err)?,
        alt_language_ids: parse_string_list(&alt_ids_raw)?,
        related_ids: parse_string_list(&related_raw)?,
    })
}

/// JSON-encode a string list for storage.
pub(crate) fn encode_list<S: AsRef<str> + serde::Serialize>(list: &[S]) -> String {
    serde_json::to_string(list).unwrap_or_else(|_| "[]".to_string())
}

/// Region names JSON-encoded for storage.
pub(crate) fn encode_regions(regions: &[Region]) -> String {
    let names: Vec<&str> = regions.iter().map(|r| r.name()).collect();
    serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
}
