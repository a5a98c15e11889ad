//! The catalog service bundle.
//!
//! [`CatalogService`] owns the store, the object store, the configuration,
//! and the cached facet snapshot, and funnels every catalog mutation
//! through a single writer lock. Read paths (search, browse, lookups) take
//! no lock; the facet snapshot is swapped atomically behind an `RwLock`.

use std::sync::Arc;

use polidoc_ingest::ImportBatch;
use polidoc_shared::{AppConfig, PolidocError, Result, expand_home};
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, RwLock};

use crate::facets::FacetSnapshot;
use crate::loader::{CatalogDiff, diff_entries};
use crate::objstore::{LocalObjectStore, ObjectStore, attachment_key, spreadsheet_key};
use crate::search::{SearchRequest, SearchResults};
use crate::store::{Catalog, CatalogInfo, EntryDetail, FileRecord};

/// What an import would do (preview) or did (apply).
#[derive(Debug)]
pub struct ImportReport {
    pub sheet_name: String,
    /// Entries in the incoming batch.
    pub total: usize,
    pub diff: CatalogDiff,
    pub nits: Vec<String>,
    /// Whether a spreadsheet with this filename was uploaded before.
    pub file_already_exists: bool,
}

/// Service bundle over the catalog store and the object store.
pub struct CatalogService {
    catalog: Catalog,
    objects: Box<dyn ObjectStore>,
    config: AppConfig,
    facets: RwLock<Arc<FacetSnapshot>>,
    /// Serializes every catalog mutation.
    writer: Mutex<()>,
}

impl CatalogService {
    /// Assemble a service over an open catalog and object store.
    pub async fn new(
        catalog: Catalog,
        objects: Box<dyn ObjectStore>,
        config: AppConfig,
    ) -> Result<Self> {
        let snapshot = catalog.build_facets(&config.search).await?;
        Ok(Self {
            catalog,
            objects,
            config,
            facets: RwLock::new(Arc::new(snapshot)),
            writer: Mutex::new(()),
        })
    }

    /// Open the database and object store named by the configuration.
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let db_path = expand_home(&config.storage.database_path);
        let catalog = Catalog::open(&db_path).await?;
        let objects = Box::new(LocalObjectStore::new(
            expand_home(&config.storage.object_store_root),
            config.storage.public_url_prefix.clone(),
        ));
        Self::new(catalog, objects, config).await
    }

    fn check_size(&self, bytes: &[u8]) -> Result<()> {
        let max = self.config.import.max_upload_bytes;
        if bytes.len() as u64 > max {
            return Err(PolidocError::malformed(format!(
                "workbook is {} bytes, limit is {max}",
                bytes.len()
            )));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Import
    // -----------------------------------------------------------------------

    /// Parse a workbook and report what applying it would change. No
    /// store mutation.
    pub async fn preview_import(&self, bytes: &[u8], filename: &str) -> Result<ImportReport> {
        self.check_size(bytes)?;
        let batch = polidoc_ingest::parse_workbook(bytes, &self.config.import.sheet_marker)?;
        self.preview_batch(&batch, filename).await
    }

    /// Diff an already-parsed batch against the live catalog.
    pub async fn preview_batch(&self, batch: &ImportBatch, filename: &str) -> Result<ImportReport> {
        let current = self.catalog.get_all_entries().await?;
        let diff = diff_entries(&current, &batch.entries);
        let file_already_exists = self.catalog.find_file(filename).await?.is_some();

        Ok(ImportReport {
            sheet_name: batch.sheet_name.clone(),
            total: batch.entries.len(),
            diff,
            nits: batch.nits.clone(),
            file_already_exists,
        })
    }

    /// Parse a workbook and replace the catalog with it.
    pub async fn apply_import(
        &self,
        bytes: &[u8],
        filename: &str,
        overwrite: bool,
    ) -> Result<ImportReport> {
        self.check_size(bytes)?;
        let batch = polidoc_ingest::parse_workbook(bytes, &self.config.import.sheet_marker)?;
        self.apply_batch(&batch, bytes, filename, overwrite).await
    }

    /// Replace the catalog with an already-parsed batch: store the source
    /// workbook, swap the entries table, rebuild facets, and log the
    /// event. All of it under the writer lock.
    pub async fn apply_batch(
        &self,
        batch: &ImportBatch,
        bytes: &[u8],
        filename: &str,
        overwrite: bool,
    ) -> Result<ImportReport> {
        let _guard = self.writer.lock().await;

        let report = self.preview_batch(batch, filename).await?;
        if report.file_already_exists && !overwrite {
            return Err(PolidocError::ObjectStore(format!(
                "spreadsheet {filename:?} was uploaded before; pass overwrite to replace it"
            )));
        }

        let sha256 = {
            let mut hasher = Sha256::new();
            hasher.update(bytes);
            format!("{:x}", hasher.finalize())
        };
        let key = spreadsheet_key(filename);
        self.objects.put(&key, bytes)?;
        self.catalog
            .record_file(filename, &sha256, bytes.len() as u64, &key)
            .await?;

        self.catalog.replace_all(&batch.entries).await?;
        self.refresh_facets().await?;

        let data = serde_json::json!({
            "file": filename,
            "new": report.diff.new.len(),
            "modified": report.diff.modified.len(),
            "unmodified": report.diff.unmodified.len(),
            "deleted": report.diff.deleted.len(),
        });
        self.catalog
            .append_audit(
                "import.apply",
                &format!("imported {} entries from {filename}", report.total),
                Some(&data.to_string()),
            )
            .await?;

        tracing::info!(
            file = filename,
            entries = report.total,
            new = report.diff.new.len(),
            deleted = report.diff.deleted.len(),
            "applied import"
        );
        Ok(report)
    }

    /// Rebuild the cached facet snapshot from the live table.
    pub async fn refresh_facets(&self) -> Result<()> {
        let snapshot = self.catalog.build_facets(&self.config.search).await?;
        *self.facets.write().await = Arc::new(snapshot);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read surface
    // -----------------------------------------------------------------------

    /// The cached facet snapshot.
    pub async fn facets(&self) -> Arc<FacetSnapshot> {
        self.facets.read().await.clone()
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        self.catalog.search(request, &self.config.search).await
    }

    pub async fn entry(&self, id: &str) -> Result<Option<EntryDetail>> {
        self.catalog.get_entry(id).await
    }

    pub async fn info(&self) -> Result<CatalogInfo> {
        self.catalog.info().await
    }

    pub async fn get_page(&self, slug: &str) -> Result<Option<String>> {
        self.catalog.get_page(slug).await
    }

    pub async fn set_page(&self, slug: &str, content: &str) -> Result<()> {
        let _guard = self.writer.lock().await;
        self.catalog.set_page(slug, content).await?;
        self.catalog
            .append_audit("page.set", &format!("updated page {slug:?}"), None)
            .await
    }

    // -----------------------------------------------------------------------
    // File registry
    // -----------------------------------------------------------------------

    pub async fn list_files(&self) -> Result<Vec<FileRecord>> {
        self.catalog.list_files().await
    }

    /// Public URL of a stored object.
    pub fn object_url(&self, key: &str) -> String {
        self.objects.public_url(key)
    }

    /// URL a stored spreadsheet is served from, if it exists.
    pub async fn file_url(&self, filename: &str) -> Result<Option<String>> {
        Ok(self
            .catalog
            .find_file(filename)
            .await?
            .map(|record| self.objects.public_url(&record.object_key)))
    }

    /// Remove a stored spreadsheet and its registry record.
    pub async fn delete_file(&self, filename: &str) -> Result<bool> {
        let _guard = self.writer.lock().await;
        match self.catalog.delete_file(filename).await? {
            Some(record) => {
                self.objects.delete(&record.object_key)?;
                self.catalog
                    .append_audit("file.delete", &format!("removed {filename}"), None)
                    .await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn recent_audit(&self, limit: u32) -> Result<Vec<crate::audit::AuditEvent>> {
        self.catalog.recent_audit(limit).await
    }

    // -----------------------------------------------------------------------
    // Entry attachments
    // -----------------------------------------------------------------------

    /// Attach a file to an entry, replacing any attachment of the same
    /// name, and return its public URL.
    pub async fn add_attachment(
        &self,
        item_id: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String> {
        self.check_size(bytes)?;
        let _guard = self.writer.lock().await;

        if self.catalog.get_entry(item_id).await?.is_none() {
            return Err(PolidocError::malformed(format!(
                "no catalog entry {item_id:?}"
            )));
        }

        let key = attachment_key(item_id, filename);
        let replaced = self.objects.exists(&key)?;
        self.objects.put(&key, bytes)?;
        self.catalog.add_entry_file(item_id, filename, &key).await?;

        let data = serde_json::json!({ "entry": item_id, "file": filename });
        self.catalog
            .append_audit(
                "attachment.add",
                &format!("attached {filename} to {item_id}"),
                Some(&data.to_string()),
            )
            .await?;

        tracing::info!(entry = item_id, file = filename, replaced, "stored attachment");
        Ok(self.objects.public_url(&key))
    }

    /// Detach a file from an entry and remove the stored object.
    pub async fn remove_attachment(&self, item_id: &str, filename: &str) -> Result<bool> {
        let _guard = self.writer.lock().await;
        match self.catalog.remove_entry_file(item_id, filename).await? {
            Some(record) => {
                self.objects.delete(&record.object_key)?;
                let data = serde_json::json!({ "entry": item_id, "file": filename });
                self.catalog
                    .append_audit(
                        "attachment.remove",
                        &format!("detached {filename} from {item_id}"),
                        Some(&data.to_string()),
                    )
                    .await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::entry;
    use polidoc_shared::{ImportConfig, YouthLed};
    use uuid::Uuid;

    async fn test_service(config: AppConfig) -> CatalogService {
        let tag = Uuid::now_v7();
        let catalog = Catalog::open(
            &std::env::temp_dir().join(format!("polidoc_svc_{tag}.db")),
        )
        .await
        .expect("open");
        let objects = Box::new(LocalObjectStore::new(
            std::env::temp_dir().join(format!("polidoc_svc_obj_{tag}")),
            "https://files.polidoc.local/",
        ));
        CatalogService::new(catalog, objects, config)
            .await
            .expect("service")
    }

    fn batch(entries: Vec<polidoc_shared::Entry>) -> ImportBatch {
        ImportBatch {
            sheet_name: "Database".into(),
            entries,
            nits: vec![],
        }
    }

    #[tokio::test]
    async fn apply_then_preview_reports_diff() {
        let service = test_service(AppConfig::default()).await;

        let first = batch(vec![entry("YPS-001", "A", "en"), entry("YPS-002", "B", "fr")]);
        let report = service
            .apply_batch(&first, b"workbook-v1", "registry.xlsx", false)
            .await
            .expect("apply");
        assert_eq!(report.total, 2);
        assert_eq!(report.diff.new.len(), 2);
        assert!(!report.file_already_exists);

        let second = batch(vec![
            entry("YPS-002", "B revised", "fr"),
            entry("YPS-003", "C", "en"),
        ]);
        let report = service
            .preview_batch(&second, "registry.xlsx")
            .await
            .expect("preview");
        assert_eq!(report.diff.new, vec!["YPS-003"]);
        assert_eq!(report.diff.modified, vec!["YPS-002"]);
        assert_eq!(report.diff.deleted, vec!["YPS-001"]);
        assert!(report.file_already_exists);

        // Preview never mutates
        assert_eq!(service.info().await.expect("info").entry_count, 2);
    }

    #[tokio::test]
    async fn reupload_requires_overwrite() {
        let service = test_service(AppConfig::default()).await;
        let entries = batch(vec![entry("YPS-001", "A", "en")]);
        service
            .apply_batch(&entries, b"v1", "registry.xlsx", false)
            .await
            .expect("first apply");

        let err = service
            .apply_batch(&entries, b"v2", "registry.xlsx", false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("uploaded before"));

        service
            .apply_batch(&entries, b"v2", "registry.xlsx", true)
            .await
            .expect("overwrite");
        let files = service.list_files().await.expect("files");
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn apply_refreshes_facets_and_audits() {
        let service = test_service(AppConfig::default()).await;
        assert!(service.facets().await.youth_led.is_empty());

        let mut a = entry("YPS-001", "A", "en");
        a.youth_led = YouthLed::Yes;
        service
            .apply_batch(&batch(vec![a]), b"v1", "registry.xlsx", false)
            .await
            .expect("apply");

        let facets = service.facets().await;
        assert_eq!(facets.youth_led.len(), 1);
        assert_eq!(facets.youth_led[0].value, "Yes");
        assert_eq!(facets.doc_types[0].value, "Report");

        // Replacing the catalog drops facet values that no entry carries
        let mut b = entry("YPS-002", "B", "en");
        b.doc_type = "Resolution".into();
        service
            .apply_batch(&batch(vec![b]), b"v2", "registry.xlsx", true)
            .await
            .expect("second apply");
        let facets = service.facets().await;
        let doc_types: Vec<&str> = facets.doc_types.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(doc_types, vec!["Resolution"]);

        let events = service.recent_audit(10).await.expect("audit");
        assert_eq!(events[0].event_type, "import.apply");
        assert!(events[0].data_json.as_deref().unwrap_or("").contains("\"new\":1"));
    }

    #[tokio::test]
    async fn upload_size_limit() {
        let config = AppConfig {
            import: ImportConfig {
                max_upload_bytes: 8,
                ..ImportConfig::default()
            },
            ..AppConfig::default()
        };
        let service = test_service(config).await;
        let err = service
            .preview_import(b"way more than eight bytes", "big.xlsx")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    #[tokio::test]
    async fn file_lifecycle() {
        let service = test_service(AppConfig::default()).await;
        let entries = batch(vec![entry("YPS-001", "A", "en")]);
        service
            .apply_batch(&entries, b"v1", "registry.xlsx", false)
            .await
            .expect("apply");

        let url = service
            .file_url("registry.xlsx")
            .await
            .expect("url")
            .expect("present");
        assert_eq!(url, "https://files.polidoc.local/dbs/registry.xlsx");

        assert!(service.delete_file("registry.xlsx").await.expect("delete"));
        assert!(!service.delete_file("registry.xlsx").await.expect("gone"));
        assert!(service.file_url("registry.xlsx").await.expect("url").is_none());
    }

    #[tokio::test]
    async fn attachment_lifecycle() {
        let service = test_service(AppConfig::default()).await;
        let entries = batch(vec![entry("YPS-001", "A", "en")]);
        service
            .apply_batch(&entries, b"v1", "registry.xlsx", false)
            .await
            .expect("apply");

        let err = service
            .add_attachment("YPS-999", "summary.pdf", b"pdf bytes")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("YPS-999"));

        let url = service
            .add_attachment("YPS-001", "summary.pdf", b"pdf bytes")
            .await
            .expect("attach");
        assert_eq!(
            url,
            "https://files.polidoc.local/entries/YPS-001/summary.pdf"
        );

        let detail = service
            .entry("YPS-001")
            .await
            .expect("entry")
            .expect("present");
        assert_eq!(detail.files.len(), 1);
        assert_eq!(detail.files[0].filename, "summary.pdf");

        assert!(
            service
                .remove_attachment("YPS-001", "summary.pdf")
                .await
                .expect("detach")
        );
        assert!(
            !service
                .remove_attachment("YPS-001", "summary.pdf")
                .await
                .expect("gone")
        );
        let detail = service.entry("YPS-001").await.expect("entry").expect("present");
        assert!(detail.files.is_empty());

        let events = service.recent_audit(10).await.expect("audit");
        let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
        assert!(types.contains(&"attachment.add"));
        assert!(types.contains(&"attachment.remove"));
    }

    #[tokio::test]
    async fn pages_round_trip() {
        let service = test_service(AppConfig::default()).await;
        service.set_page("about", "# About").await.expect("set");
        assert_eq!(
            service.get_page("about").await.expect("get").as_deref(),
            Some("# About")
        );
    }
}
