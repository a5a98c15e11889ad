//! Append-only audit trail of catalog mutations.

use chrono::Utc;
use libsql::params;
use polidoc_shared::Result;

use crate::store::{Catalog, storage_err};

/// One audit event, as read back from the log.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub id: i64,
    pub event_type: String,
    pub message: String,
    pub data_json: Option<String>,
    pub created_at: String,
}

impl Catalog {
    /// Append an event to the audit log.
    pub async fn append_audit(
        &self,
        event_type: &str,
        message: &str,
        data_json: Option<&str>,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO audit_log (event_type, message, data_json, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![event_type, message, data_json, now.as_str()],
            )
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    /// Most recent audit events, newest first.
    pub async fn recent_audit(&self, limit: u32) -> Result<Vec<AuditEvent>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, event_type, message, data_json, created_at
                 FROM audit_log ORDER BY id DESC LIMIT ?1",
                params![i64::from(limit)],
            )
            .await
            .map_err(storage_err)?;

        let mut events = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            events.push(AuditEvent {
                id: row.get::<i64>(0).map_err(storage_err)?,
                event_type: row.get::<String>(1).map_err(storage_err)?,
                message: row.get::<String>(2).map_err(storage_err)?,
                data_json: row.get::<Option<String>>(3).map_err(storage_err)?,
                created_at: row.get::<String>(4).map_err(storage_err)?,
            });
        }
        Ok(events)
    }
}
