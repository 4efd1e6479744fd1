//! Audit-log repository; the only table this service writes.

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

use crate::entities::audit_log;

/// A lookup event to record.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    /// Acting admin's id, as forwarded by the admin panel.
    pub admin_id: i32,
    /// Acting admin's username.
    pub admin_name: String,
    /// Client the lookup concerned.
    pub client_id: i32,
    /// Action name, e.g. `view_details`.
    pub action: String,
    /// Search term when the action was a search.
    pub search_term: Option<String>,
    /// Requesting address.
    pub ip_address: String,
}

/// Append-only repository over the owned audit-log table.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    db: DatabaseConnection,
}

impl AuditLogRepository {
    /// Creates a new audit-log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends one audit row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn append(&self, entry: AuditEntry) -> Result<audit_log::Model, DbErr> {
        let row = audit_log::ActiveModel {
            admin_id: Set(entry.admin_id),
            admin_name: Set(entry.admin_name),
            client_id: Set(entry.client_id),
            action: Set(entry.action),
            search_term: Set(entry.search_term),
            ip_address: Set(entry.ip_address),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        row.insert(&self.db).await
    }

    /// Most recent rows for a client, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn recent_for_client(
        &self,
        client_id: i32,
        limit: u64,
    ) -> Result<Vec<audit_log::Model>, DbErr> {
        audit_log::Entity::find()
            .filter(audit_log::Column::ClientId.eq(client_id))
            .order_by_desc(audit_log::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
    }
}
