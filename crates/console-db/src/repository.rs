use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use console_core::{AuditLog, Error, EventParams, Result};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::application::{TransactionHandle, closed_transaction};
use crate::entities::audit_log;

/// One window of a filtered listing, along with the number of rows matching
/// the filter regardless of the window.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Validates and stores `entry`, assigning its `id` (when nil) and `created_at`.
    async fn create(&self, entry: &mut AuditLog) -> Result<()>;
    async fn load_by_id(&self, id: Uuid) -> Result<AuditLog>;
    async fn list_by_identity_id(
        &self,
        identity_id: Uuid,
        start: i64,
        limit: i64,
    ) -> Result<Page<AuditLog>>;
    async fn list_by_username(&self, username: &str, start: i64, limit: i64)
    -> Result<Page<AuditLog>>;
}

#[derive(Clone)]
pub(crate) enum Executor {
    Connection(Arc<DatabaseConnection>),
    Transaction(Arc<TransactionHandle>),
}

// Runs `$body` with `$conn` bound to whichever connection the executor wraps.
macro_rules! with_conn {
    ($exec:expr, |$conn:ident| $body:expr) => {
        match $exec {
            Executor::Connection(db) => {
                let $conn = &**db;
                $body
            }
            Executor::Transaction(handle) => {
                let guard = handle.lock().await;
                let $conn = guard.as_ref().ok_or_else(closed_transaction)?;
                $body
            }
        }
    };
}

pub struct SeaOrmAuditLogRepository {
    exec: Executor,
}

impl SeaOrmAuditLogRepository {
    pub(crate) fn new(exec: Executor) -> Self {
        Self { exec }
    }

    async fn list(
        &self,
        op: &str,
        filter: Condition,
        start: i64,
        limit: i64,
    ) -> Result<Page<AuditLog>> {
        if start < 0 {
            return Err(Error::bad_parameter("start", start));
        }
        if limit <= 0 {
            return Err(Error::bad_parameter("limit", limit));
        }
        let (offset, limit) = (start as u64, limit as u64);

        let (rows, total) = match &self.exec {
            // Outside a unit of work the page and its total still have to come
            // from the same transaction, so wrap both queries in a short one.
            Executor::Connection(db) => {
                let txn = db.begin().await.map_err(|e| Error::internal(op, e))?;
                let page = list_window(&txn, filter, offset, limit).await;
                match page {
                    Ok(page) => {
                        txn.commit().await.map_err(|e| Error::internal(op, e))?;
                        page
                    }
                    Err(e) => {
                        let _ = txn.rollback().await;
                        return Err(Error::internal(op, e));
                    }
                }
            }
            Executor::Transaction(handle) => {
                let guard = handle.lock().await;
                let txn = guard.as_ref().ok_or_else(closed_transaction)?;
                list_window(txn, filter, offset, limit)
                    .await
                    .map_err(|e| Error::internal(op, e))?
            }
        };

        Ok(Page {
            items: rows.into_iter().map(AuditLog::from).collect(),
            total,
        })
    }
}

async fn list_window<C: ConnectionTrait>(
    conn: &C,
    filter: Condition,
    offset: u64,
    limit: u64,
) -> std::result::Result<(Vec<audit_log::Model>, u64), DbErr> {
    let query = audit_log::Entity::find().filter(filter);
    let total = query.clone().count(conn).await?;
    let rows = query
        .order_by_asc(audit_log::Column::CreatedAt)
        .order_by_asc(audit_log::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(conn)
        .await?;
    Ok((rows, total))
}

#[async_trait]
impl AuditLogRepository for SeaOrmAuditLogRepository {
    async fn create(&self, entry: &mut AuditLog) -> Result<()> {
        entry.validate()?;
        if entry.id.is_nil() {
            entry.id = Uuid::new_v4();
        }
        let created_at = Utc::now();

        let model = audit_log::ActiveModel {
            id: Set(entry.id),
            created_at: Set(created_at.into()),
            identity_id: Set(entry.identity_id.filter(|id| !id.is_nil())),
            username: Set(entry.username.clone().filter(|u| !u.is_empty())),
            event_type_id: Set(entry.event_type_id),
            event_params: Set(serde_json::Value::Object(entry.event_params.clone())),
        };

        with_conn!(&self.exec, |conn| audit_log::Entity::insert(model).exec(conn).await)
            .map_err(|e| Error::internal(&format!("audit_log.create({})", entry.id), e))?;

        entry.created_at = Some(created_at);
        Ok(())
    }

    async fn load_by_id(&self, id: Uuid) -> Result<AuditLog> {
        let found = with_conn!(&self.exec, |conn| audit_log::Entity::find_by_id(id)
            .one(conn)
            .await)
        .map_err(|e| Error::internal(&format!("audit_log.load_by_id({id})"), e))?;

        match found {
            Some(model) => Ok(model.into()),
            None => {
                tracing::error!(record_id = %id, "auditlog not found");
                Err(Error::not_found("audit_log", id))
            }
        }
    }

    async fn list_by_identity_id(
        &self,
        identity_id: Uuid,
        start: i64,
        limit: i64,
    ) -> Result<Page<AuditLog>> {
        let filter = Condition::all().add(audit_log::Column::IdentityId.eq(identity_id));
        self.list("audit_log.list_by_identity_id", filter, start, limit)
            .await
    }

    async fn list_by_username(
        &self,
        username: &str,
        start: i64,
        limit: i64,
    ) -> Result<Page<AuditLog>> {
        let filter = Condition::all().add(audit_log::Column::Username.eq(username));
        self.list("audit_log.list_by_username", filter, start, limit)
            .await
    }
}

impl From<audit_log::Model> for AuditLog {
    fn from(model: audit_log::Model) -> Self {
        let event_params = match model.event_params {
            serde_json::Value::Object(map) => map,
            _ => EventParams::new(),
        };
        AuditLog {
            id: model.id,
            created_at: Some(model.created_at.with_timezone(&Utc)),
            identity_id: model.identity_id,
            username: model.username,
            event_type_id: model.event_type_id,
            event_params,
        }
    }
}
