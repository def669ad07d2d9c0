use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use console_core::{Error, Result};
use sea_orm::{DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait};
use tokio::sync::{Mutex, MutexGuard};

use crate::repository::{AuditLogRepository, Executor, SeaOrmAuditLogRepository};

pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Access to the repositories of one backing store, either pooled
/// (transactionless) or bound to a transaction.
pub trait Application: Send + Sync {
    fn audit_logs(&self) -> Box<dyn AuditLogRepository>;
}

/// A database transaction. Repositories obtained from it write inside the
/// transaction and stop working once it is committed or rolled back.
#[async_trait]
pub trait Transaction: Application {
    async fn commit(&self) -> Result<()>;
    async fn rollback(&self) -> Result<()>;
    fn application(self: Arc<Self>) -> Arc<dyn Application>;
}

/// A database (or a fake of it) able to start transactions.
#[async_trait]
pub trait Db: Application {
    async fn begin_transaction(&self) -> Result<Arc<dyn Transaction>>;
    fn transaction_timeout(&self) -> Duration;
}

/// See <https://www.postgresql.org/docs/current/sql-set-transaction.html>.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TxIsolationLevel {
    /// Use the connection's setting.
    #[default]
    Default,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl TxIsolationLevel {
    fn as_sea_orm(self) -> Option<IsolationLevel> {
        match self {
            TxIsolationLevel::Default => None,
            TxIsolationLevel::ReadCommitted => Some(IsolationLevel::ReadCommitted),
            TxIsolationLevel::RepeatableRead => Some(IsolationLevel::RepeatableRead),
            TxIsolationLevel::Serializable => Some(IsolationLevel::Serializable),
        }
    }
}

impl FromStr for TxIsolationLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "" | "default" => Ok(Self::Default),
            "read-committed" => Ok(Self::ReadCommitted),
            "repeatable-read" => Ok(Self::RepeatableRead),
            "serializable" => Ok(Self::Serializable),
            other => Err(Error::invalid_input(
                "isolation_level",
                format!("unknown transaction isolation level: {other}"),
            )),
        }
    }
}

#[derive(Clone)]
pub struct SeaOrmApplication {
    db: Arc<DatabaseConnection>,
    isolation_level: TxIsolationLevel,
    transaction_timeout: Duration,
}

impl SeaOrmApplication {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            isolation_level: TxIsolationLevel::Default,
            transaction_timeout: DEFAULT_TRANSACTION_TIMEOUT,
        }
    }

    pub fn with_isolation_level(mut self, level: TxIsolationLevel) -> Self {
        self.isolation_level = level;
        self
    }

    pub fn with_transaction_timeout(mut self, timeout: Duration) -> Self {
        self.transaction_timeout = timeout;
        self
    }

    pub async fn ping(&self) -> Result<()> {
        self.db.ping().await.map_err(|e| Error::internal("ping", e))
    }
}

impl Application for SeaOrmApplication {
    fn audit_logs(&self) -> Box<dyn AuditLogRepository> {
        Box::new(SeaOrmAuditLogRepository::new(Executor::Connection(self.db.clone())))
    }
}

#[async_trait]
impl Db for SeaOrmApplication {
    async fn begin_transaction(&self) -> Result<Arc<dyn Transaction>> {
        let txn = self
            .db
            .begin_with_config(self.isolation_level.as_sea_orm(), None)
            .await
            .map_err(|e| Error::internal("begin_transaction", e))?;
        Ok(Arc::new(SeaOrmTransaction {
            handle: Arc::new(TransactionHandle {
                txn: Mutex::new(Some(txn)),
            }),
        }))
    }

    fn transaction_timeout(&self) -> Duration {
        self.transaction_timeout
    }
}

/// Shared slot holding the open transaction; emptied on commit/rollback.
pub(crate) struct TransactionHandle {
    txn: Mutex<Option<DatabaseTransaction>>,
}

impl TransactionHandle {
    pub(crate) async fn lock(&self) -> MutexGuard<'_, Option<DatabaseTransaction>> {
        self.txn.lock().await
    }
}

pub(crate) fn closed_transaction() -> Error {
    Error::internal("transaction", "transaction is already closed")
}

pub struct SeaOrmTransaction {
    handle: Arc<TransactionHandle>,
}

impl Application for SeaOrmTransaction {
    fn audit_logs(&self) -> Box<dyn AuditLogRepository> {
        Box::new(SeaOrmAuditLogRepository::new(Executor::Transaction(
            self.handle.clone(),
        )))
    }
}

#[async_trait]
impl Transaction for SeaOrmTransaction {
    async fn commit(&self) -> Result<()> {
        let txn = self.handle.lock().await.take().ok_or_else(closed_transaction)?;
        txn.commit().await.map_err(|e| Error::internal("commit", e))
    }

    async fn rollback(&self) -> Result<()> {
        let txn = self.handle.lock().await.take().ok_or_else(closed_transaction)?;
        txn.rollback().await.map_err(|e| Error::internal("rollback", e))
    }

    fn application(self: Arc<Self>) -> Arc<dyn Application> {
        self
    }
}
