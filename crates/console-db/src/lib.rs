pub mod application;
pub mod entities;
pub mod repository;
pub mod transaction;

pub use application::{
    Application, DEFAULT_TRANSACTION_TIMEOUT, Db, SeaOrmApplication, SeaOrmTransaction,
    Transaction, TxIsolationLevel,
};
pub use repository::{AuditLogRepository, Page, SeaOrmAuditLogRepository};
pub use sea_orm;
pub use transaction::transactional;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

pub async fn connect(options: impl Into<ConnectOptions>) -> Result<DatabaseConnection, sea_orm::DbErr> {
    let options = options.into();
    tracing::info!(max_connections = ?options.get_max_connections(), "connecting to database");
    Database::connect(options).await
}

/// Connects, retrying every `retry_sleep` until the database answers. Gives up
/// after `max_attempts` tries when a limit is given.
pub async fn connect_with_retry(
    options: ConnectOptions,
    retry_sleep: Duration,
    max_attempts: Option<u32>,
) -> Result<DatabaseConnection, sea_orm::DbErr> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match connect(options.clone()).await {
            Ok(db) => return Ok(db),
            Err(err) if max_attempts.is_some_and(|max| attempt >= max) => return Err(err),
            Err(err) => {
                tracing::error!(%err, attempt, "unable to open connection to database");
                tracing::info!(?retry_sleep, "retrying to connect");
                tokio::time::sleep(retry_sleep).await;
            }
        }
    }
}
