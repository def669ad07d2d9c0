use std::sync::Arc;

use console_core::EventTypes;
use console_db::SeaOrmApplication;
use console_server::config::Config;
use console_server::identity::TokenVerifier;
use console_server::state::AppState;
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &Config) {
    // RUST_LOG wins over the configured level when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn init_db_and_migrate(config: &Config) -> anyhow::Result<SeaOrmApplication> {
    let db = console_db::connect_with_retry(
        config.connect_options()?,
        config.postgres.connection_retry_sleep,
        None,
    )
    .await?;

    // Apply migrations on boot (idempotent).
    console_migration::Migrator::up(&db, None).await?;

    Ok(SeaOrmApplication::new(Arc::new(db))
        .with_isolation_level(config.postgres.isolation_level)
        .with_transaction_timeout(config.postgres.transaction_timeout))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config);

    if let Some(err) = config.default_configuration_error() {
        tracing::warn!(config_error = err, "sensitive settings use their default values");
    }

    let event_types = EventTypes::builtin()?;
    let db = init_db_and_migrate(&config).await?;

    // `--migrate-database` only brings the schema up to date.
    if std::env::args().skip(1).any(|arg| arg == "--migrate-database") {
        tracing::info!("database migrated, exiting");
        return Ok(());
    }

    let verifier = TokenVerifier::from_config(&config)?;
    let addr = config.http_address;

    let state = AppState {
        db,
        event_types: Arc::new(event_types),
        verifier: Arc::new(verifier),
        config: Arc::new(config),
        http: reqwest::Client::new(),
        started_at: chrono::Utc::now(),
    };
    let app = console_server::router(state);

    tracing::info!(%addr, "admin-console HTTP listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
