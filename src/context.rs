/// Application context and dependency injection
use crate::{
    account::AccountManager,
    config::ServiceConfig,
    db,
    error::{SubgateError, SubgateResult},
    notify::{LogSink, NotificationSink, NoticeCenter},
    subscription::SubscriptionLedger,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServiceConfig>,
    pub db: SqlitePool,
    pub accounts: Arc<AccountManager>,
    pub subscriptions: Arc<SubscriptionLedger>,
    pub notices: Arc<NoticeCenter>,
}

impl AppContext {
    /// Create a context with the simulated (log-only) notification sink
    pub async fn new(config: ServiceConfig) -> SubgateResult<Self> {
        Self::with_sink(config, Arc::new(LogSink)).await
    }

    /// Create a context delivering notices through a caller-provided sink
    pub async fn with_sink(
        config: ServiceConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> SubgateResult<Self> {
        config.validate()?;

        if !config.storage.data_directory.exists() {
            tokio::fs::create_dir_all(&config.storage.data_directory)
                .await
                .map_err(|e| {
                    SubgateError::Internal(format!(
                        "Failed to create directory {:?}: {}",
                        config.storage.data_directory, e
                    ))
                })?;
        }

        let pool = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        let accounts = Arc::new(AccountManager::new(pool.clone()));
        let subscriptions = Arc::new(SubscriptionLedger::new(pool.clone()));
        let notices = Arc::new(NoticeCenter::new(pool.clone(), sink, config.notices.clone()));

        Ok(Self {
            config: Arc::new(config),
            db: pool,
            accounts,
            subscriptions,
            notices,
        })
    }
}
