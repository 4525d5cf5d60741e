/// Notice delivery seam
///
/// The core only formats messages and hands them to an abstract sink;
/// delivery itself is simulated. A real transport (SMS, messenger, email)
/// lives entirely behind the `NotificationSink` trait in the embedding
/// service.
use crate::{
    account::Account,
    config::NoticeConfig,
    error::{SubgateError, SubgateResult},
    validation,
};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Addressee of a notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub nickname: String,
    pub phone: String,
}

/// Outbound delivery capability
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, to: &Recipient, message: &str) -> SubgateResult<()>;
}

/// Sink that records deliveries in the log only
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, to: &Recipient, message: &str) -> SubgateResult<()> {
        tracing::info!(
            nickname = %to.nickname,
            phone = %to.phone,
            message,
            "Simulated notice delivery"
        );
        Ok(())
    }
}

/// Admin-facing notice service
pub struct NoticeCenter {
    db: SqlitePool,
    sink: Arc<dyn NotificationSink>,
    config: Option<NoticeConfig>,
}

impl NoticeCenter {
    /// Create a new notice center
    pub fn new(
        db: SqlitePool,
        sink: Arc<dyn NotificationSink>,
        config: Option<NoticeConfig>,
    ) -> Self {
        Self { db, sink, config }
    }

    /// Send a notice to one account
    pub async fn send_notice(
        &self,
        actor: &Account,
        account_id: i64,
        message: &str,
    ) -> SubgateResult<()> {
        actor.require_admin()?;

        let message = message.trim();
        if message.is_empty() {
            return Err(SubgateError::Validation(
                "Message must not be empty".to_string(),
            ));
        }

        let row = sqlx::query("SELECT nickname, phone FROM account WHERE id = ?1")
            .bind(account_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| SubgateError::NotFound(format!("Account {} not found", account_id)))?;

        let to = Recipient {
            nickname: row.get("nickname"),
            phone: row.get("phone"),
        };
        self.sink.deliver(&to, message).await
    }

    /// Send a notice to every reviewed (active or inactive) account.
    ///
    /// Returns the number of deliveries.
    pub async fn broadcast(&self, actor: &Account, message: &str) -> SubgateResult<usize> {
        actor.require_admin()?;

        let message = message.trim();
        if message.is_empty() {
            return Err(SubgateError::Validation(
                "Message must not be empty".to_string(),
            ));
        }

        let rows = sqlx::query(
            "SELECT nickname, phone FROM account WHERE status IN ('active', 'inactive') ORDER BY nickname",
        )
        .fetch_all(&self.db)
        .await?;

        let mut delivered = 0usize;
        for row in &rows {
            let to = Recipient {
                nickname: row.get("nickname"),
                phone: row.get("phone"),
            };
            self.sink.deliver(&to, message).await?;
            delivered += 1;
        }

        tracing::info!(delivered, "Broadcast notice");
        Ok(delivered)
    }

    /// Route a forgot-password request to the configured support contact
    pub async fn request_password_assistance(&self, phone: &str) -> SubgateResult<()> {
        let normalized = validation::normalize_phone(phone)?;

        let config = match &self.config {
            Some(config) => config,
            None => {
                tracing::warn!("Support contact not configured, skipping password assistance request");
                return Ok(());
            }
        };

        let to = Recipient {
            nickname: "support".to_string(),
            phone: config.support_phone.clone(),
        };
        let message = format!(
            "Password reset requested for the account registered under phone {}.",
            normalized
        );
        self.sink.deliver(&to, &message).await
    }
}
