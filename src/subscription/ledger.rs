/// Subscription ledger implementation
use crate::{
    account::Account,
    error::{SubgateError, SubgateResult},
    subscription::{Subscription, SubscriptionStatus, Variation},
    validation,
};
use chrono::Duration;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

/// Manages the product subscriptions attached to accounts
pub struct SubscriptionLedger {
    db: SqlitePool,
}

impl SubscriptionLedger {
    /// Create a new subscription ledger
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Attach a new independently timed subscription to an account.
    ///
    /// The expiration is fixed here from start date and variation, never
    /// edited afterwards. All-or-nothing: a validation or storage failure
    /// leaves no partial record.
    pub async fn add_subscription(
        &self,
        actor: &Account,
        account_id: i64,
        product: &str,
        variation: &str,
        start_date: &str,
    ) -> SubgateResult<Subscription> {
        actor.require_admin()?;

        let product = product.trim();
        if product.is_empty() {
            return Err(SubgateError::Validation(
                "Product name must not be empty".to_string(),
            ));
        }
        let variation = Variation::parse(variation);
        let started_at = validation::start_of_day(validation::parse_form_date(start_date)?)?;
        let expires_at = variation
            .access_term_days()
            .map(|days| started_at + Duration::days(days));

        let account_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account WHERE id = ?1")
            .bind(account_id)
            .fetch_one(&self.db)
            .await?;
        if account_exists == 0 {
            return Err(SubgateError::NotFound(format!(
                "Account {} not found",
                account_id
            )));
        }

        let result = sqlx::query(
            "INSERT INTO subscription (account_id, product, variation, started_at, expires_at, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(account_id)
        .bind(product)
        .bind(variation.as_str())
        .bind(started_at)
        .bind(expires_at)
        .bind(SubscriptionStatus::Active.as_str())
        .execute(&self.db)
        .await?;

        let id = result.last_insert_rowid();

        tracing::info!(account_id, product, variation = variation.as_str(), "Added subscription");

        Ok(Subscription {
            id,
            account_id,
            product: product.to_string(),
            variation,
            started_at,
            expires_at,
            status: SubscriptionStatus::Active,
        })
    }

    /// All subscriptions attached to an account, oldest first
    pub async fn list_for_account(&self, account_id: i64) -> SubgateResult<Vec<Subscription>> {
        let rows = sqlx::query(
            "SELECT id, account_id, product, variation, started_at, expires_at, status
             FROM subscription WHERE account_id = ?1 ORDER BY started_at, id",
        )
        .bind(account_id)
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(map_subscription).collect()
    }
}

fn map_subscription(row: &SqliteRow) -> SubgateResult<Subscription> {
    let variation: String = row.get("variation");
    let status: String = row.get("status");

    Ok(Subscription {
        id: row.get("id"),
        account_id: row.get("account_id"),
        product: row.get("product"),
        variation: Variation::parse(&variation),
        started_at: row.get("started_at"),
        expires_at: row.get("expires_at"),
        status: SubscriptionStatus::from_str(&status)?,
    })
}
