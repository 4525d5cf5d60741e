/// Account manager implementation using runtime queries
use crate::{
    account::{Account, AccountStatus, NewAccount, NewCustomer, PeriodClass},
    credential,
    error::{SubgateError, SubgateResult},
    validation,
};
use chrono::{Duration, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

/// Account lifecycle service
///
/// All writes run as short independent transactions against the shared
/// pool; each operation reads the clock once and reuses that instant.
pub struct AccountManager {
    db: SqlitePool,
}

impl AccountManager {
    /// Create a new account manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Self-registration: creates a pending account.
    ///
    /// The very first account ever created bootstraps the administrator and
    /// starts out active; the count-and-insert runs in one transaction so
    /// concurrent first registrations cannot both be promoted.
    pub async fn register(&self, request: NewAccount) -> SubgateResult<Account> {
        let nickname = request.nickname.trim().to_string();
        if nickname.is_empty() {
            return Err(SubgateError::Validation(
                "Nickname must not be empty".to_string(),
            ));
        }
        let phone = validation::normalize_phone(&request.phone)?;
        if request.password.is_empty() {
            return Err(SubgateError::Validation(
                "Password must not be empty".to_string(),
            ));
        }
        let product = request.product.trim().to_string();
        if product.is_empty() {
            return Err(SubgateError::Validation(
                "Product must not be empty".to_string(),
            ));
        }
        if let Some(email) = request.email.as_deref() {
            validation::validate_email(email)?;
        }
        let period = PeriodClass::parse(&request.period);

        let password_hash = credential::hash_password(&request.password)?;
        let now = Utc::now();

        let mut tx = self.db.begin().await?;

        // Friendlier errors than the bare constraint violation; the UNIQUE
        // constraints below still close the race.
        let phone_taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account WHERE phone = ?1")
            .bind(&phone)
            .fetch_one(&mut *tx)
            .await?;
        if phone_taken > 0 {
            return Err(SubgateError::DuplicateField("phone".to_string()));
        }
        let nickname_taken: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM account WHERE nickname = ?1")
                .bind(&nickname)
                .fetch_one(&mut *tx)
                .await?;
        if nickname_taken > 0 {
            return Err(SubgateError::DuplicateField("nickname".to_string()));
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account")
            .fetch_one(&mut *tx)
            .await?;
        let (status, is_admin) = if count == 0 {
            (AccountStatus::Active, true)
        } else {
            (AccountStatus::Pending, false)
        };

        let result = sqlx::query(
            "INSERT INTO account (nickname, phone, email, password_hash, product, period, status, is_admin, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&nickname)
        .bind(&phone)
        .bind(&request.email)
        .bind(&password_hash)
        .bind(&product)
        .bind(period.as_str())
        .bind(status.as_str())
        .bind(is_admin)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        let id = result.last_insert_rowid();
        tx.commit().await?;

        tracing::info!(account = %nickname, admin = is_admin, "Registered new account");

        Ok(Account {
            id,
            nickname,
            phone,
            email: request.email,
            password_hash,
            product,
            period,
            status,
            is_admin,
            expires_at: None,
            created_at: now,
        })
    }

    /// Admin-provisioned account with a chosen initial status
    pub async fn admin_create(
        &self,
        actor: &Account,
        request: NewCustomer,
    ) -> SubgateResult<Account> {
        actor.require_admin()?;

        let nickname = request.nickname.trim().to_string();
        let product = request.product.trim().to_string();
        if nickname.is_empty() || request.password.is_empty() || product.is_empty() {
            return Err(SubgateError::Validation(
                "Nickname, password and product are required".to_string(),
            ));
        }
        let phone = validation::normalize_phone(&request.phone)?;
        let status = AccountStatus::from_str(&request.status)?;
        let period = PeriodClass::parse(&request.period);

        let password_hash = credential::hash_password(&request.password)?;
        let now = Utc::now();

        // An account provisioned directly as active on a monthly plan starts
        // its 30-day term immediately.
        let expires_at = if period == PeriodClass::Monthly && status == AccountStatus::Active {
            Some(now + Duration::days(30))
        } else {
            None
        };

        let mut tx = self.db.begin().await?;

        let phone_taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account WHERE phone = ?1")
            .bind(&phone)
            .fetch_one(&mut *tx)
            .await?;
        if phone_taken > 0 {
            return Err(SubgateError::DuplicateField("phone".to_string()));
        }
        let nickname_taken: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM account WHERE nickname = ?1")
                .bind(&nickname)
                .fetch_one(&mut *tx)
                .await?;
        if nickname_taken > 0 {
            return Err(SubgateError::DuplicateField("nickname".to_string()));
        }

        let result = sqlx::query(
            "INSERT INTO account (nickname, phone, email, password_hash, product, period, status, is_admin, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&nickname)
        .bind(&phone)
        .bind(Option::<String>::None)
        .bind(&password_hash)
        .bind(&product)
        .bind(period.as_str())
        .bind(status.as_str())
        .bind(false)
        .bind(expires_at)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        let id = result.last_insert_rowid();
        tx.commit().await?;

        tracing::info!(account = %nickname, by = %actor.nickname, "Admin created account");

        Ok(Account {
            id,
            nickname,
            phone,
            email: None,
            password_hash,
            product,
            period,
            status,
            is_admin: false,
            expires_at,
            created_at: now,
        })
    }

    /// Authenticate by normalized phone and password
    pub async fn authenticate(&self, phone: &str, password: &str) -> SubgateResult<Account> {
        let normalized = validation::normalize_phone(phone)?;
        let account = self.get_by_phone(&normalized).await?;

        if !credential::verify_password(password, &account.password_hash)? {
            return Err(SubgateError::BadCredential);
        }

        match account.status {
            AccountStatus::Pending => Err(SubgateError::NotEligible(
                "Account is pending approval".to_string(),
            )),
            AccountStatus::Inactive => Err(SubgateError::NotEligible(
                "Account has been deactivated".to_string(),
            )),
            AccountStatus::Active => Ok(account),
        }
    }

    /// Get account by id
    pub async fn get_account(&self, id: i64) -> SubgateResult<Account> {
        let row = sqlx::query(
            "SELECT id, nickname, phone, email, password_hash, product, period, status, is_admin, expires_at, created_at
             FROM account WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| SubgateError::NotFound(format!("Account {} not found", id)))?;

        map_account(&row)
    }

    async fn get_by_phone(&self, phone: &str) -> SubgateResult<Account> {
        let row = sqlx::query(
            "SELECT id, nickname, phone, email, password_hash, product, period, status, is_admin, expires_at, created_at
             FROM account WHERE phone = ?1",
        )
        .bind(phone)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| SubgateError::NotFound("Account not found".to_string()))?;

        map_account(&row)
    }

    /// Review queue: accounts awaiting approval
    pub async fn list_pending(&self, actor: &Account) -> SubgateResult<Vec<Account>> {
        actor.require_admin()?;
        self.list_by_statuses(&[AccountStatus::Pending]).await
    }

    /// Reviewed accounts, active and inactive
    pub async fn list_customers(&self, actor: &Account) -> SubgateResult<Vec<Account>> {
        actor.require_admin()?;
        self.list_by_statuses(&[AccountStatus::Active, AccountStatus::Inactive])
            .await
    }

    /// Accounts that were rejected or deactivated
    pub async fn list_rejected(&self, actor: &Account) -> SubgateResult<Vec<Account>> {
        actor.require_admin()?;
        self.list_by_statuses(&[AccountStatus::Inactive]).await
    }

    async fn list_by_statuses(&self, statuses: &[AccountStatus]) -> SubgateResult<Vec<Account>> {
        let placeholders = statuses
            .iter()
            .enumerate()
            .map(|(i, _)| format!("?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT id, nickname, phone, email, password_hash, product, period, status, is_admin, expires_at, created_at
             FROM account WHERE status IN ({}) ORDER BY created_at, id",
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for status in statuses {
            query = query.bind(status.as_str());
        }
        let rows = query.fetch_all(&self.db).await?;

        rows.iter().map(map_account).collect()
    }

    /// Approve a pending account.
    ///
    /// Monthly plans start their 30-day term at approval; other periods keep
    /// their expiration unset.
    pub async fn approve(&self, actor: &Account, id: i64) -> SubgateResult<Account> {
        actor.require_admin()?;

        let account = self.get_account(id).await?;
        if account.status != AccountStatus::Pending {
            return Err(SubgateError::InvalidTransition(format!(
                "Account {} has already been reviewed",
                account.nickname
            )));
        }

        let now = Utc::now();
        let expires_at = if account.period == PeriodClass::Monthly {
            Some(now + Duration::days(30))
        } else {
            account.expires_at
        };

        let result = sqlx::query(
            "UPDATE account SET status = ?1, expires_at = ?2 WHERE id = ?3 AND status = ?4",
        )
        .bind(AccountStatus::Active.as_str())
        .bind(expires_at)
        .bind(id)
        .bind(AccountStatus::Pending.as_str())
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(SubgateError::InvalidTransition(format!(
                "Account {} has already been reviewed",
                account.nickname
            )));
        }

        tracing::info!(account = %account.nickname, "Approved account");

        Ok(Account {
            status: AccountStatus::Active,
            expires_at,
            ..account
        })
    }

    /// Reject a pending account; nothing but the status changes
    pub async fn reject(&self, actor: &Account, id: i64) -> SubgateResult<Account> {
        actor.require_admin()?;

        let account = self.get_account(id).await?;
        if account.status != AccountStatus::Pending {
            return Err(SubgateError::InvalidTransition(format!(
                "Account {} has already been reviewed",
                account.nickname
            )));
        }

        let result =
            sqlx::query("UPDATE account SET status = ?1 WHERE id = ?2 AND status = ?3")
                .bind(AccountStatus::Inactive.as_str())
                .bind(id)
                .bind(AccountStatus::Pending.as_str())
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(SubgateError::InvalidTransition(format!(
                "Account {} has already been reviewed",
                account.nickname
            )));
        }

        tracing::info!(account = %account.nickname, "Rejected account");

        Ok(Account {
            status: AccountStatus::Inactive,
            ..account
        })
    }

    /// Flip an account between active and inactive.
    ///
    /// Pending accounts must go through approve/reject instead.
    pub async fn toggle(&self, actor: &Account, id: i64) -> SubgateResult<Account> {
        actor.require_admin()?;

        let account = self.get_account(id).await?;
        let next = match account.status {
            AccountStatus::Active => AccountStatus::Inactive,
            AccountStatus::Inactive => AccountStatus::Active,
            AccountStatus::Pending => {
                return Err(SubgateError::InvalidTransition(
                    "Cannot change the status of a pending account".to_string(),
                ))
            }
        };

        let result =
            sqlx::query("UPDATE account SET status = ?1 WHERE id = ?2 AND status = ?3")
                .bind(next.as_str())
                .bind(id)
                .bind(account.status.as_str())
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(SubgateError::InvalidTransition(format!(
                "Account {} changed state during the update",
                account.nickname
            )));
        }

        tracing::info!(
            account = %account.nickname,
            from = account.status.as_str(),
            to = next.as_str(),
            "Toggled account status"
        );

        Ok(Account {
            status: next,
            ..account
        })
    }

    /// Add days of access.
    ///
    /// An expired or unset term restarts from now rather than stacking onto
    /// a stale expiration date. No status precondition: callers gate on
    /// status separately if access matters.
    pub async fn extend_access(
        &self,
        actor: &Account,
        id: i64,
        days: i64,
    ) -> SubgateResult<Account> {
        actor.require_admin()?;

        let account = self.get_account(id).await?;
        let now = Utc::now();
        let base = match account.expires_at {
            Some(expires) if expires > now => expires,
            _ => now,
        };
        let expires_at = base + Duration::days(days);

        sqlx::query("UPDATE account SET expires_at = ?1 WHERE id = ?2")
            .bind(expires_at)
            .bind(id)
            .execute(&self.db)
            .await?;

        tracing::info!(account = %account.nickname, days, "Extended access");

        Ok(Account {
            expires_at: Some(expires_at),
            ..account
        })
    }

    /// Set the expiration to a calendar date, counted through end of day
    pub async fn set_expiration_date(
        &self,
        actor: &Account,
        id: i64,
        date: &str,
    ) -> SubgateResult<Account> {
        actor.require_admin()?;

        let account = self.get_account(id).await?;
        let parsed = validation::parse_form_date(date)?;
        let expires_at = validation::end_of_day(parsed)?;

        sqlx::query("UPDATE account SET expires_at = ?1 WHERE id = ?2")
            .bind(expires_at)
            .bind(id)
            .execute(&self.db)
            .await?;

        tracing::info!(account = %account.nickname, date, "Set expiration date");

        Ok(Account {
            expires_at: Some(expires_at),
            ..account
        })
    }

    /// Replace the primary plan descriptors.
    ///
    /// Expiration is intentionally untouched: plan identity is decoupled
    /// from term tracking, and the admin adjusts the term separately.
    pub async fn change_plan(
        &self,
        actor: &Account,
        id: i64,
        product: &str,
        period: &str,
    ) -> SubgateResult<Account> {
        actor.require_admin()?;

        let product = product.trim();
        if product.is_empty() {
            return Err(SubgateError::Validation(
                "Product name must not be empty".to_string(),
            ));
        }

        let account = self.get_account(id).await?;
        let period = PeriodClass::parse(period);

        sqlx::query("UPDATE account SET product = ?1, period = ?2 WHERE id = ?3")
            .bind(product)
            .bind(period.as_str())
            .bind(id)
            .execute(&self.db)
            .await?;

        tracing::info!(account = %account.nickname, product, period = period.as_str(), "Changed plan");

        Ok(Account {
            product: product.to_string(),
            period,
            ..account
        })
    }

    /// Change the password after verifying the old one
    pub async fn change_password(
        &self,
        id: i64,
        old_password: &str,
        new_password: &str,
    ) -> SubgateResult<()> {
        let account = self.get_account(id).await?;

        if !credential::verify_password(old_password, &account.password_hash)? {
            return Err(SubgateError::BadCredential);
        }
        if new_password.is_empty() {
            return Err(SubgateError::Validation(
                "Password must not be empty".to_string(),
            ));
        }

        let password_hash = credential::hash_password(new_password)?;

        sqlx::query("UPDATE account SET password_hash = ?1 WHERE id = ?2")
            .bind(&password_hash)
            .bind(id)
            .execute(&self.db)
            .await?;

        tracing::info!(account = %account.nickname, "Changed password");

        Ok(())
    }
}

fn map_account(row: &SqliteRow) -> SubgateResult<Account> {
    let status: String = row.get("status");
    let period: String = row.get("period");

    Ok(Account {
        id: row.get("id"),
        nickname: row.get("nickname"),
        phone: row.get("phone"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        product: row.get("product"),
        period: PeriodClass::parse(&period),
        status: AccountStatus::from_str(&status)?,
        is_admin: row.get("is_admin"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    })
}

fn map_unique_violation(e: sqlx::Error) -> SubgateError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            let message = db.message().to_string();
            if message.contains("account.phone") {
                return SubgateError::DuplicateField("phone".to_string());
            }
            if message.contains("account.nickname") {
                return SubgateError::DuplicateField("nickname".to_string());
            }
        }
    }
    SubgateError::Database(e)
}
