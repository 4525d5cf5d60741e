/// Customer account model and lifecycle management
///
/// Accounts carry one primary product entitlement plus the status field the
/// admin drives through the approve/reject/toggle transitions.
mod manager;

pub use manager::AccountManager;

use crate::error::{SubgateError, SubgateResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Awaiting admin review; cannot log in
    Pending,
    /// Entitled to access (subject to expiration)
    Active,
    /// Rejected or deactivated by the admin
    Inactive,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Pending => "pending",
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
        }
    }

    pub fn from_str(s: &str) -> SubgateResult<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(AccountStatus::Pending),
            "active" => Ok(AccountStatus::Active),
            "inactive" => Ok(AccountStatus::Inactive),
            _ => Err(SubgateError::Validation(format!("Invalid status: {}", s))),
        }
    }
}

/// Billing-term category of an account's primary plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodClass {
    /// Bounded 30-day term; expiration is computed at approval
    Monthly,
    /// Unbounded term
    Lifetime,
    /// Free-text period; term is externally managed
    Other(String),
}

impl PeriodClass {
    pub fn as_str(&self) -> &str {
        match self {
            PeriodClass::Monthly => "monthly",
            PeriodClass::Lifetime => "lifetime",
            PeriodClass::Other(s) => s,
        }
    }

    /// Never fails: unrecognized values become a free-text period
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "monthly" => PeriodClass::Monthly,
            "lifetime" => PeriodClass::Lifetime,
            _ => PeriodClass::Other(s.to_string()),
        }
    }

    /// Warranty window length anchored at account creation
    pub fn warranty_days(&self) -> i64 {
        match self {
            PeriodClass::Monthly => 30,
            PeriodClass::Lifetime => 365,
            PeriodClass::Other(_) => 0,
        }
    }
}

/// Account record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    /// Unique, stored exactly as entered
    pub nickname: String,
    /// Unique, stored normalized to digits only
    pub phone: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub product: String,
    pub period: PeriodClass,
    pub status: AccountStatus,
    pub is_admin: bool,
    /// Null until computed (monthly plans) or forever (unbounded plans)
    pub expires_at: Option<DateTime<Utc>>,
    /// Immutable; anchor for the warranty window
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Gate for admin-only operations
    pub fn require_admin(&self) -> SubgateResult<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(SubgateError::Authorization(format!(
                "Account {} is not an administrator",
                self.nickname
            )))
        }
    }
}

/// Self-registration request
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub nickname: String,
    pub phone: String,
    pub password: String,
    pub product: String,
    pub period: String,
    pub email: Option<String>,
}

/// Admin-provisioned account request
///
/// Unlike self-registration, the admin chooses the initial status directly.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    pub nickname: String,
    pub phone: String,
    pub password: String,
    pub product: String,
    pub period: String,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        assert_eq!(AccountStatus::from_str("pending").unwrap(), AccountStatus::Pending);
        assert_eq!(AccountStatus::from_str("ACTIVE").unwrap(), AccountStatus::Active);
        assert_eq!(AccountStatus::Active.as_str(), "active");
        assert!(AccountStatus::from_str("approved").is_err());
    }

    #[test]
    fn test_period_parse_falls_back_to_free_text() {
        assert_eq!(PeriodClass::parse("monthly"), PeriodClass::Monthly);
        assert_eq!(PeriodClass::parse("lifetime"), PeriodClass::Lifetime);
        assert_eq!(
            PeriodClass::parse("sponsorship"),
            PeriodClass::Other("sponsorship".to_string())
        );
    }

    #[test]
    fn test_warranty_days_per_class() {
        assert_eq!(PeriodClass::Monthly.warranty_days(), 30);
        assert_eq!(PeriodClass::Lifetime.warranty_days(), 365);
        assert_eq!(PeriodClass::Other("promo".to_string()).warranty_days(), 0);
    }
}
