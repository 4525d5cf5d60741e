/// Subscription ledger: additional product entitlements attached to an account
///
/// Each subscription is timed independently of the parent account's primary
/// plan; its expiration is fixed at creation from the start date and the
/// variation, never edited afterwards.
mod ledger;

pub use ledger::SubscriptionLedger;

use crate::error::{SubgateError, SubgateResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Inactive => "inactive",
        }
    }

    pub fn from_str(s: &str) -> SubgateResult<Self> {
        match s.to_lowercase().as_str() {
            "active" => Ok(SubscriptionStatus::Active),
            "inactive" => Ok(SubscriptionStatus::Inactive),
            _ => Err(SubgateError::Validation(format!("Invalid status: {}", s))),
        }
    }
}

/// Billing-term category of a subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variation {
    Monthly,
    Quarterly,
    Yearly,
    Lifetime,
    /// Free-text variation; no derived expiration
    Custom(String),
}

impl Variation {
    pub fn as_str(&self) -> &str {
        match self {
            Variation::Monthly => "monthly",
            Variation::Quarterly => "quarterly",
            Variation::Yearly => "yearly",
            Variation::Lifetime => "lifetime",
            Variation::Custom(s) => s,
        }
    }

    /// Never fails: unrecognized values become a custom variation
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "monthly" => Variation::Monthly,
            "quarterly" => Variation::Quarterly,
            "yearly" => Variation::Yearly,
            "lifetime" => Variation::Lifetime,
            _ => Variation::Custom(s.to_string()),
        }
    }

    /// Access term in days, or None for unbounded/externally-managed terms
    pub fn access_term_days(&self) -> Option<i64> {
        match self {
            Variation::Monthly => Some(30),
            Variation::Quarterly => Some(90),
            Variation::Yearly => Some(365),
            Variation::Lifetime | Variation::Custom(_) => None,
        }
    }

    /// Warranty window length anchored at the subscription start
    pub fn warranty_days(&self) -> i64 {
        match self {
            Variation::Monthly => 30,
            Variation::Lifetime => 365,
            _ => 0,
        }
    }
}

/// Subscription record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub account_id: i64,
    pub product: String,
    pub variation: Variation,
    pub started_at: DateTime<Utc>,
    /// Fixed at creation: start + variation term, or null for unbounded
    pub expires_at: Option<DateTime<Utc>>,
    pub status: SubscriptionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variation_parse_falls_back_to_custom() {
        assert_eq!(Variation::parse("monthly"), Variation::Monthly);
        assert_eq!(Variation::parse("QUARTERLY"), Variation::Quarterly);
        assert_eq!(
            Variation::parse("beta-access"),
            Variation::Custom("beta-access".to_string())
        );
    }

    #[test]
    fn test_access_term_days() {
        assert_eq!(Variation::Monthly.access_term_days(), Some(30));
        assert_eq!(Variation::Quarterly.access_term_days(), Some(90));
        assert_eq!(Variation::Yearly.access_term_days(), Some(365));
        assert_eq!(Variation::Lifetime.access_term_days(), None);
        assert_eq!(Variation::Custom("promo".to_string()).access_term_days(), None);
    }

    #[test]
    fn test_warranty_days_per_variation() {
        assert_eq!(Variation::Monthly.warranty_days(), 30);
        assert_eq!(Variation::Lifetime.warranty_days(), 365);
        assert_eq!(Variation::Quarterly.warranty_days(), 0);
        assert_eq!(Variation::Yearly.warranty_days(), 0);
    }
}
