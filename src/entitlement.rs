/// Entitlement calculator
///
/// Pure functions answering, for a given reference instant, how many days of
/// access and warranty a record has left. The same rules apply to an
/// account's primary plan and to each attached subscription; callers pass
/// one clock reading per operation so every derived value is consistent.
use crate::account::{Account, PeriodClass};
use crate::subscription::{Subscription, Variation};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

/// Remaining access for a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemainingAccess {
    /// Lifetime terms never expire
    Unbounded,
    /// Bounded term whose expiration has not been computed yet
    Undetermined,
    /// Whole days left, counted inclusively; never negative
    Days(i64),
}

/// Computed access/warranty pair for a record at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub access: RemainingAccess,
    pub warranty_days: i64,
}

/// Days of access left before `expires_at`, counted inclusively.
///
/// A deadline later today still counts as 1 day; the boundary instant
/// exactly at expiration counts as 0.
fn remaining_access(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> RemainingAccess {
    match expires_at {
        None => RemainingAccess::Undetermined,
        Some(expires) => {
            let seconds = (expires - now).num_seconds();
            if seconds > 0 {
                RemainingAccess::Days(seconds / SECONDS_PER_DAY + 1)
            } else {
                RemainingAccess::Days(0)
            }
        }
    }
}

/// Days left in a grace window of `duration_days` anchored at `start`.
///
/// Shared by the account and subscription call sites so both count calendar
/// days identically. Display-only; never gates access.
pub fn remaining_warranty(start: DateTime<Utc>, duration_days: i64, now: DateTime<Utc>) -> i64 {
    if duration_days <= 0 {
        return 0;
    }
    let end = start + Duration::days(duration_days);
    if end > now {
        (end - now).num_seconds() / SECONDS_PER_DAY + 1
    } else {
        0
    }
}

/// Entitlement of an account's primary plan
pub fn compute_entitlement(account: &Account, now: DateTime<Utc>) -> Entitlement {
    let access = if account.period == PeriodClass::Lifetime {
        RemainingAccess::Unbounded
    } else {
        remaining_access(account.expires_at, now)
    };

    Entitlement {
        access,
        warranty_days: remaining_warranty(account.created_at, account.period.warranty_days(), now),
    }
}

/// Entitlement of a single attached subscription
pub fn compute_subscription_entitlement(
    subscription: &Subscription,
    now: DateTime<Utc>,
) -> Entitlement {
    let access = if subscription.variation == Variation::Lifetime {
        RemainingAccess::Unbounded
    } else {
        remaining_access(subscription.expires_at, now)
    };

    Entitlement {
        access,
        warranty_days: remaining_warranty(
            subscription.started_at,
            subscription.variation.warranty_days(),
            now,
        ),
    }
}
