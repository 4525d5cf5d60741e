/// Subgate - subscription-access management core
///
/// Registers customers, gates product access on account status and
/// expiration dates, and gives an administrator manual control over
/// approval, plan assignment, and renewal. The embedding presentation
/// layer drives everything through the services exposed here; the core
/// never depends on ambient session state.
pub mod account;
pub mod config;
pub mod context;
pub mod credential;
pub mod db;
pub mod entitlement;
pub mod error;
pub mod notify;
pub mod subscription;
pub mod validation;

pub use account::{Account, AccountManager, AccountStatus, NewAccount, NewCustomer, PeriodClass};
pub use context::AppContext;
pub use entitlement::{
    compute_entitlement, compute_subscription_entitlement, Entitlement, RemainingAccess,
};
pub use error::{SubgateError, SubgateResult};
pub use notify::{LogSink, NoticeCenter, NotificationSink, Recipient};
pub use subscription::{Subscription, SubscriptionLedger, SubscriptionStatus, Variation};
