/// End-to-end walk through the customer lifecycle against an on-disk store:
/// registration, review, entitlement, renewal, and attached subscriptions.
use chrono::{Duration, Utc};
use subgate::config::{LoggingConfig, ServiceConfig, StorageConfig};
use subgate::{AccountStatus, AppContext, NewAccount, RemainingAccess, SubgateError};

fn test_config(dir: &std::path::Path) -> ServiceConfig {
    ServiceConfig {
        storage: StorageConfig {
            data_directory: dir.to_path_buf(),
            database: dir.join("subgate.sqlite"),
        },
        notices: None,
        logging: LoggingConfig {
            level: "info".to_string(),
        },
    }
}

fn registration(nickname: &str, phone: &str, period: &str) -> NewAccount {
    NewAccount {
        nickname: nickname.to_string(),
        phone: phone.to_string(),
        password: "secret123".to_string(),
        product: "player".to_string(),
        period: period.to_string(),
        email: None,
    }
}

#[tokio::test]
async fn test_customer_journey() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = AppContext::new(test_config(dir.path())).await.unwrap();

    // First registration bootstraps the administrator
    let admin = ctx
        .accounts
        .register(registration("root", "11900000001", "lifetime"))
        .await
        .unwrap();
    assert!(admin.is_admin);
    assert_eq!(admin.status, AccountStatus::Active);

    // A customer signs up and waits for review
    let alice = ctx
        .accounts
        .register(registration("alice", "(11) 98888-7766", "monthly"))
        .await
        .unwrap();
    assert_eq!(alice.status, AccountStatus::Pending);

    let err = ctx
        .accounts
        .authenticate("11988887766", "secret123")
        .await
        .unwrap_err();
    assert!(matches!(err, SubgateError::NotEligible(_)));

    // Approval starts the 30-day monthly term
    let alice = ctx.accounts.approve(&admin, alice.id).await.unwrap();
    let now = Utc::now();
    let entitlement = subgate::compute_entitlement(&alice, now);
    assert!(matches!(entitlement.access, RemainingAccess::Days(d) if d >= 30));
    assert!(entitlement.warranty_days >= 30);

    let alice = ctx
        .accounts
        .authenticate("11988887766", "secret123")
        .await
        .unwrap();
    assert_eq!(alice.nickname, "alice");

    // The admin attaches an independently timed quarterly subscription
    let sub = ctx
        .subscriptions
        .add_subscription(&admin, alice.id, "editor", "quarterly", "2024-01-01")
        .await
        .unwrap();
    assert_eq!(
        sub.expires_at.unwrap() - sub.started_at,
        Duration::days(90)
    );
    let sub_entitlement = subgate::compute_subscription_entitlement(&sub, sub.started_at);
    assert_eq!(sub_entitlement.access, RemainingAccess::Days(91));

    let listed = ctx.subscriptions.list_for_account(alice.id).await.unwrap();
    assert_eq!(listed.len(), 1);

    // Deactivation locks the account out until the admin toggles it back
    ctx.accounts.toggle(&admin, alice.id).await.unwrap();
    let err = ctx
        .accounts
        .authenticate("11988887766", "secret123")
        .await
        .unwrap_err();
    assert!(matches!(err, SubgateError::NotEligible(_)));

    ctx.accounts.toggle(&admin, alice.id).await.unwrap();
    assert!(ctx
        .accounts
        .authenticate("11988887766", "secret123")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_state_survives_reopening_the_store() {
    let dir = tempfile::tempdir().unwrap();

    let admin_id = {
        let ctx = AppContext::new(test_config(dir.path())).await.unwrap();
        let admin = ctx
            .accounts
            .register(registration("root", "11900000001", "lifetime"))
            .await
            .unwrap();
        admin.id
    };

    let ctx = AppContext::new(test_config(dir.path())).await.unwrap();
    let admin = ctx.accounts.get_account(admin_id).await.unwrap();
    assert!(admin.is_admin);

    // Still the first and only registration; the next one is not promoted
    let bob = ctx
        .accounts
        .register(registration("bob", "11900000002", "monthly"))
        .await
        .unwrap();
    assert!(!bob.is_admin);
    assert_eq!(bob.status, AccountStatus::Pending);
}
