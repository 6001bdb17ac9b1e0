mod common;

use common::Platform;
use farebox::application::engine::RechargeRequest;
use farebox::domain::directory::{BankAccountId, Role};
use farebox::domain::ports::WalletStore;
use farebox::domain::transaction::TransactionKind;
use farebox::domain::wallet::{WalletKind, WalletOwner};
use farebox::error::LedgerError;
use rust_decimal_macros::dec;
use uuid::Uuid;

#[tokio::test]
async fn first_recharge_activates_the_wallet() {
    let platform = Platform::new().await;
    let newcomer = platform.add_user("Nimal", Role::Passenger).await;

    let tx = platform
        .engine
        .recharge(RechargeRequest {
            passenger: newcomer,
            amount: Platform::amount("100.00"),
            bank_account: None,
        })
        .await
        .unwrap();

    let wallet = platform
        .store
        .find_by_owner(WalletKind::Passenger, WalletOwner::User(newcomer))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet.balance, dec!(100.00));
    assert_eq!(tx.kind, TransactionKind::Recharge);
    assert_eq!(tx.to_wallet, Some(wallet.id));
    assert!(tx.from_wallet.is_none());
}

#[tokio::test]
async fn repeated_recharges_reuse_the_same_wallet() {
    let platform = Platform::new().await;
    let newcomer = platform.add_user("Nimal", Role::Passenger).await;

    let first = platform
        .engine
        .recharge(RechargeRequest {
            passenger: newcomer,
            amount: Platform::amount("100.00"),
            bank_account: None,
        })
        .await
        .unwrap();
    let second = platform
        .engine
        .recharge(RechargeRequest {
            passenger: newcomer,
            amount: Platform::amount("50.00"),
            bank_account: None,
        })
        .await
        .unwrap();

    assert_eq!(first.to_wallet, second.to_wallet);
    let wallet = platform
        .store
        .find_by_owner(WalletKind::Passenger, WalletOwner::User(newcomer))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet.balance, dec!(150.00));
}

#[tokio::test]
async fn bank_source_is_recorded_but_never_debited() {
    let platform = Platform::new().await;
    // The fixture bank account belongs to the owner; any known account is a
    // valid informational source.
    let tx = platform
        .engine
        .recharge(RechargeRequest {
            passenger: platform.passenger,
            amount: Platform::amount("75.00"),
            bank_account: Some(platform.bank_account),
        })
        .await
        .unwrap();

    assert_eq!(tx.from_bank_account, Some(platform.bank_account));
    assert!(tx.from_wallet.is_none());
}

#[tokio::test]
async fn unknown_bank_account_rejects_before_any_effect() {
    let platform = Platform::new().await;
    let newcomer = platform.add_user("Nimal", Role::Passenger).await;
    let rows_before = platform.ledger_len().await;

    let err = platform
        .engine
        .recharge(RechargeRequest {
            passenger: newcomer,
            amount: Platform::amount("75.00"),
            bank_account: Some(BankAccountId(Uuid::new_v4())),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::BankAccountNotFound(_)));

    // No wallet was activated and no row written.
    assert!(platform
        .store
        .find_by_owner(WalletKind::Passenger, WalletOwner::User(newcomer))
        .await
        .unwrap()
        .is_none());
    assert_eq!(platform.ledger_len().await, rows_before);
}

#[tokio::test]
async fn only_passengers_can_recharge() {
    let platform = Platform::new().await;

    let err = platform
        .engine
        .recharge(RechargeRequest {
            passenger: platform.operator,
            amount: Platform::amount("75.00"),
            bank_account: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::RoleMismatch { .. }));
}

#[tokio::test]
async fn recharge_notice_lands_on_the_wallet_topic() {
    let platform = Platform::new().await;

    let tx = platform
        .engine
        .recharge(RechargeRequest {
            passenger: platform.passenger,
            amount: Platform::amount("20.00"),
            bank_account: None,
        })
        .await
        .unwrap();

    let messages = platform.transport.messages().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0].0,
        format!("wallet/{}/transfer", tx.to_wallet.unwrap())
    );
}
