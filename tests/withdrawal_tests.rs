mod common;

use common::{Platform, PlatformConfig};
use farebox::application::engine::{WithdrawRequest, WithdrawalSource, WithdrawalTarget};
use farebox::domain::ports::WalletStore;
use farebox::domain::transaction::TransactionKind;
use farebox::domain::wallet::{WalletKind, WalletOwner};
use farebox::error::LedgerError;
use rust_decimal_macros::dec;

#[tokio::test]
async fn bus_takings_move_into_the_owner_wallet() {
    let platform = Platform::new().await;
    platform.credit(platform.bus_wallet, "150.00").await;

    let tx = platform
        .engine
        .withdraw(WithdrawRequest {
            from: WithdrawalSource::Bus(platform.bus),
            to: WithdrawalTarget::Wallet,
            amount: Platform::amount("150.00"),
        })
        .await
        .unwrap();

    assert_eq!(platform.balance(platform.bus_wallet).await, dec!(0.00));
    let owner_wallet = platform
        .store
        .find_by_owner(WalletKind::Owner, WalletOwner::User(platform.owner))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(owner_wallet.balance, dec!(150.00));

    assert_eq!(tx.kind, TransactionKind::Withdrawal);
    assert_eq!(tx.from_wallet, Some(platform.bus_wallet));
    assert_eq!(tx.to_wallet, Some(owner_wallet.id));
    assert!(tx.to_bank_account.is_none());
    assert_eq!(tx.owner, Some(platform.owner));
    assert_eq!(tx.bus, Some(platform.bus));
}

#[tokio::test]
async fn bus_to_bank_debits_the_wallet_and_credits_nothing() {
    let platform = Platform::new().await;
    platform.credit(platform.bus_wallet, "200.00").await;

    let tx = platform
        .engine
        .withdraw(WithdrawRequest {
            from: WithdrawalSource::Bus(platform.bus),
            to: WithdrawalTarget::Bank,
            amount: Platform::amount("80.00"),
        })
        .await
        .unwrap();

    assert_eq!(platform.balance(platform.bus_wallet).await, dec!(120.00));
    // Bank settlement is out of scope: only the reference is recorded.
    assert_eq!(tx.to_bank_account, Some(platform.bank_account));
    assert!(tx.to_wallet.is_none());
    // No owner wallet springs into existence for a bank payout.
    assert!(platform
        .store
        .find_by_owner(WalletKind::Owner, WalletOwner::User(platform.owner))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn owner_wallet_pays_out_to_the_default_bank_account() {
    let platform = Platform::new().await;
    platform.credit(platform.bus_wallet, "150.00").await;
    platform
        .engine
        .withdraw(WithdrawRequest {
            from: WithdrawalSource::Bus(platform.bus),
            to: WithdrawalTarget::Wallet,
            amount: Platform::amount("150.00"),
        })
        .await
        .unwrap();

    let tx = platform
        .engine
        .withdraw(WithdrawRequest {
            from: WithdrawalSource::Owner(platform.owner),
            to: WithdrawalTarget::Bank,
            amount: Platform::amount("150.00"),
        })
        .await
        .unwrap();

    let owner_wallet = platform
        .store
        .find_by_owner(WalletKind::Owner, WalletOwner::User(platform.owner))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(owner_wallet.balance, dec!(0.00));
    assert_eq!(tx.from_wallet, Some(owner_wallet.id));
    assert_eq!(tx.to_bank_account, Some(platform.bank_account));
}

#[tokio::test]
async fn owner_to_wallet_is_unsupported() {
    let platform = Platform::new().await;
    platform.credit(platform.bus_wallet, "150.00").await;
    platform
        .engine
        .withdraw(WithdrawRequest {
            from: WithdrawalSource::Bus(platform.bus),
            to: WithdrawalTarget::Wallet,
            amount: Platform::amount("150.00"),
        })
        .await
        .unwrap();

    let err = platform
        .engine
        .withdraw(WithdrawRequest {
            from: WithdrawalSource::Owner(platform.owner),
            to: WithdrawalTarget::Wallet,
            amount: Platform::amount("50.00"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::UnsupportedWithdrawal(_)));
}

#[tokio::test]
async fn overdrawing_the_bus_wallet_rejects_cleanly() {
    let platform = Platform::new().await;
    platform.credit(platform.bus_wallet, "100.00").await;
    let rows_before = platform.ledger_len().await;

    let err = platform
        .engine
        .withdraw(WithdrawRequest {
            from: WithdrawalSource::Bus(platform.bus),
            to: WithdrawalTarget::Wallet,
            amount: Platform::amount("150.00"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));

    assert_eq!(platform.balance(platform.bus_wallet).await, dec!(100.00));
    assert_eq!(platform.ledger_len().await, rows_before);
}

#[tokio::test]
async fn bank_payout_requires_a_default_bank_account() {
    let platform = Platform::with(PlatformConfig {
        default_bank: false,
        ..Default::default()
    })
    .await;
    platform.credit(platform.bus_wallet, "100.00").await;

    let err = platform
        .engine
        .withdraw(WithdrawRequest {
            from: WithdrawalSource::Bus(platform.bus),
            to: WithdrawalTarget::Bank,
            amount: Platform::amount("50.00"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NoDefaultBankAccount(_)));
    assert_eq!(platform.balance(platform.bus_wallet).await, dec!(100.00));
}
