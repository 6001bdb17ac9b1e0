mod common;

use std::sync::Arc;

use common::Platform;
use farebox::application::engine::{PaymentRequest, RechargeRequest};
use farebox::domain::directory::Role;
use farebox::domain::ports::WalletStore;
use farebox::domain::wallet::{WalletKind, WalletOwner};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_fares_never_overdraw_the_passenger() {
    let platform = Arc::new(Platform::new().await);
    platform.credit(platform.passenger_wallet, "55.00").await;
    let rows_before = platform.ledger_len().await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let platform = Arc::clone(&platform);
        handles.push(tokio::spawn(async move {
            platform
                .engine
                .pay(PaymentRequest {
                    passenger: platform.passenger,
                    bus: platform.bus,
                    operator: platform.operator,
                    amount: Platform::amount("10.00"),
                })
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    // 55.00 funds exactly five 10.00 fares, no matter the interleaving.
    assert_eq!(successes, 5);
    assert_eq!(platform.balance(platform.passenger_wallet).await, dec!(5.00));
    assert_eq!(platform.balance(platform.bus_wallet).await, dec!(50.00));
    assert_eq!(platform.ledger_len().await, rows_before + 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_recharges_activate_exactly_one_wallet() {
    let platform = Arc::new(Platform::new().await);
    let newcomer = platform.add_user("Nimal", Role::Passenger).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let platform = Arc::clone(&platform);
        handles.push(tokio::spawn(async move {
            platform
                .engine
                .recharge(RechargeRequest {
                    passenger: newcomer,
                    amount: Platform::amount("1.00"),
                    bank_account: None,
                })
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let wallet = platform
        .store
        .find_by_owner(WalletKind::Passenger, WalletOwner::User(newcomer))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet.balance, dec!(8.00));

    // Exactly one passenger wallet exists for the newcomer.
    let wallets = platform.store.all().await.unwrap();
    let owned: Vec<_> = wallets
        .iter()
        .filter(|w| w.owner == WalletOwner::User(newcomer))
        .collect();
    assert_eq!(owned.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn balances_stay_non_negative_under_mixed_load() {
    let platform = Arc::new(Platform::new().await);
    platform.credit(platform.passenger_wallet, "30.00").await;

    let mut handles = Vec::new();
    for i in 0..12 {
        let platform = Arc::clone(&platform);
        handles.push(tokio::spawn(async move {
            if i % 3 == 0 {
                let _ = platform
                    .engine
                    .recharge(RechargeRequest {
                        passenger: platform.passenger,
                        amount: Platform::amount("5.00"),
                        bank_account: None,
                    })
                    .await;
            } else {
                let _ = platform
                    .engine
                    .pay(PaymentRequest {
                        passenger: platform.passenger,
                        bus: platform.bus,
                        operator: platform.operator,
                        amount: Platform::amount("10.00"),
                    })
                    .await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for wallet in platform.store.all().await.unwrap() {
        assert!(wallet.balance >= Decimal::ZERO);
    }
}
