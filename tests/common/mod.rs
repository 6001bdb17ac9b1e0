use chrono::Utc;
use farebox::application::dispatch::NotificationDispatcher;
use farebox::application::engine::TransferEngine;
use farebox::application::gate::AssignmentGate;
use farebox::application::registry::WalletRegistry;
use farebox::domain::directory::{
    AssignmentId, AssignmentStatus, BankAccount, BankAccountId, Bus, BusId, OperatorAssignment,
    Role, User, UserId,
};
use farebox::domain::money::Amount;
use farebox::domain::ports::{LedgerStore, WalletStore};
use farebox::domain::transaction::TransactionDraft;
use farebox::domain::wallet::{WalletDelta, WalletId, WalletKind, WalletOwner};
use farebox::infrastructure::in_memory::{
    FailingTransport, InMemoryDirectory, InMemoryLedger, RecordingTransport,
};
use rust_decimal::Decimal;
use uuid::Uuid;

pub struct PlatformConfig {
    pub assignment: Option<AssignmentStatus>,
    pub default_bank: bool,
    pub failing_transport: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            assignment: Some(AssignmentStatus::Active),
            default_bank: true,
            failing_transport: false,
        }
    }
}

/// One passenger, operator, owner, and bus, with passenger and bus wallets
/// already opened, wired to an in-memory engine.
pub struct Platform {
    pub engine: TransferEngine,
    pub store: InMemoryLedger,
    pub directory: InMemoryDirectory,
    pub transport: RecordingTransport,
    pub passenger: UserId,
    pub operator: UserId,
    pub owner: UserId,
    pub bus: BusId,
    pub bank_account: BankAccountId,
    pub passenger_wallet: WalletId,
    pub bus_wallet: WalletId,
}

impl Platform {
    pub async fn new() -> Self {
        Self::with(PlatformConfig::default()).await
    }

    pub async fn with(config: PlatformConfig) -> Self {
        let store = InMemoryLedger::new();
        let directory = InMemoryDirectory::new();
        let transport = RecordingTransport::new();

        let passenger = UserId(Uuid::new_v4());
        let operator = UserId(Uuid::new_v4());
        let owner = UserId(Uuid::new_v4());
        let bus = BusId(Uuid::new_v4());
        let bank_account = BankAccountId(Uuid::new_v4());

        directory
            .add_user(User {
                id: passenger,
                name: "Amaya".into(),
                role: Role::Passenger,
            })
            .await;
        directory
            .add_user(User {
                id: operator,
                name: "Ranil".into(),
                role: Role::Operator,
            })
            .await;
        directory
            .add_user(User {
                id: owner,
                name: "Sunil".into(),
                role: Role::Owner,
            })
            .await;
        directory
            .add_bus(Bus {
                id: bus,
                number: "ND-1234".into(),
                owner,
            })
            .await;
        if config.default_bank {
            directory
                .add_bank_account(BankAccount {
                    id: bank_account,
                    owner,
                    bank_name: "People's Bank".into(),
                    account_number: "004412345678".into(),
                    holder_name: "Sunil".into(),
                    is_default: true,
                })
                .await;
        }
        if let Some(status) = config.assignment {
            directory
                .add_assignment(OperatorAssignment {
                    id: AssignmentId(Uuid::new_v4()),
                    operator,
                    bus,
                    status,
                    assigned_at: Utc::now(),
                })
                .await;
        }

        let setup = WalletRegistry::new(Box::new(store.clone()));
        let passenger_wallet = setup
            .open(WalletKind::Passenger, WalletOwner::User(passenger))
            .await
            .unwrap()
            .id;
        let bus_wallet = setup
            .open(WalletKind::Bus, WalletOwner::Bus(bus))
            .await
            .unwrap()
            .id;

        let dispatcher = if config.failing_transport {
            NotificationDispatcher::new(Box::new(FailingTransport))
        } else {
            NotificationDispatcher::new(Box::new(transport.clone()))
        };
        let engine = TransferEngine::new(
            Box::new(directory.clone()),
            WalletRegistry::new(Box::new(store.clone())),
            Box::new(store.clone()),
            AssignmentGate::new(Box::new(directory.clone())),
            dispatcher,
        );

        Self {
            engine,
            store,
            directory,
            transport,
            passenger,
            operator,
            owner,
            bus,
            bank_account,
            passenger_wallet,
            bus_wallet,
        }
    }

    pub fn amount(raw: &str) -> Amount {
        Amount::parse(raw).unwrap()
    }

    /// Seeds funds into a wallet directly through the store, bypassing the
    /// engine so tests control exactly which rows the engine produced.
    pub async fn credit(&self, wallet: WalletId, raw: &str) {
        let amount = Self::amount(raw);
        self.store
            .commit(
                vec![WalletDelta::credit(wallet, amount)],
                TransactionDraft::recharge(amount, wallet, self.passenger, None, "seed funds"),
            )
            .await
            .unwrap();
    }

    pub async fn balance(&self, wallet: WalletId) -> Decimal {
        WalletStore::get(&self.store, wallet)
            .await
            .unwrap()
            .unwrap()
            .balance
    }

    pub async fn ledger_len(&self) -> usize {
        LedgerStore::all(&self.store).await.unwrap().len()
    }

    pub async fn add_user(&self, name: &str, role: Role) -> UserId {
        let id = UserId(Uuid::new_v4());
        self.directory
            .add_user(User {
                id,
                name: name.into(),
                role,
            })
            .await;
        id
    }
}
