//! Storage and transport seams the engine is written against.

use async_trait::async_trait;

use crate::domain::directory::{
    BankAccount, BankAccountId, Bus, BusId, OperatorAssignment, User, UserId,
};
use crate::domain::transaction::{Transaction, TransactionDraft, TransactionId};
use crate::domain::wallet::{Wallet, WalletDelta, WalletId, WalletKind, WalletNumber, WalletOwner};
use crate::error::Result;

/// Persisted wallet state keyed by id, owner, and wallet number.
#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn get(&self, id: WalletId) -> Result<Option<Wallet>>;

    async fn find_by_owner(&self, kind: WalletKind, owner: WalletOwner) -> Result<Option<Wallet>>;

    async fn number_exists(&self, number: &WalletNumber) -> Result<bool>;

    /// Persists a freshly opened wallet, enforcing both uniqueness
    /// constraints at persist time: `WalletNumberTaken` when the number is
    /// already in use (the caller retries with a fresh allocation) and
    /// `WalletExists` when the owner already holds a wallet of this kind.
    async fn insert(&self, wallet: Wallet) -> Result<Wallet>;

    async fn all(&self) -> Result<Vec<Wallet>>;
}

/// Append-only transaction log plus the transfer unit that feeds it.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Applies the wallet deltas and appends one ledger row as a single
    /// atomic unit: every delta is validated against the non-negative
    /// balance invariant before any write becomes visible, and either all
    /// mutations and the row land together or none do. The store assigns
    /// the row id and `happened_at` at commit. Concurrent commits touching
    /// the same wallet are serialized.
    async fn commit(&self, deltas: Vec<WalletDelta>, draft: TransactionDraft)
    -> Result<Transaction>;

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>>;

    async fn all(&self) -> Result<Vec<Transaction>>;
}

/// Read-only view of the platform entities a transfer resolves.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn user(&self, id: UserId) -> Result<Option<User>>;

    async fn bus(&self, id: BusId) -> Result<Option<Bus>>;

    async fn bank_account(&self, id: BankAccountId) -> Result<Option<BankAccount>>;

    async fn default_bank_account(&self, owner: UserId) -> Result<Option<BankAccount>>;

    /// Latest assignment row for the exact (operator, bus) pair, any
    /// status. A later row shadows earlier ones for the pair, so an
    /// `Active` row superseded by a newer row no longer counts.
    async fn assignment(&self, operator: UserId, bus: BusId)
    -> Result<Option<OperatorAssignment>>;
}

/// Push/MQTT collaborator. Delivery is at-least-once; recipients must
/// tolerate duplicates keyed by transaction id.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()>;
}

pub type WalletStoreBox = Box<dyn WalletStore>;
pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type DirectoryBox = Box<dyn Directory>;
pub type TransportBox = Box<dyn NotificationTransport>;
