use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::directory::{
    BankAccount, BankAccountId, Bus, BusId, OperatorAssignment, User, UserId,
};
use crate::domain::ports::{Directory, LedgerStore, NotificationTransport, WalletStore};
use crate::domain::transaction::{Transaction, TransactionDraft, TransactionId};
use crate::domain::wallet::{Wallet, WalletDelta, WalletId, WalletKind, WalletNumber, WalletOwner};
use crate::error::{LedgerError, Result};

/// Shared in-memory wallet and ledger state.
///
/// One store backs both the wallet and ledger ports so a transfer unit can
/// validate and apply its deltas and append its row under a single write
/// guard. `Clone` shares the underlying state.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    inner: Arc<RwLock<LedgerState>>,
}

#[derive(Default)]
struct LedgerState {
    wallets: HashMap<WalletId, Wallet>,
    by_owner: HashMap<(WalletKind, WalletOwner), WalletId>,
    by_number: HashMap<WalletNumber, WalletId>,
    // Append-only; rows are never touched after being pushed.
    transactions: Vec<Transaction>,
    tx_index: HashMap<TransactionId, usize>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletStore for InMemoryLedger {
    async fn get(&self, id: WalletId) -> Result<Option<Wallet>> {
        let state = self.inner.read().await;
        Ok(state.wallets.get(&id).cloned())
    }

    async fn find_by_owner(&self, kind: WalletKind, owner: WalletOwner) -> Result<Option<Wallet>> {
        let state = self.inner.read().await;
        Ok(state
            .by_owner
            .get(&(kind, owner))
            .and_then(|id| state.wallets.get(id))
            .cloned())
    }

    async fn number_exists(&self, number: &WalletNumber) -> Result<bool> {
        let state = self.inner.read().await;
        Ok(state.by_number.contains_key(number))
    }

    async fn insert(&self, wallet: Wallet) -> Result<Wallet> {
        let mut state = self.inner.write().await;
        if state.by_number.contains_key(&wallet.number) {
            return Err(LedgerError::WalletNumberTaken(wallet.number));
        }
        if state.by_owner.contains_key(&(wallet.kind, wallet.owner)) {
            return Err(LedgerError::WalletExists {
                kind: wallet.kind,
                owner: wallet.owner,
            });
        }
        state.by_number.insert(wallet.number.clone(), wallet.id);
        state.by_owner.insert((wallet.kind, wallet.owner), wallet.id);
        state.wallets.insert(wallet.id, wallet.clone());
        Ok(wallet)
    }

    async fn all(&self) -> Result<Vec<Wallet>> {
        let state = self.inner.read().await;
        Ok(state.wallets.values().cloned().collect())
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn commit(
        &self,
        deltas: Vec<WalletDelta>,
        draft: TransactionDraft,
    ) -> Result<Transaction> {
        let mut state = self.inner.write().await;

        // Stage every mutation against copies first; nothing in `state`
        // changes until the whole unit has validated.
        let mut staged: HashMap<WalletId, Wallet> = HashMap::new();
        for delta in &deltas {
            let wallet = match staged.entry(delta.wallet) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let wallet = state
                        .wallets
                        .get(&delta.wallet)
                        .ok_or_else(|| {
                            LedgerError::Persistence(format!(
                                "wallet {} missing from store",
                                delta.wallet
                            ))
                        })?
                        .clone();
                    entry.insert(wallet)
                }
            };
            wallet.apply(delta.change)?;
        }

        let tx = draft.finalize(TransactionId::random(), Utc::now());
        for wallet in staged.into_values() {
            state.wallets.insert(wallet.id, wallet);
        }
        let index = state.transactions.len();
        state.tx_index.insert(tx.id, index);
        state.transactions.push(tx.clone());
        Ok(tx)
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let state = self.inner.read().await;
        Ok(state
            .tx_index
            .get(&id)
            .map(|&index| state.transactions[index].clone()))
    }

    async fn all(&self) -> Result<Vec<Transaction>> {
        let state = self.inner.read().await;
        Ok(state.transactions.clone())
    }
}

/// In-memory directory of platform entities, mutated only by test and CLI
/// setup code; the engine sees it through the read-only port.
#[derive(Default, Clone)]
pub struct InMemoryDirectory {
    inner: Arc<RwLock<DirectoryState>>,
}

#[derive(Default)]
struct DirectoryState {
    users: HashMap<UserId, User>,
    buses: HashMap<BusId, Bus>,
    bank_accounts: HashMap<BankAccountId, BankAccount>,
    assignments: Vec<OperatorAssignment>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user: User) {
        self.inner.write().await.users.insert(user.id, user);
    }

    pub async fn add_bus(&self, bus: Bus) {
        self.inner.write().await.buses.insert(bus.id, bus);
    }

    pub async fn add_bank_account(&self, account: BankAccount) {
        self.inner
            .write()
            .await
            .bank_accounts
            .insert(account.id, account);
    }

    pub async fn add_assignment(&self, assignment: OperatorAssignment) {
        self.inner.write().await.assignments.push(assignment);
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn bus(&self, id: BusId) -> Result<Option<Bus>> {
        Ok(self.inner.read().await.buses.get(&id).cloned())
    }

    async fn bank_account(&self, id: BankAccountId) -> Result<Option<BankAccount>> {
        Ok(self.inner.read().await.bank_accounts.get(&id).cloned())
    }

    async fn default_bank_account(&self, owner: UserId) -> Result<Option<BankAccount>> {
        let state = self.inner.read().await;
        Ok(state
            .bank_accounts
            .values()
            .find(|account| account.owner == owner && account.is_default)
            .cloned())
    }

    async fn assignment(
        &self,
        operator: UserId,
        bus: BusId,
    ) -> Result<Option<OperatorAssignment>> {
        let state = self.inner.read().await;
        // Latest row for the pair wins.
        Ok(state
            .assignments
            .iter()
            .rev()
            .find(|a| a.operator == operator && a.bus == bus)
            .cloned())
    }
}

/// Transport that only logs; stands in for the MQTT broker in the CLI.
#[derive(Default, Clone)]
pub struct LogTransport;

#[async_trait]
impl NotificationTransport for LogTransport {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        tracing::info!(%topic, payload = %String::from_utf8_lossy(&payload), "notification");
        Ok(())
    }
}

/// Captures published messages for assertions.
#[derive(Default, Clone)]
pub struct RecordingTransport {
    messages: Arc<RwLock<Vec<(String, Vec<u8>)>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<(String, Vec<u8>)> {
        self.messages.read().await.clone()
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        self.messages.write().await.push((topic.to_string(), payload));
        Ok(())
    }
}

/// Transport whose broker is permanently down.
#[derive(Default, Clone)]
pub struct FailingTransport;

#[async_trait]
impl NotificationTransport for FailingTransport {
    async fn publish(&self, _topic: &str, _payload: Vec<u8>) -> Result<()> {
        Err(LedgerError::Persistence("transport down".into()))
    }
}
