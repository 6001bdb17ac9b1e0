use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamilyDescriptor, DB, Options, WriteBatch};
use tokio::sync::Mutex;

use crate::domain::ports::{LedgerStore, WalletStore};
use crate::domain::transaction::{Transaction, TransactionDraft, TransactionId};
use crate::domain::wallet::{Wallet, WalletDelta, WalletId, WalletKind, WalletNumber, WalletOwner};
use crate::error::{LedgerError, Result};

/// Column family for wallet rows keyed by wallet id.
pub const CF_WALLETS: &str = "wallets";
/// Column family mapping `(kind, owner)` to a wallet id.
pub const CF_WALLET_OWNERS: &str = "wallet_owners";
/// Column family mapping wallet numbers to a wallet id.
pub const CF_WALLET_NUMBERS: &str = "wallet_numbers";
/// Column family for ledger rows keyed by transaction id.
pub const CF_TRANSACTIONS: &str = "transactions";

/// Persistent wallet and ledger store backed by RocksDB.
///
/// Every transfer unit lands in one `WriteBatch`, so the wallet mutations
/// and the ledger row become durable together or not at all. A commit mutex
/// serializes the check-then-write sections; point reads go straight to the
/// database. `Clone` shares the underlying handle.
#[derive(Clone)]
pub struct RocksDbLedger {
    db: Arc<DB>,
    commit_lock: Arc<Mutex<()>>,
}

impl RocksDbLedger {
    /// Opens or creates the database at `path`, ensuring all column
    /// families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = [CF_WALLETS, CF_WALLET_OWNERS, CF_WALLET_NUMBERS, CF_TRANSACTIONS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;
        Ok(Self {
            db: Arc::new(db),
            commit_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| LedgerError::Persistence(format!("column family {name} not found")))
    }

    fn owner_key(kind: WalletKind, owner: WalletOwner) -> String {
        format!("{kind}:{owner}")
    }

    fn read_wallet(&self, id: WalletId) -> Result<Option<Wallet>> {
        let cf = self.cf(CF_WALLETS)?;
        match self.db.get_cf(cf, id.0.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl WalletStore for RocksDbLedger {
    async fn get(&self, id: WalletId) -> Result<Option<Wallet>> {
        self.read_wallet(id)
    }

    async fn find_by_owner(&self, kind: WalletKind, owner: WalletOwner) -> Result<Option<Wallet>> {
        let cf = self.cf(CF_WALLET_OWNERS)?;
        let key = Self::owner_key(kind, owner);
        match self.db.get_cf(cf, key.as_bytes())? {
            Some(bytes) => {
                let id = WalletId(
                    uuid::Uuid::from_slice(&bytes)
                        .map_err(|e| LedgerError::Persistence(e.to_string()))?,
                );
                self.read_wallet(id)
            }
            None => Ok(None),
        }
    }

    async fn number_exists(&self, number: &WalletNumber) -> Result<bool> {
        let cf = self.cf(CF_WALLET_NUMBERS)?;
        Ok(self
            .db
            .get_pinned_cf(cf, number.as_str().as_bytes())?
            .is_some())
    }

    async fn insert(&self, wallet: Wallet) -> Result<Wallet> {
        let _guard = self.commit_lock.lock().await;

        let numbers_cf = self.cf(CF_WALLET_NUMBERS)?;
        if self
            .db
            .get_pinned_cf(numbers_cf, wallet.number.as_str().as_bytes())?
            .is_some()
        {
            return Err(LedgerError::WalletNumberTaken(wallet.number));
        }
        let owners_cf = self.cf(CF_WALLET_OWNERS)?;
        let owner_key = Self::owner_key(wallet.kind, wallet.owner);
        if self.db.get_pinned_cf(owners_cf, owner_key.as_bytes())?.is_some() {
            return Err(LedgerError::WalletExists {
                kind: wallet.kind,
                owner: wallet.owner,
            });
        }

        let wallets_cf = self.cf(CF_WALLETS)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(wallets_cf, wallet.id.0.as_bytes(), serde_json::to_vec(&wallet)?);
        batch.put_cf(owners_cf, owner_key.as_bytes(), wallet.id.0.as_bytes());
        batch.put_cf(
            numbers_cf,
            wallet.number.as_str().as_bytes(),
            wallet.id.0.as_bytes(),
        );
        self.db.write(batch)?;
        Ok(wallet)
    }

    async fn all(&self) -> Result<Vec<Wallet>> {
        let cf = self.cf(CF_WALLETS)?;
        let mut wallets = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            wallets.push(serde_json::from_slice(&value)?);
        }
        Ok(wallets)
    }
}

#[async_trait]
impl LedgerStore for RocksDbLedger {
    async fn commit(
        &self,
        deltas: Vec<WalletDelta>,
        draft: TransactionDraft,
    ) -> Result<Transaction> {
        let _guard = self.commit_lock.lock().await;

        // Stage against copies; the batch below is written only once the
        // whole unit has validated.
        let mut staged: HashMap<WalletId, Wallet> = HashMap::new();
        for delta in &deltas {
            let wallet = match staged.entry(delta.wallet) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let wallet = self.read_wallet(delta.wallet)?.ok_or_else(|| {
                        LedgerError::Persistence(format!(
                            "wallet {} missing from store",
                            delta.wallet
                        ))
                    })?;
                    entry.insert(wallet)
                }
            };
            wallet.apply(delta.change)?;
        }

        let tx = draft.finalize(TransactionId::random(), Utc::now());
        let wallets_cf = self.cf(CF_WALLETS)?;
        let transactions_cf = self.cf(CF_TRANSACTIONS)?;
        let mut batch = WriteBatch::default();
        for wallet in staged.values() {
            batch.put_cf(wallets_cf, wallet.id.0.as_bytes(), serde_json::to_vec(wallet)?);
        }
        batch.put_cf(transactions_cf, tx.id.0.as_bytes(), serde_json::to_vec(&tx)?);
        self.db.write(batch)?;
        Ok(tx)
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        match self.db.get_cf(cf, id.0.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn all(&self) -> Result<Vec<Transaction>> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        let mut transactions: Vec<Transaction> = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            transactions.push(serde_json::from_slice(&value)?);
        }
        transactions.sort_by_key(|tx| tx.happened_at);
        Ok(transactions)
    }
}
