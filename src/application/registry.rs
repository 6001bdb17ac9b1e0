use crate::application::allocator::WalletNumberAllocator;
use crate::domain::ports::WalletStoreBox;
use crate::domain::wallet::{Wallet, WalletKind, WalletOwner};
use crate::error::{LedgerError, Result};

/// Idempotent wallet lookup and creation over a [`WalletStore`].
///
/// [`WalletStore`]: crate::domain::ports::WalletStore
pub struct WalletRegistry {
    store: WalletStoreBox,
    allocator: WalletNumberAllocator,
}

impl WalletRegistry {
    pub fn new(store: WalletStoreBox) -> Self {
        Self {
            store,
            allocator: WalletNumberAllocator::new(),
        }
    }

    /// Returns the wallet for `(kind, owner)`, creating it on first use.
    /// Calling twice never produces two wallets: a lost creation race is
    /// resolved by returning the winner's wallet, a lost number race by
    /// drawing a fresh number.
    pub async fn open(&self, kind: WalletKind, owner: WalletOwner) -> Result<Wallet> {
        if let Some(wallet) = self.store.find_by_owner(kind, owner).await? {
            return Ok(wallet);
        }
        for _ in 0..WalletNumberAllocator::DEFAULT_MAX_ATTEMPTS {
            let number = self.allocator.allocate(self.store.as_ref()).await?;
            match self.store.insert(Wallet::open(kind, owner, number)).await {
                Ok(wallet) => return Ok(wallet),
                Err(LedgerError::WalletNumberTaken(_)) => continue,
                Err(LedgerError::WalletExists { .. }) => {
                    return match self.store.find_by_owner(kind, owner).await? {
                        Some(wallet) => Ok(wallet),
                        None => Err(LedgerError::Persistence(format!(
                            "{kind} wallet for {owner} vanished after a creation race"
                        ))),
                    };
                }
                Err(other) => return Err(other),
            }
        }
        Err(LedgerError::AllocationExhausted(
            WalletNumberAllocator::DEFAULT_MAX_ATTEMPTS,
        ))
    }

    /// Like [`open`](Self::open) but treats a missing wallet as an error.
    pub async fn require(&self, kind: WalletKind, owner: WalletOwner) -> Result<Wallet> {
        self.store
            .find_by_owner(kind, owner)
            .await?
            .ok_or(LedgerError::WalletNotFound { kind, owner })
    }
}
