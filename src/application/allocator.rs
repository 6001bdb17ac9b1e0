use rand::Rng;
use rand::rngs::OsRng;

use crate::domain::ports::WalletStore;
use crate::domain::wallet::WalletNumber;
use crate::error::{LedgerError, Result};

/// Draws collision-free 16-digit wallet numbers.
///
/// Candidates come from the OS random source and are checked against the
/// persisted store before being handed out. The check is a read, so a
/// concurrent allocation can still collide at insert time; callers treat
/// that rejection as a miss and allocate again.
pub struct WalletNumberAllocator {
    max_attempts: u32,
}

impl WalletNumberAllocator {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 32;

    pub fn new() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    pub async fn allocate(&self, store: &dyn WalletStore) -> Result<WalletNumber> {
        for _ in 0..self.max_attempts {
            let candidate = Self::draw()?;
            if !store.number_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(LedgerError::AllocationExhausted(self.max_attempts))
    }

    fn draw() -> Result<WalletNumber> {
        let value: u64 = OsRng.gen_range(0..10_000_000_000_000_000);
        WalletNumber::new(format!("{value:016}"))
    }
}

impl Default for WalletNumberAllocator {
    fn default() -> Self {
        Self::new()
    }
}
