use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::directory::{BusId, UserId};
use crate::domain::money::Amount;
use crate::error::{LedgerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletId(pub Uuid);

impl WalletId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Wallet classes. A wallet's kind is fixed at creation and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletKind {
    Passenger,
    Bus,
    Owner,
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WalletKind::Passenger => "passenger",
            WalletKind::Bus => "bus",
            WalletKind::Owner => "owner",
        };
        f.write_str(name)
    }
}

/// The entity a wallet belongs to. Passenger and owner wallets hang off a
/// user, bus wallets off a bus; each `(kind, owner)` pair holds at most one
/// wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletOwner {
    User(UserId),
    Bus(BusId),
}

impl fmt::Display for WalletOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletOwner::User(id) => write!(f, "user {id}"),
            WalletOwner::Bus(id) => write!(f, "bus {id}"),
        }
    }
}

/// Opaque 16-digit account number, unique across the store and derived from
/// nothing but a random draw.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletNumber(String);

impl WalletNumber {
    pub const LEN: usize = 16;

    pub fn new(raw: String) -> Result<Self> {
        if raw.len() == Self::LEN && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw))
        } else {
            Err(LedgerError::MalformedRequest(format!(
                "wallet number must be {} digits, got {raw:?}",
                Self::LEN
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A balance-holding account. The balance is non-negative at every point in
/// time; [`Wallet::apply`] is the only code that changes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub kind: WalletKind,
    pub number: WalletNumber,
    pub balance: Decimal,
    pub owner: WalletOwner,
}

impl Wallet {
    /// Opens a fresh wallet with a zero balance.
    pub fn open(kind: WalletKind, owner: WalletOwner, number: WalletNumber) -> Self {
        Self {
            id: WalletId::random(),
            kind,
            number,
            balance: Decimal::ZERO,
            owner,
        }
    }

    /// Applies a signed balance change, rejecting any change that would
    /// drive the balance negative. The balance is untouched on rejection.
    pub fn apply(&mut self, change: Decimal) -> Result<()> {
        let next = self.balance + change;
        if next < Decimal::ZERO {
            return Err(LedgerError::InsufficientFunds {
                wallet: self.id,
                available: self.balance,
                requested: -change,
            });
        }
        self.balance = next;
        Ok(())
    }
}

/// One signed balance change inside a transfer unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalletDelta {
    pub wallet: WalletId,
    pub change: Decimal,
}

impl WalletDelta {
    pub fn debit(wallet: WalletId, amount: Amount) -> Self {
        Self {
            wallet,
            change: -amount.value(),
        }
    }

    pub fn credit(wallet: WalletId, amount: Amount) -> Self {
        Self {
            wallet,
            change: amount.value(),
        }
    }
}
