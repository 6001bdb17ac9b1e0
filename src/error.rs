use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::directory::{BankAccountId, BusId, Role, UserId};
use crate::domain::wallet::{WalletId, WalletKind, WalletNumber, WalletOwner};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Failure taxonomy of the transfer engine. Every variant is terminal for
/// the request that raised it; the atomic unit it belonged to is never
/// partially applied.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("bus {0} not found")]
    BusNotFound(BusId),

    #[error("bank account {0} not found")]
    BankAccountNotFound(BankAccountId),

    #[error("no default bank account for user {0}")]
    NoDefaultBankAccount(UserId),

    #[error("no {kind} wallet for {owner}")]
    WalletNotFound { kind: WalletKind, owner: WalletOwner },

    #[error("user {user} holds role {actual}, expected {expected}")]
    RoleMismatch {
        user: UserId,
        expected: Role,
        actual: Role,
    },

    #[error("bus owner {0} does not hold the owner role")]
    InvalidOwner(UserId),

    #[error("operator {operator} has no active assignment for bus {bus}")]
    OperatorNotAssigned { operator: UserId, bus: BusId },

    #[error("insufficient funds in wallet {wallet}: available {available}, requested {requested}")]
    InsufficientFunds {
        wallet: WalletId,
        available: Decimal,
        requested: Decimal,
    },

    #[error("unsupported withdrawal: {0}")]
    UnsupportedWithdrawal(String),

    #[error("wallet number allocation exhausted after {0} attempts")]
    AllocationExhausted(u32),

    #[error("wallet number {0} is already taken")]
    WalletNumberTaken(WalletNumber),

    #[error("a {kind} wallet already exists for {owner}")]
    WalletExists { kind: WalletKind, owner: WalletOwner },

    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LedgerError {
    fn from(err: rocksdb::Error) -> Self {
        LedgerError::Persistence(err.to_string())
    }
}
