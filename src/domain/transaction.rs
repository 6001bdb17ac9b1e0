use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::directory::{BankAccountId, BusId, UserId};
use crate::domain::money::Amount;
use crate::domain::wallet::WalletId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub Uuid);

impl TransactionId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Payment,
    Recharge,
    Withdrawal,
    Refund,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionKind::Payment => "payment",
            TransactionKind::Recharge => "recharge",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::Refund => "refund",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
    Blocked,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Approved => "approved",
            TransactionStatus::Rejected => "rejected",
            TransactionStatus::Blocked => "blocked",
        };
        f.write_str(name)
    }
}

/// An immutable ledger row. Rows are never updated or deleted after commit;
/// a correction is a new `Refund` row, not an edit.
///
/// Exactly one source (`from_wallet` or `from_bank_account`) and one
/// destination (`to_wallet` or `to_bank_account`) is set, matching the
/// direction of the movement. Party references are carried for display and
/// audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub amount: Amount,
    pub happened_at: DateTime<Utc>,
    pub from_wallet: Option<WalletId>,
    pub to_wallet: Option<WalletId>,
    pub from_bank_account: Option<BankAccountId>,
    pub to_bank_account: Option<BankAccountId>,
    pub passenger: Option<UserId>,
    pub operator: Option<UserId>,
    pub owner: Option<UserId>,
    pub bus: Option<BusId>,
    pub note: String,
}

/// Pre-commit shape of a ledger row. The store assigns the id and
/// `happened_at` when the transfer unit commits.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub amount: Amount,
    pub from_wallet: Option<WalletId>,
    pub to_wallet: Option<WalletId>,
    pub from_bank_account: Option<BankAccountId>,
    pub to_bank_account: Option<BankAccountId>,
    pub passenger: Option<UserId>,
    pub operator: Option<UserId>,
    pub owner: Option<UserId>,
    pub bus: Option<BusId>,
    pub note: String,
}

impl TransactionDraft {
    /// Fare payment: passenger wallet to bus wallet.
    #[allow(clippy::too_many_arguments)]
    pub fn payment(
        amount: Amount,
        from_wallet: WalletId,
        to_wallet: WalletId,
        passenger: UserId,
        operator: UserId,
        owner: UserId,
        bus: BusId,
        note: impl Into<String>,
    ) -> Self {
        Self {
            kind: TransactionKind::Payment,
            status: TransactionStatus::Approved,
            amount,
            from_wallet: Some(from_wallet),
            to_wallet: Some(to_wallet),
            from_bank_account: None,
            to_bank_account: None,
            passenger: Some(passenger),
            operator: Some(operator),
            owner: Some(owner),
            bus: Some(bus),
            note: note.into(),
        }
    }

    /// Wallet top-up. The bank side is informational only.
    pub fn recharge(
        amount: Amount,
        to_wallet: WalletId,
        passenger: UserId,
        from_bank_account: Option<BankAccountId>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            kind: TransactionKind::Recharge,
            status: TransactionStatus::Approved,
            amount,
            from_wallet: None,
            to_wallet: Some(to_wallet),
            from_bank_account,
            to_bank_account: None,
            passenger: Some(passenger),
            operator: None,
            owner: None,
            bus: None,
            note: note.into(),
        }
    }

    /// Takings withdrawal: wallet to owner wallet, or wallet to bank. A bank
    /// destination carries no wallet credit.
    pub fn withdrawal(
        amount: Amount,
        from_wallet: WalletId,
        to_wallet: Option<WalletId>,
        to_bank_account: Option<BankAccountId>,
        owner: UserId,
        bus: Option<BusId>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            kind: TransactionKind::Withdrawal,
            status: TransactionStatus::Approved,
            amount,
            from_wallet: Some(from_wallet),
            to_wallet,
            from_bank_account: None,
            to_bank_account,
            passenger: None,
            operator: None,
            owner: Some(owner),
            bus,
            note: note.into(),
        }
    }

    /// Freezes the draft into the row the store persists.
    pub fn finalize(self, id: TransactionId, happened_at: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            kind: self.kind,
            status: self.status,
            amount: self.amount,
            happened_at,
            from_wallet: self.from_wallet,
            to_wallet: self.to_wallet,
            from_bank_account: self.from_bank_account,
            to_bank_account: self.to_bank_account,
            passenger: self.passenger,
            operator: self.operator,
            owner: self.owner,
            bus: self.bus,
            note: self.note,
        }
    }
}
