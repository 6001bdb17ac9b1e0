//! Read-only platform entities the engine resolves during a transfer.
//!
//! Users, buses, bank accounts, and operator assignments are owned and
//! mutated by the upstream platform; the engine only ever reads them
//! through the [`Directory`](super::ports::Directory) port.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusId(pub Uuid);

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BankAccountId(pub Uuid);

impl fmt::Display for BankAccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssignmentId(pub Uuid);

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Passenger,
    Operator,
    Owner,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Passenger => "passenger",
            Role::Operator => "operator",
            Role::Owner => "owner",
            Role::Admin => "admin",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub id: BusId,
    /// Registration plate shown to riders, e.g. "ND-1234".
    pub number: String,
    pub owner: UserId,
}

/// External settlement target. Never a ledger participant: withdrawals to a
/// bank account are recorded here but settled elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: BankAccountId,
    pub owner: UserId,
    pub bank_name: String,
    pub account_number: String,
    pub holder_name: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Approved,
    Rejected,
    Blocked,
    Active,
    Inactive,
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Approved => "approved",
            AssignmentStatus::Rejected => "rejected",
            AssignmentStatus::Blocked => "blocked",
            AssignmentStatus::Active => "active",
            AssignmentStatus::Inactive => "inactive",
        };
        f.write_str(name)
    }
}

/// Binding of an operator to a bus. Only an `Active` row lets the operator
/// collect fares for that bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorAssignment {
    pub id: AssignmentId,
    pub operator: UserId,
    pub bus: BusId,
    pub status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
}

impl OperatorAssignment {
    pub fn is_active(&self) -> bool {
        self.status == AssignmentStatus::Active
    }
}
