use std::path::Path;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::directory::{
    AssignmentId, AssignmentStatus, BankAccount, Bus, BusId, OperatorAssignment, User, UserId,
};
use crate::error::Result;
use crate::infrastructure::in_memory::InMemoryDirectory;

/// On-disk shape of the directory fixture consumed by the CLI.
///
/// The upstream platform owns these records in production; the CLI loads a
/// snapshot of them so the engine has parties to resolve against.
#[derive(Debug, Default, Deserialize)]
pub struct DirectoryFixture {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub buses: Vec<Bus>,
    #[serde(default)]
    pub bank_accounts: Vec<BankAccount>,
    #[serde(default)]
    pub assignments: Vec<FixtureAssignment>,
}

/// Assignment row as written in fixtures; the id and timestamp are assigned
/// on load.
#[derive(Debug, Deserialize)]
pub struct FixtureAssignment {
    pub operator: UserId,
    pub bus: BusId,
    pub status: AssignmentStatus,
}

impl DirectoryFixture {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub async fn into_directory(self) -> InMemoryDirectory {
        let directory = InMemoryDirectory::new();
        for user in self.users {
            directory.add_user(user).await;
        }
        for bus in self.buses {
            directory.add_bus(bus).await;
        }
        for account in self.bank_accounts {
            directory.add_bank_account(account).await;
        }
        for assignment in self.assignments {
            directory
                .add_assignment(OperatorAssignment {
                    id: AssignmentId(Uuid::new_v4()),
                    operator: assignment.operator,
                    bus: assignment.bus,
                    status: assignment.status,
                    assigned_at: Utc::now(),
                })
                .await;
        }
        directory
    }
}
