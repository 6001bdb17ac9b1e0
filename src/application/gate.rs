use tracing::warn;

use crate::domain::directory::{BusId, OperatorAssignment, UserId};
use crate::domain::ports::DirectoryBox;
use crate::error::{LedgerError, Result};

/// Read-only check that an operator currently collects fares for a bus.
pub struct AssignmentGate {
    directory: DirectoryBox,
}

impl AssignmentGate {
    pub fn new(directory: DirectoryBox) -> Self {
        Self { directory }
    }

    /// Requires an `Active` assignment for the exact (operator, bus) pair.
    /// "Never assigned" and "assigned but not active" both fail the gate,
    /// but the audit log tells them apart.
    pub async fn require_active(
        &self,
        operator: UserId,
        bus: BusId,
    ) -> Result<OperatorAssignment> {
        match self.directory.assignment(operator, bus).await? {
            Some(assignment) if assignment.is_active() => Ok(assignment),
            Some(assignment) => {
                warn!(%operator, %bus, status = %assignment.status, "assignment exists but is not active");
                Err(LedgerError::OperatorNotAssigned { operator, bus })
            }
            None => {
                warn!(%operator, %bus, "operator was never assigned to bus");
                Err(LedgerError::OperatorNotAssigned { operator, bus })
            }
        }
    }
}
