use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::directory::{Bus, BusId, UserId};
use crate::domain::money::Amount;
use crate::domain::ports::TransportBox;
use crate::domain::transaction::{Transaction, TransactionId, TransactionKind, TransactionStatus};

/// Out-of-band payload published after a transfer commits.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferNotice {
    pub transaction_id: TransactionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_id: Option<BusId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passenger_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<UserId>,
    pub amount: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_number: Option<String>,
    pub status: TransactionStatus,
}

/// Best-effort fan-out to the push transport.
///
/// Runs strictly after the transfer unit has committed, so a publish
/// failure is logged and swallowed; it can never unwind the transfer.
pub struct NotificationDispatcher {
    transport: TransportBox,
}

impl NotificationDispatcher {
    pub fn new(transport: TransportBox) -> Self {
        Self { transport }
    }

    pub async fn notify(&self, tx: &Transaction, bus: Option<&Bus>) {
        let notice = TransferNotice {
            transaction_id: tx.id,
            bus_id: tx.bus,
            passenger_id: tx.passenger,
            operator_id: tx.operator,
            amount: tx.amount,
            bus_number: bus.map(|b| b.number.clone()),
            status: tx.status,
        };

        let topic = match (tx.kind, tx.bus) {
            (TransactionKind::Payment, Some(bus_id)) => format!("bus/{bus_id}/payment"),
            _ => match tx.from_wallet.or(tx.to_wallet) {
                Some(wallet) => format!("wallet/{wallet}/transfer"),
                None => format!("ledger/{}/transfer", tx.id),
            },
        };

        let payload = match serde_json::to_vec(&notice) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%err, tx = %tx.id, "failed to encode notification");
                return;
            }
        };

        match self.transport.publish(&topic, payload).await {
            Ok(()) => debug!(%topic, tx = %tx.id, "notification published"),
            Err(err) => warn!(%err, %topic, tx = %tx.id, "notification publish failed"),
        }
    }
}
