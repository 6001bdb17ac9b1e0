use std::io::Read;

use serde::Deserialize;
use uuid::Uuid;

use crate::application::engine::{
    PaymentRequest, RechargeRequest, WithdrawRequest, WithdrawalSource, WithdrawalTarget,
};
use crate::domain::directory::{BankAccountId, BusId, UserId};
use crate::domain::money::Amount;
use crate::error::{LedgerError, Result};

/// One of the three transfer operations accepted from upstream.
#[derive(Debug, Clone)]
pub enum TransferRequest {
    Payment(PaymentRequest),
    Recharge(RechargeRequest),
    Withdraw(WithdrawRequest),
}

/// Raw CSV row; fields not used by the row's `op` stay empty.
#[derive(Debug, Deserialize)]
struct RawRequest {
    op: String,
    passenger: Option<Uuid>,
    bus: Option<Uuid>,
    operator: Option<Uuid>,
    from_type: Option<String>,
    from_ref: Option<Uuid>,
    to_type: Option<String>,
    bank_account: Option<Uuid>,
    amount: String,
}

impl TryFrom<RawRequest> for TransferRequest {
    type Error = LedgerError;

    fn try_from(raw: RawRequest) -> Result<Self> {
        // Amounts arrive as decimal strings and are parsed exactly once,
        // here, before any arithmetic.
        let amount = Amount::parse(&raw.amount)?;
        match raw.op.to_ascii_lowercase().as_str() {
            "payment" => Ok(Self::Payment(PaymentRequest {
                passenger: UserId(required(raw.passenger, "passenger")?),
                bus: BusId(required(raw.bus, "bus")?),
                operator: UserId(required(raw.operator, "operator")?),
                amount,
            })),
            "recharge" => Ok(Self::Recharge(RechargeRequest {
                passenger: UserId(required(raw.passenger, "passenger")?),
                amount,
                bank_account: raw.bank_account.map(BankAccountId),
            })),
            "withdraw" => {
                let from_ref = required(raw.from_ref, "from_ref")?;
                let from = match required_str(raw.from_type.as_deref(), "from_type")?
                    .to_ascii_lowercase()
                    .as_str()
                {
                    "bus" => WithdrawalSource::Bus(BusId(from_ref)),
                    "owner" => WithdrawalSource::Owner(UserId(from_ref)),
                    other => {
                        return Err(LedgerError::MalformedRequest(format!(
                            "unknown from_type {other:?}"
                        )));
                    }
                };
                let to = match required_str(raw.to_type.as_deref(), "to_type")?
                    .to_ascii_lowercase()
                    .as_str()
                {
                    "wallet" => WithdrawalTarget::Wallet,
                    "bank" => WithdrawalTarget::Bank,
                    other => {
                        return Err(LedgerError::MalformedRequest(format!(
                            "unknown to_type {other:?}"
                        )));
                    }
                };
                Ok(Self::Withdraw(WithdrawRequest { from, to, amount }))
            }
            other => Err(LedgerError::MalformedRequest(format!(
                "unknown op {other:?}"
            ))),
        }
    }
}

fn required(field: Option<Uuid>, name: &str) -> Result<Uuid> {
    field.ok_or_else(|| LedgerError::MalformedRequest(format!("missing field {name}")))
}

fn required_str<'a>(field: Option<&'a str>, name: &str) -> Result<&'a str> {
    match field {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(LedgerError::MalformedRequest(format!(
            "missing field {name}"
        ))),
    }
}

/// Streams transfer requests from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record
/// lengths, yielding one `Result<TransferRequest>` per row so a bad row
/// never aborts the stream.
pub struct RequestReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RequestReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn requests(self) -> impl Iterator<Item = Result<TransferRequest>> {
        self.reader
            .into_deserialize::<RawRequest>()
            .map(|row| row.map_err(LedgerError::from).and_then(TransferRequest::try_from))
    }
}
