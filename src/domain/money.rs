use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// A strictly positive monetary amount with exact decimal precision.
///
/// All amounts entering the engine pass through this type, so zero and
/// negative values are unrepresentable anywhere a transfer is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidAmount(format!(
                "amount must be positive, got {value}"
            )))
        }
    }

    /// Parses a decimal string as delivered by the upstream API layer.
    /// Unparsable, zero, and negative inputs are all `InvalidAmount`.
    pub fn parse(raw: &str) -> Result<Self, LedgerError> {
        let value = Decimal::from_str(raw.trim())
            .map_err(|_| LedgerError::InvalidAmount(format!("unparsable amount {raw:?}")))?;
        Self::new(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
