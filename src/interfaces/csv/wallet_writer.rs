use std::io::Write;

use crate::domain::wallet::Wallet;
use crate::error::Result;

/// Writes the final wallet state as CSV, ordered by wallet number so the
/// output is stable across runs.
pub struct WalletWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> WalletWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_wallets(&mut self, mut wallets: Vec<Wallet>) -> Result<()> {
        wallets.sort_by(|a, b| a.number.as_str().cmp(b.number.as_str()));
        self.writer
            .write_record(["wallet_number", "kind", "owner", "balance"])?;
        for wallet in wallets {
            let kind = wallet.kind.to_string();
            let owner = wallet.owner.to_string();
            let balance = wallet.balance.to_string();
            self.writer.write_record([
                wallet.number.as_str(),
                kind.as_str(),
                owner.as_str(),
                balance.as_str(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
