//! Domain model of the wallet ledger: money, wallets, ledger rows, the
//! platform entities they reference, and the ports the engine talks through.

pub mod directory;
pub mod money;
pub mod ports;
pub mod transaction;
pub mod wallet;
