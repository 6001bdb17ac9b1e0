//! Wallet ledger and transfer engine for a transit-fare payment platform.
//!
//! The engine validates, executes, and records atomic balance transfers
//! between passenger, bus, and owner wallets (fare payment, recharge,
//! withdrawal) and guarantees money conservation under concurrent access.
//! Everything upstream (HTTP, authentication, CRUD) and downstream (push
//! delivery, bank settlement) lives behind the ports in [`domain::ports`].

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
