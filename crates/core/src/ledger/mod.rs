//! Ledger entry lifecycle and balance computation.
//!
//! This module implements the business core of Hearth:
//! - Entry status and resolution types
//! - The role-dependent creation policy
//! - The approve/reject state machine
//! - Per-member balance aggregation
//! - Error types for ledger operations

pub mod balance;
pub mod error;
pub mod policy;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use balance::{EntryAmount, MemberBalance, MemberRef, SettlementAmount, compute_balances};
pub use error::{ErrorKind, LedgerError};
pub use policy::{CreationPolicy, decide_creation};
pub use service::LedgerService;
pub use types::{ChoreRef, CreateEntryInput, CreationDecision, EntryStatus, Resolution};
