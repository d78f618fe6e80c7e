//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Each repository owns an injected [`sea_orm::DatabaseConnection`];
//! nothing in this crate holds global state.

pub mod chore;
pub mod group;
pub mod invite;
pub mod ledger;
pub mod settlement;
pub mod user;

pub use chore::{ChoreRepository, UpdateChoreInput};
pub use group::{GroupRepository, MemberWithUser};
pub use invite::InviteRepository;
pub use ledger::LedgerRepository;
pub use settlement::SettlementRepository;
pub use user::UserRepository;
