//! `SeaORM` entity definitions.

pub mod chores;
pub mod group_members;
pub mod groups;
pub mod invite_tokens;
pub mod ledger_entries;
pub mod sea_orm_active_enums;
pub mod settlements;
pub mod users;
