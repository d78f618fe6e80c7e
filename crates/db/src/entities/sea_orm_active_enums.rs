//! Active enums mapped to Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use hearth_core::group::Role;
use hearth_core::ledger::EntryStatus;

/// Role of a user within a group (`member_role` in Postgres).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "member_role")]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Group head.
    #[sea_orm(string_value = "head")]
    Head,
    /// Regular member.
    #[sea_orm(string_value = "member")]
    Member,
}

/// Status of a ledger entry (`ledger_status` in Postgres).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ledger_status")]
#[serde(rename_all = "snake_case")]
pub enum LedgerStatus {
    /// Awaiting the head's decision.
    #[sea_orm(string_value = "pending_approval")]
    PendingApproval,
    /// Approved (terminal).
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected (terminal).
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl From<Role> for MemberRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Head => Self::Head,
            Role::Member => Self::Member,
        }
    }
}

impl From<MemberRole> for Role {
    fn from(role: MemberRole) -> Self {
        match role {
            MemberRole::Head => Self::Head,
            MemberRole::Member => Self::Member,
        }
    }
}

impl From<EntryStatus> for LedgerStatus {
    fn from(status: EntryStatus) -> Self {
        match status {
            EntryStatus::PendingApproval => Self::PendingApproval,
            EntryStatus::Approved => Self::Approved,
            EntryStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<LedgerStatus> for EntryStatus {
    fn from(status: LedgerStatus) -> Self {
        match status {
            LedgerStatus::PendingApproval => Self::PendingApproval,
            LedgerStatus::Approved => Self::Approved,
            LedgerStatus::Rejected => Self::Rejected,
        }
    }
}
