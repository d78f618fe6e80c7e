//! Ledger entry repository.
//!
//! The `resolve` method carries the concurrency contract of the whole
//! subsystem: a transition out of `pending_approval` is a single conditional
//! update, so two racing approve/reject calls produce exactly one winner.
//! Balance reads run inside one repeatable-read transaction and delegate the
//! arithmetic to `hearth_core::ledger::compute_balances`.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IsolationLevel,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use hearth_core::ledger::{
    CreationDecision, EntryAmount, EntryStatus, MemberBalance, MemberRef, Resolution,
    SettlementAmount, compute_balances,
};

use crate::entities::{
    group_members, ledger_entries, sea_orm_active_enums::LedgerStatus, settlements, users,
};

/// Ledger entry repository.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Persists a new entry shaped by the creation policy.
    ///
    /// The decision carries beneficiary, initial status, and initial
    /// resolution; the amount was copied from the request at validation
    /// time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        group_id: Uuid,
        chore_id: Uuid,
        amount: Decimal,
        created_by: Uuid,
        decision: &CreationDecision,
    ) -> Result<ledger_entries::Model, DbErr> {
        let (approved_by, rejected_by) = decision.resolution.into_columns();

        ledger_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            group_id: Set(group_id),
            user_id: Set(decision.beneficiary),
            chore_id: Set(chore_id),
            amount: Set(amount),
            status: Set(decision.status.into()),
            created_by_user_id: Set(created_by),
            approved_by_user_id: Set(approved_by),
            rejected_by_user_id: Set(rejected_by),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await
    }

    /// Finds an entry by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ledger_entries::Model>, DbErr> {
        ledger_entries::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists entries for a group, newest first, optionally filtered by
    /// status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_group(
        &self,
        group_id: Uuid,
        status: Option<EntryStatus>,
    ) -> Result<Vec<ledger_entries::Model>, DbErr> {
        let mut query = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::GroupId.eq(group_id));

        if let Some(status) = status {
            query = query.filter(ledger_entries::Column::Status.eq(LedgerStatus::from(status)));
        }

        query
            .order_by_desc(ledger_entries::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Applies a terminal resolution to a pending entry.
    ///
    /// The update is conditioned on the entry still being
    /// `pending_approval`: `UPDATE ... WHERE id = $1 AND status =
    /// 'pending_approval'`. Returns `None` when no row matched - the entry
    /// was resolved concurrently (or never existed); the caller already
    /// validated existence and maps `None` to a conflict.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn resolve(
        &self,
        entry_id: Uuid,
        resolution: Resolution,
    ) -> Result<Option<ledger_entries::Model>, DbErr> {
        debug_assert!(
            resolution.status().is_terminal(),
            "resolve requires a terminal resolution"
        );
        let (approved_by, rejected_by) = resolution.into_columns();

        let result = ledger_entries::Entity::update_many()
            .set(ledger_entries::ActiveModel {
                status: Set(resolution.status().into()),
                approved_by_user_id: Set(approved_by),
                rejected_by_user_id: Set(rejected_by),
                ..Default::default()
            })
            .filter(ledger_entries::Column::Id.eq(entry_id))
            .filter(ledger_entries::Column::Status.eq(LedgerStatus::PendingApproval))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            tracing::debug!(entry_id = %entry_id, "resolve matched no pending row");
            return Ok(None);
        }

        self.find_by_id(entry_id).await
    }

    /// Computes every member's balance from one consistent snapshot.
    ///
    /// Members, entries, and settlements are read inside a single
    /// repeatable-read transaction so the sum never mixes states from
    /// different points in time. The arithmetic itself is pure and lives in
    /// the core crate.
    ///
    /// # Errors
    ///
    /// Returns an error if any query in the transaction fails.
    pub async fn balances_for_group(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<MemberBalance>, DbErr> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::RepeatableRead), None)
            .await?;

        let members: Vec<MemberRef> = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .find_also_related(users::Entity)
            .all(&txn)
            .await?
            .into_iter()
            .filter_map(|(membership, user)| {
                user.map(|u| MemberRef {
                    user_id: membership.user_id,
                    name: u.name,
                })
            })
            .collect();

        let entries: Vec<EntryAmount> = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::GroupId.eq(group_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|entry| EntryAmount {
                beneficiary_id: entry.user_id,
                status: entry.status.into(),
                amount: entry.amount,
            })
            .collect();

        let settlement_amounts: Vec<SettlementAmount> = settlements::Entity::find()
            .filter(settlements::Column::GroupId.eq(group_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|settlement| SettlementAmount {
                user_id: settlement.user_id,
                amount: settlement.amount,
            })
            .collect();

        txn.commit().await?;

        Ok(compute_balances(&members, &entries, &settlement_amounts))
    }
}
