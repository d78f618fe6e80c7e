//! Settlement repository for database operations.
//!
//! Settlements are write-once: there is no update or delete path.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::settlements;

/// Settlement repository.
#[derive(Debug, Clone)]
pub struct SettlementRepository {
    db: DatabaseConnection,
}

impl SettlementRepository {
    /// Creates a new settlement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a settlement.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        amount: Decimal,
        date: NaiveDate,
        note: Option<&str>,
    ) -> Result<settlements::Model, DbErr> {
        settlements::ActiveModel {
            id: Set(Uuid::new_v4()),
            group_id: Set(group_id),
            user_id: Set(user_id),
            amount: Set(amount),
            date: Set(date),
            note: Set(note.map(String::from)),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await
    }

    /// Lists all settlements for a group, most recent date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_group(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<settlements::Model>, DbErr> {
        settlements::Entity::find()
            .filter(settlements::Column::GroupId.eq(group_id))
            .order_by_desc(settlements::Column::Date)
            .order_by_desc(settlements::Column::CreatedAt)
            .all(&self.db)
            .await
    }
}
