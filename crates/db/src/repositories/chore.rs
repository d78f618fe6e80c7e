//! Chore repository for database operations.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::chores;

/// Partial update for a chore. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateChoreInput {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
}

/// Chore repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ChoreRepository {
    db: DatabaseConnection,
}

impl ChoreRepository {
    /// Creates a new chore repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new chore.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        group_id: Uuid,
        name: &str,
        description: Option<&str>,
        amount: Decimal,
    ) -> Result<chores::Model, DbErr> {
        chores::ActiveModel {
            id: Set(Uuid::new_v4()),
            group_id: Set(group_id),
            name: Set(name.to_string()),
            description: Set(description.map(String::from)),
            amount: Set(amount),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await
    }

    /// Finds a chore by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<chores::Model>, DbErr> {
        chores::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists all chores for a group, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_group(&self, group_id: Uuid) -> Result<Vec<chores::Model>, DbErr> {
        chores::Entity::find()
            .filter(chores::Column::GroupId.eq(group_id))
            .order_by_desc(chores::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Applies a partial update to a chore.
    ///
    /// Returns `None` if the chore does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateChoreInput,
    ) -> Result<Option<chores::Model>, DbErr> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut chore: chores::ActiveModel = existing.into();
        if let Some(name) = input.name {
            chore.name = Set(name);
        }
        if let Some(description) = input.description {
            chore.description = Set(Some(description));
        }
        if let Some(amount) = input.amount {
            chore.amount = Set(amount);
        }

        chore.update(&self.db).await.map(Some)
    }

    /// Deletes a chore. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = chores::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
