//! Invite token repository.

use chrono::{Duration, Utc};
use rand::RngCore;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::invite_tokens;

/// Default invite validity when the head does not specify one.
pub const DEFAULT_EXPIRY_DAYS: i64 = 7;

/// Invite token repository.
#[derive(Debug, Clone)]
pub struct InviteRepository {
    db: DatabaseConnection,
}

impl InviteRepository {
    /// Creates a new invite repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Generates a URL-safe random token.
    #[must_use]
    pub fn generate_token() -> String {
        let mut bytes = [0u8; 24];
        rand::rng().fill_bytes(&mut bytes);
        base64_url::encode(&bytes)
    }

    /// Creates an invite token for a group, valid for `expires_in_days`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        group_id: Uuid,
        expires_in_days: i64,
    ) -> Result<invite_tokens::Model, DbErr> {
        let now = Utc::now();
        invite_tokens::ActiveModel {
            id: Set(Uuid::new_v4()),
            group_id: Set(group_id),
            token: Set(Self::generate_token()),
            expires_at: Set((now + Duration::days(expires_in_days)).into()),
            created_at: Set(now.into()),
        }
        .insert(&self.db)
        .await
    }

    /// Finds an invite by its token string.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<invite_tokens::Model>, DbErr> {
        invite_tokens::Entity::find()
            .filter(invite_tokens::Column::Token.eq(token))
            .one(&self.db)
            .await
    }

    /// Deletes an invite. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = invite_tokens::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    /// Deletes all expired invites, returning how many were removed.
    ///
    /// Housekeeping helper for operators; nothing schedules this
    /// automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete_expired(&self) -> Result<u64, DbErr> {
        let result = invite_tokens::Entity::delete_many()
            .filter(invite_tokens::Column::ExpiresAt.lt(Utc::now()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique_and_url_safe() {
        let first = InviteRepository::generate_token();
        let second = InviteRepository::generate_token();

        assert_ne!(first, second);
        assert!(!first.is_empty());
        assert!(
            first
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
