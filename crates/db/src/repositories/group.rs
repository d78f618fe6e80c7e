//! Group and membership repository.
//!
//! `member_role` is the membership oracle the rest of the system is built
//! on: every group-scoped operation resolves the caller's role through it
//! before touching anything else.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use hearth_core::group::Role;

use crate::entities::{group_members, groups, sea_orm_active_enums::MemberRole, users};

/// A group member joined with their user details.
#[derive(Debug, Clone)]
pub struct MemberWithUser {
    /// The membership row.
    pub membership: group_members::Model,
    /// The member's display name.
    pub name: String,
    /// The member's email.
    pub email: String,
}

/// Group repository for CRUD and membership operations.
#[derive(Debug, Clone)]
pub struct GroupRepository {
    db: DatabaseConnection,
}

impl GroupRepository {
    /// Creates a new group repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a group and its head membership in one transaction.
    ///
    /// The creator becomes the group's head; a group never exists without
    /// one.
    ///
    /// # Errors
    ///
    /// Returns an error if either insert fails.
    pub async fn create_with_head(
        &self,
        name: &str,
        head_user_id: Uuid,
    ) -> Result<groups::Model, DbErr> {
        let txn = self.db.begin().await?;
        let now = chrono::Utc::now();

        let group = groups::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            head_user_id: Set(head_user_id),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        group_members::ActiveModel {
            group_id: Set(group.id),
            user_id: Set(head_user_id),
            role: Set(MemberRole::Head),
            joined_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(group)
    }

    /// Finds a group by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<groups::Model>, DbErr> {
        groups::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists all groups a user belongs to, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<groups::Model>, DbErr> {
        let rows = group_members::Entity::find()
            .filter(group_members::Column::UserId.eq(user_id))
            .find_also_related(groups::Entity)
            .all(&self.db)
            .await?;

        let mut result: Vec<groups::Model> =
            rows.into_iter().filter_map(|(_, group)| group).collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    /// Resolves a user's role in a group. `None` means not a member.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn member_role(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Role>, DbErr> {
        let membership = group_members::Entity::find_by_id((group_id, user_id))
            .one(&self.db)
            .await?;

        Ok(membership.map(|m| m.role.into()))
    }

    /// Lists all members of a group with user details, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_members(&self, group_id: Uuid) -> Result<Vec<MemberWithUser>, DbErr> {
        let rows = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .order_by_asc(group_members::Column::JoinedAt)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(membership, user)| {
                user.map(|u| MemberWithUser {
                    membership,
                    name: u.name,
                    email: u.email,
                })
            })
            .collect())
    }

    /// Adds a user to a group.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (including the primary-key
    /// constraint when the user is already a member).
    pub async fn add_member(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<group_members::Model, DbErr> {
        group_members::ActiveModel {
            group_id: Set(group_id),
            user_id: Set(user_id),
            role: Set(role.into()),
            joined_at: Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await
    }

    /// Counts the chores defined in a group.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_chores(&self, group_id: Uuid) -> Result<u64, DbErr> {
        crate::entities::chores::Entity::find()
            .filter(crate::entities::chores::Column::GroupId.eq(group_id))
            .count(&self.db)
            .await
    }
}
