//! Initial schema: users, groups, membership, chores, ledger, settlements,
//! invite tokens.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS invite_tokens, settlements, ledger_entries, chores, \
             group_members, groups, users CASCADE;\n\
             DROP TYPE IF EXISTS ledger_status;\n\
             DROP TYPE IF EXISTS member_role;",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
CREATE TYPE member_role AS ENUM ('head', 'member');
CREATE TYPE ledger_status AS ENUM ('pending_approval', 'approved', 'rejected');

CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    name VARCHAR(255) NOT NULL,
    dob DATE,
    sex VARCHAR(32),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE groups (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    head_user_id UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE group_members (
    group_id UUID NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    role member_role NOT NULL,
    joined_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (group_id, user_id)
);

-- Membership lookup by user (listing a user's groups)
CREATE INDEX idx_group_members_user ON group_members(user_id);

CREATE TABLE chores (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    group_id UUID NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    description TEXT,
    amount NUMERIC(12,2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_chore_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_chores_group ON chores(group_id, created_at DESC);

CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    group_id UUID NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users(id),
    chore_id UUID NOT NULL REFERENCES chores(id),
    amount NUMERIC(12,2) NOT NULL,
    status ledger_status NOT NULL,
    created_by_user_id UUID NOT NULL REFERENCES users(id),
    approved_by_user_id UUID REFERENCES users(id),
    rejected_by_user_id UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_entry_amount_positive CHECK (amount > 0),
    -- Exactly one resolver once terminal, none while pending
    CONSTRAINT chk_entry_resolution CHECK (
        (status = 'pending_approval' AND approved_by_user_id IS NULL AND rejected_by_user_id IS NULL)
        OR (status = 'approved' AND approved_by_user_id IS NOT NULL AND rejected_by_user_id IS NULL)
        OR (status = 'rejected' AND rejected_by_user_id IS NOT NULL AND approved_by_user_id IS NULL)
    )
);

-- Group listing, newest first
CREATE INDEX idx_ledger_group_created ON ledger_entries(group_id, created_at DESC);

-- Pending queue and balance aggregation
CREATE INDEX idx_ledger_group_status ON ledger_entries(group_id, status, user_id);

CREATE TABLE settlements (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    group_id UUID NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users(id),
    amount NUMERIC(12,2) NOT NULL,
    date DATE NOT NULL,
    note TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_settlement_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_settlements_group ON settlements(group_id, date DESC, created_at DESC);

CREATE TABLE invite_tokens (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    group_id UUID NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
    token VARCHAR(64) NOT NULL UNIQUE,
    expires_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Cleanup of expired tokens
CREATE INDEX idx_invite_tokens_expires ON invite_tokens(expires_at);
";
