//! Queries against the workspace store: users, folders, and template copies.
//!
//! Both schemas are owned by the workspace system, so race windows are
//! closed with per-key serialization (transaction-scoped advisory locks)
//! rather than new uniqueness constraints. Two concurrent syncs for the same
//! user therefore cannot double-create a folder or double-copy a template.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::workspace::{FlowRow, NewFlowCopy, WorkspaceUserRow};

/// Queries for the workspace store's `"user"`, `folder`, and `flow` tables.
pub struct WorkspaceRepo;

impl WorkspaceRepo {
    /// Locate a workspace user by username (the account store's email).
    /// The workspace system assigns its own user ids, so this cross-reference
    /// is the only way to map an account user onto a workspace user.
    pub async fn find_user_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<WorkspaceUserRow>, sqlx::Error> {
        sqlx::query_as::<_, WorkspaceUserRow>(
            r#"SELECT id, username, is_active FROM "user" WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// Get or create a folder keyed by (owner, name, parent).
    ///
    /// Returns the folder id and whether this call created it. Idempotent:
    /// the check and insert run inside one transaction holding an advisory
    /// lock on the folder key, so a concurrent call for the same key blocks
    /// and then observes the existing row.
    pub async fn get_or_create_folder(
        pool: &PgPool,
        owner: Uuid,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> Result<(Uuid, bool), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(folder_lock_key(owner, name, parent_id))
            .execute(&mut *tx)
            .await?;

        let existing: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM folder
             WHERE user_id = $1 AND name = $2 AND parent_id IS NOT DISTINCT FROM $3",
        )
        .bind(owner)
        .bind(name)
        .bind(parent_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(id) = existing {
            tx.commit().await?;
            return Ok((id, false));
        }

        let folder_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO folder (id, name, user_id, parent_id)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(folder_id)
        .bind(name)
        .bind(owner)
        .bind(parent_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(%owner, folder = name, "Created workspace folder");
        Ok((folder_id, true))
    }

    /// `true` if the user already owns a flow with this name.
    ///
    /// Copy identity is by name within the owner's scope, not by source
    /// template id. Renaming a source template, or two templates sharing a
    /// name, both change sync behavior; this is a known limitation.
    pub async fn flow_exists(
        pool: &PgPool,
        owner: Uuid,
        name: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM flow WHERE user_id = $1 AND name = $2)",
        )
        .bind(owner)
        .bind(name)
        .fetch_one(pool)
        .await
    }

    /// Copy a template into a user's folder. Always inserts a new row; the
    /// caller decides whether a prior copy should have suppressed the insert
    /// (see [`WorkspaceRepo::insert_flow_if_absent`]).
    pub async fn insert_flow(
        pool: &PgPool,
        owner: Uuid,
        copy: &NewFlowCopy<'_>,
    ) -> Result<Uuid, sqlx::Error> {
        let flow_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO flow (id, user_id, name, description, data, folder_id, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, CURRENT_TIMESTAMP)",
        )
        .bind(flow_id)
        .bind(owner)
        .bind(copy.name)
        .bind(copy.description)
        .bind(copy.data)
        .bind(copy.folder_id)
        .execute(pool)
        .await?;

        tracing::info!(%owner, flow = copy.name, %flow_id, "Copied template to user workspace");
        Ok(flow_id)
    }

    /// Copy a template unless the user already owns a same-named flow.
    ///
    /// Returns `None` when a copy exists. The existence check and insert run
    /// inside one transaction holding an advisory lock on (owner, name), so
    /// concurrent syncs for the same user cannot both insert.
    pub async fn insert_flow_if_absent(
        pool: &PgPool,
        owner: Uuid,
        copy: &NewFlowCopy<'_>,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(flow_lock_key(owner, copy.name))
            .execute(&mut *tx)
            .await?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM flow WHERE user_id = $1 AND name = $2)",
        )
        .bind(owner)
        .bind(copy.name)
        .fetch_one(&mut *tx)
        .await?;

        if exists {
            tx.commit().await?;
            return Ok(None);
        }

        let flow_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO flow (id, user_id, name, description, data, folder_id, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, CURRENT_TIMESTAMP)",
        )
        .bind(flow_id)
        .bind(owner)
        .bind(copy.name)
        .bind(copy.description)
        .bind(copy.data)
        .bind(copy.folder_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(%owner, flow = copy.name, %flow_id, "Copied template to user workspace");
        Ok(Some(flow_id))
    }

    /// All flows owned by a user, ordered by name.
    pub async fn list_flows(pool: &PgPool, owner: Uuid) -> Result<Vec<FlowRow>, sqlx::Error> {
        sqlx::query_as::<_, FlowRow>(
            "SELECT id, name, folder_id, updated_at
             FROM flow
             WHERE user_id = $1
             ORDER BY name",
        )
        .bind(owner)
        .fetch_all(pool)
        .await
    }
}

/// Advisory lock key for a folder get-or-create.
fn folder_lock_key(owner: Uuid, name: &str, parent_id: Option<Uuid>) -> String {
    match parent_id {
        Some(parent) => format!("flowsync:folder:{owner}:{parent}:{name}"),
        None => format!("flowsync:folder:{owner}::{name}"),
    }
}

/// Advisory lock key for a check-then-copy of one template name.
fn flow_lock_key(owner: Uuid, name: &str) -> String {
    format!("flowsync:flow:{owner}:{name}")
}
