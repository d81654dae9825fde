//! Queries against the account store (subscription tiers, feature enablement).

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::account::AccountUserRow;

/// Read-only queries against the account store's `users` and
/// `user_features` tables.
pub struct AccountRepo;

impl AccountRepo {
    /// Fetch a user's account row, or `None` if the user is unknown.
    pub async fn get_user(pool: &PgPool, user_id: Uuid) -> Result<Option<AccountUserRow>, sqlx::Error> {
        sqlx::query_as::<_, AccountUserRow>(
            "SELECT id, email, subscription_tier, is_active
             FROM users
             WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Feature strings currently enabled for a user. Unknown feature names
    /// are filtered out by the caller, not here.
    pub async fn list_enabled_features(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT feature_type
             FROM user_features
             WHERE user_id = $1 AND enabled = true",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Tenant id for multi-tenant installs. The `tenant_id` column is not
    /// present in every deployment, so probe the schema first.
    pub async fn get_tenant_id(pool: &PgPool, user_id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        let column_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM information_schema.columns
                WHERE table_name = 'users' AND column_name = 'tenant_id'
            )",
        )
        .fetch_one(pool)
        .await?;

        if !column_exists {
            return Ok(None);
        }

        sqlx::query_scalar::<_, Option<Uuid>>("SELECT tenant_id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map(Option::flatten)
    }
}
